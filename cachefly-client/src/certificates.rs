//! Certificate API types

use serde::{Deserialize, Serialize};

use crate::Meta;

/// TLS certificate as returned by the API. Key material is never returned.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certificate {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject_common_name: String,
    pub subject_names: Vec<String>,
    pub expired: bool,
    pub expiring: bool,
    pub in_use: bool,
    pub managed: bool,
    pub services: Vec<String>,
    pub domains: Vec<String>,
    pub not_before: String,
    pub not_after: String,
    pub created_at: String,
}

/// Body of `POST /certificates`
#[derive(Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCertificateRequest {
    pub certificate: String,
    pub certificate_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl std::fmt::Debug for CreateCertificateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateCertificateRequest")
            .field("has_certificate", &!self.certificate.is_empty())
            .field("has_key", &!self.certificate_key.is_empty())
            .field("has_password", &!self.password.is_empty())
            .finish()
    }
}

/// Filters and paging for `GET /certificates`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListCertificatesOptions {
    pub search: String,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub response_type: String,
}

impl ListCertificatesOptions {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if !self.search.is_empty() {
            query.push(("search", self.search.clone()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if !self.response_type.is_empty() {
            query.push(("responseType", self.response_type.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCertificatesResponse {
    #[serde(default)]
    pub meta: Meta,
    #[serde(rename = "data", default)]
    pub certificates: Vec<Certificate>,
}
