//! Origin API types

use serde::{Deserialize, Serialize};

use crate::Meta;

/// Origin server configuration as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Origin {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub origin_type: String,
    pub name: String,
    pub hostname: String,
    pub scheme: String,
    pub cache_by_query_param: bool,
    pub gzip: bool,
    pub ttl: i64,
    pub missed_ttl: i64,
    pub connection_timeout: i64,
    pub time_to_first_byte_timeout: i64,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub signature_version: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Filters and paging for `GET /origins`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOriginsOptions {
    pub origin_type: String,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub response_type: String,
}

impl ListOriginsOptions {
    /// Query parameters; empty strings and unset numbers are not sent
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if !self.origin_type.is_empty() {
            query.push(("type", self.origin_type.clone()));
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
pub struct ListOriginsResponse {
    #[serde(default)]
    pub meta: Meta,
    #[serde(rename = "data", default)]
    pub origins: Vec<Origin>,
}

/// Body of `POST /origins` and `PUT /origins/{id}`. Unset fields are not sent.
#[derive(Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub origin_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_by_query_param: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missed_ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_first_byte_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_version: Option<String>,
}

impl std::fmt::Debug for OriginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginRequest")
            .field("origin_type", &self.origin_type)
            .field("name", &self.name)
            .field("hostname", &self.hostname)
            .field("scheme", &self.scheme)
            .field("has_access_key", &self.access_key.is_some())
            .field("has_secret_key", &self.secret_key.is_some())
            .finish_non_exhaustive()
    }
}
