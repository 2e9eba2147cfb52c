//! In-memory `CacheflyApi` double for handler tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cachefly_client::{
    CacheflyApi, Certificate, ClientError, CreateCertificateRequest, ListCertificatesOptions,
    ListCertificatesResponse, ListOriginsOptions, ListOriginsResponse, Meta, Origin,
    OriginRequest, Result,
};

#[derive(Default)]
pub struct MockApi {
    pub origins: Mutex<BTreeMap<String, Origin>>,
    pub certificates: Mutex<BTreeMap<String, Certificate>>,
    /// Every call made, as "method id"
    pub calls: Mutex<Vec<String>>,
    /// When set, every call fails with this status and message
    pub failure: Mutex<Option<(u16, String)>>,
    /// Whether origin responses include the secret key
    pub return_secret_key: bool,
    next_id: Mutex<u32>,
    pub last_list_origins: Mutex<Option<ListOriginsOptions>>,
    pub last_create_certificate: Mutex<Option<CreateCertificateRequest>>,
}

impl MockApi {
    pub fn with_origin(self, origin: Origin) -> Self {
        self.origins
            .lock()
            .unwrap()
            .insert(origin.id.clone(), origin);
        self
    }

    pub fn with_certificate(self, cert: Certificate) -> Self {
        self.certificates
            .lock()
            .unwrap()
            .insert(cert.id.clone(), cert);
        self
    }

    /// Include the stored secret key in origin responses
    pub fn echoing_secret_key(mut self) -> Self {
        self.return_secret_key = true;
        self
    }

    pub fn fail_with(&self, status: u16, message: &str) {
        *self.failure.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_ref() {
            Some((status, message)) => Err(ClientError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{}-{}", prefix, next)
    }

    fn visible(&self, origin: &Origin) -> Origin {
        let mut origin = origin.clone();
        if !self.return_secret_key {
            origin.secret_key.clear();
        }
        origin
    }
}

fn apply_request(origin: &mut Origin, req: &OriginRequest) {
    macro_rules! copy {
        ($($field:ident => $target:ident),* $(,)?) => {
            $(if let Some(v) = &req.$field { origin.$target = v.clone(); })*
        };
    }
    copy!(
        origin_type => origin_type,
        name => name,
        hostname => hostname,
        scheme => scheme,
        cache_by_query_param => cache_by_query_param,
        gzip => gzip,
        ttl => ttl,
        missed_ttl => missed_ttl,
        connection_timeout => connection_timeout,
        time_to_first_byte_timeout => time_to_first_byte_timeout,
        access_key => access_key,
        secret_key => secret_key,
        region => region,
        signature_version => signature_version,
    );
}

#[async_trait]
impl CacheflyApi for MockApi {
    async fn list_origins(&self, opts: &ListOriginsOptions) -> Result<ListOriginsResponse> {
        self.record("list_origins".to_string())?;
        *self.last_list_origins.lock().unwrap() = Some(opts.clone());

        let origins: Vec<Origin> = self
            .origins
            .lock()
            .unwrap()
            .values()
            .filter(|o| opts.origin_type.is_empty() || o.origin_type == opts.origin_type)
            .map(|o| self.visible(o))
            .collect();
        Ok(ListOriginsResponse {
            meta: Meta {
                limit: opts.limit.unwrap_or(10),
                offset: opts.offset.unwrap_or(0),
                count: origins.len() as i64,
            },
            origins,
        })
    }

    async fn get_origin(&self, id: &str) -> Result<Origin> {
        self.record(format!("get_origin {}", id))?;
        self.origins
            .lock()
            .unwrap()
            .get(id)
            .map(|o| self.visible(o))
            .ok_or_else(|| ClientError::NotFound(format!("origins/{}", id)))
    }

    async fn create_origin(&self, req: &OriginRequest) -> Result<Origin> {
        self.record("create_origin".to_string())?;
        let mut origin = Origin {
            id: self.next_id("origin"),
            scheme: "https".to_string(),
            ttl: 86400,
            missed_ttl: 60,
            created_at: "2024-05-01T00:00:00Z".to_string(),
            updated_at: "2024-05-01T00:00:00Z".to_string(),
            ..Default::default()
        };
        apply_request(&mut origin, req);
        self.origins
            .lock()
            .unwrap()
            .insert(origin.id.clone(), origin.clone());
        Ok(self.visible(&origin))
    }

    async fn update_origin(&self, id: &str, req: &OriginRequest) -> Result<Origin> {
        self.record(format!("update_origin {}", id))?;
        let mut origins = self.origins.lock().unwrap();
        let origin = origins
            .get_mut(id)
            .ok_or_else(|| ClientError::NotFound(format!("origins/{}", id)))?;
        apply_request(origin, req);
        origin.updated_at = "2024-06-01T00:00:00Z".to_string();
        Ok(self.visible(origin))
    }

    async fn delete_origin(&self, id: &str) -> Result<()> {
        self.record(format!("delete_origin {}", id))?;
        self.origins
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound(format!("origins/{}", id)))
    }

    async fn list_certificates(
        &self,
        opts: &ListCertificatesOptions,
    ) -> Result<ListCertificatesResponse> {
        self.record(format!(
            "list_certificates offset={}",
            opts.offset.unwrap_or(0)
        ))?;
        let matching: Vec<Certificate> = self
            .certificates
            .lock()
            .unwrap()
            .values()
            .filter(|c| opts.search.is_empty() || c.subject_common_name.contains(&opts.search))
            .cloned()
            .collect();
        let offset = opts.offset.unwrap_or(0);
        let limit = opts.limit.unwrap_or(10);
        Ok(ListCertificatesResponse {
            meta: Meta {
                limit,
                offset,
                count: matching.len() as i64,
            },
            certificates: matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
        })
    }

    async fn get_certificate(&self, id: &str, _response_type: &str) -> Result<Certificate> {
        self.record(format!("get_certificate {}", id))?;
        self.certificates
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("certificates/{}", id)))
    }

    async fn create_certificate(&self, req: &CreateCertificateRequest) -> Result<Certificate> {
        self.record("create_certificate".to_string())?;
        *self.last_create_certificate.lock().unwrap() = Some(req.clone());
        let cert = Certificate {
            id: self.next_id("cert"),
            subject_common_name: "www.example.com".to_string(),
            subject_names: vec!["www.example.com".to_string(), "example.com".to_string()],
            domains: vec!["www.example.com".to_string()],
            not_before: "2024-01-01T00:00:00Z".to_string(),
            not_after: "2025-01-01T00:00:00Z".to_string(),
            created_at: "2024-05-01T00:00:00Z".to_string(),
            ..Default::default()
        };
        self.certificates
            .lock()
            .unwrap()
            .insert(cert.id.clone(), cert.clone());
        Ok(cert)
    }

    async fn delete_certificate(&self, id: &str) -> Result<()> {
        self.record(format!("delete_certificate {}", id))?;
        self.certificates
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound(format!("certificates/{}", id)))
    }
}
