//! CacheFly API client
//!
//! Direct REST implementation of the CacheFly v2.5 API using Bearer token
//! authentication. Handlers depend on the [`CacheflyApi`] trait rather than
//! on [`Client`] so they can run against an in-memory double.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::certificates::{
    Certificate, CreateCertificateRequest, ListCertificatesOptions, ListCertificatesResponse,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result, api_error_message};
use crate::origins::{ListOriginsOptions, ListOriginsResponse, Origin, OriginRequest};

/// Operations the provider needs from the CacheFly API
#[async_trait]
pub trait CacheflyApi: Send + Sync {
    async fn list_origins(&self, opts: &ListOriginsOptions) -> Result<ListOriginsResponse>;

    async fn get_origin(&self, id: &str) -> Result<Origin>;

    async fn create_origin(&self, req: &OriginRequest) -> Result<Origin>;

    async fn update_origin(&self, id: &str, req: &OriginRequest) -> Result<Origin>;

    async fn delete_origin(&self, id: &str) -> Result<()>;

    async fn list_certificates(
        &self,
        opts: &ListCertificatesOptions,
    ) -> Result<ListCertificatesResponse>;

    async fn get_certificate(&self, id: &str, response_type: &str) -> Result<Certificate>;

    async fn create_certificate(&self, req: &CreateCertificateRequest) -> Result<Certificate>;

    async fn delete_certificate(&self, id: &str) -> Result<()>;
}

/// HTTP client for the CacheFly API
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("cachefly-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        log::debug!("GET {}", path);
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.config.api_token)
            .query(query)
            .send()
            .await?;
        decode(path, response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        log::debug!("{} {}", method, path);
        let response = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&self.config.api_token)
            .json(body)
            .send()
            .await?;
        decode(path, response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        log::debug!("DELETE {}", path);
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(&self.config.api_token)
            .send()
            .await?;
        check_status(path, response).await.map(|_| ())
    }
}

async fn check_status(path: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(path.to_string()));
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
    let response = check_status(path, response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl CacheflyApi for Client {
    async fn list_origins(&self, opts: &ListOriginsOptions) -> Result<ListOriginsResponse> {
        self.get("origins", &opts.query()).await
    }

    async fn get_origin(&self, id: &str) -> Result<Origin> {
        self.get(&format!("origins/{}", id), &[]).await
    }

    async fn create_origin(&self, req: &OriginRequest) -> Result<Origin> {
        log::info!("Creating origin: {:?}", req);
        self.send_json(reqwest::Method::POST, "origins", req).await
    }

    async fn update_origin(&self, id: &str, req: &OriginRequest) -> Result<Origin> {
        log::info!("Updating origin {}", id);
        self.send_json(reqwest::Method::PUT, &format!("origins/{}", id), req)
            .await
    }

    async fn delete_origin(&self, id: &str) -> Result<()> {
        log::info!("Deleting origin {}", id);
        self.delete(&format!("origins/{}", id)).await
    }

    async fn list_certificates(
        &self,
        opts: &ListCertificatesOptions,
    ) -> Result<ListCertificatesResponse> {
        self.get("certificates", &opts.query()).await
    }

    async fn get_certificate(&self, id: &str, response_type: &str) -> Result<Certificate> {
        let mut query = Vec::new();
        if !response_type.is_empty() {
            query.push(("responseType", response_type.to_string()));
        }
        self.get(&format!("certificates/{}", id), &query).await
    }

    async fn create_certificate(&self, req: &CreateCertificateRequest) -> Result<Certificate> {
        log::info!("Uploading certificate: {:?}", req);
        self.send_json(reqwest::Method::POST, "certificates", req)
            .await
    }

    async fn delete_certificate(&self, id: &str) -> Result<()> {
        log::info!("Deleting certificate {}", id);
        self.delete(&format!("certificates/{}", id)).await
    }
}
