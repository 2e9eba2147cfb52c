//! CacheFly API client
//!
//! Async client for the parts of the CacheFly CDN management API (v2.5)
//! that the provider manages: origins and TLS certificates.
//!
//! # Example
//!
//! ```ignore
//! use cachefly_client::{CacheflyApi, Client, ClientConfig, ListOriginsOptions};
//!
//! let client = Client::new(ClientConfig::from_env()?)?;
//! let origins = client.list_origins(&ListOriginsOptions::default()).await?;
//! for origin in origins.origins {
//!     println!("{} -> {}", origin.name, origin.hostname);
//! }
//! ```

pub mod certificates;
pub mod client;
pub mod config;
pub mod error;
pub mod origins;

use serde::Deserialize;

pub use certificates::{
    Certificate, CreateCertificateRequest, ListCertificatesOptions, ListCertificatesResponse,
};
pub use client::{CacheflyApi, Client};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use origins::{ListOriginsOptions, ListOriginsResponse, Origin, OriginRequest};

/// Paging metadata on list responses
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub limit: i64,
    pub offset: i64,
    pub count: i64,
}
