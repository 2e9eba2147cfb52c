//! CacheFly Provider
//!
//! Resources and data sources for the CacheFly CDN:
//!
//! - `cachefly_certificate` resource and data source
//! - `cachefly_origin` resource
//! - `cachefly_origins` data source
//!
//! Each handler decodes its configuration into a model, calls the CacheFly
//! API through the shared client and maps the response back into state.

pub mod datasources;
pub mod models;
pub mod provider;
pub mod resources;

#[cfg(test)]
pub(crate) mod testing;

pub use provider::{CacheflyProvider, PROVIDER_TYPE_NAME, SharedClient};
