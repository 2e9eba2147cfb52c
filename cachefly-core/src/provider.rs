//! Provider - Traits abstracting resource and data source operations
//!
//! A Provider owns an API client and hands out resource and data source
//! handlers that share it. Each handler translates configuration into API
//! calls and maps the responses back into state.

use async_trait::async_trait;

use crate::diagnostics::Diagnostics;
use crate::resource::{Attributes, Resource, ResourceId, State};
use crate::schema::ResourceSchema;

/// Error type for host-level provider failures
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub diagnostics: Diagnostics,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}] {}", id, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Build an error from diagnostics that contain at least one error
    pub fn from_diagnostics(diagnostics: Diagnostics) -> Self {
        let message = diagnostics
            .errors()
            .map(|d| {
                if d.detail.is_empty() {
                    d.summary.clone()
                } else {
                    format!("{}: {}", d.summary, d.detail)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            message,
            resource_id: None,
            diagnostics,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Full type name as seen by configuration (e.g., "cachefly" + "certificate")
pub fn type_name(provider_type_name: &str, suffix: &str) -> String {
    format!("{}_{}", provider_type_name, suffix)
}

/// A managed resource
#[async_trait]
pub trait ResourceType: Send + Sync {
    /// Full type name (e.g., "cachefly_certificate")
    fn type_name(&self) -> String;

    fn schema(&self) -> ResourceSchema;

    /// Create the remote object from the planned attributes
    async fn create(&self, diags: &mut Diagnostics, planned: &Resource) -> Option<State>;

    /// Refresh state from the remote object.
    ///
    /// Returning a state with `exists == false` removes it from the state file.
    async fn read(&self, diags: &mut Diagnostics, prior: &State) -> Option<State>;

    /// Update the remote object in place
    async fn update(
        &self,
        diags: &mut Diagnostics,
        prior: &State,
        planned: &Resource,
    ) -> Option<State> {
        let _ = (prior, planned);
        diags.add_error(
            "Update Not Supported",
            format!("Resource type {} cannot be updated in place.", self.type_name()),
        );
        None
    }

    /// Delete the remote object
    async fn delete(&self, diags: &mut Diagnostics, prior: &State);

    /// Bring an existing remote object under management by its identifier
    async fn import(
        &self,
        diags: &mut Diagnostics,
        id: &ResourceId,
        remote_id: &str,
    ) -> Option<State> {
        let _ = (id, remote_id);
        diags.add_error(
            "Import Not Supported",
            format!("Resource type {} does not support import.", self.type_name()),
        );
        None
    }
}

/// A read-only data source
#[async_trait]
pub trait DataSourceType: Send + Sync {
    /// Full type name (e.g., "cachefly_origins")
    fn type_name(&self) -> String;

    fn schema(&self) -> ResourceSchema;

    async fn read(&self, diags: &mut Diagnostics, config: &Resource) -> Option<State>;
}

/// Main Provider trait
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider type name (e.g., "cachefly")
    fn name(&self) -> &'static str;

    /// Schema of the provider configuration block
    fn schema(&self) -> ResourceSchema;

    /// Build the API client from provider configuration
    async fn configure(&mut self, diags: &mut Diagnostics, config: &Attributes);

    /// Resource handlers, sharing the configured client
    fn resources(&self) -> Vec<Box<dyn ResourceType>>;

    /// Data source handlers, sharing the configured client
    fn data_sources(&self) -> Vec<Box<dyn DataSourceType>>;

    /// Look up a resource handler by full type name
    fn resource(&self, type_name: &str) -> ProviderResult<Box<dyn ResourceType>> {
        self.resources()
            .into_iter()
            .find(|r| r.type_name() == type_name)
            .ok_or_else(|| ProviderError::new(format!("Unknown resource type: {}", type_name)))
    }

    /// Look up a data source handler by full type name
    fn data_source(&self, type_name: &str) -> ProviderResult<Box<dyn DataSourceType>> {
        self.data_sources()
            .into_iter()
            .find(|d| d.type_name() == type_name)
            .ok_or_else(|| ProviderError::new(format!("Unknown data source type: {}", type_name)))
    }
}
