//! cachefly_origins data source

use async_trait::async_trait;
use cachefly_core::diagnostics::Diagnostics;
use cachefly_core::provider::{DataSourceType, type_name};
use cachefly_core::resource::{Resource, State};
use cachefly_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::models::OriginsDataSourceModel;
use crate::models::origins::origin_object_type;
use crate::provider::{PROVIDER_TYPE_NAME, SharedClient, require_client};

/// Lists origin server configurations
pub struct OriginsDataSource {
    client: Option<SharedClient>,
}

impl OriginsDataSource {
    pub fn new(client: Option<SharedClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSourceType for OriginsDataSource {
    fn type_name(&self) -> String {
        type_name(PROVIDER_TYPE_NAME, "origins")
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.type_name())
            .with_description("CacheFly Origins data source. List all origin server configurations.")
            .attribute(
                AttributeSchema::new("type", AttributeType::String)
                    .optional()
                    .with_description("Filter origins by type (e.g., 'http', 's3', 'gcs')."),
            )
            .attribute(
                AttributeSchema::new("offset", AttributeType::Int)
                    .optional()
                    .with_description("Offset for pagination (default: 0)."),
            )
            .attribute(
                AttributeSchema::new("limit", AttributeType::Int)
                    .optional()
                    .with_description("Limit for pagination (default: API default)."),
            )
            .attribute(
                AttributeSchema::new("response_type", AttributeType::String)
                    .optional()
                    .with_description("Optional response type parameter for the API call."),
            )
            .attribute(
                AttributeSchema::new("origins", AttributeType::list(origin_object_type()))
                    .computed()
                    .with_sensitive_fields(["access_key", "secret_key"])
                    .with_description("List of origins."),
            )
    }

    async fn read(&self, diags: &mut Diagnostics, config: &Resource) -> Option<State> {
        let client = require_client(&self.client, diags)?;
        let mut data = OriginsDataSourceModel::from_attributes(&config.attributes);

        log::debug!(
            "Reading origins data source (type: {:?})",
            data.origin_type.as_str().unwrap_or_default()
        );

        let opts = data.to_list_options();
        let response = match client.list_origins(&opts).await {
            Ok(response) => response,
            Err(e) => {
                diags.add_error(
                    "Error Reading CacheFly Origins",
                    format!("Could not read origins: {}", e),
                );
                return None;
            }
        };

        log::debug!("Read {} origins", response.origins.len());
        data.set_origins(&response.origins);
        Some(State::existing(config.id.clone(), data.into_attributes()))
    }
}
