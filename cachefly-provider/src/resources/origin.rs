//! cachefly_origin resource

use async_trait::async_trait;
use cachefly_core::diagnostics::Diagnostics;
use cachefly_core::provider::{ResourceType, type_name};
use cachefly_core::resource::{Resource, ResourceId, State};
use cachefly_core::schema::{AttributeSchema, AttributeType, PlanModifier, ResourceSchema};

use crate::models::OriginModel;
use crate::provider::{PROVIDER_TYPE_NAME, SharedClient, require_client};

/// Manages an origin server configuration
pub struct OriginResource {
    client: Option<SharedClient>,
}

impl OriginResource {
    pub fn new(client: Option<SharedClient>) -> Self {
        Self { client }
    }
}

fn optional_computed(name: &str, attr_type: AttributeType, description: &str) -> AttributeSchema {
    AttributeSchema::new(name, attr_type)
        .optional()
        .computed()
        .with_description(description)
}

#[async_trait]
impl ResourceType for OriginResource {
    fn type_name(&self) -> String {
        type_name(PROVIDER_TYPE_NAME, "origin")
    }

    fn schema(&self) -> ResourceSchema {
        use AttributeType as T;

        ResourceSchema::new(self.type_name())
            .with_description("CacheFly Origin resource. Manages an origin server configuration.")
            .attribute(
                AttributeSchema::new("id", T::String)
                    .computed()
                    .with_plan_modifier(PlanModifier::UseStateForUnknown)
                    .with_description("The unique identifier of the origin."),
            )
            .attribute(
                AttributeSchema::new("type", T::String)
                    .required()
                    .with_plan_modifier(PlanModifier::RequiresReplace)
                    .with_description("Type of origin (e.g., 'http', 's3')."),
            )
            .attribute(
                AttributeSchema::new("host", T::String)
                    .required()
                    .with_description("Hostname of the origin server."),
            )
            .attribute(optional_computed("name", T::String, "Name of the origin."))
            .attribute(optional_computed(
                "scheme",
                T::String,
                "Protocol scheme (http or https).",
            ))
            .attribute(optional_computed(
                "cache_by_query_param",
                T::Bool,
                "Whether to cache content based on query parameters.",
            ))
            .attribute(optional_computed(
                "gzip",
                T::Bool,
                "Whether gzip compression is enabled.",
            ))
            .attribute(optional_computed(
                "ttl",
                T::Int,
                "Time to live (TTL) in seconds for cached content.",
            ))
            .attribute(optional_computed(
                "missed_ttl",
                T::Int,
                "TTL in seconds for missed (404/error) responses.",
            ))
            .attribute(optional_computed(
                "connection_timeout",
                T::Int,
                "Connection timeout in seconds.",
            ))
            .attribute(optional_computed(
                "time_to_first_byte_timeout",
                T::Int,
                "Time to first byte timeout in seconds.",
            ))
            .attribute(
                AttributeSchema::new("access_key", T::String)
                    .optional()
                    .sensitive()
                    .with_description("S3 access key (for S3 origins)."),
            )
            .attribute(
                AttributeSchema::new("secret_key", T::String)
                    .optional()
                    .sensitive()
                    .with_description("S3 secret key (for S3 origins)."),
            )
            .attribute(optional_computed(
                "region",
                T::String,
                "S3 region (for S3 origins).",
            ))
            .attribute(optional_computed(
                "signature_version",
                T::String,
                "S3 signature version (for S3 origins).",
            ))
            .attribute(
                AttributeSchema::new("created_at", T::String)
                    .computed()
                    .with_description("When the origin was created."),
            )
            .attribute(
                AttributeSchema::new("updated_at", T::String)
                    .computed()
                    .with_description("When the origin was last updated."),
            )
    }

    async fn create(&self, diags: &mut Diagnostics, planned: &Resource) -> Option<State> {
        let client = require_client(&self.client, diags)?;
        let mut data = OriginModel::from_attributes(&planned.attributes);
        let request = data.to_request();

        log::debug!("Creating origin (request: {:?})", request);

        let origin = match client.create_origin(&request).await {
            Ok(origin) => origin,
            Err(e) => {
                diags.add_error(
                    "Error Creating CacheFly Origin",
                    format!("Could not create origin, unexpected error: {}", e),
                );
                return None;
            }
        };

        log::debug!("Origin created successfully (origin_id: {})", origin.id);

        data.apply_origin(&origin);
        Some(State::existing(planned.id.clone(), data.into_attributes()))
    }

    async fn read(&self, diags: &mut Diagnostics, prior: &State) -> Option<State> {
        let client = require_client(&self.client, diags)?;
        let mut data = OriginModel::from_attributes(&prior.attributes);
        let origin_id = data.id.as_str().unwrap_or_default().to_string();

        log::debug!("Reading origin (origin_id: {})", origin_id);

        let origin = match client.get_origin(&origin_id).await {
            Ok(origin) => origin,
            Err(e) if e.is_not_found() => {
                diags.add_warning(
                    "Origin Not Found",
                    format!(
                        "Origin with ID {} was not found and will be removed from state.",
                        origin_id
                    ),
                );
                return Some(State::not_found(prior.id.clone()));
            }
            Err(e) => {
                diags.add_error(
                    "Error Reading CacheFly Origin",
                    format!("Could not read origin with ID {}: {}", origin_id, e),
                );
                return None;
            }
        };

        data.apply_origin(&origin);
        Some(State::existing(prior.id.clone(), data.into_attributes()))
    }

    async fn update(
        &self,
        diags: &mut Diagnostics,
        prior: &State,
        planned: &Resource,
    ) -> Option<State> {
        let client = require_client(&self.client, diags)?;
        let origin_id = prior.identifier().unwrap_or_default();
        let mut data = OriginModel::from_attributes(&planned.attributes);
        let request = data.to_request();

        log::debug!("Updating origin (origin_id: {}, request: {:?})", origin_id, request);

        let origin = match client.update_origin(origin_id, &request).await {
            Ok(origin) => origin,
            Err(e) => {
                diags.add_error(
                    "Error Updating CacheFly Origin",
                    format!("Could not update origin with ID {}: {}", origin_id, e),
                );
                return None;
            }
        };

        data.apply_origin(&origin);
        Some(State::existing(planned.id.clone(), data.into_attributes()))
    }

    async fn delete(&self, diags: &mut Diagnostics, prior: &State) {
        let Some(client) = require_client(&self.client, diags) else {
            return;
        };
        let origin_id = prior.identifier().unwrap_or_default();

        log::debug!("Deleting origin (origin_id: {})", origin_id);

        if let Err(e) = client.delete_origin(origin_id).await {
            diags.add_error(
                "Error Deleting CacheFly Origin",
                format!("Could not delete origin with ID {}: {}", origin_id, e),
            );
            return;
        }

        log::debug!("Origin deleted successfully (origin_id: {})", origin_id);
    }

    async fn import(
        &self,
        diags: &mut Diagnostics,
        id: &ResourceId,
        remote_id: &str,
    ) -> Option<State> {
        let client = require_client(&self.client, diags)?;

        log::debug!("Importing origin (origin_id: {})", remote_id);

        match client.get_origin(remote_id).await {
            Ok(origin) => Some(State::existing(
                id.clone(),
                OriginModel::from_origin(&origin).into_attributes(),
            )),
            Err(e) => {
                diags.add_error(
                    "Error Importing CacheFly Origin",
                    format!("Could not read origin with ID {}: {}", remote_id, e),
                );
                None
            }
        }
    }
}
