//! cachefly_certificate resource
//!
//! Certificates are immutable in CacheFly: every configurable attribute
//! requires replacement and update always fails. The API never returns the
//! uploaded certificate, key or password, so those are carried over from
//! the plan on create and from prior state on read.

use async_trait::async_trait;
use cachefly_core::diagnostics::Diagnostics;
use cachefly_core::provider::{ResourceType, type_name};
use cachefly_core::resource::{Resource, ResourceId, State, Value};
use cachefly_core::schema::{AttributeSchema, AttributeType, PlanModifier, ResourceSchema};

use crate::models::CertificateModel;
use crate::provider::{PROVIDER_TYPE_NAME, SharedClient, require_client};

/// Attributes the API reports for a certificate
pub(crate) fn computed_certificate_attributes() -> Vec<AttributeSchema> {
    let string_set = || AttributeType::set(AttributeType::String);
    vec![
        AttributeSchema::new("id", AttributeType::String)
            .computed()
            .with_plan_modifier(PlanModifier::UseStateForUnknown)
            .with_description("The unique identifier of the certificate."),
        AttributeSchema::new("subject_common_name", AttributeType::String)
            .computed()
            .with_description("The common name (CN) from the certificate's subject."),
        AttributeSchema::new("subject_names", string_set())
            .computed()
            .with_description("All subject names from the certificate (including CN and SAN)."),
        AttributeSchema::new("expired", AttributeType::Bool)
            .computed()
            .with_description("Whether the certificate has expired."),
        AttributeSchema::new("expiring", AttributeType::Bool)
            .computed()
            .with_description("Whether the certificate is expiring soon."),
        AttributeSchema::new("in_use", AttributeType::Bool)
            .computed()
            .with_description("Whether the certificate is currently in use by services."),
        AttributeSchema::new("managed", AttributeType::Bool)
            .computed()
            .with_description("Whether this is a CacheFly-managed certificate."),
        AttributeSchema::new("services", string_set())
            .computed()
            .with_description("List of service IDs using this certificate."),
        AttributeSchema::new("domains", string_set())
            .computed()
            .with_description("List of domains covered by this certificate."),
        AttributeSchema::new("not_before", AttributeType::String)
            .computed()
            .with_description("Certificate validity start date (ISO 8601 format)."),
        AttributeSchema::new("not_after", AttributeType::String)
            .computed()
            .with_description("Certificate validity end date (ISO 8601 format)."),
        AttributeSchema::new("created_at", AttributeType::String)
            .computed()
            .with_description("Timestamp when the certificate was uploaded to CacheFly."),
    ]
}

/// Manages TLS certificates uploaded to CacheFly
pub struct CertificateResource {
    client: Option<SharedClient>,
}

impl CertificateResource {
    pub fn new(client: Option<SharedClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceType for CertificateResource {
    fn type_name(&self) -> String {
        type_name(PROVIDER_TYPE_NAME, "certificate")
    }

    fn schema(&self) -> ResourceSchema {
        let schema = ResourceSchema::new(self.type_name())
            .with_description(
                "CacheFly Certificate resource. Manages TLS/SSL certificates for CacheFly services.",
            )
            .attribute(
                AttributeSchema::new("certificate", AttributeType::String)
                    .required()
                    .sensitive()
                    .with_plan_modifier(PlanModifier::RequiresReplace)
                    .with_description(
                        "PEM-encoded certificate content. Required for certificate creation.",
                    ),
            )
            .attribute(
                AttributeSchema::new("certificate_key", AttributeType::String)
                    .required()
                    .sensitive()
                    .with_plan_modifier(PlanModifier::RequiresReplace)
                    .with_description(
                        "PEM-encoded private key for the certificate. Required for certificate creation.",
                    ),
            )
            .attribute(
                AttributeSchema::new("password", AttributeType::String)
                    .optional()
                    .sensitive()
                    .with_plan_modifier(PlanModifier::RequiresReplace)
                    .with_description("Optional password for the private key if it's encrypted."),
            );
        computed_certificate_attributes()
            .into_iter()
            .fold(schema, ResourceSchema::attribute)
    }

    async fn create(&self, diags: &mut Diagnostics, planned: &Resource) -> Option<State> {
        let client = require_client(&self.client, diags)?;
        let mut data = CertificateModel::from_attributes(&planned.attributes);

        let request = data.to_create_request();
        log::debug!(
            "Creating certificate (has_certificate: {}, has_key: {}, has_password: {})",
            !request.certificate.is_empty(),
            !request.certificate_key.is_empty(),
            !request.password.is_empty()
        );

        let cert = match client.create_certificate(&request).await {
            Ok(cert) => cert,
            Err(e) => {
                diags.add_error(
                    "Error Creating CacheFly Certificate",
                    format!("Could not create certificate, unexpected error: {}", e),
                );
                return None;
            }
        };

        log::debug!(
            "Certificate created successfully (certificate_id: {}, subject_common_name: {})",
            cert.id,
            cert.subject_common_name
        );

        data.apply_certificate(&cert);
        Some(State::existing(planned.id.clone(), data.into_attributes()))
    }

    async fn read(&self, diags: &mut Diagnostics, prior: &State) -> Option<State> {
        let client = require_client(&self.client, diags)?;
        let mut data = CertificateModel::from_attributes(&prior.attributes);
        let cert_id = data.id.as_str().unwrap_or_default().to_string();

        log::debug!("Reading certificate (certificate_id: {})", cert_id);

        let cert = match client.get_certificate(&cert_id, "").await {
            Ok(cert) => cert,
            Err(e) if e.is_not_found() => {
                log::debug!("Certificate {} no longer exists", cert_id);
                diags.add_warning(
                    "Certificate Not Found",
                    format!(
                        "Certificate with ID {} was not found and will be removed from state.",
                        cert_id
                    ),
                );
                return Some(State::not_found(prior.id.clone()));
            }
            Err(e) => {
                diags.add_error(
                    "Error Reading CacheFly Certificate",
                    format!("Could not read certificate with ID {}: {}", cert_id, e),
                );
                return None;
            }
        };

        data.apply_certificate(&cert);
        Some(State::existing(prior.id.clone(), data.into_attributes()))
    }

    async fn update(
        &self,
        diags: &mut Diagnostics,
        _prior: &State,
        _planned: &Resource,
    ) -> Option<State> {
        diags.add_error(
            "Certificate Update Not Supported",
            "Certificates cannot be updated. Any changes to certificate content require replacement.",
        );
        None
    }

    async fn delete(&self, diags: &mut Diagnostics, prior: &State) {
        let Some(client) = require_client(&self.client, diags) else {
            return;
        };
        let cert_id = prior.identifier().unwrap_or_default();

        log::debug!("Deleting certificate (certificate_id: {})", cert_id);

        if let Err(e) = client.delete_certificate(cert_id).await {
            diags.add_error(
                "Error Deleting CacheFly Certificate",
                format!("Could not delete certificate with ID {}: {}", cert_id, e),
            );
            return;
        }

        log::debug!("Certificate deleted successfully (certificate_id: {})", cert_id);
    }

    async fn import(
        &self,
        diags: &mut Diagnostics,
        id: &ResourceId,
        remote_id: &str,
    ) -> Option<State> {
        let mut attributes = CertificateModel::from_attributes(&Default::default()).into_attributes();
        attributes.insert("id".to_string(), Value::String(remote_id.to_string()));
        let passthrough = State::existing(id.clone(), attributes);

        diags.add_warning(
            "Certificate Content Not Available",
            "When importing a certificate, the original certificate and private key content \
             cannot be retrieved from the API. You will need to manually set these values in \
             your configuration to match the imported certificate.",
        );

        let state = self.read(diags, &passthrough).await?;
        if !state.exists {
            diags.add_error(
                "Cannot Import Non-Existent Certificate",
                format!("No certificate with ID {} exists.", remote_id),
            );
            return None;
        }
        Some(state)
    }
}
