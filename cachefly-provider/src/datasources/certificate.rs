//! cachefly_certificate data source

use async_trait::async_trait;
use cachefly_client::{Certificate, ListCertificatesOptions};
use cachefly_core::diagnostics::Diagnostics;
use cachefly_core::provider::{DataSourceType, type_name};
use cachefly_core::resource::{Resource, State};
use cachefly_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::models::CertificateModel;
use crate::provider::{PROVIDER_TYPE_NAME, SharedClient, require_client};
use crate::resources::certificate::computed_certificate_attributes;

const LOOKUP_PAGE_SIZE: i64 = 100;

/// Looks up a single certificate by id or by common name
pub struct CertificateDataSource {
    client: Option<SharedClient>,
}

impl CertificateDataSource {
    pub fn new(client: Option<SharedClient>) -> Self {
        Self { client }
    }

    /// Page through the search results until a certificate's common name
    /// matches exactly
    async fn find_by_common_name(
        &self,
        diags: &mut Diagnostics,
        common_name: &str,
    ) -> Option<Certificate> {
        let client = require_client(&self.client, diags)?;
        let mut offset = 0;

        loop {
            let opts = ListCertificatesOptions {
                search: common_name.to_string(),
                offset: Some(offset),
                limit: Some(LOOKUP_PAGE_SIZE),
                ..Default::default()
            };
            let response = match client.list_certificates(&opts).await {
                Ok(response) => response,
                Err(e) => {
                    diags.add_error(
                        "Error Reading CacheFly Certificates",
                        format!("Could not list certificates: {}", e),
                    );
                    return None;
                }
            };

            let page_len = response.certificates.len() as i64;
            if let Some(found) = response
                .certificates
                .into_iter()
                .find(|c| c.subject_common_name == common_name)
            {
                return Some(found);
            }

            offset += page_len;
            if page_len == 0 || offset >= response.meta.count {
                break;
            }
        }

        diags.add_attribute_error(
            "subject_common_name",
            "Certificate Not Found",
            format!("No certificate with common name {} exists.", common_name),
        );
        None
    }
}

#[async_trait]
impl DataSourceType for CertificateDataSource {
    fn type_name(&self) -> String {
        type_name(PROVIDER_TYPE_NAME, "certificate")
    }

    fn schema(&self) -> ResourceSchema {
        let schema = ResourceSchema::new(self.type_name())
            .with_description("Look up a CacheFly certificate by id or by subject common name.")
            .attribute(
                AttributeSchema::new("id", AttributeType::String)
                    .optional()
                    .computed()
                    .with_description("The unique identifier of the certificate."),
            )
            .attribute(
                AttributeSchema::new("subject_common_name", AttributeType::String)
                    .optional()
                    .computed()
                    .with_description("The common name (CN) from the certificate's subject."),
            );
        computed_certificate_attributes()
            .into_iter()
            .filter(|a| a.name != "id" && a.name != "subject_common_name")
            .fold(schema, ResourceSchema::attribute)
    }

    async fn read(&self, diags: &mut Diagnostics, config: &Resource) -> Option<State> {
        let data = CertificateModel::from_attributes(&config.attributes);

        let cert = if let Some(id) = data.id.as_str() {
            let client = require_client(&self.client, diags)?;
            log::debug!("Reading certificate data source (certificate_id: {})", id);
            match client.get_certificate(id, "").await {
                Ok(cert) => cert,
                Err(e) => {
                    diags.add_error(
                        "Error Reading CacheFly Certificate",
                        format!("Could not read certificate with ID {}: {}", id, e),
                    );
                    return None;
                }
            }
        } else if let Some(common_name) = data.subject_common_name.as_str() {
            log::debug!(
                "Reading certificate data source (subject_common_name: {})",
                common_name
            );
            self.find_by_common_name(diags, common_name).await?
        } else {
            diags.add_error(
                "Missing Certificate Lookup",
                "Either id or subject_common_name must be set.",
            );
            return None;
        };

        let model = CertificateModel::from_certificate(&cert);
        Some(State::existing(config.id.clone(), model.computed_attributes()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cachefly_core::resource::Value;

    use super::*;
    use crate::testing::MockApi;

    fn mock() -> Arc<MockApi> {
        Arc::new(MockApi::default().with_certificate(Certificate {
            id: "c1".to_string(),
            subject_common_name: "cdn.example.com".to_string(),
            subject_names: vec!["cdn.example.com".to_string()],
            in_use: true,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn read_by_id() {
        let api = mock();
        let ds = CertificateDataSource::new(Some(api.clone()));
        let config = Resource::new("cachefly_certificate", "cdn")
            .with_attribute("id", Value::String("c1".into()));
        let mut diags = Diagnostics::new();

        let state = ds.read(&mut diags, &config).await.unwrap();

        assert!(diags.is_empty());
        assert_eq!(
            state.attributes["subject_common_name"],
            Value::String("cdn.example.com".into())
        );
        assert_eq!(state.attributes["in_use"], Value::Bool(true));
        assert!(!state.attributes.contains_key("certificate_key"));
        assert_eq!(api.calls(), vec!["get_certificate c1"]);
    }

    #[tokio::test]
    async fn read_by_common_name() {
        let api = mock();
        let ds = CertificateDataSource::new(Some(api.clone()));
        let config = Resource::new("cachefly_certificate", "cdn")
            .with_attribute("subject_common_name", Value::String("cdn.example.com".into()));
        let mut diags = Diagnostics::new();

        let state = ds.read(&mut diags, &config).await.unwrap();

        assert_eq!(state.identifier(), Some("c1"));
        assert_eq!(api.calls(), vec!["list_certificates offset=0"]);
    }

    #[tokio::test]
    async fn common_name_match_on_later_page() {
        // Substring matches fill the first page ahead of the exact match
        let api = (0..LOOKUP_PAGE_SIZE)
            .fold(MockApi::default(), |api, n| {
                api.with_certificate(Certificate {
                    id: format!("a{:03}", n),
                    subject_common_name: format!("{}.cdn.example.com", n),
                    ..Default::default()
                })
            })
            .with_certificate(Certificate {
                id: "z1".to_string(),
                subject_common_name: "cdn.example.com".to_string(),
                ..Default::default()
            });
        let api = Arc::new(api);
        let ds = CertificateDataSource::new(Some(api.clone()));
        let config = Resource::new("cachefly_certificate", "cdn")
            .with_attribute("subject_common_name", Value::String("cdn.example.com".into()));
        let mut diags = Diagnostics::new();

        let state = ds.read(&mut diags, &config).await.unwrap();

        assert!(diags.is_empty());
        assert_eq!(state.identifier(), Some("z1"));
        assert_eq!(
            api.calls(),
            vec!["list_certificates offset=0", "list_certificates offset=100"]
        );
    }

    #[tokio::test]
    async fn lookup_stops_after_last_page() {
        let api = Arc::new(MockApi::default().with_certificate(Certificate {
            id: "c2".to_string(),
            subject_common_name: "www.cdn.example.com".to_string(),
            ..Default::default()
        }));
        let ds = CertificateDataSource::new(Some(api.clone()));
        let config = Resource::new("cachefly_certificate", "cdn")
            .with_attribute("subject_common_name", Value::String("cdn.example.com".into()));
        let mut diags = Diagnostics::new();

        assert!(ds.read(&mut diags, &config).await.is_none());
        assert_eq!(diags.errors().next().unwrap().summary, "Certificate Not Found");
        assert_eq!(api.calls(), vec!["list_certificates offset=0"]);
    }

    #[tokio::test]
    async fn unknown_common_name_is_reported() {
        let ds = CertificateDataSource::new(Some(mock()));
        let config = Resource::new("cachefly_certificate", "cdn")
            .with_attribute("subject_common_name", Value::String("other.example.com".into()));
        let mut diags = Diagnostics::new();

        assert!(ds.read(&mut diags, &config).await.is_none());
        assert_eq!(diags.errors().next().unwrap().summary, "Certificate Not Found");
    }

    #[tokio::test]
    async fn lookup_key_is_required() {
        let ds = CertificateDataSource::new(Some(mock()));
        let mut diags = Diagnostics::new();

        let state = ds
            .read(&mut diags, &Resource::new("cachefly_certificate", "cdn"))
            .await;

        assert!(state.is_none());
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "Missing Certificate Lookup"
        );
    }

    #[test]
    fn schema_has_no_key_material() {
        let schema = CertificateDataSource::new(None).schema();
        assert!(schema.get("certificate_key").is_none());
        assert!(schema.get("domains").is_some_and(|a| a.computed));
        assert!(schema.get("id").is_some_and(|a| a.optional));
    }
}
