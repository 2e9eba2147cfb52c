//! CacheFly provider - configuration and handler registry

use std::sync::Arc;

use async_trait::async_trait;
use cachefly_client::config::{API_TOKEN_ENV, BASE_URL_ENV};
use cachefly_client::{CacheflyApi, Client, ClientConfig};
use cachefly_core::diagnostics::Diagnostics;
use cachefly_core::provider::{DataSourceType, Provider, ResourceType};
use cachefly_core::resource::{Attributes, Value};
use cachefly_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::datasources::{CertificateDataSource, OriginsDataSource};
use crate::resources::{CertificateResource, OriginResource};

pub const PROVIDER_TYPE_NAME: &str = "cachefly";

/// API client handle shared by every resource and data source
pub type SharedClient = Arc<dyn CacheflyApi>;

/// The CacheFly provider
#[derive(Default)]
pub struct CacheflyProvider {
    client: Option<SharedClient>,
}

impl CacheflyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with an already configured client
    pub fn with_client(client: SharedClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Resolve the client configuration from the provider block, falling back
    /// to the environment
    fn resolve_config(
        diags: &mut Diagnostics,
        config: &Attributes,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<ClientConfig> {
        let api_token = config.get("api_token").cloned().unwrap_or(Value::Null);
        let base_url = config.get("base_url").cloned().unwrap_or(Value::Null);

        if api_token.is_unknown() {
            diags.add_attribute_error(
                "api_token",
                "Unknown CacheFly API Token",
                "The provider cannot create the CacheFly API client as there is an unknown \
                 configuration value for the CacheFly API token.",
            );
            return None;
        }

        let token = match api_token.as_str() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => env(API_TOKEN_ENV).filter(|t| !t.is_empty()).unwrap_or_default(),
        };
        if token.is_empty() {
            diags.add_attribute_error(
                "api_token",
                "Missing CacheFly API Token",
                format!(
                    "The provider cannot create the CacheFly API client as there is a missing \
                     or empty value for the CacheFly API token. Set the api_token value in the \
                     configuration or use the {} environment variable.",
                    API_TOKEN_ENV
                ),
            );
            return None;
        }

        let mut client_config = ClientConfig::new(token);
        match base_url.as_str() {
            Some(url) if !url.is_empty() => client_config = client_config.with_base_url(url),
            _ => {
                if let Some(url) = env(BASE_URL_ENV).filter(|u| !u.is_empty()) {
                    client_config = client_config.with_base_url(url);
                }
            }
        }
        Some(client_config)
    }
}

#[async_trait]
impl Provider for CacheflyProvider {
    fn name(&self) -> &'static str {
        PROVIDER_TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(PROVIDER_TYPE_NAME)
            .with_description("Interact with the CacheFly CDN API.")
            .attribute(
                AttributeSchema::new("api_token", AttributeType::String)
                    .optional()
                    .sensitive()
                    .with_description(format!(
                        "CacheFly API token. May also be provided via the {} environment variable.",
                        API_TOKEN_ENV
                    )),
            )
            .attribute(
                AttributeSchema::new("base_url", AttributeType::String)
                    .optional()
                    .with_description(format!(
                        "CacheFly API base URL. May also be provided via the {} environment variable.",
                        BASE_URL_ENV
                    )),
            )
    }

    async fn configure(&mut self, diags: &mut Diagnostics, config: &Attributes) {
        let Some(client_config) = Self::resolve_config(diags, config, |k| std::env::var(k).ok())
        else {
            return;
        };

        log::debug!("Creating CacheFly client for {}", client_config.base_url);
        match Client::new(client_config) {
            Ok(client) => {
                self.client = Some(Arc::new(client));
                log::info!("Configured CacheFly client");
            }
            Err(e) => diags.add_error(
                "Unable to Create CacheFly API Client",
                format!(
                    "An unexpected error occurred when creating the CacheFly API client: {}",
                    e
                ),
            ),
        }
    }

    fn resources(&self) -> Vec<Box<dyn ResourceType>> {
        vec![
            Box::new(CertificateResource::new(self.client.clone())),
            Box::new(OriginResource::new(self.client.clone())),
        ]
    }

    fn data_sources(&self) -> Vec<Box<dyn DataSourceType>> {
        vec![
            Box::new(OriginsDataSource::new(self.client.clone())),
            Box::new(CertificateDataSource::new(self.client.clone())),
        ]
    }
}

/// The configured client, or an error diagnostic when the provider was never configured
pub(crate) fn require_client<'a>(
    client: &'a Option<SharedClient>,
    diags: &mut Diagnostics,
) -> Option<&'a dyn CacheflyApi> {
    match client {
        Some(client) => Some(client.as_ref()),
        None => {
            diags.add_error(
                "Unconfigured CacheFly Client",
                "Expected a configured CacheFly client. Please report this issue to the \
                 provider developers.",
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::testing::MockApi;

    fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| vars.get(k).cloned()
    }

    #[test]
    fn config_token_takes_precedence() {
        let mut diags = Diagnostics::new();
        let mut config = Attributes::new();
        config.insert("api_token".to_string(), Value::String("from-config".into()));

        let resolved = CacheflyProvider::resolve_config(
            &mut diags,
            &config,
            env_from(&[
                (API_TOKEN_ENV, "from-env"),
                (BASE_URL_ENV, "https://staging.example.com/api/2.5"),
            ]),
        )
        .unwrap();

        assert!(diags.is_empty());
        assert_eq!(resolved.api_token, "from-config");
        assert_eq!(resolved.base_url, "https://staging.example.com/api/2.5");
    }

    #[test]
    fn token_falls_back_to_env() {
        let mut diags = Diagnostics::new();
        let resolved = CacheflyProvider::resolve_config(
            &mut diags,
            &Attributes::new(),
            env_from(&[(API_TOKEN_ENV, "from-env")]),
        )
        .unwrap();
        assert_eq!(resolved.api_token, "from-env");
        assert_eq!(resolved.base_url, cachefly_client::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn missing_token_is_reported() {
        let mut diags = Diagnostics::new();
        let mut config = Attributes::new();
        config.insert("api_token".to_string(), Value::String(String::new()));

        let resolved = CacheflyProvider::resolve_config(&mut diags, &config, env_from(&[]));

        assert!(resolved.is_none());
        let error = diags.errors().next().unwrap();
        assert_eq!(error.summary, "Missing CacheFly API Token");
        assert_eq!(error.attribute.as_deref(), Some("api_token"));
    }

    #[tokio::test]
    async fn configure_builds_client() {
        let mut provider = CacheflyProvider::new();
        let mut diags = Diagnostics::new();
        let mut config = Attributes::new();
        config.insert("api_token".to_string(), Value::String("token".into()));
        config.insert(
            "base_url".to_string(),
            Value::String("http://localhost:8080".into()),
        );

        provider.configure(&mut diags, &config).await;

        assert!(!diags.has_error(), "{}", diags);
        assert!(provider.is_configured());
    }

    #[tokio::test]
    async fn configure_rejects_invalid_base_url() {
        let mut provider = CacheflyProvider::new();
        let mut diags = Diagnostics::new();
        let mut config = Attributes::new();
        config.insert("api_token".to_string(), Value::String("token".into()));
        config.insert("base_url".to_string(), Value::String("ftp://nope".into()));

        provider.configure(&mut diags, &config).await;

        assert!(!provider.is_configured());
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "Unable to Create CacheFly API Client"
        );
    }

    #[test]
    fn registers_handlers_by_full_type_name() {
        let provider = CacheflyProvider::with_client(Arc::new(MockApi::default()));
        assert!(provider.resource("cachefly_certificate").is_ok());
        assert!(provider.resource("cachefly_origin").is_ok());
        assert!(provider.data_source("cachefly_origins").is_ok());
        assert!(provider.data_source("cachefly_certificate").is_ok());
        assert!(provider.resource("cachefly_origins").is_err());
    }

    #[test]
    fn unconfigured_client_is_reported() {
        let mut diags = Diagnostics::new();
        assert!(require_client(&None, &mut diags).is_none());
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "Unconfigured CacheFly Client"
        );
    }

    #[tokio::test]
    async fn certificate_lifecycle_through_interpreter() {
        use cachefly_core::interpreter::{ApplyOutcome, Interpreter};
        use cachefly_core::plan::{Action, Plan, plan_resource};
        use cachefly_core::resource::Resource;

        let api = Arc::new(MockApi::default());
        let provider = CacheflyProvider::with_client(api.clone());
        let schema = provider.resource("cachefly_certificate").unwrap().schema();
        let config = Resource::new("cachefly_certificate", "site")
            .with_attribute("certificate", Value::String("cert-v1".into()))
            .with_attribute("certificate_key", Value::String("key".into()));

        let mut plan = Plan::new();
        plan.add(plan_resource(&schema, None, &config));
        let result = Interpreter::new(&provider).apply(&plan).await;
        assert!(result.is_success());
        let Some(Ok(ApplyOutcome::Created { state })) = result.outcomes.into_iter().next() else {
            panic!("certificate should be created");
        };
        assert_eq!(state.identifier(), Some("cert-1"));

        let unchanged = plan_resource(&schema, Some(&state), &config);
        assert_eq!(unchanged.action, Action::NoOp);

        let rotated = config.with_attribute("certificate", Value::String("cert-v2".into()));
        let change = plan_resource(&schema, Some(&state), &rotated);
        assert_eq!(change.action, Action::Replace);
        assert_eq!(change.requires_replace, vec!["certificate".to_string()]);

        let mut plan = Plan::new();
        plan.add(change);
        let result = Interpreter::new(&provider).apply(&plan).await;
        assert!(result.is_success());
        assert_eq!(
            api.calls(),
            vec![
                "create_certificate",
                "delete_certificate cert-1",
                "create_certificate"
            ]
        );
    }
}
