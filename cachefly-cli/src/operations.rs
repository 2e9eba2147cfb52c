//! Provider-facing steps shared by the commands: validation, refresh,
//! planning and recording apply results into the state file.

use std::collections::HashMap;

use cachefly_core::diagnostics::Diagnostics;
use cachefly_core::interpreter::{ApplyOutcome, ApplyResult};
use cachefly_core::plan::{Plan, plan_destroy, plan_resource};
use cachefly_core::provider::Provider;
use cachefly_core::resource::{Attributes, Resource, State};
use cachefly_core::schema::ResourceSchema;
use cachefly_state::StateFile;

/// Schemas of every resource type, keyed by type name
pub fn resource_schemas(provider: &dyn Provider) -> HashMap<String, ResourceSchema> {
    provider
        .resources()
        .iter()
        .map(|r| (r.type_name(), r.schema()))
        .collect()
}

/// Check provider, resource and data source blocks against their schemas
pub fn validate_config(
    provider: &dyn Provider,
    provider_config: &Attributes,
    resources: &[Resource],
    data: &[Resource],
) -> Result<(), String> {
    let mut all_errors = Vec::new();

    if let Err(errors) = provider.schema().validate(provider_config) {
        for error in errors {
            all_errors.push(format!("provider: {}", error));
        }
    }

    for resource in resources {
        match provider.resource(&resource.id.resource_type) {
            Ok(handler) => {
                if let Err(errors) = handler.schema().validate(&resource.attributes) {
                    for error in errors {
                        all_errors.push(format!("{}: {}", resource.id, error));
                    }
                }
            }
            Err(e) => all_errors.push(format!("{}: {}", resource.id, e)),
        }
    }

    for block in data {
        match provider.data_source(&block.id.resource_type) {
            Ok(handler) => {
                if let Err(errors) = handler.schema().validate(&block.attributes) {
                    for error in errors {
                        all_errors.push(format!("data {}: {}", block.id, error));
                    }
                }
            }
            Err(e) => all_errors.push(format!("data {}: {}", block.id, e)),
        }
    }

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(format!("Validation failed:\n  {}", all_errors.join("\n  ")))
    }
}

/// Read the current remote state of every resource in the state file.
///
/// Resources that no longer exist come back as not-found states. A read
/// that fails leaves its resource out and records the error in `diags`.
pub async fn refresh(
    provider: &dyn Provider,
    state_file: &StateFile,
    diags: &mut Diagnostics,
) -> Result<Vec<State>, String> {
    let mut current = Vec::new();

    for stored in &state_file.resources {
        let handler = provider
            .resource(&stored.resource_type)
            .map_err(|e| e.to_string())?;
        let prior = stored
            .to_state(&handler.schema())
            .map_err(|e| e.to_string())?;

        log::debug!("Refreshing {}", prior.id);
        let mut read_diags = Diagnostics::new();
        match handler.read(&mut read_diags, &prior).await {
            Some(state) => current.push(state),
            None if !read_diags.has_error() => current.push(State::not_found(prior.id.clone())),
            None => {}
        }
        diags.extend(read_diags);
    }

    Ok(current)
}

/// Plan configured resources against their current state. Resources that
/// exist but are no longer configured are planned for deletion.
pub fn build_plan(
    provider: &dyn Provider,
    resources: &[Resource],
    current: &[State],
) -> Result<Plan, String> {
    let mut plan = Plan::new();

    for resource in resources {
        let handler = provider
            .resource(&resource.id.resource_type)
            .map_err(|e| e.to_string())?;
        let prior = current.iter().find(|s| s.id == resource.id);
        plan.add(plan_resource(&handler.schema(), prior, resource));
    }

    for state in current.iter().filter(|s| s.exists) {
        if !resources.iter().any(|r| r.id == state.id) {
            plan.add(plan_destroy(state));
        }
    }

    Ok(plan)
}

/// Plan deletion of every resource that still exists
pub fn build_destroy_plan(current: &[State]) -> Plan {
    let mut plan = Plan::new();
    for state in current.iter().filter(|s| s.exists) {
        plan.add(plan_destroy(state));
    }
    plan
}

/// Write successful outcomes into the state file
pub fn record_outcomes(state_file: &mut StateFile, result: &ApplyResult) {
    for outcome in result.outcomes.iter().flatten() {
        match outcome {
            ApplyOutcome::Created { state } | ApplyOutcome::Updated { state } => {
                state_file.record(state);
            }
            ApplyOutcome::Deleted { id } => {
                state_file.remove(id);
            }
            ApplyOutcome::Unchanged { .. } | ApplyOutcome::Skipped { .. } => {}
        }
    }
}

/// Read every data source block and return its attributes as JSON, with
/// sensitive values redacted
pub async fn read_data_sources(
    provider: &dyn Provider,
    blocks: &[Resource],
    diags: &mut Diagnostics,
) -> Result<serde_json::Map<String, serde_json::Value>, String> {
    let mut out = serde_json::Map::new();

    for block in blocks {
        let handler = provider
            .data_source(&block.id.resource_type)
            .map_err(|e| e.to_string())?;
        let schema = handler.schema();
        let config = Resource {
            id: block.id.clone(),
            attributes: schema.coerce(block.attributes.clone()),
        };

        log::debug!("Reading data source {}", block.id);
        let mut read_diags = Diagnostics::new();
        let state = handler.read(&mut read_diags, &config).await;
        let failed = read_diags.has_error();
        diags.extend(read_diags);

        match state {
            Some(state) if !failed => {
                let attributes: serde_json::Map<String, serde_json::Value> = schema
                    .redact(&state.attributes)
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                out.insert(block.id.to_string(), serde_json::Value::Object(attributes));
            }
            _ => return Err(format!("Failed to read data source {}", block.id)),
        }
    }

    Ok(out)
}
