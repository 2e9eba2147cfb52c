//! Terminal output for plans, apply results and diagnostics

use std::collections::HashMap;

use cachefly_core::diagnostics::{Diagnostics, Severity};
use cachefly_core::interpreter::{ApplyOutcome, ApplyResult};
use cachefly_core::plan::{Action, Plan, PlannedChange, format_value};
use cachefly_core::resource::Value;
use cachefly_core::schema::ResourceSchema;
use colored::Colorize;

pub fn print_diagnostics(diags: &Diagnostics) {
    for diag in diags.iter() {
        let label = match diag.severity {
            Severity::Error => "Error:".red().bold(),
            Severity::Warning => "Warning:".yellow().bold(),
        };
        match &diag.attribute {
            Some(attr) => println!("{} {} (attribute \"{}\")", label, diag.summary, attr),
            None => println!("{} {}", label, diag.summary),
        }
        if !diag.detail.is_empty() {
            println!("  {}", diag.detail);
        }
        println!();
    }
}

pub fn print_plan(plan: &Plan, schemas: &HashMap<String, ResourceSchema>) {
    if plan.mutation_count() == 0 {
        println!("{}", "No changes. Infrastructure is up-to-date.".green());
        return;
    }

    println!("{}", "Execution Plan:".cyan().bold());
    println!();

    for change in plan.changes().iter().filter(|c| c.action.is_mutating()) {
        println!(
            "  {} {} ({})",
            action_symbol(change.action),
            change.id.to_string().bold(),
            change.action
        );
        let schema = schemas.get(&change.id.resource_type);
        for line in attribute_lines(change, schema) {
            println!("      {}", line);
        }
    }

    println!();
    println!("{}", plan.summary());
}

fn action_symbol(action: Action) -> colored::ColoredString {
    match action {
        Action::Create => "+".green().bold(),
        Action::Update => "~".yellow().bold(),
        Action::Replace => "-/+".magenta().bold(),
        Action::Delete => "-".red().bold(),
        Action::NoOp => " ".normal(),
    }
}

/// Attribute detail for one change: every planned value for a create, the
/// changed values for an update or replace, nothing for a delete
fn attribute_lines(change: &PlannedChange, schema: Option<&ResourceSchema>) -> Vec<String> {
    let sensitive = |name: &str| schema.is_some_and(|s| s.is_sensitive(name));

    match change.action {
        Action::Create => {
            let mut names: Vec<&String> = change
                .planned
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, _)| k)
                .collect();
            names.sort();
            names
                .into_iter()
                .map(|name| {
                    format!(
                        "{} = {}",
                        name,
                        format_value(&change.planned[name], sensitive(name))
                    )
                })
                .collect()
        }
        Action::Update | Action::Replace => change
            .changed
            .iter()
            .map(|name| {
                let prior = change
                    .prior
                    .as_ref()
                    .and_then(|p| p.attributes.get(name))
                    .unwrap_or(&Value::Null);
                let planned = change.planned.get(name).unwrap_or(&Value::Null);
                let mut line = format!(
                    "{}: {} -> {}",
                    name,
                    format_value(prior, sensitive(name)),
                    format_value(planned, sensitive(name))
                );
                if change.requires_replace.contains(name) {
                    line.push_str(&format!(" {}", "# forces replacement".red()));
                }
                line
            })
            .collect(),
        Action::Delete | Action::NoOp => Vec::new(),
    }
}

/// Diagnostics carried by the failed changes of an apply
pub fn failure_diagnostics(result: &ApplyResult) -> Diagnostics {
    let mut diags = Diagnostics::new();
    for e in result.outcomes.iter().filter_map(|o| o.as_ref().err()) {
        diags.extend(e.diagnostics.clone());
    }
    diags
}

pub fn format_outcome(outcome: &ApplyOutcome) -> String {
    match outcome {
        ApplyOutcome::Created { state } => format!("Create {}", state.id),
        ApplyOutcome::Updated { state } => format!("Update {}", state.id),
        ApplyOutcome::Deleted { id } => format!("Delete {}", id),
        ApplyOutcome::Unchanged { id } => format!("Unchanged {}", id),
        ApplyOutcome::Skipped { id, reason } => format!("Skip {} ({})", id, reason),
    }
}

#[cfg(test)]
mod tests {
    use cachefly_core::plan::plan_resource;
    use cachefly_core::provider::ProviderError;
    use cachefly_core::resource::{Attributes, Resource, ResourceId, State};
    use cachefly_core::schema::{AttributeSchema, AttributeType, PlanModifier};

    use super::*;

    fn schema() -> ResourceSchema {
        ResourceSchema::new("cachefly_certificate")
            .attribute(AttributeSchema::new("id", AttributeType::String).computed())
            .attribute(
                AttributeSchema::new("certificate_key", AttributeType::String)
                    .required()
                    .sensitive()
                    .with_plan_modifier(PlanModifier::RequiresReplace),
            )
            .attribute(AttributeSchema::new("password", AttributeType::String).optional())
    }

    fn config(key: &str) -> Resource {
        Resource::new("cachefly_certificate", "site")
            .with_attribute("certificate_key", Value::String(key.to_string()))
    }

    #[test]
    fn create_lists_planned_values() {
        let schema = schema();
        let change = plan_resource(&schema, None, &config("KEY"));
        let lines = attribute_lines(&change, Some(&schema));
        assert_eq!(
            lines,
            vec![
                "certificate_key = (sensitive value)".to_string(),
                "id = (known after apply)".to_string(),
            ]
        );
    }

    #[test]
    fn replace_marks_forcing_attribute() {
        let schema = schema();
        let mut attributes = Attributes::new();
        attributes.insert("id".to_string(), Value::String("cert-1".to_string()));
        attributes.insert("certificate_key".to_string(), Value::String("OLD".to_string()));
        let prior = State::existing(ResourceId::new("cachefly_certificate", "site"), attributes);

        let change = plan_resource(&schema, Some(&prior), &config("NEW"));
        assert_eq!(change.action, Action::Replace);

        let lines = attribute_lines(&change, Some(&schema));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("certificate_key: (sensitive value) -> (sensitive value)"));
        assert!(lines[0].contains("forces replacement"));
        assert!(!lines[0].contains("OLD"));
    }

    #[test]
    fn outcomes_name_the_resource() {
        let id = ResourceId::new("cachefly_origin", "web");
        assert_eq!(
            format_outcome(&ApplyOutcome::Deleted { id: id.clone() }),
            "Delete cachefly_origin.web"
        );
        assert_eq!(
            format_outcome(&ApplyOutcome::Created {
                state: State::existing(id, Attributes::new())
            }),
            "Create cachefly_origin.web"
        );
    }

    #[test]
    fn failed_outcomes_keep_their_warnings() {
        let mut diags = Diagnostics::new();
        diags.add_warning("Secret Key Not Returned", "kept from state");
        diags.add_error("Error Updating Origin", "500 Internal Server Error");
        let id = ResourceId::new("cachefly_origin", "web");
        let result = ApplyResult {
            outcomes: vec![
                Ok(ApplyOutcome::Unchanged { id: id.clone() }),
                Err(ProviderError::from_diagnostics(diags).for_resource(id)),
            ],
            warnings: Diagnostics::new(),
            success_count: 0,
            failure_count: 1,
        };

        let collected = failure_diagnostics(&result);
        assert_eq!(collected.len(), 2);
        assert_eq!(
            collected.warnings().next().unwrap().summary,
            "Secret Key Not Returned"
        );
    }
}
