//! Plan - Planned changes for configured resources
//!
//! Planning compares configuration with prior state, applies the schema's
//! plan modifiers, and produces the attributes the provider is expected to
//! end up with. No side effects occur until the Plan is applied.

use crate::differ::changed_attributes;
use crate::resource::{Attributes, Resource, ResourceId, State, Value};
use crate::schema::{PlanModifier, ResourceSchema};

/// What applying a planned change will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    /// Destroy the remote object, then create a new one
    Replace,
    Delete,
    NoOp,
}

impl Action {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Action::NoOp)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Create => "create",
            Action::Update => "update in-place",
            Action::Replace => "destroy and then create replacement",
            Action::Delete => "destroy",
            Action::NoOp => "no-op",
        };
        write!(f, "{}", s)
    }
}

/// One planned change
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub id: ResourceId,
    pub action: Action,
    pub prior: Option<State>,
    /// Attributes expected after apply. Values the provider decides are `Unknown`.
    pub planned: Attributes,
    /// Configurable attributes that differ from prior state
    pub changed: Vec<String>,
    /// Changed attributes that force replacement
    pub requires_replace: Vec<String>,
}

impl PlannedChange {
    /// Planned attributes as a resource, as handed to create/update
    pub fn planned_resource(&self) -> Resource {
        Resource {
            id: self.id.clone(),
            attributes: self.planned.clone(),
        }
    }
}

/// Plan a configured resource against its prior state
pub fn plan_resource(
    schema: &ResourceSchema,
    prior: Option<&State>,
    config: &Resource,
) -> PlannedChange {
    let config_attrs = schema.coerce(config.attributes.clone());
    let prior = prior.filter(|s| s.exists);

    let Some(prior) = prior else {
        return PlannedChange {
            id: config.id.clone(),
            action: Action::Create,
            prior: None,
            planned: planned_attributes(schema, None, &config_attrs),
            changed: Vec::new(),
            requires_replace: Vec::new(),
        };
    };

    let changed = changed_attributes(schema, &prior.attributes, &config_attrs);
    if changed.is_empty() {
        return PlannedChange {
            id: config.id.clone(),
            action: Action::NoOp,
            prior: Some(prior.clone()),
            planned: prior.attributes.clone(),
            changed,
            requires_replace: Vec::new(),
        };
    }

    let requires_replace: Vec<String> = changed
        .iter()
        .filter(|name| {
            schema
                .get(name)
                .is_some_and(|a| a.has_modifier(PlanModifier::RequiresReplace))
        })
        .cloned()
        .collect();

    let (action, planned) = if requires_replace.is_empty() {
        (
            Action::Update,
            planned_attributes(schema, Some(&prior.attributes), &config_attrs),
        )
    } else {
        (
            Action::Replace,
            planned_attributes(schema, None, &config_attrs),
        )
    };

    PlannedChange {
        id: config.id.clone(),
        action,
        prior: Some(prior.clone()),
        planned,
        changed,
        requires_replace,
    }
}

/// Plan removal of a resource that is no longer configured
pub fn plan_destroy(state: &State) -> PlannedChange {
    PlannedChange {
        id: state.id.clone(),
        action: Action::Delete,
        prior: Some(state.clone()),
        planned: Attributes::new(),
        changed: Vec::new(),
        requires_replace: Vec::new(),
    }
}

/// `prior` is `Some` only for in-place updates, where UseStateForUnknown applies
fn planned_attributes(
    schema: &ResourceSchema,
    prior: Option<&Attributes>,
    config: &Attributes,
) -> Attributes {
    let mut planned = Attributes::new();

    for (name, attr) in &schema.attributes {
        let configured = config.get(name).cloned().unwrap_or(Value::Null);
        let value = if attr.is_configurable() && !configured.is_null() {
            configured
        } else if attr.computed {
            match prior {
                Some(prior) if attr.has_modifier(PlanModifier::UseStateForUnknown) => {
                    prior.get(name).cloned().unwrap_or(Value::Null)
                }
                _ => Value::Unknown,
            }
        } else {
            Value::Null
        };
        planned.insert(name.clone(), value);
    }

    planned
}

/// Ordered collection of planned changes
#[derive(Debug, Clone, Default)]
pub struct Plan {
    changes: Vec<PlannedChange>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, change: PlannedChange) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[PlannedChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes that touch remote objects
    pub fn mutation_count(&self) -> usize {
        self.changes.iter().filter(|c| c.action.is_mutating()).count()
    }

    /// Generate a summary of the Plan for display
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for change in &self.changes {
            match change.action {
                Action::Create => summary.add += 1,
                Action::Update => summary.change += 1,
                Action::Replace => {
                    summary.add += 1;
                    summary.destroy += 1;
                }
                Action::Delete => summary.destroy += 1,
                Action::NoOp => {}
            }
        }
        summary
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub add: usize,
    pub change: usize,
    pub destroy: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plan: {} to add, {} to change, {} to destroy.",
            self.add, self.change, self.destroy
        )
    }
}

/// Render a value for plan output, hiding sensitive content
pub fn format_value(value: &Value, sensitive: bool) -> String {
    match value {
        Value::Unknown => "(known after apply)".to_string(),
        Value::Null => "null".to_string(),
        _ if sensitive => "(sensitive value)".to_string(),
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) | Value::Set(items) => {
            let inner: Vec<String> = items.iter().map(|v| format_value(v, false)).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Map(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let inner: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{} = {}", k, format_value(&map[k], false)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}
