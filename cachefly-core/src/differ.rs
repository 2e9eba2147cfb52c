//! Differ - Compare configuration with prior state
//!
//! Only attributes that configuration controls take part in the comparison.
//! Computed values are owned by the provider, and an optional+computed
//! attribute left unset in configuration keeps whatever the provider chose.

use crate::resource::{Attributes, Value};
use crate::schema::ResourceSchema;

/// Find configurable attributes whose configured value differs from prior state
pub fn changed_attributes(
    schema: &ResourceSchema,
    prior: &Attributes,
    config: &Attributes,
) -> Vec<String> {
    let mut changed = Vec::new();

    for (name, attr) in &schema.attributes {
        if !attr.is_configurable() {
            continue;
        }

        let desired = config.get(name).unwrap_or(&Value::Null);
        if attr.computed && desired.is_null() {
            continue;
        }

        let current = prior.get(name).unwrap_or(&Value::Null);
        if desired != current {
            changed.push(name.clone());
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeSchema, AttributeType};
    use std::collections::HashMap;

    fn schema() -> ResourceSchema {
        ResourceSchema::new("test_origin")
            .attribute(AttributeSchema::new("id", AttributeType::String).computed())
            .attribute(AttributeSchema::new("host", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("ttl", AttributeType::Int)
                    .optional()
                    .computed(),
            )
            .attribute(AttributeSchema::new("name", AttributeType::String).optional())
    }

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>()
    }

    #[test]
    fn no_change_when_same() {
        let prior = attrs(&[
            ("id", Value::String("o1".into())),
            ("host", Value::String("example.com".into())),
            ("ttl", Value::Int(3600)),
        ]);
        let config = attrs(&[("host", Value::String("example.com".into()))]);
        assert!(changed_attributes(&schema(), &prior, &config).is_empty());
    }

    #[test]
    fn change_when_different() {
        let prior = attrs(&[
            ("host", Value::String("example.com".into())),
            ("ttl", Value::Int(3600)),
        ]);
        let config = attrs(&[
            ("host", Value::String("example.org".into())),
            ("ttl", Value::Int(60)),
        ]);
        let changed = changed_attributes(&schema(), &prior, &config);
        assert_eq!(changed, vec!["host".to_string(), "ttl".to_string()]);
    }

    #[test]
    fn removing_optional_value_is_a_change() {
        let prior = attrs(&[
            ("host", Value::String("example.com".into())),
            ("name", Value::String("primary".into())),
        ]);
        let config = attrs(&[("host", Value::String("example.com".into()))]);
        assert_eq!(
            changed_attributes(&schema(), &prior, &config),
            vec!["name".to_string()]
        );
    }
}
