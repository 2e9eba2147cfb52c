//! Schema - Define type schemas for resources and data sources
//!
//! Every resource and data source declares its attributes here: their types,
//! whether configuration must or may set them, whether the provider computes
//! them, whether they are sensitive, and how planning treats changes to them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::resource::{Attributes, Value};

/// Attribute type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// Object with a fixed set of typed fields
    Object(BTreeMap<String, AttributeType>),
}

impl AttributeType {
    pub fn list(inner: AttributeType) -> Self {
        AttributeType::List(Box::new(inner))
    }

    pub fn set(inner: AttributeType) -> Self {
        AttributeType::Set(Box::new(inner))
    }

    pub fn map(inner: AttributeType) -> Self {
        AttributeType::Map(Box::new(inner))
    }

    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, AttributeType)>,
        S: Into<String>,
    {
        AttributeType::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Check if a value conforms to this type. Null and unknown conform to every type.
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (_, Value::Null | Value::Unknown) => Ok(()),
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (
                AttributeType::List(inner) | AttributeType::Set(inner),
                Value::List(items) | Value::Set(items),
            ) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Object(fields), Value::Map(map)) => {
                for (k, v) in map {
                    let field = fields
                        .get(k)
                        .ok_or_else(|| TypeError::UnknownAttribute { name: k.clone() })?;
                    field.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    /// Reshape a decoded value into this type: arrays become sets where the
    /// schema says set, and missing object fields become null.
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (AttributeType::Set(inner), Value::List(items) | Value::Set(items)) => {
                Value::Set(items.into_iter().map(|v| inner.coerce(v)).collect())
            }
            (AttributeType::List(inner), Value::List(items) | Value::Set(items)) => {
                Value::List(items.into_iter().map(|v| inner.coerce(v)).collect())
            }
            (AttributeType::Map(inner), Value::Map(map)) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, inner.coerce(v)))
                    .collect(),
            ),
            (AttributeType::Object(fields), Value::Map(mut map)) => {
                let mut out = HashMap::new();
                for (name, field) in fields {
                    let v = map.remove(name).unwrap_or(Value::Null);
                    out.insert(name.clone(), field.coerce(v));
                }
                // Leave unexpected fields in place so validation can report them
                out.extend(map);
                Value::Map(out)
            }
            (_, v) => v,
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Set(inner) => format!("Set<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Object(_) => "Object".to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Attribute '{name}' is computed by the provider and cannot be set")]
    ComputedNotSettable { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

impl TypeError {
    /// Top-level attribute this error is about, if any
    pub fn attribute(&self) -> Option<&str> {
        match self {
            TypeError::MissingRequired { name }
            | TypeError::ComputedNotSettable { name }
            | TypeError::UnknownAttribute { name } => Some(name),
            _ => None,
        }
    }
}

impl Value {
    fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Set(_) => "Set".to_string(),
            Value::Map(_) => "Map".to_string(),
            Value::Null => "Null".to_string(),
            Value::Unknown => "Unknown".to_string(),
        }
    }
}

/// Marker written in place of sensitive values
pub const REDACTED: &str = "(sensitive)";

fn redact_fields(value: &Value, fields: &[String]) -> Value {
    match value {
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(k, v)| {
                    let v = if fields.contains(k) && !v.is_null() {
                        Value::String(REDACTED.to_string())
                    } else {
                        v.clone()
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::List(items) => Value::List(items.iter().map(|v| redact_fields(v, fields)).collect()),
        Value::Set(items) => Value::Set(items.iter().map(|v| redact_fields(v, fields)).collect()),
        other => other.clone(),
    }
}

/// Planning behavior attached to an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// Changing the attribute destroys and recreates the remote object
    RequiresReplace,
    /// Keep the prior state value instead of marking it unknown on update
    UseStateForUnknown,
}

/// Attribute schema
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSchema {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
    /// Sensitive fields inside object values (or inside each object of a list)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sensitive_fields: Vec<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            description: None,
            plan_modifiers: Vec::new(),
            sensitive_fields: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifiers.push(modifier);
        self
    }

    pub fn with_sensitive_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Copy of `value` with sensitive content replaced by a marker string.
    /// Null values stay null so absence remains visible.
    pub fn redact(&self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        if self.sensitive {
            return Value::String(REDACTED.to_string());
        }
        if self.sensitive_fields.is_empty() {
            return value.clone();
        }
        redact_fields(value, &self.sensitive_fields)
    }

    /// Whether configuration may set this attribute
    pub fn is_configurable(&self) -> bool {
        self.required || self.optional
    }

    pub fn has_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }
}

/// Schema of a resource, data source or provider configuration block
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSchema {
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: u32,
    pub attributes: BTreeMap<String, AttributeSchema>,
}

impl ResourceSchema {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            description: None,
            version: 0,
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    /// Whether the attribute is declared sensitive
    pub fn is_sensitive(&self, name: &str) -> bool {
        self.attributes.get(name).is_some_and(|a| a.sensitive)
    }

    /// Attributes with sensitive content redacted, for display
    pub fn redact(&self, attributes: &Attributes) -> Attributes {
        attributes
            .iter()
            .map(|(k, v)| {
                let v = match self.attributes.get(k) {
                    Some(schema) => schema.redact(v),
                    None => v.clone(),
                };
                (k.clone(), v)
            })
            .collect()
    }

    /// Reshape decoded attributes to the schema: every declared attribute
    /// is present (null when absent) and values take the declared shape.
    pub fn coerce(&self, mut attributes: Attributes) -> Attributes {
        let mut out = HashMap::new();
        for (name, schema) in &self.attributes {
            let value = attributes.remove(name).unwrap_or(Value::Null);
            out.insert(name.clone(), schema.attr_type.coerce(value));
        }
        out.extend(attributes);
        out
    }

    /// Validate configuration attributes
    pub fn validate(&self, attributes: &Attributes) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        for (name, schema) in &self.attributes {
            let value = attributes.get(name).unwrap_or(&Value::Null);
            if schema.required && value.is_null() {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
            if !schema.is_configurable() && !value.is_null() {
                errors.push(TypeError::ComputedNotSettable { name: name.clone() });
            }
        }

        for (name, value) in attributes {
            match self.attributes.get(name) {
                Some(schema) => {
                    if let Err(e) = schema.attr_type.validate(value) {
                        errors.push(TypeError::MapValueError {
                            key: name.clone(),
                            inner: Box::new(e),
                        });
                    }
                }
                None => errors.push(TypeError::UnknownAttribute { name: name.clone() }),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate_like() -> ResourceSchema {
        ResourceSchema::new("test_certificate")
            .attribute(
                AttributeSchema::new("id", AttributeType::String)
                    .computed()
                    .with_plan_modifier(PlanModifier::UseStateForUnknown),
            )
            .attribute(
                AttributeSchema::new("certificate", AttributeType::String)
                    .required()
                    .sensitive()
                    .with_plan_modifier(PlanModifier::RequiresReplace),
            )
            .attribute(AttributeSchema::new("password", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new("domains", AttributeType::set(AttributeType::String))
                    .computed(),
            )
    }

    #[test]
    fn validate_string_type() {
        let t = AttributeType::String;
        assert!(t.validate(&Value::String("hello".to_string())).is_ok());
        assert!(t.validate(&Value::Null).is_ok());
        assert!(t.validate(&Value::Int(42)).is_err());
    }

    #[test]
    fn validate_nested_object_list() {
        let t = AttributeType::list(AttributeType::object([
            ("id", AttributeType::String),
            ("ttl", AttributeType::Int),
        ]));
        let mut item = HashMap::new();
        item.insert("id".to_string(), Value::String("o1".to_string()));
        item.insert("ttl".to_string(), Value::Int(60));
        assert!(t.validate(&Value::List(vec![Value::Map(item.clone())])).is_ok());

        item.insert("ttl".to_string(), Value::Bool(true));
        assert!(t.validate(&Value::List(vec![Value::Map(item)])).is_err());
    }

    #[test]
    fn valid_configuration() {
        let schema = certificate_like();
        let mut attrs = HashMap::new();
        attrs.insert(
            "certificate".to_string(),
            Value::String("-----BEGIN CERTIFICATE-----".to_string()),
        );
        assert!(schema.validate(&attrs).is_ok());
    }

    #[test]
    fn missing_required_attribute() {
        let schema = certificate_like();
        let mut attrs = HashMap::new();
        attrs.insert("certificate".to_string(), Value::Null);
        let errors = schema.validate(&attrs).unwrap_err();
        assert!(matches!(
            &errors[0],
            TypeError::MissingRequired { name } if name == "certificate"
        ));
    }

    #[test]
    fn computed_attribute_cannot_be_set() {
        let schema = certificate_like();
        let mut attrs = HashMap::new();
        attrs.insert("certificate".to_string(), Value::String("pem".to_string()));
        attrs.insert("id".to_string(), Value::String("abc".to_string()));
        let errors = schema.validate(&attrs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].attribute(), Some("id"));
    }

    #[test]
    fn unknown_attribute_rejected() {
        let schema = certificate_like();
        let mut attrs = HashMap::new();
        attrs.insert("certificate".to_string(), Value::String("pem".to_string()));
        attrs.insert("colour".to_string(), Value::String("red".to_string()));
        assert!(schema.validate(&attrs).is_err());
    }

    #[test]
    fn coerce_fills_nulls_and_sets() {
        let schema = certificate_like();
        let mut attrs = HashMap::new();
        attrs.insert(
            "domains".to_string(),
            Value::List(vec![Value::String("a".to_string())]),
        );
        let coerced = schema.coerce(attrs);
        assert_eq!(coerced.get("password"), Some(&Value::Null));
        assert!(matches!(coerced.get("domains"), Some(Value::Set(_))));
        assert_eq!(coerced.len(), 4);
    }

    #[test]
    fn schema_serializes_sensitivity() {
        let json = serde_json::to_value(certificate_like()).unwrap();
        assert_eq!(json["attributes"]["certificate"]["sensitive"], true);
        assert_eq!(
            json["attributes"]["certificate"]["plan_modifiers"][0],
            "requires_replace"
        );
        assert_eq!(json["attributes"]["domains"]["type"]["set"], "string");
    }

    #[test]
    fn redact_hides_sensitive_values() {
        let schema = certificate_like().attribute(
            AttributeSchema::new(
                "origins",
                AttributeType::list(AttributeType::object([
                    ("host", AttributeType::String),
                    ("secret_key", AttributeType::String),
                ])),
            )
            .computed()
            .with_sensitive_fields(["secret_key"]),
        );

        let mut origin = HashMap::new();
        origin.insert("host".to_string(), Value::String("o.example.com".to_string()));
        origin.insert("secret_key".to_string(), Value::String("shh".to_string()));
        let mut attrs = HashMap::new();
        attrs.insert("certificate".to_string(), Value::String("pem".to_string()));
        attrs.insert("password".to_string(), Value::Null);
        attrs.insert("origins".to_string(), Value::List(vec![Value::Map(origin)]));

        let redacted = schema.redact(&attrs);
        assert_eq!(redacted["certificate"], Value::String(REDACTED.to_string()));
        assert_eq!(redacted["password"], Value::Null);
        let Value::List(items) = &redacted["origins"] else {
            panic!("origins should stay a list");
        };
        let Value::Map(origin) = &items[0] else {
            panic!("origin should stay an object");
        };
        assert_eq!(origin["secret_key"], Value::String(REDACTED.to_string()));
        assert_eq!(origin["host"], Value::String("o.example.com".to_string()));
    }
}
