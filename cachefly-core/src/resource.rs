//! Resource - Representing configured blocks and their state

use std::collections::HashMap;

/// Unique identifier for a configured block
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    /// Full type name (e.g., "cachefly_certificate")
    pub resource_type: String,
    /// Block name given in configuration
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Attribute value
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    /// Unordered collection; equality ignores element order
    Set(Vec<Value>),
    Map(HashMap<String, Value>),
    /// Explicitly absent
    Null,
    /// Not known until apply. Only ever appears in plans.
    Unknown,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => set_eq(a, b),
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Unknown, Value::Unknown) => true,
            _ => false,
        }
    }
}

fn set_eq(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        match b
            .iter()
            .enumerate()
            .position(|(i, other)| !used[i] && item == other)
        {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

impl Value {
    /// String value, or null when empty
    pub fn string_or_null(s: &str) -> Self {
        if s.is_empty() {
            Value::Null
        } else {
            Value::String(s.to_string())
        }
    }

    /// Integer value, or null unless positive
    pub fn positive_int_or_null(n: i64) -> Self {
        if n > 0 { Value::Int(n) } else { Value::Null }
    }

    /// Set of strings
    pub fn string_set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Set(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// True if the value (or anything nested in it) is unknown
    pub fn contains_unknown(&self) -> bool {
        match self {
            Value::Unknown => true,
            Value::List(items) | Value::Set(items) => items.iter().any(Value::contains_unknown),
            Value::Map(map) => map.values().any(Value::contains_unknown),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert from JSON. Non-integral numbers are rejected.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, String> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => return Err(format!("Number '{}' is not an integer", n)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            serde_json::Value::Object(map) => {
                let mut out = HashMap::new();
                for (k, v) in map {
                    out.insert(k.clone(), Value::from_json(v)?);
                }
                Value::Map(out)
            }
        })
    }

    /// Convert to JSON. Unknown values have no JSON form and become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) | Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Null | Value::Unknown => serde_json::Value::Null,
        }
    }
}

/// Attribute map of a block
pub type Attributes = HashMap<String, Value>;

/// Look up a string attribute, treating null and unknown as absent
pub fn get_string<'a>(attributes: &'a Attributes, key: &str) -> Option<&'a str> {
    attributes.get(key).and_then(Value::as_str)
}

/// Desired state declared in configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub attributes: Attributes,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(resource_type, name),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// State recorded for a block after the provider has seen it
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub id: ResourceId,
    pub attributes: Attributes,
    /// Whether the remote object exists
    pub exists: bool,
}

impl State {
    pub fn not_found(id: ResourceId) -> Self {
        Self {
            id,
            attributes: HashMap::new(),
            exists: false,
        }
    }

    pub fn existing(id: ResourceId, attributes: Attributes) -> Self {
        Self {
            id,
            attributes,
            exists: true,
        }
    }

    /// The remote identifier (the `id` attribute)
    pub fn identifier(&self) -> Option<&str> {
        get_string(&self.attributes, "id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_equality_ignores_order() {
        let a = Value::string_set(["a.example.com", "b.example.com"]);
        let b = Value::string_set(["b.example.com", "a.example.com"]);
        assert_eq!(a, b);
        assert_ne!(a, Value::string_set(["a.example.com"]));
        assert_ne!(
            Value::List(vec![Value::Int(1), Value::Int(2)]),
            Value::List(vec![Value::Int(2), Value::Int(1)])
        );
    }

    #[test]
    fn set_equality_counts_duplicates() {
        let a = Value::string_set(["x", "x", "y"]);
        let b = Value::string_set(["x", "y", "y"]);
        assert_ne!(a, b);
    }

    #[test]
    fn zero_values_become_null() {
        assert_eq!(Value::string_or_null(""), Value::Null);
        assert_eq!(Value::string_or_null("us-east-1"), Value::String("us-east-1".into()));
        assert_eq!(Value::positive_int_or_null(0), Value::Null);
        assert_eq!(Value::positive_int_or_null(-5), Value::Null);
        assert_eq!(Value::positive_int_or_null(30), Value::Int(30));
    }

    #[test]
    fn json_conversion() {
        let json = serde_json::json!({
            "name": "origin",
            "ttl": 3600,
            "gzip": true,
            "tags": ["a", "b"],
            "region": null
        });
        let value = Value::from_json(&json).unwrap();
        let Value::Map(map) = &value else {
            panic!("Expected map");
        };
        assert_eq!(map.get("ttl"), Some(&Value::Int(3600)));
        assert_eq!(map.get("region"), Some(&Value::Null));
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn json_rejects_floats() {
        assert!(Value::from_json(&serde_json::json!(1.5)).is_err());
    }

    #[test]
    fn unknown_detection() {
        let v = Value::List(vec![Value::Int(1), Value::Unknown]);
        assert!(v.contains_unknown());
        assert!(!Value::Null.contains_unknown());
        assert_eq!(Value::Unknown.to_json(), serde_json::Value::Null);
    }

    #[test]
    fn state_identifier() {
        let mut attrs = HashMap::new();
        attrs.insert("id".to_string(), Value::String("cert-1".to_string()));
        let state = State::existing(ResourceId::new("cachefly_certificate", "site"), attrs);
        assert_eq!(state.identifier(), Some("cert-1"));
        assert!(State::not_found(ResourceId::new("t", "n")).identifier().is_none());
    }
}
