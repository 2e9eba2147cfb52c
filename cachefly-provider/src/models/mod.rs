//! Models - Local structs decoded from configuration and state
//!
//! Each model holds one field per schema attribute and knows how to convert
//! itself into API requests and how to absorb API responses.

pub mod certificate;
pub mod origin;
pub mod origins;

pub use certificate::CertificateModel;
pub use origin::OriginModel;
pub use origins::OriginsDataSourceModel;

use cachefly_core::resource::{Attributes, Value};

/// Attribute value, null when absent
pub(crate) fn attr(attributes: &Attributes, key: &str) -> Value {
    attributes.get(key).cloned().unwrap_or(Value::Null)
}

/// Known string value. Null and unknown yield `None`.
pub(crate) fn known_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Known string value, or empty
pub(crate) fn string_or_empty(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

pub(crate) fn known_int(value: &Value) -> Option<i64> {
    value.as_int()
}

pub(crate) fn known_bool(value: &Value) -> Option<bool> {
    value.as_bool()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_null_are_not_known() {
        assert_eq!(known_string(&Value::Unknown), None);
        assert_eq!(known_string(&Value::Null), None);
        assert_eq!(string_or_empty(&Value::Null), "");
        assert_eq!(known_int(&Value::Int(3)), Some(3));
        assert_eq!(known_bool(&Value::Unknown), None);
        assert_eq!(attr(&Attributes::new(), "missing"), Value::Null);
    }
}
