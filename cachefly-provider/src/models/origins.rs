//! Origins data source model and the shared origin field mapping

use cachefly_client::{ListOriginsOptions, Origin};
use cachefly_core::resource::{Attributes, Value};
use cachefly_core::schema::AttributeType;

use super::{attr, known_int, string_or_empty};

/// Field types of one element of the `origins` list
pub fn origin_object_type() -> AttributeType {
    AttributeType::object([
        ("id", AttributeType::String),
        ("type", AttributeType::String),
        ("name", AttributeType::String),
        ("host", AttributeType::String),
        ("scheme", AttributeType::String),
        ("cache_by_query_param", AttributeType::Bool),
        ("gzip", AttributeType::Bool),
        ("ttl", AttributeType::Int),
        ("missed_ttl", AttributeType::Int),
        ("connection_timeout", AttributeType::Int),
        ("time_to_first_byte_timeout", AttributeType::Int),
        ("access_key", AttributeType::String),
        ("secret_key", AttributeType::String),
        ("region", AttributeType::String),
        ("signature_version", AttributeType::String),
        ("created_at", AttributeType::String),
        ("updated_at", AttributeType::String),
    ])
}

/// Map an API origin to attribute values.
///
/// Timeouts are null unless positive; S3 credentials, region and signature
/// version are null when empty.
pub fn origin_fields(origin: &Origin) -> Attributes {
    let mut fields = Attributes::new();
    let mut set = |k: &str, v: Value| {
        fields.insert(k.to_string(), v);
    };

    set("id", Value::String(origin.id.clone()));
    set("type", Value::String(origin.origin_type.clone()));
    set("name", Value::String(origin.name.clone()));
    set("host", Value::String(origin.hostname.clone()));
    set("scheme", Value::String(origin.scheme.clone()));
    set("cache_by_query_param", Value::Bool(origin.cache_by_query_param));
    set("gzip", Value::Bool(origin.gzip));
    set("ttl", Value::Int(origin.ttl));
    set("missed_ttl", Value::Int(origin.missed_ttl));
    set(
        "connection_timeout",
        Value::positive_int_or_null(origin.connection_timeout),
    );
    set(
        "time_to_first_byte_timeout",
        Value::positive_int_or_null(origin.time_to_first_byte_timeout),
    );
    set("access_key", Value::string_or_null(&origin.access_key));
    set("secret_key", Value::string_or_null(&origin.secret_key));
    set("region", Value::string_or_null(&origin.region));
    set(
        "signature_version",
        Value::string_or_null(&origin.signature_version),
    );
    set("created_at", Value::String(origin.created_at.clone()));
    set("updated_at", Value::String(origin.updated_at.clone()));

    fields
}

/// State of a `cachefly_origins` data source
#[derive(Debug, Clone, PartialEq)]
pub struct OriginsDataSourceModel {
    pub origin_type: Value,
    pub offset: Value,
    pub limit: Value,
    pub response_type: Value,
    pub origins: Value,
}

impl OriginsDataSourceModel {
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Self {
            origin_type: attr(attributes, "type"),
            offset: attr(attributes, "offset"),
            limit: attr(attributes, "limit"),
            response_type: attr(attributes, "response_type"),
            origins: attr(attributes, "origins"),
        }
    }

    pub fn into_attributes(self) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("type".to_string(), self.origin_type);
        attributes.insert("offset".to_string(), self.offset);
        attributes.insert("limit".to_string(), self.limit);
        attributes.insert("response_type".to_string(), self.response_type);
        attributes.insert("origins".to_string(), self.origins);
        attributes
    }

    /// List options; offset and limit are only sent when set
    pub fn to_list_options(&self) -> ListOriginsOptions {
        ListOriginsOptions {
            origin_type: string_or_empty(&self.origin_type),
            offset: known_int(&self.offset),
            limit: known_int(&self.limit),
            response_type: string_or_empty(&self.response_type),
        }
    }

    pub fn set_origins(&mut self, origins: &[Origin]) {
        self.origins = Value::List(
            origins
                .iter()
                .map(|o| Value::Map(origin_fields(o)))
                .collect(),
        );
    }
}
