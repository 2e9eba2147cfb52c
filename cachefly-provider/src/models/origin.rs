//! Origin model

use cachefly_client::{Origin, OriginRequest};
use cachefly_core::resource::{Attributes, Value};

use super::origins::origin_fields;
use super::{attr, known_bool, known_int, known_string};

/// State of a `cachefly_origin` resource
#[derive(Debug, Clone, PartialEq)]
pub struct OriginModel {
    pub id: Value,
    pub origin_type: Value,
    pub name: Value,
    pub host: Value,
    pub scheme: Value,
    pub cache_by_query_param: Value,
    pub gzip: Value,
    pub ttl: Value,
    pub missed_ttl: Value,
    pub connection_timeout: Value,
    pub time_to_first_byte_timeout: Value,
    pub access_key: Value,
    pub secret_key: Value,
    pub region: Value,
    pub signature_version: Value,
    pub created_at: Value,
    pub updated_at: Value,
}

impl OriginModel {
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Self {
            id: attr(attributes, "id"),
            origin_type: attr(attributes, "type"),
            name: attr(attributes, "name"),
            host: attr(attributes, "host"),
            scheme: attr(attributes, "scheme"),
            cache_by_query_param: attr(attributes, "cache_by_query_param"),
            gzip: attr(attributes, "gzip"),
            ttl: attr(attributes, "ttl"),
            missed_ttl: attr(attributes, "missed_ttl"),
            connection_timeout: attr(attributes, "connection_timeout"),
            time_to_first_byte_timeout: attr(attributes, "time_to_first_byte_timeout"),
            access_key: attr(attributes, "access_key"),
            secret_key: attr(attributes, "secret_key"),
            region: attr(attributes, "region"),
            signature_version: attr(attributes, "signature_version"),
            created_at: attr(attributes, "created_at"),
            updated_at: attr(attributes, "updated_at"),
        }
    }

    pub fn into_attributes(self) -> Attributes {
        [
            ("id", self.id),
            ("type", self.origin_type),
            ("name", self.name),
            ("host", self.host),
            ("scheme", self.scheme),
            ("cache_by_query_param", self.cache_by_query_param),
            ("gzip", self.gzip),
            ("ttl", self.ttl),
            ("missed_ttl", self.missed_ttl),
            ("connection_timeout", self.connection_timeout),
            ("time_to_first_byte_timeout", self.time_to_first_byte_timeout),
            ("access_key", self.access_key),
            ("secret_key", self.secret_key),
            ("region", self.region),
            ("signature_version", self.signature_version),
            ("created_at", self.created_at),
            ("updated_at", self.updated_at),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Build a create or update request from the known planned values
    pub fn to_request(&self) -> OriginRequest {
        OriginRequest {
            origin_type: known_string(&self.origin_type),
            name: known_string(&self.name),
            hostname: known_string(&self.host),
            scheme: known_string(&self.scheme),
            cache_by_query_param: known_bool(&self.cache_by_query_param),
            gzip: known_bool(&self.gzip),
            ttl: known_int(&self.ttl),
            missed_ttl: known_int(&self.missed_ttl),
            connection_timeout: known_int(&self.connection_timeout),
            time_to_first_byte_timeout: known_int(&self.time_to_first_byte_timeout),
            access_key: known_string(&self.access_key),
            secret_key: known_string(&self.secret_key),
            region: known_string(&self.region),
            signature_version: known_string(&self.signature_version),
        }
    }

    /// Copy the API's view of the origin into the model.
    ///
    /// The API may withhold the keys; the configured ones are kept then.
    /// Zero timeouts and empty strings come back as null, so a configured
    /// zero value is kept where the API reports nothing.
    pub fn apply_origin(&mut self, origin: &Origin) {
        let prior = std::mem::replace(self, Self::from_attributes(&origin_fields(origin)));

        keep_if_withheld(&mut self.access_key, prior.access_key);
        keep_if_withheld(&mut self.secret_key, prior.secret_key);
        keep_if_zero(&mut self.connection_timeout, prior.connection_timeout);
        keep_if_zero(
            &mut self.time_to_first_byte_timeout,
            prior.time_to_first_byte_timeout,
        );
        keep_if_zero(&mut self.region, prior.region);
        keep_if_zero(&mut self.signature_version, prior.signature_version);
    }

    pub fn from_origin(origin: &Origin) -> Self {
        let mut model = Self::from_attributes(&Attributes::new());
        model.apply_origin(origin);
        model
    }
}

fn keep_if_withheld(value: &mut Value, prior: Value) {
    if value.is_null() && !prior.is_unknown() {
        *value = prior;
    }
}

fn keep_if_zero(value: &mut Value, prior: Value) {
    let is_zero = match &prior {
        Value::Int(n) => *n <= 0,
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if value.is_null() && is_zero {
        *value = prior;
    }
}
