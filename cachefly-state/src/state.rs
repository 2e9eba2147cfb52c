//! State file structures
//!
//! Attributes are stored as plain JSON. Sets are written as arrays, so
//! reading a state back relies on the schema to restore set-ness
//! (see [`ResourceSchema::coerce`]).

use std::collections::HashMap;

use cachefly_core::resource::{Attributes, ResourceId, State, Value};
use cachefly_core::schema::ResourceSchema;
use serde::{Deserialize, Serialize};

use crate::backend::BackendError;

/// Everything the host knows about managed resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    /// State file format version
    pub version: u32,
    /// Incremented on every write
    pub serial: u64,
    /// Identifies this state's history; a write with another lineage is rejected
    pub lineage: String,
    /// Version of the provider host that last wrote the state
    pub provider_version: String,
    pub resources: Vec<ResourceState>,
}

impl StateFile {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            serial: 0,
            lineage: uuid::Uuid::new_v4().to_string(),
            provider_version: env!("CARGO_PKG_VERSION").to_string(),
            resources: Vec::new(),
        }
    }

    /// Prepare for a write: bump the serial and stamp the writer's version
    pub fn increment_serial(&mut self) {
        self.serial += 1;
        self.provider_version = env!("CARGO_PKG_VERSION").to_string();
    }

    pub fn find(&self, id: &ResourceId) -> Option<&ResourceState> {
        self.resources.iter().find(|r| r.matches(id))
    }

    /// Insert or replace the entry for `resource`, keeping the original order
    pub fn upsert(&mut self, resource: ResourceState) {
        let id = resource.resource_id();
        match self.resources.iter_mut().find(|r| r.matches(&id)) {
            Some(existing) => *existing = resource,
            None => self.resources.push(resource),
        }
    }

    pub fn remove(&mut self, id: &ResourceId) -> Option<ResourceState> {
        let pos = self.resources.iter().position(|r| r.matches(id))?;
        Some(self.resources.remove(pos))
    }

    /// Record the outcome of a provider call. States with `exists == false`
    /// drop the entry.
    pub fn record(&mut self, state: &State) {
        if state.exists {
            self.upsert(ResourceState::from_state(state));
        } else {
            self.remove(&state.id);
        }
    }

    pub fn resource_ids(&self) -> Vec<ResourceId> {
        self.resources.iter().map(ResourceState::resource_id).collect()
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Stored state of one managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Full type name (e.g., "cachefly_certificate")
    pub resource_type: String,
    /// Block name from the configuration
    pub name: String,
    pub attributes: HashMap<String, serde_json::Value>,
}

impl ResourceState {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::new(&self.resource_type, &self.name)
    }

    fn matches(&self, id: &ResourceId) -> bool {
        self.resource_type == id.resource_type && self.name == id.name
    }

    pub fn from_state(state: &State) -> Self {
        Self {
            resource_type: state.id.resource_type.clone(),
            name: state.id.name.clone(),
            attributes: state
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        }
    }

    /// Decode into a provider state shaped by `schema`
    pub fn to_state(&self, schema: &ResourceSchema) -> Result<State, BackendError> {
        let mut attributes = Attributes::new();
        for (key, json) in &self.attributes {
            let value = Value::from_json(json).map_err(|e| {
                BackendError::InvalidState(format!(
                    "{}.{} attribute '{}': {}",
                    self.resource_type, self.name, key, e
                ))
            })?;
            attributes.insert(key.clone(), value);
        }
        Ok(State::existing(self.resource_id(), schema.coerce(attributes)))
    }
}

#[cfg(test)]
mod tests {
    use cachefly_core::schema::{AttributeSchema, AttributeType};
    use serde_json::json;

    use super::*;

    fn certificate_schema() -> ResourceSchema {
        ResourceSchema::new("cachefly_certificate")
            .attribute(AttributeSchema::new("id", AttributeType::String).computed())
            .attribute(AttributeSchema::new("password", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new("domains", AttributeType::set(AttributeType::String))
                    .computed(),
            )
    }

    #[test]
    fn new_state_file() {
        let state = StateFile::new();
        assert_eq!(state.version, StateFile::CURRENT_VERSION);
        assert_eq!(state.serial, 0);
        assert!(!state.lineage.is_empty());
        assert_ne!(state.lineage, StateFile::new().lineage);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut state = StateFile::new();
        state.upsert(ResourceState::new("cachefly_origin", "a").with_attribute("ttl", json!(60)));
        state.upsert(ResourceState::new("cachefly_origin", "b"));
        state.upsert(ResourceState::new("cachefly_origin", "a").with_attribute("ttl", json!(120)));

        assert_eq!(state.resources.len(), 2);
        assert_eq!(state.resources[0].name, "a");
        assert_eq!(state.resources[0].attributes["ttl"], json!(120));
    }

    #[test]
    fn record_removes_missing_resources() {
        let mut state = StateFile::new();
        let id = ResourceId::new("cachefly_certificate", "site");
        let mut attrs = Attributes::new();
        attrs.insert("id".to_string(), Value::String("c1".to_string()));

        state.record(&State::existing(id.clone(), attrs));
        assert!(state.find(&id).is_some());

        state.record(&State::not_found(id.clone()));
        assert!(state.find(&id).is_none());
        assert!(state.remove(&id).is_none());
    }

    #[test]
    fn round_trip_through_schema_restores_sets_and_nulls() {
        let mut attrs = Attributes::new();
        attrs.insert("id".to_string(), Value::String("c1".to_string()));
        attrs.insert("domains".to_string(), Value::string_set(["a.example.com"]));
        let state = State::existing(ResourceId::new("cachefly_certificate", "site"), attrs);

        let stored = ResourceState::from_state(&state);
        assert_eq!(stored.attributes["domains"], json!(["a.example.com"]));

        let restored = stored.to_state(&certificate_schema()).unwrap();
        assert_eq!(restored.attributes["domains"], Value::string_set(["a.example.com"]));
        assert_eq!(restored.attributes["password"], Value::Null);
        assert!(restored.exists);
    }

    #[test]
    fn to_state_rejects_fractional_numbers() {
        let stored = ResourceState::new("cachefly_origin", "web").with_attribute("ttl", json!(1.5));
        let err = stored.to_state(&certificate_schema()).unwrap_err();
        assert!(matches!(err, BackendError::InvalidState(msg) if msg.contains("ttl")));
    }

    #[test]
    fn serializes_with_provider_version() {
        let json = serde_json::to_value(StateFile::new()).unwrap();
        assert_eq!(json["provider_version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["resources"], json!([]));
    }
}
