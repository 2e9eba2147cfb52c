//! Configuration file
//!
//! ```json
//! {
//!   "provider": { "api_token": "..." },
//!   "resources": [ { "type": "cachefly_certificate", "name": "site", "attributes": {} } ],
//!   "data": [ { "type": "cachefly_origins", "name": "all", "attributes": {} } ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use cachefly_core::resource::{Attributes, Resource, Value};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "main.cachefly.json";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub provider: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub resources: Vec<BlockConfig>,
    #[serde(default)]
    pub data: Vec<BlockConfig>,
}

/// A resource or data source block
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockConfig {
    #[serde(rename = "type")]
    pub block_type: String,
    pub name: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl BlockConfig {
    pub fn to_resource(&self) -> Result<Resource, String> {
        let mut resource = Resource::new(&self.block_type, &self.name);
        resource.attributes = decode_attributes(&self.attributes)
            .map_err(|e| format!("{}.{}: {}", self.block_type, self.name, e))?;
        Ok(resource)
    }
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&content).map_err(|e| format!("{}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let config: ConfigFile =
            serde_json::from_str(content).map_err(|e| format!("Parse error: {}", e))?;
        check_unique("resource", &config.resources)?;
        check_unique("data source", &config.data)?;
        Ok(config)
    }

    pub fn provider_attributes(&self) -> Result<Attributes, String> {
        decode_attributes(&self.provider).map_err(|e| format!("provider: {}", e))
    }

    pub fn resources(&self) -> Result<Vec<Resource>, String> {
        self.resources.iter().map(BlockConfig::to_resource).collect()
    }

    pub fn data_sources(&self) -> Result<Vec<Resource>, String> {
        self.data.iter().map(BlockConfig::to_resource).collect()
    }
}

fn decode_attributes(map: &serde_json::Map<String, serde_json::Value>) -> Result<Attributes, String> {
    map.iter()
        .map(|(key, json)| {
            Value::from_json(json)
                .map(|value| (key.clone(), value))
                .map_err(|e| format!("attribute '{}': {}", key, e))
        })
        .collect()
}

fn check_unique(kind: &str, blocks: &[BlockConfig]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for block in blocks {
        if !seen.insert((&block.block_type, &block.name)) {
            return Err(format!(
                "Duplicate {} block {}.{}",
                kind, block.block_type, block.name
            ));
        }
    }
    Ok(())
}
