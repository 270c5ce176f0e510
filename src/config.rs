// Lottery Slots - Configuration
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::StoreResult;
use crate::storage::Encoding;

/// Store settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key the whole slot tree is persisted under
    pub namespace: String,
    /// Name of the prize in a freshly seeded slot
    pub seed_prize_name: String,
    /// Value of the prize in a freshly seeded slot
    pub seed_prize_value: u64,
    /// Label of the ticket in a freshly seeded slot
    pub seed_ticket_label: String,
    /// Name given by `add_prize` when none is supplied
    pub new_prize_name: String,
    /// Upper bound on tickets produced by a single range
    pub max_pool_size: u64,
    /// Snapshot encoding used by file storage
    pub encoding: Encoding,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: "lottery".to_string(),
            seed_prize_name: "Prize 1".to_string(),
            seed_prize_value: 1000,
            seed_ticket_label: "001".to_string(),
            new_prize_name: "New Prize".to_string(),
            max_pool_size: 100_000,
            encoding: Encoding::Json,
        }
    }
}

impl StoreConfig {
    /// Read settings from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
