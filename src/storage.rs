// Lottery Slots - Persistence collaborator
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::state::{Slot, SlotId};

/// The whole persisted slot mapping
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct SlotTree {
    pub slots: BTreeMap<SlotId, Slot>,
}

/// Snapshot encodings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Textual JSON object notation
    #[default]
    Json,
    /// Compact binary
    Borsh,
}

impl Encoding {
    pub fn encode(&self, tree: &SlotTree) -> StoreResult<Vec<u8>> {
        match self {
            Encoding::Json => Ok(serde_json::to_vec(tree)?),
            Encoding::Borsh => tree
                .try_to_vec()
                .map_err(|e| StoreError::Codec(e.to_string())),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> StoreResult<SlotTree> {
        match self {
            Encoding::Json => Ok(serde_json::from_slice(bytes)?),
            Encoding::Borsh => {
                SlotTree::try_from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
            }
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Borsh => "bin",
        }
    }
}

/// Durable key-value home of the slot tree
pub trait Storage: Send {
    /// The last saved tree, or `None` if nothing was ever saved
    fn load(&self) -> StoreResult<Option<SlotTree>>;

    /// Replace the saved tree
    fn save(&self, tree: &SlotTree) -> StoreResult<()>;
}

/// In-process storage; clones share the same entries
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    namespace: String,
    encoding: Encoding,
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            encoding: config.encoding,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Raw bytes stored under the namespace key
    pub fn raw(&self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries()?.get(&self.namespace).cloned())
    }

    fn entries(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Persistence("memory storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> StoreResult<Option<SlotTree>> {
        match self.raw()? {
            Some(bytes) => Ok(Some(self.encoding.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, tree: &SlotTree) -> StoreResult<()> {
        let bytes = self.encoding.encode(tree)?;
        self.entries()?.insert(self.namespace.clone(), bytes);
        Ok(())
    }
}

/// One file per namespace, replaced atomically on every save
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
    encoding: Encoding,
}

impl FileStorage {
    /// `<dir>/<namespace>.json` or `<dir>/<namespace>.bin`
    pub fn in_dir(dir: impl AsRef<Path>, config: &StoreConfig) -> Self {
        let path = dir
            .as_ref()
            .join(format!("{}.{}", config.namespace, config.encoding.extension()));
        Self {
            path,
            encoding: config.encoding,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling the snapshot is written to before the rename, e.g. `lottery.json.tmp`
    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl Storage for FileStorage {
    fn load(&self) -> StoreResult<Option<SlotTree>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        Ok(Some(self.encoding.decode(&bytes)?))
    }

    fn save(&self, tree: &SlotTree) -> StoreResult<()> {
        let bytes = self.encoding.encode(tree)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
