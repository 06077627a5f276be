use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use engine_logging::{engine_debug, engine_info};
use playtally_core::{HarvestState, Histogram, ItemId};
use serde::{Deserialize, Serialize};

use crate::persist::{AtomicFileWriter, PersistError};

const CHECKPOINT_EXTENSION: &str = "ron";

/// Durable mapping from item id to its harvest record.
///
/// Not finding a record is `Ok(None)`, never an error.
pub trait CheckpointStore: Send + Sync {
    fn read(&self, item_id: ItemId) -> Result<Option<HarvestState>, PersistError>;
    /// Upsert keyed by `state.item_id`.
    fn write(&self, state: &HarvestState) -> Result<(), PersistError>;
    /// Returns whether a record existed.
    fn remove(&self, item_id: ItemId) -> Result<bool, PersistError>;
}

/// On-disk layout of one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedHarvest {
    item_id: ItemId,
    display_name: String,
    current_page: u32,
    /// Dense: position is player count.
    histogram: Vec<u64>,
    started_at: String,
    #[serde(default)]
    finished_at: Option<String>,
}

impl From<&HarvestState> for PersistedHarvest {
    fn from(state: &HarvestState) -> Self {
        Self {
            item_id: state.item_id,
            display_name: state.display_name.clone(),
            current_page: state.current_page,
            histogram: state.histogram.to_dense(),
            started_at: state.started_at.clone(),
            finished_at: state.finished_at.clone(),
        }
    }
}

impl From<PersistedHarvest> for HarvestState {
    fn from(record: PersistedHarvest) -> Self {
        Self {
            item_id: record.item_id,
            display_name: record.display_name,
            current_page: record.current_page,
            histogram: Histogram::from_dense(record.histogram),
            started_at: record.started_at,
            finished_at: record.finished_at,
        }
    }
}

/// One `<item_id>.ron` file per item inside a store directory.
pub struct RonCheckpointStore {
    writer: AtomicFileWriter,
}

impl RonCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.into()),
        }
    }

    pub fn dir(&self) -> &Path {
        self.writer.dir()
    }

    pub fn path_for(&self, item_id: ItemId) -> PathBuf {
        self.dir().join(file_name(item_id))
    }

    /// Ids of every record in the store, ascending.
    pub fn list(&self) -> Result<Vec<ItemId>, PersistError> {
        let entries = match fs::read_dir(self.dir()) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut ids: Vec<ItemId> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some(CHECKPOINT_EXTENSION))
            .filter_map(|p| p.file_stem()?.to_str()?.parse().ok())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

impl CheckpointStore for RonCheckpointStore {
    fn read(&self, item_id: ItemId) -> Result<Option<HarvestState>, PersistError> {
        let path = self.path_for(item_id);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                engine_debug!("No checkpoint for item {} at {:?}", item_id, path);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let record: PersistedHarvest =
            ron::from_str(&content).map_err(|err| PersistError::Decode {
                path: path.clone(),
                message: err.to_string(),
            })?;
        if record.item_id != item_id {
            return Err(PersistError::Decode {
                path,
                message: format!("record is for item {}, not {}", record.item_id, item_id),
            });
        }

        engine_info!("Loaded checkpoint for item {} from {:?}", item_id, path);
        Ok(Some(record.into()))
    }

    fn write(&self, state: &HarvestState) -> Result<(), PersistError> {
        let record = PersistedHarvest::from(state);
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&record, pretty)
            .map_err(|err| PersistError::Encode(err.to_string()))?;

        let path = self.writer.write(&file_name(state.item_id), &content)?;
        engine_debug!(
            "Checkpointed item {} at page {} to {:?}",
            state.item_id,
            state.current_page,
            path
        );
        Ok(())
    }

    fn remove(&self, item_id: ItemId) -> Result<bool, PersistError> {
        match fs::remove_file(self.path_for(item_id)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

fn file_name(item_id: ItemId) -> String {
    format!("{item_id}.{CHECKPOINT_EXTENSION}")
}

/// In-process store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    records: Mutex<BTreeMap<ItemId, HarvestState>>,
    writes: Mutex<Vec<HarvestState>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(state: HarvestState) -> Self {
        let store = Self::new();
        store.lock_records().insert(state.item_id, state);
        store
    }

    /// Every snapshot written so far, oldest first.
    pub fn writes(&self) -> Vec<HarvestState> {
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, BTreeMap<ItemId, HarvestState>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn read(&self, item_id: ItemId) -> Result<Option<HarvestState>, PersistError> {
        Ok(self.lock_records().get(&item_id).cloned())
    }

    fn write(&self, state: &HarvestState) -> Result<(), PersistError> {
        self.lock_records().insert(state.item_id, state.clone());
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(state.clone());
        Ok(())
    }

    fn remove(&self, item_id: ItemId) -> Result<bool, PersistError> {
        Ok(self.lock_records().remove(&item_id).is_some())
    }
}
