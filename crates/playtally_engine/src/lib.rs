//! Playtally engine: page fetching, checkpoint persistence and the effect runner.
mod checkpoint;
mod decode;
mod export;
mod fetch;
mod harvester;
mod persist;
mod types;

pub use checkpoint::{CheckpointStore, MemoryCheckpointStore, RonCheckpointStore};
pub use decode::{decode_plays_page, DecodeError};
pub use export::{build_report, write_report, ExportError};
pub use fetch::{
    FetchSettings, NullProgressSink, PageFetcher, ProgressSink, ReqwestPageFetcher,
    DEFAULT_BASE_URL,
};
pub use harvester::{
    Clock, HarvestConfig, HarvestError, HarvestReport, Harvester, DEFAULT_REQUEST_DELAY,
};
pub use persist::{ensure_store_dir, AtomicFileWriter, PersistError};
pub use types::{FailureKind, FetchError, HarvestEvent};
