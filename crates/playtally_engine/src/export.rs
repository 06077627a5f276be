use std::path::{Path, PathBuf};

use playtally_core::HarvestView;
use serde_json::{json, Value};

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("report path has no file name: {0}")]
    InvalidPath(String),
}

/// JSON summary of one harvest: item, timing and per-player-count rows.
pub fn build_report(view: &HarvestView) -> Value {
    json!({
        "item_id": view.item_id,
        "name": view.display_name,
        "pages": view.pages,
        "finished": view.finished,
        "started_at": view.started_at,
        "finished_at": view.finished_at,
        "total_plays": view.total_plays,
        "player_counts": view.rows.iter().map(|row| {
            json!({
                "players": row.player_count,
                "plays": row.plays,
                "share_percent": (row.share_percent * 100.0).round() / 100.0,
            })
        }).collect::<Vec<_>>()
    })
}

/// Writes the pretty-printed report to `path`, creating parent directories.
pub fn write_report(view: &HarvestView, path: &Path) -> Result<PathBuf, ExportError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ExportError::InvalidPath(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let content = serde_json::to_string_pretty(&build_report(view))?;
    let writer = AtomicFileWriter::new(dir);
    Ok(writer.write(file_name, &content)?)
}
