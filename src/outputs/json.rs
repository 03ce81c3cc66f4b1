//! Snapshot file writer.
//!
//! The dashboard polls a single JSON file, so it is replaced wholesale: the
//! document is written to a sibling `.tmp` file first and then renamed over the
//! target. A reader sees either the previous snapshot or the new one.

use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::models::Snapshot;
use crate::utils::ensure_parent_dir;

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `snapshot` to `path` as pretty-printed UTF-8 JSON, creating parent
/// directories as needed.
///
/// # Errors
///
/// Fails if the directory cannot be created or the file cannot be written or
/// renamed. These are the only run-level failures.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;

    if let Err(e) = ensure_parent_dir(path).await {
        error!(error = %e, "Failed to create output directory");
        return Err(e);
    }

    let tmp = temp_path_for(path);
    fs::write(&tmp, json).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        error!(tmp = %tmp.display(), error = %e, "Failed to move snapshot into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    info!(items = snapshot.items.len(), "Wrote snapshot");
    Ok(())
}
