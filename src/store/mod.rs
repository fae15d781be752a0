pub mod posts;
pub mod standards;

pub use posts::{PostStore, PostUpdate};
pub use standards::StandardsStore;

use std::path::Path;

/// Writes through a sibling tmp file and renames it over the target.
async fn write_atomic(path: &Path, payload: String, what: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, payload)
        .await
        .map_err(|err| format!("failed to write {}: {}", what, err))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|err| format!("failed to finalize {}: {}", what, err))?;
    Ok(())
}

async fn ensure_dir(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| format!("failed to create data dir: {}", err))
}
