//! Snapshot persistence.
//!
//! A snapshot is a JSON array of records written wholesale at the end of a
//! run and read back at the start of the next one. Keys are file names
//! relative to the store root:
//!
//! ```text
//! storage/
//! ├── www_project_repos.json    # all-repos preset baseline
//! ├── www_projects.json         # www-projects preset baseline
//! ├── repo_status.json          # registry status report
//! └── project_repos_links.json  # project page link scan
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a snapshot write.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of records written
    pub count: usize,
    /// Where the snapshot lives
    pub location: String,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Byte-level storage backend for snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read a stored object, `None` if it does not exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace a stored object.
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Human-readable location of a key.
    fn location(&self, key: &str) -> String;
}

/// Load a snapshot. A missing snapshot is `Ok(None)`, not an error.
pub async fn load_snapshot<T: DeserializeOwned>(
    store: &dyn SnapshotStore,
    key: &str,
) -> Result<Option<Vec<T>>> {
    match store.read_bytes(key).await? {
        Some(bytes) => {
            let records: Vec<T> = serde_json::from_slice(&bytes)?;
            log::info!(
                "Loaded {} records from {}",
                records.len(),
                store.location(key)
            );
            Ok(Some(records))
        }
        None => {
            log::info!("No snapshot at {}, starting fresh", store.location(key));
            Ok(None)
        }
    }
}

/// Overwrite a snapshot with the full current record set.
pub async fn save_snapshot<T: Serialize + Sync>(
    store: &dyn SnapshotStore,
    key: &str,
    records: &[T],
) -> Result<WriteMetadata> {
    let bytes = serde_json::to_vec_pretty(records)?;
    store.write_bytes(key, &bytes).await?;

    let meta = WriteMetadata {
        count: records.len(),
        location: store.location(key),
        timestamp: Utc::now(),
    };
    log::info!("Wrote {} records to {}", meta.count, meta.location);
    Ok(meta)
}
