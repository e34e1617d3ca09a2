use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::errors::CoreError;
use crate::models::entity::TrackedEntity;
use crate::models::snapshot::{CacheSnapshot, CurrencyResultBundle};
use crate::services::merger;

/// Best-effort JSON file cache for the last successful fetch.
///
/// Reads fail soft (`None`), writes never raise. In an ephemeral deployment
/// writes are disabled altogether and reads come from the redirected path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    read_only: bool,
}

impl SnapshotStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            path: config.path.clone(),
            read_only: config.ephemeral,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Load the snapshot. Missing file, I/O error and parse error all yield `None`.
    pub fn read_snapshot(&self) -> Option<CacheSnapshot> {
        match self.try_read() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable cache snapshot");
                None
            }
        }
    }

    fn try_read(&self) -> Result<Option<CacheSnapshot>, CoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cache snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }

    /// Persist `snapshot`. Returns the written path, or `None` when writes are
    /// disabled or the write failed (the failure is logged).
    pub fn write_snapshot(&self, snapshot: &CacheSnapshot) -> Option<PathBuf> {
        if self.read_only {
            debug!("ephemeral deployment, skipping cache write");
            return None;
        }
        match self.try_write(snapshot) {
            Ok(()) => {
                info!(
                    path = %self.path.display(),
                    posts = snapshot.total_posts(),
                    "cache snapshot written"
                );
                Some(self.path.clone())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to write cache snapshot");
                None
            }
        }
    }

    /// [`Self::read_snapshot`] on the blocking thread pool, for async callers.
    pub async fn load(&self) -> Option<CacheSnapshot> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.read_snapshot())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "cache snapshot read task failed");
                None
            })
    }

    /// [`Self::write_snapshot`] on the blocking thread pool, for async callers.
    pub async fn save(&self, snapshot: CacheSnapshot) -> Option<PathBuf> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.write_snapshot(&snapshot))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "cache snapshot write task failed");
                None
            })
    }

    /// Write to a sibling temp file, then rename over the target so readers
    /// never observe a half-written snapshot.
    fn try_write(&self, snapshot: &CacheSnapshot) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))?;

        let tmp = self.path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, &json).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Union `incoming` into `existing` per entity instead of replacing it.
///
/// For each entity the fresh posts come first, followed by previously seen
/// posts the fresh fetch did not return. Entities only present in `existing`
/// are kept after the incoming ones. Timestamp and pagination come from
/// `incoming`.
pub fn merge_snapshots(existing: CacheSnapshot, incoming: CacheSnapshot) -> CacheSnapshot {
    let mut previous = existing.results;

    let mut results: Vec<CurrencyResultBundle> = incoming
        .results
        .into_iter()
        .map(|fresh| {
            let Some(idx) = previous
                .iter()
                .position(|old| old.symbol.eq_ignore_ascii_case(&fresh.symbol))
            else {
                return fresh;
            };
            let old = previous.remove(idx);
            let currency = fresh.currency.clone();
            let symbol = fresh.symbol.clone();
            let pagination = fresh.pagination.clone();

            let posts = merger::merge([fresh.into_posts(), old.into_posts()]);
            let entity = TrackedEntity::new(currency, symbol);
            let merged = CurrencyResultBundle::new(&entity, posts);
            match pagination {
                Some(p) => merged.with_pagination(p),
                None => merged,
            }
        })
        .collect();

    results.extend(previous);
    CacheSnapshot::at(results, incoming.timestamp)
}
