//! Session persistence for active filters.
//!
//! A listing session keeps its filters across restarts by mirroring every
//! snapshot into a JSON file (an array of filters, insertion order).
//!
//! ```ignore
//! let session = SessionFile::new(".storefront-filters.json");
//! let store = session.restore()?;
//! let _sub = session.attach(&store);
//! store.toggle_active_filter(filter); // written to disk
//! ```

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use catalog::Filter;
use tokio::task::JoinHandle;

use crate::error::{Result, SessionError};
use crate::snapshot::ActiveFilters;
use crate::store::{FilterStore, Subscription};

#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved filters. A missing file is an empty session.
    pub fn load(&self) -> Result<Vec<Filter>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&content).map_err(|source| SessionError::Json {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Build a store seeded from the saved session.
    pub fn restore(&self) -> Result<FilterStore> {
        let filters = self.load()?;
        tracing::debug!(
            "Restored {} filters from {}",
            filters.len(),
            self.path.display()
        );
        Ok(FilterStore::with_filters(filters))
    }

    /// Write a snapshot, replacing the file atomically.
    pub fn save(&self, snapshot: &ActiveFilters) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(snapshot).map_err(|source| SessionError::Json {
            path: self.path.display().to_string(),
            source,
        })?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Save every snapshot the store emits from now on.
    ///
    /// The file is written inside the observer, so every mutating call waits
    /// on the disk and other writers wait behind it. Fine for short-lived
    /// hosts like the CLI; long-running hosts should use
    /// [`spawn_writer`](SessionFile::spawn_writer).
    ///
    /// Write failures are logged and dropped; they never reach the store.
    pub fn attach(&self, store: &FilterStore) -> Subscription {
        let session = self.clone();
        store.subscribe(move |snapshot: &ActiveFilters| {
            if let Err(e) = session.save(snapshot) {
                tracing::warn!("Failed to persist active filters: {}", e);
            }
        })
    }

    /// Save snapshots from a background task fed by [`FilterStore::watch`].
    ///
    /// Mutations never wait on the disk. Bursts of changes are coalesced,
    /// so only the latest snapshot is guaranteed to be written. The task
    /// finishes once every handle to the store is dropped. Must be called
    /// from inside a Tokio runtime.
    pub fn spawn_writer(&self, store: &FilterStore) -> JoinHandle<()> {
        let session = self.clone();
        let mut rx = store.watch();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                let writer = session.clone();
                match tokio::task::spawn_blocking(move || writer.save(&snapshot)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!("Failed to persist active filters: {}", e),
                    Err(e) => tracing::warn!("Session writer task failed: {}", e),
                }
            }
            tracing::debug!("Session writer for {} stopped", session.path.display());
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
