//! Staging area implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::StagingConfig;
use super::types::{StagedPurpose, StagingStats};
use crate::metrics::STAGED_FILES_ACTIVE;

#[derive(Debug, Default)]
struct Ledger {
    allocated: AtomicU64,
    released: AtomicU64,
}

/// Allocates uniquely named scratch paths under one directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    prefix: String,
    ledger: Arc<Ledger>,
}

impl StagingArea {
    pub fn new(config: &StagingConfig) -> Self {
        Self {
            root: config.temp_dir.clone(),
            prefix: config.prefix.clone(),
            ledger: Arc::new(Ledger::default()),
        }
    }

    /// Staging area rooted at `root` with the default prefix.
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(&StagingConfig::default().with_temp_dir(root.into()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root directory if needed.
    pub async fn prepare(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Reserves a unique path. No file is created.
    pub fn allocate(&self, purpose: StagedPurpose, extension: &str) -> StagedFile {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let token = Uuid::new_v4().simple().to_string();
        let extension = extension.trim_start_matches('.');
        let name = format!(
            "{}-{}-{}-{}.{}",
            self.prefix,
            purpose.as_str(),
            millis,
            &token[..8],
            extension
        );
        let path = self.root.join(name);

        self.ledger.allocated.fetch_add(1, Ordering::Relaxed);
        STAGED_FILES_ACTIVE.inc();
        debug!(path = %path.display(), purpose = purpose.as_str(), "Allocated staged file");

        StagedFile {
            path,
            purpose,
            ledger: Arc::clone(&self.ledger),
            released: false,
        }
    }

    /// Deletes a staged file. Never fails; problems are logged.
    pub async fn release(&self, mut file: StagedFile) {
        if file.released {
            return;
        }
        file.released = true;
        let result = tokio::fs::remove_file(&file.path).await;
        finish_release(&file.ledger, &file.path, file.purpose, result);
    }

    pub fn stats(&self) -> StagingStats {
        let allocated = self.ledger.allocated.load(Ordering::Relaxed);
        let released = self.ledger.released.load(Ordering::Relaxed);
        StagingStats {
            allocated,
            released,
            active: allocated.saturating_sub(released),
        }
    }
}

/// A reserved scratch path, deleted on release or drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    purpose: StagedPurpose,
    ledger: Arc<Ledger>,
    released: bool,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn purpose(&self) -> StagedPurpose {
        self.purpose
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let result = std::fs::remove_file(&self.path);
        finish_release(&self.ledger, &self.path, self.purpose, result);
    }
}

fn finish_release(
    ledger: &Ledger,
    path: &Path,
    purpose: StagedPurpose,
    result: std::io::Result<()>,
) {
    match result {
        Ok(()) => debug!(path = %path.display(), purpose = purpose.as_str(), "Removed staged file"),
        // Never written, e.g. the run failed before this stage.
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %path.display(),
            purpose = purpose.as_str(),
            error = %e,
            "Failed to remove staged file"
        ),
    }
    ledger.released.fetch_add(1, Ordering::Relaxed);
    STAGED_FILES_ACTIVE.dec();
}
