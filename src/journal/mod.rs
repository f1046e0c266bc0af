// Journal store - the collaborator-facing API
// Writes go through the per-file lock registry, reads rescan the entries tree

pub mod common;
mod entry;
mod query;

use std::sync::Arc;
use std::time::Duration;

use crate::errors::JournalResult;
use crate::lock::LockRegistry;
use crate::models::JournalConfig;
use crate::storage::{loadConfig, JournalPaths};

pub use query::{matchesFilters, summarize, tallyTags};

/// One data root plus the locks guarding its day-files
pub struct JournalStore {
    config: JournalConfig,
    paths: JournalPaths,
    locks: LockRegistry,
}

impl JournalStore {
    pub fn new(config: JournalConfig) -> Self {
        let paths = JournalPaths::new(&config.dataDir);
        let locks = LockRegistry::new(Duration::from_secs(config.lockTimeoutSecs));
        Self { config, paths, locks }
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    pub fn paths(&self) -> &JournalPaths {
        &self.paths
    }
}

pub type JournalState = Arc<JournalStore>;

/// Initialize the store from the environment and <root>/config.md
pub fn initJournal() -> JournalResult<JournalState> {
    let config = loadConfig()?;
    tracing::info!("[initJournal] Journal data dir: {}", config.dataDir.display());
    Ok(Arc::new(JournalStore::new(config)))
}
