// Configuration models for the journal store
// Data root comes from the environment, tunables can be overridden by <root>/config.md

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_WEB_PORT: u16 = 3000;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 30;

/// Effective configuration, resolved once at store start-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    pub dataDir: PathBuf,
    pub webPort: u16,
    pub searchLimit: usize,
    pub recentLimit: usize,
    pub lockTimeoutSecs: u64,
}

impl JournalConfig {
    pub fn new(dataDir: impl Into<PathBuf>) -> Self {
        Self {
            dataDir: dataDir.into(),
            webPort: DEFAULT_WEB_PORT,
            searchLimit: DEFAULT_SEARCH_LIMIT,
            recentLimit: DEFAULT_RECENT_LIMIT,
            lockTimeoutSecs: DEFAULT_LOCK_TIMEOUT_SECS,
        }
    }

    /// Merge with config.md override
    pub fn withOverride(&self, over: &ConfigOverride) -> Self {
        Self {
            dataDir: self.dataDir.clone(),
            webPort: over.webPort.unwrap_or(self.webPort),
            searchLimit: over.searchLimit.unwrap_or(self.searchLimit),
            recentLimit: over.recentLimit.unwrap_or(self.recentLimit),
            lockTimeoutSecs: over.lockTimeoutSecs.unwrap_or(self.lockTimeoutSecs),
        }
    }
}

/// Partial settings read from config.md frontmatter (all fields optional)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webPort: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchLimit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recentLimit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lockTimeoutSecs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_only_set_fields() {
        let base = JournalConfig::new("/tmp/journal");
        let over = ConfigOverride {
            searchLimit: Some(5),
            ..Default::default()
        };

        let merged = base.withOverride(&over);
        assert_eq!(merged.searchLimit, 5);
        assert_eq!(merged.webPort, DEFAULT_WEB_PORT);
        assert_eq!(merged.recentLimit, DEFAULT_RECENT_LIMIT);
        assert_eq!(merged.dataDir, PathBuf::from("/tmp/journal"));
    }
}
