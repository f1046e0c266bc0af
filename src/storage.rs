// Filesystem layout and config loading for the journal store
// Day-files live at <root>/entries/YYYY/MM/YYYY-MM-DD.md with YAML frontmatter

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::errors::{JournalError, JournalResult};
use crate::models::{ConfigOverride, JournalConfig};

pub const DATA_DIR_ENV: &str = "JOURNAL_DATA_DIR";
pub const PORT_ENV: &str = "JOURNAL_PORT";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
const APP_DIR_NAME: &str = "journal-mcp";

static DATE_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));
static DATE_IN_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})\.md$").expect("valid path pattern"));

// ============================================
// PATH HELPERS
// ============================================

/// Resolve the data root from the process environment
pub fn resolveDataDir() -> JournalResult<PathBuf> {
    resolveDataDirFrom(|key| env::var(key).ok(), dirs::home_dir())
}

/// JOURNAL_DATA_DIR, then $XDG_DATA_HOME/journal-mcp, then ~/.local/share/journal-mcp
pub fn resolveDataDirFrom<F>(lookup: F, home: Option<PathBuf>) -> JournalResult<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let nonEmpty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(dir) = nonEmpty(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = nonEmpty("XDG_DATA_HOME") {
        return Ok(PathBuf::from(xdg).join(APP_DIR_NAME));
    }

    let home = home.ok_or_else(|| JournalError::Config("Failed to get home directory".to_string()))?;
    Ok(home.join(".local").join("share").join(APP_DIR_NAME))
}

/// Layout of one data root
#[derive(Debug, Clone)]
pub struct JournalPaths {
    dataDir: PathBuf,
}

impl JournalPaths {
    pub fn new(dataDir: impl Into<PathBuf>) -> Self {
        Self { dataDir: dataDir.into() }
    }

    pub fn dataDir(&self) -> &Path {
        &self.dataDir
    }

    /// Entries directory, root of the year/month tree
    pub fn entriesDir(&self) -> PathBuf {
        self.dataDir.join("entries")
    }

    /// Config override file
    pub fn configPath(&self) -> PathBuf {
        self.dataDir.join("config.md")
    }

    /// Day-file path for a date (e.g. entries/2024/01/2024-01-15.md)
    pub fn dayFilePath(&self, date: NaiveDate) -> PathBuf {
        self.entriesDir()
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
            .join(format!("{}.md", date.format(DATE_FORMAT)))
    }
}

/// Parse a strict YYYY-MM-DD string into a calendar date
pub fn parseDate(date: &str) -> JournalResult<NaiveDate> {
    if !DATE_STRING.is_match(date) {
        return Err(JournalError::InvalidDate(date.to_string()));
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| JournalError::InvalidDate(date.to_string()))
}

/// Extract the date encoded in a day-file path ("…/2024-01-15.md" -> "2024-01-15")
pub fn parseDateFromPath(path: &Path) -> Option<String> {
    let path = path.to_string_lossy();
    let date = DATE_IN_PATH.captures(&path)?.get(1)?.as_str();
    parseDate(date).ok()?;
    Some(date.to_string())
}

// ============================================
// FRONTMATTER PARSING
// ============================================

/// Split a leading `---` fenced block from the body
/// Returns no block when the opening or closing fence is missing
pub fn splitFrontmatter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("---") else {
        return (None, content);
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, content)
}

/// Parse YAML frontmatter from markdown content
/// A missing or empty block gives T::default(); a malformed one is returned as the error
pub fn parseFrontmatter<T>(content: &str) -> (Result<T, serde_yaml::Error>, &str)
where
    T: DeserializeOwned + Default,
{
    match splitFrontmatter(content) {
        (Some(yaml), body) if yaml.trim().is_empty() => (Ok(T::default()), body),
        (Some(yaml), body) => (serde_yaml::from_str(yaml), body),
        (None, body) => (Ok(T::default()), body),
    }
}

/// Serialize frontmatter + body to markdown
pub fn toMarkdown<T: serde::Serialize>(frontmatter: &T, body: &str) -> JournalResult<String> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    Ok(format!("---\n{}---\n\n{}", yaml, body))
}

// ============================================
// CONFIG
// ============================================

/// Load the effective config: env data root, config.md override, then JOURNAL_PORT
pub fn loadConfig() -> JournalResult<JournalConfig> {
    let dataDir = resolveDataDir()?;
    let mut config = loadConfigFrom(dataDir);

    if let Ok(port) = env::var(PORT_ENV) {
        match port.trim().parse::<u16>() {
            Ok(p) => config.webPort = p,
            Err(e) => tracing::warn!("[loadConfig] Ignoring {}={:?}: {}", PORT_ENV, port, e),
        }
    }

    tracing::debug!("[loadConfig] Data dir: {}", config.dataDir.display());
    Ok(config)
}

/// Defaults for a data root, merged with <root>/config.md when present
pub fn loadConfigFrom(dataDir: PathBuf) -> JournalConfig {
    let base = JournalConfig::new(dataDir);
    let path = JournalPaths::new(&base.dataDir).configPath();

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => {
            tracing::debug!("[loadConfigFrom] No config file at {}", path.display());
            return base;
        }
    };

    match parseFrontmatter::<ConfigOverride>(&content) {
        (Ok(over), _) => base.withOverride(&over),
        (Err(e), _) => {
            tracing::warn!("[loadConfigFrom] Malformed config {}: {}, using defaults", path.display(), e);
            base
        }
    }
}
