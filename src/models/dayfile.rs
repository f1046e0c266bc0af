// Day-file model for filesystem-based storage
// Date and path are derived from each other, never stored independently

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::entry::Entry;

/// Day-file frontmatter (YAML header in .md file)
/// Every field is optional on read so a partial block still parses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayFileFrontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    // Advisory only, the parsed entry list is authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_count: Option<usize>,
    /// Caller-supplied tags per entry id that are not written as #tags in the content
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entry_tags: BTreeMap<String, Vec<String>>,
}

/// Full day-file with parsed entries and filesystem info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFile {
    pub title: String,
    pub tags: Vec<String>,
    pub created: String,
    pub updated: String,
    pub entries_count: usize,
    pub entries: Vec<Entry>,
    pub filePath: PathBuf,
    pub date: String,
}

impl DayFile {
    /// Fresh file holding a single entry
    pub fn withFirstEntry(date: &str, filePath: PathBuf, entry: Entry, timestamp: &str) -> Self {
        Self {
            title: date.to_string(),
            tags: entry.tags.clone(),
            created: timestamp.to_string(),
            updated: timestamp.to_string(),
            entries_count: 1,
            entries: vec![entry],
            filePath,
            date: date.to_string(),
        }
    }

    /// Append an entry, keeping count and tag union in sync
    pub fn push(&mut self, entry: Entry, timestamp: &str) {
        let mut tags = std::mem::take(&mut self.tags);
        tags.extend(entry.tags.iter().cloned());
        self.tags = crate::codec::normalizeTags(tags);
        self.entries.push(entry);
        self.entries_count = self.entries.len();
        self.updated = timestamp.to_string();
    }

    pub fn hasTag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
