// Entry model for the day-file journal
// One timestamped note inside a day-file

use serde::{Deserialize, Serialize};

/// Default title used when the first content line yields nothing
pub const DEFAULT_ENTRY_TITLE: &str = "Entry";

/// A single journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,         // date + HHMM, suffixed -2, -3 ... within a file
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,  // deduplicated, sorted
    pub created: String,
    pub updated: String,
    pub timestamp: String,  // HH:MM
}

/// Input for adding an entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddEntryOptions {
    pub content: String,
    /// Merged with the #tags found in content
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl AddEntryOptions {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tags: None,
        }
    }

    pub fn withTags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}
