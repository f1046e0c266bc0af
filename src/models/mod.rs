// Models module for the journal store
// Field names follow the JSON shapes handed to collaborators

pub mod config;
pub mod dayfile;
pub mod entry;
pub mod search;

pub use config::{ConfigOverride, JournalConfig};
pub use dayfile::{DayFile, DayFileFrontmatter};
pub use entry::{AddEntryOptions, Entry, DEFAULT_ENTRY_TITLE};
pub use search::{DateRange, SearchOptions, SearchResult, Stats, TagCount};
