// Allow non-snake_case names so models serialize to the JSON shapes collaborators expect
#![allow(non_snake_case)]

pub mod codec;
pub mod errors;
pub mod files;
pub mod journal;
pub mod lock;
pub mod logging;
pub mod models;
pub mod storage;

pub use errors::{JournalError, JournalResult};
pub use journal::{initJournal, JournalState, JournalStore};
pub use logging::initTracing;
pub use models::{
    AddEntryOptions, DateRange, DayFile, Entry, JournalConfig, SearchOptions, SearchResult, Stats,
    TagCount,
};
