// Query models: search filters, pages, tag counts and summary stats

use serde::{Deserialize, Serialize};

use super::dayfile::DayFile;

/// Search filters, all optional and combined as a conjunction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchOptions {
    pub dateFrom: Option<String>,
    pub dateTo: Option<String>,
    pub tags: Option<Vec<String>>,
    pub keywords: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl SearchOptions {
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn dateRange(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            dateFrom: Some(from.into()),
            dateTo: Some(to.into()),
            ..Default::default()
        }
    }

    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: Some(tags.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn keywords(keywords: impl Into<String>) -> Self {
        Self {
            keywords: Some(keywords.into()),
            ..Default::default()
        }
    }
}

/// One page of matching day-files
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub entries: Vec<DayFile>,
    pub total: usize,
    pub hasMore: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub earliest: String,
    pub latest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub totalEntries: usize,
    pub totalFiles: usize,
    pub dateRange: DateRange,
    pub topTags: Vec<TagCount>,
}
