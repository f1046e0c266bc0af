// Query engine
// Every call rescans and reparses the whole entries tree, no index is kept

use std::collections::HashMap;

use super::JournalStore;
use crate::codec::parseDayFile;
use crate::errors::JournalResult;
use crate::files::{ensureDir, listMarkdownFiles, readIfExists};
use crate::models::{DateRange, DayFile, SearchOptions, SearchResult, Stats, TagCount};
use crate::storage::parseDate;

const TOP_TAGS: usize = 10;

impl JournalStore {
    /// Every parseable day-file under the entries root, unordered
    async fn loadDayFiles(&self) -> JournalResult<Vec<DayFile>> {
        let root = self.paths.entriesDir();
        ensureDir(&root).await?;

        let walkRoot = root.clone();
        let paths = tokio::task::spawn_blocking(move || listMarkdownFiles(&walkRoot)).await?;

        let reads = paths.into_iter().map(|path| async move {
            let content = readIfExists(&path).await;
            (path, content)
        });
        let loaded = futures::future::join_all(reads).await;

        let mut files = Vec::with_capacity(loaded.len());
        for (path, content) in loaded {
            let Some(content) = content else {
                tracing::debug!("[searchEntries] Skipping unreadable file {}", path.display());
                continue;
            };
            match parseDayFile(&path, &content) {
                Ok(file) => files.push(file),
                Err(e) => tracing::warn!("[searchEntries] Failed to parse journal file {}: {}", path.display(), e),
            }
        }

        tracing::debug!("[searchEntries] Loaded {} day-files from {}", files.len(), root.display());
        Ok(files)
    }

    /// Filtered, newest first, not yet paginated
    async fn matchingDayFiles(&self, options: &SearchOptions) -> JournalResult<Vec<DayFile>> {
        let mut files: Vec<DayFile> = self
            .loadDayFiles()
            .await?
            .into_iter()
            .filter(|f| matchesFilters(f, options))
            .collect();

        files.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.filePath.cmp(&a.filePath)));
        Ok(files)
    }

    pub async fn searchEntries(&self, options: &SearchOptions) -> JournalResult<SearchResult> {
        let files = self.matchingDayFiles(options).await?;

        let offset = options.offset.unwrap_or(0);
        // 0 means "no preference", same as None
        let limit = options.limit.filter(|&n| n > 0).unwrap_or(self.config.searchLimit);
        let total = files.len();
        let entries: Vec<DayFile> = files.into_iter().skip(offset).take(limit).collect();

        tracing::debug!("[searchEntries] {} matching, returning {}", total, entries.len());
        Ok(SearchResult {
            entries,
            total,
            hasMore: offset.saturating_add(limit) < total,
        })
    }

    pub async fn getRecentEntries(&self, limit: Option<usize>) -> JournalResult<Vec<DayFile>> {
        let limit = limit.filter(|&n| n > 0).unwrap_or(self.config.recentLimit);
        Ok(self.searchEntries(&SearchOptions::limit(limit)).await?.entries)
    }

    /// Direct lookup of one date, skipping the full scan
    pub async fn getEntryByDate(&self, date: &str) -> JournalResult<Option<DayFile>> {
        let filePath = self.paths.dayFilePath(parseDate(date)?);

        let Some(content) = readIfExists(&filePath).await else {
            return Ok(None);
        };
        match parseDayFile(&filePath, &content) {
            Ok(file) => Ok(Some(file)),
            Err(e) => {
                tracing::warn!("[getEntryByDate] {}", e);
                Ok(None)
            }
        }
    }

    /// Tag usage over all day-files, counted once per file
    pub async fn listTags(&self) -> JournalResult<Vec<TagCount>> {
        let files = self.matchingDayFiles(&SearchOptions::default()).await?;
        Ok(tallyTags(&files))
    }

    pub async fn getStats(&self) -> JournalResult<Stats> {
        let files = self.matchingDayFiles(&SearchOptions::default()).await?;
        Ok(summarize(&files))
    }
}

/// Date bounds (inclusive), required tags (all of them) and keyword, combined with AND
pub fn matchesFilters(file: &DayFile, options: &SearchOptions) -> bool {
    if let Some(from) = options.dateFrom.as_deref().filter(|d| !d.is_empty()) {
        if file.date.as_str() < from {
            return false;
        }
    }
    if let Some(to) = options.dateTo.as_deref().filter(|d| !d.is_empty()) {
        if file.date.as_str() > to {
            return false;
        }
    }

    if let Some(tags) = &options.tags {
        if !tags.iter().all(|tag| file.hasTag(tag)) {
            return false;
        }
    }

    if let Some(keywords) = options.keywords.as_deref().filter(|k| !k.is_empty()) {
        let keyword = keywords.to_lowercase();
        let contents: Vec<&str> = file.entries.iter().map(|e| e.content.as_str()).collect();
        let searchText = format!("{} {}", file.title, contents.join(" ")).to_lowercase();
        if !searchText.contains(&keyword) {
            return false;
        }
    }

    true
}

/// Count each tag once per file, most used first, ties alphabetical
pub fn tallyTags(files: &[DayFile]) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for file in files {
        for tag in &file.tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag: tag.to_string(), count })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tags
}

pub fn summarize(files: &[DayFile]) -> Stats {
    if files.is_empty() {
        return Stats::default();
    }

    let earliest = files.iter().map(|f| f.date.as_str()).min().unwrap_or_default();
    let latest = files.iter().map(|f| f.date.as_str()).max().unwrap_or_default();

    let mut topTags = tallyTags(files);
    topTags.truncate(TOP_TAGS);

    Stats {
        totalEntries: files.iter().map(|f| f.entries_count).sum(),
        totalFiles: files.len(),
        dateRange: DateRange {
            earliest: earliest.to_string(),
            latest: latest.to_string(),
        },
        topTags,
    }
}
