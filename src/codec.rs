// Day-file codec
// Markdown body + YAML frontmatter <-> DayFile with its ordered entries

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use crate::errors::{JournalError, JournalResult};
use crate::journal::common::{isoNow, isoTimestamp};
use crate::models::{DayFile, DayFileFrontmatter, Entry, DEFAULT_ENTRY_TITLE};
use crate::storage::{parseDateFromPath, parseFrontmatter, toMarkdown, DATE_FORMAT};

const TITLE_MAX_CHARS: usize = 50;

static ENTRY_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^## (\d{2}:\d{2})\s*-?\s*(.*)$").expect("valid header pattern"));
// Content lines that would read back as an entry header, with any escapes already applied
static HEADER_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\*## \d{2}:\d{2}").expect("valid header-like pattern"));
static TAG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("valid tag pattern"));
static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s*").expect("valid heading pattern"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_`]").expect("valid emphasis pattern"));
// Localized variant included so older day-files lose their footer too
static FOOTER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*(?:Last updated|最終更新): .* \| (?:Entries|エントリ数): \d+\*$")
        .expect("valid footer pattern")
});

// ============================================
// TITLES AND TAGS
// ============================================

/// Title from the first content line, markdown markers stripped
pub fn extractTitle(content: &str) -> String {
    let firstLine = content.lines().next().unwrap_or("").trim();
    let stripped = HEADING_MARKER.replace(firstLine, "");
    let stripped = EMPHASIS.replace_all(&stripped, "");

    let title: String = stripped.chars().take(TITLE_MAX_CHARS).collect();
    let title = title.trim();
    if title.is_empty() {
        DEFAULT_ENTRY_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// All #word tokens in content, deduplicated and sorted
pub fn extractTags(content: &str) -> Vec<String> {
    normalizeTags(TAG_TOKEN.captures_iter(content).map(|c| c[1].to_string()))
}

/// Dedupe by exact string, drop empties, sort ascending
pub fn normalizeTags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Caller tags arrive as "work", " work " or "#work"
fn cleanExplicitTag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_string()
}

// ============================================
// ENTRIES
// ============================================

/// Drop leading and trailing blank lines, keep everything in between verbatim
fn trimBlankLines(lines: &[&str]) -> String {
    let Some(start) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    let end = lines.iter().rposition(|l| !l.trim().is_empty()).unwrap_or(start);
    lines[start..=end].join("\n")
}

pub fn normalizeContent(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    trimBlankLines(&lines)
}

/// date + HHMM, with -2, -3 ... when the minute is already taken in this file
pub fn uniqueEntryId(date: &str, time: &str, existing: &[Entry]) -> String {
    let base = format!("{}-{}", date, time.replace(':', ""));
    let mut id = base.clone();
    let mut n = 2;
    while existing.iter().any(|e| e.id == id) {
        id = format!("{}-{}", base, n);
        n += 1;
    }
    id
}

/// Build a new entry stamped at `at`, ids kept unique against `existing`
pub fn newEntry(
    content: &str,
    explicitTags: Option<&[String]>,
    at: &DateTime<FixedOffset>,
    existing: &[Entry],
) -> Entry {
    let content = normalizeContent(content);
    let date = at.format(DATE_FORMAT).to_string();
    let time = at.format("%H:%M").to_string();

    let mut tags = extractTags(&content);
    if let Some(explicit) = explicitTags {
        tags.extend(explicit.iter().map(|t| cleanExplicitTag(t)));
    }

    let stamp = isoTimestamp(at);
    Entry {
        id: uniqueEntryId(&date, &time, existing),
        title: extractTitle(&content),
        content,
        tags: normalizeTags(tags),
        created: stamp.clone(),
        updated: stamp,
        timestamp: time,
    }
}

/// Prefix header-like content lines with one more backslash so they stay content
fn escapeHeaderLines(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if HEADER_LIKE.is_match(line) {
                format!("\\{}", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescapeHeaderLine(line: &str) -> &str {
    match line.strip_prefix('\\') {
        Some(rest) if HEADER_LIKE.is_match(line) => rest,
        _ => line,
    }
}

/// Cut the trailing `---` + "*Last updated …*" footer off the body lines
fn stripFooter<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    let Some(footer) = lines.iter().rposition(|l| FOOTER_LINE.is_match(l.trim())) else {
        return lines;
    };
    if lines[footer + 1..].iter().any(|l| !l.trim().is_empty()) {
        return lines;
    }

    let mut cut = footer;
    if let Some(rule) = lines[..footer].iter().rposition(|l| !l.trim().is_empty()) {
        if lines[rule].trim() == "---" {
            cut = rule;
        }
    }
    &lines[..cut]
}

fn flushEntry(entries: &mut Vec<Entry>, date: &str, time: &str, title: &str, body: &[&str]) {
    let body: Vec<&str> = body.iter().map(|l| unescapeHeaderLine(l)).collect();
    let content = trimBlankLines(&body);
    let stamp = format!("{}T{}:00", date, time);
    let entry = Entry {
        id: uniqueEntryId(date, time, entries.as_slice()),
        title: if title.is_empty() { DEFAULT_ENTRY_TITLE.to_string() } else { title.to_string() },
        tags: extractTags(&content),
        content,
        created: stamp.clone(),
        updated: stamp,
        timestamp: time.to_string(),
    };
    entries.push(entry);
}

/// Scan the body for "## HH:MM - title" headers; text before the first header is dropped
pub fn parseEntries(body: &str, date: &str) -> Vec<Entry> {
    let lines: Vec<&str> = body.lines().collect();
    let lines = stripFooter(&lines);

    let mut entries = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut bodyLines: Vec<&str> = Vec::new();

    for &line in lines {
        if let Some(caps) = ENTRY_HEADER.captures(line) {
            if let Some((time, title)) = current.take() {
                flushEntry(&mut entries, date, &time, &title, &bodyLines);
            }
            current = Some((caps[1].to_string(), caps[2].trim().to_string()));
            bodyLines.clear();
        } else if current.is_some() {
            bodyLines.push(line);
        }
    }

    if let Some((time, title)) = current {
        flushEntry(&mut entries, date, &time, &title, &bodyLines);
    }
    entries
}

// ============================================
// DAY-FILES
// ============================================

/// Parse a day-file; the date always comes from the path
pub fn parseDayFile(path: &Path, content: &str) -> JournalResult<DayFile> {
    let date = parseDateFromPath(path).ok_or_else(|| JournalError::Parse {
        path: path.to_path_buf(),
        reason: "file name is not YYYY-MM-DD.md".to_string(),
    })?;

    let (fm, body) = parseFrontmatter::<DayFileFrontmatter>(content);
    let fm = fm.unwrap_or_else(|e| {
        tracing::warn!("[parseDayFile] Malformed metadata in {}: {}, using defaults", path.display(), e);
        DayFileFrontmatter::default()
    });

    let mut entries = parseEntries(body, &date);
    for entry in &mut entries {
        if let Some(extra) = fm.entry_tags.get(&entry.id) {
            let mut tags = std::mem::take(&mut entry.tags);
            tags.extend(extra.iter().map(|t| cleanExplicitTag(t)));
            entry.tags = normalizeTags(tags);
        }
    }

    let tags = normalizeTags(
        fm.tags
            .into_iter()
            .chain(entries.iter().flat_map(|e| e.tags.iter().cloned())),
    );
    let now = isoNow();

    Ok(DayFile {
        title: fm.title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| date.clone()),
        tags,
        created: fm.created.unwrap_or_else(|| now.clone()),
        updated: fm.updated.unwrap_or(now),
        entries_count: entries.len(),
        entries,
        filePath: path.to_path_buf(),
        date,
    })
}

/// Tags each entry carries that its content does not spell out as #tags
fn explicitEntryTags(entries: &[Entry]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .filter_map(|entry| {
            let inContent = extractTags(&entry.content);
            let extra: Vec<String> = entry
                .tags
                .iter()
                .filter(|t| !inContent.contains(t))
                .cloned()
                .collect();
            (!extra.is_empty()).then(|| (entry.id.clone(), extra))
        })
        .collect()
}

/// Serialize a day-file to frontmatter + markdown
pub fn formatDayFile(file: &DayFile) -> JournalResult<String> {
    let fm = DayFileFrontmatter {
        title: Some(file.title.clone()),
        tags: file.tags.clone(),
        created: Some(file.created.clone()),
        updated: Some(file.updated.clone()),
        entries_count: Some(file.entries.len()),
        entry_tags: explicitEntryTags(&file.entries),
    };

    let mut body = format!("# {}\n\n", file.title);
    for entry in &file.entries {
        body.push_str(&format!("## {} - {}\n", entry.timestamp, entry.title));
        body.push_str(&escapeHeaderLines(&entry.content));
        body.push_str("\n\n");
    }
    body.push_str(&format!(
        "---\n*Last updated: {} | Entries: {}*\n",
        file.updated,
        file.entries.len()
    ));

    toMarkdown(&fm, &body)
}
