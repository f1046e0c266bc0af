#![allow(non_snake_case)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use journal_lib::{
    AddEntryOptions, JournalConfig, JournalError, JournalStore, SearchOptions, TagCount,
};
use tempfile::TempDir;

fn openStore(dir: &TempDir) -> JournalStore {
    JournalStore::new(JournalConfig::new(dir.path()))
}

fn at(date: &str, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date");
    FixedOffset::east_opt(0)
        .unwrap()
        .from_local_datetime(&day.and_hms_opt(hour, minute, 0).unwrap())
        .single()
        .unwrap()
}

fn dayPath(dir: &TempDir, date: &str) -> PathBuf {
    let (year, rest) = date.split_at(4);
    let month = &rest[1..3];
    dir.path().join("entries").join(year).join(month).join(format!("{}.md", date))
}

fn filesIn(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

async fn addOn(store: &JournalStore, date: &str, content: &str) {
    store
        .addEntryAt(AddEntryOptions::new(content), at(date, 9, 0))
        .await
        .expect("entry added");
}

#[tokio::test]
async fn first_entry_creates_the_day_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);

    let entry = store
        .addEntryAt(
            AddEntryOptions::new("# Morning pages\nRead about #rust").withTags(["work"]),
            at("2024-01-15", 9, 30),
        )
        .await
        .unwrap();

    assert_eq!(entry.id, "2024-01-15-0930");
    assert_eq!(entry.title, "Morning pages");
    assert_eq!(entry.timestamp, "09:30");
    assert_eq!(entry.tags, vec!["rust", "work"]);
    assert!(dayPath(&dir, "2024-01-15").is_file());

    let file = store.getEntryByDate("2024-01-15").await.unwrap().expect("day-file");
    assert_eq!(file.date, "2024-01-15");
    assert_eq!(file.title, "2024-01-15");
    assert_eq!(file.entries_count, 1);
    assert_eq!(file.tags, vec!["rust", "work"]);
    assert_eq!(file.entries[0].tags, vec!["rust", "work"]);
    assert_eq!(file.filePath, dayPath(&dir, "2024-01-15"));
}

#[tokio::test]
async fn appends_keep_order_and_leave_no_backup() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);

    store.addEntryAt(AddEntryOptions::new("first #a"), at("2024-01-15", 8, 0)).await.unwrap();
    store.addEntryAt(AddEntryOptions::new("second #b"), at("2024-01-15", 12, 45)).await.unwrap();

    let file = store.getEntryByDate("2024-01-15").await.unwrap().unwrap();
    assert_eq!(file.entries_count, 2);
    let titles: Vec<&str> = file.entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["first #a", "second #b"]);
    assert_eq!(file.tags, vec!["a", "b"]);
    assert_eq!(file.updated, "2024-01-15T12:45:00.000+00:00");
    assert_eq!(file.created, "2024-01-15T08:00:00.000+00:00");

    let monthDir = dayPath(&dir, "2024-01-15").parent().unwrap().to_path_buf();
    assert_eq!(filesIn(&monthDir), vec!["2024-01-15.md"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_adds_to_one_day_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(openStore(&dir));
    let when = at("2024-01-15", 9, 30);

    let a = {
        let store = store.clone();
        tokio::spawn(async move { store.addEntryAt(AddEntryOptions::new("from a"), when).await })
    };
    let b = {
        let store = store.clone();
        tokio::spawn(async move { store.addEntryAt(AddEntryOptions::new("from b"), when).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let file = store.getEntryByDate("2024-01-15").await.unwrap().unwrap();
    assert_eq!(file.entries_count, 2);
    let mut ids: Vec<&str> = file.entries.iter().map(|e| e.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["2024-01-15-0930", "2024-01-15-0930-2"]);

    let monthDir = dayPath(&dir, "2024-01-15").parent().unwrap().to_path_buf();
    assert_eq!(filesIn(&monthDir), vec!["2024-01-15.md"]);
}

#[tokio::test]
async fn existing_hand_written_file_is_extended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dayPath(&dir, "2024-02-01");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        "---\ntitle: Offsite\ntags:\n  - team\n---\n# Offsite\n\n## 08:00 - Breakfast\nPancakes\n",
    )
    .unwrap();

    let store = openStore(&dir);
    store
        .addEntryAt(AddEntryOptions::new("Lunch #food"), at("2024-02-01", 12, 0))
        .await
        .unwrap();

    let file = store.getEntryByDate("2024-02-01").await.unwrap().unwrap();
    assert_eq!(file.title, "Offsite");
    assert_eq!(file.tags, vec!["food", "team"]);
    assert_eq!(file.entries_count, 2);
    assert_eq!(file.entries[0].title, "Breakfast");
    assert_eq!(file.entries[0].content, "Pancakes");
    assert_eq!(file.entries[1].id, "2024-02-01-1200");

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("entries_count: 2"));
    assert!(raw.contains("## 12:00 - Lunch #food"));
    assert_eq!(raw.matches("*Last updated:").count(), 1);
}

#[tokio::test]
async fn write_failure_propagates_and_releases_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    // A directory squatting on the day-file path makes every write fail
    std::fs::create_dir_all(dayPath(&dir, "2024-03-03")).unwrap();
    let store = openStore(&dir);

    let first = store.addEntryAt(AddEntryOptions::new("x"), at("2024-03-03", 10, 0)).await;
    assert!(matches!(first, Err(JournalError::Write { .. })));

    let second = tokio::time::timeout(
        Duration::from_secs(5),
        store.addEntryAt(AddEntryOptions::new("y"), at("2024-03-03", 10, 1)),
    )
    .await
    .expect("lock was released after the failure");
    assert!(second.is_err());

    // Other days are unaffected
    addOn(&store, "2024-03-04", "fine").await;
}

#[tokio::test]
async fn date_range_search_is_inclusive_and_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);
    for date in ["2024-01-05", "2024-01-10", "2024-01-15", "2024-01-20", "2024-01-25"] {
        addOn(&store, date, "note").await;
    }

    let result = store
        .searchEntries(&SearchOptions::dateRange("2024-01-10", "2024-01-20"))
        .await
        .unwrap();
    let dates: Vec<&str> = result.entries.iter().map(|f| f.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-20", "2024-01-15", "2024-01-10"]);
    assert_eq!(result.total, 3);
    assert!(!result.hasMore);
}

#[tokio::test]
async fn tag_search_requires_every_tag() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);
    addOn(&store, "2024-01-01", "#work only").await;
    addOn(&store, "2024-01-02", "#urgent only").await;
    addOn(&store, "2024-01-03", "#work and #urgent").await;

    let result = store.searchEntries(&SearchOptions::tags(["work", "urgent"])).await.unwrap();
    let dates: Vec<&str> = result.entries.iter().map(|f| f.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-03"]);
}

#[tokio::test]
async fn keyword_search_ignores_case() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);
    addOn(&store, "2024-01-01", "Paired on the Tokio runtime").await;
    addOn(&store, "2024-01-02", "Gardening").await;

    let result = store.searchEntries(&SearchOptions::keywords("tokio")).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.entries[0].date, "2024-01-01");
}

#[tokio::test]
async fn pagination_reports_total_and_more() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);
    for day in 1..=5 {
        addOn(&store, &format!("2024-04-{:02}", day), "entry").await;
    }

    let options = SearchOptions {
        limit: Some(2),
        offset: Some(2),
        ..Default::default()
    };
    let page = store.searchEntries(&options).await.unwrap();
    let dates: Vec<&str> = page.entries.iter().map(|f| f.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-04-03", "2024-04-02"]);
    assert_eq!(page.total, 5);
    assert!(page.hasMore);

    let last = SearchOptions {
        limit: Some(2),
        offset: Some(4),
        ..Default::default()
    };
    let page = store.searchEntries(&last).await.unwrap();
    assert_eq!(page.entries.len(), 1);
    assert!(!page.hasMore);
}

#[tokio::test]
async fn recent_entries_use_configured_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = JournalConfig::new(dir.path());
    config.recentLimit = 2;
    let store = JournalStore::new(config);
    for date in ["2024-05-01", "2024-05-02", "2024-05-03"] {
        addOn(&store, date, "entry").await;
    }

    let recent = store.getRecentEntries(None).await.unwrap();
    let dates: Vec<&str> = recent.iter().map(|f| f.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-05-03", "2024-05-02"]);

    assert_eq!(store.getRecentEntries(Some(10)).await.unwrap().len(), 3);
    assert_eq!(store.getRecentEntries(Some(0)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn zero_limit_falls_back_to_search_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = JournalConfig::new(dir.path());
    config.searchLimit = 3;
    let store = JournalStore::new(config);
    for day in 1..=4 {
        addOn(&store, &format!("2024-09-{:02}", day), "entry").await;
    }

    let options = SearchOptions {
        limit: Some(0),
        ..Default::default()
    };
    let page = store.searchEntries(&options).await.unwrap();
    assert_eq!(page.entries.len(), store.config().searchLimit);
    assert_eq!(page.total, 4);
    assert!(page.hasMore);
}

#[tokio::test]
async fn store_exposes_its_config_and_layout() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);

    assert_eq!(store.config().dataDir, dir.path());
    assert_eq!(store.config().webPort, 3000);
    assert_eq!(store.paths().dataDir(), dir.path());
    assert_eq!(store.paths().entriesDir(), dir.path().join("entries"));

    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    assert_eq!(store.paths().dayFilePath(day), dayPath(&dir, "2024-01-15"));
}

#[tokio::test]
async fn undated_and_headerless_files_are_handled() {
    let dir = tempfile::tempdir().unwrap();
    let entries = dir.path().join("entries");
    std::fs::create_dir_all(entries.join("2024/01")).unwrap();
    std::fs::write(entries.join("README.md"), "## 09:00 - not a day-file\n").unwrap();
    std::fs::write(entries.join("2024/01/2024-01-31.md"), "# just prose, no entries\n").unwrap();

    let store = openStore(&dir);
    let result = store.searchEntries(&SearchOptions::default()).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.entries[0].date, "2024-01-31");
    assert!(result.entries[0].entries.is_empty());
}

#[tokio::test]
async fn list_tags_counts_files_not_entries() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);
    addOn(&store, "2024-06-01", "#a #b").await;
    store.addEntryAt(AddEntryOptions::new("again #a"), at("2024-06-01", 10, 0)).await.unwrap();
    addOn(&store, "2024-06-02", "#a").await;

    assert_eq!(
        store.listTags().await.unwrap(),
        vec![
            TagCount { tag: "a".to_string(), count: 2 },
            TagCount { tag: "b".to_string(), count: 1 },
        ]
    );
}

#[tokio::test]
async fn stats_on_empty_store_are_zeroed() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);

    let stats = store.getStats().await.unwrap();
    assert_eq!(stats.totalEntries, 0);
    assert_eq!(stats.totalFiles, 0);
    assert_eq!(stats.dateRange.earliest, "");
    assert_eq!(stats.dateRange.latest, "");
    assert!(stats.topTags.is_empty());
}

#[tokio::test]
async fn stats_sum_entries_and_span_dates() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);
    addOn(&store, "2023-12-30", "#x one").await;
    store.addEntryAt(AddEntryOptions::new("two"), at("2023-12-30", 18, 0)).await.unwrap();
    addOn(&store, "2024-01-02", "#x #y three").await;

    let stats = store.getStats().await.unwrap();
    assert_eq!(stats.totalEntries, 3);
    assert_eq!(stats.totalFiles, 2);
    assert_eq!(stats.dateRange.earliest, "2023-12-30");
    assert_eq!(stats.dateRange.latest, "2024-01-02");
    assert_eq!(stats.topTags[0], TagCount { tag: "x".to_string(), count: 2 });
}

#[tokio::test]
async fn lookup_by_date_handles_missing_and_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);

    assert!(store.getEntryByDate("2024-07-04").await.unwrap().is_none());
    assert!(matches!(
        store.getEntryByDate("July 4th").await,
        Err(JournalError::InvalidDate(_))
    ));
}

#[tokio::test]
async fn results_serialize_with_collaborator_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = openStore(&dir);
    addOn(&store, "2024-08-08", "hello #json").await;

    let result = store.searchEntries(&SearchOptions::default()).await.unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["hasMore"], false);
    assert_eq!(json["entries"][0]["entries_count"], 1);
    assert!(json["entries"][0]["filePath"].is_string());

    let stats = serde_json::to_value(store.getStats().await.unwrap()).unwrap();
    assert_eq!(stats["totalEntries"], 1);
    assert_eq!(stats["dateRange"]["earliest"], "2024-08-08");
    assert_eq!(stats["topTags"][0]["tag"], "json");
}
