// Entry write path
// lock -> backup + parse (or fresh file) -> append -> serialize -> write -> cleanup -> unlock

use chrono::{DateTime, FixedOffset};
use std::future::Future;
use std::path::{Path, PathBuf};

use super::common::{isoTimestamp, now};
use super::JournalStore;
use crate::codec::{formatDayFile, newEntry, parseDayFile};
use crate::errors::{JournalError, JournalResult};
use crate::files::{backup, deleteFile, fileExists, readIfExists, writeWithDir};
use crate::models::{AddEntryOptions, DayFile, Entry};
use crate::storage::DATE_FORMAT;

impl JournalStore {
    /// Append an entry to today's day-file
    pub async fn addEntry(&self, options: AddEntryOptions) -> JournalResult<Entry> {
        self.addEntryAt(options, now()).await
    }

    /// Append an entry stamped at `at`; the day-file is picked from its local date
    pub async fn addEntryAt(&self, options: AddEntryOptions, at: DateTime<FixedOffset>) -> JournalResult<Entry> {
        self.addEntryWith(options, at, |path, content| async move { writeWithDir(&path, &content).await })
            .await
    }

    async fn addEntryWith<W, Fut>(
        &self,
        options: AddEntryOptions,
        at: DateTime<FixedOffset>,
        write: W,
    ) -> JournalResult<Entry>
    where
        W: FnOnce(PathBuf, String) -> Fut,
        Fut: Future<Output = JournalResult<()>>,
    {
        let filePath = self.paths.dayFilePath(at.date_naive());

        let guard = self.locks.acquire(&filePath).await;
        tracing::debug!("[addEntry] Lock acquired for {}", guard.key().display());

        let mut backupPath: Option<PathBuf> = None;
        let result = self.appendEntry(&filePath, &options, &at, &mut backupPath, write).await;

        match &result {
            Ok(entry) => {
                if let Some(path) = &backupPath {
                    if let Err(e) = deleteFile(path).await {
                        tracing::warn!("[addEntry] Could not remove backup {}: {}", path.display(), e);
                    }
                }
                tracing::info!("[addEntry] Added {} to {}", entry.id, filePath.display());
            }
            Err(e) => {
                if let Some(path) = &backupPath {
                    tracing::error!("[addEntry] Write failed, backup file preserved at: {}", path.display());
                }
                tracing::error!("[addEntry] ERROR: {}", e);
            }
        }

        guard.release();
        result
    }

    async fn appendEntry<W, Fut>(
        &self,
        filePath: &Path,
        options: &AddEntryOptions,
        at: &DateTime<FixedOffset>,
        backupPath: &mut Option<PathBuf>,
        write: W,
    ) -> JournalResult<Entry>
    where
        W: FnOnce(PathBuf, String) -> Fut,
        Fut: Future<Output = JournalResult<()>>,
    {
        let stamp = isoTimestamp(at);
        let explicitTags = options.tags.as_deref();

        let (file, entry) = match readIfExists(filePath).await {
            Some(existing) => {
                *backupPath = backup(filePath).await?;

                let mut file = parseDayFile(filePath, &existing).map_err(|e| JournalError::write(filePath, e))?;
                let entry = newEntry(&options.content, explicitTags, at, &file.entries);
                file.push(entry.clone(), &stamp);
                (file, entry)
            }
            None => {
                // Present but unreadable: refuse rather than clobber it with a fresh file
                if fileExists(filePath).await {
                    return Err(JournalError::write(filePath, "existing day-file could not be read"));
                }

                let date = at.format(DATE_FORMAT).to_string();
                let entry = newEntry(&options.content, explicitTags, at, &[]);
                let file = DayFile::withFirstEntry(&date, filePath.to_path_buf(), entry.clone(), &stamp);
                (file, entry)
            }
        };

        let content = formatDayFile(&file).map_err(|e| JournalError::write(filePath, e))?;
        write(filePath.to_path_buf(), content).await?;
        Ok(entry)
    }
}
