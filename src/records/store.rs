use crate::csv_processor::{write_table, CsvStreamReader};
use crate::records::article::{records_from_table, records_to_table};
use crate::records::{ArticleRecord, LanguageCode, Role};
use crate::utils::{Result, WorkflowError};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The article CSV. Every read loads the whole file and every write replaces
/// it; writers inside this process are serialized through `update`.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<ArticleRecord>> {
        let table = CsvStreamReader::new(&self.path).read_table()?;
        records_from_table(&table)
    }

    pub fn save(&self, records: &[ArticleRecord]) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.save_unlocked(records)
    }

    fn save_unlocked(&self, records: &[ArticleRecord]) -> Result<()> {
        let existing = if self.path.exists() {
            Some(CsvStreamReader::new(&self.path).read_headers()?)
        } else {
            None
        };

        let table = records_to_table(records, existing.as_deref());
        let written = write_table(&self.path, table.headers, &table.rows)?;
        debug!(path = %self.path.display(), rows = written, "Record store saved");
        Ok(())
    }

    pub fn find_by_id(&self, id: u64) -> Result<ArticleRecord> {
        self.load()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(WorkflowError::NotFound(id))
    }

    /// Load, mutate and save while holding the writer lock. Nothing is saved
    /// when `apply` fails.
    pub fn update<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<ArticleRecord>) -> Result<T>,
    {
        let _guard = self.write_lock.lock();
        let mut records = self.load()?;
        let outcome = apply(&mut records)?;
        self.save_unlocked(&records)?;
        Ok(outcome)
    }
}

/// Records waiting on `role` in `lang`, ascending by id. Records without a
/// status for `lang` are never queued.
pub fn filter_queue(records: &[ArticleRecord], role: Role, lang: &LanguageCode) -> Vec<ArticleRecord> {
    let mut queued: Vec<ArticleRecord> = records
        .iter()
        .filter(|record| {
            record.status(lang).is_some_and(|s| match role {
                Role::Translator => !s.ai_translated && s.to_be_translated,
                Role::Reviewer => s.ai_translated && !s.translation_reviewed,
                Role::Approver | Role::Admin => !s.approved,
            })
        })
        .cloned()
        .collect();
    queued.sort_by_key(|r| r.id);
    queued
}
