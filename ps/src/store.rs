//! Core ProgressStore implementation

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use fs2::FileExt;
use log::{debug, info, warn};

use crate::record::{ProgressRecord, SkippedEntry};
use crate::{LOCK_FILE, PROGRESS_FILE, SKIPPED_FILE};

/// Durable store for solve/skip progress
///
/// Holds an exclusive advisory lock on the store directory for its whole
/// lifetime: interleaved load/save cycles from two concurrent runs would
/// silently lose markings, so a second open against the same directory
/// fails instead.
pub struct ProgressStore {
    base_path: PathBuf,
    _lock: File,
}

impl ProgressStore {
    /// Open or create a progress store at the given directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let lock_path = base_path.join(LOCK_FILE);
        let lock = File::create(&lock_path).context("Failed to create lock file")?;
        lock.try_lock_exclusive()
            .context("Another run holds the progress lock for this store")?;

        debug!("opened progress store at {}", base_path.display());
        Ok(Self { base_path, _lock: lock })
    }

    /// Path of the progress record file
    pub fn progress_path(&self) -> PathBuf {
        self.base_path.join(PROGRESS_FILE)
    }

    /// Path of the skipped-attempts log
    pub fn skipped_path(&self) -> PathBuf {
        self.base_path.join(SKIPPED_FILE)
    }

    /// Load the progress record
    ///
    /// A missing file yields an empty record - the first run is not a
    /// failure. A present-but-unreadable file is an error: continuing
    /// without prior progress would re-submit solved problems.
    pub fn load(&self) -> Result<ProgressRecord> {
        let path = self.progress_path();
        if !path.exists() {
            info!("no progress file at {}, starting empty", path.display());
            return Ok(ProgressRecord::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read progress file")?;
        let record: ProgressRecord =
            serde_json::from_str(&content).context(format!("Progress file is corrupt: {}", path.display()))?;
        debug!("loaded {} terminal problems", record.len());
        Ok(record)
    }

    /// Persist the progress record
    ///
    /// Writes to a temp file in the same directory and renames it over the
    /// record, so a crash mid-save leaves the previous record intact.
    pub fn save(&self, record: &ProgressRecord) -> Result<()> {
        let path = self.progress_path();
        let tmp_path = self.base_path.join(format!("{PROGRESS_FILE}.tmp"));

        let content = serde_json::to_string_pretty(record)?;
        fs::write(&tmp_path, content).context("Failed to write progress temp file")?;
        fs::rename(&tmp_path, &path).context("Failed to move progress file into place")?;

        debug!("saved {} terminal problems", record.len());
        Ok(())
    }

    /// Append one entry to the skipped-attempts log and flush it
    pub fn append_skipped(&self, entry: &SkippedEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.skipped_path())
            .context("Failed to open skipped log")?;

        let line = serde_json::to_string(entry)?;
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }

    /// Read the whole skipped-attempts log
    ///
    /// Lines that fail to parse are skipped with a warning - the log is
    /// informational, a torn trailing line must not fail inspection.
    pub fn read_skipped(&self) -> Result<Vec<SkippedEntry>> {
        let path = self.skipped_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path).context("Failed to open skipped log")?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("ignoring malformed skipped-log line: {e}"),
            }
        }
        Ok(entries)
    }

    /// Clear the record and the skipped log
    pub fn reset_all(&self) -> Result<()> {
        self.save(&ProgressRecord::default())?;
        let skipped = self.skipped_path();
        if skipped.exists() {
            fs::remove_file(&skipped).context("Failed to remove skipped log")?;
        }
        info!("reset progress store at {}", self.base_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_returns_empty_record_on_first_run() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::open(temp.path().join("store")).unwrap();

        let record = store.load().unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_save_load_round_trip_across_store_handles() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("store");

        let mut record = ProgressRecord::default();
        record.mark_solved(17);
        record.mark_skipped(42);

        {
            let store = ProgressStore::open(&dir).unwrap();
            store.save(&record).unwrap();
        }

        // Fresh handle, as after a process restart.
        let store = ProgressStore::open(&dir).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.terminal_ids(), record.terminal_ids());
    }

    #[test]
    fn test_corrupt_progress_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::open(temp.path()).unwrap();
        fs::write(store.progress_path(), "{ not json").unwrap();

        assert!(store.load().is_err());
    }

    #[test]
    fn test_save_leaves_no_temp_file_behind() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::open(temp.path()).unwrap();

        store.save(&ProgressRecord::default()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_skipped_log_appends_and_reads_back() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::open(temp.path()).unwrap();

        store.append_skipped(&SkippedEntry::new(42, "wrong answer")).unwrap();
        store.append_skipped(&SkippedEntry::new(43, "compile error")).unwrap();

        let entries = store.read_skipped().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].problem_id, 42);
        assert_eq!(entries[0].outcome, "wrong answer");
        assert_eq!(entries[1].problem_id, 43);
    }

    #[test]
    fn test_read_skipped_tolerates_torn_line() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::open(temp.path()).unwrap();

        store.append_skipped(&SkippedEntry::new(1, "runtime error")).unwrap();
        let mut file = OpenOptions::new().append(true).open(store.skipped_path()).unwrap();
        write!(file, "{{\"problem_id\": 2,").unwrap();

        let entries = store.read_skipped().unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_second_open_of_same_store_fails() {
        let temp = TempDir::new().unwrap();
        let _first = ProgressStore::open(temp.path()).unwrap();

        assert!(ProgressStore::open(temp.path()).is_err());
    }

    #[test]
    fn test_reset_all_clears_record_and_log() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::open(temp.path()).unwrap();

        let mut record = ProgressRecord::default();
        record.mark_solved(9);
        store.save(&record).unwrap();
        store.append_skipped(&SkippedEntry::new(8, "wrong answer")).unwrap();

        store.reset_all().unwrap();

        assert!(store.load().unwrap().is_empty());
        assert!(store.read_skipped().unwrap().is_empty());
    }
}
