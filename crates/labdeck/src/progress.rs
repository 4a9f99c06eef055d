//! Slide progress persistence.
//!
//! One JSON entry under a fixed key, overwritten every few seconds and read
//! once shortly after startup. Last write wins; entries from another
//! experiment are ignored on restore but left in place.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STORAGE_KEY: &str = "experiment-progress";
pub const DEFAULT_EXPERIMENT_ID: &str = "exp1";
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);
pub const RESTORE_DELAY: Duration = Duration::from_millis(500);

const APP_DIR: &str = "labdeck";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("progress storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("progress entry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not determine data directory")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub experiment_id: String,
    pub current_slide: usize,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl ProgressSnapshot {
    pub fn now(experiment_id: &str, current_slide: usize) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            experiment_id: experiment_id.to_string(),
            current_slide,
            timestamp,
        }
    }
}

/// Key-value storage for serialized progress.
pub trait ProgressStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per entry inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        dirs::data_dir()
            .map(|d| Self::new(d.join(APP_DIR)))
            .ok_or(StoreError::NoDataDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ProgressStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.entry_path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.entry_path(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl ProgressStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Overwrite the stored snapshot.
pub fn save(store: &mut dyn ProgressStore, snapshot: &ProgressSnapshot) -> Result<(), StoreError> {
    let json = serde_json::to_string(snapshot)?;
    store.write(STORAGE_KEY, &json)
}

/// Read the stored snapshot, if any.
pub fn load(store: &dyn ProgressStore) -> Result<Option<ProgressSnapshot>, StoreError> {
    match store.read(STORAGE_KEY)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// The slide to restore for `experiment_id`. Missing, unreadable, or foreign
/// entries all yield `None`.
pub fn restorable_slide(store: &dyn ProgressStore, experiment_id: &str) -> Option<usize> {
    match load(store) {
        Ok(Some(snapshot)) if snapshot.experiment_id == experiment_id => {
            Some(snapshot.current_slide)
        }
        Ok(Some(snapshot)) => {
            tracing::debug!(
                stored = %snapshot.experiment_id,
                current = experiment_id,
                "ignoring progress from another experiment"
            );
            None
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("ignoring stored progress: {e}");
            None
        }
    }
}

/// Timing for the periodic autosave and the one-shot deferred restore.
#[derive(Debug, Clone)]
pub struct ProgressSchedule {
    started: Instant,
    last_save: Instant,
    restored: bool,
}

impl ProgressSchedule {
    pub fn new(now: Instant) -> Self {
        Self {
            started: now,
            last_save: now,
            restored: false,
        }
    }

    /// True once per autosave interval.
    pub fn save_due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_save) >= AUTOSAVE_INTERVAL {
            self.last_save = now;
            true
        } else {
            false
        }
    }

    /// True exactly once, after the restore delay has passed.
    pub fn restore_due(&mut self, now: Instant) -> bool {
        if !self.restored && now.saturating_duration_since(self.started) >= RESTORE_DELAY {
            self.restored = true;
            true
        } else {
            false
        }
    }

    /// Drop the pending restore, for an explicitly chosen start slide.
    pub fn skip_restore(&mut self) {
        self.restored = true;
    }

    /// Time until the next scheduled event, for repaint requests.
    pub fn next_wakeup(&self, now: Instant) -> Duration {
        let save_at = self.last_save + AUTOSAVE_INTERVAL;
        let next = if self.restored {
            save_at
        } else {
            save_at.min(self.started + RESTORE_DELAY)
        };
        next.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_same_experiment() {
        let mut store = MemoryStore::default();
        save(&mut store, &ProgressSnapshot::now("exp1", 3)).expect("save");
        assert_eq!(restorable_slide(&store, "exp1"), Some(3));
    }

    #[test]
    fn test_other_experiment_is_ignored_not_cleared() {
        let mut store = MemoryStore::default();
        save(&mut store, &ProgressSnapshot::now("exp1", 3)).expect("save");
        assert_eq!(restorable_slide(&store, "exp2"), None);
        assert!(store.read(STORAGE_KEY).expect("read").is_some());
    }

    #[test]
    fn test_json_layout() {
        let snapshot = ProgressSnapshot {
            experiment_id: "exp1".to_string(),
            current_slide: 2,
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&snapshot).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "experimentId": "exp1",
                "currentSlide": 2,
                "timestamp": 1_700_000_000_000u64,
            })
        );
    }

    #[test]
    fn test_malformed_entry_is_ignored() {
        let mut store = MemoryStore::default();
        store.write(STORAGE_KEY, "{not json").expect("write");
        assert!(load(&store).is_err());
        assert_eq!(restorable_slide(&store, "exp1"), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = MemoryStore::default();
        save(&mut store, &ProgressSnapshot::now("exp1", 1)).expect("save");
        save(&mut store, &ProgressSnapshot::now("exp2", 4)).expect("save");
        assert_eq!(restorable_slide(&store, "exp1"), None);
        assert_eq!(restorable_slide(&store, "exp2"), Some(4));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::new(dir.path().join("nested"));
        assert_eq!(load(&store).expect("empty load"), None);

        save(&mut store, &ProgressSnapshot::now("exp7", 5)).expect("save");
        assert!(store.entry_path(STORAGE_KEY).exists());
        assert_eq!(restorable_slide(&store, "exp7"), Some(5));

        store.remove(STORAGE_KEY).expect("remove");
        store.remove(STORAGE_KEY).expect("removing twice is fine");
        assert_eq!(load(&store).expect("load after remove"), None);
    }

    #[test]
    fn test_schedule_autosave_interval() {
        let t0 = Instant::now();
        let mut schedule = ProgressSchedule::new(t0);
        assert!(!schedule.save_due(t0 + Duration::from_secs(4)));
        assert!(schedule.save_due(t0 + Duration::from_secs(5)));
        assert!(!schedule.save_due(t0 + Duration::from_secs(6)));
        assert!(schedule.save_due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_schedule_restores_once_after_delay() {
        let t0 = Instant::now();
        let mut schedule = ProgressSchedule::new(t0);
        assert!(!schedule.restore_due(t0 + Duration::from_millis(100)));
        assert!(schedule.restore_due(t0 + Duration::from_millis(500)));
        assert!(!schedule.restore_due(t0 + Duration::from_secs(60)));
    }

    #[test]
    fn test_skipped_restore_never_fires() {
        let t0 = Instant::now();
        let mut schedule = ProgressSchedule::new(t0);
        schedule.skip_restore();
        assert!(!schedule.restore_due(t0 + RESTORE_DELAY));
    }

    #[test]
    fn test_next_wakeup() {
        let t0 = Instant::now();
        let mut schedule = ProgressSchedule::new(t0);
        assert_eq!(schedule.next_wakeup(t0), RESTORE_DELAY);
        schedule.restore_due(t0 + RESTORE_DELAY);
        assert_eq!(
            schedule.next_wakeup(t0 + Duration::from_secs(1)),
            Duration::from_secs(4)
        );
    }
}
