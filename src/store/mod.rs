//! Durable progress data: the per-chapter score map and the capped history log.
//!
//! Reads never fail: missing or corrupt records come back as empty values.
//! Writes are best-effort and report whether they reached the backend.

pub mod memory;
pub mod sqlite;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;
use crate::logger;
use crate::models::{HistoryEntry, ProgressMap, ScoreKind};

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

pub const PROGRESS_KEY: &str = "aicademy_progress";
pub const HISTORY_KEY: &str = "aicademy_progress_history";
pub const SUMMARIES_KEY: &str = "aicademy_summaries";

pub const HISTORY_CAP: usize = 100;

/// Raw string storage keyed by well-known names.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every pair or none of them.
    fn put_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;
}

#[derive(Clone, Default)]
pub struct ProgressStore {
    backend: Option<Arc<dyn KeyValueBackend>>,
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("available", &self.is_available())
            .finish()
    }
}

impl ProgressStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend: Some(backend),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// A store with no storage medium behind it. Reads are empty, writes do nothing.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn read_progress(&self) -> ProgressMap {
        self.read_record(PROGRESS_KEY)
    }

    /// Most recent entry first.
    pub fn read_history(&self) -> Vec<HistoryEntry> {
        self.read_record(HISTORY_KEY)
    }

    pub fn record_score(&self, subject: &str, chapter: &str, score: u8, kind: ScoreKind) -> bool {
        self.record_score_at(subject, chapter, score, kind, Utc::now())
    }

    /// Upsert the chapter score and prepend a history entry in one backend write.
    pub fn record_score_at(
        &self,
        subject: &str,
        chapter: &str,
        score: u8,
        kind: ScoreKind,
        at: DateTime<Utc>,
    ) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };
        let Ok(_guard) = self.write_lock.lock() else {
            logger::error("progress store write lock poisoned");
            return false;
        };
        let score = score.min(100);

        // A read error must not be mistaken for empty data, or the write
        // below would replace every stored score with this one.
        let loaded = load_for_update::<ProgressMap>(backend.as_ref(), PROGRESS_KEY).and_then(
            |progress| {
                load_for_update::<Vec<HistoryEntry>>(backend.as_ref(), HISTORY_KEY)
                    .map(|history| (progress, history))
            },
        );
        let (mut progress, mut history) = match loaded {
            Ok(records) => records,
            Err(e) => {
                logger::error(&format!(
                    "Not saving {} progress, stored records unreadable: {}",
                    kind.label(),
                    e
                ));
                return false;
            }
        };

        progress
            .entry(subject.to_string())
            .or_default()
            .chapters
            .entry(chapter.to_string())
            .or_default()
            .set(kind, score);

        history.insert(
            0,
            HistoryEntry {
                timestamp: at,
                subject: subject.to_string(),
                chapter: chapter.to_string(),
                score,
                kind,
            },
        );
        history.truncate(HISTORY_CAP);

        let result = encode(&progress)
            .and_then(|p| encode(&history).map(|h| (p, h)))
            .and_then(|(p, h)| backend.put_many(&[(PROGRESS_KEY, p), (HISTORY_KEY, h)]));

        match result {
            Ok(()) => {
                logger::log(&format!(
                    "Recorded {} score {} for {} / {}",
                    kind.label(),
                    score,
                    subject,
                    chapter
                ));
                true
            }
            Err(e) => {
                logger::error(&format!("Failed to save {} progress: {}", kind.label(), e));
                false
            }
        }
    }

    /// Decode a JSON record, falling back to `T::default()` on any failure.
    pub fn read_record<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let Some(backend) = &self.backend else {
            return T::default();
        };
        match backend.get(key) {
            Ok(Some(raw)) => decode_or_default(key, &raw),
            Ok(None) => T::default(),
            Err(e) => {
                logger::warn(&format!("Failed to read {}: {}", key, e));
                T::default()
            }
        }
    }

    pub fn write_record<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };
        let result = encode(value).and_then(|raw| backend.put_many(&[(key, raw)]));
        if let Err(e) = &result {
            logger::error(&format!("Failed to write {}: {}", key, e));
        }
        result.is_ok()
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    Ok(serde_json::to_string(value)?)
}

fn decode_or_default<T: DeserializeOwned + Default>(key: &str, raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        logger::warn(&format!("Discarding corrupt record {}: {}", key, e));
        T::default()
    })
}

/// Like `read_record`, but a backend failure is an error rather than empty data.
fn load_for_update<T>(backend: &dyn KeyValueBackend, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    Ok(match backend.get(key)? {
        Some(raw) => decode_or_default(key, &raw),
        None => T::default(),
    })
}
