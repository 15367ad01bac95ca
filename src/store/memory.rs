use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::KeyValueBackend;
use crate::error::StorageError;

/// In-process backend. Used by tests and when no data directory is usable.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_next_read: AtomicBool,
}

impl MemoryBackend {
    /// Make every subsequent write fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the next read fail with an I/O error, then recover.
    pub fn fail_next_read(&self) {
        self.fail_next_read.store(true, Ordering::SeqCst);
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_next_read.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("read failed")));
        }
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn put_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("writes disabled")));
        }
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in entries {
            values.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let backend = MemoryBackend::default();
        assert!(backend.get("absent").unwrap().is_none());
    }

    #[test]
    fn test_put_many_then_get() {
        let backend = MemoryBackend::default();
        backend
            .put_many(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(backend.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_failing_writes() {
        let backend = MemoryBackend::default();
        backend.set_fail_writes(true);
        assert!(backend.put_many(&[("a", "1".to_string())]).is_err());
        assert!(backend.get("a").unwrap().is_none());
    }
}
