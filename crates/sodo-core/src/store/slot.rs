// ── Durable key-value slots ──
//
// The store only ever reads and writes one key. Implementations decide
// where the value lives.

use std::collections::HashMap;
use std::io;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A durable string slot addressed by key.
pub trait KeyValueSlot: Send + Sync {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

// ── File-backed slot ────────────────────────────────────────────────

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temp file in the same directory first and are renamed
/// into place, so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueSlot for FileSlot {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

// ── In-memory slot ──────────────────────────────────────────────────

/// Process-local slot for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let slot = Self::new();
        if let Ok(mut values) = slot.values.lock() {
            values.insert(key.to_owned(), value.into());
        }
        slot
    }

    fn values(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| io::Error::other("memory slot lock poisoned"))
    }
}

impl KeyValueSlot for MemorySlot {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.values()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.values()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("nested"));
        assert_eq!(slot.read("k").unwrap(), None);
        slot.write("k", "{\"a\":1}").unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(slot.path_for("k").ends_with("nested/k.json"));
        slot.remove("k").unwrap();
        assert_eq!(slot.read("k").unwrap(), None);
        slot.remove("k").unwrap();
    }

    #[test]
    fn memory_slot_round_trip() {
        let slot = MemorySlot::with_value("k", "v");
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("v"));
        slot.write("k", "w").unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("w"));
        slot.remove("k").unwrap();
        assert_eq!(slot.read("k").unwrap(), None);
    }
}
