//! Best-score persistence.
//!
//! The game only needs to read one number at start-up and write it back when
//! it grows, so the surface is a two-method trait. [`FileStore`] keeps the
//! value in a one-line TOML document:
//!
//! ```toml
//! best_score = 20480
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed score file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("toml serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where the best score lives between sessions.
pub trait ScoreStore {
    /// The stored best score, `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<u64>, StoreError>;

    fn save(&mut self, best: u64) -> Result<(), StoreError>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn load(&self) -> Result<Option<u64>, StoreError> { (**self).load() }

    fn save(&mut self, best: u64) -> Result<(), StoreError> { (**self).save(best) }
}

/// In-process store; forgets everything on drop.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    best: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_best(best: u64) -> Self { Self { best: Some(best) } }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u64>, StoreError> { Ok(self.best) }

    fn save(&mut self, best: u64) -> Result<(), StoreError> {
        self.best = Some(best);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct ScoreFile {
    best_score: u64,
}

/// TOML-backed store. Writes go to a sibling temp file which is then renamed
/// over the target, so a crash never leaves a half-written score behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self { Self { path: path.as_ref().to_path_buf() } }

    pub fn path(&self) -> &Path { &self.path }
}

impl ScoreStore for FileStore {
    fn load(&self) -> Result<Option<u64>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: ScoreFile = toml::from_str(&text)?;
        Ok(Some(file.best_score))
    }

    fn save(&mut self, best: u64) -> Result<(), StoreError> {
        let text = toml::to_string(&ScoreFile { best_score: best })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(128).unwrap();
        assert_eq!(store.load().unwrap(), Some(128));
        assert_eq!(MemoryStore::with_best(4).load().unwrap(), Some(4));
    }

    #[test]
    fn missing_file_is_no_score() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("best.toml"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best.toml");
        let mut store = FileStore::new(&path);
        store.save(20480).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "best_score = 20480");
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(FileStore::new(&path).load().unwrap(), Some(20480));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best.toml");
        fs::write(&path, "best_score = \"lots\"").unwrap();
        assert!(matches!(FileStore::new(&path).load(), Err(StoreError::Parse(_))));
    }
}
