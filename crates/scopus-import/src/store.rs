//! Collaborator stores the pipeline depends on.
//!
//! The pipeline itself owns no persistence. It reads observed authors and
//! already-known scopus ids from a [`ContentStore`], hands every emitted
//! record back to it, and keeps its meta cache in a single blob behind a
//! [`CacheStore`]. The JSON file implementations here are the stand-ins for
//! the CMS layer the original system ran inside.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult, ImportError, ImportResult};
use crate::models::{ImportRecord, ObservedAuthor};

/// Store of locally persisted authors and publications.
pub trait ContentStore {
    /// All observed authors whose publications should be imported.
    fn list_observed_authors(&self) -> ImportResult<Vec<ObservedAuthor>>;

    /// Scopus ids of all publications that are already persisted locally.
    fn list_known_scopus_ids(&self) -> ImportResult<HashSet<String>>;

    /// Persist one imported publication, returning its local id. Records are
    /// persisted one by one as the pipeline emits them; there is no batching
    /// or transaction guarantee across a run.
    fn insert(&mut self, record: &ImportRecord) -> ImportResult<i64>;
}

/// Persistence backend for the meta cache: one blob-valued key.
pub trait CacheStore {
    /// Load the serialized cache blob, `None` if nothing was saved yet.
    fn load(&self) -> CacheResult<Option<String>>;

    /// Overwrite the serialized cache blob.
    fn save(&self, blob: &str) -> CacheResult<()>;
}

/// File-backed cache store: the blob is one JSON file.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> CacheResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path).map(Some).map_err(|e| CacheError::persistence(e.to_string()))
    }

    fn save(&self, blob: &str) -> CacheResult<()> {
        fs::write(&self.path, blob).map_err(|e| CacheError::persistence(e.to_string()))
    }
}

/// In-memory cache store for tests.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    blob: Mutex<Option<String>>,
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> CacheResult<Option<String>> {
        Ok(self.blob.lock().expect("cache store lock").clone())
    }

    fn save(&self, blob: &str) -> CacheResult<()> {
        *self.blob.lock().expect("cache store lock") = Some(blob.to_string());
        Ok(())
    }
}

/// Shape of the JSON content file the CLI consumes.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ContentFile {
    /// Observed authors to import publications for.
    #[serde(default)]
    observed_authors: Vec<ObservedAuthor>,

    /// Scopus ids of publications imported in earlier runs.
    #[serde(default)]
    known_scopus_ids: Vec<String>,
}

/// JSON-file content store.
///
/// Authors and known ids come from one input file; imported records are
/// appended to an output file as JSON lines, so each record is durable the
/// moment the pipeline emits it.
#[derive(Debug)]
pub struct JsonContentStore {
    content: ContentFile,
    output_path: PathBuf,
    next_id: i64,
}

impl JsonContentStore {
    /// Open the store from an authors file and an output path.
    pub fn open(content_path: &Path, output_path: impl Into<PathBuf>) -> ImportResult<Self> {
        let raw = fs::read_to_string(content_path)
            .map_err(|e| ImportError::store(format!("{}: {e}", content_path.display())))?;
        let content: ContentFile = serde_json::from_str(&raw)
            .map_err(|e| ImportError::store(format!("{}: {e}", content_path.display())))?;
        Ok(Self { content, output_path: output_path.into(), next_id: 1 })
    }
}

impl ContentStore for JsonContentStore {
    fn list_observed_authors(&self) -> ImportResult<Vec<ObservedAuthor>> {
        Ok(self.content.observed_authors.clone())
    }

    fn list_known_scopus_ids(&self) -> ImportResult<HashSet<String>> {
        Ok(self.content.known_scopus_ids.iter().cloned().collect())
    }

    fn insert(&mut self, record: &ImportRecord) -> ImportResult<i64> {
        let line = serde_json::to_string(record)
            .map_err(|e| ImportError::store(format!("serializing record: {e}")))?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .map_err(|e| ImportError::store(format!("{}: {e}", self.output_path.display())))?;
        writeln!(file, "{line}")
            .map_err(|e| ImportError::store(format!("{}: {e}", self.output_path.display())))?;

        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }
}
