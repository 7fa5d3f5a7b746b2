//! Table Cache Module
//! Caller-side memoization of load-and-derive, keyed by path and mtime.

use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use super::loader::{LoaderError, SalesLoader};

struct CacheEntry {
    modified: Option<SystemTime>,
    table: DataFrame,
}

/// Memoizes cleaned sales tables by source path.
///
/// The loader itself is a pure function; this cache owns the memoization
/// and invalidates an entry when the file's modification time changes.
/// The derived margin column is attached exactly once per cached entry.
#[derive(Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cleaned table for `path`, loading it on a miss or when
    /// the file changed on disk since it was cached.
    pub fn get_or_load(&mut self, path: &Path) -> Result<DataFrame, LoaderError> {
        let modified = Self::modification_time(path);

        if let Some(entry) = self.entries.get(path) {
            if entry.modified == modified && modified.is_some() {
                debug!(path = %path.display(), "sales table served from cache");
                return Ok(entry.table.clone());
            }
        }

        let table = SalesLoader::load(path)?;
        let table = SalesLoader::derive_margin(&table)?;

        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                table: table.clone(),
            },
        );

        Ok(table)
    }

    /// Drop every cached table.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn modification_time(path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|meta| meta.modified()).ok()
    }
}
