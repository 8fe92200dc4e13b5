//! Table cache keyed by file path and modification time.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use crate::LoadError;

/// How long a loaded table stays fresh when its file is unchanged.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct CacheEntry<T> {
    modified: SystemTime,
    loaded_at: Instant,
    value: Arc<T>,
}

/// Caches loaded tables by path.
///
/// An entry is reused only while the file's modification time matches the
/// one recorded at load time and the entry is younger than the TTL. A zero
/// TTL disables reuse.
#[derive(Debug)]
pub struct TableCache<T> {
    ttl: Duration,
    entries: BTreeMap<PathBuf, CacheEntry<T>>,
}

impl<T> Default for TableCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<T> TableCache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: BTreeMap::new(),
        }
    }

    /// Returns the cached table for `path`, calling `load` when there is no
    /// fresh entry.
    ///
    /// # Errors
    ///
    /// * If the file's metadata cannot be read
    /// * If `load` fails, in which case any stale entry is dropped
    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> Result<Arc<T>, LoadError>
    where
        F: FnOnce(&Path) -> Result<T, LoadError>,
    {
        let modified = modification_time(path)?;

        if let Some(entry) = self.entries.get(path) {
            if entry.modified == modified && entry.loaded_at.elapsed() < self.ttl {
                log::debug!("Cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.value));
            }
            log::debug!("Cache entry for {} is stale", path.display());
        }

        self.entries.remove(path);
        let value = Arc::new(load(path)?);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                loaded_at: Instant::now(),
                value: Arc::clone(&value),
            },
        );
        Ok(value)
    }

    /// Drops the entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.keys()
    }
}

fn modification_time(path: &Path) -> Result<SystemTime, LoadError> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, fs::File};

    use super::*;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("crime_risk_table_cache_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn set_mtime(path: &Path, secs: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    fn read_len(path: &Path, loads: &Cell<u32>) -> Result<usize, LoadError> {
        loads.set(loads.get() + 1);
        Ok(std::fs::read_to_string(path).unwrap().len())
    }

    #[test]
    fn reuses_fresh_entries() {
        let path = scratch_file("fresh.csv", "abc");
        let loads = Cell::new(0);
        let mut cache = TableCache::new(Duration::from_secs(3600));

        let first = cache.get_or_load(&path, |p| read_len(p, &loads)).unwrap();
        let second = cache.get_or_load(&path, |p| read_len(p, &loads)).unwrap();
        assert_eq!(*first, 3);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reloads_when_modification_time_changes() {
        let path = scratch_file("modified.csv", "abc");
        set_mtime(&path, 1_000_000);
        let loads = Cell::new(0);
        let mut cache = TableCache::new(Duration::from_secs(3600));

        cache.get_or_load(&path, |p| read_len(p, &loads)).unwrap();
        std::fs::write(&path, "abcdef").unwrap();
        set_mtime(&path, 2_000_000);
        let value = cache.get_or_load(&path, |p| read_len(p, &loads)).unwrap();

        assert_eq!(*value, 6);
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn zero_ttl_always_reloads() {
        let path = scratch_file("zero_ttl.csv", "abc");
        let loads = Cell::new(0);
        let mut cache = TableCache::new(Duration::ZERO);

        cache.get_or_load(&path, |p| read_len(p, &loads)).unwrap();
        cache.get_or_load(&path, |p| read_len(p, &loads)).unwrap();
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn invalidate_and_clear() {
        let path = scratch_file("invalidate.csv", "abc");
        let loads = Cell::new(0);
        let mut cache = TableCache::default();

        cache.get_or_load(&path, |p| read_len(p, &loads)).unwrap();
        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        cache.get_or_load(&path, |p| read_len(p, &loads)).unwrap();
        assert_eq!(loads.get(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn failed_load_drops_stale_entry() {
        let path = scratch_file("failing.csv", "abc");
        let mut cache = TableCache::new(Duration::ZERO);

        cache.get_or_load(&path, |_| Ok(1usize)).unwrap();
        let result = cache.get_or_load(&path, |p| {
            Err(LoadError::MissingColumn {
                table: "test",
                column: "bairro",
                accepted: p.display().to_string(),
            })
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("crime_risk_table_cache_missing.csv");
        let _ = std::fs::remove_file(&path);
        let mut cache: TableCache<usize> = TableCache::default();
        assert!(matches!(
            cache.get_or_load(&path, |_| Ok(0)),
            Err(LoadError::Io { .. })
        ));
    }
}
