//! Catalog loader. One contract, pluggable backends.
//!
//! Api flow:         cache -> communes API -> built-in dataset
//! Remote file flow: cache -> HTTP fetch -> error
//! Local CSV flow:   disk (never cached)
//! Builtin flow:     embedded dataset

use super::cache::CatalogCache;
use super::sources;
use super::types::{Catalog, CatalogError, CatalogSource};
use std::path::PathBuf;

/// Where to obtain the settlement table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Local CSV file with nom/code_postal/latitude/longitude columns.
    CsvFile(PathBuf),
    /// Cloud-hosted CSV reachable over HTTP(S).
    RemoteFile(String),
    /// The national communes API.
    Api,
    /// The embedded fallback dataset.
    Builtin,
}

impl DataSource {
    /// Cache key for network-backed sources. Local files are not cached.
    fn cache_key(&self) -> Option<String> {
        match self {
            Self::Api => Some("api".to_string()),
            Self::RemoteFile(url) => Some(url.clone()),
            Self::CsvFile(_) | Self::Builtin => None,
        }
    }
}

/// The catalog loader with its read-through cache.
pub struct CatalogLoader {
    cache: CatalogCache,
    offline: bool,
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self {
            cache: CatalogCache::load(),
            offline: false,
        }
    }

    /// Create a loader with a specific cache (for testing).
    pub fn with_cache(cache: CatalogCache) -> Self {
        Self { cache, offline: false }
    }

    /// Set offline mode - skip network calls.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Load a catalog from the given source, falling back as documented
    /// in the module header. The result is immutable for the session.
    pub fn load(&mut self, source: &DataSource) -> Result<Catalog, CatalogError> {
        // 1. Local sources need no cache or network
        match source {
            DataSource::CsvFile(path) => {
                let (settlements, dropped) = sources::load_csv_file(path)?;
                report_dropped(dropped);
                return Ok(Catalog::new(settlements, CatalogSource::CsvFile));
            }
            DataSource::Builtin => {
                return Ok(Catalog::new(sources::builtin_settlements(), CatalogSource::Builtin));
            }
            _ => {}
        }

        // 2. Check cache
        let key = source.cache_key().unwrap_or_default();
        if let Some(catalog) = self.cache.get(&key) {
            return Ok(catalog);
        }

        // 3. Fetch (if online)
        if !self.offline {
            let fetched = match source {
                DataSource::Api => sources::fetch_api(),
                DataSource::RemoteFile(url) => sources::fetch_remote_csv(url),
                _ => unreachable!("local sources handled above"),
            };
            match fetched {
                Ok((settlements, dropped)) => {
                    report_dropped(dropped);
                    let catalog_source = match source {
                        DataSource::Api => CatalogSource::Api,
                        _ => CatalogSource::RemoteFile,
                    };
                    let catalog = Catalog::new(settlements, catalog_source);
                    self.cache.put(&key, &catalog);
                    return Ok(catalog);
                }
                Err(e) => {
                    // A user-specified URL has no sensible substitute
                    if let DataSource::RemoteFile(_) = source {
                        return Err(e);
                    }
                    eprintln!("  Warning: {} (falling back to built-in dataset)", e);
                }
            }
        } else if let DataSource::RemoteFile(_) = source {
            return Err(CatalogError::NoSource);
        }

        // 4. Built-in dataset (always available for the API source)
        Ok(Catalog::new(sources::builtin_settlements(), CatalogSource::Builtin))
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn report_dropped(dropped: usize) {
    if dropped > 0 {
        eprintln!("  Warning: {} rows dropped (missing or invalid coordinates)", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sources::builtin_settlements;
    use std::fs;
    use tempfile::TempDir;

    fn offline_loader() -> (CatalogLoader, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let cache = CatalogCache::load_from(path);
        let mut loader = CatalogLoader::with_cache(cache);
        loader.set_offline(true);
        (loader, dir)
    }

    #[test]
    fn test_load_builtin() {
        let (mut loader, _dir) = offline_loader();
        let catalog = loader.load(&DataSource::Builtin).unwrap();
        assert_eq!(catalog.source, CatalogSource::Builtin);
        assert!(catalog.len() >= 30);
    }

    #[test]
    fn test_load_csv_file() {
        let (mut loader, dir) = offline_loader();
        let csv_path = dir.path().join("communes.csv");
        fs::write(
            &csv_path,
            "nom,code_postal,latitude,longitude\nParis,75000,48.8566,2.3522\n",
        )
        .unwrap();

        let catalog = loader.load(&DataSource::CsvFile(csv_path)).unwrap();
        assert_eq!(catalog.source, CatalogSource::CsvFile);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.settlements[0].name, "Paris");
    }

    #[test]
    fn test_load_csv_file_missing() {
        let (mut loader, dir) = offline_loader();
        let missing = dir.path().join("nope.csv");
        assert!(loader.load(&DataSource::CsvFile(missing)).is_err());
    }

    #[test]
    fn test_api_offline_falls_back_to_builtin() {
        let (mut loader, _dir) = offline_loader();
        let catalog = loader.load(&DataSource::Api).unwrap();
        assert_eq!(catalog.source, CatalogSource::Builtin);
    }

    #[test]
    fn test_api_offline_prefers_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let mut cache = CatalogCache::load_from(path);
        cache.put("api", &Catalog::new(builtin_settlements(), CatalogSource::Api));

        let mut loader = CatalogLoader::with_cache(cache);
        loader.set_offline(true);

        let catalog = loader.load(&DataSource::Api).unwrap();
        assert_eq!(catalog.source, CatalogSource::Cache);
    }

    #[test]
    fn test_remote_file_offline_without_cache_fails() {
        let (mut loader, _dir) = offline_loader();
        let result = loader.load(&DataSource::RemoteFile(
            "https://example.org/communes.csv".to_string(),
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_remote_file_offline_with_cache_hits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let url = "https://example.org/communes.csv".to_string();
        let mut cache = CatalogCache::load_from(path);
        cache.put(&url, &Catalog::new(builtin_settlements(), CatalogSource::RemoteFile));

        let mut loader = CatalogLoader::with_cache(cache);
        loader.set_offline(true);

        let catalog = loader.load(&DataSource::RemoteFile(url)).unwrap();
        assert_eq!(catalog.source, CatalogSource::Cache);
    }
}
