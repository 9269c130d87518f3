//! File-based catalog cache at ~/.perimetre/catalog.json.
//!
//! TTL: 24 hours. Keys are source descriptors ("api", a URL), matched
//! case-insensitively. A stale or unreadable file behaves like a miss.

use super::types::{Catalog, CatalogSource, Settlement};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const CACHE_TTL_MS: i64 = 24 * 3600 * 1000; // 24 hours in ms

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    settlements: Vec<Settlement>,
    timestamp: i64,
    #[serde(default)]
    source_name: Option<String>,
}

/// The catalog cache.
pub struct CatalogCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl CatalogCache {
    /// Load cache from the default location (~/.perimetre/catalog.json).
    pub fn load() -> Self {
        let path = Self::default_path();
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    /// Load cache from a specific path (for testing).
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".perimetre")
            .join("catalog.json")
    }

    fn read_file(path: &PathBuf) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Look up a catalog by source key. Returns None if missing or expired.
    pub fn get(&self, source_key: &str) -> Option<Catalog> {
        let key = source_key.to_lowercase();
        let entry = self.entries.get(&key)?;

        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp > CACHE_TTL_MS {
            return None; // expired
        }

        Some(Catalog::new(entry.settlements.clone(), CatalogSource::Cache))
    }

    /// Store a catalog under a source key and persist to disk.
    pub fn put(&mut self, source_key: &str, catalog: &Catalog) {
        let entry = CacheEntry {
            settlements: catalog.settlements.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            source_name: Some(catalog.source.to_string()),
        };
        self.entries.insert(source_key.to_lowercase(), entry);
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string(&self.entries) {
            let _ = fs::write(&self.path, json);
        }
    }

    /// Number of entries (for testing).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
