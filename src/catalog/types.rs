//! Core types for the catalog subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a catalog came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogSource {
    Cache,
    CsvFile,
    RemoteFile,
    Api,
    Builtin,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "Cache"),
            Self::CsvFile => write!(f, "CSV file"),
            Self::RemoteFile => write!(f, "Remote file"),
            Self::Api => write!(f, "Communes API"),
            Self::Builtin => write!(f, "Built-in"),
        }
    }
}

/// One settlement row. Names and (name, postal_code) pairs are not
/// guaranteed unique; coordinates are guaranteed valid by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub name: String,
    pub postal_code: String,
    pub lat: f64,
    pub lon: f64,
}

impl Settlement {
    pub fn new(name: impl Into<String>, postal_code: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            postal_code: postal_code.into(),
            lat,
            lon,
        }
    }
}

/// An immutable, ordered settlement table with provenance.
/// Loaded once, then shared read-only for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub settlements: Vec<Settlement>,
    pub source: CatalogSource,
}

impl Catalog {
    pub fn new(settlements: Vec<Settlement>, source: CatalogSource) -> Self {
        Self { settlements, source }
    }

    pub fn len(&self) -> usize {
        self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }
}

/// Catalog acquisition errors.
#[derive(Debug)]
pub enum CatalogError {
    Io(String),
    Network(String),
    Parse(String),
    InvalidResponse(String),
    NoSource,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid API response: {}", msg),
            Self::NoSource => write!(f, "No catalog source available. Use --csv, --url, or go online."),
        }
    }
}

impl std::error::Error for CatalogError {}
