//! Settlement catalog subsystem for Perimetre.
//!
//! Provides one loader contract with pluggable backends (local CSV,
//! remote CSV, the communes API, a built-in dataset) and a file-backed
//! read-through cache.

pub mod cache;
pub mod loader;
pub mod sources;
pub mod types;

pub use cache::CatalogCache;
pub use loader::{CatalogLoader, DataSource};
pub use sources::builtin_settlements;
pub use types::{Catalog, CatalogError, CatalogSource, Settlement};
