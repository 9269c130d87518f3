//! Perimetre: commune radius search engine.
//!
//! Resolves a reference settlement by name or postal code, finds every
//! settlement within a radius, and ranks the result by great-circle
//! distance. The catalog comes from a local CSV file, a cloud-hosted
//! CSV, the national communes API, or a built-in fallback dataset.

pub mod catalog;
pub mod export;
pub mod geo;
pub mod search;
pub mod server;
