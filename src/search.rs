//! Radius search and distance ranking.
//!
//! The engine is pure: given an immutable catalog, a resolved reference
//! and a radius, it produces a fresh ordered result set. Nothing here
//! touches the network, the disk, or shared state.

use crate::catalog::{Catalog, Settlement};
use crate::geo::haversine_km;
use serde::Serialize;
use std::fmt;

/// Search errors. Both are recoverable at the caller boundary.
#[derive(Debug)]
pub enum SearchError {
    /// The query matched no catalog record. Retry with a new query.
    NotFound(String),
    /// Negative or non-finite radius, rejected before the scan.
    InvalidRadius(f64),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(q) => {
                write!(f, "Settlement not found: '{}'. Check the name or postal code.", q)
            }
            Self::InvalidRadius(r) => write!(f, "Invalid radius: {} (must be finite and >= 0)", r),
        }
    }
}

impl std::error::Error for SearchError {}

/// A resolved reference settlement, carrying its catalog index so the
/// search can exclude this exact record rather than everything sharing
/// its name.
#[derive(Debug, Clone, Copy)]
pub struct Reference<'a> {
    pub index: usize,
    pub settlement: &'a Settlement,
}

/// One ranked result row.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub postal_code: String,
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
}

/// Resolve the reference settlement for a query string.
///
/// Matches case-insensitively on name, exactly on postal code, both
/// after whitespace trimming. First match in catalog order wins; this
/// is an explicit arbitrary policy, not a best-match guarantee.
pub fn find_reference<'a>(catalog: &'a Catalog, query: &str) -> Result<Reference<'a>, SearchError> {
    let trimmed = query.trim();
    let name_query = trimmed.to_lowercase();

    for (index, settlement) in catalog.settlements.iter().enumerate() {
        if settlement.name.trim().to_lowercase() == name_query
            || settlement.postal_code.trim() == trimmed
        {
            return Ok(Reference { index, settlement });
        }
    }

    Err(SearchError::NotFound(trimmed.to_string()))
}

/// All settlements within `radius_km` of the reference, ascending by
/// great-circle distance. Ties keep catalog order (stable sort). The
/// reference record itself is excluded by identity, so a distinct
/// settlement sharing its name is still a legitimate hit.
pub fn search_within_radius(
    catalog: &Catalog,
    reference: &Reference<'_>,
    radius_km: f64,
) -> Result<Vec<SearchHit>, SearchError> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(SearchError::InvalidRadius(radius_km));
    }

    let ref_lat = reference.settlement.lat;
    let ref_lon = reference.settlement.lon;

    let mut hits: Vec<SearchHit> = catalog
        .settlements
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != reference.index)
        .filter_map(|(_, s)| {
            let distance_km = haversine_km(ref_lat, ref_lon, s.lat, s.lon);
            if distance_km <= radius_km {
                Some(SearchHit {
                    name: s.name.clone(),
                    postal_code: s.postal_code.clone(),
                    lat: s.lat,
                    lon: s.lon,
                    distance_km,
                })
            } else {
                None
            }
        })
        .collect();

    hits.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(hits)
}

/// Render a result set as an aligned text table (for the terminal).
pub fn render_table(reference: &Settlement, radius_km: f64, hits: &[SearchHit]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Settlements within {} km of {} ({}):\n\n",
        radius_km, reference.name, reference.postal_code
    ));

    if hits.is_empty() {
        out.push_str(&format!("  (none within {} km)\n", radius_km));
        return out;
    }

    out.push_str(&format!("  {:<28} {:<10} {:>9}\n", "NAME", "POSTAL", "DISTANCE"));
    for hit in hits {
        out.push_str(&format!(
            "  {:<28} {:<10} {:>6.2} km\n",
            hit.name, hit.postal_code, hit.distance_km
        ));
    }
    out
}
