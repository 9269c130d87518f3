//! Catalog backends: local CSV, remote CSV, the communes API, and a
//! built-in fallback dataset.
//!
//! Every backend produces the same thing: a cleaned settlement table plus
//! a count of rows dropped for missing or invalid coordinates.

use super::types::{CatalogError, Settlement};
use crate::geo::valid_coordinates;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const USER_AGENT: &str = "Perimetre/0.4 (commune-radius-search)";

// ─── Built-in dataset ───────────────────────────────────────────

struct BuiltinCommune {
    name: &'static str,
    postal_code: &'static str,
    lat: f64,
    lon: f64,
}

const BUILTIN_COMMUNES: &[BuiltinCommune] = &[
    BuiltinCommune { name: "Paris", postal_code: "75000", lat: 48.8566, lon: 2.3522 },
    BuiltinCommune { name: "Aubervilliers", postal_code: "93300", lat: 48.9147, lon: 2.3810 },
    BuiltinCommune { name: "Saint-Denis", postal_code: "93200", lat: 48.9362, lon: 2.3574 },
    BuiltinCommune { name: "Saint-Ouen-sur-Seine", postal_code: "93400", lat: 48.9123, lon: 2.3342 },
    BuiltinCommune { name: "Pantin", postal_code: "93500", lat: 48.8966, lon: 2.4017 },
    BuiltinCommune { name: "Bobigny", postal_code: "93000", lat: 48.9106, lon: 2.4397 },
    BuiltinCommune { name: "Drancy", postal_code: "93700", lat: 48.9237, lon: 2.4455 },
    BuiltinCommune { name: "La Courneuve", postal_code: "93120", lat: 48.9322, lon: 2.3967 },
    BuiltinCommune { name: "Montreuil", postal_code: "93100", lat: 48.8638, lon: 2.4485 },
    BuiltinCommune { name: "Noisy-le-Grand", postal_code: "93160", lat: 48.8487, lon: 2.5528 },
    BuiltinCommune { name: "Boulogne-Billancourt", postal_code: "92100", lat: 48.8352, lon: 2.2409 },
    BuiltinCommune { name: "Neuilly-sur-Seine", postal_code: "92200", lat: 48.8846, lon: 2.2697 },
    BuiltinCommune { name: "Levallois-Perret", postal_code: "92300", lat: 48.8934, lon: 2.2880 },
    BuiltinCommune { name: "Clichy", postal_code: "92110", lat: 48.9044, lon: 2.3064 },
    BuiltinCommune { name: "Courbevoie", postal_code: "92400", lat: 48.8978, lon: 2.2531 },
    BuiltinCommune { name: "Nanterre", postal_code: "92000", lat: 48.8924, lon: 2.2071 },
    BuiltinCommune { name: "Ivry-sur-Seine", postal_code: "94200", lat: 48.8139, lon: 2.3844 },
    BuiltinCommune { name: "Vincennes", postal_code: "94300", lat: 48.8478, lon: 2.4392 },
    BuiltinCommune { name: "Creteil", postal_code: "94000", lat: 48.7904, lon: 2.4556 },
    BuiltinCommune { name: "Versailles", postal_code: "78000", lat: 48.8049, lon: 2.1204 },
    BuiltinCommune { name: "Argenteuil", postal_code: "95100", lat: 48.9472, lon: 2.2467 },
    BuiltinCommune { name: "Lyon", postal_code: "69000", lat: 45.7640, lon: 4.8357 },
    BuiltinCommune { name: "Villeurbanne", postal_code: "69100", lat: 45.7719, lon: 4.8902 },
    BuiltinCommune { name: "Marseille", postal_code: "13000", lat: 43.2965, lon: 5.3698 },
    BuiltinCommune { name: "Toulouse", postal_code: "31000", lat: 43.6047, lon: 1.4442 },
    BuiltinCommune { name: "Nice", postal_code: "06000", lat: 43.7102, lon: 7.2620 },
    BuiltinCommune { name: "Nantes", postal_code: "44000", lat: 47.2184, lon: -1.5536 },
    BuiltinCommune { name: "Montpellier", postal_code: "34000", lat: 43.6108, lon: 3.8767 },
    BuiltinCommune { name: "Strasbourg", postal_code: "67000", lat: 48.5734, lon: 7.7521 },
    BuiltinCommune { name: "Bordeaux", postal_code: "33000", lat: 44.8378, lon: -0.5792 },
    BuiltinCommune { name: "Lille", postal_code: "59000", lat: 50.6292, lon: 3.0573 },
    BuiltinCommune { name: "Rennes", postal_code: "35000", lat: 48.1173, lon: -1.6778 },
    BuiltinCommune { name: "Reims", postal_code: "51100", lat: 49.2583, lon: 4.0317 },
    BuiltinCommune { name: "Le Havre", postal_code: "76600", lat: 49.4944, lon: 0.1079 },
    BuiltinCommune { name: "Dijon", postal_code: "21000", lat: 47.3220, lon: 5.0415 },
    BuiltinCommune { name: "Grenoble", postal_code: "38000", lat: 45.1885, lon: 5.7245 },
    BuiltinCommune { name: "Angers", postal_code: "49000", lat: 47.4784, lon: -0.5632 },
];

/// The embedded fallback dataset (major communes, always available).
pub fn builtin_settlements() -> Vec<Settlement> {
    BUILTIN_COMMUNES
        .iter()
        .map(|c| Settlement::new(c.name, c.postal_code, c.lat, c.lon))
        .collect()
}

// ─── CSV backend ────────────────────────────────────────────────

/// One raw CSV row. Header names follow the original data file
/// (nom, code_postal, latitude, longitude); English spellings are
/// accepted as aliases. Coordinates are read as text so a junk value
/// drops the row instead of failing the whole file.
#[derive(Deserialize)]
struct CsvRow {
    #[serde(alias = "nom")]
    name: String,
    #[serde(alias = "code_postal", alias = "codePostal")]
    postal_code: String,
    #[serde(alias = "latitude")]
    lat: String,
    #[serde(alias = "longitude")]
    lon: String,
}

/// Parse a settlement CSV. Returns the cleaned rows and the count of
/// rows dropped for missing or invalid coordinates.
pub fn parse_csv(reader: impl Read) -> Result<(Vec<Settlement>, usize), CatalogError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut settlements = Vec::new();
    let mut dropped = 0usize;

    for row in rdr.deserialize::<CsvRow>() {
        let row = match row {
            Ok(r) => r,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        let (lat, lon) = match (row.lat.parse::<f64>(), row.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => (lat, lon),
            _ => {
                dropped += 1;
                continue;
            }
        };
        if !valid_coordinates(lat, lon) {
            dropped += 1;
            continue;
        }
        settlements.push(Settlement::new(row.name, row.postal_code, lat, lon));
    }

    Ok((settlements, dropped))
}

/// Load a settlement CSV from disk.
pub fn load_csv_file(path: &Path) -> Result<(Vec<Settlement>, usize), CatalogError> {
    let file = File::open(path)
        .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;
    parse_csv(file)
}

/// Fetch a settlement CSV from an HTTP(S) URL (cloud-hosted data file).
pub fn fetch_remote_csv(url: &str) -> Result<(Vec<Settlement>, usize), CatalogError> {
    let response = ureq::get(url)
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| CatalogError::Network(e.to_string()))?;
    parse_csv(response.into_reader())
}

// ─── Communes API backend ───────────────────────────────────────

const COMMUNES_API_URL: &str =
    "https://geo.api.gouv.fr/communes?fields=nom,codesPostaux,centre&format=json";

#[derive(Deserialize)]
struct ApiCommune {
    nom: String,
    #[serde(default, rename = "codesPostaux")]
    codes_postaux: Vec<String>,
    #[serde(default)]
    centre: Option<ApiCentre>,
}

#[derive(Deserialize)]
struct ApiCentre {
    /// GeoJSON point: [lon, lat]
    coordinates: Vec<f64>,
}

/// Fetch the full commune table from the national geo API.
pub fn fetch_api() -> Result<(Vec<Settlement>, usize), CatalogError> {
    let response = ureq::get(COMMUNES_API_URL)
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| CatalogError::Network(e.to_string()))?;

    let communes: Vec<ApiCommune> = response
        .into_json()
        .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

    Ok(normalize_api_communes(communes))
}

/// Fan multi-valued postal codes out to one row per (name, postal code)
/// pair. Communes without a usable centre point are dropped.
fn normalize_api_communes(communes: Vec<ApiCommune>) -> (Vec<Settlement>, usize) {
    let mut settlements = Vec::with_capacity(communes.len());
    let mut dropped = 0usize;

    for commune in communes {
        let centre = match commune.centre {
            Some(c) if c.coordinates.len() == 2 => c,
            _ => {
                dropped += 1;
                continue;
            }
        };
        let (lon, lat) = (centre.coordinates[0], centre.coordinates[1]);
        if !valid_coordinates(lat, lon) {
            dropped += 1;
            continue;
        }
        if commune.codes_postaux.is_empty() {
            dropped += 1;
            continue;
        }
        for code in &commune.codes_postaux {
            settlements.push(Settlement::new(commune.nom.trim(), code.trim(), lat, lon));
        }
    }

    (settlements, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_reference_communes() {
        let rows = builtin_settlements();
        assert!(rows.len() >= 30);
        let paris = rows.iter().find(|s| s.name == "Paris").unwrap();
        assert_eq!(paris.postal_code, "75000");
        assert!((paris.lat - 48.8566).abs() < 0.001);
        assert!(rows.iter().any(|s| s.name == "Aubervilliers"));
        assert!(rows.iter().any(|s| s.name == "Lyon"));
    }

    #[test]
    fn test_parse_csv_french_headers() {
        let data = "nom,code_postal,latitude,longitude\n\
                    Paris,75000,48.8566,2.3522\n\
                    Aubervilliers,93300,48.9147,2.3810\n";
        let (rows, dropped) = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(dropped, 0);
        assert_eq!(rows[0].name, "Paris");
        assert_eq!(rows[1].postal_code, "93300");
    }

    #[test]
    fn test_parse_csv_english_headers() {
        let data = "name,postal_code,lat,lon\nLyon,69000,45.7640,4.8357\n";
        let (rows, dropped) = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(dropped, 0);
        assert_eq!(rows[0].name, "Lyon");
    }

    #[test]
    fn test_parse_csv_drops_bad_coordinates() {
        let data = "nom,code_postal,latitude,longitude\n\
                    Paris,75000,48.8566,2.3522\n\
                    Nulle-Part,00000,not-a-number,2.0\n\
                    Hors-Champ,00001,95.0,2.0\n\
                    Sans-Rien,00002,,\n";
        let (rows, dropped) = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(dropped, 3);
        assert_eq!(rows[0].name, "Paris");
    }

    #[test]
    fn test_parse_csv_trims_values() {
        let data = "nom,code_postal,latitude,longitude\n  Paris  , 75000 ,48.8566,2.3522\n";
        let (rows, _) = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].name, "Paris");
        assert_eq!(rows[0].postal_code, "75000");
    }

    #[test]
    fn test_parse_csv_empty_file() {
        let data = "nom,code_postal,latitude,longitude\n";
        let (rows, dropped) = parse_csv(data.as_bytes()).unwrap();
        assert!(rows.is_empty());
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_normalize_api_fans_out_postal_codes() {
        let json = r#"[
            {"nom": "Aubervilliers", "codesPostaux": ["93300"],
             "centre": {"type": "Point", "coordinates": [2.3810, 48.9147]}},
            {"nom": "Marseille", "codesPostaux": ["13001", "13002", "13003"],
             "centre": {"type": "Point", "coordinates": [5.3698, 43.2965]}}
        ]"#;
        let communes: Vec<ApiCommune> = serde_json::from_str(json).unwrap();
        let (rows, dropped) = normalize_api_communes(communes);
        assert_eq!(rows.len(), 4);
        assert_eq!(dropped, 0);
        let marseille: Vec<_> = rows.iter().filter(|s| s.name == "Marseille").collect();
        assert_eq!(marseille.len(), 3);
        assert_eq!(marseille[0].postal_code, "13001");
        assert!((marseille[0].lat - 43.2965).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_api_drops_missing_centre() {
        let json = r#"[
            {"nom": "Fantome", "codesPostaux": ["00000"]},
            {"nom": "Paris", "codesPostaux": ["75001"],
             "centre": {"type": "Point", "coordinates": [2.3522, 48.8566]}}
        ]"#;
        let communes: Vec<ApiCommune> = serde_json::from_str(json).unwrap();
        let (rows, dropped) = normalize_api_communes(communes);
        assert_eq!(rows.len(), 1);
        assert_eq!(dropped, 1);
        assert_eq!(rows[0].name, "Paris");
    }

    #[test]
    fn test_normalize_api_drops_empty_postal_list() {
        let json = r#"[
            {"nom": "Sans-Code", "codesPostaux": [],
             "centre": {"type": "Point", "coordinates": [2.0, 48.0]}}
        ]"#;
        let communes: Vec<ApiCommune> = serde_json::from_str(json).unwrap();
        let (rows, dropped) = normalize_api_communes(communes);
        assert!(rows.is_empty());
        assert_eq!(dropped, 1);
    }
}
