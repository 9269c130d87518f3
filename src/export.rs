//! CSV export of a result set.
//!
//! Columns: name, postal_code, distance_km. UTF-8, decimal point.
//! The default download filename mirrors the original data product.

use crate::search::SearchHit;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default filename offered for downloads.
pub const EXPORT_FILENAME: &str = "communes_proches.csv";

#[derive(Debug)]
pub enum ExportError {
    Io(String),
    Csv(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Csv(msg) => write!(f, "CSV error: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

/// Render a result set as a CSV document.
pub fn render_csv(hits: &[SearchHit]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["name", "postal_code", "distance_km"])
        .map_err(|e| ExportError::Csv(e.to_string()))?;

    for hit in hits {
        writer
            .write_record([
                hit.name.as_str(),
                hit.postal_code.as_str(),
                &hit.distance_km.to_string(),
            ])
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Csv(e.to_string()))
}

/// Write a result set to a CSV file on disk.
pub fn write_csv(path: &Path, hits: &[SearchHit]) -> Result<(), ExportError> {
    let document = render_csv(hits)?;
    fs::write(path, document).map_err(|e| ExportError::Io(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_hits() -> Vec<SearchHit> {
        vec![
            SearchHit {
                name: "Paris".into(),
                postal_code: "75000".into(),
                lat: 48.8566,
                lon: 2.3522,
                distance_km: 6.79,
            },
            SearchHit {
                name: "Saint-Ouen-sur-Seine".into(),
                postal_code: "93400".into(),
                lat: 48.9123,
                lon: 2.3342,
                distance_km: 3.44,
            },
        ]
    }

    #[test]
    fn test_render_csv_shape() {
        let doc = render_csv(&sample_hits()).unwrap();
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "name,postal_code,distance_km");
        assert_eq!(lines[1], "Paris,75000,6.79");
        assert!(lines[2].starts_with("Saint-Ouen-sur-Seine,93400,"));
    }

    #[test]
    fn test_render_csv_uses_decimal_point() {
        let doc = render_csv(&sample_hits()).unwrap();
        assert!(doc.contains("6.79"));
        assert!(!doc.contains("6,79"));
    }

    #[test]
    fn test_render_csv_empty_is_header_only() {
        let doc = render_csv(&[]).unwrap();
        assert_eq!(doc.trim_end(), "name,postal_code,distance_km");
    }

    #[test]
    fn test_render_csv_quotes_embedded_comma() {
        let hits = vec![SearchHit {
            name: "Ville, La".into(),
            postal_code: "00000".into(),
            lat: 0.0,
            lon: 0.0,
            distance_km: 1.0,
        }];
        let doc = render_csv(&hits).unwrap();
        assert!(doc.contains("\"Ville, La\""));
    }

    #[test]
    fn test_write_csv_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(EXPORT_FILENAME);
        write_csv(&path, &sample_hits()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("name,postal_code,distance_km"));
        assert!(contents.contains("Paris"));
    }
}
