use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use kml::types::Geometry;
use kml::Kml;
use tracing::debug;

/// One point of an independent ground-truth/reference geometry. Display
/// data only; the refinement stages never consume it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePoint {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub label: Option<String>,
}

/// Parse a KML point-collection document into reference points.
///
/// Walks Document/Folder nesting and collects every placemark carrying point
/// geometry. A placemark without a supported geometry is skipped, not an
/// error for the whole document; a missing altitude defaults to 0.
pub fn parse_reference_track(text: &str) -> Result<Vec<ReferencePoint>> {
    let kml = Kml::<f64>::from_str(text).context("parsing KML reference document")?;
    let mut points = Vec::new();
    collect_points(&kml, &mut points);
    Ok(points)
}

/// Read and parse one reference geometry file.
pub fn load_reference_track<P: AsRef<Path>>(path: P) -> Result<Vec<ReferencePoint>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading reference track {}", path.display()))?;
    parse_reference_track(&text)
}

fn collect_points(node: &Kml<f64>, out: &mut Vec<ReferencePoint>) {
    match node {
        Kml::KmlDocument(doc) => {
            for child in &doc.elements {
                collect_points(child, out);
            }
        }
        Kml::Document { elements, .. } | Kml::Folder { elements, .. } => {
            for child in elements {
                collect_points(child, out);
            }
        }
        Kml::Placemark(placemark) => match &placemark.geometry {
            Some(Geometry::Point(point)) => {
                out.push(ReferencePoint {
                    lat: point.coord.y,
                    lon: point.coord.x,
                    altitude: point.coord.z.unwrap_or(0.0),
                    label: placemark.name.clone(),
                });
            }
            _ => {
                debug!(name = ?placemark.name, "skipping placemark without point geometry");
            }
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Folder>
      <Placemark>
        <name>Start</name>
        <Point><coordinates>11.576124,48.137154,520.0</coordinates></Point>
      </Placemark>
      <Placemark>
        <name>NoGeometry</name>
      </Placemark>
      <Placemark>
        <Point><coordinates>11.577000,48.138000</coordinates></Point>
      </Placemark>
    </Folder>
  </Document>
</kml>"#;

    #[test]
    fn test_points_extracted_bad_entries_skipped() {
        let points = parse_reference_track(SAMPLE).unwrap();
        assert_eq!(points.len(), 2);

        assert_eq!(points[0].label.as_deref(), Some("Start"));
        assert!((points[0].lat - 48.137154).abs() < 1e-9);
        assert!((points[0].lon - 11.576124).abs() < 1e-9);
        assert!((points[0].altitude - 520.0).abs() < 1e-9);

        // Second point has no altitude and no label.
        assert_eq!(points[1].label, None);
        assert_eq!(points[1].altitude, 0.0);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(parse_reference_track("<kml><unterminated").is_err());
    }
}
