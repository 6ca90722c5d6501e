//! # fixtrace-render
//!
//! Renders the artifacts of a refinement run as one self-contained
//! interactive HTML map (Leaflet from CDN): raw, smoothed, interpolated and
//! matched overlays plus optional reference-track markers. Pure
//! presentation; colors and marker shapes carry no meaning beyond telling
//! the overlays apart.

use std::path::Path;

use anyhow::{Context, Result};
use fixtrace_core::FixSeries;
use serde_json::json;

/// Everything the map shows. Coordinates are (lat, lon) degree pairs.
#[derive(Debug, Default)]
pub struct MapLayers {
    pub raw: Vec<(f64, f64)>,
    pub smoothed: Vec<(f64, f64)>,
    pub interpolated: Vec<(f64, f64)>,
    /// Positions of the matched road nodes, already resolved by the caller.
    pub matched: Vec<(f64, f64)>,
    pub reference: Vec<ReferenceMarker>,
}

#[derive(Debug, Clone)]
pub struct ReferenceMarker {
    pub lat: f64,
    pub lon: f64,
    pub label: Option<String>,
}

/// Flatten a fix series into the (lat, lon) pairs the map consumes.
pub fn latlon_pairs(series: &FixSeries) -> Vec<(f64, f64)> {
    series.iter().map(|f| (f.lat, f.lon)).collect()
}

/// Render the map document. Always returns a complete HTML page, even for
/// empty layers.
pub fn render_map(layers: &MapLayers) -> String {
    let payload = json!({
        "raw": pairs_json(&layers.raw),
        "smoothed": pairs_json(&layers.smoothed),
        "interpolated": pairs_json(&layers.interpolated),
        "matched": pairs_json(&layers.matched),
        "reference": layers.reference.iter().map(|r| {
            json!({ "lat": r.lat, "lon": r.lon, "label": r.label })
        }).collect::<Vec<_>>(),
    });
    TEMPLATE.replace("/*__LAYERS__*/null", &payload.to_string())
}

/// Render and persist the map, returning the document for inline display.
pub fn write_map<P: AsRef<Path>>(layers: &MapLayers, path: P) -> Result<String> {
    let path = path.as_ref();
    let html = render_map(layers);
    std::fs::write(path, &html).with_context(|| format!("writing map {}", path.display()))?;
    Ok(html)
}

fn pairs_json(pairs: &[(f64, f64)]) -> Vec<[f64; 2]> {
    pairs.iter().map(|&(lat, lon)| [lat, lon]).collect()
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>fixtrace refined trajectory</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
var data = /*__LAYERS__*/null;

var map = L.map('map');
L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
  maxZoom: 19,
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);

function pointLayer(points, color, radius) {
  var group = L.layerGroup();
  points.forEach(function (p) {
    L.circleMarker([p[0], p[1]], {
      radius: radius, color: color, fillColor: color, fillOpacity: 0.7, weight: 1
    }).addTo(group);
  });
  return group;
}

var overlays = {
  'Raw fixes': pointLayer(data.raw, '#d62728', 3),
  'Smoothed': pointLayer(data.smoothed, '#1f77b4', 3),
  'Interpolated': pointLayer(data.interpolated, '#2ca02c', 3),
  'Matched nodes': pointLayer(data.matched, '#9467bd', 4)
};

var refGroup = L.layerGroup();
data.reference.forEach(function (r) {
  var m = L.marker([r.lat, r.lon]).addTo(refGroup);
  if (r.label) { m.bindPopup(r.label); }
});
overlays['Reference track'] = refGroup;

var bounds = [];
['raw', 'smoothed', 'interpolated', 'matched'].forEach(function (k) {
  data[k].forEach(function (p) { bounds.push([p[0], p[1]]); });
});
data.reference.forEach(function (r) { bounds.push([r.lat, r.lon]); });

Object.keys(overlays).forEach(function (k) { overlays[k].addTo(map); });
L.control.layers(null, overlays).addTo(map);

if (bounds.length > 0) {
  map.fitBounds(bounds, { padding: [30, 30] });
} else {
  map.setView([0, 0], 2);
}
</script>
</body>
</html>
"#;
