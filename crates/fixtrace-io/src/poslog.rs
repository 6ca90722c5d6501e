use std::path::Path;

use anyhow::{Context, Result};
use fixtrace_core::{FixSeries, PositionFix, QualityInfo};
use tracing::debug;

// Trailing numeric columns of a full solution row:
// lat lon height quality nsat sdn sde sdu sdne sdeu sdun
const NUMERIC_COLUMNS: usize = 11;

/// Parse a raw positioning log into a fix series.
///
/// One fix per line, whitespace-delimited; lines starting with `%` are
/// comments. The timestamp may span several tokens (date + time), so on a
/// full row everything before the trailing numeric columns is joined back
/// into the timestamp verbatim. A row whose latitude or longitude fails to
/// parse is dropped (the series invariant requires both coordinates); a bad
/// height becomes 0.0 and bad quality metadata becomes unknown, never a
/// fatal error.
pub fn parse_pos_log(text: &str) -> FixSeries {
    let mut series = FixSeries::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            debug!(line = lineno + 1, "dropping short row");
            continue;
        }

        // Full rows carry NUMERIC_COLUMNS trailing values; anything shorter
        // is treated as "timestamp lat lon [height ...]".
        let ts_tokens = if tokens.len() > NUMERIC_COLUMNS {
            tokens.len() - NUMERIC_COLUMNS
        } else {
            1
        };
        let timestamp = tokens[..ts_tokens].join(" ");
        let cols = &tokens[ts_tokens..];

        let lat = parse_f64(cols, 0);
        let lon = parse_f64(cols, 1);
        let (lat, lon) = match (lat, lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                debug!(line = lineno + 1, "dropping row without lat/lon");
                continue;
            }
        };

        series.push(PositionFix {
            timestamp,
            lat,
            lon,
            height: parse_f64(cols, 2).unwrap_or(0.0),
            quality: QualityInfo {
                fix_code: parse_u8(cols, 3),
                satellites: parse_u8(cols, 4),
                sd_north: parse_f64(cols, 5),
                sd_east: parse_f64(cols, 6),
                sd_up: parse_f64(cols, 7),
                sd_ne: parse_f64(cols, 8),
                sd_eu: parse_f64(cols, 9),
                sd_un: parse_f64(cols, 10),
            },
        });
    }

    series
}

/// Read and parse one log file.
pub fn load_pos_log<P: AsRef<Path>>(path: P) -> Result<FixSeries> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading position log {}", path.display()))?;
    Ok(parse_pos_log(&text))
}

fn parse_f64(cols: &[&str], idx: usize) -> Option<f64> {
    cols.get(idx).and_then(|t| t.parse::<f64>().ok())
}

fn parse_u8(cols: &[&str], idx: usize) -> Option<u8> {
    cols.get(idx).and_then(|t| t.parse::<u8>().ok())
}
