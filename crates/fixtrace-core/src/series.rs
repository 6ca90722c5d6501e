// ---------------------------------------------------------------------------
// Fix data model
// ---------------------------------------------------------------------------

/// Receiver quality metadata carried alongside a fix.
///
/// None of these fields feed the refinement algorithms; they are kept so an
/// analyst can inspect them downstream. A column that was absent or failed
/// to parse is `None`, never a silent zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityInfo {
    /// Receiver fix-quality code (1 = fixed, 2 = float, 5 = single, ...).
    pub fix_code: Option<u8>,
    /// Number of satellites used in the solution.
    pub satellites: Option<u8>,
    pub sd_north: Option<f64>,
    pub sd_east: Option<f64>,
    pub sd_up: Option<f64>,
    pub sd_ne: Option<f64>,
    pub sd_eu: Option<f64>,
    pub sd_un: Option<f64>,
}

/// One positioning sample, observed or derived.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    /// Opaque ordering key, kept verbatim from the source log. Never parsed
    /// into a calendar type by the refinement stages.
    pub timestamp: String,
    /// Latitude in signed degrees.
    pub lat: f64,
    /// Longitude in signed degrees.
    pub lon: f64,
    /// Height above the reference ellipsoid in meters, 0.0 when absent.
    pub height: f64,
    pub quality: QualityInfo,
}

impl PositionFix {
    /// A bare fix with no height or quality metadata.
    pub fn new(timestamp: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            lat,
            lon,
            height: 0.0,
            quality: QualityInfo::default(),
        }
    }
}

/// Ordered sequence of fixes in acquisition order.
///
/// The common currency between refinement stages. Every element holds a
/// valid lat/lon; rows missing both never get past ingestion. Timestamps are
/// not required to be monotonic when several source logs were concatenated.
#[derive(Debug, Clone, Default)]
pub struct FixSeries {
    pub fixes: Vec<PositionFix>,
}

impl FixSeries {
    pub fn new() -> Self {
        Self { fixes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn push(&mut self, fix: PositionFix) {
        self.fixes.push(fix);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PositionFix> {
        self.fixes.iter()
    }

    /// Append another series, keeping acquisition order (file order, then
    /// in-file order).
    pub fn extend(&mut self, other: FixSeries) {
        self.fixes.extend(other.fixes);
    }

    /// Arithmetic mean of (lat, lon), used to center road-network
    /// acquisition. `None` on an empty series.
    pub fn mean_position(&self) -> Option<(f64, f64)> {
        if self.fixes.is_empty() {
            return None;
        }
        let n = self.fixes.len() as f64;
        let (lat_sum, lon_sum) = self
            .fixes
            .iter()
            .fold((0.0, 0.0), |(la, lo), f| (la + f.lat, lo + f.lon));
        Some((lat_sum / n, lon_sum / n))
    }
}

impl From<Vec<PositionFix>> for FixSeries {
    fn from(fixes: Vec<PositionFix>) -> Self {
        Self { fixes }
    }
}

impl<'a> IntoIterator for &'a FixSeries {
    type Item = &'a PositionFix;
    type IntoIter = std::slice::Iter<'a, PositionFix>;

    fn into_iter(self) -> Self::IntoIter {
        self.fixes.iter()
    }
}

/// Opaque key into an external road-network graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_position() {
        let series = FixSeries::from(vec![
            PositionFix::new("t0", 10.0, 20.0),
            PositionFix::new("t1", 12.0, 22.0),
        ]);
        let (lat, lon) = series.mean_position().unwrap();
        assert!((lat - 11.0).abs() < 1e-12);
        assert!((lon - 21.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_position_empty() {
        assert!(FixSeries::new().mean_position().is_none());
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut a = FixSeries::from(vec![PositionFix::new("a", 1.0, 1.0)]);
        let b = FixSeries::from(vec![PositionFix::new("b", 2.0, 2.0)]);
        a.extend(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.fixes[0].timestamp, "a");
        assert_eq!(a.fixes[1].timestamp, "b");
    }
}
