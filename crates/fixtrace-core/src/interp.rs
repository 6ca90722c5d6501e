use crate::series::{FixSeries, PositionFix};

// ---------------------------------------------------------------------------
// 1-D linear interpolation
// ---------------------------------------------------------------------------

/// Piecewise-linear interpolant with knots at 0, 1, .., n-1.
///
/// Evaluation outside the knot range linearly extends the boundary segment
/// instead of failing.
#[derive(Debug, Clone)]
struct Linear1d {
    values: Vec<f64>,
}

impl Linear1d {
    fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    fn eval(&self, t: f64) -> f64 {
        let n = self.values.len();
        debug_assert!(n > 0);
        if n == 1 {
            return self.values[0];
        }

        // Clamp the segment index so out-of-domain queries extrapolate along
        // the first/last segment.
        let max_seg = (n - 2) as f64;
        let seg = t.floor().clamp(0.0, max_seg) as usize;
        let frac = t - seg as f64;
        let a = self.values[seg];
        let b = self.values[seg + 1];
        a + (b - a) * frac
    }
}

// ---------------------------------------------------------------------------
// Gap interpolator
// ---------------------------------------------------------------------------

/// Resamples a fix series onto an evenly spaced integer index domain.
///
/// Latitude and longitude get independent linear interpolants, both indexed
/// by position in the input series (0..N-1), not by parsed timestamp.
/// Sampling at exactly the input indices therefore reproduces the input
/// coordinates; gap filling only manifests when the caller asks for indices
/// the input did not cover.
pub struct GapInterpolator {
    lat: Option<Linear1d>,
    lon: Option<Linear1d>,
    timestamps: Vec<String>,
}

impl GapInterpolator {
    /// Build the interpolants from a series. An empty series is accepted and
    /// samples to an empty series.
    pub fn fit(fixes: &FixSeries) -> Self {
        if fixes.is_empty() {
            return Self {
                lat: None,
                lon: None,
                timestamps: Vec::new(),
            };
        }
        Self {
            lat: Some(Linear1d::new(fixes.iter().map(|f| f.lat).collect())),
            lon: Some(Linear1d::new(fixes.iter().map(|f| f.lon).collect())),
            timestamps: fixes.iter().map(|f| f.timestamp.clone()).collect(),
        }
    }

    /// Evaluate both interpolants at every integer index in `[0, N-1]`,
    /// recombining each sample with the original timestamp at that index.
    /// Output length equals input length.
    pub fn sample(&self) -> FixSeries {
        let mut out = FixSeries::new();
        let (lat, lon) = match (&self.lat, &self.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return out,
        };
        for (i, ts) in self.timestamps.iter().enumerate() {
            let t = i as f64;
            out.push(PositionFix::new(ts.clone(), lat.eval(t), lon.eval(t)));
        }
        out
    }

    /// Evaluate at arbitrary (possibly fractional or out-of-domain) indices.
    /// Returns `(lat, lon)` pairs; empty when fitted on an empty series.
    pub fn sample_at(&self, indices: &[f64]) -> Vec<(f64, f64)> {
        let (lat, lon) = match (&self.lat, &self.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Vec::new(),
        };
        indices
            .iter()
            .map(|&t| (lat.eval(t), lon.eval(t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(f64, f64)]) -> FixSeries {
        FixSeries::from(
            points
                .iter()
                .enumerate()
                .map(|(i, &(lat, lon))| PositionFix::new(format!("t{i}"), lat, lon))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_empty_input() {
        let interp = GapInterpolator::fit(&FixSeries::new());
        assert!(interp.sample().is_empty());
        assert!(interp.sample_at(&[0.0, 1.0]).is_empty());
    }

    #[test]
    fn test_identity_on_dense_input() {
        let input = series(&[(10.0, 20.0), (10.5, 20.25), (11.2, 20.9), (11.0, 21.4)]);
        let out = GapInterpolator::fit(&input).sample();
        assert_eq!(out.len(), input.len());
        for (a, b) in input.iter().zip(out.iter()) {
            assert!((a.lat - b.lat).abs() < 1e-12);
            assert!((a.lon - b.lon).abs() < 1e-12);
            assert_eq!(a.timestamp, b.timestamp);
        }
    }

    #[test]
    fn test_midpoint_sampling() {
        let input = series(&[(0.0, 0.0), (2.0, 4.0)]);
        let got = GapInterpolator::fit(&input).sample_at(&[0.5]);
        assert!((got[0].0 - 1.0).abs() < 1e-12);
        assert!((got[0].1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_extrapolation_extends_boundary_segment() {
        let input = series(&[(0.0, 10.0), (1.0, 12.0), (2.0, 14.0)]);
        let got = GapInterpolator::fit(&input).sample_at(&[-1.0, 3.0]);
        assert!((got[0].0 + 1.0).abs() < 1e-12);
        assert!((got[0].1 - 8.0).abs() < 1e-12);
        assert!((got[1].0 - 3.0).abs() < 1e-12);
        assert!((got[1].1 - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_knot_is_constant() {
        let input = series(&[(5.0, 6.0)]);
        let interp = GapInterpolator::fit(&input);
        let got = interp.sample_at(&[-2.0, 0.0, 7.5]);
        for (lat, lon) in got {
            assert_eq!(lat, 5.0);
            assert_eq!(lon, 6.0);
        }
        assert_eq!(interp.sample().len(), 1);
    }
}
