use nalgebra::{Matrix2, Matrix4, SMatrix, Vector2, Vector4};

use crate::series::{FixSeries, PositionFix};

// ---------------------------------------------------------------------------
// Tuning & status
// ---------------------------------------------------------------------------

/// Noise parameters of the constant-velocity filter. Fixed for a whole run,
/// not adapted per sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmootherTuning {
    /// Measurement noise variance on lat and lon (diagonal R).
    pub measurement_var: f64,
    /// Process noise variance shared across all four state dimensions
    /// (diagonal Q).
    pub process_var: f64,
    /// Scale of the initial state covariance (P0 = initial_var * I).
    pub initial_var: f64,
}

impl Default for SmootherTuning {
    fn default() -> Self {
        Self {
            measurement_var: 5.0,
            process_var: 0.1,
            initial_var: 1000.0,
        }
    }
}

/// Per-step outcome of the filter recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    /// Normal predict + update.
    Updated,
    /// The innovation covariance was not invertible; the state was
    /// re-initialized from the observation with the initial covariance.
    Reset,
}

// ---------------------------------------------------------------------------
// Smoother
// ---------------------------------------------------------------------------

/// Constant-velocity Kalman filter over a fix series.
///
/// State is `[lat, lon, dlat, dlon]` with an implicit time step of one
/// sample; the transition adds the velocity estimate to the position and the
/// observation measures `[lat, lon]` only. Elapsed real time between
/// irregular samples is deliberately not modeled.
pub struct TrajectorySmoother {
    tuning: SmootherTuning,
    f: Matrix4<f64>,
    h: SMatrix<f64, 2, 4>,
    q: Matrix4<f64>,
    r: Matrix2<f64>,
}

impl Default for TrajectorySmoother {
    fn default() -> Self {
        Self::new(SmootherTuning::default())
    }
}

impl TrajectorySmoother {
    pub fn new(tuning: SmootherTuning) -> Self {
        #[rustfmt::skip]
        let f = Matrix4::new(
            1.0, 0.0, 1.0, 0.0,
            0.0, 1.0, 0.0, 1.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        #[rustfmt::skip]
        let h = SMatrix::<f64, 2, 4>::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
        );
        Self {
            tuning,
            f,
            h,
            q: Matrix4::identity() * tuning.process_var,
            r: Matrix2::identity() * tuning.measurement_var,
        }
    }

    /// Filter a series, returning a new series of identical length and
    /// order. Each output fix pairs the filtered lat/lon with the original
    /// timestamp; height and quality metadata are not part of the state
    /// model and are dropped. An empty input yields an empty output.
    pub fn smooth(&self, fixes: &FixSeries) -> FixSeries {
        self.smooth_with_status(fixes).0
    }

    /// Same as [`smooth`](Self::smooth) but also reports the per-step
    /// [`FilterStatus`] trace for diagnostics.
    pub fn smooth_with_status(&self, fixes: &FixSeries) -> (FixSeries, Vec<FilterStatus>) {
        let mut out = FixSeries::new();
        let mut trace = Vec::with_capacity(fixes.len());

        let first = match fixes.iter().next() {
            Some(f) => f,
            None => return (out, trace),
        };

        // State starts at the first observed position with zero velocity and
        // a large covariance, and lives exactly as long as the series.
        let p0 = Matrix4::identity() * self.tuning.initial_var;
        let mut x = Vector4::new(first.lat, first.lon, 0.0, 0.0);
        let mut p = p0;

        for fix in fixes.iter() {
            let z = Vector2::new(fix.lat, fix.lon);

            // Predict
            x = self.f * x;
            p = self.f * p * self.f.transpose() + self.q;

            // Update
            let innovation = z - self.h * x;
            let s = self.h * p * self.h.transpose() + self.r;
            match s.try_inverse() {
                Some(s_inv) => {
                    let k = p * self.h.transpose() * s_inv;
                    x += k * innovation;
                    p = (Matrix4::identity() - k * self.h) * p;
                    trace.push(FilterStatus::Updated);
                }
                None => {
                    // Singular innovation covariance: restart from the
                    // observation rather than propagating NaNs.
                    x = Vector4::new(z.x, z.y, 0.0, 0.0);
                    p = p0;
                    trace.push(FilterStatus::Reset);
                }
            }

            out.push(PositionFix::new(fix.timestamp.clone(), x[0], x[1]));
        }

        (out, trace)
    }
}
