use crate::interp::GapInterpolator;
use crate::kalman::{SmootherTuning, TrajectorySmoother};
use crate::matcher::{match_series, RoadNetwork};
use crate::series::{FixSeries, NodeId};

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Terminal condition of a refinement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Zero valid fixes survived ingestion; nothing to refine.
    EmptyInput,
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "no valid position fixes to refine"),
        }
    }
}

impl std::error::Error for PipelineError {}

/// The four artifacts of one refinement run.
#[derive(Debug, Clone)]
pub struct RefinedTrack {
    pub raw: FixSeries,
    pub smoothed: FixSeries,
    pub interpolated: FixSeries,
    /// Nearest road node per raw fix, when a network was available. Shorter
    /// than `raw` if individual queries failed.
    pub matched: Option<Vec<NodeId>>,
}

/// Run the whole-track batch transform.
///
/// The smoother and the interpolator both consume the raw series; neither
/// feeds the other. Matching runs against the raw series only when a network
/// is supplied, so an acquisition failure upstream degrades to `matched:
/// None` while smoothing and interpolation still proceed.
pub fn refine(
    raw: FixSeries,
    tuning: SmootherTuning,
    network: Option<&dyn RoadNetwork>,
) -> Result<RefinedTrack, PipelineError> {
    if raw.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let smoothed = TrajectorySmoother::new(tuning).smooth(&raw);
    let interpolated = GapInterpolator::fit(&raw).sample();
    let matched = network.map(|net| match_series(&raw, net));

    Ok(RefinedTrack {
        raw,
        smoothed,
        interpolated,
        matched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{PointNetwork, RoadNode};
    use crate::series::PositionFix;

    fn raw_series(n: usize) -> FixSeries {
        FixSeries::from(
            (0..n)
                .map(|i| PositionFix::new(format!("t{i}"), 48.0 + 1e-4 * i as f64, 11.0))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_empty_input_terminates_run() {
        let err = refine(FixSeries::new(), SmootherTuning::default(), None).unwrap_err();
        assert_eq!(err, PipelineError::EmptyInput);
    }

    #[test]
    fn test_degrades_without_network() {
        let track = refine(raw_series(5), SmootherTuning::default(), None).unwrap();
        assert_eq!(track.smoothed.len(), 5);
        assert_eq!(track.interpolated.len(), 5);
        assert!(track.matched.is_none());
    }

    #[test]
    fn test_full_run_with_network() {
        let nodes = vec![RoadNode {
            id: crate::series::NodeId(42),
            lon: 11.0,
            lat: 48.0,
        }];
        let net = PointNetwork::acquire(nodes, (48.0, 11.0), 1000.0, 500.0).unwrap();
        let track = refine(raw_series(4), SmootherTuning::default(), Some(&net)).unwrap();
        assert_eq!(track.raw.len(), 4);
        assert_eq!(track.matched.as_ref().unwrap().len(), 4);
    }
}
