//! # fixtrace-core
//!
//! Trajectory refinement over noisy GNSS position fixes:
//! - Constant-velocity Kalman smoother
//! - Index-domain linear gap interpolator
//! - Nearest-node map matching behind a small capability trait
//! - Batch pipeline tying the stages together
//!
//! The crate is pure and synchronous: every stage borrows its input series
//! and returns a freshly built one, so the same raw series can feed several
//! stages. File parsing and rendering live in the sibling crates.

pub mod interp;
pub mod kalman;
pub mod matcher;
pub mod pipeline;
pub mod series;

// Re-export core types
pub use interp::GapInterpolator;
pub use kalman::{FilterStatus, SmootherTuning, TrajectorySmoother};
pub use matcher::{match_series, AcquireError, PointNetwork, RoadNetwork, RoadNode};
pub use pipeline::{refine, PipelineError, RefinedTrack};
pub use series::{FixSeries, NodeId, PositionFix, QualityInfo};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
