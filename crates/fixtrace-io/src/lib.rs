//! # fixtrace-io
//!
//! Ingestion collaborators for the refinement pipeline:
//! - Raw positioning logs (fixed-width text, `%` comments)
//! - KML reference tracks (auxiliary display geometry)
//! - Road-network node files (JSON)
//!
//! Parsers recover locally: malformed rows or entries are dropped or
//! defaulted, never escalated to a document-level failure.

pub mod network;
pub mod poslog;
pub mod reftrack;

pub use network::{load_network_nodes, NetworkNode};
pub use poslog::{load_pos_log, parse_pos_log};
pub use reftrack::{load_reference_track, parse_reference_track, ReferencePoint};
