use crate::series::{FixSeries, NodeId};

const EARTH_RADIUS: f64 = 6_371_000.0;

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

/// Nearest-node oracle over a road-network graph.
///
/// The matcher owns no distance or projection logic of its own; a network
/// answers "nearest node to this point" or fails for that point (e.g. the
/// query lies outside the network extent). Implementations decide the
/// metric.
pub trait RoadNetwork {
    fn nearest(&self, lon: f64, lat: f64) -> Option<NodeId>;
}

/// Snap each fix to the nearest road node.
///
/// Points whose query fails are dropped from the result, so the output may
/// be shorter than the input; surviving entries keep the relative order of
/// the fixes they came from. A failing point never aborts the batch.
pub fn match_series(fixes: &FixSeries, network: &dyn RoadNetwork) -> Vec<NodeId> {
    fixes
        .iter()
        .filter_map(|fix| network.nearest(fix.lon, fix.lat))
        .collect()
}

// ---------------------------------------------------------------------------
// Point-set network
// ---------------------------------------------------------------------------

/// Road-network acquisition failure: no usable graph for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// No nodes inside the requested radius around the center.
    NoNetwork,
}

impl std::fmt::Display for AcquireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoNetwork => write!(f, "no road network available in the requested area"),
        }
    }
}

impl std::error::Error for AcquireError {}

/// One road node with geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadNode {
    pub id: NodeId,
    pub lon: f64,
    pub lat: f64,
}

/// Concrete nearest-node oracle over a flat node set.
///
/// Linear scan under an equirectangular metric; adequate for the node counts
/// an analyst pulls for a single trace. Queries farther than `max_snap_m`
/// from every node fail.
#[derive(Debug, Clone)]
pub struct PointNetwork {
    nodes: Vec<RoadNode>,
    max_snap_m: f64,
}

impl PointNetwork {
    /// Build a network from the nodes within `radius_m` of `center`
    /// (lat, lon). Fails with [`AcquireError::NoNetwork`] when nothing is in
    /// range, which the caller reports and degrades on rather than crashing.
    pub fn acquire(
        nodes: Vec<RoadNode>,
        center: (f64, f64),
        radius_m: f64,
        max_snap_m: f64,
    ) -> Result<Self, AcquireError> {
        let (clat, clon) = center;
        let retained: Vec<RoadNode> = nodes
            .into_iter()
            .filter(|n| ground_distance_m(clat, clon, n.lat, n.lon) <= radius_m)
            .collect();
        if retained.is_empty() {
            return Err(AcquireError::NoNetwork);
        }
        Ok(Self {
            nodes: retained,
            max_snap_m,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Coordinates of a node, for rendering matched overlays.
    pub fn node_position(&self, id: NodeId) -> Option<(f64, f64)> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| (n.lat, n.lon))
    }
}

impl RoadNetwork for PointNetwork {
    fn nearest(&self, lon: f64, lat: f64) -> Option<NodeId> {
        let mut best: Option<(f64, NodeId)> = None;
        for node in &self.nodes {
            let d = ground_distance_m(lat, lon, node.lat, node.lon);
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, node.id));
            }
        }
        match best {
            Some((d, id)) if d <= self.max_snap_m => Some(id),
            _ => None,
        }
    }
}

/// Equirectangular ground distance in meters. Fine at trace scale; the
/// matcher only compares distances around a single urban-sized extent.
fn ground_distance_m(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let dlat = (lat_b - lat_a).to_radians();
    let dlon = (lon_b - lon_a).to_radians() * lat_a.to_radians().cos();
    EARTH_RADIUS * (dlat * dlat + dlon * dlon).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PositionFix;

    fn node(id: u64, lon: f64, lat: f64) -> RoadNode {
        RoadNode {
            id: NodeId(id),
            lon,
            lat,
        }
    }

    fn network(nodes: Vec<RoadNode>, max_snap_m: f64) -> PointNetwork {
        PointNetwork {
            nodes,
            max_snap_m,
        }
    }

    #[test]
    fn test_nearest_picks_closest_node() {
        let net = network(
            vec![node(1, 11.000, 48.000), node(2, 11.010, 48.000)],
            500.0,
        );
        assert_eq!(net.nearest(11.001, 48.000), Some(NodeId(1)));
        assert_eq!(net.nearest(11.009, 48.000), Some(NodeId(2)));
    }

    #[test]
    fn test_nearest_fails_beyond_snap_distance() {
        let net = network(vec![node(1, 11.0, 48.0)], 100.0);
        // ~0.01 deg lat is roughly 1.1 km, well past the 100 m limit.
        assert_eq!(net.nearest(11.0, 48.01), None);
    }

    #[test]
    fn test_match_cardinality_and_order() {
        let net = network(vec![node(7, 11.0, 48.0), node(8, 11.002, 48.0)], 500.0);
        let fixes = FixSeries::from(vec![
            PositionFix::new("a", 48.0, 11.0001),
            PositionFix::new("b", 48.0, 11.0019),
            PositionFix::new("c", 48.0, 11.0002),
        ]);
        let matched = match_series(&fixes, &net);
        assert_eq!(matched, vec![NodeId(7), NodeId(8), NodeId(7)]);
    }

    #[test]
    fn test_failed_points_are_dropped_order_preserved() {
        let net = network(vec![node(7, 11.0, 48.0), node(8, 11.002, 48.0)], 100.0);
        let fixes = FixSeries::from(vec![
            PositionFix::new("a", 48.0, 11.0001),
            PositionFix::new("b", 48.5, 11.0), // far outside extent
            PositionFix::new("c", 48.0, 11.0019),
        ]);
        let matched = match_series(&fixes, &net);
        assert_eq!(matched, vec![NodeId(7), NodeId(8)]);
    }

    #[test]
    fn test_acquire_filters_by_radius() {
        let nodes = vec![node(1, 11.0, 48.0), node(2, 11.1, 48.0)];
        // 11.1 deg lon at 48 deg lat is ~7.4 km from the center.
        let net = PointNetwork::acquire(nodes, (48.0, 11.0), 1000.0, 100.0).unwrap();
        assert_eq!(net.len(), 1);
        assert_eq!(net.node_position(NodeId(1)), Some((48.0, 11.0)));
        assert_eq!(net.node_position(NodeId(2)), None);
    }

    #[test]
    fn test_acquire_empty_area_reports_no_network() {
        let nodes = vec![node(1, 11.0, 48.0)];
        let err = PointNetwork::acquire(nodes, (10.0, -70.0), 1000.0, 100.0).unwrap_err();
        assert_eq!(err, AcquireError::NoNetwork);
    }
}
