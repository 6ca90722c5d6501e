use std::path::Path;

use anyhow::{Context, Result};
use fixtrace_core::{NodeId, RoadNode};
use serde::Deserialize;

/// One road node as stored in an exported node file.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkNode {
    pub id: u64,
    pub lon: f64,
    pub lat: f64,
}

impl From<NetworkNode> for RoadNode {
    fn from(n: NetworkNode) -> Self {
        RoadNode {
            id: NodeId(n.id),
            lon: n.lon,
            lat: n.lat,
        }
    }
}

/// Load a JSON array of road-network nodes, the input to network
/// acquisition.
pub fn load_network_nodes<P: AsRef<Path>>(path: P) -> Result<Vec<RoadNode>> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .with_context(|| format!("reading network nodes {}", path.display()))?;
    let nodes: Vec<NetworkNode> = serde_json::from_slice(&data)
        .with_context(|| format!("parsing network nodes {}", path.display()))?;
    Ok(nodes.into_iter().map(RoadNode::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_file_round_trip() {
        let json = r#"[
            {"id": 100, "lon": 11.57, "lat": 48.13},
            {"id": 101, "lon": 11.58, "lat": 48.14}
        ]"#;
        let nodes: Vec<NetworkNode> = serde_json::from_str(json).unwrap();
        let roads: Vec<RoadNode> = nodes.into_iter().map(RoadNode::from).collect();
        assert_eq!(roads.len(), 2);
        assert_eq!(roads[0].id, NodeId(100));
        assert!((roads[1].lat - 48.14).abs() < 1e-12);
    }
}
