//! Single-source Dijkstra over a `Graph`, with path reconstruction and
//! reprojection back into a coordinate polyline.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, warn};
use waypath_common::{Coordinate, ErrorKind, RoadClass};
use waypath_geo::{distance_km, nearest};

use crate::graph::{Graph, NodeId};

/// Failure modes of a single shortest-path search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("click closer to a road")]
    NoNearbyIntersection,
    #[error("disconnected networks")]
    Unreachable,
    #[error("search aborted by safety bound")]
    SearchAborted,
    #[error("path reconstruction failed")]
    ReconstructionFailed,
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoNearbyIntersection => ErrorKind::NoNearbyIntersection,
            Self::Unreachable => ErrorKind::Unreachable,
            Self::SearchAborted => ErrorKind::SearchAborted,
            Self::ReconstructionFailed => ErrorKind::ReconstructionFailed,
        }
    }
}

/// The shaped result of a successful search.
#[derive(Debug, Clone)]
pub struct RouteResult {
    pub path: Vec<Coordinate>,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub total_weight: f64,
    pub node_count: usize,
    pub source_node: NodeId,
    pub destination_node: NodeId,
}

impl NodeId {
    /// An opaque identifier suitable for exposing in a debug response field.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds the shortest path between `source_coord` and `dest_coord` over `graph`.
///
/// Treats `graph` as read-only. The returned polyline preserves the caller's
/// original endpoints; only the interior follows the road network.
pub fn shortest_path(
    graph: &Graph,
    source_coord: Coordinate,
    dest_coord: Coordinate,
) -> Result<RouteResult, SearchError> {
    let (source, _) =
        nearest(source_coord, graph.nodes(), |n| n.coord).ok_or(SearchError::NoNearbyIntersection)?;
    let (destination, _) =
        nearest(dest_coord, graph.nodes(), |n| n.coord).ok_or(SearchError::NoNearbyIntersection)?;
    let source_id = source.id;
    let dest_id = destination.id;

    debug!(source_node = source_id.as_u64(), destination_node = dest_id.as_u64(), "snapped endpoints");

    let mut dist: HashMap<NodeId, f64> = HashMap::new();
    let mut prev: HashMap<NodeId, NodeId> = HashMap::new();
    let mut finalized: HashSet<NodeId> = HashSet::new();
    let mut heap = BinaryHeap::new();

    dist.insert(source_id, 0.0);
    heap.push(State { cost: 0.0, node: source_id });

    let safety_bound = 2 * graph.node_count().max(1);
    let mut extractions = 0usize;
    let mut reached_destination = false;

    while let Some(State { cost, node }) = heap.pop() {
        if finalized.contains(&node) {
            continue;
        }
        finalized.insert(node);
        extractions += 1;

        if extractions > safety_bound {
            warn!(extractions, safety_bound, "search aborted by safety bound");
            return Err(SearchError::SearchAborted);
        }

        if node == dest_id {
            reached_destination = true;
            break;
        }

        let Some(current) = graph.node(node) else { continue };
        for edge_id in &current.edges {
            let Some(edge) = graph.edge(*edge_id) else { continue };
            if finalized.contains(&edge.to) {
                continue;
            }
            let candidate = cost + edge.weight;
            if candidate < *dist.get(&edge.to).unwrap_or(&f64::INFINITY) {
                dist.insert(edge.to, candidate);
                prev.insert(edge.to, node);
                heap.push(State { cost: candidate, node: edge.to });
            }
        }
    }

    if !reached_destination {
        return Err(SearchError::Unreachable);
    }

    debug!(extractions, "search completed");

    let node_path = reconstruct(&prev, source_id, dest_id, graph.node_count())?;
    Ok(shape_result(graph, &node_path, source_coord, dest_coord, source_id, dest_id))
}

fn reconstruct(
    prev: &HashMap<NodeId, NodeId>,
    source_id: NodeId,
    dest_id: NodeId,
    node_count: usize,
) -> Result<Vec<NodeId>, SearchError> {
    let mut path = vec![dest_id];
    let mut current = dest_id;
    while current != source_id {
        match prev.get(&current) {
            Some(&p) => {
                path.push(p);
                current = p;
            }
            None => return Err(SearchError::ReconstructionFailed),
        }
        if path.len() > node_count + 1 {
            return Err(SearchError::ReconstructionFailed);
        }
    }
    path.reverse();

    if path.first() != Some(&source_id) || path.last() != Some(&dest_id) {
        return Err(SearchError::ReconstructionFailed);
    }
    Ok(path)
}

fn shape_result(
    graph: &Graph,
    node_path: &[NodeId],
    source_coord: Coordinate,
    dest_coord: Coordinate,
    source_id: NodeId,
    dest_id: NodeId,
) -> RouteResult {
    let interior: &[NodeId] = if node_path.len() >= 2 { &node_path[1..node_path.len() - 1] } else { &[] };

    let mut polyline = vec![source_coord];
    for id in interior {
        if let Some(node) = graph.node(*id) {
            polyline.push(node.coord);
        }
    }
    polyline.push(dest_coord);

    let distance_km: f64 =
        polyline.windows(2).map(|pair| waypath_geo::distance_km(pair[0], pair[1])).sum();

    let mut total_weight = 0.0;
    let mut duration_hours = 0.0;
    for pair in node_path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if let Some(edge) = graph.edge_between(a, b) {
            total_weight += edge.weight;
            duration_hours += edge.distance / edge.road_class.speed_kmh();
        } else {
            let (ca, cb) = (graph.node(a).map(|n| n.coord), graph.node(b).map(|n| n.coord));
            if let (Some(ca), Some(cb)) = (ca, cb) {
                duration_hours += distance_km(ca, cb) / RoadClass::Default.speed_kmh();
            }
        }
    }

    RouteResult {
        path: polyline,
        distance_km,
        duration_minutes: (duration_hours * 60.0).round() as u32,
        total_weight,
        node_count: node_path.len(),
        source_node: source_id,
        destination_node: dest_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use waypath_common::RoadClass;
    use waypath_fetch::Way;

    fn way(points: &[(f64, f64)], class: RoadClass) -> Way {
        Way {
            id: 1,
            road_class: class,
            name: None,
            geometry: points.iter().map(|(lat, lng)| Coordinate::new(*lat, *lng)).collect(),
        }
    }

    #[test]
    fn straight_line_route_uses_both_endpoints() {
        let ways = vec![way(&[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02)], RoadClass::Residential)];
        let graph = build(&ways);
        let result = shortest_path(&graph, Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.02)).unwrap();
        assert_eq!(result.path.first(), Some(&Coordinate::new(0.0, 0.0)));
        assert_eq!(result.path.last(), Some(&Coordinate::new(0.0, 0.02)));
        assert!(result.distance_km > 0.0);
        assert_eq!(result.node_count, 3);
    }

    #[test]
    fn off_road_endpoints_are_preserved_in_output() {
        let ways = vec![way(&[(0.0, 0.0), (0.0, 0.01)], RoadClass::Residential)];
        let graph = build(&ways);
        let off_road_source = Coordinate::new(0.0005, 0.0005);
        let off_road_dest = Coordinate::new(0.0, 0.0105);
        let result = shortest_path(&graph, off_road_source, off_road_dest).unwrap();
        assert_eq!(result.path.first(), Some(&off_road_source));
        assert_eq!(result.path.last(), Some(&off_road_dest));
    }

    #[test]
    fn disconnected_components_are_unreachable() {
        let ways = vec![
            way(&[(0.0, 0.0), (0.0, 0.01)], RoadClass::Residential),
            way(&[(10.0, 10.0), (10.0, 10.01)], RoadClass::Residential),
        ];
        let graph = build(&ways);
        let err = shortest_path(&graph, Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 10.0)).unwrap_err();
        assert!(matches!(err, SearchError::Unreachable));
    }

    #[test]
    fn faster_road_class_is_preferred_over_shorter_slower_detour() {
        // A direct residential edge competes with a longer but faster-weighted motorway detour.
        let ways = vec![
            way(&[(0.0, 0.0), (0.0, 0.05)], RoadClass::Residential),
            way(&[(0.0, 0.0), (0.001, 0.025), (0.0, 0.05)], RoadClass::Motorway),
        ];
        let graph = build(&ways);
        let result = shortest_path(&graph, Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.05)).unwrap();
        // the motorway route passes through the intermediate waypoint
        assert!(result.node_count >= 3);
    }

    #[test]
    fn shape_result_falls_back_to_default_speed_when_no_edge_exists_between_path_nodes() {
        // Two disjoint ways produce two components with no edge crossing them.
        // Feeding `shape_result` a hand-built node path that jumps straight from
        // one component to the other (bypassing `shortest_path`'s own Dijkstra,
        // which would never do this) exercises the `edge_between`-missing branch.
        let ways = vec![
            way(&[(0.0, 0.0), (0.0, 0.01)], RoadClass::Residential),
            way(&[(10.0, 10.0), (10.0, 10.01)], RoadClass::Residential),
        ];
        let graph = build(&ways);

        let first = graph.nodes().find(|n| n.coord.lat == 0.0).unwrap();
        let second = graph.nodes().find(|n| n.coord.lat == 10.0).unwrap();
        assert!(graph.edge_between(first.id, second.id).is_none());

        let node_path = vec![first.id, second.id];
        let result = shape_result(
            &graph,
            &node_path,
            first.coord,
            second.coord,
            first.id,
            second.id,
        );

        let expected_minutes =
            (distance_km(first.coord, second.coord) / RoadClass::Default.speed_kmh() * 60.0).round() as u32;
        assert_eq!(result.duration_minutes, expected_minutes);
    }

    #[test]
    fn empty_graph_fails_no_nearby_intersection() {
        let graph = build(&[]);
        let err = shortest_path(&graph, Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, SearchError::NoNearbyIntersection));
    }
}
