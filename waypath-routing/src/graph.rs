//! The routable graph and the builder that turns a way list into one.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use waypath_common::{Coordinate, RoadClass, INTERSECTION_TOLERANCE_KM};
use waypath_fetch::Way;
use waypath_geo::distance_km;

/// Identifies a node within a single `Graph`. Not stable across builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Identifies a directed edge within a single `Graph`. Not stable across builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(u64);

/// A graph vertex: an intersection, a dead end, or a merged cluster of either.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub coord: Coordinate,
    pub edges: Vec<EdgeId>,
}

/// A directed road segment.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub distance: f64,
    pub road_class: RoadClass,
    pub weight: f64,
    pub road_name: Option<String>,
}

/// A weighted directed graph of intersections and road segments.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
}

impl Graph {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The first edge, in no particular but deterministic order, from `from` to `to`.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.node(from)?
            .edges
            .iter()
            .filter_map(|id| self.edge(*id))
            .find(|e| e.to == to)
    }
}

/// Builds a fresh graph from a way list: find-or-create ingestion, intersection
/// merge, then a single dedup pass. Pure with respect to its input.
pub fn build(ways: &[Way]) -> Graph {
    let mut builder = Builder::default();

    let mut point_count = 0usize;
    for way in ways {
        if way.geometry.len() < 2 {
            continue;
        }
        let ids: Vec<NodeId> = way.geometry.iter().map(|p| builder.find_or_create(*p)).collect();
        point_count += way.geometry.len();

        for i in 0..ids.len() - 1 {
            let (a, b) = (ids[i], ids[i + 1]);
            if a == b {
                continue;
            }
            let distance = distance_km(way.geometry[i], way.geometry[i + 1]);
            let weight = distance * way.road_class.weight_multiplier();
            builder.add_edge(a, b, distance, way.road_class, weight, way.name.clone());
            builder.add_edge(b, a, distance, way.road_class, weight, way.name.clone());
        }
    }

    debug!(
        points = point_count,
        nodes = builder.nodes.len(),
        edges = builder.edges.len(),
        "ingested way geometry"
    );

    builder.merge_intersections();
    debug!(
        nodes = builder.nodes.len(),
        edges = builder.edges.len(),
        "merged intersections"
    );

    builder.dedup();
    debug!(
        nodes = builder.nodes.len(),
        edges = builder.edges.len(),
        "deduplicated edges"
    );

    Graph { nodes: builder.nodes, edges: builder.edges }
}

#[derive(Default)]
struct Builder {
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    edges: HashMap<EdgeId, Edge>,
    edge_order: Vec<EdgeId>,
    next_node_id: u64,
    next_edge_id: u64,
}

impl Builder {
    fn find_or_create(&mut self, coord: Coordinate) -> NodeId {
        for id in &self.node_order {
            let node = &self.nodes[id];
            if distance_km(node.coord, coord) < INTERSECTION_TOLERANCE_KM {
                return *id;
            }
        }
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, Node { id, coord, edges: Vec::new() });
        self.node_order.push(id);
        id
    }

    fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        distance: f64,
        road_class: RoadClass,
        weight: f64,
        road_name: Option<String>,
    ) {
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.insert(id, Edge { id, from, to, distance, road_class, weight, road_name });
        self.edge_order.push(id);
        if let Some(node) = self.nodes.get_mut(&from) {
            node.edges.push(id);
        }
    }

    /// Collapses clusters of nodes within `2 * INTERSECTION_TOLERANCE_KM` of a seed
    /// into a single representative. Membership is tested against the seed only,
    /// not transitively against other cluster members.
    fn merge_intersections(&mut self) {
        let threshold = 2.0 * INTERSECTION_TOLERANCE_KM;
        let mut processed: HashSet<NodeId> = HashSet::new();

        for &seed in &self.node_order.clone() {
            if processed.contains(&seed) {
                continue;
            }
            let seed_coord = self.nodes[&seed].coord;
            let mut cluster = vec![seed];
            for &other in &self.node_order {
                if other == seed || processed.contains(&other) {
                    continue;
                }
                if distance_km(seed_coord, self.nodes[&other].coord) < threshold {
                    cluster.push(other);
                }
            }
            for &member in &cluster {
                processed.insert(member);
            }

            if cluster.len() < 2 {
                continue;
            }

            let representative = cluster[0];
            let mean_lat = cluster.iter().map(|id| self.nodes[id].coord.lat).sum::<f64>() / cluster.len() as f64;
            let mean_lng = cluster.iter().map(|id| self.nodes[id].coord.lng).sum::<f64>() / cluster.len() as f64;

            let mut unioned_edges = Vec::new();
            for &member in &cluster {
                if member == representative {
                    continue;
                }
                if let Some(node) = self.nodes.remove(&member) {
                    unioned_edges.extend(node.edges);
                }
            }

            for edge in self.edges.values_mut() {
                if cluster[1..].contains(&edge.from) {
                    edge.from = representative;
                }
                if cluster[1..].contains(&edge.to) {
                    edge.to = representative;
                }
            }

            if let Some(rep) = self.nodes.get_mut(&representative) {
                rep.coord = Coordinate::new(mean_lat, mean_lng);
                rep.edges.extend(unioned_edges);
            }
        }
    }

    /// Drops self-loops, keeps the first edge per `(from, to)` pair in insertion
    /// order, then prunes dangling edge-id references from every node.
    fn dedup(&mut self) {
        let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
        let mut to_drop: Vec<EdgeId> = Vec::new();

        for &id in &self.edge_order {
            let edge = &self.edges[&id];
            if edge.from == edge.to {
                to_drop.push(id);
                continue;
            }
            let key = (edge.from, edge.to);
            if !seen.insert(key) {
                to_drop.push(id);
            }
        }

        for id in to_drop {
            self.edges.remove(&id);
        }

        let surviving: HashSet<EdgeId> = self.edges.keys().copied().collect();
        for node in self.nodes.values_mut() {
            node.edges.retain(|id| surviving.contains(id));
        }
    }
}
