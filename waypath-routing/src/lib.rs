//! Graph construction and shortest-path search over a fetched way list.

pub mod graph;
pub mod route;

pub use graph::{build, Edge, EdgeId, Graph, Node, NodeId};
pub use route::{shortest_path, RouteResult, SearchError};
