//! Validates the endpoint pair, consults the graph cache, and composes
//! fetch → build → search into a response envelope.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;
use waypath_common::{BoundingBox, Coordinate, CACHE_KEY_PRECISION_DEG, MIN_ROUTE_DISTANCE_KM};
use waypath_fetch::FetchConfig;
use waypath_routing::Graph;

use crate::cache::{CacheOutcome, GraphCache};
use crate::error::Error;

/// The wire-facing response shape described by §6 of the routing specification.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RouteResponse {
    pub path: Vec<Coordinate>,
    pub distance: f64,
    pub duration: u32,
    pub metrics: Metrics,
    pub debug: DebugInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Metrics {
    pub total_weight: f64,
    pub node_count: usize,
    pub processing_time_ms: u64,
    pub graph_stats: GraphStats,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DebugInfo {
    pub source_node: u64,
    pub destination_node: u64,
}

/// Validates, resolves (cache hit or fetch+build), searches, and shapes the response.
pub async fn calculate_route(
    cache: &GraphCache,
    client: &reqwest::Client,
    fetch_config: &FetchConfig,
    source: Coordinate,
    destination: Coordinate,
) -> Result<RouteResponse, Error> {
    let started = Instant::now();

    if !source.is_valid() || !destination.is_valid() {
        return Err(Error::InvalidCoordinates);
    }
    if waypath_geo::distance_km(source, destination) < MIN_ROUTE_DISTANCE_KM {
        return Err(Error::InvalidCoordinates);
    }

    let bbox = BoundingBox::enclosing(source, destination);
    let key = bbox.quantize(CACHE_KEY_PRECISION_DEG);

    let (outcome, cached) = cache.get(key).await;
    let graph = match (outcome, cached) {
        (CacheOutcome::Hit, Some(graph)) => graph,
        (outcome, _) => {
            let graph = match build_graph(client, fetch_config, source, destination).await {
                Ok(graph) => Arc::new(graph),
                Err(err) => {
                    error!(error = %err, kind = ?err.kind(), "fetch/build stage failed");
                    return Err(err);
                }
            };
            cache.insert(key, graph.clone()).await;
            info!(?outcome, "graph cache miss, built fresh graph");
            graph
        }
    };

    let result = waypath_routing::shortest_path(&graph, source, destination).map_err(|err| {
        error!(error = %err, kind = ?err.kind(), "search stage failed");
        Error::from(err)
    })?;

    let response = RouteResponse {
        path: result.path,
        distance: round_to(result.distance_km, 3),
        duration: result.duration_minutes,
        metrics: Metrics {
            total_weight: round_to(result.total_weight, 2),
            node_count: result.node_count,
            processing_time_ms: started.elapsed().as_millis() as u64,
            graph_stats: GraphStats { nodes: graph.node_count(), edges: graph.edge_count() },
        },
        debug: DebugInfo {
            source_node: result.source_node.as_u64(),
            destination_node: result.destination_node.as_u64(),
        },
    };

    info!(
        cache_outcome = ?outcome,
        cache_key = ?key,
        processing_time_ms = response.metrics.processing_time_ms,
        "route calculated"
    );

    Ok(response)
}

async fn build_graph(
    client: &reqwest::Client,
    fetch_config: &FetchConfig,
    source: Coordinate,
    destination: Coordinate,
) -> Result<Graph, Error> {
    let ways = waypath_fetch::fetch(client, fetch_config, source, destination).await?;
    Ok(waypath_routing::build(&ways))
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
