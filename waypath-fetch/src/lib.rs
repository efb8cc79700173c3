//! Fetches the road network inside a bounding box from an Overpass-flavored
//! upstream provider.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use waypath_common::{BoundingBox, Coordinate, ErrorKind, RoadClass};

/// The fixed set of highway tags this system routes over.
const HIGHWAY_CLASSES: &[&str] = &[
    "motorway",
    "trunk",
    "primary",
    "secondary",
    "tertiary",
    "residential",
    "unclassified",
];

/// A single road segment as reported by the upstream provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: i64,
    pub road_class: RoadClass,
    pub name: Option<String>,
    pub geometry: Vec<Coordinate>,
}

/// The decoded set of ways inside a requested bounding box.
pub type WayList = Vec<Way>;

/// Failure modes of a single fetch call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no roads in area")]
    EmptyArea,
    #[error("upstream request timed out")]
    UpstreamTimeout,
    #[error("upstream rate limited the request")]
    UpstreamRateLimited,
    #[error("upstream server error (status {status})")]
    UpstreamServerError { status: u16 },
    #[error("upstream response had an unexpected shape: {0}")]
    UpstreamBadShape(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyArea => ErrorKind::EmptyArea,
            Self::UpstreamTimeout => ErrorKind::UpstreamTimeout,
            Self::UpstreamRateLimited => ErrorKind::UpstreamRateLimited,
            Self::UpstreamServerError { .. } => ErrorKind::UpstreamServerError,
            Self::UpstreamBadShape(_) => ErrorKind::UpstreamBadShape,
        }
    }
}

/// Upstream endpoint and timeout, read once by the server's config at startup.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub upstream_url: String,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            upstream_url: "https://overpass-api.de/api/interpreter".to_string(),
            timeout: Duration::from_millis(30_000),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    tags: Option<Tags>,
    #[serde(default)]
    geometry: Option<Vec<LatLon>>,
}

#[derive(Debug, Deserialize)]
struct Tags {
    highway: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

fn build_query(bbox: &BoundingBox) -> String {
    let classes = HIGHWAY_CLASSES.join("|");
    format!(
        "[out:json][timeout:25];way[\"highway\"~\"^({classes})$\"]({south},{west},{north},{east});out geom;",
        south = bbox.south,
        west = bbox.west,
        north = bbox.north,
        east = bbox.east,
    )
}

/// Fetches every way inside the padded bounding box enclosing `source` and `destination`.
///
/// Issues exactly one network request. Does not retry; callers that want another
/// attempt issue another call.
pub async fn fetch(
    client: &reqwest::Client,
    config: &FetchConfig,
    source: Coordinate,
    destination: Coordinate,
) -> Result<WayList, FetchError> {
    let bbox = BoundingBox::enclosing(source, destination).padded();
    let body = build_query(&bbox);

    debug!(
        south = bbox.south,
        west = bbox.west,
        north = bbox.north,
        east = bbox.east,
        classes = HIGHWAY_CLASSES.join(","),
        "fetching road network"
    );

    let started = Instant::now();
    let response = client
        .post(&config.upstream_url)
        .timeout(config.timeout)
        .body(body)
        .send()
        .await
        .map_err(|err| {
            if err.is_timeout() {
                FetchError::UpstreamTimeout
            } else {
                warn!(error = %err, "upstream request failed");
                FetchError::UpstreamBadShape(err.to_string())
            }
        })?;

    let status = response.status();
    if status.as_u16() == 429 {
        warn!(status = status.as_u16(), "upstream rate limited the request");
        return Err(FetchError::UpstreamRateLimited);
    }
    if status.is_server_error() {
        warn!(status = status.as_u16(), "upstream returned a server error");
        return Err(FetchError::UpstreamServerError { status: status.as_u16() });
    }

    let parsed: OverpassResponse = response
        .json()
        .await
        .map_err(|err| FetchError::UpstreamBadShape(err.to_string()))?;

    let ways: WayList = parsed
        .elements
        .into_iter()
        .filter_map(|el| {
            let tags = el.tags?;
            let highway = tags.highway?;
            let geometry = el.geometry?;
            if geometry.len() < 2 {
                return None;
            }
            Some(Way {
                id: el.id,
                road_class: RoadClass::from_tag(&highway),
                name: tags.name,
                geometry: geometry
                    .into_iter()
                    .map(|ll| Coordinate::new(ll.lat, ll.lon))
                    .collect(),
            })
        })
        .collect();

    if ways.is_empty() {
        return Err(FetchError::EmptyArea);
    }

    info!(
        way_count = ways.len(),
        duration_ms = started.elapsed().as_millis(),
        "fetched road network"
    );

    Ok(ways)
}
