//! The shared error-kind vocabulary every stage's typed error maps onto.
//!
//! Each stage crate (`waypath-fetch`, `waypath-routing`, `waypath-server`) defines its
//! own `thiserror` enum for its own failure modes, and implements `kind()` to report
//! which of these kinds it represents. The HTTP layer only ever looks at `ErrorKind`
//! when choosing a status code and message — it never matches on stage-specific variants.

use thiserror::Error;

/// The status-coded error taxonomy from the routing specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("invalid coordinates")]
    InvalidCoordinates,
    #[error("no roads in area")]
    EmptyArea,
    #[error("upstream request timed out")]
    UpstreamTimeout,
    #[error("upstream rate limited the request")]
    UpstreamRateLimited,
    #[error("upstream server error")]
    UpstreamServerError,
    #[error("upstream response had an unexpected shape")]
    UpstreamBadShape,
    #[error("click closer to a road")]
    NoNearbyIntersection,
    #[error("disconnected networks")]
    Unreachable,
    #[error("search aborted by safety bound")]
    SearchAborted,
    #[error("path reconstruction failed")]
    ReconstructionFailed,
}

impl ErrorKind {
    /// The HTTP status code this error kind is surfaced as.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCoordinates => 400,
            Self::EmptyArea => 404,
            Self::UpstreamTimeout => 408,
            Self::UpstreamRateLimited => 503,
            Self::UpstreamServerError => 503,
            Self::UpstreamBadShape => 500,
            Self::NoNearbyIntersection => 404,
            Self::Unreachable => 404,
            Self::SearchAborted => 500,
            Self::ReconstructionFailed => 500,
        }
    }

    /// A short, user-facing hint for this error kind. Empty when none applies.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::UpstreamTimeout => "try a smaller area",
            Self::NoNearbyIntersection => "click closer to a road",
            Self::Unreachable => "source and destination are on disconnected networks",
            _ => "",
        }
    }
}
