//! Aggregates every stage's typed error into one enum the HTTP layer can map
//! onto a status code and JSON body.

use thiserror::Error;
use waypath_common::ErrorKind;
use waypath_fetch::FetchError;
use waypath_routing::SearchError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid coordinates")]
    InvalidCoordinates,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCoordinates => ErrorKind::InvalidCoordinates,
            Self::Fetch(err) => err.kind(),
            Self::Search(err) => err.kind(),
        }
    }
}
