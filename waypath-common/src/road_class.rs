//! Road classification and the weight-multiplier / speed lookup tables.

use serde::{Deserialize, Serialize};

/// A coarse OSM `highway` category. Unrecognized tags fall back to `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Unclassified,
    Default,
}

impl RoadClass {
    /// Parses a raw `highway` tag value, falling back to `Default` for anything unrecognized.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "motorway" => Self::Motorway,
            "trunk" => Self::Trunk,
            "primary" => Self::Primary,
            "secondary" => Self::Secondary,
            "tertiary" => Self::Tertiary,
            "residential" => Self::Residential,
            "unclassified" => Self::Unclassified,
            _ => Self::Default,
        }
    }

    /// The factor by which great-circle distance is multiplied to get edge weight.
    pub fn weight_multiplier(&self) -> f64 {
        match self {
            Self::Motorway => 1.0,
            Self::Trunk => 1.2,
            Self::Primary => 1.5,
            Self::Secondary => 2.0,
            Self::Tertiary => 2.5,
            Self::Residential => 3.0,
            Self::Unclassified => 3.5,
            Self::Default => 2.0,
        }
    }

    /// Assumed travel speed in km/h, used to convert a route into a time estimate.
    pub fn speed_kmh(&self) -> f64 {
        match self {
            Self::Motorway => 90.0,
            Self::Trunk => 70.0,
            Self::Primary => 60.0,
            Self::Secondary => 50.0,
            Self::Tertiary => 40.0,
            Self::Residential => 30.0,
            Self::Unclassified => 25.0,
            Self::Default => 40.0,
        }
    }
}
