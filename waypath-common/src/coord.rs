//! Coordinates and bounding boxes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::BBOX_PADDING_DEG;

/// A point on the earth's surface, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether this coordinate falls within the valid lat/lng ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A south/west/north/east bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Builds the bounding box enclosing two endpoints, without padding.
    pub fn enclosing(a: Coordinate, b: Coordinate) -> Self {
        Self {
            south: a.lat.min(b.lat),
            north: a.lat.max(b.lat),
            west: a.lng.min(b.lng),
            east: a.lng.max(b.lng),
        }
    }

    /// Returns this box padded by `BBOX_PADDING_DEG` degrees on every side.
    pub fn padded(&self) -> Self {
        Self {
            south: self.south - BBOX_PADDING_DEG,
            west: self.west - BBOX_PADDING_DEG,
            north: self.north + BBOX_PADDING_DEG,
            east: self.east + BBOX_PADDING_DEG,
        }
    }

    /// Quantizes this box to `precision` degrees: min-side components floor,
    /// max-side components ceil. Used as the graph cache key so that nearby
    /// requests share a cached graph.
    pub fn quantize(&self, precision: f64) -> QuantizedBoundingBox {
        let snap_floor = |v: f64| (v / precision).floor() as i64;
        let snap_ceil = |v: f64| (v / precision).ceil() as i64;
        QuantizedBoundingBox {
            south: snap_floor(self.south),
            west: snap_floor(self.west),
            north: snap_ceil(self.north),
            east: snap_ceil(self.east),
        }
    }
}

/// A bounding box rounded to a fixed grid, suitable for use as a `HashMap` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantizedBoundingBox {
    south: i64,
    west: i64,
    north: i64,
    east: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_validity() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(90.1, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 180.1).is_valid());
    }

    #[test]
    fn enclosing_takes_componentwise_min_max() {
        let a = Coordinate::new(10.0, 20.0);
        let b = Coordinate::new(5.0, 30.0);
        let bbox = BoundingBox::enclosing(a, b);
        assert_eq!(bbox.south, 5.0);
        assert_eq!(bbox.north, 10.0);
        assert_eq!(bbox.west, 20.0);
        assert_eq!(bbox.east, 30.0);
    }

    #[test]
    fn padded_expands_every_side() {
        let bbox = BoundingBox {
            south: 1.0,
            west: 1.0,
            north: 2.0,
            east: 2.0,
        };
        let padded = bbox.padded();
        assert_eq!(padded.south, 1.0 - BBOX_PADDING_DEG);
        assert_eq!(padded.west, 1.0 - BBOX_PADDING_DEG);
        assert_eq!(padded.north, 2.0 + BBOX_PADDING_DEG);
        assert_eq!(padded.east, 2.0 + BBOX_PADDING_DEG);
    }

    #[test]
    fn quantize_floors_min_sides_and_ceils_max_sides() {
        let bbox = BoundingBox {
            south: 1.004,
            west: 1.006,
            north: 2.001,
            east: 2.009,
        };
        let q = bbox.quantize(0.01);
        assert_eq!(q, QuantizedBoundingBox { south: 100, west: 100, north: 201, east: 201 });
    }

    #[test]
    fn nearby_requests_share_quantized_key() {
        let a = BoundingBox { south: 1.001, west: 1.001, north: 2.009, east: 2.009 };
        let b = BoundingBox { south: 1.004, west: 1.002, north: 2.002, east: 2.001 };
        assert_eq!(a.quantize(0.01), b.quantize(0.01));
    }
}
