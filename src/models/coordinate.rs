// Coordinate model representing a (longitude, latitude) pair

use geo::{EuclideanDistance, Point};
use serde::{Deserialize, Serialize};

/// Represents a geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    /// Creates a new coordinate from longitude and latitude
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Euclidean distance in coordinate-degree space
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        Point::from(*self).euclidean_distance(&Point::from(*other))
    }

    /// Returns true when the two points are closer than `threshold` degrees
    pub fn is_near(&self, other: &Coordinate, threshold: f64) -> bool {
        self.distance_to(other) < threshold
    }

    /// Shifts the coordinate by the given deltas
    pub fn offset(&self, d_lon: f64, d_lat: f64) -> Self {
        Self::new(self.lon + d_lon, self.lat + d_lat)
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(c: Coordinate) -> Self {
        Point::new(c.lon, c.lat)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(p: Point<f64>) -> Self {
        Coordinate::new(p.x(), p.y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let c1 = Coordinate::new(0.0, 0.0);
        let c2 = Coordinate::new(3.0, 4.0);

        assert_eq!(c1.distance_to(&c2), 5.0);
    }

    #[test]
    fn test_is_near() {
        let c1 = Coordinate::new(77.2, 28.5);
        let c2 = Coordinate::new(77.20005, 28.5);

        assert!(c1.is_near(&c2, 0.0001));
        assert!(!c1.is_near(&c2, 0.00001));
    }

    #[test]
    fn test_point_conversion() {
        let c = Coordinate::new(77.209, 28.6139);
        let p: Point<f64> = c.into();

        assert_eq!(p.x(), 77.209);
        assert_eq!(p.y(), 28.6139);
        assert_eq!(Coordinate::from(p), c);
    }
}
