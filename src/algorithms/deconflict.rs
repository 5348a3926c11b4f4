use std::f64::consts::PI;

use crate::models::Coordinate;

/// Spreads out coordinates that sit closer than a minimum distance.
///
/// Every pair (i, j) with i < j is compared once, in index order. When the
/// pair is too close, point j is pushed by exactly the threshold along the
/// angle `2π·j / N`. Earlier points never move and the pass is not iterated,
/// so a displacement may leave a new close pair behind.
#[derive(Debug, Clone, Copy)]
pub struct Deconflictor {
    threshold: f64,
}

impl Default for Deconflictor {
    fn default() -> Self {
        Self { threshold: 0.0001 }
    }
}

impl Deconflictor {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn spread(&self, coordinates: &[Coordinate]) -> Vec<Coordinate> {
        let mut adjusted = coordinates.to_vec();
        let n = adjusted.len();

        for i in 0..n {
            for j in (i + 1)..n {
                if adjusted[i].is_near(&adjusted[j], self.threshold) {
                    let angle = 2.0 * PI * j as f64 / n as f64;
                    adjusted[j] = adjusted[j].offset(
                        self.threshold * angle.cos(),
                        self.threshold * angle.sin(),
                    );
                }
            }
        }

        adjusted
    }
}
