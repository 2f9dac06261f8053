use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub points: Vec<Coordinates>,
    pub distance_km: f64,
}

impl RouteGeometry {
    pub fn new(points: Vec<Coordinates>, distance_km: f64) -> Self {
        Self {
            points,
            distance_km,
        }
    }
}
