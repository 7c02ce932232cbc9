//! Coordonnées et distance orthodromique

use ambzones::LatLng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rayon terrestre moyen (modèle sphérique), en mètres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Position en degrés décimaux
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<LatLng> for Coordinate {
    fn from(c: LatLng) -> Self {
        Self::new(c.lat, c.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Distance de surface entre deux points (formule de haversine).
///
/// Le terme intermédiaire est borné à `[0, 1]` avant `asin` : les erreurs
/// d'arrondi près des antipodes le font parfois dépasser 1.
pub fn haversine_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.clamp(0.0, 1.0).sqrt().asin()
}
