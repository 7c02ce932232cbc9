//! Résolution de la zone active

use crate::geo::{haversine_distance_m, Coordinate};
use ambzones::Zone;

/// Distance entre `position` et le centre de `zone`, en mètres
pub fn distance_to_zone_m(zone: &Zone, position: Coordinate) -> f64 {
    haversine_distance_m(position, zone.center.into())
}

/// `true` si `position` est à une distance du centre inférieure ou égale au rayon
pub fn contains(zone: &Zone, position: Coordinate) -> bool {
    distance_to_zone_m(zone, position) <= zone.radius_m
}

/// Zone active pour une position.
///
/// Retourne la première zone, dans l'ordre du répertoire, qui contient la
/// position. Les zones qui se chevauchent ne sont pas départagées par la
/// distance : l'ordre de la liste fait foi.
pub fn resolve(zones: &[Zone], position: Option<Coordinate>) -> Option<&Zone> {
    let position = position?;
    zones.iter().find(|zone| contains(zone, position))
}
