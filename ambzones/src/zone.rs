//! Modèle de données des zones

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rayon appliqué quand `radius_m` est absent du fichier
pub const DEFAULT_RADIUS_M: f64 = 50.0;

fn default_radius() -> f64 {
    DEFAULT_RADIUS_M
}

/// Identifiant d'une zone, numérique ou textuel selon le fichier source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZoneId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneId::Number(n) => write!(f, "{}", n),
            ZoneId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ZoneId {
    fn from(n: i64) -> Self {
        ZoneId::Number(n)
    }
}

impl From<&str> for ZoneId {
    fn from(s: &str) -> Self {
        ZoneId::Text(s.to_string())
    }
}

/// Centre d'une zone, en degrés décimaux
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Une région circulaire nommée, associée à une playlist ordonnée.
///
/// Les zones sont immuables une fois chargées ; un rechargement remplace la
/// liste complète.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Zone {
    #[cfg_attr(feature = "server", schema(value_type = String, example = "1"))]
    pub id: ZoneId,
    pub name: String,
    pub center: LatLng,
    #[serde(default = "default_radius")]
    #[cfg_attr(feature = "server", schema(example = 50.0))]
    pub radius_m: f64,
    #[serde(default)]
    pub playlist: Vec<String>,
}

impl Zone {
    pub fn new(id: impl Into<ZoneId>, name: impl Into<String>, center: LatLng) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            center,
            radius_m: DEFAULT_RADIUS_M,
            playlist: Vec::new(),
        }
    }

    pub fn with_radius(mut self, radius_m: f64) -> Self {
        self.radius_m = radius_m;
        self
    }

    pub fn with_playlist<I, S>(mut self, tracks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.playlist = tracks.into_iter().map(Into::into).collect();
        self
    }

    /// Premier morceau de la playlist, joué à l'entrée dans la zone
    pub fn first_track(&self) -> Option<&str> {
        self.playlist.first().map(String::as_str)
    }

    /// Vérifie les invariants d'une zone : rayon strictement positif et
    /// centre dans les bornes géographiques.
    pub fn validate(&self) -> Result<()> {
        if !self.radius_m.is_finite() || self.radius_m <= 0.0 {
            return Err(Error::invalid_zone(
                &self.id,
                format!("radius_m must be > 0 (got {})", self.radius_m),
            ));
        }
        if !(-90.0..=90.0).contains(&self.center.lat) {
            return Err(Error::invalid_zone(
                &self.id,
                format!("latitude {} out of range", self.center.lat),
            ));
        }
        if !(-180.0..=180.0).contains(&self.center.lng) {
            return Err(Error::invalid_zone(
                &self.id,
                format!("longitude {} out of range", self.center.lng),
            ));
        }
        Ok(())
    }
}
