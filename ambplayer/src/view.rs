//! Vue de la session : ce que l'interface affiche

use crate::controller::UnlockState;
use crate::geo::Coordinate;
use ambzones::Zone;
use serde::Serialize;
use std::fmt;

pub const BANNER_ACTION: &str = "Enable Audio";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub id: String,
    pub name: String,
    pub center: Coordinate,
    pub radius_m: f64,
    pub tracks: usize,
}

impl From<&Zone> for ZoneSummary {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id.to_string(),
            name: zone.name.clone(),
            center: zone.center.into(),
            radius_m: zone.radius_m,
            tracks: zone.playlist.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub coordinate: Option<Coordinate>,
    pub zone_name: Option<String>,
    pub unlock_state: UnlockState,
    pub banner_visible: bool,
    pub zones: Vec<ZoneSummary>,
}

impl SessionView {
    /// Coordonnée affichée, « waiting » tant qu'aucune position n'est connue
    pub fn coordinate_label(&self) -> String {
        match self.coordinate {
            Some(c) => c.to_string(),
            None => "waiting".to_string(),
        }
    }

    pub fn zone_label(&self) -> &str {
        self.zone_name.as_deref().unwrap_or("none")
    }

    /// Rendu texte ; `debug` ajoute la liste des zones.
    pub fn render(&self, debug: bool) -> String {
        let mut out = format!(
            "Position: {}\nZone: {}\n",
            self.coordinate_label(),
            self.zone_label()
        );
        if self.banner_visible {
            out.push_str(&format!("[{}]\n", BANNER_ACTION));
        }
        if debug {
            out.push_str(&format!("Zones ({}):\n", self.zones.len()));
            for z in &self.zones {
                out.push_str(&format!(
                    "  - {} {} @ {} r={}m tracks={}\n",
                    z.id, z.name, z.center, z.radius_m, z.tracks
                ));
            }
        }
        out
    }
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}
