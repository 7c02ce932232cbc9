//! Lecture du fichier de zones côté serveur
//!
//! Le fichier est relu à chaque requête : une modification sur disque est
//! visible immédiatement et remplace la liste entière.

use crate::{Result, Zone};
use std::path::Path;
use tracing::debug;

/// Format du fichier de zones, déduit de l'extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneFileFormat {
    Json,
    Yaml,
}

impl ZoneFileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ZoneFileFormat::Yaml
            }
            _ => ZoneFileFormat::Json,
        }
    }
}

/// Décode et valide une liste de zones.
///
/// Une seule zone invalide rend la liste entière invalide.
pub fn parse_zones(bytes: &[u8], format: ZoneFileFormat) -> Result<Vec<Zone>> {
    let zones: Vec<Zone> = match format {
        ZoneFileFormat::Json => serde_json::from_slice(bytes)?,
        ZoneFileFormat::Yaml => serde_yaml::from_slice(bytes)?,
    };
    for zone in &zones {
        zone.validate()?;
    }
    Ok(zones)
}

/// Charge le fichier de zones (JSON, ou YAML pour `.yaml`/`.yml`)
pub async fn load_zones_file(path: &Path) -> Result<Vec<Zone>> {
    let bytes = tokio::fs::read(path).await?;
    let zones = parse_zones(&bytes, ZoneFileFormat::from_path(path))?;
    debug!(file = %path.display(), count = zones.len(), "Zone file loaded");
    Ok(zones)
}
