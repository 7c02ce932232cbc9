//! # ambzones - Répertoire des zones sonores
//!
//! Cette crate fournit :
//! - le modèle [`Zone`] (centre, rayon, playlist) et sa validation ;
//! - la lecture du fichier de zones côté serveur ([`catalog`]) ;
//! - le client HTTP du répertoire ([`ZoneDirectoryClient`]) ;
//! - avec la feature `server`, l'API `GET /api/zones` montée sur
//!   `ambserver::Server` via [`ZonesServerExt`].
//!
//! # Format du fichier
//!
//! ```json
//! [
//!   {"id": 1, "name": "Harbor", "center": {"lat": 43.2951, "lng": 5.3625},
//!    "radius_m": 60, "playlist": ["/audio/gulls.mp3"]}
//! ]
//! ```

pub mod catalog;
mod client;
mod config_ext;
mod error;
mod zone;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod openapi;
#[cfg(feature = "server")]
mod server_ext;

pub use catalog::{load_zones_file, parse_zones, ZoneFileFormat};
pub use client::ZoneDirectoryClient;
pub use config_ext::ZonesConfigExt;
pub use error::{Error, Result};
pub use zone::{LatLng, Zone, ZoneId, DEFAULT_RADIUS_M};

#[cfg(feature = "server")]
pub use server_ext::ZonesServerExt;
