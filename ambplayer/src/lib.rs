//! # ambplayer - Lecteur audio géolocalisé
//!
//! Côté client de AmbientZones : à partir du répertoire des zones et de la
//! position de l'utilisateur, la [`Session`] détermine la zone active et
//! pilote l'[`AudioController`], qui gère le déverrouillage audio imposé
//! par les plateformes (lecture muette d'amorçage au premier geste).
//!
//! La plateforme fournit trois ports :
//! - [`AudioElement`] : l'élément de lecture ;
//! - [`LocationSource`] : la surveillance de position ;
//! - [`GestureSurface`] : l'installation du listener de gestes.
//!
//! Le drapeau « audio déverrouillé » est persisté via un [`UnlockStore`].
//!
//! ## Exemple
//!
//! ```rust,no_run
//! use ambplayer::*;
//! use std::sync::Arc;
//!
//! # async fn demo(zones: Vec<ambzones::Zone>) {
//! let controller = Arc::new(AudioController::new(
//!     Arc::new(MemoryUnlockStore::default()),
//!     Arc::new(NoopGestureSurface),
//! ));
//! controller.attach_audio(Arc::new(HeadlessAudioElement::new()));
//!
//! let tracker = Arc::new(LocationTracker::new(WatchOptions::default().maximum_age));
//! let session = Session::new(tracker, controller);
//! session.set_directory(zones).await;
//! session.apply_location(Ok(PositionFix::now(Coordinate::new(43.2951, 5.3625)))).await;
//! println!("{}", session.view());
//! # }
//! ```

pub mod audio;
pub mod config_ext;
pub mod controller;
pub mod error;
pub mod geo;
pub mod gesture;
pub mod location;
pub mod resolver;
pub mod session;
pub mod storage;
pub mod tracker;
pub mod view;

pub use audio::{AudioElement, HeadlessAudioElement};
pub use config_ext::PlayerConfigExt;
pub use controller::{AudioController, UnlockOutcome, UnlockState, ZoneAction};
pub use error::{Error, LocationError, PlaybackError, Result};
pub use geo::{haversine_distance_m, Coordinate, EARTH_RADIUS_M};
pub use gesture::{Gesture, GestureGate, GestureSurface, ListenerOptions, NoopGestureSurface};
pub use location::{
    subscription_channel, ChannelLocationSource, LocationFeed, LocationSource,
    LocationSubscription, PositionFix, ReplayLocationSource, WatchOptions,
};
pub use resolver::{contains, distance_to_zone_m, resolve};
pub use session::Session;
pub use storage::{ConfigUnlockStore, MemoryUnlockStore, PersistedFlag, UnlockStore};
pub use tracker::LocationTracker;
pub use view::{SessionView, ZoneSummary, BANNER_ACTION};
