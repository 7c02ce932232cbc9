//! Position courante de l'utilisateur

use crate::error::LocationError;
use crate::geo::Coordinate;
use crate::location::{LocationSubscription, PositionFix};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Cellule observable de la dernière position connue.
///
/// La première erreur du service de localisation est tracée une seule fois
/// et désactive le suivi pour le reste de la session ; la position repasse
/// alors à « absente ».
pub struct LocationTracker {
    position_tx: watch::Sender<Option<Coordinate>>,
    last_fix: Mutex<Option<PositionFix>>,
    maximum_age: Duration,
    degraded: AtomicBool,
}

impl LocationTracker {
    pub fn new(maximum_age: Duration) -> Self {
        let (position_tx, _) = watch::channel(None);
        Self {
            position_tx,
            last_fix: Mutex::new(None),
            maximum_age,
            degraded: AtomicBool::new(false),
        }
    }

    pub fn position(&self) -> Option<Coordinate> {
        *self.position_tx.borrow()
    }

    pub fn last_fix(&self) -> Option<PositionFix> {
        *self.last_fix.lock()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Coordinate>> {
        self.position_tx.subscribe()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Applique un évènement de localisation.
    ///
    /// Retourne `true` si la position publiée a changé.
    pub fn apply(&self, event: Result<PositionFix, LocationError>) -> bool {
        if self.is_degraded() {
            return false;
        }
        match event {
            Ok(fix) => {
                let age = fix.age(Utc::now());
                if age > self.maximum_age {
                    debug!(age_ms = age.as_millis() as u64, "Stale position dropped");
                    return false;
                }
                *self.last_fix.lock() = Some(fix);
                self.position_tx.send_if_modified(|current| {
                    if *current == Some(fix.coordinate) {
                        false
                    } else {
                        *current = Some(fix.coordinate);
                        true
                    }
                })
            }
            Err(e) => {
                if !self.degraded.swap(true, Ordering::SeqCst) {
                    warn!("Location service failed, position tracking disabled: {}", e);
                }
                self.position_tx.send_if_modified(|current| current.take().is_some())
            }
        }
    }

    /// Consomme une souscription jusqu'à sa fin ou jusqu'à la première erreur.
    pub async fn follow(&self, mut subscription: LocationSubscription) {
        while let Some(event) = subscription.next().await {
            self.apply(event);
            if self.is_degraded() {
                break;
            }
        }
    }
}
