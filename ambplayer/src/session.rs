//! Session du lecteur : répertoire, position, zone active et audio
//!
//! La session relie les trois sources d'évènements (répertoire chargé une
//! fois, positions, gestes) au contrôleur audio. La zone active est
//! recalculée à chaque évènement ; le contrôleur n'est sollicité que
//! lorsqu'elle change.

use crate::controller::{AudioController, UnlockOutcome, ZoneAction};
use crate::error::{LocationError, PlaybackError};
use crate::gesture::Gesture;
use crate::location::{LocationSource, LocationSubscription, PositionFix, WatchOptions};
use crate::resolver::resolve;
use crate::tracker::LocationTracker;
use crate::view::{SessionView, ZoneSummary};
use ambzones::{Zone, ZoneId};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct Session {
    directory: RwLock<Arc<[Zone]>>,
    active: Mutex<Option<ZoneId>>,
    tracker: Arc<LocationTracker>,
    controller: Arc<AudioController>,
}

impl Session {
    pub fn new(tracker: Arc<LocationTracker>, controller: Arc<AudioController>) -> Self {
        Self {
            directory: RwLock::new(Vec::new().into()),
            active: Mutex::new(None),
            tracker,
            controller,
        }
    }

    pub fn tracker(&self) -> &Arc<LocationTracker> {
        &self.tracker
    }

    pub fn controller(&self) -> &Arc<AudioController> {
        &self.controller
    }

    pub fn zones(&self) -> Arc<[Zone]> {
        self.directory.read().clone()
    }

    /// Zone contenant la position courante, selon le répertoire courant
    pub fn current_zone(&self) -> Option<Zone> {
        let zones = self.zones();
        resolve(&zones, self.tracker.position()).cloned()
    }

    pub fn active_zone_id(&self) -> Option<ZoneId> {
        self.active.lock().clone()
    }

    /// Remplace le répertoire puis réévalue la zone active.
    pub async fn set_directory(&self, zones: Vec<Zone>) -> Option<ZoneAction> {
        self.load_directory(zones);
        self.refresh().await
    }

    fn load_directory(&self, zones: Vec<Zone>) {
        info!("📍 {} zone(s) loaded", zones.len());
        *self.directory.write() = zones.into();
    }

    /// Nouvelle position fournie directement (sans souscription).
    pub async fn set_position(&self, fix: PositionFix) -> Option<ZoneAction> {
        self.apply_location(Ok(fix)).await
    }

    /// Applique un évènement de localisation puis réévalue la zone active.
    pub async fn apply_location(
        &self,
        event: Result<PositionFix, LocationError>,
    ) -> Option<ZoneAction> {
        if !self.tracker.apply(event) {
            return None;
        }
        self.refresh().await
    }

    /// Réévalue la zone active ; le contrôleur n'est appelé que si elle change.
    pub async fn refresh(&self) -> Option<ZoneAction> {
        let zone = self.detect_change()?;
        Some(self.notify_zone(zone).await)
    }

    /// Met à jour la zone active ; `Some(zone)` si elle a changé.
    fn detect_change(&self) -> Option<Option<Zone>> {
        let zone = self.current_zone();
        let id = zone.as_ref().map(|z| z.id.clone());
        {
            let mut active = self.active.lock();
            if *active == id {
                return None;
            }
            *active = id;
        }

        match &zone {
            Some(z) => info!(zone = %z.id, name = %z.name, "Entered zone"),
            None => info!("Left all zones"),
        }
        Some(zone)
    }

    async fn notify_zone(&self, zone: Option<Zone>) -> ZoneAction {
        let action = self.controller.on_zone_changed(zone.as_ref()).await;
        debug!(?action, "Zone change handled");
        action
    }

    /// Travail du contrôleur à lancer si la zone active a changé
    fn zone_change(&self) -> Option<BoxFuture<'_, ()>> {
        let zone = self.detect_change()?;
        Some(Box::pin(async move {
            self.notify_zone(zone).await;
        }))
    }

    pub async fn handle_gesture(
        &self,
        gesture: Gesture,
    ) -> Option<Result<UnlockOutcome, PlaybackError>> {
        self.controller.handle_gesture(gesture).await
    }

    pub async fn enable_audio(&self) -> Result<UnlockOutcome, PlaybackError> {
        self.controller.enable_audio().await
    }

    pub fn view(&self) -> SessionView {
        let zones = self.zones();
        let coordinate = self.tracker.position();
        let state = self.controller.state();
        SessionView {
            coordinate,
            zone_name: resolve(&zones, coordinate).map(|z| z.name.clone()),
            unlock_state: state,
            banner_visible: self.controller.banner_visible(),
            zones: zones.iter().map(ZoneSummary::from).collect(),
        }
    }

    /// Boucle principale.
    ///
    /// Attend en parallèle le répertoire (une seule fois), les positions de
    /// `source` et les gestes, jusqu'à l'annulation de `shutdown`. Si la
    /// surveillance ne peut pas démarrer, la session continue sans position.
    ///
    /// Les lectures lancées par le contrôleur (amorçage, lecture automatique)
    /// avancent à côté des évènements : une lecture qui ne se termine pas ne
    /// bloque ni le suivi de zone ni l'arrêt, qui les abandonne.
    pub async fn run<F>(
        &self,
        directory: F,
        source: &dyn LocationSource,
        options: WatchOptions,
        mut gestures: mpsc::Receiver<Gesture>,
        shutdown: CancellationToken,
    ) where
        F: Future<Output = Vec<Zone>>,
    {
        let mut pending: FuturesUnordered<BoxFuture<'_, ()>> = FuturesUnordered::new();
        let mut subscription = match source.watch(options) {
            Ok(sub) => Some(sub),
            Err(e) => {
                if self.tracker.apply(Err(e)) {
                    pending.extend(self.zone_change());
                }
                None
            }
        };
        tokio::pin!(directory);
        let mut directory_pending = true;
        let mut gestures_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                zones = &mut directory, if directory_pending => {
                    directory_pending = false;
                    self.load_directory(zones);
                    pending.extend(self.zone_change());
                }
                event = next_location(&mut subscription) => match event {
                    Some(event) => {
                        if self.tracker.apply(event) {
                            pending.extend(self.zone_change());
                        }
                        if self.tracker.is_degraded() {
                            subscription = None;
                        }
                    }
                    None => {
                        debug!("Location source closed");
                        subscription = None;
                    }
                },
                gesture = gestures.recv(), if gestures_open => match gesture {
                    Some(gesture) => pending.push(Box::pin(async move {
                        if let Some(Err(e)) = self.handle_gesture(gesture).await {
                            debug!("Gesture did not unlock audio: {}", e);
                        }
                    })),
                    None => gestures_open = false,
                },
                Some(()) = pending.next(), if !pending.is_empty() => {}
            }
        }

        if !pending.is_empty() {
            debug!("Dropping {} pending playback task(s)", pending.len());
        }
        drop(pending);
        drop(subscription);
        self.teardown();
    }

    /// Retire le listener de gestes
    pub fn teardown(&self) {
        self.controller.teardown();
        info!("Session closed");
    }
}

async fn next_location(
    subscription: &mut Option<LocationSubscription>,
) -> Option<Result<PositionFix, LocationError>> {
    match subscription {
        Some(sub) => sub.next().await,
        None => std::future::pending().await,
    }
}
