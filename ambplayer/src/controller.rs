//! Machine à états du déverrouillage audio
//!
//! Les plateformes interdisent la lecture audible sans geste utilisateur
//! préalable. Le contrôleur « amorce » l'élément audio : lecture muette, puis
//! pause, retour au début, démute et lecture audible. Une fois réussi, le
//! drapeau est persisté et les changements de zone lancent la lecture
//! automatiquement.
//!
//! ```text
//! LOCKED --unlock()--> UNLOCKING --ok--> UNLOCKED
//!    ^                     |                |
//!    +-------échec---------+                |
//!    +------ lecture automatique refusée ---+
//! ```

use crate::audio::AudioElement;
use crate::error::PlaybackError;
use crate::gesture::{Gesture, GestureGate, GestureSurface};
use crate::storage::{PersistedFlag, UnlockStore};
use ambzones::Zone;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnlockState {
    Locked,
    Unlocking,
    Unlocked,
}

impl fmt::Display for UnlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnlockState::Locked => "LOCKED",
            UnlockState::Unlocking => "UNLOCKING",
            UnlockState::Unlocked => "UNLOCKED",
        })
    }
}

/// Résultat d'une demande de déverrouillage réussie ou ignorée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// L'amorçage vient de réussir
    Unlocked,
    /// Déjà déverrouillé, rien à faire
    AlreadyUnlocked,
    /// Un amorçage est en cours, la demande est ignorée
    InProgress,
}

/// Ce que le contrôleur a fait suite à un changement de zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneAction {
    /// Pas de zone active ou pas d'élément audio
    Idle,
    /// Zone sans piste : la source n'est pas modifiée
    EmptyPlaylist,
    /// Source chargée, lecture en attente du déverrouillage
    Loaded(String),
    /// Source chargée et lecture lancée
    Playing(String),
    /// Lecture refusée : retour à l'état verrouillé
    Relocked(PlaybackError),
}

pub struct AudioController {
    state: Mutex<UnlockState>,
    state_tx: watch::Sender<UnlockState>,
    flag: PersistedFlag,
    gate: GestureGate,
    audio: RwLock<Option<Arc<dyn AudioElement>>>,
    zone_track: Mutex<Option<String>>,
}

impl AudioController {
    /// Crée le contrôleur ; l'état initial vient du drapeau persisté.
    ///
    /// S'il n'est pas déverrouillé, le listener de gestes est installé.
    pub fn new(store: Arc<dyn UnlockStore>, surface: Arc<dyn GestureSurface>) -> Self {
        let flag = PersistedFlag::load(store);
        let initial = if flag.get() {
            UnlockState::Unlocked
        } else {
            UnlockState::Locked
        };
        let gate = GestureGate::new(surface);
        if initial != UnlockState::Unlocked {
            gate.arm();
        }
        info!(state = %initial, "Audio controller ready");

        let (state_tx, _) = watch::channel(initial);
        Self {
            state: Mutex::new(initial),
            state_tx,
            flag,
            gate,
            audio: RwLock::new(None),
            zone_track: Mutex::new(None),
        }
    }

    pub fn attach_audio(&self, audio: Arc<dyn AudioElement>) {
        *self.audio.write() = Some(audio);
    }

    pub fn detach_audio(&self) {
        *self.audio.write() = None;
    }

    pub fn audio(&self) -> Option<Arc<dyn AudioElement>> {
        self.audio.read().clone()
    }

    pub fn state(&self) -> UnlockState {
        *self.state.lock()
    }

    /// Flux des changements d'état
    pub fn subscribe(&self) -> watch::Receiver<UnlockState> {
        self.state_tx.subscribe()
    }

    /// Le bandeau « Enable Audio » est visible tant que l'audio n'est pas déverrouillé
    pub fn banner_visible(&self) -> bool {
        self.state() != UnlockState::Unlocked
    }

    pub fn gesture_listener_installed(&self) -> bool {
        self.gate.is_armed()
    }

    fn set_state(&self, state: UnlockState) {
        *self.state.lock() = state;
        self.state_tx.send_replace(state);
    }

    /// Action explicite du bandeau : retire le listener puis déverrouille.
    pub async fn enable_audio(&self) -> Result<UnlockOutcome, PlaybackError> {
        self.gate.disarm();
        self.unlock().await
    }

    /// Geste capté par la plateforme.
    ///
    /// `None` si le listener n'était pas installé (geste ignoré).
    pub async fn handle_gesture(
        &self,
        gesture: Gesture,
    ) -> Option<Result<UnlockOutcome, PlaybackError>> {
        if !self.gate.fire(gesture) {
            return None;
        }
        Some(self.unlock().await)
    }

    /// Tente le déverrouillage.
    ///
    /// Un seul amorçage à la fois : les appels concurrents reçoivent
    /// [`UnlockOutcome::InProgress`] sans toucher à l'élément audio.
    pub async fn unlock(&self) -> Result<UnlockOutcome, PlaybackError> {
        {
            let mut state = self.state.lock();
            match *state {
                UnlockState::Unlocked => return Ok(UnlockOutcome::AlreadyUnlocked),
                UnlockState::Unlocking => return Ok(UnlockOutcome::InProgress),
                UnlockState::Locked => *state = UnlockState::Unlocking,
            }
        }
        self.state_tx.send_replace(UnlockState::Unlocking);
        debug!("Unlocking audio");

        match self.prime().await {
            Ok(()) => {
                self.flag.set();
                self.gate.disarm();
                self.set_state(UnlockState::Unlocked);
                info!("🔊 Audio unlocked");
                Ok(UnlockOutcome::Unlocked)
            }
            Err(e) => {
                warn!("Audio unlock failed: {}", e);
                self.set_state(UnlockState::Locked);
                self.gate.arm();
                Err(e)
            }
        }
    }

    async fn prime(&self) -> Result<(), PlaybackError> {
        let audio = self.audio().ok_or(PlaybackError::NoElement)?;

        let track = self.zone_track.lock().clone();
        if let Some(track) = track {
            audio.set_src(&track);
        }

        audio.set_muted(true);
        if let Err(e) = audio.play().await {
            audio.set_muted(false);
            return Err(e);
        }

        audio.pause();
        audio.set_current_time(0.0);
        audio.set_muted(false);

        // Le déverrouillage est acquis même si cette lecture échoue
        if let Err(e) = audio.play().await {
            warn!("Audible playback after unlock failed: {}", e);
        }
        Ok(())
    }

    /// Réagit au changement de zone active.
    ///
    /// Charge la première piste de la zone ; si l'audio est déverrouillé, la
    /// lecture démarre. Un refus de lecture efface le drapeau persisté et
    /// ramène le contrôleur à l'état verrouillé.
    pub async fn on_zone_changed(&self, zone: Option<&Zone>) -> ZoneAction {
        let track = zone.and_then(|z| z.first_track()).map(str::to_string);
        *self.zone_track.lock() = track.clone();

        let Some(zone) = zone else {
            return ZoneAction::Idle;
        };
        let Some(audio) = self.audio() else {
            debug!(zone = %zone.id, "No audio element, zone change ignored");
            return ZoneAction::Idle;
        };
        let Some(track) = track else {
            debug!(zone = %zone.id, "Zone has an empty playlist");
            return ZoneAction::EmptyPlaylist;
        };

        audio.set_src(&track);
        if self.state() != UnlockState::Unlocked {
            return ZoneAction::Loaded(track);
        }

        match audio.play().await {
            Ok(()) => ZoneAction::Playing(track),
            Err(e) => {
                warn!(zone = %zone.id, "Automatic playback refused, audio locked again: {}", e);
                self.relock();
                ZoneAction::Relocked(e)
            }
        }
    }

    fn relock(&self) {
        {
            let mut state = self.state.lock();
            if *state != UnlockState::Unlocked {
                return;
            }
            *state = UnlockState::Locked;
        }
        self.state_tx.send_replace(UnlockState::Locked);
        self.flag.clear();
        self.gate.arm();
    }

    /// Retire le listener de gestes.
    ///
    /// Un amorçage abandonné en cours de route laisse l'état à LOCKED et
    /// l'élément démuté.
    pub fn teardown(&self) {
        self.gate.disarm();
        {
            let mut state = self.state.lock();
            if *state != UnlockState::Unlocking {
                return;
            }
            *state = UnlockState::Locked;
        }
        self.state_tx.send_replace(UnlockState::Locked);
        if let Some(audio) = self.audio() {
            audio.set_muted(false);
        }
        debug!("Interrupted unlock reset to LOCKED");
    }
}
