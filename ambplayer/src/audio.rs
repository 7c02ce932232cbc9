//! Port de l'élément audio

use crate::error::PlaybackError;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Élément de lecture audio fourni par la plateforme.
///
/// Les mutateurs sont synchrones ; seul `play()` est asynchrone car la
/// plateforme peut refuser la lecture (politique d'autoplay) après coup.
#[async_trait]
pub trait AudioElement: Send + Sync {
    fn src(&self) -> Option<String>;
    fn set_src(&self, url: &str);
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    fn is_playing(&self) -> bool;
    async fn play(&self) -> Result<(), PlaybackError>;
    fn pause(&self);
}

#[derive(Debug, Default)]
struct HeadlessState {
    src: Option<String>,
    muted: bool,
    current_time: f64,
    playing: bool,
}

/// Élément audio sans sortie : il suit l'état et trace les commandes.
///
/// Utilisé par la commande `walk` et par les tests. `play()` échoue
/// seulement si aucune source n'est chargée.
#[derive(Debug, Default)]
pub struct HeadlessAudioElement {
    state: Mutex<HeadlessState>,
}

impl HeadlessAudioElement {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioElement for HeadlessAudioElement {
    fn src(&self) -> Option<String> {
        self.state.lock().src.clone()
    }

    fn set_src(&self, url: &str) {
        let mut state = self.state.lock();
        if state.src.as_deref() != Some(url) {
            tracing::debug!(src = url, "Audio source changed");
            state.src = Some(url.to_string());
            state.current_time = 0.0;
            state.playing = false;
        }
    }

    fn muted(&self) -> bool {
        self.state.lock().muted
    }

    fn set_muted(&self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.lock().current_time = seconds;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        let mut state = self.state.lock();
        let Some(src) = state.src.clone() else {
            return Err(PlaybackError::Media("no source loaded".to_string()));
        };
        state.playing = true;
        tracing::info!(src = %src, muted = state.muted, "▶️ Playing");
        Ok(())
    }

    fn pause(&self) {
        let mut state = self.state.lock();
        if state.playing {
            tracing::debug!("⏸️ Paused");
        }
        state.playing = false;
    }
}
