//! Sources de position
//!
//! Une source produit une souscription : un flux de positions (ou
//! d'erreurs) qui ne se termine pas de lui-même et qui ne redémarre pas.
//! Lâcher la souscription annule la surveillance côté plateforme.

use crate::error::{LocationError, Result};
use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use futures::Stream;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Position datée, telle que fournie par la plateforme
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    /// Précision horizontale en mètres, si connue
    pub accuracy_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    pub fn new(coordinate: Coordinate, accuracy_m: Option<f64>, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            accuracy_m,
            timestamp,
        }
    }

    /// Position mesurée maintenant
    pub fn now(coordinate: Coordinate) -> Self {
        Self::new(coordinate, None, Utc::now())
    }

    /// Âge de la mesure ; une date dans le futur compte pour zéro.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.timestamp).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Options de surveillance transmises à la plateforme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// Âge maximal accepté pour une position en cache
    pub maximum_age: Duration,
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::from_millis(5_000),
            timeout: Duration::from_millis(10_000),
        }
    }
}

type LocationEvent = std::result::Result<PositionFix, LocationError>;

/// Source de positions de la plateforme
pub trait LocationSource: Send + Sync {
    fn watch(&self, options: WatchOptions) -> std::result::Result<LocationSubscription, LocationError>;
}

/// Crée une paire producteur/souscription.
pub fn subscription_channel() -> (LocationFeed, LocationSubscription) {
    let (tx, rx) = mpsc::unbounded_channel();
    let token = CancellationToken::new();
    (
        LocationFeed {
            tx,
            token: token.clone(),
        },
        LocationSubscription {
            rx,
            token,
            ended: false,
        },
    )
}

/// Côté producteur d'une souscription
#[derive(Debug, Clone)]
pub struct LocationFeed {
    tx: mpsc::UnboundedSender<LocationEvent>,
    token: CancellationToken,
}

impl LocationFeed {
    /// `false` si la souscription a été lâchée
    pub fn push(&self, fix: PositionFix) -> bool {
        self.send(Ok(fix))
    }

    pub fn fail(&self, error: LocationError) -> bool {
        self.send(Err(error))
    }

    fn send(&self, event: LocationEvent) -> bool {
        !self.token.is_cancelled() && self.tx.send(event).is_ok()
    }

    pub fn is_watching(&self) -> bool {
        !self.token.is_cancelled() && !self.tx.is_closed()
    }

    /// Se termine quand la souscription est lâchée
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Souscription active ; la lâcher arrête la surveillance.
#[derive(Debug)]
pub struct LocationSubscription {
    rx: mpsc::UnboundedReceiver<LocationEvent>,
    token: CancellationToken,
    ended: bool,
}

impl LocationSubscription {
    /// Prochain évènement, `None` si la plateforme a fermé la source.
    ///
    /// Une fois `None` retourné, la souscription reste terminée.
    pub async fn next(&mut self) -> Option<LocationEvent> {
        if self.ended {
            return None;
        }
        let event = self.rx.recv().await;
        if event.is_none() {
            self.ended = true;
        }
        event
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl Stream for LocationSubscription {
    type Item = LocationEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.ended {
            return Poll::Ready(None);
        }
        let polled = this.rx.poll_recv(cx);
        if let Poll::Ready(None) = polled {
            this.ended = true;
        }
        polled
    }
}

impl Drop for LocationSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Default)]
struct ChannelInner {
    feed: Option<LocationFeed>,
    options: Option<WatchOptions>,
}

/// Source alimentée par le code plateforme.
///
/// Une seule souscription active à la fois ; les positions poussées sans
/// souscription sont perdues.
#[derive(Clone, Default)]
pub struct ChannelLocationSource {
    inner: Arc<Mutex<ChannelInner>>,
}

impl ChannelLocationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, fix: PositionFix) -> bool {
        self.current_feed().is_some_and(|feed| feed.push(fix))
    }

    pub fn fail(&self, error: LocationError) -> bool {
        self.current_feed().is_some_and(|feed| feed.fail(error))
    }

    pub fn is_watching(&self) -> bool {
        self.current_feed().is_some()
    }

    /// Options de la souscription en cours
    pub fn options(&self) -> Option<WatchOptions> {
        let inner = self.inner.lock();
        inner
            .feed
            .as_ref()
            .filter(|s| s.is_watching())
            .and(inner.options)
    }

    /// Ferme la souscription en cours : son flux se termine.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.feed = None;
        inner.options = None;
    }

    fn current_feed(&self) -> Option<LocationFeed> {
        let inner = self.inner.lock();
        inner.feed.clone().filter(|s| s.is_watching())
    }
}

impl LocationSource for ChannelLocationSource {
    fn watch(&self, options: WatchOptions) -> std::result::Result<LocationSubscription, LocationError> {
        let mut inner = self.inner.lock();
        if inner.feed.as_ref().is_some_and(|s| s.is_watching()) {
            return Err(LocationError::AlreadyWatching);
        }
        let (feed, subscription) = subscription_channel();
        inner.feed = Some(feed);
        inner.options = Some(options);
        debug!(?options, "Location watch started");
        Ok(subscription)
    }
}

/// Rejoue une trace enregistrée à intervalle fixe.
///
/// Chaque position est horodatée au moment de son émission. Une fois la
/// trace épuisée, la souscription reste ouverte sans nouvelle position.
/// Comme [`ChannelLocationSource`], une seule souscription active à la fois.
#[derive(Debug, Clone)]
pub struct ReplayLocationSource {
    track: Arc<[Coordinate]>,
    interval: Duration,
    active: Arc<Mutex<Option<LocationFeed>>>,
}

impl ReplayLocationSource {
    pub fn new(track: Vec<Coordinate>, interval: Duration) -> Self {
        Self {
            track: track.into(),
            interval,
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_watching(&self) -> bool {
        self.active.lock().as_ref().is_some_and(|feed| feed.is_watching())
    }

    pub fn track(&self) -> &[Coordinate] {
        &self.track
    }

    /// Charge une trace YAML : liste de `{latitude, longitude}`.
    pub fn from_yaml_file(path: impl AsRef<Path>, interval: Duration) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let track: Vec<Coordinate> = serde_yaml::from_str(&content)?;
        Ok(Self::new(track, interval))
    }
}

impl LocationSource for ReplayLocationSource {
    /// Doit être appelé dans un runtime tokio.
    fn watch(&self, _options: WatchOptions) -> std::result::Result<LocationSubscription, LocationError> {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|feed| feed.is_watching()) {
            return Err(LocationError::AlreadyWatching);
        }
        let (feed, subscription) = subscription_channel();
        *active = Some(feed.clone());
        let track = self.track.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            for coordinate in track.iter() {
                tokio::select! {
                    _ = feed.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                if !feed.push(PositionFix::now(*coordinate)) {
                    return;
                }
            }
            debug!("Replay track exhausted");
            feed.cancelled().await;
        });

        Ok(subscription)
    }
}
