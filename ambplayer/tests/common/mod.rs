#![allow(dead_code)]

use ambplayer::{AudioElement, PlaybackError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// Élément audio scriptable : résultats de `play()` programmés, premier
/// `play()` éventuellement bloqué jusqu'à `release()`.
#[derive(Default)]
pub struct ScriptedAudio {
    src: Mutex<Option<String>>,
    muted: AtomicBool,
    playing: AtomicBool,
    time: Mutex<f64>,
    results: Mutex<VecDeque<Result<(), PlaybackError>>>,
    calls: Mutex<Vec<String>>,
    plays: AtomicUsize,
    hold_first: AtomicBool,
    release: Notify,
}

impl ScriptedAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_src(self, src: &str) -> Self {
        *self.src.lock() = Some(src.to_string());
        self
    }

    /// Les prochains `play()` renverront ces résultats, puis `Ok(())`
    pub fn script(&self, results: impl IntoIterator<Item = Result<(), PlaybackError>>) {
        self.results.lock().extend(results);
    }

    pub fn hold_first_play(&self) {
        self.hold_first.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl AudioElement for ScriptedAudio {
    fn src(&self) -> Option<String> {
        self.src.lock().clone()
    }

    fn set_src(&self, url: &str) {
        self.record(format!("src {}", url));
        *self.src.lock() = Some(url.to_string());
    }

    fn muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    fn set_muted(&self, muted: bool) {
        self.record(format!("muted {}", muted));
        self.muted.store(muted, Ordering::SeqCst);
    }

    fn current_time(&self) -> f64 {
        *self.time.lock()
    }

    fn set_current_time(&self, seconds: f64) {
        self.record(format!("time {}", seconds));
        *self.time.lock() = seconds;
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        self.record(format!("play muted={}", self.muted()));
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.hold_first.swap(false, Ordering::SeqCst) {
            self.release.notified().await;
        }
        let result = self.results.lock().pop_front().unwrap_or(Ok(()));
        self.playing.store(result.is_ok(), Ordering::SeqCst);
        result
    }

    fn pause(&self) {
        self.record("pause".to_string());
        self.playing.store(false, Ordering::SeqCst);
    }
}

pub fn not_allowed() -> PlaybackError {
    PlaybackError::NotAllowed("user gesture required".to_string())
}

/// Attend que `condition` devienne vraie (5 s au plus)
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "condition not reached in time");
}

pub async fn settle<F: Future>(f: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("future did not complete in time")
}
