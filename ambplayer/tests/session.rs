mod common;

use ambplayer::{
    AudioController, AudioElement, ChannelLocationSource, Coordinate, Gesture, LocationError,
    LocationTracker, MemoryUnlockStore, NoopGestureSurface, PositionFix, Session, UnlockState,
    UnlockStore, WatchOptions, ZoneAction,
};
use ambzones::{LatLng, Zone, ZoneId};
use common::{settle, wait_until, ScriptedAudio};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn zones() -> Vec<Zone> {
    vec![
        Zone::new(1_i64, "Harbor", LatLng::new(0.0, 0.0))
            .with_radius(100.0)
            .with_playlist(["/audio/gulls.mp3"]),
        Zone::new("market", "Market", LatLng::new(0.01, 0.0)).with_playlist(["/audio/crowd.mp3"]),
    ]
}

fn session(unlocked: bool) -> (Arc<Session>, Arc<ScriptedAudio>, Arc<MemoryUnlockStore>) {
    let store = Arc::new(MemoryUnlockStore::new(unlocked));
    let controller = Arc::new(AudioController::new(
        store.clone(),
        Arc::new(NoopGestureSurface),
    ));
    let audio = Arc::new(ScriptedAudio::new());
    controller.attach_audio(audio.clone());
    let tracker = Arc::new(LocationTracker::new(Duration::from_secs(5)));
    (Arc::new(Session::new(tracker, controller)), audio, store)
}

fn at(lat: f64, lng: f64) -> Result<PositionFix, LocationError> {
    Ok(PositionFix::now(Coordinate::new(lat, lng)))
}

#[tokio::test]
async fn test_one_play_per_zone_change() {
    let (session, audio, _) = session(true);
    session.set_directory(zones()).await;

    let action = session.apply_location(at(0.0, 0.0)).await;
    assert_eq!(action, Some(ZoneAction::Playing("/audio/gulls.mp3".into())));

    // Déplacement à l'intérieur de la même zone : rien
    assert_eq!(session.apply_location(at(0.0002, 0.0)).await, None);
    assert_eq!(audio.plays(), 1);

    let action = session.apply_location(at(0.01, 0.0)).await;
    assert_eq!(action, Some(ZoneAction::Playing("/audio/crowd.mp3".into())));
    assert_eq!(session.active_zone_id(), Some(ZoneId::Text("market".into())));
    assert_eq!(audio.plays(), 2);

    // Sortie de toutes les zones : pas d'arrêt de la lecture
    assert_eq!(
        session.apply_location(at(1.0, 1.0)).await,
        Some(ZoneAction::Idle)
    );
    assert_eq!(audio.plays(), 2);
}

#[tokio::test]
async fn test_directory_arriving_after_position() {
    let (session, audio, _) = session(true);
    assert_eq!(session.apply_location(at(0.0, 0.0)).await, None);

    let action = session.set_directory(zones()).await;
    assert_eq!(action, Some(ZoneAction::Playing("/audio/gulls.mp3".into())));
    assert_eq!(audio.plays(), 1);
}

#[tokio::test]
async fn test_empty_directory_has_no_zone() {
    let (session, audio, _) = session(true);
    session.set_directory(Vec::new()).await;
    session.apply_location(at(0.0, 0.0)).await;

    let view = session.view();
    assert_eq!(view.zone_label(), "none");
    assert!(view.zones.is_empty());
    assert!(audio.calls().is_empty());
}

#[tokio::test]
async fn test_view_while_locked() {
    let (session, _, _) = session(false);
    let view = session.view();
    assert_eq!(view.coordinate_label(), "waiting");
    assert!(view.banner_visible);
    assert_eq!(view.unlock_state, UnlockState::Locked);

    session.set_directory(zones()).await;
    let action = session.apply_location(at(0.0, 0.0)).await;
    assert_eq!(action, Some(ZoneAction::Loaded("/audio/gulls.mp3".into())));

    let view = session.view();
    assert_eq!(view.zone_label(), "Harbor");
    assert_eq!(view.zones.len(), 2);
    assert!(view.render(true).contains("Zones (2):"));
}

#[tokio::test]
async fn test_location_error_clears_position() {
    let (session, _, _) = session(true);
    session.set_directory(zones()).await;
    session.apply_location(at(0.0, 0.0)).await;

    let action = session
        .apply_location(Err(LocationError::PermissionDenied))
        .await;
    assert_eq!(action, Some(ZoneAction::Idle));
    assert!(session.tracker().is_degraded());
    assert_eq!(session.view().coordinate_label(), "waiting");
}

#[tokio::test]
async fn test_run_loop_wires_directory_location_and_gestures() {
    let (session, audio, store) = session(false);
    let source = ChannelLocationSource::new();
    let (gesture_tx, gesture_rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();

    let task = {
        let session = session.clone();
        let source = source.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            session
                .run(
                    async { zones() },
                    &source,
                    WatchOptions::default(),
                    gesture_rx,
                    shutdown,
                )
                .await
        })
    };

    wait_until(|| source.is_watching() && session.zones().len() == 2).await;
    assert!(source.push(PositionFix::now(Coordinate::new(0.0, 0.0))));
    wait_until(|| session.active_zone_id() == Some(ZoneId::Number(1))).await;
    assert_eq!(audio.src().as_deref(), Some("/audio/gulls.mp3"));

    gesture_tx.send(Gesture::Click).await.unwrap();
    wait_until(|| session.controller().state() == UnlockState::Unlocked).await;
    assert!(store.get().unwrap());

    shutdown.cancel();
    task.await.unwrap();
    assert!(!source.is_watching());
    assert!(!session.controller().gesture_listener_installed());
}

fn spawn_run(
    session: &Arc<Session>,
    source: &ChannelLocationSource,
    gestures: mpsc::Receiver<Gesture>,
    shutdown: &CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let session = session.clone();
    let source = source.clone();
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        session
            .run(
                async { zones() },
                &source,
                WatchOptions::default(),
                gestures,
                shutdown,
            )
            .await
    })
}

#[tokio::test]
async fn test_run_keeps_tracking_while_unlock_is_pending() {
    let (session, audio, store) = session(false);
    audio.hold_first_play();
    let source = ChannelLocationSource::new();
    let (gesture_tx, gesture_rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    let task = spawn_run(&session, &source, gesture_rx, &shutdown);

    wait_until(|| source.is_watching() && session.zones().len() == 2).await;
    gesture_tx.send(Gesture::Click).await.unwrap();
    wait_until(|| audio.plays() == 1).await;
    assert_eq!(session.controller().state(), UnlockState::Unlocking);

    // La lecture muette ne se termine pas : les positions passent quand même
    assert!(source.push(PositionFix::now(Coordinate::new(0.0, 0.0))));
    wait_until(|| session.active_zone_id() == Some(ZoneId::Number(1))).await;
    assert_eq!(audio.src().as_deref(), Some("/audio/gulls.mp3"));
    assert_eq!(audio.plays(), 1);

    shutdown.cancel();
    settle(task).await.unwrap();
    assert!(!source.is_watching());
    assert!(!session.controller().gesture_listener_installed());
    assert_eq!(session.controller().state(), UnlockState::Locked);
    assert!(!audio.muted());
    assert!(!store.get().unwrap());
}

#[tokio::test]
async fn test_run_follows_zones_while_autoplay_is_pending() {
    let (session, audio, _) = session(true);
    audio.hold_first_play();
    let source = ChannelLocationSource::new();
    let (_gesture_tx, gesture_rx) = mpsc::channel(1);
    let shutdown = CancellationToken::new();
    let task = spawn_run(&session, &source, gesture_rx, &shutdown);

    wait_until(|| source.is_watching() && session.zones().len() == 2).await;
    assert!(source.push(PositionFix::now(Coordinate::new(0.0, 0.0))));
    wait_until(|| audio.plays() == 1).await;

    assert!(source.push(PositionFix::now(Coordinate::new(0.01, 0.0))));
    wait_until(|| session.active_zone_id() == Some(ZoneId::Text("market".into()))).await;
    wait_until(|| audio.plays() == 2).await;
    assert_eq!(audio.src().as_deref(), Some("/audio/crowd.mp3"));

    audio.release();
    shutdown.cancel();
    settle(task).await.unwrap();
    assert_eq!(session.controller().state(), UnlockState::Unlocked);
}

#[tokio::test]
async fn test_run_without_location_service() {
    struct Unsupported;
    impl ambplayer::LocationSource for Unsupported {
        fn watch(
            &self,
            _options: WatchOptions,
        ) -> Result<ambplayer::LocationSubscription, LocationError> {
            Err(LocationError::Unsupported)
        }
    }

    let (session, _, _) = session(false);
    let (_gesture_tx, gesture_rx) = mpsc::channel(1);
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    session
        .run(
            async { zones() },
            &Unsupported,
            WatchOptions::default(),
            gesture_rx,
            shutdown,
        )
        .await;
    assert!(session.tracker().is_degraded());
    assert_eq!(session.view().coordinate_label(), "waiting");
}
