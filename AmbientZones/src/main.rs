use ambconfig::Config;
use ambplayer::{
    AudioController, ConfigUnlockStore, Gesture, HeadlessAudioElement, LocationTracker,
    NoopGestureSurface, PlayerConfigExt, ReplayLocationSource, Session,
};
use ambserver::ServerBuilder;
use ambzones::{ZoneDirectoryClient, ZonesServerExt};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "AmbientZones")]
#[command(about = "Location-triggered ambient audio: zone server and headless walker")]
struct Cli {
    /// Configuration directory (default: $AMBZONES_CONFIG, ./.ambzones, ~/.ambzones)
    #[arg(long, value_name = "DIR", global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the zone directory and the audio files (default)
    Serve {
        /// Override host.http_port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Replay a recorded coordinate track through the player
    Walk {
        /// YAML list of {latitude, longitude}
        #[arg(long, value_name = "FILE")]
        track: PathBuf,

        /// Zone server URL (default: player.server_url)
        #[arg(long, value_name = "URL")]
        server: Option<String>,

        /// Delay between two positions
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Simulate a click right after the N-th position
        #[arg(long, value_name = "N")]
        gesture_at: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ambconfig::init_config(cli.config_dir.as_deref().unwrap_or(""))?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(&config, port).await,
        Command::Walk {
            track,
            server,
            interval_ms,
            gesture_at,
        } => {
            walk(
                config,
                track,
                server,
                Duration::from_millis(interval_ms),
                gesture_at,
            )
            .await
        }
    }
}

async fn serve(config: &Config, port: Option<u16>) -> anyhow::Result<()> {
    let mut builder = ServerBuilder::new_configured(config);
    if let Some(port) = port {
        builder = builder.http_port(port);
    }
    let mut server = builder.build();
    server.init_logging(config).await;

    server
        .add_route("/info", || async {
            serde_json::json!({
                "name": "AmbientZones",
                "version": env!("CARGO_PKG_VERSION"),
            })
        })
        .await;

    info!("📍 Initializing zone directory API...");
    let zones_file = server.init_zones_api(config).await?;
    info!("✅ Zones read from {}", zones_file.display());

    let audio_dir = server.init_audio_assets(config).await?;
    info!("🎵 Audio files served from {}", audio_dir.display());

    info!("🌐 Starting HTTP server...");
    let addr = server.start().await?;
    info!("✅ AmbientZones is ready on http://{}", addr);
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}

async fn walk(
    config: Arc<Config>,
    track: PathBuf,
    server_url: Option<String>,
    interval: Duration,
    gesture_at: Option<usize>,
) -> anyhow::Result<()> {
    let _log_state = ambserver::logs::init_logging(&config);

    let server_url = server_url.unwrap_or_else(|| config.get_player_server_url());
    let source = ReplayLocationSource::from_yaml_file(&track, interval)?;
    let positions = source.track().len();
    info!(
        "🚶 Walking {} position(s) from {} against {}",
        positions,
        track.display(),
        server_url
    );

    let options = config.get_watch_options();
    let controller = Arc::new(AudioController::new(
        Arc::new(ConfigUnlockStore::new(config.clone())),
        Arc::new(NoopGestureSurface),
    ));
    controller.attach_audio(Arc::new(HeadlessAudioElement::new()));
    let tracker = Arc::new(LocationTracker::new(options.maximum_age));
    let session = Arc::new(Session::new(tracker, controller));

    let client = ZoneDirectoryClient::new(&server_url)?;
    let (gesture_tx, gesture_rx) = mpsc::channel(4);
    let shutdown = CancellationToken::new();

    let reporter = {
        let session = session.clone();
        let shutdown = shutdown.clone();
        let mut coordinates = session.tracker().subscribe();
        let mut states = session.controller().subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    changed = coordinates.changed() => if changed.is_err() { break },
                    changed = states.changed() => if changed.is_err() { break },
                }
                info!("\n{}", session.view());
            }
        })
    };

    let scheduler = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut elapsed = Duration::ZERO;
            if let Some(n) = gesture_at {
                // Juste après l'émission de la N-ième position
                let at = interval.mul_f64((n as f64 - 0.5).max(0.0));
                tokio::time::sleep(at).await;
                elapsed = at;
                info!("👆 Simulated click after position {}", n);
                if gesture_tx.send(Gesture::Click).await.is_err() {
                    return;
                }
            }
            let end = interval.mul_f64(positions as f64 + 0.5);
            tokio::time::sleep(end.saturating_sub(elapsed)).await;
            info!("🏁 Track finished");
            shutdown.cancel();
        })
    };

    let interrupt = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted");
                shutdown.cancel();
            }
        })
    };

    session
        .run(
            client.fetch_or_empty(),
            &source,
            options,
            gesture_rx,
            shutdown.clone(),
        )
        .await;

    scheduler.abort();
    interrupt.abort();
    shutdown.cancel();
    let _ = reporter.await;

    info!("\n{}", session.view().render(true));
    Ok(())
}
