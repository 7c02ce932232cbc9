//! Extension ambserver pour les zones
//!
//! Permet à `ambzones` d'ajouter ses routes à `ambserver::Server` sans que
//! le serveur dépende de cette crate.

use crate::api::{zones_api_router, ZonesState};
use crate::config_ext::ZonesConfigExt;
use crate::openapi::ApiDoc;
use ambconfig::Config;
use ambserver::Server;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};
use utoipa::OpenApi;

/// Trait pour étendre ambserver avec le répertoire de zones
///
/// ```rust,no_run
/// use ambzones::ZonesServerExt;
/// use ambserver::ServerBuilder;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ambconfig::get_config()?;
///     let mut server = ServerBuilder::new_configured(&config).build();
///     server.init_zones_api(&config).await?;
///     server.init_audio_assets(&config).await?;
///     server.start().await?;
///     server.wait().await;
///     Ok(())
/// }
/// ```
pub trait ZonesServerExt {
    /// Enregistre `GET /api/zones`, `GET /api/zones/{id}` et la doc Swagger
    /// (`/swagger-ui/zones`, vers laquelle `/` redirige). Retourne le fichier
    /// de zones utilisé.
    async fn init_zones_api(&mut self, config: &Config) -> Result<PathBuf>;

    /// Sert le répertoire audio sous le préfixe configuré (`/audio` par
    /// défaut). Retourne le répertoire servi.
    async fn init_audio_assets(&mut self, config: &Config) -> Result<PathBuf>;
}

impl ZonesServerExt for Server {
    async fn init_zones_api(&mut self, config: &Config) -> Result<PathBuf> {
        let zones_file = config.get_zones_file();
        if !zones_file.exists() {
            warn!(file = %zones_file.display(), "Zone file does not exist yet, /api/zones will answer 500");
        }

        let router = zones_api_router(ZonesState::new(zones_file.clone()));
        self.add_openapi(router, ApiDoc::openapi(), "zones").await;
        self.add_redirect("/", "/swagger-ui/zones").await;
        info!(file = %zones_file.display(), "Zones API registered");

        Ok(zones_file)
    }

    async fn init_audio_assets(&mut self, config: &Config) -> Result<PathBuf> {
        let audio_dir = config.get_audio_dir()?;
        let route = config.get_audio_route();
        self.add_dir(&route, &audio_dir).await;
        info!(route = %route, directory = %audio_dir.display(), "Audio assets registered");

        Ok(audio_dir)
    }
}
