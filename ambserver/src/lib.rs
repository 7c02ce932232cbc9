//! # ambserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit le serveur HTTP d'AmbientZones : un builder autour
//! d'Axum, le service des fichiers audio statiques, la documentation
//! OpenAPI et le système de logs consultable en temps réel.
//!
//! ## Architecture
//!
//! - [`server`] : serveur principal et builder
//! - [`logs`] : buffer circulaire de logs, flux SSE et réglage du niveau
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use ambserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ambconfig::get_config()?;
//!     let mut server = ServerBuilder::new_configured(&config).build();
//!     server.init_logging(&config).await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, SseLayer, log_dump, log_sse};
pub use server::{Server, ServerBuilder, ServerInfo};
