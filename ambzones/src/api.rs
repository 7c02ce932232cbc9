//! API REST en lecture seule pour les zones.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::catalog::load_zones_file;
use crate::{Error, Zone};

/// État partagé des handlers : l'emplacement du fichier de zones
#[derive(Clone, Debug)]
pub struct ZonesState {
    zones_file: Arc<PathBuf>,
}

impl ZonesState {
    pub fn new(zones_file: PathBuf) -> Self {
        Self {
            zones_file: Arc::new(zones_file),
        }
    }

    pub fn zones_file(&self) -> &std::path::Path {
        &self.zones_file
    }
}

/// Router `/api/zones`
pub fn zones_api_router(state: ZonesState) -> Router {
    Router::new()
        .route("/", get(list_zones))
        .route("/{zone_id}", get(get_zone))
        .with_state(state)
}

/// Réponse d'erreur REST générique.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/zones",
    tag = "zones",
    responses(
        (status = 200, description = "Zones, dans l'ordre du fichier", body = [Zone]),
        (status = 500, description = "Fichier de zones illisible ou invalide", body = ErrorResponse)
    )
)]
pub async fn list_zones(State(state): State<ZonesState>) -> Response {
    match load_zones_file(state.zones_file()).await {
        Ok(zones) => (StatusCode::OK, Json(zones)).into_response(),
        Err(err) => {
            warn!(file = %state.zones_file().display(), "Unable to serve zones: {}", err);
            map_error(err)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/zones/{zone_id}",
    tag = "zones",
    params(("zone_id" = String, Path, description = "Identifiant de la zone")),
    responses(
        (status = 200, description = "Zone trouvée", body = Zone),
        (status = 404, description = "Zone inconnue", body = ErrorResponse),
        (status = 500, description = "Fichier de zones illisible ou invalide", body = ErrorResponse)
    )
)]
pub async fn get_zone(State(state): State<ZonesState>, Path(zone_id): Path<String>) -> Response {
    let zones = match load_zones_file(state.zones_file()).await {
        Ok(zones) => zones,
        Err(err) => {
            warn!(file = %state.zones_file().display(), "Unable to serve zones: {}", err);
            return map_error(err);
        }
    };

    match zones.into_iter().find(|z| z.id.to_string() == zone_id) {
        Some(zone) => (StatusCode::OK, Json(zone)).into_response(),
        None => map_error(Error::ZoneNotFound(zone_id)),
    }
}

fn map_error(err: Error) -> Response {
    match err {
        Error::ZoneNotFound(_) => map_status(StatusCode::NOT_FOUND, "ZONE_NOT_FOUND", err),
        Error::Io(_) => map_status(StatusCode::INTERNAL_SERVER_ERROR, "ZONES_UNAVAILABLE", err),
        Error::Json(_) | Error::Yaml(_) | Error::InvalidZone { .. } => {
            map_status(StatusCode::INTERNAL_SERVER_ERROR, "INVALID_ZONES_FILE", err)
        }
        _ => map_status(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", err),
    }
}

fn map_status(status: StatusCode, code: &str, err: Error) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
        .into_response()
}
