//! Types d'erreurs pour ambzones

/// Erreurs de chargement et de récupération des zones
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Zone directory answered with HTTP status {0}")]
    Status(u16),

    #[error("Invalid zone {id}: {reason}")]
    InvalidZone { id: String, reason: String },

    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid_zone(id: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidZone {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Type Result spécialisé pour ambzones
pub type Result<T> = std::result::Result<T, Error>;
