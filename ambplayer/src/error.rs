//! Error types for the player

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the player's ports and helpers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The unlock flag store could not be read or written
    #[error("Unlock storage unavailable: {0}")]
    Storage(String),

    /// Configuration error (from ambconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Zones(#[from] ambzones::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure of a `play()` request on the audio element
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The platform refused playback (no prior user gesture, revoked permission)
    #[error("Playback not allowed: {0}")]
    NotAllowed(String),

    /// The source could not be loaded or decoded
    #[error("Media error: {0}")]
    Media(String),

    /// A newer request superseded this one
    #[error("Playback aborted: {0}")]
    Aborted(String),

    #[error("No audio element available")]
    NoElement,
}

/// Failure reported by the platform location service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Location request timed out")]
    Timeout,

    #[error("Location service not supported")]
    Unsupported,

    #[error("A location subscription is already active")]
    AlreadyWatching,
}
