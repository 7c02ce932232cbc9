//! Extension d'ambconfig pour les zones et les fichiers audio

use ambconfig::Config;
use anyhow::Result;
use serde_yaml::Value;
use std::path::PathBuf;

const DEFAULT_ZONES_FILE: &str = "zones.json";
const DEFAULT_AUDIO_DIR: &str = "audio";
const DEFAULT_AUDIO_ROUTE: &str = "/audio";

/// Trait d'extension pour ambconfig::Config
pub trait ZonesConfigExt {
    /// Chemin du fichier de zones (relatif au répertoire de configuration)
    fn get_zones_file(&self) -> PathBuf;

    fn set_zones_file(&self, path: &str) -> Result<()>;

    /// Répertoire des fichiers audio, créé s'il n'existe pas
    fn get_audio_dir(&self) -> Result<PathBuf>;

    /// Préfixe HTTP sous lequel les fichiers audio sont servis, ex: `/audio`
    fn get_audio_route(&self) -> String;

    fn set_audio_route(&self, route: &str) -> Result<()>;
}

impl ZonesConfigExt for Config {
    fn get_zones_file(&self) -> PathBuf {
        self.resolve_path(&self.get_string_or(&["zones", "file"], DEFAULT_ZONES_FILE))
    }

    fn set_zones_file(&self, path: &str) -> Result<()> {
        self.set_value(&["zones", "file"], Value::String(path.to_string()))
    }

    fn get_audio_dir(&self) -> Result<PathBuf> {
        self.get_managed_dir(&["zones", "audio", "directory"], DEFAULT_AUDIO_DIR)
    }

    fn get_audio_route(&self) -> String {
        normalize_route(&self.get_string_or(&["zones", "audio", "route"], DEFAULT_AUDIO_ROUTE))
    }

    fn set_audio_route(&self, route: &str) -> Result<()> {
        self.set_value(
            &["zones", "audio", "route"],
            Value::String(normalize_route(route)),
        )
    }
}

fn normalize_route(route: &str) -> String {
    let trimmed = route.trim().trim_matches('/');
    if trimmed.is_empty() {
        DEFAULT_AUDIO_ROUTE.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
