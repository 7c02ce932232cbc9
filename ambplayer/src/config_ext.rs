//! Extension d'ambconfig pour le lecteur

use crate::location::WatchOptions;
use ambconfig::Config;
use anyhow::Result;
use serde_yaml::Value;
use std::time::Duration;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

pub trait PlayerConfigExt {
    /// URL du serveur qui publie `/api/zones`
    fn get_player_server_url(&self) -> String;

    fn set_player_server_url(&self, url: &str) -> Result<()>;

    /// Options de surveillance de la position (`player.geolocation.*`)
    fn get_watch_options(&self) -> WatchOptions;
}

impl PlayerConfigExt for Config {
    fn get_player_server_url(&self) -> String {
        self.get_string_or(&["player", "server_url"], DEFAULT_SERVER_URL)
    }

    fn set_player_server_url(&self, url: &str) -> Result<()> {
        self.set_value(&["player", "server_url"], Value::String(url.to_string()))
    }

    fn get_watch_options(&self) -> WatchOptions {
        let defaults = WatchOptions::default();
        WatchOptions {
            high_accuracy: self.get_bool_or(
                &["player", "geolocation", "high_accuracy"],
                defaults.high_accuracy,
            ),
            maximum_age: Duration::from_millis(self.get_u64_or(
                &["player", "geolocation", "maximum_age_ms"],
                defaults.maximum_age.as_millis() as u64,
            )),
            timeout: Duration::from_millis(self.get_u64_or(
                &["player", "geolocation", "timeout_ms"],
                defaults.timeout.as_millis() as u64,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(config.get_player_server_url(), DEFAULT_SERVER_URL);
        assert_eq!(config.get_watch_options(), WatchOptions::default());

        config
            .set_value(
                &["player", "geolocation", "maximum_age_ms"],
                Value::Number(1500.into()),
            )
            .unwrap();
        config.set_player_server_url("http://zones.local:9000").unwrap();

        assert_eq!(
            config.get_watch_options().maximum_age,
            Duration::from_millis(1500)
        );
        assert_eq!(config.get_player_server_url(), "http://zones.local:9000");
    }
}
