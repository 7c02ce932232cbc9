//! Client HTTP du répertoire de zones (`GET /api/zones`)

use crate::{Error, Result, Zone};
use std::time::Duration;
use tracing::{info, warn};

const ZONES_ENDPOINT: &str = "/api/zones";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Récupère la liste des zones auprès du serveur.
///
/// # Exemple
///
/// ```no_run
/// use ambzones::ZoneDirectoryClient;
///
/// # async fn example() -> ambzones::Result<()> {
/// let client = ZoneDirectoryClient::new("http://127.0.0.1:8080")?;
/// let zones = client.fetch_or_empty().await;
/// println!("{} zones", zones.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ZoneDirectoryClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ZoneDirectoryClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(http, server_url))
    }

    pub fn with_client(http: reqwest::Client, server_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", server_url.trim_end_matches('/'), ZONES_ENDPOINT),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Récupère les zones, en écartant les enregistrements invalides.
    ///
    /// Toute réponse non 2xx est une erreur.
    pub async fn fetch(&self) -> Result<Vec<Zone>> {
        let response = self.http.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let zones: Vec<Zone> = response.json().await?;
        Ok(zones
            .into_iter()
            .filter(|zone| match zone.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Dropping zone from directory: {}", e);
                    false
                }
            })
            .collect())
    }

    /// Comme [`fetch`](Self::fetch), mais un échec donne une liste vide.
    pub async fn fetch_or_empty(&self) -> Vec<Zone> {
        match self.fetch().await {
            Ok(zones) => {
                info!(count = zones.len(), endpoint = %self.endpoint, "Zone directory loaded");
                zones
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, "Failed to load zone directory: {}", e);
                Vec::new()
            }
        }
    }
}
