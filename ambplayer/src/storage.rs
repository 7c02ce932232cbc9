//! Persistance du drapeau « audio déverrouillé »
//!
//! Le stockage est au mieux : une écriture ou une lecture qui échoue est
//! tracée et la valeur reste connue en mémoire pour la session.

use crate::error::{Error, Result};
use ambconfig::Config;
use serde_yaml::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Clé de configuration du drapeau
pub const UNLOCK_FLAG_PATH: [&str; 2] = ["player", "audio_unlocked"];

/// Stockage clé/valeur du drapeau de déverrouillage
pub trait UnlockStore: Send + Sync {
    fn get(&self) -> Result<bool>;
    fn set(&self) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Stockage volatile, perdu à la fin du processus
#[derive(Debug, Default)]
pub struct MemoryUnlockStore {
    flag: AtomicBool,
}

impl MemoryUnlockStore {
    pub fn new(initial: bool) -> Self {
        Self {
            flag: AtomicBool::new(initial),
        }
    }
}

impl UnlockStore for MemoryUnlockStore {
    fn get(&self) -> Result<bool> {
        Ok(self.flag.load(Ordering::SeqCst))
    }

    fn set(&self) -> Result<()> {
        self.flag.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.flag.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Stockage dans le fichier de configuration (`player.audio_unlocked`)
pub struct ConfigUnlockStore {
    config: Arc<Config>,
}

impl ConfigUnlockStore {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl UnlockStore for ConfigUnlockStore {
    fn get(&self) -> Result<bool> {
        match self.config.find_value(&UNLOCK_FLAG_PATH)? {
            Some(Value::Bool(b)) => Ok(b),
            Some(other) => Err(Error::Storage(format!(
                "unexpected value for {}: {:?}",
                UNLOCK_FLAG_PATH.join("."),
                other
            ))),
            // Clé absente : jamais déverrouillé
            None => Ok(false),
        }
    }

    fn set(&self) -> Result<()> {
        Ok(self.config.set_value(&UNLOCK_FLAG_PATH, Value::Bool(true))?)
    }

    fn clear(&self) -> Result<()> {
        Ok(self.config.remove_value(&UNLOCK_FLAG_PATH)?)
    }
}

/// Drapeau persistant tolérant aux pannes du stockage
pub struct PersistedFlag {
    store: Arc<dyn UnlockStore>,
    value: AtomicBool,
}

impl PersistedFlag {
    /// Lit la valeur initiale ; un stockage illisible vaut `false`.
    pub fn load(store: Arc<dyn UnlockStore>) -> Self {
        let initial = store.get().unwrap_or_else(|e| {
            warn!("Cannot read audio unlock flag, assuming locked: {}", e);
            false
        });
        Self {
            store,
            value: AtomicBool::new(initial),
        }
    }

    pub fn get(&self) -> bool {
        self.value.load(Ordering::SeqCst)
    }

    pub fn set(&self) {
        self.value.store(true, Ordering::SeqCst);
        if let Err(e) = self.store.set() {
            warn!("Cannot persist audio unlock flag, kept for this session only: {}", e);
        }
    }

    pub fn clear(&self) {
        self.value.store(false, Ordering::SeqCst);
        if let Err(e) = self.store.clear() {
            warn!("Cannot clear persisted audio unlock flag: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl UnlockStore for BrokenStore {
        fn get(&self) -> Result<bool> {
            Err(Error::Storage("quota exceeded".into()))
        }
        fn set(&self) -> Result<()> {
            Err(Error::Storage("quota exceeded".into()))
        }
        fn clear(&self) -> Result<()> {
            Err(Error::Storage("quota exceeded".into()))
        }
    }

    #[test]
    fn test_config_store_roundtrip_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        let config = Arc::new(Config::load_config(path).unwrap());
        let store = ConfigUnlockStore::new(config);
        assert!(!store.get().unwrap());
        store.set().unwrap();
        assert!(store.get().unwrap());

        let reloaded = ConfigUnlockStore::new(Arc::new(Config::load_config(path).unwrap()));
        assert!(reloaded.get().unwrap());

        reloaded.clear().unwrap();
        assert!(!reloaded.get().unwrap());
    }

    #[test]
    fn test_config_store_reports_malformed_section() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(Config::load_config(dir.path().to_str().unwrap()).unwrap());
        let store = ConfigUnlockStore::new(config.clone());

        config
            .set_value(&["player"], Value::String("corrupted".into()))
            .unwrap();
        assert!(matches!(store.get(), Err(Error::Config(_))));

        config
            .set_value(&["player"], Value::Mapping(Default::default()))
            .unwrap();
        assert!(!store.get().unwrap());
        config
            .set_value(&UNLOCK_FLAG_PATH, Value::String("yes".into()))
            .unwrap();
        assert!(matches!(store.get(), Err(Error::Storage(_))));
    }

    #[test]
    fn test_broken_store_keeps_value_in_memory() {
        let flag = PersistedFlag::load(Arc::new(BrokenStore));
        assert!(!flag.get());
        flag.set();
        assert!(flag.get());
        flag.clear();
        assert!(!flag.get());
    }

    #[test]
    fn test_flag_reads_initial_value() {
        let flag = PersistedFlag::load(Arc::new(MemoryUnlockStore::new(true)));
        assert!(flag.get());
    }
}
