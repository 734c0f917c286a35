use std::sync::{PoisonError, RwLock};

use crate::models::GameConfig;

/// Game settings shared by all clients for the lifetime of the process
#[derive(Debug, Default)]
pub struct SettingsStore {
    current: RwLock<GameConfig>,
}

impl SettingsStore {
    pub fn new(initial: GameConfig) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    pub fn get(&self) -> GameConfig {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, config: GameConfig) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = config;
    }
}
