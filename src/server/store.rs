//! The server's single game store, shared across requests.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::data::catalog::{Catalog, CatalogError};
use crate::game::save::{load_from_file, save_to_file, SaveError};
use crate::game::state::GameState;

#[derive(Debug)]
pub enum StoreError {
    Catalog(CatalogError),
    Save(SaveError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Save(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Save(err) => Some(err),
        }
    }
}

impl From<CatalogError> for StoreError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<SaveError> for StoreError {
    fn from(value: SaveError) -> Self {
        Self::Save(value)
    }
}

pub struct GameStore {
    game: Mutex<GameState>,
    save_path: Option<PathBuf>,
}

impl GameStore {
    /// In-memory store; nothing is written to disk.
    pub fn new(game: GameState) -> Self {
        Self {
            game: Mutex::new(game),
            save_path: None,
        }
    }

    /// Loads the catalog and the save file named by `config`. A missing save
    /// file starts a new game; an unreadable one is an error.
    pub fn open(config: &AppConfig) -> Result<Self, StoreError> {
        let catalog = Arc::new(Catalog::load_or_builtin(config.catalog_path.as_deref())?);
        let rng = config.rng();
        let game = if config.save_path.exists() {
            let save = load_from_file(&config.save_path)?;
            tracing::info!(target: "game.save", path = %config.save_path.display(), saved_at = %save.saved_at, "save loaded");
            GameState::from_snapshot(catalog, rng, save.game)
        } else {
            tracing::info!(target: "game.save", path = %config.save_path.display(), "no save found, starting a new game");
            GameState::new(catalog, rng)
        };
        Ok(Self {
            game: Mutex::new(game),
            save_path: Some(config.save_path.clone()),
        })
    }

    /// Runs `f` with exclusive access to the game.
    pub fn with_game<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        let mut game = self.game.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut game)
    }

    /// Writes the current state to the save file, if one is configured.
    /// Failures are logged; the in-memory state stays authoritative.
    pub fn persist(&self) {
        let Some(path) = &self.save_path else {
            return;
        };
        let snapshot = self.with_game(|game| game.snapshot());
        if let Err(err) = save_to_file(path, &snapshot) {
            tracing::warn!(target: "game.save", path = %path.display(), error = %err, "autosave failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::Rng;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("escouade-store-{name}-{}-{nanos}.json", std::process::id()))
    }

    #[test]
    fn open_without_save_starts_fresh_and_persists() {
        let save_path = temp_path("fresh");
        let config = AppConfig {
            save_path: save_path.clone(),
            seed: Some(1),
            ..AppConfig::default()
        };
        let store = GameStore::open(&config).expect("open");
        store.with_game(|game| game.unlock_bonus("force_brute")).expect("unlock");
        store.persist();

        let reopened = GameStore::open(&config).expect("reopen");
        let copies = reopened.with_game(|game| game.unlocked_bonuses.get("force_brute").copied());
        assert_eq!(copies, Some(1));
        let _ = std::fs::remove_file(save_path);
    }

    #[test]
    fn in_memory_store_never_writes() {
        let store = GameStore::new(GameState::new(Arc::new(Catalog::builtin()), Rng::new(0)));
        store.persist();
        assert_eq!(store.with_game(|game| game.combats_played), 0);
    }
}
