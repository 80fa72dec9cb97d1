//! Runtime configuration read from `ESCOUADE_*` environment variables.

use std::env;
use std::path::PathBuf;

use crate::combat::rng::Rng;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_SAVE_PATH: &str = "data/save.json";
pub const DEFAULT_STATIC_DIR: &str = "frontend/dist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: String,
    /// YAML catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    pub save_path: PathBuf,
    pub seed: Option<u64>,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            catalog_path: None,
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            seed: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values count as unset; an
    /// unparsable seed is ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let seed = get("ESCOUADE_SEED").and_then(|raw| match raw.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(err) => {
                tracing::warn!(target: "config", value = %raw, error = %err, "ignoring invalid ESCOUADE_SEED");
                None
            }
        });

        Self {
            bind: get("ESCOUADE_BIND").unwrap_or(defaults.bind),
            catalog_path: get("ESCOUADE_CATALOG").map(PathBuf::from),
            save_path: get("ESCOUADE_SAVE_PATH").map(PathBuf::from).unwrap_or(defaults.save_path),
            seed,
            static_dir: get("ESCOUADE_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }

    pub fn rng(&self) -> Rng {
        match self.seed {
            Some(seed) => Rng::new(seed),
            None => Rng::from_entropy(),
        }
    }
}
