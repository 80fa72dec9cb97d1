//! Persisted game state. Only source-of-truth fields are stored: no resolved
//! bonuses, no RNG, nothing that can be recomputed.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::bonuses::{DynamicBonusState, UnlockedBonuses};
use crate::combat::pool::PoolError;
use crate::combat::synergy::SynergyLevels;
use crate::data::rank::Rank;
use crate::game::state::ActiveCombat;

pub const SAVE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub owned_units: BTreeMap<String, u32>,
    #[serde(default)]
    pub unlocked_bonuses: UnlockedBonuses,
    #[serde(default)]
    pub dynamic_bonuses: DynamicBonusState,
    #[serde(default)]
    pub synergy_levels: SynergyLevels,
    #[serde(default)]
    pub rank: Rank,
    #[serde(default)]
    pub combats_played: u32,
    /// Present only when saved mid-combat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat: Option<ActiveCombat>,
}

impl GameSnapshot {
    /// Rejects a saved combat whose pools could not have come out of play.
    pub fn check(&self) -> Result<(), PoolError> {
        match &self.combat {
            Some(active) => active.pools.check(),
            None => Ok(()),
        }
    }
}

/// On-disk envelope around a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    /// RFC 3339 UTC timestamp.
    pub saved_at: String,
    pub game: GameSnapshot,
}

#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnsupportedVersion(u32),
    InvalidState(PoolError),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "save file i/o error: {err}"),
            Self::Json(err) => write!(f, "invalid save data: {err}"),
            Self::UnsupportedVersion(version) => write!(
                f,
                "unsupported save version {version} (expected {SAVE_FORMAT_VERSION})"
            ),
            Self::InvalidState(err) => write!(f, "inconsistent save data: {err}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidState(err) => Some(err),
            Self::UnsupportedVersion(_) => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

pub fn snapshot_to_json(snapshot: &GameSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

pub fn snapshot_from_json(raw: &str) -> Result<GameSnapshot, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn save_to_file(path: impl AsRef<Path>, snapshot: &GameSnapshot) -> Result<(), SaveError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = SaveFile {
        version: SAVE_FORMAT_VERSION,
        saved_at: chrono::Utc::now().to_rfc3339(),
        game: snapshot.clone(),
    };
    let raw = serde_json::to_string_pretty(&file)?;
    fs::write(path, raw)?;
    tracing::debug!(target: "game.save", path = %path.display(), "game saved");
    Ok(())
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<SaveFile, SaveError> {
    let raw = fs::read_to_string(path.as_ref())?;
    let file: SaveFile = serde_json::from_str(&raw)?;
    if file.version != SAVE_FORMAT_VERSION {
        return Err(SaveError::UnsupportedVersion(file.version));
    }
    file.game.check().map_err(SaveError::InvalidState)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_json_omits_absent_combat() {
        let snapshot = GameSnapshot {
            owned_units: BTreeMap::from([("Archer".to_string(), 2)]),
            unlocked_bonuses: UnlockedBonuses::new(),
            dynamic_bonuses: DynamicBonusState::default(),
            synergy_levels: SynergyLevels::new(),
            rank: Rank::LOWEST,
            combats_played: 0,
            combat: None,
        };
        let json = snapshot_to_json(&snapshot).expect("json");
        assert!(!json.contains("\"combat\""));
        assert!(json.contains("\"rank\": \"F-\""));
        assert_eq!(snapshot_from_json(&json).expect("parse"), snapshot);
    }

    #[test]
    fn minimal_snapshot_fills_defaults() {
        let snapshot = snapshot_from_json(r#"{"owned_units":{"Mage":1}}"#).expect("parse");
        assert_eq!(snapshot.rank, Rank::LOWEST);
        assert!(snapshot.unlocked_bonuses.is_empty());
        assert!(snapshot.combat.is_none());
    }
}
