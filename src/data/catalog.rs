//! Read-only bundle of every static definition the engine needs.
//! Built in code by default; a YAML file may replace it wholesale.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::bonus::{builtin_bonuses, BonusDefinition};
use crate::data::boss::{builtin_bosses, BossDefinition};
use crate::data::rank::Rank;
use crate::data::synergy::{builtin_synergies, SynergyDefinition};
use crate::data::unit::{builtin_units, UnitDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossRankBinding {
    pub rank: Rank,
    pub boss: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub units: Vec<UnitDefinition>,
    pub synergies: Vec<SynergyDefinition>,
    pub bonuses: Vec<BonusDefinition>,
    pub bosses: Vec<BossDefinition>,
    pub boss_ranks: Vec<BossRankBinding>,
}

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read catalog: {err}"),
            Self::Yaml(err) => write!(f, "invalid catalog yaml: {err}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Yaml(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        let boss_ranks = [
            ("F+", "Gardien de Pierre"),
            ("E+", "Archimage Noir"),
            ("D+", "Titan"),
            ("C+", "Quilegan"),
            ("B+", "Liche"),
            ("A+", "Hydre des Abysses"),
            ("S", "Dragon Ancestral"),
        ]
        .into_iter()
        .filter_map(|(label, boss)| {
            Rank::parse(label).map(|rank| BossRankBinding {
                rank,
                boss: boss.to_string(),
            })
        })
        .collect();

        Self {
            units: builtin_units(),
            synergies: builtin_synergies(),
            bonuses: builtin_bonuses(),
            bosses: builtin_bosses(),
            boss_ranks,
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Loads `path` when given, otherwise the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::load_yaml(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn unit(&self, name: &str) -> Option<&UnitDefinition> {
        self.units.iter().find(|u| u.name == name)
    }

    pub fn synergy(&self, name: &str) -> Option<&SynergyDefinition> {
        self.synergies.iter().find(|s| s.name == name)
    }

    pub fn bonus(&self, id: &str) -> Option<&BonusDefinition> {
        self.bonuses.iter().find(|b| b.id == id)
    }

    pub fn boss(&self, name: &str) -> Option<&BossDefinition> {
        self.bosses.iter().find(|b| b.name == name)
    }

    pub fn boss_for_rank(&self, rank: Rank) -> Option<&BossDefinition> {
        self.boss_ranks
            .iter()
            .find(|binding| binding.rank == rank)
            .and_then(|binding| self.boss(&binding.boss))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
