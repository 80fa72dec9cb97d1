use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::combat::pool::MAX_SELECTED;
use crate::combat::session::MAX_REROLLS;

/// A player action that was refused. The store is left untouched whenever one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    TooManySelected,
    AlreadySelected { id: Uuid },
    NotInCombatPool { id: Uuid },
    NotSelected { id: Uuid },
    AlreadyUsed { id: Uuid },
    NoCombat,
    CombatAlreadyActive,
    NothingSelected,
    NoRerollEligible,
    RerollLimitReached,
    RerollBlockedByBoss,
    UnknownUnit { name: String },
    UnknownBonus { id: String },
    UnknownSynergy { name: String },
    BonusNotOwned { id: String },
    NotEnoughUnits { name: String },
    NoUnitsOwned,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManySelected => write!(f, "at most {MAX_SELECTED} troops can be selected"),
            Self::AlreadySelected { id } => write!(f, "troop {id} is already selected"),
            Self::NotInCombatPool { id } => write!(f, "troop {id} is not in the combat pool"),
            Self::NotSelected { id } => write!(f, "troop {id} is not selected"),
            Self::AlreadyUsed { id } => write!(f, "troop {id} has already fought this combat"),
            Self::NoCombat => f.write_str("no combat in progress"),
            Self::CombatAlreadyActive => f.write_str("a combat is already in progress"),
            Self::NothingSelected => f.write_str("select at least one troop"),
            Self::NoRerollEligible => f.write_str("no selected troop can be rerolled"),
            Self::RerollLimitReached => {
                write!(f, "reroll limit reached ({MAX_REROLLS} per combat)")
            }
            Self::RerollBlockedByBoss => f.write_str("the boss forbids rerolls until a bonus is sold"),
            Self::UnknownUnit { name } => write!(f, "unknown unit '{name}'"),
            Self::UnknownBonus { id } => write!(f, "unknown bonus '{id}'"),
            Self::UnknownSynergy { name } => write!(f, "unknown synergy '{name}'"),
            Self::BonusNotOwned { id } => write!(f, "bonus '{id}' is not owned"),
            Self::NotEnoughUnits { name } => write!(f, "no copy of '{name}' left"),
            Self::NoUnitsOwned => f.write_str("no units owned"),
        }
    }
}

impl std::error::Error for Rejection {}
