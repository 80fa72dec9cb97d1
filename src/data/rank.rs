//! The 19-step rank ladder (`F-` … `S`) and its target-damage scaling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Base target damage for a non-boss encounter before tier/step scaling.
pub const BASE_TARGET_DAMAGE: i64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    F,
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Tier {
    pub const fn target_multiplier(self) -> i64 {
        match self {
            Self::F => 1,
            Self::E => 2,
            Self::D => 4,
            Self::C => 8,
            Self::B => 16,
            Self::A => 32,
            Self::S => 64,
        }
    }
}

const LADDER: [&str; 19] = [
    "F-", "F", "F+", "E-", "E", "E+", "D-", "D", "D+", "C-", "C", "C+", "B-", "B", "B+", "A-",
    "A", "A+", "S",
];

/// Ordinal position on the ladder, `0` = `F-`, `18` = `S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rank(u8);

impl Rank {
    pub const LOWEST: Rank = Rank(0);
    pub const HIGHEST: Rank = Rank(18);

    pub fn from_index(index: usize) -> Option<Self> {
        (index < LADDER.len()).then_some(Rank(index as u8))
    }

    pub fn parse(label: &str) -> Option<Self> {
        LADDER
            .iter()
            .position(|l| *l == label.trim())
            .map(|i| Rank(i as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn label(self) -> &'static str {
        LADDER[self.index()]
    }

    pub fn tier(self) -> Tier {
        match self.0 / 3 {
            0 => Tier::F,
            1 => Tier::E,
            2 => Tier::D,
            3 => Tier::C,
            4 => Tier::B,
            5 => Tier::A,
            _ => Tier::S,
        }
    }

    /// 0 for `-`, 1 for plain, 2 for `+`. `S` counts as 2.
    pub fn step(self) -> i64 {
        if self == Self::HIGHEST {
            2
        } else {
            i64::from(self.0 % 3)
        }
    }

    /// `+` ranks and `S` are fought against a boss.
    pub fn is_boss_rank(self) -> bool {
        self.step() == 2
    }

    pub fn next(self) -> Option<Rank> {
        Rank::from_index(self.index() + 1)
    }

    pub fn normal_target_damage(self) -> i64 {
        BASE_TARGET_DAMAGE * self.tier().target_multiplier() * (self.step() + 1)
    }
}

impl Default for Rank {
    fn default() -> Self {
        Self::LOWEST
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Rank> for String {
    fn from(value: Rank) -> Self {
        value.label().to_string()
    }
}

impl TryFrom<String> for Rank {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rank::parse(&value).ok_or_else(|| format!("unknown rank '{value}'"))
    }
}

/// Boss target damage scaled by the player's major tier.
pub fn boss_target_damage(base_target: i64, rank: Rank) -> i64 {
    base_target * rank.tier().target_multiplier()
}
