//! Per-combat session: target, accumulated damage, rounds, boss state and rerolls.

use serde::{Deserialize, Serialize};

use crate::data::boss::BossMechanic;
use crate::data::catalog::Catalog;
use crate::data::rank::{boss_target_damage, Rank};

pub const MAX_ROUNDS: u32 = 5;
pub const MAX_REROLLS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    Ongoing,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSession {
    /// Sequence number of this combat for the owning player, starting at 1.
    pub combat_index: u32,
    pub rank: Rank,
    pub target_damage: i64,
    pub total_damage: i64,
    /// Current round, 1-based.
    pub round: u32,
    pub max_rounds: u32,
    pub is_active: bool,
    pub is_boss_fight: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boss_name: Option<String>,
    #[serde(default)]
    pub boss_description: String,
    pub boss_mechanic: BossMechanic,
    pub reroll_count: u32,
    /// Set once by selling a bonus during this combat; never reset until the combat ends.
    #[serde(default)]
    pub malus_disabled: bool,
}

impl CombatSession {
    pub fn new(rank: Rank, catalog: &Catalog, combat_index: u32) -> Self {
        let boss = rank
            .is_boss_rank()
            .then(|| catalog.boss_for_rank(rank))
            .flatten();

        let (target_damage, boss_name, boss_description, boss_mechanic) = match boss {
            Some(boss) => (
                boss_target_damage(boss.base_target, rank),
                Some(boss.name.clone()),
                boss.description.clone(),
                boss.mechanic.clone(),
            ),
            None => (
                rank.normal_target_damage(),
                None,
                String::new(),
                BossMechanic::None,
            ),
        };

        Self {
            combat_index,
            rank,
            target_damage,
            total_damage: 0,
            round: 1,
            max_rounds: MAX_ROUNDS,
            is_active: true,
            is_boss_fight: boss_name.is_some(),
            boss_name,
            boss_description,
            boss_mechanic,
            reroll_count: 0,
            malus_disabled: false,
        }
    }

    pub fn rerolls_left(&self) -> u32 {
        MAX_REROLLS.saturating_sub(self.reroll_count)
    }

    /// Adds a resolved turn's damage and advances the round. Marks the session
    /// inactive once the target is reached or the last round is spent.
    pub fn record_turn(&mut self, damage: i64) -> CombatOutcome {
        self.total_damage += damage;
        let outcome = if self.total_damage >= self.target_damage {
            CombatOutcome::Victory
        } else if self.round >= self.max_rounds {
            CombatOutcome::Defeat
        } else {
            self.round += 1;
            CombatOutcome::Ongoing
        };
        if outcome != CombatOutcome::Ongoing {
            self.is_active = false;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_rank_binds_boss_and_scales_target() {
        let catalog = Catalog::builtin();
        let rank = Rank::parse("C+").expect("rank");
        let session = CombatSession::new(rank, &catalog, 1);
        assert!(session.is_boss_fight);
        assert_eq!(session.boss_name.as_deref(), Some("Quilegan"));
        assert_eq!(session.boss_mechanic, BossMechanic::BlockUntilBonusSold);
        assert_eq!(session.target_damage, 180 * 8);
    }

    #[test]
    fn normal_rank_has_no_boss() {
        let session = CombatSession::new(Rank::LOWEST, &Catalog::builtin(), 1);
        assert!(!session.is_boss_fight);
        assert_eq!(session.boss_mechanic, BossMechanic::None);
        assert_eq!(session.target_damage, 40);
    }

    #[test]
    fn defeat_after_max_rounds() {
        let mut session = CombatSession::new(Rank::LOWEST, &Catalog::builtin(), 1);
        for _ in 0..MAX_ROUNDS - 1 {
            assert_eq!(session.record_turn(1), CombatOutcome::Ongoing);
        }
        assert_eq!(session.round, MAX_ROUNDS);
        assert_eq!(session.record_turn(1), CombatOutcome::Defeat);
        assert!(!session.is_active);
    }

    #[test]
    fn victory_when_target_reached() {
        let mut session = CombatSession::new(Rank::LOWEST, &Catalog::builtin(), 1);
        assert_eq!(session.record_turn(39), CombatOutcome::Ongoing);
        assert_eq!(session.record_turn(1), CombatOutcome::Victory);
        assert_eq!(session.total_damage, 40);
    }
}
