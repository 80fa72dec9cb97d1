//! Boss mechanic resolution. Per-unit transforms run inside the unit stat
//! pipeline; squad-level transforms run once on the turn totals.

use crate::combat::session::CombatSession;
use crate::data::boss::BossMechanic;
use crate::data::unit::{has_tag, UnitDefinition, UnitTag};

/// The slice of combat state the stat pipeline needs from the boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossContext<'a> {
    pub mechanic: &'a BossMechanic,
    pub malus_disabled: bool,
}

impl BossContext<'static> {
    pub const NONE: BossContext<'static> = BossContext {
        mechanic: &BossMechanic::None,
        malus_disabled: false,
    };
}

impl<'a> BossContext<'a> {
    pub fn from_session(session: &'a CombatSession) -> Self {
        Self {
            mechanic: &session.boss_mechanic,
            malus_disabled: is_malus_disabled(session),
        }
    }

    /// True while a "blocks until a bonus is sold" boss is still in force.
    pub fn blocks_everything(&self) -> bool {
        matches!(self.mechanic, BossMechanic::BlockUntilBonusSold) && !self.malus_disabled
    }
}

fn targets(unit: &UnitDefinition, target: Option<UnitTag>) -> bool {
    target.map_or(true, |tag| has_tag(unit, tag))
}

pub fn apply_mechanic_to_damage(damage: i64, unit: &UnitDefinition, mechanic: &BossMechanic) -> i64 {
    match mechanic {
        BossMechanic::DamageReduction { target, percent } if targets(unit, *target) => {
            let keep = 100 - i64::from((*percent).min(100));
            (damage * keep).div_euclid(100)
        }
        _ => damage,
    }
}

pub fn apply_mechanic_to_multiplier(
    multiplier: i64,
    unit: &UnitDefinition,
    mechanic: &BossMechanic,
) -> i64 {
    match mechanic {
        BossMechanic::MultiplierPenalty { target, amount } if targets(unit, *target) => {
            (multiplier - amount).max(0)
        }
        _ => multiplier,
    }
}

/// Squad-level multiplier transform, applied after every unit and the synergy are summed.
pub fn apply_mechanic_to_total_multiplier(total: i64, mechanic: &BossMechanic) -> i64 {
    match mechanic {
        BossMechanic::HalveMultipliers => total.div_euclid(2),
        _ => total,
    }
}

pub fn is_unit_disabled_by_boss(unit: &UnitDefinition, mechanic: &BossMechanic) -> bool {
    match mechanic {
        BossMechanic::DisableUnits { target } => has_tag(unit, *target),
        _ => false,
    }
}

pub fn is_malus_disabled(session: &CombatSession) -> bool {
    session.malus_disabled
}

pub fn blocks_rerolls(session: &CombatSession) -> bool {
    BossContext::from_session(session).blocks_everything()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::unit::UnitTag::*;

    fn melee() -> UnitDefinition {
        UnitDefinition::new("Épéiste", "", 5, 3, &[CorpsACorps])
    }

    fn ranged() -> UnitDefinition {
        UnitDefinition::new("Archer", "", 5, 3, &[Distance])
    }

    #[test]
    fn damage_reduction_hits_only_targeted_units_and_floors() {
        let mechanic = BossMechanic::DamageReduction {
            target: Some(CorpsACorps),
            percent: 50,
        };
        assert_eq!(apply_mechanic_to_damage(5, &melee(), &mechanic), 2);
        assert_eq!(apply_mechanic_to_damage(5, &ranged(), &mechanic), 5);
    }

    #[test]
    fn multiplier_penalty_never_goes_negative() {
        let mechanic = BossMechanic::MultiplierPenalty {
            target: None,
            amount: 2,
        };
        assert_eq!(apply_mechanic_to_multiplier(3, &melee(), &mechanic), 1);
        assert_eq!(apply_mechanic_to_multiplier(1, &ranged(), &mechanic), 0);
    }

    #[test]
    fn halving_is_squad_level_only() {
        let mechanic = BossMechanic::HalveMultipliers;
        assert_eq!(apply_mechanic_to_multiplier(3, &melee(), &mechanic), 3);
        assert_eq!(apply_mechanic_to_total_multiplier(7, &mechanic), 3);
        assert_eq!(apply_mechanic_to_total_multiplier(7, &BossMechanic::None), 7);
    }

    #[test]
    fn disable_matches_tag() {
        let mechanic = BossMechanic::DisableUnits { target: Distance };
        assert!(is_unit_disabled_by_boss(&ranged(), &mechanic));
        assert!(!is_unit_disabled_by_boss(&melee(), &mechanic));
    }

    #[test]
    fn block_lifts_once_malus_disabled() {
        let mechanic = BossMechanic::BlockUntilBonusSold;
        let blocked = BossContext {
            mechanic: &mechanic,
            malus_disabled: false,
        };
        let lifted = BossContext {
            mechanic: &mechanic,
            malus_disabled: true,
        };
        assert!(blocked.blocks_everything());
        assert!(!lifted.blocks_everything());
        assert!(!BossContext::NONE.blocks_everything());
    }
}
