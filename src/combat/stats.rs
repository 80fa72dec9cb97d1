//! Per-unit stat pipeline. Order is fixed:
//! base → equipment bonuses → boss damage/multiplier → 4th-slot multiplier → boss disable.
//! Synergies never enter here; the turn calculator applies them once per squad.

use serde::{Deserialize, Serialize};

use crate::combat::bonuses::{position_bonus, ResolvedBonus};
use crate::combat::boss::{
    apply_mechanic_to_damage, apply_mechanic_to_multiplier, is_unit_disabled_by_boss, BossContext,
};
use crate::combat::fusion::{matches_target, FusionMap};
use crate::data::unit::UnitDefinition;

/// Zero-based slot that receives the position bonus.
pub const POSITION_BONUS_SLOT: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub damage: i64,
    pub multiplier: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct StatContext<'a> {
    pub bonuses: &'a [ResolvedBonus],
    pub fusion: &'a FusionMap,
    pub boss: BossContext<'a>,
}

pub fn compute_unit_stats(unit: &UnitDefinition, slot: usize, ctx: &StatContext<'_>) -> UnitStats {
    let mut damage = unit.damage;
    let mut multiplier = unit.multiplier;

    // A blocking boss suppresses equipment bonuses along with everything else.
    if !ctx.boss.blocks_everything() {
        for bonus in ctx.bonuses.iter().filter(|b| !b.is_position_bonus) {
            if matches_target(bonus.target, unit, ctx.fusion) {
                damage += bonus.damage;
                multiplier += bonus.multiplier;
            }
        }
    }

    damage = apply_mechanic_to_damage(damage, unit, ctx.boss.mechanic);
    multiplier = apply_mechanic_to_multiplier(multiplier, unit, ctx.boss.mechanic);

    if slot == POSITION_BONUS_SLOT && !ctx.boss.blocks_everything() {
        if let Some(factor) = position_bonus(ctx.bonuses) {
            multiplier *= factor;
        }
    }

    if is_unit_disabled_by_boss(unit, ctx.boss.mechanic) {
        return UnitStats::default();
    }

    UnitStats { damage, multiplier }
}
