//! Turn damage calculator.
//!
//! `preview_turn` is the pure computation over a squad. `resolve_turn` runs it
//! on the current selection and then retires every troop that fought.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::combat::bonuses::ResolvedBonus;
use crate::combat::boss::{
    apply_mechanic_to_total_multiplier, is_unit_disabled_by_boss, BossContext,
};
use crate::combat::fusion::{matches_target, FusionMap};
use crate::combat::pool::{TroopInstance, TroopPools};
use crate::combat::stats::{compute_unit_stats, StatContext};
use crate::combat::synergy::{select_active_synergy, ResolvedSynergy, SynergyLevels};
use crate::data::synergy::SynergyDefinition;
use crate::data::target::Target;

/// Everything a turn reads besides the squad itself.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub bonuses: &'a [ResolvedBonus],
    pub fusion: &'a FusionMap,
    pub synergies: &'a [SynergyDefinition],
    pub synergy_levels: &'a SynergyLevels,
    pub boss: BossContext<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitContribution {
    pub troop_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub slot: usize,
    pub damage: i64,
    pub multiplier: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub units: Vec<UnitContribution>,
    pub synergy: Option<ResolvedSynergy>,
    pub bonuses: Vec<ResolvedBonus>,
    pub total_damage: i64,
    pub total_multiplier: i64,
    pub final_damage: i64,
    /// True when a blocking boss forced the final damage to 0.
    pub zeroed_by_boss: bool,
    /// Selected IDs that were not found in the live pools.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<Uuid>,
}

/// Computes a turn for `squad` in slot order without touching any state.
pub fn preview_turn(squad: &[&TroopInstance], ctx: &TurnContext<'_>) -> TurnResult {
    let stat_ctx = StatContext {
        bonuses: ctx.bonuses,
        fusion: ctx.fusion,
        boss: ctx.boss,
    };

    let mut total_damage = 0;
    let mut total_multiplier = 0;
    let mut units = Vec::with_capacity(squad.len());
    for (slot, troop) in squad.iter().enumerate() {
        let stats = compute_unit_stats(&troop.unit, slot, &stat_ctx);
        total_damage += stats.damage;
        total_multiplier += stats.multiplier;
        units.push(UnitContribution {
            troop_id: troop.id,
            name: troop.unit.name.clone(),
            icon: troop.unit.icon.clone(),
            slot,
            damage: stats.damage,
            multiplier: stats.multiplier,
        });
    }

    let blocked = ctx.boss.blocks_everything();
    let synergy = if blocked {
        None
    } else {
        select_active_synergy(
            squad.iter().map(|t| &t.unit),
            ctx.synergies,
            ctx.synergy_levels,
            ctx.fusion,
        )
    };

    if let Some(active) = &synergy {
        let applications = match active.target {
            Target::All => 1,
            // Units zeroed by the boss take no share of the synergy.
            target => squad
                .iter()
                .filter(|t| matches_target(target, &t.unit, ctx.fusion))
                .filter(|t| !is_unit_disabled_by_boss(&t.unit, ctx.boss.mechanic))
                .count() as i64,
        };
        total_damage += active.damage * applications;
        total_multiplier += active.multiplier * applications;
    }

    total_multiplier = apply_mechanic_to_total_multiplier(total_multiplier, ctx.boss.mechanic);

    let mut final_damage = total_damage * total_multiplier;
    if blocked {
        final_damage = 0;
    }

    TurnResult {
        units,
        synergy,
        bonuses: ctx.bonuses.to_vec(),
        total_damage,
        total_multiplier,
        final_damage,
        zeroed_by_boss: blocked,
        skipped: Vec::new(),
    }
}

/// Resolves the current selection. Used or missing troops are skipped with a
/// warning; every troop that fought is retired from the pool and selection.
pub fn resolve_turn(pools: &mut TroopPools, ctx: &TurnContext<'_>) -> TurnResult {
    let mut skipped = Vec::new();
    let mut squad: Vec<TroopInstance> = Vec::with_capacity(pools.selected.len());
    for &id in &pools.selected {
        if pools.is_used(id) {
            tracing::warn!(target: "combat.turn", troop = %id, "selected troop already used, skipping");
            skipped.push(id);
            continue;
        }
        match pools.find(id) {
            Some(troop) => squad.push(troop.clone()),
            None => {
                tracing::warn!(target: "combat.turn", troop = %id, "selected troop not in any pool, skipping");
                skipped.push(id);
            }
        }
    }

    let refs: Vec<&TroopInstance> = squad.iter().collect();
    let mut result = preview_turn(&refs, ctx);
    result.skipped = skipped;

    let fought: Vec<Uuid> = squad.iter().map(|t| t.id).collect();
    pools.retire(&fought);
    pools.selected.clear();

    tracing::debug!(
        target: "combat.turn",
        units = result.units.len(),
        total_damage = result.total_damage,
        total_multiplier = result.total_multiplier,
        final_damage = result.final_damage,
        synergy = result.synergy.as_ref().map(|s| s.name.as_str()).unwrap_or("-"),
        "turn resolved"
    );
    result
}
