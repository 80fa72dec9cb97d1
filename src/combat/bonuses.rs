//! Equipment bonus resolution: unlocked copies plus dynamic counters become a
//! flat list of modifiers. Unknown IDs are skipped with a warning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::bonus::{BonusDefinition, BonusRule, BonusStat, DynamicEffect, TriggerCondition};
use crate::data::target::Target;

/// Bonus ID -> copies owned.
pub type UnlockedBonuses = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBonus {
    pub id: String,
    pub name: String,
    pub damage: i64,
    pub multiplier: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_multiplier: Option<i64>,
    pub target: Target,
    pub is_position_bonus: bool,
}

/// Identifies one round of one combat for the synergy-trigger guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundKey {
    pub combat: u32,
    pub round: u32,
}

/// Stored counter adjustments for dynamic bonuses, keyed by bonus ID then
/// by condition key (`base`, `synergy_trigger:<name>`, `end_of_combat`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicBonusState {
    #[serde(default)]
    pub counters: BTreeMap<String, BTreeMap<String, i64>>,
    #[serde(default)]
    pub last_synergy_trigger: BTreeMap<String, RoundKey>,
}

impl DynamicBonusState {
    pub fn counter(&self, bonus_id: &str, condition: &TriggerCondition) -> i64 {
        self.counters
            .get(bonus_id)
            .and_then(|by_condition| by_condition.get(&condition.key()))
            .copied()
            .unwrap_or(0)
    }

    pub fn add(&mut self, bonus_id: &str, condition: &TriggerCondition, amount: i64) {
        *self
            .counters
            .entry(bonus_id.to_string())
            .or_default()
            .entry(condition.key())
            .or_insert(0) += amount;
    }

    pub fn forget(&mut self, bonus_id: &str) {
        self.counters.remove(bonus_id);
        self.last_synergy_trigger.remove(bonus_id);
    }

    fn effect_value(&self, bonus_id: &str, effect: &DynamicEffect) -> i64 {
        effect.base_value + self.counter(bonus_id, &effect.condition)
    }
}

fn dynamic_effects(bonus: &BonusDefinition) -> &[DynamicEffect] {
    match &bonus.rule {
        BonusRule::Dynamic { effects } => effects,
        _ => &[],
    }
}

/// Called when a copy of a dynamic bonus is bought. The first copy starts
/// from the declared base values; each further copy bumps the `base` counters.
pub fn register_dynamic_purchase(state: &mut DynamicBonusState, bonus: &BonusDefinition, already_owned: bool) {
    if !already_owned {
        state.counters.entry(bonus.id.clone()).or_default();
        return;
    }
    for effect in dynamic_effects(bonus) {
        if effect.condition == TriggerCondition::Base {
            state.add(&bonus.id, &effect.condition, effect.increment);
        }
    }
}

/// Bumps every owned dynamic bonus listening to `synergy`, at most once per
/// bonus per round. Returns the IDs that were incremented.
pub fn record_synergy_trigger(
    unlocked: &UnlockedBonuses,
    state: &mut DynamicBonusState,
    catalog: &[BonusDefinition],
    synergy: &str,
    round: RoundKey,
) -> Vec<String> {
    let mut fired = Vec::new();
    for bonus in owned_dynamic(unlocked, catalog) {
        if state.last_synergy_trigger.get(&bonus.id) == Some(&round) {
            continue;
        }
        let mut bumped = false;
        for effect in dynamic_effects(bonus) {
            if matches!(&effect.condition, TriggerCondition::SynergyTrigger(name) if name == synergy) {
                state.add(&bonus.id, &effect.condition, effect.increment);
                bumped = true;
            }
        }
        if bumped {
            state.last_synergy_trigger.insert(bonus.id.clone(), round);
            fired.push(bonus.id.clone());
        }
    }
    fired
}

/// Bumps every owned dynamic bonus with an `end_of_combat` effect. Returns the IDs incremented.
pub fn record_end_of_combat(
    unlocked: &UnlockedBonuses,
    state: &mut DynamicBonusState,
    catalog: &[BonusDefinition],
) -> Vec<String> {
    let mut fired = Vec::new();
    for bonus in owned_dynamic(unlocked, catalog) {
        let mut bumped = false;
        for effect in dynamic_effects(bonus) {
            if effect.condition == TriggerCondition::EndOfCombat {
                state.add(&bonus.id, &effect.condition, effect.increment);
                bumped = true;
            }
        }
        if bumped {
            fired.push(bonus.id.clone());
        }
    }
    fired
}

fn owned_dynamic<'a>(
    unlocked: &'a UnlockedBonuses,
    catalog: &'a [BonusDefinition],
) -> impl Iterator<Item = &'a BonusDefinition> + 'a {
    unlocked
        .iter()
        .filter(|&(_, &count)| count > 0)
        .filter_map(move |(id, _)| catalog.iter().find(|b| &b.id == id))
        .filter(|bonus| bonus.is_dynamic())
}

fn position_multiplier(base: f64, per_extra_copy: f64, copies: u32) -> i64 {
    let extra = f64::from(copies.saturating_sub(1));
    (base + extra * per_extra_copy).ceil() as i64
}

fn resolve_one(bonus: &BonusDefinition, copies: u32, dynamic: &DynamicBonusState) -> Option<ResolvedBonus> {
    let base = ResolvedBonus {
        id: bonus.id.clone(),
        name: bonus.name.clone(),
        damage: 0,
        multiplier: 0,
        position_multiplier: None,
        target: bonus.target,
        is_position_bonus: false,
    };
    let copies_i = i64::from(copies);

    match &bonus.rule {
        BonusRule::Linear {
            damage_per_copy,
            multiplier_per_copy,
        } => {
            let damage = damage_per_copy * copies_i;
            let multiplier = multiplier_per_copy * copies_i;
            (damage != 0 || multiplier != 0).then_some(ResolvedBonus {
                damage,
                multiplier,
                ..base
            })
        }
        BonusRule::Position {
            base: start,
            per_extra_copy,
        } => Some(ResolvedBonus {
            position_multiplier: Some(position_multiplier(*start, *per_extra_copy, copies)),
            target: Target::FourthPosition,
            is_position_bonus: true,
            ..base
        }),
        BonusRule::Dynamic { effects } => {
            let mut damage = 0;
            let mut multiplier = 0;
            for effect in effects {
                let value = dynamic.effect_value(&bonus.id, effect);
                match effect.stat {
                    BonusStat::Damage => damage += value,
                    BonusStat::Multiplier => multiplier += value,
                }
            }
            (damage + multiplier > 0).then_some(ResolvedBonus {
                damage,
                multiplier,
                ..base
            })
        }
        BonusRule::None => None,
    }
}

/// Resolve unlocked bonuses into modifiers, in bonus-ID order.
pub fn resolve_bonuses(
    unlocked: &UnlockedBonuses,
    dynamic: &DynamicBonusState,
    catalog: &[BonusDefinition],
) -> Vec<ResolvedBonus> {
    let mut resolved = Vec::new();
    for (id, &copies) in unlocked {
        if copies == 0 {
            continue;
        }
        let Some(bonus) = catalog.iter().find(|b| &b.id == id) else {
            tracing::warn!(target: "combat.bonus", bonus_id = %id, "unknown bonus id, skipping");
            continue;
        };
        if let Some(entry) = resolve_one(bonus, copies, dynamic) {
            resolved.push(entry);
        }
    }
    resolved
}

/// The strongest position bonus, if any.
pub fn position_bonus(bonuses: &[ResolvedBonus]) -> Option<i64> {
    bonuses
        .iter()
        .filter(|b| b.is_position_bonus)
        .filter_map(|b| b.position_multiplier)
        .max()
}
