//! The player store. Every game flow goes through a `GameState` owned by the
//! caller; nothing here is global.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::combat::bonuses::{
    record_end_of_combat, record_synergy_trigger, register_dynamic_purchase, resolve_bonuses,
    DynamicBonusState, RoundKey, UnlockedBonuses,
};
use crate::combat::boss::{blocks_rerolls, BossContext};
use crate::combat::export_csv::TurnRecord;
use crate::combat::fusion::FusionMap;
use crate::combat::pool::{TroopInstance, TroopPools};
use crate::combat::rng::Rng;
use crate::combat::session::{CombatOutcome, CombatSession, MAX_REROLLS};
use crate::combat::synergy::{synergy_level, SynergyLevels};
use crate::combat::turn::{resolve_turn, TurnContext, TurnResult};
use crate::data::catalog::Catalog;
use crate::data::rank::Rank;
use crate::game::rejection::Rejection;
use crate::game::save::GameSnapshot;

/// A combat in progress: its session plus the troop pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCombat {
    pub session: CombatSession,
    pub pools: TroopPools,
}

/// What `play_turn` hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub result: TurnResult,
    pub outcome: CombatOutcome,
    /// Session state right after the turn was recorded.
    pub session: CombatSession,
    pub record: TurnRecord,
}

#[derive(Debug, Clone)]
pub struct GameState {
    catalog: Arc<Catalog>,
    rng: Rng,
    pub owned_units: BTreeMap<String, u32>,
    pub unlocked_bonuses: UnlockedBonuses,
    pub dynamic_bonuses: DynamicBonusState,
    pub synergy_levels: SynergyLevels,
    pub rank: Rank,
    pub combats_played: u32,
    pub combat: Option<ActiveCombat>,
}

impl GameState {
    /// New game: every catalog unit starts at its base quantity.
    pub fn new(catalog: Arc<Catalog>, rng: Rng) -> Self {
        let owned_units = catalog
            .units
            .iter()
            .filter(|u| u.base_quantity > 0)
            .map(|u| (u.name.clone(), u.base_quantity))
            .collect();
        Self {
            catalog,
            rng,
            owned_units,
            unlocked_bonuses: UnlockedBonuses::new(),
            dynamic_bonuses: DynamicBonusState::default(),
            synergy_levels: SynergyLevels::new(),
            rank: Rank::LOWEST,
            combats_played: 0,
            combat: None,
        }
    }

    pub fn from_snapshot(catalog: Arc<Catalog>, rng: Rng, snapshot: GameSnapshot) -> Self {
        let mut state = Self::new(catalog, rng);
        state.restore(snapshot);
        state
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            owned_units: self.owned_units.clone(),
            unlocked_bonuses: self.unlocked_bonuses.clone(),
            dynamic_bonuses: self.dynamic_bonuses.clone(),
            synergy_levels: self.synergy_levels.clone(),
            rank: self.rank,
            combats_played: self.combats_played,
            combat: self.combat.clone(),
        }
    }

    /// Replaces all persisted state. The catalog and RNG are kept.
    pub fn restore(&mut self, snapshot: GameSnapshot) {
        self.owned_units = snapshot.owned_units;
        self.unlocked_bonuses = snapshot.unlocked_bonuses;
        self.dynamic_bonuses = snapshot.dynamic_bonuses;
        self.synergy_levels = snapshot.synergy_levels;
        self.rank = snapshot.rank;
        self.combats_played = snapshot.combats_played;
        self.combat = snapshot.combat;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    pub fn combat(&self) -> Option<&ActiveCombat> {
        self.combat.as_ref()
    }

    pub fn owned_total(&self) -> u32 {
        self.owned_units.values().sum()
    }

    pub fn synergy_level(&self, name: &str) -> u32 {
        synergy_level(&self.synergy_levels, name)
    }

    // --- shop ---

    /// Adds one copy of a bonus. A repeat purchase of a dynamic bonus raises
    /// its base counters instead of its copy count. Returns the copy count.
    pub fn unlock_bonus(&mut self, id: &str) -> Result<u32, Rejection> {
        let bonus = self
            .catalog
            .bonus(id)
            .ok_or_else(|| Rejection::UnknownBonus { id: id.to_string() })?;
        let owned = self.unlocked_bonuses.get(id).copied().unwrap_or(0);

        if bonus.is_dynamic() {
            register_dynamic_purchase(&mut self.dynamic_bonuses, bonus, owned > 0);
            if owned > 0 {
                tracing::info!(target: "game.shop", bonus = %id, "dynamic bonus reinforced");
                return Ok(owned);
            }
        }

        let count = owned + 1;
        self.unlocked_bonuses.insert(id.to_string(), count);
        tracing::info!(target: "game.shop", bonus = %id, copies = count, "bonus unlocked");
        Ok(count)
    }

    /// Adds one owned copy. During a combat the new copy also joins the available pool.
    pub fn purchase_unit(&mut self, name: &str) -> Result<u32, Rejection> {
        let unit = self
            .catalog
            .unit(name)
            .cloned()
            .ok_or_else(|| Rejection::UnknownUnit {
                name: name.to_string(),
            })?;
        let count = self.owned_units.entry(unit.name.clone()).or_insert(0);
        *count += 1;
        let count = *count;

        if let Some(active) = self.combat.as_mut() {
            active.pools.add_available(TroopInstance {
                id: self.rng.uuid(),
                unit,
            });
        }
        tracing::info!(target: "game.shop", unit = %name, owned = count, "unit purchased");
        Ok(count)
    }

    /// Removes one copy of an owned bonus. Selling during a combat lifts the boss malus.
    pub fn sell_bonus(&mut self, id: &str) -> Result<u32, Rejection> {
        let owned = self.unlocked_bonuses.get(id).copied().unwrap_or(0);
        if owned == 0 {
            return Err(Rejection::BonusNotOwned { id: id.to_string() });
        }
        let remaining = owned - 1;
        if remaining == 0 {
            self.unlocked_bonuses.remove(id);
            self.dynamic_bonuses.forget(id);
        } else {
            self.unlocked_bonuses.insert(id.to_string(), remaining);
        }

        if let Some(active) = self.combat.as_mut() {
            if !active.session.malus_disabled {
                tracing::info!(target: "game.shop", bonus = %id, "boss malus disabled");
            }
            active.session.malus_disabled = true;
        }
        tracing::info!(target: "game.shop", bonus = %id, copies = remaining, "bonus sold");
        Ok(remaining)
    }

    // --- consumables ---

    pub fn upgrade_synergy(&mut self, name: &str) -> Result<u32, Rejection> {
        if self.catalog.synergy(name).is_none() {
            return Err(Rejection::UnknownSynergy {
                name: name.to_string(),
            });
        }
        let level = self.synergy_level(name) + 1;
        self.synergy_levels.insert(name.to_string(), level);
        tracing::info!(target: "game.shop", synergy = %name, level, "synergy upgraded");
        Ok(level)
    }

    /// Copies one owned unit. Consumables change owned counts only; the
    /// current combat's pools are left alone.
    pub fn duplicate_unit(&mut self, name: &str) -> Result<u32, Rejection> {
        self.require_unit(name)?;
        let count = self.owned_units.get(name).copied().unwrap_or(0);
        if count == 0 {
            return Err(Rejection::NotEnoughUnits {
                name: name.to_string(),
            });
        }
        self.owned_units.insert(name.to_string(), count + 1);
        Ok(count + 1)
    }

    pub fn transform_unit(&mut self, from: &str, to: &str) -> Result<(), Rejection> {
        if self.owned_total() == 0 {
            return Err(Rejection::NoUnitsOwned);
        }
        self.require_unit(from)?;
        self.require_unit(to)?;
        let count = self.owned_units.get(from).copied().unwrap_or(0);
        if count == 0 {
            return Err(Rejection::NotEnoughUnits {
                name: from.to_string(),
            });
        }
        if count == 1 {
            self.owned_units.remove(from);
        } else {
            self.owned_units.insert(from.to_string(), count - 1);
        }
        *self.owned_units.entry(to.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn require_unit(&self, name: &str) -> Result<(), Rejection> {
        match self.catalog.unit(name) {
            Some(_) => Ok(()),
            None => Err(Rejection::UnknownUnit {
                name: name.to_string(),
            }),
        }
    }

    // --- combat ---

    pub fn start_combat(&mut self) -> Result<&ActiveCombat, Rejection> {
        if self.combat.is_some() {
            return Err(Rejection::CombatAlreadyActive);
        }
        if self.owned_total() == 0 {
            return Err(Rejection::NoUnitsOwned);
        }

        let combat_index = self.combats_played + 1;
        let session = CombatSession::new(self.rank, &self.catalog, combat_index);
        let mut pools = TroopPools::from_owned(&self.owned_units, &self.catalog, &mut self.rng);
        if pools.available.is_empty() {
            return Err(Rejection::NoUnitsOwned);
        }
        pools.replenish(&mut self.rng);
        self.combats_played = combat_index;

        tracing::info!(
            target: "game.combat",
            combat = combat_index,
            rank = %session.rank,
            target_damage = session.target_damage,
            boss = session.boss_name.as_deref().unwrap_or("-"),
            "combat started"
        );
        Ok(self.combat.insert(ActiveCombat { session, pools }))
    }

    pub fn select(&mut self, id: Uuid) -> Result<(), Rejection> {
        self.active_mut()?.pools.select(id)
    }

    pub fn deselect(&mut self, id: Uuid) -> Result<(), Rejection> {
        self.active_mut()?.pools.deselect(id)
    }

    pub fn reroll(&mut self) -> Result<Vec<(Uuid, Uuid)>, Rejection> {
        let active = self.combat.as_mut().ok_or(Rejection::NoCombat)?;
        if blocks_rerolls(&active.session) {
            return Err(Rejection::RerollBlockedByBoss);
        }
        if active.session.reroll_count >= MAX_REROLLS {
            return Err(Rejection::RerollLimitReached);
        }
        let swaps = active.pools.reroll(&mut self.rng)?;
        active.session.reroll_count += 1;
        tracing::debug!(
            target: "combat.pool",
            swapped = swaps.len(),
            rerolls_left = active.session.rerolls_left(),
            "reroll"
        );
        Ok(swaps)
    }

    /// Resolves the selection, records the damage, fires dynamic triggers and
    /// either replenishes the pool or closes the combat.
    pub fn play_turn(&mut self) -> Result<TurnReport, Rejection> {
        let active = self.combat.as_mut().ok_or(Rejection::NoCombat)?;
        if active.pools.selected.is_empty() {
            return Err(Rejection::NothingSelected);
        }

        let bonuses = resolve_bonuses(
            &self.unlocked_bonuses,
            &self.dynamic_bonuses,
            &self.catalog.bonuses,
        );
        let fusion = FusionMap::from_unlocked(&self.unlocked_bonuses, &self.catalog.bonuses);
        let round = active.session.round;
        let result = {
            let ctx = TurnContext {
                bonuses: &bonuses,
                fusion: &fusion,
                synergies: &self.catalog.synergies,
                synergy_levels: &self.synergy_levels,
                boss: BossContext::from_session(&active.session),
            };
            resolve_turn(&mut active.pools, &ctx)
        };

        if let Some(synergy) = &result.synergy {
            let key = RoundKey {
                combat: active.session.combat_index,
                round,
            };
            record_synergy_trigger(
                &self.unlocked_bonuses,
                &mut self.dynamic_bonuses,
                &self.catalog.bonuses,
                &synergy.name,
                key,
            );
        }

        let mut outcome = active.session.record_turn(result.final_damage);
        if outcome == CombatOutcome::Ongoing {
            active.pools.replenish(&mut self.rng);
            if active.pools.combat_pool.is_empty() {
                tracing::info!(target: "game.combat", "no troops left to draw");
                active.session.round = round;
                active.session.is_active = false;
                outcome = CombatOutcome::Defeat;
            }
        }

        let session = active.session.clone();
        let record = TurnRecord::new(&session, round, &result, outcome);
        tracing::info!(
            target: "game.combat",
            combat = session.combat_index,
            round,
            damage = result.final_damage,
            total = session.total_damage,
            target_damage = session.target_damage,
            ?outcome,
            "turn played"
        );

        if outcome != CombatOutcome::Ongoing {
            self.finish_combat(outcome);
        }

        Ok(TurnReport {
            result,
            outcome,
            session,
            record,
        })
    }

    /// Drops the current combat without end-of-combat effects.
    pub fn abandon_combat(&mut self) -> Result<CombatSession, Rejection> {
        let active = self.combat.take().ok_or(Rejection::NoCombat)?;
        tracing::info!(target: "game.combat", combat = active.session.combat_index, "combat abandoned");
        Ok(active.session)
    }

    fn finish_combat(&mut self, outcome: CombatOutcome) {
        record_end_of_combat(
            &self.unlocked_bonuses,
            &mut self.dynamic_bonuses,
            &self.catalog.bonuses,
        );
        if outcome == CombatOutcome::Victory {
            if let Some(next) = self.rank.next() {
                tracing::info!(target: "game.combat", from = %self.rank, to = %next, "rank up");
                self.rank = next;
            }
        }
        self.combat = None;
    }

    fn active_mut(&mut self) -> Result<&mut ActiveCombat, Rejection> {
        self.combat.as_mut().ok_or(Rejection::NoCombat)
    }

    /// Runs `f` with the turn context the current combat would use.
    pub fn with_turn_context<R>(
        &self,
        f: impl FnOnce(&ActiveCombat, &TurnContext<'_>) -> R,
    ) -> Result<R, Rejection> {
        let active = self.combat.as_ref().ok_or(Rejection::NoCombat)?;
        let bonuses = resolve_bonuses(
            &self.unlocked_bonuses,
            &self.dynamic_bonuses,
            &self.catalog.bonuses,
        );
        let fusion = FusionMap::from_unlocked(&self.unlocked_bonuses, &self.catalog.bonuses);
        let ctx = TurnContext {
            bonuses: &bonuses,
            fusion: &fusion,
            synergies: &self.catalog.synergies,
            synergy_levels: &self.synergy_levels,
            boss: BossContext::from_session(&active.session),
        };
        Ok(f(active, &ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::pool::COMBAT_POOL_SIZE;

    fn game(seed: u64) -> GameState {
        GameState::new(Arc::new(Catalog::builtin()), Rng::new(seed))
    }

    fn select_first(state: &mut GameState, n: usize) -> Vec<Uuid> {
        let ids: Vec<Uuid> = state
            .combat()
            .expect("combat")
            .pools
            .combat_pool
            .iter()
            .take(n)
            .map(|t| t.id)
            .collect();
        for &id in &ids {
            state.select(id).expect("select");
        }
        ids
    }

    #[test]
    fn new_game_owns_base_quantities() {
        let state = game(1);
        assert_eq!(state.owned_units.get("Épéiste"), Some(&5));
        assert!(!state.owned_units.contains_key("Dragonnier"));
        assert_eq!(state.owned_total(), 20);
    }

    #[test]
    fn start_combat_draws_seven() {
        let mut state = game(1);
        let active = state.start_combat().expect("start");
        assert_eq!(active.pools.combat_pool.len(), COMBAT_POOL_SIZE);
        assert_eq!(active.pools.total_instances(), 20);
        assert_eq!(state.start_combat().map(|_| ()), Err(Rejection::CombatAlreadyActive));
    }

    #[test]
    fn play_turn_requires_selection() {
        let mut state = game(2);
        assert_eq!(state.play_turn().map(|_| ()), Err(Rejection::NoCombat));
        state.start_combat().expect("start");
        assert_eq!(state.play_turn().map(|_| ()), Err(Rejection::NothingSelected));
    }

    #[test]
    fn turn_retires_selection_and_replenishes() {
        let mut state = game(3);
        state.start_combat().expect("start");
        let ids = select_first(&mut state, 2);
        let report = state.play_turn().expect("turn");
        if report.outcome == CombatOutcome::Ongoing {
            let active = state.combat().expect("combat");
            for id in ids {
                assert!(active.pools.is_used(id));
                assert!(!active.pools.in_combat_pool(id));
            }
            assert_eq!(active.pools.combat_pool.len(), COMBAT_POOL_SIZE);
            assert_eq!(active.session.round, 2);
        }
    }

    #[test]
    fn victory_advances_rank_and_clears_combat() {
        let mut state = game(4);
        state.start_combat().expect("start");
        select_first(&mut state, 5);
        // Five base units deal well over the 40 needed at F-.
        let report = state.play_turn().expect("turn");
        assert_eq!(report.outcome, CombatOutcome::Victory);
        assert!(state.combat().is_none());
        assert_eq!(state.rank.label(), "F");
    }

    #[test]
    fn reroll_cap_and_state_preserved() {
        let mut state = game(5);
        state.start_combat().expect("start");
        for _ in 0..MAX_REROLLS {
            select_first(&mut state, 1);
            state.reroll().expect("reroll");
        }
        select_first(&mut state, 1);
        let before = state.snapshot();
        assert_eq!(state.reroll(), Err(Rejection::RerollLimitReached));
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn sell_bonus_lifts_malus_only_in_combat() {
        let mut state = game(6);
        state.unlock_bonus("force_brute").expect("unlock");
        state.unlock_bonus("force_brute").expect("unlock");
        state.start_combat().expect("start");
        assert_eq!(state.sell_bonus("force_brute"), Ok(1));
        assert!(state.combat().expect("combat").session.malus_disabled);
        assert_eq!(
            state.sell_bonus("arc_long"),
            Err(Rejection::BonusNotOwned {
                id: "arc_long".to_string()
            })
        );
    }

    #[test]
    fn dynamic_repeat_purchase_bumps_base_counter() {
        let mut state = game(7);
        assert_eq!(state.unlock_bonus("cac_cest_la_vie"), Ok(1));
        assert_eq!(state.unlock_bonus("cac_cest_la_vie"), Ok(1));
        assert_eq!(
            state.dynamic_bonuses.counter("cac_cest_la_vie", &crate::data::bonus::TriggerCondition::Base),
            2
        );
    }

    #[test]
    fn purchase_during_combat_adds_available_instance() {
        let mut state = game(8);
        state.start_combat().expect("start");
        state.purchase_unit("Dragonnier").expect("buy");
        let active = state.combat().expect("combat");
        assert_eq!(active.pools.total_instances(), 21);
        assert_eq!(state.owned_units.get("Dragonnier"), Some(&1));
        assert_eq!(
            state.purchase_unit("Licorne"),
            Err(Rejection::UnknownUnit {
                name: "Licorne".to_string()
            })
        );
    }

    #[test]
    fn consumables_edit_owned_counts() {
        let mut state = game(9);
        assert_eq!(state.upgrade_synergy("Duo"), Ok(2));
        assert_eq!(state.upgrade_synergy("Duo"), Ok(3));
        assert!(matches!(state.upgrade_synergy("Quintette"), Err(Rejection::UnknownSynergy { .. })));

        assert_eq!(state.duplicate_unit("Paladin"), Ok(2));
        assert!(matches!(state.duplicate_unit("Assassin"), Err(Rejection::NotEnoughUnits { .. })));

        state.transform_unit("Chaman", "Assassin").expect("transform");
        assert!(!state.owned_units.contains_key("Chaman"));
        assert_eq!(state.owned_units.get("Assassin"), Some(&1));
    }

    #[test]
    fn no_units_blocks_combat() {
        let mut state = game(10);
        state.owned_units.clear();
        assert_eq!(state.start_combat().map(|_| ()), Err(Rejection::NoUnitsOwned));
        assert_eq!(state.transform_unit("Mage", "Archer"), Err(Rejection::NoUnitsOwned));
    }

    #[test]
    fn abandon_returns_session() {
        let mut state = game(11);
        state.start_combat().expect("start");
        let session = state.abandon_combat().expect("abandon");
        assert_eq!(session.combat_index, 1);
        assert!(state.combat().is_none());
        assert_eq!(state.abandon_combat(), Err(Rejection::NoCombat));
    }
}
