//! Troop pools for one combat.
//!
//! Every instance lives in exactly one of `available`, `combat_pool` or
//! `used`. `selected` holds IDs of combat-pool instances, in slot order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::combat::rng::Rng;
use crate::data::catalog::Catalog;
use crate::data::unit::UnitDefinition;
use crate::game::rejection::Rejection;

pub const COMBAT_POOL_SIZE: usize = 7;
pub const MAX_SELECTED: usize = 5;

/// One concrete copy of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroopInstance {
    pub id: Uuid,
    pub unit: UnitDefinition,
}

/// Where an instance sits in its combat lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TroopState {
    Available,
    InCombatPool,
    Selected,
    UsedThisCombat,
}

/// A broken pool invariant, reported when pools come from outside the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    CombatPoolTooLarge(usize),
    TooManySelected(usize),
    SelectedNotInCombatPool(Uuid),
    DuplicateSelection(Uuid),
    DuplicateInstance(Uuid),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CombatPoolTooLarge(n) => {
                write!(f, "combat pool holds {n} troops (max {COMBAT_POOL_SIZE})")
            }
            Self::TooManySelected(n) => write!(f, "{n} troops selected (max {MAX_SELECTED})"),
            Self::SelectedNotInCombatPool(id) => {
                write!(f, "selected troop {id} is not in the combat pool")
            }
            Self::DuplicateSelection(id) => write!(f, "troop {id} is selected twice"),
            Self::DuplicateInstance(id) => write!(f, "troop instance id {id} appears twice"),
        }
    }
}

impl std::error::Error for PoolError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroopPools {
    pub available: Vec<TroopInstance>,
    pub combat_pool: Vec<TroopInstance>,
    pub selected: Vec<Uuid>,
    pub used: Vec<TroopInstance>,
}

impl TroopPools {
    /// Fresh instances for every owned copy. Names missing from the catalog are skipped.
    pub fn from_owned(owned: &BTreeMap<String, u32>, catalog: &Catalog, rng: &mut Rng) -> Self {
        let mut available = Vec::new();
        for (name, &count) in owned {
            let Some(unit) = catalog.unit(name) else {
                tracing::warn!(target: "combat.pool", unit = %name, "owned unit missing from catalog, skipping");
                continue;
            };
            for _ in 0..count {
                available.push(TroopInstance {
                    id: rng.uuid(),
                    unit: unit.clone(),
                });
            }
        }
        let pools = Self {
            available,
            ..Self::default()
        };
        pools.debug_assert_unique_ids();
        pools
    }

    /// Draws uniformly without replacement from `available` until the combat
    /// pool holds [`COMBAT_POOL_SIZE`] instances or nothing is left. Returns the count drawn.
    pub fn replenish(&mut self, rng: &mut Rng) -> usize {
        let mut drawn = 0;
        while self.combat_pool.len() < COMBAT_POOL_SIZE && !self.available.is_empty() {
            let pick = rng.index(self.available.len());
            self.combat_pool.push(self.available.swap_remove(pick));
            drawn += 1;
        }
        drawn
    }

    pub fn total_instances(&self) -> usize {
        self.available.len() + self.combat_pool.len() + self.used.len()
    }

    pub fn is_used(&self, id: Uuid) -> bool {
        self.used.iter().any(|t| t.id == id)
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected.contains(&id)
    }

    pub fn in_combat_pool(&self, id: Uuid) -> bool {
        self.combat_pool.iter().any(|t| t.id == id)
    }

    pub fn state_of(&self, id: Uuid) -> Option<TroopState> {
        if self.is_used(id) {
            Some(TroopState::UsedThisCombat)
        } else if self.is_selected(id) {
            Some(TroopState::Selected)
        } else if self.in_combat_pool(id) {
            Some(TroopState::InCombatPool)
        } else if self.available.iter().any(|t| t.id == id) {
            Some(TroopState::Available)
        } else {
            None
        }
    }

    /// Looks an instance up in the live pools. Used instances are not returned.
    pub fn find(&self, id: Uuid) -> Option<&TroopInstance> {
        self.combat_pool
            .iter()
            .chain(self.available.iter())
            .find(|t| t.id == id)
    }

    pub fn selected_instances(&self) -> Vec<&TroopInstance> {
        self.selected.iter().filter_map(|&id| self.find(id)).collect()
    }

    pub fn add_available(&mut self, instance: TroopInstance) {
        self.available.push(instance);
        self.debug_assert_unique_ids();
    }

    pub fn select(&mut self, id: Uuid) -> Result<(), Rejection> {
        if self.is_used(id) {
            return Err(Rejection::AlreadyUsed { id });
        }
        if self.is_selected(id) {
            return Err(Rejection::AlreadySelected { id });
        }
        if !self.in_combat_pool(id) {
            return Err(Rejection::NotInCombatPool { id });
        }
        if self.selected.len() >= MAX_SELECTED {
            return Err(Rejection::TooManySelected);
        }
        self.selected.push(id);
        Ok(())
    }

    pub fn deselect(&mut self, id: Uuid) -> Result<(), Rejection> {
        let Some(position) = self.selected.iter().position(|&s| s == id) else {
            return Err(Rejection::NotSelected { id });
        };
        self.selected.remove(position);
        Ok(())
    }

    /// Swaps every selected, unused combat-pool instance for a random available
    /// one. Replacements take the same slots; the old instances go back to
    /// `available` only after all draws, so none is redrawn in the same reroll.
    /// Clears the selection. Returns `(old, new)` ID pairs.
    pub fn reroll(&mut self, rng: &mut Rng) -> Result<Vec<(Uuid, Uuid)>, Rejection> {
        let eligible: Vec<usize> = self
            .selected
            .iter()
            .filter_map(|&id| self.combat_pool.iter().position(|t| t.id == id))
            .collect();
        if eligible.is_empty() || self.available.is_empty() {
            return Err(Rejection::NoRerollEligible);
        }

        let mut returned = Vec::with_capacity(eligible.len());
        let mut swaps = Vec::with_capacity(eligible.len());
        for slot in eligible {
            if self.available.is_empty() {
                break;
            }
            let pick = rng.index(self.available.len());
            let incoming = self.available.swap_remove(pick);
            let outgoing = std::mem::replace(&mut self.combat_pool[slot], incoming);
            swaps.push((outgoing.id, self.combat_pool[slot].id));
            returned.push(outgoing);
        }
        self.available.extend(returned);
        self.selected.clear();
        self.debug_assert_unique_ids();
        Ok(swaps)
    }

    /// Moves the given instances out of the live pools and the selection into
    /// `used`. Unknown or already-used IDs are ignored.
    pub fn retire(&mut self, ids: &[Uuid]) {
        for &id in ids {
            self.selected.retain(|&s| s != id);
            if let Some(position) = self.combat_pool.iter().position(|t| t.id == id) {
                let troop = self.combat_pool.remove(position);
                self.used.push(troop);
            } else if let Some(position) = self.available.iter().position(|t| t.id == id) {
                let troop = self.available.swap_remove(position);
                self.used.push(troop);
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Checks the invariants `select`, `reroll` and `replenish` maintain.
    pub fn check(&self) -> Result<(), PoolError> {
        if self.combat_pool.len() > COMBAT_POOL_SIZE {
            return Err(PoolError::CombatPoolTooLarge(self.combat_pool.len()));
        }
        if self.selected.len() > MAX_SELECTED {
            return Err(PoolError::TooManySelected(self.selected.len()));
        }

        let mut seen = BTreeSet::new();
        for troop in self.available.iter().chain(&self.combat_pool).chain(&self.used) {
            if !seen.insert(troop.id) {
                return Err(PoolError::DuplicateInstance(troop.id));
            }
        }

        let mut picked = BTreeSet::new();
        for &id in &self.selected {
            if !self.in_combat_pool(id) {
                return Err(PoolError::SelectedNotInCombatPool(id));
            }
            if !picked.insert(id) {
                return Err(PoolError::DuplicateSelection(id));
            }
        }
        Ok(())
    }

    fn debug_assert_unique_ids(&self) {
        if cfg!(debug_assertions) {
            let mut ids: Vec<Uuid> = self
                .available
                .iter()
                .chain(&self.combat_pool)
                .chain(&self.used)
                .map(|t| t.id)
                .collect();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            debug_assert_eq!(ids.len(), total, "duplicate troop instance id");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pools_with(count: u32, seed: u64) -> (TroopPools, Rng) {
        let mut rng = Rng::new(seed);
        let owned = BTreeMap::from([
            ("Épéiste".to_string(), count),
            ("Archer".to_string(), count),
        ]);
        let pools = TroopPools::from_owned(&owned, &Catalog::builtin(), &mut rng);
        (pools, rng)
    }

    #[test]
    fn check_catches_hand_edited_pools() {
        let (mut pools, mut rng) = pools_with(5, 4);
        pools.replenish(&mut rng);
        assert_eq!(pools.check(), Ok(()));

        let mut oversized = pools.clone();
        oversized.selected = oversized.combat_pool.iter().map(|t| t.id).collect();
        assert_eq!(oversized.check(), Err(PoolError::TooManySelected(COMBAT_POOL_SIZE)));

        let mut stray = pools.clone();
        let outsider = stray.available[0].id;
        stray.selected = vec![outsider];
        assert_eq!(stray.check(), Err(PoolError::SelectedNotInCombatPool(outsider)));

        let mut twice = pools.clone();
        let first = twice.combat_pool[0].id;
        twice.selected = vec![first, first];
        assert_eq!(twice.check(), Err(PoolError::DuplicateSelection(first)));

        let mut cloned = pools.clone();
        let copy = cloned.combat_pool[0].clone();
        cloned.used.push(copy.clone());
        assert_eq!(cloned.check(), Err(PoolError::DuplicateInstance(copy.id)));

        let mut crowded = pools;
        let extra = crowded.available.remove(0);
        crowded.combat_pool.push(extra);
        assert_eq!(crowded.check(), Err(PoolError::CombatPoolTooLarge(COMBAT_POOL_SIZE + 1)));
    }

    #[test]
    fn draw_fills_to_seven_or_exhausts() {
        let (mut pools, mut rng) = pools_with(5, 1);
        assert_eq!(pools.replenish(&mut rng), COMBAT_POOL_SIZE);
        assert_eq!(pools.available.len(), 3);

        let (mut small, mut rng) = pools_with(2, 1);
        assert_eq!(small.replenish(&mut rng), 4);
        assert!(small.available.is_empty());
    }

    #[test]
    fn same_seed_same_draw() {
        let (mut a, mut rng_a) = pools_with(5, 42);
        let (mut b, mut rng_b) = pools_with(5, 42);
        a.replenish(&mut rng_a);
        b.replenish(&mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn select_rules() {
        let (mut pools, mut rng) = pools_with(5, 3);
        pools.replenish(&mut rng);
        let ids: Vec<Uuid> = pools.combat_pool.iter().map(|t| t.id).collect();

        for &id in &ids[..MAX_SELECTED] {
            pools.select(id).expect("select");
        }
        assert_eq!(pools.select(ids[0]), Err(Rejection::AlreadySelected { id: ids[0] }));
        assert_eq!(pools.select(ids[5]), Err(Rejection::TooManySelected));

        let outsider = pools.available[0].id;
        assert_eq!(pools.state_of(outsider), Some(TroopState::Available));
        assert_eq!(pools.state_of(ids[0]), Some(TroopState::Selected));
        assert_eq!(pools.state_of(Uuid::nil()), None);
        pools.deselect(ids[0]).expect("deselect");
        assert_eq!(pools.state_of(ids[0]), Some(TroopState::InCombatPool));
        assert_eq!(pools.select(outsider), Err(Rejection::NotInCombatPool { id: outsider }));
        assert!(pools.in_combat_pool(ids[0]));
        assert_eq!(pools.deselect(ids[0]), Err(Rejection::NotSelected { id: ids[0] }));
    }

    #[test]
    fn reroll_swaps_in_place_and_clears_selection() {
        let (mut pools, mut rng) = pools_with(5, 9);
        pools.replenish(&mut rng);
        let before = pools.total_instances();
        let first = pools.combat_pool[0].id;
        let second = pools.combat_pool[1].id;
        pools.select(first).expect("select");
        pools.select(second).expect("select");

        let swaps = pools.reroll(&mut rng).expect("reroll");
        assert_eq!(swaps.len(), 2);
        assert_eq!(swaps[0].0, first);
        assert_eq!(pools.combat_pool[0].id, swaps[0].1);
        assert!(pools.available.iter().any(|t| t.id == first));
        assert!(pools.selected.is_empty());
        assert_eq!(pools.combat_pool.len(), COMBAT_POOL_SIZE);
        assert_eq!(pools.total_instances(), before);
    }

    #[test]
    fn reroll_without_selection_is_rejected() {
        let (mut pools, mut rng) = pools_with(5, 9);
        pools.replenish(&mut rng);
        let snapshot = pools.clone();
        assert_eq!(pools.reroll(&mut rng), Err(Rejection::NoRerollEligible));
        assert_eq!(pools, snapshot);
    }

    #[test]
    fn retired_troops_cannot_be_selected_again() {
        let (mut pools, mut rng) = pools_with(5, 5);
        pools.replenish(&mut rng);
        let id = pools.combat_pool[2].id;
        pools.select(id).expect("select");
        pools.retire(&[id]);
        assert!(pools.is_used(id));
        assert!(!pools.is_selected(id));
        assert!(!pools.in_combat_pool(id));
        assert_eq!(pools.select(id), Err(Rejection::AlreadyUsed { id }));
        assert_eq!(pools.state_of(id), Some(TroopState::UsedThisCombat));
        assert_eq!(pools.total_instances(), 10);
    }

    #[test]
    fn unknown_owned_unit_is_skipped() {
        let mut rng = Rng::new(0);
        let owned = BTreeMap::from([("Fantôme".to_string(), 3), ("Mage".to_string(), 1)]);
        let pools = TroopPools::from_owned(&owned, &Catalog::builtin(), &mut rng);
        assert_eq!(pools.available.len(), 1);
    }
}
