use serde::Serialize;
use uuid::Uuid;

use crate::combat::pool::{TroopInstance, MAX_SELECTED};
use crate::combat::stats::POSITION_BONUS_SLOT;

/// Troop IDs in slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquadCandidate {
    pub troop_ids: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct SquadStrategy {
    pub max_size: usize,
    /// When None, every subset is produced. Larger squads are generated first.
    pub max_candidates: Option<usize>,
    /// Try each member of a 4+ squad in the position-bonus slot.
    pub rotate_position_slot: bool,
}

impl Default for SquadStrategy {
    fn default() -> Self {
        Self {
            max_size: MAX_SELECTED,
            max_candidates: Some(512),
            rotate_position_slot: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SquadGenerator {
    strategy: SquadStrategy,
}

impl SquadGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: SquadStrategy) -> Self {
        Self { strategy }
    }

    pub fn generate_candidates(&self, pool: &[TroopInstance]) -> Vec<SquadCandidate> {
        let cap = self.strategy.max_candidates.unwrap_or(usize::MAX);
        let max_size = self.strategy.max_size.min(MAX_SELECTED).min(pool.len());
        let mut candidates = Vec::new();

        for size in (1..=max_size).rev() {
            for subset in combinations(pool.len(), size) {
                let ids: Vec<Uuid> = subset.iter().map(|&i| pool[i].id).collect();
                for ordering in slot_orderings(&ids, self.strategy.rotate_position_slot) {
                    if candidates.len() >= cap {
                        return candidates;
                    }
                    candidates.push(SquadCandidate { troop_ids: ordering });
                }
            }
        }
        candidates
    }
}

/// Orderings of one subset: the subset as-is, plus (when rotating and large
/// enough) one ordering per member placed in the position-bonus slot.
fn slot_orderings(ids: &[Uuid], rotate: bool) -> Vec<Vec<Uuid>> {
    if !rotate || ids.len() <= POSITION_BONUS_SLOT {
        return vec![ids.to_vec()];
    }
    (0..ids.len())
        .map(|pick| {
            let mut ordering: Vec<Uuid> = ids
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != pick)
                .map(|(_, &id)| id)
                .collect();
            ordering.insert(POSITION_BONUS_SLOT, ids[pick]);
            ordering
        })
        .collect()
}

/// Index combinations of `k` out of `n`, in lexicographic order.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 || k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        out.push(indices.clone());
        // Rightmost index that can still move.
        let Some(i) = (0..k).rev().find(|&i| indices[i] != i + n - k) else {
            return out;
        };
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::unit::{UnitDefinition, UnitTag};

    fn pool(n: usize) -> Vec<TroopInstance> {
        (0..n)
            .map(|i| TroopInstance {
                id: Uuid::from_u128(i as u128 + 1),
                unit: UnitDefinition::new("Archer", "", 4, 1, &[UnitTag::Distance]),
            })
            .collect()
    }

    #[test]
    fn combinations_count() {
        assert_eq!(combinations(7, 5).len(), 21);
        assert_eq!(combinations(7, 3).len(), 35);
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert!(combinations(2, 3).is_empty());
    }

    #[test]
    fn full_pool_enumeration_with_rotation() {
        let generator = SquadGenerator::with_strategy(SquadStrategy {
            max_candidates: None,
            ..SquadStrategy::default()
        });
        let candidates = generator.generate_candidates(&pool(7));
        // 21×5 + 35×4 + 35 + 21 + 7
        assert_eq!(candidates.len(), 308);
        assert_eq!(candidates[0].troop_ids.len(), 5);
        assert_eq!(candidates.last().map(|c| c.troop_ids.len()), Some(1));
    }

    #[test]
    fn rotation_places_each_member_in_fourth_slot() {
        let ids: Vec<Uuid> = (1..=4).map(Uuid::from_u128).collect();
        let orderings = slot_orderings(&ids, true);
        assert_eq!(orderings.len(), 4);
        let fourth: Vec<Uuid> = orderings.iter().map(|o| o[POSITION_BONUS_SLOT]).collect();
        assert_eq!(fourth, ids);
    }

    #[test]
    fn cap_truncates() {
        let generator = SquadGenerator::with_strategy(SquadStrategy {
            max_candidates: Some(10),
            ..SquadStrategy::default()
        });
        assert_eq!(generator.generate_candidates(&pool(7)).len(), 10);
        assert!(generator.generate_candidates(&[]).is_empty());
    }
}
