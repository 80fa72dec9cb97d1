use serde::Serialize;
use uuid::Uuid;

use crate::combat::pool::TroopInstance;
use crate::combat::turn::{preview_turn, TurnContext};
use crate::optimizer::squad_generator::SquadCandidate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedSquad {
    pub troop_ids: Vec<Uuid>,
    pub units: Vec<String>,
    pub projected_damage: i64,
    pub total_damage: i64,
    pub total_multiplier: i64,
    pub synergy: Option<String>,
}

/// Previews every candidate against `pool` and sorts by projected damage,
/// then by fewer units. Candidates naming IDs outside `pool` are dropped.
pub fn rank_squads(
    pool: &[TroopInstance],
    candidates: &[SquadCandidate],
    ctx: &TurnContext<'_>,
) -> Vec<RankedSquad> {
    let mut ranked: Vec<RankedSquad> = candidates
        .iter()
        .filter_map(|candidate| {
            let squad: Option<Vec<&TroopInstance>> = candidate
                .troop_ids
                .iter()
                .map(|id| pool.iter().find(|t| t.id == *id))
                .collect();
            let squad = squad?;
            let preview = preview_turn(&squad, ctx);
            Some(RankedSquad {
                troop_ids: candidate.troop_ids.clone(),
                units: squad.iter().map(|t| t.unit.name.clone()).collect(),
                projected_damage: preview.final_damage,
                total_damage: preview.total_damage,
                total_multiplier: preview.total_multiplier,
                synergy: preview.synergy.map(|s| s.name),
            })
        })
        .collect();

    ranked.sort_by(|left, right| {
        right
            .projected_damage
            .cmp(&left.projected_damage)
            .then_with(|| left.troop_ids.len().cmp(&right.troop_ids.len()))
    });
    ranked
}

/// Fewest troops that still reach `remaining`, else the strongest squad.
pub fn choose_squad(ranked: &[RankedSquad], remaining: i64) -> Option<&RankedSquad> {
    ranked
        .iter()
        .filter(|squad| squad.projected_damage >= remaining)
        .min_by(|left, right| {
            left.troop_ids
                .len()
                .cmp(&right.troop_ids.len())
                .then_with(|| right.projected_damage.cmp(&left.projected_damage))
        })
        .or_else(|| ranked.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::boss::BossContext;
    use crate::combat::fusion::FusionMap;
    use crate::combat::synergy::SynergyLevels;
    use crate::data::catalog::Catalog;
    use crate::optimizer::squad_generator::SquadGenerator;

    fn troops(catalog: &Catalog, names: &[&str]) -> Vec<TroopInstance> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| TroopInstance {
                id: Uuid::from_u128(i as u128 + 1),
                unit: catalog.unit(name).expect("unit").clone(),
            })
            .collect()
    }

    #[test]
    fn best_squad_first_and_ties_prefer_fewer_units() {
        let catalog = Catalog::builtin();
        let pool = troops(&catalog, &["Épéiste", "Épéiste", "Épéiste", "Archer", "Archer", "Mage", "Prêtre"]);
        let fusion = FusionMap::default();
        let levels = SynergyLevels::new();
        let ctx = TurnContext {
            bonuses: &[],
            fusion: &fusion,
            synergies: &catalog.synergies,
            synergy_levels: &levels,
            boss: BossContext::NONE,
        };
        let candidates = SquadGenerator::new().generate_candidates(&pool);
        let ranked = rank_squads(&pool, &candidates, &ctx);
        assert_eq!(ranked.len(), candidates.len());
        for pair in ranked.windows(2) {
            assert!(pair[0].projected_damage >= pair[1].projected_damage);
            if pair[0].projected_damage == pair[1].projected_damage {
                assert!(pair[0].troop_ids.len() <= pair[1].troop_ids.len());
            }
        }
        assert_eq!(ranked[0].troop_ids.len(), 5);
    }

    #[test]
    fn choose_prefers_smallest_squad_that_finishes() {
        let squad = |n: usize, damage: i64| RankedSquad {
            troop_ids: (0..n).map(|i| Uuid::from_u128(i as u128)).collect(),
            units: Vec::new(),
            projected_damage: damage,
            total_damage: 0,
            total_multiplier: 0,
            synergy: None,
        };
        let ranked = vec![squad(5, 300), squad(3, 120), squad(2, 50)];
        assert_eq!(choose_squad(&ranked, 100).map(|s| s.troop_ids.len()), Some(3));
        assert_eq!(choose_squad(&ranked, 1000).map(|s| s.projected_damage), Some(300));
        assert!(choose_squad(&[], 10).is_none());
    }
}
