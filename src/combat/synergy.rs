//! Synergy selection: at most one synergy per turn, highest priority wins,
//! first-declared wins ties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::fusion::FusionMap;
use crate::data::synergy::{
    ElementCount, Requirement, SynergyBonusKind, SynergyDefinition, TagCount,
};
use crate::data::target::Target;
use crate::data::unit::{Element, UnitDefinition, UnitTag};

/// Synergy name -> upgrade level (>= 1).
pub type SynergyLevels = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSynergy {
    pub name: String,
    pub level: u32,
    pub damage: i64,
    pub multiplier: i64,
    pub target: Target,
    pub priority: i32,
}

/// Tag and element counts over a squad. Element counts are keyed by fusion canonical element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquadComposition {
    pub type_counts: BTreeMap<UnitTag, u32>,
    pub element_counts: BTreeMap<Element, u32>,
}

impl SquadComposition {
    pub fn of<'a>(squad: impl IntoIterator<Item = &'a UnitDefinition>, fusion: &FusionMap) -> Self {
        let mut composition = Self::default();
        for unit in squad {
            for tag in unit.tags.iter() {
                *composition.type_counts.entry(tag).or_insert(0) += 1;
            }
            if let Some(element) = unit.element {
                *composition
                    .element_counts
                    .entry(fusion.canonical(element))
                    .or_insert(0) += 1;
            }
        }
        composition
    }

    fn tag(&self, tag: UnitTag) -> u32 {
        self.type_counts.get(&tag).copied().unwrap_or(0)
    }

    fn element(&self, element: Element, fusion: &FusionMap) -> u32 {
        self.element_counts
            .get(&fusion.canonical(element))
            .copied()
            .unwrap_or(0)
    }
}

pub fn is_satisfied(requirement: &Requirement, composition: &SquadComposition, fusion: &FusionMap) -> bool {
    let types_met = |counts: &[TagCount]| {
        counts.iter().all(|c| composition.tag(c.tag) >= c.count)
    };
    let elements_met = |counts: &[ElementCount]| {
        counts
            .iter()
            .all(|c| composition.element(c.element, fusion) >= c.count)
    };

    match requirement {
        Requirement::Types { counts } => types_met(counts),
        Requirement::Elements { counts } => elements_met(counts),
        Requirement::Mixed { types, elements } => types_met(types) && elements_met(elements),
        Requirement::AnyType { count } => composition.type_counts.values().any(|n| n >= count),
        Requirement::AnyElement { count } => composition.element_counts.values().any(|n| n >= count),
    }
}

pub fn synergy_level(levels: &SynergyLevels, name: &str) -> u32 {
    levels.get(name).copied().unwrap_or(1).max(1)
}

/// Magnitude at `level`: `base + (level - 1)` for each scaling value; `fixed` ignores level.
pub fn calculate_synergy_bonus(synergy: &SynergyDefinition, level: u32) -> (i64, i64) {
    let scale = i64::from(level.max(1) - 1);
    match synergy.bonus_type {
        SynergyBonusKind::Multiplier => (0, synergy.base_multiplier + scale),
        SynergyBonusKind::Damage => (synergy.base_damage + scale, 0),
        SynergyBonusKind::Mixed => (
            synergy.base_damage + scale,
            synergy.base_multiplier + scale,
        ),
        SynergyBonusKind::Fixed => (synergy.base_damage, synergy.base_multiplier),
    }
}

pub fn select_active_synergy<'a>(
    squad: impl IntoIterator<Item = &'a UnitDefinition>,
    synergies: &[SynergyDefinition],
    levels: &SynergyLevels,
    fusion: &FusionMap,
) -> Option<ResolvedSynergy> {
    let composition = SquadComposition::of(squad, fusion);
    if composition.type_counts.is_empty() {
        return None;
    }

    let mut best: Option<&SynergyDefinition> = None;
    for synergy in synergies {
        if !is_satisfied(&synergy.requirement, &composition, fusion) {
            continue;
        }
        // Strictly greater: equal priority keeps the earlier declaration.
        if best.map_or(true, |current| synergy.priority > current.priority) {
            best = Some(synergy);
        }
    }

    best.map(|synergy| {
        let level = synergy_level(levels, &synergy.name);
        let (damage, multiplier) = calculate_synergy_bonus(synergy, level);
        ResolvedSynergy {
            name: synergy.name.clone(),
            level,
            damage,
            multiplier,
            target: synergy.target,
            priority: synergy.priority,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synergy::{builtin_synergies, TagCount};
    use crate::data::unit::UnitTag::*;

    fn unit(name: &str, tags: &[UnitTag], element: Option<Element>) -> UnitDefinition {
        let mut def = UnitDefinition::new(name, "", 1, 1, tags);
        def.element = element;
        def
    }

    fn custom(name: &str, tag: UnitTag, priority: i32) -> SynergyDefinition {
        SynergyDefinition {
            name: name.to_string(),
            description: String::new(),
            requirement: Requirement::Types {
                counts: vec![TagCount { tag, count: 1 }],
            },
            bonus_type: SynergyBonusKind::Damage,
            base_damage: 1,
            base_multiplier: 0,
            target: Target::All,
            priority,
        }
    }

    #[test]
    fn equal_priority_keeps_first_declared() {
        let synergies = vec![
            custom("Premier", Distance, 3),
            custom("Second", Distance, 3),
            custom("Faible", Distance, 1),
        ];
        let squad = [unit("Archer", &[Distance], None)];
        let active = select_active_synergy(&squad, &synergies, &SynergyLevels::new(), &FusionMap::default())
            .expect("synergy");
        assert_eq!(active.name, "Premier");
    }

    #[test]
    fn strictly_higher_priority_wins_regardless_of_order() {
        let synergies = vec![custom("Bas", Distance, 1), custom("Haut", Distance, 9)];
        let squad = [unit("Archer", &[Distance], None)];
        let active = select_active_synergy(&squad, &synergies, &SynergyLevels::new(), &FusionMap::default())
            .expect("synergy");
        assert_eq!(active.name, "Haut");
    }

    #[test]
    fn wildcard_forms_detect_duo_and_triplette() {
        let synergies = builtin_synergies();
        let levels = SynergyLevels::new();
        let fusion = FusionMap::default();

        let duo = [unit("A", &[Physique], None), unit("B", &[Physique], None)];
        let active = select_active_synergy(&duo, &synergies, &levels, &fusion).expect("duo");
        assert_eq!(active.name, "Duo");

        let triplette = [
            unit("A", &[Physique], Some(Element::Air)),
            unit("B", &[Soigneur], Some(Element::Air)),
            unit("C", &[Distance], Some(Element::Air)),
        ];
        let active = select_active_synergy(&triplette, &synergies, &levels, &fusion).expect("triplette");
        assert_eq!(active.name, "Triplette");
    }

    #[test]
    fn fusion_normalizes_element_counts() {
        let synergies = builtin_synergies();
        let squad = [
            unit("A", &[Physique], Some(Element::Feu)),
            unit("B", &[Soigneur], Some(Element::Terre)),
            unit("C", &[Distance], Some(Element::Terre)),
        ];
        let plain = select_active_synergy(&squad, &synergies, &SynergyLevels::new(), &FusionMap::default())
            .expect("doublon");
        assert_eq!(plain.name, "Doublon");

        let fusion = FusionMap::new(vec![vec![Element::Feu, Element::Terre]]);
        let fused = select_active_synergy(&squad, &synergies, &SynergyLevels::new(), &fusion)
            .expect("brasier");
        assert_eq!(fused.name, "Brasier");
    }

    #[test]
    fn multi_requirement_needs_every_threshold() {
        let synergies = builtin_synergies();
        let fusion = FusionMap::default();
        let levels = SynergyLevels::new();
        let balanced = [
            unit("A", &[CorpsACorps], None),
            unit("B", &[Distance], None),
            unit("C", &[Magique], None),
            unit("D", &[Soigneur], None),
        ];
        let active = select_active_synergy(&balanced, &synergies, &levels, &fusion).expect("armée");
        assert_eq!(active.name, "Armée Équilibrée");

        let missing_healer = &balanced[..3];
        let active = select_active_synergy(missing_healer, &synergies, &levels, &fusion);
        assert!(active.map_or(true, |s| s.name != "Armée Équilibrée"));
    }

    #[test]
    fn level_scales_linearly_and_fixed_does_not() {
        let synergies = builtin_synergies();
        let find = |name: &str| synergies.iter().find(|s| s.name == name).expect("synergy");
        assert_eq!(calculate_synergy_bonus(find("Formation Corps à Corps"), 1), (0, 2));
        assert_eq!(calculate_synergy_bonus(find("Formation Corps à Corps"), 3), (0, 4));
        assert_eq!(calculate_synergy_bonus(find("Bénédiction"), 2), (3, 2));
        assert_eq!(calculate_synergy_bonus(find("Crépuscule"), 5), (5, 3));
        assert_eq!(calculate_synergy_bonus(find("Salve de Flèches"), 0), (3, 0));
    }

    #[test]
    fn empty_squad_has_no_synergy() {
        let empty: [UnitDefinition; 0] = [];
        assert!(select_active_synergy(&empty, &builtin_synergies(), &SynergyLevels::new(), &FusionMap::default()).is_none());
    }
}
