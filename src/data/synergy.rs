//! Declarative squad-composition synergies. Declaration order breaks priority ties.

use serde::{Deserialize, Serialize};

use crate::data::target::Target;
use crate::data::unit::{Element, UnitTag};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: UnitTag,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCount {
    pub element: Element,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    Types { counts: Vec<TagCount> },
    Elements { counts: Vec<ElementCount> },
    Mixed {
        types: Vec<TagCount>,
        elements: Vec<ElementCount>,
    },
    /// Any single tag shared by at least `count` units (Duo, Trio).
    AnyType { count: u32 },
    /// Any single element shared by at least `count` units (Doublon, Triplette).
    AnyElement { count: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynergyBonusKind {
    Multiplier,
    Damage,
    Mixed,
    /// Both values, not scaled by level.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynergyDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub requirement: Requirement,
    pub bonus_type: SynergyBonusKind,
    #[serde(default)]
    pub base_damage: i64,
    #[serde(default)]
    pub base_multiplier: i64,
    pub target: Target,
    #[serde(default)]
    pub priority: i32,
}

fn types(counts: &[(UnitTag, u32)]) -> Vec<TagCount> {
    counts
        .iter()
        .map(|&(tag, count)| TagCount { tag, count })
        .collect()
}

fn elements(counts: &[(Element, u32)]) -> Vec<ElementCount> {
    counts
        .iter()
        .map(|&(element, count)| ElementCount { element, count })
        .collect()
}

fn synergy(
    name: &str,
    description: &str,
    requirement: Requirement,
    bonus_type: SynergyBonusKind,
    (base_damage, base_multiplier): (i64, i64),
    target: Target,
    priority: i32,
) -> SynergyDefinition {
    SynergyDefinition {
        name: name.to_string(),
        description: description.to_string(),
        requirement,
        bonus_type,
        base_damage,
        base_multiplier,
        target,
        priority,
    }
}

pub fn builtin_synergies() -> Vec<SynergyDefinition> {
    use Element::*;
    use SynergyBonusKind::*;
    use UnitTag::*;

    vec![
        synergy(
            "Formation Corps à Corps",
            "3 unités de corps à corps : +2 multiplicateur pour chacune",
            Requirement::Types {
                counts: types(&[(CorpsACorps, 3)]),
            },
            Multiplier,
            (0, 2),
            Target::Tag(CorpsACorps),
            5,
        ),
        synergy(
            "Salve de Flèches",
            "3 unités à distance : +3 dégâts pour chacune",
            Requirement::Types {
                counts: types(&[(Distance, 3)]),
            },
            Damage,
            (3, 0),
            Target::Tag(Distance),
            5,
        ),
        synergy(
            "Cercle Arcanique",
            "3 unités magiques : +2 multiplicateur pour chacune",
            Requirement::Types {
                counts: types(&[(Magique, 3)]),
            },
            Multiplier,
            (0, 2),
            Target::Tag(Magique),
            5,
        ),
        synergy(
            "Bénédiction",
            "2 soigneurs : +2 dégâts et +1 multiplicateur à l'escouade",
            Requirement::Types {
                counts: types(&[(Soigneur, 2)]),
            },
            Mixed,
            (2, 1),
            Target::All,
            4,
        ),
        synergy(
            "Armée Équilibrée",
            "Corps à corps, distance, magie et soin réunis",
            Requirement::Types {
                counts: types(&[(CorpsACorps, 1), (Distance, 1), (Magique, 1), (Soigneur, 1)]),
            },
            Mixed,
            (3, 2),
            Target::All,
            8,
        ),
        synergy(
            "Brasier",
            "3 unités de feu : +4 dégâts pour chacune",
            Requirement::Elements {
                counts: elements(&[(Feu, 3)]),
            },
            Damage,
            (4, 0),
            Target::Element(Feu),
            6,
        ),
        synergy(
            "Marée",
            "3 unités d'eau : +2 multiplicateur pour chacune",
            Requirement::Elements {
                counts: elements(&[(Eau, 3)]),
            },
            Multiplier,
            (0, 2),
            Target::Element(Eau),
            6,
        ),
        synergy(
            "Crépuscule",
            "Lumière et ténèbre réunies : +5 dégâts et +3 multiplicateur",
            Requirement::Elements {
                counts: elements(&[(Lumiere, 1), (Tenebre, 1)]),
            },
            Fixed,
            (5, 3),
            Target::All,
            7,
        ),
        synergy(
            "Garde Sacrée",
            "2 corps à corps et 2 unités de lumière",
            Requirement::Mixed {
                types: types(&[(CorpsACorps, 2)]),
                elements: elements(&[(Lumiere, 2)]),
            },
            Mixed,
            (2, 2),
            Target::All,
            7,
        ),
        synergy(
            "Trio",
            "3 unités partageant un type",
            Requirement::AnyType { count: 3 },
            Multiplier,
            (0, 2),
            Target::All,
            2,
        ),
        synergy(
            "Triplette",
            "3 unités partageant un élément",
            Requirement::AnyElement { count: 3 },
            Damage,
            (4, 0),
            Target::All,
            2,
        ),
        synergy(
            "Duo",
            "2 unités partageant un type",
            Requirement::AnyType { count: 2 },
            Multiplier,
            (0, 1),
            Target::All,
            1,
        ),
        synergy(
            "Doublon",
            "2 unités partageant un élément",
            Requirement::AnyElement { count: 2 },
            Damage,
            (2, 0),
            Target::All,
            1,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_round_trips_through_yaml_shape() {
        let yaml = "kind: mixed\ntypes:\n  - tag: Corps à corps\n    count: 2\nelements:\n  - element: Lumière\n    count: 2\n";
        let parsed: Requirement = serde_yaml::from_str(yaml).expect("requirement yaml");
        assert_eq!(
            parsed,
            Requirement::Mixed {
                types: vec![TagCount {
                    tag: UnitTag::CorpsACorps,
                    count: 2
                }],
                elements: vec![ElementCount {
                    element: Element::Lumiere,
                    count: 2
                }],
            }
        );
    }
}
