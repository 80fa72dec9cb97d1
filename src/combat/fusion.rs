//! Element fusion groups and the shared unit/target matching rule.

use std::collections::BTreeMap;

use crate::data::bonus::BonusDefinition;
use crate::data::target::Target;
use crate::data::unit::{has_tag, Element, UnitDefinition};

/// Elements made interchangeable by unlocked fusion bonuses. Each element
/// resolves to a canonical key: the first element of the first group holding it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FusionMap {
    groups: Vec<Vec<Element>>,
}

impl FusionMap {
    pub fn new(groups: Vec<Vec<Element>>) -> Self {
        Self {
            groups: groups.into_iter().filter(|g| !g.is_empty()).collect(),
        }
    }

    pub fn from_unlocked(unlocked: &BTreeMap<String, u32>, catalog: &[BonusDefinition]) -> Self {
        let groups = unlocked
            .iter()
            .filter(|&(_, &count)| count > 0)
            .filter_map(|(id, _)| catalog.iter().find(|b| &b.id == id))
            .flat_map(|bonus| bonus.fusion_groups().map(<[Element]>::to_vec))
            .collect();
        Self::new(groups)
    }

    pub fn canonical(&self, element: Element) -> Element {
        self.groups
            .iter()
            .find(|group| group.contains(&element))
            .map(|group| group[0])
            .unwrap_or(element)
    }

    pub fn same_group(&self, a: Element, b: Element) -> bool {
        self.canonical(a) == self.canonical(b)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// `All` matches every unit, a tag matches units carrying it, an element
/// matches units whose fusion-resolved element equals the target's.
/// `FourthPosition` never matches here; it is positional.
pub fn matches_target(target: Target, unit: &UnitDefinition, fusion: &FusionMap) -> bool {
    match target {
        Target::All => true,
        Target::FourthPosition => false,
        Target::Tag(tag) => has_tag(unit, tag),
        Target::Element(element) => unit
            .element
            .map_or(false, |own| fusion.same_group(own, element)),
    }
}
