//! Unit catalog entries and the closed tag/element/rarity sets they use.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitTag {
    #[serde(rename = "Corps à corps")]
    CorpsACorps,
    Distance,
    Magique,
    Physique,
    Soigneur,
}

impl UnitTag {
    pub const ALL: [UnitTag; 5] = [
        Self::CorpsACorps,
        Self::Distance,
        Self::Magique,
        Self::Physique,
        Self::Soigneur,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CorpsACorps => "Corps à corps",
            Self::Distance => "Distance",
            Self::Magique => "Magique",
            Self::Physique => "Physique",
            Self::Soigneur => "Soigneur",
        }
    }
}

impl fmt::Display for UnitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    Feu,
    Eau,
    Terre,
    Air,
    #[serde(rename = "Ténèbre")]
    Tenebre,
    #[serde(rename = "Lumière")]
    Lumiere,
}

impl Element {
    pub const ALL: [Element; 6] = [
        Self::Feu,
        Self::Eau,
        Self::Terre,
        Self::Air,
        Self::Tenebre,
        Self::Lumiere,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feu => "Feu",
            Self::Eau => "Eau",
            Self::Terre => "Terre",
            Self::Air => "Air",
            Self::Tenebre => "Ténèbre",
            Self::Lumiere => "Lumière",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// One or more tags. Catalog files may write a single tag or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany", into = "Vec<UnitTag>")]
pub struct TagSet(Vec<UnitTag>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(UnitTag),
    Many(Vec<UnitTag>),
}

impl From<OneOrMany> for TagSet {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(tag) => TagSet(vec![tag]),
            OneOrMany::Many(tags) => TagSet::new(tags),
        }
    }
}

impl From<TagSet> for Vec<UnitTag> {
    fn from(value: TagSet) -> Self {
        value.0
    }
}

impl TagSet {
    /// Builds a set, dropping repeated tags while keeping first-seen order.
    pub fn new(tags: impl IntoIterator<Item = UnitTag>) -> Self {
        let mut out: Vec<UnitTag> = Vec::new();
        for tag in tags {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
        TagSet(out)
    }

    pub fn single(tag: UnitTag) -> Self {
        TagSet(vec![tag])
    }

    pub fn contains(&self, tag: UnitTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = UnitTag> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Immutable catalog entry for a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub damage: i64,
    pub multiplier: i64,
    #[serde(rename = "type")]
    pub tags: TagSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
    /// Copies owned at the start of a new game. 0 for shop-only units.
    #[serde(default)]
    pub base_quantity: u32,
}

impl UnitDefinition {
    pub fn new(name: &str, icon: &str, damage: i64, multiplier: i64, tags: &[UnitTag]) -> Self {
        Self {
            name: name.to_string(),
            icon: icon.to_string(),
            damage,
            multiplier,
            tags: TagSet::new(tags.iter().copied()),
            element: None,
            rarity: None,
            base_quantity: 0,
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    pub fn with_base_quantity(mut self, quantity: u32) -> Self {
        self.base_quantity = quantity;
        self
    }
}

pub fn has_tag(unit: &UnitDefinition, tag: UnitTag) -> bool {
    unit.tags.contains(tag)
}

pub fn builtin_units() -> Vec<UnitDefinition> {
    use Element::*;
    use Rarity::*;
    use UnitTag::*;

    vec![
        UnitDefinition::new("Épéiste", "⚔️", 5, 1, &[CorpsACorps])
            .with_element(Terre)
            .with_rarity(Common)
            .with_base_quantity(5),
        UnitDefinition::new("Archer", "🏹", 4, 1, &[Distance])
            .with_element(Air)
            .with_rarity(Common)
            .with_base_quantity(5),
        UnitDefinition::new("Lancier", "🔱", 6, 1, &[CorpsACorps, Physique])
            .with_element(Eau)
            .with_rarity(Common)
            .with_base_quantity(3),
        UnitDefinition::new("Mage", "🔮", 3, 2, &[Magique, Distance])
            .with_element(Feu)
            .with_rarity(Uncommon)
            .with_base_quantity(3),
        UnitDefinition::new("Prêtre", "✨", 2, 3, &[Soigneur, Magique])
            .with_element(Lumiere)
            .with_rarity(Uncommon)
            .with_base_quantity(2),
        UnitDefinition::new("Paladin", "🛡️", 4, 2, &[CorpsACorps, Soigneur])
            .with_element(Lumiere)
            .with_rarity(Rare)
            .with_base_quantity(1),
        UnitDefinition::new("Chaman", "🪶", 3, 2, &[Magique, Soigneur])
            .with_element(Terre)
            .with_rarity(Rare)
            .with_base_quantity(1),
        UnitDefinition::new("Pyromancien", "🔥", 6, 2, &[Magique, Distance])
            .with_element(Feu)
            .with_rarity(Rare),
        UnitDefinition::new("Assassin", "🗡️", 7, 2, &[CorpsACorps, Physique])
            .with_element(Tenebre)
            .with_rarity(Epic),
        UnitDefinition::new("Nécromancien", "💀", 5, 3, &[Magique])
            .with_element(Tenebre)
            .with_rarity(Epic),
        UnitDefinition::new("Dragonnier", "🐉", 10, 3, &[CorpsACorps, Distance])
            .with_element(Feu)
            .with_rarity(Legendary),
    ]
}
