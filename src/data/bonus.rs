//! Equipment bonus catalog. Each bonus ID maps to a fixed rule; the resolver in
//! [crate::combat::bonuses] turns unlocked copies into modifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::target::Target;
use crate::data::unit::{Element, UnitTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusStat {
    Damage,
    Multiplier,
}

/// What bumps a dynamic bonus counter. Serialized as `base`, `end_of_combat`
/// or `synergy_trigger:<synergy name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TriggerCondition {
    Base,
    SynergyTrigger(String),
    EndOfCombat,
}

const SYNERGY_TRIGGER_PREFIX: &str = "synergy_trigger:";

impl TriggerCondition {
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TriggerCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::SynergyTrigger(name) => write!(f, "{SYNERGY_TRIGGER_PREFIX}{name}"),
            Self::EndOfCombat => f.write_str("end_of_combat"),
        }
    }
}

impl From<TriggerCondition> for String {
    fn from(value: TriggerCondition) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for TriggerCondition {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "base" => Ok(Self::Base),
            "end_of_combat" => Ok(Self::EndOfCombat),
            other => match other.strip_prefix(SYNERGY_TRIGGER_PREFIX) {
                Some(name) if !name.trim().is_empty() => {
                    Ok(Self::SynergyTrigger(name.trim().to_string()))
                }
                _ => Err(format!("unknown trigger condition '{other}'")),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicEffect {
    pub condition: TriggerCondition,
    pub stat: BonusStat,
    #[serde(default)]
    pub base_value: i64,
    /// Added to the stored counter each time the condition fires.
    #[serde(default = "default_increment")]
    pub increment: i64,
}

fn default_increment() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BonusRule {
    /// Scales linearly with the number of copies owned.
    Linear {
        #[serde(default)]
        damage_per_copy: i64,
        #[serde(default)]
        multiplier_per_copy: i64,
    },
    /// One-time positional multiplier: `ceil(base + (copies - 1) * per_extra_copy)`.
    Position { base: f64, per_extra_copy: f64 },
    /// Counter-driven magnitude, see [DynamicEffect].
    Dynamic { effects: Vec<DynamicEffect> },
    /// Carries only side effects (e.g. element fusion).
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BonusEffect {
    FusionElement { elements: Vec<Element> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target: Target,
    pub rule: BonusRule,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<BonusEffect>,
}

impl BonusDefinition {
    pub fn is_dynamic(&self) -> bool {
        matches!(self.rule, BonusRule::Dynamic { .. })
    }

    pub fn fusion_groups(&self) -> impl Iterator<Item = &[Element]> + '_ {
        self.effects.iter().map(|effect| match effect {
            BonusEffect::FusionElement { elements } => elements.as_slice(),
        })
    }
}

fn linear(id: &str, name: &str, description: &str, target: Target, dmg: i64, mult: i64) -> BonusDefinition {
    BonusDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        target,
        rule: BonusRule::Linear {
            damage_per_copy: dmg,
            multiplier_per_copy: mult,
        },
        effects: Vec::new(),
    }
}

fn fusion(id: &str, name: &str, elements: &[Element]) -> BonusDefinition {
    BonusDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: format!(
            "Les éléments {} sont interchangeables",
            elements
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(" / ")
        ),
        target: Target::All,
        rule: BonusRule::None,
        effects: vec![BonusEffect::FusionElement {
            elements: elements.to_vec(),
        }],
    }
}

pub fn builtin_bonuses() -> Vec<BonusDefinition> {
    use Element::*;
    use UnitTag::*;

    vec![
        linear("force_brute", "Force brute", "+2 dégâts à toutes les unités", Target::All, 2, 0),
        linear(
            "lame_aiguisee",
            "Lame aiguisée",
            "+3 dégâts aux unités de corps à corps",
            Target::Tag(CorpsACorps),
            3,
            0,
        ),
        linear(
            "arc_long",
            "Arc long",
            "+2 dégâts aux unités à distance",
            Target::Tag(Distance),
            2,
            0,
        ),
        linear(
            "grimoire",
            "Grimoire",
            "+1 multiplicateur aux unités magiques",
            Target::Tag(Magique),
            0,
            1,
        ),
        linear(
            "flamme_eternelle",
            "Flamme éternelle",
            "+4 dégâts aux unités de feu",
            Target::Element(Feu),
            4,
            0,
        ),
        linear(
            "maree_montante",
            "Marée montante",
            "+1 multiplicateur aux unités d'eau",
            Target::Element(Eau),
            0,
            1,
        ),
        linear(
            "benediction_divine",
            "Bénédiction divine",
            "+1 dégât et +1 multiplicateur aux unités de lumière",
            Target::Element(Lumiere),
            1,
            1,
        ),
        BonusDefinition {
            id: "position_quatre".to_string(),
            name: "Quatrième position".to_string(),
            description: "Multiplie le multiplicateur de la 4e unité".to_string(),
            target: Target::FourthPosition,
            rule: BonusRule::Position {
                base: 2.0,
                per_extra_copy: 1.0,
            },
            effects: Vec::new(),
        },
        fusion("fusion_feu_terre", "Fusion Feu-Terre", &[Feu, Terre]),
        fusion("fusion_eau_air", "Fusion Eau-Air", &[Eau, Air]),
        BonusDefinition {
            id: "cac_cest_la_vie".to_string(),
            name: "Le CàC c'est la vie".to_string(),
            description: "Grandit à chaque Formation Corps à Corps et à chaque fin de combat"
                .to_string(),
            target: Target::Tag(CorpsACorps),
            rule: BonusRule::Dynamic {
                effects: vec![
                    DynamicEffect {
                        condition: TriggerCondition::Base,
                        stat: BonusStat::Damage,
                        base_value: 2,
                        increment: 2,
                    },
                    DynamicEffect {
                        condition: TriggerCondition::SynergyTrigger(
                            "Formation Corps à Corps".to_string(),
                        ),
                        stat: BonusStat::Multiplier,
                        base_value: 0,
                        increment: 1,
                    },
                    DynamicEffect {
                        condition: TriggerCondition::EndOfCombat,
                        stat: BonusStat::Damage,
                        base_value: 0,
                        increment: 1,
                    },
                ],
            },
            effects: Vec::new(),
        },
        BonusDefinition {
            id: "veteran".to_string(),
            name: "Vétéran".to_string(),
            description: "+1 multiplicateur à toutes les unités par combat terminé".to_string(),
            target: Target::All,
            rule: BonusRule::Dynamic {
                effects: vec![DynamicEffect {
                    condition: TriggerCondition::EndOfCombat,
                    stat: BonusStat::Multiplier,
                    base_value: 0,
                    increment: 1,
                }],
            },
            effects: Vec::new(),
        },
    ]
}
