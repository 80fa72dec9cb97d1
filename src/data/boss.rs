//! Scripted bosses. Mechanics are typed variants, never matched from display text.

use serde::{Deserialize, Serialize};

use crate::data::unit::UnitTag;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BossMechanic {
    /// Reduces damage by `percent` (floor) for matching units, or every unit when `target` is absent.
    DamageReduction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<UnitTag>,
        percent: u32,
    },
    /// Subtracts `amount` from each matching unit's multiplier, never below zero.
    MultiplierPenalty {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<UnitTag>,
        amount: i64,
    },
    /// Halves (floor) the squad's total multiplier once per turn.
    HalveMultipliers,
    /// Zero damage and no rerolls until the player sells an equipment bonus.
    BlockUntilBonusSold,
    /// Matching units contribute nothing.
    DisableUnits { target: UnitTag },
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossDefinition {
    pub name: String,
    /// Display text only.
    #[serde(default)]
    pub description: String,
    pub base_target: i64,
    pub mechanic: BossMechanic,
}

fn boss(name: &str, description: &str, base_target: i64, mechanic: BossMechanic) -> BossDefinition {
    BossDefinition {
        name: name.to_string(),
        description: description.to_string(),
        base_target,
        mechanic,
    }
}

pub fn builtin_bosses() -> Vec<BossDefinition> {
    vec![
        boss(
            "Gardien de Pierre",
            "Les dégâts des unités de corps à corps sont réduits de 50%",
            150,
            BossMechanic::DamageReduction {
                target: Some(UnitTag::CorpsACorps),
                percent: 50,
            },
        ),
        boss(
            "Archimage Noir",
            "Les unités magiques perdent 2 multiplicateurs",
            160,
            BossMechanic::MultiplierPenalty {
                target: Some(UnitTag::Magique),
                amount: 2,
            },
        ),
        boss(
            "Titan",
            "Les multiplicateurs sont réduits de moitié",
            170,
            BossMechanic::HalveMultipliers,
        ),
        boss(
            "Quilegan",
            "Bloque les relances, les bonus, les synergies et les dégâts tant qu'aucun bonus n'est vendu",
            180,
            BossMechanic::BlockUntilBonusSold,
        ),
        boss(
            "Liche",
            "Les soigneurs ne peuvent pas combattre",
            190,
            BossMechanic::DisableUnits {
                target: UnitTag::Soigneur,
            },
        ),
        boss(
            "Hydre des Abysses",
            "Les dégâts des unités à distance sont réduits de 50%",
            200,
            BossMechanic::DamageReduction {
                target: Some(UnitTag::Distance),
                percent: 50,
            },
        ),
        boss(
            "Dragon Ancestral",
            "Les multiplicateurs sont réduits de moitié",
            220,
            BossMechanic::HalveMultipliers,
        ),
    ]
}
