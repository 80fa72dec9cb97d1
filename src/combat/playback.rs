//! Turns a finished [`TurnResult`] into an ordered list of display steps.
//! Pure: playback only reads the result, and skipping it changes nothing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::combat::turn::TurnResult;

pub const UNIT_STEP_MS: u64 = 600;
pub const SYNERGY_STEP_MS: u64 = 900;
pub const TOTAL_STEP_MS: u64 = 700;
pub const FINAL_STEP_MS: u64 = 1200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PlaybackEvent {
    UnitStrike {
        troop_id: Uuid,
        name: String,
        slot: usize,
        damage: i64,
        multiplier: i64,
    },
    SynergyActivated {
        name: String,
        level: u32,
        damage: i64,
        multiplier: i64,
    },
    Totals {
        damage: i64,
        multiplier: i64,
    },
    BossOverride {
        boss: String,
    },
    FinalDamage {
        damage: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStep {
    /// Cosmetic pause before showing this step.
    pub delay_ms: u64,
    #[serde(flatten)]
    pub event: PlaybackEvent,
}

pub fn playback_steps(result: &TurnResult, boss_name: Option<&str>) -> Vec<PlaybackStep> {
    let mut steps = Vec::with_capacity(result.units.len() + 4);
    for unit in &result.units {
        steps.push(PlaybackStep {
            delay_ms: UNIT_STEP_MS,
            event: PlaybackEvent::UnitStrike {
                troop_id: unit.troop_id,
                name: unit.name.clone(),
                slot: unit.slot,
                damage: unit.damage,
                multiplier: unit.multiplier,
            },
        });
    }
    if let Some(synergy) = &result.synergy {
        steps.push(PlaybackStep {
            delay_ms: SYNERGY_STEP_MS,
            event: PlaybackEvent::SynergyActivated {
                name: synergy.name.clone(),
                level: synergy.level,
                damage: synergy.damage,
                multiplier: synergy.multiplier,
            },
        });
    }
    steps.push(PlaybackStep {
        delay_ms: TOTAL_STEP_MS,
        event: PlaybackEvent::Totals {
            damage: result.total_damage,
            multiplier: result.total_multiplier,
        },
    });
    if result.zeroed_by_boss {
        steps.push(PlaybackStep {
            delay_ms: TOTAL_STEP_MS,
            event: PlaybackEvent::BossOverride {
                boss: boss_name.unwrap_or_default().to_string(),
            },
        });
    }
    steps.push(PlaybackStep {
        delay_ms: FINAL_STEP_MS,
        event: PlaybackEvent::FinalDamage {
            damage: result.final_damage,
        },
    });
    steps
}

/// Sum of all cosmetic delays.
pub fn total_duration_ms(steps: &[PlaybackStep]) -> u64 {
    steps.iter().map(|s| s.delay_ms).sum()
}
