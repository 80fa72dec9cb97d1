pub mod bonuses;
pub mod boss;
pub mod export_csv;
pub mod fusion;
pub mod playback;
pub mod pool;
pub mod rng;
pub mod session;
pub mod stats;
pub mod synergy;
pub mod turn;

pub use bonuses::{
    position_bonus, record_end_of_combat, record_synergy_trigger, register_dynamic_purchase,
    resolve_bonuses, DynamicBonusState, ResolvedBonus, RoundKey, UnlockedBonuses,
};
pub use boss::{
    apply_mechanic_to_damage, apply_mechanic_to_multiplier, apply_mechanic_to_total_multiplier,
    blocks_rerolls, is_malus_disabled, is_unit_disabled_by_boss, BossContext,
};
pub use fusion::{matches_target, FusionMap};
pub use playback::{playback_steps, PlaybackEvent, PlaybackStep};
pub use pool::{PoolError, TroopInstance, TroopPools, TroopState, COMBAT_POOL_SIZE, MAX_SELECTED};
pub use rng::Rng;
pub use session::{CombatOutcome, CombatSession, MAX_REROLLS, MAX_ROUNDS};
pub use stats::{compute_unit_stats, StatContext, UnitStats, POSITION_BONUS_SLOT};
pub use synergy::{
    calculate_synergy_bonus, select_active_synergy, ResolvedSynergy, SynergyLevels,
};
pub use turn::{preview_turn, resolve_turn, TurnContext, TurnResult, UnitContribution};
