pub mod monte_carlo;
pub mod ranking;
pub mod squad_generator;

use std::sync::Arc;

use crate::data::catalog::Catalog;
use crate::game::rejection::Rejection;
use crate::game::save::GameSnapshot;
use crate::game::state::GameState;
use crate::optimizer::monte_carlo::{run_autoplay_range, summarize, AutoplaySummary, CombatRun};
use crate::optimizer::ranking::{rank_squads, RankedSquad};
use crate::optimizer::squad_generator::{SquadGenerator, SquadStrategy};
use crate::parallel::batch_ranges;

/// Number of progress-reporting batches for autoplay with progress.
const AUTOPLAY_PROGRESS_BATCH_COUNT: usize = 20;

/// Ranks every squad the current combat pool allows.
pub fn optimize_squad(state: &GameState, strategy: &SquadStrategy) -> Result<Vec<RankedSquad>, Rejection> {
    let generator = SquadGenerator::with_strategy(strategy.clone());
    state.with_turn_context(|active, ctx| {
        let candidates = generator.generate_candidates(&active.pools.combat_pool);
        rank_squads(&active.pools.combat_pool, &candidates, ctx)
    })
}

/// Like [monte_carlo::run_autoplay_parallel] but runs in batches and invokes
/// `on_progress(done, total)` after each one.
pub fn run_autoplay_with_progress<F>(
    catalog: Arc<Catalog>,
    template: &GameSnapshot,
    iterations: usize,
    seed: u64,
    mut on_progress: F,
) -> AutoplaySummary
where
    F: FnMut(usize, usize),
{
    on_progress(0, iterations);
    let mut runs: Vec<Option<CombatRun>> = Vec::with_capacity(iterations);
    for (start, end) in batch_ranges(iterations, AUTOPLAY_PROGRESS_BATCH_COUNT) {
        runs.extend(run_autoplay_range(&catalog, template, seed, start, end));
        on_progress(end, iterations);
    }
    summarize(&runs, iterations, seed)
}
