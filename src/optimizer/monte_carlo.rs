//! Autoplay estimates: replay whole combats from a saved state, always
//! fielding the best-ranked squad, over many seeded iterations.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::combat::boss::blocks_rerolls;
use crate::combat::export_csv::TurnRecord;
use crate::combat::rng::Rng;
use crate::combat::session::CombatOutcome;
use crate::data::catalog::Catalog;
use crate::game::rejection::Rejection;
use crate::game::save::GameSnapshot;
use crate::game::state::{GameState, TurnReport};
use crate::optimizer::ranking::{choose_squad, rank_squads};
use crate::optimizer::squad_generator::{SquadGenerator, SquadStrategy};

/// One autoplayed combat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatRun {
    pub won: bool,
    pub rounds: u32,
    pub damage: i64,
    pub target_damage: i64,
    pub records: Vec<TurnRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoplaySummary {
    pub iterations: usize,
    pub seed: u64,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_rounds: f64,
    pub avg_damage: f64,
}

/// Plays the current combat (starting one if needed) to the end.
///
/// Against a boss that blocks everything, the first owned bonus is sold to
/// lift the malus before the first turn.
pub fn play_combat(state: &mut GameState, strategy: &SquadStrategy) -> Result<CombatRun, Rejection> {
    play_combat_observed(state, strategy, |_| {})
}

/// Like [play_combat], calling `on_turn` with every turn report as it is played.
pub fn play_combat_observed<F>(
    state: &mut GameState,
    strategy: &SquadStrategy,
    mut on_turn: F,
) -> Result<CombatRun, Rejection>
where
    F: FnMut(&TurnReport),
{
    if state.combat().is_none() {
        state.start_combat()?;
    }
    let generator = SquadGenerator::with_strategy(strategy.clone());
    let mut records = Vec::new();

    loop {
        let blocked = state
            .combat()
            .map_or(false, |active| blocks_rerolls(&active.session));
        if blocked {
            if let Some(id) = state.unlocked_bonuses.keys().next().cloned() {
                state.sell_bonus(&id)?;
            }
        }

        let pick = state.with_turn_context(|active, ctx| {
            let candidates = generator.generate_candidates(&active.pools.combat_pool);
            let ranked = rank_squads(&active.pools.combat_pool, &candidates, ctx);
            let remaining = active.session.target_damage - active.session.total_damage;
            choose_squad(&ranked, remaining).map(|squad| squad.troop_ids.clone())
        })?;

        let Some(ids) = pick else {
            let session = state.abandon_combat()?;
            return Ok(CombatRun {
                won: false,
                rounds: session.round,
                damage: session.total_damage,
                target_damage: session.target_damage,
                records,
            });
        };
        for id in ids {
            state.select(id)?;
        }

        let report = state.play_turn()?;
        on_turn(&report);
        records.push(report.record);
        if report.outcome != CombatOutcome::Ongoing {
            return Ok(CombatRun {
                won: report.outcome == CombatOutcome::Victory,
                rounds: report.session.round,
                damage: report.session.total_damage,
                target_damage: report.session.target_damage,
                records,
            });
        }
    }
}

/// Seed for one iteration; independent of how iterations are scheduled.
pub fn iteration_seed(seed: u64, iteration: usize) -> u64 {
    let mut rng = Rng::new(seed ^ (iteration as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    rng.next_u64()
}

fn run_iteration(
    catalog: &Arc<Catalog>,
    template: &GameSnapshot,
    strategy: &SquadStrategy,
    seed: u64,
    iteration: usize,
) -> Option<CombatRun> {
    let rng = Rng::new(iteration_seed(seed, iteration));
    let mut state = GameState::from_snapshot(Arc::clone(catalog), rng, template.clone());
    match play_combat(&mut state, strategy) {
        Ok(run) => Some(run),
        Err(rejection) => {
            tracing::warn!(target: "optimizer", iteration, %rejection, "autoplay iteration aborted");
            None
        }
    }
}

pub fn run_autoplay(
    catalog: Arc<Catalog>,
    template: &GameSnapshot,
    iterations: usize,
    seed: u64,
) -> AutoplaySummary {
    run_autoplay_with_parallelism(catalog, template, iterations, seed, false)
}

/// Like [run_autoplay] but spreads iterations across Rayon workers. The summary
/// is identical to the sequential one for the same inputs.
pub fn run_autoplay_parallel(
    catalog: Arc<Catalog>,
    template: &GameSnapshot,
    iterations: usize,
    seed: u64,
) -> AutoplaySummary {
    run_autoplay_with_parallelism(catalog, template, iterations, seed, true)
}

fn run_autoplay_with_parallelism(
    catalog: Arc<Catalog>,
    template: &GameSnapshot,
    iterations: usize,
    seed: u64,
    parallel: bool,
) -> AutoplaySummary {
    let strategy = SquadStrategy::default();
    let runs: Vec<Option<CombatRun>> = if parallel {
        (0..iterations)
            .into_par_iter()
            .map(|i| run_iteration(&catalog, template, &strategy, seed, i))
            .collect()
    } else {
        (0..iterations)
            .map(|i| run_iteration(&catalog, template, &strategy, seed, i))
            .collect()
    };
    summarize(&runs, iterations, seed)
}

/// Runs the iteration range `[start, end)`. Used to split work into batches.
pub fn run_autoplay_range(
    catalog: &Arc<Catalog>,
    template: &GameSnapshot,
    seed: u64,
    start: usize,
    end: usize,
) -> Vec<Option<CombatRun>> {
    let strategy = SquadStrategy::default();
    (start..end)
        .into_par_iter()
        .map(|i| run_iteration(catalog, template, &strategy, seed, i))
        .collect()
}

pub fn summarize(runs: &[Option<CombatRun>], iterations: usize, seed: u64) -> AutoplaySummary {
    let played: Vec<&CombatRun> = runs.iter().flatten().collect();
    let wins = played.iter().filter(|r| r.won).count();
    let n = played.len().max(1) as f64;
    AutoplaySummary {
        iterations,
        seed,
        wins,
        win_rate: wins as f64 / iterations.max(1) as f64,
        avg_rounds: played.iter().map(|r| f64::from(r.rounds)).sum::<f64>() / n,
        avg_damage: played.iter().map(|r| r.damage as f64).sum::<f64>() / n,
    }
}
