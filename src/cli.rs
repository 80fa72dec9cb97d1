use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use crate::combat::export_csv::turns_to_csv;
use crate::combat::playback::{playback_steps, total_duration_ms};
use crate::combat::rng::Rng;
use crate::config::AppConfig;
use crate::data::catalog::Catalog;
use crate::data::validate::validate_catalog;
use crate::game::state::GameState;
use crate::optimizer::monte_carlo::{play_combat, play_combat_observed, run_autoplay};
use crate::optimizer::run_autoplay_with_progress;
use crate::optimizer::squad_generator::SquadStrategy;
use crate::parallel::{run_autoplay_batches, WorkerPool};
use crate::server;

const SIMULATE_BATCH_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Simulate,
    Validate,
    Catalog,
    Play,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("simulate") => Some(Command::Simulate),
        Some("validate") => Some(Command::Validate),
        Some("catalog") => Some(Command::Catalog),
        Some("play") => Some(Command::Play),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Catalog) => handle_catalog(),
        Some(Command::Play) => handle_play(args),
        None => {
            eprintln!("usage: escouade <serve|simulate|validate|catalog|play>");
            2
        }
    }
}

/// Arguments after the command name that are not `--flags`.
fn positional(args: &[String]) -> Vec<&String> {
    args.iter().skip(2).filter(|arg| !arg.starts_with("--")).collect()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().skip(2).any(|arg| arg == flag)
}

/// Value of a `--name=value` flag.
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .skip(2)
        .find_map(|arg| arg.strip_prefix(name)?.strip_prefix('='))
}

fn load_catalog(config: &AppConfig) -> Option<Arc<Catalog>> {
    match Catalog::load_or_builtin(config.catalog_path.as_deref()) {
        Ok(catalog) => Some(Arc::new(catalog)),
        Err(err) => {
            eprintln!("failed to load catalog: {err}");
            None
        }
    }
}

fn handle_serve() -> i32 {
    match server::run_server(&AppConfig::from_env()) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_simulate(args: &[String]) -> i32 {
    let positional = positional(args);
    let iterations = parse_u32_arg(positional.first().copied(), "iterations", 200);
    let seed = parse_u64_arg(positional.get(1).copied(), "seed", 7);
    let as_csv = has_flag(args, "--csv");
    let sequential = has_flag(args, "--sequential");

    let Some(catalog) = load_catalog(&AppConfig::from_env()) else {
        return 1;
    };
    let fresh = GameState::new(Arc::clone(&catalog), Rng::new(seed));

    if as_csv {
        let mut state = fresh;
        let run = match play_combat(&mut state, &SquadStrategy::default()) {
            Ok(run) => run,
            Err(rejection) => {
                eprintln!("autoplay stopped: {rejection}");
                return 1;
            }
        };
        return match turns_to_csv(&run.records) {
            Ok(table) => {
                print!("{table}");
                0
            }
            Err(err) => {
                eprintln!("failed to write turn history: {err}");
                1
            }
        };
    }

    let template = fresh.snapshot();
    let iterations = iterations as usize;
    let workers = flag_value(args, "--workers").map(|raw| {
        let raw = raw.to_string();
        parse_u32_arg(Some(&raw), "workers", 0) as usize
    });
    let summary = if sequential {
        run_autoplay(catalog, &template, iterations, seed)
    } else if let Some(workers) = workers {
        let pool = WorkerPool::with_workers(workers);
        run_autoplay_batches(&catalog, &template, iterations, seed, SIMULATE_BATCH_COUNT, &pool)
    } else {
        run_autoplay_with_progress(catalog, &template, iterations, seed, |done, total| {
            tracing::debug!(target: "optimizer", done, total, "autoplay progress");
        })
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize autoplay summary: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let path = positional(args).first().map(|raw| Path::new(raw.as_str()));
    let label = path.map_or_else(|| "built-in catalog".to_string(), |p| p.display().to_string());

    let catalog = match Catalog::load_or_builtin(path) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("failed to load {label}: {err}");
            return 1;
        }
    };

    let report = validate_catalog(&catalog);
    for diagnostic in &report.diagnostics {
        eprintln!("- {diagnostic}");
    }
    if report.has_errors() {
        eprintln!("validation failed: {} error(s) in {label}", report.errors().count());
        1
    } else {
        println!(
            "validation passed: {label} ({} units, {} synergies, {} bonuses, {} bosses)",
            catalog.units.len(),
            catalog.synergies.len(),
            catalog.bonuses.len(),
            catalog.bosses.len()
        );
        0
    }
}

fn handle_catalog() -> i32 {
    match Catalog::builtin().to_yaml() {
        Ok(yaml) => {
            print!("{yaml}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize catalog: {err}");
            1
        }
    }
}

fn handle_play(args: &[String]) -> i32 {
    let seed = parse_u64_arg(positional(args).first().copied(), "seed", 7);
    let Some(catalog) = load_catalog(&AppConfig::from_env()) else {
        return 1;
    };
    let mut state = GameState::new(catalog, Rng::new(seed));

    let mut failed = false;
    let outcome = play_combat_observed(&mut state, &SquadStrategy::default(), |report| {
        let steps = playback_steps(&report.result, report.session.boss_name.as_deref());
        println!(
            "-- round {}/{} ({} ms)",
            report.record.round,
            report.session.max_rounds,
            total_duration_ms(&steps)
        );
        for step in &steps {
            match serde_json::to_string(step) {
                Ok(line) => println!("{line}"),
                Err(err) => {
                    eprintln!("failed to serialize playback step: {err}");
                    failed = true;
                }
            }
        }
    });

    match outcome {
        Ok(run) => {
            println!(
                "{} after {} round(s): {}/{} damage",
                if run.won { "victory" } else { "defeat" },
                run.rounds,
                run.damage,
                run.target_damage
            );
            i32::from(failed)
        }
        Err(rejection) => {
            eprintln!("autoplay stopped: {rejection}");
            1
        }
    }
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                let mut msg = String::new();
                let _ = write!(
                    &mut msg,
                    "invalid {name} '{value}', defaulting to {default}"
                );
                eprintln!("{msg}");
            }
            default
        })
}
