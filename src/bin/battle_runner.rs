//! Headless Battle Runner
//!
//! Plays a full seeded match with an autopilot on the keys and prints a result
//! report. The autopilot performs slot patterns on the beat with random timing
//! error, so `--accuracy` controls how often a press lands in the window.

use std::collections::VecDeque;
use std::path::PathBuf;

use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use rhythm_battle::battle::{TeamSelection, DEFAULT_STAGE};
use rhythm_battle::game::{MatchAssets, MatchSession};
use rhythm_battle::rhythm::InputSymbol;

/// Headless Battle Runner - autopiloted matches for balancing
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run a seeded match with an autopilot and report the result")]
struct Args {
    /// Stage id
    #[arg(long, default_value = DEFAULT_STAGE)]
    stage: String,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Chance that each autopilot press lands inside the judgment window (0..=1)
    #[arg(long, default_value_t = 0.9)]
    accuracy: f64,

    /// Stop after this many seconds of song time
    #[arg(long, default_value_t = 180.0)]
    max_seconds: f64,

    /// Simulation frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Load tables from this directory instead of the built-in defaults
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Enable verbose battle logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct MatchReport {
    outcome: String,
    stage: String,
    seed: u64,
    ticks: u64,
    song_seconds: f64,
    presses: u32,
    hits: u32,
    misses: u32,
    patterns_completed: u32,
    units_summoned: u32,
    summons_rejected: u32,
    player_base_hp: i32,
    enemy_base_hp: i32,
    final_energy: f32,
}

/// One planned press
struct PlannedPress {
    time: f64,
    symbol: InputSymbol,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "rhythm_battle=debug"
    } else {
        "rhythm_battle=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let assets = match &args.data_dir {
        Some(dir) => match MatchAssets::load_dir(dir) {
            Ok(assets) => assets,
            Err(e) => {
                eprintln!("Failed to load data from {}: {}", dir.display(), e);
                std::process::exit(1);
            }
        },
        None => MatchAssets::with_defaults(),
    };

    let mut session = match MatchSession::new(&assets, &args.stage, TeamSelection::default(), seed) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Cannot start match: {}", e);
            std::process::exit(1);
        }
    };
    session.start();

    let dt = 1.0 / args.fps.max(1) as f32;
    let accuracy = args.accuracy.clamp(0.0, 1.0);
    let tolerance = session.clock().tolerance();
    let interval = session.clock().beat_interval();

    let mut report = MatchReport {
        outcome: String::new(),
        stage: args.stage.clone(),
        seed,
        ticks: 0,
        song_seconds: 0.0,
        presses: 0,
        hits: 0,
        misses: 0,
        patterns_completed: 0,
        units_summoned: 0,
        summons_rejected: 0,
        player_base_hp: 0,
        enemy_base_hp: 0,
        final_energy: 0.0,
    };

    let mut queue: VecDeque<PlannedPress> = VecDeque::new();
    let mut next_pattern = 0usize;
    let mut idle_until = 0.0f64;

    while !session.outcome().is_over()
        && !session.song_finished()
        && session.song_time() < args.max_seconds
    {
        // Plan the next pattern once the previous one is fully played
        if queue.is_empty() && session.song_time() >= idle_until {
            match plan_pattern(&session, &mut next_pattern, accuracy, tolerance, interval, &mut rng) {
                Some(presses) => queue.extend(presses),
                None => {
                    idle_until = session
                        .clock()
                        .next_beat_time(session.song_time())
                        .unwrap_or(f64::INFINITY);
                }
            }
        }

        let tick = session.advance(dt);
        for summon in tick.summons {
            record_summon(&mut report, summon.result.is_ok());
        }
        if args.verbose {
            for event in &tick.events.events {
                eprintln!("  [{}] {:?}: {}", event.tick, event.event_type, event.description);
            }
        }

        while queue
            .front()
            .map_or(false, |p| p.time <= session.song_time())
        {
            let Some(press) = queue.pop_front() else {
                break;
            };
            if let Some(outcome) = session.press_at(press.symbol, press.time) {
                report.presses += 1;
                if outcome.judgment.is_hit() {
                    report.hits += 1;
                } else {
                    report.misses += 1;
                }
                if let Some(summon) = outcome.summon {
                    record_summon(&mut report, summon.result.is_ok());
                }
            }
        }
    }

    let battle = session.battle();
    report.outcome = format!("{:?}", session.outcome());
    report.ticks = battle.tick;
    report.song_seconds = session.song_time();
    report.player_base_hp = battle.player_base.hp;
    report.enemy_base_hp = battle.enemy_base.hp;
    report.final_energy = battle.energy;

    match args.format.as_str() {
        "text" => print_text(&report),
        "json" => print_json(&report),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            print_json(&report);
        }
    }
}

fn record_summon(report: &mut MatchReport, succeeded: bool) {
    report.patterns_completed += 1;
    if succeeded {
        report.units_summoned += 1;
    } else {
        report.summons_rejected += 1;
    }
}

/// Pick the next affordable pattern (round robin) and schedule its keys on
/// consecutive upcoming beats. Skip symbols leave their beat unplayed.
fn plan_pattern(
    session: &MatchSession,
    cursor: &mut usize,
    accuracy: f64,
    tolerance: f64,
    interval: f64,
    rng: &mut ChaCha8Rng,
) -> Option<Vec<PlannedPress>> {
    let battle = session.battle();
    let patterns = session.recognizer().patterns();
    if patterns.is_empty() {
        return None;
    }

    let affordable = |slot: usize| {
        battle
            .team
            .archetype_at(slot)
            .ok()
            .and_then(|id| battle.archetypes().get(id))
            .map_or(false, |a| a.cost as f32 <= battle.energy)
    };

    let count = patterns.len();
    let chosen = (0..count)
        .map(|i| (*cursor + i) % count)
        .find(|&i| affordable(patterns[i].slot))?;
    *cursor = (chosen + 1) % count;

    let mut beat_time = session.clock().next_beat_time(session.song_time())?;
    let mut presses = Vec::new();
    for symbol in &patterns[chosen].keys {
        if *symbol != InputSymbol::Skip {
            let error = if rng.gen_bool(accuracy) {
                rng.gen_range(-0.8..=0.8) * tolerance
            } else {
                // Inside the beat's span but outside its window
                let low = tolerance + 0.005;
                let high = (interval / 2.0 - 0.001).max(low + 0.001);
                let magnitude = rng.gen_range(low..=high);
                if rng.gen_bool(0.5) {
                    magnitude
                } else {
                    -magnitude
                }
            };
            presses.push(PlannedPress {
                time: (beat_time + error).max(0.0),
                symbol: *symbol,
            });
        }
        beat_time += interval;
    }
    Some(presses)
}

fn print_json(report: &MatchReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize report: {}", e),
    }
}

fn print_text(report: &MatchReport) {
    println!("Match Result");
    println!("============");
    println!("Outcome: {}", report.outcome);
    println!("Stage: {} (seed {})", report.stage, report.seed);
    println!("Ticks: {} ({:.1}s of song)", report.ticks, report.song_seconds);
    println!(
        "Presses: {} ({} hits, {} misses)",
        report.presses, report.hits, report.misses
    );
    println!(
        "Patterns: {} completed, {} units summoned, {} rejected",
        report.patterns_completed, report.units_summoned, report.summons_rejected
    );
    println!(
        "Bases: player {} hp, enemy {} hp",
        report.player_base_hp, report.enemy_base_hp
    );
    println!("Energy: {:.0}", report.final_energy);
}
