//! Rhythm Battle - Entry Point
//!
//! Interactive terminal driver. Time only moves when asked, so beats can be
//! hit precisely: `next` jumps to the next beat, `press` plays a key there.

use std::io::{self, Write};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use rhythm_battle::battle::{TeamSelection, DEFAULT_STAGE};
use rhythm_battle::core::error::Result;
use rhythm_battle::game::{MatchAssets, MatchSession, SessionTick};
use rhythm_battle::rhythm::InputSymbol;

/// Frame length used by `tick` and `run`
const FRAME_SECONDS: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rhythm_battle=info")),
        )
        .init();

    let stage = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_STAGE.to_string());
    let assets = match std::env::args().nth(2) {
        Some(dir) => MatchAssets::load_dir(std::path::Path::new(&dir))?,
        None => MatchAssets::with_defaults(),
    };

    let seed = rand::random();
    let mut session = MatchSession::new(&assets, &stage, TeamSelection::default(), seed)?;
    let cues = session.start();

    // Display welcome message
    println!("\n=== RHYTHM BATTLE ===");
    println!(
        "Stage {} at {} bpm ({} beats)",
        stage,
        session.clock().bpm(),
        cues.len()
    );
    println!();
    println!("Commands:");
    println!("  tick / t        - Advance one frame");
    println!("  run <secs>      - Advance the given number of seconds");
    println!("  next / n        - Advance to the next beat");
    println!("  press <key>     - Play a key at the current song time");
    println!("  summon <slot>   - Summon a slot directly (1-4)");
    println!("  pause / p       - Toggle pause");
    println!("  restart         - Start the match over");
    println!("  status / s      - Show detailed status");
    println!("  quit / q        - Exit the game");
    println!();
    println!("Patterns:");
    for pattern in session.recognizer().patterns() {
        let keys: Vec<String> = pattern.keys.iter().map(|k| k.to_string()).collect();
        println!("  slot {}: {}", pattern.slot + 1, keys.join(" "));
    }

    // Main game loop
    loop {
        display_status(&session);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        let (command, arg) = match input.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (input, ""),
        };

        match command {
            "quit" | "q" => break,
            "tick" | "t" => {
                let tick = session.advance(FRAME_SECONDS);
                print_tick(&tick);
            }
            "run" => match arg.parse::<f32>() {
                Ok(seconds) if seconds > 0.0 => {
                    let frames = (seconds / FRAME_SECONDS).round() as u32;
                    for _ in 0..frames {
                        let tick = session.advance(FRAME_SECONDS);
                        print_tick(&tick);
                        if session.outcome().is_over() {
                            break;
                        }
                    }
                }
                _ => println!("Usage: run <seconds>"),
            },
            "next" | "n" => match session.clock().next_beat_time(session.song_time()) {
                Some(beat_time) => {
                    let gap = (beat_time - session.song_time()) as f32;
                    let tick = session.advance(gap);
                    print_tick(&tick);
                }
                None => println!("The song is over."),
            },
            "press" => match InputSymbol::from_str(arg) {
                Ok(symbol) => match session.press(symbol) {
                    Some(outcome) => {
                        println!(
                            "{} ({:+.3}s)",
                            outcome.judgment.grade.label(),
                            outcome.judgment.offset
                        );
                        if let Some(summon) = outcome.summon {
                            match summon.result {
                                Ok(_) => println!("Pattern {} - summoned!", summon.pattern.name),
                                Err(e) => println!("Pattern {} - {}", summon.pattern.name, e),
                            }
                        }
                    }
                    None => println!("Input ignored."),
                },
                Err(e) => println!("{}", e),
            },
            "summon" => match arg.parse::<usize>() {
                Ok(slot) if slot >= 1 => match session.summon(slot - 1) {
                    Ok(_) => println!("Summoned slot {}.", slot),
                    Err(e) => println!("Summon failed: {}", e),
                },
                _ => println!("Usage: summon <slot>"),
            },
            "pause" | "p" => {
                if session.toggle_pause() {
                    println!("Paused.");
                } else {
                    println!("Resumed.");
                }
            }
            "restart" => {
                session.restart();
                println!("Match restarted.");
            }
            "status" | "s" => display_detailed_status(&session),
            _ => println!(
                "Unknown command. Available: tick, run <secs>, next, press <key>, summon <slot>, pause, restart, status, quit"
            ),
        }
    }

    println!(
        "\nGoodbye! Final state: {:?} after {:.1}s.",
        session.outcome(),
        session.song_time()
    );
    Ok(())
}

fn print_tick(tick: &SessionTick) {
    for beat in &tick.skipped_beats {
        println!("  beat {} skipped", beat);
    }
    for summon in &tick.summons {
        match &summon.result {
            Ok(_) => println!("  pattern {} - summoned!", summon.pattern.name),
            Err(e) => println!("  pattern {} - {}", summon.pattern.name, e),
        }
    }
    for event in &tick.events.events {
        println!("  [{}] {}", event.tick, event.description);
    }
}

/// Display a brief status summary
fn display_status(session: &MatchSession) {
    let battle = session.battle();
    println!();
    println!(
        "--- {:.2}s | beat {} | Energy {:.0}/{:.0} | Bases {}/{} vs {}/{} | {:?}{} ---",
        session.song_time(),
        session
            .current_beat()
            .map_or_else(|| "-".to_string(), |b| b.to_string()),
        battle.energy,
        battle.config.max_energy,
        battle.player_base.hp,
        battle.player_base.max_hp,
        battle.enemy_base.hp,
        battle.enemy_base.max_hp,
        session.outcome(),
        if session.is_paused() { " (paused)" } else { "" }
    );
    if let Some(text) = session.feedback_text() {
        println!("  {}", text);
    }
}

/// Display every unit on the field
fn display_detailed_status(session: &MatchSession) {
    let snapshot = session.snapshot();
    println!("Units on field: {}", snapshot.units.len());
    for unit in &snapshot.units {
        println!(
            "  {:?} {} x={:.0} hp {}/{} {:?}",
            unit.team, unit.archetype_id, unit.x, unit.hp, unit.max_hp, unit.state
        );
    }
    println!("Recent inputs: {}", snapshot.recent_inputs.join(" "));
}
