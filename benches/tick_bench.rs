//! Tick loop benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rhythm_battle::battle::{ArchetypeCatalog, BattleState, StageCatalog, TeamSelection};
use rhythm_battle::core::config::BattleConfig;
use rhythm_battle::game::{MatchAssets, MatchSession};

/// A crowded lane: both rosters full and fighting
fn crowded_battle() -> BattleState {
    let stage = StageCatalog::with_defaults()
        .get("stage4")
        .cloned()
        .expect("stage4 is a default stage");
    let mut config = BattleConfig::default();
    config.max_energy = 100_000.0;
    config.starting_energy = 100_000.0;
    config.player_base_max_hp = 1_000_000;

    let mut state = BattleState::new(
        config,
        stage,
        TeamSelection::default(),
        ArchetypeCatalog::with_defaults(),
        7,
    )
    .expect("default data builds a match");
    for i in 0..60 {
        let _ = state.spawn_player_unit(i % 4);
        let _ = state.spawn_enemy_unit(["E001", "E002", "E003", "E004"][i % 4]);
    }
    state
}

fn bench_battle_advance(c: &mut Criterion) {
    let state = crowded_battle();
    c.bench_function("battle_advance_120_units", |b| {
        b.iter_batched(
            || state.clone(),
            |mut state| {
                for _ in 0..60 {
                    black_box(state.advance(1.0 / 60.0));
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_session_second(c: &mut Criterion) {
    let assets = MatchAssets::with_defaults();
    c.bench_function("session_one_second", |b| {
        b.iter(|| {
            let mut session = MatchSession::new(&assets, "stage2", TeamSelection::default(), 1)
                .expect("default data builds a session");
            session.start();
            for _ in 0..60 {
                black_box(session.advance(1.0 / 60.0));
            }
        })
    });
}

criterion_group!(benches, bench_battle_advance, bench_session_second);
criterion_main!(benches);
