//! Battle system integration tests

use proptest::prelude::*;

use rhythm_battle::battle::*;
use rhythm_battle::core::config::BattleConfig;
use rhythm_battle::core::error::SpawnError;
use rhythm_battle::core::types::Team;

fn stage(id: &str) -> StageConfig {
    StageCatalog::with_defaults().get(id).unwrap().clone()
}

fn new_battle(seed: u64) -> BattleState {
    BattleState::new(
        BattleConfig::default(),
        stage("stage1"),
        TeamSelection::default(),
        ArchetypeCatalog::with_defaults(),
        seed,
    )
    .unwrap()
}

#[test]
fn test_two_spawns_then_out_of_energy() {
    let mut state = new_battle(1);
    assert_eq!(state.energy, 100.0);

    // Slot 0 holds P001, cost 50
    assert!(state.spawn_player_unit(0).is_ok());
    assert!(state.spawn_player_unit(0).is_ok());
    let third = state.spawn_player_unit(0);

    assert!(matches!(third, Err(SpawnError::InsufficientEnergy { .. })));
    assert_eq!(state.energy, 0.0);
    assert_eq!(state.player_units.len(), 2);
}

#[test]
fn test_spawn_without_energy_changes_nothing() {
    let mut state = new_battle(1);
    state.energy = 49.0;
    let log_len = state.battle_log.len();

    assert!(state.spawn_player_unit(0).is_err());
    assert_eq!(state.energy, 49.0);
    assert!(state.player_units.is_empty());
    assert_eq!(state.battle_log.len(), log_len);
}

#[test]
fn test_enemy_base_falls_after_ten_hits_and_win_waits() {
    let mut state = new_battle(1);
    for _ in 0..10 {
        state.enemy_base.take_damage(100);
    }
    assert_eq!(state.enemy_base.hp, 0);
    assert!(state.enemy_base.is_defeated);
    // Dead bases ignore further damage
    assert_eq!(state.enemy_base.take_damage(100), DamageOutcome::Ignored);

    let grace_s = state.config.defeat_grace_ms / 1000.0;
    state.advance(0.1);
    assert_eq!(state.outcome, MatchOutcome::InProgress);

    let mut elapsed = 0.0;
    while elapsed + 0.1 < grace_s - 1e-3 {
        state.advance(0.1);
        elapsed += 0.1;
        assert_eq!(state.outcome, MatchOutcome::InProgress);
    }
    for _ in 0..3 {
        state.advance(0.1);
    }
    assert_eq!(state.outcome, MatchOutcome::Won);
}

#[test]
fn test_units_march_and_reach_enemy_base() {
    let mut state = new_battle(5);
    state.config.max_energy = 10_000.0;
    state.energy = 10_000.0;
    // No enemy reinforcements in the way
    state.stage.enemy_spawn_interval_ms = 1.0e9;

    for _ in 0..6 {
        state.spawn_player_unit(0).unwrap();
    }

    let mut base_hit = false;
    for _ in 0..(60 * 60) {
        let log = state.advance(1.0 / 60.0);
        base_hit |= log.events.iter().any(|e| {
            matches!(
                e.event_type,
                BattleEventType::UnitAttacked {
                    target: TargetRef::Base,
                    ..
                }
            )
        });
        if state.is_over() {
            break;
        }
    }
    assert!(base_hit);
    assert_eq!(state.outcome, MatchOutcome::Won);
}

#[test]
fn test_enemy_waves_destroy_undefended_base() {
    let mut config = BattleConfig::default();
    config.player_base_max_hp = 200;
    let mut state = BattleState::new(
        config,
        stage("stage4"),
        TeamSelection::default(),
        ArchetypeCatalog::with_defaults(),
        11,
    )
    .unwrap();

    for _ in 0..(60 * 120) {
        state.advance(1.0 / 60.0);
        if state.is_over() {
            break;
        }
    }
    assert_eq!(state.outcome, MatchOutcome::Lost);
    assert!(state.player_base.is_defeated);
}

#[test]
fn test_enemy_draws_only_from_stage_table() {
    let mut state = BattleState::new(
        BattleConfig::default(),
        stage("stage3"),
        TeamSelection::default(),
        ArchetypeCatalog::with_defaults(),
        99,
    )
    .unwrap();

    let allowed = ["E001", "E002", "E003"];
    for _ in 0..40 {
        let log = state.advance(4.0);
        for event in &log.events {
            if let BattleEventType::UnitSpawned {
                team: Team::Enemy,
                archetype_id,
                ..
            } = &event.event_type
            {
                assert!(allowed.contains(&archetype_id.as_str()));
            }
        }
    }
}

#[test]
fn test_seeded_matches_replay_identically() {
    let run = |seed: u64| {
        let mut state = BattleState::new(
            BattleConfig::default(),
            stage("stage4"),
            TeamSelection::default(),
            ArchetypeCatalog::with_defaults(),
            seed,
        )
        .unwrap();
        let mut spawned = Vec::new();
        for _ in 0..30 {
            for event in state.advance(3.5).events {
                if let BattleEventType::UnitSpawned { archetype_id, .. } = event.event_type {
                    spawned.push(archetype_id);
                }
            }
        }
        spawned
    };
    assert_eq!(run(1234), run(1234));
}

#[test]
fn test_toml_catalogs_match_defaults() {
    let archetypes =
        ArchetypeCatalog::load_from_file(std::path::Path::new("data/archetypes.toml")).unwrap();
    let defaults = ArchetypeCatalog::with_defaults();
    assert_eq!(archetypes.ids(), defaults.ids());
    for id in defaults.ids() {
        assert_eq!(archetypes.get(id), defaults.get(id));
    }

    let stages = StageCatalog::load_from_toml(std::path::Path::new("data/stages.toml")).unwrap();
    let default_stages = StageCatalog::with_defaults();
    assert_eq!(stages.ids(), default_stages.ids());
    for id in default_stages.ids() {
        assert_eq!(stages.get(id).unwrap(), default_stages.get(id).unwrap());
    }
}

proptest! {
    #[test]
    fn prop_energy_never_exceeds_max(
        steps in proptest::collection::vec(0.0f32..2.0, 1..200),
        spawn_every in 1usize..10,
    ) {
        let mut state = new_battle(3);
        for (i, dt) in steps.iter().enumerate() {
            if i % spawn_every == 0 {
                let _ = state.spawn_player_unit(i % 4);
            }
            state.advance(*dt);
            prop_assert!(state.energy <= state.config.max_energy);
            prop_assert!(state.energy >= 0.0);
        }
    }

    #[test]
    fn prop_base_hp_stays_in_bounds(hits in proptest::collection::vec(-50i32..400, 0..40)) {
        let config = BattleConfig::default();
        let mut base = Base::new(Team::Enemy, 1000, &config);
        for amount in hits {
            base.take_damage(amount);
            prop_assert!(base.hp >= 0 && base.hp <= base.max_hp);
            prop_assert_eq!(base.is_alive, base.hp > 0);
        }
    }
}
