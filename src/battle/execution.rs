//! Match orchestration loop
//!
//! Each tick: energy -> enemy spawn -> unit updates -> cleanup -> outcome

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::battle::archetype::ArchetypeCatalog;
use crate::battle::base::Base;
use crate::battle::combatant::DamageOutcome;
use crate::battle::constants::ENEMY_LEVEL;
use crate::battle::roster::Roster;
use crate::battle::stage::{pick_enemy_type, StageConfig};
use crate::battle::team::TeamSelection;
use crate::battle::unit::{AttackReport, CombatUnit, TargetRef};
use crate::core::config::BattleConfig;
use crate::core::error::{BattleError, Result, SpawnError};
use crate::core::types::{Team, Tick, UnitId};

/// Match outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchOutcome {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl MatchOutcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, MatchOutcome::InProgress)
    }
}

/// Log entry for battle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleEvent {
    pub tick: Tick,
    pub event_type: BattleEventType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventType {
    MatchStarted,
    UnitSpawned {
        unit_id: UnitId,
        team: Team,
        archetype_id: String,
    },
    UnitAttacked {
        attacker: UnitId,
        target: TargetRef,
        damage: i32,
    },
    UnitKilled { unit_id: UnitId },
    BaseDestroyed { team: Team },
    MatchEnded { outcome: MatchOutcome },
}

/// Log of events from a single tick
#[derive(Debug, Clone, Default)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: BattleEventType, description: String, tick: Tick) {
        self.events.push(BattleEvent {
            tick,
            event_type,
            description,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Complete match state
///
/// Everything that a restart must rebuild lives here; [`BattleState::reset`]
/// puts it back to the opening position.
#[derive(Debug, Clone)]
pub struct BattleState {
    // Inputs (read-only during a match)
    pub config: BattleConfig,
    pub stage: StageConfig,
    pub team: TeamSelection,
    archetypes: ArchetypeCatalog,
    seed: u64,
    rng: ChaCha8Rng,

    // Time
    pub tick: Tick,
    pub elapsed_ms: f64,
    pub paused: bool,
    pub outcome: MatchOutcome,

    // Economy
    pub energy: f32,

    // Field
    pub player_base: Base,
    pub enemy_base: Base,
    pub player_units: Roster,
    pub enemy_units: Roster,

    // Timers (ms)
    pub enemy_spawn_timer_ms: f32,
    /// Runs once the enemy base has fallen; the win lands when it reaches the grace delay
    pub defeat_timer_ms: Option<f32>,

    // Log
    pub battle_log: Vec<BattleEvent>,
}

impl BattleState {
    pub fn new(
        config: BattleConfig,
        stage: StageConfig,
        team: TeamSelection,
        archetypes: ArchetypeCatalog,
        seed: u64,
    ) -> Result<Self> {
        config.validate().map_err(BattleError::InvalidConfig)?;
        stage.validate()?;
        team.validate(config.max_team_size)
            .map_err(BattleError::InvalidConfig)?;

        let player_base = Base::new(Team::Player, config.player_base_max_hp, &config);
        let enemy_base = Base::new(Team::Enemy, stage.enemy_base_max_hp, &config);

        let mut state = Self {
            energy: config.starting_energy,
            config,
            stage,
            team,
            archetypes,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
            elapsed_ms: 0.0,
            paused: false,
            outcome: MatchOutcome::InProgress,
            player_base,
            enemy_base,
            player_units: Roster::new(Team::Player),
            enemy_units: Roster::new(Team::Enemy),
            enemy_spawn_timer_ms: 0.0,
            defeat_timer_ms: None,
            battle_log: Vec::new(),
        };
        state.log_started();
        Ok(state)
    }

    /// Rebuild every piece of per-match state; the rng restarts from the same seed
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.tick = 0;
        self.elapsed_ms = 0.0;
        self.paused = false;
        self.outcome = MatchOutcome::InProgress;
        self.energy = self.config.starting_energy;
        self.player_base = Base::new(Team::Player, self.config.player_base_max_hp, &self.config);
        self.enemy_base = Base::new(Team::Enemy, self.stage.enemy_base_max_hp, &self.config);
        self.player_units.clear();
        self.enemy_units.clear();
        self.enemy_spawn_timer_ms = 0.0;
        self.defeat_timer_ms = None;
        self.battle_log.clear();
        self.log_started();
    }

    fn log_started(&mut self) {
        info!(
            "Match started on {} (enemy base {} hp, seed {})",
            self.stage.id, self.stage.enemy_base_max_hp, self.seed
        );
        self.log_event(
            BattleEventType::MatchStarted,
            format!("Battle on {} begins", self.stage.name),
        );
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn archetypes(&self) -> &ArchetypeCatalog {
        &self.archetypes
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_over()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn log_event(&mut self, event_type: BattleEventType, description: String) {
        self.battle_log.push(BattleEvent {
            tick: self.tick,
            event_type,
            description,
        });
    }

    /// Run one simulation step of `dt` seconds.
    ///
    /// Does nothing once the outcome is decided, while paused, or when `dt` is
    /// negative or not finite. There is no sub-stepping: hosts should keep `dt`
    /// to a frame length, since at around 0.7 s two closing units can step past
    /// each other without fighting.
    pub fn advance(&mut self, dt: f32) -> BattleEventLog {
        let mut events = BattleEventLog::new();
        if self.outcome.is_over() || self.paused || !dt.is_finite() || dt < 0.0 {
            return events;
        }

        self.tick += 1;
        self.elapsed_ms += f64::from(dt) * 1000.0;

        self.phase_energy(dt);
        self.phase_enemy_spawn(dt, &mut events);
        self.phase_units(dt, &mut events);
        self.phase_cleanup();
        self.phase_outcome(dt, &mut events);

        self.battle_log.extend(events.events.iter().cloned());
        events
    }

    /// Phase 1: energy regeneration, clamped at the cap
    fn phase_energy(&mut self, dt: f32) {
        self.energy = (self.energy + self.config.energy_regen_rate * dt).min(self.config.max_energy);
    }

    /// Phase 2: enemy spawn timer
    fn phase_enemy_spawn(&mut self, dt: f32, events: &mut BattleEventLog) {
        if self.enemy_base.is_defeated {
            return;
        }

        self.enemy_spawn_timer_ms += dt * 1000.0;
        if self.enemy_spawn_timer_ms < self.stage.enemy_spawn_interval_ms {
            return;
        }
        self.enemy_spawn_timer_ms = 0.0;

        let Some(id) = pick_enemy_type(&self.stage.enemy_types, &mut self.rng).map(str::to_string)
        else {
            warn!("Stage {} has no enemy types", self.stage.id);
            return;
        };
        if let Ok(unit_id) = self.place_enemy(&id) {
            events.push(
                BattleEventType::UnitSpawned {
                    unit_id,
                    team: Team::Enemy,
                    archetype_id: id.clone(),
                },
                format!("Enemy {} appears", id),
                self.tick,
            );
        }
    }

    /// Phase 3: every player unit, then every enemy unit, against the opposing side.
    ///
    /// Rosters are only borrowed as slices here, so none can grow or shrink
    /// until cleanup.
    fn phase_units(&mut self, dt: f32, events: &mut BattleEventLog) {
        let mut reports: Vec<AttackReport> = Vec::new();

        let foes = self.enemy_units.as_mut_slice();
        for unit in self.player_units.as_mut_slice() {
            reports.extend(unit.update(dt, foes, &mut self.enemy_base));
        }

        let foes = self.player_units.as_mut_slice();
        for unit in self.enemy_units.as_mut_slice() {
            reports.extend(unit.update(dt, foes, &mut self.player_base));
        }

        for report in reports {
            self.record_attack(report, events);
        }
    }

    fn record_attack(&self, report: AttackReport, events: &mut BattleEventLog) {
        events.push(
            BattleEventType::UnitAttacked {
                attacker: report.attacker,
                target: report.target,
                damage: report.damage,
            },
            format!("{:?} unit hits {:?} for {}", report.attacker_team, report.target, report.damage),
            self.tick,
        );

        if report.outcome != DamageOutcome::Killed {
            return;
        }
        match report.target {
            TargetRef::Unit(unit_id) => {
                debug!("Unit {:?} killed", unit_id);
                events.push(
                    BattleEventType::UnitKilled { unit_id },
                    format!("{:?} unit falls", report.attacker_team.opponent()),
                    self.tick,
                );
            }
            TargetRef::Base => {
                let team = report.attacker_team.opponent();
                info!("{:?} base destroyed", team);
                events.push(
                    BattleEventType::BaseDestroyed { team },
                    format!("The {:?} base collapses", team),
                    self.tick,
                );
            }
        }
    }

    /// Phase 4: drop dead units
    fn phase_cleanup(&mut self) {
        let removed = self.player_units.remove_dead() + self.enemy_units.remove_dead();
        if removed > 0 {
            debug!("Removed {} dead units", removed);
        }
    }

    /// Phase 5: decide the match.
    ///
    /// A fallen player base loses at once. A fallen enemy base starts the grace
    /// timer; once the timer runs the win is locked in and a later loss of the
    /// player base does not overturn it.
    fn phase_outcome(&mut self, dt: f32, events: &mut BattleEventLog) {
        let win_pending = self.defeat_timer_ms.is_some();

        if self.player_base.is_defeated && !win_pending {
            self.end_match(MatchOutcome::Lost, events);
            return;
        }

        if self.enemy_base.is_defeated {
            let timer = match self.defeat_timer_ms {
                // First tick after the collapse; the animation starts now
                None => 0.0,
                Some(t) => t + dt * 1000.0,
            };
            self.defeat_timer_ms = Some(timer);
            if timer >= self.config.defeat_grace_ms {
                self.end_match(MatchOutcome::Won, events);
            }
        }
    }

    fn end_match(&mut self, outcome: MatchOutcome, events: &mut BattleEventLog) {
        self.outcome = outcome;
        info!("Match ended: {:?} after {} ticks", outcome, self.tick);
        events.push(
            BattleEventType::MatchEnded { outcome },
            format!("Match over: {:?}", outcome),
            self.tick,
        );
    }

    /// Level entry a slot summons at
    pub fn level_for_slot(&self, slot: usize) -> usize {
        if self.config.slot_levels {
            slot
        } else {
            0
        }
    }

    /// Summon the character in `slot`, paying its energy cost.
    ///
    /// On any rejection nothing about the match changes.
    pub fn spawn_player_unit(&mut self, slot: usize) -> std::result::Result<UnitId, SpawnError> {
        let unit = match self.prepare_player_unit(slot) {
            Ok(unit) => unit,
            Err(e) => {
                warn!("Summon from slot {} rejected: {}", slot, e);
                return Err(e);
            }
        };

        let cost = self
            .archetypes
            .get(&unit.archetype_id)
            .map_or(0.0, |a| a.cost as f32);
        self.energy -= cost;

        let unit_id = unit.id;
        debug!(
            "Summoned {} (level {}) for {} energy, {:.0} left",
            unit.name,
            unit.level + 1,
            cost,
            self.energy
        );
        self.log_event(
            BattleEventType::UnitSpawned {
                unit_id,
                team: Team::Player,
                archetype_id: unit.archetype_id.clone(),
            },
            format!("{} joins the fight", unit.name),
        );
        self.player_units.push(unit);
        Ok(unit_id)
    }

    /// All checks for a summon, without touching state
    fn prepare_player_unit(&self, slot: usize) -> std::result::Result<CombatUnit, SpawnError> {
        if self.outcome.is_over() {
            return Err(SpawnError::MatchOver);
        }
        let id = self.team.archetype_at(slot)?;
        let archetype = self
            .archetypes
            .get(id)
            .ok_or_else(|| SpawnError::UnknownArchetype {
                id: id.to_string(),
                team: Team::Player,
            })?;
        let level = self.level_for_slot(slot);
        let x = self.player_base.front() + self.config.player_spawn_gap;
        let unit = CombatUnit::spawn(archetype, level, Team::Player, x, &self.config).ok_or_else(
            || SpawnError::MissingLevelStats {
                id: id.to_string(),
                level: level + 1,
            },
        )?;

        let cost = archetype.cost as f32;
        if self.energy < cost {
            return Err(SpawnError::InsufficientEnergy {
                id: id.to_string(),
                cost,
                available: self.energy,
            });
        }
        Ok(unit)
    }

    /// Spawn an enemy of archetype `id` in front of the enemy base. Free of charge.
    pub fn spawn_enemy_unit(&mut self, id: &str) -> std::result::Result<UnitId, SpawnError> {
        let unit_id = self.place_enemy(id)?;
        self.log_event(
            BattleEventType::UnitSpawned {
                unit_id,
                team: Team::Enemy,
                archetype_id: id.to_string(),
            },
            format!("Enemy {} appears", id),
        );
        Ok(unit_id)
    }

    fn place_enemy(&mut self, id: &str) -> std::result::Result<UnitId, SpawnError> {
        if self.outcome.is_over() {
            return Err(SpawnError::MatchOver);
        }
        let Some(archetype) = self.archetypes.get(id) else {
            warn!("Enemy spawn skipped: unknown archetype {}", id);
            return Err(SpawnError::UnknownArchetype {
                id: id.to_string(),
                team: Team::Enemy,
            });
        };
        let x = self.enemy_base.front() - self.config.enemy_spawn_gap;
        let Some(unit) = CombatUnit::spawn(archetype, ENEMY_LEVEL, Team::Enemy, x, &self.config)
        else {
            warn!("Enemy spawn skipped: {} has no level {} stats", id, ENEMY_LEVEL + 1);
            return Err(SpawnError::MissingLevelStats {
                id: id.to_string(),
                level: ENEMY_LEVEL + 1,
            });
        };

        debug!("Enemy {} spawned at x={:.0}", unit.name, unit.x);
        let unit_id = unit.id;
        self.enemy_units.push(unit);
        Ok(unit_id)
    }
}
