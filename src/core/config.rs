//! Match configuration with documented constants
//!
//! All tuning numbers live here. Stage data (enemy base hp, spawn interval,
//! tempo) comes from the stage catalog and is layered on top at match start.

use serde::{Deserialize, Serialize};

/// Configuration for the lane battle
///
/// Default pacing: a 100-energy opening,
/// a 500 cap and 15 energy per second means the first cheap summon is
/// available immediately and the cap is reached after roughly half a minute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === ENERGY ===
    /// Energy the player holds when the match starts
    pub starting_energy: f32,

    /// Hard ceiling for player energy
    pub max_energy: f32,

    /// Energy gained per second of simulated time
    pub energy_regen_rate: f32,

    // === OUTCOME ===
    /// Delay between the enemy base falling and the win being reported (ms)
    ///
    /// The enemy base plays a defeat animation during this window. The
    /// player base has no such delay: its destruction is a loss at once.
    pub defeat_grace_ms: f32,

    // === FIELD GEOMETRY (world units) ===
    /// Length of the lane. The enemy base sits flush with this edge.
    pub field_width: f32,

    /// Height of the playfield; the ground line is measured up from here
    pub field_height: f32,

    /// Gap between the ground line and the bottom of the field
    pub ground_margin: f32,

    pub base_width: f32,
    pub base_height: f32,

    /// Hit points of the player base (enemy base hp comes from the stage)
    pub player_base_max_hp: i32,

    pub unit_width: f32,
    pub unit_height: f32,

    /// Player units appear this far in front of the player base
    pub player_spawn_gap: f32,

    /// Enemy units appear with their left edge this far behind the enemy base front
    pub enemy_spawn_gap: f32,

    // === TEAM ===
    /// Number of summon slots
    pub max_team_size: usize,

    /// When true the slot index picks the archetype's level entry
    /// (slot 0 = level 1, slot 3 = level 4). When false every slot uses level 1.
    pub slot_levels: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            starting_energy: 100.0,
            max_energy: 500.0,
            energy_regen_rate: 15.0,

            defeat_grace_ms: 2000.0,

            field_width: 1000.0,
            field_height: 400.0,
            ground_margin: 10.0,
            base_width: 60.0,
            base_height: 100.0,
            player_base_max_hp: 1000,
            unit_width: 30.0,
            unit_height: 50.0,
            player_spawn_gap: 5.0,
            enemy_spawn_gap: 35.0,

            max_team_size: 4,
            slot_levels: true,
        }
    }
}

impl BattleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.max_energy <= 0.0 {
            return Err("max_energy must be positive".into());
        }

        if self.starting_energy < 0.0 || self.starting_energy > self.max_energy {
            return Err(format!(
                "starting_energy ({}) must lie in [0, max_energy ({})]",
                self.starting_energy, self.max_energy
            ));
        }

        if self.energy_regen_rate < 0.0 {
            return Err("energy_regen_rate must not be negative".into());
        }

        // Both bases plus at least one unit must fit on the lane
        if self.field_width <= 2.0 * self.base_width + self.unit_width {
            return Err(format!(
                "field_width ({}) is too short for two bases of width {}",
                self.field_width, self.base_width
            ));
        }

        if self.player_base_max_hp <= 0 {
            return Err("player_base_max_hp must be positive".into());
        }

        if self.max_team_size == 0 {
            return Err("max_team_size must be at least 1".into());
        }

        Ok(())
    }
}

/// Configuration for the rhythm layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    /// Half-width of the judgment window around each beat (seconds)
    ///
    /// At 120 bpm the beat interval is 0.5 s, so 0.2 s of tolerance accepts
    /// 80% of the timeline. Faster stages tighten this in relative terms.
    pub tolerance: f32,

    /// Tempo used when a stage does not specify one
    pub default_bpm: f32,

    /// Audio latency compensation used when a stage does not specify one
    pub default_offset: f32,

    /// Song length and therefore match length
    pub time_limit_minutes: f32,

    /// Maximum number of successful inputs remembered
    pub history_capacity: usize,

    /// Number of most recent inputs the pattern matcher looks at
    pub match_window: usize,

    /// How long judgment / summon feedback text stays visible (ms)
    pub feedback_ms: f32,

    /// How long the beat indicator stays lit after each beat (ms)
    pub beat_blink_ms: f32,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.2,
            default_bpm: 120.0,
            default_offset: 0.1,
            time_limit_minutes: 2.0,
            history_capacity: 15,
            match_window: 8,
            feedback_ms: 600.0,
            beat_blink_ms: 100.0,
        }
    }
}

impl RhythmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tolerance <= 0.0 {
            return Err("tolerance must be positive".into());
        }

        if self.default_bpm <= 0.0 {
            return Err("default_bpm must be positive".into());
        }

        // Windows wider than half a beat would overlap their neighbours
        let half_interval = 30.0 / self.default_bpm;
        if self.tolerance > half_interval {
            return Err(format!(
                "tolerance ({}) exceeds half a beat at {} bpm ({:.3})",
                self.tolerance, self.default_bpm, half_interval
            ));
        }

        if self.time_limit_minutes <= 0.0 {
            return Err("time_limit_minutes must be positive".into());
        }

        if self.match_window == 0 || self.history_capacity < self.match_window {
            return Err(format!(
                "history_capacity ({}) must be >= match_window ({}) > 0",
                self.history_capacity, self.match_window
            ));
        }

        Ok(())
    }
}
