//! Serializable per-frame snapshot for the rendering sink

use serde::{Deserialize, Serialize};

use crate::battle::base::Base;
use crate::battle::execution::{BattleState, MatchOutcome};
use crate::battle::unit::{CombatUnit, UnitState};
use crate::core::types::{Team, UnitId};
use crate::game::session::MatchSession;

/// What a renderer needs to draw one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderUnit {
    pub id: UnitId,
    pub archetype_id: String,
    pub team: Team,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub is_alive: bool,
    pub state: UnitState,
}

impl RenderUnit {
    pub fn from_unit(unit: &CombatUnit) -> Self {
        Self {
            id: unit.id,
            archetype_id: unit.archetype_id.clone(),
            team: unit.team,
            x: unit.x,
            y: unit.y,
            width: unit.width,
            height: unit.height,
            hp: unit.hp,
            max_hp: unit.max_hp,
            is_alive: unit.is_alive,
            state: unit.state,
        }
    }

    /// Fraction of hp left, for health bars
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderBase {
    pub team: Team,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub is_alive: bool,
    pub is_defeated: bool,
}

impl From<&Base> for RenderBase {
    fn from(base: &Base) -> Self {
        Self {
            team: base.team,
            x: base.x,
            y: base.y,
            width: base.width,
            height: base.height,
            hp: base.hp,
            max_hp: base.max_hp,
            is_alive: base.is_alive,
            is_defeated: base.is_defeated,
        }
    }
}

/// Collects every unit on the field into a reusable buffer, player side first.
/// Call once per frame with the same buffer to avoid allocations.
pub fn collect_render_units(state: &BattleState, buffer: &mut Vec<RenderUnit>) {
    buffer.clear();
    buffer.extend(state.player_units.iter().map(RenderUnit::from_unit));
    buffer.extend(state.enemy_units.iter().map(RenderUnit::from_unit));
}

/// Full frame view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub song_time: f64,
    pub player_base: RenderBase,
    pub enemy_base: RenderBase,
    pub units: Vec<RenderUnit>,
    pub energy: f32,
    pub max_energy: f32,
    pub outcome: MatchOutcome,
    pub paused: bool,
    pub current_beat: Option<u32>,
    pub beat_lit: bool,
    pub feedback: Option<String>,
    /// Most recent successful inputs, oldest first
    pub recent_inputs: Vec<String>,
}

/// Inputs shown in the history strip
const RECENT_INPUTS_SHOWN: usize = 10;

impl RenderSnapshot {
    pub fn capture(session: &MatchSession) -> Self {
        let battle = session.battle();
        let mut units = Vec::with_capacity(battle.player_units.len() + battle.enemy_units.len());
        collect_render_units(battle, &mut units);

        Self {
            tick: battle.tick,
            song_time: session.song_time(),
            player_base: RenderBase::from(&battle.player_base),
            enemy_base: RenderBase::from(&battle.enemy_base),
            units,
            energy: battle.energy,
            max_energy: battle.config.max_energy,
            outcome: battle.outcome,
            paused: battle.paused,
            current_beat: session.current_beat(),
            beat_lit: session.beat_lit(),
            feedback: session.feedback_text().map(str::to_string),
            recent_inputs: session
                .recognizer()
                .recent(RECENT_INPUTS_SHOWN)
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
