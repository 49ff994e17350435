//! Shared surface of anything that can be targeted: units and bases

use serde::{Deserialize, Serialize};

use crate::core::types::Team;

/// Result of a `take_damage` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Target was already dead
    Ignored,
    Damaged { remaining: i32 },
    /// This hit brought hp to zero
    Killed,
}

impl DamageOutcome {
    pub fn is_kill(&self) -> bool {
        matches!(self, DamageOutcome::Killed)
    }
}

pub trait Combatant {
    fn team(&self) -> Team;
    /// Left edge on the lane
    fn x(&self) -> f32;
    fn width(&self) -> f32;
    fn hp(&self) -> i32;
    fn max_hp(&self) -> i32;
    fn is_alive(&self) -> bool;
    fn take_damage(&mut self, amount: i32) -> DamageOutcome;

    /// Edge that faces an opponent of `attacker`'s team.
    ///
    /// An attacker walking +x meets our left edge; one walking -x meets our right edge.
    fn facing_edge(&self, attacker: Team) -> f32 {
        match attacker {
            Team::Player => self.x(),
            Team::Enemy => self.x() + self.width(),
        }
    }
}

/// Shared damage rule: no-op when dead, clamp at zero, report the kill once
pub(crate) fn apply_damage(hp: &mut i32, is_alive: &mut bool, amount: i32) -> DamageOutcome {
    if !*is_alive {
        return DamageOutcome::Ignored;
    }
    *hp = (*hp - amount.max(0)).max(0);
    if *hp == 0 {
        *is_alive = false;
        DamageOutcome::Killed
    } else {
        DamageOutcome::Damaged { remaining: *hp }
    }
}
