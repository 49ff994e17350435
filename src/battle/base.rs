//! Team bases at either end of the lane

use serde::{Deserialize, Serialize};

use crate::battle::combatant::{apply_damage, Combatant, DamageOutcome};
use crate::core::config::BattleConfig;
use crate::core::types::Team;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub team: Team,
    pub max_hp: i32,
    pub hp: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub is_alive: bool,
    /// Latched the first time hp reaches zero
    pub is_defeated: bool,
}

impl Base {
    /// Player base sits at the left edge of the field, enemy base flush right
    pub fn new(team: Team, max_hp: i32, config: &BattleConfig) -> Self {
        let x = match team {
            Team::Player => 0.0,
            Team::Enemy => config.field_width - config.base_width,
        };
        let max_hp = max_hp.max(1);
        Self {
            team,
            max_hp,
            hp: max_hp,
            x,
            y: config.field_height - config.base_height - config.ground_margin,
            width: config.base_width,
            height: config.base_height,
            is_alive: true,
            is_defeated: false,
        }
    }

    /// Edge facing the opposing base
    pub fn front(&self) -> f32 {
        match self.team {
            Team::Player => self.x + self.width,
            Team::Enemy => self.x,
        }
    }
}

impl Combatant for Base {
    fn team(&self) -> Team {
        self.team
    }

    fn x(&self) -> f32 {
        self.x
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn hp(&self) -> i32 {
        self.hp
    }

    fn max_hp(&self) -> i32 {
        self.max_hp
    }

    fn is_alive(&self) -> bool {
        self.is_alive
    }

    fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        let outcome = apply_damage(&mut self.hp, &mut self.is_alive, amount);
        if outcome.is_kill() {
            self.is_defeated = true;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_placement() {
        let config = BattleConfig::default();
        let player = Base::new(Team::Player, 1000, &config);
        let enemy = Base::new(Team::Enemy, 1000, &config);
        assert_eq!(player.x, 0.0);
        assert_eq!(player.front(), 60.0);
        assert_eq!(enemy.x, 940.0);
        assert_eq!(enemy.front(), 940.0);
        assert_eq!(player.y, 290.0);
    }

    #[test]
    fn test_ten_hits_defeat_base() {
        let config = BattleConfig::default();
        let mut base = Base::new(Team::Enemy, 1000, &config);
        for _ in 0..9 {
            base.take_damage(100);
        }
        assert!(!base.is_defeated);
        assert_eq!(base.take_damage(100), DamageOutcome::Killed);
        assert_eq!(base.hp, 0);
        assert!(base.is_defeated);
        assert!(!base.is_alive);
        assert_eq!(base.take_damage(100), DamageOutcome::Ignored);
        assert!(base.is_defeated);
    }
}
