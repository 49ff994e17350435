//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the lane an entity fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    /// Sign of travel along the lane: player walks toward +x, enemy toward -x
    pub fn forward(&self) -> f32 {
        match self {
            Team::Player => 1.0,
            Team::Enemy => -1.0,
        }
    }

    pub fn opponent(&self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }
}

/// Unique instance token for a spawned unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulation frame counter
pub type Tick = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_forward_is_opposed() {
        assert_eq!(Team::Player.forward(), -Team::Enemy.forward());
    }

    #[test]
    fn test_team_opponent_roundtrip() {
        assert_eq!(Team::Player.opponent(), Team::Enemy);
        assert_eq!(Team::Player.opponent().opponent(), Team::Player);
    }

    #[test]
    fn test_unit_ids_are_unique() {
        let a = UnitId::new();
        let b = UnitId::new();
        assert_ne!(a, b);
    }
}
