//! Battle system - two bases, two rosters, units that walk and fight on their own
//!
//! The player never steers a unit. Units pick the nearest foe ahead of them,
//! walk until it is in range, then trade blows on a cooldown. The only player
//! lever is summoning, which spends energy.

pub mod archetype;
pub mod base;
pub mod combatant;
pub mod constants;
pub mod execution;
pub mod roster;
pub mod stage;
pub mod team;
pub mod unit;

// Re-exports for convenient access
pub use archetype::{ArchetypeCatalog, CharacterArchetype, LevelStats};
pub use base::Base;
pub use combatant::{Combatant, DamageOutcome};
pub use constants::*;
pub use execution::{BattleEvent, BattleEventLog, BattleEventType, BattleState, MatchOutcome};
pub use roster::Roster;
pub use stage::{pick_enemy_type, BgmTiming, EnemyWeight, StageCatalog, StageConfig};
pub use team::TeamSelection;
pub use unit::{AttackReport, CombatUnit, TargetRef, UnitState};
