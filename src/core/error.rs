use thiserror::Error;

use crate::core::types::Team;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),

    #[error("Archetype {id} has no stats for level {level}")]
    MissingLevelStats { id: String, level: usize },

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Stage {0} has no enemy types")]
    EmptyEnemyTable(String),

    #[error("Invalid input symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BattleError>;

/// Why a summon request was turned down. None of these mutate match state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpawnError {
    #[error("Match is already over")]
    MatchOver,

    #[error("Match is paused")]
    Paused,

    #[error("Slot {slot} is outside the team (size {team_size})")]
    SlotOutOfRange { slot: usize, team_size: usize },

    #[error("No character assigned to slot {0}")]
    EmptySlot(usize),

    #[error("Data not found for {team:?} archetype {id}")]
    UnknownArchetype { id: String, team: Team },

    #[error("Level {level} stats not found for {id}")]
    MissingLevelStats { id: String, level: usize },

    #[error("Not enough energy for {id}: need {cost}, have {available:.0}")]
    InsufficientEnergy {
        id: String,
        cost: f32,
        available: f32,
    },
}
