pub mod config;
pub mod error;
pub mod types;

pub use config::{BattleConfig, RhythmConfig};
pub use error::{BattleError, Result, SpawnError};
pub use types::{Team, UnitId};
