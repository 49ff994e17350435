//! Everything a match needs, acquired up front
//!
//! A session is only built from a complete [`MatchAssets`]. Any missing or
//! malformed file fails the load, so there is never a partially configured match.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::battle::archetype::ArchetypeCatalog;
use crate::battle::constants::ENEMY_LEVEL;
use crate::battle::stage::StageCatalog;
use crate::core::config::{BattleConfig, RhythmConfig};
use crate::core::error::{BattleError, Result};
use crate::rhythm::pattern::{default_patterns, parse_patterns_toml, KnownPattern};

pub const ARCHETYPES_TOML: &str = "archetypes.toml";
pub const ARCHETYPES_JSON: &str = "characters.json";
pub const STAGES_TOML: &str = "stages.toml";
pub const PATTERNS_TOML: &str = "patterns.toml";
pub const CONFIG_TOML: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct MatchAssets {
    pub archetypes: ArchetypeCatalog,
    pub stages: StageCatalog,
    pub patterns: Vec<KnownPattern>,
    pub battle: BattleConfig,
    pub rhythm: RhythmConfig,
}

/// Optional overrides file: `[battle]` and `[rhythm]` tables
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    battle: BattleConfig,
    rhythm: RhythmConfig,
}

impl MatchAssets {
    /// Built-in tables and default configuration
    pub fn with_defaults() -> Self {
        Self {
            archetypes: ArchetypeCatalog::with_defaults(),
            stages: StageCatalog::with_defaults(),
            patterns: default_patterns(),
            battle: BattleConfig::default(),
            rhythm: RhythmConfig::default(),
        }
    }

    /// Load every table from `dir`.
    ///
    /// Archetypes come from `archetypes.toml`, or `characters.json` when the TOML
    /// file is absent. `stages.toml` and `patterns.toml` are required;
    /// `config.toml` is optional.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let toml_path = dir.join(ARCHETYPES_TOML);
        let archetypes = if toml_path.exists() {
            ArchetypeCatalog::load_from_file(&toml_path)?
        } else {
            ArchetypeCatalog::load_from_file(&dir.join(ARCHETYPES_JSON))?
        };
        let stages = StageCatalog::load_from_toml(&dir.join(STAGES_TOML))?;
        let patterns = parse_patterns_toml(&std::fs::read_to_string(dir.join(PATTERNS_TOML))?)?;

        let config_path = dir.join(CONFIG_TOML);
        let config = if config_path.exists() {
            toml::from_str::<ConfigFile>(&std::fs::read_to_string(config_path)?)?
        } else {
            ConfigFile::default()
        };

        let assets = Self {
            archetypes,
            stages,
            patterns,
            battle: config.battle,
            rhythm: config.rhythm,
        };
        assets.validate()?;

        info!(
            "Loaded {} archetypes, {} stages, {} patterns from {}",
            assets.archetypes.len(),
            assets.stages.len(),
            assets.patterns.len(),
            dir.display()
        );
        Ok(assets)
    }

    /// Cross-table checks: every stage enemy exists, every pattern slot fits the team
    pub fn validate(&self) -> Result<()> {
        self.battle.validate().map_err(BattleError::InvalidConfig)?;
        self.rhythm.validate().map_err(BattleError::InvalidConfig)?;

        for stage_id in self.stages.ids() {
            let stage = self.stages.get(stage_id)?;
            for enemy in &stage.enemy_types {
                let Some(archetype) = self.archetypes.get(&enemy.id) else {
                    return Err(BattleError::UnknownArchetype(format!(
                        "{} (enemy table of {})",
                        enemy.id, stage_id
                    )));
                };
                if archetype.stats_for_level(ENEMY_LEVEL).is_none() {
                    return Err(BattleError::MissingLevelStats {
                        id: enemy.id.clone(),
                        level: ENEMY_LEVEL + 1,
                    });
                }
            }
        }

        for pattern in &self.patterns {
            if pattern.slot >= self.battle.max_team_size {
                return Err(BattleError::InvalidConfig(format!(
                    "pattern {} targets slot {} but the team has {} slots",
                    pattern.name,
                    pattern.slot + 1,
                    self.battle.max_team_size
                )));
            }
        }
        Ok(())
    }
}

impl Default for MatchAssets {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::stage::EnemyWeight;

    #[test]
    fn test_defaults_are_consistent() {
        assert!(MatchAssets::with_defaults().validate().is_ok());
    }

    #[test]
    fn test_unknown_enemy_in_stage_rejected() {
        let mut assets = MatchAssets::with_defaults();
        let mut stage = assets.stages.get("stage1").unwrap().clone();
        stage.enemy_types.push(EnemyWeight::new("E999", 5));
        assets.stages.add(stage);
        assert!(matches!(
            assets.validate(),
            Err(BattleError::UnknownArchetype(_))
        ));
    }

    #[test]
    fn test_enemy_without_stats_rejected() {
        let mut assets = MatchAssets::with_defaults();
        let mut doge = assets.archetypes.get("E001").unwrap().clone();
        doge.level_stats.clear();
        assets.archetypes.add(doge);
        assert!(matches!(
            assets.validate(),
            Err(BattleError::MissingLevelStats { .. })
        ));
    }

    #[test]
    fn test_pattern_slot_out_of_team_rejected() {
        let mut assets = MatchAssets::with_defaults();
        assets.patterns.push(KnownPattern::new("slot9", 8, &["z", "z"]).unwrap());
        assert!(matches!(
            assets.validate(),
            Err(BattleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_dir_fails() {
        let result = MatchAssets::load_dir(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(BattleError::IoError(_))));
    }
}
