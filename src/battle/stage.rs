//! Stage configuration: enemy base, spawn cadence, enemy table, music timing

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{BattleError, Result};

/// One entry of a stage's weighted enemy table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyWeight {
    pub id: String,
    pub weight: u32,
}

impl EnemyWeight {
    pub fn new(id: &str, weight: u32) -> Self {
        Self {
            id: id.to_string(),
            weight,
        }
    }
}

/// Background music timing for a stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BgmTiming {
    pub bpm: f32,
    /// Seconds the audio cue runs ahead of the beat
    #[serde(default)]
    pub offset: f32,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    0.7
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub id: String,
    pub name: String,
    #[serde(alias = "enemyBaseMaxHp")]
    pub enemy_base_max_hp: i32,
    #[serde(alias = "enemySpawnIntervalMs")]
    pub enemy_spawn_interval_ms: f32,
    #[serde(alias = "enemyTypes", alias = "enemyTypeWeights")]
    pub enemy_types: Vec<EnemyWeight>,
    pub bgm: BgmTiming,
}

impl StageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.enemy_types.is_empty() {
            return Err(BattleError::EmptyEnemyTable(self.id.clone()));
        }
        if self.enemy_base_max_hp <= 0 {
            return Err(BattleError::InvalidConfig(format!(
                "stage {} enemy base hp must be positive",
                self.id
            )));
        }
        if self.enemy_spawn_interval_ms <= 0.0 {
            return Err(BattleError::InvalidConfig(format!(
                "stage {} spawn interval must be positive",
                self.id
            )));
        }
        if self.bgm.bpm <= 0.0 {
            return Err(BattleError::InvalidConfig(format!(
                "stage {} bpm must be positive",
                self.id
            )));
        }
        Ok(())
    }
}

/// Weighted draw over an enemy table.
///
/// Draws uniformly in `[0, total)` and walks the table subtracting weights.
/// Falls back to the first entry when nothing is selected (all weights zero).
/// Returns `None` only for an empty table.
pub fn pick_enemy_type<'a, R: Rng + ?Sized>(
    types: &'a [EnemyWeight],
    rng: &mut R,
) -> Option<&'a str> {
    let first = types.first()?;
    let total: u32 = types.iter().map(|t| t.weight).sum();
    if total == 0 {
        return Some(&first.id);
    }

    let mut roll = rng.gen_range(0..total);
    for entry in types {
        if roll < entry.weight {
            return Some(&entry.id);
        }
        roll -= entry.weight;
    }
    Some(&first.id)
}

/// All known stages by id
#[derive(Debug, Clone, Default)]
pub struct StageCatalog {
    stages: AHashMap<String, StageConfig>,
}

impl StageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        let stage = |id: &str,
                     name: &str,
                     hp: i32,
                     interval: f32,
                     types: Vec<EnemyWeight>,
                     bpm: f32,
                     offset: f32,
                     volume: f32| StageConfig {
            id: id.to_string(),
            name: name.to_string(),
            enemy_base_max_hp: hp,
            enemy_spawn_interval_ms: interval,
            enemy_types: types,
            bgm: BgmTiming {
                bpm,
                offset,
                volume,
            },
        };

        catalog.add(stage(
            "stage1",
            "Forest Battle",
            1000,
            5000.0,
            vec![EnemyWeight::new("E001", 100)],
            120.0,
            0.75,
            0.75,
        ));
        catalog.add(stage(
            "stage2",
            "Desert Battle",
            2500,
            4000.0,
            vec![EnemyWeight::new("E001", 70), EnemyWeight::new("E002", 30)],
            140.0,
            0.0,
            0.7,
        ));
        catalog.add(stage(
            "stage3",
            "Desert Battle",
            1500,
            4000.0,
            vec![
                EnemyWeight::new("E001", 30),
                EnemyWeight::new("E002", 50),
                EnemyWeight::new("E003", 20),
            ],
            140.0,
            0.0,
            0.7,
        ));
        catalog.add(stage(
            "stage4",
            "Desert Battle",
            8000,
            3500.0,
            vec![
                EnemyWeight::new("E001", 10),
                EnemyWeight::new("E002", 30),
                EnemyWeight::new("E003", 30),
                EnemyWeight::new("E004", 10),
            ],
            140.0,
            0.0,
            0.7,
        ));
        catalog
    }

    pub fn add(&mut self, stage: StageConfig) {
        self.stages.insert(stage.id.clone(), stage);
    }

    pub fn get(&self, id: &str) -> Result<&StageConfig> {
        self.stages
            .get(id)
            .ok_or_else(|| BattleError::UnknownStage(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.stages.keys().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn load_from_toml(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a `[[stages]]` table list
    pub fn parse_toml(content: &str) -> Result<Self> {
        let data: TomlStages = toml::from_str(content)?;
        let mut catalog = Self::new();
        for stage in data.stages {
            stage.validate()?;
            catalog.add(stage);
        }
        Ok(catalog)
    }
}

#[derive(Debug, Deserialize)]
struct TomlStages {
    stages: Vec<StageConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_stages() {
        let catalog = StageCatalog::with_defaults();
        assert_eq!(catalog.len(), 4);
        let stage1 = catalog.get("stage1").unwrap();
        assert_eq!(stage1.enemy_base_max_hp, 1000);
        assert_eq!(stage1.enemy_spawn_interval_ms, 5000.0);
        assert_eq!(stage1.bgm.bpm, 120.0);
        assert_eq!(stage1.name, "Forest Battle");
        let stage4 = catalog.get("stage4").unwrap();
        assert_eq!(stage4.name, "Desert Battle");
        assert_eq!(stage4.enemy_types.len(), 4);
    }

    #[test]
    fn test_unknown_stage() {
        let catalog = StageCatalog::with_defaults();
        assert!(matches!(
            catalog.get("stage99"),
            Err(BattleError::UnknownStage(_))
        ));
    }

    #[test]
    fn test_pick_only_returns_table_ids() {
        let types = vec![EnemyWeight::new("E001", 70), EnemyWeight::new("E002", 30)];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen_second = false;
        for _ in 0..500 {
            let id = pick_enemy_type(&types, &mut rng).unwrap();
            assert!(id == "E001" || id == "E002");
            seen_second |= id == "E002";
        }
        assert!(seen_second);
    }

    #[test]
    fn test_pick_zero_weights_falls_back_to_first() {
        let types = vec![EnemyWeight::new("E003", 0), EnemyWeight::new("E001", 0)];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(pick_enemy_type(&types, &mut rng), Some("E003"));
        assert_eq!(pick_enemy_type(&[], &mut rng), None);
    }

    #[test]
    fn test_parse_toml_stage() {
        let toml_str = r#"
            [[stages]]
            id = "arena"
            name = "Arena"
            enemy_base_max_hp = 500
            enemy_spawn_interval_ms = 3000.0
            enemy_types = [{ id = "E001", weight = 1 }]
            bgm = { bpm = 100.0 }
        "#;
        let catalog = StageCatalog::parse_toml(toml_str).unwrap();
        let arena = catalog.get("arena").unwrap();
        assert_eq!(arena.bgm.offset, 0.0);
        assert_eq!(arena.bgm.volume, 0.7);
    }

    #[test]
    fn test_empty_enemy_table_rejected() {
        let toml_str = r#"
            [[stages]]
            id = "void"
            name = "Void"
            enemy_base_max_hp = 500
            enemy_spawn_interval_ms = 3000.0
            enemy_types = []
            bgm = { bpm = 100.0 }
        "#;
        assert!(matches!(
            StageCatalog::parse_toml(toml_str),
            Err(BattleError::EmptyEnemyTable(_))
        ));
    }
}
