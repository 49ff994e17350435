//! Character archetypes - the static templates units are spawned from
//!
//! The catalog is read-only during a match. It loads from TOML (`data/archetypes.toml`)
//! or from a JSON character table keyed by id.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::constants::MS_PER_MINUTE;
use crate::core::error::{BattleError, Result};

/// Stats for one level of an archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    pub hp: i32,
    #[serde(alias = "atk")]
    pub attack: i32,
    /// World units per second
    pub speed: f32,
    /// Attacks per minute
    pub frequency: f32,
    #[serde(alias = "attackRange")]
    pub attack_range: f32,
}

impl LevelStats {
    /// Milliseconds between attacks
    pub fn attack_cooldown_ms(&self) -> f32 {
        if self.frequency <= 0.0 {
            return f32::INFINITY;
        }
        MS_PER_MINUTE / self.frequency
    }
}

/// Static template for a summonable (or spawnable) character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterArchetype {
    pub id: String,
    pub name: String,
    /// Energy needed to summon (enemies ignore it)
    #[serde(default)]
    pub cost: u32,
    /// Index 0 = level 1
    #[serde(alias = "levelStats")]
    pub level_stats: Vec<LevelStats>,
}

impl CharacterArchetype {
    pub fn stats_for_level(&self, level: usize) -> Option<&LevelStats> {
        self.level_stats.get(level)
    }
}

/// Lookup table of archetypes by id
#[derive(Debug, Clone, Default)]
pub struct ArchetypeCatalog {
    archetypes: AHashMap<String, CharacterArchetype>,
}

impl ArchetypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in roster: two player characters and four enemy types
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        let stats = |hp, attack, speed, frequency, attack_range| LevelStats {
            hp,
            attack,
            speed,
            frequency,
            attack_range,
        };

        catalog.add(CharacterArchetype {
            id: "P001".into(),
            name: "Drum Knight".into(),
            cost: 50,
            level_stats: vec![
                stats(150, 30, 40.0, 60.0, 40.0),
                stats(180, 36, 42.0, 66.0, 40.0),
                stats(220, 44, 44.0, 72.0, 40.0),
                stats(260, 52, 46.0, 78.0, 40.0),
            ],
        });
        catalog.add(CharacterArchetype {
            id: "P002".into(),
            name: "Flute Archer".into(),
            cost: 100,
            level_stats: vec![
                stats(100, 25, 35.0, 80.0, 120.0),
                stats(120, 30, 36.0, 86.0, 130.0),
                stats(140, 36, 37.0, 92.0, 140.0),
                stats(165, 42, 38.0, 100.0, 150.0),
            ],
        });

        // Enemies carry flat stats in a single level entry
        let enemies = [
            ("E001", "Basic Doge", stats(200, 40, 30.0, 90.0, 40.0)),
            ("E002", "Armored Doge", stats(400, 50, 22.0, 60.0, 40.0)),
            ("E003", "Swift Doge", stats(150, 30, 55.0, 120.0, 35.0)),
            ("E004", "Doge Cannon", stats(300, 90, 18.0, 30.0, 160.0)),
        ];
        for (id, name, level) in enemies {
            catalog.add(CharacterArchetype {
                id: id.into(),
                name: name.into(),
                cost: 0,
                level_stats: vec![level],
            });
        }

        catalog
    }

    /// Add or replace an archetype
    pub fn add(&mut self, archetype: CharacterArchetype) {
        self.archetypes.insert(archetype.id.clone(), archetype);
    }

    pub fn get(&self, id: &str) -> Option<&CharacterArchetype> {
        self.archetypes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.archetypes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.archetypes.keys().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Load from a `.toml` or `.json` file (chosen by extension)
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::parse_json(&content),
            _ => Self::parse_toml(&content),
        }
    }

    /// Parse a `[[archetypes]]` table list
    pub fn parse_toml(content: &str) -> Result<Self> {
        let data: TomlArchetypes = toml::from_str(content)?;

        let mut catalog = Self::new();
        for archetype in data.archetypes {
            validate_archetype(&archetype)?;
            catalog.add(archetype);
        }
        Ok(catalog)
    }

    /// Parse the JSON character table: an object keyed by id
    pub fn parse_json(content: &str) -> Result<Self> {
        let data: std::collections::BTreeMap<String, JsonArchetype> =
            serde_json::from_str(content)?;

        let mut catalog = Self::new();
        for (id, entry) in data {
            let archetype = CharacterArchetype {
                id,
                name: entry.name,
                cost: entry.cost,
                level_stats: entry.level_stats,
            };
            validate_archetype(&archetype)?;
            catalog.add(archetype);
        }
        Ok(catalog)
    }
}

fn validate_archetype(archetype: &CharacterArchetype) -> Result<()> {
    if archetype.level_stats.is_empty() {
        return Err(BattleError::InvalidConfig(format!(
            "archetype {} has no level stats",
            archetype.id
        )));
    }
    for (level, stats) in archetype.level_stats.iter().enumerate() {
        if stats.hp <= 0 || stats.frequency <= 0.0 || stats.speed < 0.0 || stats.attack_range < 0.0
        {
            return Err(BattleError::InvalidConfig(format!(
                "archetype {} level {} has invalid stats",
                archetype.id,
                level + 1
            )));
        }
    }
    Ok(())
}

/// TOML representation of the archetype file
#[derive(Debug, Deserialize)]
struct TomlArchetypes {
    archetypes: Vec<CharacterArchetype>,
}

/// JSON character entry (id is the map key; extra fields such as `image` are ignored)
#[derive(Debug, Deserialize)]
struct JsonArchetype {
    name: String,
    #[serde(default)]
    cost: u32,
    #[serde(rename = "levelStats", alias = "level_stats")]
    level_stats: Vec<LevelStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_contain_team_and_enemies() {
        let catalog = ArchetypeCatalog::with_defaults();
        for id in ["P001", "P002", "E001", "E002", "E003", "E004"] {
            assert!(catalog.contains(id), "missing {}", id);
        }
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_basic_enemy_stats() {
        let catalog = ArchetypeCatalog::with_defaults();
        let doge = catalog.get("E001").unwrap();
        let stats = doge.stats_for_level(0).unwrap();
        assert_eq!(stats.hp, 200);
        assert_eq!(stats.attack, 40);
        assert_eq!(stats.attack_range, 40.0);
        assert!(doge.stats_for_level(1).is_none());
    }

    #[test]
    fn test_cooldown_from_frequency() {
        let stats = LevelStats {
            hp: 1,
            attack: 1,
            speed: 1.0,
            frequency: 60.0,
            attack_range: 1.0,
        };
        assert_eq!(stats.attack_cooldown_ms(), 1000.0);
    }

    #[test]
    fn test_parse_json_character_table() {
        let json = r#"{
            "P009": {
                "name": "Bass Golem",
                "cost": 150,
                "image": "assets/images/golem.png",
                "levelStats": [
                    { "hp": 500, "atk": 60, "speed": 20, "frequency": 40, "attackRange": 45 }
                ]
            }
        }"#;
        let catalog = ArchetypeCatalog::parse_json(json).unwrap();
        let golem = catalog.get("P009").unwrap();
        assert_eq!(golem.cost, 150);
        assert_eq!(golem.level_stats[0].attack, 60);
        assert_eq!(golem.level_stats[0].attack_range, 45.0);
    }

    #[test]
    fn test_parse_toml_archetypes() {
        let toml_str = r#"
            [[archetypes]]
            id = "P001"
            name = "Drum Knight"
            cost = 50
            level_stats = [
                { hp = 150, attack = 30, speed = 40.0, frequency = 60.0, attack_range = 40.0 },
            ]
        "#;
        let catalog = ArchetypeCatalog::parse_toml(toml_str).unwrap();
        let knight = catalog.get("P001").unwrap();
        assert_eq!(knight.stats_for_level(0).unwrap().hp, 150);
    }

    #[test]
    fn test_empty_level_table_rejected() {
        let toml_str = r#"
            [[archetypes]]
            id = "X"
            name = "Nobody"
            level_stats = []
        "#;
        assert!(ArchetypeCatalog::parse_toml(toml_str).is_err());
    }
}
