//! Battle constants - fixed values that are not worth a config knob

/// Milliseconds per minute; attack cooldown = this / attacks-per-minute
pub const MS_PER_MINUTE: f32 = 60_000.0;

/// Stage used when none is requested
pub const DEFAULT_STAGE: &str = "stage1";

/// Team used when no selection is supplied
pub const DEFAULT_TEAM: [&str; 4] = ["P001", "P002", "P001", "P002"];

/// Level entry used for enemy spawns (enemies carry flat stats)
pub const ENEMY_LEVEL: usize = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_team_fills_every_slot() {
        assert_eq!(DEFAULT_TEAM.len(), 4);
        assert!(DEFAULT_TEAM.iter().all(|id| !id.is_empty()));
    }

    #[test]
    fn test_cooldown_scale() {
        // 90 attacks per minute -> one every 666ms
        assert!((MS_PER_MINUTE / 90.0 - 666.666).abs() < 0.01);
    }
}
