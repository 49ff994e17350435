//! The player's selected roster: up to four archetype ids, gaps allowed

use serde::{Deserialize, Serialize};

use crate::battle::constants::DEFAULT_TEAM;
use crate::core::error::SpawnError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSelection {
    pub slots: Vec<Option<String>>,
}

impl TeamSelection {
    pub fn new(slots: Vec<Option<String>>) -> Self {
        Self { slots }
    }

    /// Build from plain ids; an empty string leaves the slot open
    pub fn from_ids(ids: &[&str]) -> Self {
        Self {
            slots: ids
                .iter()
                .map(|id| {
                    if id.is_empty() {
                        None
                    } else {
                        Some(id.to_string())
                    }
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn validate(&self, max_team_size: usize) -> Result<(), String> {
        if self.slots.len() > max_team_size {
            return Err(format!(
                "team has {} slots, at most {} allowed",
                self.slots.len(),
                max_team_size
            ));
        }
        Ok(())
    }

    /// Archetype id assigned to `slot`
    pub fn archetype_at(&self, slot: usize) -> Result<&str, SpawnError> {
        match self.slots.get(slot) {
            None => Err(SpawnError::SlotOutOfRange {
                slot,
                team_size: self.slots.len(),
            }),
            Some(None) => Err(SpawnError::EmptySlot(slot)),
            Some(Some(id)) => Ok(id.as_str()),
        }
    }
}

impl Default for TeamSelection {
    fn default() -> Self {
        Self::from_ids(&DEFAULT_TEAM)
    }
}
