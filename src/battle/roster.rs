//! Per-team collection of live units

use serde::{Deserialize, Serialize};

use crate::battle::unit::CombatUnit;
use crate::core::types::{Team, UnitId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub team: Team,
    units: Vec<CombatUnit>,
}

impl Roster {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            units: Vec::new(),
        }
    }

    pub fn push(&mut self, unit: CombatUnit) {
        self.units.push(unit);
    }

    /// Drop every dead unit, returning how many were removed
    pub fn remove_dead(&mut self) -> usize {
        let before = self.units.len();
        self.units.retain(|u| u.is_alive);
        before - self.units.len()
    }

    pub fn get(&self, id: UnitId) -> Option<&CombatUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_alive).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatUnit> {
        self.units.iter()
    }

    /// Fixed-length view; units can be updated and damaged but not added or removed
    pub fn as_mut_slice(&mut self) -> &mut [CombatUnit] {
        &mut self.units
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }
}
