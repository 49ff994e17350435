//! Combat units and their seek -> approach -> engage -> attack loop
//!
//! A unit never owns its target. It stores a [`TargetRef`] handle and resolves
//! it against the opposing roster every tick, so a target that died or was
//! removed is simply dropped and the search runs again.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::archetype::CharacterArchetype;
use crate::battle::base::Base;
use crate::battle::combatant::{apply_damage, Combatant, DamageOutcome};
use crate::core::config::BattleConfig;
use crate::core::types::{Team, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitState {
    /// No target at all; walking forward
    Seeking,
    /// Has a target that is still out of range
    Approaching,
    /// Target within range; standing still and attacking
    Engaging,
    Dead,
}

/// Handle to whatever a unit is fighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    Unit(UnitId),
    /// The opposing base
    Base,
}

/// A single landed attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    pub attacker: UnitId,
    pub attacker_team: Team,
    pub target: TargetRef,
    pub damage: i32,
    pub outcome: DamageOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatUnit {
    pub id: UnitId,
    pub archetype_id: String,
    pub name: String,
    pub team: Team,
    /// Zero-based level index the stats were taken from
    pub level: usize,

    pub max_hp: i32,
    pub hp: i32,
    pub attack: i32,
    /// World units per second
    pub speed: f32,
    pub attack_range: f32,
    pub attack_cooldown_ms: f32,
    pub time_since_last_attack_ms: f32,

    /// Left edge
    pub x: f32,
    /// Top edge; fixed on the ground line
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub is_alive: bool,
    pub is_moving: bool,
    pub state: UnitState,
    pub current_target: Option<TargetRef>,
}

/// Target resolved against this tick's roster
#[derive(Debug, Clone, Copy)]
enum Resolved {
    Unit(usize),
    Base,
}

impl CombatUnit {
    /// Build a unit from an archetype level entry. `None` if the level is missing.
    pub fn spawn(
        archetype: &CharacterArchetype,
        level: usize,
        team: Team,
        x: f32,
        config: &BattleConfig,
    ) -> Option<Self> {
        let stats = archetype.stats_for_level(level)?;
        let cooldown = stats.attack_cooldown_ms();
        Some(Self {
            id: UnitId::new(),
            archetype_id: archetype.id.clone(),
            name: archetype.name.clone(),
            team,
            level,
            max_hp: stats.hp,
            hp: stats.hp,
            attack: stats.attack,
            speed: stats.speed,
            attack_range: stats.attack_range,
            attack_cooldown_ms: cooldown,
            // Ready to strike on first contact
            time_since_last_attack_ms: cooldown,
            x,
            y: config.field_height - config.ground_margin - config.unit_height,
            width: config.unit_width,
            height: config.unit_height,
            is_alive: true,
            is_moving: true,
            state: UnitState::Seeking,
            current_target: None,
        })
    }

    /// Edge that leads in the direction of travel
    pub fn forward_edge(&self) -> f32 {
        match self.team {
            Team::Player => self.x + self.width,
            Team::Enemy => self.x,
        }
    }

    /// Gap from our forward edge to the target's facing edge.
    /// Negative when the target is behind us or overlapping.
    pub fn distance_to<C: Combatant + ?Sized>(&self, other: &C) -> f32 {
        self.team.forward() * (other.facing_edge(self.team) - self.forward_edge())
    }

    pub fn in_range<C: Combatant + ?Sized>(&self, other: &C) -> bool {
        self.distance_to(other) <= self.attack_range
    }

    fn resolve(&self, target: TargetRef, foes: &[CombatUnit]) -> Option<Resolved> {
        match target {
            TargetRef::Unit(id) => foes
                .iter()
                .position(|u| u.id == id && u.is_alive)
                .map(Resolved::Unit),
            TargetRef::Base => Some(Resolved::Base),
        }
    }

    fn resolved_in_range(&self, resolved: Resolved, foes: &[CombatUnit], base: &Base) -> bool {
        match resolved {
            Resolved::Unit(idx) => self.in_range(&foes[idx]),
            Resolved::Base => self.in_range(base),
        }
    }

    /// Nearest forward unit in range, else the base if in range, else the
    /// nearest forward unit to walk toward. A fallen base still blocks the
    /// lane, so it is engaged without being attacked.
    fn search(&self, foes: &[CombatUnit], base: &Base) -> Option<Resolved> {
        let mut nearest: Option<(usize, f32)> = None;
        for (idx, foe) in foes.iter().enumerate() {
            if !foe.is_alive {
                continue;
            }
            let distance = self.distance_to(foe);
            if distance < 0.0 {
                continue;
            }
            // Strict comparison keeps the first-scanned unit on ties
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((idx, distance));
            }
        }

        if let Some((idx, distance)) = nearest {
            if distance <= self.attack_range {
                return Some(Resolved::Unit(idx));
            }
        }
        // A unit that overran the base front still counts as in range
        if self.in_range(base) {
            return Some(Resolved::Base);
        }
        nearest.map(|(idx, _)| Resolved::Unit(idx))
    }

    /// Advance this unit by `dt` seconds against the opposing roster and base.
    ///
    /// Only this unit's own fields change, apart from the damage dealt to its
    /// target. Returns the attack landed this tick, if any.
    pub fn update(
        &mut self,
        dt: f32,
        foes: &mut [CombatUnit],
        base: &mut Base,
    ) -> Option<AttackReport> {
        if !self.is_alive {
            self.state = UnitState::Dead;
            self.is_moving = false;
            self.current_target = None;
            return None;
        }

        // 1. Target validation / acquisition. Only a unit target that is
        //    still in range survives without a fresh search.
        let kept = match self.current_target {
            Some(target) => match self.resolve(target, foes) {
                Some(r @ Resolved::Unit(_)) if self.resolved_in_range(r, foes, base) => Some(r),
                _ => None,
            },
            None => None,
        };
        let resolved = match kept {
            Some(r) => Some(r),
            None => self.search(foes, base),
        };

        self.current_target = resolved.map(|r| match r {
            Resolved::Unit(idx) => TargetRef::Unit(foes[idx].id),
            Resolved::Base => TargetRef::Base,
        });
        let engaging = match resolved {
            Some(r) => self.resolved_in_range(r, foes, base),
            None => false,
        };
        self.is_moving = !engaging;
        self.state = match (resolved, engaging) {
            (_, true) => UnitState::Engaging,
            (Some(_), false) => UnitState::Approaching,
            (None, _) => UnitState::Seeking,
        };

        // 2. Movement
        if self.is_moving {
            self.x += self.team.forward() * self.speed * dt;
        }

        // 3. Attack
        self.time_since_last_attack_ms =
            (self.time_since_last_attack_ms + dt * 1000.0).min(self.attack_cooldown_ms);
        if !engaging || self.time_since_last_attack_ms < self.attack_cooldown_ms {
            return None;
        }
        let resolved = resolved?;
        let target = self.current_target?;
        if matches!(resolved, Resolved::Base) && !base.is_alive {
            return None;
        }

        let outcome = match resolved {
            Resolved::Unit(idx) => foes[idx].take_damage(self.attack),
            Resolved::Base => base.take_damage(self.attack),
        };
        self.time_since_last_attack_ms = 0.0;

        debug!(
            "{:?} {} hit {:?} for {} ({:?})",
            self.team, self.name, target, self.attack, outcome
        );

        if outcome.is_kill() {
            self.current_target = None;
            self.state = UnitState::Seeking;
            self.is_moving = true;
        }

        Some(AttackReport {
            attacker: self.id,
            attacker_team: self.team,
            target,
            damage: self.attack,
            outcome,
        })
    }
}

impl Combatant for CombatUnit {
    fn team(&self) -> Team {
        self.team
    }

    fn x(&self) -> f32 {
        self.x
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn hp(&self) -> i32 {
        self.hp
    }

    fn max_hp(&self) -> i32 {
        self.max_hp
    }

    fn is_alive(&self) -> bool {
        self.is_alive
    }

    fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        let outcome = apply_damage(&mut self.hp, &mut self.is_alive, amount);
        if outcome.is_kill() {
            self.state = UnitState::Dead;
            self.is_moving = false;
            self.current_target = None;
        }
        outcome
    }
}
