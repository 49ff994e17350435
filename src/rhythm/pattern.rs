//! Live recognition of key sequences performed on the beat
//!
//! Only an unbroken run of well-timed inputs can form a pattern: a single
//! mistimed input wipes the history.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{BattleError, Result};

/// Literal used for the synthesized "no input on this beat" symbol
pub const SKIP_LITERAL: &str = "skip";

/// A single input symbol: a key, or the skip pseudo-input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InputSymbol {
    Key(char),
    Skip,
}

impl FromStr for InputSymbol {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case(SKIP_LITERAL) {
            return Ok(InputSymbol::Skip);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => Ok(InputSymbol::Key(c.to_ascii_lowercase())),
            _ => Err(BattleError::InvalidSymbol(s.to_string())),
        }
    }
}

impl TryFrom<String> for InputSymbol {
    type Error = BattleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<InputSymbol> for String {
    fn from(symbol: InputSymbol) -> Self {
        symbol.to_string()
    }
}

impl fmt::Display for InputSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSymbol::Key(c) => write!(f, "{}", c),
            InputSymbol::Skip => f.write_str(SKIP_LITERAL),
        }
    }
}

/// A named key sequence bound to a summon slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownPattern {
    pub name: String,
    /// Team slot summoned when the pattern completes
    pub slot: usize,
    pub keys: Vec<InputSymbol>,
}

impl KnownPattern {
    pub fn new(name: impl Into<String>, slot: usize, keys: &[&str]) -> Result<Self> {
        let keys = keys
            .iter()
            .map(|k| k.parse())
            .collect::<Result<Vec<InputSymbol>>>()?;
        Ok(Self {
            name: name.into(),
            slot,
            keys,
        })
    }
}

/// Default patterns, one per slot
pub fn default_patterns() -> Vec<KnownPattern> {
    use InputSymbol::{Key, Skip};

    let pattern = |name: &str, slot: usize, keys: Vec<InputSymbol>| KnownPattern {
        name: name.to_string(),
        slot,
        keys,
    };

    vec![
        pattern("slot1", 0, vec![Key('1'), Key('1'), Key('1'), Key('2')]),
        pattern("slot2", 1, vec![Key('2'), Key('4'), Key('3'), Key('1')]),
        pattern("slot3", 2, vec![Key('s'), Skip, Key('d'), Key('f')]),
        pattern("slot4", 3, vec![Key('2'), Key('m'), Key('w'), Key('o')]),
    ]
}

#[derive(Debug, Deserialize)]
struct TomlPatterns {
    patterns: Vec<KnownPattern>,
}

/// Parse a `[[patterns]]` table list
pub fn parse_patterns_toml(content: &str) -> Result<Vec<KnownPattern>> {
    let parsed: TomlPatterns = toml::from_str(content)?;
    for pattern in &parsed.patterns {
        if pattern.keys.is_empty() {
            return Err(BattleError::InvalidConfig(format!(
                "pattern {} has no keys",
                pattern.name
            )));
        }
    }
    Ok(parsed.patterns)
}

/// A completed pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub name: String,
    pub slot: usize,
}

/// Bounded input history plus the pattern table it is matched against
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    history: VecDeque<InputSymbol>,
    capacity: usize,
    window: usize,
    /// Registration order is match priority
    patterns: Vec<KnownPattern>,
}

impl PatternRecognizer {
    pub fn new(patterns: Vec<KnownPattern>, capacity: usize, window: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            window,
            patterns,
        }
    }

    /// Feed one judged input; returns the pattern it completes, if any
    pub fn record_input(&mut self, symbol: InputSymbol, on_time: bool) -> Option<PatternMatch> {
        if !on_time {
            self.clear();
            return None;
        }

        if self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(symbol);

        self.check_for_patterns()
    }

    /// Suffix match of the recent window against every known pattern
    pub fn check_for_patterns(&self) -> Option<PatternMatch> {
        let take = self.history.len().min(self.window);
        let recent: Vec<InputSymbol> = self
            .history
            .iter()
            .skip(self.history.len() - take)
            .copied()
            .collect();

        self.patterns
            .iter()
            .find(|p| !p.keys.is_empty() && recent.ends_with(&p.keys))
            .map(|p| PatternMatch {
                name: p.name.clone(),
                slot: p.slot,
            })
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// The last `count` successful inputs, oldest first
    pub fn recent(&self, count: usize) -> Vec<InputSymbol> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).copied().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn patterns(&self) -> &[KnownPattern] {
        &self.patterns
    }

    /// Swap in a new pattern table; the history is kept
    pub fn replace_patterns(&mut self, patterns: Vec<KnownPattern>) {
        self.patterns = patterns;
    }
}
