//! Rhythm layer - beat timeline, input judging and pattern recognition
//!
//! Flow: clock -> judgment windows -> judge(input) -> recognizer -> pattern match

pub mod clock;
pub mod judge;
pub mod pattern;

pub use clock::{Beat, BeatSpan, JudgmentWindow, RhythmClock, TimelineMetadata};
pub use judge::{Grade, InputJudge, Judgment, SkipDetector};
pub use pattern::{
    default_patterns, parse_patterns_toml, InputSymbol, KnownPattern, PatternMatch,
    PatternRecognizer, SKIP_LITERAL,
};
