//! Match session layer - composes battle and rhythm for a host loop

pub mod assets;
pub mod feedback;
pub mod session;

pub use assets::MatchAssets;
pub use feedback::{BeatBlink, FeedbackText};
pub use session::{InputOutcome, MatchSession, SessionTick, SummonAttempt};
