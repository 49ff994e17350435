//! Render-facing view of a match
//!
//! This module is READ-ONLY - it never modifies match state. A renderer draws
//! from the snapshot and makes no game-logic decisions.

pub mod snapshot;

pub use snapshot::{collect_render_units, RenderBase, RenderSnapshot, RenderUnit};
