//! Rhythm Battle - lane battle driven by on-beat key patterns

pub mod battle;
pub mod core;
pub mod game;
pub mod render;
pub mod rhythm;
