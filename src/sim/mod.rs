//! Session engine
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform code:
//! - Time only moves through `GameDirector::tick`
//! - Seeded RNG only
//! - Stable iteration order (by balloon id)

pub mod autopilot;
pub mod balloon;
pub mod director;
pub mod scheduler;
pub mod state;

pub use autopilot::Autopilot;
pub use balloon::{FallingObject, Outcome, PlayArea, Resolution, advance, spawn};
pub use director::GameDirector;
pub use scheduler::{Scheduler, TimerId};
pub use state::{
    Difficulty, FactorPair, GamePhase, Hud, Notification, ObjectId, SessionState, TimerTask,
};
