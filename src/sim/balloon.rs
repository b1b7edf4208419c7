//! Falling object lifecycle
//!
//! Balloons are spawned with a random value, start column and fall duration,
//! float from the bottom of the play area to the top, and are resolved exactly
//! once: popped by the player or escaped off the top.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::state::{FactorPair, ObjectId, SessionState};
use crate::consts::*;
use crate::math;

/// Play surface size in pixels, supplied by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Result of a click on a balloon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// How a balloon left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    Popped(Outcome),
    Escaped,
}

/// A numbered balloon
#[derive(Debug, Clone, Serialize)]
pub struct FallingObject {
    pub id: ObjectId,
    pub value: i64,
    /// Common multiple of the current factor pair
    pub is_target: bool,
    pub start_x: f32,
    pub spawn_ms: u64,
    pub duration_ms: u64,
    /// Last position computed by [`advance`]
    pub pos: Vec2,
    /// `Some` once popped or escaped
    pub resolution: Option<Resolution>,
}

impl FallingObject {
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Fraction of the trip completed at `now_ms`, in [0, 1]
    pub fn progress(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.spawn_ms) as f32;
        (elapsed / self.duration_ms.max(1) as f32).clamp(0.0, 1.0)
    }

    /// Re-evaluate the target flag after the factor pair changed
    pub fn retarget(&mut self, factors: FactorPair) {
        if !self.is_resolved() {
            self.is_target = factors.is_common_multiple(self.value);
        }
    }

    /// Player clicked this balloon. `None` if it was already resolved.
    pub fn resolve_by_click(&mut self) -> Option<Outcome> {
        if self.is_resolved() {
            return None;
        }
        let outcome = if self.is_target {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.resolution = Some(Resolution::Popped(outcome));
        Some(outcome)
    }

    /// Balloon reached the top. Returns whether a target was missed, or
    /// `None` if it was already resolved.
    pub fn escape(&mut self) -> Option<bool> {
        if self.is_resolved() {
            return None;
        }
        self.resolution = Some(Resolution::Escaped);
        Some(self.is_target)
    }
}

/// Create a balloon and register it with the session
pub fn spawn<R: Rng + ?Sized>(state: &mut SessionState, area: PlayArea, rng: &mut R) -> ObjectId {
    let value = math::random_int(rng, MIN_BALLOON_VALUE, MAX_NUMBER_ON_BALLOON);

    let max_x = (area.width - BALLOON_X_MARGIN).max(SPAWN_MIN_X);
    let start_x = math::random_int(rng, SPAWN_MIN_X as i64, max_x as i64) as f32;

    let fall = state.difficulty.fall_duration_ms as i64;
    let shortest = (fall - DURATION_SPREAD_BELOW_MS as i64).max(MIN_BALLOON_DURATION_MS as i64);
    let longest = fall + DURATION_SPREAD_ABOVE_MS as i64;
    let duration_ms = math::random_int(rng, shortest, longest).max(1) as u64;

    let id = state.next_object_id();
    let mut object = FallingObject {
        id,
        value,
        is_target: state.factors.is_common_multiple(value),
        start_x,
        spawn_ms: state.clock_ms,
        duration_ms,
        pos: Vec2::ZERO,
        resolution: None,
    };
    advance(&mut object, state.clock_ms, area);

    log::debug!(
        "spawn #{} value={} target={} duration={}ms",
        id.0,
        value,
        object.is_target,
        duration_ms
    );
    state.active_objects.push(object);
    id
}

/// Move a balloon to its position at `now_ms` and return its progress.
///
/// y runs from just below the bottom edge (t = 0) to just above the top (t = 1).
pub fn advance(object: &mut FallingObject, now_ms: u64, area: PlayArea) -> f32 {
    let t = object.progress(now_ms);
    let y = (area.height + TRAVEL_OVERSHOOT) * (1.0 - t) - TOP_OFFSET;
    object.pos = Vec2::new(object.start_x, y);
    t
}

/// Advance every unresolved balloon to the session clock.
///
/// Balloons that reached the top are escaped, removed and returned. Nothing
/// moves unless the session is running and unpaused.
pub fn advance_objects(state: &mut SessionState, area: PlayArea) -> Vec<FallingObject> {
    if !state.is_live() {
        return Vec::new();
    }

    let now = state.clock_ms;
    let mut escaped_ids = Vec::new();
    for object in state.active_objects.iter_mut() {
        if object.is_resolved() {
            continue;
        }
        if advance(object, now, area) >= 1.0 && object.escape().is_some() {
            escaped_ids.push(object.id);
        }
    }

    escaped_ids
        .into_iter()
        .filter_map(|id| state.remove_object(id))
        .collect()
}
