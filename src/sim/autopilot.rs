//! Demo player for attract mode and headless runs
//!
//! Looks at the board like a player would: waits until a balloon is well on
//! its way, usually pops the most urgent target, and occasionally slips.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{ObjectId, SessionState};

#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    /// Chance of picking a correct balloon when acting (0-1)
    accuracy: f64,
    /// Chance of acting at all on a given frame (0-1)
    reaction: f64,
    /// Balloons lower than this progress are not considered yet
    min_progress: f32,
}

impl Autopilot {
    pub fn new(seed: u64, accuracy: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            accuracy: accuracy.clamp(0.0, 1.0),
            reaction: 0.08,
            min_progress: 0.2,
        }
    }

    /// Balloon to click this frame, if any
    pub fn choose(&mut self, state: &SessionState) -> Option<ObjectId> {
        if !state.is_live() || !self.rng.random_bool(self.reaction) {
            return None;
        }

        let now = state.clock_ms;
        let visible: Vec<_> = state
            .active_objects
            .iter()
            .filter(|o| !o.is_resolved() && o.progress(now) >= self.min_progress)
            .collect();
        if visible.is_empty() {
            return None;
        }

        if self.rng.random_bool(self.accuracy) {
            // Most urgent target first
            visible
                .iter()
                .filter(|o| o.is_target)
                .max_by(|a, b| a.progress(now).total_cmp(&b.progress(now)))
                .map(|o| o.id)
        } else {
            let decoys: Vec<_> = visible.iter().filter(|o| !o.is_target).collect();
            if decoys.is_empty() {
                return None;
            }
            let pick = self.rng.random_range(0..decoys.len());
            Some(decoys[pick].id)
        }
    }
}
