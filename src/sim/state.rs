//! Session state and core simulation types
//!
//! One `SessionState` is the authoritative record of a run. It owns the live
//! balloons and the timers that drive them, so a single `reset` tears both
//! down together.

use serde::{Deserialize, Serialize};

use super::balloon::FallingObject;
use super::scheduler::{Scheduler, TimerId};
use crate::consts::*;
use crate::math;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run started yet (or reset between runs)
    Idle,
    /// Active gameplay
    Running,
    /// Run frozen; no time accrues
    Paused,
    /// Run ended
    GameOver,
}

/// Balloon identifier, unique within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Work carried by session timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Spawn cadence
    Spawn,
    /// One-second countdown
    Countdown,
    /// Take a popped balloon off the play area
    Remove(ObjectId),
}

/// The two numbers whose common multiples are the targets. Both are >= 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactorPair {
    a: u32,
    b: u32,
}

impl FactorPair {
    /// `None` unless both factors are at least 2
    pub fn new(a: u32, b: u32) -> Option<Self> {
        (a >= 2 && b >= 2).then_some(Self { a, b })
    }

    /// Pair used from `level` onward, cycling through the progression table
    pub fn for_level(level: u32) -> Self {
        let index = (level.max(1) - 1) as usize % PROGRESSION.len();
        let (a, b) = PROGRESSION[index];
        Self { a, b }
    }

    pub fn a(&self) -> u32 {
        self.a
    }

    pub fn b(&self) -> u32 {
        self.b
    }

    pub fn lcm(&self) -> u64 {
        let (a, b) = (u64::from(self.a), u64::from(self.b));
        // gcd >= 2 here, never zero
        let g = math::gcd(i64::from(self.a), i64::from(self.b))
            .unsigned_abs()
            .max(1);
        a / g * b
    }

    pub fn is_common_multiple(&self, value: i64) -> bool {
        math::is_common_multiple(value, i64::from(self.a), i64::from(self.b))
    }
}

impl Default for FactorPair {
    fn default() -> Self {
        Self {
            a: START_NUMBER_A,
            b: START_NUMBER_B,
        }
    }
}

/// Difficulty knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    pub spawn_interval_ms: u64,
    pub fall_duration_ms: u64,
    pub target_correct_per_level: u32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            spawn_interval_ms: START_SPAWN_INTERVAL_MS,
            fall_duration_ms: START_FALL_DURATION_MS,
            target_correct_per_level: DEFAULT_TARGET_CORRECT,
        }
    }
}

impl Difficulty {
    /// Faster spawns and shorter falls, down to fixed floors
    pub fn tighten(&mut self) {
        self.spawn_interval_ms = self
            .spawn_interval_ms
            .saturating_sub(SPAWN_INTERVAL_STEP_MS)
            .max(MIN_SPAWN_INTERVAL_MS);
        self.fall_duration_ms = self
            .fall_duration_ms
            .saturating_sub(FALL_DURATION_STEP_MS)
            .max(MIN_FALL_DURATION_MS);
    }
}

/// Message for the overlay layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Notification {
    Welcome,
    HowTo {
        a: u32,
        b: u32,
        lcm: u64,
        /// a, 2a, 3a
        multiples_a: [u64; 3],
        /// b, 2b, 3b
        multiples_b: [u64; 3],
    },
    Tip {
        message: String,
    },
    /// `level` is the level just completed; the pair is the one now in play
    LevelUp {
        level: u32,
        a: u32,
        b: u32,
        lcm: u64,
        bonus: u64,
    },
    GameOver {
        score: u64,
    },
}

impl Notification {
    pub fn how_to(factors: FactorPair) -> Self {
        let (a, b) = (u64::from(factors.a()), u64::from(factors.b()));
        Notification::HowTo {
            a: factors.a(),
            b: factors.b(),
            lcm: factors.lcm(),
            multiples_a: [a, a * 2, a * 3],
            multiples_b: [b, b * 2, b * 3],
        }
    }

    pub fn tip(message: impl Into<String>) -> Self {
        Notification::Tip {
            message: message.into(),
        }
    }
}

/// Snapshot of the counters shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub level: u32,
    pub score: u64,
    pub lives: u8,
    pub time_left: u32,
    pub number_a: u32,
    pub number_b: u32,
    pub paused: bool,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub level: u32,
    pub score: u64,
    pub lives: u8,
    pub time_left_secs: u32,
    pub factors: FactorPair,
    pub difficulty: Difficulty,
    pub correct_clicks_this_level: u32,
    pub phase: GamePhase,
    /// Live balloons (sorted by id)
    pub active_objects: Vec<FallingObject>,
    /// Game time in ms; frozen while paused
    pub clock_ms: u64,
    /// Pending spawn, countdown and removal timers
    pub timers: Scheduler<TimerTask>,
    /// Handle of the spawn cadence, re-armed when the interval changes
    pub(crate) spawn_timer: Option<TimerId>,
    next_id: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            level: START_LEVEL,
            score: 0,
            lives: START_LIVES,
            time_left_secs: START_TIME_SECS,
            factors: FactorPair::default(),
            difficulty: Difficulty::default(),
            correct_clicks_this_level: 0,
            phase: GamePhase::Idle,
            active_objects: Vec::new(),
            clock_ms: 0,
            timers: Scheduler::new(),
            spawn_timer: None,
            next_id: 1,
        }
    }

    /// Running or paused
    pub fn is_running(&self) -> bool {
        matches!(self.phase, GamePhase::Running | GamePhase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    /// Running and not paused: the only phase in which anything changes
    pub fn is_live(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Allocate a new balloon id
    pub fn next_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&FallingObject> {
        self.active_objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut FallingObject> {
        self.active_objects.iter_mut().find(|o| o.id == id)
    }

    /// Drop a balloon from the play area
    pub fn remove_object(&mut self, id: ObjectId) -> Option<FallingObject> {
        let index = self.active_objects.iter().position(|o| o.id == id)?;
        Some(self.active_objects.remove(index))
    }

    pub fn add_score(&mut self, points: u64) {
        if !self.is_running() {
            return;
        }
        self.score += points;
    }

    /// Returns true when this was the last life
    pub fn lose_life(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }

    /// Restore run defaults, drop all balloons and cancel all timers.
    ///
    /// `target_correct_per_level` is a player setting and is kept.
    pub fn reset(&mut self) {
        let target = self.difficulty.target_correct_per_level;
        // Ids keep counting so a stale selection can never hit a new balloon
        let next_id = self.next_id;
        *self = Self {
            difficulty: Difficulty {
                target_correct_per_level: target,
                ..Difficulty::default()
            },
            next_id,
            ..Self::new()
        };
    }

    /// Stop the run and cancel every pending timer
    pub fn end(&mut self) {
        self.phase = GamePhase::GameOver;
        self.timers.clear();
        self.spawn_timer = None;
    }

    pub fn hud(&self) -> Hud {
        Hud {
            level: self.level,
            score: self.score,
            lives: self.lives,
            time_left: self.time_left_secs,
            number_a: self.factors.a(),
            number_b: self.factors.b(),
            paused: self.is_paused(),
        }
    }

    /// Ensure balloons stay sorted by id
    pub fn normalize_order(&mut self) {
        self.active_objects.sort_by_key(|o| o.id);
    }
}
