//! LCM Pop - A balloon-popping arcade game about common multiples
//!
//! Core modules:
//! - `math`: gcd/lcm helpers and uniform random draws
//! - `sim`: Session engine (state, timers, balloons, director state machine)
//! - `settings`: Validated player overrides for factors and difficulty
//! - `highscores`: Score table kept by the leaderboard service
//! - `leaderboard`: Client side of score submission

pub mod error;
pub mod highscores;
pub mod leaderboard;
pub mod math;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{LeaderboardError, MathError};
pub use highscores::{FileScoreStore, ScoreTable};
pub use leaderboard::{ScoreService, SubmitRequest, SubmitResponse};
pub use settings::SettingsInput;
pub use sim::{GameDirector, Notification, PlayArea, SessionState};

/// Game configuration constants
pub mod consts {
    /// Session defaults restored by every reset
    pub const START_LEVEL: u32 = 1;
    pub const START_LIVES: u8 = 3;
    pub const START_TIME_SECS: u32 = 60;
    pub const START_NUMBER_A: u32 = 4;
    pub const START_NUMBER_B: u32 = 6;
    pub const START_SPAWN_INTERVAL_MS: u64 = 1400;
    pub const START_FALL_DURATION_MS: u64 = 8000;
    /// Correct pops needed to finish a level (a setting, survives reset)
    pub const DEFAULT_TARGET_CORRECT: u32 = 6;

    /// Balloon values are drawn from [MIN_BALLOON_VALUE, MAX_NUMBER_ON_BALLOON]
    pub const MIN_BALLOON_VALUE: i64 = 2;
    /// Fixed ceiling, does not scale with the factor pair
    pub const MAX_NUMBER_ON_BALLOON: i64 = 72;

    /// Scoring
    pub const POINTS_PER_CORRECT: u64 = 10;
    pub const LEVEL_BONUS: u64 = 50;

    /// Countdown cadence
    pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;
    /// Delay between a pop and removal of the balloon
    pub const POP_REMOVAL_DELAY_MS: u64 = 250;

    /// Difficulty floors and time cap applied on level-up
    pub const SPAWN_INTERVAL_STEP_MS: u64 = 120;
    pub const MIN_SPAWN_INTERVAL_MS: u64 = 700;
    pub const FALL_DURATION_STEP_MS: u64 = 300;
    pub const MIN_FALL_DURATION_MS: u64 = 3800;
    pub const LEVEL_TIME_BONUS_SECS: u32 = 10;
    pub const MAX_TIME_LEFT_SECS: u32 = 75;

    /// Per-balloon fall duration window around the session fall duration
    pub const MIN_BALLOON_DURATION_MS: u64 = 4200;
    pub const DURATION_SPREAD_BELOW_MS: u64 = 1500;
    pub const DURATION_SPREAD_ABOVE_MS: u64 = 1000;

    /// Play-area geometry (pixels)
    pub const SPAWN_MIN_X: f32 = 10.0;
    /// Balloon width plus right margin
    pub const BALLOON_X_MARGIN: f32 = 82.0;
    /// Extra vertical travel so balloons enter below and leave above the area
    pub const TRAVEL_OVERSHOOT: f32 = 110.0;
    pub const TOP_OFFSET: f32 = 80.0;

    /// Factor pairs by level, indexed with (level - 1) % len
    pub const PROGRESSION: [(u32, u32); 9] = [
        (3, 4),
        (4, 6),
        (5, 10),
        (6, 8),
        (7, 9),
        (8, 12),
        (9, 12),
        (10, 12),
        (12, 15),
    ];
}
