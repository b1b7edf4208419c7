//! Game director: the session state machine
//!
//! `Idle -> Running <-> Paused -> ... -> GameOver -> Running` (via start).
//! All mutations happen inside one call (`tick`, `select_object`, ...) and
//! run to completion. Timers live on the game clock, which only moves while
//! the session is running and unpaused.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::balloon::{self, Outcome, PlayArea};
use super::state::{
    FactorPair, GamePhase, Hud, Notification, ObjectId, SessionState, TimerTask,
};
use crate::consts::*;
use crate::leaderboard::{self, ScoreService};
use crate::settings::SettingsInput;

/// Owns one session and drives it
#[derive(Debug, Clone)]
pub struct GameDirector {
    state: SessionState,
    area: PlayArea,
    rng: Pcg32,
    notifications: Vec<Notification>,
}

impl GameDirector {
    /// New director in `Idle`, with a welcome message queued
    pub fn new(seed: u64, area: PlayArea) -> Self {
        Self {
            state: SessionState::new(),
            area,
            rng: Pcg32::seed_from_u64(seed),
            notifications: vec![Notification::Welcome],
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn hud(&self) -> Hud {
        self.state.hud()
    }

    pub fn play_area(&self) -> PlayArea {
        self.area
    }

    /// Play surface was resized
    pub fn set_play_area(&mut self, area: PlayArea) {
        self.area = area;
    }

    /// Queue a message for the overlay layer
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Take all queued messages, oldest first
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Reset and begin a run with the spawn cadence and countdown armed
    pub fn start_game(&mut self) {
        self.state.reset();
        self.state.phase = GamePhase::Running;
        self.arm_spawn_timer();
        let now = self.state.clock_ms;
        self.state
            .timers
            .every(now, COUNTDOWN_INTERVAL_MS, TimerTask::Countdown);
        log::info!(
            "Game started: {}x{} spawn={}ms fall={}ms",
            self.state.factors.a(),
            self.state.factors.b(),
            self.state.difficulty.spawn_interval_ms,
            self.state.difficulty.fall_duration_ms
        );
    }

    /// Flip pause. No-op unless a run is in progress. Returns the new paused flag.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.phase = match self.state.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Running,
            other => other,
        };
        self.state.is_paused()
    }

    pub fn show_how_to(&mut self) {
        let how_to = Notification::how_to(self.state.factors);
        self.notify(how_to);
    }

    /// Apply player settings to the session.
    ///
    /// Ignored after game over; the next start resets everything except the
    /// per-level target anyway.
    pub fn apply_settings(&mut self, input: &SettingsInput) {
        if self.state.phase == GamePhase::GameOver {
            log::debug!("Settings ignored after game over");
            return;
        }
        let before = self.state.difficulty.spawn_interval_ms;
        input.apply(&mut self.state.factors, &mut self.state.difficulty);
        self.retarget_objects();
        if self.state.is_running() && self.state.difficulty.spawn_interval_ms != before {
            self.arm_spawn_timer();
        }
        log::info!(
            "Settings applied: {}x{} {:?}",
            self.state.factors.a(),
            self.state.factors.b(),
            self.state.difficulty
        );
        // A lowered target may already be met
        if self.state.is_running()
            && self.state.correct_clicks_this_level
                >= self.state.difficulty.target_correct_per_level
        {
            self.next_level();
        }
    }

    /// Advance game time by `dt_ms`.
    ///
    /// Timers fire in due order and balloons are advanced up to each firing.
    /// Does nothing while paused or not running, so paused wall time is lost.
    pub fn tick(&mut self, dt_ms: u64) {
        if !self.state.is_live() {
            return;
        }
        let target = self.state.clock_ms.saturating_add(dt_ms);

        while let Some((due_ms, task)) = self.state.timers.pop_due(target) {
            self.state.clock_ms = due_ms;
            self.advance_objects();
            if !self.state.is_live() {
                return;
            }
            self.run_task(task);
            if !self.state.is_live() {
                return;
            }
        }

        self.state.clock_ms = target;
        self.advance_objects();
        self.state.normalize_order();
    }

    /// Player selected a balloon.
    ///
    /// Returns `None` when the session is not live, the balloon is gone, or it
    /// was already resolved.
    pub fn select_object(&mut self, id: ObjectId) -> Option<Outcome> {
        if !self.state.is_live() {
            return None;
        }
        let object = self.state.object_mut(id)?;
        let outcome = object.resolve_by_click()?;
        let value = object.value;

        let now = self.state.clock_ms;
        self.state
            .timers
            .once(now, POP_REMOVAL_DELAY_MS, TimerTask::Remove(id));

        match outcome {
            Outcome::Correct => {
                log::debug!("pop #{} value={} correct", id.0, value);
                self.state.add_score(POINTS_PER_CORRECT);
                self.state.correct_clicks_this_level += 1;
                if self.state.correct_clicks_this_level
                    >= self.state.difficulty.target_correct_per_level
                {
                    self.next_level();
                }
            }
            Outcome::Incorrect => {
                log::debug!("pop #{} value={} wrong", id.0, value);
                let factors = self.state.factors;
                self.notify(Notification::tip(format!(
                    "{} is not a common multiple of {} and {}.",
                    value,
                    factors.a(),
                    factors.b()
                )));
                self.lose_life();
            }
        }
        Some(outcome)
    }

    /// Submit the current score and queue the outcome as a tip.
    ///
    /// Failures never touch the session.
    pub fn submit_score<S: ScoreService + ?Sized>(&mut self, service: &mut S, name: &str) {
        let request = leaderboard::SubmitRequest::new(name, self.state.score, self.state.level);
        let result = leaderboard::submit(service, &request);
        self.notify(leaderboard::feedback(&result));
    }

    fn run_task(&mut self, task: TimerTask) {
        match task {
            TimerTask::Spawn => {
                balloon::spawn(&mut self.state, self.area, &mut self.rng);
            }
            TimerTask::Countdown => {
                self.state.time_left_secs = self.state.time_left_secs.saturating_sub(1);
                if self.state.time_left_secs == 0 {
                    log::info!("Out of time");
                    self.game_over();
                }
            }
            TimerTask::Remove(id) => {
                self.state.remove_object(id);
            }
        }
    }

    fn advance_objects(&mut self) {
        for escaped in balloon::advance_objects(&mut self.state, self.area) {
            if escaped.is_target {
                log::debug!("missed #{} value={}", escaped.id.0, escaped.value);
                self.lose_life();
            }
        }
    }

    fn lose_life(&mut self) {
        if self.state.lose_life() {
            self.game_over();
        }
    }

    fn next_level(&mut self) {
        let completed_level = self.state.level;

        self.state.add_score(LEVEL_BONUS);
        self.state.level += 1;
        self.state.correct_clicks_this_level = 0;
        self.state.factors = FactorPair::for_level(self.state.level);
        self.state.difficulty.tighten();
        self.state.time_left_secs =
            (self.state.time_left_secs + LEVEL_TIME_BONUS_SECS).min(MAX_TIME_LEFT_SECS);
        self.retarget_objects();
        self.arm_spawn_timer();

        log::info!(
            "Level {} complete, now {} with {}x{}",
            completed_level,
            self.state.level,
            self.state.factors.a(),
            self.state.factors.b()
        );
        let next = self.state.factors;
        self.notify(Notification::LevelUp {
            level: completed_level,
            a: next.a(),
            b: next.b(),
            lcm: next.lcm(),
            bonus: LEVEL_BONUS,
        });
    }

    fn game_over(&mut self) {
        self.state.end();
        log::info!(
            "Game over: score={} level={}",
            self.state.score,
            self.state.level
        );
        self.notify(Notification::GameOver {
            score: self.state.score,
        });
    }

    /// (Re)start the spawn cadence at the current interval
    fn arm_spawn_timer(&mut self) {
        if let Some(id) = self.state.spawn_timer.take() {
            self.state.timers.cancel(id);
        }
        let now = self.state.clock_ms;
        let interval = self.state.difficulty.spawn_interval_ms;
        self.state.spawn_timer = Some(self.state.timers.every(now, interval, TimerTask::Spawn));
    }

    fn retarget_objects(&mut self) {
        let factors = self.state.factors;
        for object in &mut self.state.active_objects {
            object.retarget(factors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::balloon::FallingObject;
    use glam::Vec2;

    fn started() -> GameDirector {
        let mut director = GameDirector::new(12345, PlayArea::default());
        director.start_game();
        director.drain_notifications();
        director
    }

    /// Put a balloon with a known value on the board
    fn plant(director: &mut GameDirector, value: i64, duration_ms: u64) -> ObjectId {
        let state = &mut director.state;
        let id = state.next_object_id();
        state.active_objects.push(FallingObject {
            id,
            value,
            is_target: state.factors.is_common_multiple(value),
            start_x: 10.0,
            spawn_ms: state.clock_ms,
            duration_ms,
            pos: Vec2::ZERO,
            resolution: None,
        });
        id
    }

    #[test]
    fn test_new_director_is_idle_with_welcome() {
        let mut director = GameDirector::new(1, PlayArea::default());
        assert_eq!(director.state().phase, GamePhase::Idle);
        assert_eq!(director.drain_notifications(), vec![Notification::Welcome]);
        assert!(director.drain_notifications().is_empty());

        // Idle ignores ticks, pauses and clicks
        director.tick(10_000);
        assert!(!director.toggle_pause());
        assert_eq!(director.state().phase, GamePhase::Idle);
        assert!(director.state().active_objects.is_empty());
        assert_eq!(director.select_object(ObjectId(1)), None);
    }

    #[test]
    fn test_start_arms_spawn_and_countdown() {
        let mut director = started();
        assert_eq!(director.state().phase, GamePhase::Running);
        assert_eq!(director.state().timers.len(), 2);

        director.tick(1000);
        assert_eq!(director.hud().time_left, 59);
        assert!(director.state().active_objects.is_empty());

        director.tick(400);
        assert_eq!(director.state().active_objects.len(), 1);
        director.tick(1400);
        assert_eq!(director.state().active_objects.len(), 2);
        assert_eq!(director.hud().time_left, 58);
    }

    #[test]
    fn test_six_correct_clicks_level_up() {
        let mut director = started();
        for value in [12, 24, 36, 48, 60, 72] {
            let id = plant(&mut director, value, 8000);
            assert_eq!(director.select_object(id), Some(Outcome::Correct));
        }

        let state = director.state();
        assert_eq!(state.level, 2);
        assert_eq!(state.score, 6 * 10 + 50);
        assert_eq!(state.correct_clicks_this_level, 0);
        assert_eq!((state.factors.a(), state.factors.b()), (4, 6));
        assert_eq!(state.difficulty.spawn_interval_ms, 1280);
        assert_eq!(state.difficulty.fall_duration_ms, 7700);
        assert_eq!(state.time_left_secs, 70);
        assert_eq!(
            director.drain_notifications(),
            vec![Notification::LevelUp {
                level: 1,
                a: 4,
                b: 6,
                lcm: 12,
                bonus: 50,
            }]
        );
    }

    #[test]
    fn test_level_three_uses_table_and_caps_time() {
        let mut director = started();
        director.state.time_left_secs = 70;
        for _ in 0..12 {
            let id = plant(&mut director, 12, 8000);
            director.select_object(id);
        }
        let state = director.state();
        assert_eq!(state.level, 3);
        assert_eq!((state.factors.a(), state.factors.b()), (5, 10));
        assert_eq!(state.time_left_secs, 75);
        assert_eq!(state.score, 12 * 10 + 2 * 50);

        // Each message announces the pair of the level being entered
        let level_ups: Vec<_> = director
            .drain_notifications()
            .into_iter()
            .filter(|n| matches!(n, Notification::LevelUp { .. }))
            .collect();
        assert_eq!(
            level_ups[1],
            Notification::LevelUp {
                level: 2,
                a: 5,
                b: 10,
                lcm: 10,
                bonus: 50,
            }
        );
    }

    #[test]
    fn test_level_up_rearms_spawn_cadence() {
        let mut director = started();
        for value in [12, 24, 36, 48, 60, 72] {
            let id = plant(&mut director, value, 100_000);
            director.select_object(id);
        }
        let before = director.state().active_objects.len();
        // Popped balloons leave after 250ms; next spawn is at 1280ms
        director.tick(1279);
        assert_eq!(director.state().active_objects.len(), 0);
        director.tick(1);
        assert_eq!(director.state().active_objects.len(), 1);
        assert_eq!(before, 6);
    }

    #[test]
    fn test_three_wrong_clicks_end_game() {
        let mut director = started();
        for value in [8, 9, 16] {
            let id = plant(&mut director, value, 8000);
            assert_eq!(director.select_object(id), Some(Outcome::Incorrect));
        }

        let state = director.state();
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.is_running());
        assert!(state.timers.is_empty());

        let notes = director.drain_notifications();
        assert_eq!(notes.len(), 4);
        assert_eq!(
            notes[0],
            Notification::tip("8 is not a common multiple of 4 and 6.")
        );
        assert_eq!(notes[3], Notification::GameOver { score: 0 });

        // Frozen until the next start
        let late = plant(&mut director, 12, 8000);
        assert_eq!(director.select_object(late), None);
        director.tick(60_000);
        assert!(!director.toggle_pause());
        let state = director.state();
        assert_eq!((state.score, state.lives, state.time_left_secs), (0, 0, 60));
        assert!(director.drain_notifications().is_empty());
    }

    #[test]
    fn test_timer_runs_out_with_lives_left() {
        let mut director = started();
        director.state.time_left_secs = 2;
        director.tick(2500);

        let state = director.state();
        assert_eq!(state.time_left_secs, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.timers.is_empty());
        // Stopped at the expiry instant
        assert_eq!(state.clock_ms, 2000);
        assert_eq!(
            director.drain_notifications(),
            vec![Notification::GameOver { score: 0 }]
        );
    }

    #[test]
    fn test_click_then_escape_counts_once() {
        let mut director = started();
        let id = plant(&mut director, 12, 100);
        assert_eq!(director.select_object(id), Some(Outcome::Correct));
        assert_eq!(director.select_object(id), None);

        // Reaches the top while waiting for removal
        director.tick(200);
        assert!(director.state().object(id).is_some());
        director.tick(100);
        assert!(director.state().object(id).is_none());

        let state = director.state();
        assert_eq!(state.score, 10);
        assert_eq!(state.lives, 3);
        assert_eq!(state.correct_clicks_this_level, 1);
    }

    #[test]
    fn test_escape_then_click_counts_once() {
        let mut director = started();
        let id = plant(&mut director, 12, 100);
        director.tick(100);
        assert_eq!(director.state().lives, 2);
        assert_eq!(director.select_object(id), None);

        let state = director.state();
        assert_eq!(state.lives, 2);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_non_target_escape_is_free() {
        let mut director = started();
        plant(&mut director, 13, 100);
        director.tick(150);
        assert_eq!(director.state().lives, 3);
        assert!(director.state().active_objects.is_empty());
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut director = started();
        let id = plant(&mut director, 12, 1000);
        director.tick(500);
        let hud = director.hud();
        let clock = director.state().clock_ms;

        assert!(director.toggle_pause());
        for _ in 0..100 {
            director.tick(1000);
        }
        assert_eq!(director.select_object(id), None);

        let mut paused_hud = director.hud();
        assert!(paused_hud.paused);
        paused_hud.paused = false;
        assert_eq!(paused_hud, hud);
        assert_eq!(director.state().clock_ms, clock);
        assert_eq!(director.state().active_objects.len(), 1);
        assert!(!director.state().object(id).unwrap().is_resolved());

        assert!(!director.toggle_pause());
        director.tick(500);
        assert_eq!(director.hud().time_left, 59);
        // The planted target escaped at 1000ms of game time
        assert_eq!(director.hud().lives, 2);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut director = started();
        director.state.time_left_secs = 1;
        director.tick(1000);
        assert_eq!(director.state().phase, GamePhase::GameOver);

        director.start_game();
        let state = director.state();
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.time_left_secs, 60);
        assert_eq!(state.lives, 3);
        assert!(state.active_objects.is_empty());
        assert_eq!(state.timers.len(), 2);
    }

    #[test]
    fn test_settings_apply_mid_run() {
        let mut director = started();
        let id = plant(&mut director, 20, 100_000);
        director.apply_settings(&SettingsInput::parse("5", "10", "500", "", "3"));

        assert!(director.state().object(id).unwrap().is_target);
        director.tick(500);
        assert_eq!(director.state().active_objects.len(), 2);

        for value in [10, 30, 40] {
            let id = plant(&mut director, value, 100_000);
            director.select_object(id);
        }
        assert_eq!(director.state().level, 2);
    }

    #[test]
    fn test_lowering_target_below_progress_levels_up() {
        let mut director = started();
        for value in [12, 24, 36, 48, 60] {
            let id = plant(&mut director, value, 100_000);
            director.select_object(id);
        }
        assert_eq!(director.state().correct_clicks_this_level, 5);
        director.drain_notifications();

        director.apply_settings(&SettingsInput::parse("", "", "", "", "3"));
        director.tick(100);

        let state = director.state();
        assert_eq!(state.level, 2);
        assert_eq!(state.correct_clicks_this_level, 0);
        assert_eq!(state.difficulty.target_correct_per_level, 3);
        assert_eq!(state.score, 5 * 10 + 50);
        assert!(matches!(
            director.drain_notifications().as_slice(),
            [Notification::LevelUp { level: 1, .. }]
        ));
    }

    #[test]
    fn test_raising_target_keeps_level() {
        let mut director = started();
        for value in [12, 24] {
            let id = plant(&mut director, value, 100_000);
            director.select_object(id);
        }
        director.apply_settings(&SettingsInput::parse("", "", "", "", "8"));
        let state = director.state();
        assert_eq!(state.level, 1);
        assert_eq!(state.correct_clicks_this_level, 2);
    }

    #[test]
    fn test_settings_ignored_after_game_over() {
        let mut director = started();
        let id = plant(&mut director, 13, 100_000);
        director.state.time_left_secs = 1;
        director.tick(1000);
        assert_eq!(director.state().phase, GamePhase::GameOver);
        let hud = director.hud();

        director.apply_settings(&SettingsInput::parse("7", "9", "500", "3000", "4"));

        assert_eq!(director.hud(), hud);
        assert_eq!((hud.number_a, hud.number_b), (4, 6));
        assert!(!director.state().object(id).unwrap().is_target);
        assert_eq!(director.state().difficulty.spawn_interval_ms, 1400);
        assert!(director.state().timers.is_empty());
    }

    #[test]
    fn test_huge_frame_does_not_overflow_clock() {
        let mut director = started();
        director.tick(u64::MAX);
        let state = director.state();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.clock_ms <= 60_000);
        assert!(state.timers.is_empty());
    }

    #[test]
    fn test_how_to_uses_current_pair() {
        let mut director = started();
        director.show_how_to();
        assert!(matches!(
            director.drain_notifications().as_slice(),
            [Notification::HowTo { a: 4, b: 6, lcm: 12, .. }]
        ));
    }

    #[test]
    fn test_determinism() {
        let mut d1 = GameDirector::new(777, PlayArea::default());
        let mut d2 = GameDirector::new(777, PlayArea::default());
        d1.start_game();
        d2.start_game();
        for _ in 0..600 {
            d1.tick(16);
            d2.tick(16);
        }
        let values = |d: &GameDirector| {
            d.state()
                .active_objects
                .iter()
                .map(|o| (o.id, o.value, o.duration_ms))
                .collect::<Vec<_>>()
        };
        assert_eq!(values(&d1), values(&d2));
        assert_eq!(d1.hud(), d2.hud());
    }
}
