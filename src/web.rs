//! Browser binding
//!
//! The page owns the DOM: it renders balloons from `balloons_json`, forwards
//! clicks to `select`, shows whatever `drain_notifications_json` returns, and
//! calls `tick` from `requestAnimationFrame`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::leaderboard::{self, HttpScoreService, SubmitRequest};
use crate::settings::SettingsInput;
use crate::sim::{GameDirector, ObjectId, Outcome, PlayArea};

/// Longest frame fed to the simulation (ms); longer gaps are dropped
const MAX_FRAME_MS: f64 = 100.0;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("serialization failed: {e}");
        "null".to_string()
    })
}

/// Game handle held by the page
#[wasm_bindgen]
pub struct WebGame {
    director: GameDirector,
    /// Sub-millisecond remainder carried between frames
    carry_ms: f64,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        log::info!("LCM Pop ready (seed {seed})");
        WebGame {
            director: GameDirector::new(seed, PlayArea { width, height }),
            carry_ms: 0.0,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.director.set_play_area(PlayArea { width, height });
    }

    pub fn start(&mut self) {
        self.carry_ms = 0.0;
        self.director.start_game();
    }

    /// Returns the new paused flag
    pub fn toggle_pause(&mut self) -> bool {
        self.director.toggle_pause()
    }

    pub fn how_to(&mut self) {
        self.director.show_how_to();
    }

    pub fn tick(&mut self, dt_ms: f64) {
        let total = self.carry_ms + dt_ms.clamp(0.0, MAX_FRAME_MS);
        let whole = total.floor();
        self.carry_ms = total - whole;
        self.director.tick(whole as u64);
    }

    /// "Correct", "Incorrect", or undefined when the click did nothing
    pub fn select(&mut self, id: u32) -> Option<String> {
        self.director.select_object(ObjectId(id)).map(|o| match o {
            Outcome::Correct => "Correct".to_string(),
            Outcome::Incorrect => "Incorrect".to_string(),
        })
    }

    pub fn apply_settings(&mut self, a: &str, b: &str, spawn: &str, fall: &str, target: &str) {
        self.director
            .apply_settings(&SettingsInput::parse(a, b, spawn, fall, target));
    }

    pub fn hud_json(&self) -> String {
        to_json(&self.director.hud())
    }

    pub fn balloons_json(&self) -> String {
        to_json(&self.director.state().active_objects)
    }

    pub fn drain_notifications_json(&mut self) -> String {
        to_json(&self.director.drain_notifications())
    }

    /// Submission body for the current score
    pub fn score_request_json(&self, name: &str) -> String {
        let state = self.director.state();
        to_json(&SubmitRequest::new(name, state.score, state.level))
    }
}

/// POST a score to `endpoint` and resolve to the tip notification as JSON.
///
/// Never rejects: failures are part of the tip.
#[wasm_bindgen]
pub async fn submit_score(endpoint: String, name: String, score: f64, level: u32) -> String {
    let request = SubmitRequest::new(&name, score.max(0.0) as u64, level);
    let result = HttpScoreService::new(endpoint).submit(&request).await;
    to_json(&leaderboard::feedback(&result))
}
