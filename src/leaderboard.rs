//! Score submission client
//!
//! A finished score is sent once to the leaderboard service; the answer (or
//! the failure) comes back to the player as a tip. Nothing here touches the
//! session, so a broken service can never break a game.

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;
use crate::highscores::{Standing, normalize_name};
use crate::sim::Notification;

/// Form body of a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub name: String,
    pub score: i64,
    pub level: i64,
}

impl SubmitRequest {
    pub fn new(name: &str, score: u64, level: u32) -> Self {
        Self {
            name: normalize_name(name),
            score: i64::try_from(score).unwrap_or(i64::MAX),
            level: i64::from(level),
        }
    }

    /// `application/x-www-form-urlencoded` field pairs
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("name", self.name.clone()),
            ("score", self.score.to_string()),
            ("level", self.level.to_string()),
        ]
    }
}

/// Service reply: `{ok, rank?, total?, highest?, error?}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn success(standing: Standing) -> Self {
        Self {
            ok: true,
            rank: Some(standing.rank),
            total: Some(standing.total),
            highest: Some(standing.highest),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn into_standing(self) -> Result<Standing, LeaderboardError> {
        if !self.ok {
            return Err(LeaderboardError::Rejected(
                self.error.unwrap_or_else(|| "unknown".to_string()),
            ));
        }
        match (self.rank, self.total, self.highest) {
            (Some(rank), Some(total), Some(highest)) => Ok(Standing {
                rank,
                total,
                highest,
            }),
            _ => Err(LeaderboardError::Incomplete),
        }
    }
}

/// Anything that can take a score and answer with the service reply
pub trait ScoreService {
    fn submit(&mut self, request: &SubmitRequest) -> Result<SubmitResponse, LeaderboardError>;
}

/// Send one submission (no retries) and decode the reply
pub fn submit<S: ScoreService + ?Sized>(
    service: &mut S,
    request: &SubmitRequest,
) -> Result<Standing, LeaderboardError> {
    let result = service.submit(request).and_then(SubmitResponse::into_standing);
    log_result(request, &result);
    result
}

fn log_result(request: &SubmitRequest, result: &Result<Standing, LeaderboardError>) {
    match result {
        Ok(s) => log::info!(
            "Score {} saved for {:?}: rank {}/{}",
            request.score,
            request.name,
            s.rank,
            s.total
        ),
        Err(e) => log::warn!("Score {} not saved: {e}", request.score),
    }
}

/// Player-facing message for a submission result
pub fn feedback(result: &Result<Standing, LeaderboardError>) -> Notification {
    match result {
        Ok(s) => Notification::tip(format!(
            "Saved! Rank #{} / {}. High score: {}.",
            s.rank, s.total, s.highest
        )),
        Err(e) => Notification::tip(format!("Could not save: {e}")),
    }
}

/// Leaderboard reached over HTTP with `fetch` (browser only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct HttpScoreService {
    endpoint: String,
}

#[cfg(target_arch = "wasm32")]
impl HttpScoreService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// POST the form and decode the JSON reply
    pub async fn submit(&self, request: &SubmitRequest) -> Result<Standing, LeaderboardError> {
        let result = self.post(request).await.and_then(SubmitResponse::into_standing);
        log_result(request, &result);
        result
    }

    async fn post(&self, request: &SubmitRequest) -> Result<SubmitResponse, LeaderboardError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;

        fn js_err(e: JsValue) -> LeaderboardError {
            LeaderboardError::Transport(format!("{e:?}"))
        }

        let params = web_sys::UrlSearchParams::new().map_err(js_err)?;
        for (key, value) in request.form_fields() {
            params.append(key, &value);
        }

        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_body(&params);
        let req = web_sys::Request::new_with_str_and_init(&self.endpoint, &init).map_err(js_err)?;

        let window = web_sys::window()
            .ok_or_else(|| LeaderboardError::Transport("no window".to_string()))?;
        let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        let body = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?
            .as_string()
            .ok_or_else(|| LeaderboardError::Transport("response body is not text".to_string()))?;

        Ok(serde_json::from_str(&body)?)
    }
}
