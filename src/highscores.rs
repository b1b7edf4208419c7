//! Shared leaderboard storage
//!
//! Keeps the top 100 scores as a JSON array. Each submission is appended,
//! the list is sorted by descending score, and the submitter's rank, the total
//! count and the highest score are reported before the list is trimmed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;
use crate::leaderboard::{ScoreService, SubmitRequest, SubmitResponse};

/// Maximum number of scores to keep
pub const MAX_HIGH_SCORES: usize = 100;

/// Name used when the player leaves it blank
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Trimmed name, or the default when blank
pub fn normalize_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// A single stored score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: i64,
    pub level: i64,
    /// Unix timestamp (seconds) assigned on insert
    pub ts: u64,
}

/// Where a submission landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-indexed
    pub rank: usize,
    /// Number of scores including this one, before trimming
    pub total: usize,
    pub highest: i64,
}

/// Score list sorted high to low
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable {
    pub entries: Vec<ScoreRecord>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a stored table. Anything that is not a list of records counts as empty.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(table) => table,
            Err(e) => {
                if !raw.trim().is_empty() {
                    log::warn!("Discarding unreadable score table: {e}");
                }
                Self::new()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<i64> {
        self.entries.first().map(|e| e.score)
    }

    /// Add a score and report its standing, then trim to [`MAX_HIGH_SCORES`].
    ///
    /// Equal scores keep submission order. Rank is the first entry matching
    /// the new record's timestamp and name, so two same-name submissions in the
    /// same second both report the better of the two ranks.
    pub fn insert(&mut self, record: ScoreRecord) -> Standing {
        let (ts, name) = (record.ts, record.name.clone());
        let score = record.score;

        self.entries.push(record);
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));

        let total = self.entries.len();
        let highest = self.top_score().unwrap_or(score);
        let rank = self
            .entries
            .iter()
            .position(|e| e.ts == ts && e.name == name)
            .map_or(1, |i| i + 1);

        self.entries.truncate(MAX_HIGH_SCORES);

        Standing {
            rank,
            total,
            highest,
        }
    }
}

/// Leaderboard kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current table; a missing file is an empty table
    pub fn load(&self) -> Result<ScoreTable, LeaderboardError> {
        if !self.path.exists() {
            return Ok(ScoreTable::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(ScoreTable::from_json(&raw))
    }

    fn save(&self, table: &ScoreTable) -> Result<(), LeaderboardError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(table)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Append a score stamped with `ts` and persist the trimmed table
    pub fn record(
        &mut self,
        request: &SubmitRequest,
        ts: u64,
    ) -> Result<Standing, LeaderboardError> {
        let mut table = self.load()?;
        let standing = table.insert(ScoreRecord {
            name: normalize_name(&request.name),
            score: request.score,
            level: request.level,
            ts,
        });
        self.save(&table)?;
        log::info!(
            "Stored score {} for {:?}: rank {}/{}",
            request.score,
            request.name,
            standing.rank,
            standing.total
        );
        Ok(standing)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

impl ScoreService for FileScoreStore {
    /// Storage failures are reported in the response body, like the HTTP service does
    fn submit(&mut self, request: &SubmitRequest) -> Result<SubmitResponse, LeaderboardError> {
        Ok(match self.record(request, unix_now()) {
            Ok(standing) => SubmitResponse::success(standing),
            Err(e) => {
                log::warn!("Score store failed: {e}");
                SubmitResponse::failure("server_error")
            }
        })
    }
}
