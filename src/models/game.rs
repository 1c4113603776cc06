//! Match data: stage, odds, live score and the pre-rolled goal timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Lifecycle of a match. Transitions are one-directional:
/// Scheduled -> Live -> Finished, never back.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
}

/// Which team scored / is picked.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// Knockout rounds, in bracket order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnockoutRound {
    RoundOf16,
    Quarter,
    Semi,
    Final,
}

impl KnockoutRound {
    /// Round that follows this one, if any.
    pub fn next(self) -> Option<KnockoutRound> {
        match self {
            KnockoutRound::RoundOf16 => Some(KnockoutRound::Quarter),
            KnockoutRound::Quarter => Some(KnockoutRound::Semi),
            KnockoutRound::Semi => Some(KnockoutRound::Final),
            KnockoutRound::Final => None,
        }
    }
}

impl std::fmt::Display for KnockoutRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnockoutRound::RoundOf16 => write!(f, "round of 16"),
            KnockoutRound::Quarter => write!(f, "quarterfinal"),
            KnockoutRound::Semi => write!(f, "semifinal"),
            KnockoutRound::Final => write!(f, "final"),
        }
    }
}

/// Where in the tournament a match belongs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchStage {
    /// Group stage match; `label` is 'A'..'H'.
    Group { label: char },
    Knockout { round: KnockoutRound },
}

/// One goal, recorded as it is materialized during simulation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GoalEvent {
    pub minute: u32,
    pub side: Side,
    /// (home, away) immediately after this goal.
    pub score: (u32, u32),
}

/// A single match with its pre-rolled goal timeline.
///
/// `goal_minutes` is ascending and is consumed from the front as the match
/// progresses; consumed goals live on in `events`. Only the simulation engine
/// mutates a match after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub stage: MatchStage,
    pub home: String,
    pub away: String,
    pub home_odd: f64,
    pub draw_odd: f64,
    pub away_odd: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: MatchStatus,
    /// Elapsed simulated minute, 0..=duration. Monotone while Live.
    pub minute: u32,
    pub score_home: u32,
    pub score_away: u32,
    /// Pending goal minutes, ascending. Shrinks, never grows.
    pub goal_minutes: Vec<u32>,
    pub events: Vec<GoalEvent>,
    /// Set once the match has been reported for bet settlement.
    pub settled: bool,
}

impl GameMatch {
    pub fn new(
        stage: MatchStage,
        home: impl Into<String>,
        away: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        (home_odd, draw_odd, away_odd): (f64, f64, f64),
        goal_minutes: Vec<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage,
            home: home.into(),
            away: away.into(),
            home_odd,
            draw_odd,
            away_odd,
            start_time,
            end_time,
            status: MatchStatus::Scheduled,
            minute: 0,
            score_home: 0,
            score_away: 0,
            goal_minutes,
            events: Vec::new(),
            settled: false,
        }
    }

    /// Scheduled duration in simulated minutes (wall minutes map 1:1).
    pub fn duration_min(&self) -> u32 {
        (self.end_time - self.start_time).num_minutes().max(0) as u32
    }

    /// Side with the higher score, or `None` for a draw.
    pub fn leader(&self) -> Option<Side> {
        match self.score_home.cmp(&self.score_away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }
}
