//! Bets: selections, combined odds, lifecycle and the user-facing errors.

use crate::models::game::MatchId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bet.
pub type BetId = Uuid;

/// Errors that can occur when placing or cashing out a bet.
#[derive(Clone, Debug, PartialEq)]
pub enum BetError {
    /// A bet needs at least one selection.
    NoSelections,
    /// The same match + outcome appears twice in one bet.
    DuplicateSelection,
    /// Stake is non-positive or below the configured minimum.
    InvalidStake { min: f64 },
    /// Stake exceeds the account balance.
    InsufficientFunds,
    /// No bet with this id on the account.
    BetNotFound(BetId),
    /// Cash-out requested on a non-pending bet, or with no live selection.
    NotCashable,
}

impl std::fmt::Display for BetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetError::NoSelections => write!(f, "Pick at least one selection"),
            BetError::DuplicateSelection => write!(f, "Selection is already on the slip"),
            BetError::InvalidStake { min } => write!(f, "Minimum stake is {:.2}", min),
            BetError::InsufficientFunds => write!(f, "Not enough points for this stake"),
            BetError::BetNotFound(_) => write!(f, "Bet not found"),
            BetError::NotCashable => write!(f, "Bet cannot be cashed out right now"),
        }
    }
}

/// Outcome a selection backs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

/// One leg of a combined bet. The odd is frozen at selection time and never
/// re-read from the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub match_id: MatchId,
    /// Team names at selection time, kept for display and result text.
    pub home: String,
    pub away: String,
    pub outcome: Outcome,
    pub odd: f64,
}

/// Bet lifecycle. Once a bet leaves `Pending` it never changes again;
/// settlement and cash-out are mutually exclusive terminal paths.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    CashedOut { amount: f64 },
}

/// A combined bet: 1..N selections, stake debited at placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,
    pub placed_at: DateTime<Utc>,
    pub stake: f64,
    pub selections: Vec<Selection>,
    /// Product of the selections' frozen odds.
    pub total_odd: f64,
    /// stake * total_odd, fixed at placement.
    pub potential_win: f64,
    pub status: BetStatus,
    pub result_text: Option<String>,
}

impl Bet {
    pub fn new(placed_at: DateTime<Utc>, stake: f64, selections: Vec<Selection>) -> Self {
        let total_odd: f64 = selections.iter().map(|s| s.odd).product();
        Self {
            id: Uuid::new_v4(),
            placed_at,
            stake,
            selections,
            total_odd,
            potential_win: stake * total_odd,
            status: BetStatus::Pending,
            result_text: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == BetStatus::Pending
    }
}
