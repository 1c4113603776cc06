//! Data structures for the betting simulator: matches, tournament, bets, accounts.

mod account;
mod bet;
mod game;
mod tournament;

pub use account::Account;
pub use bet::{Bet, BetError, BetId, BetStatus, Outcome, Selection};
pub use game::{GameMatch, GoalEvent, KnockoutRound, MatchId, MatchStage, MatchStatus, Side};
pub use tournament::{Bracket, Group, Phase, Tournament};
