//! Betting simulator web app: library with models and business logic.

pub mod config;
pub mod logic;
pub mod models;

pub use config::Config;
pub use logic::{
    advance_phase, build_round_of_16, cash_out, cash_out_quote, cash_out_value,
    generate_tournament, group_standings, make_match, next_full_hour, pair_winners, place_bet,
    schedule_knockout_round, settle_bets, tick, update_match, StandingsRow, GROUP_LABELS,
    TEAM_POOL,
};
pub use models::{
    Account, Bet, BetError, BetId, BetStatus, Bracket, GameMatch, GoalEvent, Group, KnockoutRound,
    MatchId, MatchStage, MatchStatus, Outcome, Phase, Selection, Side, Tournament,
};
