//! Business logic: scheduling, live simulation, standings/bracket, bets.

mod bets;
mod schedule;
mod simulate;
mod standings;

pub use bets::{cash_out, cash_out_quote, cash_out_value, place_bet, settle_bets};
pub use schedule::{
    generate_tournament, make_match, next_full_hour, schedule_knockout_round, GROUP_LABELS,
    TEAM_POOL,
};
pub use simulate::{advance_phase, tick, update_match};
pub use standings::{build_round_of_16, group_standings, pair_winners, StandingsRow};
