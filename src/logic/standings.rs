//! Group standings and bracket seeding.
//!
//! Standings are derived on demand from finished group matches and never
//! persisted as authoritative state.

use crate::config::Config;
use crate::models::{
    GameMatch, Group, KnockoutRound, MatchStage, Side, Tournament,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::schedule::{make_match, next_full_hour};

/// Fixed cross-group pairing for the round of 16: winner of the first group
/// against the runner-up of the second.
const ROUND_OF_16_PAIRS: [(char, char); 8] = [
    ('A', 'B'),
    ('C', 'D'),
    ('E', 'F'),
    ('G', 'H'),
    ('B', 'A'),
    ('D', 'C'),
    ('F', 'E'),
    ('H', 'G'),
];

/// One row of a group table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

impl StandingsRow {
    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference = self.goals_for as i64 - self.goals_against as i64;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.wins += 1;
                self.points += 3;
            }
            std::cmp::Ordering::Equal => {
                self.draws += 1;
                self.points += 1;
            }
            std::cmp::Ordering::Less => self.losses += 1,
        }
    }
}

/// Compute the table for one group from the finished group matches.
///
/// Rank: points desc, then goal difference desc, then goals-for desc. Ties
/// beyond that keep the group's team order (known simplification; the
/// original applies no deeper tie-break either).
pub fn group_standings(group: &Group, matches: &[GameMatch]) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = group
        .teams
        .iter()
        .map(|t| StandingsRow {
            team: t.clone(),
            ..StandingsRow::default()
        })
        .collect();

    for m in matches {
        if !matches_group(m, group.label) || !m.is_finished() {
            continue;
        }
        if let Some(row) = rows.iter_mut().find(|r| r.team == m.home) {
            row.record(m.score_home, m.score_away);
        }
        if let Some(row) = rows.iter_mut().find(|r| r.team == m.away) {
            row.record(m.score_away, m.score_home);
        }
    }

    rows.sort_by(|x, y| {
        y.points
            .cmp(&x.points)
            .then(y.goal_difference.cmp(&x.goal_difference))
            .then(y.goals_for.cmp(&x.goals_for))
    });
    rows
}

fn matches_group(m: &GameMatch, label: char) -> bool {
    m.stage == MatchStage::Group { label }
}

/// Seed the round of 16 from the final group tables using the fixed
/// cross-group pairing table. Kickoffs are provisional; the scheduler
/// re-spaces them when the round is reached.
pub fn build_round_of_16(
    tournament: &Tournament,
    now: DateTime<Utc>,
    config: &Config,
    rng: &mut impl Rng,
) -> Vec<GameMatch> {
    let provisional_start = next_full_hour(now + Duration::hours(1));
    ROUND_OF_16_PAIRS
        .iter()
        .filter_map(|&(winner_group, runner_up_group)| {
            let winners = group_standings(tournament.group(winner_group)?, &tournament.matches);
            let runners = group_standings(tournament.group(runner_up_group)?, &tournament.matches);
            Some(make_match(
                MatchStage::Knockout {
                    round: KnockoutRound::RoundOf16,
                },
                &winners.first()?.team,
                &runners.get(1)?.team,
                provisional_start,
                config,
                rng,
            ))
        })
        .collect()
}

/// Winner of a finished knockout match. A draw has no natural winner here;
/// we settle it with a coin flip weighted by the pre-match odds (a stand-in
/// for a penalty shootout) and log the call.
fn knockout_winner<'a>(m: &'a GameMatch, rng: &mut impl Rng) -> &'a str {
    match m.leader() {
        Some(Side::Home) => &m.home,
        Some(Side::Away) => &m.away,
        None => {
            let w_home = 1.0 / m.home_odd;
            let w_away = 1.0 / m.away_odd;
            let winner = if rng.gen::<f64>() * (w_home + w_away) < w_home {
                &m.home
            } else {
                &m.away
            };
            log::info!(
                "{} vs {} drawn {}-{}; {} through on shootout",
                m.home,
                m.away,
                m.score_home,
                m.score_away,
                winner
            );
            winner
        }
    }
}

/// Build the next knockout round by pairing winners of consecutive fixtures
/// (fixture 1 winner vs fixture 2 winner, and so on), halving the count.
pub fn pair_winners(
    previous: &[GameMatch],
    round: KnockoutRound,
    now: DateTime<Utc>,
    config: &Config,
    rng: &mut impl Rng,
) -> Vec<GameMatch> {
    let provisional_start = next_full_hour(now + Duration::hours(1));
    previous
        .chunks_exact(2)
        .map(|pair| {
            let home = knockout_winner(&pair[0], rng).to_string();
            let away = knockout_winner(&pair[1], rng).to_string();
            make_match(
                MatchStage::Knockout { round },
                &home,
                &away,
                provisional_start,
                config,
                rng,
            )
        })
        .collect()
}
