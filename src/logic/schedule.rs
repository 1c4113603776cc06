//! Season generation and fixture scheduling: group draw, round-robin rounds,
//! hour-aligned kickoffs, and the match factory (odds + goal timeline).

use crate::config::Config;
use crate::models::{Bracket, GameMatch, Group, MatchStage, MatchStatus, Phase, Tournament};
use chrono::{DateTime, Duration, Timelike, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// The 32-team pool drawn into groups A-H each season.
pub const TEAM_POOL: [&str; 32] = [
    "Manchester City",
    "Real Madrid",
    "Bayern Munich",
    "Barcelona",
    "Paris Saint-Germain",
    "Liverpool",
    "Juventus",
    "Chelsea",
    "Borussia Dortmund",
    "Atletico Madrid",
    "Inter Milan",
    "AC Milan",
    "Benfica",
    "Porto",
    "Ajax",
    "Sevilla",
    "Tottenham",
    "RB Leipzig",
    "Napoli",
    "Monaco",
    "Villarreal",
    "Zenit",
    "PSV",
    "Sporting CP",
    "Marseille",
    "Olympique Lyon",
    "Feyenoord",
    "Bayer Leverkusen",
    "Shakhtar Donetsk",
    "Celtic",
    "Galatasaray",
    "Dynamo Kyiv",
];

pub const GROUP_LABELS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Round-robin pairings for a group of 4 across its 3 rounds. Within a round
/// every team plays exactly once, so all matches of a round can kick off
/// together.
const GROUP_ROUND_PAIRINGS: [[(usize, usize); 2]; 3] =
    [[(0, 1), (2, 3)], [(0, 2), (1, 3)], [(0, 3), (1, 2)]];

/// Next full clock hour strictly after `now` (or `now` itself if already on
/// the hour boundary is in the past -- we always bump forward).
pub fn next_full_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = now
        .with_minute(0)
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(now);
    if truncated <= now {
        truncated + Duration::hours(1)
    } else {
        truncated
    }
}

/// Draw the three odds for a fresh match: home/away uniform in [1.60, 3.20],
/// draw uniform in [2.80, 3.60], all rounded to 2 decimals.
fn draw_odds(rng: &mut impl Rng) -> (f64, f64, f64) {
    let home = round2(1.6 + rng.gen::<f64>() * 1.6);
    let draw = round2(2.8 + rng.gen::<f64>() * 0.8);
    let away = round2(1.6 + rng.gen::<f64>() * 1.6);
    (home, draw, away)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Goal count for a group fixture: short tail, biased toward few goals
/// (30% of matches get 0-1 goals, the rest 0-3).
fn group_goal_count(rng: &mut impl Rng) -> usize {
    if rng.gen::<f64>() < 0.3 {
        rng.gen_range(0..2)
    } else {
        rng.gen_range(0..4)
    }
}

/// Goal count when a knockout fixture is (re)scheduled: slightly livelier
/// (60% of matches get 0-3 goals, the rest 0-1).
fn knockout_goal_count(rng: &mut impl Rng) -> usize {
    if rng.gen::<f64>() < 0.6 {
        rng.gen_range(0..4)
    } else {
        rng.gen_range(0..2)
    }
}

/// Sample `count` goal minutes uniformly in [1, 89], sorted ascending.
fn sample_goal_minutes(count: usize, rng: &mut impl Rng) -> Vec<u32> {
    let mut minutes: Vec<u32> = (0..count).map(|_| rng.gen_range(1..90)).collect();
    minutes.sort_unstable();
    minutes
}

/// Match factory: builds a `GameMatch` with drawn odds and a pre-rolled goal
/// timeline. End time is start + configured duration.
pub fn make_match(
    stage: MatchStage,
    home: &str,
    away: &str,
    start_time: DateTime<Utc>,
    config: &Config,
    rng: &mut impl Rng,
) -> GameMatch {
    let end_time = start_time + Duration::minutes(config.match_duration_min as i64);
    let goal_minutes = sample_goal_minutes(group_goal_count(rng), rng);
    GameMatch::new(
        stage,
        home,
        away,
        start_time,
        end_time,
        draw_odds(rng),
        goal_minutes,
    )
}

/// Generate a fresh season: shuffle the team pool into 8 groups of 4 and
/// build the 3 hour-aligned group rounds (2 fixtures per group per round).
pub fn generate_tournament(now: DateTime<Utc>, config: &Config, rng: &mut impl Rng) -> Tournament {
    let mut pool: Vec<&str> = TEAM_POOL.to_vec();
    pool.shuffle(rng);

    let groups: Vec<Group> = GROUP_LABELS
        .iter()
        .zip(pool.chunks_exact(4))
        .map(|(&label, teams)| Group {
            label,
            teams: teams.iter().map(|t| t.to_string()).collect(),
        })
        .collect();

    let base_start = next_full_hour(now);
    let mut matches = Vec::with_capacity(groups.len() * 6);
    for (round, pairings) in GROUP_ROUND_PAIRINGS.iter().enumerate() {
        let round_start = base_start + Duration::hours(round as i64);
        for group in &groups {
            for &(a, b) in pairings {
                matches.push(make_match(
                    MatchStage::Group { label: group.label },
                    &group.teams[a],
                    &group.teams[b],
                    round_start,
                    config,
                    rng,
                ));
            }
        }
    }

    Tournament {
        phase: Phase::Groups,
        groups,
        matches,
        bracket: Bracket::default(),
        season_start: now,
        season_end: None,
        auto_restart_at: None,
    }
}

/// Schedule a knockout round: kickoffs spaced one hour apart starting from
/// the next full hour at least one hour out, with every fixture's live state
/// reset so it simulates like a freshly created match. Empty list is a no-op.
pub fn schedule_knockout_round(
    fixtures: &mut [GameMatch],
    now: DateTime<Utc>,
    config: &Config,
    rng: &mut impl Rng,
) {
    let first_kickoff = next_full_hour(now + Duration::hours(1));
    for (i, m) in fixtures.iter_mut().enumerate() {
        m.start_time = first_kickoff + Duration::hours(i as i64);
        m.end_time = m.start_time + Duration::minutes(config.match_duration_min as i64);
        m.status = MatchStatus::Scheduled;
        m.minute = 0;
        m.score_home = 0;
        m.score_away = 0;
        m.goal_minutes = sample_goal_minutes(knockout_goal_count(rng), rng);
        m.events.clear();
        m.settled = false;
    }
}
