//! The simulation tick: advance every match from wall-clock time, settle
//! bets on freshly finished matches, and drive the phase state machine.

use crate::config::Config;
use crate::models::{
    Account, GameMatch, GoalEvent, KnockoutRound, MatchStatus, Phase, Side, Tournament,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;

use super::bets::settle_bets;
use super::schedule::{generate_tournament, schedule_knockout_round};
use super::standings::{build_round_of_16, pair_winners};

/// Advance a single match to the state implied by `now`.
///
/// Status and minute are derived purely from the match timestamps, so the
/// update is idempotent under missed or coarse ticks. While live, every
/// pending goal minute up to the current minute is materialized in one pass.
/// Returns true when the match transitioned to Finished for the first time.
pub fn update_match(m: &mut GameMatch, now: DateTime<Utc>, rng: &mut impl Rng) -> bool {
    if now < m.start_time {
        m.status = MatchStatus::Scheduled;
        m.minute = 0;
        return false;
    }

    let duration = m.duration_min();
    if now < m.end_time {
        let elapsed = (now - m.start_time).num_minutes().max(0) as u32;
        let minute = elapsed.min(duration);
        if minute < m.minute {
            // Timestamps only ever move a match forward; a regression here
            // means corrupted state.
            debug_assert!(false, "minute regressed: {} -> {}", m.minute, minute);
            log::error!(
                "{} vs {}: minute regressed ({} -> {}), skipping update",
                m.home,
                m.away,
                m.minute,
                minute
            );
            return false;
        }
        m.status = MatchStatus::Live;
        m.minute = minute;
        materialize_goals(m, rng);
        return false;
    }

    m.minute = duration;
    if m.status != MatchStatus::Finished {
        // A tick can jump straight past the end; flush the rest of the goal
        // timeline before the final score becomes visible to settlement.
        materialize_goals(m, rng);
        m.status = MatchStatus::Finished;
        return true;
    }
    false
}

/// Pop every pending goal minute at or below the current minute. The scorer
/// is a coin flip weighted by 1/odd, so the favored side scores more often.
fn materialize_goals(m: &mut GameMatch, rng: &mut impl Rng) {
    while m.goal_minutes.first().is_some_and(|&g| g <= m.minute) {
        let goal_minute = m.goal_minutes.remove(0);
        let w_home = 1.0 / m.home_odd;
        let w_away = 1.0 / m.away_odd;
        let side = if rng.gen::<f64>() * (w_home + w_away) < w_home {
            Side::Home
        } else {
            Side::Away
        };
        match side {
            Side::Home => m.score_home += 1,
            Side::Away => m.score_away += 1,
        }
        m.events.push(GoalEvent {
            minute: goal_minute,
            side,
            score: (m.score_home, m.score_away),
        });
        log::debug!(
            "GOAL {}' {} vs {} now {}-{}",
            goal_minute,
            m.home,
            m.away,
            m.score_home,
            m.score_away
        );
    }
}

/// One tick of the whole system: match updates, settlement sweep for newly
/// finished matches, phase advancement, and the season auto-restart.
///
/// The caller holds the lock around the whole tick, so bet placement and
/// cash-out never observe half-updated match state.
pub fn tick(
    tournament: &mut Tournament,
    accounts: &mut HashMap<String, Account>,
    config: &Config,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) {
    let mut any_finished = false;
    for m in tournament.all_matches_mut() {
        if update_match(m, now, rng) {
            log::info!(
                "Full time: {} {}-{} {}",
                m.home,
                m.score_home,
                m.score_away,
                m.away
            );
            any_finished = true;
        }
    }

    // Report each newly finished match to the ledger exactly once. The sweep
    // itself only touches pending bets whose matches are all finished.
    if any_finished {
        for account in accounts.values_mut() {
            settle_bets(account, tournament);
        }
        for m in tournament.all_matches_mut() {
            if m.status == MatchStatus::Finished {
                m.settled = true;
            }
        }
    }

    advance_phase(tournament, config, now, rng);

    if tournament.phase == Phase::Finished {
        if let Some(restart_at) = tournament.auto_restart_at {
            if now >= restart_at {
                log::info!("Season over since {:?}; starting a new one", tournament.season_end);
                *tournament = generate_tournament(now, config, rng);
            }
        }
    }
}

/// Advance the tournament phase when every match of the current phase has
/// finished. Each knockout transition builds the next round's fixtures and
/// hands them to the scheduler.
pub fn advance_phase(
    tournament: &mut Tournament,
    config: &Config,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) {
    match tournament.phase {
        Phase::Groups => {
            if tournament.matches.iter().all(GameMatch::is_finished) {
                let mut fixtures = build_round_of_16(tournament, now, config, rng);
                schedule_knockout_round(&mut fixtures, now, config, rng);
                tournament.bracket.round_of_16 = fixtures;
                tournament.phase = Phase::RoundOf16;
                log::info!("Group stage complete; round of 16 drawn");
            }
        }
        Phase::RoundOf16 | Phase::Quarter | Phase::Semi => {
            let round = tournament
                .phase
                .knockout_round()
                .expect("knockout phase has a round");
            let fixtures = tournament.bracket.round(round);
            if fixtures.is_empty() || !fixtures.iter().all(GameMatch::is_finished) {
                return;
            }
            let next_round = round.next().expect("rounds before the final have a successor");
            let mut next_fixtures =
                pair_winners(tournament.bracket.round(round), next_round, now, config, rng);
            schedule_knockout_round(&mut next_fixtures, now, config, rng);
            *tournament.bracket.round_mut(next_round) = next_fixtures;
            tournament.phase = match next_round {
                KnockoutRound::Quarter => Phase::Quarter,
                KnockoutRound::Semi => Phase::Semi,
                _ => Phase::Final,
            };
            log::info!("{} complete; {} scheduled", round, next_round);
        }
        Phase::Final => {
            let fixtures = &tournament.bracket.final_round;
            if !fixtures.is_empty() && fixtures.iter().all(GameMatch::is_finished) {
                tournament.season_end = Some(now);
                tournament.auto_restart_at =
                    Some(now + Duration::hours(config.restart_delay_hours));
                tournament.phase = Phase::Finished;
                log::info!(
                    "Season finished; auto-restart at {:?}",
                    tournament.auto_restart_at
                );
            }
        }
        Phase::Finished => {}
    }
}
