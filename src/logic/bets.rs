//! Bet ledger: placement, the settlement sweep, and live cash-out pricing.

use crate::config::Config;
use crate::models::{
    Account, Bet, BetError, BetId, BetStatus, GameMatch, MatchStatus, Outcome, Selection,
    Tournament,
};
use chrono::{DateTime, Utc};

/// Place a combined bet. The stake is debited immediately; the combined odd
/// and potential win are frozen at this instant. Nothing is mutated on
/// rejection.
pub fn place_bet(
    account: &mut Account,
    selections: Vec<Selection>,
    stake: f64,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<BetId, BetError> {
    if selections.is_empty() {
        return Err(BetError::NoSelections);
    }
    for (i, s) in selections.iter().enumerate() {
        if selections[..i]
            .iter()
            .any(|o| o.match_id == s.match_id && o.outcome == s.outcome)
        {
            return Err(BetError::DuplicateSelection);
        }
    }
    if !stake.is_finite() || stake <= 0.0 || stake < config.min_stake {
        return Err(BetError::InvalidStake {
            min: config.min_stake,
        });
    }
    if stake > account.balance {
        return Err(BetError::InsufficientFunds);
    }

    account.balance -= stake;
    let bet = Bet::new(now, stake, selections);
    let id = bet.id;
    log::info!(
        "{}: bet {} placed, stake {:.2} at {:.2} (potential {:.2})",
        account.name,
        id,
        stake,
        bet.total_odd,
        bet.potential_win
    );
    account.bets.push(bet);
    Ok(id)
}

/// Did this selection win, given its finished match?
fn selection_won(selection: &Selection, m: &GameMatch) -> bool {
    match selection.outcome {
        Outcome::HomeWin => m.score_home > m.score_away,
        Outcome::AwayWin => m.score_away > m.score_home,
        Outcome::Draw => m.score_home == m.score_away,
    }
}

/// Settlement sweep: resolve every pending bet whose referenced matches have
/// all finished. A selection whose match can no longer be resolved fails safe
/// to "not won". Re-sweeping is a no-op for bets already settled.
pub fn settle_bets(account: &mut Account, tournament: &Tournament) {
    let mut balance_delta = 0.0;
    for bet in &mut account.bets {
        if !bet.is_pending() {
            continue;
        }
        let resolved: Vec<Option<&GameMatch>> = bet
            .selections
            .iter()
            .map(|s| tournament.find_match(s.match_id))
            .collect();
        // Nothing resolvable: leave pending rather than guess.
        if resolved.iter().all(Option::is_none) {
            continue;
        }
        if resolved.iter().flatten().any(|m| !m.is_finished()) {
            continue;
        }

        let won = bet
            .selections
            .iter()
            .zip(&resolved)
            .all(|(s, m)| m.map(|m| selection_won(s, m)).unwrap_or(false));
        if won {
            balance_delta += bet.potential_win;
            bet.status = BetStatus::Won;
            bet.result_text = Some(format!("Won (+{:.2})", bet.potential_win));
            log::info!(
                "{}: bet {} won, paying {:.2}",
                account.name,
                bet.id,
                bet.potential_win
            );
        } else {
            bet.status = BetStatus::Lost;
            bet.result_text = Some("Lost".to_string());
            log::info!("{}: bet {} lost", account.name, bet.id);
        }
    }
    account.balance += balance_delta;
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Per-selection cash multiplier.
///
/// Matches that are not live contribute their frozen odd unchanged. Live
/// matches use a position/progress curve: ahead is worth more early, level
/// decays slowly, behind decays toward a floor. The curve is a heuristic,
/// not a fair-value model.
fn selection_cash_multiplier(selection: &Selection, m: Option<&GameMatch>) -> f64 {
    let m = match m {
        Some(m) if m.status == MatchStatus::Live => m,
        _ => return selection.odd,
    };
    let advantage = match selection.outcome {
        Outcome::HomeWin => m.score_home as i64 - m.score_away as i64,
        Outcome::AwayWin => m.score_away as i64 - m.score_home as i64,
        // A draw pick has no side to be "ahead" on; price it as level.
        Outcome::Draw => 0,
    };
    let progress = (m.minute as f64 / m.duration_min().max(1) as f64).min(1.0);
    let multiplier = if advantage > 0 {
        1.0 + 0.6 * (1.0 - progress)
    } else if advantage == 0 {
        1.0 - 0.15 * progress
    } else {
        (0.5 - 0.4 * progress).max(0.2)
    };
    (multiplier * (selection.odd / 2.0)).clamp(0.2, 3.0)
}

/// Current cash-out value of a pending bet: product of the per-selection
/// multipliers applied to the stake, rounded to cents, floored at 20% of the
/// stake. Deterministic given the current match states.
pub fn cash_out_value(bet: &Bet, tournament: &Tournament) -> f64 {
    let combined: f64 = bet
        .selections
        .iter()
        .map(|s| selection_cash_multiplier(s, tournament.find_match(s.match_id)))
        .product();
    let cash = round2(bet.stake * combined).max(bet.stake * 0.2);
    cash.max(0.0)
}

/// Cash out a pending bet. Only allowed while at least one selection's match
/// is live; this keeps cash-out and the settlement sweep mutually exclusive.
/// Credits the priced amount and moves the bet to its terminal state.
pub fn cash_out(
    account: &mut Account,
    bet_id: BetId,
    tournament: &Tournament,
) -> Result<f64, BetError> {
    let bet = account
        .find_bet(bet_id)
        .ok_or(BetError::BetNotFound(bet_id))?;
    if !bet.is_pending() {
        return Err(BetError::NotCashable);
    }
    let any_live = bet.selections.iter().any(|s| {
        tournament
            .find_match(s.match_id)
            .is_some_and(|m| m.status == MatchStatus::Live)
    });
    if !any_live {
        return Err(BetError::NotCashable);
    }

    let amount = cash_out_value(bet, tournament);
    account.balance += amount;
    let name = account.name.clone();
    let bet = account
        .find_bet_mut(bet_id)
        .expect("bet existed a moment ago");
    bet.status = BetStatus::CashedOut { amount };
    bet.result_text = Some(format!("Cashed out (+{:.2})", amount));
    log::info!("{}: bet {} cashed out for {:.2}", name, bet_id, amount);
    Ok(amount)
}

/// Quote a cash-out for display: `Some` only when the bet could actually be
/// cashed out right now.
pub fn cash_out_quote(bet: &Bet, tournament: &Tournament) -> Option<f64> {
    if !bet.is_pending() {
        return None;
    }
    let any_live = bet.selections.iter().any(|s| {
        tournament
            .find_match(s.match_id)
            .is_some_and(|m| m.status == MatchStatus::Live)
    });
    any_live.then(|| cash_out_value(bet, tournament))
}
