//! Integration tests for the bet ledger: placement, settlement, cash-out.

use chrono::{Duration, TimeZone, Utc};
use impulse_bet_web::{
    cash_out, cash_out_value, place_bet, settle_bets, Account, BetError, BetStatus, Bracket,
    Config, GameMatch, MatchStage, MatchStatus, Outcome, Phase, Selection, Tournament,
};

fn scheduled_match(home: &str, away: &str, odds: (f64, f64, f64)) -> GameMatch {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
    GameMatch::new(
        MatchStage::Group { label: 'A' },
        home,
        away,
        start,
        start + Duration::minutes(90),
        odds,
        Vec::new(),
    )
}

fn tournament_with(matches: Vec<GameMatch>) -> Tournament {
    Tournament {
        phase: Phase::Groups,
        groups: Vec::new(),
        matches,
        bracket: Bracket::default(),
        season_start: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        season_end: None,
        auto_restart_at: None,
    }
}

fn selection_on(m: &GameMatch, outcome: Outcome) -> Selection {
    let odd = match outcome {
        Outcome::HomeWin => m.home_odd,
        Outcome::Draw => m.draw_odd,
        Outcome::AwayWin => m.away_odd,
    };
    Selection {
        match_id: m.id,
        home: m.home.clone(),
        away: m.away.clone(),
        outcome,
        odd,
    }
}

fn finish(m: &mut GameMatch, home: u32, away: u32) {
    m.status = MatchStatus::Finished;
    m.minute = 90;
    m.score_home = home;
    m.score_away = away;
}

#[test]
fn single_selection_win_pays_potential() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sel = selection_on(&tournament.matches[0], Outcome::HomeWin);

    let id = place_bet(&mut account, vec![sel], 100.0, &config, Utc::now()).unwrap();
    assert_eq!(account.balance, 900.0);
    let bet = account.find_bet(id).unwrap();
    assert_eq!(bet.status, BetStatus::Pending);
    assert!((bet.potential_win - 200.0).abs() < 1e-9);

    finish(&mut tournament.matches[0], 2, 1);
    settle_bets(&mut account, &tournament);

    let bet = account.find_bet(id).unwrap();
    assert_eq!(bet.status, BetStatus::Won);
    assert!((account.balance - 1100.0).abs() < 1e-9);
}

#[test]
fn single_selection_loss_keeps_stake_gone() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sel = selection_on(&tournament.matches[0], Outcome::HomeWin);

    let id = place_bet(&mut account, vec![sel], 100.0, &config, Utc::now()).unwrap();
    finish(&mut tournament.matches[0], 1, 2);
    settle_bets(&mut account, &tournament);

    assert_eq!(account.find_bet(id).unwrap().status, BetStatus::Lost);
    assert!((account.balance - 900.0).abs() < 1e-9);
}

#[test]
fn combined_bet_needs_every_leg_to_win() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![
        scheduled_match("Ajax", "Porto", (1.8, 3.0, 2.5)),
        scheduled_match("Inter Milan", "Celtic", (2.2, 3.2, 2.9)),
    ]);
    let sels = vec![
        selection_on(&tournament.matches[0], Outcome::HomeWin),
        selection_on(&tournament.matches[1], Outcome::HomeWin),
    ];

    let id = place_bet(&mut account, sels, 50.0, &config, Utc::now()).unwrap();
    let bet = account.find_bet(id).unwrap();
    assert!((bet.total_odd - 3.96).abs() < 1e-9);
    assert!((bet.potential_win - 198.0).abs() < 1e-9);

    // First leg wins, second loses: whole bet lost.
    finish(&mut tournament.matches[0], 3, 1);
    finish(&mut tournament.matches[1], 0, 1);
    settle_bets(&mut account, &tournament);

    assert_eq!(account.find_bet(id).unwrap().status, BetStatus::Lost);
    assert!((account.balance - 950.0).abs() < 1e-9);
}

#[test]
fn placement_rejections_leave_account_untouched() {
    let config = Config::default();
    let mut account = Account::new("vic", 100.0);
    let tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sel = selection_on(&tournament.matches[0], Outcome::HomeWin);

    assert_eq!(
        place_bet(&mut account, Vec::new(), 50.0, &config, Utc::now()),
        Err(BetError::NoSelections)
    );
    assert_eq!(
        place_bet(&mut account, vec![sel.clone()], 5.0, &config, Utc::now()),
        Err(BetError::InvalidStake { min: 10.0 })
    );
    assert_eq!(
        place_bet(&mut account, vec![sel.clone()], -20.0, &config, Utc::now()),
        Err(BetError::InvalidStake { min: 10.0 })
    );
    assert_eq!(
        place_bet(&mut account, vec![sel.clone()], 500.0, &config, Utc::now()),
        Err(BetError::InsufficientFunds)
    );
    assert_eq!(
        place_bet(
            &mut account,
            vec![sel.clone(), sel.clone()],
            50.0,
            &config,
            Utc::now()
        ),
        Err(BetError::DuplicateSelection)
    );

    assert_eq!(account.balance, 100.0);
    assert!(account.bets.is_empty());
}

#[test]
fn opposite_outcomes_on_same_match_are_allowed() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sels = vec![
        selection_on(&tournament.matches[0], Outcome::HomeWin),
        selection_on(&tournament.matches[0], Outcome::Draw),
    ];
    assert!(place_bet(&mut account, sels, 50.0, &config, Utc::now()).is_ok());
}

#[test]
fn combined_odd_is_frozen_at_placement() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sel = selection_on(&tournament.matches[0], Outcome::HomeWin);
    let id = place_bet(&mut account, vec![sel], 100.0, &config, Utc::now()).unwrap();

    // Odds drifting on the match must not touch the bet.
    tournament.matches[0].home_odd = 9.9;
    let bet = account.find_bet(id).unwrap();
    assert!((bet.total_odd - 2.0).abs() < 1e-9);
    assert!((bet.potential_win - 200.0).abs() < 1e-9);
}

#[test]
fn settlement_sweep_is_idempotent() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sel = selection_on(&tournament.matches[0], Outcome::HomeWin);
    place_bet(&mut account, vec![sel], 100.0, &config, Utc::now()).unwrap();

    finish(&mut tournament.matches[0], 2, 0);
    settle_bets(&mut account, &tournament);
    let balance_after_first = account.balance;
    settle_bets(&mut account, &tournament);
    settle_bets(&mut account, &tournament);
    assert_eq!(account.balance, balance_after_first);
}

#[test]
fn unfinished_leg_keeps_bet_pending() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![
        scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5)),
        scheduled_match("Inter Milan", "Celtic", (2.2, 3.2, 2.9)),
    ]);
    let sels = vec![
        selection_on(&tournament.matches[0], Outcome::HomeWin),
        selection_on(&tournament.matches[1], Outcome::HomeWin),
    ];
    let id = place_bet(&mut account, sels, 50.0, &config, Utc::now()).unwrap();

    finish(&mut tournament.matches[0], 2, 0);
    settle_bets(&mut account, &tournament);
    assert_eq!(account.find_bet(id).unwrap().status, BetStatus::Pending);
}

#[test]
fn vanished_match_fails_safe_to_lost() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![
        scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5)),
        scheduled_match("Inter Milan", "Celtic", (2.2, 3.2, 2.9)),
    ]);
    let sels = vec![
        selection_on(&tournament.matches[0], Outcome::HomeWin),
        selection_on(&tournament.matches[1], Outcome::HomeWin),
    ];
    let id = place_bet(&mut account, sels, 50.0, &config, Utc::now()).unwrap();

    // Second match disappears (e.g. superseded by a season restart), first
    // one finishes as a win: the bet must not pay out.
    finish(&mut tournament.matches[0], 2, 0);
    tournament.matches.remove(1);
    settle_bets(&mut account, &tournament);
    assert_eq!(account.find_bet(id).unwrap().status, BetStatus::Lost);
}

#[test]
fn cash_out_on_winning_position_at_halftime() {
    // Spec'd curve: advantage > 0 at progress 0.5 with odd 2.0 gives
    // multiplier 1.3, so stake 100 cashes for exactly 130.00.
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sel = selection_on(&tournament.matches[0], Outcome::HomeWin);
    let id = place_bet(&mut account, vec![sel], 100.0, &config, Utc::now()).unwrap();

    let m = &mut tournament.matches[0];
    m.status = MatchStatus::Live;
    m.minute = 45;
    m.score_home = 1;
    m.score_away = 0;

    let quoted = cash_out_value(account.find_bet(id).unwrap(), &tournament);
    assert!((quoted - 130.0).abs() < 1e-9);

    let amount = cash_out(&mut account, id, &tournament).unwrap();
    assert!((amount - 130.0).abs() < 1e-9);
    assert!((account.balance - 1030.0).abs() < 1e-9);
    assert_eq!(
        account.find_bet(id).unwrap().status,
        BetStatus::CashedOut { amount }
    );
}

#[test]
fn cash_out_value_never_drops_below_fifth_of_stake() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sel = selection_on(&tournament.matches[0], Outcome::HomeWin);
    let id = place_bet(&mut account, vec![sel], 100.0, &config, Utc::now()).unwrap();

    // Deep in the match, badly behind.
    let m = &mut tournament.matches[0];
    m.status = MatchStatus::Live;
    m.minute = 88;
    m.score_home = 0;
    m.score_away = 3;

    let quoted = cash_out_value(account.find_bet(id).unwrap(), &tournament);
    assert!(quoted >= 20.0);
}

#[test]
fn cash_out_requires_a_live_selection() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sel = selection_on(&tournament.matches[0], Outcome::HomeWin);
    let id = place_bet(&mut account, vec![sel], 100.0, &config, Utc::now()).unwrap();

    // Not started yet.
    assert_eq!(
        cash_out(&mut account, id, &tournament),
        Err(BetError::NotCashable)
    );

    // Already finished (settlement's job, not cash-out's).
    finish(&mut tournament.matches[0], 1, 0);
    assert_eq!(
        cash_out(&mut account, id, &tournament),
        Err(BetError::NotCashable)
    );
}

#[test]
fn cash_out_and_settlement_are_mutually_exclusive() {
    let config = Config::default();
    let mut account = Account::new("vic", 1000.0);
    let mut tournament = tournament_with(vec![scheduled_match("Ajax", "Porto", (2.0, 3.0, 2.5))]);
    let sel = selection_on(&tournament.matches[0], Outcome::HomeWin);
    let id = place_bet(&mut account, vec![sel], 100.0, &config, Utc::now()).unwrap();

    let m = &mut tournament.matches[0];
    m.status = MatchStatus::Live;
    m.minute = 30;
    m.score_home = 1;
    m.score_away = 0;
    let amount = cash_out(&mut account, id, &tournament).unwrap();

    // Second cash-out is rejected; the later sweep must not touch the bet.
    assert_eq!(
        cash_out(&mut account, id, &tournament),
        Err(BetError::NotCashable)
    );
    finish(&mut tournament.matches[0], 2, 0);
    let balance_before = account.balance;
    settle_bets(&mut account, &tournament);
    assert_eq!(account.balance, balance_before);
    assert_eq!(
        account.find_bet(id).unwrap().status,
        BetStatus::CashedOut { amount }
    );
}
