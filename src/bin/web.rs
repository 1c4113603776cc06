//! Single binary web server: REST API over the in-memory tournament + ledger.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, plus the simulation knobs read by Config
//! (MIN_STAKE, MATCH_DURATION_MIN, TICK_INTERVAL_SECS, RESTART_DELAY_HOURS,
//! INITIAL_BALANCE).

use actix_web::{
    get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Utc;
use impulse_bet_web::{
    cash_out, cash_out_quote, generate_tournament, group_standings, place_bet, tick, Account, Bet,
    BetId, Config, MatchId, MatchStatus, Outcome, Selection, StandingsRow, Tournament,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// In-memory state: the single running tournament plus every account.
/// One lock serializes ticks against bet placement and cash-out.
struct AppStateInner {
    tournament: Tournament,
    accounts: HashMap<String, Account>,
}

type AppState = Data<RwLock<AppStateInner>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateAccountBody {
    name: String,
}

#[derive(Deserialize)]
struct SelectionBody {
    match_id: MatchId,
    outcome: Outcome,
}

#[derive(Deserialize)]
struct PlaceBetBody {
    stake: f64,
    selections: Vec<SelectionBody>,
}

/// Path segment: account name (e.g. /api/accounts/{name})
#[derive(Deserialize)]
struct AccountPath {
    name: String,
}

/// Path segments: account name and bet id.
#[derive(Deserialize)]
struct AccountBetPath {
    name: String,
    bet_id: BetId,
}

#[derive(Serialize)]
struct BetView {
    #[serde(flatten)]
    bet: Bet,
    /// Present only while the bet could be cashed out right now.
    cash_out_quote: Option<f64>,
}

#[derive(Serialize)]
struct AccountView {
    name: String,
    balance: f64,
    bets: Vec<BetView>,
}

#[derive(Serialize)]
struct GroupTable {
    label: char,
    rows: Vec<StandingsRow>,
}

#[derive(Serialize)]
struct RankingRow {
    name: String,
    balance: f64,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "impulse-bet-web",
    })
}

/// Full tournament snapshot: phase, groups, all fixtures, season timestamps.
#[get("/api/tournament")]
async fn api_tournament(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(&g.tournament)
}

/// Every match of the season, group stage first.
#[get("/api/matches")]
async fn api_matches(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let all: Vec<_> = g.tournament.all_matches().collect();
    HttpResponse::Ok().json(all)
}

/// The next round's fixtures: scheduled matches sharing the earliest kickoff.
#[get("/api/matches/upcoming")]
async fn api_matches_upcoming(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut upcoming: Vec<_> = g
        .tournament
        .all_matches()
        .filter(|m| m.status == MatchStatus::Scheduled)
        .collect();
    upcoming.sort_by_key(|m| m.start_time);
    let round: Vec<_> = match upcoming.first() {
        Some(first) => {
            let earliest = first.start_time;
            upcoming
                .iter()
                .filter(|m| m.start_time == earliest)
                .collect()
        }
        None => Vec::new(),
    };
    HttpResponse::Ok().json(round)
}

/// Matches currently live, with minute and score.
#[get("/api/matches/live")]
async fn api_matches_live(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut live: Vec<_> = g
        .tournament
        .all_matches()
        .filter(|m| m.status == MatchStatus::Live)
        .collect();
    live.sort_by_key(|m| m.start_time);
    HttpResponse::Ok().json(live)
}

/// Group tables, recomputed from finished group matches on every call.
#[get("/api/standings")]
async fn api_standings(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let tables: Vec<GroupTable> = g
        .tournament
        .groups
        .iter()
        .map(|group| GroupTable {
            label: group.label,
            rows: group_standings(group, &g.tournament.matches),
        })
        .collect();
    HttpResponse::Ok().json(tables)
}

/// Knockout fixtures per round (empty lists for rounds not yet reached).
#[get("/api/bracket")]
async fn api_bracket(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(&g.tournament.bracket)
}

/// Accounts ranked by balance, richest first.
#[get("/api/ranking")]
async fn api_ranking(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut rows: Vec<RankingRow> = g
        .accounts
        .values()
        .map(|a| RankingRow {
            name: a.name.clone(),
            balance: a.balance,
        })
        .collect();
    rows.sort_by(|x, y| y.balance.total_cmp(&x.balance));
    HttpResponse::Ok().json(rows)
}

/// Create an account with the configured initial balance.
#[post("/api/accounts")]
async fn api_create_account(
    state: AppState,
    config: Data<Config>,
    body: Json<CreateAccountBody>,
) -> HttpResponse {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Name required" }));
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if g.accounts.contains_key(name) {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "Account already exists" }));
    }
    let account = Account::new(name, config.initial_balance);
    g.accounts.insert(name.to_string(), account);
    HttpResponse::Ok().json(g.accounts.get(name))
}

/// Account snapshot: balance plus bets, each pending bet with a live
/// cash-out quote when one is computable.
#[get("/api/accounts/{name}")]
async fn api_get_account(state: AppState, path: Path<AccountPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let account = match g.accounts.get(&path.name) {
        Some(a) => a,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No account" })),
    };
    let bets = account
        .bets
        .iter()
        .map(|b| BetView {
            cash_out_quote: cash_out_quote(b, &g.tournament),
            bet: b.clone(),
        })
        .collect();
    HttpResponse::Ok().json(AccountView {
        name: account.name.clone(),
        balance: account.balance,
        bets,
    })
}

/// Place a combined bet. Selections reference scheduled matches by id; odds
/// are read from the match here and frozen into the bet.
#[post("/api/accounts/{name}/bets")]
async fn api_place_bet(
    state: AppState,
    config: Data<Config>,
    path: Path<AccountPath>,
    body: Json<PlaceBetBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if !g.accounts.contains_key(&path.name) {
        return HttpResponse::NotFound().json(serde_json::json!({ "error": "No account" }));
    }

    let mut selections = Vec::with_capacity(body.selections.len());
    for s in &body.selections {
        let m = match g.tournament.find_match(s.match_id) {
            Some(m) => m,
            None => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": "Match not found" }))
            }
        };
        if m.status != MatchStatus::Scheduled {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "Match has already started" }));
        }
        let odd = match s.outcome {
            Outcome::HomeWin => m.home_odd,
            Outcome::Draw => m.draw_odd,
            Outcome::AwayWin => m.away_odd,
        };
        selections.push(Selection {
            match_id: m.id,
            home: m.home.clone(),
            away: m.away.clone(),
            outcome: s.outcome,
            odd,
        });
    }

    let account = g
        .accounts
        .get_mut(&path.name)
        .expect("account checked above");
    match place_bet(account, selections, body.stake, &config, Utc::now()) {
        Ok(id) => {
            let bet = account.find_bet(id);
            HttpResponse::Ok().json(bet)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Cash out a pending bet at its current live valuation.
#[post("/api/accounts/{name}/bets/{bet_id}/cash-out")]
async fn api_cash_out(state: AppState, path: Path<AccountBetPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let AppStateInner {
        tournament,
        accounts,
    } = &mut *g;
    let account = match accounts.get_mut(&path.name) {
        Some(a) => a,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No account" })),
    };
    match cash_out(account, path.bet_id, tournament) {
        Ok(amount) => HttpResponse::Ok().json(serde_json::json!({
            "bet_id": path.bet_id,
            "amount": amount,
            "balance": account.balance,
        })),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);

    let config = Config::from_env();
    log::info!(
        "Starting server at http://{}:{} ({:?})",
        bind.0,
        bind.1,
        config
    );

    let tournament = generate_tournament(Utc::now(), &config, &mut rand::thread_rng());
    log::info!(
        "Season generated: {} group matches, first kickoff {}",
        tournament.matches.len(),
        tournament
            .matches
            .first()
            .map(|m| m.start_time.to_rfc3339())
            .unwrap_or_default()
    );

    let state = Data::new(RwLock::new(AppStateInner {
        tournament,
        accounts: HashMap::new(),
    }));
    let config_data = Data::new(config.clone());

    // Background task: the simulation tick. One tick advances every match,
    // settles bets on finished ones, and drives phase transitions/restart.
    let state_tick = state.clone();
    let tick_config = config.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(
            tick_config.tick_interval_secs.max(1),
        ));
        loop {
            interval.tick().await;
            let mut g = match state_tick.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let AppStateInner {
                tournament,
                accounts,
            } = &mut *g;
            tick(
                tournament,
                accounts,
                &tick_config,
                Utc::now(),
                &mut rand::thread_rng(),
            );
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config_data.clone())
            .service(api_health)
            .service(api_tournament)
            .service(api_matches)
            .service(api_matches_upcoming)
            .service(api_matches_live)
            .service(api_standings)
            .service(api_bracket)
            .service(api_ranking)
            .service(api_create_account)
            .service(api_get_account)
            .service(api_place_bet)
            .service(api_cash_out)
    })
    .bind(bind)?
    .run()
    .await
}
