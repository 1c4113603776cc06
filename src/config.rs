//! Runtime configuration, read from the environment with sensible defaults.

/// Tunables for the simulation and the ledger. Every field can be overridden
/// through the environment variable of the same (upper-case) name.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Smallest accepted stake (`MIN_STAKE`).
    pub min_stake: f64,
    /// Match duration in minutes; game minutes map 1:1 to wall minutes
    /// (`MATCH_DURATION_MIN`).
    pub match_duration_min: u32,
    /// Simulation tick cadence in seconds (`TICK_INTERVAL_SECS`).
    pub tick_interval_secs: u64,
    /// Hours between the final finishing and the next season starting
    /// (`RESTART_DELAY_HOURS`).
    pub restart_delay_hours: i64,
    /// Balance granted to a freshly created account (`INITIAL_BALANCE`).
    pub initial_balance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_stake: 10.0,
            match_duration_min: 90,
            tick_interval_secs: 15,
            restart_delay_hours: 6,
            initial_balance: 1000.0,
        }
    }
}

impl Config {
    /// Build a config from the environment, falling back to defaults for
    /// missing or unparseable values.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            min_stake: env_parse("MIN_STAKE", d.min_stake),
            match_duration_min: env_parse("MATCH_DURATION_MIN", d.match_duration_min),
            tick_interval_secs: env_parse("TICK_INTERVAL_SECS", d.tick_interval_secs),
            restart_delay_hours: env_parse("RESTART_DELAY_HOURS", d.restart_delay_hours),
            initial_balance: env_parse("INITIAL_BALANCE", d.initial_balance),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("Ignoring unparseable {}={}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}
