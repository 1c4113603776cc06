//! Account: balance plus the bets placed against it.

use crate::models::bet::{Bet, BetId};
use serde::{Deserialize, Serialize};

/// A player's account. Authentication lives outside the core; the name
/// doubles as the identifier here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub balance: f64,
    pub bets: Vec<Bet>,
}

impl Account {
    pub fn new(name: impl Into<String>, initial_balance: f64) -> Self {
        Self {
            name: name.into(),
            balance: initial_balance,
            bets: Vec::new(),
        }
    }

    pub fn find_bet(&self, id: BetId) -> Option<&Bet> {
        self.bets.iter().find(|b| b.id == id)
    }

    pub fn find_bet_mut(&mut self, id: BetId) -> Option<&mut Bet> {
        self.bets.iter_mut().find(|b| b.id == id)
    }
}
