//! Tournament: groups, fixtures, bracket and phase.

use crate::models::game::{GameMatch, KnockoutRound, MatchId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current phase of the season. Advances forward only, driven by match
/// completion (plus elapsed time for the restart out of `Finished`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Groups,
    RoundOf16,
    Quarter,
    Semi,
    Final,
    Finished,
}

impl Phase {
    /// The knockout round played during this phase, if any.
    pub fn knockout_round(self) -> Option<KnockoutRound> {
        match self {
            Phase::RoundOf16 => Some(KnockoutRound::RoundOf16),
            Phase::Quarter => Some(KnockoutRound::Quarter),
            Phase::Semi => Some(KnockoutRound::Semi),
            Phase::Final => Some(KnockoutRound::Final),
            Phase::Groups | Phase::Finished => None,
        }
    }
}

/// A group: label 'A'..'H' plus its four teams. Immutable once the season
/// is generated.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub label: char,
    pub teams: Vec<String>,
}

/// Knockout fixtures per round. Each list stays empty until the bracket
/// builder reaches that round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub round_of_16: Vec<GameMatch>,
    pub quarter: Vec<GameMatch>,
    pub semi: Vec<GameMatch>,
    #[serde(rename = "final")]
    pub final_round: Vec<GameMatch>,
}

impl Bracket {
    pub fn round(&self, round: KnockoutRound) -> &Vec<GameMatch> {
        match round {
            KnockoutRound::RoundOf16 => &self.round_of_16,
            KnockoutRound::Quarter => &self.quarter,
            KnockoutRound::Semi => &self.semi,
            KnockoutRound::Final => &self.final_round,
        }
    }

    pub fn round_mut(&mut self, round: KnockoutRound) -> &mut Vec<GameMatch> {
        match round {
            KnockoutRound::RoundOf16 => &mut self.round_of_16,
            KnockoutRound::Quarter => &mut self.quarter,
            KnockoutRound::Semi => &mut self.semi,
            KnockoutRound::Final => &mut self.final_round,
        }
    }
}

/// One full season: group assignments, all fixtures, bracket and timestamps.
/// Never mutated outside the scheduler / simulation engine; a restart
/// replaces the whole value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub phase: Phase,
    pub groups: Vec<Group>,
    /// All group-stage matches, grouped into hour-aligned rounds.
    pub matches: Vec<GameMatch>,
    pub bracket: Bracket,
    pub season_start: DateTime<Utc>,
    /// Set when the final finishes.
    pub season_end: Option<DateTime<Utc>>,
    /// Set together with `season_end`; once passed, a new season is generated.
    pub auto_restart_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Every match of the season, group stage first, then bracket rounds.
    pub fn all_matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.matches
            .iter()
            .chain(self.bracket.round_of_16.iter())
            .chain(self.bracket.quarter.iter())
            .chain(self.bracket.semi.iter())
            .chain(self.bracket.final_round.iter())
    }

    pub fn all_matches_mut(&mut self) -> impl Iterator<Item = &mut GameMatch> {
        self.matches
            .iter_mut()
            .chain(self.bracket.round_of_16.iter_mut())
            .chain(self.bracket.quarter.iter_mut())
            .chain(self.bracket.semi.iter_mut())
            .chain(self.bracket.final_round.iter_mut())
    }

    pub fn find_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.all_matches().find(|m| m.id == id)
    }

    pub fn group(&self, label: char) -> Option<&Group> {
        self.groups.iter().find(|g| g.label == label)
    }
}
