// This file is part of padel-mixer.
//
// padel-mixer is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// padel-mixer is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Id;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStatus {
    Completed,
    #[default]
    Pending,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// One side of a match: a single player or a pair.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Side {
    pub player_ids: Vec<Id>,
    /// Set when the side is a fixed team.
    #[serde(default)]
    pub team_id: Option<Id>,
}

impl Side {
    #[must_use]
    pub fn contains(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == player_id)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Id,
    pub round: usize,
    /// Courts are numbered from 1.
    #[serde(default)]
    pub court: Option<usize>,
    pub team1: Side,
    pub team2: Side,
    #[serde(default)]
    pub score1: Option<u32>,
    #[serde(default)]
    pub score2: Option<u32>,
    #[serde(default)]
    pub status: MatchStatus,
}

impl Match {
    #[must_use]
    pub fn new(round: usize, court: usize, team1: Side, team2: Side) -> Self {
        Self {
            id: match_id(round, court),
            round,
            court: Some(court),
            team1,
            team2,
            ..Self::default()
        }
    }

    /// The scores, if the match was played.
    #[must_use]
    pub fn result(&self) -> Option<(u32, u32)> {
        if self.status != MatchStatus::Completed {
            return None;
        }

        match (self.score1, self.score2) {
            (Some(score1), Some(score2)) => Some((score1, score2)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.result().is_some()
    }

    pub(crate) fn set_score(&mut self, score1: u32, score2: u32) {
        self.score1 = Some(score1);
        self.score2 = Some(score2);
        self.status = MatchStatus::Completed;
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let court = self
            .court
            .map_or_else(|| "-".to_string(), |court| court.to_string());

        write!(
            f,
            "{} court {court}: {} vs {}",
            self.id,
            self.team1.player_ids.join(" & "),
            self.team2.player_ids.join(" & "),
        )?;

        if let Some((score1, score2)) = self.result() {
            write!(f, " {score1}-{score2}")?;
        }

        Ok(())
    }
}

fn match_id(round: usize, court: usize) -> Id {
    format!("r{round}c{court}")
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Rounds are numbered from 1 without gaps.
    pub number: usize,
    pub matches: Vec<Match>,
    /// Players who sit this round out.
    #[serde(default)]
    pub byes: Vec<Id>,
    #[serde(default)]
    pub is_final: bool,
}

impl Round {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.matches.iter().all(Match::is_completed)
    }

    /// Moves the round, and every match in it, to a new round number.
    pub fn renumber(&mut self, number: usize) {
        self.number = number;

        for (i, game) in self.matches.iter_mut().enumerate() {
            let court = game.court.unwrap_or(i + 1);
            game.round = number;
            game.id = match_id(number, court);
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_final {
            writeln!(f, "Round {} (final)", self.number)?;
        } else {
            writeln!(f, "Round {}", self.number)?;
        }

        for game in &self.matches {
            writeln!(f, "  {game}")?;
        }

        if !self.byes.is_empty() {
            writeln!(f, "  sitting out: {}", self.byes.join(", "))?;
        }

        Ok(())
    }
}
