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

use std::{fmt, str::FromStr};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::{Id, error::ValidationError};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        let string = string.to_lowercase();

        match string.as_str() {
            "m" | "male" => Ok(Self::Male),
            "f" | "female" => Ok(Self::Female),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a Gender!"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Id,
    pub name: String,
    /// The account this player was linked to, if any.
    #[serde(default)]
    pub linked_user_id: Option<Id>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl Player {
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Two players who always play on the same side.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Id,
    pub name: String,
    pub player_ids: [Id; 2],
}

impl Team {
    #[must_use]
    pub fn new(id: &str, name: &str, first: &str, second: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            player_ids: [first.to_string(), second.to_string()],
        }
    }

    /// Whether the two players are exactly this team, in either order.
    #[must_use]
    pub fn is_pair(&self, first: &str, second: &str) -> bool {
        let [a, b] = &self.player_ids;
        (a == first && b == second) || (a == second && b == first)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Maps player ids to their position in the roster.
///
/// # Errors
///
/// If a player id is in the roster twice.
pub(crate) fn roster_index(players: &[Player]) -> Result<FxHashMap<&str, usize>, ValidationError> {
    let mut index = FxHashMap::default();

    for (i, player) in players.iter().enumerate() {
        if index.insert(player.id.as_str(), i).is_some() {
            return Err(ValidationError::DuplicatePlayer(player.id.clone()));
        }
    }

    Ok(index)
}

/// Resolves every team to the roster positions of its two players.
///
/// # Errors
///
/// If a team has an unknown or repeated player, or a player is in two teams.
pub(crate) fn team_members(
    players: &[Player],
    teams: &[Team],
) -> Result<Vec<(usize, usize)>, ValidationError> {
    let index = roster_index(players)?;
    let mut taken = FxHashSet::default();
    let mut members = Vec::with_capacity(teams.len());

    for team in teams {
        let [first, second] = &team.player_ids;
        if first == second {
            return Err(ValidationError::InvalidTeam(team.id.clone()));
        }

        let (Some(&a), Some(&b)) = (index.get(first.as_str()), index.get(second.as_str())) else {
            return Err(ValidationError::InvalidTeam(team.id.clone()));
        };

        for id in [first, second] {
            if !taken.insert(id.as_str()) {
                return Err(ValidationError::PlayerInTwoTeams(id.clone()));
            }
        }

        members.push((a, b));
    }

    Ok(members)
}
