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

//! Round generators, one per format.
//!
//! Every generator is a pure function of its arguments. On a
//! [`ValidationError`] nothing is generated.

mod americano;
mod final_round;
mod incremental;
mod mexicano;
mod mixed;
mod team;

use std::{fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

pub use americano::americano_rounds;
pub use final_round::{final_round, final_round_mixed, final_round_teams};
pub use incremental::{
    next_incremental_round, next_mixed_incremental_round, next_team_incremental_round,
};
pub use mexicano::{mexicano_round, team_mexicano_round};
pub use mixed::mixed_americano_rounds;
pub use team::team_americano_rounds;

use crate::{
    error::ValidationError,
    pairing::{Draft, Duo, PairCounts, group_pairs, spread_opponents},
    player::{Player, Team, roster_index},
    round::Round,
    standings::RankingStrategy,
    tournament::Format,
};

/// Whether the whole schedule is known up front.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundMode {
    /// The full schedule, cut or stretched to `total_rounds` when given.
    Fixed { total_rounds: Option<usize> },
    /// One round at a time, for as long as the players like.
    Unlimited,
}

impl Default for RoundMode {
    fn default() -> Self {
        Self::Fixed { total_rounds: None }
    }
}

impl fmt::Display for RoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed {
                total_rounds: Some(total_rounds),
            } => write!(f, "fixed:{total_rounds}"),
            Self::Fixed { total_rounds: None } => write!(f, "fixed"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

impl FromStr for RoundMode {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        match string.split_once(':') {
            None if string == "fixed" => Ok(Self::Fixed { total_rounds: None }),
            None if string == "unlimited" => Ok(Self::Unlimited),
            Some(("fixed", total_rounds)) => Ok(Self::Fixed {
                total_rounds: Some(total_rounds.parse()?),
            }),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a RoundMode!"
            ))),
        }
    }
}

/// The rounds a new tournament starts with.
///
/// Adaptive formats start with round 1 only, seeded in roster order. So does
/// every format in unlimited mode. Otherwise the full schedule is built and,
/// with a round target, cut short or extended one balanced round at a time.
///
/// # Errors
///
/// If the players, teams or courts can't make up a round for the format.
pub fn build_initial_rounds(
    format: Format,
    players: &[Player],
    teams: &[Team],
    courts: usize,
    round_mode: RoundMode,
) -> Result<Vec<Round>, ValidationError> {
    roster_index(players)?;

    let rounds = match (format, round_mode) {
        (Format::Mexicano, _) => vec![mexicano_round(
            players,
            &[],
            1,
            courts,
            RankingStrategy::default(),
        )?],
        (Format::TeamMexicano, _) => vec![team_mexicano_round(
            teams,
            players,
            &[],
            1,
            courts,
            RankingStrategy::default(),
        )?],
        (_, RoundMode::Unlimited) => {
            vec![next_round_for(format, players, teams, &[], courts)?]
        }
        (_, RoundMode::Fixed { total_rounds }) => {
            let mut rounds = match format {
                Format::MixedAmericano => mixed_americano_rounds(players, courts)?,
                Format::TeamAmericano => team_americano_rounds(teams, players, courts)?,
                Format::Americano | Format::Mexicano | Format::TeamMexicano => {
                    americano_rounds(players, courts)?
                }
            };

            if let Some(total_rounds) = total_rounds.filter(|&total_rounds| total_rounds > 0) {
                rounds.truncate(total_rounds);

                while rounds.len() < total_rounds {
                    let round = next_round_for(format, players, teams, &rounds, courts)?;
                    rounds.push(round);
                }
            }

            rounds
        }
    };

    debug!("{format}: built {} initial rounds", rounds.len());
    Ok(rounds)
}

/// The next balanced round for an Americano family format.
///
/// # Errors
///
/// If the players, teams or courts can't make up a round for the format.
pub fn next_round_for(
    format: Format,
    players: &[Player],
    teams: &[Team],
    prior_rounds: &[Round],
    courts: usize,
) -> Result<Round, ValidationError> {
    match format {
        Format::MixedAmericano => next_mixed_incremental_round(players, prior_rounds, courts),
        Format::TeamAmericano | Format::TeamMexicano => {
            next_team_incremental_round(teams, players, prior_rounds, courts)
        }
        Format::Americano | Format::Mexicano => {
            next_incremental_round(players, prior_rounds, courts)
        }
    }
}

/// Limits the courts to what `entries` can fill, `per_court` at a time.
///
/// # Errors
///
/// If there are no courts.
pub(crate) fn usable_courts(
    courts: usize,
    entries: usize,
    per_court: usize,
) -> Result<usize, ValidationError> {
    if courts == 0 {
        return Err(ValidationError::ZeroCourts);
    }

    let usable = courts.min(entries / per_court);
    if usable < courts {
        debug!("only {usable} of {courts} courts can be filled");
    }

    Ok(usable)
}

/// Groups every rotation's pairs into matches, one rotation after the other
/// so later rotations avoid the opponents of earlier ones, then regroups
/// across the whole schedule until no swap spreads opponents further.
pub(crate) fn matches_from_rotations(rotations: Vec<Vec<Duo>>, players: usize) -> Vec<Draft> {
    let mut counts = PairCounts::new(players);
    let mut grouped = Vec::with_capacity(rotations.len());

    for duos in rotations {
        let (drafts, _) = group_pairs(&duos, &counts);

        for draft in &drafts {
            counts.record(draft);
        }

        grouped.push(drafts);
    }

    spread_opponents(&mut grouped);
    grouped.into_iter().flatten().collect()
}
