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

use log::debug;

use crate::{
    error::ValidationError,
    pairing::{Draft, Duo, circle, into_round, pack},
    player::{Player, Team, team_members},
    round::Round,
    schedule::usable_courts,
};

pub(crate) fn team_duo(members: &[(usize, usize)], team: usize) -> Duo {
    let (a, b) = members[team];
    Duo::new(a, b, Some(team))
}

/// The full round robin between fixed teams.
///
/// Teams never split up. Every team meets every other team once; with an odd
/// number of teams one team rests in each rotation.
///
/// # Errors
///
/// If there are no courts, fewer than 2 teams, or a team isn't two distinct
/// roster players of their own.
pub fn team_americano_rounds(
    teams: &[Team],
    players: &[Player],
    courts: usize,
) -> Result<Vec<Round>, ValidationError> {
    let members = team_members(players, teams)?;

    if courts == 0 {
        return Err(ValidationError::ZeroCourts);
    }
    if teams.len() < 2 {
        return Err(ValidationError::NotEnoughTeams(teams.len()));
    }

    let courts = usable_courts(courts, teams.len(), 2)?;
    let drafts = circle(teams.len())
        .into_iter()
        .flatten()
        .map(|(a, b)| Draft::new(team_duo(&members, a), team_duo(&members, b)))
        .collect();

    let rounds: Vec<Round> = pack(drafts, courts, players.len())
        .iter()
        .enumerate()
        .map(|(i, drafts)| into_round(i + 1, drafts, players, teams))
        .collect();

    debug!("team americano: {} teams on {courts} courts, {} rounds", teams.len(), rounds.len());
    Ok(rounds)
}
