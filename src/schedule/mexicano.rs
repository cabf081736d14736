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

use log::{debug, trace};

use crate::{
    error::ValidationError,
    pairing::{Draft, Duo, into_round},
    player::{Player, Team, roster_index, team_members},
    round::Round,
    schedule::{team::team_duo, usable_courts},
    standings::{PlayerStanding, RankingStrategy, TeamStanding, rank_players, rank_teams},
};

/// Splits a ranking into bands of four, one per court, and plays the best
/// and the worst of a band against the middle two. Whoever ranks below the
/// last full band sits out.
pub(crate) fn seed_bands(order: &[usize], courts: usize) -> Vec<Draft> {
    order
        .chunks_exact(4)
        .take(courts)
        .filter_map(|band| match *band {
            [first, second, third, fourth] => Some(Draft::new(
                Duo::new(first, fourth, None),
                Duo::new(second, third, None),
            )),
            _ => None,
        })
        .collect()
}

/// Plays neighbouring teams in the ranking against each other.
pub(crate) fn seed_team_bands(
    order: &[usize],
    members: &[(usize, usize)],
    courts: usize,
) -> Vec<Draft> {
    order
        .chunks_exact(2)
        .take(courts)
        .filter_map(|band| match *band {
            [first, second] => Some(Draft::new(
                team_duo(members, first),
                team_duo(members, second),
            )),
            _ => None,
        })
        .collect()
}

/// The next Mexicano round, seeded from the current standings.
///
/// Players without standings, or all of them before anything was played,
/// keep roster order.
///
/// # Errors
///
/// If there are no courts or fewer than 4 players.
pub fn mexicano_round(
    players: &[Player],
    standings: &[PlayerStanding],
    round_number: usize,
    courts: usize,
    strategy: RankingStrategy,
) -> Result<Round, ValidationError> {
    roster_index(players)?;

    let courts = usable_courts(courts, players.len(), 4)?;
    if courts == 0 {
        return Err(ValidationError::NotEnoughPlayers {
            players: players.len(),
            needed: 4,
        });
    }

    let order = rank_players(players, standings, strategy);
    trace!("mexicano ranking: {order:?}");

    let round = into_round(round_number, &seed_bands(&order, courts), players, &[]);
    debug!("mexicano: round {round_number}, {} sitting out", round.byes.len());
    Ok(round)
}

/// The next Team Mexicano round: teams are ranked by their standings and
/// play the team next to them, 1 against 2, 3 against 4 and so on.
///
/// # Errors
///
/// If there are no courts, fewer than 2 teams, or a team isn't two distinct
/// roster players of their own.
pub fn team_mexicano_round(
    teams: &[Team],
    players: &[Player],
    standings: &[TeamStanding],
    round_number: usize,
    courts: usize,
    strategy: RankingStrategy,
) -> Result<Round, ValidationError> {
    let members = team_members(players, teams)?;

    let courts = usable_courts(courts, teams.len(), 2)?;
    if courts == 0 {
        return Err(ValidationError::NotEnoughTeams(teams.len()));
    }

    let order = rank_teams(teams, standings, strategy);
    trace!("team mexicano ranking: {order:?}");

    let drafts = seed_team_bands(&order, &members, courts);
    let round = into_round(round_number, &drafts, players, teams);
    debug!("team mexicano: round {round_number}, {} sitting out", round.byes.len());
    Ok(round)
}
