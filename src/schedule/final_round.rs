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

//! The closing round. It is always generated as round 1; the caller moves it
//! behind the rounds already played with [`Round::renumber`].

use log::debug;

use crate::{
    error::ValidationError,
    pairing::{Draft, Duo, into_round},
    player::{Gender, Player, Team, roster_index},
    round::Round,
    schedule::{
        mexicano::{mexicano_round, team_mexicano_round},
        usable_courts,
    },
    standings::{PlayerStanding, RankingStrategy, TeamStanding, rank_players},
};

/// The final round: the top four contest court 1, first and fourth against
/// second and third, and every lower court gets the next four.
///
/// # Errors
///
/// If there are no courts or fewer than 4 players.
pub fn final_round(
    players: &[Player],
    standings: &[PlayerStanding],
    courts: usize,
    strategy: RankingStrategy,
) -> Result<Round, ValidationError> {
    let mut round = mexicano_round(players, standings, 1, courts, strategy)?;
    round.is_final = true;

    debug!("final round: {} matches", round.matches.len());
    Ok(round)
}

/// The final round for mixed doubles. Men and women are ranked apart; each
/// court gets the next two of each and the best man partners the second
/// best woman against the second best man and the best woman.
///
/// # Errors
///
/// If there are no courts, somebody has no gender, or there aren't two men
/// and two women.
pub fn final_round_mixed(
    players: &[Player],
    standings: &[PlayerStanding],
    courts: usize,
    strategy: RankingStrategy,
) -> Result<Round, ValidationError> {
    roster_index(players)?;

    if let Some(player) = players.iter().find(|player| player.gender.is_none()) {
        return Err(ValidationError::MissingGender(player.id.clone()));
    }

    let order = rank_players(players, standings, strategy);
    let (males, females): (Vec<usize>, Vec<usize>) = order
        .iter()
        .copied()
        .partition(|&i| players[i].gender == Some(Gender::Male));

    let courts = usable_courts(courts, males.len().min(females.len()), 2)?;
    if courts == 0 {
        return Err(ValidationError::NotEnoughPlayers {
            players: players.len(),
            needed: 4,
        });
    }

    let drafts: Vec<Draft> = males
        .chunks_exact(2)
        .zip(females.chunks_exact(2))
        .take(courts)
        .filter_map(|bands| match bands {
            (&[first_man, second_man], &[first_woman, second_woman]) => Some(Draft::new(
                Duo::new(first_man, second_woman, None),
                Duo::new(second_man, first_woman, None),
            )),
            _ => None,
        })
        .collect();

    let mut round = into_round(1, &drafts, players, &[]);
    round.is_final = true;

    debug!("mixed final round: {} matches", round.matches.len());
    Ok(round)
}

/// The final round for fixed teams: first against second on court 1, third
/// against fourth on court 2 and so on.
///
/// # Errors
///
/// If there are no courts, fewer than 2 teams, or a team isn't two distinct
/// roster players of their own.
pub fn final_round_teams(
    teams: &[Team],
    players: &[Player],
    standings: &[TeamStanding],
    courts: usize,
    strategy: RankingStrategy,
) -> Result<Round, ValidationError> {
    let mut round = team_mexicano_round(teams, players, standings, 1, courts, strategy)?;
    round.is_final = true;

    debug!("team final round: {} matches", round.matches.len());
    Ok(round)
}
