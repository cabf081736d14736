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
    pairing::{Duo, into_round, pack},
    player::{Gender, Player, roster_index},
    round::Round,
    schedule::{matches_from_rotations, usable_courts},
};

/// Roster positions of the men and of the women.
///
/// # Errors
///
/// If somebody has no gender or there are more of one than the other.
pub(crate) fn split_genders(
    players: &[Player],
) -> Result<(Vec<usize>, Vec<usize>), ValidationError> {
    let mut males = Vec::with_capacity(players.len() / 2);
    let mut females = Vec::with_capacity(players.len() / 2);

    for (i, player) in players.iter().enumerate() {
        match player.gender {
            Some(Gender::Male) => males.push(i),
            Some(Gender::Female) => females.push(i),
            None => return Err(ValidationError::MissingGender(player.id.clone())),
        }
    }

    if males.len() != females.len() {
        return Err(ValidationError::UnbalancedGenders {
            males: males.len(),
            females: females.len(),
        });
    }

    Ok((males, females))
}

/// The full mixed doubles schedule: every side is one man and one woman.
///
/// In rotation `r` the `i`th man partners the `(i + r) % n`th woman, so every
/// man partners every woman exactly once over `n` rotations.
///
/// # Errors
///
/// If there are no courts, a player has no gender, the genders aren't
/// balanced, or the player count isn't a multiple of 4.
pub fn mixed_americano_rounds(
    players: &[Player],
    courts: usize,
) -> Result<Vec<Round>, ValidationError> {
    roster_index(players)?;

    if courts == 0 {
        return Err(ValidationError::ZeroCourts);
    }

    let (males, females) = split_genders(players)?;
    let len = players.len();
    if len < 4 {
        return Err(ValidationError::NotEnoughPlayers {
            players: len,
            needed: 4,
        });
    }
    if len % 4 != 0 {
        return Err(ValidationError::PlayerCountNotMultipleOfFour(len));
    }

    let courts = usable_courts(courts, len, 4)?;
    let couples = males.len();
    let rotations = (0..couples)
        .map(|shift| {
            (0..couples)
                .map(|i| Duo::new(males[i], females[(i + shift) % couples], None))
                .collect()
        })
        .collect();

    let rounds: Vec<Round> = pack(matches_from_rotations(rotations, len), courts, len)
        .iter()
        .enumerate()
        .map(|(i, drafts)| into_round(i + 1, drafts, players, &[]))
        .collect();

    debug!("mixed americano: {couples} couples on {courts} courts, {} rounds", rounds.len());
    Ok(rounds)
}
