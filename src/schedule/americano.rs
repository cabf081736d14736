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
    pairing::{Draft, Duo, circle, into_round, pack, whist},
    player::{Player, roster_index},
    round::Round,
    schedule::{matches_from_rotations, usable_courts},
};

/// The full Americano schedule.
///
/// The matches form a whist tournament: every pair of players partners
/// exactly once and faces each other exactly twice. Should the search for one
/// run out of steps, partners rotate by the circle method instead and the
/// matches are regrouped across the schedule to spread opponents. The matches
/// are laid out `courts` at a time, every round but the last on every court,
/// and the sit-outs move through the roster.
///
/// # Errors
///
/// If there are no courts, fewer than 4 players, or the player count isn't a
/// multiple of 4.
pub fn americano_rounds(players: &[Player], courts: usize) -> Result<Vec<Round>, ValidationError> {
    roster_index(players)?;

    let len = players.len();
    if courts == 0 {
        return Err(ValidationError::ZeroCourts);
    }
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
    let drafts: Vec<Draft> = match whist(len) {
        Some(rounds) => rounds.into_iter().flatten().collect(),
        None => {
            debug!("americano: no whist tournament found for {len} players");
            let rotations = circle(len)
                .into_iter()
                .map(|pairs| {
                    pairs
                        .into_iter()
                        .map(|(a, b)| Duo::new(a, b, None))
                        .collect()
                })
                .collect();

            matches_from_rotations(rotations, len)
        }
    };

    let rounds: Vec<Round> = pack(drafts, courts, len)
        .iter()
        .enumerate()
        .map(|(i, drafts)| into_round(i + 1, drafts, players, &[]))
        .collect();

    debug!("americano: {len} players on {courts} courts, {} rounds", rounds.len());
    Ok(rounds)
}
