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

//! Open ended schedules: one balanced round at a time, computed from what
//! was already scheduled.

use log::{debug, trace};

use crate::{
    error::ValidationError,
    pairing::{PairCounts, Pairing, group_pairs, into_round, match_partners},
    player::{Player, Team, roster_index, team_members},
    round::Round,
    schedule::{
        americano_rounds, mixed::split_genders, mixed_americano_rounds, team_americano_rounds,
        usable_courts,
    },
};

fn next_number(prior_rounds: &[Round]) -> usize {
    prior_rounds.last().map_or(1, |round| round.number + 1)
}

fn same_matches(round: &Round, other: &Round) -> bool {
    round.matches.len() == other.matches.len()
        && round.matches.iter().zip(&other.matches).all(|(game, other)| {
            game.team1.player_ids == other.team1.player_ids
                && game.team2.player_ids == other.team2.player_ids
        })
}

/// The next round of `schedule` when every round so far follows it, starting
/// over after its last round.
fn follow(schedule: &[Round], prior_rounds: &[Round]) -> Option<Round> {
    if schedule.is_empty() {
        return None;
    }

    let follows = prior_rounds
        .iter()
        .zip(schedule.iter().cycle())
        .all(|(round, planned)| same_matches(round, planned));
    if !follows {
        return None;
    }

    let mut round = schedule[prior_rounds.len() % schedule.len()].clone();
    round.renumber(next_number(prior_rounds));
    debug!("incremental: round {} follows the full schedule", round.number);
    Some(round)
}

/// Adds `count` of `candidates` to `picked` one at a time: whoever played
/// least, then whoever met the players already picked least often, then by
/// id.
fn pick<F>(
    candidates: &[usize],
    count: usize,
    picked: &mut Vec<usize>,
    players: &[Player],
    counts: &PairCounts,
    met: F,
) where
    F: Fn(usize, usize) -> u32,
{
    let mut remaining = candidates.to_vec();

    for _ in 0..count {
        let meetings = |a: usize| picked.iter().map(|&b| met(a, b)).sum::<u32>();
        let best = remaining
            .iter()
            .enumerate()
            .min_by(|&(_, &a), &(_, &b)| {
                counts
                    .played(a)
                    .cmp(&counts.played(b))
                    .then_with(|| meetings(a).cmp(&meetings(b)))
                    .then_with(|| players[a].id.cmp(&players[b].id))
            })
            .map(|(i, _)| i);

        let Some(i) = best else {
            break;
        };

        picked.push(remaining.swap_remove(i));
    }
}

fn by_id(mut active: Vec<usize>, players: &[Player]) -> Vec<usize> {
    active.sort_by(|&a, &b| players[a].id.cmp(&players[b].id));
    active
}

/// Partners and opponents for `active`, then laid out on courts.
fn build(
    active: &[usize],
    pairing: Pairing<'_>,
    counts: &PairCounts,
    number: usize,
    players: &[Player],
    teams: &[Team],
) -> Result<Round, ValidationError> {
    trace!("round {number}: active players {active:?}");

    let duos = match_partners(active, pairing, counts)
        .map_err(|i| ValidationError::NoValidPairing(players[i].id.clone()))?;
    let (drafts, _) = group_pairs(&duos, counts);

    let round = into_round(number, &drafts, players, teams);
    debug!(
        "incremental: round {number}, {} matches, {} sitting out",
        round.matches.len(),
        round.byes.len()
    );
    Ok(round)
}

/// The next Americano round given every round scheduled so far.
///
/// While every round so far follows the full Americano schedule, the next
/// round of that schedule comes next, over and over. Otherwise whoever played
/// least plays next, preferring players who met each other least. Partners
/// are chosen to keep the most repeated partnership as low as possible, then
/// opponents the same way; remaining ties go by player id.
///
/// # Errors
///
/// If there are no courts or fewer than 4 players.
pub fn next_incremental_round(
    players: &[Player],
    prior_rounds: &[Round],
    courts: usize,
) -> Result<Round, ValidationError> {
    roster_index(players)?;

    let courts = usable_courts(courts, players.len(), 4)?;
    if courts == 0 {
        return Err(ValidationError::NotEnoughPlayers {
            players: players.len(),
            needed: 4,
        });
    }

    if let Ok(schedule) = americano_rounds(players, courts)
        && let Some(round) = follow(&schedule, prior_rounds)
    {
        return Ok(round);
    }

    let counts = PairCounts::from_rounds(players, prior_rounds);
    let everybody: Vec<usize> = (0..players.len()).collect();
    let mut active = Vec::with_capacity(courts * 4);
    pick(&everybody, courts * 4, &mut active, players, &counts, |a, b| {
        counts.partners(a, b) + counts.opponents(a, b)
    });

    build(
        &by_id(active, players),
        Pairing::Open,
        &counts,
        next_number(prior_rounds),
        players,
        &[],
    )
}

/// The next mixed doubles round given every round scheduled so far.
///
/// # Errors
///
/// If there are no courts, somebody has no gender, the genders aren't
/// balanced, or there aren't two men and two women.
pub fn next_mixed_incremental_round(
    players: &[Player],
    prior_rounds: &[Round],
    courts: usize,
) -> Result<Round, ValidationError> {
    roster_index(players)?;

    let (males, females) = split_genders(players)?;
    let courts = usable_courts(courts, males.len(), 2)?;
    if courts == 0 {
        return Err(ValidationError::NotEnoughPlayers {
            players: players.len(),
            needed: 4,
        });
    }

    if let Ok(schedule) = mixed_americano_rounds(players, courts)
        && let Some(round) = follow(&schedule, prior_rounds)
    {
        return Ok(round);
    }

    let counts = PairCounts::from_rounds(players, prior_rounds);
    let met = |a, b| counts.partners(a, b) + counts.opponents(a, b);
    let mut active = Vec::with_capacity(courts * 4);
    pick(&males, courts * 2, &mut active, players, &counts, met);
    pick(&females, courts * 2, &mut active, players, &counts, met);

    build(
        &by_id(active, players),
        Pairing::Mixed(players),
        &counts,
        next_number(prior_rounds),
        players,
        &[],
    )
}

/// The next round between fixed teams given every round scheduled so far.
///
/// # Errors
///
/// If there are no courts, fewer than 2 teams, or a team isn't two distinct
/// roster players of their own.
pub fn next_team_incremental_round(
    teams: &[Team],
    players: &[Player],
    prior_rounds: &[Round],
    courts: usize,
) -> Result<Round, ValidationError> {
    let members = team_members(players, teams)?;

    let courts = usable_courts(courts, teams.len(), 2)?;
    if courts == 0 {
        return Err(ValidationError::NotEnoughTeams(teams.len()));
    }

    if let Ok(schedule) = team_americano_rounds(teams, players, courts)
        && let Some(round) = follow(&schedule, prior_rounds)
    {
        return Ok(round);
    }

    let counts = PairCounts::from_rounds(players, prior_rounds);
    let captains: Vec<usize> = members.iter().map(|&(first, _)| first).collect();
    let mut picked = Vec::with_capacity(courts * 2);
    pick(&captains, courts * 2, &mut picked, players, &counts, |a, b| {
        counts.opponents(a, b)
    });

    let mut active = Vec::with_capacity(courts * 4);
    for captain in picked {
        if let Some(&(first, second)) = members.iter().find(|&&(first, _)| first == captain) {
            active.extend([first, second]);
        }
    }

    build(
        &by_id(active, players),
        Pairing::Fixed(&members),
        &counts,
        next_number(prior_rounds),
        players,
        teams,
    )
}
