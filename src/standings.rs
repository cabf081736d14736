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

//! Standings are derived from the completed matches every time they are
//! needed and never updated in place.

use std::{cmp::Ordering, fmt, str::FromStr};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    Id,
    player::{Player, Team},
    round::{Round, Side},
    tournament::Tournament,
};

/// How ties on the leaderboard are broken when seeding adaptive rounds.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RankingStrategy {
    /// Points, then wins, then point difference.
    #[default]
    Points,
    /// Wins, then points, then point difference.
    Wins,
}

impl RankingStrategy {
    /// `Ordering::Less` means `a` ranks above `b`.
    #[must_use]
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let points = b.total_points.cmp(&a.total_points);
        let wins = b.matches_won.cmp(&a.matches_won);
        let difference = b.point_difference.cmp(&a.point_difference);

        match self {
            Self::Points => points.then(wins).then(difference),
            Self::Wins => wins.then(points).then(difference),
        }
    }
}

impl fmt::Display for RankingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Points => write!(f, "points"),
            Self::Wins => write!(f, "wins"),
        }
    }
}

impl FromStr for RankingStrategy {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        match string {
            "points" => Ok(Self::Points),
            "wins" => Ok(Self::Wins),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a RankingStrategy!"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub total_points: u32,
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub point_difference: i64,
}

impl Record {
    /// A tied score adds the points but is neither a win nor a loss, so it
    /// isn't counted as played either.
    fn add(&mut self, scored: u32, conceded: u32) {
        self.total_points += scored;
        self.point_difference += i64::from(scored) - i64::from(conceded);

        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.matches_played += 1;
                self.matches_won += 1;
            }
            Ordering::Less => {
                self.matches_played += 1;
                self.matches_lost += 1;
            }
            Ordering::Equal => {}
        }
    }

    pub(crate) fn merge(&mut self, other: &Record) {
        self.total_points += other.total_points;
        self.matches_played += other.matches_played;
        self.matches_won += other.matches_won;
        self.matches_lost += other.matches_lost;
        self.point_difference += other.point_difference;
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6} {:>6} {:>6} {:>6} {:>+6}",
            self.total_points,
            self.matches_played,
            self.matches_won,
            self.matches_lost,
            self.point_difference
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStanding {
    pub player_id: Id,
    pub player_name: String,
    pub record: Record,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team_id: Id,
    pub team_name: String,
    pub player_ids: [Id; 2],
    pub record: Record,
}

/// Player standings for the tournament, best first.
#[must_use]
pub fn standings(tournament: &Tournament) -> Vec<PlayerStanding> {
    calculate(&tournament.players, &tournament.rounds)
}

/// Team standings for the tournament, best first.
#[must_use]
pub fn team_standings(tournament: &Tournament) -> Vec<TeamStanding> {
    calculate_teams(&tournament.teams, &tournament.rounds)
}

/// Tallies every completed match of the roster's players.
///
/// Ordered by points, then wins, then point difference. Anything still tied
/// keeps roster order. Players in a match who aren't on the roster are
/// ignored.
#[must_use]
pub fn calculate(players: &[Player], rounds: &[Round]) -> Vec<PlayerStanding> {
    let mut records: Vec<Record> = vec![Record::default(); players.len()];
    let index: FxHashMap<&str, usize> = players
        .iter()
        .enumerate()
        .map(|(i, player)| (player.id.as_str(), i))
        .collect();

    for game in rounds.iter().flat_map(|round| &round.matches) {
        let Some((score1, score2)) = game.result() else {
            continue;
        };

        for (side, scored, conceded) in [
            (&game.team1, score1, score2),
            (&game.team2, score2, score1),
        ] {
            for id in &side.player_ids {
                if let Some(&i) = index.get(id.as_str()) {
                    records[i].add(scored, conceded);
                }
            }
        }
    }

    let mut standings: Vec<PlayerStanding> = players
        .iter()
        .zip(records)
        .map(|(player, record)| PlayerStanding {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            record,
        })
        .collect();

    standings.sort_by(|a, b| RankingStrategy::Points.compare(&a.record, &b.record));
    standings
}

/// Tallies every completed match between fixed teams.
///
/// A side belongs to a team when it carries the team's id or when its two
/// players are exactly the team's players.
#[must_use]
pub fn calculate_teams(teams: &[Team], rounds: &[Round]) -> Vec<TeamStanding> {
    let mut records: Vec<Record> = vec![Record::default(); teams.len()];

    for game in rounds.iter().flat_map(|round| &round.matches) {
        let Some((score1, score2)) = game.result() else {
            continue;
        };

        for (side, scored, conceded) in [
            (&game.team1, score1, score2),
            (&game.team2, score2, score1),
        ] {
            if let Some(i) = team_of(teams, side) {
                records[i].add(scored, conceded);
            }
        }
    }

    let mut standings: Vec<TeamStanding> = teams
        .iter()
        .zip(records)
        .map(|(team, record)| TeamStanding {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            player_ids: team.player_ids.clone(),
            record,
        })
        .collect();

    standings.sort_by(|a, b| RankingStrategy::Points.compare(&a.record, &b.record));
    standings
}

fn team_of(teams: &[Team], side: &Side) -> Option<usize> {
    if let Some(team_id) = &side.team_id
        && let Some(i) = teams.iter().position(|team| &team.id == team_id)
    {
        return Some(i);
    }

    match side.player_ids.as_slice() {
        [first, second] => teams.iter().position(|team| team.is_pair(first, second)),
        _ => None,
    }
}

/// Orders `0..len` by the records found for each entry, best first.
///
/// Entries without a record go last. Ties, including everybody when no
/// records exist yet, keep input order.
pub(crate) fn rank_order<'a, F>(len: usize, record_of: F, strategy: RankingStrategy) -> Vec<usize>
where
    F: Fn(usize) -> Option<&'a Record>,
{
    let mut order: Vec<usize> = (0..len).collect();

    order.sort_by(|&a, &b| match (record_of(a), record_of(b)) {
        (Some(a), Some(b)) => strategy.compare(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    order
}

/// Roster positions ranked by player standings.
pub(crate) fn rank_players(
    players: &[Player],
    standings: &[PlayerStanding],
    strategy: RankingStrategy,
) -> Vec<usize> {
    let records: FxHashMap<&str, &Record> = standings
        .iter()
        .map(|standing| (standing.player_id.as_str(), &standing.record))
        .collect();

    rank_order(
        players.len(),
        |i| records.get(players[i].id.as_str()).copied(),
        strategy,
    )
}

/// Team positions ranked by team standings.
pub(crate) fn rank_teams(
    teams: &[Team],
    standings: &[TeamStanding],
    strategy: RankingStrategy,
) -> Vec<usize> {
    let records: FxHashMap<&str, &Record> = standings
        .iter()
        .map(|standing| (standing.team_id.as_str(), &standing.record))
        .collect();

    rank_order(
        teams.len(),
        |i| records.get(teams[i].id.as_str()).copied(),
        strategy,
    )
}
