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

//! Results across finished tournaments: the leaderboard and player profiles.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    Id,
    standings::{RankingStrategy, Record, calculate},
    tournament::{Format, Tournament},
};

const RECENT_RESULTS: usize = 10;
const BEST_PARTNERS: usize = 5;

/// How far back the leaderboard looks.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    #[default]
    Overall,
    /// Since the first of the month.
    Monthly,
    /// Since Monday.
    Weekly,
    /// Since midnight.
    Daily,
}

impl Period {
    /// The start of the period, in UTC. `None` means all time.
    #[must_use]
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();

        let start = match self {
            Self::Overall => return None,
            Self::Monthly => today - Duration::days(i64::from(today.day0())),
            Self::Weekly => {
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
            Self::Daily => today,
        };

        start
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => write!(f, "overall"),
            Self::Monthly => write!(f, "monthly"),
            Self::Weekly => write!(f, "weekly"),
            Self::Daily => write!(f, "daily"),
        }
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        match string.to_lowercase().as_str() {
            "overall" => Ok(Self::Overall),
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            "daily" => Ok(Self::Daily),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a Period!"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based.
    pub rank: usize,
    pub player_name: String,
    pub linked_user_id: Option<Id>,
    pub record: Record,
    /// Percent of matches won, rounded.
    pub win_rate: u32,
    pub tournaments_played: u32,
}

impl fmt::Display for LeaderboardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4} {:<20} {} {:>5}% {:>4}",
            self.rank, self.player_name, self.record, self.win_rate, self.tournaments_played
        )
    }
}

/// Rounds half up.
fn win_rate(record: &Record) -> u32 {
    if record.matches_played == 0 {
        return 0;
    }

    (200 * record.matches_won + record.matches_played) / (2 * record.matches_played)
}

/// Players across every finished tournament in the period, best first.
///
/// Players linked to an account are counted together; guests are told apart
/// by name. The name shown is the one from their latest tournament.
#[must_use]
pub fn leaderboard(
    tournaments: &[Tournament],
    period: Period,
    official_only: bool,
    now: DateTime<Utc>,
) -> Vec<LeaderboardEntry> {
    let since = period.since(now);
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut entries: Vec<LeaderboardEntry> = Vec::new();

    let counted = tournaments
        .iter()
        .filter(|tournament| tournament.is_finished())
        .filter(|tournament| !official_only || tournament.is_official)
        .filter(|tournament| since.is_none_or(|since| tournament.updated_at >= since))
        .sorted_by_key(|tournament| tournament.updated_at);

    for tournament in counted {
        for standing in calculate(&tournament.players, &tournament.rounds) {
            let linked_user_id = tournament
                .players
                .iter()
                .find(|player| player.id == standing.player_id)
                .and_then(|player| player.linked_user_id.clone());

            let key = linked_user_id
                .clone()
                .unwrap_or_else(|| format!("guest_{}", standing.player_name));

            let i = *index.entry(key).or_insert_with(|| {
                entries.push(LeaderboardEntry {
                    linked_user_id,
                    ..LeaderboardEntry::default()
                });
                entries.len() - 1
            });

            let entry = &mut entries[i];
            entry.record.merge(&standing.record);
            entry.tournaments_played += 1;
            entry.player_name = standing.player_name;
        }
    }

    entries.sort_by(|a, b| RankingStrategy::Points.compare(&a.record, &b.record));

    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
        entry.win_rate = win_rate(&entry.record);
    }

    entries
}

/// How a player did in one tournament.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentResult {
    pub tournament_id: Id,
    pub tournament_name: String,
    pub format: Format,
    pub placement: usize,
    pub total_players: usize,
    pub record: Record,
    pub finished_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerStat {
    pub partner_name: String,
    pub shared_matches: u32,
    pub shared_wins: u32,
}

/// Partners by name, in the order they were first met.
#[derive(Default)]
struct Partners {
    index: FxHashMap<String, usize>,
    stats: Vec<PartnerStat>,
}

impl Partners {
    fn tally(&mut self, tournament: &Tournament, player_id: &str) {
        for game in tournament.rounds.iter().flat_map(|round| &round.matches) {
            let Some((score1, score2)) = game.result() else {
                continue;
            };

            let (side, won) = if game.team1.contains(player_id) {
                (&game.team1, score1 > score2)
            } else if game.team2.contains(player_id) {
                (&game.team2, score2 > score1)
            } else {
                continue;
            };

            for partner_id in side.player_ids.iter().filter(|&id| id != player_id) {
                let partner_name = tournament
                    .players
                    .iter()
                    .find(|player| &player.id == partner_id)
                    .map_or_else(|| partner_id.clone(), |player| player.name.clone());

                let stats = &mut self.stats;
                let i = *self.index.entry(partner_name.clone()).or_insert_with(|| {
                    stats.push(PartnerStat {
                        partner_name,
                        ..PartnerStat::default()
                    });
                    stats.len() - 1
                });

                self.stats[i].shared_matches += 1;
                if won {
                    self.stats[i].shared_wins += 1;
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub tournaments_played: u32,
    pub tournaments_won: u32,
    pub record: Record,
    pub win_rate: u32,
    /// Rounded to one decimal.
    pub avg_points_per_match: f64,
    /// Latest first.
    pub recent_tournaments: Vec<TournamentResult>,
    pub best_partners: Vec<PartnerStat>,
}

/// A linked account's results over the finished tournaments they played.
#[must_use]
pub fn player_profile(tournaments: &[Tournament], user_id: &str) -> PlayerProfile {
    let mut profile = PlayerProfile::default();
    let mut partners = Partners::default();

    let played = tournaments
        .iter()
        .filter(|tournament| tournament.is_finished())
        .sorted_by(|a, b| b.updated_at.cmp(&a.updated_at));

    for tournament in played {
        let Some(player) = tournament
            .players
            .iter()
            .find(|player| player.linked_user_id.as_deref() == Some(user_id))
        else {
            continue;
        };

        let standings = calculate(&tournament.players, &tournament.rounds);
        let Some(placement) = standings
            .iter()
            .position(|standing| standing.player_id == player.id)
        else {
            continue;
        };

        let record = &standings[placement].record;
        profile.tournaments_played += 1;
        if placement == 0 {
            profile.tournaments_won += 1;
        }
        profile.record.merge(record);

        if profile.recent_tournaments.len() < RECENT_RESULTS {
            profile.recent_tournaments.push(TournamentResult {
                tournament_id: tournament.id.clone(),
                tournament_name: tournament.name.clone(),
                format: tournament.format,
                placement: placement + 1,
                total_players: tournament.players.len(),
                record: record.clone(),
                finished_at: tournament.updated_at,
            });
        }

        partners.tally(tournament, &player.id);
    }

    profile.win_rate = win_rate(&profile.record);
    if profile.record.matches_played > 0 {
        let average =
            f64::from(profile.record.total_points) / f64::from(profile.record.matches_played);
        profile.avg_points_per_match = (average * 10.0).round() / 10.0;
    }

    profile.best_partners = partners
        .stats
        .into_iter()
        .sorted_by(|a, b| {
            b.shared_wins
                .cmp(&a.shared_wins)
                .then(b.shared_matches.cmp(&a.shared_matches))
        })
        .take(BEST_PARTNERS)
        .collect();

    profile
}
