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

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    Id,
    error::TournamentError,
    player::{Player, Team},
    round::Round,
    schedule::{
        RoundMode, build_initial_rounds, final_round, final_round_mixed, final_round_teams,
        mexicano_round, next_round_for, team_mexicano_round,
    },
    standings::{RankingStrategy, calculate, calculate_teams},
};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Format {
    #[default]
    Americano,
    MixedAmericano,
    TeamAmericano,
    Mexicano,
    TeamMexicano,
}

impl Format {
    /// Formats whose rounds are seeded from the standings.
    #[must_use]
    pub fn is_adaptive(&self) -> bool {
        matches!(self, Self::Mexicano | Self::TeamMexicano)
    }

    #[must_use]
    pub fn is_team_format(&self) -> bool {
        matches!(self, Self::TeamAmericano | Self::TeamMexicano)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Americano => write!(f, "americano"),
            Self::MixedAmericano => write!(f, "mixed_americano"),
            Self::TeamAmericano => write!(f, "team_americano"),
            Self::Mexicano => write!(f, "mexicano"),
            Self::TeamMexicano => write!(f, "team_mexicano"),
        }
    }
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        let string = string.to_lowercase().replace('-', "_");

        match string.as_str() {
            "americano" => Ok(Self::Americano),
            "mixed_americano" | "mixedamericano" => Ok(Self::MixedAmericano),
            "team_americano" | "teamamericano" => Ok(Self::TeamAmericano),
            "mexicano" => Ok(Self::Mexicano),
            "team_mexicano" | "teammexicano" => Ok(Self::TeamMexicano),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a Format!"
            ))),
        }
    }
}

/// What a score means. Pairing is the same either way.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoringSystem {
    /// Rally points, e.g. the first to 24.
    #[default]
    Points,
    /// Games won in a set.
    Sets,
}

impl fmt::Display for ScoringSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Points => write!(f, "points"),
            Self::Sets => write!(f, "sets"),
        }
    }
}

impl FromStr for ScoringSystem {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        match string.to_lowercase().as_str() {
            "points" => Ok(Self::Points),
            "sets" => Ok(Self::Sets),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a ScoringSystem!"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    #[default]
    Active,
    Finished,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Everything needed to start a tournament.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TournamentSettings {
    /// Derived from the creation time when not given.
    pub id: Option<Id>,
    pub name: String,
    pub format: Format,
    pub scoring_system: ScoringSystem,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub courts: usize,
    pub round_mode: RoundMode,
    pub ranking_strategy: RankingStrategy,
    pub is_official: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: Id,
    pub name: String,
    pub format: Format,
    pub scoring_system: ScoringSystem,
    pub players: Vec<Player>,
    #[serde(default)]
    pub teams: Vec<Team>,
    pub courts: usize,
    pub rounds: Vec<Round>,
    /// 1-based. One past the last round while that round is still to be
    /// generated.
    pub current_round: usize,
    pub round_mode: RoundMode,
    #[serde(default)]
    pub ranking_strategy: RankingStrategy,
    pub status: Status,
    #[serde(default)]
    pub is_official: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Starts a tournament with its initial rounds.
    ///
    /// # Errors
    ///
    /// If the players, teams or courts can't make up a round for the format.
    pub fn new(settings: TournamentSettings, now: DateTime<Utc>) -> Result<Self, TournamentError> {
        let TournamentSettings {
            id,
            name,
            format,
            scoring_system,
            players,
            teams,
            courts,
            round_mode,
            ranking_strategy,
            is_official,
        } = settings;

        let rounds = build_initial_rounds(format, &players, &teams, courts, round_mode)?;
        let id = id.unwrap_or_else(|| format!("t_{}", now.timestamp_millis()));

        info!(
            "{id}: new {format} tournament, {} players, {courts} courts, {} rounds",
            players.len(),
            rounds.len()
        );

        Ok(Self {
            id,
            name,
            format,
            scoring_system,
            players,
            teams,
            courts,
            rounds,
            current_round: 1,
            round_mode,
            ranking_strategy,
            status: Status::Active,
            is_official,
            created_at: now,
            updated_at: now,
        })
    }

    /// The round being played, if it was generated.
    #[must_use]
    pub fn current(&self) -> Option<&Round> {
        self.current_round
            .checked_sub(1)
            .and_then(|i| self.rounds.get(i))
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }

    /// Whether a final round was generated.
    #[must_use]
    pub fn has_final(&self) -> bool {
        self.rounds.iter().any(|round| round.is_final)
    }

    /// Records the result of a match, in any round. A result can be
    /// corrected but never cleared. Ties like 12-12 are fine.
    ///
    /// # Errors
    ///
    /// If the tournament is finished or the match doesn't exist.
    pub fn submit_score(
        &mut self,
        match_id: &str,
        score1: u32,
        score2: u32,
        now: DateTime<Utc>,
    ) -> Result<(), TournamentError> {
        if self.is_finished() {
            return Err(TournamentError::Finished);
        }

        let game = self
            .rounds
            .iter_mut()
            .flat_map(|round| round.matches.iter_mut())
            .find(|game| game.id == match_id)
            .ok_or_else(|| TournamentError::UnknownMatch(match_id.to_string()))?;

        game.set_score(score1, score2);
        self.updated_at = now;

        debug!("{}: {match_id} {score1}-{score2}", self.id);
        Ok(())
    }

    fn check_current_completed(&self) -> Result<(), TournamentError> {
        match self.current() {
            Some(round) if round.is_completed() => Ok(()),
            _ => Err(TournamentError::RoundIncomplete(self.current_round)),
        }
    }

    /// Moves on to the next round, generating it when the format needs to.
    ///
    /// # Errors
    ///
    /// If the tournament is finished, the current round isn't completed,
    /// the final was played, or the schedule is over.
    pub fn next_round(&mut self, now: DateTime<Utc>) -> Result<(), TournamentError> {
        if self.is_finished() {
            return Err(TournamentError::Finished);
        }

        if self.has_final() {
            return Err(TournamentError::FinalAlreadyPlayed);
        }

        self.check_current_completed()?;
        let number = self.current_round + 1;

        if number > self.rounds.len() {
            if let RoundMode::Fixed {
                total_rounds: Some(total_rounds),
            } = self.round_mode
                && number > total_rounds
            {
                return Err(TournamentError::NoMoreRounds);
            }

            let round = match (self.format, self.round_mode) {
                (Format::Mexicano, _) => {
                    let standings = calculate(&self.players, &self.rounds);
                    mexicano_round(
                        &self.players,
                        &standings,
                        number,
                        self.courts,
                        self.ranking_strategy,
                    )?
                }
                (Format::TeamMexicano, _) => {
                    let standings = calculate_teams(&self.teams, &self.rounds);
                    team_mexicano_round(
                        &self.teams,
                        &self.players,
                        &standings,
                        number,
                        self.courts,
                        self.ranking_strategy,
                    )?
                }
                (_, RoundMode::Unlimited) => next_round_for(
                    self.format,
                    &self.players,
                    &self.teams,
                    &self.rounds,
                    self.courts,
                )?,
                (_, RoundMode::Fixed { .. }) => return Err(TournamentError::NoMoreRounds),
            };

            self.rounds.push(round);
        }

        self.current_round = number;
        self.updated_at = now;

        info!("{}: round {number} started", self.id);
        Ok(())
    }

    /// Generates the final round from the standings and moves to it.
    ///
    /// Mixed doubles keeps one man and one woman per side and fixed teams
    /// stay together.
    ///
    /// # Errors
    ///
    /// If the tournament is finished, a final was already generated, the
    /// current round isn't completed, or the roster can't fill a court.
    pub fn generate_final_round(&mut self, now: DateTime<Utc>) -> Result<(), TournamentError> {
        if self.is_finished() {
            return Err(TournamentError::Finished);
        }

        if self.has_final() {
            return Err(TournamentError::FinalAlreadyPlayed);
        }

        self.check_current_completed()?;

        let mut round = match self.format {
            Format::MixedAmericano => final_round_mixed(
                &self.players,
                &calculate(&self.players, &self.rounds),
                self.courts,
                self.ranking_strategy,
            )?,
            Format::TeamAmericano | Format::TeamMexicano => final_round_teams(
                &self.teams,
                &self.players,
                &calculate_teams(&self.teams, &self.rounds),
                self.courts,
                self.ranking_strategy,
            )?,
            Format::Americano | Format::Mexicano => final_round(
                &self.players,
                &calculate(&self.players, &self.rounds),
                self.courts,
                self.ranking_strategy,
            )?,
        };

        let number = self.rounds.len() + 1;
        round.renumber(number);
        self.rounds.push(round);
        self.current_round = number;
        self.updated_at = now;

        info!("{}: final round {number} started", self.id);
        Ok(())
    }

    /// Closes the tournament. Nothing can change afterwards.
    ///
    /// # Errors
    ///
    /// If it is already finished.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<(), TournamentError> {
        if self.is_finished() {
            return Err(TournamentError::Finished);
        }

        self.status = Status::Finished;
        self.updated_at = now;

        info!("{}: finished after {} rounds", self.id, self.rounds.len());
        Ok(())
    }

    /// Where a player placed, 1-based, going by the player standings.
    #[must_use]
    pub fn placement(&self, player_id: &str) -> Option<usize> {
        calculate(&self.players, &self.rounds)
            .iter()
            .position(|standing| standing.player_id == player_id)
            .map(|i| i + 1)
    }
}
