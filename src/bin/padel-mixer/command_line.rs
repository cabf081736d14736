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

use std::{io::Write as _, path::PathBuf, str::FromStr};

use clap::{CommandFactory, Parser, Subcommand};
use padel_mixer::{
    COPYRIGHT, LONG_VERSION,
    player::{Gender, Player, Team},
    schedule::RoundMode,
    standings::RankingStrategy,
    stats::Period,
    tournament::{Format, ScoringSystem, TournamentSettings},
};
use rand::seq::SliceRandom;

/// Padel Mixer
///
/// Runs Americano and Mexicano doubles tournaments from the command line.
#[derive(Parser, Debug)]
#[command(long_version = LONG_VERSION, about = "Americano and Mexicano Tournaments")]
pub(crate) struct Args {
    /// Whether to log on the debug level
    #[arg(long)]
    pub debug: bool,

    /// Where to keep the tournament files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Build the manpage
    #[arg(long)]
    pub man: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Start a tournament
    New(NewTournament),

    /// Show the rounds of a tournament
    Show { id: String },

    /// Record the score of a match
    Score {
        id: String,
        match_id: String,
        score1: u32,
        score2: u32,
    },

    /// Move on to the next round
    Next { id: String },

    /// Play a final round seeded from the standings
    Final { id: String },

    /// Close a tournament
    Finish { id: String },

    /// Show the standings of a tournament
    Standings { id: String },

    /// Rank everybody over the finished tournaments
    Leaderboard {
        /// overall, monthly, weekly or daily
        #[arg(default_value = "overall", long)]
        period: Period,

        /// Only count official tournaments
        #[arg(long)]
        official: bool,
    },

    /// Show the results of a linked account
    Profile { user_id: String },
}

#[derive(clap::Args, Debug)]
pub(crate) struct NewTournament {
    /// The tournament's name
    pub name: String,

    /// A player as NAME, NAME:GENDER or NAME:GENDER@ACCOUNT
    ///
    /// In team formats players are teamed up in the order given.
    #[arg(long = "player", required = true)]
    pub players: Vec<PlayerArg>,

    /// americano, mixed-americano, team-americano, mexicano or team-mexicano
    #[arg(default_value = "americano", long)]
    pub format: Format,

    /// How many courts are available
    #[arg(default_value_t = 1, long)]
    pub courts: usize,

    /// fixed, fixed:ROUNDS or unlimited
    #[arg(default_value = "fixed", long)]
    pub round_mode: RoundMode,

    /// points or wins
    #[arg(default_value = "points", long)]
    pub ranking: RankingStrategy,

    /// points or sets
    #[arg(default_value = "points", long)]
    pub scoring: ScoringSystem,

    /// Count the tournament on the official leaderboard
    #[arg(long)]
    pub official: bool,

    /// Shuffle the players before the first round
    #[arg(long)]
    pub shuffle: bool,
}

impl NewTournament {
    /// Players get the ids p1, p2, ... in registration order. In team
    /// formats they are teamed up two by two in the same order.
    pub(crate) fn into_settings(self) -> TournamentSettings {
        let mut players = self.players;
        if self.shuffle {
            players.shuffle(&mut rand::rng());
        }

        let players: Vec<Player> = players
            .into_iter()
            .enumerate()
            .map(|(i, player)| player.into_player(&format!("p{}", i + 1)))
            .collect();

        let teams = if self.format.is_team_format() {
            team_up(&players)
        } else {
            Vec::new()
        };

        TournamentSettings {
            id: None,
            name: self.name,
            format: self.format,
            scoring_system: self.scoring,
            players,
            teams,
            courts: self.courts,
            round_mode: self.round_mode,
            ranking_strategy: self.ranking,
            is_official: self.official,
        }
    }
}

fn team_up(players: &[Player]) -> Vec<Team> {
    players
        .chunks_exact(2)
        .enumerate()
        .filter_map(|(i, pair)| match pair {
            [first, second] => Some(Team::new(
                &format!("t{}", i + 1),
                &format!("{} & {}", first.name, second.name),
                &first.id,
                &second.id,
            )),
            _ => None,
        })
        .collect()
}

/// A player as given on the command line.
#[derive(Clone, Debug)]
pub(crate) struct PlayerArg {
    pub name: String,
    pub gender: Option<Gender>,
    pub linked_user_id: Option<String>,
}

impl PlayerArg {
    pub(crate) fn into_player(self, id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: self.name,
            linked_user_id: self.linked_user_id,
            gender: self.gender,
        }
    }
}

impl FromStr for PlayerArg {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        let (rest, linked_user_id) = match string.split_once('@') {
            Some((rest, user)) => (rest, Some(user.to_string())),
            None => (string, None),
        };

        let (name, gender) = match rest.split_once(':') {
            Some((name, gender)) => (name, Some(Gender::from_str(gender)?)),
            None => (rest, None),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a player!"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            gender,
            linked_user_id,
        })
    }
}

impl Args {
    pub(crate) fn generate_man_page() -> anyhow::Result<()> {
        let mut buffer: Vec<u8> = Vec::default();
        let cmd = Self::command().name("padel-mixer").long_version(None);
        let man = clap_mangen::Man::new(cmd).date("2026-10-19");

        man.render(&mut buffer)?;
        write!(buffer, "{COPYRIGHT}")?;

        std::fs::write("padel-mixer.1", buffer)?;
        Ok(())
    }
}
