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

#![deny(clippy::expect_used)]
#![deny(clippy::indexing_slicing)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

mod command_line;

use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::Utc;
use clap::Parser;
use log::{debug, info};
use padel_mixer::{
    standings::{calculate, calculate_teams},
    stats::{LeaderboardEntry, PlayerProfile, leaderboard, player_profile},
    tournament::Tournament,
    utils::{self, create_data_folder, data_file, data_folder},
};

use crate::command_line::{Args, Command};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    utils::init_logger(args.debug);

    if args.man {
        return Args::generate_man_page();
    }

    let folder = args.data_dir.unwrap_or_else(data_folder);
    create_data_folder(&folder)?;
    debug!("data folder: {}", folder.display());

    let Some(command) = args.command else {
        println!("nothing to do, try --help");
        return Ok(());
    };

    let now = Utc::now();

    match command {
        Command::New(new) => {
            let tournament = Tournament::new(new.into_settings(), now)?;
            save(&folder, &tournament)?;
            println!("created {}", tournament.id);
            print_tournament(&tournament);
        }
        Command::Show { id } => print_tournament(&load(&folder, &id)?),
        Command::Score {
            id,
            match_id,
            score1,
            score2,
        } => {
            let mut tournament = load(&folder, &id)?;
            tournament.submit_score(&match_id, score1, score2, now)?;
            save(&folder, &tournament)?;

            if let Some(round) = tournament.current()
                && round.is_completed()
            {
                println!("round {} is complete", round.number);
            }
        }
        Command::Next { id } => {
            let mut tournament = load(&folder, &id)?;
            tournament.next_round(now)?;
            save(&folder, &tournament)?;

            if let Some(round) = tournament.current() {
                print!("{round}");
            }
        }
        Command::Final { id } => {
            let mut tournament = load(&folder, &id)?;
            tournament.generate_final_round(now)?;
            save(&folder, &tournament)?;

            if let Some(round) = tournament.current() {
                print!("{round}");
            }
        }
        Command::Finish { id } => {
            let mut tournament = load(&folder, &id)?;
            tournament.finish(now)?;
            save(&folder, &tournament)?;
            print_standings(&tournament);
        }
        Command::Standings { id } => print_standings(&load(&folder, &id)?),
        Command::Leaderboard { period, official } => {
            let tournaments = load_all(&folder)?;
            println!("{period} leaderboard");
            print_leaderboard(&leaderboard(&tournaments, period, official, now));
        }
        Command::Profile { user_id } => {
            print_profile(&player_profile(&load_all(&folder)?, &user_id));
        }
    }

    Ok(())
}

fn load(folder: &Path, id: &str) -> anyhow::Result<Tournament> {
    let file = data_file(folder, id);

    match fs::read_to_string(&file) {
        Ok(string) => ron::from_str(&string)
            .map_err(|err| anyhow::Error::msg(format!("RON: {}: {err}", file.display()))),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(anyhow::Error::msg(format!(
            "there is no tournament {id}"
        ))),
        Err(err) => Err(err.into()),
    }
}

fn load_all(folder: &Path) -> anyhow::Result<Vec<Tournament>> {
    let mut tournaments = Vec::new();

    for entry in fs::read_dir(folder)? {
        let path: PathBuf = entry?.path();
        if path.extension().is_some_and(|extension| extension == "ron") {
            let string = fs::read_to_string(&path)?;
            match ron::from_str(&string) {
                Ok(tournament) => tournaments.push(tournament),
                Err(err) => info!("skipping {}: {err}", path.display()),
            }
        }
    }

    Ok(tournaments)
}

fn save(folder: &Path, tournament: &Tournament) -> anyhow::Result<()> {
    let string = ron::ser::to_string_pretty(tournament, ron::ser::PrettyConfig::default())?;
    let mut file = File::create(data_file(folder, &tournament.id))?;
    file.write_all(string.as_bytes())?;

    debug!("saved {}", tournament.id);
    Ok(())
}

fn print_tournament(tournament: &Tournament) {
    println!(
        "{} ({}, {}, {} courts, {})",
        tournament.name,
        tournament.format,
        tournament.round_mode,
        tournament.courts,
        tournament.status
    );
    if tournament.format.is_adaptive() {
        println!("every round is seeded from the standings");
    }

    for round in &tournament.rounds {
        let marker = if round.number == tournament.current_round {
            "> "
        } else {
            ""
        };
        print!("{marker}{round}");
    }
}

fn print_standings(tournament: &Tournament) {
    println!(
        "{:>4} {:<20} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "#", "name", "points", "played", "won", "lost", "diff"
    );

    if tournament.format.is_team_format() {
        for (i, standing) in calculate_teams(&tournament.teams, &tournament.rounds)
            .iter()
            .enumerate()
        {
            println!("{:>4} {:<20} {}", i + 1, standing.team_name, standing.record);
        }
    } else {
        for (i, standing) in calculate(&tournament.players, &tournament.rounds)
            .iter()
            .enumerate()
        {
            println!("{:>4} {:<20} {}", i + 1, standing.player_name, standing.record);
        }
    }
}

fn print_leaderboard(entries: &[LeaderboardEntry]) {
    println!(
        "{:>4} {:<20} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>4}",
        "rank", "name", "points", "played", "won", "lost", "diff", "win", "tmts"
    );

    for entry in entries {
        println!("{entry}");
    }
}

fn print_profile(profile: &PlayerProfile) {
    println!(
        "{} tournaments, {} won, {} matches, {}% won, {} points per match",
        profile.tournaments_played,
        profile.tournaments_won,
        profile.record.matches_played,
        profile.win_rate,
        profile.avg_points_per_match
    );

    for result in &profile.recent_tournaments {
        println!(
            "  {} ({}): {} of {}, {} points",
            result.tournament_name,
            result.format,
            result.placement,
            result.total_players,
            result.record.total_points
        );
    }

    for partner in &profile.best_partners {
        println!(
            "  with {}: {} wins in {} matches",
            partner.partner_name, partner.shared_wins, partner.shared_matches
        );
    }
}
