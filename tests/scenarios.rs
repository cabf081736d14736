use anyhow::Context;
use chrono::Utc;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use padel_mixer::{
    Id,
    error::ValidationError,
    player::{Gender, Player, Team},
    round::{Match, Round, Side},
    schedule::{
        RoundMode, americano_rounds, build_initial_rounds, final_round, final_round_mixed,
        final_round_teams, mexicano_round, mixed_americano_rounds, next_incremental_round,
        next_mixed_incremental_round, next_team_incremental_round, team_mexicano_round,
    },
    standings::{PlayerStanding, RankingStrategy, Record, TeamStanding, calculate, standings},
    tournament::{Format, Tournament, TournamentSettings},
};

fn players(count: usize) -> Vec<Player> {
    (1..=count)
        .map(|i| Player::new(&format!("p{i}"), &format!("Player {i}")))
        .collect()
}

/// Men at odd positions, women at even ones.
fn mixed_players(count: usize) -> Vec<Player> {
    players(count)
        .into_iter()
        .enumerate()
        .map(|(i, player)| {
            player.with_gender(if i % 2 == 0 { Gender::Male } else { Gender::Female })
        })
        .collect()
}

/// Team `ti` is players `p(2i - 1)` and `p(2i)`.
fn teams(count: usize) -> (Vec<Team>, Vec<Player>) {
    let teams = (1..=count)
        .map(|i| {
            let first = format!("p{}", 2 * i - 1);
            let second = format!("p{}", 2 * i);
            Team::new(&format!("t{i}"), &format!("Team {i}"), &first, &second)
        })
        .collect();

    (teams, players(count * 2))
}

fn team_standing(team: &Team, total_points: u32) -> TeamStanding {
    TeamStanding {
        team_id: team.id.clone(),
        team_name: team.name.clone(),
        player_ids: team.player_ids.clone(),
        record: Record {
            total_points,
            matches_played: 3,
            ..Record::default()
        },
    }
}

fn named(names: &[&str]) -> Vec<Player> {
    names.iter().map(|name| Player::new(name, name)).collect()
}

fn standing(id: &str, total_points: u32, matches_won: u32) -> PlayerStanding {
    PlayerStanding {
        player_id: id.to_string(),
        player_name: id.to_string(),
        record: Record {
            total_points,
            matches_played: 3,
            matches_won,
            matches_lost: 3 - matches_won,
            point_difference: 0,
        },
    }
}

fn side(ids: &[&str]) -> Side {
    Side {
        player_ids: ids.iter().map(ToString::to_string).collect(),
        team_id: None,
    }
}

fn sorted(side: &Side) -> Vec<&str> {
    side.player_ids.iter().map(String::as_str).sorted().collect()
}

fn partner_counts(rounds: &[Round]) -> FxHashMap<(String, String), u32> {
    let mut counts = FxHashMap::default();

    for game in rounds.iter().flat_map(|round| &round.matches) {
        for side in [&game.team1, &game.team2] {
            for (a, b) in side.player_ids.iter().sorted().tuple_combinations() {
                *counts.entry((a.clone(), b.clone())).or_insert(0) += 1;
            }
        }
    }

    counts
}

fn opponent_counts(rounds: &[Round]) -> FxHashMap<(String, String), u32> {
    let mut counts = FxHashMap::default();

    for game in rounds.iter().flat_map(|round| &round.matches) {
        for (a, b) in game.team1.player_ids.iter().cartesian_product(&game.team2.player_ids) {
            let pair = if a < b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
            *counts.entry(pair).or_insert(0) += 1;
        }
    }

    counts
}

/// The fewest and the most times any of `count` players' pairs shows up.
fn spread(counts: &FxHashMap<(String, String), u32>, count: usize) -> (u32, u32) {
    let max = counts.values().copied().max().unwrap_or_default();
    let min = if counts.len() < count * (count - 1) / 2 {
        0
    } else {
        counts.values().copied().min().unwrap_or_default()
    };

    (min, max)
}

fn meetings(rounds: &[Round]) -> Vec<(Id, Id)> {
    rounds
        .iter()
        .flat_map(|round| &round.matches)
        .filter_map(|game| {
            let first = game.team1.team_id.clone()?;
            let second = game.team2.team_id.clone()?;
            Some(if first < second { (first, second) } else { (second, first) })
        })
        .collect()
}

#[test]
fn eight_players_on_two_courts() -> anyhow::Result<()> {
    let rounds = americano_rounds(&players(8), 2)?;

    assert_eq!(rounds.len(), 7);
    for (i, round) in rounds.iter().enumerate() {
        assert_eq!(round.number, i + 1);
        assert_eq!(round.matches.len(), 2);
        assert!(round.byes.is_empty());
        assert_eq!(
            round.matches.iter().map(|game| game.court).collect_vec(),
            vec![Some(1), Some(2)]
        );
    }

    let counts = partner_counts(&rounds);
    assert_eq!(counts.len(), 28);
    assert!(counts.values().all(|&count| count == 1));

    let counts = opponent_counts(&rounds);
    assert_eq!(counts.len(), 28);
    assert!(counts.values().all(|&count| count == 2));

    Ok(())
}

#[test]
fn five_players_are_rejected() {
    assert_eq!(
        americano_rounds(&players(5), 1),
        Err(ValidationError::PlayerCountNotMultipleOfFour(5))
    );

    let result = Tournament::new(
        TournamentSettings {
            players: players(5),
            courts: 1,
            ..TournamentSettings::default()
        },
        Utc::now(),
    );
    assert!(result.is_err());
}

#[test]
fn mexicano_seeds_first_and_fourth_against_the_middle() -> anyhow::Result<()> {
    let players = named(&["P3", "P1", "P4", "P2"]);
    let standings = vec![
        standing("P1", 9, 3),
        standing("P2", 6, 2),
        standing("P3", 6, 1),
        standing("P4", 3, 0),
    ];

    let round = mexicano_round(&players, &standings, 3, 1, RankingStrategy::Points)?;
    let game = round.matches.first().context("no match")?;

    assert_eq!(round.number, 3);
    assert_eq!(game.id, "r3c1");
    assert_eq!(sorted(&game.team1), vec!["P1", "P4"]);
    assert_eq!(sorted(&game.team2), vec!["P2", "P3"]);

    Ok(())
}

#[test]
fn mexicano_remainder_sits_out() -> anyhow::Result<()> {
    let players = players(6);
    let standings = (1..=6)
        .map(|i| Ok(standing(&format!("p{i}"), 30 - u32::try_from(i)?, 1)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let round = mexicano_round(&players, &standings, 2, 2, RankingStrategy::Points)?;
    assert_eq!(round.matches.len(), 1);
    assert_eq!(round.byes, vec!["p5", "p6"]);

    Ok(())
}

#[test]
fn repeated_partners_are_avoided() -> anyhow::Result<()> {
    let players = named(&["A", "B", "C", "D"]);
    let prior = [
        (["A", "B"], ["C", "D"]),
        (["A", "C"], ["B", "D"]),
        (["A", "D"], ["B", "C"]),
        (["A", "B"], ["C", "D"]),
    ]
    .iter()
    .enumerate()
    .map(|(i, (team1, team2))| Round {
        number: i + 1,
        matches: vec![Match::new(i + 1, 1, side(team1), side(team2))],
        ..Round::default()
    })
    .collect_vec();

    let round = next_incremental_round(&players, &prior, 1)?;
    let game = round.matches.first().context("no match")?;

    assert_eq!(round.number, 5);
    for team in [&game.team1, &game.team2] {
        assert_ne!(sorted(team), vec!["A", "B"]);
        assert_ne!(sorted(team), vec!["C", "D"]);
    }

    Ok(())
}

#[test]
fn final_round_puts_the_leaders_on_court_one() -> anyhow::Result<()> {
    let players = named(&["D", "C", "B", "A", "E", "F", "G", "H"]);
    let standings = vec![
        standing("A", 40, 3),
        standing("B", 30, 2),
        standing("C", 20, 2),
        standing("D", 10, 1),
    ];

    let round = final_round(&players, &standings, 2, RankingStrategy::Points)?;
    assert!(round.is_final);

    let game = round.matches.first().context("no match")?;
    assert_eq!(game.court, Some(1));
    assert_eq!(sorted(&game.team1), vec!["A", "D"]);
    assert_eq!(sorted(&game.team2), vec!["B", "C"]);

    let second = round.matches.get(1).context("no second court")?;
    assert_eq!(sorted(&second.team1), vec!["E", "H"]);
    assert_eq!(sorted(&second.team2), vec!["F", "G"]);

    Ok(())
}

#[test]
fn every_pair_partners_equally_often() -> anyhow::Result<()> {
    for count in [4, 8, 12, 16] {
        for courts in 1..=count / 4 {
            let rounds = americano_rounds(&players(count), courts)?;
            let counts = partner_counts(&rounds);

            assert_eq!(counts.len(), count * (count - 1) / 2);
            let (min, max) = counts.values().minmax().into_option().context("no pairs")?;
            assert!(max - min <= 1);

            for round in &rounds {
                assert!(round.matches.len() <= courts);
                let playing = round
                    .matches
                    .iter()
                    .flat_map(|game| game.team1.player_ids.iter().chain(&game.team2.player_ids))
                    .collect_vec();
                assert!(playing.iter().all_unique());
                assert_eq!(playing.len() + round.byes.len(), count);
            }
        }
    }

    Ok(())
}

#[test]
fn mixed_sides_have_a_man_and_a_woman() -> anyhow::Result<()> {
    let players = mixed_players(8);
    let gender = |id: &String| {
        players
            .iter()
            .find(|player| &player.id == id)
            .and_then(|player| player.gender)
    };

    let rounds = mixed_americano_rounds(&players, 2)?;
    assert_eq!(rounds.len(), 4);

    for game in rounds.iter().flat_map(|round| &round.matches) {
        for side in [&game.team1, &game.team2] {
            let genders = side.player_ids.iter().map(gender).collect_vec();
            assert!(genders.contains(&Some(Gender::Male)));
            assert!(genders.contains(&Some(Gender::Female)));
        }
    }

    assert_eq!(partner_counts(&rounds).len(), 16);

    Ok(())
}

#[test]
fn played_is_won_plus_lost() -> anyhow::Result<()> {
    let mut tournament = Tournament::new(
        TournamentSettings {
            format: Format::Mexicano,
            players: players(10),
            courts: 2,
            ..TournamentSettings::default()
        },
        Utc::now(),
    )?;

    for round in 1..=4 {
        let ids = tournament
            .current()
            .context("no current round")?
            .matches
            .iter()
            .map(|game| game.id.clone())
            .collect_vec();

        for (i, id) in ids.iter().enumerate() {
            let score = u32::try_from(i + round)?;
            tournament.submit_score(id, 21, score, Utc::now())?;
        }

        for standing in standings(&tournament) {
            let record = standing.record;
            assert_eq!(record.matches_played, record.matches_won + record.matches_lost);
        }

        tournament.next_round(Utc::now())?;
    }

    let before = standings(&tournament);
    let pending = tournament.current().context("no current round")?;
    assert!(!pending.is_completed());
    assert_eq!(calculate(&tournament.players, &tournament.rounds[..4]), before);

    Ok(())
}

#[test]
fn standings_survive_a_round_trip() -> anyhow::Result<()> {
    let mut tournament = Tournament::new(
        TournamentSettings {
            format: Format::Americano,
            players: players(8),
            courts: 2,
            round_mode: RoundMode::Fixed {
                total_rounds: Some(3),
            },
            ..TournamentSettings::default()
        },
        Utc::now(),
    )?;

    tournament.submit_score("r1c1", 21, 19, Utc::now())?;
    tournament.submit_score("r1c2", 8, 21, Utc::now())?;
    tournament.submit_score("r2c1", 21, 11, Utc::now())?;

    let expected = standings(&tournament);
    assert_eq!(standings(&tournament), expected);

    let ron_string = ron::ser::to_string(&tournament)?;
    let from_ron: Tournament = ron::from_str(&ron_string)?;
    assert_eq!(from_ron, tournament);
    assert_eq!(standings(&from_ron), expected);

    let bytes = postcard::to_allocvec(&tournament)?;
    let from_postcard: Tournament = postcard::from_bytes(&bytes)?;
    assert_eq!(standings(&from_postcard), expected);

    Ok(())
}

#[test]
fn initial_rounds_by_round_mode() -> anyhow::Result<()> {
    let rounds = build_initial_rounds(Format::Americano, &players(8), &[], 2, RoundMode::Unlimited)?;
    assert_eq!(rounds.len(), 1);

    let rounds = build_initial_rounds(Format::Mexicano, &players(8), &[], 2, RoundMode::default())?;
    assert_eq!(rounds.len(), 1);

    let rounds = build_initial_rounds(
        Format::Americano,
        &players(8),
        &[],
        2,
        RoundMode::Fixed {
            total_rounds: Some(0),
        },
    )?;
    assert_eq!(rounds.len(), 7);

    Ok(())
}

#[test]
fn opponents_are_spread_like_partners() -> anyhow::Result<()> {
    for courts in 1..=2 {
        let rounds = americano_rounds(&players(8), courts)?;
        assert_eq!(spread(&partner_counts(&rounds), 8), (1, 1));
        assert_eq!(spread(&opponent_counts(&rounds), 8), (2, 2));
    }

    for count in [12, 16] {
        for courts in 1..=count / 4 {
            let rounds = americano_rounds(&players(count), courts)?;
            assert_eq!(spread(&partner_counts(&rounds), count), (1, 1));

            let (_, max) = spread(&opponent_counts(&rounds), count);
            assert!(max <= 3, "{count} players on {courts} courts face someone {max} times");
        }
    }

    Ok(())
}

#[test]
fn every_round_but_the_last_fills_every_court() -> anyhow::Result<()> {
    for (count, courts) in [(8, 1), (12, 2), (12, 3), (16, 2), (16, 3)] {
        let rounds = americano_rounds(&players(count), courts)?;
        let matches = (count - 1) * count / 4;
        assert_eq!(rounds.len(), matches.div_ceil(courts));

        let (last, full) = rounds.split_last().context("no rounds")?;
        for round in full {
            assert_eq!(round.matches.len(), courts, "round {} of {count} players", round.number);
            assert_eq!(round.byes.len(), count - courts * 4);
        }
        assert!(!last.matches.is_empty());
    }

    Ok(())
}

#[test]
fn unlimited_rounds_mix_everybody() -> anyhow::Result<()> {
    let players = players(8);
    let mut rounds = Vec::new();

    for _ in 0..14 {
        let round = next_incremental_round(&players, &rounds, 1)?;
        rounds.push(round);
    }

    let (min, max) = spread(&partner_counts(&rounds), 8);
    assert!(max - min <= 1);
    let (min, max) = spread(&opponent_counts(&rounds), 8);
    assert!(max - min <= 1);

    // A hand-made start makes the rest greedy.
    let mut rounds = vec![
        Round {
            number: 1,
            matches: vec![Match::new(1, 1, side(&["p1", "p2"]), side(&["p3", "p4"]))],
            ..Round::default()
        },
        Round {
            number: 2,
            matches: vec![Match::new(2, 1, side(&["p5", "p6"]), side(&["p7", "p8"]))],
            ..Round::default()
        },
    ];
    let round = next_incremental_round(&players, &rounds, 1)?;
    let game = round.matches.first().context("no match")?;
    let playing = game.team1.player_ids.iter().chain(&game.team2.player_ids).collect_vec();

    assert_eq!(round.number, 3);
    assert!(playing.iter().any(|id| ["p1", "p2", "p3", "p4"].contains(&id.as_str())));
    assert!(playing.iter().any(|id| ["p5", "p6", "p7", "p8"].contains(&id.as_str())));

    rounds.push(round);
    let counts = partner_counts(&rounds);
    assert!(counts.values().all(|&count| count == 1));

    Ok(())
}

#[test]
fn teams_meet_every_other_team() -> anyhow::Result<()> {
    let (teams, players) = teams(4);
    let mut rounds = Vec::new();

    for _ in 0..6 {
        let round = next_team_incremental_round(&teams, &players, &rounds, 1)?;
        rounds.push(round);
    }
    assert_eq!(meetings(&rounds).iter().unique().count(), 6);

    let mut rounds = Vec::new();
    for _ in 0..3 {
        let round = next_team_incremental_round(&teams, &players, &rounds, 2)?;
        rounds.push(round);
    }
    assert_eq!(meetings(&rounds).iter().unique().count(), 6);

    // After a hand-made first round the teams that haven't met go next.
    let team_side = |team: &Team| Side {
        player_ids: team.player_ids.to_vec(),
        team_id: Some(team.id.clone()),
    };
    let mut rounds = vec![Round {
        number: 1,
        matches: vec![Match::new(1, 1, team_side(&teams[0]), team_side(&teams[1]))],
        ..Round::default()
    }];

    for _ in 0..5 {
        let round = next_team_incremental_round(&teams, &players, &rounds, 1)?;
        rounds.push(round);
    }
    assert_eq!(meetings(&rounds).iter().unique().count(), 6);

    Ok(())
}

#[test]
fn unlimited_mixed_rounds_keep_sides_mixed() -> anyhow::Result<()> {
    let players = mixed_players(6);
    let gender = |id: &String| {
        players
            .iter()
            .find(|player| &player.id == id)
            .and_then(|player| player.gender)
    };

    let mut rounds = Vec::new();
    for _ in 0..6 {
        let round = next_mixed_incremental_round(&players, &rounds, 2)?;
        assert_eq!(round.matches.len(), 1);
        assert_eq!(round.byes.len(), 2);
        rounds.push(round);
    }

    for game in rounds.iter().flat_map(|round| &round.matches) {
        for side in [&game.team1, &game.team2] {
            let genders = side.player_ids.iter().map(gender).collect_vec();
            assert_eq!(genders.len(), 2);
            assert!(genders.contains(&Some(Gender::Male)));
            assert!(genders.contains(&Some(Gender::Female)));
        }
    }

    for player in &players {
        let played = rounds
            .iter()
            .filter(|round| !round.byes.contains(&player.id))
            .count();
        assert_eq!(played, 4);
    }

    let players = mixed_players(8);
    let mut rounds = Vec::new();
    for _ in 0..4 {
        let round = next_mixed_incremental_round(&players, &rounds, 2)?;
        rounds.push(round);
    }
    assert_eq!(rounds, mixed_americano_rounds(&players, 2)?);

    Ok(())
}

#[test]
fn team_mexicano_plays_neighbours_in_the_ranking() -> anyhow::Result<()> {
    let (teams, players) = teams(4);
    let standings = vec![
        team_standing(&teams[2], 30),
        team_standing(&teams[0], 20),
        team_standing(&teams[3], 10),
        team_standing(&teams[1], 5),
    ];

    let round = team_mexicano_round(&teams, &players, &standings, 4, 2, RankingStrategy::Points)?;
    assert_eq!(round.number, 4);
    assert!(round.byes.is_empty());

    let pairs = round
        .matches
        .iter()
        .map(|game| (game.team1.team_id.as_deref(), game.team2.team_id.as_deref()))
        .collect_vec();
    assert_eq!(pairs, vec![(Some("t3"), Some("t1")), (Some("t4"), Some("t2"))]);

    let game = round.matches.first().context("no match")?;
    assert_eq!(sorted(&game.team1), vec!["p5", "p6"]);
    assert_eq!(sorted(&game.team2), vec!["p1", "p2"]);

    let last = final_round_teams(&teams, &players, &standings, 1, RankingStrategy::Points)?;
    assert!(last.is_final);
    assert_eq!(last.number, 1);
    assert_eq!(last.matches.len(), 1);
    let game = last.matches.first().context("no final match")?;
    assert_eq!(game.team1.team_id.as_deref(), Some("t3"));
    assert_eq!(game.team2.team_id.as_deref(), Some("t1"));
    assert_eq!(last.byes.iter().sorted().collect_vec(), vec!["p3", "p4", "p7", "p8"]);

    Ok(())
}

#[test]
fn mixed_final_crosses_the_leaders() -> anyhow::Result<()> {
    let players = mixed_players(4);
    let standings = vec![
        standing("p3", 30, 3),
        standing("p4", 25, 2),
        standing("p1", 20, 2),
        standing("p2", 10, 1),
    ];

    let round = final_round_mixed(&players, &standings, 1, RankingStrategy::Points)?;
    assert!(round.is_final);

    let game = round.matches.first().context("no match")?;
    assert_eq!(game.team1.player_ids, vec!["p3", "p2"]);
    assert_eq!(game.team2.player_ids, vec!["p1", "p4"]);

    Ok(())
}
