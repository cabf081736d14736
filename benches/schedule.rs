#[cfg(feature = "bench")]
use std::time::Duration;

#[cfg(feature = "bench")]
use criterion::{Criterion, criterion_group, criterion_main};

#[cfg(feature = "bench")]
use padel_mixer::{
    player::Player,
    schedule::{americano_rounds, next_incremental_round},
};

#[cfg(feature = "bench")]
fn players(count: usize) -> Vec<Player> {
    (1..=count)
        .map(|i| Player::new(&format!("p{i}"), &format!("Player {i}")))
        .collect()
}

#[cfg(feature = "bench")]
fn americano_schedules(c: &mut Criterion) {
    for count in [8, 16, 32] {
        let players = players(count);
        c.bench_function(&format!("americano_{count}_players"), move |b| {
            b.iter(|| americano_rounds(&players, count / 4));
        });
    }
}

#[cfg(feature = "bench")]
fn incremental_rounds(c: &mut Criterion) {
    let players = players(24);
    let mut rounds = Vec::new();
    while rounds.len() < 20 {
        match next_incremental_round(&players, &rounds, 5) {
            Ok(round) => rounds.push(round),
            Err(error) => panic!("{error}"),
        }
    }

    c.bench_function("incremental_round_24_players", move |b| {
        b.iter(|| next_incremental_round(&players, &rounds, 5));
    });
}

#[cfg(feature = "bench")]
criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = americano_schedules, incremental_rounds
}

#[cfg(feature = "bench")]
criterion_main!(benches);

#[cfg(not(feature = "bench"))]
fn main() {
    eprintln!("You must pass `--features=bench`");
}
