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

//! The round-robin core shared by every schedule.
//!
//! Players are handled by roster position. A format only decides who may
//! partner whom through [`Pairing`]; counting past pairings, grouping pairs
//! into matches and laying matches out on courts is the same for all of them.

use std::{cmp::Reverse, collections::VecDeque};

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    player::{Player, Team},
    round::{Match, Round, Side},
};

/// Two roster positions on one side of the net.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Duo {
    pub(crate) players: [usize; 2],
    /// Position in the team list when the duo is a fixed team.
    pub(crate) team: Option<usize>,
}

impl Duo {
    pub(crate) fn new(a: usize, b: usize, team: Option<usize>) -> Self {
        Self {
            players: [a, b],
            team,
        }
    }
}

/// A match before it has a round number and a court.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Draft {
    pub(crate) sides: [Duo; 2],
}

impl Draft {
    pub(crate) fn new(side1: Duo, side2: Duo) -> Self {
        Self {
            sides: [side1, side2],
        }
    }

    pub(crate) fn players(&self) -> impl Iterator<Item = usize> + '_ {
        self.sides.iter().flat_map(|duo| duo.players)
    }

    fn cross(&self) -> [(usize, usize); 4] {
        let [a, b] = self.sides[0].players;
        let [c, d] = self.sides[1].players;
        [(a, c), (a, d), (b, c), (b, d)]
    }
}

/// Who may partner whom.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Pairing<'a> {
    Open,
    /// One man and one woman per side.
    Mixed(&'a [Player]),
    /// Only the given roster positions play together.
    Fixed(&'a [(usize, usize)]),
}

impl Pairing<'_> {
    pub(crate) fn allows(&self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }

        match self {
            Self::Open => true,
            Self::Mixed(players) => matches!(
                (players[a].gender, players[b].gender),
                (Some(first), Some(second)) if first != second
            ),
            Self::Fixed(_) => self.team(a, b).is_some(),
        }
    }

    pub(crate) fn team(&self, a: usize, b: usize) -> Option<usize> {
        match self {
            Self::Fixed(members) => members
                .iter()
                .position(|&(x, y)| (x, y) == (a, b) || (x, y) == (b, a)),
            Self::Open | Self::Mixed(_) => None,
        }
    }
}

fn key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// How often every pair of players was partnered or opposed.
#[derive(Clone, Debug, Default)]
pub(crate) struct PairCounts {
    partners: FxHashMap<(usize, usize), u32>,
    opponents: FxHashMap<(usize, usize), u32>,
    played: Vec<u32>,
}

impl PairCounts {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            played: vec![0; len],
            ..Self::default()
        }
    }

    /// Counts every scheduled match, played or not. Sides with players who
    /// aren't on the roster only count the players who are.
    pub(crate) fn from_rounds(players: &[Player], rounds: &[Round]) -> Self {
        let mut counts = Self::new(players.len());
        let index: FxHashMap<&str, usize> = players
            .iter()
            .enumerate()
            .map(|(i, player)| (player.id.as_str(), i))
            .collect();

        let positions = |side: &Side| -> Vec<usize> {
            side.player_ids
                .iter()
                .filter_map(|id| index.get(id.as_str()).copied())
                .collect()
        };

        for game in rounds.iter().flat_map(|round| &round.matches) {
            counts.record_sides(&positions(&game.team1), &positions(&game.team2));
        }

        counts
    }

    fn record_sides(&mut self, side1: &[usize], side2: &[usize]) {
        for side in [side1, side2] {
            for (i, &a) in side.iter().enumerate() {
                self.played[a] += 1;
                for &b in &side[i + 1..] {
                    *self.partners.entry(key(a, b)).or_insert(0) += 1;
                }
            }
        }

        for &a in side1 {
            for &b in side2 {
                *self.opponents.entry(key(a, b)).or_insert(0) += 1;
            }
        }
    }

    pub(crate) fn record(&mut self, draft: &Draft) {
        self.record_sides(&draft.sides[0].players, &draft.sides[1].players);
    }

    pub(crate) fn partners(&self, a: usize, b: usize) -> u32 {
        self.partners.get(&key(a, b)).copied().unwrap_or_default()
    }

    pub(crate) fn opponents(&self, a: usize, b: usize) -> u32 {
        self.opponents.get(&key(a, b)).copied().unwrap_or_default()
    }

    pub(crate) fn played(&self, a: usize) -> u32 {
        self.played.get(a).copied().unwrap_or_default()
    }
}

/// The highest count first, then the sum of squared counts.
fn cost(counts: impl Iterator<Item = u32>) -> (u32, u32) {
    counts.fold((0, 0), |(max, sum), count| {
        (max.max(count), sum + count * count)
    })
}

fn partner_cost(duos: &[Duo], counts: &PairCounts) -> (u32, u32) {
    cost(duos.iter().map(|duo| {
        let [a, b] = duo.players;
        counts.partners(a, b)
    }))
}

fn opponent_cost(drafts: &[Draft], counts: &PairCounts) -> (u32, u32) {
    cost(
        drafts
            .iter()
            .flat_map(Draft::cross)
            .map(|(a, b)| counts.opponents(a, b)),
    )
}

/// Pairs up `active` so that repeated partnerships are as rare as possible.
///
/// `active` has to be in priority order, the first player picks first. On
/// failure the player left without a partner is returned.
pub(crate) fn match_partners(
    active: &[usize],
    pairing: Pairing<'_>,
    counts: &PairCounts,
) -> Result<Vec<Duo>, usize> {
    let mut remaining = active.to_vec();
    let mut duos = Vec::with_capacity(active.len() / 2);

    while !remaining.is_empty() {
        let a = remaining.remove(0);
        let best = remaining
            .iter()
            .enumerate()
            .filter(|&(_, &b)| pairing.allows(a, b))
            .min_by_key(|&(_, &b)| (counts.partners(a, b), counts.opponents(a, b)))
            .map(|(i, _)| i);

        let Some(i) = best else {
            return Err(a);
        };

        let b = remaining.remove(i);
        duos.push(Duo::new(a, b, pairing.team(a, b)));
    }

    improve_partners(&mut duos, pairing, counts);
    Ok(duos)
}

/// Swaps partners between two duos while that lowers the partner cost.
fn improve_partners(duos: &mut [Duo], pairing: Pairing<'_>, counts: &PairCounts) {
    let mut improved = true;

    while improved {
        improved = false;

        for i in 0..duos.len() {
            for j in i + 1..duos.len() {
                let [first, second] = duos[i].players;
                let [third, fourth] = duos[j].players;
                let current = partner_cost(duos, counts);

                for [one, other] in [
                    [(first, third), (second, fourth)],
                    [(first, fourth), (second, third)],
                ] {
                    if !pairing.allows(one.0, one.1) || !pairing.allows(other.0, other.1) {
                        continue;
                    }

                    let (old_i, old_j) = (duos[i], duos[j]);
                    duos[i] = Duo::new(one.0, one.1, pairing.team(one.0, one.1));
                    duos[j] = Duo::new(other.0, other.1, pairing.team(other.0, other.1));

                    if partner_cost(duos, counts) < current {
                        improved = true;
                        break;
                    }

                    duos[i] = old_i;
                    duos[j] = old_j;
                }
            }
        }
    }
}

/// Puts duos against each other so that repeated opponents are as rare as
/// possible. An odd duo out is returned separately.
pub(crate) fn group_pairs(duos: &[Duo], counts: &PairCounts) -> (Vec<Draft>, Option<Duo>) {
    let mut remaining = duos.to_vec();
    let mut drafts = Vec::with_capacity(duos.len() / 2);

    while remaining.len() >= 2 {
        let first = remaining.remove(0);
        let best = (0..remaining.len())
            .min_by_key(|&i| opponent_cost(&[Draft::new(first, remaining[i])], counts));

        let Some(i) = best else {
            break;
        };

        let second = remaining.remove(i);
        drafts.push(Draft::new(first, second));
    }

    improve_opponents(&mut drafts, counts);
    (drafts, remaining.pop())
}

/// Swaps sides between two matches while that lowers the opponent cost.
fn improve_opponents(drafts: &mut [Draft], counts: &PairCounts) {
    let mut improved = true;

    while improved {
        improved = false;

        for i in 0..drafts.len() {
            for j in i + 1..drafts.len() {
                let [home, away] = drafts[i].sides;
                let [left, right] = drafts[j].sides;
                let current = opponent_cost(drafts, counts);

                for [first, second] in [
                    [Draft::new(home, left), Draft::new(away, right)],
                    [Draft::new(home, right), Draft::new(left, away)],
                ] {
                    let (old_i, old_j) = (drafts[i], drafts[j]);
                    drafts[i] = first;
                    drafts[j] = second;

                    if opponent_cost(drafts, counts) < current {
                        improved = true;
                        break;
                    }

                    drafts[i] = old_i;
                    drafts[j] = old_j;
                }
            }
        }
    }
}

/// Every pair out of `len` entries, split into `len - 1` rounds (`len` when
/// odd) where nobody appears twice. The circle method: the first entry stays
/// put and the rest rotate around it.
pub(crate) fn circle(len: usize) -> Vec<Vec<(usize, usize)>> {
    let slots = len + len % 2;
    let mut ring: Vec<usize> = (1..slots).collect();
    let mut rounds = Vec::with_capacity(slots.saturating_sub(1));

    for _ in 1..slots {
        let mut seats = Vec::with_capacity(slots);
        seats.push(0);
        seats.extend_from_slice(&ring);

        let pairs = (0..slots / 2)
            .map(|i| (seats[i], seats[slots - 1 - i]))
            .filter(|&(a, b)| a < len && b < len)
            .collect();

        rounds.push(pairs);
        ring.rotate_right(1);
    }

    rounds
}

/// Search steps before the whist search gives up.
const WHIST_BUDGET: usize = 500_000;

/// A whist tournament for `len` players: `len - 1` rounds of `len / 4`
/// matches in which every pair partners exactly once and faces each other
/// exactly twice.
///
/// Players `0..len - 1` count modulo `len - 1` and the last one stays put.
/// Only the first round is searched for, round `r` adds `r` to everybody
/// else. `None` when `len` isn't a multiple of 4 or the search runs out of
/// steps.
pub(crate) fn whist(len: usize) -> Option<Vec<Vec<Draft>>> {
    if len < 4 || len % 4 != 0 {
        return None;
    }

    let mut search = Whist::new(len);
    if !search.extend() {
        return None;
    }

    let modulus = len - 1;
    let shift = |duo: &Duo, by: usize| {
        let [a, b] = duo.players.map(|player| {
            if player == modulus {
                player
            } else {
                (player + by) % modulus
            }
        });
        Duo::new(a, b, None)
    };

    Some(
        (0..modulus)
            .map(|by| {
                search
                    .tables
                    .iter()
                    .map(|table| {
                        let [first, second] = table.sides;
                        Draft::new(shift(&first, by), shift(&second, by))
                    })
                    .collect()
            })
            .collect(),
    )
}

/// Depth first search for the first round of a whist tournament.
///
/// Every partnership of the first round has to span a different distance
/// around the circle and every distance has to separate opponents exactly
/// twice. Shifting the round then hands out every pair once per distance.
struct Whist {
    modulus: usize,
    used: Vec<bool>,
    /// Distances already spanned by a partnership.
    partners: Vec<bool>,
    /// How often each distance separates opponents.
    opponents: Vec<u8>,
    /// A duo still waiting for opponents.
    open: Option<Duo>,
    tables: Vec<Draft>,
    steps: usize,
}

impl Whist {
    fn new(len: usize) -> Self {
        let modulus = len - 1;
        let mut used = vec![false; len];
        // Any first round can be shifted until 0 partners the fixed player.
        used[0] = true;
        used[modulus] = true;

        Self {
            modulus,
            used,
            partners: vec![false; modulus / 2 + 1],
            opponents: vec![0; modulus / 2 + 1],
            open: Some(Duo::new(modulus, 0, None)),
            tables: Vec::with_capacity(len / 4),
            steps: 0,
        }
    }

    /// The distance between two players around the circle, `None` when one
    /// of them is the fixed player.
    fn distance(&self, a: usize, b: usize) -> Option<usize> {
        if a == self.modulus || b == self.modulus {
            return None;
        }

        let distance = (a + self.modulus - b) % self.modulus;
        Some(distance.min(self.modulus - distance))
    }

    fn may_partner(&self, a: usize, b: usize) -> bool {
        !self.used[a]
            && !self.used[b]
            && self
                .distance(a, b)
                .is_none_or(|distance| !self.partners[distance])
    }

    fn take(&mut self, a: usize, b: usize, taken: bool) {
        self.used[a] = taken;
        self.used[b] = taken;
        if let Some(distance) = self.distance(a, b) {
            self.partners[distance] = taken;
        }
    }

    fn extend(&mut self) -> bool {
        self.steps += 1;
        if self.steps > WHIST_BUDGET {
            return false;
        }

        match self.open {
            Some(first) => self.close(first),
            None => match self.used.iter().position(|&used| !used) {
                Some(a) => self.open_with(a),
                None => true,
            },
        }
    }

    fn open_with(&mut self, a: usize) -> bool {
        for b in a + 1..self.used.len() {
            if !self.may_partner(a, b) {
                continue;
            }

            self.take(a, b, true);
            self.open = Some(Duo::new(a, b, None));
            if self.extend() {
                return true;
            }

            self.open = None;
            self.take(a, b, false);
            if self.steps > WHIST_BUDGET {
                return false;
            }
        }

        false
    }

    fn close(&mut self, first: Duo) -> bool {
        let len = self.used.len();

        for a in 0..len {
            for b in a + 1..len {
                if !self.may_partner(a, b) {
                    continue;
                }

                let table = Draft::new(first, Duo::new(a, b, None));
                let distances: Vec<usize> = table
                    .cross()
                    .iter()
                    .filter_map(|&(x, y)| self.distance(x, y))
                    .collect();

                for &distance in &distances {
                    self.opponents[distance] += 1;
                }

                if distances.iter().all(|&distance| self.opponents[distance] <= 2) {
                    self.take(a, b, true);
                    self.open = None;
                    self.tables.push(table);
                    if self.extend() {
                        return true;
                    }

                    self.tables.pop();
                    self.open = Some(first);
                    self.take(a, b, false);
                }

                for &distance in &distances {
                    self.opponents[distance] -= 1;
                }

                if self.steps > WHIST_BUDGET {
                    return false;
                }
            }
        }

        false
    }
}

fn schedule_cost(rotations: &[Vec<Draft>]) -> (u32, u32) {
    let mut opponents: FxHashMap<(usize, usize), u32> = FxHashMap::default();
    for (a, b) in rotations.iter().flatten().flat_map(Draft::cross) {
        *opponents.entry(key(a, b)).or_insert(0) += 1;
    }

    cost(opponents.into_values())
}

/// Regroups the duos of a rotation while that lowers the opponent cost of
/// the whole schedule.
pub(crate) fn spread_opponents(rotations: &mut [Vec<Draft>]) {
    let mut current = schedule_cost(rotations);
    let mut improved = true;

    while improved {
        improved = false;

        for r in 0..rotations.len() {
            for i in 0..rotations[r].len() {
                for j in i + 1..rotations[r].len() {
                    let [home, away] = rotations[r][i].sides;
                    let [left, right] = rotations[r][j].sides;

                    for [first, second] in [
                        [Draft::new(home, left), Draft::new(away, right)],
                        [Draft::new(home, right), Draft::new(left, away)],
                    ] {
                        let (old_i, old_j) = (rotations[r][i], rotations[r][j]);
                        rotations[r][i] = first;
                        rotations[r][j] = second;

                        let cost = schedule_cost(rotations);
                        if cost < current {
                            current = cost;
                            improved = true;
                            break;
                        }

                        rotations[r][i] = old_i;
                        rotations[r][j] = old_j;
                    }
                }
            }
        }
    }
}

/// Search steps before packing falls back to first fit.
const PACK_BUDGET: usize = 200_000;

/// Lays matches out on at most `courts` courts per round so that every round
/// but the last fills every court.
///
/// Matches of the players with the most matches left go first, which keeps
/// the sit-outs even from round to round. When no such layout turns up the
/// matches go out first fit, in their order.
pub(crate) fn pack(drafts: Vec<Draft>, courts: usize, players: usize) -> Vec<Vec<Draft>> {
    if courts == 0 {
        return Vec::new();
    }

    let mut packer = Packer::new(&drafts, courts, players);
    if packer.fill() {
        return packer
            .rounds
            .iter()
            .map(|round| round.iter().map(|&i| drafts[i]).collect())
            .collect();
    }

    debug!("{} matches don't fill {courts} courts every round", drafts.len());
    first_fit(drafts, courts)
}

/// Backtracking over which matches make up each round.
struct Packer<'a> {
    drafts: &'a [Draft],
    courts: usize,
    placed: Vec<bool>,
    left: usize,
    /// Matches each player still has to play.
    load: Vec<usize>,
    rounds: Vec<Vec<usize>>,
    steps: usize,
}

impl<'a> Packer<'a> {
    fn new(drafts: &'a [Draft], courts: usize, players: usize) -> Self {
        let mut load = vec![0; players];
        for player in drafts.iter().flat_map(|draft| draft.players()) {
            load[player] += 1;
        }

        Self {
            drafts,
            courts,
            placed: vec![false; drafts.len()],
            left: drafts.len(),
            load,
            rounds: Vec::new(),
            steps: 0,
        }
    }

    fn fill(&mut self) -> bool {
        if self.left == 0 {
            return true;
        }

        self.steps += 1;
        if self.steps > PACK_BUDGET {
            return false;
        }

        // Nobody can play more matches than there are rounds left.
        let rounds_left = self.left.div_ceil(self.courts);
        if self.load.iter().any(|&load| load > rounds_left) {
            return false;
        }

        let mut order: Vec<usize> = (0..self.drafts.len())
            .filter(|&i| !self.placed[i])
            .collect();
        order.sort_by_key(|&i| Reverse(self.urgency(i)));

        let size = self.courts.min(self.left);
        self.choose(&order, 0, size, &mut Vec::with_capacity(size))
    }

    fn urgency(&self, i: usize) -> usize {
        self.drafts[i].players().map(|player| self.load[player]).sum()
    }

    fn overlap(&self, i: usize, j: usize) -> bool {
        self.drafts[i]
            .players()
            .any(|a| self.drafts[j].players().any(|b| a == b))
    }

    fn choose(
        &mut self,
        order: &[usize],
        from: usize,
        size: usize,
        round: &mut Vec<usize>,
    ) -> bool {
        if round.len() == size {
            return self.commit(round);
        }

        for (k, &i) in order.iter().enumerate().skip(from) {
            if order.len() - k < size - round.len() {
                break;
            }

            self.steps += 1;
            if self.steps > PACK_BUDGET {
                return false;
            }

            if round.iter().any(|&j| self.overlap(i, j)) {
                continue;
            }

            round.push(i);
            if self.choose(order, k + 1, size, round) {
                return true;
            }
            round.pop();
        }

        false
    }

    fn commit(&mut self, round: &[usize]) -> bool {
        self.mark(round, true);
        self.rounds.push(round.to_vec());
        if self.fill() {
            return true;
        }

        self.rounds.pop();
        self.mark(round, false);
        false
    }

    fn mark(&mut self, round: &[usize], placed: bool) {
        let drafts = self.drafts;

        for &i in round {
            self.placed[i] = placed;
            for player in drafts[i].players() {
                if placed {
                    self.load[player] -= 1;
                } else {
                    self.load[player] += 1;
                }
            }
        }

        if placed {
            self.left -= round.len();
        } else {
            self.left += round.len();
        }
    }
}

/// Lays matches out on at most `courts` courts per round, keeping their
/// order as far as nobody plays twice in a round.
fn first_fit(drafts: Vec<Draft>, courts: usize) -> Vec<Vec<Draft>> {
    let mut pending: VecDeque<Draft> = drafts.into();
    let mut rounds = Vec::new();

    while !pending.is_empty() {
        let mut round: Vec<Draft> = Vec::with_capacity(courts);
        let mut busy = FxHashSet::default();
        let mut skipped = VecDeque::new();

        while round.len() < courts
            && let Some(draft) = pending.pop_front()
        {
            if draft.players().any(|player| busy.contains(&player)) {
                skipped.push_back(draft);
            } else {
                busy.extend(draft.players());
                round.push(draft);
            }
        }

        skipped.append(&mut pending);
        pending = skipped;
        rounds.push(round);
    }

    rounds
}

/// Turns drafts into a numbered round, court 1 first. Roster players without
/// a match sit out.
pub(crate) fn into_round(
    number: usize,
    drafts: &[Draft],
    players: &[Player],
    teams: &[Team],
) -> Round {
    let side = |duo: &Duo| Side {
        player_ids: duo.players.iter().map(|&i| players[i].id.clone()).collect(),
        team_id: duo.team.map(|team| teams[team].id.clone()),
    };

    let matches = drafts
        .iter()
        .enumerate()
        .map(|(court, draft)| {
            Match::new(number, court + 1, side(&draft.sides[0]), side(&draft.sides[1]))
        })
        .collect();

    let playing: FxHashSet<usize> = drafts.iter().flat_map(Draft::players).collect();
    let byes = (0..players.len())
        .filter(|i| !playing.contains(i))
        .map(|i| players[i].id.clone())
        .collect();

    Round {
        number,
        matches,
        byes,
        is_final: false,
    }
}
