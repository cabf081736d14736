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

use thiserror::Error;

use crate::Id;

/// The input can't produce a round. Nothing was generated.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    #[error("generate: a player needs a gender for mixed doubles: {0}")]
    MissingGender(Id),
    #[error("generate: there are no valid partners left for {0}")]
    NoValidPairing(Id),
    #[error("generate: {players} players can't fill a court, at least {needed} are needed")]
    NotEnoughPlayers { players: usize, needed: usize },
    #[error("generate: {0} teams can't fill a court, at least 2 are needed")]
    NotEnoughTeams(usize),
    #[error("generate: the player {0} is in the roster twice")]
    DuplicatePlayer(Id),
    #[error("generate: the team {0} needs two different roster players")]
    InvalidTeam(Id),
    #[error("generate: the player {0} is in more than one team")]
    PlayerInTwoTeams(Id),
    #[error("generate: {0} players isn't a multiple of 4")]
    PlayerCountNotMultipleOfFour(usize),
    #[error("generate: mixed doubles needs as many men as women, got {males} and {females}")]
    UnbalancedGenders { males: usize, females: usize },
    #[error("generate: there has to be at least one court")]
    ZeroCourts,
}

/// A tournament state transition was refused. The tournament is unchanged.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TournamentError {
    #[error("tournament: a final round was already played")]
    FinalAlreadyPlayed,
    #[error("tournament: the tournament is finished")]
    Finished,
    #[error("tournament: there are no more rounds to play")]
    NoMoreRounds,
    #[error("tournament: round {0} still has matches without a score")]
    RoundIncomplete(usize),
    #[error("tournament: there is no match {0}")]
    UnknownMatch(Id),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
