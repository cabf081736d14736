//! A round generation and standings engine for social Americano and Mexicano
//! doubles tournaments.
//!
//! ## Feature Flags
//!
//! By default the `cli` feature flag is enabled.
//!
//! * bench - build the criterion benchmarks
//! * cli - enable the `padel-mixer` binary
//!
//! ## Formats
//!
//! * Americano - partners rotate through a fixed round robin
//! * Mixed Americano - the same, with one man and one woman per side
//! * Team Americano - fixed teams play a round robin against each other
//! * Mexicano - every round is seeded from the standings
//! * Team Mexicano - fixed teams seeded from the team standings

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

#![deny(clippy::panic)]

pub mod error;
mod pairing;
pub mod player;
pub mod round;
pub mod schedule;
pub mod standings;
pub mod stats;
pub mod tournament;
#[cfg(feature = "cli")]
pub mod utils;

pub type Id = String;
pub const HOME: &str = "padel-mixer";

pub const COPYRIGHT: &str = r".SH COPYRIGHT
Copyright (C) 2026 Developers of the padel-mixer project

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU Affero General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU Affero General Public License for more details.

You should have received a copy of the GNU Affero General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
";

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "
Copyright (c) 2026 Developers of the padel-mixer project
Licensed under the AGPLv3"
);
