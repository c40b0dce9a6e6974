//! Pure game logic for hkgi.
//!
//! Everything here takes plain data and returns results: no locks, no
//! clocks, no I/O beyond reading a manifest file. Randomness is always
//! passed in as `&mut impl Rng` so tests can seed it.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Engine tuning: tick period, xp rates, level curve, drop chances |
//! | [`error`] | Player-facing error taxonomy |
//! | [`growth`] | Per-tick experience slicing and yield detection |
//! | [`inventory`] | All-or-nothing item ledger |
//! | [`kinds`] | Closed tags for plants, families and items |
//! | [`leveling`] | Experience → level, yield cycle length |
//! | [`manifest`] | Item/recipe content and its validation |
//! | [`recipes`] | Using items and crafting on plots |
//! | [`stead`] | Stead and plant data |
//! | [`status`] | Ephemeral and standing boosts, multiplier stacking |

pub mod config;
pub mod error;
pub mod growth;
pub mod inventory;
pub mod kinds;
pub mod leveling;
pub mod manifest;
pub mod recipes;
pub mod stead;
pub mod status;

pub use error::GameError;
