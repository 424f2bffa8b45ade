//! Scripted Color Frenzy sessions: a bot roster, a session runner that
//! records verifiable click tapes, benchmark sweeps and the on-disk
//! high-score table.

pub mod benchmark;
pub mod bots;
pub mod runner;
pub mod store;
pub mod util;
