#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod constants;
pub mod error;
pub mod rng;
pub mod scores;
pub mod sim;
pub mod tape;
pub mod verify;

pub use error::{RuleCode, VerifyError};
pub use scores::HighScores;
pub use verify::{verify_tape, SessionJournal};
