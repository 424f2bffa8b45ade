use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::sim::{replay_strict, GameConfig, ReplayViolation, SessionResult};
use crate::tape::{parse_tape, ClickInput};

/// What a checked tape attests to: the session parameters and the
/// replay-computed outcome, bound to the tape by its checksum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionJournal {
    pub seed: u32,
    pub board_width: u16,
    pub board_height: u16,
    pub click_count: u32,
    pub final_score: u32,
    pub final_rng_state: u32,
    pub tape_checksum: u32,
}

/// Parses a tape, replays it under the strict rules and cross-checks the
/// claimed outcome against the computed one.
pub fn verify_tape(bytes: &[u8], max_clicks: u32) -> Result<SessionJournal, VerifyError> {
    verify_tape_with_replay(bytes, max_clicks, replay_strict)
}

fn verify_tape_with_replay<F>(
    bytes: &[u8],
    max_clicks: u32,
    replay_fn: F,
) -> Result<SessionJournal, VerifyError>
where
    F: FnOnce(u32, GameConfig, &[ClickInput]) -> Result<SessionResult, ReplayViolation>,
{
    let tape = parse_tape(bytes, max_clicks)?;
    let result = replay_fn(tape.header.seed, tape.header.config(), &tape.inputs).map_err(|err| {
        VerifyError::RuleViolation {
            input_index: err.input_index,
            rule: err.rule,
        }
    })?;

    if result.final_score != tape.footer.final_score {
        return Err(VerifyError::ScoreMismatch {
            claimed: tape.footer.final_score,
            computed: result.final_score,
        });
    }

    if result.final_rng_state != tape.footer.final_rng_state {
        return Err(VerifyError::RngMismatch {
            claimed: tape.footer.final_rng_state,
            computed: result.final_rng_state,
        });
    }

    Ok(SessionJournal {
        seed: tape.header.seed,
        board_width: tape.header.board_width,
        board_height: tape.header.board_height,
        click_count: tape.header.click_count,
        final_score: result.final_score,
        final_rng_state: result.final_rng_state,
        tape_checksum: tape.footer.checksum,
    })
}
