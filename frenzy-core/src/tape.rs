//! Binary click tapes. Layout: an 18-byte header (magic, version,
//! reserved byte, board extents, seed, click count), one 9-byte record
//! per click (kind, time, target id) and a 12-byte footer (claimed
//! score, claimed RNG state, CRC32 over header and records).

use alloc::{vec, vec::Vec};
use serde::{Deserialize, Serialize};

use crate::constants::{
    BOARD_EXTENT_MIN_PX, INPUT_KIND_CLICK, ROUND_MS, TAPE_FOOTER_SIZE, TAPE_HEADER_SIZE,
    TAPE_MAGIC, TAPE_RECORD_SIZE, TAPE_VERSION,
};
use crate::error::VerifyError;
use crate::sim::GameConfig;

/// One recorded click, applied at `at_ms` against the target spawned
/// `target`-th in the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickInput {
    pub at_ms: u32,
    pub target: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeHeader {
    pub magic: u32,
    pub version: u8,
    pub board_width: u16,
    pub board_height: u16,
    pub seed: u32,
    pub click_count: u32,
}

impl TapeHeader {
    pub fn config(&self) -> GameConfig {
        GameConfig::new(u32::from(self.board_width), u32::from(self.board_height))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeFooter {
    pub final_score: u32,
    pub final_rng_state: u32,
    pub checksum: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedTape {
    pub header: TapeHeader,
    pub inputs: Vec<ClickInput>,
    pub footer: TapeFooter,
}

pub fn parse_tape(bytes: &[u8], max_clicks: u32) -> Result<ParsedTape, VerifyError> {
    let min_len = TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE;
    if bytes.len() < min_len {
        return Err(VerifyError::TapeTooShort {
            actual: bytes.len(),
            min: min_len,
        });
    }

    let magic = read_u32_le(bytes, 0);
    if magic != TAPE_MAGIC {
        return Err(VerifyError::InvalidMagic { found: magic });
    }

    let version = bytes[4];
    if version != TAPE_VERSION {
        return Err(VerifyError::UnsupportedVersion { found: version });
    }

    if bytes[5] != 0 {
        return Err(VerifyError::HeaderReservedNonZero);
    }

    let board_width = read_u16_le(bytes, 6);
    let board_height = read_u16_le(bytes, 8);
    if u32::from(board_width) < BOARD_EXTENT_MIN_PX || u32::from(board_height) < BOARD_EXTENT_MIN_PX
    {
        return Err(VerifyError::BoardOutOfRange {
            width: board_width,
            height: board_height,
        });
    }

    let seed = read_u32_le(bytes, 10);
    let click_count = read_u32_le(bytes, 14);
    if click_count > max_clicks {
        return Err(VerifyError::ClickCountOutOfRange {
            click_count,
            max_clicks,
        });
    }

    let expected_len = TAPE_HEADER_SIZE + click_count as usize * TAPE_RECORD_SIZE + TAPE_FOOTER_SIZE;
    if bytes.len() != expected_len {
        return Err(VerifyError::TapeLengthMismatch {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    let mut inputs = Vec::with_capacity(click_count as usize);
    let mut prev_ms = 0u32;
    for index in 0..click_count {
        let offset = TAPE_HEADER_SIZE + index as usize * TAPE_RECORD_SIZE;
        let kind = bytes[offset];
        if kind != INPUT_KIND_CLICK {
            return Err(VerifyError::UnknownInputKind { index, kind });
        }
        let at_ms = read_u32_le(bytes, offset + 1);
        let target = read_u32_le(bytes, offset + 5);
        if at_ms >= ROUND_MS {
            return Err(VerifyError::InputTimeOutOfRange { index, at_ms });
        }
        if at_ms < prev_ms {
            return Err(VerifyError::InputOrderViolation {
                index,
                at_ms,
                prev_ms,
            });
        }
        prev_ms = at_ms;
        inputs.push(ClickInput { at_ms, target });
    }

    let records_end = TAPE_HEADER_SIZE + click_count as usize * TAPE_RECORD_SIZE;
    let final_score = read_u32_le(bytes, records_end);
    let final_rng_state = read_u32_le(bytes, records_end + 4);
    let checksum = read_u32_le(bytes, records_end + 8);

    let computed = crc32(&bytes[..records_end]);
    if checksum != computed {
        return Err(VerifyError::CrcMismatch {
            stored: checksum,
            computed,
        });
    }

    Ok(ParsedTape {
        header: TapeHeader {
            magic,
            version,
            board_width,
            board_height,
            seed,
            click_count,
        },
        inputs,
        footer: TapeFooter {
            final_score,
            final_rng_state,
            checksum,
        },
    })
}

pub fn serialize_tape(
    seed: u32,
    config: GameConfig,
    inputs: &[ClickInput],
    final_score: u32,
    final_rng_state: u32,
) -> Vec<u8> {
    let total_len = TAPE_HEADER_SIZE + inputs.len() * TAPE_RECORD_SIZE + TAPE_FOOTER_SIZE;
    let mut data = vec![0u8; total_len];

    write_u32_le(&mut data, 0, TAPE_MAGIC);
    data[4] = TAPE_VERSION;
    data[5] = 0;
    write_u16_le(&mut data, 6, config.board_width() as u16);
    write_u16_le(&mut data, 8, config.board_height() as u16);
    write_u32_le(&mut data, 10, seed);
    write_u32_le(&mut data, 14, inputs.len() as u32);

    for (index, input) in inputs.iter().enumerate() {
        let offset = TAPE_HEADER_SIZE + index * TAPE_RECORD_SIZE;
        data[offset] = INPUT_KIND_CLICK;
        write_u32_le(&mut data, offset + 1, input.at_ms);
        write_u32_le(&mut data, offset + 5, input.target);
    }

    let records_end = TAPE_HEADER_SIZE + inputs.len() * TAPE_RECORD_SIZE;
    write_u32_le(&mut data, records_end, final_score);
    write_u32_le(&mut data, records_end + 4, final_rng_state);

    let checksum = crc32(&data[..records_end]);
    write_u32_le(&mut data, records_end + 8, checksum);

    data
}

#[inline]
fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn write_u16_le(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut c = i as u32;
        let mut j = 0;

        while j < 8 {
            c = if (c & 1) != 0 {
                0xEDB8_8320u32 ^ (c >> 1)
            } else {
                c >> 1
            };
            j += 1;
        }

        table[i] = c;
        i += 1;
    }

    table
}

pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;

    for byte in data {
        let idx = ((crc ^ (*byte as u32)) & 0xFF) as usize;
        crc = CRC_TABLE[idx] ^ (crc >> 8);
    }

    crc ^ 0xFFFF_FFFFu32
}
