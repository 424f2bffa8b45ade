use core::fmt;

/// Invariant and transition rules checked during strict replay. Each code
/// names the rule that failed, not the input that tripped it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    PhaseTargetConsistency,
    ClockTimeRange,
    ClockLevelConsistency,
    ClockRewind,
    TargetSizeRange,
    TargetBounds,
    TargetLifetimeRange,
    TargetIdOrder,
    TargetExpiryPending,
    ScoreDeltaStep,
    InputOrder,
    InputAfterEnd,
    UnknownTarget,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhaseTargetConsistency => write!(f, "PHASE_TARGET_CONSISTENCY"),
            Self::ClockTimeRange => write!(f, "CLOCK_TIME_RANGE"),
            Self::ClockLevelConsistency => write!(f, "CLOCK_LEVEL_CONSISTENCY"),
            Self::ClockRewind => write!(f, "CLOCK_REWIND"),
            Self::TargetSizeRange => write!(f, "TARGET_SIZE_RANGE"),
            Self::TargetBounds => write!(f, "TARGET_BOUNDS"),
            Self::TargetLifetimeRange => write!(f, "TARGET_LIFETIME_RANGE"),
            Self::TargetIdOrder => write!(f, "TARGET_ID_ORDER"),
            Self::TargetExpiryPending => write!(f, "TARGET_EXPIRY_PENDING"),
            Self::ScoreDeltaStep => write!(f, "SCORE_DELTA_STEP"),
            Self::InputOrder => write!(f, "INPUT_ORDER"),
            Self::InputAfterEnd => write!(f, "INPUT_AFTER_END"),
            Self::UnknownTarget => write!(f, "UNKNOWN_TARGET"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    TapeTooShort { actual: usize, min: usize },
    InvalidMagic { found: u32 },
    UnsupportedVersion { found: u8 },
    HeaderReservedNonZero,
    BoardOutOfRange { width: u16, height: u16 },
    ClickCountOutOfRange { click_count: u32, max_clicks: u32 },
    TapeLengthMismatch { expected: usize, actual: usize },
    UnknownInputKind { index: u32, kind: u8 },
    InputTimeOutOfRange { index: u32, at_ms: u32 },
    InputOrderViolation { index: u32, at_ms: u32, prev_ms: u32 },
    CrcMismatch { stored: u32, computed: u32 },
    RuleViolation { input_index: u32, rule: RuleCode },
    ScoreMismatch { claimed: u32, computed: u32 },
    RngMismatch { claimed: u32, computed: u32 },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TapeTooShort { actual, min } => {
                write!(f, "tape too short: got {actual} bytes, need at least {min}")
            }
            Self::InvalidMagic { found } => write!(f, "invalid tape magic: 0x{found:08x}"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported tape version: {found}"),
            Self::HeaderReservedNonZero => write!(f, "header reserved byte is non-zero"),
            Self::BoardOutOfRange { width, height } => {
                write!(f, "board extents out of range: {width}x{height}")
            }
            Self::ClickCountOutOfRange {
                click_count,
                max_clicks,
            } => write!(
                f,
                "click count out of range: {click_count} (allowed 0..={max_clicks})"
            ),
            Self::TapeLengthMismatch { expected, actual } => write!(
                f,
                "tape length mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::UnknownInputKind { index, kind } => {
                write!(f, "unknown input kind at record {index}: 0x{kind:02x}")
            }
            Self::InputTimeOutOfRange { index, at_ms } => {
                write!(f, "input timestamp out of range at record {index}: {at_ms}ms")
            }
            Self::InputOrderViolation {
                index,
                at_ms,
                prev_ms,
            } => write!(
                f,
                "input timestamps out of order at record {index}: {at_ms}ms after {prev_ms}ms"
            ),
            Self::CrcMismatch { stored, computed } => write!(
                f,
                "crc mismatch: stored=0x{stored:08x}, computed=0x{computed:08x}"
            ),
            Self::RuleViolation { input_index, rule } => {
                write!(f, "rule violation at input {input_index}: {rule}")
            }
            Self::ScoreMismatch { claimed, computed } => {
                write!(f, "score mismatch: claimed={claimed}, computed={computed}")
            }
            Self::RngMismatch { claimed, computed } => {
                write!(
                    f,
                    "rng mismatch: claimed=0x{claimed:08x}, computed=0x{computed:08x}"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VerifyError {}
