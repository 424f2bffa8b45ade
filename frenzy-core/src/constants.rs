// Round clock
pub const ROUND_SECONDS: u32 = 60;
pub const ROUND_MS: u32 = ROUND_SECONDS * 1000;
pub const CLOCK_TICK_MS: u32 = 1000;
pub const LEVEL_STEP_SECONDS: u32 = 15;
pub const LEVEL_MAX: u32 = 4; // one round crosses 45s/30s/15s once each
pub const LOW_TIME_WARNING_SECONDS: u32 = 10;

// Spawning
pub const SPAWN_INTERVAL_BASE_MS: u32 = 1000;
pub const SPAWN_INTERVAL_STEP_MS: u32 = 100;
pub const SPAWN_INTERVAL_FLOOR_MS: u32 = 500;
pub const TARGET_LIFETIME_BASE_MS: u32 = 3000;
pub const TARGET_LIFETIME_STEP_MS: u32 = 200;
pub const TARGET_LIFETIME_FLOOR_MS: u32 = 1500;

// Targets
pub const TARGET_SIZE_MIN_PX: u32 = 40;
pub const TARGET_SIZE_SPAN_PX: u32 = 40;

// Scoring
pub const HIT_POINTS_PER_LEVEL: u32 = 10;
pub const MISS_PENALTY: u32 = 5;
pub const TARGET_REMOVE_DELAY_MS: u32 = 300;
pub const COLOR_ROTATE_DELAY_MS: u32 = 300;

// Board
pub const BOARD_WIDTH_DEFAULT_PX: u32 = 800;
pub const BOARD_HEIGHT_DEFAULT_PX: u32 = 600;
// Extents below this cannot fit the largest target; extents above
// u16::MAX cannot round-trip through the tape header.
pub const BOARD_EXTENT_MIN_PX: u32 = TARGET_SIZE_MIN_PX + TARGET_SIZE_SPAN_PX;
pub const BOARD_EXTENT_MAX_PX: u32 = u16::MAX as u32;

// High scores
pub const HIGH_SCORE_CAP: usize = 5;

// Tape format
pub const TAPE_MAGIC: u32 = u32::from_le_bytes(*b"FRNZ");
pub const TAPE_VERSION: u8 = 1;
pub const TAPE_HEADER_SIZE: usize = 18;
pub const TAPE_RECORD_SIZE: usize = 9;
pub const TAPE_FOOTER_SIZE: usize = 12;
pub const INPUT_KIND_CLICK: u8 = 0x01;
// A 60s round polled every 50ms tops out near 1200 clicks; anything much
// larger is not a recordable session.
pub const MAX_TAPE_CLICKS: u32 = 4096;
