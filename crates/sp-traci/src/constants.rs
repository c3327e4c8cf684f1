//! TraCI protocol identifiers.

// ── Control commands ──────────────────────────────────────────────────────────

pub const CMD_GETVERSION: u8 = 0x00;
pub const CMD_SIMSTEP: u8 = 0x02;
pub const CMD_CLOSE: u8 = 0x7F;

// ── Domain get / set commands ─────────────────────────────────────────────────

pub const CMD_GET_TL_VARIABLE: u8 = 0xa2;
pub const CMD_GET_LANE_VARIABLE: u8 = 0xa3;
pub const CMD_GET_VEHICLE_VARIABLE: u8 = 0xa4;
pub const CMD_GET_SIM_VARIABLE: u8 = 0xab;

pub const CMD_SET_TL_VARIABLE: u8 = 0xc2;

/// A get command `c` is answered by a response command `c + RESPONSE_OFFSET`.
pub const RESPONSE_OFFSET: u8 = 0x10;

// ── Variables ─────────────────────────────────────────────────────────────────

pub const ID_LIST: u8 = 0x00;

pub const LAST_STEP_VEHICLE_NUMBER: u8 = 0x10;

pub const TL_RED_YELLOW_GREEN_STATE: u8 = 0x20;
pub const TL_PHASE_INDEX: u8 = 0x22;
pub const TL_PHASE_DURATION: u8 = 0x24;
pub const TL_CONTROLLED_LANES: u8 = 0x26;
pub const TL_CURRENT_PHASE: u8 = 0x28;
pub const TL_CURRENT_PROGRAM: u8 = 0x29;
pub const TL_COMPLETE_DEFINITION_RYG: u8 = 0x2b;

pub const VAR_VEHICLECLASS: u8 = 0x49;
pub const VAR_LANE_ID: u8 = 0x51;

pub const VAR_DELTA_T: u8 = 0x7b;
pub const VAR_MIN_EXPECTED_VEHICLES: u8 = 0x7d;

// ── Value types ───────────────────────────────────────────────────────────────

pub const TYPE_UBYTE: u8 = 0x07;
pub const TYPE_BYTE: u8 = 0x08;
pub const TYPE_INTEGER: u8 = 0x09;
pub const TYPE_DOUBLE: u8 = 0x0B;
pub const TYPE_STRING: u8 = 0x0C;
pub const TYPE_STRINGLIST: u8 = 0x0E;
pub const TYPE_COMPOUND: u8 = 0x0F;

// ── Status results ────────────────────────────────────────────────────────────

pub const RTYPE_OK: u8 = 0x00;
pub const RTYPE_NOTIMPLEMENTED: u8 = 0x01;
pub const RTYPE_ERR: u8 = 0xFF;
