//! Protocol constants
//!
//! These constants define the message identifiers, sensor bitmap bits, and
//! size/value limits used on the teddy uplink/downlink link.

// ============================================================================
// Downlink Message IDs (host → device)
// ============================================================================

/// Reboot the device, setting development mode on or off.
pub const REBOOT_REQ_DL_MSG: u8 = 0;
/// Get the reporting interval and heartbeat.
pub const INTERVALS_GET_REQ_DL_MSG: u8 = 1;
/// Set the interval at which sensor reports are sent.
pub const REPORTING_INTERVAL_SET_REQ_DL_MSG: u8 = 2;
/// Set the interval at which sensor readings are taken.
pub const HEARTBEAT_SET_REQ_DL_MSG: u8 = 3;
/// Request a sensor report.
pub const SENSORS_REPORT_GET_REQ_DL_MSG: u8 = 4;
/// Request a traffic report.
pub const TRAFFIC_REPORT_GET_REQ_DL_MSG: u8 = 5;

// ============================================================================
// Uplink Message IDs (device → host)
// ============================================================================

/// Power-on of the device has completed.
pub const INIT_IND_UL_MSG: u8 = 0;
/// Reply to an intervals get request.
pub const INTERVALS_GET_CNF_UL_MSG: u8 = 1;
/// Reply to a reporting interval set request.
pub const REPORTING_INTERVAL_SET_CNF_UL_MSG: u8 = 2;
/// Reply to a heartbeat set request.
pub const HEARTBEAT_SET_CNF_UL_MSG: u8 = 3;
/// Sent on expiry of a reporting period when there is nothing to report.
pub const POLL_IND_UL_MSG: u8 = 4;
/// Reply to a sensor report request.
pub const SENSORS_REPORT_GET_CNF_UL_MSG: u8 = 5;
/// Periodic or triggered sensor report.
pub const SENSORS_REPORT_IND_UL_MSG: u8 = 6;
/// A debug string.
pub const DEBUG_IND_UL_MSG: u8 = 7;
/// Reply to a traffic report request.
pub const TRAFFIC_REPORT_GET_CNF_UL_MSG: u8 = 8;
/// Periodic traffic report.
pub const TRAFFIC_REPORT_IND_UL_MSG: u8 = 9;

// ============================================================================
// Decode Result Codes
// ============================================================================

/// Generic failed decode.
pub const DECODE_RESULT_FAILURE: u32 = 0;
/// Not enough input bytes.
pub const DECODE_RESULT_INPUT_TOO_SHORT: u32 = 1;
/// Not enough room in the output.
pub const DECODE_RESULT_OUTPUT_TOO_SHORT: u32 = 2;
/// Rogue message ID.
pub const DECODE_RESULT_UNKNOWN_MSG_ID: u32 = 3;
/// A problem with the format of a message.
pub const DECODE_RESULT_BAD_MSG_FORMAT: u32 = 4;
/// Uplink success codes start here; the uplink ID is added to it.
pub const DECODE_RESULT_UL_MSG_BASE: u32 = 0x80;

// ============================================================================
// Sensor Report Bitmap
// ============================================================================

/// GPS position present.
pub const SENSOR_BIT_GPS_POSITION: u8 = 0x01;
/// Local position present.
pub const SENSOR_BIT_LCL_POSITION: u8 = 0x02;
/// Sound level present.
pub const SENSOR_BIT_SOUND_LEVEL: u8 = 0x04;
/// Luminosity present.
pub const SENSOR_BIT_LUMINOSITY: u8 = 0x08;
/// Temperature present.
pub const SENSOR_BIT_TEMPERATURE: u8 = 0x10;
/// RSSI present.
pub const SENSOR_BIT_RSSI: u8 = 0x20;
/// Power state present.
pub const SENSOR_BIT_POWER_STATE: u8 = 0x40;
/// Another bitmap byte follows this one.
pub const SENSOR_BITMAP_EXTENSION: u8 = 0x80;

/// Encoded size of a GPS position item.
pub const GPS_POSITION_SIZE: usize = 16;
/// Encoded size of a local position item.
pub const LCL_POSITION_SIZE: usize = 3;
/// Encoded size of a power state item.
pub const POWER_STATE_SIZE: usize = 3;

// ============================================================================
// Sizes
// ============================================================================

/// Revision level of this messaging protocol.
pub const REVISION_LEVEL: u32 = 0;
/// Maximum length of a raw datagram.
pub const MAX_DATAGRAM_SIZE_RAW: usize = 122;
/// Maximum length of a single message.
pub const MAX_MESSAGE_SIZE: usize = 35;
/// Minimum length of a single message (the identifier alone).
pub const MIN_MESSAGE_SIZE: usize = 1;
/// Maximum debug string size: a whole message less its length field.
pub const MAX_DEBUG_STRING_SIZE: usize = MAX_MESSAGE_SIZE - 4;

// ============================================================================
// Value Limits
// ============================================================================

/// Lowest heartbeat the device accepts.
pub const MIN_HEARTBEAT_SECONDS: u32 = 10;
/// Lowest reporting interval the device accepts.
pub const MIN_REPORTING_INTERVAL_MINUTES: u32 = 1;
/// Reporting interval the device starts with.
pub const DEFAULT_REPORTING_INTERVAL_MINUTES: u32 = 1;
/// Heartbeat the device starts with.
pub const DEFAULT_HEARTBEAT_SECONDS: u32 = 10;

/// Battery voltage ceiling; the wire carries it in 6 bits.
pub const MAX_BATTERY_VOLTAGE_MV: u32 = 10_000;
/// Full-scale value of the 6-bit battery field.
pub const BATTERY_FIELD_MAX: u32 = 0x3F;
/// Hugs per period (4 bits).
pub const MAX_HUGS_THIS_PERIOD: u32 = 0x0F;
/// Slaps per period (4 bits).
pub const MAX_SLAPS_THIS_PERIOD: u32 = 0x0F;
/// Drops per period (4 bits).
pub const MAX_DROPS_THIS_PERIOD: u32 = 0x0F;
/// Nudges per period (8 bits).
pub const MAX_NUDGES_THIS_PERIOD: u32 = 0xFF;
/// Largest RSSI value defined for AT+CSQ.
pub const MAX_RSSI: u32 = 100;
/// Luminosity ceiling, in lux.
pub const MAX_LUMINOSITY: u32 = 0xFFFF;
/// Sound level ceiling.
pub const MAX_SOUND_LEVEL: u32 = 0xFFFF;
