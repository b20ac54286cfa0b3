//! Codec error types and the flat decode outcome.

use thiserror::Error;

use crate::constants::*;
use crate::registry::UplinkKind;

/// Errors that can occur when encoding or decoding a message.
///
/// None of these is fatal to the codec; the caller decides whether to wait
/// for more input, supply a bigger buffer, or discard the datagram.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Generic failure not covered by the other variants.
    #[error("codec failure: {0}")]
    Failure(String),

    /// Not enough input bytes to read the next field.
    #[error("input too short: needed {needed} bytes, {available} available")]
    InputTooShort {
        /// Bytes required by the read.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },

    /// Output buffer cannot hold the encoded message.
    #[error("output too short: need {required} bytes, buffer holds {available}")]
    OutputTooShort {
        /// Bytes required by the encoding.
        required: usize,
        /// Capacity of the output buffer.
        available: usize,
    },

    /// The leading identifier matches no known message.
    #[error("unknown message id: 0x{0:02X}")]
    UnknownMessageId(u8),

    /// A length or consistency violation inside a recognised message.
    #[error("bad message format: {0}")]
    BadMessageFormat(String),
}

impl CodecError {
    /// Create a generic failure.
    pub fn failure(message: impl Into<String>) -> Self {
        CodecError::Failure(message.into())
    }

    /// Create a bad message format error.
    pub fn bad_format(message: impl Into<String>) -> Self {
        CodecError::BadMessageFormat(message.into())
    }

    /// The flat outcome this error corresponds to.
    pub fn decode_result(&self) -> DecodeResult {
        match self {
            CodecError::Failure(_) => DecodeResult::Failure,
            CodecError::InputTooShort { .. } => DecodeResult::InputTooShort,
            CodecError::OutputTooShort { .. } => DecodeResult::OutputTooShort,
            CodecError::UnknownMessageId(_) => DecodeResult::UnknownMessageId,
            CodecError::BadMessageFormat(_) => DecodeResult::BadMessageFormat,
        }
    }
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Closed set of outcomes of classifying or decoding an uplink message.
///
/// The failure variants mirror [`CodecError`]; the rest name the uplink
/// kind that was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeResult {
    /// Generic failed decode.
    Failure,
    /// Not enough input bytes.
    InputTooShort,
    /// Not enough room in the output.
    OutputTooShort,
    /// Rogue message ID.
    UnknownMessageId,
    /// A problem with the format of a message.
    BadMessageFormat,
    /// Device initialised.
    InitInd,
    /// Reporting interval and heartbeat.
    IntervalsGetCnf,
    /// Reporting interval confirmation.
    ReportingIntervalSetCnf,
    /// Heartbeat confirmation.
    HeartbeatSetCnf,
    /// Poll at end of a reporting period.
    PollInd,
    /// Sensor report on request.
    SensorsReportGetCnf,
    /// Sensor report, unsolicited.
    SensorsReportInd,
    /// Debug string.
    DebugInd,
    /// Traffic report on request.
    TrafficReportGetCnf,
    /// Traffic report, unsolicited.
    TrafficReportInd,
}

impl DecodeResult {
    /// Whether this outcome names a recognised message.
    pub fn is_success(&self) -> bool {
        self.kind().is_some()
    }

    /// The uplink kind for a success outcome.
    pub fn kind(&self) -> Option<UplinkKind> {
        match self {
            DecodeResult::InitInd => Some(UplinkKind::InitInd),
            DecodeResult::IntervalsGetCnf => Some(UplinkKind::IntervalsGetCnf),
            DecodeResult::ReportingIntervalSetCnf => Some(UplinkKind::ReportingIntervalSetCnf),
            DecodeResult::HeartbeatSetCnf => Some(UplinkKind::HeartbeatSetCnf),
            DecodeResult::PollInd => Some(UplinkKind::PollInd),
            DecodeResult::SensorsReportGetCnf => Some(UplinkKind::SensorsReportGetCnf),
            DecodeResult::SensorsReportInd => Some(UplinkKind::SensorsReportInd),
            DecodeResult::DebugInd => Some(UplinkKind::DebugInd),
            DecodeResult::TrafficReportGetCnf => Some(UplinkKind::TrafficReportGetCnf),
            DecodeResult::TrafficReportInd => Some(UplinkKind::TrafficReportInd),
            _ => None,
        }
    }

    /// Numeric code for hosts that need a plain integer.
    ///
    /// Failures occupy 0..=4; successes are `0x80 + uplink id`.
    pub fn code(&self) -> u32 {
        match self {
            DecodeResult::Failure => DECODE_RESULT_FAILURE,
            DecodeResult::InputTooShort => DECODE_RESULT_INPUT_TOO_SHORT,
            DecodeResult::OutputTooShort => DECODE_RESULT_OUTPUT_TOO_SHORT,
            DecodeResult::UnknownMessageId => DECODE_RESULT_UNKNOWN_MSG_ID,
            DecodeResult::BadMessageFormat => DECODE_RESULT_BAD_MSG_FORMAT,
            _ => match self.kind() {
                Some(kind) => DECODE_RESULT_UL_MSG_BASE + u32::from(kind.id()),
                None => DECODE_RESULT_FAILURE,
            },
        }
    }
}

impl From<UplinkKind> for DecodeResult {
    fn from(kind: UplinkKind) -> Self {
        match kind {
            UplinkKind::InitInd => DecodeResult::InitInd,
            UplinkKind::IntervalsGetCnf => DecodeResult::IntervalsGetCnf,
            UplinkKind::ReportingIntervalSetCnf => DecodeResult::ReportingIntervalSetCnf,
            UplinkKind::HeartbeatSetCnf => DecodeResult::HeartbeatSetCnf,
            UplinkKind::PollInd => DecodeResult::PollInd,
            UplinkKind::SensorsReportGetCnf => DecodeResult::SensorsReportGetCnf,
            UplinkKind::SensorsReportInd => DecodeResult::SensorsReportInd,
            UplinkKind::DebugInd => DecodeResult::DebugInd,
            UplinkKind::TrafficReportGetCnf => DecodeResult::TrafficReportGetCnf,
            UplinkKind::TrafficReportInd => DecodeResult::TrafficReportInd,
        }
    }
}

impl From<&CodecError> for DecodeResult {
    fn from(err: &CodecError) -> Self {
        err.decode_result()
    }
}

impl<T> From<Result<T, CodecError>> for DecodeResult
where
    T: Into<DecodeResult>,
{
    fn from(result: Result<T, CodecError>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(err) => err.decode_result(),
        }
    }
}

impl std::fmt::Display for DecodeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{}", kind),
            None => match self {
                DecodeResult::InputTooShort => write!(f, "input too short"),
                DecodeResult::OutputTooShort => write!(f, "output too short"),
                DecodeResult::UnknownMessageId => write!(f, "unknown message id"),
                DecodeResult::BadMessageFormat => write!(f, "bad message format"),
                _ => write!(f, "failure"),
            },
        }
    }
}
