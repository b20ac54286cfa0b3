//! Uplink messages (device → host).
//!
//! Every message is a one-byte identifier followed by a body whose layout
//! depends on the identifier. A datagram may carry several messages back to
//! back; [`UplinkMessages`] walks them in order.

use crate::constants::*;
use crate::cursor::{Cursor, CursorMut};
use crate::error::{CodecError, DecodeResult};
use crate::registry::UplinkKind;
use crate::types::*;

/// A decoded uplink message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UplinkMessage {
    /// Device initialised.
    InitInd(InitInd),
    /// Reporting interval and heartbeat.
    IntervalsGetCnf(IntervalsGetCnf),
    /// Reporting interval confirmation.
    ReportingIntervalSetCnf(ReportingIntervalSetCnf),
    /// Heartbeat confirmation.
    HeartbeatSetCnf(HeartbeatSetCnf),
    /// Poll at end of a reporting period. No body.
    PollInd,
    /// Sensor report on request.
    SensorsReportGetCnf(SensorReadings),
    /// Sensor report, unsolicited.
    SensorsReportInd(SensorReadings),
    /// Debug string.
    DebugInd(DebugInd),
    /// Traffic report on request.
    TrafficReportGetCnf(TrafficReport),
    /// Traffic report, unsolicited.
    TrafficReportInd(TrafficReport),
}

impl UplinkMessage {
    /// The kind of this message.
    pub fn kind(&self) -> UplinkKind {
        match self {
            UplinkMessage::InitInd(_) => UplinkKind::InitInd,
            UplinkMessage::IntervalsGetCnf(_) => UplinkKind::IntervalsGetCnf,
            UplinkMessage::ReportingIntervalSetCnf(_) => UplinkKind::ReportingIntervalSetCnf,
            UplinkMessage::HeartbeatSetCnf(_) => UplinkKind::HeartbeatSetCnf,
            UplinkMessage::PollInd => UplinkKind::PollInd,
            UplinkMessage::SensorsReportGetCnf(_) => UplinkKind::SensorsReportGetCnf,
            UplinkMessage::SensorsReportInd(_) => UplinkKind::SensorsReportInd,
            UplinkMessage::DebugInd(_) => UplinkKind::DebugInd,
            UplinkMessage::TrafficReportGetCnf(_) => UplinkKind::TrafficReportGetCnf,
            UplinkMessage::TrafficReportInd(_) => UplinkKind::TrafficReportInd,
        }
    }

    /// Encoded size, identifier included.
    pub fn encoded_len(&self) -> usize {
        match self {
            UplinkMessage::SensorsReportGetCnf(readings)
            | UplinkMessage::SensorsReportInd(readings) => 1 + readings.encoded_len(),
            UplinkMessage::DebugInd(debug) => {
                1 + 4 + debug.bytes.len().min(MAX_DEBUG_STRING_SIZE)
            }
            other => other.kind().min_size(),
        }
    }

    /// Encode into `out`, returning the number of bytes written.
    ///
    /// The InitInd revision is always written as [`REVISION_LEVEL`]. Debug
    /// strings longer than [`MAX_DEBUG_STRING_SIZE`] are truncated. If `out`
    /// is too small nothing is written.
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, CodecError> {
        let len = self.encoded_len();
        let mut cur = CursorMut::new(out);
        cur.ensure(len)?;

        cur.write_u8(self.kind().id())?;
        match self {
            UplinkMessage::InitInd(msg) => {
                cur.write_u8(msg.wake_up_code.min(u8::MAX as u32) as u8)?;
                cur.write_u16(REVISION_LEVEL as u16)?;
            }
            UplinkMessage::IntervalsGetCnf(msg) => {
                cur.write_u32(msg.reporting_interval_minutes)?;
                cur.write_u32(msg.heartbeat_seconds)?;
            }
            UplinkMessage::ReportingIntervalSetCnf(msg) => {
                cur.write_u32(msg.reporting_interval_minutes)?;
            }
            UplinkMessage::HeartbeatSetCnf(msg) => {
                cur.write_u32(msg.heartbeat_seconds)?;
            }
            UplinkMessage::PollInd => {}
            UplinkMessage::SensorsReportGetCnf(readings)
            | UplinkMessage::SensorsReportInd(readings) => {
                readings.encode(&mut cur)?;
            }
            UplinkMessage::DebugInd(debug) => {
                let text = &debug.bytes[..debug.bytes.len().min(MAX_DEBUG_STRING_SIZE)];
                cur.write_u32(text.len() as u32)?;
                cur.write_bytes(text)?;
            }
            UplinkMessage::TrafficReportGetCnf(report)
            | UplinkMessage::TrafficReportInd(report) => {
                cur.write_u32(report.datagrams_sent)?;
                cur.write_u32(report.bytes_sent)?;
                cur.write_u32(report.datagrams_received)?;
                cur.write_u32(report.bytes_received)?;
            }
        }

        Ok(cur.position())
    }

    /// Encode into a freshly allocated buffer.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.encoded_len()];
        match self.encode(&mut buf) {
            Ok(written) => buf.truncate(written),
            Err(_) => buf.clear(),
        }
        buf
    }

    /// Decode one message starting at the identifier byte.
    ///
    /// On failure the cursor position is unspecified and the rest of the
    /// datagram should be discarded.
    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self, CodecError> {
        cur.ensure(MIN_MESSAGE_SIZE)?;
        let kind = UplinkKind::try_from(cur.read_u8()?)?;
        Self::decode_body(kind, cur)
    }

    /// Decode the body of a message whose identifier has been consumed.
    pub fn decode_body(kind: UplinkKind, cur: &mut Cursor<'_>) -> Result<Self, CodecError> {
        let message = match kind {
            UplinkKind::InitInd => UplinkMessage::InitInd(decode_init_ind(cur)?),
            UplinkKind::IntervalsGetCnf => {
                UplinkMessage::IntervalsGetCnf(decode_intervals_get_cnf(cur)?)
            }
            UplinkKind::ReportingIntervalSetCnf => {
                UplinkMessage::ReportingIntervalSetCnf(decode_reporting_interval_set_cnf(cur)?)
            }
            UplinkKind::HeartbeatSetCnf => {
                UplinkMessage::HeartbeatSetCnf(decode_heartbeat_set_cnf(cur)?)
            }
            UplinkKind::PollInd => UplinkMessage::PollInd,
            UplinkKind::SensorsReportGetCnf => {
                UplinkMessage::SensorsReportGetCnf(SensorReadings::decode(cur)?)
            }
            UplinkKind::SensorsReportInd => {
                UplinkMessage::SensorsReportInd(SensorReadings::decode(cur)?)
            }
            UplinkKind::DebugInd => UplinkMessage::DebugInd(decode_debug_ind(cur)?),
            UplinkKind::TrafficReportGetCnf => {
                UplinkMessage::TrafficReportGetCnf(decode_traffic_report(cur)?)
            }
            UplinkKind::TrafficReportInd => {
                UplinkMessage::TrafficReportInd(decode_traffic_report(cur)?)
            }
        };
        Ok(message)
    }
}

impl From<&UplinkMessage> for DecodeResult {
    fn from(message: &UplinkMessage) -> Self {
        message.kind().into()
    }
}

impl From<UplinkMessage> for DecodeResult {
    fn from(message: UplinkMessage) -> Self {
        message.kind().into()
    }
}

// ============================================================================
// Body decoders (identifier already consumed)
// ============================================================================

/// InitInd body: wake-up code (u8), revision (u16).
pub fn decode_init_ind(cur: &mut Cursor<'_>) -> Result<InitInd, CodecError> {
    cur.ensure(3)?;
    Ok(InitInd {
        wake_up_code: u32::from(cur.read_u8()?),
        revision: u32::from(cur.read_u16()?),
    })
}

/// IntervalsGetCnf body: reporting interval, heartbeat (u32 each).
pub fn decode_intervals_get_cnf(cur: &mut Cursor<'_>) -> Result<IntervalsGetCnf, CodecError> {
    cur.ensure(8)?;
    Ok(IntervalsGetCnf {
        reporting_interval_minutes: cur.read_u32()?,
        heartbeat_seconds: cur.read_u32()?,
    })
}

/// ReportingIntervalSetCnf body: reporting interval (u32).
pub fn decode_reporting_interval_set_cnf(
    cur: &mut Cursor<'_>,
) -> Result<ReportingIntervalSetCnf, CodecError> {
    Ok(ReportingIntervalSetCnf {
        reporting_interval_minutes: cur.read_u32()?,
    })
}

/// HeartbeatSetCnf body: heartbeat (u32).
pub fn decode_heartbeat_set_cnf(cur: &mut Cursor<'_>) -> Result<HeartbeatSetCnf, CodecError> {
    Ok(HeartbeatSetCnf {
        heartbeat_seconds: cur.read_u32()?,
    })
}

/// DebugInd body: length (u32) then that many bytes.
pub fn decode_debug_ind(cur: &mut Cursor<'_>) -> Result<DebugInd, CodecError> {
    let declared = cur.read_u32()?;
    let len = usize::try_from(declared).unwrap_or(usize::MAX);
    if len > MAX_DEBUG_STRING_SIZE {
        return Err(CodecError::bad_format(format!(
            "debug string length {} exceeds maximum {}",
            declared, MAX_DEBUG_STRING_SIZE
        )));
    }
    if len > cur.remaining() {
        return Err(CodecError::bad_format(format!(
            "debug string length {} exceeds remaining {} bytes",
            declared,
            cur.remaining()
        )));
    }
    Ok(DebugInd {
        bytes: cur.read_bytes(len)?.to_vec(),
    })
}

/// Traffic report body: four u32 counters.
pub fn decode_traffic_report(cur: &mut Cursor<'_>) -> Result<TrafficReport, CodecError> {
    cur.ensure(16)?;
    Ok(TrafficReport {
        datagrams_sent: cur.read_u32()?,
        bytes_sent: cur.read_u32()?,
        datagrams_received: cur.read_u32()?,
        bytes_received: cur.read_u32()?,
    })
}

// ============================================================================
// Datagram iteration
// ============================================================================

/// Iterator over the messages packed into one uplink datagram.
///
/// Yields each message in order and stops after the first error.
#[derive(Debug, Clone)]
pub struct UplinkMessages<'a> {
    cursor: Cursor<'a>,
    failed: bool,
}

impl<'a> UplinkMessages<'a> {
    /// Walk the messages in `datagram`.
    pub fn new(datagram: &'a [u8]) -> Self {
        UplinkMessages {
            cursor: Cursor::new(datagram),
            failed: false,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

impl Iterator for UplinkMessages<'_> {
    type Item = Result<UplinkMessage, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_exhausted() {
            return None;
        }
        let result = UplinkMessage::decode(&mut self.cursor);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for UplinkMessages<'_> {}
