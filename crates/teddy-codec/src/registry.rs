//! Message identifiers and uplink classification.

use std::fmt;

use crate::constants::*;
use crate::error::{CodecError, DecodeResult};

/// The uplink message kinds (device → host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UplinkKind {
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

impl UplinkKind {
    /// Every uplink kind, in identifier order.
    pub const ALL: [UplinkKind; 10] = [
        UplinkKind::InitInd,
        UplinkKind::IntervalsGetCnf,
        UplinkKind::ReportingIntervalSetCnf,
        UplinkKind::HeartbeatSetCnf,
        UplinkKind::PollInd,
        UplinkKind::SensorsReportGetCnf,
        UplinkKind::SensorsReportInd,
        UplinkKind::DebugInd,
        UplinkKind::TrafficReportGetCnf,
        UplinkKind::TrafficReportInd,
    ];

    /// The on-air identifier byte.
    pub fn id(&self) -> u8 {
        match self {
            UplinkKind::InitInd => INIT_IND_UL_MSG,
            UplinkKind::IntervalsGetCnf => INTERVALS_GET_CNF_UL_MSG,
            UplinkKind::ReportingIntervalSetCnf => REPORTING_INTERVAL_SET_CNF_UL_MSG,
            UplinkKind::HeartbeatSetCnf => HEARTBEAT_SET_CNF_UL_MSG,
            UplinkKind::PollInd => POLL_IND_UL_MSG,
            UplinkKind::SensorsReportGetCnf => SENSORS_REPORT_GET_CNF_UL_MSG,
            UplinkKind::SensorsReportInd => SENSORS_REPORT_IND_UL_MSG,
            UplinkKind::DebugInd => DEBUG_IND_UL_MSG,
            UplinkKind::TrafficReportGetCnf => TRAFFIC_REPORT_GET_CNF_UL_MSG,
            UplinkKind::TrafficReportInd => TRAFFIC_REPORT_IND_UL_MSG,
        }
    }

    /// Look up a kind by identifier byte.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    /// Smallest encoded size, identifier included.
    pub fn min_size(&self) -> usize {
        match self {
            UplinkKind::InitInd => 4,
            UplinkKind::IntervalsGetCnf => 9,
            UplinkKind::ReportingIntervalSetCnf | UplinkKind::HeartbeatSetCnf => 5,
            UplinkKind::PollInd => 1,
            // time + bytesToFollow + one bitmap byte
            UplinkKind::SensorsReportGetCnf | UplinkKind::SensorsReportInd => 7,
            UplinkKind::DebugInd => 5,
            UplinkKind::TrafficReportGetCnf | UplinkKind::TrafficReportInd => 17,
        }
    }

    /// Name as used in trace output.
    pub fn name(&self) -> &'static str {
        match self {
            UplinkKind::InitInd => "InitIndUlMsg",
            UplinkKind::IntervalsGetCnf => "IntervalsGetCnfUlMsg",
            UplinkKind::ReportingIntervalSetCnf => "ReportingIntervalSetCnfUlMsg",
            UplinkKind::HeartbeatSetCnf => "HeartbeatSetCnfUlMsg",
            UplinkKind::PollInd => "PollIndUlMsg",
            UplinkKind::SensorsReportGetCnf => "SensorsReportGetCnfUlMsg",
            UplinkKind::SensorsReportInd => "SensorsReportIndUlMsg",
            UplinkKind::DebugInd => "DebugIndUlMsg",
            UplinkKind::TrafficReportGetCnf => "TrafficReportGetCnfUlMsg",
            UplinkKind::TrafficReportInd => "TrafficReportIndUlMsg",
        }
    }
}

impl fmt::Display for UplinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u8> for UplinkKind {
    type Error = CodecError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        UplinkKind::from_id(id).ok_or(CodecError::UnknownMessageId(id))
    }
}

/// The downlink request kinds (host → device).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DownlinkKind {
    /// Reboot the device.
    Reboot,
    /// Get the reporting interval and heartbeat.
    IntervalsGet,
    /// Set the reporting interval.
    ReportingIntervalSet,
    /// Set the heartbeat.
    HeartbeatSet,
    /// Request a sensor report.
    SensorsReportGet,
    /// Request a traffic report.
    TrafficReportGet,
}

impl DownlinkKind {
    /// Every downlink kind, in identifier order.
    pub const ALL: [DownlinkKind; 6] = [
        DownlinkKind::Reboot,
        DownlinkKind::IntervalsGet,
        DownlinkKind::ReportingIntervalSet,
        DownlinkKind::HeartbeatSet,
        DownlinkKind::SensorsReportGet,
        DownlinkKind::TrafficReportGet,
    ];

    /// The on-air identifier byte.
    pub fn id(&self) -> u8 {
        match self {
            DownlinkKind::Reboot => REBOOT_REQ_DL_MSG,
            DownlinkKind::IntervalsGet => INTERVALS_GET_REQ_DL_MSG,
            DownlinkKind::ReportingIntervalSet => REPORTING_INTERVAL_SET_REQ_DL_MSG,
            DownlinkKind::HeartbeatSet => HEARTBEAT_SET_REQ_DL_MSG,
            DownlinkKind::SensorsReportGet => SENSORS_REPORT_GET_REQ_DL_MSG,
            DownlinkKind::TrafficReportGet => TRAFFIC_REPORT_GET_REQ_DL_MSG,
        }
    }

    /// Look up a kind by identifier byte.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    /// Encoded size, identifier included. Never depends on field values.
    pub const fn encoded_len(&self) -> usize {
        match self {
            DownlinkKind::Reboot => 2,
            DownlinkKind::ReportingIntervalSet | DownlinkKind::HeartbeatSet => 5,
            DownlinkKind::IntervalsGet
            | DownlinkKind::SensorsReportGet
            | DownlinkKind::TrafficReportGet => 1,
        }
    }

    /// Name as used in trace output.
    pub fn name(&self) -> &'static str {
        match self {
            DownlinkKind::Reboot => "RebootReqDlMsg",
            DownlinkKind::IntervalsGet => "IntervalsGetReqDlMsg",
            DownlinkKind::ReportingIntervalSet => "ReportingIntervalSetReqDlMsg",
            DownlinkKind::HeartbeatSet => "HeartbeatSetReqDlMsg",
            DownlinkKind::SensorsReportGet => "SensorsReportGetReqDlMsg",
            DownlinkKind::TrafficReportGet => "TrafficReportGetReqDlMsg",
        }
    }
}

impl fmt::Display for DownlinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u8> for DownlinkKind {
    type Error = CodecError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        DownlinkKind::from_id(id).ok_or(CodecError::UnknownMessageId(id))
    }
}

/// Identify the uplink message at the start of `buf` without decoding it.
pub fn identify(buf: &[u8]) -> Result<UplinkKind, CodecError> {
    match buf.first() {
        None => Err(CodecError::InputTooShort {
            needed: MIN_MESSAGE_SIZE,
            available: 0,
        }),
        Some(&id) => UplinkKind::try_from(id),
    }
}

/// Classify the uplink message at the start of `buf`.
///
/// Only the identifier byte is inspected; a classified message may still
/// fail its full decode.
pub fn classify(buf: &[u8]) -> DecodeResult {
    identify(buf).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uplink_ids_are_distinct() {
        for (i, kind) in UplinkKind::ALL.iter().enumerate() {
            assert_eq!(kind.id() as usize, i);
            assert_eq!(UplinkKind::from_id(kind.id()), Some(*kind));
        }
        assert_eq!(UplinkKind::from_id(10), None);
    }

    #[test]
    fn test_downlink_ids_are_distinct() {
        for (i, kind) in DownlinkKind::ALL.iter().enumerate() {
            assert_eq!(kind.id() as usize, i);
            assert_eq!(DownlinkKind::try_from(kind.id()), Ok(*kind));
        }
        assert_eq!(
            DownlinkKind::try_from(6),
            Err(CodecError::UnknownMessageId(6))
        );
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(&[]), DecodeResult::InputTooShort);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify(&[0xFF, 0x00, 0x00]), DecodeResult::UnknownMessageId);
        for id in 10..=u8::MAX {
            assert_eq!(classify(&[id]), DecodeResult::UnknownMessageId);
        }
    }

    #[test]
    fn test_classify_known_ignores_body() {
        // Truncated body still classifies; only the identifier is inspected.
        assert_eq!(classify(&[TRAFFIC_REPORT_IND_UL_MSG]), DecodeResult::TrafficReportInd);
        assert_eq!(classify(&[POLL_IND_UL_MSG, 0xEE]), DecodeResult::PollInd);
        assert_eq!(classify(&[DEBUG_IND_UL_MSG]), DecodeResult::DebugInd);
    }
}
