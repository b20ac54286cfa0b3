//! Requests that can be sent to the device.

use crate::constants::*;
use crate::cursor::{Cursor, CursorMut};
use crate::error::CodecError;
use crate::registry::DownlinkKind;

/// Requests that can be sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DownlinkRequest {
    /// Reboot the device.
    Reboot {
        /// Come back up in development mode (true) or normal mode (false).
        dev_mode_on_not_off: bool,
    },

    /// Get the reporting interval and heartbeat.
    IntervalsGet,

    /// Set the interval at which sensor reports are sent.
    ReportingIntervalSet {
        /// Minutes between reports.
        reporting_interval_minutes: u32,
    },

    /// Set the interval at which sensor readings are taken.
    HeartbeatSet {
        /// Seconds between readings.
        heartbeat_seconds: u32,
    },

    /// Request a sensor report.
    SensorsReportGet,

    /// Request a traffic report.
    TrafficReportGet,
}

impl DownlinkRequest {
    /// The kind of this request.
    pub fn kind(&self) -> DownlinkKind {
        match self {
            DownlinkRequest::Reboot { .. } => DownlinkKind::Reboot,
            DownlinkRequest::IntervalsGet => DownlinkKind::IntervalsGet,
            DownlinkRequest::ReportingIntervalSet { .. } => DownlinkKind::ReportingIntervalSet,
            DownlinkRequest::HeartbeatSet { .. } => DownlinkKind::HeartbeatSet,
            DownlinkRequest::SensorsReportGet => DownlinkKind::SensorsReportGet,
            DownlinkRequest::TrafficReportGet => DownlinkKind::TrafficReportGet,
        }
    }

    /// Get the on-air identifier for this request.
    pub fn code(&self) -> u8 {
        self.kind().id()
    }

    /// Encoded size, identifier included. Fixed per kind.
    pub fn encoded_len(&self) -> usize {
        self.kind().encoded_len()
    }

    /// Encode into `out`, returning the number of bytes written.
    ///
    /// If `out` is smaller than [`encoded_len`](Self::encoded_len) nothing is
    /// written and `OutputTooShort` is returned.
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, CodecError> {
        let mut cur = CursorMut::new(out);
        cur.ensure(self.encoded_len())?;

        cur.write_u8(self.code())?;
        match self {
            DownlinkRequest::Reboot {
                dev_mode_on_not_off,
            } => {
                cur.write_bool(*dev_mode_on_not_off)?;
            }
            DownlinkRequest::ReportingIntervalSet {
                reporting_interval_minutes,
            } => {
                cur.write_u32(*reporting_interval_minutes)?;
            }
            DownlinkRequest::HeartbeatSet { heartbeat_seconds } => {
                cur.write_u32(*heartbeat_seconds)?;
            }
            DownlinkRequest::IntervalsGet
            | DownlinkRequest::SensorsReportGet
            | DownlinkRequest::TrafficReportGet => {}
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

    /// Decode a request starting at its identifier byte.
    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self, CodecError> {
        cur.ensure(MIN_MESSAGE_SIZE)?;
        let kind = DownlinkKind::try_from(cur.peek_u8()?)?;
        cur.ensure(kind.encoded_len())?;
        cur.read_u8()?;

        let request = match kind {
            DownlinkKind::Reboot => DownlinkRequest::Reboot {
                dev_mode_on_not_off: cur.read_bool()?,
            },
            DownlinkKind::IntervalsGet => DownlinkRequest::IntervalsGet,
            DownlinkKind::ReportingIntervalSet => DownlinkRequest::ReportingIntervalSet {
                reporting_interval_minutes: cur.read_u32()?,
            },
            DownlinkKind::HeartbeatSet => DownlinkRequest::HeartbeatSet {
                heartbeat_seconds: cur.read_u32()?,
            },
            DownlinkKind::SensorsReportGet => DownlinkRequest::SensorsReportGet,
            DownlinkKind::TrafficReportGet => DownlinkRequest::TrafficReportGet,
        };
        Ok(request)
    }

    /// Check interval values against what the device accepts.
    ///
    /// Encoding does not call this; a device clamps values it rejects.
    pub fn validate(&self) -> Result<(), CodecError> {
        match self {
            DownlinkRequest::ReportingIntervalSet {
                reporting_interval_minutes,
            } if *reporting_interval_minutes < MIN_REPORTING_INTERVAL_MINUTES => {
                Err(CodecError::failure(format!(
                    "reporting interval {} min is below minimum {}",
                    reporting_interval_minutes, MIN_REPORTING_INTERVAL_MINUTES
                )))
            }
            DownlinkRequest::HeartbeatSet { heartbeat_seconds }
                if *heartbeat_seconds < MIN_HEARTBEAT_SECONDS =>
            {
                Err(CodecError::failure(format!(
                    "heartbeat {} s is below minimum {}",
                    heartbeat_seconds, MIN_HEARTBEAT_SECONDS
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reboot_encoding() {
        let on = DownlinkRequest::Reboot {
            dev_mode_on_not_off: true,
        };
        assert_eq!(on.encode_to_vec(), vec![REBOOT_REQ_DL_MSG, 1]);

        let off = DownlinkRequest::Reboot {
            dev_mode_on_not_off: false,
        };
        assert_eq!(off.encode_to_vec(), vec![REBOOT_REQ_DL_MSG, 0]);
    }

    #[test]
    fn test_reporting_interval_set_encoding() {
        let req = DownlinkRequest::ReportingIntervalSet {
            reporting_interval_minutes: 30,
        };
        let mut buf = [0u8; 5];
        assert_eq!(req.encode(&mut buf).unwrap(), 5);
        assert_eq!(buf, [REPORTING_INTERVAL_SET_REQ_DL_MSG, 0, 0, 0, 30]);
    }

    #[test]
    fn test_heartbeat_set_encoding() {
        let req = DownlinkRequest::HeartbeatSet {
            heartbeat_seconds: 0x0102_0304,
        };
        assert_eq!(
            req.encode_to_vec(),
            vec![HEARTBEAT_SET_REQ_DL_MSG, 1, 2, 3, 4]
        );
    }

    #[test]
    fn test_identifier_only_requests() {
        for (req, id) in [
            (DownlinkRequest::IntervalsGet, INTERVALS_GET_REQ_DL_MSG),
            (DownlinkRequest::SensorsReportGet, SENSORS_REPORT_GET_REQ_DL_MSG),
            (DownlinkRequest::TrafficReportGet, TRAFFIC_REPORT_GET_REQ_DL_MSG),
        ] {
            assert_eq!(req.encode_to_vec(), vec![id]);
        }
    }

    #[test]
    fn test_length_independent_of_values() {
        for minutes in [0, 1, 255, 256, u32::MAX] {
            let req = DownlinkRequest::ReportingIntervalSet {
                reporting_interval_minutes: minutes,
            };
            assert_eq!(req.encode_to_vec().len(), 5);
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let req = DownlinkRequest::HeartbeatSet {
            heartbeat_seconds: 600,
        };
        let mut a = [0xAAu8; 8];
        let mut b = [0x55u8; 8];
        let n = req.encode(&mut a).unwrap();
        assert_eq!(req.encode(&mut b).unwrap(), n);
        assert_eq!(a[..n], b[..n]);
        // Bytes past the reported size are untouched.
        assert_eq!(a[n..], [0xAA; 3]);
    }

    #[test]
    fn test_output_too_short_writes_nothing() {
        let req = DownlinkRequest::ReportingIntervalSet {
            reporting_interval_minutes: 30,
        };
        let mut buf = [0u8; 4];
        assert_eq!(
            req.encode(&mut buf).unwrap_err(),
            CodecError::OutputTooShort {
                required: 5,
                available: 4
            }
        );
        assert_eq!(buf, [0; 4]);

        let mut empty: [u8; 0] = [];
        assert!(DownlinkRequest::IntervalsGet.encode(&mut empty).is_err());
    }

    #[test]
    fn test_decode_requests() {
        for req in [
            DownlinkRequest::Reboot {
                dev_mode_on_not_off: true,
            },
            DownlinkRequest::IntervalsGet,
            DownlinkRequest::ReportingIntervalSet {
                reporting_interval_minutes: 60,
            },
            DownlinkRequest::HeartbeatSet {
                heartbeat_seconds: 10,
            },
            DownlinkRequest::SensorsReportGet,
            DownlinkRequest::TrafficReportGet,
        ] {
            let buf = req.encode_to_vec();
            let mut cur = Cursor::new(&buf);
            assert_eq!(DownlinkRequest::decode(&mut cur).unwrap(), req);
            assert!(cur.is_exhausted());
        }
    }

    #[test]
    fn test_decode_truncated_request() {
        let buf = [HEARTBEAT_SET_REQ_DL_MSG, 0, 0];
        let mut cur = Cursor::new(&buf);
        assert!(matches!(
            DownlinkRequest::decode(&mut cur),
            Err(CodecError::InputTooShort { .. })
        ));
        assert_eq!(cur.position(), 0);

        let mut cur = Cursor::new(&[0x42]);
        assert_eq!(
            DownlinkRequest::decode(&mut cur),
            Err(CodecError::UnknownMessageId(0x42))
        );
    }

    #[test]
    fn test_validate() {
        assert!(DownlinkRequest::HeartbeatSet {
            heartbeat_seconds: 9
        }
        .validate()
        .is_err());
        assert!(DownlinkRequest::HeartbeatSet {
            heartbeat_seconds: MIN_HEARTBEAT_SECONDS
        }
        .validate()
        .is_ok());
        assert!(matches!(
            DownlinkRequest::ReportingIntervalSet {
                reporting_interval_minutes: 0
            }
            .validate(),
            Err(CodecError::Failure(_))
        ));
        assert!(DownlinkRequest::IntervalsGet.validate().is_ok());

        // Out-of-range values still encode.
        let req = DownlinkRequest::HeartbeatSet {
            heartbeat_seconds: 1,
        };
        assert_eq!(req.encode_to_vec().len(), 5);
    }
}
