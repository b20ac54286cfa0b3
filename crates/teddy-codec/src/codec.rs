//! The host-facing codec.
//!
//! [`MessageCodec`] is the operation set a host application drives: sizing
//! queries, one encoder per downlink request, classification, and one
//! decoder per uplink message. Every call is synchronous and works only on
//! buffers the caller owns.
//!
//! Hosts that want to swap implementations hold a `Box<dyn DeviceCodec>`
//! chosen at construction instead of a concrete `MessageCodec`.

use std::fmt::Debug;
use std::sync::Arc;

use crate::constants::*;
use crate::cursor::Cursor;
use crate::downlink::DownlinkRequest;
use crate::error::{CodecError, DecodeResult};
use crate::registry::{self, UplinkKind};
use crate::sizing::SizingOracle;
use crate::trace::{TraceCategory, TraceConfig, TraceSink, Tracer};
use crate::types::*;
use crate::uplink::{self, UplinkMessage};

/// Line sent to a sink when it is registered.
pub const READY_TRACE: &str = "MessageCodec::ready.";

/// The operation set a device codec offers a host.
pub trait DeviceCodec: Send + Sync {
    /// Largest datagram the link carries.
    fn max_datagram_size(&self) -> u32 {
        SizingOracle::max_datagram_size()
    }

    /// Largest debug string a DebugInd may carry.
    fn max_debug_string_size(&self) -> u32 {
        SizingOracle::max_debug_string_size()
    }

    /// Revision level of the message protocol.
    fn revision_level(&self) -> u32 {
        SizingOracle::revision_level()
    }

    /// Encode a downlink request into `out`, returning the bytes written.
    fn encode_request(
        &self,
        request: &DownlinkRequest,
        out: &mut [u8],
    ) -> Result<usize, CodecError>;

    /// Classify the uplink message at the start of `buf`.
    fn classify(&self, buf: &[u8]) -> DecodeResult;

    /// Decode the uplink message at the cursor, whatever its kind.
    fn decode_message(&self, cur: &mut Cursor<'_>) -> Result<UplinkMessage, CodecError>;
}

/// Teddy message codec.
///
/// Holds only its trace configuration and optional sink; encoding and
/// decoding keep no state between calls.
#[derive(Debug, Clone, Default)]
pub struct MessageCodec {
    tracer: Tracer,
}

impl MessageCodec {
    /// Create a codec with every trace category enabled and no sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` to filter trace output.
    pub fn with_trace_config(mut self, config: TraceConfig) -> Self {
        self.tracer.set_config(config);
        self
    }

    /// Register a trace sink.
    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.set_trace_sink(sink);
        self
    }

    /// Register a trace sink, replacing any previous one.
    pub fn set_trace_sink(&mut self, sink: Arc<dyn TraceSink>) {
        self.tracer.set_sink(sink);
        self.tracer.announce(READY_TRACE);
    }

    /// Drop the trace sink. Diagnostics are discarded from now on.
    pub fn clear_trace_sink(&mut self) {
        self.tracer.clear_sink();
    }

    /// Get the trace configuration.
    pub fn trace_config(&self) -> &TraceConfig {
        self.tracer.config()
    }

    /// Replace the trace configuration.
    pub fn set_trace_config(&mut self, config: TraceConfig) {
        self.tracer.set_config(config);
    }

    // ========================================================================
    // Downlink encoders
    // ========================================================================

    /// Encode a Reboot request.
    pub fn encode_reboot(
        &self,
        dev_mode_on_not_off: bool,
        out: &mut [u8],
    ) -> Result<usize, CodecError> {
        self.encode_request(
            &DownlinkRequest::Reboot {
                dev_mode_on_not_off,
            },
            out,
        )
    }

    /// Encode an IntervalsGet request.
    pub fn encode_intervals_get(&self, out: &mut [u8]) -> Result<usize, CodecError> {
        self.encode_request(&DownlinkRequest::IntervalsGet, out)
    }

    /// Encode a ReportingIntervalSet request.
    pub fn encode_reporting_interval_set(
        &self,
        reporting_interval_minutes: u32,
        out: &mut [u8],
    ) -> Result<usize, CodecError> {
        self.encode_request(
            &DownlinkRequest::ReportingIntervalSet {
                reporting_interval_minutes,
            },
            out,
        )
    }

    /// Encode a HeartbeatSet request.
    pub fn encode_heartbeat_set(
        &self,
        heartbeat_seconds: u32,
        out: &mut [u8],
    ) -> Result<usize, CodecError> {
        self.encode_request(&DownlinkRequest::HeartbeatSet { heartbeat_seconds }, out)
    }

    /// Encode a SensorsReportGet request.
    pub fn encode_sensors_report_get(&self, out: &mut [u8]) -> Result<usize, CodecError> {
        self.encode_request(&DownlinkRequest::SensorsReportGet, out)
    }

    /// Encode a TrafficReportGet request.
    pub fn encode_traffic_report_get(&self, out: &mut [u8]) -> Result<usize, CodecError> {
        self.encode_request(&DownlinkRequest::TrafficReportGet, out)
    }

    /// Encode an uplink message, as a device would.
    pub fn encode_uplink(
        &self,
        message: &UplinkMessage,
        out: &mut [u8],
    ) -> Result<usize, CodecError> {
        let kind = message.kind();
        let result = message.encode(out);
        self.trace_encode(kind.name(), kind.id(), &result);
        result
    }

    // ========================================================================
    // Uplink decoders
    // ========================================================================

    /// Decode an InitInd.
    pub fn decode_init_ind(&self, cur: &mut Cursor<'_>) -> Result<InitInd, CodecError> {
        self.decode_kind(UplinkKind::InitInd, cur, uplink::decode_init_ind)
    }

    /// Decode an IntervalsGetCnf.
    pub fn decode_intervals_get_cnf(
        &self,
        cur: &mut Cursor<'_>,
    ) -> Result<IntervalsGetCnf, CodecError> {
        self.decode_kind(
            UplinkKind::IntervalsGetCnf,
            cur,
            uplink::decode_intervals_get_cnf,
        )
    }

    /// Decode a ReportingIntervalSetCnf.
    pub fn decode_reporting_interval_set_cnf(
        &self,
        cur: &mut Cursor<'_>,
    ) -> Result<ReportingIntervalSetCnf, CodecError> {
        self.decode_kind(
            UplinkKind::ReportingIntervalSetCnf,
            cur,
            uplink::decode_reporting_interval_set_cnf,
        )
    }

    /// Decode a HeartbeatSetCnf.
    pub fn decode_heartbeat_set_cnf(
        &self,
        cur: &mut Cursor<'_>,
    ) -> Result<HeartbeatSetCnf, CodecError> {
        self.decode_kind(
            UplinkKind::HeartbeatSetCnf,
            cur,
            uplink::decode_heartbeat_set_cnf,
        )
    }

    /// Decode a PollInd. The identifier is the whole message.
    pub fn decode_poll_ind(&self, cur: &mut Cursor<'_>) -> Result<(), CodecError> {
        self.decode_kind(UplinkKind::PollInd, cur, |_| Ok(()))
    }

    /// Decode a SensorsReportGetCnf.
    pub fn decode_sensors_report_get_cnf(
        &self,
        cur: &mut Cursor<'_>,
    ) -> Result<SensorReadings, CodecError> {
        self.decode_kind(UplinkKind::SensorsReportGetCnf, cur, SensorReadings::decode)
    }

    /// Decode a SensorsReportInd.
    pub fn decode_sensors_report_ind(
        &self,
        cur: &mut Cursor<'_>,
    ) -> Result<SensorReadings, CodecError> {
        self.decode_kind(UplinkKind::SensorsReportInd, cur, SensorReadings::decode)
    }

    /// Decode a DebugInd.
    pub fn decode_debug_ind(&self, cur: &mut Cursor<'_>) -> Result<DebugInd, CodecError> {
        self.decode_kind(UplinkKind::DebugInd, cur, uplink::decode_debug_ind)
    }

    /// Decode a TrafficReportGetCnf.
    pub fn decode_traffic_report_get_cnf(
        &self,
        cur: &mut Cursor<'_>,
    ) -> Result<TrafficReport, CodecError> {
        self.decode_kind(
            UplinkKind::TrafficReportGetCnf,
            cur,
            uplink::decode_traffic_report,
        )
    }

    /// Decode a TrafficReportInd.
    pub fn decode_traffic_report_ind(
        &self,
        cur: &mut Cursor<'_>,
    ) -> Result<TrafficReport, CodecError> {
        self.decode_kind(
            UplinkKind::TrafficReportInd,
            cur,
            uplink::decode_traffic_report,
        )
    }

    /// Check the identifier at the cursor names `kind`, then decode the body.
    fn decode_kind<T, F>(
        &self,
        kind: UplinkKind,
        cur: &mut Cursor<'_>,
        body: F,
    ) -> Result<T, CodecError>
    where
        T: Debug,
        F: FnOnce(&mut Cursor<'_>) -> Result<T, CodecError>,
    {
        let start = cur.position();
        let result = expect_kind(kind, cur).and_then(|()| body(cur));
        self.trace_decode(kind.name(), kind.id(), cur.position() - start, &result);
        result
    }

    // ========================================================================
    // Tracing
    // ========================================================================

    fn trace_encode(&self, name: &str, id: u8, result: &Result<usize, CodecError>) {
        match result {
            Ok(written) => {
                if self.tracing(TraceCategory::Encode) {
                    self.tracer.log(
                        TraceCategory::Encode,
                        &format!("Encoding {}, ID 0x{:02x}, {} bytes encoded.", name, id, written),
                    );
                }
            }
            Err(err) => self.trace_error("Encoding", name, id, err),
        }
    }

    fn trace_decode<T: Debug>(
        &self,
        name: &str,
        id: u8,
        consumed: usize,
        result: &Result<T, CodecError>,
    ) {
        match result {
            Ok(value) => {
                if self.tracing(TraceCategory::Decode) {
                    self.tracer.log(
                        TraceCategory::Decode,
                        &format!(
                            "Decoding {}, ID 0x{:02x}, {} bytes decoded: {:?}",
                            name, id, consumed, value
                        ),
                    );
                }
            }
            Err(err) => self.trace_error("Decoding", name, id, err),
        }
    }

    fn trace_error(&self, action: &str, name: &str, id: u8, err: &CodecError) {
        if self.tracing(TraceCategory::Error) {
            self.tracer.log(
                TraceCategory::Error,
                &format!("{} {}, ID 0x{:02x}, failed: {}.", action, name, id, err),
            );
        }
    }

    /// Whether a line in `category` would go anywhere, so formatting can be
    /// skipped otherwise.
    fn tracing(&self, category: TraceCategory) -> bool {
        let level = match category {
            TraceCategory::Error => log::Level::Debug,
            _ => log::Level::Trace,
        };
        self.tracer.would_emit(category) || log::log_enabled!(level)
    }
}

impl DeviceCodec for MessageCodec {
    fn encode_request(
        &self,
        request: &DownlinkRequest,
        out: &mut [u8],
    ) -> Result<usize, CodecError> {
        let kind = request.kind();
        let result = request.encode(out);
        self.trace_encode(kind.name(), kind.id(), &result);
        result
    }

    fn classify(&self, buf: &[u8]) -> DecodeResult {
        let result = registry::classify(buf);
        if !result.is_success() && self.tracing(TraceCategory::Error) {
            self.tracer.log(
                TraceCategory::Error,
                &format!("Classifying {} bytes failed: {}.", buf.len(), result),
            );
        }
        result
    }

    fn decode_message(&self, cur: &mut Cursor<'_>) -> Result<UplinkMessage, CodecError> {
        let start = cur.position();
        let id = cur.peek_u8().ok();
        let result = UplinkMessage::decode(cur);
        let consumed = cur.position() - start;
        match (&result, id.and_then(UplinkKind::from_id)) {
            (_, Some(kind)) => self.trace_decode(kind.name(), kind.id(), consumed, &result),
            (Err(err), None) => {
                self.trace_error("Decoding", "message", id.unwrap_or_default(), err)
            }
            (Ok(_), None) => {}
        }
        result
    }
}

fn expect_kind(kind: UplinkKind, cur: &mut Cursor<'_>) -> Result<(), CodecError> {
    cur.ensure(MIN_MESSAGE_SIZE)?;
    let found = UplinkKind::try_from(cur.peek_u8()?)?;
    if found != kind {
        return Err(CodecError::failure(format!(
            "expected {} but found {}",
            kind, found
        )));
    }
    cur.read_u8()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collecting_codec() -> (MessageCodec, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let codec = MessageCodec::new().with_trace_sink(Arc::new(move |text: &str| {
            captured.lock().unwrap().push(text.to_string());
        }));
        (codec, lines)
    }

    #[test]
    fn test_sizing_accessors() {
        let codec = MessageCodec::new();
        assert_eq!(codec.max_datagram_size(), MAX_DATAGRAM_SIZE_RAW as u32);
        assert_eq!(codec.max_debug_string_size(), MAX_DEBUG_STRING_SIZE as u32);
        assert_eq!(codec.revision_level(), REVISION_LEVEL);
    }

    #[test]
    fn test_encoders_report_fixed_size() {
        let codec = MessageCodec::new();
        let mut buf = [0u8; MAX_DATAGRAM_SIZE_RAW];
        assert_eq!(codec.encode_reboot(true, &mut buf).unwrap(), 2);
        assert_eq!(codec.encode_intervals_get(&mut buf).unwrap(), 1);
        assert_eq!(codec.encode_reporting_interval_set(30, &mut buf).unwrap(), 5);
        assert_eq!(codec.encode_heartbeat_set(60, &mut buf).unwrap(), 5);
        assert_eq!(codec.encode_sensors_report_get(&mut buf).unwrap(), 1);
        assert_eq!(codec.encode_traffic_report_get(&mut buf).unwrap(), 1);
    }

    #[test]
    fn test_decode_wrong_kind_is_failure() {
        let codec = MessageCodec::new();
        let buf = [POLL_IND_UL_MSG];
        let mut cur = Cursor::new(&buf);
        let err = codec.decode_init_ind(&mut cur).unwrap_err();
        assert_eq!(err.decode_result(), DecodeResult::Failure);
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_decode_unknown_kind() {
        let codec = MessageCodec::new();
        let mut cur = Cursor::new(&[0xFF]);
        assert_eq!(
            codec.decode_poll_ind(&mut cur),
            Err(CodecError::UnknownMessageId(0xFF))
        );

        let empty: [u8; 0] = [];
        let mut cur = Cursor::new(&empty);
        assert!(matches!(
            codec.decode_poll_ind(&mut cur),
            Err(CodecError::InputTooShort { .. })
        ));
    }

    #[test]
    fn test_decode_each_kind() {
        let codec = MessageCodec::new();
        let mut buf = [0u8; MAX_DATAGRAM_SIZE_RAW];

        let n = codec
            .encode_uplink(
                &UplinkMessage::IntervalsGetCnf(IntervalsGetCnf {
                    reporting_interval_minutes: 15,
                    heartbeat_seconds: 30,
                }),
                &mut buf,
            )
            .unwrap();
        let cnf = codec
            .decode_intervals_get_cnf(&mut Cursor::new(&buf[..n]))
            .unwrap();
        assert_eq!(cnf.reporting_interval_minutes, 15);
        assert_eq!(cnf.heartbeat_seconds, 30);

        let n = codec
            .encode_uplink(&UplinkMessage::DebugInd(DebugInd::new("hi")), &mut buf)
            .unwrap();
        let debug = codec.decode_debug_ind(&mut Cursor::new(&buf[..n])).unwrap();
        assert_eq!(debug.text(), "hi");

        let report = TrafficReport {
            datagrams_sent: 9,
            ..Default::default()
        };
        let n = codec
            .encode_uplink(&UplinkMessage::TrafficReportGetCnf(report), &mut buf)
            .unwrap();
        assert_eq!(
            codec
                .decode_traffic_report_get_cnf(&mut Cursor::new(&buf[..n]))
                .unwrap(),
            report
        );
    }

    #[test]
    fn test_ready_trace_on_registration() {
        let (_codec, lines) = collecting_codec();
        assert_eq!(*lines.lock().unwrap(), vec![READY_TRACE]);
    }

    #[test]
    fn test_encode_trace_line() {
        let (codec, lines) = collecting_codec();
        let mut buf = [0u8; 8];
        codec.encode_heartbeat_set(60, &mut buf).unwrap();
        let lines = lines.lock().unwrap();
        assert_eq!(
            lines.last().unwrap(),
            "Encoding HeartbeatSetReqDlMsg, ID 0x03, 5 bytes encoded."
        );
    }

    #[test]
    fn test_trace_config_filters_sink() {
        let (codec, lines) = collecting_codec();
        let codec = codec.with_trace_config(TraceConfig::from_spec("error"));
        let mut buf = [0u8; 8];
        codec.encode_intervals_get(&mut buf).unwrap();
        assert!(codec.encode_heartbeat_set(60, &mut buf[..2]).is_err());

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Encoding HeartbeatSetReqDlMsg"));
        assert!(lines[1].contains("output too short"));
    }

    #[test]
    fn test_clear_trace_sink() {
        let (mut codec, lines) = collecting_codec();
        codec.clear_trace_sink();
        codec.encode_intervals_get(&mut [0u8; 1]).unwrap();
        assert_eq!(lines.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_boxed_strategy() {
        let codec: Box<dyn DeviceCodec> = Box::new(MessageCodec::new());
        assert_eq!(codec.classify(&[POLL_IND_UL_MSG]), DecodeResult::PollInd);

        let mut buf = [0u8; 2];
        let n = codec
            .encode_request(
                &DownlinkRequest::Reboot {
                    dev_mode_on_not_off: false,
                },
                &mut buf,
            )
            .unwrap();
        assert_eq!(&buf[..n], &[REBOOT_REQ_DL_MSG, 0]);

        let mut cur = Cursor::new(&[POLL_IND_UL_MSG]);
        assert_eq!(codec.decode_message(&mut cur), Ok(UplinkMessage::PollInd));
    }
}
