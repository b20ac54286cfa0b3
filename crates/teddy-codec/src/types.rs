//! Payload types carried by teddy messages.

use std::borrow::Cow;

use crate::constants::*;

/// Why the device last woke up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WakeUpCode {
    /// A good wake-up, no problems.
    Ok,
    /// The watchdog fired.
    Watchdog,
    /// Assert after AT command problems.
    AtCommandProblem,
    /// Assert after problems sending to the network.
    NetworkSendProblem,
    /// Assert after memory allocation problems.
    MemoryAllocProblem,
    /// Assert after a protocol problem.
    ProtocolProblem,
    /// A generic failure.
    GenericFailure,
    /// A commanded reboot.
    Reboot,
    /// Not a code this revision knows about.
    Unknown(u32),
}

impl From<u32> for WakeUpCode {
    fn from(code: u32) -> Self {
        match code {
            0 => WakeUpCode::Ok,
            1 => WakeUpCode::Watchdog,
            2 => WakeUpCode::AtCommandProblem,
            3 => WakeUpCode::NetworkSendProblem,
            4 => WakeUpCode::MemoryAllocProblem,
            5 => WakeUpCode::ProtocolProblem,
            6 => WakeUpCode::GenericFailure,
            7 => WakeUpCode::Reboot,
            other => WakeUpCode::Unknown(other),
        }
    }
}

impl From<WakeUpCode> for u32 {
    fn from(code: WakeUpCode) -> Self {
        match code {
            WakeUpCode::Ok => 0,
            WakeUpCode::Watchdog => 1,
            WakeUpCode::AtCommandProblem => 2,
            WakeUpCode::NetworkSendProblem => 3,
            WakeUpCode::MemoryAllocProblem => 4,
            WakeUpCode::ProtocolProblem => 5,
            WakeUpCode::GenericFailure => 6,
            WakeUpCode::Reboot => 7,
            WakeUpCode::Unknown(other) => other,
        }
    }
}

/// Device orientation (4 bits on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Orientation could not be determined.
    Uncertain,
    /// Lying on its back.
    FaceUp,
    /// Lying on its front.
    FaceDown,
    /// Sitting up.
    Upright,
    /// Standing on its head.
    UpsideDown,
    /// Lying on its left side.
    OnLeftSide,
    /// Lying on its right side.
    OnRightSide,
    /// Not an orientation this revision knows about.
    Unknown(u32),
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            0 => Orientation::Uncertain,
            1 => Orientation::FaceUp,
            2 => Orientation::FaceDown,
            3 => Orientation::Upright,
            4 => Orientation::UpsideDown,
            5 => Orientation::OnLeftSide,
            6 => Orientation::OnRightSide,
            other => Orientation::Unknown(other),
        }
    }
}

/// Charger state (2 bits on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChargeState {
    /// Charger state not known.
    Unknown,
    /// Not charging.
    Off,
    /// Charging.
    On,
    /// Charger reports a fault.
    Fault,
    /// Out of the 2-bit range; only reachable from a hand-built value.
    Invalid(u32),
}

impl From<u32> for ChargeState {
    fn from(value: u32) -> Self {
        match value {
            0 => ChargeState::Unknown,
            1 => ChargeState::Off,
            2 => ChargeState::On,
            3 => ChargeState::Fault,
            other => ChargeState::Invalid(other),
        }
    }
}

/// GPS position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsPosition {
    /// Thousandths of a minute of arc (divide by 60,000 for degrees).
    pub latitude: i32,
    /// Thousandths of a minute of arc (divide by 60,000 for degrees).
    pub longitude: i32,
    /// Metres.
    pub elevation: i32,
    /// km/h.
    pub speed: i32,
}

/// Local position and handling counters for the last period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LclPosition {
    /// Raw orientation, see [`Orientation`]. 0..=15.
    pub orientation: u32,
    /// 0..=15.
    pub hugs_this_period: u32,
    /// 0..=15.
    pub slaps_this_period: u32,
    /// 0..=15.
    pub drops_this_period: u32,
    /// 0..=255.
    pub nudges_this_period: u32,
}

impl LclPosition {
    /// Typed view of `orientation`.
    pub fn orientation(&self) -> Orientation {
        Orientation::from(self.orientation)
    }
}

/// Power state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerState {
    /// Raw charger state, see [`ChargeState`]. 0..=3.
    pub charge_state: u32,
    /// Battery voltage in mV, carried at a resolution of 10000/63 mV.
    pub battery_mv: u32,
    /// Energy used since the last reading, in uAh (16 bits signed on the wire).
    pub energy_uah: i32,
}

impl PowerState {
    /// Typed view of `charge_state`.
    pub fn charge_state(&self) -> ChargeState {
        ChargeState::from(self.charge_state)
    }
}

/// One set of sensor readings. Absent groups are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReadings {
    /// UTC seconds.
    pub time: u32,
    /// GPS fix, if taken.
    pub gps_position: Option<GpsPosition>,
    /// Orientation and handling counters.
    pub lcl_position: Option<LclPosition>,
    /// 0 for none, 0xFFFF maximum.
    pub sound_level: Option<u32>,
    /// Lux, 0..=0xFFFF.
    pub luminosity: Option<u32>,
    /// Centigrade, -128..=127.
    pub temperature: Option<i32>,
    /// As defined for AT+CSQ, at most [`MAX_RSSI`].
    pub rssi: Option<u32>,
    /// Charger, battery and energy use.
    pub power_state: Option<PowerState>,
}

/// Device initialised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitInd {
    /// Raw wake-up reason, see [`WakeUpCode`].
    pub wake_up_code: u32,
    /// Protocol revision the device speaks.
    pub revision: u32,
}

impl InitInd {
    /// Typed view of `wake_up_code`.
    pub fn wake_up(&self) -> WakeUpCode {
        WakeUpCode::from(self.wake_up_code)
    }
}

/// Reporting interval and heartbeat currently in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalsGetCnf {
    /// Minutes between sensor reports.
    pub reporting_interval_minutes: u32,
    /// Seconds between sensor readings.
    pub heartbeat_seconds: u32,
}

/// Reporting interval now in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportingIntervalSetCnf {
    /// Minutes between sensor reports.
    pub reporting_interval_minutes: u32,
}

/// Heartbeat now in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartbeatSetCnf {
    /// Seconds between sensor readings.
    pub heartbeat_seconds: u32,
}

/// Traffic counters since the last InitInd.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficReport {
    /// Uplink datagrams sent.
    pub datagrams_sent: u32,
    /// Uplink bytes sent.
    pub bytes_sent: u32,
    /// Downlink datagrams received.
    pub datagrams_received: u32,
    /// Downlink bytes received.
    pub bytes_received: u32,
}

/// A debug string from the device.
///
/// The bytes are not NUL-terminated and need not be UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugInd {
    /// Raw string bytes, at most [`MAX_DEBUG_STRING_SIZE`].
    pub bytes: Vec<u8>,
}

impl DebugInd {
    /// Build from text, truncated to [`MAX_DEBUG_STRING_SIZE`] bytes.
    pub fn new(text: impl AsRef<[u8]>) -> Self {
        let text = text.as_ref();
        let len = text.len().min(MAX_DEBUG_STRING_SIZE);
        DebugInd {
            bytes: text[..len].to_vec(),
        }
    }

    /// Lossy UTF-8 view of the string.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}
