//! Sensor report encoding and decoding.
//!
//! ```text
//! +----------+---------------+-----------+-------------+------------------+
//! | time u32 | bytesToFollow | bitmap0   | [bitmapN].. | [item]...        |
//! +----------+---------------+-----------+-------------+------------------+
//! ```
//!
//! `bytesToFollow` counts everything after itself. Bit 7 of a bitmap byte
//! says another bitmap byte follows. Items appear in bitmap-bit order and
//! only when their bit is set:
//!
//! | bit  | item         | size | layout                                         |
//! |------|--------------|------|------------------------------------------------|
//! | 0x01 | GPS position | 16   | lat, lon, elevation, speed (i32 each)          |
//! | 0x02 | local        | 3    | orient:4 hugs:4, slaps:4 drops:4, nudges:8     |
//! | 0x04 | sound level  | 2    | u16                                            |
//! | 0x08 | luminosity   | 2    | u16                                            |
//! | 0x10 | temperature  | 1    | i8                                             |
//! | 0x20 | RSSI         | 1    | u8                                             |
//! | 0x40 | power state  | 3    | battery:6 charge:2, energy i16                 |

use crate::constants::*;
use crate::cursor::{Cursor, CursorMut};
use crate::error::CodecError;
use crate::types::*;

/// time + bytesToFollow + first bitmap byte.
pub const SENSOR_REPORT_MIN_SIZE: usize = 6;

impl SensorReadings {
    /// Presence bitmap for the groups that are `Some`.
    pub fn bitmap(&self) -> u8 {
        let mut bitmap = 0;
        if self.gps_position.is_some() {
            bitmap |= SENSOR_BIT_GPS_POSITION;
        }
        if self.lcl_position.is_some() {
            bitmap |= SENSOR_BIT_LCL_POSITION;
        }
        if self.sound_level.is_some() {
            bitmap |= SENSOR_BIT_SOUND_LEVEL;
        }
        if self.luminosity.is_some() {
            bitmap |= SENSOR_BIT_LUMINOSITY;
        }
        if self.temperature.is_some() {
            bitmap |= SENSOR_BIT_TEMPERATURE;
        }
        if self.rssi.is_some() {
            bitmap |= SENSOR_BIT_RSSI;
        }
        if self.power_state.is_some() {
            bitmap |= SENSOR_BIT_POWER_STATE;
        }
        bitmap
    }

    /// Encoded size of the readings, excluding the message identifier.
    pub fn encoded_len(&self) -> usize {
        let mut len = SENSOR_REPORT_MIN_SIZE;
        if self.gps_position.is_some() {
            len += GPS_POSITION_SIZE;
        }
        if self.lcl_position.is_some() {
            len += LCL_POSITION_SIZE;
        }
        if self.sound_level.is_some() {
            len += 2;
        }
        if self.luminosity.is_some() {
            len += 2;
        }
        if self.temperature.is_some() {
            len += 1;
        }
        if self.rssi.is_some() {
            len += 1;
        }
        if self.power_state.is_some() {
            len += POWER_STATE_SIZE;
        }
        len
    }

    /// Encode the readings. Out-of-range values are clamped to what the
    /// wire can carry.
    ///
    /// Nothing is written if `out` lacks room for the whole report.
    pub fn encode(&self, out: &mut CursorMut<'_>) -> Result<(), CodecError> {
        let len = self.encoded_len();
        out.ensure(len)?;

        out.write_u32(self.time)?;
        // At most 29 bytes follow, well inside a u8.
        out.write_u8((len - 5) as u8)?;
        out.write_u8(self.bitmap())?;

        if let Some(gps) = &self.gps_position {
            out.write_i32(gps.latitude)?;
            out.write_i32(gps.longitude)?;
            out.write_i32(gps.elevation)?;
            out.write_i32(gps.speed)?;
        }
        if let Some(lcl) = &self.lcl_position {
            let hugs = lcl.hugs_this_period.min(MAX_HUGS_THIS_PERIOD) as u8;
            let slaps = lcl.slaps_this_period.min(MAX_SLAPS_THIS_PERIOD) as u8;
            let drops = lcl.drops_this_period.min(MAX_DROPS_THIS_PERIOD) as u8;
            let nudges = lcl.nudges_this_period.min(MAX_NUDGES_THIS_PERIOD) as u8;
            out.write_u8((lcl.orientation & 0x0F) as u8 | (hugs << 4))?;
            out.write_u8(slaps | (drops << 4))?;
            out.write_u8(nudges)?;
        }
        if let Some(sound) = self.sound_level {
            out.write_u16(sound.min(MAX_SOUND_LEVEL) as u16)?;
        }
        if let Some(lux) = self.luminosity {
            out.write_u16(lux.min(MAX_LUMINOSITY) as u16)?;
        }
        if let Some(temperature) = self.temperature {
            out.write_i8(temperature.clamp(i8::MIN as i32, i8::MAX as i32) as i8)?;
        }
        if let Some(rssi) = self.rssi {
            out.write_u8(rssi.min(MAX_RSSI) as u8)?;
        }
        if let Some(power) = &self.power_state {
            let mv = power.battery_mv.min(MAX_BATTERY_VOLTAGE_MV);
            let battery = (mv * BATTERY_FIELD_MAX / MAX_BATTERY_VOLTAGE_MV) as u8 & 0x3F;
            let charge = ((power.charge_state & 0x03) as u8) << 6;
            out.write_u8(battery | charge)?;
            out.write_i16(power.energy_uah.clamp(i16::MIN as i32, i16::MAX as i32) as i16)?;
        }

        Ok(())
    }

    /// Decode readings from `cur`, which must be positioned just after the
    /// message identifier.
    ///
    /// On success `cur` has moved past exactly `bytesToFollow` bytes.
    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self, CodecError> {
        cur.ensure(SENSOR_REPORT_MIN_SIZE)?;

        let mut readings = SensorReadings {
            time: cur.read_u32()?,
            ..Default::default()
        };

        let bytes_to_follow = cur.read_u8()? as usize;
        if bytes_to_follow > cur.remaining() {
            return Err(CodecError::bad_format(format!(
                "sensor report declares {} bytes, {} remain",
                bytes_to_follow,
                cur.remaining()
            )));
        }
        let mut window = cur.sub_cursor(bytes_to_follow)?;

        let bitmap = read_bitmap(&mut window)?;

        if bitmap & SENSOR_BIT_GPS_POSITION != 0 {
            readings.gps_position = Some(GpsPosition {
                latitude: window.read_i32().map_err(overrun)?,
                longitude: window.read_i32().map_err(overrun)?,
                elevation: window.read_i32().map_err(overrun)?,
                speed: window.read_i32().map_err(overrun)?,
            });
        }
        if bitmap & SENSOR_BIT_LCL_POSITION != 0 {
            let bytes = window.read_bytes(LCL_POSITION_SIZE).map_err(overrun)?;
            readings.lcl_position = Some(LclPosition {
                orientation: u32::from(bytes[0] & 0x0F),
                hugs_this_period: u32::from(bytes[0] >> 4),
                slaps_this_period: u32::from(bytes[1] & 0x0F),
                drops_this_period: u32::from(bytes[1] >> 4),
                nudges_this_period: u32::from(bytes[2]),
            });
        }
        if bitmap & SENSOR_BIT_SOUND_LEVEL != 0 {
            readings.sound_level = Some(u32::from(window.read_u16().map_err(overrun)?));
        }
        if bitmap & SENSOR_BIT_LUMINOSITY != 0 {
            readings.luminosity = Some(u32::from(window.read_u16().map_err(overrun)?));
        }
        if bitmap & SENSOR_BIT_TEMPERATURE != 0 {
            readings.temperature = Some(i32::from(window.read_i8().map_err(overrun)?));
        }
        if bitmap & SENSOR_BIT_RSSI != 0 {
            readings.rssi = Some(u32::from(window.read_u8().map_err(overrun)?));
        }
        if bitmap & SENSOR_BIT_POWER_STATE != 0 {
            let packed = window.read_u8().map_err(overrun)?;
            readings.power_state = Some(PowerState {
                charge_state: u32::from(packed >> 6),
                battery_mv: u32::from(packed & 0x3F) * MAX_BATTERY_VOLTAGE_MV / BATTERY_FIELD_MAX,
                energy_uah: i32::from(window.read_i16().map_err(overrun)?),
            });
        }

        if !window.is_exhausted() {
            return Err(CodecError::bad_format(format!(
                "{} unexplained bytes at end of sensor report",
                window.remaining()
            )));
        }

        Ok(readings)
    }
}

/// Read the bitmap chain, returning the first byte without its extension bit.
fn read_bitmap(window: &mut Cursor<'_>) -> Result<u8, CodecError> {
    let mut first = None;
    loop {
        let byte = window
            .read_u8()
            .map_err(|_| CodecError::bad_format("sensor bitmap not terminated"))?;
        let bits = byte & !SENSOR_BITMAP_EXTENSION;
        match first {
            None => first = Some(bits),
            // No item layout exists beyond the first bitmap byte yet.
            Some(_) if bits != 0 => {
                return Err(CodecError::bad_format(format!(
                    "unsupported sensor items 0x{:02X} in extension bitmap",
                    bits
                )))
            }
            Some(_) => {}
        }
        if byte & SENSOR_BITMAP_EXTENSION == 0 {
            return Ok(first.unwrap_or(0));
        }
    }
}

fn overrun(_: CodecError) -> CodecError {
    CodecError::bad_format("sensor item runs past end of report")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(readings: &SensorReadings) -> Vec<u8> {
        let mut buf = vec![0u8; readings.encoded_len()];
        let mut out = CursorMut::new(&mut buf);
        readings.encode(&mut out).unwrap();
        assert_eq!(out.position(), readings.encoded_len());
        buf
    }

    fn full_readings() -> SensorReadings {
        SensorReadings {
            time: 0x5555_0001,
            gps_position: Some(GpsPosition {
                latitude: -3_000_000,
                longitude: 1_234_567,
                elevation: -12,
                speed: 88,
            }),
            lcl_position: Some(LclPosition {
                orientation: 5,
                hugs_this_period: 15,
                slaps_this_period: 2,
                drops_this_period: 9,
                nudges_this_period: 200,
            }),
            sound_level: Some(0xFFFF),
            luminosity: Some(300),
            temperature: Some(-20),
            rssi: Some(31),
            power_state: Some(PowerState {
                charge_state: 2,
                battery_mv: 10_000,
                energy_uah: -500,
            }),
        }
    }

    #[test]
    fn test_empty_report_layout() {
        let readings = SensorReadings {
            time: 7,
            ..Default::default()
        };
        assert_eq!(encode(&readings), vec![0, 0, 0, 7, 1, 0]);
    }

    #[test]
    fn test_full_report() {
        let readings = full_readings();
        let buf = encode(&readings);
        assert_eq!(buf.len(), 6 + 16 + 3 + 2 + 2 + 1 + 1 + 3);
        assert_eq!(buf[4] as usize, buf.len() - 5);
        assert_eq!(buf[5], 0x7F);

        let mut cur = Cursor::new(&buf);
        let decoded = SensorReadings::decode(&mut cur).unwrap();
        assert_eq!(decoded, readings);
        assert!(cur.is_exhausted());
    }

    #[test]
    fn test_only_present_groups_decode() {
        let readings = SensorReadings {
            time: 1,
            temperature: Some(25),
            rssi: Some(12),
            ..Default::default()
        };
        let buf = encode(&readings);
        assert_eq!(buf[5], SENSOR_BIT_TEMPERATURE | SENSOR_BIT_RSSI);

        let decoded = SensorReadings::decode(&mut Cursor::new(&buf)).unwrap();
        assert!(decoded.gps_position.is_none());
        assert!(decoded.lcl_position.is_none());
        assert!(decoded.sound_level.is_none());
        assert!(decoded.luminosity.is_none());
        assert!(decoded.power_state.is_none());
        assert_eq!(decoded.temperature, Some(25));
        assert_eq!(decoded.rssi, Some(12));
    }

    #[test]
    fn test_encode_clamps() {
        let readings = SensorReadings {
            lcl_position: Some(LclPosition {
                orientation: 1,
                hugs_this_period: 99,
                slaps_this_period: 99,
                drops_this_period: 99,
                nudges_this_period: 999,
            }),
            temperature: Some(500),
            rssi: Some(250),
            power_state: Some(PowerState {
                charge_state: 1,
                battery_mv: 50_000,
                energy_uah: 100_000,
            }),
            ..Default::default()
        };
        let decoded = SensorReadings::decode(&mut Cursor::new(&encode(&readings))).unwrap();

        let lcl = decoded.lcl_position.unwrap();
        assert_eq!(lcl.hugs_this_period, 15);
        assert_eq!(lcl.slaps_this_period, 15);
        assert_eq!(lcl.drops_this_period, 15);
        assert_eq!(lcl.nudges_this_period, 255);
        assert_eq!(decoded.temperature, Some(127));
        assert_eq!(decoded.rssi, Some(MAX_RSSI));

        let power = decoded.power_state.unwrap();
        assert_eq!(power.battery_mv, 10_000);
        assert_eq!(power.energy_uah, i16::MAX as i32);
        assert_eq!(power.charge_state(), ChargeState::Off);
    }

    #[test]
    fn test_battery_resolution() {
        let readings = SensorReadings {
            power_state: Some(PowerState {
                charge_state: 0,
                battery_mv: 5_000,
                energy_uah: 0,
            }),
            ..Default::default()
        };
        let decoded = SensorReadings::decode(&mut Cursor::new(&encode(&readings))).unwrap();
        // 5000 * 63 / 10000 = 31, 31 * 10000 / 63 = 4920
        assert_eq!(decoded.power_state.unwrap().battery_mv, 4_920);
    }

    #[test]
    fn test_short_prefix() {
        let err = SensorReadings::decode(&mut Cursor::new(&[0, 0, 0, 1, 1])).unwrap_err();
        assert!(matches!(err, CodecError::InputTooShort { .. }));
    }

    #[test]
    fn test_declared_length_exceeds_input() {
        let err = SensorReadings::decode(&mut Cursor::new(&[0, 0, 0, 1, 9, 0])).unwrap_err();
        assert!(matches!(err, CodecError::BadMessageFormat(_)));
    }

    #[test]
    fn test_item_overruns_window() {
        // GPS bit set but only two bytes follow the bitmap.
        let buf = [0, 0, 0, 1, 3, SENSOR_BIT_GPS_POSITION, 0xAA, 0xBB, 0xCC, 0xDD];
        let err = SensorReadings::decode(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, CodecError::BadMessageFormat(_)));
    }

    #[test]
    fn test_trailing_bytes_in_window() {
        let buf = [0, 0, 0, 1, 3, 0, 0xAA, 0xBB];
        let err = SensorReadings::decode(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, CodecError::BadMessageFormat(_)));
    }

    #[test]
    fn test_zero_length_window() {
        let buf = [0, 0, 0, 1, 0, 0];
        let err = SensorReadings::decode(&mut Cursor::new(&buf)).unwrap_err();
        assert_eq!(err, CodecError::bad_format("sensor bitmap not terminated"));
    }

    #[test]
    fn test_extension_bitmap() {
        // Empty extension byte is accepted.
        let buf = [0, 0, 0, 1, 3, 0x80 | SENSOR_BIT_RSSI, 0x00, 42];
        let decoded = SensorReadings::decode(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded.rssi, Some(42));

        // Unknown items in an extension byte are rejected.
        let buf = [0, 0, 0, 1, 2, 0x80, 0x01];
        let err = SensorReadings::decode(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, CodecError::BadMessageFormat(_)));

        // Chain that never terminates.
        let buf = [0, 0, 0, 1, 2, 0x80, 0x80];
        let err = SensorReadings::decode(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, CodecError::BadMessageFormat(_)));
    }

    #[test]
    fn test_following_message_left_unread() {
        let mut buf = encode(&SensorReadings::default());
        buf.extend_from_slice(&[POLL_IND_UL_MSG]);
        let mut cur = Cursor::new(&buf);
        SensorReadings::decode(&mut cur).unwrap();
        assert_eq!(cur.rest(), &[POLL_IND_UL_MSG]);
    }

    #[test]
    fn test_output_too_short_writes_nothing() {
        let readings = full_readings();
        let mut buf = vec![0u8; readings.encoded_len() - 1];
        let mut out = CursorMut::new(&mut buf);
        let err = readings.encode(&mut out).unwrap_err();
        assert!(matches!(err, CodecError::OutputTooShort { .. }));
        assert_eq!(out.position(), 0);
        assert!(buf.iter().all(|&b| b == 0));
    }
}
