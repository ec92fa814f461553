use chrono::{NaiveTime, Timelike};
use thiserror::Error;

use crate::{
    consts::*,
    parser::{DeserializationError, f32_from_bytes, f32_to_bytes, time_to_naive_time},
};

/// Expected marker bytes, supplied by the caller when validating a record.
/// The record itself carries no fixed marker values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub header: u8,
    pub footer: u8,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            header: DEFAULT_MARKER_BYTE,
            footer: DEFAULT_MARKER_BYTE,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid header marker: expected {expected:#04X}, found {found:#04X}")]
    Header { expected: u8, found: u8 },
    #[error("Invalid footer marker: expected {expected:#04X}, found {found:#04X}")]
    Footer { expected: u8, found: u8 },
    #[error("Invalid hour {0}")]
    Hour(u8),
    #[error("Invalid minute {0}")]
    Minute(u8),
    #[error("Invalid second {0}")]
    Second(u8),
}

/// A single sample from the AeroTech sensor suite, with the following packed binary format
/// of [RECORD_SIZE] bytes:
///
/// * byte 0: header marker byte
/// * byte 1: hour (0-23)
/// * byte 2: minute (0-59)
/// * byte 3: second (0-59)
/// * bytes 4-7: pH, nominally 0.0-14.0
/// * bytes 8-11: total dissolved solids in ppm
/// * bytes 12-15: water level in liters
/// * bytes 16-19: temperature in degrees Celsius
/// * byte 20: footer marker byte
///
/// There is no padding between fields. Floats are IEEE-754 single precision, little-endian,
/// copied by bit pattern.
///
/// Decoding never checks the markers or time ranges; use [AeroTechData::validate] for that.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AeroTechData {
    /// Header marker byte
    pub header: u8,
    pub time_hh: u8,
    pub time_mm: u8,
    pub time_ss: u8,
    /// pH reading
    pub ph: f32,
    /// Total dissolved solids, in ppm
    pub tds: f32,
    /// Water level, in liters
    pub water_level: f32,
    /// Temperature, in degrees Celsius
    pub temperature: f32,
    /// Footer marker byte
    pub footer: u8,
}

impl AeroTechData {
    /// Creates a record with every field set to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes an [AeroTechData] struct from a byte slice of exactly [RECORD_SIZE] bytes.
    /// See [AeroTechData] for more information about the binary format.
    pub fn deserialize_from_bytes(data: &[u8]) -> Result<AeroTechData, DeserializationError> {
        if data.len() != RECORD_SIZE {
            return Err(DeserializationError::InvalidLength {
                expected: RECORD_SIZE,
                found: data.len(),
            });
        }

        let header = data[HEADER_OFFSET];
        let time_hh = data[TIME_HH_OFFSET];
        let time_mm = data[TIME_MM_OFFSET];
        let time_ss = data[TIME_SS_OFFSET];
        let (ph, pos) = f32_from_bytes(data, PH_OFFSET)?;
        let (tds, pos) = f32_from_bytes(data, pos)?;
        let (water_level, pos) = f32_from_bytes(data, pos)?;
        let (temperature, pos) = f32_from_bytes(data, pos)?;
        debug_assert_eq!(FOOTER_OFFSET, pos);
        let footer = data[FOOTER_OFFSET];

        Ok(AeroTechData {
            header,
            time_hh,
            time_mm,
            time_ss,
            ph,
            tds,
            water_level,
            temperature,
            footer,
        })
    }

    /// Serializes an [AeroTechData] struct to its packed [RECORD_SIZE]-byte form.
    /// See [AeroTechData] for more information about the binary format.
    pub fn serialize_to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut bytes: [u8; RECORD_SIZE] = [0; RECORD_SIZE];
        bytes[HEADER_OFFSET] = self.header;
        bytes[TIME_HH_OFFSET] = self.time_hh;
        bytes[TIME_MM_OFFSET] = self.time_mm;
        bytes[TIME_SS_OFFSET] = self.time_ss;
        bytes[PH_OFFSET..TDS_OFFSET].copy_from_slice(&f32_to_bytes(self.ph));
        bytes[TDS_OFFSET..WATER_LEVEL_OFFSET].copy_from_slice(&f32_to_bytes(self.tds));
        bytes[WATER_LEVEL_OFFSET..TEMPERATURE_OFFSET]
            .copy_from_slice(&f32_to_bytes(self.water_level));
        bytes[TEMPERATURE_OFFSET..FOOTER_OFFSET].copy_from_slice(&f32_to_bytes(self.temperature));
        bytes[FOOTER_OFFSET] = self.footer;
        bytes
    }

    /// Checks the marker bytes against `markers`, then the time components against their ranges.
    /// Returns the first failure found.
    pub fn validate(&self, markers: Markers) -> Result<(), ValidationError> {
        if self.header != markers.header {
            return Err(ValidationError::Header {
                expected: markers.header,
                found: self.header,
            });
        }
        if self.footer != markers.footer {
            return Err(ValidationError::Footer {
                expected: markers.footer,
                found: self.footer,
            });
        }
        if self.time_hh > 23 {
            return Err(ValidationError::Hour(self.time_hh));
        }
        if self.time_mm > 59 {
            return Err(ValidationError::Minute(self.time_mm));
        }
        if self.time_ss > 59 {
            return Err(ValidationError::Second(self.time_ss));
        }
        Ok(())
    }

    /// Returns the sample's time of day.
    pub fn sample_time(&self) -> Result<NaiveTime, DeserializationError> {
        time_to_naive_time(self.time_hh, self.time_mm, self.time_ss)
    }

    /// Sets the hour, minute and second components from a time of day.
    /// Leap seconds are clamped to 59.
    pub fn set_sample_time(&mut self, time: NaiveTime) {
        self.time_hh = time.hour() as u8;
        self.time_mm = time.minute() as u8;
        self.time_ss = time.second().min(59) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_BYTES: [u8; RECORD_SIZE] = [
        0xAA, 0x0E, 0x1E, 0x05, 0x66, 0x66, 0xE6, 0x40, 0x00, 0x00, 0xE1, 0x43, 0x00, 0x00, 0x48,
        0x41, 0x33, 0x33, 0xBB, 0x41, 0x55,
    ];

    fn sample() -> AeroTechData {
        AeroTechData {
            header: 0xAA,
            time_hh: 14,
            time_mm: 30,
            time_ss: 5,
            ph: 7.2,
            tds: 450.0,
            water_level: 12.5,
            temperature: 23.4,
            footer: 0x55,
        }
    }

    #[test]
    fn test_new_is_zeroed() {
        let data = AeroTechData::new();
        assert_eq!(0x00, data.header);
        assert_eq!(0x00, data.time_hh);
        assert_eq!(0x00, data.time_mm);
        assert_eq!(0x00, data.time_ss);
        assert_eq!(0.0, data.ph);
        assert_eq!(0.0, data.tds);
        assert_eq!(0.0, data.water_level);
        assert_eq!(0.0, data.temperature);
        assert_eq!(0x00, data.footer);
        assert_eq!([0u8; RECORD_SIZE], data.serialize_to_bytes());
    }

    #[test]
    fn test_record_size() {
        assert_eq!(21, RECORD_SIZE);
        assert_eq!(RECORD_SIZE, AeroTechData::new().serialize_to_bytes().len());
    }

    #[test]
    fn test_serialize_to_bytes() {
        assert_eq!(SAMPLE_BYTES, sample().serialize_to_bytes());
    }

    #[test]
    fn test_deserialize_from_bytes() {
        let data = AeroTechData::deserialize_from_bytes(&SAMPLE_BYTES).unwrap();
        let expected = sample();
        assert_eq!(expected, data);
        assert_eq!(expected.ph.to_bits(), data.ph.to_bits());
        assert_eq!(expected.tds.to_bits(), data.tds.to_bits());
        assert_eq!(expected.water_level.to_bits(), data.water_level.to_bits());
        assert_eq!(expected.temperature.to_bits(), data.temperature.to_bits());
    }

    #[test]
    fn test_field_order() {
        let bytes = AeroTechData {
            header: 1,
            time_hh: 2,
            time_mm: 3,
            time_ss: 4,
            ph: f32::from_bits(0x05050505),
            tds: f32::from_bits(0x06060606),
            water_level: f32::from_bits(0x07070707),
            temperature: f32::from_bits(0x08080808),
            footer: 9,
        }
        .serialize_to_bytes();
        let expected: [u8; RECORD_SIZE] = [
            1, 2, 3, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8, 8, 9,
        ];
        assert_eq!(expected, bytes);
    }

    #[test]
    fn test_serde_roundtrip() {
        let data = AeroTechData {
            header: 0xFF,
            time_hh: 23,
            time_mm: 59,
            time_ss: 59,
            ph: 14.0,
            tds: f32::MAX,
            water_level: f32::MIN_POSITIVE,
            temperature: -40.5,
            footer: 0xFE,
        };
        let bytes = data.serialize_to_bytes();
        assert_eq!(data, AeroTechData::deserialize_from_bytes(&bytes).unwrap());
    }

    #[test]
    fn test_serde_roundtrip_keeps_float_bits() {
        let data = AeroTechData {
            ph: f32::from_bits(0x7FC0_0001),
            tds: -0.0,
            water_level: f32::INFINITY,
            temperature: f32::NEG_INFINITY,
            ..AeroTechData::new()
        };
        let bytes = data.serialize_to_bytes();
        let data_from_bytes = AeroTechData::deserialize_from_bytes(&bytes).unwrap();
        assert_eq!(0x7FC0_0001, data_from_bytes.ph.to_bits());
        assert_eq!((-0.0_f32).to_bits(), data_from_bytes.tds.to_bits());
        assert_eq!(bytes, data_from_bytes.serialize_to_bytes());
    }

    #[test]
    fn test_deserialize_ignores_markers_and_time_ranges() {
        let mut bytes = SAMPLE_BYTES;
        bytes[TIME_HH_OFFSET] = 99;
        bytes[FOOTER_OFFSET] = 0x13;
        let data = AeroTechData::deserialize_from_bytes(&bytes).unwrap();
        assert_eq!(99, data.time_hh);
        assert_eq!(0x13, data.footer);
    }

    #[test]
    fn test_deserialize_invalid_length() {
        assert_eq!(
            Err(DeserializationError::InvalidLength {
                expected: RECORD_SIZE,
                found: 20
            }),
            AeroTechData::deserialize_from_bytes(&SAMPLE_BYTES[..20])
        );
        let mut long = SAMPLE_BYTES.to_vec();
        long.push(0x00);
        assert!(AeroTechData::deserialize_from_bytes(&long).is_err());
        assert!(AeroTechData::deserialize_from_bytes(&[]).is_err());
    }

    #[test]
    fn test_validate() {
        let data = sample();
        let markers = Markers {
            header: 0xAA,
            footer: 0x55,
        };
        assert_eq!(Ok(()), data.validate(markers));
        assert_eq!(
            Err(ValidationError::Header {
                expected: 0x00,
                found: 0xAA
            }),
            data.validate(Markers::default())
        );
        assert_eq!(
            Err(ValidationError::Footer {
                expected: 0x56,
                found: 0x55
            }),
            data.validate(Markers {
                header: 0xAA,
                footer: 0x56
            })
        );
        assert_eq!(Ok(()), AeroTechData::new().validate(Markers::default()));
    }

    #[test]
    fn test_validate_time_ranges() {
        let markers = Markers::default();
        let data = AeroTechData {
            time_hh: 24,
            time_mm: 60,
            ..AeroTechData::new()
        };
        assert_eq!(Err(ValidationError::Hour(24)), data.validate(markers));
        let data = AeroTechData {
            time_mm: 60,
            ..AeroTechData::new()
        };
        assert_eq!(Err(ValidationError::Minute(60)), data.validate(markers));
        let data = AeroTechData {
            time_ss: 61,
            ..AeroTechData::new()
        };
        assert_eq!(Err(ValidationError::Second(61)), data.validate(markers));
    }

    #[test]
    fn test_sample_time() {
        let mut data = sample();
        assert_eq!(
            NaiveTime::from_hms_opt(14, 30, 5).unwrap(),
            data.sample_time().unwrap()
        );
        data.set_sample_time(NaiveTime::from_hms_opt(7, 8, 9).unwrap());
        assert_eq!((7, 8, 9), (data.time_hh, data.time_mm, data.time_ss));
        data.time_hh = 30;
        assert_eq!(
            Err(DeserializationError::InvalidTimeValue),
            data.sample_time()
        );
    }
}
