use crate::consts::*;
use chrono::NaiveTime;
use thiserror::Error;

/// Errors that can occur when deserializing an [AeroTechData](crate::aerotech_data::AeroTechData) from a byte slice.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeserializationError {
    #[error("Invalid record length: expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },
    #[error("{0} trailing bytes do not form a complete record")]
    TrailingBytes(usize),
    #[error("Invalid array conversion")]
    SliceArrayConversion,
    #[error("Invalid time value")]
    InvalidTimeValue,
    #[error("Invalid hex input '{0}'")]
    InvalidHex(String),
}

/// Converts a record's hour, minute and second components to a [NaiveTime].
pub fn time_to_naive_time(
    hours: u8,
    minutes: u8,
    seconds: u8,
) -> Result<NaiveTime, DeserializationError> {
    NaiveTime::from_hms_opt(u32::from(hours), u32::from(minutes), u32::from(seconds))
        .ok_or(DeserializationError::InvalidTimeValue)
}

/// Reads a little-endian f32 starting at `pos`, returning the value and the position after it.
/// The bit pattern is kept as-is, so NaN payloads and signed zeros survive.
pub fn f32_from_bytes(data: &[u8], pos: usize) -> Result<(f32, usize), DeserializationError> {
    let float_slice: [u8; FLOAT_SIZE] = data
        .get(pos..pos + FLOAT_SIZE)
        .ok_or(DeserializationError::SliceArrayConversion)?
        .try_into()
        .map_err(|_| DeserializationError::SliceArrayConversion)?;
    Ok((
        f32::from_bits(u32::from_le_bytes(float_slice)),
        pos + FLOAT_SIZE,
    ))
}

/// Converts an f32 to its little-endian wire form.
pub fn f32_to_bytes(value: f32) -> [u8; FLOAT_SIZE] {
    value.to_bits().to_le_bytes()
}

/// Parses a hex string such as `AA 0E 1E 05 ...` into bytes. Whitespace is ignored.
pub fn bytes_from_hex(hex: &str) -> Result<Vec<u8>, DeserializationError> {
    let digits: Vec<char> = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 || !digits.iter().all(|c| c.is_ascii_hexdigit()) {
        return Err(DeserializationError::InvalidHex(hex.to_string()));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair: String = pair.iter().collect();
            u8::from_str_radix(&pair, 16).map_err(|_| DeserializationError::InvalidHex(pair))
        })
        .collect()
}

/// Formats bytes as space separated upper-case hex pairs.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
