/// The size of one packed record in bytes
pub const RECORD_SIZE: usize = 21;
/// The size of an IEEE-754 single precision float in bytes
pub const FLOAT_SIZE: usize = 4;

/// Marker value written into freshly constructed records
pub const DEFAULT_MARKER_BYTE: u8 = 0x00;

/// Offset of the header marker byte
pub const HEADER_OFFSET: usize = 0;
/// Offset of the hour component
pub const TIME_HH_OFFSET: usize = 1;
/// Offset of the minute component
pub const TIME_MM_OFFSET: usize = 2;
/// Offset of the second component
pub const TIME_SS_OFFSET: usize = 3;
/// Offset of the pH reading
pub const PH_OFFSET: usize = 4;
/// Offset of the total dissolved solids reading, in ppm
pub const TDS_OFFSET: usize = 8;
/// Offset of the water level reading, in liters
pub const WATER_LEVEL_OFFSET: usize = 12;
/// Offset of the temperature reading, in degrees Celsius
pub const TEMPERATURE_OFFSET: usize = 16;
/// Offset of the footer marker byte, always the last byte of the record
pub const FOOTER_OFFSET: usize = 20;
