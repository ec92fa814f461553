pub mod aerotech_data;
pub mod consts;
pub mod parser;
pub mod reading;

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

use aerotech_data::AeroTechData;
use consts::RECORD_SIZE;
use log::debug;
use parser::DeserializationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AeroTechError {
    #[error("Failed to read record file: {0}")]
    ReadFile(io::Error),
    #[error("Failed to write record file: {0}")]
    WriteFile(io::Error),
    #[error("Failed to deserialize data: {0}")]
    DeserializeData(DeserializationError),
    #[error("Failed to serialize reading: {0}")]
    SerializeJson(serde_json::Error),
    #[error("Reading '{0}' is not a finite number")]
    NonFiniteReading(&'static str),
}

/// Splits a record log into its [RECORD_SIZE]-byte records.
pub fn records_from_bytes(data: &[u8]) -> Result<Vec<AeroTechData>, DeserializationError> {
    let trailing = data.len() % RECORD_SIZE;
    if trailing != 0 {
        return Err(DeserializationError::TrailingBytes(trailing));
    }
    data.chunks_exact(RECORD_SIZE)
        .map(AeroTechData::deserialize_from_bytes)
        .collect()
}

pub fn records_to_bytes(records: &[AeroTechData]) -> Vec<u8> {
    let mut bytes: Vec<u8> = Vec::with_capacity(records.len() * RECORD_SIZE);
    for record in records {
        bytes.extend_from_slice(&record.serialize_to_bytes());
    }
    bytes
}

fn get_raw_record_bytes(path: &Path) -> Result<Vec<u8>, AeroTechError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist, treating as empty", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(AeroTechError::ReadFile(e)),
    }
}

/// Reads every record in the log at `path`. A missing file is an empty log.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<AeroTechData>, AeroTechError> {
    let path = path.as_ref();
    let bytes = get_raw_record_bytes(path)?;
    let records = records_from_bytes(&bytes).map_err(AeroTechError::DeserializeData)?;
    debug!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Replaces the log at `path` with `records`.
pub fn write_records(
    path: impl AsRef<Path>,
    records: &[AeroTechData],
) -> Result<(), AeroTechError> {
    let path = path.as_ref();
    fs::write(path, records_to_bytes(records)).map_err(AeroTechError::WriteFile)?;
    debug!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Appends one record to the log at `path`, creating it if needed.
/// Refuses to append to a log that ends in a partial record.
pub fn append_record(path: impl AsRef<Path>, record: &AeroTechData) -> Result<(), AeroTechError> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(AeroTechError::WriteFile)?;
    let len = file.metadata().map_err(AeroTechError::ReadFile)?.len();
    let trailing = (len % RECORD_SIZE as u64) as usize;
    if trailing != 0 {
        return Err(AeroTechError::DeserializeData(
            DeserializationError::TrailingBytes(trailing),
        ));
    }
    file.write_all(&record.serialize_to_bytes())
        .map_err(AeroTechError::WriteFile)?;
    debug!("appended record to {}", path.display());
    Ok(())
}
