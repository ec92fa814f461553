use serde::{Deserialize, Serialize};

use crate::{AeroTechError, aerotech_data::AeroTechData};

/// Coarse water level reported to the web back end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterLevelCode {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl std::fmt::Display for WaterLevelCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaterLevelCode::Low => write!(f, "Low"),
            WaterLevelCode::Medium => write!(f, "Medium"),
            WaterLevelCode::High => write!(f, "High"),
        }
    }
}

/// Water levels, in liters, used to classify a record into a [WaterLevelCode].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterLevelThresholds {
    /// Levels strictly below this are [WaterLevelCode::Low]
    pub low_below: f32,
    /// Levels strictly above this are [WaterLevelCode::High]
    pub high_above: f32,
}

impl Default for WaterLevelThresholds {
    fn default() -> Self {
        WaterLevelThresholds {
            low_below: 5.0,
            high_above: 20.0,
        }
    }
}

impl WaterLevelThresholds {
    pub fn classify(&self, liters: f32) -> WaterLevelCode {
        if liters < self.low_below {
            WaterLevelCode::Low
        } else if liters > self.high_above {
            WaterLevelCode::High
        } else {
            WaterLevelCode::Medium
        }
    }
}

/// The JSON body accepted by the `ingest-reading` function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub device_id: String,
    pub ph: f32,
    pub tds: f32,
    pub temp_c: f32,
    pub water_level_code: u8,
}

impl SensorReading {
    pub fn from_record(
        device_id: impl Into<String>,
        record: &AeroTechData,
        thresholds: WaterLevelThresholds,
    ) -> Self {
        SensorReading {
            device_id: device_id.into(),
            ph: record.ph,
            tds: record.tds,
            temp_c: record.temperature,
            water_level_code: thresholds.classify(record.water_level) as u8,
        }
    }

    /// Serializes the reading. Non-finite values are rejected, since JSON has no NaN or infinity.
    pub fn to_json(&self) -> Result<String, AeroTechError> {
        for (field, value) in [("ph", self.ph), ("tds", self.tds), ("temp_c", self.temp_c)] {
            if !value.is_finite() {
                return Err(AeroTechError::NonFiniteReading(field));
            }
        }
        serde_json::to_string(self).map_err(AeroTechError::SerializeJson)
    }
}
