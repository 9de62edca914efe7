use crate::error::{CropLensError, Result};
use crate::models::{
    Coordinates, RecommendationRequest, SoilCategory, LATITUDE_RANGE, LONGITUDE_RANGE,
};
use std::collections::HashMap;

pub const FIELD_NITROGEN: &str = "N";
pub const FIELD_PHOSPHORUS: &str = "P";
pub const FIELD_POTASSIUM: &str = "K";
pub const FIELD_TEMPERATURE: &str = "temperature";
pub const FIELD_HUMIDITY: &str = "humidity";
pub const FIELD_MOISTURE: &str = "moisture";
pub const FIELD_PH: &str = "ph";
pub const FIELD_RAINFALL: &str = "rainfall";
pub const FIELD_SOIL_TYPE: &str = "soiltype";
pub const FIELD_LATITUDE: &str = "latitude";
pub const FIELD_LONGITUDE: &str = "longitude";

/// Every field a request must carry
pub const REQUIRED_FIELDS: [&str; 11] = [
    FIELD_NITROGEN,
    FIELD_PHOSPHORUS,
    FIELD_POTASSIUM,
    FIELD_TEMPERATURE,
    FIELD_HUMIDITY,
    FIELD_MOISTURE,
    FIELD_PH,
    FIELD_RAINFALL,
    FIELD_SOIL_TYPE,
    FIELD_LATITUDE,
    FIELD_LONGITUDE,
];

/// Convert raw form fields into a typed request. Pure, no I/O.
pub fn normalize(raw: &HashMap<String, String>) -> Result<RecommendationRequest> {
    let soil_raw = field(raw, FIELD_SOIL_TYPE)?;
    let soil_category = SoilCategory::from_str(soil_raw).ok_or_else(|| {
        let known: Vec<&str> = SoilCategory::ALL.iter().map(|s| s.as_str()).collect();
        CropLensError::Validation(format!(
            "unknown soil type '{}' (expected one of {})",
            soil_raw,
            known.join(", ")
        ))
    })?;

    let location = Coordinates {
        latitude: parse_float(raw, FIELD_LATITUDE)?,
        longitude: parse_float(raw, FIELD_LONGITUDE)?,
    };
    if !LATITUDE_RANGE.contains(&location.latitude) {
        return Err(CropLensError::Validation(format!(
            "latitude {} is outside [{}, {}]",
            location.latitude,
            LATITUDE_RANGE.start(),
            LATITUDE_RANGE.end()
        )));
    }
    if !LONGITUDE_RANGE.contains(&location.longitude) {
        return Err(CropLensError::Validation(format!(
            "longitude {} is outside [{}, {}]",
            location.longitude,
            LONGITUDE_RANGE.start(),
            LONGITUDE_RANGE.end()
        )));
    }

    Ok(RecommendationRequest {
        nitrogen: parse_int(raw, FIELD_NITROGEN)?,
        phosphorus: parse_int(raw, FIELD_PHOSPHORUS)?,
        potassium: parse_int(raw, FIELD_POTASSIUM)?,
        temperature: parse_float(raw, FIELD_TEMPERATURE)?,
        humidity: parse_float(raw, FIELD_HUMIDITY)?,
        moisture: parse_float(raw, FIELD_MOISTURE)?,
        ph: parse_float(raw, FIELD_PH)?,
        rainfall: parse_float(raw, FIELD_RAINFALL)?,
        soil_category,
        location,
    })
}

fn field<'a>(raw: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    raw.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CropLensError::Validation(format!("missing field '{}'", name)))
}

fn parse_int(raw: &HashMap<String, String>, name: &str) -> Result<i64> {
    let value = field(raw, name)?;
    value.parse::<i64>().map_err(|_| {
        CropLensError::Validation(format!("field '{}' must be an integer, got '{}'", name, value))
    })
}

fn parse_float(raw: &HashMap<String, String>, name: &str) -> Result<f64> {
    let value = field(raw, name)?;
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CropLensError::Validation(format!(
            "field '{}' must be a number, got '{}'",
            name, value
        ))),
    }
}
