use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Today's forecast at a point (°C, mm)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub date: Option<NaiveDate>,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub precipitation_mm: f64,
}
