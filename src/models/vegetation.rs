use super::request::Coordinates;
use crate::error::{CropLensError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive date range used to search for imagery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window of `days` ending at `as_of`
    pub fn trailing(as_of: NaiveDate, days: u32) -> Result<Self> {
        let start = as_of
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| {
                CropLensError::Config(format!(
                    "a {}-day window before {} is outside the calendar",
                    days, as_of
                ))
            })?;
        Ok(Self { start, end: as_of })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// A satellite scene returned by an imagery search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCandidate {
    pub id: String,
    pub acquired: NaiveDate,
    /// 0-100, lower is clearer
    pub cloud_cover_percent: f64,
}

/// Surface reflectance pixels around a point, one value per pixel per band
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandSample {
    pub blue: Vec<f64>,
    pub red: Vec<f64>,
    pub nir: Vec<f64>,
}

/// Spectral indices at a point from a single scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationSample {
    pub ndvi: f64,
    pub evi: f64,
    pub location: Coordinates,
    pub scene_id: String,
    pub acquired: NaiveDate,
    pub window: DateWindow,
}
