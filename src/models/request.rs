use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilCategory {
    Sandy,
    Loamy,
    Black,
    Red,
    Clayey,
}

impl SoilCategory {
    pub const ALL: [SoilCategory; 5] = [
        SoilCategory::Sandy,
        SoilCategory::Loamy,
        SoilCategory::Black,
        SoilCategory::Red,
        SoilCategory::Clayey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilCategory::Sandy => "Sandy",
            SoilCategory::Loamy => "Loamy",
            SoilCategory::Black => "Black",
            SoilCategory::Red => "Red",
            SoilCategory::Clayey => "Clayey",
        }
    }

    /// Encoding the fertilizer model was trained with
    pub fn index(&self) -> u8 {
        match self {
            SoilCategory::Sandy => 0,
            SoilCategory::Loamy => 1,
            SoilCategory::Black => 2,
            SoilCategory::Red => 3,
            SoilCategory::Clayey => 4,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sandy" => Some(SoilCategory::Sandy),
            "loamy" => Some(SoilCategory::Loamy),
            "black" => Some(SoilCategory::Black),
            "red" => Some(SoilCategory::Red),
            "clayey" => Some(SoilCategory::Clayey),
            _ => None,
        }
    }
}

impl std::fmt::Display for SoilCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated point on the globe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        LATITUDE_RANGE.contains(&self.latitude) && LONGITUDE_RANGE.contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Soil chemistry, climate and location for one plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub nitrogen: i64,
    pub phosphorus: i64,
    pub potassium: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub moisture: f64,
    pub ph: f64,
    pub rainfall: f64,
    pub soil_category: SoilCategory,
    pub location: Coordinates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soil_category_indices_are_fixed() {
        let indices: Vec<u8> = SoilCategory::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn soil_category_from_str() {
        assert_eq!(SoilCategory::from_str("Sandy"), Some(SoilCategory::Sandy));
        assert_eq!(SoilCategory::from_str("clayey"), Some(SoilCategory::Clayey));
        assert_eq!(SoilCategory::from_str(" Black "), Some(SoilCategory::Black));
        assert_eq!(SoilCategory::from_str("Loam"), None);
        assert_eq!(SoilCategory::from_str(""), None);
    }

    #[test]
    fn coordinates_range() {
        assert!(Coordinates { latitude: 45.0, longitude: -93.0 }.is_valid());
        assert!(Coordinates { latitude: -90.0, longitude: 180.0 }.is_valid());
        assert!(!Coordinates { latitude: 91.0, longitude: 0.0 }.is_valid());
        assert!(!Coordinates { latitude: 0.0, longitude: 181.0 }.is_valid());
        assert!(!Coordinates { latitude: f64::NAN, longitude: 0.0 }.is_valid());
    }
}
