use super::request::RecommendationRequest;
use serde::{Deserialize, Serialize};

/// Which model a feature vector was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSet {
    Crop,
    Fertilizer,
}

impl FeatureSet {
    /// Column order the model was trained with
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            FeatureSet::Crop => &[
                "N",
                "P",
                "K",
                "temperature",
                "humidity",
                "ph",
                "rainfall",
            ],
            FeatureSet::Fertilizer => &[
                "temperature",
                "humidity",
                "moisture",
                "N",
                "K",
                "P",
                "soiltype",
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureSet::Crop => "crop",
            FeatureSet::Fertilizer => "fertilizer",
        }
    }
}

impl std::fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed-order numeric input for one predictor. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    set: FeatureSet,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn crop(req: &RecommendationRequest) -> Self {
        Self {
            set: FeatureSet::Crop,
            values: vec![
                req.nitrogen as f64,
                req.phosphorus as f64,
                req.potassium as f64,
                req.temperature,
                req.humidity,
                req.ph,
                req.rainfall,
            ],
        }
    }

    pub fn fertilizer(req: &RecommendationRequest) -> Self {
        Self {
            set: FeatureSet::Fertilizer,
            values: vec![
                req.temperature,
                req.humidity,
                req.moisture,
                req.nitrogen as f64,
                req.potassium as f64,
                req.phosphorus as f64,
                req.soil_category.index() as f64,
            ],
        }
    }

    pub fn set(&self) -> FeatureSet {
        self.set
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[cfg(test)]
    pub fn from_raw(set: FeatureSet, values: Vec<f64>) -> Self {
        Self { set, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, SoilCategory};

    fn sample_request() -> RecommendationRequest {
        RecommendationRequest {
            nitrogen: 90,
            phosphorus: 42,
            potassium: 43,
            temperature: 20.9,
            humidity: 82.0,
            moisture: 38.0,
            ph: 6.5,
            rainfall: 202.9,
            soil_category: SoilCategory::Red,
            location: Coordinates {
                latitude: 45.0,
                longitude: -93.0,
            },
        }
    }

    #[test]
    fn crop_vector_order() {
        let v = FeatureVector::crop(&sample_request());
        assert_eq!(v.set(), FeatureSet::Crop);
        assert_eq!(v.values(), &[90.0, 42.0, 43.0, 20.9, 82.0, 6.5, 202.9]);
    }

    #[test]
    fn fertilizer_vector_order() {
        let v = FeatureVector::fertilizer(&sample_request());
        assert_eq!(v.set(), FeatureSet::Fertilizer);
        // K before P, soil category as its index
        assert_eq!(v.values(), &[20.9, 82.0, 38.0, 90.0, 43.0, 42.0, 3.0]);
    }

    #[test]
    fn vectors_match_column_count() {
        let req = sample_request();
        assert_eq!(
            FeatureVector::crop(&req).len(),
            FeatureSet::Crop.columns().len()
        );
        assert_eq!(
            FeatureVector::fertilizer(&req).len(),
            FeatureSet::Fertilizer.columns().len()
        );
    }
}
