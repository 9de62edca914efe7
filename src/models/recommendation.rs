use super::request::Coordinates;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Crop label used when the plot shows no usable vegetation
pub const NO_CROP_LABEL: &str = "No crop can grow";

/// Vegetation health, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthLevel {
    Bad,
    Moderate,
    Good,
    VeryGood,
}

impl HealthLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthLevel::Bad => "Bad",
            HealthLevel::Moderate => "Moderate",
            HealthLevel::Good => "Good",
            HealthLevel::VeryGood => "Very Good",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HealthLevel::Bad => {
                "This area is typically associated with non-vegetated surfaces like water \
                 bodies, snow-covered areas, or barren land."
            }
            HealthLevel::Moderate => {
                "This area has sparse vegetation cover, areas with stress (such as drought \
                 stress or nutrient deficiencies), or non-vegetated surfaces like bare soil \
                 or urban areas."
            }
            HealthLevel::Good => {
                "This area has good vegetation cover and health. This area is useful for \
                 good vegetation conditions in agricultural lands, grasslands, and mixed-use \
                 areas."
            }
            HealthLevel::VeryGood => {
                "This area has very good vegetation, which indicates healthy and dense \
                 vegetation cover. This area is beneficial for robust plant growth, such as \
                 forests, healthy crops, or areas recovering from disturbance."
            }
        }
    }

    /// Whether the level rules out any crop regardless of model output
    pub fn blocks_planting(&self) -> bool {
        matches!(self, HealthLevel::Bad)
    }
}

impl std::fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub crop: String,
    pub fertilizer: String,
    pub ndvi: f64,
    pub evi: f64,
    pub health_level: HealthLevel,
    pub health_description: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub rainfall_mm: f64,
    pub location: Coordinates,
    pub scene_id: String,
    pub scene_acquired: NaiveDate,
}

impl RecommendationResult {
    pub fn crop_blocked(&self) -> bool {
        self.crop == NO_CROP_LABEL
    }
}

impl std::fmt::Display for RecommendationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Location:         {}", self.location)?;
        if self.crop_blocked() {
            writeln!(f, "Recommended crop: {} (vegetation signal too weak)", self.crop)?;
        } else {
            writeln!(f, "Recommended crop: {}", self.crop)?;
        }
        writeln!(f, "Fertilizer:       {}", self.fertilizer)?;
        writeln!(
            f,
            "NDVI / EVI:       {:.3} / {:.3} (scene {}, {})",
            self.ndvi, self.evi, self.scene_id, self.scene_acquired
        )?;
        writeln!(f, "Vegetation:       {}", self.health_level)?;
        writeln!(f, "                  {}", self.health_description)?;
        writeln!(
            f,
            "Today:            {:.1}°C / {:.1}°C, {:.1} mm rain",
            self.max_temp_c, self.min_temp_c, self.rainfall_mm
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_levels_are_ordered() {
        assert!(HealthLevel::Bad < HealthLevel::Moderate);
        assert!(HealthLevel::Moderate < HealthLevel::Good);
        assert!(HealthLevel::Good < HealthLevel::VeryGood);
    }

    #[test]
    fn only_bad_blocks_planting() {
        assert!(HealthLevel::Bad.blocks_planting());
        assert!(!HealthLevel::Moderate.blocks_planting());
        assert!(!HealthLevel::Good.blocks_planting());
        assert!(!HealthLevel::VeryGood.blocks_planting());
    }

    #[test]
    fn health_level_display() {
        assert_eq!(HealthLevel::VeryGood.to_string(), "Very Good");
        assert_eq!(HealthLevel::Bad.to_string(), "Bad");
    }

    #[test]
    fn descriptions_keep_their_wording() {
        assert!(HealthLevel::Good
            .description()
            .starts_with("This area has good vegetation cover and health. This area is useful for good vegetation conditions in agricultural lands"));
        assert!(HealthLevel::VeryGood
            .description()
            .starts_with("This area has very good vegetation, which indicates healthy and dense vegetation cover."));
        assert!(HealthLevel::Moderate
            .description()
            .starts_with("This area has sparse vegetation cover"));
    }
}
