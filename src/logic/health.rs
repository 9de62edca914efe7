use crate::models::HealthLevel;

/// Upper NDVI bound (inclusive) of each band below VeryGood
const BAD_MAX: f64 = 0.05;
const MODERATE_MAX: f64 = 0.23;
const GOOD_MAX: f64 = 0.67;

/// Map NDVI onto a health level. Total: NaN has no vegetation signal and is Bad.
pub fn classify(ndvi: f64) -> (HealthLevel, &'static str) {
    let level = if ndvi.is_nan() || ndvi <= BAD_MAX {
        HealthLevel::Bad
    } else if ndvi <= MODERATE_MAX {
        HealthLevel::Moderate
    } else if ndvi <= GOOD_MAX {
        HealthLevel::Good
    } else {
        HealthLevel::VeryGood
    };

    (level, level.description())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_inclusive_on_top() {
        assert_eq!(classify(0.05).0, HealthLevel::Bad);
        assert_eq!(classify(0.23).0, HealthLevel::Moderate);
        assert_eq!(classify(0.67).0, HealthLevel::Good);
    }

    #[test]
    fn just_above_each_boundary() {
        assert_eq!(classify(0.050001).0, HealthLevel::Moderate);
        assert_eq!(classify(0.230001).0, HealthLevel::Good);
        assert_eq!(classify(0.670001).0, HealthLevel::VeryGood);
    }

    #[test]
    fn extremes() {
        assert_eq!(classify(-1.0).0, HealthLevel::Bad);
        assert_eq!(classify(f64::NEG_INFINITY).0, HealthLevel::Bad);
        assert_eq!(classify(1.0).0, HealthLevel::VeryGood);
        assert_eq!(classify(f64::INFINITY).0, HealthLevel::VeryGood);
        assert_eq!(classify(f64::NAN).0, HealthLevel::Bad);
    }

    #[test]
    fn bands_partition_the_line() {
        // Walking upward the level never decreases and every band is hit
        let mut previous = HealthLevel::Bad;
        let mut seen = Vec::new();
        let mut ndvi = -1.0;
        while ndvi <= 1.0 {
            let (level, _) = classify(ndvi);
            assert!(level >= previous, "level dropped at ndvi {}", ndvi);
            if !seen.contains(&level) {
                seen.push(level);
            }
            previous = level;
            ndvi += 0.001;
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn description_matches_level() {
        let (level, description) = classify(0.4);
        assert_eq!(level, HealthLevel::Good);
        assert_eq!(description, HealthLevel::Good.description());
    }
}
