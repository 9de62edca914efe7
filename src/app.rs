use crate::config::Config;
use crate::datasources::{ImageryGatewayClient, ImageryProvider, OpenMeteoClient, WeatherProvider};
use crate::error::{CropLensError, Result};
use crate::models::FeatureSet;
use crate::predictors::{Predictor, TreeEnsemble};
use std::sync::Arc;

/// How the vegetation step samples imagery
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagerySettings {
    pub window_days: u32,
    pub scale_m: f64,
}

impl Default for ImagerySettings {
    fn default() -> Self {
        Self {
            window_days: 90,
            scale_m: 30.0,
        }
    }
}

/// Process-wide state shared read-only by every request: the two loaded
/// models and the external data source clients.
pub struct AppContext {
    pub crop_model: Arc<dyn Predictor>,
    pub fertilizer_model: Arc<dyn Predictor>,
    pub imagery: Arc<dyn ImageryProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub imagery_settings: ImagerySettings,
}

impl AppContext {
    pub fn new(
        crop_model: Arc<dyn Predictor>,
        fertilizer_model: Arc<dyn Predictor>,
        imagery: Arc<dyn ImageryProvider>,
        weather: Arc<dyn WeatherProvider>,
        imagery_settings: ImagerySettings,
    ) -> Result<Self> {
        Self::check_model(crop_model.as_ref(), FeatureSet::Crop)?;
        Self::check_model(fertilizer_model.as_ref(), FeatureSet::Fertilizer)?;

        Ok(Self {
            crop_model,
            fertilizer_model,
            imagery,
            weather,
            imagery_settings,
        })
    }

    /// Load both model artifacts and build the data source clients.
    /// Any failure here is fatal to the process.
    pub fn startup(config: &Config) -> Result<Self> {
        let crop = TreeEnsemble::load(&config.models.crop_path)?;
        tracing::info!(
            path = %config.models.crop_path.display(),
            trees = crop.tree_count(),
            classes = crop.classes().len(),
            "Loaded crop model"
        );

        let fertilizer = TreeEnsemble::load(&config.models.fertilizer_path)?;
        tracing::info!(
            path = %config.models.fertilizer_path.display(),
            trees = fertilizer.tree_count(),
            classes = fertilizer.classes().len(),
            "Loaded fertilizer model"
        );

        let imagery = ImageryGatewayClient::new(config.imagery.clone())?;
        let weather = OpenMeteoClient::new(config.weather.clone())?;

        Self::new(
            Arc::new(crop),
            Arc::new(fertilizer),
            Arc::new(imagery),
            Arc::new(weather),
            ImagerySettings {
                window_days: config.imagery.window_days,
                scale_m: config.imagery.scale_m,
            },
        )
    }

    pub fn shutdown(self) {
        tracing::info!("Releasing models and data source clients");
        drop(self);
    }

    // A crop artifact configured as the fertilizer model (or vice versa) would
    // silently mispredict on every request
    fn check_model(model: &dyn Predictor, expected: FeatureSet) -> Result<()> {
        if model.feature_set() != expected {
            return Err(CropLensError::ModelLoad(format!(
                "{} model slot holds a model trained on {} features",
                expected,
                model.feature_set()
            )));
        }
        Ok(())
    }
}
