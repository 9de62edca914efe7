use super::health::classify;
use super::indices::compute_indices;
use super::normalizer::normalize;
use crate::app::AppContext;
use crate::error::{CropLensError, Result};
use crate::models::{FeatureVector, RecommendationResult, NO_CROP_LABEL};
use crate::predictors::Predictor;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Runs one recommendation end to end. Steps are strictly sequential and
/// the first failure aborts the request; there are no partial results.
pub struct RecommendationEngine {
    ctx: Arc<AppContext>,
}

impl RecommendationEngine {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    pub async fn recommend_today(
        &self,
        raw: &HashMap<String, String>,
    ) -> Result<RecommendationResult> {
        self.recommend(raw, Utc::now().date_naive()).await
    }

    pub async fn recommend(
        &self,
        raw: &HashMap<String, String>,
        as_of: NaiveDate,
    ) -> Result<RecommendationResult> {
        let request = normalize(raw)?;
        let point = request.location;
        tracing::info!(%point, soil = %request.soil_category, "Starting recommendation");

        // Each model gets the vector it was trained on
        let crop_features = FeatureVector::crop(&request);
        let fertilizer_features = FeatureVector::fertilizer(&request);
        let crop = Self::predict(self.ctx.crop_model.as_ref(), &crop_features)?;
        let fertilizer = Self::predict(self.ctx.fertilizer_model.as_ref(), &fertilizer_features)?;
        tracing::debug!(%crop, %fertilizer, "Model predictions");

        let settings = self.ctx.imagery_settings;
        let vegetation = compute_indices(
            self.ctx.imagery.as_ref(),
            point,
            as_of,
            settings.window_days,
            settings.scale_m,
        )
        .await?;
        tracing::debug!(ndvi = vegetation.ndvi, evi = vegetation.evi, "Vegetation indices");

        // Weather is required: a failed fetch fails the request
        let weather = self.ctx.weather.fetch_weather(point).await?;
        if weather.precipitation_mm != request.rainfall {
            tracing::debug!(
                supplied = request.rainfall,
                observed = weather.precipitation_mm,
                "Replacing supplied rainfall with observed precipitation"
            );
        }

        let (health_level, health_description) = classify(vegetation.ndvi);
        let crop = if health_level.blocks_planting() {
            tracing::info!(ndvi = vegetation.ndvi, predicted = %crop, "Vegetation too poor, overriding crop");
            NO_CROP_LABEL.to_string()
        } else {
            crop
        };

        Ok(RecommendationResult {
            crop,
            fertilizer,
            ndvi: vegetation.ndvi,
            evi: vegetation.evi,
            health_level,
            health_description: health_description.to_string(),
            max_temp_c: weather.max_temp_c,
            min_temp_c: weather.min_temp_c,
            rainfall_mm: weather.precipitation_mm,
            location: point,
            scene_id: vegetation.scene_id,
            scene_acquired: vegetation.acquired,
        })
    }

    fn predict(model: &dyn Predictor, features: &FeatureVector) -> Result<String> {
        model.predict(features).map_err(|e| {
            tracing::error!(model = %model.feature_set(), error = %e, "Inference failed");
            match e {
                CropLensError::Inference(_) => e,
                other => CropLensError::Inference(other.to_string()),
            }
        })
    }
}
