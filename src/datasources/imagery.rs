use super::ImageryProvider;
use crate::config::ImageryConfig;
use crate::error::{CropLensError, Result};
use crate::models::{BandSample, Coordinates, DateWindow, SceneCandidate};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// Sentinel-2 band names
const BLUE_BAND: &str = "B2";
const RED_BAND: &str = "B4";
const NIR_BAND: &str = "B8";

/// Client for an imagery gateway that fronts a surface-reflectance collection.
///
/// `POST {base}/search` lists scenes over a point sorted by cloud cover and
/// `POST {base}/sample` returns band pixels around the point for one scene.
pub struct ImageryGatewayClient {
    client: reqwest::Client,
    config: ImageryConfig,
}

#[derive(Debug, Serialize)]
struct GwPoint {
    lat: f64,
    lon: f64,
}

impl From<Coordinates> for GwPoint {
    fn from(c: Coordinates) -> Self {
        Self {
            lat: c.latitude,
            lon: c.longitude,
        }
    }
}

#[derive(Debug, Serialize)]
struct GwSearchRequest<'a> {
    collection: &'a str,
    point: GwPoint,
    start: NaiveDate,
    end: NaiveDate,
    sort: &'a str,
}

#[derive(Debug, Deserialize)]
struct GwSearchResponse {
    #[serde(default)]
    scenes: Vec<GwScene>,
}

#[derive(Debug, Deserialize)]
struct GwScene {
    id: String,
    acquired: NaiveDate,
    #[serde(alias = "CLOUDY_PIXEL_PERCENTAGE")]
    cloud_cover: f64,
}

#[derive(Debug, Serialize)]
struct GwSampleRequest<'a> {
    collection: &'a str,
    scene_id: &'a str,
    point: GwPoint,
    scale: f64,
    bands: [&'a str; 3],
}

#[derive(Debug, Deserialize)]
struct GwSampleResponse {
    bands: HashMap<String, Vec<Option<f64>>>,
}

impl ImageryGatewayClient {
    pub fn new(config: ImageryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let mut request = self.client.post(self.endpoint(path)).json(body);
        if !self.config.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CropLensError::ImageryQuery(format!("Imagery gateway: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CropLensError::ImageryQuery(format!(
                "Imagery gateway returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            CropLensError::ImageryQuery(format!("Failed to parse imagery gateway response: {}", e))
        })
    }

    fn convert_scenes(response: GwSearchResponse) -> Vec<SceneCandidate> {
        response
            .scenes
            .into_iter()
            .map(|s| SceneCandidate {
                id: s.id,
                acquired: s.acquired,
                cloud_cover_percent: s.cloud_cover,
            })
            .collect()
    }

    /// Pairs band pixels up by position, dropping nodata pixels and scaling
    /// digital numbers down to reflectance.
    fn convert_sample(response: GwSampleResponse, reflectance_scale: f64) -> Result<BandSample> {
        let mut bands = response.bands;
        let mut take = |name: &str| {
            bands.remove(name).ok_or_else(|| {
                CropLensError::ImageryQuery(format!("Imagery gateway omitted band {}", name))
            })
        };

        let blue = take(BLUE_BAND)?;
        let red = take(RED_BAND)?;
        let nir = take(NIR_BAND)?;

        if blue.len() != red.len() || red.len() != nir.len() {
            return Err(CropLensError::ImageryQuery(format!(
                "Band pixel counts differ: {}={}, {}={}, {}={}",
                BLUE_BAND,
                blue.len(),
                RED_BAND,
                red.len(),
                NIR_BAND,
                nir.len()
            )));
        }

        let mut sample = BandSample::default();
        for ((b, r), n) in blue.into_iter().zip(red).zip(nir) {
            if let (Some(b), Some(r), Some(n)) = (b, r, n) {
                sample.blue.push(b / reflectance_scale);
                sample.red.push(r / reflectance_scale);
                sample.nir.push(n / reflectance_scale);
            }
        }

        Ok(sample)
    }
}

#[async_trait]
impl ImageryProvider for ImageryGatewayClient {
    async fn search_scenes(
        &self,
        point: Coordinates,
        window: DateWindow,
    ) -> Result<Vec<SceneCandidate>> {
        let request = GwSearchRequest {
            collection: &self.config.collection,
            point: point.into(),
            start: window.start,
            end: window.end,
            sort: "cloud_cover",
        };
        tracing::debug!(
            collection = %self.config.collection,
            start = %window.start,
            end = %window.end,
            "Searching imagery"
        );

        let response: GwSearchResponse = self.post("search", &request).await?;
        let scenes = Self::convert_scenes(response);
        tracing::debug!(count = scenes.len(), "Imagery search returned scenes");
        Ok(scenes)
    }

    async fn sample_bands(
        &self,
        scene: &SceneCandidate,
        point: Coordinates,
        scale_m: f64,
    ) -> Result<BandSample> {
        let request = GwSampleRequest {
            collection: &self.config.collection,
            scene_id: &scene.id,
            point: point.into(),
            scale: scale_m,
            bands: [BLUE_BAND, RED_BAND, NIR_BAND],
        };

        let response: GwSampleResponse = self.post("sample", &request).await?;
        Self::convert_sample(response, self.config.reflectance_scale)
    }
}
