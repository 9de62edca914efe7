use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::error::{CropLensError, Result};
use crate::models::{Coordinates, WeatherSample};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

pub struct OpenMeteoClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

// Open-Meteo daily forecast response
#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    #[serde(default)]
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
}

impl OpenMeteoClient {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn forecast_url(&self, point: Coordinates) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&daily=temperature_2m_max,temperature_2m_min,precipitation_sum&timezone=auto",
            self.config.base_url.trim_end_matches('/'),
            point.latitude,
            point.longitude
        )
    }

    /// Only the first (today's) entry of each daily series is used
    fn today(values: &[Option<f64>], name: &str) -> Result<f64> {
        values.first().copied().flatten().ok_or_else(|| {
            CropLensError::WeatherFetch(format!("Open-Meteo returned no {} for today", name))
        })
    }

    fn convert_response(response: OmForecastResponse) -> Result<WeatherSample> {
        let daily = response.daily;

        let max_temp_c = Self::today(&daily.temperature_2m_max, "temperature_2m_max")?;
        let min_temp_c = Self::today(&daily.temperature_2m_min, "temperature_2m_min")?;
        let precipitation_mm = Self::today(&daily.precipitation_sum, "precipitation_sum")?;

        let date = daily
            .time
            .first()
            .and_then(|t| NaiveDate::parse_from_str(t, "%Y-%m-%d").ok());

        Ok(WeatherSample {
            date,
            max_temp_c,
            min_temp_c,
            precipitation_mm,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn fetch_weather(&self, point: Coordinates) -> Result<WeatherSample> {
        let url = self.forecast_url(point);
        tracing::debug!(%url, "Fetching Open-Meteo forecast");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CropLensError::WeatherFetch(format!("Open-Meteo: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CropLensError::WeatherFetch(format!(
                "Open-Meteo returned {}: {}",
                status, body
            )));
        }

        let om_response: OmForecastResponse = response.json().await.map_err(|e| {
            CropLensError::WeatherFetch(format!("Failed to parse Open-Meteo response: {}", e))
        })?;

        let sample = Self::convert_response(om_response)?;
        tracing::debug!(
            max = sample.max_temp_c,
            min = sample.min_temp_c,
            precipitation = sample.precipitation_mm,
            "Weather for today"
        );
        Ok(sample)
    }
}
