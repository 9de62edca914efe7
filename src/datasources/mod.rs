pub mod geolocation;
pub mod imagery;
pub mod openmeteo;

pub use geolocation::GeolocationClient;
pub use imagery::ImageryGatewayClient;
pub use openmeteo::OpenMeteoClient;

use crate::error::Result;
use crate::models::{BandSample, Coordinates, DateWindow, SceneCandidate, WeatherSample};
use async_trait::async_trait;

/// Satellite scene search and per-band sampling around a point
#[async_trait]
pub trait ImageryProvider: Send + Sync {
    /// Scenes intersecting `point` acquired within `window`
    async fn search_scenes(
        &self,
        point: Coordinates,
        window: DateWindow,
    ) -> Result<Vec<SceneCandidate>>;

    /// Blue, red and near-infrared reflectance for the pixels within `scale_m` of `point`
    async fn sample_bands(
        &self,
        scene: &SceneCandidate,
        point: Coordinates,
        scale_m: f64,
    ) -> Result<BandSample>;
}

/// Short-range daily forecast
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_weather(&self, point: Coordinates) -> Result<WeatherSample>;
}
