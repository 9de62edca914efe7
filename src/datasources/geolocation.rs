use crate::config::GeolocationConfig;
use crate::error::{CropLensError, Result};
use crate::models::Coordinates;
use serde::Deserialize;
use std::time::Duration;

/// Resolves the caller's public IP to approximate coordinates.
/// Used to prefill a request, never by the recommendation itself.
pub struct GeolocationClient {
    client: reqwest::Client,
    config: GeolocationConfig,
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    loc: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

impl GeolocationClient {
    pub fn new(config: GeolocationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn locate(&self) -> Result<Coordinates> {
        if !self.config.enabled {
            return Err(CropLensError::Geolocation(
                "geolocation is disabled in config".into(),
            ));
        }

        let ip: IpResponse = self.get_json(&self.config.ip_url).await?;
        let url = format!("{}/{}/json", self.config.lookup_url.trim_end_matches('/'), ip.ip);
        let info: IpInfoResponse = self.get_json(&url).await?;

        let loc = info
            .loc
            .ok_or_else(|| CropLensError::Geolocation("lookup returned no location".into()))?;
        let coords = parse_loc(&loc)?;

        tracing::info!(
            city = info.city.as_deref().unwrap_or("unknown"),
            %coords,
            "Resolved caller location"
        );
        Ok(coords)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CropLensError::Geolocation(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(CropLensError::Geolocation(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CropLensError::Geolocation(format!("Failed to parse {}: {}", url, e)))
    }
}

/// Parse an ipinfo `"lat,lon"` pair
fn parse_loc(loc: &str) -> Result<Coordinates> {
    let invalid = || CropLensError::Geolocation(format!("unrecognized location '{}'", loc));

    let (lat, lon) = loc.split_once(',').ok_or_else(invalid)?;
    let coords = Coordinates {
        latitude: lat.trim().parse().map_err(|_| invalid())?,
        longitude: lon.trim().parse().map_err(|_| invalid())?,
    };

    if !coords.is_valid() {
        return Err(invalid());
    }
    Ok(coords)
}
