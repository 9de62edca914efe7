use crate::error::{CropLensError, Result};
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub models: ModelsConfig,
    pub imagery: ImageryConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelsConfig {
    pub crop_path: PathBuf,
    pub fertilizer_path: PathBuf,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ImageryConfig {
    pub base_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub api_key: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_scale_m")]
    pub scale_m: f64,
    /// Divisor turning provider digital numbers into reflectance
    #[serde(default = "default_reflectance_scale")]
    pub reflectance_scale: f64,
    #[serde(default = "default_imagery_timeout")]
    pub timeout_secs: u64,
}

// `api_key: ${UNSET}` leaves a bare key, which YAML reads as null
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_collection() -> String {
    "COPERNICUS/S2_SR".into()
}

/// Longest imagery search window accepted, roughly ten years
pub const MAX_WINDOW_DAYS: u32 = 3650;

fn default_window_days() -> u32 {
    90
}

fn default_scale_m() -> f64 {
    30.0
}

fn default_reflectance_scale() -> f64 {
    10_000.0
}

fn default_imagery_timeout() -> u64 {
    30
}

impl std::fmt::Debug for ImageryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageryConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("collection", &self.collection)
            .field("window_days", &self.window_days)
            .field("scale_m", &self.scale_m)
            .field("reflectance_scale", &self.reflectance_scale)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".into(),
            api_key: String::new(),
            collection: default_collection(),
            window_days: default_window_days(),
            scale_m: default_scale_m(),
            reflectance_scale: default_reflectance_scale(),
            timeout_secs: default_imagery_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1".into()
}

fn default_weather_timeout() -> u64 {
    15
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeolocationConfig {
    #[serde(default = "default_ip_url")]
    pub ip_url: String,
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,
    #[serde(default = "default_geolocation_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_ip_url() -> String {
    "https://api64.ipify.org?format=json".into()
}

fn default_lookup_url() -> String {
    "https://ipinfo.io".into()
}

fn default_geolocation_timeout() -> u64 {
    10
}

fn default_enabled() -> bool {
    true
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            ip_url: default_ip_url(),
            lookup_url: default_lookup_url(),
            timeout_secs: default_geolocation_timeout(),
            enabled: default_enabled(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(CropLensError::Config(format!(
                "Config file not found at {:?}. Run `croplens init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| CropLensError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&config_str)
    }

    /// Parse YAML after `${VAR}` substitution
    pub fn parse(content: &str) -> Result<Self> {
        let config_str = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&config_str)
            .map_err(|e| CropLensError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.imagery.window_days == 0 || self.imagery.window_days > MAX_WINDOW_DAYS {
            return Err(CropLensError::Config(format!(
                "imagery.window_days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }
        if !(self.imagery.scale_m > 0.0) {
            return Err(CropLensError::Config(
                "imagery.scale_m must be positive".into(),
            ));
        }
        if !(self.imagery.reflectance_scale > 0.0) {
            return Err(CropLensError::Config(
                "imagery.reflectance_scale must be positive".into(),
            ));
        }
        for (section, timeout) in [
            ("imagery", self.imagery.timeout_secs),
            ("weather", self.weather.timeout_secs),
            ("geolocation", self.geolocation.timeout_secs),
        ] {
            if timeout == 0 {
                return Err(CropLensError::Config(format!(
                    "{}.timeout_secs must be at least 1",
                    section
                )));
            }
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let default_path = Self::default_config_path()?;
        Ok(default_path)
    }

    /// Default path for writing new config files (~/.config/croplens/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropLensError::Config("Cannot determine config directory".into()))?
            .join("croplens");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up croplens!");
        println!();

        println!("Model artifacts");
        let crop_path: String = Input::new()
            .with_prompt("  Crop model")
            .default("models/crop.json".into())
            .interact_text()
            .map_err(|e| CropLensError::Config(format!("Input error: {}", e)))?;

        let fertilizer_path: String = Input::new()
            .with_prompt("  Fertilizer model")
            .default("models/fertilizer.json".into())
            .interact_text()
            .map_err(|e| CropLensError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Imagery gateway");
        let imagery_url: String = Input::new()
            .with_prompt("  Base URL")
            .default(ImageryConfig::default().base_url)
            .interact_text()
            .map_err(|e| CropLensError::Config(format!("Input error: {}", e)))?;

        let imagery_key: String = Password::new()
            .with_prompt("  API key (blank for none)")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| CropLensError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            models: ModelsConfig {
                crop_path: PathBuf::from(crop_path),
                fertilizer_path: PathBuf::from(fertilizer_path),
            },
            imagery: ImageryConfig {
                base_url: imagery_url,
                api_key: imagery_key,
                ..ImageryConfig::default()
            },
            weather: WeatherConfig::default(),
            geolocation: GeolocationConfig::default(),
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| CropLensError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# croplens configuration\n# Generated by `croplens init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            match std::env::var(var_name) {
                Ok(value) => result = result.replace(placeholder, &value),
                // Unset variables become empty
                Err(_) => {
                    tracing::warn!(var = var_name, "Config references unset environment variable");
                    result = result.replace(placeholder, "");
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
models:
  crop_path: models/crop.json
  fertilizer_path: models/fertilizer.json
imagery:
  base_url: http://imagery.local
"#;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = Config::parse(MINIMAL).unwrap();
        assert_eq!(config.imagery.window_days, 90);
        assert_eq!(config.imagery.scale_m, 30.0);
        assert_eq!(config.imagery.collection, "COPERNICUS/S2_SR");
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert!(config.geolocation.enabled);
    }

    #[test]
    fn env_vars_are_substituted() {
        std::env::set_var("CROPLENS_TEST_IMAGERY_KEY", "secret-123");
        let yaml = format!(
            "{}  api_key: ${{CROPLENS_TEST_IMAGERY_KEY}}\n",
            MINIMAL.trim_end().to_string() + "\n"
        );
        let config = Config::parse(&yaml).unwrap();
        assert_eq!(config.imagery.api_key, "secret-123");
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let config = ImageryConfig {
            api_key: "secret-123".into(),
            ..ImageryConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn zero_window_is_rejected() {
        let yaml = format!("{}  window_days: 0\n", MINIMAL.trim_end().to_string() + "\n");
        assert!(matches!(
            Config::parse(&yaml),
            Err(CropLensError::Config(_))
        ));
    }

    #[test]
    fn missing_models_section_is_rejected() {
        let yaml = "imagery:\n  base_url: http://imagery.local\n";
        assert!(Config::parse(yaml).is_err());
    }

    #[test]
    fn oversized_window_is_rejected() {
        let yaml = format!(
            "{}  window_days: 4000000000\n",
            MINIMAL.trim_end().to_string() + "\n"
        );
        assert!(matches!(
            Config::parse(&yaml),
            Err(CropLensError::Config(_))
        ));

        let yaml = format!(
            "{}  window_days: {}\n",
            MINIMAL.trim_end().to_string() + "\n",
            MAX_WINDOW_DAYS
        );
        assert_eq!(Config::parse(&yaml).unwrap().imagery.window_days, MAX_WINDOW_DAYS);
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let imagery = format!("{}  timeout_secs: 0\n", MINIMAL.trim_end().to_string() + "\n");
        assert!(matches!(
            Config::parse(&imagery),
            Err(CropLensError::Config(msg)) if msg.contains("imagery")
        ));

        let weather = format!("{}weather:\n  timeout_secs: 0\n", MINIMAL.trim_start());
        assert!(matches!(
            Config::parse(&weather),
            Err(CropLensError::Config(msg)) if msg.contains("weather")
        ));

        let geolocation = format!("{}geolocation:\n  timeout_secs: 0\n", MINIMAL.trim_start());
        assert!(matches!(
            Config::parse(&geolocation),
            Err(CropLensError::Config(msg)) if msg.contains("geolocation")
        ));
    }

    #[test]
    fn unset_env_var_becomes_empty() {
        std::env::remove_var("CROPLENS_TEST_UNSET_KEY");
        let yaml = format!(
            "{}  api_key: \"${{CROPLENS_TEST_UNSET_KEY}}\"\n",
            MINIMAL.trim_end().to_string() + "\n"
        );
        let config = Config::parse(&yaml).unwrap();
        assert_eq!(config.imagery.api_key, "");

        let unquoted = format!(
            "{}  api_key: ${{CROPLENS_TEST_UNSET_KEY}}\n",
            MINIMAL.trim_end().to_string() + "\n"
        );
        let config = Config::parse(&unquoted).unwrap();
        assert_eq!(config.imagery.api_key, "");
    }
}
