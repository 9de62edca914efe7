use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropLensError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to load model artifact: {0}")]
    ModelLoad(String),

    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("No satellite imagery found between {start} and {end}")]
    NoImagery {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Imagery query failed: {0}")]
    ImageryQuery(String),

    #[error("Weather fetch failed: {0}")]
    WeatherFetch(String),

    #[error("Geolocation lookup failed: {0}")]
    Geolocation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CropLensError {
    /// Short classification shown to the user alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            CropLensError::Validation(_) => "ValidationError",
            CropLensError::ModelLoad(_) => "ModelLoadError",
            CropLensError::Inference(_) => "InferenceError",
            CropLensError::NoImagery { .. } => "NoImageryError",
            CropLensError::ImageryQuery(_) => "ImageryQueryError",
            CropLensError::WeatherFetch(_) => "WeatherFetchError",
            CropLensError::Geolocation(_) => "GeolocationError",
            CropLensError::Config(_) => "ConfigError",
            CropLensError::Http(_) => "HttpError",
            CropLensError::Io(_) => "IoError",
            CropLensError::Json(_) => "JsonError",
        }
    }

    /// Whether the user can fix the failure by changing their input
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, CropLensError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, CropLensError>;
