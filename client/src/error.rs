use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("map initialisation failed: {0}")]
    MapInit(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("no match found for \"{0}\"")]
    CityNotFound(String),
    #[error("device location unavailable: {0}")]
    LocationUnavailable(String),
    #[error("required field is empty: {0}")]
    Validation(&'static str),
    #[error("invalid stored data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
