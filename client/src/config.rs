use crate::error::AppError;

pub const DEFAULT_ORS_BASE_URL: &str = "https://api.openrouteservice.org";
pub const DEFAULT_WMTS_URL: &str =
    "https://data.geopf.fr/wmts?SERVICE=WMTS&VERSION=1.0.0&REQUEST=GetCapabilities";
pub const DEFAULT_WMTS_LAYER: &str = "GEOGRAPHICALGRIDSYSTEMS.PLANIGNV2";
pub const DEFAULT_WMTS_MATRIX_SET: &str = "PM";
pub const DEFAULT_MAP_TARGET: &str = "map";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ors_base_url: String,
    pub ors_api_key: String,
    pub wmts_url: String,
    pub wmts_layer: String,
    pub wmts_matrix_set: String,
    pub map_target: String,
}

impl AppConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            ors_base_url: DEFAULT_ORS_BASE_URL.to_string(),
            ors_api_key: api_key.into(),
            wmts_url: DEFAULT_WMTS_URL.to_string(),
            wmts_layer: DEFAULT_WMTS_LAYER.to_string(),
            wmts_matrix_set: DEFAULT_WMTS_MATRIX_SET.to_string(),
            map_target: DEFAULT_MAP_TARGET.to_string(),
        }
    }

    /// Build a configuration from the environment; only the API key is
    /// mandatory, everything else falls back to the compiled defaults.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key =
            std::env::var("ORS_API_KEY").map_err(|_| AppError::Validation("ORS_API_KEY"))?;
        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("ORS_BASE_URL") {
            config.ors_base_url = url;
        }
        if let Ok(url) = std::env::var("WMTS_URL") {
            config.wmts_url = url;
        }
        Ok(config)
    }
}
