//! openrouteservice HTTP client: autocomplete, forward geocoding and
//! directions, all plain GET requests carrying the API key as a query
//! credential. Transport and parsing are kept separate so the parse layer is
//! testable on canned payloads.

use std::future::Future;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Deserialize;

use shared::{Coordinate, RouteResult, RouteSummary, Suggestion, TransportProfile};

use crate::config::AppConfig;
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Seam for the geocoding provider, mirroring the two calls the pipelines
/// need: a ranked suggestion list and a single best match.
pub trait Geocoder {
    fn autocomplete(
        &self,
        text: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Suggestion>, AppError>> + Send;

    fn search_one(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Option<Suggestion>, AppError>> + Send;
}

/// Seam for the routing provider.
pub trait Router {
    fn directions(
        &self,
        start: Coordinate,
        end: Coordinate,
        profile: TransportProfile,
    ) -> impl Future<Output = Result<RouteResult, AppError>> + Send;
}

#[derive(Debug, Clone)]
pub struct OrsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OrsClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: config.ors_base_url.trim_end_matches('/').to_string(),
            api_key: config.ors_api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|err| AppError::Provider(format!("invalid endpoint URL: {err}")))?;
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(status, &body));
        }
        Ok(response.json::<T>().await?)
    }
}

impl Geocoder for OrsClient {
    async fn autocomplete(&self, text: &str, limit: usize) -> Result<Vec<Suggestion>, AppError> {
        let mut url = self.endpoint("/geocode/autocomplete")?;
        url.query_pairs_mut()
            .append_pair("text", text)
            .append_pair("size", &limit.to_string());
        let response: GeocodeResponse = self.get_json(url).await?;
        Ok(parse_geocode_response(response))
    }

    async fn search_one(&self, text: &str) -> Result<Option<Suggestion>, AppError> {
        let mut url = self.endpoint("/geocode/search")?;
        url.query_pairs_mut()
            .append_pair("text", text)
            .append_pair("size", "1");
        let response: GeocodeResponse = self.get_json(url).await?;
        Ok(parse_geocode_response(response).into_iter().next())
    }
}

impl Router for OrsClient {
    async fn directions(
        &self,
        start: Coordinate,
        end: Coordinate,
        profile: TransportProfile,
    ) -> Result<RouteResult, AppError> {
        let mut url = self.endpoint(&format!("/v2/directions/{}", profile.api_code()))?;
        let [start_lon, start_lat] = start.lon_lat();
        let [end_lon, end_lat] = end.lon_lat();
        url.query_pairs_mut()
            .append_pair("start", &format!("{start_lon},{start_lat}"))
            .append_pair("end", &format!("{end_lon},{end_lat}"));
        let response: DirectionsResponse = self.get_json(url).await?;
        parse_directions_response(response)
    }
}

fn provider_error(status: StatusCode, body: &str) -> AppError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => AppError::Provider(envelope.error.message),
        Err(_) => AppError::Provider(format!("HTTP {status}")),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeFeature {
    properties: GeocodeProperties,
    geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeProperties {
    label: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PointGeometry {
    coordinates: [f64; 2],
}

/// Provider relevance order is preserved; no client-side re-sort.
fn parse_geocode_response(response: GeocodeResponse) -> Vec<Suggestion> {
    response
        .features
        .into_iter()
        .map(|feature| Suggestion::Geocoded {
            label: feature.properties.label,
            coordinate: Coordinate::from_lon_lat(feature.geometry.coordinates),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    #[serde(default)]
    features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsFeature {
    properties: DirectionsProperties,
    geometry: DirectionsGeometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsProperties {
    summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryBody {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum DirectionsGeometry {
    LineString { coordinates: Vec<[f64; 2]> },
    MultiLineString { coordinates: Vec<Vec<[f64; 2]>> },
}

/// Only the first route feature is displayed.
fn parse_directions_response(response: DirectionsResponse) -> Result<RouteResult, AppError> {
    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Provider("empty directions response".to_string()))?;

    let segments = match feature.geometry {
        DirectionsGeometry::LineString { coordinates } => {
            vec![coordinates.into_iter().map(Coordinate::from_lon_lat).collect()]
        }
        DirectionsGeometry::MultiLineString { coordinates } => coordinates
            .into_iter()
            .map(|segment| segment.into_iter().map(Coordinate::from_lon_lat).collect())
            .collect(),
    };

    Ok(RouteResult {
        segments,
        summary: RouteSummary {
            distance_m: feature.properties.summary.distance,
            duration_s: feature.properties.summary.duration,
        },
    })
}
