use serde::{Deserialize, Serialize};

/// Geographic position in degrees.
///
/// Provider wire formats carry positions as `[lon, lat]` arrays; the
/// conversion happens in the parse layer, never further up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn from_lon_lat([lon, lat]: [f64; 2]) -> Self {
        Self { lat, lon }
    }

    pub fn lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Mode of travel used by the routing service, exactly one selected at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProfile {
    #[default]
    Driving,
    Cycling,
    Walking,
}

impl TransportProfile {
    pub const ALL: [TransportProfile; 3] = [
        TransportProfile::Driving,
        TransportProfile::Cycling,
        TransportProfile::Walking,
    ];

    /// Profile segment used by the directions endpoint.
    pub fn api_code(self) -> &'static str {
        match self {
            TransportProfile::Driving => "driving-car",
            TransportProfile::Cycling => "cycling-regular",
            TransportProfile::Walking => "foot-walking",
        }
    }
}

/// One entry of the autocomplete list, in provider relevance order.
///
/// The device-location entry is a tagged variant rather than a sentinel label
/// so selection logic dispatches by case, not by string comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    Geocoded { label: String, coordinate: Coordinate },
    DeviceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Path geometry plus summary, derived from one directions response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub segments: Vec<Vec<Coordinate>>,
    pub summary: RouteSummary,
}

impl RouteResult {
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.segments.iter().flatten().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn from_points(points: impl IntoIterator<Item = Coordinate>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        for point in iter {
            bounds.expand(point);
        }
        Some(bounds)
    }

    pub fn expand(&mut self, point: Coordinate) {
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lat = self.max_lat.max(point.lat);
        self.min_lon = self.min_lon.min(point.lon);
        self.max_lon = self.max_lon.max(point.lon);
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }
}
