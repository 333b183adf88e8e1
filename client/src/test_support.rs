//! Shared test doubles: in-memory providers, a recording surface and small
//! counting helpers. Everything is cheaply cloneable so a test can keep a
//! handle for assertions while the code under test owns another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shared::{Coordinate, GeoBounds, RouteResult, RouteSummary, Suggestion, TransportProfile};

use crate::error::AppError;
use crate::map::SessionMode;
use crate::ors::{Geocoder, Router};
use crate::surface::{MapSurface, SurfaceFactory};
use crate::track::DeviceLocator;
use crate::wmts::{CapabilitiesSource, TileSourceOptions};

#[derive(Default)]
struct GeocoderInner {
    suggestions: Vec<Suggestion>,
    places: HashMap<String, Coordinate>,
    delays: HashMap<String, Duration>,
    failure: Option<String>,
    autocomplete_queries: Mutex<Vec<String>>,
    search_calls: AtomicUsize,
}

/// Geocoder fed from fixed data. `with_suggestion` entries come back from
/// every autocomplete call; `with_place` entries answer `search_one` by exact
/// name.
#[derive(Clone, Default)]
pub(crate) struct MockGeocoder {
    inner: Arc<GeocoderInner>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner_mut(&mut self) -> &mut GeocoderInner {
        Arc::get_mut(&mut self.inner).expect("configure the mock before cloning it")
    }

    pub fn with_suggestion(mut self, label: &str, coordinate: Coordinate) -> Self {
        self.inner_mut().suggestions.push(Suggestion::Geocoded {
            label: label.to_string(),
            coordinate,
        });
        self
    }

    pub fn with_place(mut self, name: &str, coordinate: Coordinate) -> Self {
        self.inner_mut().places.insert(name.to_string(), coordinate);
        self
    }

    /// Delay the autocomplete response for one exact query.
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.inner_mut().delays.insert(query.to_string(), delay);
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.inner_mut().failure = Some(message.to_string());
        self
    }

    pub fn autocomplete_queries(&self) -> Vec<String> {
        self.inner.autocomplete_queries.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> usize {
        self.inner.search_calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for MockGeocoder {
    async fn autocomplete(&self, text: &str, _limit: usize) -> Result<Vec<Suggestion>, AppError> {
        self.inner
            .autocomplete_queries
            .lock()
            .unwrap()
            .push(text.to_string());
        if let Some(delay) = self.inner.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }
        match &self.inner.failure {
            Some(message) => Err(AppError::Provider(message.clone())),
            None => Ok(self.inner.suggestions.clone()),
        }
    }

    async fn search_one(&self, text: &str) -> Result<Option<Suggestion>, AppError> {
        self.inner.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.inner.failure {
            return Err(AppError::Provider(message.clone()));
        }
        Ok(self.inner.places.get(text).map(|coordinate| Suggestion::Geocoded {
            label: text.to_string(),
            coordinate: *coordinate,
        }))
    }
}

#[derive(Default)]
struct RouterInner {
    route: Option<RouteResult>,
    failure: Option<String>,
    calls: AtomicUsize,
    last_profile: Mutex<Option<TransportProfile>>,
}

#[derive(Clone, Default)]
pub(crate) struct MockRouter {
    inner: Arc<RouterInner>,
}

impl MockRouter {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner_mut(&mut self) -> &mut RouterInner {
        Arc::get_mut(&mut self.inner).expect("configure the mock before cloning it")
    }

    pub fn with_route(mut self, points: Vec<Coordinate>, distance_m: f64, duration_s: f64) -> Self {
        self.inner_mut().route = Some(RouteResult {
            segments: vec![points],
            summary: RouteSummary {
                distance_m,
                duration_s,
            },
        });
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.inner_mut().failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn last_profile(&self) -> Option<TransportProfile> {
        *self.inner.last_profile.lock().unwrap()
    }
}

impl Router for MockRouter {
    async fn directions(
        &self,
        _start: Coordinate,
        _end: Coordinate,
        profile: TransportProfile,
    ) -> Result<RouteResult, AppError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        *self.inner.last_profile.lock().unwrap() = Some(profile);
        if let Some(message) = &self.inner.failure {
            return Err(AppError::Provider(message.clone()));
        }
        self.inner
            .route
            .clone()
            .ok_or_else(|| AppError::Provider("no route configured".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SurfaceEvent {
    PositionMarker(Coordinate),
    AccuracyCircle(f64),
    AnimateCenter(Coordinate, f64),
    PopupPosition(Option<Coordinate>),
    PopupText(String),
    DisplayPath(usize),
    ClearPath,
    FitExtent(GeoBounds),
    Detached,
}

/// Surface that appends every call to a shared event log.
pub(crate) struct RecordingSurface {
    events: Arc<Mutex<Vec<SurfaceEvent>>>,
    live: Option<Arc<AtomicIsize>>,
}

impl RecordingSurface {
    pub fn with_log() -> (Self, Arc<Mutex<Vec<SurfaceEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: Arc::clone(&events),
                live: None,
            },
            events,
        )
    }

    fn record(&self, event: SurfaceEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl MapSurface for RecordingSurface {
    fn set_position_marker(&mut self, at: Coordinate) {
        self.record(SurfaceEvent::PositionMarker(at));
    }

    fn set_accuracy_circle(&mut self, _center: Coordinate, radius_m: f64) {
        self.record(SurfaceEvent::AccuracyCircle(radius_m));
    }

    fn animate_center(&mut self, center: Coordinate, zoom: f64, _duration: Duration) {
        self.record(SurfaceEvent::AnimateCenter(center, zoom));
    }

    fn set_popup_position(&mut self, at: Option<Coordinate>) {
        self.record(SurfaceEvent::PopupPosition(at));
    }

    fn set_popup_text(&mut self, text: &str) {
        self.record(SurfaceEvent::PopupText(text.to_string()));
    }

    fn display_path(&mut self, segments: &[Vec<Coordinate>]) {
        self.record(SurfaceEvent::DisplayPath(segments.len()));
    }

    fn clear_path(&mut self) {
        self.record(SurfaceEvent::ClearPath);
    }

    fn fit_extent(&mut self, bounds: GeoBounds, _padding_px: u32) {
        self.record(SurfaceEvent::FitExtent(bounds));
    }

    fn detach(&mut self) {
        self.record(SurfaceEvent::Detached);
        if let Some(live) = &self.live {
            live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Factory handing out recording surfaces, all writing to the same log.
/// `live` tracks surfaces created and not yet detached.
#[derive(Clone, Default)]
pub(crate) struct CountingFactory {
    events: Arc<Mutex<Vec<SurfaceEvent>>>,
    created: Arc<AtomicUsize>,
    live: Arc<AtomicIsize>,
    fail: bool,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> isize {
        self.live.load(Ordering::SeqCst)
    }
}

impl SurfaceFactory for CountingFactory {
    fn create_surface(
        &self,
        _target: &str,
        _tiles: &TileSourceOptions,
        _mode: SessionMode,
    ) -> Result<Box<dyn MapSurface>, AppError> {
        if self.fail {
            return Err(AppError::MapInit("surface creation failed".to_string()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingSurface {
            events: Arc::clone(&self.events),
            live: Some(Arc::clone(&self.live)),
        }))
    }
}

pub(crate) struct StubCapabilities {
    fail: bool,
}

impl StubCapabilities {
    pub fn ok() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl CapabilitiesSource for StubCapabilities {
    async fn fetch(&self) -> Result<TileSourceOptions, AppError> {
        if self.fail {
            return Err(AppError::MapInit("capabilities fetch failed".to_string()));
        }
        Ok(TileSourceOptions {
            layer: "GEOGRAPHICALGRIDSYSTEMS.PLANIGNV2".to_string(),
            style: "normal".to_string(),
            format: "image/png".to_string(),
            matrix_set: "PM".to_string(),
        })
    }
}

/// Counts invocations of a tracker callback.
#[derive(Clone, Default)]
pub(crate) struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn callback(&self) -> impl FnMut(Coordinate) + Send + 'static {
        let count = Arc::clone(&self.count);
        move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn error_callback(&self) -> impl FnMut(&AppError) + Send + 'static {
        let count = Arc::clone(&self.count);
        move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub(crate) struct FixedLocator(pub Coordinate);

impl DeviceLocator for FixedLocator {
    async fn current_position(&self) -> Result<Coordinate, AppError> {
        Ok(self.0)
    }
}

pub(crate) struct FailingLocator;

impl DeviceLocator for FailingLocator {
    async fn current_position(&self) -> Result<Coordinate, AppError> {
        Err(AppError::LocationUnavailable(
            "position acquisition timed out".to_string(),
        ))
    }
}
