use std::time::Duration;

use shared::{Coordinate, GeoBounds};

use crate::error::AppError;
use crate::map::SessionMode;
use crate::wmts::TileSourceOptions;

pub const TRACKING_ZOOM: f64 = 15.0;
pub const FALLBACK_ZOOM: f64 = 12.0;
pub const RECENTER_ANIMATION: Duration = Duration::from_millis(1000);
pub const FIT_PADDING_PX: u32 = 50;

/// Recenter target when the device cannot be located (Paris).
pub const FALLBACK_CENTER: Coordinate = Coordinate {
    lat: 48.8566,
    lon: 2.3522,
};

/// Opaque rendering collaborator: one live map bound to one target element.
///
/// Tile layout, vector styling and projection are the surface's business;
/// everything here speaks geographic degrees.
pub trait MapSurface: Send {
    fn set_position_marker(&mut self, at: Coordinate);
    fn set_accuracy_circle(&mut self, center: Coordinate, radius_m: f64);
    fn animate_center(&mut self, center: Coordinate, zoom: f64, duration: Duration);
    fn set_popup_position(&mut self, at: Option<Coordinate>);
    fn set_popup_text(&mut self, text: &str);
    fn display_path(&mut self, segments: &[Vec<Coordinate>]);
    fn clear_path(&mut self);
    fn fit_extent(&mut self, bounds: GeoBounds, padding_px: u32);
    /// Release the target element so another surface may bind it.
    fn detach(&mut self);
}

/// Builds a surface for one session mode. Tracking surfaces carry the
/// position marker, accuracy circle and popup overlay; routing surfaces an
/// empty path layer.
pub trait SurfaceFactory {
    fn create_surface(
        &self,
        target: &str,
        tiles: &TileSourceOptions,
        mode: SessionMode,
    ) -> Result<Box<dyn MapSurface>, AppError>;
}

/// Headless surface for the CLI demo: every drawing call becomes a log line.
#[derive(Debug, Default)]
pub struct LoggingSurface;

impl MapSurface for LoggingSurface {
    fn set_position_marker(&mut self, at: Coordinate) {
        tracing::debug!(lat = at.lat, lon = at.lon, "position marker");
    }

    fn set_accuracy_circle(&mut self, center: Coordinate, radius_m: f64) {
        tracing::debug!(lat = center.lat, lon = center.lon, radius_m, "accuracy circle");
    }

    fn animate_center(&mut self, center: Coordinate, zoom: f64, duration: Duration) {
        tracing::debug!(lat = center.lat, lon = center.lon, zoom, ?duration, "recenter");
    }

    fn set_popup_position(&mut self, at: Option<Coordinate>) {
        tracing::debug!(?at, "popup position");
    }

    fn set_popup_text(&mut self, text: &str) {
        tracing::debug!(text, "popup text");
    }

    fn display_path(&mut self, segments: &[Vec<Coordinate>]) {
        let points: usize = segments.iter().map(Vec::len).sum();
        tracing::debug!(segments = segments.len(), points, "path displayed");
    }

    fn clear_path(&mut self) {
        tracing::debug!("path cleared");
    }

    fn fit_extent(&mut self, bounds: GeoBounds, padding_px: u32) {
        tracing::debug!(?bounds, padding_px, "fit extent");
    }

    fn detach(&mut self) {
        tracing::debug!("surface detached");
    }
}
