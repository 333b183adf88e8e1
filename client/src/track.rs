//! Continuous position tracking. The platform feeds device events in through
//! `push_position`/`push_error`; the tracker drives the surface and forwards
//! to the registered subscription. At most one subscription exists at a time:
//! registering always deregisters the previous one first, so callbacks can
//! never stack.

use std::future::Future;

use shared::Coordinate;

use crate::error::AppError;
use crate::surface::{
    MapSurface, FALLBACK_CENTER, FALLBACK_ZOOM, RECENTER_ANIMATION, TRACKING_ZOOM,
};
use crate::ui;

/// One-shot device geolocation, distinct from continuous tracking; high
/// accuracy is requested.
pub trait DeviceLocator {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, AppError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    pub accuracy_m: f64,
}

type PositionCallback = Box<dyn FnMut(Coordinate) + Send>;
type ErrorCallback = Box<dyn FnMut(&AppError) + Send>;

struct Subscription {
    on_position: PositionCallback,
    on_error: ErrorCallback,
}

#[derive(Default)]
pub struct GeolocationTracker {
    subscription: Option<Subscription>,
    enabled: bool,
    last_fix: Option<PositionFix>,
}

impl GeolocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.enabled
    }

    /// Enable updates, replacing any existing subscription. A cached fix is
    /// replayed immediately so the subscriber does not wait for the next
    /// device update.
    pub fn start_tracking(
        &mut self,
        surface: &mut dyn MapSurface,
        on_position: impl FnMut(Coordinate) + Send + 'static,
        on_error: impl FnMut(&AppError) + Send + 'static,
    ) {
        self.subscription = Some(Subscription {
            on_position: Box::new(on_position),
            on_error: Box::new(on_error),
        });
        self.enabled = true;
        if let Some(fix) = self.last_fix {
            self.apply_fix(surface, fix);
        }
    }

    /// Disable updates and deregister the subscription. Safe without a prior
    /// `start_tracking`.
    pub fn stop_tracking(&mut self) {
        self.enabled = false;
        self.subscription = None;
    }

    /// Full teardown: also forgets the cached fix.
    pub fn reset(&mut self) {
        self.stop_tracking();
        self.last_fix = None;
    }

    pub fn push_position(&mut self, surface: &mut dyn MapSurface, fix: PositionFix) {
        if !self.enabled {
            return;
        }
        self.last_fix = Some(fix);
        self.apply_fix(surface, fix);
    }

    /// A tracking error recenters on the fallback view but does not stop the
    /// session; the next device update may recover.
    pub fn push_error(&mut self, surface: &mut dyn MapSurface, error: &AppError) {
        if !self.enabled {
            return;
        }
        tracing::warn!("geolocation error: {error}");
        surface.animate_center(FALLBACK_CENTER, FALLBACK_ZOOM, RECENTER_ANIMATION);
        surface.set_popup_text(&ui::error_popup(error));
        surface.set_popup_position(Some(FALLBACK_CENTER));
        if let Some(subscription) = self.subscription.as_mut() {
            (subscription.on_error)(error);
        }
    }

    fn apply_fix(&mut self, surface: &mut dyn MapSurface, fix: PositionFix) {
        surface.set_position_marker(fix.coordinate);
        surface.set_accuracy_circle(fix.coordinate, fix.accuracy_m);
        surface.animate_center(fix.coordinate, TRACKING_ZOOM, RECENTER_ANIMATION);
        surface.set_popup_text(&ui::position_popup(fix.coordinate));
        surface.set_popup_position(Some(fix.coordinate));
        if let Some(subscription) = self.subscription.as_mut() {
            (subscription.on_position)(fix.coordinate);
        }
    }
}
