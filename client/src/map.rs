//! Map session: exclusive owner of one live surface bound to one target
//! element, for one mode at a time. Initialisation fetches the provider
//! capability document, then builds the surface and its mode-specific
//! overlays; teardown detaches the surface so a subsequent `init` rebuilds
//! cleanly.
//!
//! Exclusive ownership of the target is structural: the surface lives inside
//! the session and in-flight work borrows the live session, so nothing can
//! update a destroyed session's surface.

use crate::error::AppError;
use crate::surface::{MapSurface, SurfaceFactory};
use crate::track::{GeolocationTracker, PositionFix};
use crate::wmts::CapabilitiesSource;
use shared::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Tracking,
    Routing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initializing,
    Ready(SessionMode),
}

pub struct MapSession<C, F> {
    capabilities: C,
    factory: F,
    target: String,
    state: SessionState,
    surface: Option<Box<dyn MapSurface>>,
    tracker: GeolocationTracker,
}

impl<C: CapabilitiesSource, F: SurfaceFactory> MapSession<C, F> {
    pub fn new(capabilities: C, factory: F, target: impl Into<String>) -> Self {
        Self {
            capabilities,
            factory,
            target: target.into(),
            state: SessionState::default(),
            surface: None,
            tracker: GeolocationTracker::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> Option<SessionMode> {
        match self.state {
            SessionState::Ready(mode) => Some(mode),
            _ => None,
        }
    }

    pub fn surface_mut(&mut self) -> Option<&mut (dyn MapSurface + 'static)> {
        self.surface.as_deref_mut()
    }

    /// Idempotent for the mode already bound; switching modes requires an
    /// explicit `destroy` first, which the screen state machine guarantees.
    /// Any failure leaves the session `Uninitialized`, so retrying is always
    /// safe.
    pub async fn init(&mut self, mode: SessionMode) -> Result<(), AppError> {
        match self.state {
            SessionState::Ready(current) if current == mode => return Ok(()),
            SessionState::Ready(current) => {
                return Err(AppError::MapInit(format!(
                    "target {} is already bound for {current:?}; destroy the session first",
                    self.target
                )));
            }
            // An abandoned init (dropped mid-fetch) restarts from scratch.
            SessionState::Uninitialized | SessionState::Initializing => {}
        }

        self.state = SessionState::Initializing;
        let tiles = match self.capabilities.fetch().await {
            Ok(tiles) => tiles,
            Err(err) => {
                self.state = SessionState::Uninitialized;
                return Err(as_init_error(err));
            }
        };
        let surface = match self.factory.create_surface(&self.target, &tiles, mode) {
            Ok(surface) => surface,
            Err(err) => {
                self.state = SessionState::Uninitialized;
                return Err(as_init_error(err));
            }
        };

        self.surface = Some(surface);
        self.state = SessionState::Ready(mode);
        tracing::debug!(element = %self.target, ?mode, "map session ready");
        Ok(())
    }

    /// Unconditionally safe, even if never initialised: stops tracking,
    /// detaches the surface from its target and resets to `Uninitialized`.
    pub fn destroy(&mut self) {
        self.tracker.reset();
        if let Some(mut surface) = self.surface.take() {
            surface.detach();
        }
        self.state = SessionState::Uninitialized;
        tracing::debug!(element = %self.target, "map session destroyed");
    }

    pub fn start_tracking(
        &mut self,
        on_position: impl FnMut(Coordinate) + Send + 'static,
        on_error: impl FnMut(&AppError) + Send + 'static,
    ) -> Result<(), AppError> {
        if self.state != SessionState::Ready(SessionMode::Tracking) {
            return Err(AppError::MapInit(
                "tracking requires an initialised tracking session".to_string(),
            ));
        }
        let Self {
            tracker, surface, ..
        } = self;
        match surface.as_deref_mut() {
            Some(surface) => {
                tracker.start_tracking(surface, on_position, on_error);
                Ok(())
            }
            None => Err(AppError::MapInit(
                "tracking requires an initialised tracking session".to_string(),
            )),
        }
    }

    /// Safe to call in any state.
    pub fn stop_tracking(&mut self) {
        self.tracker.stop_tracking();
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker.is_tracking()
    }

    pub fn push_position(&mut self, fix: PositionFix) {
        let Self {
            tracker, surface, ..
        } = self;
        if let Some(surface) = surface.as_deref_mut() {
            tracker.push_position(surface, fix);
        }
    }

    pub fn push_error(&mut self, error: &AppError) {
        let Self {
            tracker, surface, ..
        } = self;
        if let Some(surface) = surface.as_deref_mut() {
            tracker.push_error(surface, error);
        }
    }
}

fn as_init_error(err: AppError) -> AppError {
    match err {
        already @ AppError::MapInit(_) => already,
        other => AppError::MapInit(other.to_string()),
    }
}
