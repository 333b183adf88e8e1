//! Screen state machine and application controller. All mutable state lives
//! on the `App` object passed to handlers by reference; there is no hidden
//! module-level state. Tracking and routing modes never bind the map target
//! simultaneously: the only path between them runs through `go_home`, which
//! tears the active session down first.

use shared::{Coordinate, Suggestion, TransportProfile};

use crate::error::AppError;
use crate::map::{MapSession, SessionMode};
use crate::ors::{Geocoder, Router};
use crate::prefs::PreferenceStore;
use crate::route::{RouteOutcome, RoutePlanner};
use crate::suggest::{resolve_suggestion, SuggestionSource, SuggestionUpdate};
use crate::surface::SurfaceFactory;
use crate::track::{DeviceLocator, PositionFix};
use crate::wmts::CapabilitiesSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    PermissionPrompt,
    TrackingMode,
    RoutingMode,
}

pub struct App<P, C, F, G, R> {
    screen: Screen,
    loading: bool,
    prefs: P,
    session: MapSession<C, F>,
    planner: RoutePlanner<G, R>,
    start_suggestions: SuggestionSource<G>,
    end_suggestions: SuggestionSource<G>,
}

impl<P, C, F, G, R> App<P, C, F, G, R>
where
    P: PreferenceStore,
    C: CapabilitiesSource,
    F: SurfaceFactory,
    G: Geocoder + Clone,
    R: Router,
{
    pub fn new(prefs: P, session: MapSession<C, F>, geocoder: G, router: R) -> Self {
        Self {
            screen: Screen::default(),
            loading: false,
            prefs,
            session,
            // Only the start field offers the device-location entry.
            start_suggestions: SuggestionSource::new(geocoder.clone()).with_current_position(),
            end_suggestions: SuggestionSource::new(geocoder.clone()),
            planner: RoutePlanner::new(geocoder, router),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn session(&self) -> &MapSession<C, F> {
        &self.session
    }

    pub fn planner(&self) -> &RoutePlanner<G, R> {
        &self.planner
    }

    /// Tracking is gated on the stored preference; without it the permission
    /// prompt is shown first.
    pub async fn choose_tracking(&mut self) -> Result<(), AppError> {
        if self.prefs.always_allow() {
            self.enter(SessionMode::Tracking).await
        } else {
            self.screen = Screen::PermissionPrompt;
            Ok(())
        }
    }

    /// Explicit grant from the prompt. "Always" persists the flag, "once"
    /// clears any stored flag so the prompt returns next time.
    pub async fn grant_permission(&mut self, remember: bool) -> Result<(), AppError> {
        self.prefs.set_always_allow(remember)?;
        self.enter(SessionMode::Tracking).await
    }

    pub fn deny_permission(&mut self) {
        self.screen = Screen::Home;
    }

    /// Routing has no permission gate.
    pub async fn choose_routing(&mut self) -> Result<(), AppError> {
        self.enter(SessionMode::Routing).await
    }

    /// Back action, legal from every screen. Tears down whichever session
    /// mode is active; idempotent when none is.
    pub fn go_home(&mut self) {
        self.session.destroy();
        self.planner.reset();
        self.loading = false;
        self.screen = Screen::Home;
    }

    /// The "always allow" checkbox shown during tracking.
    pub fn set_always_allow(&mut self, granted: bool) -> Result<(), AppError> {
        self.prefs.set_always_allow(granted)
    }

    async fn enter(&mut self, mode: SessionMode) -> Result<(), AppError> {
        self.screen = match mode {
            SessionMode::Tracking => Screen::TrackingMode,
            SessionMode::Routing => Screen::RoutingMode,
        };
        self.loading = true;
        match self.session.init(mode).await {
            Ok(()) => {
                // A tracking screen stays in loading until the first fix or
                // error arrives; the routing map is ready as soon as built.
                if mode == SessionMode::Routing {
                    self.loading = false;
                }
                Ok(())
            }
            Err(err) => {
                self.loading = false;
                Err(err)
            }
        }
    }

    // --- tracking mode ---

    pub fn start_tracking(
        &mut self,
        on_position: impl FnMut(Coordinate) + Send + 'static,
        on_error: impl FnMut(&AppError) + Send + 'static,
    ) -> Result<(), AppError> {
        self.session.start_tracking(on_position, on_error)
    }

    pub fn stop_tracking(&mut self) {
        self.session.stop_tracking();
    }

    pub fn push_position(&mut self, fix: PositionFix) {
        self.session.push_position(fix);
        self.loading = false;
    }

    pub fn push_error(&mut self, error: &AppError) {
        self.session.push_error(error);
        self.loading = false;
    }

    // --- routing mode ---

    /// Record a keystroke. The suggestion fetch is separate (`suggest_start`)
    /// and borrows the controller shared, so a newer keystroke's fetch can
    /// run while an older one is still waiting out its quiet period and
    /// supersede it.
    pub fn on_start_input(&mut self, text: &str) {
        self.planner.set_start_text(text);
    }

    pub fn on_end_input(&mut self, text: &str) {
        self.planner.set_end_text(text);
    }

    pub async fn suggest_start(&self, text: &str) -> SuggestionUpdate {
        self.start_suggestions.on_input(text).await
    }

    pub async fn suggest_end(&self, text: &str) -> SuggestionUpdate {
        self.end_suggestions.on_input(text).await
    }

    pub fn on_start_focus(&self) -> Vec<Suggestion> {
        self.start_suggestions.on_focus(self.planner.start().text())
    }

    pub fn on_end_focus(&self) -> Vec<Suggestion> {
        self.end_suggestions.on_focus(self.planner.end().text())
    }

    pub async fn select_start<L: DeviceLocator>(
        &mut self,
        suggestion: &Suggestion,
        locator: &L,
    ) -> Result<(), AppError> {
        let (label, coordinate) = resolve_suggestion(suggestion, locator).await?;
        self.planner.select_start(label, coordinate);
        Ok(())
    }

    pub async fn select_end<L: DeviceLocator>(
        &mut self,
        suggestion: &Suggestion,
        locator: &L,
    ) -> Result<(), AppError> {
        let (label, coordinate) = resolve_suggestion(suggestion, locator).await?;
        self.planner.select_end(label, coordinate);
        Ok(())
    }

    pub async fn compute_route(&mut self) -> Result<RouteOutcome, AppError> {
        let Self {
            planner,
            session,
            loading,
            ..
        } = self;
        let Some(surface) = session.surface_mut() else {
            return Err(AppError::MapInit("routing map is not initialised".to_string()));
        };
        *loading = true;
        let result = planner.compute_route(surface).await;
        *loading = false;
        result
    }

    pub async fn set_profile(&mut self, profile: TransportProfile) -> Result<RouteOutcome, AppError> {
        let Self {
            planner,
            session,
            loading,
            ..
        } = self;
        let Some(surface) = session.surface_mut() else {
            return Err(AppError::MapInit("routing map is not initialised".to_string()));
        };
        *loading = true;
        let result = planner.set_profile(profile, surface).await;
        *loading = false;
        result
    }
}
