//! Route pipeline: resolve both endpoints, call the routing provider with the
//! selected profile, hand the geometry to the surface and format the summary.
//! Overlapping invocations are serialized with a pending guard; a new request
//! while one is in flight is skipped.

use shared::{RouteSummary, TransportProfile};

use crate::endpoint::{self, EndpointField};
use crate::error::AppError;
use crate::ors::{Geocoder, Router};
use crate::surface::{MapSurface, FIT_PADDING_PX};
use crate::ui;

/// Formatted summary for the stats display.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStats {
    pub distance: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Computed(RouteStats),
    /// Nothing was done: a computation was already in flight, or the profile
    /// change had nothing to recompute.
    Skipped,
}

pub struct RoutePlanner<G, R> {
    geocoder: G,
    router: R,
    start: EndpointField,
    end: EndpointField,
    profile: TransportProfile,
    pending: bool,
    last_summary: Option<RouteSummary>,
}

impl<G: Geocoder, R: Router> RoutePlanner<G, R> {
    pub fn new(geocoder: G, router: R) -> Self {
        Self {
            geocoder,
            router,
            start: EndpointField::default(),
            end: EndpointField::default(),
            profile: TransportProfile::default(),
            pending: false,
            last_summary: None,
        }
    }

    pub fn with_profile(mut self, profile: TransportProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn start(&self) -> &EndpointField {
        &self.start
    }

    pub fn end(&self) -> &EndpointField {
        &self.end
    }

    pub fn profile(&self) -> TransportProfile {
        self.profile
    }

    pub fn last_summary(&self) -> Option<RouteSummary> {
        self.last_summary
    }

    pub fn set_start_text(&mut self, text: impl Into<String>) {
        self.start.set_text(text);
    }

    pub fn set_end_text(&mut self, text: impl Into<String>) {
        self.end.set_text(text);
    }

    pub fn select_start(&mut self, label: impl Into<String>, coordinate: shared::Coordinate) {
        self.start.apply_selection(label, coordinate);
    }

    pub fn select_end(&mut self, label: impl Into<String>, coordinate: shared::Coordinate) {
        self.end.apply_selection(label, coordinate);
    }

    /// Mode teardown: endpoints, stats and the in-flight guard all reset.
    pub fn reset(&mut self) {
        self.start.reset();
        self.end.reset();
        self.last_summary = None;
        self.pending = false;
    }

    /// Run the full pipeline. Both fields are validated non-empty before
    /// either resolution begins; resolution is start first, first failure
    /// wins. The previously displayed route is only cleared once both
    /// endpoints resolved.
    pub async fn compute_route(
        &mut self,
        surface: &mut dyn MapSurface,
    ) -> Result<RouteOutcome, AppError> {
        if self.pending {
            tracing::debug!("route computation already in flight, skipping");
            return Ok(RouteOutcome::Skipped);
        }
        if self.start.is_empty() {
            return Err(AppError::Validation("départ"));
        }
        if self.end.is_empty() {
            return Err(AppError::Validation("arrivée"));
        }

        self.pending = true;
        let result = self.compute_inner(surface).await;
        self.pending = false;
        result.map(RouteOutcome::Computed)
    }

    async fn compute_inner(
        &mut self,
        surface: &mut dyn MapSurface,
    ) -> Result<RouteStats, AppError> {
        let start = endpoint::resolve(&mut self.start, &self.geocoder).await?;
        let end = endpoint::resolve(&mut self.end, &self.geocoder).await?;

        surface.clear_path();
        self.last_summary = None;

        let route = self.router.directions(start, end, self.profile).await?;

        surface.display_path(&route.segments);
        if let Some(bounds) = route.bounds() {
            surface.fit_extent(bounds, FIT_PADDING_PX);
        }

        let stats = RouteStats {
            distance: ui::format_distance(route.summary.distance_m),
            duration: ui::format_duration(route.summary.duration_s),
        };
        self.last_summary = Some(route.summary);
        tracing::info!(
            distance = %stats.distance,
            duration = %stats.duration,
            profile = self.profile.api_code(),
            "route computed"
        );
        Ok(stats)
    }

    /// Switching profile while both endpoints hold a resolved coordinate
    /// recomputes immediately, without re-resolving either field.
    pub async fn set_profile(
        &mut self,
        profile: TransportProfile,
        surface: &mut dyn MapSurface,
    ) -> Result<RouteOutcome, AppError> {
        if profile == self.profile {
            return Ok(RouteOutcome::Skipped);
        }
        self.profile = profile;
        if self.start.selection().is_some() && self.end.selection().is_some() {
            self.compute_route(surface).await
        } else {
            Ok(RouteOutcome::Skipped)
        }
    }
}
