//! Debounced autocomplete source. Every keystroke (re)arms a quiet-period
//! timer; only the most recently issued request may update the visible list,
//! enforced by a monotonically increasing generation counter shared between
//! concurrent invocations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shared::{Coordinate, Suggestion};

use crate::error::AppError;
use crate::ors::Geocoder;
use crate::track::DeviceLocator;

pub const MIN_QUERY_LEN: usize = 3;
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);
pub const SUGGESTION_LIMIT: usize = 5;

/// Label shown in the field once the device position has been selected.
pub const DEVICE_LOCATION_LABEL: &str = "Ma position";

/// Outcome of one keystroke once its quiet period has settled.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionUpdate {
    /// Replace the visible list with these entries.
    Show(Vec<Suggestion>),
    /// Empty the visible list (input shorter than the minimum).
    Clear,
    /// A newer keystroke superseded this one; leave the list alone.
    Superseded,
}

pub struct SuggestionSource<G> {
    geocoder: G,
    generation: Arc<AtomicU64>,
    current_position_eligible: bool,
}

impl<G: Geocoder> SuggestionSource<G> {
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            generation: Arc::new(AtomicU64::new(0)),
            current_position_eligible: false,
        }
    }

    /// Offer the synthetic device-location entry when the field gains focus
    /// while empty.
    pub fn with_current_position(mut self) -> Self {
        self.current_position_eligible = true;
        self
    }

    /// Handle one keystroke. Short inputs clear immediately; anything else
    /// waits out the quiet period, then fetches unless a newer keystroke has
    /// arrived in the meantime. Fetch failures degrade to an empty list.
    pub async fn on_input(&self, text: &str) -> SuggestionUpdate {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if text.chars().count() < MIN_QUERY_LEN {
            return SuggestionUpdate::Clear;
        }

        tokio::time::sleep(QUIET_PERIOD).await;
        if self.generation.load(Ordering::SeqCst) != token {
            return SuggestionUpdate::Superseded;
        }

        let suggestions = match self.geocoder.autocomplete(text, SUGGESTION_LIMIT).await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("autocomplete failed for {text:?}: {err}");
                Vec::new()
            }
        };

        // A slow response must not clobber the result of a newer request.
        if self.generation.load(Ordering::SeqCst) != token {
            return SuggestionUpdate::Superseded;
        }
        SuggestionUpdate::Show(suggestions)
    }

    pub fn on_focus(&self, current_text: &str) -> Vec<Suggestion> {
        if self.current_position_eligible && current_text.is_empty() {
            vec![Suggestion::DeviceLocation]
        } else {
            Vec::new()
        }
    }
}

/// Resolve a clicked suggestion into the label and coordinate to store in the
/// field. The device-location entry triggers a one-shot location request,
/// distinct from continuous tracking.
pub async fn resolve_suggestion<L: DeviceLocator>(
    suggestion: &Suggestion,
    locator: &L,
) -> Result<(String, Coordinate), AppError> {
    match suggestion {
        Suggestion::Geocoded { label, coordinate } => Ok((label.clone(), *coordinate)),
        Suggestion::DeviceLocation => {
            let coordinate = locator.current_position().await?;
            Ok((DEVICE_LOCATION_LABEL.to_string(), coordinate))
        }
    }
}
