//! One route endpoint: the field text plus at most one resolved coordinate.
//! A selection is only trusted while the text that produced it is still
//! displayed, so any edit drops it.

use shared::{Coordinate, Suggestion};

use crate::error::AppError;
use crate::ors::Geocoder;

#[derive(Debug, Default, Clone)]
pub struct EndpointField {
    text: String,
    selection: Option<Coordinate>,
}

impl EndpointField {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> Option<Coordinate> {
        self.selection
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Replace the displayed text; an actual change invalidates the selection.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.selection = None;
        }
        self.text = text;
    }

    pub fn apply_selection(&mut self, label: impl Into<String>, coordinate: Coordinate) {
        self.text = label.into();
        self.selection = Some(coordinate);
    }

    pub fn reset(&mut self) {
        self.text.clear();
        self.selection = None;
    }
}

/// Resolve a field to a coordinate: a live selection wins, otherwise one
/// geocode call for the top match. A user may type a full place name and
/// trigger calculation without ever clicking a suggestion. A successful
/// fallback is stored as the field's selection (the text is unchanged, so the
/// text/coordinate pairing stays valid) and later operations reuse it without
/// re-geocoding.
pub async fn resolve<G: Geocoder>(
    field: &mut EndpointField,
    geocoder: &G,
) -> Result<Coordinate, AppError> {
    if let Some(coordinate) = field.selection {
        return Ok(coordinate);
    }
    match geocoder.search_one(field.text.trim()).await? {
        Some(Suggestion::Geocoded { coordinate, .. }) => {
            field.selection = Some(coordinate);
            Ok(coordinate)
        }
        _ => Err(AppError::CityNotFound(field.text.clone())),
    }
}
