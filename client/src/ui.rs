//! Pure display formatting. Layout is the embedder's business; the core only
//! produces the strings.

use shared::Coordinate;

use crate::error::AppError;

/// Kilometres to one decimal above 1000 m, whole metres below.
pub fn format_distance(meters: f64) -> String {
    if meters > 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{} m", meters.round() as i64)
    }
}

/// `"{h}h {m}min"` above one hour, `"{m} min"` below; minutes are rounded.
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round() as i64;
    if minutes > 60 {
        format!("{}h {}min", minutes / 60, minutes % 60)
    } else {
        format!("{minutes} min")
    }
}

pub fn position_popup(at: Coordinate) -> String {
    format!(
        "Votre position\nVous êtes ici !\nLat: {:.5}, Lon: {:.5}",
        at.lat, at.lon
    )
}

pub fn error_popup(error: &AppError) -> String {
    format!("Erreur\nImpossible de vous localiser.\n{error}")
}
