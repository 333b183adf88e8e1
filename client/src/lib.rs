//! Core of a map client: screen navigation, map session lifecycle, live
//! position tracking and route planning against openrouteservice, with the
//! actual rendering surface abstracted behind a trait.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod map;
pub mod ors;
pub mod prefs;
pub mod route;
pub mod screen;
pub mod suggest;
pub mod surface;
pub mod track;
pub mod ui;
pub mod wmts;

pub use error::AppError;

#[cfg(test)]
pub(crate) mod test_support;
