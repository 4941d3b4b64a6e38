//! egui front-end: widgets feeding the session, and rendering of its results.

pub mod panels;
pub mod plot;
