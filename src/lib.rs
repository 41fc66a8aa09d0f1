//! Vehicle listings browser: taxonomy-driven model lookup and listing
//! filtering behind an egui front end.

pub mod ads;
pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
