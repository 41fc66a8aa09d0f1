pub mod listings;
pub mod panels;
pub mod plot;
