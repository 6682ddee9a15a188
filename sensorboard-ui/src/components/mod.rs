//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod chart;
pub mod reading_card;

pub use chart::{CanvasSurface, Chart};
pub use reading_card::ReadingCard;
