//! API
//!
//! Sensor-data endpoint access.

pub mod client;

pub use client::GlooSource;
