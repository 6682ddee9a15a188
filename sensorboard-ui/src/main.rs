//! Sensorboard Dashboard
//!
//! Browser dashboard built with Leptos (WASM). Polls `/sensor-data` on the
//! serving origin every two seconds, writes the latest temperature and
//! humidity into the page and redraws a two-series line chart.
//!
//! # Architecture
//!
//! The fetch, transform and render cycle lives in the `sensorboard` crate.
//! This crate supplies the browser pieces it runs against: a gloo-net
//! source, a DOM-backed page and a canvas chart surface.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
