//! State Management
//!
//! The DOM-backed page the poller writes to.

pub mod dom;

pub use dom::DomPage;
