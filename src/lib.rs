//! Review sentiment front end: submits a product URL to an analysis backend
//! and renders the reply into a per-session results panel.

pub mod config;
pub mod models;
pub mod panel;
pub mod render;
pub mod server;
pub mod submission;
pub mod tools;
