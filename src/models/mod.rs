//! Data models for the file browser.
//!
//! These serialize naturally as JSON via `serde` and are shared between the
//! API handlers and the rendered page.

pub mod file;
pub mod note;
