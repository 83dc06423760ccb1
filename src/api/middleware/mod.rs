//! API middleware.
//!
//! Caller identity is an extractor (`types::Caller`), so only request
//! logging and response shaping run as layers.

pub mod logging;
pub mod method;
