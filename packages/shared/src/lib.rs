//! Shared utilities for the yoyaku booking-marketplace sync core.
//!
//! Cross-cutting concerns used by every package: time (clock abstraction,
//! JST timestamps) and logging setup.

pub mod logger;
pub mod time;
