//! Real-time synchronization core for the yoyaku booking marketplace.
//!
//! This library keeps a client session's booking status projection, payment
//! status, and notification unread-count consistent with the server over a
//! WebSocket channel, despite out-of-order delivery, reconnects, and
//! UI-driven optimistic updates. It also provides the pure scheduling math
//! that expands a weekly working-hours template into concrete bookable
//! blocks and measures elapsed time restricted to business hours.

// layers
pub mod domain;
pub mod infrastructure;
pub mod session;
pub mod usecase;
