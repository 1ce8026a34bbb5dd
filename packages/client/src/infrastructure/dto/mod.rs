//! Data Transfer Objects (DTOs) for the sync core.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event/command DTOs
//! - `http`: REST request/response DTOs
//!
//! ワイヤ形式は JavaScript 製サーバーの camelCase に合わせています。

pub mod conversion;
pub mod http;
pub mod websocket;
