//! Transport ポートの実装
//!
//! - `websocket`: tokio-tungstenite を使った実装

pub mod websocket;

pub use websocket::WebSocketTransport;
