//! REST ゲートウェイの実装
//!
//! - `http`: reqwest を使った NotificationGateway / AvailabilityGateway 実装

pub mod http;

pub use http::HttpBackendGateway;
