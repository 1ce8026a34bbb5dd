//! Infrastructure 層
//!
//! ドメイン層が定義するポートの具体的な実装と、プロトコル境界の DTO を
//! 提供します。
//!
//! - `dto`: ワイヤ形式（WebSocket / HTTP）の DTO とドメインへの変換
//! - `transport`: tokio-tungstenite による `Transport` 実装
//! - `gateway`: reqwest による REST ゲートウェイ実装

pub mod dto;
pub mod gateway;
pub mod transport;
