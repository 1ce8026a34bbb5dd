//! セッション層
//!
//! 同期セッションの配線とライフサイクルを担います。
//!
//! - `connection`: 接続状態機械（ConnectionManager）
//! - `room`: Room 購読の管理（RoomRegistry）
//! - `dispatcher`: 受信イベントのハンドラ配送（EventDispatcher）
//! - `session`: 上記の配線と受信ループ（SyncSession）
//! - `runner`: 再接続付きの実行ループ

mod connection;
mod dispatcher;
mod room;
mod runner;
#[allow(clippy::module_inception)]
mod session;

pub use connection::{ConnectionManager, ConnectionState};
pub use dispatcher::{EventDispatcher, HandlerId};
pub use room::RoomRegistry;
pub use runner::run_session;
pub use session::{SessionEnd, SyncSession};
