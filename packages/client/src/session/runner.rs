//! 再接続付きのセッション実行ループ

use std::sync::Arc;
use std::time::Duration;

use crate::domain::TransportError;

use super::session::{SessionEnd, SyncSession};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// 再接続を試みるべきか
///
/// 接続が一度確立されていれば試行回数はリセットされるため、ここでの
/// 判定は「連続して失敗した回数」に対するものです。
fn should_attempt_reconnect(consecutive_failures: u32, max_attempts: u32) -> bool {
    consecutive_failures < max_attempts
}

/// セッションを再接続付きで実行する
///
/// - 接続確立後の切断: 試行回数をリセットして再接続する
/// - 接続の確立に失敗: 一定間隔を置いて再試行し、連続
///   `MAX_RECONNECT_ATTEMPTS` 回の失敗で最後のエラーを返す
/// - 別の受信ループが既に動作中: 何もせず終了する
pub async fn run_session(session: Arc<SyncSession>) -> Result<(), TransportError> {
    let mut consecutive_failures = 0;

    loop {
        tracing::info!(
            "Attempting to connect as '{}' (attempt {}/{})",
            session.identity().user_id,
            consecutive_failures + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match session.run_once().await {
            Ok(SessionEnd::AlreadyActive) => {
                tracing::warn!("Another session loop is already active, exiting");
                return Ok(());
            }
            Ok(SessionEnd::Closed) => {
                tracing::warn!("Connection closed, reconnecting");
                consecutive_failures = 0;
            }
            Err(e) => {
                tracing::warn!("Connection failed: {}", e);
                consecutive_failures += 1;

                if !should_attempt_reconnect(consecutive_failures, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to connect after {} attempts, giving up",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }
            }
        }

        tracing::info!("Reconnecting in {} seconds...", RECONNECT_INTERVAL_SECS);
        tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
    }
}
