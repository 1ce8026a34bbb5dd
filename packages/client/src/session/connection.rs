//! 接続状態機械（ConnectionManager）
//!
//! ## 契約
//!
//! - `connect()` は Connected / Connecting でなければトランスポートを確立
//!   する。Connecting 中の並行呼び出しは合流し（`Ok(None)`）、トランス
//!   ポートが二重に生成されることはない。
//! - 失敗した `connect()` は状態を Disconnected に戻し、エラーを呼び出し
//!   元へ返す。バックグラウンドから例外が送出されることはなく、接続断は
//!   `TransportEvent::Closed` として観測される。
//! - `disconnect()` は無条件にトランスポートを閉じて Disconnected へ移る。
//! - 自動リトライはここでは行わない（ランナーの責務）。

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::domain::{Transport, TransportError, TransportEvent};

/// 接続状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// 接続マネージャ
///
/// サインイン時に生成され、サインアウト・タブ破棄時に破棄される、
/// 明示的に所有されるインスタンスです（ambient なグローバルにしない）。
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    state: Mutex<ConnectionState>,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: Mutex::new(ConnectionState::Disconnected),
        }
    }

    /// トランスポートを確立する
    ///
    /// # Returns
    ///
    /// * `Ok(Some(receiver))` - 接続を確立した（受信チャンネルを返す）
    /// * `Ok(None)` - 既に Connected / Connecting のため合流した
    /// * `Err(_)` - 確立に失敗した（状態は Disconnected のまま）
    pub async fn connect(
        &self,
    ) -> Result<Option<mpsc::UnboundedReceiver<TransportEvent>>, TransportError> {
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            match *state {
                ConnectionState::Connected | ConnectionState::Connecting => {
                    tracing::debug!("connect() coalesced, state is {:?}", *state);
                    return Ok(None);
                }
                ConnectionState::Disconnected => {
                    *state = ConnectionState::Connecting;
                }
            }
        }

        match self.transport.connect().await {
            Ok(receiver) => {
                *self.state.lock().expect("state lock poisoned") = ConnectionState::Connected;
                Ok(Some(receiver))
            }
            Err(e) => {
                *self.state.lock().expect("state lock poisoned") = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    /// トランスポートを無条件に閉じて Disconnected へ移る
    pub async fn disconnect(&self) {
        self.transport.close().await;
        *self.state.lock().expect("state lock poisoned") = ConnectionState::Disconnected;
    }

    /// 接続断の観測を状態へ反映する（受信ループが `Closed` を見たとき）
    pub fn mark_disconnected(&self) {
        *self.state.lock().expect("state lock poisoned") = ConnectionState::Disconnected;
    }

    pub fn is_connected(&self) -> bool {
        *self.state.lock().expect("state lock poisoned") == ConnectionState::Connected
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().expect("state lock poisoned")
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}
