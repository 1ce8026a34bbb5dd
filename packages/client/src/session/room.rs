//! Room 購読の管理（RoomRegistry）
//!
//! ## 契約
//!
//! - `join_room` / `leave_room` は接続中のみサーバーへコマンドを送る。
//!   未接続時は no-op（購読は接続確立後の `rejoin` で回復する）。
//! - 同一 Room への二重 join は冪等（コマンドは一度しか送られない）。
//! - `rejoin` は古い購読集合を破棄してから、アイデンティティから導出した
//!   Room 集合（個人 Room + ロール Room）へ join し直す。再接続で古い
//!   ロールの Room が残ることはない。

use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::{Identity, OutboundFrame, RoomId, TransportError};

use super::ConnectionManager;

/// Room 購読レジストリ
pub struct RoomRegistry {
    joined: Mutex<HashSet<RoomId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            joined: Mutex::new(HashSet::new()),
        }
    }

    /// Room へ join する（未接続時・参加済みは no-op）
    pub async fn join_room(
        &self,
        manager: &ConnectionManager,
        room: RoomId,
    ) -> Result<(), TransportError> {
        if !manager.is_connected() {
            tracing::debug!("join_room({}) skipped, not connected", room);
            return Ok(());
        }
        {
            let joined = self.joined.lock().expect("joined lock poisoned");
            if joined.contains(&room) {
                return Ok(());
            }
        }

        manager
            .transport()
            .send(OutboundFrame::JoinRoom(room.clone()))
            .await?;
        self.joined
            .lock()
            .expect("joined lock poisoned")
            .insert(room);
        Ok(())
    }

    /// Room から leave する（未接続時・未参加は no-op）
    pub async fn leave_room(
        &self,
        manager: &ConnectionManager,
        room: RoomId,
    ) -> Result<(), TransportError> {
        if !manager.is_connected() {
            tracing::debug!("leave_room({}) skipped, not connected", room);
            return Ok(());
        }
        let was_joined = self
            .joined
            .lock()
            .expect("joined lock poisoned")
            .remove(&room);
        if !was_joined {
            return Ok(());
        }

        manager
            .transport()
            .send(OutboundFrame::LeaveRoom(room))
            .await
    }

    /// 購読集合をアイデンティティから再構築する（接続確立のたびに呼ぶ）
    ///
    /// 古い購読集合は先に破棄されるため、ロール切り替えを挟んだ再接続でも
    /// 前のロールの Room へ join し直すことはない。
    pub async fn rejoin(
        &self,
        manager: &ConnectionManager,
        identity: &Identity,
    ) -> Result<(), TransportError> {
        self.clear();
        self.join_room(manager, identity.personal_room()).await?;
        self.join_room(manager, identity.role_room()).await?;
        Ok(())
    }

    /// ローカルの購読集合を破棄する（サーバーへは何も送らない）
    pub fn clear(&self) {
        self.joined.lock().expect("joined lock poisoned").clear();
    }

    pub fn joined(&self) -> HashSet<RoomId> {
        self.joined.lock().expect("joined lock poisoned").clone()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
