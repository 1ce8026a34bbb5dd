//! 同期セッション（SyncSession）
//!
//! 接続マネージャ・Room レジストリ・ディスパッチャ・プロジェクター・
//! 調停器をひとつのセッションとして配線します。
//!
//! ## ライフサイクル
//!
//! - `new()` でハンドラの配線まで済ませる（接続はまだ張らない）
//! - `run_once()` が接続を確立し、Room を購読し直し、接続が閉じるまで
//!   受信イベントを配送する
//! - 接続断では購読集合と待機中の調停タイマーを破棄する（再接続後の
//!   `run_once()` が購読を回復する）
//! - `teardown()` はセッションを完全に破棄する（サインアウト時）

use std::sync::Arc;

use tokio::sync::mpsc;

use yoyaku_shared::time::Clock;

use crate::domain::{
    EventKind, Identity, NotificationGateway, RoomId, ServerEvent, Timestamp, Transport,
    TransportError, TransportEvent,
};
use crate::infrastructure::dto::conversion::parse_inbound;
use crate::usecase::{
    BadgeUpdate, BookingProjector, DEFAULT_DEBOUNCE, NotificationCountReconciler,
};

use super::{ConnectionManager, EventDispatcher, RoomRegistry};

/// `run_once()` の終了理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// 接続が閉じられ、受信ループが終了した（再接続の候補）
    Closed,
    /// 既に受信ループが動作中のため合流した
    AlreadyActive,
}

/// 同期セッション
pub struct SyncSession {
    identity: Identity,
    manager: ConnectionManager,
    rooms: RoomRegistry,
    dispatcher: EventDispatcher,
    projector: Arc<BookingProjector>,
    reconciler: Arc<NotificationCountReconciler>,
    clock: Arc<dyn Clock>,
}

impl SyncSession {
    /// セッションを構築し、既定のハンドラを配線する
    pub fn new(
        identity: Identity,
        transport: Arc<dyn Transport>,
        gateway: Arc<dyn NotificationGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let reconciler = NotificationCountReconciler::new(gateway, DEFAULT_DEBOUNCE);
        let projector =
            BookingProjector::new(identity.role, Arc::clone(&reconciler), Arc::clone(&clock));
        let dispatcher = EventDispatcher::new();

        // 予約・決済イベント → プロジェクター
        for kind in [
            EventKind::BookingStatusChanged,
            EventKind::BookingCreated,
            EventKind::BookingUpdated,
            EventKind::PaymentStatusChanged,
        ] {
            let projector = Arc::clone(&projector);
            dispatcher.on(kind, move |inbound| projector.apply(inbound));
        }

        // 通知イベント → 調停器
        {
            let reconciler = Arc::clone(&reconciler);
            dispatcher.on(EventKind::NotificationCreated, move |_inbound| {
                reconciler.apply_optimistic_delta(1);
            });
        }
        for kind in [EventKind::NotificationRead, EventKind::NotificationDeleted] {
            let reconciler = Arc::clone(&reconciler);
            dispatcher.on(kind, move |_inbound| {
                reconciler.apply_optimistic_delta(-1);
            });
        }
        {
            let reconciler = Arc::clone(&reconciler);
            dispatcher.on(EventKind::NotificationsMarkedAllRead, move |_inbound| {
                reconciler.apply_mark_all_read();
            });
        }
        {
            let reconciler = Arc::clone(&reconciler);
            dispatcher.on(EventKind::UnreadCountSnapshot, move |inbound| {
                if let ServerEvent::UnreadCountSnapshot { unread_count } = inbound.event {
                    reconciler.apply_snapshot(unread_count);
                }
            });
        }

        Self {
            identity,
            manager: ConnectionManager::new(transport),
            rooms: RoomRegistry::new(),
            dispatcher,
            projector,
            reconciler,
            clock,
        }
    }

    /// 接続を確立し、閉じられるまで受信イベントを配送する
    ///
    /// 接続の確立に失敗した場合はエラーを返します（リトライはランナーの
    /// 責務）。確立後の接続断はエラーではなく `SessionEnd::Closed` です。
    pub async fn run_once(&self) -> Result<SessionEnd, TransportError> {
        let Some(mut receiver) = self.manager.connect().await? else {
            return Ok(SessionEnd::AlreadyActive);
        };
        tracing::info!("Session connected as {}", self.identity.user_id);

        self.rooms.rejoin(&self.manager, &self.identity).await?;

        while let Some(event) = receiver.recv().await {
            match event {
                TransportEvent::Message(text) => {
                    let received_at = Timestamp::new(self.clock.now_millis());
                    if let Some(inbound) = parse_inbound(&text, received_at) {
                        self.dispatcher.dispatch(&inbound);
                    }
                }
                TransportEvent::Closed => break,
            }
        }

        tracing::info!("Session connection closed");
        self.manager.mark_disconnected();
        self.rooms.clear();
        // 切断中の調停発火を防ぐ（再接続後のデルタが改めて張り直す）
        self.reconciler.cancel_pending();
        Ok(SessionEnd::Closed)
    }

    /// セッションを完全に破棄する（サインアウト・終了時）
    pub async fn teardown(&self) {
        self.manager.disconnect().await;
        self.rooms.clear();
        self.reconciler.teardown();
        self.dispatcher.clear();
    }

    /// 追加の Room（予約 Room など）へ join する
    pub async fn join_room(&self, room: RoomId) -> Result<(), TransportError> {
        self.rooms.join_room(&self.manager, room).await
    }

    /// Room から leave する
    pub async fn leave_room(&self, room: RoomId) -> Result<(), TransportError> {
        self.rooms.leave_room(&self.manager, room).await
    }

    /// 未読バッジ更新の購読を開始
    pub fn subscribe_badge(&self) -> mpsc::UnboundedReceiver<BadgeUpdate> {
        self.reconciler.subscribe()
    }

    /// 予約プロジェクションへの読み取り面
    pub fn projector(&self) -> &Arc<BookingProjector> {
        &self.projector
    }

    /// UI などがハンドラを追加登録するためのディスパッチャ
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
