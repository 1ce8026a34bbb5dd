//! UseCase: 予約状態のプロジェクション
//!
//! 受信した予約・決済イベントをローカルの予約プロジェクションへ反映します。
//!
//! ## 契約
//!
//! - ステータス変更は無条件で上書き（last received wins）。ワイヤに
//!   バージョンやシーケンス番号が無いため、厳密な順序一貫性ではなく
//!   「最終的な一貫性」のみを保証します。
//! - 遷移表にない遷移もサーバーを信頼して適用し、警告ログのみ残します
//!   （相手側のバグの兆候であって、ローカルのエラーではない）。
//! - `booking:created` はスペシャリストのセッションにのみ反映します
//!   （顧客は REST 経由で自ら作成した直後なので push は不要）。
//! - 特定ステータスへの変更時はローカル通知を合成し、調停器へ +1 の
//!   楽観的デルタを通知します。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use yoyaku_shared::time::Clock;

use crate::domain::{
    Booking, BookingId, BookingStatus, InboundEvent, Notification, Role, ServerEvent, Timestamp,
    event::{BookingStatusChanged, PaymentStatusChanged},
};
use crate::usecase::NotificationCountReconciler;

/// 予約状態プロジェクター
pub struct BookingProjector {
    role: Role,
    bookings: Mutex<HashMap<BookingId, Booking>>,
    notifications: Mutex<Vec<Notification>>,
    reconciler: Arc<NotificationCountReconciler>,
    clock: Arc<dyn Clock>,
}

impl BookingProjector {
    pub fn new(
        role: Role,
        reconciler: Arc<NotificationCountReconciler>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            role,
            bookings: Mutex::new(HashMap::new()),
            notifications: Mutex::new(Vec::new()),
            reconciler,
            clock,
        })
    }

    /// REST で取得した予約一覧からプロジェクションを初期化
    pub fn seed(&self, bookings: Vec<Booking>) {
        let mut map = self.bookings.lock().expect("bookings lock poisoned");
        for booking in bookings {
            map.insert(booking.id.clone(), booking);
        }
    }

    /// 受信イベントをプロジェクションへ反映
    pub fn apply(&self, inbound: &InboundEvent) {
        match &inbound.event {
            ServerEvent::BookingStatusChanged(event) => self.apply_status_changed(event),
            ServerEvent::BookingCreated(booking) => self.apply_created(booking),
            ServerEvent::BookingUpdated(booking) => self.upsert(booking.clone()),
            ServerEvent::PaymentStatusChanged(event) => self.apply_payment_changed(event),
            // 通知系イベントは調停器の責務（セッション側で配線される）
            _ => {}
        }
    }

    /// 予約 ID からプロジェクションを取得（UI 向けの読み取り面）
    pub fn booking(&self, id: &BookingId) -> Option<Booking> {
        self.bookings
            .lock()
            .expect("bookings lock poisoned")
            .get(id)
            .cloned()
    }

    /// ローカルで合成された通知の一覧
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .expect("notifications lock poisoned")
            .clone()
    }

    fn apply_status_changed(&self, event: &BookingStatusChanged) {
        {
            let mut bookings = self.bookings.lock().expect("bookings lock poisoned");
            match bookings.get_mut(&event.booking_id) {
                Some(current) => {
                    if !BookingStatus::is_expected_transition(current.status, event.status) {
                        tracing::warn!(
                            "Anomalous booking transition for '{}': {} -> {} (applied anyway)",
                            event.booking_id,
                            current.status,
                            event.status,
                        );
                    }
                    // 同梱スナップショットがあれば丸ごと上書きし、
                    // ワイヤのステータスを最終的な値とする
                    if let Some(snapshot) = &event.booking {
                        *current = snapshot.clone();
                    }
                    current.status = event.status;
                }
                None => match &event.booking {
                    Some(snapshot) => {
                        let mut booking = snapshot.clone();
                        booking.status = event.status;
                        bookings.insert(booking.id.clone(), booking);
                    }
                    None => {
                        // スナップショット無しでは参加者 ID を捏造できない。
                        // 通知の合成は予約 ID だけで可能なので続行する
                        tracing::debug!(
                            "Status change for unknown booking '{}' without snapshot, \
                             projection skipped",
                            event.booking_id,
                        );
                    }
                },
            }
        }

        if event.status.triggers_notification() {
            let now = Timestamp::new(self.clock.now_millis());
            let notification =
                Notification::from_status_change(event.booking_id.clone(), event.status, now);
            tracing::debug!("Synthesized notification '{}'", notification.id);
            self.notifications
                .lock()
                .expect("notifications lock poisoned")
                .push(notification);
            self.reconciler.apply_optimistic_delta(1);
        }
    }

    fn apply_created(&self, booking: &Booking) {
        if self.role != Role::Specialist {
            // 顧客セッションは REST 経由で作成を把握済みのため push は無視
            tracing::debug!(
                "Ignoring booking:created for '{}' on a {} session",
                booking.id,
                self.role.as_str(),
            );
            return;
        }
        self.upsert(booking.clone());
    }

    fn apply_payment_changed(&self, event: &PaymentStatusChanged) {
        let mut bookings = self.bookings.lock().expect("bookings lock poisoned");
        match bookings.get_mut(&event.booking_id) {
            Some(current) => {
                current.payment_status = Some(event.payment_status);
            }
            None => {
                tracing::debug!(
                    "Payment status change for unknown booking '{}', skipped",
                    event.booking_id,
                );
            }
        }
    }

    fn upsert(&self, booking: Booking) {
        let mut bookings = self.bookings.lock().expect("bookings lock poisoned");
        bookings.insert(booking.id.clone(), booking);
    }
}
