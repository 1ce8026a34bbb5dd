//! サーバーから受信するイベントの閉じた直和型
//!
//! ワイヤ上のイベント種別は文字列タグですが、ドメイン層では網羅検査可能な
//! enum として扱います。未知の種別はこの型に到達する前（DTO 変換時）に
//! 黙って捨てられます（前方互換性のため）。

use super::entity::Booking;
use super::value_object::{BookingId, BookingStatus, PaymentStatus, Timestamp};

/// イベント種別（ディスパッチャのハンドラ登録キー）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BookingStatusChanged,
    BookingCreated,
    BookingUpdated,
    NotificationCreated,
    NotificationRead,
    NotificationDeleted,
    NotificationsMarkedAllRead,
    UnreadCountSnapshot,
    PaymentStatusChanged,
}

/// 予約ステータス変更イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingStatusChanged {
    pub booking_id: BookingId,
    pub status: BookingStatus,
    /// ペイロードに予約スナップショットが同梱されていた場合のみ Some
    pub booking: Option<Booking>,
}

/// 決済ステータス変更イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatusChanged {
    pub booking_id: BookingId,
    pub payment_status: PaymentStatus,
}

/// 通知単体に対するイベント（作成・既読・削除）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRef {
    pub notification_id: Option<String>,
}

/// サーバーイベントの閉じた直和型
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    BookingStatusChanged(BookingStatusChanged),
    BookingCreated(Booking),
    BookingUpdated(Booking),
    NotificationCreated(NotificationRef),
    NotificationRead(NotificationRef),
    NotificationDeleted(NotificationRef),
    NotificationsMarkedAllRead,
    UnreadCountSnapshot { unread_count: u32 },
    PaymentStatusChanged(PaymentStatusChanged),
}

impl ServerEvent {
    /// このイベントの種別
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::BookingStatusChanged(_) => EventKind::BookingStatusChanged,
            ServerEvent::BookingCreated(_) => EventKind::BookingCreated,
            ServerEvent::BookingUpdated(_) => EventKind::BookingUpdated,
            ServerEvent::NotificationCreated(_) => EventKind::NotificationCreated,
            ServerEvent::NotificationRead(_) => EventKind::NotificationRead,
            ServerEvent::NotificationDeleted(_) => EventKind::NotificationDeleted,
            ServerEvent::NotificationsMarkedAllRead => EventKind::NotificationsMarkedAllRead,
            ServerEvent::UnreadCountSnapshot { .. } => EventKind::UnreadCountSnapshot,
            ServerEvent::PaymentStatusChanged(_) => EventKind::PaymentStatusChanged,
        }
    }
}

/// 受信時刻付きイベント
///
/// ワイヤにシーケンス番号が存在しないため、同一エンティティ・同一種別の
/// イベント間では「最後に観測した値が勝つ」以上の順序保証はありません。
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub event: ServerEvent,
    pub received_at: Timestamp,
}

impl InboundEvent {
    pub fn new(event: ServerEvent, received_at: Timestamp) -> Self {
        Self { event, received_at }
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}
