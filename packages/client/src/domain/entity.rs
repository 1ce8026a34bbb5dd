//! エンティティ定義
//!
//! Booking はサーバー側が正である状態のローカルプロジェクション（読み取り用
//! コピー）です。この同期コアが予約を新規作成することはありません。作成は
//! REST 経由で行われ、ここではイベントとして観測されるだけです。

use super::value_object::{BookingId, BookingStatus, PaymentStatus, Timestamp, UserId};

/// 予約のローカルプロジェクション
///
/// 正式なレコードは除外対象の CRUD バックエンドに存在します。ここでは
/// イベントで届いたスナップショットを「最後に観測した値が勝つ」規則で
/// 上書き保持するだけです。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub status: BookingStatus,
    pub payment_status: Option<PaymentStatus>,
    pub customer_id: UserId,
    pub specialist_id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// ローカルで合成されるユーザー向け通知
///
/// 予約ステータス変更イベントから合成されます。ID は決定的に
/// `booking-{bookingId}-{timestamp}` となります。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub booking_id: BookingId,
    pub status: BookingStatus,
    pub message: String,
    pub created_at: Timestamp,
    pub read: bool,
}

impl Notification {
    /// 予約ステータス変更から通知を合成
    pub fn from_status_change(
        booking_id: BookingId,
        status: BookingStatus,
        now: Timestamp,
    ) -> Self {
        let id = format!("booking-{}-{}", booking_id, now.value());
        let message = match status {
            BookingStatus::PendingPayment => {
                format!("Booking {} is awaiting payment", booking_id)
            }
            BookingStatus::Confirmed => format!("Booking {} has been confirmed", booking_id),
            BookingStatus::InProgress => format!("Booking {} is now in progress", booking_id),
            BookingStatus::Completed => format!("Booking {} has been completed", booking_id),
            BookingStatus::Cancelled => format!("Booking {} has been cancelled", booking_id),
            BookingStatus::Pending => format!("Booking {} is pending", booking_id),
        };
        Self {
            id,
            booking_id,
            status,
            message,
            created_at: now,
            read: false,
        }
    }
}
