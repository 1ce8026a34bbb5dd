//! WebSocket message DTOs.
//!
//! 受信イベントは `type` フィールドでタグ付けされた閉じた直和型として
//! デシリアライズします。列挙にない `type` はデシリアライズエラーに
//! なり、呼び出し側（`conversion::parse_inbound`)で黙って捨てられます
//! （サーバー側が新しいイベント種別を追加しても壊れない前方互換性）。

use serde::{Deserialize, Serialize};

/// 予約スナップショット DTO
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    pub customer_id: String,
    pub specialist_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 予約ステータス変更イベントのペイロード
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusChangedDto {
    pub booking_id: String,
    pub status: String,
    #[serde(default)]
    pub booking: Option<BookingDto>,
}

/// 予約作成・更新イベントのペイロード
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingEventDto {
    pub booking: BookingDto,
}

/// 通知単体イベントのペイロード
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEventDto {
    #[serde(default)]
    pub notification_id: Option<String>,
}

/// 未読数スナップショットのペイロード
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountDto {
    pub unread_count: u32,
}

/// 決済ステータス変更イベントのペイロード
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusChangedDto {
    pub booking_id: String,
    pub payment_status: String,
}

/// サーバーから受信するイベントのワイヤ表現
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WireEvent {
    #[serde(rename = "booking:status_changed")]
    BookingStatusChanged(BookingStatusChangedDto),
    #[serde(rename = "booking:created")]
    BookingCreated(BookingEventDto),
    #[serde(rename = "booking:updated")]
    BookingUpdated(BookingEventDto),
    #[serde(rename = "notification:created")]
    NotificationCreated(NotificationEventDto),
    #[serde(rename = "notification:read")]
    NotificationRead(NotificationEventDto),
    #[serde(rename = "notification:deleted")]
    NotificationDeleted(NotificationEventDto),
    #[serde(rename = "notification:mark_all_read")]
    NotificationsMarkedAllRead {},
    #[serde(rename = "notification:unread_count")]
    UnreadCountSnapshot(UnreadCountDto),
    #[serde(rename = "payment:status_changed")]
    PaymentStatusChanged(PaymentStatusChangedDto),
}

/// クライアントからサーバーへ送るコマンドのワイヤ表現
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "action")]
pub enum WireCommand {
    #[serde(rename = "join_room")]
    JoinRoom { room: String },
    #[serde(rename = "leave_room")]
    LeaveRoom { room: String },
}
