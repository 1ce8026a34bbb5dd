//! 値オブジェクト定義
//!
//! 検証付きのコンストラクタ（`new() -> Result`）を持つ newtype 群。
//! 不正な値はドメイン層に入る前に `DomainError` として弾きます。

use std::fmt;

use super::error::DomainError;

/// 識別子の最大長
const MAX_ID_LENGTH: usize = 64;

fn validate_id(value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::EmptyId);
    }
    if value.len() > MAX_ID_LENGTH {
        return Err(DomainError::IdTooLong(value.to_string(), MAX_ID_LENGTH));
    }
    Ok(())
}

/// ユーザー ID（顧客・スペシャリスト共通）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// 新しい UserId を作成（空文字・長すぎる ID は拒否）
    pub fn new(value: String) -> Result<Self, DomainError> {
        validate_id(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 予約 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookingId(String);

impl BookingId {
    /// 新しい BookingId を作成
    pub fn new(value: String) -> Result<Self, DomainError> {
        validate_id(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix タイムスタンプ（JST, ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// セッションのロール
///
/// Room の購読先（role room）を決定します。顧客は `customer:{id}`、
/// スペシャリストは `specialist:{id}` を購読します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Specialist,
}

impl Role {
    /// このロールに対応する Room のスコープ
    pub fn room_scope(&self) -> RoomScope {
        match self {
            Role::Customer => RoomScope::Customer,
            Role::Specialist => RoomScope::Specialist,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Customer => "customer",
            Role::Specialist => "specialist",
        }
    }
}

/// Room 識別子のスコープ部
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomScope {
    User,
    Customer,
    Specialist,
}

impl RoomScope {
    pub fn as_str(&self) -> &str {
        match self {
            RoomScope::User => "user",
            RoomScope::Customer => "customer",
            RoomScope::Specialist => "specialist",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(RoomScope::User),
            "customer" => Some(RoomScope::Customer),
            "specialist" => Some(RoomScope::Specialist),
            _ => None,
        }
    }
}

/// Room 識別子（`scope:entity_id` 形式の論理チャンネル）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId {
    scope: RoomScope,
    id: UserId,
}

impl RoomId {
    pub fn new(scope: RoomScope, id: UserId) -> Self {
        Self { scope, id }
    }

    /// `"user:123"` のような文字列から RoomId を復元
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let (scope, id) = value
            .split_once(':')
            .ok_or_else(|| DomainError::InvalidRoomId(value.to_string()))?;
        let scope =
            RoomScope::parse(scope).ok_or_else(|| DomainError::InvalidRoomId(value.to_string()))?;
        let id = UserId::new(id.to_string())
            .map_err(|_| DomainError::InvalidRoomId(value.to_string()))?;
        Ok(Self { scope, id })
    }

    pub fn scope(&self) -> RoomScope {
        self.scope
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope.as_str(), self.id)
    }
}

/// 認証済みセッションの識別情報
///
/// (再)接続時に購読すべき Room の組 `{user:{id}, role:{id}}` を導出します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// パーソナル Room（`user:{id}`）
    pub fn personal_room(&self) -> RoomId {
        RoomId::new(RoomScope::User, self.user_id.clone())
    }

    /// ロール Room（`customer:{id}` または `specialist:{id}`）
    pub fn role_room(&self) -> RoomId {
        RoomId::new(self.role.room_scope(), self.user_id.clone())
    }
}

/// 予約ステータス
///
/// 正とされる遷移は
/// `PENDING → PENDING_PAYMENT → CONFIRMED → IN_PROGRESS → COMPLETED` と、
/// `PENDING / PENDING_PAYMENT / CONFIRMED` からの `CANCELLED` です。
///
/// ワイヤにはシーケンス番号が存在しないため、プロジェクターはこの表に
/// ない遷移も「サーバーを信頼して」そのまま適用します（警告ログのみ）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    PendingPayment,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// ワイヤ上の文字列表現からステータスを復元（大文字小文字は区別しない）
    pub fn from_wire(value: &str) -> Result<Self, DomainError> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "pending_payment" => Ok(BookingStatus::PendingPayment),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "in_progress" => Ok(BookingStatus::InProgress),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(DomainError::UnknownBookingStatus(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// `from → to` が正とされる遷移表に含まれるか
    ///
    /// 含まれない遷移は相手側（サーバー）のバグを示唆するため警告ログの
    /// 対象になりますが、適用自体は拒否されません。
    pub fn is_expected_transition(from: BookingStatus, to: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (from, to),
            (Pending, PendingPayment)
                | (PendingPayment, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Pending, Cancelled)
                | (PendingPayment, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    /// このステータスへの変更がユーザー向け通知を合成するか
    pub fn triggers_notification(&self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed
                | BookingStatus::Cancelled
                | BookingStatus::InProgress
                | BookingStatus::Completed
                | BookingStatus::PendingPayment
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 決済ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn from_wire(value: &str) -> Result<Self, DomainError> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(DomainError::UnknownPaymentStatus(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }
}
