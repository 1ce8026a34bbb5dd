//! ユースケース層
//!
//! 受信イベントをローカル状態へ反映する各ユースケースを定義します。
//! データアクセス・通信はドメイン層のポート（trait）経由で行い、
//! Infrastructure 層の具体的な実装には依存しません。

mod generate_availability;
mod project_booking;
mod reconcile_unread;

pub use generate_availability::{GenerateAvailabilityUseCase, GenerationReport};
pub use project_booking::BookingProjector;
pub use reconcile_unread::{
    BadgeState, BadgeUpdate, DEFAULT_DEBOUNCE, NotificationCountReconciler,
};
