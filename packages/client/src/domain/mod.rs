//! ドメイン層
//!
//! 予約マーケットプレイスの同期コアが扱うドメインモデルを定義します。
//!
//! - `value_object`: 検証付きの値オブジェクト（UserId, RoomId, BookingStatus など）
//! - `entity`: エンティティ（Booking プロジェクション, Notification）
//! - `event`: サーバーから受信するイベントの閉じた直和型
//! - `schedule`: 営業時間・空き枠生成の純粋関数
//! - `port`: Infrastructure 層が実装するインターフェース（依存性の逆転）

pub mod entity;
pub mod error;
pub mod event;
pub mod port;
pub mod schedule;
pub mod value_object;

pub use entity::{Booking, Notification};
pub use error::{DomainError, GatewayError, TransportError};
pub use event::{EventKind, InboundEvent, ServerEvent};
pub use port::{
    AvailabilityGateway, NotificationGateway, OutboundFrame, Transport, TransportEvent,
};
pub use schedule::{
    AvailabilityBlock, WeeklySchedule, WorkWindow, elapsed_business_minutes,
    generate_recurring_blocks,
};
pub use value_object::{
    BookingId, BookingStatus, Identity, PaymentStatus, Role, RoomId, RoomScope, Timestamp, UserId,
};
