//! ポート（インターフェース）定義
//!
//! ドメイン層が必要とする外部コラボレーターへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - `Transport`: サーバーへの永続的な双方向チャンネル（WebSocket 実装）
//! - `NotificationGateway`: 未読通知数の正式な取得先（REST 実装）
//! - `AvailabilityGateway`: 空き枠ブロックの作成先（REST 実装）

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::{GatewayError, TransportError};
use super::schedule::{AvailabilityBlock, WeeklySchedule};
use super::value_object::RoomId;

/// トランスポートから配送されるイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// テキストフレームを受信した（パースは上位層の責務）
    Message(String),
    /// 接続が閉じられた（正常・異常を問わない）
    Closed,
}

/// クライアントからサーバーへ送るフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    JoinRoom(RoomId),
    LeaveRoom(RoomId),
}

/// 双方向チャンネルの抽象化
///
/// 接続ライフサイクルの判断（いつ接続するか、いつ再接続するか）は
/// `ConnectionManager` とセッションランナーの責務であり、Transport は
/// 単一の接続の確立・送信・切断のみを担います。
#[async_trait]
pub trait Transport: Send + Sync {
    /// 接続を確立し、受信イベントのチャンネルを返す
    ///
    /// 失敗した場合はトランスポートを生成せずエラーを返します。
    async fn connect(&self) -> Result<mpsc::UnboundedReceiver<TransportEvent>, TransportError>;

    /// フレームを送信する（未接続なら `NotConnected`）
    async fn send(&self, frame: OutboundFrame) -> Result<(), TransportError>;

    /// 接続を無条件に閉じる（未接続なら何もしない）
    async fn close(&self);
}

/// 未読通知数の正式な取得先
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// サーバーが正とする未読通知数を取得
    async fn fetch_unread_count(&self) -> Result<u32, GatewayError>;
}

/// 空き枠ブロックの作成先
#[async_trait]
pub trait AvailabilityGateway: Send + Sync {
    /// 週間スケジュールからの一括生成（サーバー側で展開）
    ///
    /// 作成されたブロック数を返します。失敗した場合、呼び出し側は
    /// ブロック単位のフォールバック生成に切り替えます。
    async fn generate_from_working_hours(
        &self,
        schedule: &WeeklySchedule,
    ) -> Result<usize, GatewayError>;

    /// 単一ブロックの作成（成功・失敗はブロックごとに独立）
    async fn create_block(&self, block: &AvailabilityBlock) -> Result<(), GatewayError>;
}
