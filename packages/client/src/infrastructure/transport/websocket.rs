//! tokio-tungstenite による `Transport` 実装
//!
//! ## 責務
//!
//! - 単一の WebSocket 接続の確立・切断
//! - 受信テキストフレームを `TransportEvent` として上位層へ転送
//! - Room 参加・離脱コマンドの送信
//!
//! ## 設計ノート
//!
//! 「いつ接続するか・いつ再接続するか」の判断は `ConnectionManager` と
//! セッションランナーが持ちます。この実装は読み取りタスクを 1 本 spawn
//! し、接続が閉じたら `TransportEvent::Closed` を一度だけ通知します。

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::domain::{OutboundFrame, Transport, TransportError, TransportEvent};
use crate::infrastructure::dto::websocket::WireCommand;

type WsWriter =
    futures_util::stream::SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

struct ActiveConnection {
    writer: WsWriter,
    read_task: JoinHandle<()>,
}

/// WebSocket トランスポート
pub struct WebSocketTransport {
    url: String,
    active: Mutex<Option<ActiveConnection>>,
}

impl WebSocketTransport {
    /// 接続先 URL（例: `ws://127.0.0.1:8080/ws?user_id=u1`）を指定して作成
    pub fn new(url: String) -> Self {
        Self {
            url,
            active: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self) -> Result<mpsc::UnboundedReceiver<TransportEvent>, TransportError> {
        let (ws_stream, _response) = connect_async(&self.url)
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        tracing::info!("WebSocket connected to {}", self.url);

        let (writer, mut reader) = ws_stream.split();
        let (tx, rx) = mpsc::unbounded_channel();

        let read_task = tokio::spawn(async move {
            while let Some(message) = reader.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if tx.send(TransportEvent::Message(text.to_string())).is_err() {
                            // 受信側が破棄済み
                            return;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            let _ = tx.send(TransportEvent::Closed);
        });

        let mut active = self.active.lock().await;
        if let Some(previous) = active.replace(ActiveConnection { writer, read_task }) {
            previous.read_task.abort();
        }

        Ok(rx)
    }

    async fn send(&self, frame: OutboundFrame) -> Result<(), TransportError> {
        let command = WireCommand::from(&frame);
        let json =
            serde_json::to_string(&command).map_err(|e| TransportError::SendFailed(e.to_string()))?;

        let mut active = self.active.lock().await;
        let Some(connection) = active.as_mut() else {
            return Err(TransportError::NotConnected);
        };

        connection
            .writer
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&self) {
        let mut active = self.active.lock().await;
        if let Some(mut connection) = active.take() {
            let _ = connection.writer.send(Message::Close(None)).await;
            connection.read_task.abort();
            tracing::debug!("WebSocket transport closed");
        }
    }
}
