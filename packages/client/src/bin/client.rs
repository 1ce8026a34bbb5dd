//! 予約マーケットプレイスのリアルタイム同期クライアント。
//!
//! WebSocket でサーバーへ接続し、アイデンティティに対応する Room を購読
//! して予約・通知・決済イベントを受信します。接続断時は自動で再接続
//! します（最大 5 回・5 秒間隔）。
//!
//! Run with:
//! ```not_rust
//! cargo run --bin yoyaku-client -- --user-id u1 --role customer
//! cargo run --bin yoyaku-client -- -i s1 -r specialist
//! ```

use std::sync::Arc;

use clap::Parser;

use yoyaku_client::domain::{Identity, Role, UserId};
use yoyaku_client::infrastructure::gateway::HttpBackendGateway;
use yoyaku_client::infrastructure::transport::WebSocketTransport;
use yoyaku_client::session::{SyncSession, run_session};
use yoyaku_shared::logger::setup_logger;
use yoyaku_shared::time::SystemClock;

#[derive(Parser, Debug)]
#[command(name = "yoyaku-client")]
#[command(about = "Real-time sync client for the yoyaku booking marketplace", long_about = None)]
struct Args {
    /// User ID to connect as
    #[arg(short = 'i', long)]
    user_id: String,

    /// Session role: "customer" or "specialist"
    #[arg(short = 'r', long)]
    role: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:3001/ws")]
    url: String,

    /// REST API base URL
    #[arg(short = 'a', long, default_value = "http://127.0.0.1:3000")]
    api_base: String,
}

fn parse_role(value: &str) -> Option<Role> {
    match value.to_ascii_lowercase().as_str() {
        "customer" => Some(Role::Customer),
        "specialist" => Some(Role::Specialist),
        _ => None,
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let Some(role) = parse_role(&args.role) else {
        tracing::error!(
            "Invalid role '{}' (expected \"customer\" or \"specialist\")",
            args.role
        );
        std::process::exit(1);
    };
    let user_id = match UserId::new(args.user_id) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::error!("Invalid user ID: {}", e);
            std::process::exit(1);
        }
    };

    let identity = Identity::new(user_id, role);
    let transport = Arc::new(WebSocketTransport::new(args.url));
    let gateway = Arc::new(HttpBackendGateway::new(args.api_base));
    let session = Arc::new(SyncSession::new(
        identity,
        transport,
        gateway,
        Arc::new(SystemClock),
    ));

    // Run the session with reconnection
    if let Err(e) = run_session(Arc::clone(&session)).await {
        session.teardown().await;
        tracing::error!("Session error: {}", e);
        std::process::exit(1);
    }
}
