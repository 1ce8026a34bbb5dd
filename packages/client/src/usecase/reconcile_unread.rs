//! UseCase: 未読通知数の調停（reconciliation）
//!
//! ローカルに表示する未読バッジを「即座に反応し、最終的には正確」に保つ
//! ための調停器です。
//!
//! ## 契約
//!
//! - `apply_optimistic_delta(delta)`: 楽観的な増減を即座に購読者へ通知し、
//!   単一のデバウンスタイマー（既定 1000 ms）を(再)始動する。タイマーが
//!   既に待機中なら積み増しせず、キャンセルして張り直す。
//! - タイマー発火時: ゲートウェイから正式な未読数を取得し、絶対値として
//!   通知する。取得中に新しいデルタが適用されていた場合、その結果は
//!   追い越された（stale）ものとして破棄する（取得自体は中断しない）。
//! - 正式なスナップショットの push はデバウンスを待たず即座に通知する。
//! - 「全件既読」push は即座に 0 を通知した上で、念のため調停取得も
//!   スケジュールする（push はヒントであり正ではない）。
//! - 取得失敗時は最後の表示値を維持し、次のデルタで再調停する。
//! - セッション切断時は待機中のタイマーを同期的に破棄する。破棄後に
//!   調停が発火することはない。

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::NotificationGateway;

/// デバウンス時間の既定値
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// バッジ購読者へ配送される更新
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeUpdate {
    /// 楽観的な増減（購読者側で 0 にクランプして加算する）
    Delta(i64),
    /// 正式な絶対値（それまでの楽観的デルタをすべて上書きする）
    Absolute(u32),
}

/// 購読者側のバッジ状態（0 でのクランプを実装するヘルパー）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeState {
    count: i64,
}

impl BadgeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新を適用（デルタは 0 未満にならないようクランプ）
    pub fn apply(&mut self, update: BadgeUpdate) {
        match update {
            BadgeUpdate::Delta(delta) => {
                self.count = (self.count + delta).max(0);
            }
            BadgeUpdate::Absolute(count) => {
                self.count = i64::from(count);
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.count as u32
    }
}

/// 未読通知数の調停器
pub struct NotificationCountReconciler {
    gateway: Arc<dyn NotificationGateway>,
    debounce: Duration,
    listeners: Mutex<Vec<mpsc::UnboundedSender<BadgeUpdate>>>,
    /// 待機中のデバウンスタイマー（同時にひとつだけ）
    pending: Mutex<Option<JoinHandle<()>>>,
    /// 取得の追い越し検出用の世代カウンタ
    generation: AtomicU64,
    torn_down: AtomicBool,
}

impl NotificationCountReconciler {
    pub fn new(gateway: Arc<dyn NotificationGateway>, debounce: Duration) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            debounce,
            listeners: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            generation: AtomicU64::new(0),
            torn_down: AtomicBool::new(false),
        })
    }

    /// バッジ更新の購読を開始
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<BadgeUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners
            .lock()
            .expect("listeners lock poisoned")
            .push(tx);
        rx
    }

    /// 楽観的デルタを適用し、デバウンスタイマーを張り直す
    pub fn apply_optimistic_delta(self: &Arc<Self>, delta: i64) {
        if self.torn_down.load(Ordering::SeqCst) {
            tracing::debug!("Reconciler torn down, ignoring delta {}", delta);
            return;
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        self.emit(BadgeUpdate::Delta(delta));
        self.arm_debounce();
    }

    /// サーバーから push された正式なスナップショットを即座に反映
    pub fn apply_snapshot(&self, unread_count: u32) {
        if self.torn_down.load(Ordering::SeqCst) {
            return;
        }
        self.emit(BadgeUpdate::Absolute(unread_count));
    }

    /// 「全件既読」push の反映
    ///
    /// 即座に 0 を通知した上で、push をヒントとして扱い調停取得も
    /// スケジュールします。
    pub fn apply_mark_all_read(self: &Arc<Self>) {
        if self.torn_down.load(Ordering::SeqCst) {
            return;
        }

        self.emit(BadgeUpdate::Absolute(0));
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.arm_debounce();
    }

    /// 待機中のデバウンスタイマーを破棄（切断時に呼ばれる）
    pub fn cancel_pending(&self) {
        let mut pending = self.pending.lock().expect("pending lock poisoned");
        if let Some(handle) = pending.take() {
            handle.abort();
            tracing::debug!("Pending reconcile timer cancelled");
        }
    }

    /// 調停器を破棄（セッション teardown 時）
    ///
    /// 破棄後はデルタ・push を無視し、調停が発火することはありません。
    pub fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        self.cancel_pending();
    }

    /// テスト・診断用: タイマーが待機中か
    pub fn has_pending_reconcile(&self) -> bool {
        self.pending
            .lock()
            .expect("pending lock poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// デバウンスタイマーを張り直す（待機中のタイマーは置き換える）
    fn arm_debounce(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(this.debounce).await;
            let generation = this.generation.load(Ordering::SeqCst);
            let fetcher = Arc::clone(&this);
            // タイマー置き換えによる abort が進行中の取得を巻き込まない
            // よう、取得は独立タスクとして切り離す
            tokio::spawn(async move {
                fetcher.reconcile(generation).await;
            });
        });

        let mut pending = self.pending.lock().expect("pending lock poisoned");
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// 正式な未読数を取得して購読者へ通知する
    async fn reconcile(&self, generation: u64) {
        match self.gateway.fetch_unread_count().await {
            Ok(unread_count) => {
                if self.torn_down.load(Ordering::SeqCst) {
                    return;
                }
                if self.generation.load(Ordering::SeqCst) != generation {
                    // 取得中に新しいデルタが適用された。張り直された
                    // タイマーが再取得するため、この結果は破棄する
                    tracing::debug!("Reconcile result overtaken by newer delta, discarding");
                    return;
                }
                tracing::debug!("Reconciled unread count to {}", unread_count);
                self.emit(BadgeUpdate::Absolute(unread_count));
            }
            Err(e) => {
                // 表示値は最後の楽観的値のまま維持し、次のデルタで再調停する
                tracing::warn!("Unread count reconciliation failed: {}", e);
            }
        }
    }

    fn emit(&self, update: BadgeUpdate) {
        let mut listeners = self.listeners.lock().expect("listeners lock poisoned");
        listeners.retain(|listener| listener.send(update).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GatewayError;
    use crate::domain::port::MockNotificationGateway;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;
    use tokio::sync::Semaphore;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - デバウンス 1 本化: ウィンドウ内の複数デルタで取得が 1 回に纏まること
    // - 最終的な正確さ: 最後の正式取得結果が表示値になること
    // - スナップショット・全件既読の即時反映
    // - 切断時のタイマー破棄（破棄後に取得が発火しないこと）
    // - 追い越された取得結果の破棄
    //
    // 【なぜこのテストが必要か】
    // - バッジの「即座に反応し、最終的には正確」という契約の中核
    // - タイマーの置き換え・破棄はリークやゾンビ発火を生みやすい
    // ========================================

    const TEST_DEBOUNCE: Duration = Duration::from_millis(40);

    fn drain(rx: &mut mpsc::UnboundedReceiver<BadgeUpdate>) -> Vec<BadgeUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    #[tokio::test]
    async fn test_multiple_deltas_collapse_into_single_fetch() {
        // テスト項目: デバウンスウィンドウ内の複数デルタで正式取得が 1 回だけ行われる
        // given (前提条件):
        let mut gateway = MockNotificationGateway::new();
        gateway
            .expect_fetch_unread_count()
            .times(1)
            .returning(|| Ok(7));
        let reconciler = NotificationCountReconciler::new(Arc::new(gateway), TEST_DEBOUNCE);
        let mut rx = reconciler.subscribe();

        // when (操作):
        reconciler.apply_optimistic_delta(1);
        reconciler.apply_optimistic_delta(-1);
        reconciler.apply_optimistic_delta(1);
        tokio::time::sleep(TEST_DEBOUNCE * 3).await;

        // then (期待する結果):
        let updates = drain(&mut rx);
        assert_eq!(
            updates,
            vec![
                BadgeUpdate::Delta(1),
                BadgeUpdate::Delta(-1),
                BadgeUpdate::Delta(1),
                BadgeUpdate::Absolute(7),
            ]
        );
    }

    #[tokio::test]
    async fn test_final_count_equals_authoritative_result() {
        // テスト項目: デルタの符号や個数に依らず最終表示値は正式取得結果になる
        // given (前提条件):
        let mut gateway = MockNotificationGateway::new();
        gateway
            .expect_fetch_unread_count()
            .times(1)
            .returning(|| Ok(3));
        let reconciler = NotificationCountReconciler::new(Arc::new(gateway), TEST_DEBOUNCE);
        let mut rx = reconciler.subscribe();
        let mut badge = BadgeState::new();

        // when (操作):
        for delta in [5, -2, -9, 1] {
            reconciler.apply_optimistic_delta(delta);
        }
        tokio::time::sleep(TEST_DEBOUNCE * 3).await;
        for update in drain(&mut rx) {
            badge.apply(update);
        }

        // then (期待する結果):
        assert_eq!(badge.count(), 3);
    }

    #[tokio::test]
    async fn test_badge_state_clamps_at_zero() {
        // テスト項目: 購読者側のバッジ状態は 0 未満にならない
        // given (前提条件):
        let mut badge = BadgeState::new();

        // when (操作):
        badge.apply(BadgeUpdate::Delta(-5));

        // then (期待する結果):
        assert_eq!(badge.count(), 0);

        // when (操作):
        badge.apply(BadgeUpdate::Absolute(4));
        badge.apply(BadgeUpdate::Delta(-1));

        // then (期待する結果):
        assert_eq!(badge.count(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_is_emitted_immediately() {
        // テスト項目: 正式スナップショットはデバウンスを待たず即座に通知される
        // given (前提条件):
        let gateway = MockNotificationGateway::new();
        let reconciler = NotificationCountReconciler::new(Arc::new(gateway), TEST_DEBOUNCE);
        let mut rx = reconciler.subscribe();

        // when (操作):
        reconciler.apply_snapshot(12);

        // then (期待する結果):
        assert_eq!(drain(&mut rx), vec![BadgeUpdate::Absolute(12)]);
        assert!(!reconciler.has_pending_reconcile());
    }

    #[tokio::test]
    async fn test_mark_all_read_emits_zero_then_reconciles() {
        // テスト項目: 全件既読は即座に 0 を通知し、その後に調停取得も行われる
        // given (前提条件):
        let mut gateway = MockNotificationGateway::new();
        gateway
            .expect_fetch_unread_count()
            .times(1)
            .returning(|| Ok(0));
        let reconciler = NotificationCountReconciler::new(Arc::new(gateway), TEST_DEBOUNCE);
        let mut rx = reconciler.subscribe();

        // when (操作):
        reconciler.apply_mark_all_read();
        let immediate = drain(&mut rx);
        tokio::time::sleep(TEST_DEBOUNCE * 3).await;
        let after_debounce = drain(&mut rx);

        // then (期待する結果):
        assert_eq!(immediate, vec![BadgeUpdate::Absolute(0)]);
        assert_eq!(after_debounce, vec![BadgeUpdate::Absolute(0)]);
    }

    #[tokio::test]
    async fn test_cancel_before_debounce_prevents_fetch() {
        // テスト項目: デバウンス発火前の破棄で調停取得が一切行われない
        // given (前提条件):
        // 取得が呼ばれたらテストを失敗させる（expect を設定しない）
        let gateway = MockNotificationGateway::new();
        let reconciler = NotificationCountReconciler::new(Arc::new(gateway), TEST_DEBOUNCE);
        let mut rx = reconciler.subscribe();

        // when (操作):
        reconciler.apply_optimistic_delta(1);
        reconciler.cancel_pending();
        tokio::time::sleep(TEST_DEBOUNCE * 3).await;

        // then (期待する結果):
        assert_eq!(drain(&mut rx), vec![BadgeUpdate::Delta(1)]);
        assert!(!reconciler.has_pending_reconcile());
    }

    #[tokio::test]
    async fn test_teardown_silences_later_deltas() {
        // テスト項目: teardown 後のデルタ・push は無視される
        // given (前提条件):
        let gateway = MockNotificationGateway::new();
        let reconciler = NotificationCountReconciler::new(Arc::new(gateway), TEST_DEBOUNCE);
        let mut rx = reconciler.subscribe();

        // when (操作):
        reconciler.teardown();
        reconciler.apply_optimistic_delta(1);
        reconciler.apply_snapshot(9);
        tokio::time::sleep(TEST_DEBOUNCE * 3).await;

        // then (期待する結果):
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_last_optimistic_value() {
        // テスト項目: 取得失敗時は絶対値が通知されず、最後の楽観的値が維持される
        // given (前提条件):
        let mut gateway = MockNotificationGateway::new();
        gateway
            .expect_fetch_unread_count()
            .times(1)
            .returning(|| Err(GatewayError::RequestFailed("boom".to_string())));
        let reconciler = NotificationCountReconciler::new(Arc::new(gateway), TEST_DEBOUNCE);
        let mut rx = reconciler.subscribe();
        let mut badge = BadgeState::new();

        // when (操作):
        reconciler.apply_optimistic_delta(2);
        tokio::time::sleep(TEST_DEBOUNCE * 3).await;
        for update in drain(&mut rx) {
            badge.apply(update);
        }

        // then (期待する結果):
        assert_eq!(badge.count(), 2);
    }

    /// 最初の取得をゲートで止め、追い越しを再現するゲートウェイ
    struct GatedGateway {
        calls: AtomicU32,
        gate: Semaphore,
    }

    #[async_trait]
    impl NotificationGateway for GatedGateway {
        async fn fetch_unread_count(&self) -> Result<u32, GatewayError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await.expect("gate closed");
            // 1 回目は古い値、2 回目以降は最新の値を返す
            Ok(if call == 0 { 5 } else { 9 })
        }
    }

    #[tokio::test]
    async fn test_overtaken_fetch_result_is_discarded() {
        // テスト項目: 取得中に新しいデルタが適用された場合、その取得結果は破棄され
        //             張り直されたタイマーの再取得結果だけが通知される
        // given (前提条件):
        let gateway = Arc::new(GatedGateway {
            calls: AtomicU32::new(0),
            gate: Semaphore::new(0),
        });
        let reconciler =
            NotificationCountReconciler::new(Arc::clone(&gateway) as _, TEST_DEBOUNCE);
        let mut rx = reconciler.subscribe();

        // when (操作):
        reconciler.apply_optimistic_delta(1);
        // 1 回目のタイマーが発火し、取得がゲートで停止するのを待つ
        tokio::time::sleep(TEST_DEBOUNCE * 2).await;
        // 取得中に新しいデルタを適用（世代が進み、1 回目の結果は stale になる）
        reconciler.apply_optimistic_delta(1);
        gateway.gate.add_permits(2);
        tokio::time::sleep(TEST_DEBOUNCE * 3).await;

        // then (期待する結果):
        let updates = drain(&mut rx);
        assert_eq!(
            updates,
            vec![
                BadgeUpdate::Delta(1),
                BadgeUpdate::Delta(1),
                BadgeUpdate::Absolute(9),
            ]
        );
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }
}
