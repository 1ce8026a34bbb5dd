//! 受信イベントのディスパッチャ（EventDispatcher）
//!
//! ## 契約
//!
//! - `on(kind, handler)` / `off(kind, id)` でハンドラを登録・解除する。
//!   同一種別に複数のハンドラを登録でき、登録順に呼び出される。
//! - 配送はトランスポートの配信コールバックに対して同期的に行われる。
//!   ハンドラは「1 イベント・1 tick あたり登録順」以上の順序を仮定して
//!   はならない。
//! - ディスパッチャ自身は状態を変更しない。副作用はすべて登録された
//!   ハンドラ（プロジェクター・調停器）に委譲される。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::domain::{EventKind, InboundEvent};

/// 登録解除に使うハンドラ識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(Uuid);

type Handler = Arc<dyn Fn(&InboundEvent) + Send + Sync>;

/// イベントディスパッチャ
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Mutex<HashMap<EventKind, Vec<(HandlerId, Handler)>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// ハンドラを登録し、解除用の識別子を返す
    pub fn on<F>(&self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&InboundEvent) + Send + Sync + 'static,
    {
        let id = HandlerId(Uuid::new_v4());
        self.handlers
            .lock()
            .expect("handlers lock poisoned")
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// ハンドラを解除する（未登録の識別子は no-op）
    pub fn off(&self, kind: EventKind, id: HandlerId) {
        let mut handlers = self.handlers.lock().expect("handlers lock poisoned");
        if let Some(registered) = handlers.get_mut(&kind) {
            registered.retain(|(handler_id, _)| *handler_id != id);
        }
    }

    /// このセッションに紐づく全ハンドラを解除する（teardown 時）
    pub fn clear(&self) {
        self.handlers
            .lock()
            .expect("handlers lock poisoned")
            .clear();
    }

    /// イベントを該当種別のハンドラへ登録順に配送する
    ///
    /// ハンドラの居ない種別は黙って捨てられます（サーバー側が追加した
    /// 新しいイベント種別に対する前方互換性）。
    pub fn dispatch(&self, inbound: &InboundEvent) {
        let handlers: Vec<Handler> = {
            let registered = self.handlers.lock().expect("handlers lock poisoned");
            match registered.get(&inbound.kind()) {
                Some(list) => list.iter().map(|(_, handler)| Arc::clone(handler)).collect(),
                None => {
                    tracing::debug!("No handler for {:?}, dropped", inbound.kind());
                    return;
                }
            }
        };

        // ロックを持たずに呼び出す（ハンドラからの on/off を許容する）
        for handler in handlers {
            handler(inbound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ServerEvent, Timestamp};

    fn snapshot_event(unread_count: u32) -> InboundEvent {
        InboundEvent::new(
            ServerEvent::UnreadCountSnapshot { unread_count },
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        // テスト項目: 同一種別の複数ハンドラが登録順に呼び出される
        // given (前提条件):
        let dispatcher = EventDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            dispatcher.on(EventKind::UnreadCountSnapshot, move |_event| {
                order.lock().unwrap().push(label);
            });
        }

        // when (操作):
        dispatcher.dispatch(&snapshot_event(1));

        // then (期待する結果):
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_off_deregisters_single_handler() {
        // テスト項目: off() で解除したハンドラだけが呼ばれなくなる
        // given (前提条件):
        let dispatcher = EventDispatcher::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let calls_a = Arc::clone(&calls);
        let id_a = dispatcher.on(EventKind::UnreadCountSnapshot, move |_event| {
            calls_a.lock().unwrap().push("a");
        });
        let calls_b = Arc::clone(&calls);
        dispatcher.on(EventKind::UnreadCountSnapshot, move |_event| {
            calls_b.lock().unwrap().push("b");
        });

        // when (操作):
        dispatcher.off(EventKind::UnreadCountSnapshot, id_a);
        dispatcher.dispatch(&snapshot_event(1));

        // then (期待する結果):
        assert_eq!(*calls.lock().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_unhandled_event_kind_is_silently_dropped() {
        // テスト項目: ハンドラの居ない種別のイベントはパニックせず捨てられる
        // given (前提条件):
        let dispatcher = EventDispatcher::new();

        // when (操作) / then (期待する結果): パニックしない
        dispatcher.dispatch(&snapshot_event(1));
    }

    #[test]
    fn test_clear_removes_all_handlers() {
        // テスト項目: clear() で全ハンドラが解除される
        // given (前提条件):
        let dispatcher = EventDispatcher::new();
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = Arc::clone(&calls);
        dispatcher.on(EventKind::UnreadCountSnapshot, move |_event| {
            *calls_clone.lock().unwrap() += 1;
        });

        // when (操作):
        dispatcher.clear();
        dispatcher.dispatch(&snapshot_event(1));

        // then (期待する結果):
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_handler_may_deregister_during_dispatch() {
        // テスト項目: 配送中のハンドラから off() を呼んでもデッドロックしない
        // given (前提条件):
        let dispatcher = Arc::new(EventDispatcher::new());
        let dispatcher_clone = Arc::clone(&dispatcher);
        let id_cell = Arc::new(Mutex::new(None::<HandlerId>));
        let id_cell_clone = Arc::clone(&id_cell);

        let id = dispatcher.on(EventKind::UnreadCountSnapshot, move |_event| {
            if let Some(id) = *id_cell_clone.lock().unwrap() {
                dispatcher_clone.off(EventKind::UnreadCountSnapshot, id);
            }
        });
        *id_cell.lock().unwrap() = Some(id);

        // when (操作):
        dispatcher.dispatch(&snapshot_event(1));
        dispatcher.dispatch(&snapshot_event(2));

        // then (期待する結果): 2 回目の配送でハンドラは解除済み（パニックしない）
    }
}
