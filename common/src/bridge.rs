//! Outbound event queue to the (external) visualizer (§4.7).
//!
//! The Executor and Planner are the only producers; an external visualizer polling at low
//! frequency is the consumer. `MapStatic` and `GameOver` must never be dropped; everything else
//! may be coalesced away once the queue is full, since the visualizer only cares about the
//! latest value.
//!
//! Built on a `Mutex`-guarded ring buffer rather than `tokio::sync::mpsc` directly: mpsc's
//! `Sender::send` has no way to evict a queued item, only to block until the receiver drains one,
//! which would stall the Executor's tick loop on a slow visualizer. A small buffer behind a
//! `Notify` gives producers a non-blocking `send` at the cost of owning the eviction policy
//! ourselves.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, Notify};

use crate::game::PlayerId;

/// A single tagged message placed on the Bridge queue.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    StatusText(String),
    PlayerId(PlayerId),
    MapStatic(Value),
    MapDynamic(Value),
    GameOver,
}

impl BridgeEvent {
    /// MAP_STATIC and GAME_OVER must never be dropped by a full queue (§4.7).
    fn is_lossless(&self) -> bool {
        matches!(self, Self::MapStatic(_) | Self::GameOver)
    }
}

struct Shared {
    queue: Mutex<VecDeque<BridgeEvent>>,
    notify: Notify,
    capacity: usize,
}

/// The producer half, held by the Executor/Planner. Cheaply `Clone`-able.
#[derive(Clone)]
pub struct BridgeSender {
    shared: Arc<Shared>,
}

impl BridgeSender {
    /// Enqueues `event` without blocking. If the queue is at capacity: a coalescible event is
    /// dropped; a lossless event evicts the oldest coalescible entry to make room, or the oldest
    /// entry outright if every queued entry happens to be lossless too.
    pub async fn send(&self, event: BridgeEvent) {
        let mut queue = self.shared.queue.lock().await;
        if queue.len() >= self.shared.capacity {
            if !event.is_lossless() {
                return;
            }
            let evict = queue
                .iter()
                .position(|queued| !queued.is_lossless())
                .unwrap_or(0);
            queue.remove(evict);
        }
        queue.push_back(event);
        drop(queue);
        self.shared.notify.notify_one();
    }
}

/// The consumer half, held by the visualizer task.
pub struct BridgeReceiver {
    shared: Arc<Shared>,
}

impl BridgeReceiver {
    /// Waits for and returns the next event, in FIFO order.
    pub async fn recv(&mut self) -> BridgeEvent {
        loop {
            {
                let mut queue = self.shared.queue.lock().await;
                if let Some(event) = queue.pop_front() {
                    return event;
                }
            }
            self.shared.notify.notified().await;
        }
    }

    /// Returns the next event if one is already queued, without waiting.
    pub async fn try_recv(&mut self) -> Option<BridgeEvent> {
        self.shared.queue.lock().await.pop_front()
    }
}

/// Creates a bounded Bridge channel holding at most `capacity` events.
pub fn channel(capacity: usize) -> (BridgeSender, BridgeReceiver) {
    let shared = Arc::new(Shared { queue: Mutex::new(VecDeque::new()), notify: Notify::new(), capacity });
    (BridgeSender { shared: shared.clone() }, BridgeReceiver { shared })
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn game_over_survives_a_flood_of_status_text() {
        let (tx, mut rx) = channel(2);
        for i in 0..5 {
            tx.send(BridgeEvent::StatusText(format!("flood {i}"))).await;
        }
        tx.send(BridgeEvent::GameOver).await;

        let mut saw_game_over = false;
        while let Some(event) = rx.try_recv().await {
            if matches!(event, BridgeEvent::GameOver) {
                saw_game_over = true;
            }
        }
        assert!(saw_game_over);
    }

    #[tokio::test]
    async fn map_static_is_never_dropped_even_when_every_slot_is_lossless() {
        let (tx, mut rx) = channel(1);
        tx.send(BridgeEvent::MapStatic(Value::Null)).await;
        tx.send(BridgeEvent::GameOver).await;

        let next = rx.try_recv().await.unwrap();
        assert!(matches!(next, BridgeEvent::GameOver));
    }

    #[tokio::test]
    async fn coalescible_events_are_dropped_once_full() {
        let (tx, mut rx) = channel(1);
        tx.send(BridgeEvent::StatusText("first".into())).await;
        tx.send(BridgeEvent::StatusText("second".into())).await;

        let next = rx.try_recv().await.unwrap();
        assert!(matches!(next, BridgeEvent::StatusText(s) if s == "first"));
        assert!(rx.try_recv().await.is_none());
    }
}
