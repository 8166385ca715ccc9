//! InMemory Broadcast Bus 実装
//!
//! tokio の broadcast チャンネルを Pub/Sub の代わりに使うテスト用の実装。
//! `peer()` で作ったハンドルは同じバスに接続された別インスタンスとして振る舞います。

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use tokio::{
    sync::{Mutex, broadcast, mpsc},
    task::JoinHandle,
};

use crate::domain::{BroadcastBus, BusChannel, BusError, BusEvent};

const BUS_CAPACITY: usize = 1024;

/// 検証用に保持する publish 履歴の上限（古いものから捨てる）
const PUBLISHED_LOG_LIMIT: usize = 4096;

/// インメモリ Broadcast Bus 実装
pub struct InMemoryBroadcastBus {
    sender: broadcast::Sender<BusEvent>,
    /// バス全体で publish された直近のイベント（テストでの検証用）
    published: Arc<Mutex<VecDeque<BusEvent>>>,
    /// このハンドルの購読タスク
    subscriptions: Mutex<Vec<JoinHandle<()>>>,
}

impl InMemoryBroadcastBus {
    /// 新しいバスを作成
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            sender,
            published: Arc::new(Mutex::new(VecDeque::new())),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// 同じバスに接続する別インスタンス用のハンドルを作成
    pub fn peer(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            published: self.published.clone(),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// 直近に publish されたイベント（上限件数まで）
    pub async fn published(&self) -> Vec<BusEvent> {
        self.published.lock().await.iter().cloned().collect()
    }

    /// 指定チャンネルに publish されたペイロード
    pub async fn published_on(&self, channel: BusChannel) -> Vec<String> {
        self.published
            .lock()
            .await
            .iter()
            .filter(|event| event.channel == channel)
            .map(|event| event.payload.clone())
            .collect()
    }
}

impl Default for InMemoryBroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BroadcastBus for InMemoryBroadcastBus {
    async fn publish(&self, channel: BusChannel, payload: String) -> Result<(), BusError> {
        let event = BusEvent::new(channel, payload);
        {
            let mut published = self.published.lock().await;
            if published.len() == PUBLISHED_LOG_LIMIT {
                published.pop_front();
            }
            published.push_back(event.clone());
        }
        // 購読者がいない場合も Redis の PUBLISH と同じく成功扱い
        let _ = self.sender.send(event);
        Ok(())
    }

    async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<BusEvent>, BusError> {
        let mut bus_rx = self.sender.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            loop {
                match bus_rx.recv().await {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("In-memory bus subscriber lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        self.subscriptions.lock().await.push(handle);
        Ok(rx)
    }

    async fn close(&self) {
        for handle in self.subscriptions.lock().await.drain(..) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_every_peer() {
        // テスト項目: publish したイベントが全ての購読ハンドルに届く
        // given (前提条件):
        let bus = InMemoryBroadcastBus::new();
        let peer = bus.peer();
        let mut rx1 = bus.subscribe().await.unwrap();
        let mut rx2 = peer.subscribe().await.unwrap();

        // when (操作):
        peer.publish(BusChannel::NewMessage, "hi".to_string())
            .await
            .unwrap();

        // then (期待する結果):
        let expected = BusEvent::new(BusChannel::NewMessage, "hi");
        assert_eq!(rx1.recv().await, Some(expected.clone()));
        assert_eq!(rx2.recv().await, Some(expected));
        assert_eq!(bus.published_on(BusChannel::NewMessage).await, vec!["hi"]);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        // テスト項目: 購読者がいなくても publish は成功する
        let bus = InMemoryBroadcastBus::new();

        let result = bus
            .publish(BusChannel::ConnectionCountUpdate, "1".to_string())
            .await;

        assert!(result.is_ok());
        assert_eq!(bus.published().await.len(), 1);
    }

    #[tokio::test]
    async fn test_published_log_keeps_latest_events() {
        // テスト項目: publish 履歴は上限件数を超えると古いものから捨てられる
        // given (前提条件):
        let bus = InMemoryBroadcastBus::new();

        // when (操作):
        for i in 0..PUBLISHED_LOG_LIMIT + 10 {
            bus.publish(BusChannel::NewMessage, i.to_string())
                .await
                .unwrap();
        }

        // then (期待する結果):
        let published = bus.published().await;
        assert_eq!(published.len(), PUBLISHED_LOG_LIMIT);
        assert_eq!(published[0].payload, "10");
        assert_eq!(
            published[PUBLISHED_LOG_LIMIT - 1].payload,
            (PUBLISHED_LOG_LIMIT + 9).to_string()
        );
    }

    #[tokio::test]
    async fn test_close_ends_subscription() {
        // テスト項目: close すると購読が終了する
        // given (前提条件):
        let bus = InMemoryBroadcastBus::new();
        let mut rx = bus.subscribe().await.unwrap();

        // when (操作):
        bus.close().await;

        // then (期待する結果):
        assert_eq!(rx.recv().await, None);
    }
}
