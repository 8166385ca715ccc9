//! InMemory Counter Store 実装
//!
//! 単一プロセス内で複数のリレーインスタンスを動かすテスト用。
//! clone したハンドル同士は同じ値を共有します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionCount, CounterStore, StoreError};

/// インメモリ Counter Store 実装
#[derive(Clone, Default)]
pub struct InMemoryCounterStore {
    value: Arc<Mutex<Option<i64>>>,
}

impl InMemoryCounterStore {
    /// 値が未設定の Counter Store を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期値を持つ Counter Store を作成
    pub fn with_value(value: i64) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(value))),
        }
    }

    async fn add(&self, delta: i64) -> ConnectionCount {
        let mut value = self.value.lock().await;
        let next = value.unwrap_or(0) + delta;
        *value = Some(next);
        ConnectionCount::new(next)
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn initialize(&self) -> Result<bool, StoreError> {
        let mut value = self.value.lock().await;
        if value.is_some() {
            return Ok(false);
        }
        *value = Some(0);
        Ok(true)
    }

    async fn get(&self) -> Result<Option<ConnectionCount>, StoreError> {
        let value = self.value.lock().await;
        Ok(value.map(ConnectionCount::new))
    }

    async fn set(&self, value: ConnectionCount) -> Result<(), StoreError> {
        *self.value.lock().await = Some(value.value());
        Ok(())
    }

    async fn increment(&self) -> Result<ConnectionCount, StoreError> {
        Ok(self.add(1).await)
    }

    async fn decrement(&self) -> Result<ConnectionCount, StoreError> {
        Ok(self.add(-1).await)
    }

    async fn decrement_by(&self, amount: i64) -> Result<ConnectionCount, StoreError> {
        Ok(self.add(-amount).await)
    }
}
