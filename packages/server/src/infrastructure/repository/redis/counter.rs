//! Redis Counter Store 実装

use std::time::Duration;

use ::redis::{Client, FromRedisValue, Value, aio::ConnectionManager};
use async_trait::async_trait;

use super::{Bounded, bounded};
use crate::domain::{ConnectionCount, CounterStore, StoreError};

/// Key holding the fleet-wide connected client count
pub const CONNECTION_COUNT_KEY: &str = "chat:connection-count";

/// Counter store backed by a single Redis key.
///
/// The value is stored as a plain integer string. The connection manager
/// reconnects on its own after a dropped connection.
#[derive(Clone)]
pub struct RedisCounterStore {
    conn: ConnectionManager,
    key: String,
    timeout: Duration,
}

impl RedisCounterStore {
    /// Connect to Redis
    pub async fn connect(client: Client, timeout: Duration) -> Result<Self, StoreError> {
        let conn = match bounded(timeout, ConnectionManager::new(client)).await {
            Bounded::Done(Ok(conn)) => conn,
            Bounded::Done(Err(e)) => return Err(StoreError::Backend(e.to_string())),
            Bounded::TimedOut => return Err(StoreError::Timeout(timeout)),
        };
        tracing::info!("Counter store connected (key: {})", CONNECTION_COUNT_KEY);

        Ok(Self {
            conn,
            key: CONNECTION_COUNT_KEY.to_string(),
            timeout,
        })
    }

    async fn query<T: FromRedisValue>(&self, cmd: ::redis::Cmd) -> Result<T, StoreError> {
        let mut conn = self.conn.clone();
        match bounded(self.timeout, cmd.query_async::<T>(&mut conn)).await {
            Bounded::Done(result) => result.map_err(|e| StoreError::Backend(e.to_string())),
            Bounded::TimedOut => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn initialize(&self) -> Result<bool, StoreError> {
        // SET NX: 複数インスタンスが同時に初期化しても結果は 0
        let mut cmd = ::redis::cmd("SET");
        cmd.arg(&self.key).arg(0).arg("NX");
        let reply: Value = self.query(cmd).await?;
        Ok(!matches!(reply, Value::Nil))
    }

    async fn get(&self) -> Result<Option<ConnectionCount>, StoreError> {
        let mut cmd = ::redis::cmd("GET");
        cmd.arg(&self.key);
        let value: Option<i64> = self.query(cmd).await?;
        Ok(value.map(ConnectionCount::new))
    }

    async fn set(&self, value: ConnectionCount) -> Result<(), StoreError> {
        let mut cmd = ::redis::cmd("SET");
        cmd.arg(&self.key).arg(value.value());
        self.query::<()>(cmd).await
    }

    async fn increment(&self) -> Result<ConnectionCount, StoreError> {
        let mut cmd = ::redis::cmd("INCR");
        cmd.arg(&self.key);
        self.query::<i64>(cmd).await.map(ConnectionCount::new)
    }

    async fn decrement(&self) -> Result<ConnectionCount, StoreError> {
        let mut cmd = ::redis::cmd("DECR");
        cmd.arg(&self.key);
        self.query::<i64>(cmd).await.map(ConnectionCount::new)
    }

    async fn decrement_by(&self, amount: i64) -> Result<ConnectionCount, StoreError> {
        let mut cmd = ::redis::cmd("DECRBY");
        cmd.arg(&self.key).arg(amount);
        self.query::<i64>(cmd).await.map(ConnectionCount::new)
    }
}
