//! Redis 実装
//!
//! Counter Store は `chat:connection-count` キーへの INCR / DECR、
//! Broadcast Bus は Redis Pub/Sub を使います。全てのコマンドにタイムアウトを設定します。

pub mod bus;
pub mod counter;

pub use bus::RedisBroadcastBus;
pub use counter::RedisCounterStore;

use std::{future::Future, time::Duration};

/// Outcome of a Redis call bounded by a timeout
pub(crate) enum Bounded<T> {
    Done(::redis::RedisResult<T>),
    TimedOut,
}

/// Run a Redis future with a timeout
pub(crate) async fn bounded<T, F>(timeout: Duration, future: F) -> Bounded<T>
where
    F: Future<Output = ::redis::RedisResult<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => Bounded::Done(result),
        Err(_) => Bounded::TimedOut,
    }
}
