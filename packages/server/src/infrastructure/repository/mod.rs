//! Repository パターンの実装
//!
//! ドメイン層が定義する trait（SessionRepository / CounterStore / BroadcastBus）の
//! 具体的な実装を提供します。UseCase 層は trait に依存し、この実装に直接依存しません。
//!
//! - `redis`: 本番用。複数インスタンスで共有するカウンタと Pub/Sub
//! - `inmemory`: セッションレジストリ、およびテスト・ローカル用のカウンタと Pub/Sub

pub mod inmemory;
pub mod redis;

pub use inmemory::{InMemoryBroadcastBus, InMemoryCounterStore, InMemorySessionRepository};
pub use redis::{RedisBroadcastBus, RedisCounterStore};
