//! UseCase: セッション切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DetachSessionUseCase::execute() メソッド
//! - レジストリからの削除、共有カウンタのデクリメント、接続数の publish
//!
//! ### なぜこのテストが必要か
//! - 同じセッションの切断が二回処理されてもカウンタを二重に減らさないこと
//! - N 回の接続と N 回の切断でカウンタが元の値に戻ること
//!
//! ### どのような状況を想定しているか
//! - 正常系：切断と接続数の publish
//! - 異常系：Counter Store 障害
//! - エッジケース：未登録（シャットダウンで回収済み）のセッションの切断

use std::sync::Arc;

use crate::domain::{
    BroadcastBus, BusChannel, ConnectionCount, CounterStore, SessionId, SessionRepository,
};

use super::error::{CountUpdateError, DetachError};

/// セッション切断のユースケース
pub struct DetachSessionUseCase {
    sessions: Arc<dyn SessionRepository>,
    counter: Arc<dyn CounterStore>,
    bus: Arc<dyn BroadcastBus>,
}

impl DetachSessionUseCase {
    /// 新しい DetachSessionUseCase を作成
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        counter: Arc<dyn CounterStore>,
        bus: Arc<dyn BroadcastBus>,
    ) -> Self {
        Self {
            sessions,
            counter,
            bus,
        }
    }

    /// セッション切断を実行
    ///
    /// # Arguments
    ///
    /// * `session_id` - 切断したセッションの ID
    ///
    /// # Returns
    ///
    /// * `Ok(Some(count))` - 削除し、デクリメント後の接続数を publish した
    /// * `Ok(None)` - 削除したが、カウンタ更新または publish に失敗した（ログ出力済み）
    /// * `Err(DetachError::NotAttached)` - 既に削除済み（カウンタは変更しない）
    pub async fn execute(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ConnectionCount>, DetachError> {
        // 1. レジストリから削除（削除できた場合のみカウンタを減らす）
        let session = self
            .sessions
            .remove_session(session_id)
            .await
            .map_err(|_| DetachError::NotAttached(session_id.to_string()))?;
        drop(session);

        // 2. 共有カウンタをデクリメントして publish
        match self.announce().await {
            Ok(count) => {
                tracing::info!("Session '{}' detached (connected: {})", session_id, count);
                Ok(Some(count))
            }
            Err(e) => {
                tracing::error!(
                    "Session '{}' detached but connection count was not updated: {}",
                    session_id,
                    e
                );
                Ok(None)
            }
        }
    }

    async fn announce(&self) -> Result<ConnectionCount, CountUpdateError> {
        let count = self.counter.decrement().await?;
        self.bus
            .publish(BusChannel::ConnectionCountUpdate, count.to_string())
            .await?;
        Ok(count)
    }
}
