//! UseCase: セッション接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AttachSessionUseCase::execute() メソッド
//! - レジストリへの登録、共有カウンタのインクリメント、接続数の publish
//!
//! ### なぜこのテストが必要か
//! - 新しいセッション自身も接続数の更新を受け取れるよう、登録が publish より先であること
//! - Counter Store / Broadcast Bus の障害でセッションが切断されないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続と接続数の publish
//! - 異常系：Counter Store 障害、Broadcast Bus 障害
//! - エッジケース：同じ ID のセッションの二重登録

use std::sync::Arc;

use crate::domain::{
    BroadcastBus, BusChannel, ClientSession, ConnectionCount, CounterStore, SessionRepository,
};

use super::error::{AttachError, CountUpdateError};

/// セッション接続のユースケース
pub struct AttachSessionUseCase {
    sessions: Arc<dyn SessionRepository>,
    counter: Arc<dyn CounterStore>,
    bus: Arc<dyn BroadcastBus>,
}

impl AttachSessionUseCase {
    /// 新しい AttachSessionUseCase を作成
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

    /// セッション接続を実行
    ///
    /// # Arguments
    ///
    /// * `session` - 接続したセッション
    ///
    /// # Returns
    ///
    /// * `Ok(Some(count))` - 登録し、インクリメント後の接続数を publish した
    /// * `Ok(None)` - 登録したが、カウンタ更新または publish に失敗した（ログ出力済み）
    /// * `Err(AttachError)` - レジストリへの登録に失敗した
    pub async fn execute(
        &self,
        session: ClientSession,
    ) -> Result<Option<ConnectionCount>, AttachError> {
        let session_id = session.id;

        // 1. レジストリに登録（自分宛ての接続数更新も受け取れるように先に登録する）
        self.sessions.add_session(session).await?;

        // 2. 共有カウンタをインクリメントして publish
        match self.announce().await {
            Ok(count) => {
                tracing::info!("Session '{}' attached (connected: {})", session_id, count);
                Ok(Some(count))
            }
            Err(e) => {
                tracing::error!(
                    "Session '{}' attached but connection count was not updated: {}",
                    session_id,
                    e
                );
                Ok(None)
            }
        }
    }

    async fn announce(&self) -> Result<ConnectionCount, CountUpdateError> {
        let count = self.counter.increment().await?;
        self.bus
            .publish(BusChannel::ConnectionCountUpdate, count.to_string())
            .await?;
        Ok(count)
    }
}
