//! UseCase: グレースフルシャットダウン時のカウンタ補正
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ShutdownUseCase::execute() メソッド
//! - このインスタンスに接続中のセッション数だけ共有カウンタを減らすこと
//!
//! ### なぜこのテストが必要か
//! - 停止したインスタンスの接続が共有カウンタに残り続けないこと
//! - 補正後にソケットが閉じても、切断処理でカウンタを二重に減らさないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中セッションありの停止
//! - エッジケース：接続中セッションなしの停止
//! - 異常系：Counter Store 障害

use std::sync::Arc;

use crate::domain::{
    BroadcastBus, BusChannel, ConnectionCount, CounterStore, SessionRepository,
};

use super::error::CountUpdateError;

/// シャットダウン補正の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// レジストリから回収したセッション数
    pub drained: usize,
    /// 補正後の共有カウンタ（補正不要だった場合は None）
    pub count: Option<ConnectionCount>,
}

/// シャットダウン補正のユースケース
pub struct ShutdownUseCase {
    sessions: Arc<dyn SessionRepository>,
    counter: Arc<dyn CounterStore>,
    bus: Arc<dyn BroadcastBus>,
}

impl ShutdownUseCase {
    /// 新しい ShutdownUseCase を作成
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

    /// シャットダウン補正を実行
    ///
    /// 1. レジストリの全セッションを回収する（送信キューが閉じ、各ソケットが閉じる）
    /// 2. 回収した数だけ共有カウンタを DECRBY で一度に減らす
    /// 3. 補正後の値を publish する
    ///
    /// 回収済みセッションの切断処理は NotAttached になり、カウンタを再度減らさない。
    pub async fn execute(&self) -> Result<ShutdownReport, CountUpdateError> {
        let drained = self.sessions.drain_sessions().await.len();
        if drained == 0 {
            tracing::info!("No attached sessions, connection count left unchanged");
            return Ok(ShutdownReport {
                drained,
                count: None,
            });
        }

        tracing::info!("Removing {} sessions from the connection count", drained);
        let amount = i64::try_from(drained).unwrap_or(i64::MAX);
        let count = self.counter.decrement_by(amount).await?;
        self.bus
            .publish(BusChannel::ConnectionCountUpdate, count.to_string())
            .await?;

        Ok(ShutdownReport {
            drained,
            count: Some(count),
        })
    }
}
