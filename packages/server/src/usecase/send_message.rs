//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - クライアントのメッセージを Broadcast Bus にそのまま publish すること
//!
//! ### なぜこのテストが必要か
//! - 空・欠落したメッセージはエラーも publish もせず無視すること
//! - テキストが加工されずに publish されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージの publish
//! - 異常系：Broadcast Bus 障害
//! - エッジケース：空文字列・message フィールドなし

use std::sync::Arc;

use crate::domain::{BroadcastBus, BusChannel, MessageText, SessionId};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    bus: Arc<dyn BroadcastBus>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(bus: Arc<dyn BroadcastBus>) -> Self {
        Self { bus }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `session_id` - 送信したセッションの ID（ログ用）
    /// * `message` - クライアントが送った message フィールド
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - publish した
    /// * `Ok(false)` - メッセージが空または欠落していたため何もしなかった
    /// * `Err(SendMessageError)` - publish に失敗した
    pub async fn execute(
        &self,
        session_id: &SessionId,
        message: Option<String>,
    ) -> Result<bool, SendMessageError> {
        let Some(text) = message.and_then(|m| MessageText::new(m).ok()) else {
            return Ok(false);
        };

        tracing::debug!("Publishing message from '{}': {}", session_id, text);
        self.bus
            .publish(BusChannel::NewMessage, text.into_string())
            .await?;

        Ok(true)
    }
}
