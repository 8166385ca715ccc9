//! UseCase: バス配信のファンアウト処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - FanOutUseCase の接続数更新・新着メッセージのローカル配信
//!
//! ### なぜこのテストが必要か
//! - 自インスタンス発のものも含め、バスから届いた全イベントを全ローカルセッションへ配る
//! - メッセージ ID は配信ごとに新しく生成される
//! - 切断済みのセッションには配送しない
//!
//! ### どのような状況を想定しているか
//! - 正常系：全セッションへの配信
//! - エッジケース：同じテキストの複数回配信、配信中の切断

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use chat_relay_shared::time::now_utc;

use crate::{
    domain::{BusChannel, BusEvent, ChatMessageFactory, SessionRepository},
    infrastructure::dto::websocket::{ConnectionCountDto, NewMessageDto, ServerFrame},
};

/// バス配信をローカルセッションへ配るユースケース
pub struct FanOutUseCase {
    sessions: Arc<dyn SessionRepository>,
    factory: ChatMessageFactory,
}

impl FanOutUseCase {
    /// 新しい FanOutUseCase を作成
    ///
    /// `port` はこのインスタンスの待ち受けポート（メッセージに付与する診断情報）
    pub fn new(sessions: Arc<dyn SessionRepository>, port: u16) -> Self {
        Self {
            sessions,
            factory: ChatMessageFactory::new(port),
        }
    }

    /// バスの購読が終わるまで配信を処理し続ける
    ///
    /// 一つのタスクで順に処理するため、ローカル配信の順序はバスの配信順と同じ
    pub async fn run(self, mut deliveries: UnboundedReceiver<BusEvent>) {
        while let Some(event) = deliveries.recv().await {
            self.dispatch(event).await;
        }
        tracing::warn!("Bus delivery stream ended, fan-out stopped");
    }

    /// 一件の配信を処理し、配送できたセッション数を返す
    pub async fn dispatch(&self, event: BusEvent) -> usize {
        match event.channel {
            BusChannel::ConnectionCountUpdate => {
                self.broadcast_connection_count(event.payload).await
            }
            BusChannel::NewMessage => self.broadcast_new_message(event.payload).await,
        }
    }

    /// 接続数 `{count}` を全ローカルセッションへ配る（値はバスの文字列のまま）
    pub async fn broadcast_connection_count(&self, count: String) -> usize {
        let frame = ServerFrame::ConnectionCountUpdate(ConnectionCountDto { count });
        self.broadcast(&frame).await
    }

    /// 新着メッセージを全ローカルセッションへ配る
    pub async fn broadcast_new_message(&self, text: String) -> usize {
        let message = self.factory.create(text, now_utc());
        let frame = ServerFrame::NewMessage(NewMessageDto::from(&message));
        self.broadcast(&frame).await
    }

    async fn broadcast(&self, frame: &ServerFrame) -> usize {
        let json = match serde_json::to_string(frame) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize frame: {}", e);
                return 0;
            }
        };

        let snapshot = self.sessions.snapshot().await;
        let mut delivered = 0;
        for session in &snapshot {
            if session.deliver(json.clone()) {
                delivered += 1;
            } else {
                tracing::debug!("Session '{}' is closing, frame dropped", session.id);
            }
        }
        tracing::debug!("Fanned out frame to {}/{} sessions", delivered, snapshot.len());

        delivered
    }
}
