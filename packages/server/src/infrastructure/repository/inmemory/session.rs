//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! HashMap をこのインスタンスの接続レジストリとして使用します。
//! ローカルの接続数はこのレジストリのサイズそのもので、別のカウンタは持ちません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientSession, RegistryError, SessionId, SessionRepository};

/// インメモリ Session Repository 実装
#[derive(Default)]
pub struct InMemorySessionRepository {
    /// 接続中のセッション（WebSocket sender を含む）
    sessions: Mutex<HashMap<SessionId, ClientSession>>,
}

impl InMemorySessionRepository {
    /// 新しい InMemorySessionRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn add_session(&self, session: ClientSession) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session.id) {
            return Err(RegistryError::SessionAlreadyRegistered(
                session.id.to_string(),
            ));
        }
        sessions.insert(session.id, session);
        Ok(())
    }

    async fn remove_session(&self, session_id: &SessionId) -> Result<ClientSession, RegistryError> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .remove(session_id)
            .ok_or_else(|| RegistryError::SessionNotFound(session_id.to_string()))
    }

    async fn snapshot(&self) -> Vec<ClientSession> {
        let sessions = self.sessions.lock().await;
        sessions.values().cloned().collect()
    }

    async fn count_sessions(&self) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.len()
    }

    async fn drain_sessions(&self) -> Vec<ClientSession> {
        let mut sessions = self.sessions.lock().await;
        sessions.drain().map(|(_, session)| session).collect()
    }
}
