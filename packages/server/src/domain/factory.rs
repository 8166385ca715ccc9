//! Domain factories for creating domain entities and value objects.

use chrono::{DateTime, Utc};

use super::{ChatMessage, MessageId, SessionId};

/// Factory for generating SessionId instances.
pub struct SessionIdFactory;

impl SessionIdFactory {
    /// Generate a new SessionId with a random UUID v4.
    pub fn generate() -> SessionId {
        SessionId::from_uuid(uuid::Uuid::new_v4())
    }
}

/// Factory for building the chat messages fanned out to local sessions.
///
/// Every call assigns a fresh UUID v4 and the given fan-out time, so the same
/// bus payload delivered twice produces two distinct messages.
pub struct ChatMessageFactory {
    port: u16,
}

impl ChatMessageFactory {
    /// Create a factory stamping messages with this instance's listening port.
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Build a message for `text` created at `now`.
    pub fn create(&self, text: String, now: DateTime<Utc>) -> ChatMessage {
        ChatMessage::new(
            MessageId::from_uuid(uuid::Uuid::new_v4()),
            text,
            now,
            self.port,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_factory_generate_uniqueness() {
        // テスト項目: SessionIdFactory::generate() は毎回異なる ID を生成する
        // when (操作):
        let id1 = SessionIdFactory::generate();
        let id2 = SessionIdFactory::generate();

        // then (期待する結果):
        assert_ne!(id1, id2);
        assert_eq!(id1.to_string().len(), 36); // UUID v4 の標準長（ハイフン含む）
    }

    #[test]
    fn test_chat_message_factory_assigns_fresh_ids() {
        // テスト項目: 同じテキストでも毎回異なる ID が割り当てられる
        // given (前提条件):
        let factory = ChatMessageFactory::new(3001);
        let now = Utc::now();

        // when (操作):
        let first = factory.create("hi".to_string(), now);
        let second = factory.create("hi".to_string(), now);

        // then (期待する結果):
        assert_ne!(first.id, second.id);
        assert_eq!(first.text, "hi");
        assert_eq!(first.port, 3001);
        assert_eq!(first.created_at, now);
    }
}
