//! WebSocket message DTOs for the chat relay.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use chat_relay_shared::time::to_iso8601_millis;

use crate::domain::{BusChannel, ChatMessage};

/// Frame sent by a client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl ClientFrame {
    /// Whether this frame is a chat message send
    pub fn is_new_message(&self) -> bool {
        self.event == BusChannel::NewMessage.name()
    }

    /// Text of the `message` field.
    ///
    /// Strings are taken verbatim, numbers and `true` are rendered as text.
    /// Missing, `null`, empty, `false`, zero, arrays and objects yield `None`.
    pub fn message_text(&self) -> Option<String> {
        match self.data.get("message")? {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Number(number) if number.as_f64() != Some(0.0) => Some(number_text(number)),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}

/// Render a number the way browsers print it: integral floats drop `.0`
fn number_text(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e21 => format!("{value:.0}"),
        Some(value) => value.to_string(),
        None => number.to_string(),
    }
}

/// Frame sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerFrame {
    #[serde(rename = "chat:connection-count-update")]
    ConnectionCountUpdate(ConnectionCountDto),
    #[serde(rename = "chat:new-message")]
    NewMessage(NewMessageDto),
}

/// Connected client count, forwarded as the string published on the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCountDto {
    pub count: String,
}

/// Chat message broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageDto {
    pub message: String,
    pub id: String,
    pub created_at: String, // ISO 8601
    pub port: u16,
}

impl From<&ChatMessage> for NewMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            message: message.text.clone(),
            id: message.id.to_string(),
            created_at: to_iso8601_millis(&message.created_at),
            port: message.port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatMessageFactory;
    use chrono::{TimeZone, Utc};

    fn parse(json: &str) -> ClientFrame {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_client_frame_message_text() {
        // テスト項目: message フィールドのテキストを取り出せる
        let frame = parse(r#"{"event":"chat:new-message","data":{"message":"hello"}}"#);
        assert!(frame.is_new_message());
        assert_eq!(frame.message_text(), Some("hello".to_string()));
    }

    #[test]
    fn test_client_frame_missing_or_empty_message() {
        // テスト項目: message が空・欠落・null の場合は None
        for json in [
            r#"{"event":"chat:new-message","data":{"message":""}}"#,
            r#"{"event":"chat:new-message","data":{}}"#,
            r#"{"event":"chat:new-message","data":{"message":null}}"#,
            r#"{"event":"chat:new-message"}"#,
        ] {
            assert_eq!(parse(json).message_text(), None, "payload: {json}");
        }
    }

    #[test]
    fn test_client_frame_non_string_message() {
        // テスト項目: 数値や true はテキストとして扱い、0 や false は無視する
        assert_eq!(
            parse(r#"{"event":"chat:new-message","data":{"message":42}}"#).message_text(),
            Some("42".to_string())
        );
        assert_eq!(
            parse(r#"{"event":"chat:new-message","data":{"message":true}}"#).message_text(),
            Some("true".to_string())
        );
        assert_eq!(
            parse(r#"{"event":"chat:new-message","data":{"message":0}}"#).message_text(),
            None
        );
        assert_eq!(
            parse(r#"{"event":"chat:new-message","data":{"message":false}}"#).message_text(),
            None
        );
    }

    #[test]
    fn test_message_text_numbers_render_like_browsers() {
        // テスト項目: 数値は整数値なら小数点なしで文字列化される
        // then (期待する結果):
        assert_eq!(
            parse(r#"{"event":"chat:new-message","data":{"message":1.0}}"#).message_text(),
            Some("1".to_string())
        );
        assert_eq!(
            parse(r#"{"event":"chat:new-message","data":{"message":-42}}"#).message_text(),
            Some("-42".to_string())
        );
        assert_eq!(
            parse(r#"{"event":"chat:new-message","data":{"message":2.5}}"#).message_text(),
            Some("2.5".to_string())
        );
        assert_eq!(
            parse(r#"{"event":"chat:new-message","data":{"message":-0.0}}"#).message_text(),
            None
        );
    }

    #[test]
    fn test_client_frame_other_event() {
        let frame = parse(r#"{"event":"chat:typing","data":{}}"#);
        assert!(!frame.is_new_message());
    }

    #[test]
    fn test_connection_count_frame_json() {
        // テスト項目: 接続数フレームの JSON 形式
        let frame = ServerFrame::ConnectionCountUpdate(ConnectionCountDto {
            count: "3".to_string(),
        });

        let json: Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "event": "chat:connection-count-update",
                "data": {"count": "3"}
            })
        );
    }

    #[test]
    fn test_new_message_frame_json() {
        // テスト項目: 新着メッセージフレームの JSON 形式（camelCase の createdAt）
        // given (前提条件):
        let created_at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let message = ChatMessageFactory::new(3001).create("hi".to_string(), created_at);

        // when (操作):
        let frame = ServerFrame::NewMessage(NewMessageDto::from(&message));
        let json: Value = serde_json::to_value(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(json["event"], "chat:new-message");
        assert_eq!(json["data"]["message"], "hi");
        assert_eq!(json["data"]["id"], message.id.to_string());
        assert_eq!(json["data"]["createdAt"], "2024-05-06T07:08:09.000Z");
        assert_eq!(json["data"]["port"], 3001);
    }
}
