//! UseCase 層
//!
//! リレーのコア処理を実装するレイヤー。
//! UI 層（WebSocket ハンドラ・バス購読タスク・シャットダウン処理）から呼び出され、
//! Domain 層の trait を通して Counter Store / Broadcast Bus / セッションレジストリを操作します。

pub mod attach_session;
pub mod detach_session;
pub mod error;
pub mod fan_out;
pub mod initialize_counter;
pub mod send_message;
pub mod shutdown;

pub use attach_session::AttachSessionUseCase;
pub use detach_session::DetachSessionUseCase;
pub use error::{AttachError, CountUpdateError, DetachError, SendMessageError};
pub use fan_out::FanOutUseCase;
pub use initialize_counter::InitializeCounterUseCase;
pub use send_message::SendMessageUseCase;
pub use shutdown::{ShutdownReport, ShutdownUseCase};
