//! InMemory 実装

pub mod bus;
pub mod counter;
pub mod session;

pub use bus::InMemoryBroadcastBus;
pub use counter::InMemoryCounterStore;
pub use session::InMemorySessionRepository;
