//! WebSocket chat relay server: HTTP routes, WebSocket sessions and lifecycle.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{ServeOptions, build_router, run, serve};
pub use state::AppState;
