//! App layer - central state management and command processing
//!
//! The App actor receives UI events, network snapshots and bus events,
//! updates state, and emits network commands and render state.

pub mod state;
pub mod actor;
pub mod commands;

pub use state::AppState;
pub use actor::AppActor;
