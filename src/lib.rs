//! # EduChat Shell
//!
//! Terminal header and side panels for an educational chat/quiz app.
//!
//! ## Features
//! - Teacher/learner role toggle and language preference
//! - Network quality badge (good / ok / poor / unknown) from periodic sampling
//! - Model tier selection driven by quality, with online/offline override
//! - Event log panel fed by an in-process event bus, with JSON export
//! - Quiz builder and timed quiz runner
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime) - connectivity sampler
//! - Event bus - synchronous fan-out shared by the layers

pub mod constants;
pub mod models;
pub mod storage;
pub mod ui;
pub mod events;
pub mod quiz;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use models::{select_model, ConnectionMode, Lang, ModelTier, UserRole};
pub use events::{AppEvent, EventBus, EventDraft, EventLog, LogLevel, Subscription};
pub use network::{classify, NetworkActor, NetworkStats, Quality};
pub use messages::{UiEvent, NetworkCommand, NetworkUpdate, RenderState};
pub use app::{AppState, AppActor};
pub use quiz::{QuizSession, QuizSpec};
pub use storage::{Settings, Storage};
