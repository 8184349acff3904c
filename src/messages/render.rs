//! Render state - data structure sent from App layer to UI for rendering

use crate::events::AppEvent;
use crate::messages::ui_events::{AppTab, BuilderField, InputMode};
use crate::models::{ConnectionMode, Lang, ModelTier, UserRole};
use crate::network::{NetworkStats, Quality};
use crate::quiz::{QuizSession, QuizSpec};

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Tab
    pub active_tab: AppTab,

    // Header
    pub role: UserRole,
    pub lang: Lang,
    pub mode: ConnectionMode,
    pub stats: NetworkStats,
    pub quality: Quality,
    pub model: ModelTier,

    // Event log (already filtered, newest first)
    pub events: Vec<AppEvent>,
    pub total_events: usize,
    pub scope_filter: Option<String>,
    pub log_scroll: u16,

    // Quiz
    pub input_mode: InputMode,
    pub builder: QuizSpec,
    pub builder_field: BuilderField,
    pub cursor_position: usize,
    pub quiz: Option<QuizSession>,

    // Popups
    pub show_help: bool,
    pub status_message: Option<String>,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            active_tab: AppTab::Log,
            role: UserRole::default(),
            lang: Lang::default(),
            mode: ConnectionMode::default(),
            stats: NetworkStats::default(),
            quality: Quality::Unknown,
            model: ModelTier::Local,
            events: Vec::new(),
            total_events: 0,
            scope_filter: None,
            log_scroll: 0,
            input_mode: InputMode::Normal,
            builder: QuizSpec::default(),
            builder_field: BuilderField::Topic,
            cursor_position: 0,
            quiz: None,
            show_help: false,
            status_message: None,
        }
    }
}
