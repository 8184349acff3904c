//! App state - pure data structure; side effects go through the bus and storage

use crate::events::{AppEvent, EventBus, EventDraft, EventLog};
use crate::messages::ui_events::{AppTab, BuilderField, InputMode};
use crate::messages::RenderState;
use crate::models::{select_model, ConnectionMode, Lang, ModelTier, UserRole};
use crate::network::{NetworkStats, Quality};
use crate::quiz::{QuizSession, QuizSpec};
use crate::storage::Storage;

/// Main application state
pub struct AppState {
    // Tab navigation
    pub active_tab: AppTab,

    // Header
    pub role: UserRole,
    pub lang: Lang,
    pub mode: ConnectionMode,
    pub stats: NetworkStats,

    // Event log panel
    pub event_log: EventLog,
    pub scope_filter: Option<String>,
    pub log_scroll: u16,

    // Quiz builder
    pub input_mode: InputMode,
    pub builder: QuizSpec,
    pub builder_field: BuilderField,
    pub cursor_position: usize,

    // Quiz runner
    pub quiz: Option<QuizSession>,

    // Popups
    pub show_help: bool,
    pub status_message: Option<String>,

    // Persisted preferences and settings
    pub storage: Storage,

    pub(crate) bus: EventBus,
}

impl AppState {
    pub fn new(bus: EventBus, storage: Storage) -> Self {
        AppState {
            active_tab: AppTab::Log,
            role: UserRole::default(),
            lang: storage.lang(),
            mode: ConnectionMode::default(),
            stats: NetworkStats::default(),
            event_log: EventLog::with_capacity(storage.settings.log_capacity),
            scope_filter: None,
            log_scroll: 0,
            input_mode: InputMode::Normal,
            builder: QuizSpec::default(),
            builder_field: BuilderField::Topic,
            cursor_position: 0,
            quiz: None,
            show_help: false,
            status_message: None,
            storage,
            bus,
        }
    }

    pub fn quality(&self) -> Quality {
        self.stats.quality()
    }

    pub fn model(&self) -> ModelTier {
        select_model(self.mode, self.quality())
    }

    pub(crate) fn emit(&self, draft: EventDraft) -> AppEvent {
        self.bus.emit(draft)
    }

    /// Events currently shown in the log panel
    pub fn visible_events(&self) -> Vec<AppEvent> {
        self.event_log.filtered(self.scope_filter.as_deref())
    }

    /// Get the builder field being edited
    pub fn current_input(&self) -> &str {
        match self.builder_field {
            BuilderField::GradeLevel => &self.builder.grade_level,
            BuilderField::Objectives => &self.builder.objectives,
            BuilderField::Topic => &self.builder.topic,
            BuilderField::SourceText => &self.builder.source_text,
        }
    }

    pub fn current_input_mut(&mut self) -> &mut String {
        match self.builder_field {
            BuilderField::GradeLevel => &mut self.builder.grade_level,
            BuilderField::Objectives => &mut self.builder.objectives,
            BuilderField::Topic => &mut self.builder.topic,
            BuilderField::SourceText => &mut self.builder.source_text,
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            active_tab: self.active_tab,
            role: self.role,
            lang: self.lang,
            mode: self.mode,
            stats: self.stats.clone(),
            quality: self.quality(),
            model: self.model(),
            events: self.visible_events(),
            total_events: self.event_log.len(),
            scope_filter: self.scope_filter.clone(),
            log_scroll: self.log_scroll,
            input_mode: self.input_mode,
            builder: self.builder.clone(),
            builder_field: self.builder_field,
            cursor_position: self.cursor_position,
            quiz: self.quiz.clone(),
            show_help: self.show_help,
            status_message: self.status_message.clone(),
        }
    }
}
