//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::UserRole;

/// Application tabs
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum AppTab {
    #[default]
    Log,
    Quiz,
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Tab navigation
    SwitchTab(AppTab),

    // Header controls
    SetRole(UserRole),
    ToggleLang,
    CycleMode,
    Resample,

    // Event log
    ScrollUp,
    ScrollDown,
    ExportLog,
    ClearLog,
    CycleScopeFilter,

    // Quiz builder
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    NextBuilderField,
    CycleDifficulty,
    CycleQuestionType,
    MoreQuestions,
    FewerQuestions,
    ToggleHints,
    StartQuiz,

    // Quiz runner
    PickPrevOption,
    PickNextOption,
    QuizNext,
    QuizPrev,
    QuizSubmit,
    ToggleHint,
    ExitQuiz,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Quiz builder text field being edited
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum BuilderField {
    // Teacher setup
    GradeLevel,
    Objectives,

    #[default]
    Topic,
    SourceText,
}

impl BuilderField {
    /// Whether the field is shown for `role`
    pub fn visible_for(&self, role: UserRole) -> bool {
        match self {
            BuilderField::GradeLevel | BuilderField::Objectives => role == UserRole::Teach,
            BuilderField::Topic | BuilderField::SourceText => true,
        }
    }

    /// Next field in display order, skipping fields hidden for `role`
    pub fn next(&self, role: UserRole) -> BuilderField {
        let mut field = *self;
        loop {
            field = match field {
                BuilderField::GradeLevel => BuilderField::Objectives,
                BuilderField::Objectives => BuilderField::Topic,
                BuilderField::Topic => BuilderField::SourceText,
                BuilderField::SourceText => BuilderField::GradeLevel,
            };
            if field.visible_for(role) {
                return field;
            }
        }
    }
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_tab: AppTab,
    input_mode: InputMode,
    show_help: bool,
    quiz_running: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('c') = key.code {
            return Some(UiEvent::Quit);
        }
    }

    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if input_mode == InputMode::Editing {
        return match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(UiEvent::StopEditing),
            KeyCode::Tab => Some(UiEvent::NextBuilderField),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            _ => None,
        };
    }

    // Header controls work on every tab
    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        KeyCode::Char('1') => return Some(UiEvent::SwitchTab(AppTab::Log)),
        KeyCode::Char('2') => return Some(UiEvent::SwitchTab(AppTab::Quiz)),
        KeyCode::Char('t') => return Some(UiEvent::SetRole(UserRole::Teach)),
        KeyCode::Char('l') => return Some(UiEvent::SetRole(UserRole::Learn)),
        KeyCode::Char('g') => return Some(UiEvent::ToggleLang),
        KeyCode::Char('m') => return Some(UiEvent::CycleMode),
        KeyCode::Char('r') => return Some(UiEvent::Resample),
        _ => {}
    }

    match active_tab {
        AppTab::Log => handle_log_tab_keys(key),
        AppTab::Quiz if quiz_running => handle_runner_keys(key),
        AppTab::Quiz => handle_builder_keys(key),
    }
}

fn handle_log_tab_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Up => Some(UiEvent::ScrollUp),
        KeyCode::Down => Some(UiEvent::ScrollDown),
        KeyCode::Char('x') => Some(UiEvent::ExportLog),
        KeyCode::Char('c') => Some(UiEvent::ClearLog),
        KeyCode::Char('f') => Some(UiEvent::CycleScopeFilter),
        _ => None,
    }
}

fn handle_builder_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('e') => Some(UiEvent::StartEditing),
        KeyCode::Tab => Some(UiEvent::NextBuilderField),
        KeyCode::Char('d') => Some(UiEvent::CycleDifficulty),
        KeyCode::Char('y') => Some(UiEvent::CycleQuestionType),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(UiEvent::MoreQuestions),
        KeyCode::Char('-') => Some(UiEvent::FewerQuestions),
        KeyCode::Char('h') => Some(UiEvent::ToggleHints),
        KeyCode::Char('s') | KeyCode::Enter => Some(UiEvent::StartQuiz),
        _ => None,
    }
}

fn handle_runner_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Up => Some(UiEvent::PickPrevOption),
        KeyCode::Down => Some(UiEvent::PickNextOption),
        KeyCode::Right | KeyCode::Char('n') | KeyCode::Enter => Some(UiEvent::QuizNext),
        KeyCode::Left | KeyCode::Char('p') => Some(UiEvent::QuizPrev),
        KeyCode::Char('s') => Some(UiEvent::QuizSubmit),
        KeyCode::Char('h') => Some(UiEvent::ToggleHint),
        KeyCode::Esc => Some(UiEvent::ExitQuiz),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_header_keys_on_any_tab() {
        for tab in [AppTab::Log, AppTab::Quiz] {
            assert_eq!(
                key_to_ui_event(press(KeyCode::Char('m')), tab, InputMode::Normal, false, false),
                Some(UiEvent::CycleMode)
            );
            assert_eq!(
                key_to_ui_event(press(KeyCode::Char('t')), tab, InputMode::Normal, false, true),
                Some(UiEvent::SetRole(UserRole::Teach))
            );
        }
    }

    #[test]
    fn test_editing_captures_characters() {
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('q')), AppTab::Quiz, InputMode::Editing, false, false),
            Some(UiEvent::CharInput('q'))
        );
    }

    #[test]
    fn test_context_dependent_keys() {
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('h')), AppTab::Quiz, InputMode::Normal, false, false),
            Some(UiEvent::ToggleHints)
        );
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('h')), AppTab::Quiz, InputMode::Normal, false, true),
            Some(UiEvent::ToggleHint)
        );
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('x')), AppTab::Log, InputMode::Normal, false, false),
            Some(UiEvent::ExportLog)
        );
    }

    #[test]
    fn test_builder_fields_follow_role() {
        assert_eq!(BuilderField::Topic.next(UserRole::Learn), BuilderField::SourceText);
        assert_eq!(BuilderField::SourceText.next(UserRole::Learn), BuilderField::Topic);

        let mut field = BuilderField::Topic;
        let mut order = Vec::new();
        for _ in 0..4 {
            field = field.next(UserRole::Teach);
            order.push(field);
        }
        assert_eq!(
            order,
            vec![
                BuilderField::SourceText,
                BuilderField::GradeLevel,
                BuilderField::Objectives,
                BuilderField::Topic,
            ]
        );
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('y')), AppTab::Quiz, InputMode::Normal, false, false),
            Some(UiEvent::CycleQuestionType)
        );
    }

    #[test]
    fn test_help_swallows_keys() {
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('x')), AppTab::Log, InputMode::Normal, true, false),
            Some(UiEvent::CloseHelp)
        );
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(
            key_to_ui_event(ctrl_c, AppTab::Log, InputMode::Normal, true, false),
            Some(UiEvent::Quit)
        );
    }
}
