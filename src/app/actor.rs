//! App actor - message loop processing UI events, network snapshots and bus events

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::app::state::AppState;
use crate::events::{AppEvent, EventBus, EventDraft};
use crate::messages::{NetworkCommand, NetworkUpdate, RenderState, UiEvent};
use crate::storage::Storage;

/// App actor that owns the state and reacts to every other layer
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        bus: EventBus,
        storage: Storage,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state: AppState::new(bus, storage),
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop.
    ///
    /// `bus_rx` is fed by a channel listener on the same bus the state emits on.
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkUpdate>,
        mut bus_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) {
        let mut quiz_clock = tokio::time::interval(Duration::from_secs(1));
        quiz_clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.state.emit(EventDraft::info("Session started").scope("app"));
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                event = ui_rx.recv() => {
                    match event {
                        Some(event) => {
                            let had_quiz = self.state.quiz.is_some();
                            if self.handle_ui_event(event) {
                                break;
                            }
                            // A new quiz gets a full first second
                            if !had_quiz && self.state.quiz.is_some() {
                                quiz_clock.reset();
                            }
                        }
                        None => break,
                    }
                }
                Some(update) = net_rx.recv() => {
                    self.state.handle_network_update(update);
                }
                Some(evt) = bus_rx.recv() => {
                    self.state.record_event(evt);
                }
                _ = quiz_clock.tick() => {
                    if self.state.quiz.as_ref().map_or(true, |q| q.submitted) {
                        continue;
                    }
                    self.state.tick_quiz();
                }
            }
            let _ = self.render_tx.send(self.state.to_render_state());
        }

        // Quit signal received or UI gone
        let _ = self.network_tx.send(NetworkCommand::Shutdown);
        tracing::info!(events = self.state.event_log.len(), "App actor stopped");
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::SwitchTab(tab) => self.state.switch_tab(tab),

            // Header
            UiEvent::SetRole(role) => self.state.set_role(role),
            UiEvent::ToggleLang => self.state.toggle_lang(),
            UiEvent::CycleMode => self.state.cycle_mode(),
            UiEvent::Resample => {
                let _ = self.network_tx.send(NetworkCommand::Resample);
                self.state.status_message = Some("Measuring network...".to_string());
            }

            // Event log
            UiEvent::ScrollUp => self.state.scroll_up(),
            UiEvent::ScrollDown => self.state.scroll_down(),
            UiEvent::ExportLog => self.state.export_log(),
            UiEvent::ClearLog => self.state.clear_log(),
            UiEvent::CycleScopeFilter => self.state.cycle_scope_filter(),

            // Quiz builder
            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),
            UiEvent::NextBuilderField => self.state.next_builder_field(),
            UiEvent::CycleDifficulty => self.state.cycle_difficulty(),
            UiEvent::CycleQuestionType => self.state.cycle_question_type(),
            UiEvent::MoreQuestions => self.state.more_questions(),
            UiEvent::FewerQuestions => self.state.fewer_questions(),
            UiEvent::ToggleHints => self.state.toggle_hints(),
            UiEvent::StartQuiz => self.state.start_quiz(),

            // Quiz runner
            UiEvent::PickPrevOption => self.state.pick_option(-1),
            UiEvent::PickNextOption => self.state.pick_option(1),
            UiEvent::QuizNext => self.state.quiz_next(),
            UiEvent::QuizPrev => self.state.quiz_prev(),
            UiEvent::QuizSubmit => self.state.quiz_submit(),
            UiEvent::ToggleHint => self.state.toggle_hint(),
            UiEvent::ExitQuiz => self.state.exit_quiz(),

            // Popups
            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::CloseHelp => self.state.close_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}
