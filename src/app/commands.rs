//! Command handlers - business logic for processing UI events

use serde_json::json;

use crate::app::AppState;
use crate::events::{AppEvent, EventDraft};
use crate::messages::ui_events::{AppTab, BuilderField, InputMode};
use crate::messages::NetworkUpdate;
use crate::models::UserRole;
use crate::quiz::{QuizSession, MAX_QUESTIONS, MIN_QUESTIONS};

impl AppState {
    // ========================
    // Navigation
    // ========================

    pub fn switch_tab(&mut self, tab: AppTab) {
        self.active_tab = tab;
        self.input_mode = InputMode::Normal;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Header controls
    // ========================

    /// Broadcast so other components can follow the role
    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        if !self.builder_field.visible_for(role) {
            self.builder_field = BuilderField::Topic;
            self.cursor_position = self.current_input().len();
        }
        self.emit(
            EventDraft::info(format!("role:{}", role.as_str())).scope("role"),
        );
    }

    pub fn toggle_lang(&mut self) {
        self.lang = self.lang.toggle();
        if let Err(e) = self.storage.save_lang(self.lang) {
            tracing::warn!(error = %e, "Failed to save language preference");
            self.emit(
                EventDraft::warn(format!("Could not save language preference: {}", e))
                    .scope("i18n"),
            );
        }
        self.emit(EventDraft::info(format!("lang:{}", self.lang.as_str())).scope("i18n"));
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        let model = self.model();
        self.emit(
            EventDraft::info(format!("mode:{}", self.mode.as_str()))
                .scope("mode")
                .data(json!({ "model": model.display_name() })),
        );
    }

    // ========================
    // Network
    // ========================

    /// Take the sampler's latest snapshot
    pub fn handle_network_update(&mut self, update: NetworkUpdate) {
        let previous_model = self.model();
        self.stats = update.stats;

        if let Some(updated) = self.stats.last_updated {
            let quality = self.quality();
            self.emit(
                EventDraft::debug(self.stats.summary())
                    .scope("network")
                    .data(json!({
                        "downlinkMbps": self.stats.downlink_mbps,
                        "rttMs": self.stats.rtt_ms,
                        "effectiveType": self.stats.effective_type,
                        "quality": quality,
                        "lastUpdated": updated.timestamp_millis(),
                    })),
            );
        }

        let model = self.model();
        if model != previous_model {
            self.emit(
                EventDraft::info(format!("Model switched to {}", model.display_name()))
                    .scope("model"),
            );
        }
    }

    // ========================
    // Event log
    // ========================

    pub fn record_event(&mut self, event: AppEvent) {
        self.event_log.push(event);
    }

    pub fn scroll_up(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max = self.visible_events().len().saturating_sub(1) as u16;
        self.log_scroll = self.log_scroll.saturating_add(1).min(max);
    }

    pub fn clear_log(&mut self) {
        self.event_log.clear();
        self.log_scroll = 0;
        self.scope_filter = None;
        self.status_message = Some("Event log cleared".to_string());
    }

    /// All scopes in turn, then back to unfiltered
    pub fn cycle_scope_filter(&mut self) {
        let scopes = self.event_log.scopes();
        self.scope_filter = match &self.scope_filter {
            None => scopes.first().cloned(),
            Some(current) => scopes
                .iter()
                .position(|s| s == current)
                .and_then(|i| scopes.get(i + 1).cloned()),
        };
        self.log_scroll = 0;
    }

    /// Export the whole log (not just the filtered view)
    pub fn export_log(&mut self) {
        let dir = self.storage.settings.export_dir();
        match self.event_log.export_to_dir(&dir) {
            Ok(path) => {
                let msg = format!("Exported {} events to {}", self.event_log.len(), path.display());
                self.status_message = Some(msg.clone());
                self.emit(EventDraft::info(msg).scope("log"));
            }
            Err(e) => {
                tracing::error!(error = %e, "Event log export failed");
                self.status_message = Some(format!("Export failed: {}", e));
                self.emit(EventDraft::error(format!("Export failed: {:#}", e)).scope("log"));
            }
        }
    }

    // ========================
    // Quiz builder editing
    // ========================

    pub fn start_editing(&mut self) {
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.current_input().len();
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn next_builder_field(&mut self) {
        self.builder_field = self.builder_field.next(self.role);
        self.cursor_position = self.current_input().len();
    }

    pub fn move_cursor_left(&mut self) {
        let input = self.current_input();
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let input = self.current_input();
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        let input = self.current_input_mut();
        if cursor_pos <= input.len() {
            input.insert(cursor_pos, c);
            self.cursor_position = cursor_pos + c.len_utf8();
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let cursor_pos = self.cursor_position;
            let input = self.current_input_mut();
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    // ========================
    // Quiz builder options
    // ========================

    pub fn cycle_difficulty(&mut self) {
        self.builder.difficulty = self.builder.difficulty.next();
    }

    /// Teacher setup only
    pub fn cycle_question_type(&mut self) {
        if self.role == UserRole::Teach {
            self.builder.question_type = self.builder.question_type.next();
        }
    }

    pub fn more_questions(&mut self) {
        self.builder.num_questions = (self.builder.num_questions + 1).min(MAX_QUESTIONS);
    }

    pub fn fewer_questions(&mut self) {
        self.builder.num_questions = self.builder.num_questions.saturating_sub(1).max(MIN_QUESTIONS);
    }

    pub fn toggle_hints(&mut self) {
        self.builder.enable_hints = !self.builder.enable_hints;
    }

    pub fn start_quiz(&mut self) {
        if !self.builder.can_build() {
            self.status_message = Some("Add a topic or source text first".to_string());
            return;
        }

        let session = QuizSession::new(self.builder.for_role(self.role));
        self.emit(
            EventDraft::info(format!(
                "Quiz started: {} questions ({})",
                session.questions.len(),
                session.spec.difficulty.as_str()
            ))
            .scope("quiz")
            .data(json!({ "topic": session.spec.topic, "role": self.role })),
        );
        self.quiz = Some(session);
        self.active_tab = AppTab::Quiz;
    }

    // ========================
    // Quiz runner
    // ========================

    /// Move the selected option by `delta`, wrapping around
    pub fn pick_option(&mut self, delta: isize) {
        if let Some(quiz) = self.quiz.as_mut() {
            let n = quiz.current_question().options.len() as isize;
            let next = match quiz.answers[quiz.current] {
                Some(a) => (a as isize + delta).rem_euclid(n),
                None if delta < 0 => n - 1,
                None => 0,
            };
            quiz.select_answer(next as usize);
        }
    }

    /// Next question, or submit from the last one
    pub fn quiz_next(&mut self) {
        let last = self.quiz.as_ref().map_or(false, |q| q.is_last());
        if last {
            self.quiz_submit();
        } else if let Some(quiz) = self.quiz.as_mut() {
            quiz.next();
        }
    }

    pub fn quiz_prev(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.prev();
        }
    }

    pub fn quiz_submit(&mut self) {
        let submitted = self.quiz.as_mut().map_or(false, |q| q.submit());
        if submitted {
            self.announce_result(false);
        }
    }

    pub fn toggle_hint(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.toggle_hint();
        }
    }

    pub fn exit_quiz(&mut self) {
        if self.quiz.take().is_some() {
            self.emit(EventDraft::debug("Quiz closed").scope("quiz"));
        }
    }

    /// One second on the quiz clock
    pub fn tick_quiz(&mut self) -> bool {
        let timed_out = self.quiz.as_mut().map_or(false, |q| q.tick());
        if timed_out {
            self.announce_result(true);
        }
        self.quiz.as_ref().map_or(false, |q| !q.submitted)
    }

    fn announce_result(&mut self, timed_out: bool) {
        if let Some(quiz) = self.quiz.as_ref() {
            let score = quiz.score();
            let total = quiz.questions.len();
            let draft = if quiz.passed() {
                EventDraft::info(format!("Quiz complete: {}/{}", score, total))
            } else {
                EventDraft::warn(format!("Quiz complete: {}/{}", score, total))
            };
            self.emit(
                draft
                    .scope("quiz")
                    .data(json!({ "score": score, "total": total, "timedOut": timed_out })),
            );
        }
    }
}
