//! EduChat Shell - actor-based terminal header, event log and quiz
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - periodic connectivity sampling

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;

use educhat_shell::constants::{APP_NAME, APP_VERSION, LOG_FILE_NAME};
use educhat_shell::events::{self, AppEvent, EventBus};
use educhat_shell::messages::ui_events::{key_to_ui_event, AppTab, BuilderField, InputMode};
use educhat_shell::messages::{NetworkCommand, NetworkUpdate, RenderState, UiEvent};
use educhat_shell::models::UserRole;
use educhat_shell::network::client::create_client;
use educhat_shell::network::{
    ConnectivitySource, HttpProbe, ManualConnectivity, NetworkActor, NoConnectivityInfo,
};
use educhat_shell::quiz::QuizSession;
use educhat_shell::storage::Storage;
use educhat_shell::ui::{
    format_event_time, highlight_json, level_color, mode_icon, quality_color, render_tabs,
};
use educhat_shell::AppActor;

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE_NAME);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    events::install_panic_hook();

    let storage = Storage::new();
    let settings = storage.settings.clone();
    tracing::info!(dir = %storage.config_dir().display(), ?settings, "Loaded settings");

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _terminal_guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_update_tx, net_update_rx) = mpsc::unbounded_channel::<NetworkUpdate>();
    let (bus_tx, bus_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Event bus: mirror into the log file, feed the app actor
    let bus = EventBus::new();
    let _trace_sub = bus.subscribe(events::trace_listener());
    let _panel_sub = bus.subscribe(events::channel_listener(bus_tx));

    // Spawn network actor
    let source: Arc<dyn ConnectivitySource> = match settings.connectivity.clone() {
        Some(info) => Arc::new(ManualConnectivity::new(info)),
        None => Arc::new(NoConnectivityInfo),
    };
    let probe = Arc::new(HttpProbe::new(
        create_client(settings.probe_timeout()),
        settings.probe_url.clone(),
    ));
    let network_actor = NetworkActor::new(settings.ping_interval(), source, probe, net_update_tx);
    let network_handle = tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(bus.clone(), storage, net_cmd_tx, render_tx);
    let app_handle = tokio::spawn(app_actor.run(ui_rx, net_update_rx, bus_rx));

    // Run UI loop (synchronous with async polling)
    let result = run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await;

    // UI sender is gone: the app actor stops and shuts the sampler down
    let _ = app_handle.await;
    let _ = network_handle.await;
    bus.shutdown();

    result
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.active_tab,
                    current_state.input_mode,
                    current_state.show_help,
                    current_state.quiz.is_some(),
                ) {
                    if matches!(event, UiEvent::Quit) {
                        let _ = ui_tx.send(event);
                        break;
                    }
                    let _ = ui_tx.send(event);
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(f, state, main_chunks[0]);

    let selected = match state.active_tab {
        AppTab::Log => 0,
        AppTab::Quiz => 1,
    };
    f.render_widget(render_tabs(&[" 1:Event Log ", " 2:Quiz "], selected), main_chunks[1]);

    match state.active_tab {
        AppTab::Log => draw_log_tab(f, state, main_chunks[2]),
        AppTab::Quiz => match &state.quiz {
            Some(quiz) => draw_quiz_runner(f, quiz, main_chunks[2]),
            None => draw_quiz_builder(f, state, main_chunks[2]),
        },
    }

    draw_status_bar(f, state, main_chunks[3]);

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_header(f: &mut Frame, state: &RenderState, area: Rect) {
    let role_span = |role: UserRole| {
        let style = if state.role == role {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        Span::styled(format!(" {} ", role.label()), style)
    };

    let qcolor = quality_color(state.quality);
    let spans = vec![
        Span::styled("Role: ", Style::default().fg(Color::DarkGray)),
        role_span(UserRole::Teach),
        role_span(UserRole::Learn),
        Span::raw("  "),
        Span::styled(state.lang.label(), Style::default().fg(Color::Magenta)),
        Span::raw("  "),
        Span::styled("Mode: ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{} {}", mode_icon(state.mode), state.mode.as_str())),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", state.quality.as_str()),
            Style::default().fg(qcolor).add_modifier(Modifier::REVERSED),
        ),
        Span::raw(format!(" {}  {}", state.stats.downlink_label(), state.stats.rtt_label())),
        Span::raw("  "),
        Span::styled("Model: ", Style::default().fg(Color::DarkGray)),
        Span::styled(state.model.display_name(), Style::default().fg(Color::White).bold()),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(qcolor))
        .title(format!(" {} v{} ", APP_NAME, APP_VERSION))
        .title_style(Style::default().bold());

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_log_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(8)])
        .split(area);

    let filter = state
        .scope_filter
        .as_deref()
        .map(|s| format!(" [scope: {}]", s))
        .unwrap_or_default();
    let title = format!(
        " Event Log ({}/{}){} (x:export c:clear f:filter) ",
        state.events.len(),
        state.total_events,
        filter
    );

    if state.events.is_empty() {
        let empty = Paragraph::new("No events yet. Interact with the UI to see logs.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, chunks[0]);
    } else {
        let items: Vec<ListItem> = state.events.iter().map(event_item).collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(Color::DarkGray));

        let mut list_state = ListState::default();
        list_state.select(Some(state.log_scroll as usize));
        f.render_stateful_widget(list, chunks[0], &mut list_state);
    }

    // Payload of the selected event
    let selected = state.events.get(state.log_scroll as usize);
    let lines = match selected.and_then(|e| e.data.as_ref()) {
        Some(data) => highlight_json(&serde_json::to_string_pretty(data).unwrap_or_default()),
        None => vec![Line::from(Span::styled("(no data)", Style::default().fg(Color::DarkGray)))],
    };
    let details = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Data "))
        .wrap(Wrap { trim: false });
    f.render_widget(details, chunks[1]);
}

fn event_item(evt: &AppEvent) -> ListItem<'static> {
    let mut spans = vec![
        Span::styled(
            format!("{:<5}", evt.level.as_str()),
            Style::default().fg(level_color(evt.level)).bold(),
        ),
        Span::raw(" "),
        Span::styled(
            format_event_time(evt.timestamp),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
    ];
    if let Some(scope) = &evt.scope {
        spans.push(Span::styled(format!("[{}] ", scope), Style::default().fg(Color::Cyan)));
    }
    spans.push(Span::raw(evt.message.clone()));
    ListItem::new(Line::from(spans))
}

fn draw_quiz_builder(f: &mut Frame, state: &RenderState, area: Rect) {
    let teacher = state.role == UserRole::Teach;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if teacher { 3 } else { 0 }), // Teacher setup
            Constraint::Length(3),                           // Topic
            Constraint::Min(3),                              // Source text
            Constraint::Length(3),                           // Options
        ])
        .split(area);
    let setup = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[0]);

    let editing = state.input_mode == InputMode::Editing;
    let field_block = |field: BuilderField, title: String| {
        let style = if state.builder_field == field && editing {
            Style::default().fg(Color::Yellow)
        } else if state.builder_field == field {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default().borders(Borders::ALL).border_style(style).title(title)
    };

    if teacher {
        f.render_widget(
            Paragraph::new(state.builder.grade_level.as_str())
                .block(field_block(BuilderField::GradeLevel, " Grade level ".to_string())),
            setup[0],
        );
        let title = format!(
            " Objectives   Type: {} (y) ",
            state.builder.question_type.label()
        );
        f.render_widget(
            Paragraph::new(state.builder.objectives.as_str())
                .block(field_block(BuilderField::Objectives, title)),
            setup[1],
        );
    }

    f.render_widget(
        Paragraph::new(state.builder.topic.as_str()).block(field_block(
            BuilderField::Topic,
            " Topic (e:edit Tab:next field) ".to_string(),
        )),
        chunks[1],
    );

    f.render_widget(
        Paragraph::new(state.builder.source_text.as_str())
            .wrap(Wrap { trim: false })
            .block(field_block(BuilderField::SourceText, " Source text ".to_string())),
        chunks[2],
    );

    let options = format!(
        " Questions: {} (+/-)   Difficulty: {} (d)   Hints: {} (h)   s:start",
        state.builder.question_count(),
        state.builder.difficulty.as_str(),
        if state.builder.enable_hints { "on" } else { "off" },
    );
    f.render_widget(
        Paragraph::new(options).block(Block::default().borders(Borders::ALL).title(" Options ")),
        chunks[3],
    );

    if editing {
        let target = match state.builder_field {
            BuilderField::GradeLevel => setup[0],
            BuilderField::Objectives => setup[1],
            BuilderField::Topic => chunks[1],
            BuilderField::SourceText => chunks[2],
        };
        let max_x = target.x + target.width.saturating_sub(2);
        let cursor_x = (target.x + state.cursor_position as u16 + 1).min(max_x);
        f.set_cursor_position(Position::new(cursor_x, target.y + 1));
    }
}

fn draw_quiz_runner(f: &mut Frame, quiz: &QuizSession, area: Rect) {
    let title = format!(
        " {} [{}] ",
        if quiz.spec.topic.is_empty() { "Custom Quiz" } else { quiz.spec.topic.as_str() },
        quiz.spec.difficulty.as_str()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    if quiz.submitted {
        let verdict = if quiz.passed() {
            Span::styled("Passed", Style::default().fg(Color::Green).bold())
        } else {
            Span::styled("Not passed", Style::default().fg(Color::Red).bold())
        };
        let lines = vec![
            Line::from(""),
            Line::from("Quiz complete").centered(),
            Line::from(verdict).centered(),
            Line::from(format!("Score: {} / {}", quiz.score(), quiz.questions.len())).centered(),
            Line::from(""),
            Line::from(Span::styled("Esc to exit", Style::default().fg(Color::DarkGray))).centered(),
        ];
        f.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Clock + progress
            Constraint::Length(2), // Question
            Constraint::Min(4),    // Options
            Constraint::Length(1), // Hint
        ])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(quiz.progress().min(100))
        .label(format!(
            "{}  {}/{}",
            quiz.clock(),
            quiz.current + 1,
            quiz.questions.len()
        ));
    f.render_widget(gauge, chunks[0]);

    let question = quiz.current_question();
    f.render_widget(
        Paragraph::new(question.question.as_str())
            .style(Style::default().bold())
            .wrap(Wrap { trim: true }),
        chunks[1],
    );

    let chosen = quiz.answers[quiz.current];
    let items: Vec<ListItem> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let marker = if chosen == Some(i) { "(*)" } else { "( )" };
            ListItem::new(format!("{} {}", marker, opt))
        })
        .collect();
    let mut list_state = ListState::default();
    list_state.select(chosen);
    f.render_stateful_widget(
        List::new(items).highlight_style(Style::default().fg(Color::Yellow).bold()),
        chunks[2],
        &mut list_state,
    );

    let hint = match (&question.hint, quiz.show_hint) {
        (Some(hint), true) => Span::styled(hint.clone(), Style::default().fg(Color::Magenta)),
        (Some(_), false) => Span::styled("h: show hint", Style::default().fg(Color::DarkGray)),
        (None, _) => Span::raw(""),
    };
    f.render_widget(Paragraph::new(Line::from(hint)), chunks[3]);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = if let Some(msg) = &state.status_message {
        format!(" {} ", msg)
    } else if state.input_mode == InputMode::Editing {
        " ESC:stop editing | arrows:move | Tab:next field ".to_string()
    } else {
        " t/l:role | g:lang | m:mode | r:measure | 1/2:tab | ?:help | q:quit ".to_string()
    };

    let bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 EDUCHAT - Keyboard Shortcuts

 HEADER
   t / l              Teacher / Learner role
   g                  Toggle language (EN / Urdu)
   m                  Cycle mode (auto / online / offline)
   r                  Measure network now

 EVENT LOG (1)
   ↑ / ↓              Select event
   f                  Cycle scope filter
   x                  Export log as JSON
   c                  Clear log

 QUIZ (2)
   e / Tab            Edit topic / source text
                      (teachers: grade level, objectives)
   y                  Question type (teachers)
   + / -  d  h        Questions, difficulty, hints
   s                  Start quiz
   ↑ / ↓              Choose answer
   → / ←              Next / previous question
   h                  Show hint
   Esc                Leave quiz

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
