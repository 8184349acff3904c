use ratatui::{prelude::*, widgets::*};

use crate::events::LogLevel;
use crate::models::ConnectionMode;
use crate::network::Quality;

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// JSON syntax highlighting for pretty-printed payloads, one `Line` per
/// input line
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    text.lines().map(highlight_json_line).collect()
}

fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut scalar = String::new();
    let mut chars = line.char_indices();

    while let Some((start, c)) = chars.next() {
        match c {
            '"' => {
                push_scalar(&mut spans, &mut scalar);
                let mut end = line.len();
                let mut escaped = false;
                for (i, ch) in chars.by_ref() {
                    match ch {
                        _ if escaped => escaped = false,
                        '\\' => escaped = true,
                        '"' => {
                            end = i + 1;
                            break;
                        }
                        _ => {}
                    }
                }
                // A string followed by ':' is an object key
                let is_key = line[end..].trim_start().starts_with(':');
                let color = if is_key { Color::Cyan } else { Color::Green };
                spans.push(Span::styled(
                    line[start..end].to_string(),
                    Style::default().fg(color),
                ));
            }
            '{' | '}' | '[' | ']' => {
                push_scalar(&mut spans, &mut scalar);
                spans.push(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
            }
            ':' => {
                push_scalar(&mut spans, &mut scalar);
                spans.push(Span::styled(":", Style::default().fg(Color::White)));
            }
            _ => scalar.push(c),
        }
    }
    push_scalar(&mut spans, &mut scalar);

    Line::from(spans)
}

/// Flush unquoted text, coloring numbers and literals
fn push_scalar(spans: &mut Vec<Span<'static>>, scalar: &mut String) {
    if scalar.is_empty() {
        return;
    }
    let text = std::mem::take(scalar);
    let token = text.trim().trim_end_matches(',').trim();
    let style = match token {
        "true" | "false" | "null" => Style::default().fg(Color::Magenta),
        t if !t.is_empty() && t.parse::<f64>().is_ok() => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    };
    spans.push(Span::styled(text, style));
}

/// Quality badge color
pub fn quality_color(quality: Quality) -> Color {
    match quality {
        Quality::Good => Color::Green,
        Quality::Ok => Color::Yellow,
        Quality::Poor => Color::Red,
        Quality::Unknown => Color::DarkGray,
    }
}

/// Event level badge color
pub fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => Color::Red,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Debug => Color::Blue,
        LogLevel::Info => Color::Green,
    }
}

/// Connection mode indicator
pub fn mode_icon(mode: ConnectionMode) -> &'static str {
    match mode {
        ConnectionMode::Online => "[on]",
        ConnectionMode::Offline => "[off]",
        ConnectionMode::Auto => "[~]",
    }
}

/// Local wall-clock time of an event
pub fn format_event_time(ts_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts_ms)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_json_lines() {
        let text = serde_json::to_string_pretty(&serde_json::json!({"rttMs": 42, "ok": true})).unwrap();
        let lines = highlight_json(&text);
        assert_eq!(lines.len(), text.lines().count());
    }

    fn color_of(line: &Line, content: &str) -> Option<Color> {
        line.spans
            .iter()
            .find(|s| s.content.trim().trim_end_matches(',') == content)
            .and_then(|s| s.style.fg)
    }

    #[test]
    fn test_highlight_json_keys_and_values() {
        let lines = highlight_json(r#"  "quality": "good","#);
        assert_eq!(color_of(&lines[0], r#""quality""#), Some(Color::Cyan));
        assert_eq!(color_of(&lines[0], r#""good""#), Some(Color::Green));

        let lines = highlight_json(r#"  "note": "a \"quoted\": word", "n": -1.5, "x": null"#);
        assert_eq!(color_of(&lines[0], r#""note""#), Some(Color::Cyan));
        assert_eq!(color_of(&lines[0], r#""a \"quoted\": word""#), Some(Color::Green));
        assert_eq!(color_of(&lines[0], "-1.5"), Some(Color::Yellow));
        assert_eq!(color_of(&lines[0], "null"), Some(Color::Magenta));
    }

    #[test]
    fn test_format_event_time_invalid() {
        assert_eq!(format_event_time(i64::MAX), "--:--:--");
        assert_eq!(format_event_time(0).len(), 8);
    }
}
