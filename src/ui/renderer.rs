use crate::core::app::App;
use crate::core::editing::EditingSession;
use crate::core::message::ClientMessageKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Tallest the input box grows before it scrolls.
const MAX_INPUT_LINES: usize = 8;
const SEPARATOR: &str = " • ";

/// What the input box shows for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputView {
    /// The editor lines, with the cursor at `(column, row)` in cells.
    Editable {
        lines: Vec<String>,
        cursor: (u16, u16),
    },
    /// Content too tall for single-line mode; only a summary is drawn.
    Collapsed(String),
}

pub fn input_view(session: &EditingSession) -> InputView {
    let editor = session.editor();
    if !session.editing_permitted() {
        return InputView::Collapsed(format!(
            "[{} lines; Backspace to clear, Meta+E to edit]",
            editor.line_count()
        ));
    }
    let cursor = editor.cursor();
    let first = cursor.line.saturating_sub(MAX_INPUT_LINES - 1);
    let lines = editor
        .lines()
        .iter()
        .skip(first)
        .take(MAX_INPUT_LINES)
        .cloned()
        .collect();
    let column = display_width_to(editor.current_line(), cursor.column);
    InputView::Editable {
        lines,
        cursor: (
            u16::try_from(column).unwrap_or(u16::MAX),
            u16::try_from(cursor.line - first).unwrap_or(u16::MAX),
        ),
    }
}

/// Terminal cells taken by the first `column` characters of `line`.
pub fn display_width_to(line: &str, column: usize) -> usize {
    line.chars()
        .take(column)
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
        .sum()
}

pub fn status_text(app: &App) -> String {
    let channel = app
        .current_channel
        .as_ref()
        .map(|channel| format!("#{channel}"))
        .unwrap_or_else(|| "(no channel)".to_string());
    let mut parts = vec![
        format!("parley v{}", env!("CARGO_PKG_VERSION")),
        channel,
    ];
    if app.session.is_multiline() {
        parts.push("multiline (Meta+Enter to send)".to_string());
    }
    if let Some(completion) = app.session.completion() {
        parts.push(format!(
            "{} of {} matches",
            completion
                .alternatives()
                .iter()
                .position(|alt| alt == completion.selected())
                .map_or(0, |idx| idx + 1),
            completion.alternatives().len()
        ));
    }
    parts.join(SEPARATOR)
}

fn history_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for post in app.recent_posts() {
        let author = app
            .users
            .get(&post.user_id)
            .map(|user| format!("@{}", user.username))
            .unwrap_or_else(|| post.user_id.to_string());
        let mut body = post.message.lines();
        let first = body.next().unwrap_or_default().to_string();
        lines.push(Line::from(vec![
            Span::styled(
                format!("{author}: "),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(first),
        ]));
        let indent = " ".repeat(UnicodeWidthStr::width(author.as_str()) + 2);
        for rest in body {
            lines.push(Line::from(format!("{indent}{rest}")));
        }
    }
    for message in app.client_messages().iter() {
        let style = match message.kind {
            ClientMessageKind::Info => Style::default().fg(Color::DarkGray),
            ClientMessageKind::Error => Style::default().fg(Color::Red),
        };
        let stamp = message.timestamp.format("%H:%M");
        for text in message.text.lines() {
            lines.push(Line::from(Span::styled(
                format!("[{stamp}] {} {text}", message.kind.as_str()),
                style,
            )));
        }
    }
    lines
}

fn input_height(view: &InputView) -> u16 {
    let rows = match view {
        InputView::Editable { lines, .. } => lines.len().max(1),
        InputView::Collapsed(_) => 1,
    };
    rows as u16 + 2
}

pub fn ui(f: &mut Frame, app: &App) {
    let view = input_view(&app.session);
    let preview_height = if app.session.show_preview() {
        (app.session.editor().line_count().min(MAX_INPUT_LINES) as u16) + 2
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(preview_height),
            Constraint::Length(input_height(&view)),
            Constraint::Length(1),
        ])
        .split(f.area());

    let history = history_lines(app);
    let visible = chunks[0].height as usize;
    let skip = history.len().saturating_sub(visible);
    f.render_widget(
        Paragraph::new(history.into_iter().skip(skip).collect::<Vec<_>>()),
        chunks[0],
    );

    if preview_height > 0 {
        let preview = Paragraph::new(app.session.editor().text())
            .block(Block::default().borders(Borders::ALL).title("Preview"))
            .wrap(Wrap { trim: false });
        f.render_widget(preview, chunks[1]);
    }

    render_input(f, chunks[2], &view);

    f.render_widget(
        Paragraph::new(status_text(app)).style(Style::default().add_modifier(Modifier::REVERSED)),
        chunks[3],
    );
}

fn render_input(f: &mut Frame, area: Rect, view: &InputView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Message (/help for commands, Ctrl+C to quit)");
    match view {
        InputView::Editable { lines, cursor } => {
            let text: Vec<Line> = lines.iter().map(|line| Line::from(line.as_str())).collect();
            f.render_widget(Paragraph::new(text).block(block), area);
            let max_x = area.x + area.width.saturating_sub(2);
            let max_y = area.y + area.height.saturating_sub(2);
            f.set_cursor_position((
                (area.x + 1).saturating_add(cursor.0).min(max_x),
                (area.y + 1).saturating_add(cursor.1).min(max_y),
            ));
        }
        InputView::Collapsed(summary) => {
            f.render_widget(
                Paragraph::new(summary.as_str())
                    .style(Style::default().fg(Color::Yellow))
                    .block(block),
                area,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{create_test_app, FakeChatClient};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    #[test]
    fn wide_characters_count_two_cells() {
        assert_eq!(display_width_to("日本語", 2), 4);
        assert_eq!(display_width_to("abc", 10), 3);
    }

    #[test]
    fn collapsed_view_when_editing_not_permitted() {
        let mut session = EditingSession::default();
        session.handle_paste(b"one\ntwo\nthree");
        session.toggle_multiline();
        assert_eq!(
            input_view(&session),
            InputView::Collapsed("[3 lines; Backspace to clear, Meta+E to edit]".to_string())
        );
    }

    #[test]
    fn editable_view_tracks_cursor() {
        let mut session = EditingSession::default();
        session.handle_paste("héllo\nwörld".as_bytes());
        match input_view(&session) {
            InputView::Editable { lines, cursor } => {
                assert_eq!(lines, vec!["héllo", "wörld"]);
                assert_eq!(cursor, (5, 1));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[tokio::test]
    async fn frame_renders_status_and_input() {
        let (mut app, _runner) = create_test_app(Arc::new(FakeChatClient::default()));
        app.handle_paste(b"draft");
        app.post_info("welcome");

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).expect("terminal");
        terminal.draw(|f| ui(f, &app)).expect("draw");

        let buffer = terminal.backend().buffer().clone();
        let rendered: String = buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("draft"));
        assert!(rendered.contains("welcome"));
        assert!(rendered.contains("#town-square"));
    }
}
