use crate::core::connection::ConnectionState;
use crate::core::message::{Message, Role};
use crate::core::session::Session;
use crate::ui::input_line::InputLine;
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const PROMPT: &str = "> ";
const MATRIX_GREEN: Color = Color::Rgb(0x00, 0xff, 0x41);
const DIM_GREEN: Color = Color::Rgb(0x00, 0x8f, 0x11);

/// Per-frame presentation state that is not part of the session.
pub struct FrameState<'a> {
    pub input: &'a InputLine,
    /// Characters of the newest message to show while it is being typed out.
    pub reveal: Option<usize>,
    /// Animation step for the thinking indicator.
    pub tick: u64,
}

pub fn ui(f: &mut Frame, session: &Session, state: &FrameState<'_>) {
    let thinking_height = u16::from(session.is_thinking());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(thinking_height),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_transcript(f, session, state.reveal, chunks[0]);

    if session.is_thinking() {
        let dots = ".".repeat((state.tick % 4) as usize);
        let thinking = Paragraph::new(Line::from(Span::styled(
            format!("AI is thinking{dots}"),
            Style::default()
                .fg(DIM_GREEN)
                .add_modifier(Modifier::ITALIC),
        )));
        f.render_widget(thinking, chunks[1]);
    }

    render_input(f, state.input, chunks[2]);
}

fn render_transcript(f: &mut Frame, session: &Session, reveal: Option<usize>, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            format!(
                " MATRIX TERMINAL v{} • {} • ",
                env!("CARGO_PKG_VERSION"),
                session.environment().label()
            ),
            Style::default().fg(MATRIX_GREEN),
        ),
        Span::styled(
            session.connection().label(),
            connection_style(session.connection()),
        ),
        Span::raw(" "),
    ]);

    let count = session.transcript().len();
    let lines: Vec<Line<'_>> = session
        .transcript()
        .iter()
        .enumerate()
        .flat_map(|(index, message)| {
            let limit = reveal.filter(|_| index + 1 == count);
            message_lines(message, limit)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM_GREEN))
        .title(title);
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let total = wrapped_height(&lines, inner_width);
    let scroll = total.saturating_sub(inner_height);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

fn render_input(f: &mut Frame, input: &InputLine, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM_GREEN))
        .title(" Enter a message or /help (Esc to quit) ");
    let inner_width = area.width.saturating_sub(2);

    // Keep the cursor inside the box by scrolling long input horizontally.
    let cursor_col = (PROMPT.width() + input.before_cursor().width()) as u16;
    let offset = cursor_col.saturating_sub(inner_width.saturating_sub(1));

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(MATRIX_GREEN)),
        Span::styled(input.text(), Style::default().fg(Color::White)),
    ]))
    .block(block)
    .scroll((0, offset));
    f.render_widget(paragraph, area);

    f.set_cursor_position(Position::new(
        area.x + 1 + cursor_col - offset,
        area.y + 1,
    ));
}

fn connection_style(state: ConnectionState) -> Style {
    let color = match state {
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Online => MATRIX_GREEN,
        ConnectionState::Offline => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Cyan),
        Role::Bot => Style::default().fg(MATRIX_GREEN),
        Role::System => Style::default().fg(Color::Yellow),
    }
}

/// Render one message, truncated to `limit` characters when given.
pub fn message_lines(message: &Message, limit: Option<usize>) -> Vec<Line<'static>> {
    let text: String = match limit {
        Some(limit) => message.text().chars().take(limit).collect(),
        None => message.text().to_string(),
    };
    let prefix = match message.role() {
        Role::User => "> ",
        Role::Bot | Role::System => "",
    };
    let style = role_style(message.role());

    let mut lines: Vec<Line<'static>> = text
        .split('\n')
        .enumerate()
        .map(|(index, body)| {
            let lead = if index == 0 {
                Span::styled(
                    format!("{} ", message.clock_label()),
                    Style::default().fg(DIM_GREEN),
                )
            } else {
                Span::raw(" ".repeat(message.clock_label().width() + 1))
            };
            Line::from(vec![
                lead,
                Span::styled(format!("{prefix}{body}"), style),
            ])
        })
        .collect();
    lines.push(Line::default());
    lines
}

/// Rows `lines` occupy when wrapped at `width` columns.
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}
