use ragchat_core::{DocumentKind, Message, Role, UploadPhase};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, FocusPane, InputMode};
use crate::input::TextInput;

const SIDEBAR_WIDTH: u16 = 34;

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping (doesn't break mid-word)
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }

        // Words longer than the pane still take extra rows
        if current_len > width {
            let extra = (current_len - 1) / width;
            lines.extend(std::iter::repeat(String::new()).take(extra));
            current_len = (current_len - 1) % width + 1;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Rows a transcript occupies once the paragraph wraps it
fn wrapped_height(lines: &[Line], width: usize) -> usize {
    lines
        .iter()
        .map(|line| {
            let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
            wrap_text_to_width(&text, width).len()
        })
        .sum()
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn speaker(role: Role) -> Span<'static> {
    let (label, color) = match role {
        Role::User => ("You:", Color::Cyan),
        Role::Assistant => ("AI:", Color::Yellow),
        Role::System => ("System:", Color::Magenta),
    };
    Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

/// Build the transcript as styled lines, in store order.
///
/// `pending` appends the animated placeholder for the answer in flight.
/// `frame` picks how many dots it shows.
pub fn transcript_lines(messages: &[Message], pending: bool, frame: u8) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in messages {
        lines.push(Line::from(speaker(msg.role())));
        match msg.role() {
            Role::User => lines.push(Line::from(msg.content().to_string())),
            Role::Assistant => {
                for line in msg.content().lines() {
                    lines.push(parse_markdown_line(line));
                }
                if !msg.sources().is_empty() {
                    lines.push(Line::from(Span::styled(
                        "Sources:",
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
                    )));
                    for source in msg.sources() {
                        lines.push(Line::from(Span::styled(
                            format!("  - {}", source.label()),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
            }
            Role::System => lines.push(Line::from(Span::styled(
                msg.content().to_string(),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC),
            ))),
        }
        lines.push(Line::default());
    }

    if pending {
        lines.push(Line::from(speaker(Role::Assistant)));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((frame as usize % 3) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, main_area] = Layout::horizontal([
        Constraint::Length(SIDEBAR_WIDTH),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_sidebar(app, frame, sidebar_area);
    render_chat(app, frame, main_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" RAG Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.api_url), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => {
            let action = match app.focus {
                FocusPane::Query => " send ",
                FocusPane::Upload => " upload ",
            };
            vec![
                Span::styled(" Enter ", key_style),
                Span::styled(action, label_style),
                Span::styled(" Tab ", key_style),
                Span::styled(" switch ", label_style),
                Span::styled(" PgUp/PgDn ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" stop typing ", label_style),
            ]
        }
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" u ", key_style),
            Span::styled(" upload ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" g/G ", key_style),
            Span::styled(" top/bottom ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_sidebar(app: &App, frame: &mut Frame, area: Rect) {
    let [input_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let focused = app.focus == FocusPane::Upload;
    let editing = focused && app.input_mode == InputMode::Editing;
    let busy = app.uploads.is_busy();
    let title = if busy { " Uploading... " } else { " Upload file " };
    render_text_input(frame, input_area, &app.upload_input, title, focused, editing, busy);

    let mut lines: Vec<Line> = Vec::new();

    let status = app.upload_status();
    let status_color = match status.phase {
        UploadPhase::Idle => None,
        UploadPhase::Uploading => Some(Color::Yellow),
        UploadPhase::Done => Some(Color::Green),
        UploadPhase::Error => Some(Color::Red),
    };
    if let Some(color) = status_color {
        lines.push(Line::from(Span::styled(status.label, Style::default().fg(color).bold())));
        lines.push(Line::default());
    }

    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Red))));
        lines.push(Line::default());
    }

    let kinds: Vec<&str> = DocumentKind::all().iter().map(|k| k.display_name()).collect();
    lines.push(Line::from(Span::styled(
        "Supported types:",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        kinds.join(", "),
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Documents ");

    let status_panel = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(status_panel, status_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let pending = app.query_pending();
    let messages = app.messages();

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Conversation ({}) ", messages.len()));

    let inner = chat_block.inner(chat_area);
    app.chat_height = inner.height;

    if messages.is_empty() && !pending {
        app.max_chat_scroll = 0;
        app.chat_scroll = 0;
        let placeholder = Paragraph::new(Text::from(Span::styled(
            "Start a conversation",
            Style::default().fg(Color::DarkGray),
        )))
        .block(chat_block);
        frame.render_widget(placeholder, chat_area);
    } else {
        let lines = transcript_lines(&messages, pending, app.animation_frame);
        let total = wrapped_height(&lines, inner.width as usize);
        app.max_chat_scroll =
            u16::try_from(total.saturating_sub(inner.height as usize)).unwrap_or(u16::MAX);
        if app.follow_tail || app.chat_scroll > app.max_chat_scroll {
            app.chat_scroll = app.max_chat_scroll;
        }

        let chat = Paragraph::new(Text::from(lines))
            .block(chat_block)
            .wrap(Wrap { trim: false })
            .scroll((app.chat_scroll, 0));
        frame.render_widget(chat, chat_area);
    }

    let focused = app.focus == FocusPane::Query;
    let editing = focused && app.input_mode == InputMode::Editing;
    let title = if pending { " Waiting for answer... " } else { " Ask a question " };
    render_text_input(frame, input_area, &app.query_input, title, focused, editing, pending);
}

/// Bordered single-line input with horizontal scrolling to keep the cursor in view
fn render_text_input(
    frame: &mut Frame,
    area: Rect,
    input: &TextInput,
    title: &str,
    focused: bool,
    editing: bool,
    disabled: bool,
) {
    let border_color = if disabled {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let text_style = if disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = input.cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .value()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    frame.render_widget(Paragraph::new(visible_text).style(text_style).block(block), area);

    if editing && !disabled {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
