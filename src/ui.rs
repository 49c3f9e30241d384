use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use mathsolver::Sender;
use crate::app::{App, InputMode, NoticeKind};

/// Split display markup into styled lines: `<br>` breaks the line, `<b>` and
/// `<i>` toggle bold and italic. Unclosed tags run to the end of the entry.
fn parse_display_markup(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut style = Style::default();
    let mut rest = text;

    fn flush(current: &mut String, spans: &mut Vec<Span<'static>>, style: Style) {
        if !current.is_empty() {
            spans.push(Span::styled(std::mem::take(current), style));
        }
    }

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            let tag = rest.find('>').map(|end| &rest[..=end]);
            let handled = match tag.map(|t| t.to_ascii_lowercase()).as_deref() {
                Some("<br>") | Some("<br/>") | Some("<br />") => {
                    flush(&mut current, &mut spans, style);
                    lines.push(Line::from(std::mem::take(&mut spans)));
                    true
                }
                Some("<b>") => {
                    flush(&mut current, &mut spans, style);
                    style = style.add_modifier(Modifier::BOLD);
                    true
                }
                Some("</b>") => {
                    flush(&mut current, &mut spans, style);
                    style = style.remove_modifier(Modifier::BOLD);
                    true
                }
                Some("<i>") => {
                    flush(&mut current, &mut spans, style);
                    style = style.add_modifier(Modifier::ITALIC);
                    true
                }
                Some("</i>") => {
                    flush(&mut current, &mut spans, style);
                    style = style.remove_modifier(Modifier::ITALIC);
                    true
                }
                _ => false,
            };
            if let (true, Some(tag)) = (handled, tag) {
                rest = &rest[tag.len()..];
                continue;
            }
        }
        current.push(c);
        rest = &rest[c.len_utf8()..];
    }

    flush(&mut current, &mut spans, style);
    lines.push(Line::from(spans));
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.notice.is_some() {
        render_notice(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" MathSolver AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.model_name), Style::default().fg(Color::White)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    app.update_scroll();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Chat ");

    let mut lines: Vec<Line> = Vec::new();
    app.orchestrator.with_transcript(|transcript| {
        for entry in transcript.entries() {
            let label = match entry.sender {
                Sender::User => Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Sender::Ai => Span::styled(
                    "AI:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
            };
            lines.push(Line::from(label));
            match entry.sender {
                Sender::User => lines.extend(entry.text.lines().map(|l| Line::from(l.to_string()))),
                Sender::Ai => lines.extend(parse_display_markup(&entry.text)),
            }
            lines.push(Line::default());
        }
    });

    if app.is_thinking() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let text = if lines.is_empty() {
        Text::from(Span::styled(
            "Type a math problem below, or press Ctrl+O to attach an image...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(lines)
    };

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(chat, area);

    let total = app.total_chat_lines();
    if total > app.chat_height {
        let mut state = ScrollbarState::new(total as usize).position(app.scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let (title, border_color) = match app.input_mode {
        InputMode::Problem if app.input_enabled() => (" Problem (Enter to solve) ", Color::Green),
        InputMode::Problem => (" Solving... ", Color::DarkGray),
        InputMode::ImagePath => (" Image path (Enter to attach, Esc to cancel) ", Color::Magenta),
        InputMode::ExportPath => (" Export PDF to (Enter to save, Esc to cancel) ", Color::Blue),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let input_style = if app.input_mode == InputMode::Problem && !app.input_enabled() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    // Keep the cursor visible on long input by scrolling horizontally
    let inner_width = area.width.saturating_sub(2) as usize;
    let offset = app.cursor.saturating_sub(inner_width.saturating_sub(1));
    let visible: String = app.input.chars().skip(offset).collect();

    let input = Paragraph::new(visible).style(input_style).block(block);
    frame.render_widget(input, area);

    if app.notice.is_none() && (app.input_enabled() || app.input_mode != InputMode::Problem) {
        let cursor_x = (app.cursor - offset) as u16;
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.notice.is_some() {
        vec![
            Span::styled(" Esc/Enter ", key_style),
            Span::styled(" dismiss ", label_style),
        ]
    } else {
        match app.input_mode {
            InputMode::Problem => vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" solve ", label_style),
                Span::styled(" ^O ", key_style),
                Span::styled(" image ", label_style),
                Span::styled(" ^E ", key_style),
                Span::styled(" export ", label_style),
                Span::styled(" ^L ", key_style),
                Span::styled(" clear ", label_style),
                Span::styled(" ↑/↓ ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" ^C ", key_style),
                Span::styled(" quit ", label_style),
            ],
            InputMode::ImagePath | InputMode::ExportPath => vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" confirm ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" cancel ", label_style),
            ],
        }
    };

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notice) = app.notice.as_ref() else {
        return;
    };

    let (title, color) = match notice.kind {
        NoticeKind::Info => (" Success ", Color::Green),
        NoticeKind::Warning => (" Warning ", Color::Yellow),
        NoticeKind::Error => (" Error ", Color::Red),
    };

    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let text_width = popup_width.saturating_sub(2).max(1) as usize;
    let text_lines = (notice.message.chars().count() / text_width + 1) as u16;
    let popup_height = (text_lines + 4).min(area.height.saturating_sub(2));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);

    let body = Text::from(vec![
        Line::from(notice.message.as_str()),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let popup = Paragraph::new(body).block(block).wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}
