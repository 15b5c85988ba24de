use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use starter_support_core::{ChatRole, Mode};
use crate::app::{App, InputMode};

const PLACEHOLDER: &str = "Type your message...";

/// Turn `**bold**` runs into bold spans. An unmatched `**` is kept literally.
fn styled_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    // Odd part count means every opening marker has a closing one
    let balanced = parts.len() % 2 == 1;
    let last = parts.len() - 1;

    let mut spans = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let is_bold = i % 2 == 1 && (balanced || i != last);
        if is_bold {
            spans.push(Span::styled(part.to_string(), Style::default().add_modifier(Modifier::BOLD)));
        } else if i % 2 == 1 {
            spans.push(Span::raw(format!("**{}", part)));
        } else if !part.is_empty() {
            spans.push(Span::raw(part.to_string()));
        }
    }
    Line::from(spans)
}

/// Word-wrap `text` to `width` columns, hard-splitting words longer than a line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut rest = word;
        loop {
            let len = rest.chars().count();
            if current_len > 0 && current_len + 1 + len <= width {
                current.push(' ');
                current.push_str(rest);
                current_len += 1 + len;
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            if len <= width {
                current.push_str(rest);
                current_len = len;
                break;
            }
            let split = rest.char_indices().nth(width).map(|(i, _)| i).unwrap_or(rest.len());
            lines.push(rest[..split].to_string());
            rest = &rest[split..];
        }
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn role_style(role: ChatRole) -> Style {
    match role {
        ChatRole::Assistant => Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
        ChatRole::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    }
}

/// Every rendered line of the thread at the given width. Scroll math uses the same lines.
pub fn chat_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in app.session.messages() {
        lines.push(Line::from(Span::styled(msg.role.display_name(), role_style(msg.role))));

        let body_style = match msg.role {
            ChatRole::Assistant => Style::default().fg(Color::White),
            ChatRole::User => Style::default().fg(Color::Gray),
        };
        for line in msg.content.lines() {
            for wrapped in wrap_text(line, width) {
                lines.push(styled_line(&wrapped).patch_style(body_style));
            }
        }
        if msg.content.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::default());
    }

    if app.pending > 0 {
        lines.push(Line::from(Span::styled(
            ChatRole::Assistant.display_name(),
            role_style(ChatRole::Assistant),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("is typing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, chat_area, action_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_chat(app, frame, chat_area);
    render_quick_action(app, frame, action_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled(" ● ", Style::default().fg(Color::Green)),
            Span::styled("StarterSupport AI", Style::default().fg(Color::White).bold()),
            Span::raw(" "),
            Span::styled(
                format!("v{}", env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled("   Ready to help", Style::default().fg(Color::Gray))),
    ];

    let header = Paragraph::new(lines).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let lines = chat_lines(app, app.chat_width as usize);
    let max_scroll = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .saturating_sub(app.chat_height);
    app.chat_scroll = app.chat_scroll.min(max_scroll);

    let border_color = if app.input_mode == InputMode::Normal { Color::Magenta } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Conversation ");

    let chat = Paragraph::new(lines)
        .block(block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_quick_action(app: &App, frame: &mut Frame, area: Rect) {
    let style = if app.session.mode() == Mode::OrderLookup {
        Style::default().fg(Color::Black).bg(Color::LightMagenta)
    } else {
        Style::default().fg(Color::LightMagenta).bg(Color::Black)
    };

    let line = Line::from(vec![
        Span::styled(" → Retrieve order information ", style),
        Span::styled(" o / Ctrl-O ", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let title = match app.session.mode() {
        Mode::Faq => " Message ",
        Mode::OrderLookup => " Order number ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(title);

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    // Keep the cursor visible by scrolling the input horizontally
    let scroll_offset = if inner_width > 0 && cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if app.input.is_empty() {
        Paragraph::new(PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = app.input.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input.block(block), area);

    if editing {
        let cursor_x = u16::try_from(cursor_pos - scroll_offset).unwrap_or(0);
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };
    let conversation_style = Style::default().bg(Color::Magenta).fg(Color::White);

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Ctrl-O ", key_style),
            Span::styled(" order ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" o ", key_style),
            Span::styled(" order ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(format!(" {} ", app.session.mode().label()), conversation_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use starter_support_core::SupportClient;
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(SupportClient::new("http://127.0.0.1:9"), tx)
    }

    fn screen_text(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text("where is my order please", 10),
            vec!["where is", "my order", "please"]
        );
    }

    #[test]
    fn test_wrap_text_splits_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("id: ORD-000123", 6), vec!["id:", "ORD-00", "0123"]);
    }

    #[test]
    fn test_wrap_text_empty_line() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn test_styled_line_bold() {
        let line = styled_line("Your order **12345** shipped");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "12345");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_styled_line_unmatched_marker_is_literal() {
        let line = styled_line("price is **high");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "price is **high");
    }

    #[test]
    fn test_typing_indicator_only_while_pending() {
        let mut app = test_app();
        let idle = chat_lines(&app, 80).len();

        app.pending = 1;
        let lines = chat_lines(&app, 80);
        assert_eq!(lines.len(), idle + 2);
        assert_eq!(lines.last().unwrap().spans[0].content, "is typing.");
    }

    #[test]
    fn test_render_shows_header_greeting_and_placeholder() {
        let mut app = test_app();
        let text = screen_text(&mut app, 80, 24);

        assert!(text.contains("StarterSupport AI"));
        assert!(text.contains("Ready to help"));
        assert!(text.contains("Hello there!"));
        assert!(text.contains(PLACEHOLDER));
        assert!(text.contains("Retrieve order information"));
        assert!(text.contains(" FAQ "));
    }

    #[test]
    fn test_render_reflects_order_mode() {
        let mut app = test_app();
        app.session.retrieve_order();
        let text = screen_text(&mut app, 80, 24);

        assert!(text.contains("Order number"));
        assert!(text.contains(" ORDER "));
        assert!(text.contains("Could you provide my order information?"));
    }
}
