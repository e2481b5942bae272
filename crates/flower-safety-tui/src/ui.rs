use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use flower_safety_core::Role;
use unicode_width::UnicodeWidthChar;
use crate::app::{App, InputMode};

const PLACEHOLDER: &str = "Ask about a flower (e.g., 'Are roses safe for cats?')";
const TRY_ASKING: &str = "Try asking: \"Are tulips safe for dogs?\" or \"Can cats be around lilies?\"";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, hint, footer
    let [header_area, chat_area, input_area, hint_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);

    let hint = Paragraph::new(Span::styled(TRY_ASKING, Style::default().fg(Color::DarkGray)))
        .centered();
    frame.render_widget(hint, hint_area);

    render_footer(app, frame, footer_area);

    if app.show_payload {
        render_payload(app, frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Flower Safety AI ", Style::default().fg(Color::Green).bold()),
        Span::styled(
            "Protecting your pets, one bloom at a time",
            Style::default().fg(Color::White),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and inner height for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(format!(" {} ", app.endpoint));

    let time_style = Style::default().fg(Color::DarkGray);
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.messages() {
        let mut role_line = match msg.role {
            Role::User => vec![Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )],
            Role::Bot => vec![Span::styled(
                "Bot:",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )],
        };
        if msg.is_error {
            role_line.push(Span::raw(" "));
            role_line.push(Span::styled(
                " Error ",
                Style::default().bg(Color::Red).fg(Color::White).add_modifier(Modifier::BOLD),
            ));
        }
        role_line.push(Span::styled(format!(" {}", msg.display_time()), time_style));
        lines.push(Line::from(role_line));

        let text_style = if msg.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        if msg.text.is_empty() {
            lines.push(Line::default());
        }
        for line in msg.text.lines() {
            lines.push(Line::from(Span::styled(line.to_string(), text_style)));
        }
        lines.push(Line::default());
    }

    if app.is_loading() {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Checking flower safety{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

    // Measure before attaching the block so borders are not counted
    let wrapped = u16::try_from(chat.line_count(inner_width)).unwrap_or(u16::MAX);
    app.set_chat_lines(wrapped);

    let chat = chat.block(chat_block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let title = if app.is_loading() { " Ask (waiting for reply) " } else { " Ask " };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box (inner width excludes borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let draft = app.session.draft();
    let (skip, caret) = input_viewport(draft, app.cursor, inner_width);

    let input = if draft.is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let mut used = 0;
        let visible_text: String = draft
            .chars()
            .skip(skip)
            .take_while(|c| {
                used += c.width().unwrap_or(0);
                used <= inner_width
            })
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), area);

    if editing {
        let cursor_x = u16::try_from(caret).unwrap_or(u16::MAX);
        frame.set_cursor_position((area.x.saturating_add(cursor_x).saturating_add(1), area.y + 1));
    }
}

/// Chars to skip and the caret's display column, so the caret at `cursor`
/// (a char index) stays inside `inner_width` terminal columns
fn input_viewport(draft: &str, cursor: usize, inner_width: usize) -> (usize, usize) {
    let widths: Vec<usize> = draft.chars().map(|c| c.width().unwrap_or(0)).collect();
    let cursor = cursor.min(widths.len());
    let mut caret: usize = widths[..cursor].iter().sum();
    let mut skip = 0;
    while inner_width > 0 && caret >= inner_width && skip < cursor {
        caret -= widths[skip];
        skip += 1;
    }
    (skip, caret)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let disabled_style = Style::default().bg(Color::Black).fg(Color::DarkGray);

    let hints = match app.input_mode {
        InputMode::Editing => {
            // Send is disabled for a blank draft or while a reply is pending
            let send_style = if app.session.can_submit() { label_style } else { disabled_style };
            vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" send ", send_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" stop typing ", label_style),
            ]
        }
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" G ", key_style),
            Span::styled(" latest ", label_style),
            Span::styled(" r ", key_style),
            Span::styled(if app.show_payload { " hide payload " } else { " payload " }, label_style),
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

fn render_payload(app: &App, frame: &mut Frame, area: Rect) {
    // Centered popup
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 16.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Response payload (r or Esc to close) ");

    let body = match app.latest_payload() {
        Some(payload) => Text::from(
            serde_json::to_string_pretty(payload)
                .unwrap_or_else(|_| payload.to_string()),
        ),
        None => Text::from(Span::styled(
            "No response payload yet.",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let popup = Paragraph::new(body).block(block).wrap(Wrap { trim: false });
    frame.render_widget(popup, popup_area);
}
