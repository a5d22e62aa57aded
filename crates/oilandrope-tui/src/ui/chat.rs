//! Chat area
//!
//! Displays the session's messages. The current user's messages are
//! right-aligned, everyone else's left-aligned.

use oilandrope_app::{App, Placement};
use oilandrope_proto::ChatMessage;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const BORDER_SIZE: u16 = 2;
const OWN_COLOR: Color = Color::Cyan;
const OTHER_COLOR: Color = Color::Green;

/// Render the chat area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let visible_height = usize::from(area.height.saturating_sub(BORDER_SIZE));
    let lines = chat_lines(app, visible_height);

    let block = Block::default().borders(Borders::ALL).title(title(app));
    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn title(app: &App) -> String {
    let name = app.session_name().unwrap_or("Loading chat");
    match app.messages().scroll_back() {
        0 => format!(" {name} "),
        newer => format!(" {name} [{newer} newer] "),
    }
}

/// The last `height` lines of the visible messages.
fn chat_lines(app: &App, height: usize) -> Vec<Line<'static>> {
    let list = app.messages();

    if list.is_empty() {
        let hint = if app.session_name().is_some() { "No messages yet" } else { "" };
        return vec![Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))];
    }

    // Each message takes at least one line, so `height` messages always fill the view
    let mut lines: Vec<Line<'static>> = list
        .visible(height)
        .iter()
        .flat_map(|message| message_lines(message, list.placement(message)))
        .collect();

    let skip = lines.len().saturating_sub(height);
    lines.drain(..skip);
    lines
}

/// Header (author and time) followed by the body lines.
fn message_lines(message: &ChatMessage, placement: Placement) -> Vec<Line<'static>> {
    let color = match placement {
        Placement::Own => OWN_COLOR,
        Placement::Other => OTHER_COLOR,
    };

    let header = Line::from(vec![
        Span::styled(
            message.author.username.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(message.display_timestamp(), Style::default().fg(Color::DarkGray)),
    ]);

    let style = Style::default().fg(color);
    let body = message.message.lines().map(move |text| Line::styled(text.to_string(), style));

    std::iter::once(header)
        .chain(body)
        .map(|line| match placement {
            Placement::Own => line.right_aligned(),
            Placement::Other => line.left_aligned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use oilandrope_proto::Author;
    use ratatui::layout::Alignment;

    use super::*;

    fn msg(body: &str) -> ChatMessage {
        ChatMessage::new(Author { id: 4, username: "dm".into() }, body, "not a date")
    }

    #[test]
    fn multiline_body_keeps_alignment() {
        let lines = message_lines(&msg("roll\ninitiative"), Placement::Own);

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.alignment == Some(Alignment::Right)));
        assert_eq!(lines[2].to_string(), "initiative");
    }

    #[test]
    fn unparsable_timestamp_is_shown_raw() {
        let lines = message_lines(&msg("hi"), Placement::Other);

        insta::assert_snapshot!(lines[0].to_string(), @"dm not a date");
        assert_eq!(lines[0].alignment, Some(Alignment::Left));
    }
}
