//! Status bar
//!
//! Displays the connection state and the latest notification or error.

use oilandrope_app::{App, ConnectionState};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.connection_state();
    let state_style = match state {
        ConnectionState::Disconnected => Style::default().fg(Color::Red),
        ConnectionState::Connecting | ConnectionState::Reconnecting { .. } => {
            Style::default().fg(Color::Yellow)
        },
        ConnectionState::Open => Style::default().fg(Color::Cyan),
        ConnectionState::Joined { .. } => {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        },
    };

    let mut spans = vec![Span::raw(" "), Span::styled(state.label(), state_style)];

    if let Some(notification) = app.notification() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(notification.to_string(), Style::default().fg(Color::Yellow)));
    }

    if let Some(status) = app.status_message() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(status.to_string(), Style::default().fg(Color::LightRed)));
    }

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let paragraph = Paragraph::new(Line::from(spans)).style(style);

    frame.render_widget(paragraph, area);
}
