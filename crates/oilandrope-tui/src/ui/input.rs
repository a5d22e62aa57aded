//! Input line
//!
//! Displays the composer with its cursor.

use oilandrope_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

const PROMPT: &str = "> ";
const PROMPT_WIDTH: u16 = 3; // border + "> "
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the input line.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let composer = app.composer();
    let block = Block::default().borders(Borders::ALL).title(" Message ");

    let available_width = area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING);
    let cursor = cursor_column(composer.text(), composer.cursor());

    // Keep the cursor in view on long input
    let scroll = cursor.saturating_sub(available_width);

    let paragraph = Paragraph::new(format!("{PROMPT}{}", composer.text()))
        .style(Style::default().fg(Color::White))
        .scroll((0, scroll))
        .block(block);

    frame.render_widget(paragraph, area);

    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor - scroll);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);

    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}

/// Display column of the char index `cursor` in `text`.
fn cursor_column(text: &str, cursor: usize) -> u16 {
    let end = text.char_indices().nth(cursor).map_or(text.len(), |(i, _)| i);
    u16::try_from(text[..end].width()).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_column_counts_cells() {
        assert_eq!(cursor_column("hello", 3), 3);
        assert_eq!(cursor_column("日本語", 2), 4);
        assert_eq!(cursor_column("a日b", 3), 4);
    }

    #[test]
    fn cursor_at_end_covers_the_whole_text() {
        assert_eq!(cursor_column("日本", 2), 4);
        assert_eq!(cursor_column("", 0), 0);
    }
}
