use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::state::TablePicker;

pub fn draw_picker(frame: &mut ratatui::Frame, picker: &TablePicker) {
    let area = frame.size();
    let title = Line::from(Span::styled(
        format!(
            "Tables to obfuscate ({}/{})",
            picker.selected_count(),
            picker.tables.len()
        ),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));

    let items: Vec<Line> = picker
        .tables
        .iter()
        .zip(&picker.selected)
        .enumerate()
        .map(|(i, (table, selected))| {
            let mark = if *selected { "[x] " } else { "[ ] " };
            if i == picker.cursor {
                Line::from(vec![
                    Span::styled(" ► ", Style::default().fg(Color::Green)),
                    Span::styled(
                        format!("{mark}{table}"),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Line::from(vec![
                    Span::raw("   "),
                    Span::styled(format!("{mark}{table}"), Style::default().fg(Color::Gray)),
                ])
            }
        })
        .collect();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(Color::Reset));
    let list = Paragraph::new(items)
        .block(block)
        .scroll((scroll_offset(picker.cursor, layout[0].height), 0));
    frame.render_widget(list, layout[0]);

    let footer = Paragraph::new(Line::from(Span::styled(
        "↑/↓ move  space toggle  a all/none  enter run  esc cancel",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, layout[1]);
}

/// Keep the cursor line visible inside a bordered area of `height` rows.
fn scroll_offset(cursor: usize, height: u16) -> u16 {
    let visible = usize::from(height.saturating_sub(2)).max(1);
    u16::try_from(cursor.saturating_sub(visible - 1)).unwrap_or(u16::MAX)
}
