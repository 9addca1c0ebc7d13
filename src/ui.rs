use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::pane::PaneWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::theme::ThemeColors;

/// Render the application UI: parent, current and child columns over a
/// one-line status bar.
pub fn render(app: &App, theme: &ThemeColors, frame: &mut Frame) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Percentage(40),
            Constraint::Percentage(50),
        ])
        .split(rows[0]);

    let block = |focused: bool| {
        let color = if focused {
            theme.border_focused_fg
        } else {
            theme.border_fg
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
    };

    let nav = &app.nav;
    let selected_count = nav
        .child
        .listing
        .as_ref()
        .filter(|l| l.is_directory())
        .map(|l| l.size() as usize);

    frame.render_widget(
        PaneWidget::new(&nav.parent, theme).block(block(false)),
        columns[0],
    );
    frame.render_widget(
        PaneWidget::new(&nav.current, theme)
            .focused(true)
            .selected_count(selected_count)
            .block(block(true)),
        columns[1],
    );
    frame.render_widget(
        PaneWidget::new(&nav.child, theme).block(block(false)),
        columns[2],
    );

    let path_str = nav
        .current_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let len = nav.current_len();
    let position = if len == 0 {
        "0/0".to_string()
    } else {
        format!("{}/{}", nav.current_selected() + 1, len)
    };

    let mut status = StatusBarWidget::new(&path_str, &position, theme);
    if let Some((msg, _)) = &app.status_message {
        status = status.status_message(msg);
    }
    if let AppMode::Search { query } = &app.mode {
        status = status.search_query(query);
    }
    frame.render_widget(status, rows[1]);
}
