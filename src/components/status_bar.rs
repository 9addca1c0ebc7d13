use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

/// Bottom line: current path and position, the search prompt, or the
/// latest diagnostic.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    position: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    search_query: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, position: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            position,
            theme,
            status_message: None,
            search_query: None,
        }
    }

    pub fn status_message(mut self, msg: &'a str) -> Self {
        self.status_message = Some(msg);
        self
    }

    /// Show the search prompt instead of the path.
    pub fn search_query(mut self, query: &'a str) -> Self {
        self.search_query = Some(query);
        self
    }
}

/// Keep the last `width` characters of `s`, marking the cut with `...`.
fn truncate_left(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len <= width {
        return s.to_string();
    }
    if width <= 3 {
        return s.chars().skip(len - width).collect();
    }
    let tail: String = s.chars().skip(len - (width - 3)).collect();
    format!("...{}", tail)
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;
        let base = Style::default()
            .bg(self.theme.status_bg)
            .fg(self.theme.status_fg);

        if let Some(query) = self.search_query {
            let prompt = format!("/{}", query);
            let display = format!("{:<width$}", truncate_left(&prompt, width), width = width);
            let line = Line::from(Span::styled(display, base.add_modifier(Modifier::BOLD)));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        if let Some(msg) = self.status_message {
            let style = base.fg(self.theme.error_fg);
            let display: String = msg.chars().take(width).collect();
            let display = format!("{:<width$}", display, width = width);
            let line = Line::from(Span::styled(display, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        // Normal bar: [path] ... [position]
        let position_len = self.position.chars().count();
        let path_budget = width.saturating_sub(position_len + 1);
        let path_display = truncate_left(self.path_str, path_budget);
        let gap = width
            .saturating_sub(path_display.chars().count())
            .saturating_sub(position_len);

        let line = Line::from(vec![
            Span::styled(path_display, base),
            Span::styled(" ".repeat(gap), base),
            Span::styled(self.position.to_string(), base.fg(self.theme.dim_fg)),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
