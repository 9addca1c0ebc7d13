use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::entry::{Entry, EntryType};
use crate::fs::listing::{Listing, Preview};
use crate::nav::state::Pane;
use crate::theme::ThemeColors;

/// Renders one browser column: a directory listing, a file preview, or a
/// placeholder.
pub struct PaneWidget<'a> {
    pane: &'a Pane,
    theme: &'a ThemeColors,
    focused: bool,
    selected_count: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> PaneWidget<'a> {
    pub fn new(pane: &'a Pane, theme: &'a ThemeColors) -> Self {
        Self {
            pane,
            theme,
            focused: false,
            selected_count: None,
            block: None,
        }
    }

    /// Show entry sizes, as in the column the cursor lives in.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Number of entries inside the selected directory, once known.
    pub fn selected_count(mut self, count: Option<usize>) -> Self {
        self.selected_count = count;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    fn entry_style(&self, entry: &Entry, is_selected: bool) -> Style {
        if is_selected {
            return Style::default()
                .bg(self.theme.selected_bg)
                .fg(self.theme.selected_fg)
                .add_modifier(Modifier::BOLD);
        }
        match entry.entry_type {
            EntryType::Directory => Style::default()
                .fg(self.theme.directory_fg)
                .add_modifier(Modifier::BOLD),
            EntryType::Symlink => Style::default().fg(self.theme.symlink_fg),
            EntryType::File => Style::default().fg(self.theme.file_fg),
        }
    }

    /// Size column for `entry`; empty for directories whose count is unknown.
    fn size_label(&self, entry: &Entry, is_selected: bool) -> String {
        match entry.entry_type {
            EntryType::Directory if is_selected => self
                .selected_count
                .map(|n| n.to_string())
                .unwrap_or_default(),
            EntryType::Directory => String::new(),
            EntryType::Symlink => format!("~> {}", format_size(entry.size.unwrap_or(0))),
            EntryType::File => format_size(entry.size.unwrap_or(0)),
        }
    }

    fn render_entries(&self, entries: &[Entry], area: Rect, buf: &mut Buffer) {
        let height = area.height as usize;
        let width = area.width as usize;
        let selected = self.pane.selected;
        let scroll = scroll_offset(selected.unwrap_or(0), height);

        for (row, (idx, entry)) in entries.iter().enumerate().skip(scroll).take(height).enumerate() {
            let is_selected = selected == Some(idx);
            let size = if self.focused {
                self.size_label(entry, is_selected)
            } else {
                String::new()
            };
            let label = pad_label(&entry.name, &size, width);
            let line = Line::from(Span::styled(label, self.entry_style(entry, is_selected)));
            buf.set_line(area.x, area.y + row as u16, &line, area.width);
        }
    }

    fn render_text(&self, text: &str, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(self.theme.preview_fg);
        for (row, raw) in text.lines().take(area.height as usize).enumerate() {
            let line = Line::from(Span::styled(raw.replace('\t', "    "), style));
            buf.set_line(area.x, area.y + row as u16, &line, area.width);
        }
    }

    fn render_dim(&self, msg: &str, area: Rect, buf: &mut Buffer) {
        let line = Line::from(Span::styled(
            format!(" {}", msg),
            Style::default().fg(self.theme.dim_fg),
        ));
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

impl<'a> Widget for PaneWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let Some(listing) = &self.pane.listing else {
            if self.pane.is_loading() {
                self.render_dim("Loading…", inner, buf);
            }
            return;
        };

        if let Some(placeholder) = listing.placeholder() {
            self.render_dim(placeholder, inner, buf);
            return;
        }

        match listing {
            Listing::Directory(_) => self.render_entries(listing.entries(), inner, buf),
            Listing::File {
                preview: Preview::Text(text),
                ..
            } => self.render_text(text, inner, buf),
            Listing::File { .. } => {}
        }
    }
}

/// First visible row so that `selected` stays on screen.
fn scroll_offset(selected: usize, height: usize) -> usize {
    if height == 0 {
        0
    } else {
        (selected + 1).saturating_sub(height)
    }
}

/// ` name<spaces>size ` fitted to `width` columns; the name is cut when
/// there is no room.
fn pad_label(name: &str, size: &str, width: usize) -> String {
    let size_len = size.chars().count();
    let extra = if size_len > 0 { size_len + 3 } else { 2 };
    let room = width.saturating_sub(extra);
    let name: String = name.chars().take(room).collect();
    let gap = room.saturating_sub(name.chars().count());
    if size_len > 0 {
        format!(" {}{} {} ", name, " ".repeat(gap), size)
    } else {
        format!(" {}{} ", name, " ".repeat(gap))
    }
}

/// Human-readable byte count with one decimal, `.0` dropped: `0`, `512 B`,
/// `1.5 K`, `2 M`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];

    if bytes == 0 {
        return "0".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.1}", value);
    let trimmed = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{} {}", trimmed, UNITS[unit])
}
