//! Theme data model: built-in palettes and resolution from config.
//!
//! Two built-in palettes (dark and light) plus custom color overrides from
//! the config file.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};

// ── Runtime theme colors ─────────────────────────────────────────────────────

/// All runtime colors used in the UI.
///
/// Constructed from a config-level `ThemeConfig` via `resolve_theme()`.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Pane entries
    pub directory_fg: Color,
    pub file_fg: Color,
    pub symlink_fg: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,

    // File previews and placeholders
    pub preview_fg: Color,
    pub dim_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,
    pub error_fg: Color,

    // Borders
    pub border_fg: Color,
    pub border_focused_fg: Color,
}

impl Default for ThemeColors {
    fn default() -> Self {
        dark_theme()
    }
}

// ── Built-in palettes ────────────────────────────────────────────────────────

/// Dark theme using Catppuccin Mocha palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        directory_fg: Color::Rgb(137, 180, 250),     // #89b4fa (blue)
        file_fg: Color::Rgb(205, 214, 244),          // #cdd6f4 (text)
        symlink_fg: Color::Rgb(148, 226, 213),       // #94e2d5 (teal)
        selected_bg: Color::Rgb(69, 71, 90),         // #45475a (surface1)
        selected_fg: Color::Rgb(205, 214, 244),      // #cdd6f4

        preview_fg: Color::Rgb(205, 214, 244),
        dim_fg: Color::Rgb(108, 112, 134), // #6c7086 (overlay0)

        status_bg: Color::Rgb(30, 30, 46), // #1e1e2e (base)
        status_fg: Color::Rgb(205, 214, 244),
        error_fg: Color::Rgb(243, 139, 168), // #f38ba8 (red)

        border_fg: Color::Rgb(88, 91, 112),           // #585b70 (surface2)
        border_focused_fg: Color::Rgb(137, 180, 250), // #89b4fa (blue)
    }
}

/// Light theme using Catppuccin Latte palette.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        directory_fg: Color::Rgb(30, 102, 245),  // #1e66f5 (blue)
        file_fg: Color::Rgb(76, 79, 105),        // #4c4f69 (text)
        symlink_fg: Color::Rgb(23, 146, 153),    // #179299 (teal)
        selected_bg: Color::Rgb(204, 208, 218),  // #ccd0da (surface1)
        selected_fg: Color::Rgb(76, 79, 105),

        preview_fg: Color::Rgb(76, 79, 105),
        dim_fg: Color::Rgb(156, 160, 176), // #9ca0b0 (overlay0)

        status_bg: Color::Rgb(239, 241, 245), // #eff1f5 (base)
        status_fg: Color::Rgb(76, 79, 105),
        error_fg: Color::Rgb(210, 15, 57), // #d20f39 (red)

        border_fg: Color::Rgb(172, 176, 190), // #acb0be (surface2)
        border_focused_fg: Color::Rgb(30, 102, 245),
    }
}

// ── Color parsing ────────────────────────────────────────────────────────────

/// Parse a hex color string like `"#aabbcc"` into a `ratatui::style::Color`.
/// Returns `None` for malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Overwrite `slot` when `hex` is present and parses.
fn apply(slot: &mut Color, hex: Option<&str>) {
    if let Some(color) = hex.and_then(parse_hex_color) {
        *slot = color;
    }
}

// ── Theme resolution ─────────────────────────────────────────────────────────

/// Resolve the final `ThemeColors` from config.
///
/// - `"dark"` (default): dark Catppuccin palette
/// - `"light"`: light Catppuccin palette
/// - `"custom"`: start from dark palette, then override with custom hex values
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    let scheme = config.scheme.as_deref().unwrap_or("dark");
    match scheme {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(), // "dark" or any unrecognized value
    }
}

/// Apply custom hex color overrides on top of an existing theme.
fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    apply(&mut theme.directory_fg, custom.directory_fg.as_deref());
    apply(&mut theme.file_fg, custom.file_fg.as_deref());
    apply(&mut theme.symlink_fg, custom.symlink_fg.as_deref());
    apply(&mut theme.selected_bg, custom.selected_bg.as_deref());
    apply(&mut theme.selected_fg, custom.selected_fg.as_deref());
    apply(&mut theme.border_fg, custom.border_fg.as_deref());
    apply(&mut theme.status_bg, custom.status_bg.as_deref());
    apply(&mut theme.status_fg, custom.status_fg.as_deref());
}

// ── Tests ────────────────────────────────────────────────────────────────────
