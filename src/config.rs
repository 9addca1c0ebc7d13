//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--editor`, `--viewer`, `--log-level`, etc.)
//! 2. `--config <file>`
//! 3. `$MILL_CONFIG` environment variable (path to config file)
//! 4. Project-local `.mill.toml` in the current working directory
//! 5. Global `~/.config/mill/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use log::{warn, LevelFilter};
use serde::Deserialize;

use crate::fs::listing::{DEFAULT_MAX_PREVIEW_BYTES, DEFAULT_SNIFF_BYTES};
use crate::nav::history::DEFAULT_HISTORY_CAPACITY;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Starting directory (overridden by CLI positional arg).
    pub default_path: Option<String>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// File preview settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    /// Text previews are cut off after this many bytes.
    pub max_preview_bytes: Option<u64>,
    /// Leading bytes inspected when deciding text vs binary.
    pub sniff_bytes: Option<usize>,
}

/// Selection history settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of directories whose cursor position is remembered.
    pub capacity: Option<usize>,
}

/// External programs used to open files.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OpenerConfig {
    /// Command for text files, may include arguments (`"code -w"`).
    pub editor: Option<String>,
    /// Command for binary files.
    pub viewer: Option<String>,
}

/// Log file settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub directory_fg: Option<String>,
    pub file_fg: Option<String>,
    pub symlink_fg: Option<String>,
    pub selected_bg: Option<String>,
    pub selected_fg: Option<String>,
    pub border_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub preview: PreviewConfig,
    pub history: HistoryConfig,
    pub opener: OpenerConfig,
    pub log: LogConfig,
    pub theme: ThemeConfig,
}

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("MILL_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".mill.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mill").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (the parse error is logged).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!("failed to parse config file {}: {}", path.display(), e);
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: other
                    .general
                    .default_path
                    .clone()
                    .or(self.general.default_path),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            preview: PreviewConfig {
                max_preview_bytes: other
                    .preview
                    .max_preview_bytes
                    .or(self.preview.max_preview_bytes),
                sniff_bytes: other.preview.sniff_bytes.or(self.preview.sniff_bytes),
            },
            history: HistoryConfig {
                capacity: other.history.capacity.or(self.history.capacity),
            },
            opener: OpenerConfig {
                editor: other.opener.editor.clone().or(self.opener.editor),
                viewer: other.opener.viewer.clone().or(self.opener.viewer),
            },
            log: LogConfig {
                level: other.log.level.clone().or(self.log.level),
                file: other.log.file.clone().or(self.log.file),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: match (&self.theme.custom, &other.theme.custom) {
                    (_, Some(o)) => Some(o.clone()),
                    (Some(s), None) => Some(s.clone()),
                    (None, None) => None,
                },
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Whether mouse support is enabled.
    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    pub fn max_preview_bytes(&self) -> u64 {
        self.preview
            .max_preview_bytes
            .unwrap_or(DEFAULT_MAX_PREVIEW_BYTES)
    }

    pub fn sniff_bytes(&self) -> usize {
        self.preview.sniff_bytes.unwrap_or(DEFAULT_SNIFF_BYTES)
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity.unwrap_or(DEFAULT_HISTORY_CAPACITY)
    }

    /// Editor command: config, then `$VISUAL`, then `$EDITOR`, then `vi`.
    pub fn editor(&self) -> String {
        self.opener
            .editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Viewer command for binary files.
    pub fn viewer(&self) -> String {
        let fallback = if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        self.opener
            .viewer
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Log level; unknown names fall back to `info`.
    pub fn log_level(&self) -> LevelFilter {
        self.log
            .level
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LevelFilter::Info)
    }

    /// Log file path: config value, else `<cache dir>/mill/mill.log`.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log
            .file
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| dirs::cache_dir().map(|d| d.join("mill").join("mill.log")))
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert!(cfg.mouse_enabled());
        assert_eq!(cfg.max_preview_bytes(), 1_048_576);
        assert_eq!(cfg.sniff_bytes(), 8192);
        assert_eq!(cfg.history_capacity(), 1024);
        assert_eq!(cfg.log_level(), LevelFilter::Info);
        assert_eq!(cfg.theme_scheme(), "dark");
        assert!(!cfg.editor().is_empty());
        assert!(!cfg.viewer().is_empty());
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
default_path = "/srv"
mouse = false

[preview]
max_preview_bytes = 2_000_000
sniff_bytes = 512

[history]
capacity = 16

[opener]
editor = "nvim"
viewer = "feh"

[log]
level = "debug"
file = "/tmp/mill-test.log"

[theme]
scheme = "light"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.general.default_path.as_deref(), Some("/srv"));
        assert!(!cfg.mouse_enabled());
        assert_eq!(cfg.max_preview_bytes(), 2_000_000);
        assert_eq!(cfg.sniff_bytes(), 512);
        assert_eq!(cfg.history_capacity(), 16);
        assert_eq!(cfg.editor(), "nvim");
        assert_eq!(cfg.viewer(), "feh");
        assert_eq!(cfg.log_level(), LevelFilter::Debug);
        assert_eq!(cfg.log_file(), Some(PathBuf::from("/tmp/mill-test.log")));
        assert_eq!(cfg.theme_scheme(), "light");
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[history]
capacity = 3
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.history_capacity(), 3);
        // Everything else should be defaults
        assert_eq!(cfg.max_preview_bytes(), 1_048_576);
        assert!(cfg.mouse_enabled());
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert_eq!(cfg.history_capacity(), 1024);
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        let cfg: AppConfig = toml::from_str("[log]\nlevel = \"chatty\"").expect("parse failed");
        assert_eq!(cfg.log_level(), LevelFilter::Info);
    }

    #[test]
    fn test_blank_opener_uses_fallback() {
        let cfg: AppConfig = toml::from_str("[opener]\nviewer = \"  \"").expect("parse failed");
        assert!(!cfg.viewer().trim().is_empty());
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            opener: OpenerConfig {
                editor: Some("vim".into()),
                viewer: Some("feh".into()),
            },
            history: HistoryConfig { capacity: Some(10) },
            ..Default::default()
        };

        let over = AppConfig {
            opener: OpenerConfig {
                editor: Some("hx".into()),
                // viewer not set, should keep base
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert_eq!(merged.editor(), "hx"); // overridden
        assert_eq!(merged.viewer(), "feh"); // from base
        assert_eq!(merged.history_capacity(), 10); // from base
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            preview: PreviewConfig {
                max_preview_bytes: Some(10),
                sniff_bytes: Some(4),
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert_eq!(merged.max_preview_bytes(), 10);
        assert_eq!(merged.sniff_bytes(), 4);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[history]
capacity = 75

[opener]
editor = "nano"
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert_eq!(cfg.history_capacity(), 75);
        assert_eq!(cfg.editor(), "nano");
        // Unset fields fall through to defaults
        assert_eq!(cfg.sniff_bytes(), 8192);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[general]
mouse = false

[history]
capacity = 75
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            history: HistoryConfig {
                capacity: Some(200),
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        // CLI override wins
        assert_eq!(cfg.history_capacity(), 200);
        // File value preserved (not overridden by CLI)
        assert!(!cfg.mouse_enabled());
    }

    #[test]
    fn test_theme_custom_colors() {
        let toml = r##"
[theme]
scheme = "custom"

[theme.custom]
directory_fg = "#89b4fa"
selected_bg = "#45475a"
"##;
        let cfg: AppConfig = toml::from_str(toml).expect("parse");
        assert_eq!(cfg.theme_scheme(), "custom");
        let custom = cfg.theme.custom.as_ref().expect("custom present");
        assert_eq!(custom.directory_fg.as_deref(), Some("#89b4fa"));
        assert_eq!(custom.selected_bg.as_deref(), Some("#45475a"));
        assert!(custom.symlink_fg.is_none());
    }
}
