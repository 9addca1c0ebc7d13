//! Hands the terminal to an external program for a selected file.

use std::io;
use std::path::PathBuf;

use log::{info, warn};
use tokio::process::Command;

use crate::config::AppConfig;
use crate::error::{AppError, Result};

/// Which program a file is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    /// Text files.
    Editor,
    /// Binary files.
    Viewer,
}

/// A file waiting to be opened once the terminal can be released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub path: PathBuf,
    pub target: OpenTarget,
}

/// Something that owns the terminal and can lend it out for a while.
pub trait TerminalHandoff {
    /// Stop capturing input and restore the normal screen.
    fn release(&mut self) -> Result<()>;
    /// Take the terminal back after the external program exits.
    fn reclaim(&mut self) -> Result<()>;
}

/// Spawns the configured editor or viewer attached to the terminal.
#[derive(Debug, Clone)]
pub struct Opener {
    editor: String,
    viewer: String,
}

impl Opener {
    pub fn new(editor: impl Into<String>, viewer: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
            viewer: viewer.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.editor(), config.viewer())
    }

    pub fn command_for(&self, target: OpenTarget) -> &str {
        match target {
            OpenTarget::Editor => &self.editor,
            OpenTarget::Viewer => &self.viewer,
        }
    }

    /// Run the program for `request` and wait for it to exit.
    ///
    /// Standard streams are inherited, so the caller must have released the
    /// terminal beforehand.
    pub async fn run(&self, request: &OpenRequest) -> Result<()> {
        let command_line = self.command_for(request.target);
        let (program, args) = split_command(command_line).ok_or_else(|| AppError::Spawn {
            command: command_line.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
        })?;
        info!(
            "opening {} with {}",
            request.path.display(),
            command_line
        );

        let status = Command::new(program)
            .args(args)
            .arg(&request.path)
            .status()
            .await
            .map_err(|source| AppError::Spawn {
                command: command_line.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(AppError::ExitStatus {
                command: command_line.to_string(),
                status,
            })
        }
    }

    /// Release the terminal, run the program, and reclaim the terminal
    /// whether or not the program could be started. A failed release is
    /// reclaimed too, and the program is not run.
    pub async fn open<H: TerminalHandoff>(
        &self,
        request: &OpenRequest,
        handoff: &mut H,
    ) -> Result<()> {
        if let Err(e) = handoff.release() {
            warn!("could not release terminal: {}", e);
            if let Err(reclaim_err) = handoff.reclaim() {
                warn!("could not reclaim terminal: {}", reclaim_err);
            }
            return Err(e);
        }
        let outcome = self.run(request).await;
        if let Err(e) = &outcome {
            warn!("{}", e);
        }
        handoff.reclaim()?;
        outcome
    }
}

/// Split `"code -w"` into the program and its leading arguments.
fn split_command(command_line: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}
