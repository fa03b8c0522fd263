//! Error types for the comparison pipeline.
//!
//! Every failure a backend can hit is a `StudioError`. The orchestrator
//! never propagates these to its caller: each one is rendered through
//! `Display` into the failing backend's panel.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Fallback message when a tool fails without printing anything.
pub const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Error, Debug)]
pub enum StudioError {
    /// Source text was empty or whitespace only.
    #[error("no code")]
    EmptySource,

    /// A front-end sent something that is not a request.
    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("unsupported optimization level '{0}' (expected -O0, -O1, -O2, -O3 or -Os)")]
    InvalidOptLevel(String),

    /// The toolchain binary could not be started at all.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' timed out after {limit:?}")]
    Timeout { program: String, limit: Duration },

    /// Non-zero exit. `diagnostics` is the tool's own output, verbatim.
    #[error("{diagnostics}")]
    Tool {
        program: String,
        code: Option<i32>,
        diagnostics: String,
    },

    #[error("binary missing: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("disassembly failed: {reason}")]
    Disassembly { reason: String },

    #[error("workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot load config '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl StudioError {
    /// Build a `Tool` error, picking stderr, then stdout, then a generic
    /// message. Blank streams are skipped but the chosen one is kept verbatim.
    pub fn tool(program: &str, code: Option<i32>, stdout: &str, stderr: &str) -> Self {
        let diagnostics = if !stderr.trim().is_empty() {
            stderr.to_string()
        } else if !stdout.trim().is_empty() {
            stdout.to_string()
        } else {
            UNKNOWN_ERROR.to_string()
        };
        StudioError::Tool {
            program: program.to_string(),
            code,
            diagnostics,
        }
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
