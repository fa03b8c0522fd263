//! Studio configuration: toolchain paths, limits and workspace root.
//!
//! Everything has a built-in default matching the reference deployment
//! (gcc from the system, ccc from a sibling checkout, objdump, `/dev/shm`,
//! five seconds). An `asm-studio.json` file overrides any subset of keys,
//! and the CLI overrides the file.

pub mod toolchain;

pub use toolchain::Toolchain;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::invoke::Limits;


/// File name searched for by [`StudioConfig::find`].
pub const CONFIG_FILE: &str = "asm-studio.json";

/// One MiB per stream is far more than any snippet's listing.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1 << 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Compiler that emits assembly text directly (`-S`).
    pub backend_a_path: PathBuf,
    /// Compiler that only emits object code (`-c`).
    pub backend_b_path: PathBuf,
    /// Preferred disassembler, typically a cross-target objdump.
    pub disassembler_path: PathBuf,
    /// Used when the preferred disassembler does not answer `--version`.
    pub fallback_disassembler_path: PathBuf,
    /// Wall-clock limit for every child process, in milliseconds.
    pub time_limit_ms: u64,
    /// Bytes kept from each of a child's output streams.
    pub max_output_bytes: usize,
    /// Directory under which per-request workspaces are created.
    pub workspace_root: PathBuf,
    /// Run both backends at the same time instead of one after the other.
    pub concurrent: bool,
    /// Display names, used in CLI panel headers and log lines.
    pub backend_a_label: String,
    pub backend_b_label: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            backend_a_path: PathBuf::from("/usr/bin/gcc"),
            backend_b_path: PathBuf::from("claudes-c-compiler/target/release/ccc"),
            disassembler_path: PathBuf::from("x86_64-linux-gnu-objdump"),
            fallback_disassembler_path: PathBuf::from("objdump"),
            time_limit_ms: 5_000,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            workspace_root: default_workspace_root(),
            concurrent: true,
            backend_a_label: "gcc".to_string(),
            backend_b_label: "ccc".to_string(),
        }
    }
}

/// tmpfs when the host has one, otherwise the platform temp dir.
pub fn default_workspace_root() -> PathBuf {
    let shm = Path::new("/dev/shm");
    if shm.is_dir() {
        shm.to_path_buf()
    } else {
        std::env::temp_dir()
    }
}

impl StudioConfig {
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            time: self.time_limit(),
            output_bytes: self.max_output_bytes,
        }
    }

    /// Load a JSON config file. Keys left out keep their defaults; relative
    /// tool paths are taken relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StudioError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut config: StudioConfig =
            serde_json::from_str(&content).map_err(|e| StudioError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if config.time_limit_ms == 0 {
            return Err(StudioError::Config {
                path: path.to_path_buf(),
                reason: "time_limit_ms must be greater than zero".to_string(),
            });
        }
        if config.max_output_bytes == 0 {
            return Err(StudioError::Config {
                path: path.to_path_buf(),
                reason: "max_output_bytes must be greater than zero".to_string(),
            });
        }
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let base = std::fs::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
        config.anchor(&base);
        Ok(config)
    }

    /// Try to find an `asm-studio.json` in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Rebase relative paths onto `base`.
    ///
    /// Children run inside their workspace, so a relative program path like
    /// `build/ccc` would otherwise be looked up there. Bare names (`gcc`)
    /// are left alone for the `PATH` search.
    pub fn anchor(&mut self, base: &Path) {
        for path in [
            &mut self.backend_a_path,
            &mut self.backend_b_path,
            &mut self.disassembler_path,
            &mut self.fallback_disassembler_path,
        ] {
            if path.is_relative() && path.components().count() > 1 {
                *path = base.join(&*path);
            }
        }
        if self.workspace_root.is_relative() {
            self.workspace_root = base.join(&self.workspace_root);
        }
    }
}
