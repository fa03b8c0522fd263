//! Startup capability detection.
//!
//! The preferred disassembler is usually a cross-target objdump that only
//! exists on some hosts. It is probed once, when the toolchain is resolved,
//! and the answer is kept for the life of the process.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::StudioConfig;
use crate::invoke::{self, Limits};

/// Probes get a fixed, short budget independent of the compile limits.
const PROBE_LIMITS: Limits = Limits {
    time: Duration::from_secs(2),
    output_bytes: 64 * 1024,
};

/// Resolved tool paths, ready to hand to the backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
    pub backend_a: PathBuf,
    pub backend_b: PathBuf,
    pub disassembler: PathBuf,
    pub limits: Limits,
    pub workspace_root: PathBuf,
}

impl Toolchain {
    /// Resolve `config`, probing the preferred disassembler.
    pub fn detect(config: &StudioConfig) -> Self {
        let disassembler = if tool_available(&config.disassembler_path) {
            config.disassembler_path.clone()
        } else {
            log::info!(
                "'{}' unavailable, disassembling with '{}'",
                config.disassembler_path.display(),
                config.fallback_disassembler_path.display()
            );
            config.fallback_disassembler_path.clone()
        };
        Self::with_disassembler(config, disassembler)
    }

    /// Resolve `config` with a known disassembler, skipping the probe.
    pub fn with_disassembler(config: &StudioConfig, disassembler: PathBuf) -> Self {
        Self {
            backend_a: config.backend_a_path.clone(),
            backend_b: config.backend_b_path.clone(),
            disassembler,
            limits: config.limits(),
            workspace_root: config.workspace_root.clone(),
        }
    }
}

/// Check whether `program` runs and answers `--version` with exit 0.
pub fn tool_available(program: &Path) -> bool {
    invoke::run(program, ["--version"], &std::env::temp_dir(), PROBE_LIMITS)
        .is_ok_and(|raw| raw.success())
}
