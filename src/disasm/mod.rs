//! Disassembly of backend object files into a comparable listing.

use std::ffi::OsStr;
use std::path::Path;

use crate::error::{Result, StudioError};
use crate::invoke::{self, Limits};


/// objdump prints this before each section's instructions.
pub const SECTION_MARKER: &str = "Disassembly of section";

/// Intel syntax, no raw opcode bytes.
pub const DISASSEMBLER_ARGS: [&str; 4] = ["-d", "-M", "intel", "--no-show-raw-insn"];

/// Disassemble `binary` with `tool` and normalize the listing.
///
/// A missing binary is reported as such before the tool is launched. Any
/// failure of the tool itself is wrapped as [`StudioError::Disassembly`].
pub fn disassemble(tool: &Path, binary: &Path, cwd: &Path, limits: Limits) -> Result<String> {
    if !binary.is_file() {
        return Err(StudioError::ArtifactMissing {
            path: binary.to_path_buf(),
        });
    }

    let args = DISASSEMBLER_ARGS
        .into_iter()
        .map(OsStr::new)
        .chain(std::iter::once(binary.as_os_str()));

    let raw = invoke::run(tool, args, cwd, limits).map_err(|e| StudioError::Disassembly {
        reason: e.to_string(),
    })?;
    let listing = raw
        .into_result(&tool.display().to_string())
        .map_err(|e| StudioError::Disassembly {
            reason: e.to_string(),
        })?;

    Ok(normalize(&listing))
}

/// Strip header noise and address columns from an objdump listing.
///
/// Everything up to the first section marker is dropped, marker lines are
/// never emitted, and blank lines go away. A line with a tab keeps only what
/// follows its first tab, behind a single tab; other lines (symbol labels,
/// unusual tool output) pass through untouched.
pub fn normalize(listing: &str) -> String {
    let mut kept = Vec::new();
    let mut in_body = false;

    for line in listing.lines() {
        if line.contains(SECTION_MARKER) {
            in_body = true;
            continue;
        }
        if !in_body || line.trim().is_empty() {
            continue;
        }
        match line.split_once('\t') {
            Some((_, insn)) => kept.push(format!("\t{}", insn)),
            None => kept.push(line.to_string()),
        }
    }

    kept.join("\n")
}
