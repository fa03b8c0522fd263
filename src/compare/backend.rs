//! The two compiler backends being compared.

use std::path::PathBuf;

use super::request::CompilationRequest;
use crate::disasm;
use crate::error::Result;
use crate::invoke::{self, Limits};
use crate::workspace::Workspace;

/// Source and artifact names. The backends share a workspace, so each one
/// owns its own files.
pub const SOURCE_A: &str = "backend_a.c";
pub const SOURCE_B: &str = "backend_b.c";
pub const OBJECT_B: &str = "backend_b.o";

/// A toolchain that turns a request into a display-ready assembly listing.
pub trait Backend: Send + Sync {
    fn label(&self) -> &str;

    fn compile(&self, workspace: &Workspace, request: &CompilationRequest) -> Result<String>;
}

/// Backend A: a compiler that prints annotated assembly on stdout.
#[derive(Clone, Debug)]
pub struct AssemblyBackend {
    pub label: String,
    pub compiler: PathBuf,
    pub limits: Limits,
}

impl Backend for AssemblyBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn compile(&self, workspace: &Workspace, request: &CompilationRequest) -> Result<String> {
        let level = request.optimization_level();
        log::debug!("{}: compiling at {}", self.label, level);
        let args = [level.flag(), "-S", "-fverbose-asm", "-o", "-", SOURCE_A];
        invoke::invoke(
            workspace,
            &workspace.file(SOURCE_A),
            request.source_text(),
            &self.compiler,
            args,
            self.limits,
        )?
        .into_result(&self.label)
    }
}

/// Backend B: a compiler that only produces object code, read back
/// through a disassembler.
///
/// The optimization level is not forwarded; this compiler's handling of
/// `-O` flags is unknown and it may reject them outright.
#[derive(Clone, Debug)]
pub struct ObjectBackend {
    pub label: String,
    pub compiler: PathBuf,
    pub disassembler: PathBuf,
    pub limits: Limits,
}

impl Backend for ObjectBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn compile(&self, workspace: &Workspace, request: &CompilationRequest) -> Result<String> {
        log::debug!("{}: compiling with default options", self.label);
        let args = ["-c", SOURCE_B, "-o", OBJECT_B];
        invoke::invoke(
            workspace,
            &workspace.file(SOURCE_B),
            request.source_text(),
            &self.compiler,
            args,
            self.limits,
        )?
        .into_result(&self.label)?;

        disasm::disassemble(
            &self.disassembler,
            &workspace.file(OBJECT_B),
            workspace.path(),
            self.limits,
        )
    }
}
