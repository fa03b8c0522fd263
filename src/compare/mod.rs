//! Side-by-side comparison of two compiler backends.
//!
//! A [`Comparator`] is built once from the configuration (probing the
//! disassembler on the way) and then answers any number of requests. Each
//! request gets a fresh workspace that both backends share and that is
//! removed once both have finished. Whatever happens inside one backend,
//! including a panic, only ever shows up in that backend's panel.

pub mod backend;
pub mod request;

pub use backend::{AssemblyBackend, Backend, ObjectBackend};
pub use request::{BackendResult, CompilationRequest, ComparisonResult, OptLevel, WireRequest};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use crate::config::{StudioConfig, Toolchain};
use crate::error::StudioError;
use crate::workspace::Workspace;

#[cfg(test)]
mod tests;

pub struct Comparator {
    backend_a: Box<dyn Backend>,
    backend_b: Box<dyn Backend>,
    workspace_root: PathBuf,
    concurrent: bool,
}

impl Comparator {
    /// Build from configuration, running capability detection once.
    pub fn new(config: &StudioConfig) -> Self {
        Self::from_toolchain(config, Toolchain::detect(config))
    }

    /// Build from an already resolved toolchain.
    pub fn from_toolchain(config: &StudioConfig, toolchain: Toolchain) -> Self {
        let backend_a = AssemblyBackend {
            label: config.backend_a_label.clone(),
            compiler: toolchain.backend_a,
            limits: toolchain.limits,
        };
        let backend_b = ObjectBackend {
            label: config.backend_b_label.clone(),
            compiler: toolchain.backend_b,
            disassembler: toolchain.disassembler,
            limits: toolchain.limits,
        };
        Self::with_backends(
            Box::new(backend_a),
            Box::new(backend_b),
            toolchain.workspace_root,
            config.concurrent,
        )
    }

    pub fn with_backends(
        backend_a: Box<dyn Backend>,
        backend_b: Box<dyn Backend>,
        workspace_root: PathBuf,
        concurrent: bool,
    ) -> Self {
        Self {
            backend_a,
            backend_b,
            workspace_root,
            concurrent,
        }
    }

    pub fn labels(&self) -> (&str, &str) {
        (self.backend_a.label(), self.backend_b.label())
    }

    /// Compare from the wire form: raw source plus an optional level string.
    pub fn compare_source(&self, source_text: &str, level: Option<&str>) -> ComparisonResult {
        match CompilationRequest::parse(source_text, level) {
            Ok(request) => self.compare(&request),
            Err(e) => ComparisonResult::rejected(&e),
        }
    }

    pub fn compare(&self, request: &CompilationRequest) -> ComparisonResult {
        if request.is_blank() {
            log::info!("rejecting blank source");
            return ComparisonResult::rejected(&StudioError::EmptySource);
        }

        let workspace = match Workspace::acquire(&self.workspace_root) {
            Ok(ws) => ws,
            Err(e) => {
                log::error!("{}", e);
                return ComparisonResult::rejected(&e);
            }
        };

        log::info!(
            "comparing {} ({}) against {} at {}",
            self.backend_a.label(),
            request.optimization_level(),
            self.backend_b.label(),
            workspace.path().display()
        );

        let run_a = || run_isolated(self.backend_a.as_ref(), &workspace, request);
        let run_b = || run_isolated(self.backend_b.as_ref(), &workspace, request);
        let (backend_a, backend_b) = if self.concurrent {
            rayon::join(run_a, run_b)
        } else {
            (run_a(), run_b())
        };

        if let Err(e) = workspace.release() {
            log::warn!("{}", e);
        }

        ComparisonResult {
            backend_a,
            backend_b,
        }
    }
}

/// Run one backend, turning errors and panics into a failed result.
fn run_isolated(
    backend: &dyn Backend,
    workspace: &Workspace,
    request: &CompilationRequest,
) -> BackendResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| backend.compile(workspace, request)));
    match outcome {
        Ok(Ok(asm)) => BackendResult::ok(asm),
        Ok(Err(e)) => {
            log::debug!("{} failed: {}", backend.label(), e);
            BackendResult::failed(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("{} panicked: {}", backend.label(), message);
            BackendResult::failed(format!("internal error: {}", message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "backend panicked".to_string()
    }
}
