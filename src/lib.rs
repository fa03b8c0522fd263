//! Side-by-side assembly comparison of two C compiler backends.
//!
//! Backend A emits assembly text directly; backend B only emits object
//! code, which is disassembled and normalized. Both run against the same
//! per-request scratch directory under a hard time limit, and a failure in
//! one never affects the other.
//!
//! ```no_run
//! use asm_studio::{Comparator, CompilationRequest, OptLevel, StudioConfig};
//!
//! let comparator = Comparator::new(&StudioConfig::default());
//! let request = CompilationRequest::new("int square(int n) { return n * n; }", OptLevel::O2);
//! let result = comparator.compare(&request);
//! println!("{}", result.to_json());
//! ```

pub mod compare;
pub mod config;
pub mod disasm;
pub mod error;
pub mod invoke;
pub mod workspace;

pub use compare::{
    BackendResult, Comparator, CompilationRequest, ComparisonResult, OptLevel, WireRequest,
};
pub use config::{StudioConfig, Toolchain};
pub use error::{Result, StudioError};
pub use workspace::Workspace;
