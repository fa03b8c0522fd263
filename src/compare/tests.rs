use super::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Scripted backend that records what it saw.
struct FakeBackend {
    label: &'static str,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
    seen_workspace: Arc<Mutex<Option<PathBuf>>>,
}

enum Behavior {
    Succeed(&'static str),
    Fail(fn() -> StudioError),
    Panic,
}

impl FakeBackend {
    fn new(label: &'static str, behavior: Behavior) -> Self {
        Self {
            label,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            seen_workspace: Arc::new(Mutex::new(None)),
        }
    }
}

impl Backend for FakeBackend {
    fn label(&self) -> &str {
        self.label
    }

    fn compile(&self, workspace: &Workspace, request: &CompilationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_workspace.lock().unwrap() = Some(workspace.path().to_path_buf());
        let src = workspace.file(&format!("{}.c", self.label));
        workspace.write(&src, request.source_text())?;
        match &self.behavior {
            Behavior::Succeed(asm) => Ok(format!("{} {}", asm, request.optimization_level())),
            Behavior::Fail(make) => Err(make()),
            Behavior::Panic => panic!("{} exploded", self.label),
        }
    }
}

fn comparator(a: FakeBackend, b: FakeBackend, root: &Path, concurrent: bool) -> Comparator {
    Comparator::with_backends(Box::new(a), Box::new(b), root.to_path_buf(), concurrent)
}

fn timeout_error() -> StudioError {
    StudioError::Timeout {
        program: "ccc".to_string(),
        limit: std::time::Duration::from_secs(5),
    }
}

fn workspace_entries(root: &Path) -> usize {
    std::fs::read_dir(root).unwrap().count()
}

#[test]
fn test_both_backends_succeed() {
    let root = tempfile::tempdir().unwrap();
    for concurrent in [false, true] {
        let cmp = comparator(
            FakeBackend::new("gcc", Behavior::Succeed("square:")),
            FakeBackend::new("ccc", Behavior::Succeed("\tret")),
            root.path(),
            concurrent,
        );
        let result = cmp.compare(&CompilationRequest::new("int x;", OptLevel::O2));
        assert_eq!(result.backend_a, BackendResult::ok("square: -O2"));
        assert_eq!(result.backend_b, BackendResult::ok("\tret -O2"));
    }
}

#[test]
fn test_blank_source_launches_nothing() {
    let root = tempfile::tempdir().unwrap();
    let a = FakeBackend::new("gcc", Behavior::Succeed("x"));
    let b = FakeBackend::new("ccc", Behavior::Succeed("y"));
    let (calls_a, calls_b) = (a.calls.clone(), b.calls.clone());
    let cmp = comparator(a, b, root.path(), true);

    for source in ["", "   ", "\n\t \n"] {
        let result = cmp.compare(&CompilationRequest::new(source, OptLevel::O0));
        assert!(!result.backend_a.success);
        assert!(!result.backend_b.success);
        assert_eq!(result.backend_a.output, "no code");
        assert_eq!(result.backend_b.output, "no code");
    }
    assert_eq!(calls_a.load(Ordering::SeqCst), 0);
    assert_eq!(calls_b.load(Ordering::SeqCst), 0);
    assert_eq!(workspace_entries(root.path()), 0);
}

#[test]
fn test_failure_is_isolated() {
    let root = tempfile::tempdir().unwrap();
    let cmp = comparator(
        FakeBackend::new("gcc", Behavior::Succeed("main:")),
        FakeBackend::new("ccc", Behavior::Fail(timeout_error)),
        root.path(),
        true,
    );
    let result = cmp.compare(&CompilationRequest::new("int main(){}", OptLevel::O1));
    assert!(result.backend_a.success);
    assert!(!result.backend_b.success);
    assert_eq!(result.backend_b.output, "'ccc' timed out after 5s");
}

#[test]
fn test_panic_is_contained() {
    let root = tempfile::tempdir().unwrap();
    for concurrent in [false, true] {
        let cmp = comparator(
            FakeBackend::new("gcc", Behavior::Panic),
            FakeBackend::new("ccc", Behavior::Succeed("\tret")),
            root.path(),
            concurrent,
        );
        let result = cmp.compare(&CompilationRequest::new("int main(){}", OptLevel::O0));
        assert!(!result.backend_a.success);
        assert_eq!(result.backend_a.output, "internal error: gcc exploded");
        assert!(result.backend_b.success);
        assert_eq!(workspace_entries(root.path()), 0);
    }
}

#[test]
fn test_workspace_shared_then_removed() {
    let root = tempfile::tempdir().unwrap();
    let a = FakeBackend::new("gcc", Behavior::Succeed("x"));
    let b = FakeBackend::new("ccc", Behavior::Fail(|| StudioError::tool("ccc", Some(1), "", "bad")));
    let (seen_a, seen_b) = (a.seen_workspace.clone(), b.seen_workspace.clone());
    let cmp = comparator(a, b, root.path(), false);

    cmp.compare(&CompilationRequest::new("int x;", OptLevel::O0));
    let first = seen_a.lock().unwrap().clone().unwrap();
    assert_eq!(seen_b.lock().unwrap().as_ref(), Some(&first));
    assert!(!first.exists());

    cmp.compare(&CompilationRequest::new("int y;", OptLevel::O0));
    let second = seen_a.lock().unwrap().clone().unwrap();
    assert_ne!(first, second);
    assert!(!second.exists());
    assert_eq!(workspace_entries(root.path()), 0);
}

#[test]
fn test_unusable_workspace_root_fails_both() {
    let root = tempfile::tempdir().unwrap();
    let missing = root.path().join("gone");
    let a = FakeBackend::new("gcc", Behavior::Succeed("x"));
    let calls = a.calls.clone();
    let cmp = comparator(a, FakeBackend::new("ccc", Behavior::Succeed("y")), &missing, true);

    let result = cmp.compare(&CompilationRequest::new("int x;", OptLevel::O0));
    assert!(!result.backend_a.success);
    assert!(!result.backend_b.success);
    assert!(result.backend_a.output.starts_with("workspace error"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_compare_source_rejects_bad_level() {
    let root = tempfile::tempdir().unwrap();
    let cmp = comparator(
        FakeBackend::new("gcc", Behavior::Succeed("x")),
        FakeBackend::new("ccc", Behavior::Succeed("y")),
        root.path(),
        true,
    );
    let result = cmp.compare_source("int x;", Some("-O9"));
    assert!(!result.backend_a.success);
    assert!(result.backend_b.output.contains("-O9"));

    let result = cmp.compare_source("int x;", None);
    assert_eq!(result.backend_a, BackendResult::ok("x -O0"));
}

#[test]
fn test_opt_level_parsing() {
    assert_eq!("-O2".parse::<OptLevel>().unwrap(), OptLevel::O2);
    assert_eq!("Os".parse::<OptLevel>().unwrap(), OptLevel::Os);
    assert_eq!(" -O3 ".parse::<OptLevel>().unwrap(), OptLevel::O3);
    assert!("-O4".parse::<OptLevel>().is_err());
    assert!("-Ofast".parse::<OptLevel>().is_err());
    for level in OptLevel::ALL {
        assert_eq!(level.flag().parse::<OptLevel>().unwrap(), level);
    }
}

#[test]
fn test_failed_result_never_empty() {
    assert_eq!(BackendResult::failed("").output, crate::error::UNKNOWN_ERROR);
    assert_eq!(BackendResult::failed("  \n").output, crate::error::UNKNOWN_ERROR);
}

#[test]
fn test_response_json_shape() {
    let result = ComparisonResult {
        backend_a: BackendResult::ok("square:"),
        backend_b: BackendResult::failed("binary missing"),
    };
    let value: serde_json::Value = serde_json::from_str(&result.to_json()).unwrap();
    assert_eq!(value["backend_a"]["success"], true);
    assert_eq!(value["backend_a"]["asm_or_error"], "square:");
    assert_eq!(value["backend_b"]["success"], false);
    assert_eq!(value["backend_b"]["asm_or_error"], "binary missing");
}

#[test]
fn test_wire_request_defaults_level() {
    let wire: WireRequest = serde_json::from_str(r#"{"source_text": "int x;"}"#).unwrap();
    let request = wire.into_request().unwrap();
    assert_eq!(request.optimization_level(), OptLevel::O0);
    assert_eq!(request.source_text(), "int x;");
}
