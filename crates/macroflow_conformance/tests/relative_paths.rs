//! Projects rooted at a relative directory, the way `macroflow demo` runs
//! with its default `--workdir .`.

use std::cell::RefCell;
use std::path::PathBuf;

use macroflow_conformance::StubBackend;
use macroflow_flow::{
    run_hard_macro_demo, ArtifactKind, CompletedRun, FlowBackend, FlowError, HdlSession,
    JobManifest, RunRequest, PHYSICAL_FILESET,
};
use tempfile::TempDir;

/// Resolves every manifest path from the tool's working directory, as a
/// spawned flow tool would, then behaves like [`StubBackend`].
#[derive(Default)]
struct ToolView {
    inner: StubBackend,
    seen: RefCell<Vec<PathBuf>>,
}

impl FlowBackend for ToolView {
    fn name(&self) -> &str {
        "tool-view"
    }

    fn execute(&self, request: &RunRequest<'_>) -> Result<(), FlowError> {
        assert!(request.work_dir.is_absolute());
        assert!(request.manifest.is_absolute());
        let manifest = JobManifest::load(request.manifest)?;
        assert!(manifest.jobdir.is_absolute());

        let mut paths: Vec<PathBuf> = manifest.filesets.values().flatten().cloned().collect();
        paths.extend(manifest.constraints.sdc.iter().cloned());
        for library in &manifest.libraries {
            for fileset in library.filesets.values() {
                paths.extend(fileset.files.iter().cloned());
            }
        }
        for path in &paths {
            assert!(path.is_absolute(), "{} is relative", path.display());
            assert!(
                request.work_dir.join(path).is_file(),
                "{} not visible from {}",
                path.display(),
                request.work_dir.display()
            );
        }
        self.seen.borrow_mut().extend(paths);
        self.inner.execute(request)
    }
}

fn relative_workdir() -> TempDir {
    let dir = tempfile::Builder::new()
        .prefix("relative-demo")
        .tempdir_in(".")
        .unwrap();
    assert!(dir.path().is_relative());
    dir
}

#[test]
fn demo_from_relative_workdir() {
    let dir = relative_workdir();
    let backend = ToolView::default();
    let mut session = HdlSession::new();
    let outcome = run_hard_macro_demo(dir.path(), &backend, &mut session).unwrap();

    assert_eq!(backend.inner.executed(), vec!["A", "B"]);
    // A: A.v and top.sdc. B: B.v, top.sdc, and four library files.
    assert_eq!(backend.seen.borrow().len(), 8);

    let physical = outcome.library.fileset(PHYSICAL_FILESET).unwrap();
    assert!(physical.files.iter().all(|f| f.is_absolute() && f.is_file()));
    assert!(outcome.b.artifact_path(ArtifactKind::Gds).is_absolute());
}

#[test]
fn reload_from_relative_build_root() {
    let dir = relative_workdir();
    let mut session = HdlSession::new();
    let outcome = run_hard_macro_demo(dir.path(), &StubBackend::new(), &mut session).unwrap();

    let reloaded = CompletedRun::load(&dir.path().join("build"), "A", "job0").unwrap();
    let lef = reloaded.artifact_path(ArtifactKind::Lef);
    assert!(lef.is_absolute());
    assert_eq!(lef, outcome.a.artifact_path(ArtifactKind::Lef));
}
