//! The two-design scenario: `A` is hardened, packaged as `modA`, and placed
//! twice inside `B`.

use macroflow_conformance::StubBackend;
use macroflow_flow::{
    run_hard_macro_demo, ArtifactKind, FilesetRole, HdlSession, JobManifest, JobStatus,
    NodeStatus, NLDM_FILESET, PHYSICAL_FILESET,
};
use tempfile::TempDir;

#[test]
fn demo_builds_a_then_b() {
    let dir = TempDir::new().unwrap();
    let backend = StubBackend::new();
    let mut session = HdlSession::new();
    let outcome = run_hard_macro_demo(dir.path(), &backend, &mut session).unwrap();

    assert_eq!(backend.executed(), vec!["A", "B"]);
    assert!(!session.sink.has_errors());
    for file in ["A.v", "B.v", "top.sdc"] {
        assert!(dir.path().join(file).is_file());
    }

    for run in [&outcome.a, &outcome.b] {
        assert_eq!(run.record().status, JobStatus::Succeeded);
        assert_eq!(run.record().nodes.len(), 9);
        assert!(run.record().nodes.iter().all(|n| n.status == NodeStatus::Success));
        assert_eq!(run.preset().name, "skywater130_demo");
    }
}

#[test]
fn library_points_at_a_outputs() {
    let dir = TempDir::new().unwrap();
    let mut session = HdlSession::new();
    let outcome = run_hard_macro_demo(dir.path(), &StubBackend::new(), &mut session).unwrap();
    let library = &outcome.library;

    assert_eq!(library.name(), "modA");
    assert_eq!(library.pdk(), "skywater130");
    assert_eq!(library.cells(), &["A".to_string()]);

    let outputs = |step: &str, file: &str| {
        outcome.a.layout().job_dir().join(step).join("0").join("outputs").join(file)
    };
    let physical = library.fileset(PHYSICAL_FILESET).unwrap();
    assert_eq!(physical.role, FilesetRole::Apr);
    assert_eq!(
        physical.files,
        vec![
            outputs("write.views", "A.lef"),
            outputs("write.views", "A.slow.lib"),
            outputs("write.gds", "A.gds"),
        ]
    );
    let timing = library.fileset(NLDM_FILESET).unwrap();
    assert_eq!(timing.files, vec![outputs("write.views", "A.slow.lib")]);
    assert!(outcome.a.layout().job_dir().ends_with("build/A/job0"));
}

#[test]
fn only_b_gets_the_die_area_and_the_macro() {
    let dir = TempDir::new().unwrap();
    let backend = StubBackend::new();
    let mut session = HdlSession::new();
    let outcome = run_hard_macro_demo(dir.path(), &backend, &mut session).unwrap();

    let manifests = backend.manifests();
    let (a, b) = (&manifests[0], &manifests[1]);
    assert_eq!(a.constraints.diearea, None);
    assert!(a.libraries.is_empty());
    assert_eq!(b.constraints.diearea, Some([[0.0, 0.0], [1000.0, 1000.0]]));
    assert_eq!(b.libraries.len(), 1);
    assert_eq!(b.libraries[0].name, "modA");
    assert_eq!(a.constraints.density, 10);

    for manifest in [a, b] {
        assert_eq!(manifest.preset.pdk, "skywater130");
        assert_eq!(manifest.constraints.sdc, vec![dir.path().join("top.sdc")]);
    }

    assert_eq!(outcome.b.record().libraries, vec!["modA".to_string()]);
    let on_disk = JobManifest::load(&outcome.b.layout().manifest_path()).unwrap();
    assert_eq!(&on_disk, b);
}

#[test]
fn b_artifacts_mention_the_macro() {
    let dir = TempDir::new().unwrap();
    let mut session = HdlSession::new();
    let outcome = run_hard_macro_demo(dir.path(), &StubBackend::new(), &mut session).unwrap();
    let gds = std::fs::read_to_string(outcome.b.artifact_path(ArtifactKind::Gds)).unwrap();
    assert!(gds.contains("macros: modA"));
    let metrics = &outcome.b.record().nodes[0].metrics;
    assert_eq!(metrics["macros"], 1.0);
}

#[test]
fn rerun_replaces_previous_job() {
    let dir = TempDir::new().unwrap();
    let mut session = HdlSession::new();
    let first = run_hard_macro_demo(dir.path(), &StubBackend::new(), &mut session).unwrap();
    let mut session = HdlSession::new();
    let second = run_hard_macro_demo(dir.path(), &StubBackend::new(), &mut session).unwrap();
    assert_eq!(first.a.layout(), second.a.layout());
    assert_eq!(
        first.a.record().artifact(ArtifactKind::Lef).unwrap().hash,
        second.a.record().artifact(ArtifactKind::Lef).unwrap().hash
    );
}
