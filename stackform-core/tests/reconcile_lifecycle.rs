//! Integration tests for the stack reconciliation lifecycle.
//!
//! These tests drive the full create / read / update / delete cycle against a
//! mock command runner, so no container engine is required:
//! - Declare a stack and apply it
//! - Refresh it while services run and after they stop
//! - Regenerate a deleted manifest
//! - Retry after a failed apply
//! - Tear it down

use stackform_core::error::StackformError;
use stackform_core::{
    CommandOutput, ComposeEngine, DeclaredValue, ManifestRenderer, MockRunner, Reconciler,
    StackNormalizer, StackResource, StackState,
};
use std::path::PathBuf;
use tempfile::TempDir;

const DECLARATION: &str = r#"
name: site
services:
  - name: web
    image: nginx
    ports: ["80:80"]
    depends_on: [api]
  - name: api
    image: site/api:2
    environment:
      DATABASE_URL: postgres://db/site
    extra_config:
      labels:
        team: infra
networks:
  - name: net1
volumes:
  - name: data
"#;

fn stack() -> stackform_core::Stack {
    let declaration = DeclaredValue::from_yaml_str(DECLARATION).unwrap();
    StackNormalizer::normalize(&declaration).unwrap()
}

fn manifest_path(dir: &TempDir) -> PathBuf {
    dir.path().join("docker-compose.yml")
}

fn reconciler(dir: &TempDir, responses: Vec<stackform_core::Result<CommandOutput>>) -> Reconciler<MockRunner> {
    let engine = ComposeEngine::new("docker", vec!["compose".to_string()], manifest_path(dir));
    Reconciler::new(MockRunner::with_responses(responses), engine)
}

fn expected_args(dir: &TempDir, action: &[&str]) -> Vec<String> {
    let mut args = vec![
        "compose".to_string(),
        "-f".to_string(),
        manifest_path(dir).to_string_lossy().to_string(),
        "-p".to_string(),
        "site".to_string(),
    ];
    args.extend(action.iter().map(|a| a.to_string()));
    args
}

#[test]
fn test_create_then_refresh_while_running() {
    let dir = TempDir::new().unwrap();
    let rec = reconciler(
        &dir,
        vec![Ok(CommandOutput::success("")), Ok(CommandOutput::success("web\napi\n"))],
    );
    let stack = stack();
    let mut resource = StackResource::absent();

    rec.create(&mut resource, &stack).unwrap();
    assert_eq!(resource.id.as_deref(), Some("site"));

    let written = std::fs::read_to_string(manifest_path(&dir)).unwrap();
    assert_eq!(written, ManifestRenderer::render(&stack).unwrap());

    let report = rec.read(&mut resource, &stack).unwrap();
    assert_eq!(report.running, vec!["web", "api"]);
    assert!(!report.redeclared);
    assert_eq!(resource.state, StackState::Present);
    assert_eq!(resource.id.as_deref(), Some("site"));

    let invocations = rec.runner().invocations();
    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[0].args, expected_args(&dir, &["up", "-d"]));
    assert_eq!(invocations[1].args, expected_args(&dir, &["ps", "--services"]));
}

#[test]
fn test_refresh_with_no_running_services_marks_absent() {
    let dir = TempDir::new().unwrap();
    let rec = reconciler(&dir, vec![Ok(CommandOutput::success("")), Ok(CommandOutput::success("\n"))]);
    let stack = stack();
    let mut resource = StackResource::absent();

    rec.create(&mut resource, &stack).unwrap();
    let report = rec.read(&mut resource, &stack).unwrap();

    assert!(report.running.is_empty());
    assert_eq!(resource, StackResource::absent());
}

#[test]
fn test_refresh_regenerates_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let rec = reconciler(&dir, vec![Ok(CommandOutput::success("")), Ok(CommandOutput::success("web\n"))]);
    let stack = stack();
    let mut resource = StackResource::from_id(Some("site".to_string()));
    assert!(!manifest_path(&dir).exists());

    let report = rec.read(&mut resource, &stack).unwrap();

    assert!(report.redeclared);
    assert!(manifest_path(&dir).exists());
    assert_eq!(resource.state, StackState::Present);
    let lines = rec.runner().command_lines();
    assert!(lines[0].ends_with("up -d"));
    assert!(lines[1].ends_with("ps --services"));
}

#[test]
fn test_refresh_propagates_status_query_failure() {
    let dir = TempDir::new().unwrap();
    std::fs::write(manifest_path(&dir), "services: {}\n").unwrap();
    let rec = reconciler(&dir, vec![Ok(CommandOutput::failure(14, "Cannot connect to the Docker daemon"))]);
    let mut resource = StackResource::from_id(Some("site".to_string()));

    let err = rec.read(&mut resource, &stack()).unwrap_err();

    match err {
        StackformError::ExternalInvocationError { output, .. } => {
            assert_eq!(output, "Cannot connect to the Docker daemon")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(resource.id.as_deref(), Some("site"));
}

#[test]
fn test_update_always_reapplies() {
    let dir = TempDir::new().unwrap();
    let rec = reconciler(&dir, vec![]);
    let mut stack = stack();
    let mut resource = StackResource::absent();

    rec.create(&mut resource, &stack).unwrap();
    rec.update(&mut resource, &stack).unwrap();
    stack.services[0].replicas = 4;
    rec.update(&mut resource, &stack).unwrap();

    let lines = rec.runner().command_lines();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.ends_with("up -d")));
    let written = std::fs::read_to_string(manifest_path(&dir)).unwrap();
    assert!(written.contains("replicas: 4"));
}

#[test]
fn test_failed_apply_can_be_retried() {
    let dir = TempDir::new().unwrap();
    let rec = reconciler(
        &dir,
        vec![Ok(CommandOutput::failure(1, "manifest unknown")), Ok(CommandOutput::success(""))],
    );
    let stack = stack();
    let mut resource = StackResource::absent();

    let err = rec.create(&mut resource, &stack).unwrap_err();
    assert!(matches!(err, StackformError::ApplyFailed { ref output, .. } if output == "manifest unknown"));
    assert_eq!(resource.state, StackState::Failed);
    assert!(!resource.is_present());

    rec.create(&mut resource, &stack).unwrap();
    assert_eq!(resource.state, StackState::Present);
    assert!(resource.is_present());
}

#[test]
fn test_missing_engine_binary_fails_apply() {
    let dir = TempDir::new().unwrap();
    let rec = reconciler(
        &dir,
        vec![Err(StackformError::ExternalInvocationError {
            command: "docker compose up -d".to_string(),
            reason: "No such file or directory (os error 2)".to_string(),
            output: String::new(),
        })],
    );
    let mut resource = StackResource::absent();

    let err = rec.create(&mut resource, &stack()).unwrap_err();

    assert!(matches!(err, StackformError::ExternalInvocationError { .. }));
    assert_eq!(resource.state, StackState::Failed);
    assert_eq!(resource.id, None);
}

#[test]
fn test_delete_clears_identity() {
    let dir = TempDir::new().unwrap();
    let rec = reconciler(&dir, vec![]);
    let stack = stack();
    let mut resource = StackResource::absent();

    rec.create(&mut resource, &stack).unwrap();
    rec.delete(&mut resource, &stack).unwrap();

    assert_eq!(resource, StackResource::absent());
    let invocations = rec.runner().invocations();
    assert_eq!(invocations[1].args, expected_args(&dir, &["down"]));
}

#[test]
fn test_delete_clears_identity_when_engine_missing() {
    let dir = TempDir::new().unwrap();
    let rec = reconciler(
        &dir,
        vec![Err(StackformError::ExternalInvocationError {
            command: "docker compose down".to_string(),
            reason: "not found".to_string(),
            output: String::new(),
        })],
    );
    let mut resource = StackResource::from_id(Some("site".to_string()));

    assert!(rec.delete(&mut resource, &stack()).is_err());
    assert_eq!(resource.id, None);
    assert_eq!(resource.state, StackState::Absent);
}

#[test]
fn test_unwritable_manifest_path() {
    let dir = TempDir::new().unwrap();
    // A regular file where the manifest's parent directory should be.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let engine = ComposeEngine::new("docker", vec![], blocker.join("docker-compose.yml"));
    let rec = Reconciler::new(MockRunner::new(), engine);
    let mut resource = StackResource::absent();

    let err = rec.create(&mut resource, &stack()).unwrap_err();

    assert!(matches!(err, StackformError::FilesystemError { .. }));
    assert_eq!(resource.state, StackState::Absent);
    assert!(rec.runner().invocations().is_empty());
}

#[test]
fn test_refresh_with_unreadable_manifest_location() {
    let dir = TempDir::new().unwrap();
    // The manifest's parent is a regular file, so its presence cannot be checked.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let manifest = blocker.join("docker-compose.yml");
    let engine = ComposeEngine::new("docker", vec![], manifest.clone());
    let rec = Reconciler::new(MockRunner::new(), engine);
    let mut resource = StackResource::from_id(Some("site".to_string()));

    let err = rec.read(&mut resource, &stack()).unwrap_err();

    match err {
        StackformError::FilesystemError { path, .. } => assert_eq!(path, manifest),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(resource.state, StackState::Present);
    assert!(rec.runner().invocations().is_empty());
}
