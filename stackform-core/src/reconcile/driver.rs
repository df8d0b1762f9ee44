//! Stack reconciliation driver.
//!
//! Drives a stack through render → write → apply, and maps the engine's
//! status query back onto presence or absence. The only state that outlives
//! an operation is the stack identity held in `StackResource`.

use super::engine::{parse_service_list, ComposeEngine};
use super::runner::{CommandRunner, Invocation};
use crate::error::{Result, StackformError};
use crate::manifest::ManifestRenderer;
use crate::types::Stack;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Lifecycle state of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackState {
    /// Nothing is known to be running.
    #[default]
    Absent,
    /// Manifest rendered and written; apply not yet invoked.
    Declared,
    /// Apply invoked and not yet returned.
    Applying,
    /// Last apply succeeded and the status query found services.
    Present,
    /// Last apply failed. Any declare retries from scratch.
    Failed,
}

impl StackState {
    /// Whether the driver may move from `self` to `next`.
    pub fn can_transition_to(self, next: StackState) -> bool {
        use StackState::*;

        match (self, next) {
            // declare / update / retry
            (Absent | Present | Failed, Declared) => true,
            (Declared, Applying) => true,
            (Applying, Present | Failed) => true,
            // status query found running services
            (Absent | Present | Failed, Present) => true,
            // drift or delete
            (_, Absent) => true,
            _ => false,
        }
    }
}

impl fmt::Display for StackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StackState::Absent => "absent",
            StackState::Declared => "declared",
            StackState::Applying => "applying",
            StackState::Present => "present",
            StackState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The host's view of one stack: its identity and current state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackResource {
    /// Stack name once applied; `None` while absent.
    pub id: Option<String>,
    pub state: StackState,
}

impl StackResource {
    /// Resource with no identity.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Rebuild from an identity stored by the host.
    pub fn from_id(id: Option<String>) -> Self {
        let state = if id.is_some() { StackState::Present } else { StackState::Absent };
        Self { id, state }
    }

    pub fn is_present(&self) -> bool {
        self.id.is_some()
    }

    fn transition(&mut self, next: StackState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid stack transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "Stack state transition");
        self.state = next;
    }
}

/// Result of a status query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    /// Services the engine reports as running.
    pub running: Vec<String>,
    /// Whether the manifest had to be regenerated before querying.
    pub redeclared: bool,
}

/// Reconciles declared stacks with the container engine.
pub struct Reconciler<R: CommandRunner> {
    runner: R,
    engine: ComposeEngine,
}

impl<R: CommandRunner> Reconciler<R> {
    pub fn new(runner: R, engine: ComposeEngine) -> Self {
        Self { runner, engine }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn engine(&self) -> &ComposeEngine {
        &self.engine
    }

    /// Create the stack: render, write, apply.
    pub fn create(&self, resource: &mut StackResource, stack: &Stack) -> Result<()> {
        self.declare(resource, stack)
    }

    /// Update the stack. Always a full regeneration and re-apply.
    pub fn update(&self, resource: &mut StackResource, stack: &Stack) -> Result<()> {
        self.declare(resource, stack)
    }

    /// Refresh the stack's presence from the engine.
    ///
    /// A missing manifest is regenerated and re-applied first. An empty
    /// service list clears the identity.
    #[instrument(skip(self, resource, stack), fields(stack = %stack.name))]
    pub fn read(&self, resource: &mut StackResource, stack: &Stack) -> Result<StatusReport> {
        let mut report = StatusReport::default();

        let manifest_path = self.engine.manifest_path();
        let manifest_exists =
            manifest_path.try_exists().map_err(|e| StackformError::io(manifest_path, e))?;
        if !manifest_exists {
            warn!(
                path = %manifest_path.display(),
                "Manifest not found, regenerating from declaration"
            );
            self.declare(resource, stack)?;
            report.redeclared = true;
        }

        let invocation = self.engine.ps_services(&stack.name);
        let output = self.runner.run(&invocation)?;
        if !output.is_success() {
            return Err(StackformError::ExternalInvocationError {
                command: invocation.to_string(),
                reason: format!("exited with status {:?}", output.status),
                output: output.combined(),
            });
        }

        report.running = parse_service_list(&output.stdout);
        if report.running.is_empty() {
            info!("No running services found, marking stack absent");
            resource.id = None;
            resource.transition(StackState::Absent);
        } else {
            info!(services = ?report.running, "Running services match declared stack");
            resource.id = Some(stack.name.clone());
            resource.transition(StackState::Present);
        }

        Ok(report)
    }

    /// Tear the stack down.
    ///
    /// The identity is cleared whether or not teardown succeeds; a teardown
    /// failure is still returned.
    #[instrument(skip(self, resource, stack), fields(stack = %stack.name))]
    pub fn delete(&self, resource: &mut StackResource, stack: &Stack) -> Result<()> {
        let invocation = self.engine.down(&stack.name);
        let result = self.runner.run(&invocation);

        resource.id = None;
        resource.transition(StackState::Absent);

        let output = result?;
        if !output.is_success() {
            return Err(StackformError::ExternalInvocationError {
                command: invocation.to_string(),
                reason: format!("exited with status {:?}", output.status),
                output: output.combined(),
            });
        }
        info!("Stack torn down");
        Ok(())
    }

    #[instrument(skip(self, resource, stack), fields(stack = %stack.name))]
    fn declare(&self, resource: &mut StackResource, stack: &Stack) -> Result<()> {
        let manifest = ManifestRenderer::render(stack)?;
        write_manifest(self.engine.manifest_path(), &manifest)?;
        resource.transition(StackState::Declared);

        resource.transition(StackState::Applying);
        let invocation = self.engine.up(&stack.name);
        match self.apply(&invocation, stack) {
            Ok(()) => {
                resource.id = Some(stack.name.clone());
                resource.transition(StackState::Present);
                info!("Stack applied");
                Ok(())
            }
            Err(e) => {
                resource.transition(StackState::Failed);
                Err(e)
            }
        }
    }

    fn apply(&self, invocation: &Invocation, stack: &Stack) -> Result<()> {
        let output = self.runner.run(invocation)?;
        if output.is_success() {
            Ok(())
        } else {
            Err(StackformError::ApplyFailed { stack: stack.name.clone(), output: output.combined() })
        }
    }
}

/// Write the manifest, replacing any existing file.
pub fn write_manifest(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StackformError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| StackformError::io(path, e))?;
    debug!(path = %path.display(), bytes = contents.len(), "Wrote manifest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::runner::{CommandOutput, MockRunner};
    use crate::types::Service;
    use tempfile::TempDir;

    fn reconciler(dir: &TempDir, runner: MockRunner) -> Reconciler<MockRunner> {
        let engine = ComposeEngine::new(
            "docker",
            vec!["compose".to_string()],
            dir.path().join("docker-compose.yml"),
        );
        Reconciler::new(runner, engine)
    }

    fn web_stack() -> Stack {
        Stack::new("web").with_service(Service::new("web", "nginx"))
    }

    #[test]
    fn test_transitions() {
        use StackState::*;
        assert!(Absent.can_transition_to(Declared));
        assert!(Failed.can_transition_to(Declared));
        assert!(Declared.can_transition_to(Applying));
        assert!(Applying.can_transition_to(Failed));
        assert!(Present.can_transition_to(Absent));
        assert!(!Absent.can_transition_to(Applying));
        assert!(!Declared.can_transition_to(Present));
        assert!(!Failed.can_transition_to(Applying));
    }

    #[test]
    fn test_create_writes_manifest_and_sets_identity() {
        let dir = TempDir::new().unwrap();
        let rec = reconciler(&dir, MockRunner::new());
        let mut resource = StackResource::absent();

        rec.create(&mut resource, &web_stack()).unwrap();

        assert_eq!(resource.id.as_deref(), Some("web"));
        assert_eq!(resource.state, StackState::Present);
        let written = std::fs::read_to_string(rec.engine().manifest_path()).unwrap();
        assert!(written.starts_with("services:\n  web:\n"));
        assert_eq!(rec.runner().invocations().len(), 1);
        assert_eq!(rec.runner().invocations()[0].args.last().map(String::as_str), Some("-d"));
    }

    #[test]
    fn test_failed_apply_keeps_identity_unset() {
        let dir = TempDir::new().unwrap();
        let runner = MockRunner::with_responses(vec![Ok(CommandOutput {
            status: Some(1),
            stdout: "Pulling web\n".to_string(),
            stderr: "pull access denied\n".to_string(),
        })]);
        let rec = reconciler(&dir, runner);
        let mut resource = StackResource::absent();

        let err = rec.create(&mut resource, &web_stack()).unwrap_err();

        match err {
            StackformError::ApplyFailed { output, .. } => {
                assert_eq!(output, "Pulling web\npull access denied\n")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(resource.id, None);
        assert_eq!(resource.state, StackState::Failed);
    }

    #[test]
    fn test_render_error_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let rec = reconciler(&dir, MockRunner::new());
        let mut svc = Service::new("web", "nginx");
        svc.extra_config.insert("image".to_string(), "other".into());
        let mut resource = StackResource::from_id(Some("web".to_string()));

        let err = rec.update(&mut resource, &Stack::new("web").with_service(svc)).unwrap_err();

        assert!(matches!(err, StackformError::ExtraConfigConflict { .. }));
        assert_eq!(resource.state, StackState::Present);
        assert!(rec.runner().invocations().is_empty());
        assert!(!rec.engine().manifest_path().exists());
    }

    #[test]
    fn test_delete_clears_identity_even_on_failure() {
        let dir = TempDir::new().unwrap();
        let runner = MockRunner::with_responses(vec![Ok(CommandOutput::failure(1, "no such project"))]);
        let rec = reconciler(&dir, runner);
        let mut resource = StackResource::from_id(Some("web".to_string()));

        let err = rec.delete(&mut resource, &web_stack()).unwrap_err();

        assert!(matches!(err, StackformError::ExternalInvocationError { ref output, .. } if output == "no such project"));
        assert_eq!(resource, StackResource::absent());
    }
}
