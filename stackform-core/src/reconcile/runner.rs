//! Command runner abstraction for the container engine CLI.
//!
//! `CommandRunner` is the capability the reconciler uses to reach the outside
//! world. `ProcessRunner` spawns real processes; `MockRunner` records
//! invocations and replays canned responses so the driver can be exercised
//! without a container engine.

use crate::error::{Result, StackformError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::process::Command;
use tracing::{debug, instrument};

/// A single external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self { status: Some(0), stdout: stdout.into(), stderr: String::new() }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self { status: Some(code), stdout: String::new(), stderr: stderr.into() }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        combined.push_str(&self.stderr);
        combined
    }
}

/// Trait for executing external commands.
pub trait CommandRunner {
    /// Run `invocation` to completion.
    ///
    /// A non-zero exit is reported through `CommandOutput::status`, not as an
    /// error. Errors mean the command could not be run at all.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        (**self).run(invocation)
    }
}

/// Production runner that spawns the process and waits for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    #[instrument(skip(self, invocation), fields(command = %invocation))]
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|e| StackformError::ExternalInvocationError {
                command: invocation.to_string(),
                reason: e.to_string(),
                output: String::new(),
            })?;

        let output = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        debug!(status = ?output.status, "Command finished");
        Ok(output)
    }
}

/// Test-double runner that records invocations and returns pre-configured responses.
///
/// Responses are served in order; once they run out every call succeeds with
/// empty output.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: RefCell<VecDeque<Result<CommandOutput>>>,
    invocations: RefCell<Vec<Invocation>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<Result<CommandOutput>>) -> Self {
        Self { responses: RefCell::new(responses.into()), invocations: RefCell::new(Vec::new()) }
    }

    /// Queue another response.
    pub fn push_response(&self, response: Result<CommandOutput>) {
        self.responses.borrow_mut().push_back(response);
    }

    /// All invocations so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    /// Invocations rendered as command lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations.borrow().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.invocations.borrow_mut().push(invocation.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(CommandOutput::success("")))
    }
}
