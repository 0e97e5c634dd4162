//! Async driver for a [`Shell`].
//!
//! [`Session::submit`] turns a trigger into a task on a [`JoinSet`].
//! Finished requests are taken off the set in completion order, and
//! [`Session::apply`] feeds each one into the shell. Nothing about the
//! shell's state is shared with the tasks; they only own their [`Request`].
//!
//! A task that panics or is cancelled still yields a [`Completion`]: an
//! internal error (or an error health status), so its operation never stays
//! pending.
//!
//! [`Request`]: crate::shell::Request

use crate::config::GatewayConfig;
use crate::error::MeddocError;
use crate::gateway::{resolve_backend, HealthStatus, ProcessingBackend};
use crate::shell::{Completion, Notice, Operation, Outcome, Shell};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, error};

/// A shell wired to a backend.
pub struct Session {
    shell: Shell,
    backend: Arc<dyn ProcessingBackend>,
    tasks: JoinSet<Completion>,
    running: HashMap<Id, Operation>,
}

impl Session {
    /// Build a session from config: backend, validation policy, and layout.
    pub fn new(config: &GatewayConfig) -> Result<Self, MeddocError> {
        let backend = resolve_backend(config)?;
        Ok(Self::with_backend(Shell::from_config(config), backend))
    }

    pub fn with_backend(shell: Shell, backend: Arc<dyn ProcessingBackend>) -> Self {
        Self {
            shell,
            backend,
            tasks: JoinSet::new(),
            running: HashMap::new(),
        }
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut Shell {
        &mut self.shell
    }

    /// Requests spawned and not yet collected.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Trigger `op`. On success the request runs in the background and
    /// `None` is returned; otherwise the shell's refusal notice.
    ///
    /// Must be called within a tokio runtime.
    pub fn submit(&mut self, op: Operation) -> Option<Notice> {
        let request = match self.shell.trigger(op) {
            Ok(request) => request,
            Err(notice) => return Some(notice),
        };

        let backend = Arc::clone(&self.backend);
        let handle = self
            .tasks
            .spawn(async move { request.execute(backend.as_ref()).await });
        self.running.insert(handle.id(), op);
        debug!("Spawned {}", op.label());
        None
    }

    /// Wait for the next request to finish. Returns `None` when nothing is
    /// in flight. Cancel safe, so it can sit in a `tokio::select!` branch.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        loop {
            match self.tasks.join_next_with_id().await? {
                Ok((id, completion)) => {
                    self.running.remove(&id);
                    return Some(completion);
                }
                Err(err) => match self.running.remove(&err.id()) {
                    Some(op) => return Some(task_failed(op, err)),
                    None => debug!("Dropping unknown task failure: {err}"),
                },
            }
        }
    }

    /// Apply a finished request to the shell.
    pub fn apply(&mut self, completion: Completion) -> Notice {
        self.shell.complete(completion)
    }

    /// Submit `op` and wait until it (and anything else in flight) has been
    /// applied. Returns the notice for `op`.
    pub async fn run(&mut self, op: Operation) -> Notice {
        if let Some(refused) = self.submit(op) {
            return refused;
        }
        let mut own = None;
        while let Some(completion) = self.next_completion().await {
            let finished = completion.operation;
            let notice = self.apply(completion);
            if finished == op {
                own = Some(notice);
            }
        }
        own.unwrap_or_else(|| Notice::error(format!("{} did not complete", op.label())))
    }
}

/// Completion for a task that panicked or was cancelled.
fn task_failed(operation: Operation, err: JoinError) -> Completion {
    error!("{} task failed: {err}", operation.label());
    let outcome = match operation {
        Operation::Health => Outcome::Health(HealthStatus::Error),
        _ => Outcome::Processed(Err(MeddocError::Internal(format!(
            "{} task failed",
            operation.label()
        )))),
    };
    Completion { operation, outcome }
}
