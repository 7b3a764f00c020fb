//! Action bindings and the dispatchers that carry them out.
//!
//! Dispatch is fire-and-forget: a launched program is never waited on.
//! Children are kept only so they can be reaped between frames.

use std::process::{Child, Command, Stdio};

use tracing::{debug, info, warn};

use crate::gesture::GestureLabel;

// ── Bindings ───────────────────────────────────────────────

/// What a fired gesture does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTarget {
    /// Spawn a program.  First element is the executable, the rest are
    /// its arguments.
    Launch(Vec<String>),
    /// End the gesture session.
    Stop,
}

impl ActionTarget {
    /// Short name for logs and events: the executable, or `stop`.
    pub fn name(&self) -> &str {
        match self {
            Self::Launch(argv) => argv.first().map(String::as_str).unwrap_or(""),
            Self::Stop => "stop",
        }
    }
}

/// A gesture's external action plus its display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBinding {
    pub target: ActionTarget,
    pub description: String,
    /// Display color as `#rrggbb`.
    pub color: String,
}

impl ActionBinding {
    pub fn launch(program: &str, description: &str, color: &str) -> Self {
        Self {
            target: ActionTarget::Launch(vec![program.to_string()]),
            description: description.to_string(),
            color: color.to_string(),
        }
    }

    pub fn stop(description: &str, color: &str) -> Self {
        Self {
            target: ActionTarget::Stop,
            description: description.to_string(),
            color: color.to_string(),
        }
    }
}

// ── Dispatch ───────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("binding for {0} has an empty command line")]
    EmptyCommand(GestureLabel),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Executes fired actions.  Implementations must not block on the
/// launched action.
pub trait ActionDispatcher {
    fn dispatch(&mut self, label: GestureLabel, binding: &ActionBinding) -> Result<(), DispatchError>;

    /// Housekeeping between frames.
    fn poll(&mut self) {}
}

impl<T: ActionDispatcher + ?Sized> ActionDispatcher for Box<T> {
    fn dispatch(&mut self, label: GestureLabel, binding: &ActionBinding) -> Result<(), DispatchError> {
        (**self).dispatch(label, binding)
    }

    fn poll(&mut self) {
        (**self).poll()
    }
}

/// Spawns bound programs as detached child processes.
#[derive(Debug, Default)]
pub struct ProcessLauncher {
    children: Vec<(String, Child)>,
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Children not yet observed to have exited.
    pub fn running(&self) -> usize {
        self.children.len()
    }
}

impl ActionDispatcher for ProcessLauncher {
    fn dispatch(&mut self, label: GestureLabel, binding: &ActionBinding) -> Result<(), DispatchError> {
        let argv = match &binding.target {
            ActionTarget::Launch(argv) => argv,
            ActionTarget::Stop => return Ok(()),
        };
        let (program, args) = argv.split_first().ok_or(DispatchError::EmptyCommand(label))?;

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                program: program.clone(),
                source,
            })?;

        info!("{}: launched {} (pid {})", label, program, child.id());
        self.children.push((program.clone(), child));
        Ok(())
    }

    fn poll(&mut self) {
        self.children.retain_mut(|(program, child)| match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                debug!("{} (pid {}) exited: {}", program, child.id(), status);
                false
            }
            Err(e) => {
                warn!("Failed to poll {} (pid {}): {}", program, child.id(), e);
                false
            }
        });
    }
}

/// Logs what would run instead of running it.
#[derive(Debug, Default)]
pub struct DryRunDispatcher {
    pub dispatched: u64,
}

impl ActionDispatcher for DryRunDispatcher {
    fn dispatch(&mut self, label: GestureLabel, binding: &ActionBinding) -> Result<(), DispatchError> {
        self.dispatched += 1;
        info!(
            "[dry-run] {}: would run {:?} ({})",
            label, binding.target, binding.description
        );
        Ok(())
    }
}

/// Records every dispatch call; optionally fails each one.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingDispatcher {
    pub calls: Vec<(GestureLabel, ActionBinding)>,
    pub fail: bool,
}

#[cfg(test)]
impl ActionDispatcher for RecordingDispatcher {
    fn dispatch(&mut self, label: GestureLabel, binding: &ActionBinding) -> Result<(), DispatchError> {
        self.calls.push((label, binding.clone()));
        if self.fail {
            return Err(DispatchError::Spawn {
                program: binding.target.name().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }
        Ok(())
    }
}
