//! Gesture session: the single struct that owns all per-run state.
//!
//! One frame in, one [`FrameOutcome`] out: track the primary hand, resolve
//! its gesture, debounce, and dispatch whatever fired.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::action::{ActionBinding, ActionDispatcher, ActionTarget};
use crate::config::Config;
use crate::gesture::{resolve, ClassifierRegistry, Debouncer, GestureEvent, GestureLabel, Transition};
use crate::provider::Frame;
use crate::tracking::{HandTracker, TrackingConfig};

/// What happened to a fired gesture's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the dispatcher.
    Dispatched,
    /// Dispatcher reported an error (already logged).
    Failed,
    /// No binding for the label.
    Unbound,
    /// Bound to the stop action.
    Stop,
}

/// Result of processing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub event: GestureEvent,
    pub transition: Transition,
    /// Set only when the transition fired.
    pub dispatch: Option<DispatchOutcome>,
}

pub struct Session<D> {
    registry: ClassifierRegistry,
    tracker: HandTracker,
    debouncer: Debouncer,
    bindings: BTreeMap<GestureLabel, ActionBinding>,
    dispatcher: D,
    /// Last resolved label, for change logging.
    last_label: Option<GestureLabel>,
    /// Set once a stop action fires.
    pub stop_requested: bool,
    pub frames: u64,
    pub dispatch_failures: u64,
}

impl<D: ActionDispatcher> Session<D> {
    pub fn new(config: &Config, dispatcher: D) -> Self {
        info!(
            "Gesture session: {} gestures, cooldown {}ms",
            config.gestures.len(),
            config.debounce.cooldown.as_millis()
        );
        Self {
            registry: config.registry(),
            tracker: HandTracker::new(TrackingConfig {
                min_score: config.min_hand_score,
                smoothing: config.smoothing,
            }),
            debouncer: Debouncer::new(config.debounce.clone()),
            bindings: config.bindings.clone(),
            dispatcher,
            last_label: None,
            stop_requested: false,
            frames: 0,
            dispatch_failures: 0,
        }
    }

    /// Process one frame observed at `timestamp` (time since session start).
    pub fn process_frame(&mut self, frame: &Frame, timestamp: Duration) -> FrameOutcome {
        self.frames += 1;

        let label = self
            .tracker
            .update(&frame.hands)
            .and_then(|pose| resolve(pose, &self.registry));
        if label != self.last_label {
            debug!(
                "Gesture changed: {} -> {}",
                label_name(self.last_label),
                label_name(label)
            );
            self.last_label = label;
        }

        let event = GestureEvent::new(label, timestamp);
        let transition = self.debouncer.step(event);
        let dispatch = transition.fired().map(|fired| self.dispatch(fired));

        self.dispatcher.poll();

        FrameOutcome {
            event,
            transition,
            dispatch,
        }
    }

    fn dispatch(&mut self, label: GestureLabel) -> DispatchOutcome {
        let Some(binding) = self.bindings.get(&label) else {
            warn!("No action bound to gesture {}", label);
            return DispatchOutcome::Unbound;
        };

        if binding.target == ActionTarget::Stop {
            info!("{}: stop requested", label);
            self.stop_requested = true;
            return DispatchOutcome::Stop;
        }

        match self.dispatcher.dispatch(label, binding) {
            Ok(()) => DispatchOutcome::Dispatched,
            Err(e) => {
                self.dispatch_failures += 1;
                warn!("{}: {}", label, e);
                DispatchOutcome::Failed
            }
        }
    }

    pub fn binding(&self, label: GestureLabel) -> Option<&ActionBinding> {
        self.bindings.get(&label)
    }

    pub fn registry(&self) -> &ClassifierRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &HandTracker {
        &self.tracker
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Generate s-expression for status output.
    pub fn status_sexp(&self) -> String {
        let stats = self.debouncer.stats();
        format!(
            "(:frames {} :gesture {} :fires {} :suppressed {} :releases {} :dispatch-failures {} :hand {})",
            self.frames,
            label_name(self.last_label),
            stats.fires,
            stats.cooldown_blocks,
            stats.releases,
            self.dispatch_failures,
            self.tracker.status_sexp(),
        )
    }
}

fn label_name(label: Option<GestureLabel>) -> &'static str {
    label.map_or("nil", |l| l.as_str())
}

// ── Tests ──────────────────────────────────────────────────
