//! Action debouncing: turns the per-frame gesture stream into one-shot
//! fire decisions.
//!
//! A gesture fires once when it appears and not again while it stays held.
//! Switching directly to another gesture fires the new one immediately.
//! A per-label cooldown absorbs detector flicker (brief misclassified
//! frames in the middle of a hold).

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use super::classifier::GestureLabel;

// ── Events ─────────────────────────────────────────────────

/// One frame's classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    /// Resolved gesture, `None` when no hand or no match.
    pub label: Option<GestureLabel>,
    /// Monotonic time since session start.
    pub timestamp: Duration,
}

impl GestureEvent {
    pub fn new(label: Option<GestureLabel>, timestamp: Duration) -> Self {
        Self { label, timestamp }
    }

    pub fn none(timestamp: Duration) -> Self {
        Self::new(None, timestamp)
    }
}

// ── Config ─────────────────────────────────────────────────

/// Debounce timing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Minimum time between two fires of the same gesture.
    pub cooldown: Duration,
    /// How long a new gesture must be held before it fires (zero = fire on
    /// the first frame).
    pub min_hold: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(2),
            min_hold: Duration::ZERO,
        }
    }
}

// ── State ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum HoldState {
    #[default]
    Idle,
    /// Seen since `since`, waiting for `min_hold` before firing.
    Pending { label: GestureLabel, since: Duration },
    /// Active on the previous frame and already handled.
    Held(GestureLabel),
}

/// Per-session debounce memory.
#[derive(Debug, Clone, Default)]
pub struct DebounceState {
    hold: HoldState,
    last_fired: HashMap<GestureLabel, Duration>,
}

impl DebounceState {
    /// Gesture currently held (already fired or suppressed), if any.
    pub fn held(&self) -> Option<GestureLabel> {
        match self.hold {
            HoldState::Held(label) => Some(label),
            _ => None,
        }
    }

    /// Gesture waiting out `min_hold`, if any.
    pub fn pending(&self) -> Option<GestureLabel> {
        match self.hold {
            HoldState::Pending { label, .. } => Some(label),
            _ => None,
        }
    }

    /// When `label` last fired, or `None` if it never has.
    pub fn last_fired(&self, label: GestureLabel) -> Option<Duration> {
        self.last_fired.get(&label).copied()
    }
}

/// Outcome of feeding one frame to the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No gesture before or now.
    Idle,
    /// New gesture; its action should run.
    Fired(GestureLabel),
    /// New gesture, but it fired too recently.
    Suppressed(GestureLabel),
    /// New gesture still inside its minimum hold time.
    Pending(GestureLabel),
    /// Same gesture as the previous frame.
    Held(GestureLabel),
    /// Held gesture ended.
    Released(GestureLabel),
}

impl Transition {
    /// The label to dispatch, if this transition fires.
    pub fn fired(&self) -> Option<GestureLabel> {
        match self {
            Self::Fired(label) => Some(*label),
            _ => None,
        }
    }
}

/// Counters for status reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebounceStats {
    pub fires: u64,
    pub cooldown_blocks: u64,
    pub releases: u64,
}

// ── Debouncer ──────────────────────────────────────────────

/// Fire/no-fire state machine, one instance per session.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    pub config: DebounceConfig,
    state: DebounceState,
    stats: DebounceStats,
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            state: DebounceState::default(),
            stats: DebounceStats::default(),
        }
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    pub fn stats(&self) -> &DebounceStats {
        &self.stats
    }

    /// Process one frame's event.
    pub fn step(&mut self, event: GestureEvent) -> Transition {
        let now = event.timestamp;

        let Some(label) = event.label else {
            return match std::mem::take(&mut self.state.hold) {
                HoldState::Held(released) => {
                    self.stats.releases += 1;
                    debug!("Gesture released: {}", released);
                    Transition::Released(released)
                }
                HoldState::Pending { .. } | HoldState::Idle => Transition::Idle,
            };
        };

        match self.state.hold {
            HoldState::Held(current) if current == label => Transition::Held(label),
            HoldState::Pending { label: current, since } if current == label => {
                if now.saturating_sub(since) >= self.config.min_hold {
                    self.try_fire(label, now)
                } else {
                    Transition::Pending(label)
                }
            }
            _ => {
                if self.config.min_hold.is_zero() {
                    self.try_fire(label, now)
                } else {
                    self.state.hold = HoldState::Pending { label, since: now };
                    Transition::Pending(label)
                }
            }
        }
    }

    fn try_fire(&mut self, label: GestureLabel, now: Duration) -> Transition {
        self.state.hold = HoldState::Held(label);

        if let Some(last) = self.state.last_fired(label) {
            let elapsed = now.saturating_sub(last);
            if elapsed < self.config.cooldown {
                self.stats.cooldown_blocks += 1;
                debug!(
                    "Gesture {} suppressed by cooldown ({}ms since last fire)",
                    label,
                    elapsed.as_millis()
                );
                return Transition::Suppressed(label);
            }
        }

        self.state.last_fired.insert(label, now);
        self.stats.fires += 1;
        debug!("Gesture fired: {} at {}ms", label, now.as_millis());
        Transition::Fired(label)
    }

    /// Forget all hold and cooldown history.
    pub fn reset(&mut self) {
        self.state = DebounceState::default();
        self.stats = DebounceStats::default();
    }
}

// ── Tests ──────────────────────────────────────────────────
