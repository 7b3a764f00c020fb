//! Primary-hand selection, detector score gating and landmark smoothing.

use tracing::debug;

use crate::gesture::{HandPose, Landmark};

// ── Config ─────────────────────────────────────────────────

/// Configuration for hand tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    /// Hands scored below this (0.0-1.0) are treated as absent.
    pub min_score: f32,
    /// Smoothing factor (0.0 = no smoothing, approaching 1.0 = maximum).
    pub smoothing: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_score: 0.7,
            smoothing: 0.0,
        }
    }
}

// ── State ──────────────────────────────────────────────────

/// Tracks the primary (first reported) hand across frames.
#[derive(Debug, Clone, Default)]
pub struct HandTracker {
    pub config: TrackingConfig,
    /// Last accepted (smoothed) pose; `None` while no hand is tracked.
    current: Option<HandPose>,
    /// Frames with an accepted primary hand.
    pub frames_tracked: u64,
    /// Frames with no hand, or one rejected by the score gate.
    pub frames_lost: u64,
}

impl HandTracker {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Feed one frame's hands.  Returns the pose to classify, or `None` when
    /// there is no usable primary hand.
    pub fn update(&mut self, hands: &[HandPose]) -> Option<&HandPose> {
        let Some(primary) = hands.first() else {
            self.lose();
            return None;
        };

        if let Some(landmark) = primary.first_non_finite() {
            debug!("Hand tracking: primary hand has non-finite {}", landmark.as_str());
            self.lose();
            return None;
        }
        if primary.score < self.config.min_score {
            debug!(
                "Hand tracking: score {:.2} below minimum {:.2}",
                primary.score, self.config.min_score
            );
            self.lose();
            return None;
        }

        let alpha = self.config.smoothing;
        let pose = match self.current.take() {
            Some(prev) if alpha > 0.0 && same_hand(&prev, primary) => {
                let mut smoothed = primary.clone();
                for (out, old) in smoothed.landmarks.iter_mut().zip(prev.landmarks.iter()) {
                    *out = lerp_landmark(old, out, 1.0 - alpha);
                }
                smoothed
            }
            _ => primary.clone(),
        };

        self.frames_tracked += 1;
        self.current = Some(pose);
        self.current.as_ref()
    }

    fn lose(&mut self) {
        if self.current.take().is_some() {
            debug!("Hand tracking: primary hand lost");
        }
        self.frames_lost += 1;
    }

    /// Whether a primary hand was accepted on the last frame.
    pub fn is_tracking(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&HandPose> {
        self.current.as_ref()
    }

    /// Reset all tracking data.
    pub fn reset(&mut self) {
        self.current = None;
        self.frames_tracked = 0;
        self.frames_lost = 0;
    }

    /// Generate s-expression for status output.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:tracking {} :handedness {} :min-score {:.2} :smoothing {:.2} :frames-tracked {} :frames-lost {})",
            if self.is_tracking() { "t" } else { "nil" },
            self.current
                .as_ref()
                .and_then(|pose| pose.handedness)
                .map_or("nil", |h| h.as_str()),
            self.config.min_score,
            self.config.smoothing,
            self.frames_tracked,
            self.frames_lost,
        )
    }
}

/// Smoothing across a handedness flip would blend two different hands.
fn same_hand(a: &HandPose, b: &HandPose) -> bool {
    match (a.handedness, b.handedness) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

/// Linear interpolation helper.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_landmark(a: &Landmark, b: &Landmark, t: f32) -> Landmark {
    Landmark::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t), lerp(a.z, b.z, t))
}

// ── Tests ──────────────────────────────────────────────────
