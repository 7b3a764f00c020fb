//! Gesture engine: landmark model, geometry, classifiers, resolver and
//! debouncer.
//!
//! Everything here is pure or owns its state explicitly; no I/O.

pub mod classifier;
pub mod debounce;
pub mod geometry;
pub mod landmark;
pub mod resolver;

pub use classifier::{extended_count, FingerPattern, GestureClassifier, GestureLabel, OkClassifier, ThumbsUpClassifier};
pub use debounce::{DebounceConfig, DebounceState, DebounceStats, Debouncer, GestureEvent, Transition};
pub use landmark::{HandLandmark, HandPose, Handedness, Landmark, LANDMARK_COUNT};
pub use resolver::{resolve, ClassifierRegistry, Thresholds};

// ── Test poses ─────────────────────────────────────────────

/// Synthetic hand poses in image coordinates (y grows downward).
#[cfg(test)]
pub(crate) mod fixtures {
    use super::landmark::{HandLandmark as L, HandPose, Landmark};

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.0)
    }

    /// Upright hand, palm toward the camera, wrist at the bottom.
    ///
    /// `extended` is index, middle, ring, pinky.  `thumb_out` stretches the
    /// thumb away from the palm (roughly horizontal), otherwise it is tucked
    /// across the palm.
    pub(crate) fn upright_hand(extended: [bool; 4], thumb_out: bool) -> HandPose {
        let mut pose = HandPose::new();
        pose.set(L::Wrist, lm(0.50, 0.90));
        pose.set(L::ThumbCmc, lm(0.42, 0.86));
        pose.set(L::ThumbMcp, lm(0.36, 0.80));
        if thumb_out {
            pose.set(L::ThumbIp, lm(0.30, 0.78));
            pose.set(L::ThumbTip, lm(0.24, 0.76));
        } else {
            pose.set(L::ThumbIp, lm(0.38, 0.72));
            pose.set(L::ThumbTip, lm(0.47, 0.74));
        }

        let columns = [
            (0.42, [L::IndexMcp, L::IndexPip, L::IndexDip, L::IndexTip]),
            (0.48, [L::MiddleMcp, L::MiddlePip, L::MiddleDip, L::MiddleTip]),
            (0.54, [L::RingMcp, L::RingPip, L::RingDip, L::RingTip]),
            (0.60, [L::PinkyMcp, L::PinkyPip, L::PinkyDip, L::PinkyTip]),
        ];
        for ((x, [mcp, pip, dip, tip]), straight) in columns.into_iter().zip(extended) {
            pose.set(mcp, lm(x, 0.70));
            if straight {
                pose.set(pip, lm(x, 0.55));
                pose.set(dip, lm(x, 0.47));
                pose.set(tip, lm(x, 0.40));
            } else {
                pose.set(pip, lm(x, 0.62));
                pose.set(dip, lm(x, 0.70));
                pose.set(tip, lm(x, 0.75));
            }
        }
        pose
    }

    /// Thumb and index tips 0.01 apart, middle/ring/pinky extended.
    pub(crate) fn ok_pose() -> HandPose {
        let mut pose = upright_hand([false, true, true, true], true);
        pose.set(L::ThumbIp, lm(0.34, 0.72));
        pose.set(L::ThumbTip, lm(0.40, 0.66));
        pose.set(L::IndexTip, lm(0.41, 0.66));
        pose
    }

    /// Sideways fist, knuckles toward the camera, thumb straight up.
    pub(crate) fn thumbs_up_pose() -> HandPose {
        let mut pose = HandPose::new();
        pose.set(L::Wrist, lm(0.55, 0.75));
        pose.set(L::ThumbCmc, lm(0.50, 0.55));
        pose.set(L::ThumbMcp, lm(0.46, 0.45));
        pose.set(L::ThumbIp, lm(0.46, 0.36));
        pose.set(L::ThumbTip, lm(0.46, 0.28));

        let rows = [
            (0.50, [L::IndexMcp, L::IndexPip, L::IndexDip, L::IndexTip]),
            (0.55, [L::MiddleMcp, L::MiddlePip, L::MiddleDip, L::MiddleTip]),
            (0.60, [L::RingMcp, L::RingPip, L::RingDip, L::RingTip]),
            (0.65, [L::PinkyMcp, L::PinkyPip, L::PinkyDip, L::PinkyTip]),
        ];
        for (y, [mcp, pip, dip, tip]) in rows {
            pose.set(mcp, lm(0.45, y));
            pose.set(pip, lm(0.38, y + 0.02));
            pose.set(dip, lm(0.39, y + 0.04));
            pose.set(tip, lm(0.44, y + 0.04));
        }
        pose
    }

    /// Same fist with the thumb sticking out horizontally.
    pub(crate) fn thumb_sideways_pose() -> HandPose {
        let mut pose = thumbs_up_pose();
        pose.set(L::ThumbIp, lm(0.38, 0.44));
        pose.set(L::ThumbTip, lm(0.30, 0.43));
        pose
    }

    /// Every landmark at the same point.
    pub(crate) fn degenerate_pose(x: f32, y: f32) -> HandPose {
        let mut pose = HandPose::new();
        for landmark in pose.landmarks.iter_mut() {
            *landmark = lm(x, y);
        }
        pose
    }
}
