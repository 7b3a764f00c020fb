//! Per-frame gesture classifiers.
//!
//! Each classifier is a pure predicate over one `HandPose`.  Thresholds
//! are constructor parameters so sensitivity can be tuned from config.

use super::geometry::{distance, is_curled, is_extended, rise};
use super::landmark::{Finger, HandLandmark, HandPose};

// ── Gesture labels ─────────────────────────────────────────

/// Recognized gesture types.  "No gesture" is `None` at the use sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GestureLabel {
    /// Thumb and index tips touching, other three fingers extended.
    Ok,
    /// Thumb pointing up, four fingers curled.
    ThumbsUp,
    /// Index and middle extended, the rest folded.
    PeaceSign,
    /// Every finger folded.
    Fist,
    /// Every finger extended.
    OpenHand,
    /// Only the index finger extended.
    Pointing,
    /// Index and pinky extended, the rest folded.
    RockOn,
}

impl GestureLabel {
    /// Every label, in default resolution order.
    pub const ALL: [GestureLabel; 7] = [
        Self::Ok,
        Self::ThumbsUp,
        Self::PeaceSign,
        Self::Fist,
        Self::OpenHand,
        Self::Pointing,
        Self::RockOn,
    ];

    /// String representation for config files, logs and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ThumbsUp => "thumbs-up",
            Self::PeaceSign => "peace-sign",
            Self::Fist => "fist",
            Self::OpenHand => "open-hand",
            Self::Pointing => "pointing",
            Self::RockOn => "rock-on",
        }
    }

    /// Parse a label name.  Accepts `thumbs-up`, `thumbs_up` and `THUMBS_UP`.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|l| l.as_str() == normalized)
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Classifier contract ────────────────────────────────────

/// A pure pose predicate.
///
/// Implementations must return `false` rather than panic on degenerate or
/// out-of-range input.
pub trait GestureClassifier {
    fn detect(&self, pose: &HandPose) -> bool;
}

impl<F> GestureClassifier for F
where
    F: Fn(&HandPose) -> bool,
{
    fn detect(&self, pose: &HandPose) -> bool {
        self(pose)
    }
}

// ── Finger state helpers ───────────────────────────────────

fn finger_extended(pose: &HandPose, finger: Finger) -> bool {
    is_extended(
        &pose.get(finger.tip()),
        &pose.get(finger.pip()),
        &pose.get(HandLandmark::Wrist),
    )
}

fn finger_curled(pose: &HandPose, finger: Finger) -> bool {
    is_curled(
        &pose.get(finger.tip()),
        &pose.get(finger.pip()),
        &pose.get(HandLandmark::Wrist),
    )
}

// The thumb bends across the palm, so its reference point is the pinky
// knuckle rather than the wrist.
fn thumb_extended(pose: &HandPose) -> bool {
    is_extended(
        &pose.get(HandLandmark::ThumbTip),
        &pose.get(HandLandmark::ThumbIp),
        &pose.get(HandLandmark::PinkyMcp),
    )
}

fn thumb_folded(pose: &HandPose) -> bool {
    is_curled(
        &pose.get(HandLandmark::ThumbTip),
        &pose.get(HandLandmark::ThumbIp),
        &pose.get(HandLandmark::PinkyMcp),
    )
}

/// Number of extended digits, thumb included (0-5).
pub fn extended_count(pose: &HandPose) -> usize {
    let fingers = Finger::ALL
        .iter()
        .filter(|&&finger| finger_extended(pose, finger))
        .count();
    fingers + usize::from(thumb_extended(pose))
}

// ── OK ─────────────────────────────────────────────────────

/// Thumb tip and index tip closing a circle, middle/ring/pinky straight.
#[derive(Debug, Clone)]
pub struct OkClassifier {
    /// Maximum thumb-to-index tip distance in normalized units.
    pub max_distance: f32,
}

impl OkClassifier {
    pub fn new(max_distance: f32) -> Self {
        Self { max_distance }
    }
}

impl GestureClassifier for OkClassifier {
    fn detect(&self, pose: &HandPose) -> bool {
        let pinch = distance(
            &pose.get(HandLandmark::ThumbTip),
            &pose.get(HandLandmark::IndexTip),
        );
        pinch < self.max_distance
            && [Finger::Middle, Finger::Ring, Finger::Pinky]
                .into_iter()
                .all(|f| finger_extended(pose, f))
    }
}

// ── Thumbs up ──────────────────────────────────────────────

/// Thumb pointing up along the image vertical, four fingers curled.
#[derive(Debug, Clone)]
pub struct ThumbsUpClassifier {
    /// Minimum upward travel from thumb MCP to thumb tip in normalized units.
    pub min_rise: f32,
}

impl ThumbsUpClassifier {
    pub fn new(min_rise: f32) -> Self {
        Self { min_rise }
    }

    fn thumb_up(&self, pose: &HandPose) -> bool {
        let tip = pose.get(HandLandmark::ThumbTip);
        let ip = pose.get(HandLandmark::ThumbIp);
        let mcp = pose.get(HandLandmark::ThumbMcp);

        let chain_rises = tip.y < ip.y && ip.y < mcp.y;
        let up = rise(&mcp, &tip);
        let sideways = (tip.x - mcp.x).abs();

        // Vertical travel must dominate, otherwise a sideways thumb that
        // tilts slightly upward would pass.
        chain_rises && up > self.min_rise && up > sideways
    }
}

impl GestureClassifier for ThumbsUpClassifier {
    fn detect(&self, pose: &HandPose) -> bool {
        self.thumb_up(pose) && Finger::ALL.into_iter().all(|f| finger_curled(pose, f))
    }
}

// ── Finger patterns ────────────────────────────────────────

/// Required state of one digit in a `FingerPattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digit {
    Extended,
    Folded,
}

/// Static hand shape given as extended/folded per digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerPattern {
    pub thumb: Digit,
    /// Index, middle, ring, pinky.
    pub fingers: [Digit; 4],
}

impl FingerPattern {
    pub fn peace_sign() -> Self {
        use Digit::*;
        Self {
            thumb: Folded,
            fingers: [Extended, Extended, Folded, Folded],
        }
    }

    pub fn fist() -> Self {
        use Digit::*;
        Self {
            thumb: Folded,
            fingers: [Folded; 4],
        }
    }

    pub fn open_hand() -> Self {
        use Digit::*;
        Self {
            thumb: Extended,
            fingers: [Extended; 4],
        }
    }

    pub fn pointing() -> Self {
        use Digit::*;
        Self {
            thumb: Folded,
            fingers: [Extended, Folded, Folded, Folded],
        }
    }

    pub fn rock_on() -> Self {
        use Digit::*;
        Self {
            thumb: Folded,
            fingers: [Extended, Folded, Folded, Extended],
        }
    }
}

impl GestureClassifier for FingerPattern {
    fn detect(&self, pose: &HandPose) -> bool {
        let thumb_ok = match self.thumb {
            Digit::Extended => thumb_extended(pose),
            Digit::Folded => thumb_folded(pose),
        };
        thumb_ok
            && Finger::ALL
                .into_iter()
                .zip(self.fingers)
                .all(|(finger, want)| match want {
                    Digit::Extended => finger_extended(pose, finger),
                    Digit::Folded => finger_curled(pose, finger),
                })
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::fixtures::*;
    use crate::gesture::landmark::Landmark;

    const OK_DISTANCE: f32 = 0.05;

    #[test]
    fn test_label_round_trip_names() {
        for label in GestureLabel::ALL {
            assert_eq!(GestureLabel::parse(label.as_str()), Some(label));
        }
        assert_eq!(GestureLabel::parse("THUMBS_UP"), Some(GestureLabel::ThumbsUp));
        assert_eq!(GestureLabel::parse("OK"), Some(GestureLabel::Ok));
        assert_eq!(GestureLabel::parse("wave"), None);
    }

    #[test]
    fn test_ok_detection() {
        assert!(OkClassifier::new(OK_DISTANCE).detect(&ok_pose()));
    }

    #[test]
    fn test_ok_threshold_boundary() {
        let eps = 1e-3;
        let classifier = OkClassifier::new(OK_DISTANCE);

        let mut pose = ok_pose();
        let thumb = pose.get(HandLandmark::ThumbTip);
        pose.set(
            HandLandmark::IndexTip,
            Landmark::new(thumb.x + OK_DISTANCE - eps, thumb.y, 0.0),
        );
        assert!(classifier.detect(&pose), "just inside threshold should match");

        pose.set(
            HandLandmark::IndexTip,
            Landmark::new(thumb.x + OK_DISTANCE + eps, thumb.y, 0.0),
        );
        assert!(!classifier.detect(&pose), "just outside threshold must not match");

        pose.set(
            HandLandmark::IndexTip,
            Landmark::new(thumb.x + 0.3, thumb.y, 0.0),
        );
        assert!(!classifier.detect(&pose));
    }

    #[test]
    fn test_ok_rejects_partial_extension() {
        let classifier = OkClassifier::new(OK_DISTANCE);
        // Exactly one of middle/ring/pinky extended, thumb and index apart
        for i in 1..4 {
            let mut extended = [false; 4];
            extended[i] = true;
            let pose = upright_hand(extended, true);
            assert!(!classifier.detect(&pose), "finger {} alone matched OK", i);
        }
    }

    #[test]
    fn test_ok_requires_all_three_extended_even_when_pinching() {
        let classifier = OkClassifier::new(OK_DISTANCE);
        let mut pose = ok_pose();
        // Curl the ring finger
        let ring_pip = pose.get(HandLandmark::RingPip);
        pose.set(
            HandLandmark::RingTip,
            Landmark::new(ring_pip.x, ring_pip.y + 0.12, 0.0),
        );
        assert!(!classifier.detect(&pose));
    }

    #[test]
    fn test_ok_degenerate_pose() {
        // Every landmark coincident: pinch distance is zero but nothing is extended
        let pose = degenerate_pose(0.5, 0.5);
        assert!(!OkClassifier::new(OK_DISTANCE).detect(&pose));
    }

    #[test]
    fn test_thumbs_up_detection() {
        assert!(ThumbsUpClassifier::new(0.02).detect(&thumbs_up_pose()));
    }

    #[test]
    fn test_thumbs_up_rejects_sideways_thumb() {
        let pose = thumb_sideways_pose();
        assert!(!ThumbsUpClassifier::new(0.02).detect(&pose));
        // Even with no rise requirement the horizontal travel dominates
        assert!(!ThumbsUpClassifier::new(0.0).detect(&pose));
    }

    #[test]
    fn test_thumbs_up_rejects_thumb_down() {
        let mut pose = thumbs_up_pose();
        let mcp = pose.get(HandLandmark::ThumbMcp);
        pose.set(HandLandmark::ThumbIp, Landmark::new(mcp.x, mcp.y + 0.08, 0.0));
        pose.set(HandLandmark::ThumbTip, Landmark::new(mcp.x, mcp.y + 0.16, 0.0));
        assert!(!ThumbsUpClassifier::new(0.02).detect(&pose));
    }

    #[test]
    fn test_thumbs_up_requires_curled_fingers() {
        let mut pose = thumbs_up_pose();
        // Straighten the index finger away from the wrist
        let pip = pose.get(HandLandmark::IndexPip);
        pose.set(HandLandmark::IndexTip, Landmark::new(pip.x - 0.08, pip.y, 0.0));
        assert!(!ThumbsUpClassifier::new(0.02).detect(&pose));
    }

    #[test]
    fn test_thumbs_up_min_rise_is_tunable() {
        let pose = thumbs_up_pose();
        assert!(ThumbsUpClassifier::new(0.1).detect(&pose));
        assert!(!ThumbsUpClassifier::new(0.5).detect(&pose));
    }

    #[test]
    fn test_thumbs_up_degenerate_pose() {
        assert!(!ThumbsUpClassifier::new(0.0).detect(&degenerate_pose(0.3, 0.3)));
    }

    #[test]
    fn test_finger_patterns() {
        use FingerPattern as P;
        let open = upright_hand([true; 4], true);
        let fist = upright_hand([false; 4], false);
        let peace = upright_hand([true, true, false, false], false);
        let point = upright_hand([true, false, false, false], false);
        let rock = upright_hand([true, false, false, true], false);

        assert!(P::open_hand().detect(&open));
        assert!(P::fist().detect(&fist));
        assert!(P::peace_sign().detect(&peace));
        assert!(P::pointing().detect(&point));
        assert!(P::rock_on().detect(&rock));

        assert!(!P::fist().detect(&open));
        assert!(!P::open_hand().detect(&fist));
        assert!(!P::peace_sign().detect(&point));
        assert!(!P::pointing().detect(&peace));
        assert!(!P::rock_on().detect(&peace));
    }

    #[test]
    fn test_fist_requires_folded_thumb() {
        let pose = upright_hand([false; 4], true);
        assert!(!FingerPattern::fist().detect(&pose));
    }

    #[test]
    fn test_patterns_reject_degenerate_pose() {
        let pose = degenerate_pose(0.5, 0.5);
        for pattern in [
            FingerPattern::peace_sign(),
            FingerPattern::fist(),
            FingerPattern::open_hand(),
            FingerPattern::pointing(),
            FingerPattern::rock_on(),
        ] {
            assert!(!pattern.detect(&pose), "{:?} matched degenerate pose", pattern);
        }
    }

    #[test]
    fn test_extended_count() {
        assert_eq!(extended_count(&upright_hand([true; 4], true)), 5);
        assert_eq!(extended_count(&upright_hand([true; 4], false)), 4);
        assert_eq!(extended_count(&upright_hand([true, true, false, false], false)), 2);
        assert_eq!(extended_count(&upright_hand([false; 4], false)), 0);
        assert_eq!(extended_count(&degenerate_pose(0.5, 0.5)), 0);
    }

    #[test]
    fn test_closure_classifier() {
        let always = |_: &HandPose| true;
        assert!(always.detect(&HandPose::new()));
    }
}
