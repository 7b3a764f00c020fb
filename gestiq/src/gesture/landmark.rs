//! Hand landmark data structures.
//!
//! Models the 21 keypoints per hand produced by MediaPipe-style hand
//! landmark detectors.  Coordinates are normalized to the image: x grows
//! to the right, y grows downward, z is relative depth.

// ── Landmark identities ────────────────────────────────────

/// The 21 hand landmarks, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Every landmark in index order.
    pub const ALL: [HandLandmark; LANDMARK_COUNT] = [
        Self::Wrist,
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexMcp,
        Self::IndexPip,
        Self::IndexDip,
        Self::IndexTip,
        Self::MiddleMcp,
        Self::MiddlePip,
        Self::MiddleDip,
        Self::MiddleTip,
        Self::RingMcp,
        Self::RingPip,
        Self::RingDip,
        Self::RingTip,
        Self::PinkyMcp,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
    ];

    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for logs and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }
}

// ── Fingers ────────────────────────────────────────────────

/// The four non-thumb fingers, each described by its tip and PIP joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    pub fn tip(&self) -> HandLandmark {
        match self {
            Self::Index => HandLandmark::IndexTip,
            Self::Middle => HandLandmark::MiddleTip,
            Self::Ring => HandLandmark::RingTip,
            Self::Pinky => HandLandmark::PinkyTip,
        }
    }

    pub fn pip(&self) -> HandLandmark {
        match self {
            Self::Index => HandLandmark::IndexPip,
            Self::Middle => HandLandmark::MiddlePip,
            Self::Ring => HandLandmark::RingPip,
            Self::Pinky => HandLandmark::PinkyPip,
        }
    }
}

// ── Handedness ─────────────────────────────────────────────

/// Which hand, as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parse the detector's label ("Left"/"Right", any case).
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else {
            None
        }
    }
}

// ── Landmark ───────────────────────────────────────────────

/// One normalized keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ── Hand pose ──────────────────────────────────────────────

/// All 21 landmarks of one detected hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HandPose {
    /// Landmarks indexed by `HandLandmark`.
    pub landmarks: [Landmark; LANDMARK_COUNT],
    /// Detector hand presence score (0.0-1.0), 1.0 when not reported.
    pub score: f32,
    /// Handedness if the detector reported it.
    pub handedness: Option<Handedness>,
}

impl HandPose {
    /// Create a pose with every landmark at the origin.
    pub fn new() -> Self {
        Self::from_landmarks([Landmark::default(); LANDMARK_COUNT])
    }

    pub fn from_landmarks(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self {
            landmarks,
            score: 1.0,
            handedness: None,
        }
    }

    /// Build a pose from a detector slice; `None` unless it has exactly 21 points.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self::from_landmarks(landmarks))
    }

    pub fn get(&self, landmark: HandLandmark) -> Landmark {
        self.landmarks[landmark.index()]
    }

    pub fn set(&mut self, landmark: HandLandmark, point: Landmark) {
        self.landmarks[landmark.index()] = point;
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.landmarks.iter().all(Landmark::is_finite)
    }

    /// First landmark with a NaN or infinite coordinate.
    pub fn first_non_finite(&self) -> Option<HandLandmark> {
        HandLandmark::ALL
            .into_iter()
            .find(|&landmark| !self.get(landmark).is_finite())
    }
}

impl Default for HandPose {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_count() {
        assert_eq!(HandLandmark::Wrist.index(), 0);
        assert_eq!(HandLandmark::ThumbTip.index(), 4);
        assert_eq!(HandLandmark::IndexTip.index(), 8);
        assert_eq!(HandLandmark::MiddleTip.index(), 12);
        assert_eq!(HandLandmark::RingTip.index(), 16);
        assert_eq!(HandLandmark::PinkyTip.index(), 20);
        assert_eq!(LANDMARK_COUNT, 21);
    }

    #[test]
    fn test_finger_joints() {
        assert_eq!(Finger::Index.tip(), HandLandmark::IndexTip);
        assert_eq!(Finger::Pinky.pip(), HandLandmark::PinkyPip);
        assert_eq!(Finger::Middle.pip().index(), 10);
    }

    #[test]
    fn test_from_slice_wrong_count() {
        let points = vec![Landmark::default(); 20];
        assert!(HandPose::from_slice(&points).is_none());

        let points = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        let pose = HandPose::from_slice(&points).unwrap();
        assert_eq!(pose.get(HandLandmark::PinkyTip), Landmark::new(0.5, 0.5, 0.0));
        assert_eq!(pose.score, 1.0);
    }

    #[test]
    fn test_non_finite_pose() {
        let mut pose = HandPose::new();
        assert!(pose.is_finite());
        pose.set(HandLandmark::RingDip, Landmark::new(f32::NAN, 0.1, 0.0));
        assert!(!pose.is_finite());
        assert_eq!(pose.first_non_finite(), Some(HandLandmark::RingDip));
    }

    #[test]
    fn test_all_is_in_index_order() {
        for (i, landmark) in HandLandmark::ALL.iter().enumerate() {
            assert_eq!(landmark.index(), i, "{} out of place", landmark.as_str());
        }
        assert_eq!(HandPose::new().first_non_finite(), None);
    }

    #[test]
    fn test_handedness_parse() {
        assert_eq!(Handedness::parse("Left"), Some(Handedness::Left));
        assert_eq!(Handedness::parse("RIGHT"), Some(Handedness::Right));
        assert_eq!(Handedness::parse("both"), None);
        assert_eq!(Handedness::Right.as_str(), "right");
    }

    #[test]
    fn test_landmark_as_str() {
        assert_eq!(HandLandmark::Wrist.as_str(), "wrist");
        assert_eq!(HandLandmark::ThumbTip.as_str(), "thumb-tip");
        assert_eq!(HandLandmark::PinkyTip.as_str(), "pinky-tip");
    }
}
