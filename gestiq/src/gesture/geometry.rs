//! Distance and relative-position primitives over landmarks.

use super::landmark::Landmark;

/// Planar Euclidean distance between two landmarks in normalized image units.
pub fn distance(a: &Landmark, b: &Landmark) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Euclidean distance including the relative depth axis.
pub fn distance_3d(a: &Landmark, b: &Landmark) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Whether a finger is straight: its tip lies farther from `anchor` than its
/// PIP joint does.
///
/// Comparing distances to the wrist rather than raw y coordinates keeps the
/// test valid for tilted and sideways hands.  Coincident points are never
/// extended, and NaN input compares false.
pub fn is_extended(tip: &Landmark, pip: &Landmark, anchor: &Landmark) -> bool {
    distance(tip, anchor) > distance(pip, anchor) + f32::EPSILON
}

/// Whether a finger is folded back toward `anchor`.
///
/// Not simply `!is_extended`: both are false for a degenerate finger whose
/// joints coincide.
pub fn is_curled(tip: &Landmark, pip: &Landmark, anchor: &Landmark) -> bool {
    distance(tip, anchor) + f32::EPSILON < distance(pip, anchor)
}

/// Upward rise from `from` to `to` (image y grows downward).
pub fn rise(from: &Landmark, to: &Landmark) -> f32 {
    from.y - to.y
}
