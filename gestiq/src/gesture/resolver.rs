//! Ordered classifier registry and first-match gesture resolution.

use tracing::debug;

use super::classifier::{extended_count, FingerPattern, GestureClassifier, GestureLabel, OkClassifier, ThumbsUpClassifier};
use super::landmark::HandPose;

/// Classifier sensitivity parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Maximum thumb-to-index tip distance for OK (normalized units).
    pub ok_distance: f32,
    /// Minimum thumb MCP-to-tip rise for thumbs-up (normalized units).
    pub thumb_min_rise: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ok_distance: 0.05,
            thumb_min_rise: 0.02,
        }
    }
}

/// Build the stock classifier for a label.
pub fn standard_classifier(label: GestureLabel, thresholds: &Thresholds) -> Box<dyn GestureClassifier> {
    match label {
        GestureLabel::Ok => Box::new(OkClassifier::new(thresholds.ok_distance)),
        GestureLabel::ThumbsUp => Box::new(ThumbsUpClassifier::new(thresholds.thumb_min_rise)),
        GestureLabel::PeaceSign => Box::new(FingerPattern::peace_sign()),
        GestureLabel::Fist => Box::new(FingerPattern::fist()),
        GestureLabel::OpenHand => Box::new(FingerPattern::open_hand()),
        GestureLabel::Pointing => Box::new(FingerPattern::pointing()),
        GestureLabel::RockOn => Box::new(FingerPattern::rock_on()),
    }
}

/// Ordered (label, classifier) pairs.  Declaration order is the tie-break.
#[derive(Default)]
pub struct ClassifierRegistry {
    entries: Vec<(GestureLabel, Box<dyn GestureClassifier>)>,
}

impl ClassifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock classifiers for `labels`, in the order given.
    pub fn standard(labels: &[GestureLabel], thresholds: &Thresholds) -> Self {
        let mut registry = Self::new();
        for &label in labels {
            registry.register(label, standard_classifier(label, thresholds));
        }
        registry
    }

    /// Append a classifier.  Re-registering a label replaces its classifier
    /// but keeps its original position.
    pub fn register(&mut self, label: GestureLabel, classifier: Box<dyn GestureClassifier>) -> &mut Self {
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = classifier,
            None => self.entries.push((label, classifier)),
        }
        self
    }

    /// Labels in resolution order.
    pub fn labels(&self) -> impl Iterator<Item = GestureLabel> + '_ {
        self.entries.iter().map(|(l, _)| *l)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ClassifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.labels()).finish()
    }
}

/// Label of the first classifier that matches `pose`, or `None`.
///
/// Poses containing non-finite coordinates never match.
pub fn resolve(pose: &HandPose, registry: &ClassifierRegistry) -> Option<GestureLabel> {
    if !pose.is_finite() {
        debug!("Discarding pose with non-finite landmarks");
        return None;
    }
    let label = registry
        .entries
        .iter()
        .find(|(_, classifier)| classifier.detect(pose))
        .map(|(label, _)| *label);
    if label.is_none() {
        debug!("No gesture matched ({} digits extended)", extended_count(pose));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::fixtures::*;
    use crate::gesture::landmark::{HandLandmark, Landmark};

    fn default_registry() -> ClassifierRegistry {
        ClassifierRegistry::standard(&GestureLabel::ALL, &Thresholds::default())
    }

    #[test]
    fn test_resolve_ok() {
        assert_eq!(resolve(&ok_pose(), &default_registry()), Some(GestureLabel::Ok));
    }

    #[test]
    fn test_resolve_thumbs_up() {
        assert_eq!(
            resolve(&thumbs_up_pose(), &default_registry()),
            Some(GestureLabel::ThumbsUp)
        );
    }

    #[test]
    fn test_resolve_no_match() {
        let registry = ClassifierRegistry::standard(
            &[GestureLabel::Ok, GestureLabel::ThumbsUp],
            &Thresholds::default(),
        );
        assert_eq!(resolve(&thumb_sideways_pose(), &registry), None);
        assert_eq!(resolve(&upright_hand([true; 4], true), &registry), None);
        assert_eq!(resolve(&degenerate_pose(0.5, 0.5), &default_registry()), None);
    }

    #[test]
    fn test_resolve_expansion_gestures() {
        let registry = default_registry();
        assert_eq!(
            resolve(&upright_hand([true, true, false, false], false), &registry),
            Some(GestureLabel::PeaceSign)
        );
        assert_eq!(
            resolve(&upright_hand([false; 4], false), &registry),
            Some(GestureLabel::Fist)
        );
        assert_eq!(
            resolve(&upright_hand([true; 4], true), &registry),
            Some(GestureLabel::OpenHand)
        );
        assert_eq!(
            resolve(&upright_hand([true, false, false, false], false), &registry),
            Some(GestureLabel::Pointing)
        );
        assert_eq!(
            resolve(&upright_hand([true, false, false, true], false), &registry),
            Some(GestureLabel::RockOn)
        );
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        let mut first = ClassifierRegistry::new();
        first
            .register(GestureLabel::Fist, Box::new(|_: &HandPose| true))
            .register(GestureLabel::Ok, Box::new(|_: &HandPose| true));
        assert_eq!(resolve(&HandPose::new(), &first), Some(GestureLabel::Fist));

        let mut second = ClassifierRegistry::new();
        second
            .register(GestureLabel::Ok, Box::new(|_: &HandPose| true))
            .register(GestureLabel::Fist, Box::new(|_: &HandPose| true));
        assert_eq!(resolve(&HandPose::new(), &second), Some(GestureLabel::Ok));
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = ClassifierRegistry::new();
        registry
            .register(GestureLabel::Ok, Box::new(|_: &HandPose| false))
            .register(GestureLabel::Fist, Box::new(|_: &HandPose| true))
            .register(GestureLabel::Ok, Box::new(|_: &HandPose| true));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.labels().collect::<Vec<_>>(),
            vec![GestureLabel::Ok, GestureLabel::Fist]
        );
        assert_eq!(resolve(&HandPose::new(), &registry), Some(GestureLabel::Ok));
    }

    #[test]
    fn test_non_finite_pose_never_matches() {
        let mut registry = ClassifierRegistry::new();
        registry.register(GestureLabel::Ok, Box::new(|_: &HandPose| true));
        let mut pose = ok_pose();
        pose.set(HandLandmark::Wrist, Landmark::new(f32::INFINITY, 0.5, 0.0));
        assert_eq!(resolve(&pose, &registry), None);
    }

    #[test]
    fn test_thresholds_flow_into_classifiers() {
        let strict = Thresholds {
            ok_distance: 0.005,
            ..Thresholds::default()
        };
        let registry = ClassifierRegistry::standard(&[GestureLabel::Ok], &strict);
        assert_eq!(resolve(&ok_pose(), &registry), None);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ClassifierRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(resolve(&ok_pose(), &registry), None);
    }

    #[test]
    fn test_registry_debug_lists_labels() {
        let registry = ClassifierRegistry::standard(
            &[GestureLabel::Ok, GestureLabel::ThumbsUp],
            &Thresholds::default(),
        );
        assert_eq!(format!("{:?}", registry), "[Ok, ThumbsUp]");
    }
}
