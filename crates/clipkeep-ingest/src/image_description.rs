//! §4.E.1: an async, off-write-path task that classifies a pasted image and
//! writes a short textual description back so the image becomes searchable
//! by content rather than only by its (empty) default description.

use std::sync::Arc;

use clipkeep_core::ItemId;
use clipkeep_index::TrigramIndex;
use clipkeep_store::PrimaryStore;

use crate::config::ClassificationThresholds;

/// The image classifier is an external collaborator (§6.2) — on-device
/// vision models, a remote API, whatever the embedding application wires
/// up. This crate only depends on the trait.
pub trait ImageClassifier: Send + Sync {
    /// Returns `(label, confidence)` pairs in no particular order.
    fn classify(&self, image_bytes: &[u8]) -> Vec<(String, f32)>;
}

/// Used when no classifier is configured; every image gets the generic
/// `"Image"` description (§4.E.1's failure-path wording).
#[derive(Debug, Default)]
pub struct NullImageClassifier;

impl ImageClassifier for NullImageClassifier {
    fn classify(&self, _image_bytes: &[u8]) -> Vec<(String, f32)> {
        Vec::new()
    }
}

pub fn spawn_description_task(
    store: Arc<PrimaryStore>,
    index: Arc<TrigramIndex>,
    classifier: Arc<dyn ImageClassifier>,
    thresholds: ClassificationThresholds,
    item_id: ItemId,
    image_bytes: Vec<u8>,
) {
    tokio::spawn(async move {
        let description = describe(classifier.as_ref(), &image_bytes, thresholds);
        if let Err(e) = apply_description(&store, &index, item_id, &description) {
            tracing::warn!(item_id = item_id.0, error = %e, "failed to store image description");
        }
    });
}

fn describe(classifier: &dyn ImageClassifier, image_bytes: &[u8], thresholds: ClassificationThresholds) -> String {
    let mut labels: Vec<(String, f32)> = classifier
        .classify(image_bytes)
        .into_iter()
        .filter(|(_, confidence)| *confidence >= thresholds.min_label_confidence)
        .collect();
    labels.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    labels.truncate(thresholds.max_labels);

    if labels.is_empty() {
        "Image".to_string()
    } else {
        let names: Vec<&str> = labels.iter().map(|(name, _)| name.as_str()).collect();
        format!("Image: {}", names.join(", "))
    }
}

fn apply_description(
    store: &PrimaryStore,
    index: &TrigramIndex,
    item_id: ItemId,
    description: &str,
) -> clipkeep_error::Result<()> {
    store.update_image_description(item_id, description)?;
    if let Some(item) = store.get(item_id)? {
        index.build_with_timestamp(item_id.0, &item.searchable_text(), item.timestamp)?;
        index.commit()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier(Vec<(String, f32)>);
    impl ImageClassifier for FixedClassifier {
        fn classify(&self, _image_bytes: &[u8]) -> Vec<(String, f32)> {
            self.0.clone()
        }
    }

    #[test]
    fn low_confidence_labels_are_dropped() {
        let classifier = FixedClassifier(vec![("blurry guess".into(), 0.1)]);
        assert_eq!(describe(&classifier, &[], ClassificationThresholds::default()), "Image");
    }

    #[test]
    fn keeps_at_most_three_labels_highest_confidence_first() {
        let classifier = FixedClassifier(vec![
            ("cat".into(), 0.9),
            ("dog".into(), 0.8),
            ("tree".into(), 0.7),
            ("sky".into(), 0.6),
        ]);
        assert_eq!(
            describe(&classifier, &[], ClassificationThresholds::default()),
            "Image: cat, dog, tree"
        );
    }

    #[test]
    fn null_classifier_always_falls_back_to_generic_description() {
        assert_eq!(describe(&NullImageClassifier, &[], ClassificationThresholds::default()), "Image");
    }

    #[test]
    fn custom_thresholds_allow_more_labels_and_lower_confidence() {
        let classifier = FixedClassifier(vec![("a".into(), 0.2), ("b".into(), 0.2), ("c".into(), 0.2), ("d".into(), 0.2)]);
        let thresholds = ClassificationThresholds {
            min_label_confidence: 0.1,
            max_labels: 4,
        };
        assert_eq!(describe(&classifier, &[], thresholds), "Image: a, b, c, d");
    }
}
