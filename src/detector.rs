use crate::annotations::Namespace;
use crate::index::SymbolIndex;
use log::debug;
use std::collections::BTreeSet;

/// Framework namespace detector.
///
/// The `NamespaceDetector` looks at every annotation in the index (class, field, method and
/// argument level) to find out which JAX-RS namespaces the indexed program uses.
///
/// Currently supports detection of:
/// - `javax.ws.rs`
/// - `jakarta.ws.rs`
pub struct NamespaceDetector;

/// Result of namespace detection.
pub struct DetectionResult {
    /// Detected namespaces, in a stable order
    pub namespaces: Vec<Namespace>,
}

impl NamespaceDetector {
    /// Detects the JAX-RS namespaces used in the index.
    ///
    /// Both namespaces are reported when the program mixes them.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use index_to_openapi::detector::NamespaceDetector;
    /// use index_to_openapi::index::SymbolIndex;
    ///
    /// let index = SymbolIndex::new(vec![]);
    /// let result = NamespaceDetector::detect(&index);
    /// println!("Detected {} namespace(s)", result.namespaces.len());
    /// ```
    pub fn detect(index: &SymbolIndex) -> DetectionResult {
        debug!("Detecting framework namespaces in {} classes", index.len());

        let mut detected = BTreeSet::new();
        for class in index.classes() {
            for annotation in class.all_annotations() {
                if let Some(namespace) = Self::namespace_of(&annotation.name) {
                    detected.insert(namespace);
                }
            }
        }

        let namespaces: Vec<Namespace> = detected.into_iter().collect();
        debug!("Detected namespaces: {:?}", namespaces);

        DetectionResult { namespaces }
    }

    fn namespace_of(annotation: &str) -> Option<Namespace> {
        [Namespace::Javax, Namespace::Jakarta]
            .into_iter()
            .find(|ns| annotation.starts_with(ns.prefix()))
    }
}
