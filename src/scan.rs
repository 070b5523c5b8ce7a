//! Top-level scan pipeline: symbol index in, OpenAPI document and diagnostics out.
//!
//! The pipeline runs single-threaded over one immutable index:
//!
//! 1. pick the JAX-RS namespaces (configured, or detected from the index)
//! 2. discover resource operations
//! 3. resolve and merge each operation's parameters
//! 4. assign operation identifiers under the duplicate policy
//! 5. assemble the document and validate its references
//!
//! Fatal conditions abort the scan; no partial document is returned.

use crate::annotations::{Namespace, Vocabulary};
use crate::config::ScanConfig;
use crate::context::{Diagnostic, ScanContext};
use crate::detector::NamespaceDetector;
use crate::error::{Error, Result};
use crate::extractor::jaxrs::JaxRsExtractor;
use crate::extractor::RouteExtractor;
use crate::index::SymbolIndex;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::operation_id::assign_operation_id;
use crate::param_resolver::ParameterResolver;
use crate::schema_generator::SchemaGenerator;
use crate::type_resolver::TypeResolver;
use log::{debug, info};

/// Outcome of a successful scan
#[derive(Debug)]
pub struct ScanOutput {
    pub document: OpenApiDocument,
    /// Non-fatal findings in discovery order
    pub diagnostics: Vec<Diagnostic>,
}

/// Drives one scan of a symbol index
pub struct AnnotationScanner {
    config: ScanConfig,
    namespaces: Option<Vec<Namespace>>,
    info: Option<(String, String, Option<String>)>,
}

impl AnnotationScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            namespaces: None,
            info: None,
        }
    }

    /// Honour exactly these namespaces instead of detecting them
    pub fn with_namespaces(mut self, namespaces: Vec<Namespace>) -> Self {
        self.namespaces = Some(namespaces);
        self
    }

    /// Title, version and description written to the document's info section
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Some((title, version, description));
        self
    }

    pub fn scan(&self, index: &SymbolIndex) -> Result<ScanOutput> {
        let namespaces = match &self.namespaces {
            Some(namespaces) if !namespaces.is_empty() => {
                info!("Using configured namespaces: {:?}", namespaces);
                namespaces.clone()
            }
            _ => {
                let detected = NamespaceDetector::detect(index).namespaces;
                if detected.is_empty() {
                    return Err(Error::FrameworkNotDetected);
                }
                info!("Detected namespaces: {:?}", detected);
                detected
            }
        };

        let vocabulary = Vocabulary::new(namespaces);
        let resolver = TypeResolver::new(index, vocabulary.clone());
        let mut schemas = SchemaGenerator::new(&resolver, self.config.default_enum_schema_fallback);
        let mut context = ScanContext::new(self.config.clone());

        let operations = JaxRsExtractor::new(&vocabulary).extract_routes(&resolver);
        let parameters = ParameterResolver::new(&resolver);

        let mut builder =
            OpenApiBuilder::new().with_component_parameters(parameters.component_parameters(&mut schemas));
        if let Some((title, version, description)) = self.info.clone() {
            builder = builder.with_info(title, version, description);
        }

        let mut documented = 0;
        for mut operation in operations {
            parameters.resolve(&mut operation, &mut schemas, &mut context);
            if !assign_operation_id(&mut operation, &mut context)? {
                continue;
            }
            debug!(
                "Documenting {} with {} parameters",
                operation.describe(),
                operation.parameters.len()
            );
            builder.add_operation(&operation, &mut schemas);
            documented += 1;
        }

        let document = builder.build(schemas)?;
        let diagnostics = context.into_diagnostics();
        info!(
            "Documented {} operations, {} component schemas, {} diagnostics",
            documented,
            document.components.as_ref().map(|c| c.schemas.len()).unwrap_or(0),
            diagnostics.len()
        );

        Ok(ScanOutput { document, diagnostics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DiagnosticKind;
    use crate::extractor::HttpMethod;
    use crate::index::ClassInfo;

    fn index_from_yaml(yaml: &str) -> SymbolIndex {
        let classes: Vec<ClassInfo> = serde_yaml::from_str(yaml).unwrap();
        SymbolIndex::new(classes)
    }

    const USERS: &str = r#"
- name: a.Users
  annotations: [{ name: javax.ws.rs.Path, values: { value: /users } }]
  methods:
    - name: list
      return_type: void
      annotations: [{ name: javax.ws.rs.GET }]
      params:
        - name: page
          type: int
          annotations: [{ name: javax.ws.rs.QueryParam, values: { value: page } }]
    - name: all
      return_type: void
      annotations: [{ name: javax.ws.rs.GET }, { name: javax.ws.rs.Path, values: { value: "" } }]
"#;

    #[test]
    fn test_no_framework_detected() {
        let index = index_from_yaml("- name: a.Plain");

        let result = AnnotationScanner::new(ScanConfig::default()).scan(&index);

        assert_eq!(result.unwrap_err(), Error::FrameworkNotDetected);
    }

    #[test]
    fn test_configured_namespace_must_match() {
        let index = index_from_yaml(USERS);

        let output = AnnotationScanner::new(ScanConfig::default())
            .with_namespaces(vec![Namespace::Jakarta])
            .scan(&index)
            .unwrap();

        assert!(output.document.paths.is_empty());
    }

    #[test]
    fn test_duplicate_operation_fails_the_scan() {
        let index = index_from_yaml(USERS);

        let err = AnnotationScanner::new(ScanConfig::default()).scan(&index).unwrap_err();

        assert!(err.to_string().starts_with("OAPI07950: Duplicate operationId: getUsers"));
    }

    #[test]
    fn test_permissive_scan_merges_operations_on_one_route() {
        let index = index_from_yaml(USERS);
        let config = ScanConfig::default()
            .with_duplicate_policy(crate::config::DuplicateOperationIdPolicy::Permissive);

        let output = AnnotationScanner::new(config)
            .with_info("Users".to_string(), "2.1".to_string(), None)
            .scan(&index)
            .unwrap();

        let operation = output.document.operation("/users", HttpMethod::Get).unwrap();
        assert_eq!(operation.operation_id.as_deref(), Some("getUsers"));
        assert_eq!(operation.parameters.len(), 1);
        assert_eq!(output.document.info.title, "Users");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::DuplicateOperation);
    }
}
