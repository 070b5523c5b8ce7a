//! Serialization module for converting OpenAPI documents to YAML or JSON format.
//!
//! This module provides functions to serialize OpenAPI documents into standard formats
//! and write them to files or return them as strings.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an OpenAPI document to YAML format.
///
/// Component schemas and paths come out in key order, so repeated scans of the same index
/// produce byte-identical output.
///
/// # Example
///
/// ```no_run
/// use index_to_openapi::config::ScanConfig;
/// use index_to_openapi::index::SymbolIndex;
/// use index_to_openapi::scan::AnnotationScanner;
/// use index_to_openapi::serializer::serialize_yaml;
///
/// let index = SymbolIndex::new(vec![]);
/// let output = AnnotationScanner::new(ScanConfig::default()).scan(&index).unwrap();
/// println!("{}", serialize_yaml(&output.document).unwrap());
/// ```
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc)
        .context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to pretty-printed JSON.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc)
        .context("Failed to serialize OpenAPI document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Namespace, Vocabulary};
    use crate::extractor::{CanonicalMethod, HttpMethod, PathTemplate, ResourceOperation};
    use crate::index::{ClassInfo, SymbolIndex};
    use crate::openapi_builder::{Info, OpenApiBuilder, OpenApiDocument};
    use crate::schema_generator::SchemaGenerator;
    use crate::type_resolver::TypeResolver;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    /// Helper function to create a minimal OpenAPI document for testing
    fn create_test_document() -> OpenApiDocument {
        OpenApiDocument {
            openapi: "3.0.3".to_string(),
            info: Info {
                title: "Test API".to_string(),
                version: "1.0.0".to_string(),
                description: Some("A test API".to_string()),
            },
            paths: BTreeMap::new(),
            components: None,
        }
    }

    /// Document with one `GET /users/{id}` operation returning a component schema
    fn create_user_document() -> OpenApiDocument {
        let classes: Vec<ClassInfo> =
            serde_yaml::from_str("- name: a.User\n  fields: [{ name: name, type: java.lang.String }]").unwrap();
        let index = SymbolIndex::new(classes);
        let resolver = TypeResolver::new(&index, Vocabulary::new(vec![Namespace::Jakarta]));
        let mut schema_gen = SchemaGenerator::new(&resolver, true);

        let operation = ResourceOperation {
            resource: "a.Users".to_string(),
            method: HttpMethod::Get,
            path: PathTemplate::parse("/users", Some("{id}")),
            consumes: vec![],
            produces: vec![],
            declaration: CanonicalMethod {
                declaring_class: "a.Users".to_string(),
                name: "find".to_string(),
                params: vec![],
                return_type: Some("a.User".parse().unwrap()),
                annotations: vec![],
                inherited_from: vec![],
            },
            summary: None,
            description: None,
            tags: vec![],
            deprecated: false,
            parameters: vec![],
            request_body: None,
            operation_id: Some("getUsersById".to_string()),
            diagnostics: vec![],
        };

        let mut builder = OpenApiBuilder::new();
        builder.add_operation(&operation, &mut schema_gen);
        builder.build(schema_gen).unwrap()
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("openapi: 3.0.3"));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("description: A test API"));
        assert!(yaml.contains("paths: {}"));
        assert!(!yaml.contains("components"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["openapi"], "3.0.3");
        assert_eq!(parsed["info"]["title"], "Test API");
        assert!(json.contains('\n'), "JSON output should be pretty printed");
    }

    #[test]
    fn test_serialize_document_with_references() {
        let doc = create_user_document();

        let json = serialize_json(&doc).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let response = &parsed["paths"]["/users/{id}"]["get"]["responses"]["200"];
        assert_eq!(
            response["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/User"
        );
        assert_eq!(parsed["components"]["schemas"]["User"]["properties"]["name"]["type"], "string");
        assert_eq!(parsed["paths"]["/users/{id}"]["get"]["operationId"], "getUsersById");

        let yaml = serialize_yaml(&doc).unwrap();
        assert!(yaml.contains("#/components/schemas/User"));
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let first = serialize_yaml(&create_user_document()).unwrap();
        let second = serialize_yaml(&create_user_document()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("openapi.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("openapi.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_write_json_file_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("openapi.json");

        let doc = create_user_document();
        write_to_file(&serialize_json(&doc).unwrap(), &file_path).unwrap();

        let content = fs::read_to_string(&file_path).unwrap();
        let deserialized: OpenApiDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(deserialized, doc);
    }
}
