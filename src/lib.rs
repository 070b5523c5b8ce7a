//! Index to OpenAPI - OpenAPI documentation from annotated JAX-RS programs.
//!
//! The library reads a read-only symbol index (classes, fields, methods and constructors with
//! their annotations and generic signatures) and produces an OpenAPI 3.0 document. No program
//! code is executed; everything is derived from declared metadata.
//!
//! # Supported Annotations
//!
//! - **JAX-RS** in the `javax.ws.rs` and `jakarta.ws.rs` namespaces: `@Path`, HTTP method
//!   annotations, `@*Param`, `@BeanParam`, `@DefaultValue`, `@Consumes`/`@Produces`
//! - **MicroProfile OpenAPI**: `@Operation`, `@Parameter(s)`, `@Schema`, `@APIResponse(s)`, `@Tag`
//!
//! # Architecture
//!
//! 1. [`scanner`] and [`loader`] - find index files and load them into a [`index::SymbolIndex`]
//! 2. [`detector`] - detects which JAX-RS namespaces the index uses
//! 3. [`type_resolver`] - binds generic type variables along inheritance chains
//! 4. [`extractor`] - discovers resources and canonical operation declarations
//! 5. [`bean_params`] - expands `@BeanParam` objects into leaf parameter sources
//! 6. [`param_resolver`] - merges parameter sources by precedence
//! 7. [`schema_generator`] - converts types to OpenAPI schemas
//! 8. [`operation_id`] - assigns unique operation identifiers
//! 9. [`openapi_builder`] - constructs and validates the document
//! 10. [`serializer`] - serializes the document to YAML or JSON
//!
//! [`scan`] wires steps 2 to 9 together.
//!
//! # Example Usage
//!
//! ```no_run
//! use index_to_openapi::{
//!     config::ScanConfig, loader::IndexLoader, scan::AnnotationScanner, serializer::serialize_yaml,
//! };
//! use std::path::Path;
//!
//! let loaded = IndexLoader::load_file(Path::new("build/symbols.yaml")).unwrap();
//! let index = IndexLoader::into_index(vec![loaded]);
//!
//! let output = AnnotationScanner::new(ScanConfig::default()).scan(&index).unwrap();
//! for diagnostic in &output.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! println!("{}", serialize_yaml(&output.document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotations;
pub mod bean_params;
pub mod cli;
pub mod config;
pub mod context;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod index;
pub mod loader;
pub mod openapi_builder;
pub mod operation_id;
pub mod param_resolver;
pub mod scan;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_resolver;
