use crate::annotations::{openapi, repeated_openapi_annotations};
use crate::error::{Error, Result};
use crate::extractor::{HttpMethod, Parameter, ResourceOperation};
use crate::index::{Annotation, TypeRef};
use crate::schema_generator::{Schema, SchemaGenerator, SCHEMA_REF_PREFIX};
use heck::ToUpperCamelCase;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of every component parameter reference
pub const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

const OPENAPI_VERSION: &str = "3.0.3";
const DEFAULT_RESPONSE_MEDIA_TYPE: &str = "application/json";

/// Asynchronous wrappers documented as the value they complete with
const ASYNC_WRAPPERS: &[&str] = &[
    "java.util.concurrent.CompletionStage",
    "java.util.concurrent.CompletableFuture",
];

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Paths collection (URL path -> PathItem), kept in path order
    paths: BTreeMap<String, PathItem>,
    /// Component parameters declared by the program
    parameters: BTreeMap<String, ParameterObject>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
        }
    }

    /// Operation bound to `method`, if any
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }

    /// All operations of this path item
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        [&self.get, &self.put, &self.post, &self.delete, &self.options, &self.head, &self.patch]
            .into_iter()
            .filter_map(|o| o.as_ref())
    }

    fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        [
            &mut self.get,
            &mut self.put,
            &mut self.post,
            &mut self.delete,
            &mut self.options,
            &mut self.head,
            &mut self.patch,
        ]
        .into_iter()
        .filter_map(|o| o.as_mut())
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters, inline or shared through components
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

/// A parameter written inline or as a reference to a component parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Parameter(ParameterObject),
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterObject {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header, cookie)
    #[serde(rename = "in")]
    pub location: String,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(rename = "allowEmptyValue", skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    /// Parameter schema
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl From<&Parameter> for ParameterObject {
    fn from(parameter: &Parameter) -> Self {
        Self {
            name: parameter.name.clone(),
            location: parameter.location.as_str().to_string(),
            description: parameter.description.clone(),
            required: parameter.required,
            deprecated: parameter.deprecated,
            allow_empty_value: parameter.allow_empty_value,
            style: parameter.style.clone(),
            explode: parameter.explode,
            schema: parameter.schema.clone(),
            example: parameter.example.clone(),
        }
    }
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
    /// Parameters shared by several operations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterObject>,
}

impl Components {
    fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.parameters.is_empty()
    }
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
    /// Components (schemas, shared parameters)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiDocument {
    /// Look up the operation bound to a path and method
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path)?.operation(method)
    }

    /// Every operation of the document, in path order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.values().flat_map(PathItem::operations)
    }

    /// Resolve a parameter reference against the shared component parameters
    pub fn resolve_parameter<'d>(&'d self, parameter: &'d ParameterOrRef) -> Option<&'d ParameterObject> {
        match parameter {
            ParameterOrRef::Parameter(object) => Some(object),
            ParameterOrRef::Reference { reference } => {
                let key = reference.strip_prefix(PARAMETER_REF_PREFIX)?;
                self.components.as_ref()?.parameters.get(key)
            }
        }
    }
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: None,
            },
            paths: BTreeMap::new(),
            parameters: BTreeMap::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Component parameters available to `$ref`s, keyed by component name
    pub fn with_component_parameters(mut self, parameters: BTreeMap<String, Parameter>) -> Self {
        self.parameters = parameters.iter().map(|(key, p)| (key.clone(), p.into())).collect();
        self
    }

    /// Add a resolved operation to the document
    pub fn add_operation(&mut self, operation: &ResourceOperation, schemas: &mut SchemaGenerator<'_, '_>) {
        let path = operation.path.render();
        debug!("Adding operation: {} {}", operation.method.as_str(), path);

        let request_body = operation.request_body.as_ref().map(|body| RequestBody {
            description: body.description.clone(),
            required: body.required,
            content: content(&body.content_types, &body.schema),
        });

        let document_operation = Operation {
            tags: operation.tags.clone(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            operation_id: operation.operation_id.clone(),
            parameters: operation
                .parameters
                .iter()
                .map(|p| match &p.reference {
                    Some(reference) => ParameterOrRef::Reference {
                        reference: parameter_reference(reference),
                    },
                    None => ParameterOrRef::Parameter(p.into()),
                })
                .collect(),
            request_body,
            responses: self.responses(operation, schemas),
            deprecated: operation.deprecated.then_some(true),
        };

        // Add operation to the appropriate path and method
        let slot = self.paths.entry(path).or_default().slot(operation.method);
        match slot {
            Some(existing) => {
                warn!("{} is already bound, merging into the first operation", operation.describe());
                merge_operation(existing, document_operation);
            }
            None => *slot = Some(document_operation),
        }
    }

    /// Responses from `@APIResponse` annotations, else a default success response
    fn responses(&self, operation: &ResourceOperation, schemas: &mut SchemaGenerator<'_, '_>) -> BTreeMap<String, Response> {
        let produces = if operation.produces.is_empty() {
            vec![DEFAULT_RESPONSE_MEDIA_TYPE.to_string()]
        } else {
            operation.produces.clone()
        };
        let returned = self.return_schema(operation, schemas);

        let declared = repeated_openapi_annotations(
            &operation.declaration.annotations,
            openapi::API_RESPONSE,
            openapi::API_RESPONSES,
        );

        let mut responses = BTreeMap::new();
        if declared.is_empty() {
            let (code, description, content) = match &returned {
                Some(schema) => ("200", "OK", Some(content(&produces, schema))),
                None if is_void(operation) => ("204", "No Content", None),
                None => ("200", "OK", None),
            };
            responses.insert(
                code.to_string(),
                Response {
                    description: description.to_string(),
                    content,
                },
            );
            return responses;
        }

        for annotation in declared {
            let code = annotation.text("responseCode").unwrap_or_else(|| "default".to_string());
            let schema = declared_content_schema(annotation, schemas)
                .or_else(|| returned.clone().filter(|_| code.starts_with('2')));
            let response = Response {
                description: annotation.string("description").unwrap_or_default().to_string(),
                content: schema.map(|schema| content(&produces, &schema)),
            };
            responses.insert(code, response);
        }
        responses
    }

    /// Schema of the value an operation returns, `None` for void or opaque responses
    fn return_schema(&self, operation: &ResourceOperation, schemas: &mut SchemaGenerator<'_, '_>) -> Option<Schema> {
        let mut returned = operation.declaration.return_type.clone()?;
        if let TypeRef::Named { name, args } = &returned {
            if ASYNC_WRAPPERS.contains(&name.as_str()) {
                returned = args.first().cloned().unwrap_or_else(TypeRef::object);
            }
        }
        let name = returned.class_name().unwrap_or_default();
        if returned.is_void() || schemas.resolver().vocabulary().is_response_type(name) {
            return None;
        }
        Some(schemas.generate_schema(&returned))
    }

    /// Build the final OpenAPI document
    pub fn build(mut self, schemas: SchemaGenerator<'_, '_>) -> Result<OpenApiDocument> {
        debug!("Building final OpenAPI document");

        let parameters = share_parameters(&mut self.paths, self.parameters);
        let components = Components {
            schemas: schemas.into_schemas(),
            parameters,
        };

        let document = OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            paths: self.paths,
            components: (!components.is_empty()).then_some(components),
        };
        validate_references(&document)?;
        Ok(document)
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold a second binding of the same path and method into the first one.
///
/// The first operation keeps its metadata and responses. Request body media types it does not
/// declare are added, as are parameters with a new name and location.
fn merge_operation(existing: &mut Operation, other: Operation) {
    if let Some(body) = other.request_body {
        match &mut existing.request_body {
            Some(current) => {
                for (media_type, content) in body.content {
                    current.content.entry(media_type).or_insert(content);
                }
            }
            None => existing.request_body = Some(body),
        }
    }

    for parameter in other.parameters {
        let known = existing.parameters.iter().any(|p| match (p, &parameter) {
            (ParameterOrRef::Parameter(a), ParameterOrRef::Parameter(b)) => {
                a.name == b.name && a.location == b.location
            }
            (a, b) => a == b,
        });
        if !known {
            existing.parameters.push(parameter);
        }
    }
}

fn is_void(operation: &ResourceOperation) -> bool {
    operation
        .declaration
        .return_type
        .as_ref()
        .map(TypeRef::is_void)
        .unwrap_or(true)
}

fn content(media_types: &[String], schema: &Schema) -> BTreeMap<String, MediaType> {
    media_types
        .iter()
        .map(|media_type| (media_type.clone(), MediaType { schema: schema.clone() }))
        .collect()
}

/// Schema named by `@APIResponse(content = @Content(schema = @Schema(implementation = ...)))`
fn declared_content_schema(annotation: &Annotation, schemas: &mut SchemaGenerator<'_, '_>) -> Option<Schema> {
    let implementation = annotation
        .nested_list("content")
        .into_iter()
        .find_map(|content| content.nested("schema")?.string("implementation"))?;
    let ty: TypeRef = implementation.parse().ok()?;
    Some(schemas.generate_schema(&ty))
}

/// `@Parameter(ref)` values are component names unless already written as a reference
fn parameter_reference(reference: &str) -> String {
    if reference.starts_with('#') {
        reference.to_string()
    } else {
        format!("{}{}", PARAMETER_REF_PREFIX, reference)
    }
}

/// Move parameters used identically by two or more operations to the components section, next
/// to the `declared` ones
fn share_parameters(
    paths: &mut BTreeMap<String, PathItem>,
    declared: BTreeMap<String, ParameterObject>,
) -> BTreeMap<String, ParameterObject> {
    let mut usage: Vec<(ParameterObject, usize)> = Vec::new();
    for operation in paths.values().flat_map(PathItem::operations) {
        for parameter in &operation.parameters {
            if let ParameterOrRef::Parameter(object) = parameter {
                match usage.iter_mut().find(|(seen, _)| seen == object) {
                    Some((_, count)) => *count += 1,
                    None => usage.push((object.clone(), 1)),
                }
            }
        }
    }

    let mut shared = declared;
    let mut references = Vec::new();
    for (object, count) in usage {
        if count < 2 {
            continue;
        }
        let base = format!("{} {}", object.location, object.name).to_upper_camel_case();
        let mut key = base.clone();
        let mut suffix = 2;
        while shared.contains_key(&key) {
            key = format!("{}{}", base, suffix);
            suffix += 1;
        }
        debug!("Sharing parameter {} ({}) as {}", object.name, object.location, key);
        references.push((object.clone(), format!("{}{}", PARAMETER_REF_PREFIX, key)));
        shared.insert(key, object);
    }

    for operation in paths.values_mut().flat_map(PathItem::operations_mut) {
        for parameter in &mut operation.parameters {
            let ParameterOrRef::Parameter(object) = parameter else {
                continue;
            };
            if let Some((_, reference)) = references.iter().find(|(shared, _)| shared == object) {
                *parameter = ParameterOrRef::Reference {
                    reference: reference.clone(),
                };
            }
        }
    }

    shared
}

/// Every `$ref` must point at an existing component
fn validate_references(document: &OpenApiDocument) -> Result<()> {
    let empty = Components::default();
    let components = document.components.as_ref().unwrap_or(&empty);

    let mut schemas: Vec<&Schema> = Vec::new();
    schemas.extend(components.schemas.values());
    schemas.extend(components.parameters.values().map(|p| &p.schema));
    for operation in document.operations() {
        for parameter in &operation.parameters {
            match parameter {
                ParameterOrRef::Parameter(object) => schemas.push(&object.schema),
                ParameterOrRef::Reference { reference } => {
                    let known = reference
                        .strip_prefix(PARAMETER_REF_PREFIX)
                        .map(|key| components.parameters.contains_key(key))
                        .unwrap_or(false);
                    if !known {
                        return Err(Error::DanglingReference(reference.clone()));
                    }
                }
            }
        }
        if let Some(body) = &operation.request_body {
            schemas.extend(body.content.values().map(|m| &m.schema));
        }
        for response in operation.responses.values() {
            schemas.extend(response.content.iter().flat_map(|c| c.values()).map(|m| &m.schema));
        }
    }

    while let Some(schema) = schemas.pop() {
        if let Some(reference) = &schema.reference {
            let known = reference
                .strip_prefix(SCHEMA_REF_PREFIX)
                .map(|key| components.schemas.contains_key(key))
                .unwrap_or(false);
            if !known {
                return Err(Error::DanglingReference(reference.clone()));
            }
        }
        schemas.extend(schema.items.as_deref());
        schemas.extend(schema.properties.values());
    }
    Ok(())
}
