//! Operation discovery and the resource operation model.
//!
//! Extractors walk the [`SymbolIndex`](crate::index::SymbolIndex) and produce one
//! [`ResourceOperation`] per canonical HTTP-method-bearing method declaration. Parameters are
//! filled in afterwards by the [`param_resolver`](crate::param_resolver).
//!
//! # Example
//!
//! ```no_run
//! use index_to_openapi::annotations::{Namespace, Vocabulary};
//! use index_to_openapi::extractor::{jaxrs::JaxRsExtractor, RouteExtractor};
//! use index_to_openapi::index::SymbolIndex;
//! use index_to_openapi::type_resolver::TypeResolver;
//!
//! let index = SymbolIndex::new(vec![]);
//! let vocabulary = Vocabulary::new(vec![Namespace::Jakarta]);
//! let resolver = TypeResolver::new(&index, vocabulary.clone());
//! let operations = JaxRsExtractor::new(&vocabulary).extract_routes(&resolver);
//! println!("Found {} operations", operations.len());
//! ```

pub mod jaxrs;

use crate::context::Diagnostic;
use crate::index::{Annotation, TypeRef};
use crate::schema_generator::Schema;
use crate::type_resolver::TypeResolver;

/// Trait for discovering resource operations in a symbol index.
pub trait RouteExtractor {
    /// Extracts every operation declared by the resources of the index, in a stable order.
    fn extract_routes(&self, resolver: &TypeResolver<'_>) -> Vec<ResourceOperation>;
}

/// HTTP methods an operation may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    /// Map a JAX-RS annotation local name (`GET`, `POST`, ...) to the method
    pub fn from_annotation(local: &str) -> Option<Self> {
        match local {
            "GET" => Some(HttpMethod::Get),
            "PUT" => Some(HttpMethod::Put),
            "POST" => Some(HttpMethod::Post),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// Where a parameter value is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
    /// Encoded inside one path segment (`;name=value`)
    Matrix,
    /// Form field of a urlencoded or multipart body
    Form,
}

impl ParamLocation {
    /// Parse the `in` attribute of a MicroProfile OpenAPI `@Parameter`
    pub fn from_parameter_in(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "PATH" => Some(ParamLocation::Path),
            "QUERY" => Some(ParamLocation::Query),
            "HEADER" => Some(ParamLocation::Header),
            "COOKIE" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
            ParamLocation::Matrix => "matrix",
            ParamLocation::Form => "form",
        }
    }

    /// Path and matrix parameters are required unless marked otherwise
    pub fn required_by_default(&self) -> bool {
        matches!(self, ParamLocation::Path | ParamLocation::Matrix)
    }
}

/// One piece of a path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentPart {
    Literal(String),
    Variable { name: String, regex: Option<String> },
}

/// One `/`-separated segment of a path template
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathSegment {
    pub parts: Vec<SegmentPart>,
    /// Name of the matrix parameter group attached to this segment
    pub matrix: Option<String>,
}

impl PathSegment {
    /// Name used for the matrix group of this segment
    pub fn matrix_group_name(&self) -> String {
        let base = match self.parts.last() {
            Some(SegmentPart::Variable { name, .. }) => name.clone(),
            Some(SegmentPart::Literal(text)) => text.clone(),
            None => String::new(),
        };
        format!("{}Matrix", base)
    }
}

/// An operation path: class-level template followed by the method-level template
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathTemplate {
    pub segments: Vec<PathSegment>,
    /// Number of leading segments contributed by the class-level `@Path`
    pub class_segments: usize,
}

impl PathTemplate {
    /// Parse and join the class-level and method-level path templates
    pub fn parse(class_path: &str, method_path: Option<&str>) -> Self {
        let mut segments = parse_segments(class_path);
        let class_segments = segments.len();
        if let Some(method_path) = method_path {
            segments.extend(parse_segments(method_path));
        }
        Self {
            segments,
            class_segments,
        }
    }

    /// Template variables with their regex constraints, in path order
    pub fn variables(&self) -> Vec<(&str, Option<&str>)> {
        self.segments
            .iter()
            .flat_map(|s| s.parts.iter())
            .filter_map(|p| match p {
                SegmentPart::Variable { name, regex } => Some((name.as_str(), regex.as_deref())),
                SegmentPart::Literal(_) => None,
            })
            .collect()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables().iter().any(|(v, _)| *v == name)
    }

    /// Index of the segment declaring the template variable `name`
    pub fn variable_segment(&self, name: &str) -> Option<usize> {
        self.segments.iter().position(|segment| {
            segment
                .parts
                .iter()
                .any(|part| matches!(part, SegmentPart::Variable { name: v, .. } if v == name))
        })
    }

    /// Index of the segment receiving class-level matrix parameters
    pub fn class_matrix_segment(&self) -> Option<usize> {
        if self.class_segments > 0 {
            Some(self.class_segments - 1)
        } else {
            self.method_matrix_segment()
        }
    }

    /// Index of the segment receiving method-level matrix parameters
    pub fn method_matrix_segment(&self) -> Option<usize> {
        self.segments.len().checked_sub(1)
    }

    /// Render as an OpenAPI path: regexes stripped, matrix groups appended to their segment
    pub fn render(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            for part in &segment.parts {
                match part {
                    SegmentPart::Literal(text) => out.push_str(text),
                    SegmentPart::Variable { name, .. } => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
            }
            if let Some(matrix) = &segment.matrix {
                out.push('{');
                out.push_str(matrix);
                out.push('}');
            }
        }
        out
    }
}

/// Split a template on `/` outside of braces, so regexes such as `{id: \d{3}}` survive
fn parse_segments(template: &str) -> Vec<PathSegment> {
    let mut raw_segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in template.chars() {
        match ch {
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            '/' if depth == 0 => raw_segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    raw_segments.push(current);

    raw_segments
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_segment(s.trim()))
        .collect()
}

fn parse_segment(raw: &str) -> PathSegment {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut variable = String::new();
    let mut depth = 0usize;

    for ch in raw.chars() {
        match ch {
            '{' if depth == 0 => {
                if !literal.is_empty() {
                    parts.push(SegmentPart::Literal(std::mem::take(&mut literal)));
                }
                depth = 1;
            }
            '{' => {
                depth += 1;
                variable.push(ch);
            }
            '}' if depth == 1 => {
                parts.push(parse_variable(&std::mem::take(&mut variable)));
                depth = 0;
            }
            '}' if depth > 1 => {
                depth -= 1;
                variable.push(ch);
            }
            _ if depth > 0 => variable.push(ch),
            _ => literal.push(ch),
        }
    }
    if !literal.is_empty() {
        parts.push(SegmentPart::Literal(literal));
    }

    PathSegment {
        parts,
        matrix: None,
    }
}

fn parse_variable(body: &str) -> SegmentPart {
    match body.split_once(':') {
        Some((name, regex)) => SegmentPart::Variable {
            name: name.trim().to_string(),
            regex: Some(regex.trim().to_string()).filter(|r| !r.is_empty()),
        },
        None => SegmentPart::Variable {
            name: body.trim().to_string(),
            regex: None,
        },
    }
}

/// A method argument of the canonical declaration, with generic types resolved
#[derive(Debug, Clone, PartialEq)]
pub struct MethodArgument {
    pub name: String,
    pub ty: TypeRef,
    pub annotations: Vec<Annotation>,
}

/// The single authoritative record for a method overridden along a hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalMethod {
    /// Class whose declaration is canonical (the most derived one)
    pub declaring_class: String,
    pub name: String,
    pub params: Vec<MethodArgument>,
    pub return_type: Option<TypeRef>,
    /// Own annotations followed by those inherited from overridden declarations
    pub annotations: Vec<Annotation>,
    /// Classes whose declarations were merged into this record
    pub inherited_from: Vec<String>,
}

/// Which kind of symbol produced a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceKind {
    MethodArgument,
    ConstructorArgument,
    Field,
    Setter,
    MethodAnnotation,
    PathTemplate,
    /// A parameter declared once under the document's components
    Component,
}

impl SourceKind {
    /// Merge rank; lower wins. Constructor arguments populate a bean before fields, fields
    /// before setters.
    pub fn rank(&self) -> u8 {
        match self {
            SourceKind::MethodArgument => 0,
            SourceKind::ConstructorArgument => 1,
            SourceKind::Field => 2,
            SourceKind::Setter => 3,
            SourceKind::MethodAnnotation => 4,
            SourceKind::PathTemplate => 5,
            SourceKind::Component => 6,
        }
    }
}

/// Where a resolved parameter came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTrace {
    pub kind: SourceKind,
    /// `Class#member` of the producing symbol
    pub symbol: String,
    /// Member names walked through bean parameters, from the operation's direct argument
    pub bean_path: Vec<String>,
}

/// A fully resolved operation parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: Option<String>,
    pub deprecated: Option<bool>,
    pub allow_empty_value: Option<bool>,
    pub style: Option<String>,
    pub explode: Option<bool>,
    pub example: Option<String>,
    pub schema: Schema,
    /// Component parameter named by `@Parameter(ref)`, written in place of the parameter
    pub reference: Option<String>,
    pub source: SourceTrace,
}

/// Request body resolved for an operation
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodySpec {
    pub content_types: Vec<String>,
    pub schema: Schema,
    pub required: bool,
    pub description: Option<String>,
}

/// One HTTP operation bound to a canonical method declaration
#[derive(Debug, Clone)]
pub struct ResourceOperation {
    /// The resource class the operation was discovered on
    pub resource: String,
    pub method: HttpMethod,
    pub path: PathTemplate,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub declaration: CanonicalMethod,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBodySpec>,
    pub operation_id: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResourceOperation {
    /// Short human-readable description used in logs and errors
    pub fn describe(&self) -> String {
        format!(
            "{} {} ({}#{})",
            self.method.as_str(),
            self.path.render(),
            self.resource,
            self.declaration.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joined_template() {
        let template = PathTemplate::parse("/users", Some("{id}/posts"));
        assert_eq!(template.class_segments, 1);
        assert_eq!(template.segments.len(), 3);
        assert_eq!(template.render(), "/users/{id}/posts");
        assert_eq!(template.variables(), vec![("id", None)]);
    }

    #[test]
    fn test_parse_regex_variable() {
        let template = PathTemplate::parse("items", Some("/{id: \\d{3}}/{name : [a-z]+}"));
        assert_eq!(template.render(), "/items/{id}/{name}");
        assert_eq!(
            template.variables(),
            vec![("id", Some("\\d{3}")), ("name", Some("[a-z]+"))]
        );
    }

    #[test]
    fn test_mixed_segment() {
        let template = PathTemplate::parse("/files", Some("/{name}.{ext}"));
        assert_eq!(
            template.segments[1].parts,
            vec![
                SegmentPart::Variable {
                    name: "name".to_string(),
                    regex: None
                },
                SegmentPart::Literal(".".to_string()),
                SegmentPart::Variable {
                    name: "ext".to_string(),
                    regex: None
                },
            ]
        );
        assert_eq!(template.render(), "/files/{name}.{ext}");
    }

    #[test]
    fn test_root_path() {
        assert_eq!(PathTemplate::parse("/", None).render(), "/");
    }

    #[test]
    fn test_variable_segment() {
        let template = PathTemplate::parse("/segments", Some("/seg1/{first}/{second}.{ext}"));
        assert_eq!(template.variable_segment("first"), Some(2));
        assert_eq!(template.variable_segment("ext"), Some(3));
        assert_eq!(template.variable_segment("missing"), None);
    }

    #[test]
    fn test_matrix_segments() {
        let mut template = PathTemplate::parse("/cars/{make}", Some("/{model}"));
        assert_eq!(template.class_matrix_segment(), Some(1));
        assert_eq!(template.method_matrix_segment(), Some(2));

        let idx = template.class_matrix_segment().unwrap();
        let group = template.segments[idx].matrix_group_name();
        template.segments[idx].matrix = Some(group);
        assert_eq!(template.render(), "/cars/{make}{makeMatrix}/{model}");
    }

    #[test]
    fn test_parameter_in_parsing() {
        assert_eq!(ParamLocation::from_parameter_in("QUERY"), Some(ParamLocation::Query));
        assert_eq!(ParamLocation::from_parameter_in("cookie"), Some(ParamLocation::Cookie));
        assert_eq!(ParamLocation::from_parameter_in("DEFAULT"), None);
    }
}
