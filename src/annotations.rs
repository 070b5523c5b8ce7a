//! Annotation vocabulary understood by the scanner.
//!
//! Two families are recognized:
//!
//! - **Framework-native** JAX-RS annotations (`@Path`, `@GET`, `@QueryParam`, ...), published
//!   under either the `javax.ws.rs` or the `jakarta.ws.rs` namespace. Which namespaces are
//!   honoured is decided by the [`Vocabulary`].
//! - **MicroProfile OpenAPI** annotations (`@Parameter`, `@Operation`,
//!   `@Schema`, ...), which carry explicit document metadata.

use crate::extractor::{HttpMethod, ParamLocation};
use crate::index::Annotation;
use clap::ValueEnum;

/// JAX-RS annotation namespace
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// `javax.ws.rs`
    Javax,
    /// `jakarta.ws.rs`
    Jakarta,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Javax => "javax.ws.rs.",
            Namespace::Jakarta => "jakarta.ws.rs.",
        }
    }
}

/// Local names of JAX-RS annotations, relative to the namespace prefix
pub mod jaxrs {
    pub const PATH: &str = "Path";
    pub const CONSUMES: &str = "Consumes";
    pub const PRODUCES: &str = "Produces";
    pub const PATH_PARAM: &str = "PathParam";
    pub const QUERY_PARAM: &str = "QueryParam";
    pub const HEADER_PARAM: &str = "HeaderParam";
    pub const COOKIE_PARAM: &str = "CookieParam";
    pub const MATRIX_PARAM: &str = "MatrixParam";
    pub const FORM_PARAM: &str = "FormParam";
    pub const BEAN_PARAM: &str = "BeanParam";
    pub const DEFAULT_VALUE: &str = "DefaultValue";
    pub const CONTEXT: &str = "core.Context";
    pub const SUSPENDED: &str = "container.Suspended";
    pub const RESPONSE: &str = "core.Response";
    pub const PATH_SEGMENT: &str = "core.PathSegment";
}

/// Local names of MicroProfile OpenAPI annotations
pub mod openapi {
    pub const PREFIX: &str = "org.eclipse.microprofile.openapi.annotations.";
    pub const OPENAPI_DEFINITION: &str = "OpenAPIDefinition";
    pub const OPERATION: &str = "Operation";
    pub const PARAMETER: &str = "parameters.Parameter";
    pub const PARAMETERS: &str = "parameters.Parameters";
    pub const SCHEMA: &str = "media.Schema";
    pub const API_RESPONSE: &str = "responses.APIResponse";
    pub const API_RESPONSES: &str = "responses.APIResponses";
    pub const TAG: &str = "tags.Tag";
}

/// `java.lang.Deprecated`
pub const DEPRECATED: &str = "java.lang.Deprecated";

/// Find the first MicroProfile OpenAPI annotation with the given local name
pub fn openapi_annotation<'a>(annotations: &'a [Annotation], local: &str) -> Option<&'a Annotation> {
    annotations
        .iter()
        .find(|a| a.name.strip_prefix(openapi::PREFIX) == Some(local))
}

/// All MicroProfile OpenAPI annotations with the given local name, in declaration order
pub fn openapi_annotations<'a>(
    annotations: &'a [Annotation],
    local: &'a str,
) -> impl Iterator<Item = &'a Annotation> + 'a {
    annotations
        .iter()
        .filter(move |a| a.name.strip_prefix(openapi::PREFIX) == Some(local))
}

/// Repeatable MicroProfile OpenAPI annotation, collected from direct use and from its container
pub fn repeated_openapi_annotations<'a>(
    annotations: &'a [Annotation],
    local: &'a str,
    container: &'a str,
) -> Vec<&'a Annotation> {
    let mut found: Vec<&Annotation> = openapi_annotations(annotations, local).collect();
    for holder in openapi_annotations(annotations, container) {
        found.extend(holder.nested_list("value"));
    }
    found
}

pub fn is_deprecated(annotations: &[Annotation]) -> bool {
    annotations.iter().any(|a| a.name == DEPRECATED)
}

/// The set of framework namespaces honoured during one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    namespaces: Vec<Namespace>,
}

impl Vocabulary {
    pub fn new(namespaces: Vec<Namespace>) -> Self {
        Self { namespaces }
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Whether `annotation` is the JAX-RS annotation `local` in any honoured namespace
    pub fn is_jaxrs(&self, annotation: &Annotation, local: &str) -> bool {
        self.jaxrs_local(&annotation.name) == Some(local)
    }

    /// Local name of a JAX-RS annotation, `None` for foreign annotations
    pub fn jaxrs_local<'n>(&self, name: &'n str) -> Option<&'n str> {
        self.namespaces.iter().find_map(|ns| name.strip_prefix(ns.prefix()))
    }

    pub fn jaxrs<'a>(&self, annotations: &'a [Annotation], local: &str) -> Option<&'a Annotation> {
        annotations.iter().find(|a| self.is_jaxrs(a, local))
    }

    pub fn has_jaxrs(&self, annotations: &[Annotation], local: &str) -> bool {
        self.jaxrs(annotations, local).is_some()
    }

    /// HTTP method designated by the annotations, if any
    pub fn http_method(&self, annotations: &[Annotation]) -> Option<HttpMethod> {
        annotations
            .iter()
            .filter_map(|a| self.jaxrs_local(&a.name))
            .find_map(HttpMethod::from_annotation)
    }

    /// Parameter location designated by a single annotation
    pub fn location(&self, annotation: &Annotation) -> Option<ParamLocation> {
        match self.jaxrs_local(&annotation.name)? {
            jaxrs::PATH_PARAM => Some(ParamLocation::Path),
            jaxrs::QUERY_PARAM => Some(ParamLocation::Query),
            jaxrs::HEADER_PARAM => Some(ParamLocation::Header),
            jaxrs::COOKIE_PARAM => Some(ParamLocation::Cookie),
            jaxrs::MATRIX_PARAM => Some(ParamLocation::Matrix),
            jaxrs::FORM_PARAM => Some(ParamLocation::Form),
            _ => None,
        }
    }

    /// Location annotations on a member, in declaration order
    pub fn locations<'a>(&self, annotations: &'a [Annotation]) -> Vec<(ParamLocation, &'a Annotation)> {
        annotations
            .iter()
            .filter_map(|a| self.location(a).map(|loc| (loc, a)))
            .collect()
    }

    pub fn is_bean_param(&self, annotations: &[Annotation]) -> bool {
        self.has_jaxrs(annotations, jaxrs::BEAN_PARAM)
    }

    /// Injected context arguments never describe request input
    pub fn is_context(&self, annotations: &[Annotation]) -> bool {
        self.has_jaxrs(annotations, jaxrs::CONTEXT) || self.has_jaxrs(annotations, jaxrs::SUSPENDED)
    }

    /// Whether a member carries anything that makes it a parameter source
    pub fn declares_parameter(&self, annotations: &[Annotation]) -> bool {
        !self.locations(annotations).is_empty()
            || self.is_bean_param(annotations)
            || openapi_annotation(annotations, openapi::PARAMETER)
                .and_then(|p| p.string("in"))
                .and_then(ParamLocation::from_parameter_in)
                .is_some()
    }

    /// Media types listed by `@Consumes` or `@Produces`
    pub fn media_types(&self, annotations: &[Annotation], local: &str) -> Vec<String> {
        self.jaxrs(annotations, local)
            .map(|a| {
                a.strings("value")
                    .iter()
                    .flat_map(|v| v.split(','))
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `name` is the JAX-RS response wrapper type
    pub fn is_response_type(&self, name: &str) -> bool {
        self.jaxrs_local(name) == Some(jaxrs::RESPONSE)
    }

    /// Whether `name` is the JAX-RS `PathSegment` type, a path value with its matrix parameters
    pub fn is_path_segment(&self, name: &str) -> bool {
        self.jaxrs_local(name) == Some(jaxrs::PATH_SEGMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::AnnotationValue;

    #[test]
    fn test_namespace_filtering() {
        let vocabulary = Vocabulary::new(vec![Namespace::Jakarta]);
        let jakarta = Annotation::new("jakarta.ws.rs.QueryParam").with("value", "q");
        let javax = Annotation::new("javax.ws.rs.QueryParam").with("value", "q");

        assert_eq!(vocabulary.location(&jakarta), Some(ParamLocation::Query));
        assert_eq!(vocabulary.location(&javax), None);
    }

    #[test]
    fn test_http_method_detection() {
        let vocabulary = Vocabulary::new(vec![Namespace::Javax, Namespace::Jakarta]);
        let annotations = vec![
            Annotation::new("javax.ws.rs.Produces").with("value", "application/json"),
            Annotation::new("javax.ws.rs.DELETE"),
        ];
        assert_eq!(vocabulary.http_method(&annotations), Some(HttpMethod::Delete));
        assert_eq!(vocabulary.http_method(&annotations[..1]), None);
    }

    #[test]
    fn test_media_types_split_on_commas() {
        let vocabulary = Vocabulary::new(vec![Namespace::Javax]);
        let annotations = vec![Annotation::new("javax.ws.rs.Consumes")
            .with("value", "application/json, text/plain")];
        assert_eq!(
            vocabulary.media_types(&annotations, jaxrs::CONSUMES),
            vec!["application/json".to_string(), "text/plain".to_string()]
        );
    }

    #[test]
    fn test_repeated_annotations_from_container() {
        let single = Annotation::new("org.eclipse.microprofile.openapi.annotations.responses.APIResponse")
            .with("responseCode", "200");
        let container = Annotation::new("org.eclipse.microprofile.openapi.annotations.responses.APIResponses")
            .with(
                "value",
                AnnotationValue::List(vec![AnnotationValue::Nested(
                    Annotation::new("org.eclipse.microprofile.openapi.annotations.responses.APIResponse")
                        .with("responseCode", "404"),
                )]),
            );
        let annotations = vec![single, container];

        let found = repeated_openapi_annotations(&annotations, openapi::API_RESPONSE, openapi::API_RESPONSES);
        let codes: Vec<&str> = found.iter().filter_map(|a| a.string("responseCode")).collect();
        assert_eq!(codes, vec!["200", "404"]);
    }
}
