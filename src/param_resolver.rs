//! Parameter resolution and merging.
//!
//! Every operation gathers parameter *candidates* from five kinds of sources:
//!
//! 1. direct method arguments,
//! 2. path template variables (lowest precedence, they only fill gaps),
//! 3. leaves of bean-typed arguments,
//! 4. annotated members of the resource class itself,
//! 5. method-level `@Parameter` annotations.
//!
//! Candidates are grouped by `(name, location)` and each group is merged into one
//! [`Parameter`]. Within a group, attribute values are chosen through a precedence table tagged
//! by [`Tier`]: an explicit MicroProfile OpenAPI annotation beats a framework-native annotation, which
//! beats what the member declares by name and type. Equal tiers fall back to the source rank
//! ([`SourceKind::rank`]) and then to discovery order.
//!
//! Matrix parameters are then folded into one synthetic path parameter per path segment, and
//! form parameters into an object request body.

use crate::annotations::{
    is_deprecated, jaxrs, openapi, openapi_annotation, repeated_openapi_annotations,
};
use crate::bean_params::{BeanExpansion, BeanParameterGraphBuilder};
use crate::context::{Diagnostic, DiagnosticKind, ScanContext};
use crate::extractor::{
    MethodArgument, ParamLocation, Parameter, RequestBodySpec, ResourceOperation, SourceKind,
    SourceTrace,
};
use crate::index::{simple_name, Annotation, TypeRef};
use crate::schema_generator::{apply_schema_annotation, typed_value, Schema, SchemaGenerator};
use crate::type_resolver::{Capability, TypeResolver};
use indexmap::IndexMap;
use log::debug;
use std::collections::BTreeMap;

const DEFAULT_BODY_MEDIA_TYPE: &str = "application/json";
const DEFAULT_FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Attribute source tier; later variants win
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    /// Member name or type
    Declared,
    /// Framework-native annotation
    Native,
    /// MicroProfile OpenAPI `@Parameter`
    Explicit,
}

/// Whether a source belongs to the resource class or to the operation's method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Resource,
    Method,
}

#[derive(Debug, Clone)]
struct NativeLocation {
    location: ParamLocation,
    name: Option<String>,
}

/// One source contributing to a parameter
#[derive(Debug, Clone)]
struct Candidate {
    source: SourceTrace,
    order: usize,
    scope: Scope,
    declared_name: String,
    /// Location implied by the declaration alone (a path variable of the same name)
    inferred_location: Option<ParamLocation>,
    native: Option<NativeLocation>,
    explicit: Option<Annotation>,
    ty: Option<TypeRef>,
    default_value: Option<String>,
    deprecated: bool,
    pattern: Option<String>,
    /// Declared as a JAX-RS `PathSegment`
    path_segment: bool,
}

impl Candidate {
    fn new(kind: SourceKind, symbol: String, scope: Scope, declared_name: &str) -> Self {
        Self {
            source: SourceTrace {
                kind,
                symbol,
                bean_path: Vec::new(),
            },
            order: 0,
            scope,
            declared_name: declared_name.to_string(),
            inferred_location: None,
            native: None,
            explicit: None,
            ty: None,
            default_value: None,
            deprecated: false,
            pattern: None,
            path_segment: false,
        }
    }

    fn explicit_str(&self, key: &str) -> Option<&str> {
        self.explicit.as_ref()?.string(key)
    }

    fn explicit_bool(&self, key: &str) -> Option<bool> {
        self.explicit.as_ref()?.bool(key)
    }

    fn location(&self) -> Option<(Tier, ParamLocation)> {
        self.explicit_str("in")
            .and_then(ParamLocation::from_parameter_in)
            .map(|l| (Tier::Explicit, l))
            .or_else(|| self.native.as_ref().map(|n| (Tier::Native, n.location)))
            .or_else(|| self.inferred_location.map(|l| (Tier::Declared, l)))
    }

    fn name(&self) -> (Tier, &str) {
        if let Some(name) = self.explicit_str("name") {
            return (Tier::Explicit, name);
        }
        match self.native.as_ref().and_then(|n| n.name.as_deref()) {
            Some(name) => (Tier::Native, name),
            None => (Tier::Declared, &self.declared_name),
        }
    }

    fn key(&self) -> Option<(String, ParamLocation)> {
        let (_, location) = self.location()?;
        Some((self.name().1.to_string(), location))
    }

    /// `@Parameter(explode)` as a boolean; `DEFAULT` leaves it unset
    fn explicit_explode(&self) -> Option<bool> {
        match self.explicit.as_ref()?.text("explode")?.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

/// Pick an attribute from the highest tier; equal tiers keep the earliest candidate
fn pick<'c, T>(candidates: &'c [Candidate], attribute: impl Fn(&'c Candidate) -> Option<(Tier, T)>) -> Option<T> {
    let mut best: Option<(Tier, T)> = None;
    for candidate in candidates {
        if let Some((tier, value)) = attribute(candidate) {
            if best.as_ref().map_or(true, |(current, _)| tier > *current) {
                best = Some((tier, value));
            }
        }
    }
    best.map(|(_, value)| value)
}

/// OpenAPI spelling of a `ParameterStyle` constant
fn parameter_style(value: &str) -> Option<&'static str> {
    match value.to_ascii_uppercase().as_str() {
        "MATRIX" => Some("matrix"),
        "LABEL" => Some("label"),
        "FORM" => Some("form"),
        "SIMPLE" => Some("simple"),
        "SPACEDELIMITED" => Some("spaceDelimited"),
        "PIPEDELIMITED" => Some("pipeDelimited"),
        "DEEPOBJECT" => Some("deepObject"),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct Sources {
    candidates: Vec<Candidate>,
    diagnostics: Vec<Diagnostic>,
}

impl Sources {
    fn push(&mut self, mut candidate: Candidate) {
        candidate.order = self.candidates.len();
        self.candidates.push(candidate);
    }
}

/// Resolves and merges the parameters of resource operations
pub struct ParameterResolver<'r, 'a> {
    resolver: &'r TypeResolver<'a>,
}

impl<'r, 'a> ParameterResolver<'r, 'a> {
    pub fn new(resolver: &'r TypeResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Parameters declared once in `@OpenAPIDefinition(components = @Components(parameters = ...))`,
    /// keyed by name, for `@Parameter(ref)` to point at
    pub fn component_parameters(&self, schemas: &mut SchemaGenerator<'_, '_>) -> BTreeMap<String, Parameter> {
        let mut declared = BTreeMap::new();
        for class in self.resolver.index().classes() {
            let Some(components) = openapi_annotation(&class.annotations, openapi::OPENAPI_DEFINITION)
                .and_then(|definition| definition.nested("components"))
            else {
                continue;
            };

            for annotation in components.nested_list("parameters") {
                let Some(name) = annotation.string("name") else {
                    debug!("Ignoring unnamed component parameter on {}", class.name);
                    continue;
                };
                let mut candidate = Candidate::new(SourceKind::Component, class.name.clone(), Scope::Resource, name);
                candidate.explicit = Some(annotation.clone());
                let Some((_, location)) = candidate.location() else {
                    debug!("Component parameter {} on {} has no location", name, class.name);
                    continue;
                };
                if declared.contains_key(name) {
                    debug!("Component parameter {} is already declared", name);
                    continue;
                }
                let parameter = self.merge(name.to_string(), location, &[candidate], schemas);
                declared.insert(name.to_string(), parameter);
            }
        }
        declared
    }

    /// Fill in the parameters and request body of an operation
    pub fn resolve(
        &self,
        operation: &mut ResourceOperation,
        schemas: &mut SchemaGenerator<'_, '_>,
        context: &mut ScanContext,
    ) {
        let mut sources = Sources::default();
        self.gather_path_template(operation, &mut sources);
        let body_argument = self.gather_arguments(operation, &mut sources);
        self.gather_resource_members(operation, &mut sources);

        let mut groups: IndexMap<(String, ParamLocation), Vec<Candidate>> = IndexMap::new();
        for candidate in sources.candidates.drain(..) {
            match candidate.key() {
                Some(key) => groups.entry(key).or_default().push(candidate),
                None => debug!("{} has no parameter location", candidate.source.symbol),
            }
        }
        let next_order: usize = groups.values().map(Vec::len).sum();
        self.attach_method_parameters(operation, &mut groups, next_order);

        // Method-level matrix parameters belong to the segment of a `PathSegment` argument
        let segment_argument = groups
            .iter()
            .filter(|((_, location), group)| *location == ParamLocation::Path && group.iter().any(|c| c.path_segment))
            .filter_map(|((name, _), _)| operation.path.variable_segment(name))
            .max();

        let mut parameters = Vec::new();
        let mut matrix: BTreeMap<usize, Vec<Parameter>> = BTreeMap::new();
        let mut form = Vec::new();

        for ((name, location), mut group) in groups {
            group.sort_by_key(|c| (c.source.kind.rank(), c.order));

            if group.iter().any(|c| c.explicit_bool("hidden") == Some(true)) {
                debug!("Parameter {} ({}) is hidden", name, location.as_str());
                continue;
            }
            if location == ParamLocation::Header && context.config().is_ignored_header(&name) {
                debug!("Ignoring header parameter {}", name);
                continue;
            }

            let scope = group[0].scope;
            let parameter = self.merge(name, location, &group, schemas);
            match location {
                ParamLocation::Matrix => {
                    let segment = match scope {
                        Scope::Resource => operation.path.class_matrix_segment(),
                        Scope::Method => segment_argument.or_else(|| operation.path.method_matrix_segment()),
                    };
                    match segment {
                        Some(idx) => matrix.entry(idx).or_default().push(parameter),
                        None => debug!("No path segment for matrix parameter {}", parameter.name),
                    }
                }
                ParamLocation::Form => form.push(parameter),
                _ => parameters.push(parameter),
            }
        }
        apply_declared_order(operation, &mut parameters);

        for (idx, members) in matrix {
            parameters.push(self.matrix_group(operation, idx, members));
        }

        operation.request_body = self.request_body(operation, body_argument, form, schemas);
        operation.parameters = parameters;

        for diagnostic in sources.diagnostics {
            context.report(diagnostic.clone());
            operation.diagnostics.push(diagnostic);
        }
        debug!(
            "Resolved {} parameters for {}",
            operation.parameters.len(),
            operation.describe()
        );
    }

    /// Every template variable is a path parameter of type string
    fn gather_path_template(&self, operation: &ResourceOperation, sources: &mut Sources) {
        for (name, regex) in operation.path.variables() {
            let mut candidate = Candidate::new(
                SourceKind::PathTemplate,
                format!("{}#{}", operation.resource, operation.declaration.name),
                Scope::Method,
                name,
            );
            candidate.inferred_location = Some(ParamLocation::Path);
            candidate.ty = Some(TypeRef::named("java.lang.String"));
            candidate.pattern = regex.map(str::to_string);
            sources.push(candidate);
        }
    }

    /// Direct method arguments; returns the argument carrying the request body, if any
    fn gather_arguments(&self, operation: &ResourceOperation, sources: &mut Sources) -> Option<MethodArgument> {
        let vocabulary = self.resolver.vocabulary();
        let declaration = &operation.declaration;
        let mut body = None;

        for argument in &declaration.params {
            if vocabulary.is_context(&argument.annotations) {
                debug!("Skipping context argument {}", argument.name);
                continue;
            }

            let explicit_in = openapi_annotation(&argument.annotations, openapi::PARAMETER)
                .and_then(|p| p.string("in"))
                .and_then(ParamLocation::from_parameter_in);
            let located = explicit_in.is_some() || !vocabulary.locations(&argument.annotations).is_empty();

            if vocabulary.is_bean_param(&argument.annotations)
                || (!located && self.resolver.classify(&argument.ty) == Capability::Bean)
            {
                let expansion = BeanParameterGraphBuilder::new(self.resolver).expand(&argument.ty, &argument.name);
                self.push_expansion(expansion, Scope::Method, sources);
                continue;
            }

            let symbol = format!(
                "{}#{}({})",
                declaration.declaring_class, declaration.name, argument.name
            );
            let mut candidate = self.member_candidate(
                SourceKind::MethodArgument,
                symbol,
                Scope::Method,
                &argument.name,
                &argument.ty,
                &argument.annotations,
                sources,
            );

            if !located {
                if operation.path.has_variable(&argument.name) {
                    candidate.inferred_location = Some(ParamLocation::Path);
                } else {
                    if body.is_none() {
                        body = Some(argument.clone());
                    } else {
                        debug!("Ignoring additional unannotated argument {}", argument.name);
                    }
                    continue;
                }
            }
            sources.push(candidate);
        }

        body
    }

    /// Annotated fields, setters and constructor arguments of the resource class
    fn gather_resource_members(&self, operation: &ResourceOperation, sources: &mut Sources) {
        let resource = TypeRef::named(operation.resource.as_str());
        let expansion = BeanParameterGraphBuilder::new(self.resolver).expand_resource(&resource);
        self.push_expansion(expansion, Scope::Resource, sources);
    }

    fn push_expansion(&self, expansion: BeanExpansion, scope: Scope, sources: &mut Sources) {
        sources.diagnostics.extend(expansion.diagnostics);
        for leaf in expansion.leaves {
            let mut candidate = self.member_candidate(
                leaf.kind,
                leaf.symbol(),
                scope,
                &leaf.member,
                &leaf.ty,
                &leaf.annotations,
                sources,
            );
            candidate.source.bean_path = leaf.path;
            sources.push(candidate);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn member_candidate(
        &self,
        kind: SourceKind,
        symbol: String,
        scope: Scope,
        declared_name: &str,
        ty: &TypeRef,
        annotations: &[Annotation],
        sources: &mut Sources,
    ) -> Candidate {
        let vocabulary = self.resolver.vocabulary();

        let locations = vocabulary.locations(annotations);
        if let [(_, first), _, ..] = locations.as_slice() {
            sources.diagnostics.push(Diagnostic::new(
                DiagnosticKind::LocationConflict,
                symbol.clone(),
                format!(
                    "{} location annotations declared, using @{}",
                    locations.len(),
                    simple_name(&first.name)
                ),
            ));
        }

        let mut candidate = Candidate::new(kind, symbol, scope, declared_name);
        candidate.native = locations.first().map(|(location, annotation)| NativeLocation {
            location: *location,
            name: annotation.string("value").map(str::to_string),
        });
        candidate.explicit = openapi_annotation(annotations, openapi::PARAMETER).cloned();
        candidate.path_segment = ty.class_name().is_some_and(|name| vocabulary.is_path_segment(name));
        candidate.ty = Some(if candidate.path_segment {
            TypeRef::named("java.lang.String")
        } else {
            ty.clone()
        });
        candidate.default_value = vocabulary
            .jaxrs(annotations, jaxrs::DEFAULT_VALUE)
            .and_then(|a| a.text("value"));
        candidate.deprecated = is_deprecated(annotations);
        candidate
    }

    /// Method-level `@Parameter`s join the group they name, or stand alone when they give a
    /// location nothing else provides
    fn attach_method_parameters(
        &self,
        operation: &ResourceOperation,
        groups: &mut IndexMap<(String, ParamLocation), Vec<Candidate>>,
        next_order: usize,
    ) {
        let declaration = &operation.declaration;
        let declared =
            repeated_openapi_annotations(&declaration.annotations, openapi::PARAMETER, openapi::PARAMETERS);

        for (i, annotation) in declared.into_iter().enumerate() {
            let Some(name) = annotation.string("name") else {
                debug!("Ignoring unnamed method-level @Parameter on {}", operation.describe());
                continue;
            };

            let mut candidate = Candidate::new(
                SourceKind::MethodAnnotation,
                format!("{}#{}", declaration.declaring_class, declaration.name),
                Scope::Method,
                name,
            );
            candidate.explicit = Some(annotation.clone());
            candidate.order = next_order + i;

            match annotation.string("in").and_then(ParamLocation::from_parameter_in) {
                Some(location) => groups.entry((name.to_string(), location)).or_default().push(candidate),
                None => match groups.iter_mut().find(|((group_name, _), _)| group_name == name) {
                    Some((_, group)) => group.push(candidate),
                    None => debug!("No parameter named {} on {}", name, operation.describe()),
                },
            }
        }
    }

    /// Merge one `(name, location)` group, candidates sorted by precedence
    fn merge(
        &self,
        name: String,
        location: ParamLocation,
        group: &[Candidate],
        schemas: &mut SchemaGenerator<'_, '_>,
    ) -> Parameter {
        let ty = group.iter().find_map(|c| c.ty.as_ref());
        let overrides = pick(group, |c| {
            c.explicit.as_ref()?.nested("schema").map(|s| (Tier::Explicit, s))
        });
        let default_value = group.iter().find_map(|c| c.default_value.as_deref());

        let mut schema = match ty {
            Some(ty) => schemas.parameter_schema(ty, overrides, default_value.is_some()),
            None => {
                let mut schema = Schema::of_type("string");
                if let Some(overrides) = overrides {
                    apply_schema_annotation(&mut schema, overrides);
                }
                schema
            }
        };
        if schema.reference.is_none() {
            if let Some(default_value) = default_value {
                if schema.default.is_none() {
                    schema.default = Some(typed_value(&schema, default_value));
                }
            }
            if schema.schema_type.as_deref() == Some("string") && schema.pattern.is_none() {
                schema.pattern = group.iter().find_map(|c| c.pattern.clone());
            }
        }

        let optional = ty
            .map(|t| matches!(self.resolver.classify(t), Capability::OptionalOf(_)))
            .unwrap_or(false);
        let required = match location {
            // Path parameters are always required, an explicit `required = false` included
            ParamLocation::Path => true,
            _ if optional => false,
            _ => pick(group, |c| c.explicit_bool("required").map(|r| (Tier::Explicit, r)))
                .unwrap_or_else(|| location.required_by_default()),
        };

        let explode = pick(group, |c| c.explicit_explode().map(|e| (Tier::Explicit, e)))
            .or_else(|| (location == ParamLocation::Query && schema.is_array()).then_some(true));

        Parameter {
            description: pick(group, |c| c.explicit_str("description").map(|d| (Tier::Explicit, d.to_string()))),
            deprecated: pick(group, |c| {
                c.explicit_bool("deprecated")
                    .map(|d| (Tier::Explicit, d))
                    .or_else(|| c.deprecated.then_some((Tier::Native, true)))
            }),
            allow_empty_value: pick(group, |c| c.explicit_bool("allowEmptyValue").map(|a| (Tier::Explicit, a))),
            style: pick(group, |c| {
                c.explicit_str("style")
                    .and_then(parameter_style)
                    .map(|s| (Tier::Explicit, s.to_string()))
            }),
            example: pick(group, |c| c.explicit.as_ref()?.text("example").map(|e| (Tier::Explicit, e))),
            explode,
            required,
            schema,
            reference: pick(group, |c| c.explicit_str("ref").map(|r| (Tier::Explicit, r.to_string()))),
            source: group[0].source.clone(),
            name,
            location,
        }
    }

    /// Fold the matrix parameters of one path segment into a synthetic path parameter
    fn matrix_group(&self, operation: &mut ResourceOperation, idx: usize, members: Vec<Parameter>) -> Parameter {
        let segment = &mut operation.path.segments[idx];
        let group_name = segment.matrix_group_name();
        segment.matrix = Some(group_name.clone());

        let mut schema = Schema::object();
        for member in members {
            let mut property = member.schema;
            if property.description.is_none() {
                property.description = member.description;
            }
            schema.properties.insert(member.name, property);
        }

        Parameter {
            name: group_name,
            location: ParamLocation::Path,
            required: true,
            description: None,
            deprecated: None,
            allow_empty_value: None,
            style: Some("matrix".to_string()),
            explode: Some(true),
            example: None,
            schema,
            reference: None,
            source: SourceTrace {
                kind: SourceKind::PathTemplate,
                symbol: format!("{}#{}", operation.resource, operation.declaration.name),
                bean_path: Vec::new(),
            },
        }
    }

    fn request_body(
        &self,
        operation: &ResourceOperation,
        body_argument: Option<MethodArgument>,
        form: Vec<Parameter>,
        schemas: &mut SchemaGenerator<'_, '_>,
    ) -> Option<RequestBodySpec> {
        if !form.is_empty() {
            if let Some(argument) = &body_argument {
                debug!("Form parameters replace body argument {} on {}", argument.name, operation.describe());
            }

            let mut schema = Schema::object();
            for parameter in form {
                if parameter.required {
                    schema.required.push(parameter.name.clone());
                }
                let mut property = parameter.schema;
                if property.description.is_none() {
                    property.description = parameter.description;
                }
                schema.properties.insert(parameter.name, property);
            }

            return Some(RequestBodySpec {
                content_types: media_types_or(&operation.consumes, DEFAULT_FORM_MEDIA_TYPE),
                schema,
                required: true,
                description: None,
            });
        }

        let argument = body_argument?;
        let explicit = openapi_annotation(&argument.annotations, openapi::PARAMETER);
        let optional = matches!(self.resolver.classify(&argument.ty), Capability::OptionalOf(_));

        Some(RequestBodySpec {
            content_types: media_types_or(&operation.consumes, DEFAULT_BODY_MEDIA_TYPE),
            schema: schemas.parameter_schema(&argument.ty, explicit.and_then(|e| e.nested("schema")), false),
            required: !optional,
            description: explicit.and_then(|e| e.string("description")).map(str::to_string),
        })
    }
}

/// Parameters listed by a method-level `@Parameters` come first, in the listed order
fn apply_declared_order(operation: &ResourceOperation, parameters: &mut [Parameter]) {
    let Some(container) = openapi_annotation(&operation.declaration.annotations, openapi::PARAMETERS) else {
        return;
    };
    let listed = container.nested_list("value");
    parameters.sort_by_key(|parameter| {
        listed
            .iter()
            .position(|annotation| {
                annotation.string("name") == Some(parameter.name.as_str())
                    && annotation
                        .string("in")
                        .and_then(ParamLocation::from_parameter_in)
                        .map_or(true, |location| location == parameter.location)
            })
            .unwrap_or(listed.len())
    });
}

fn media_types_or(declared: &[String], default: &str) -> Vec<String> {
    if declared.is_empty() {
        vec![default.to_string()]
    } else {
        declared.to_vec()
    }
}
