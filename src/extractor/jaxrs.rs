use crate::annotations::{is_deprecated, jaxrs, openapi, openapi_annotation, openapi_annotations, Vocabulary};
use crate::extractor::{
    CanonicalMethod, MethodArgument, PathTemplate, ResourceOperation, RouteExtractor,
};
use crate::index::{Annotation, ClassInfo, SymbolIndex, TypeRef};
use crate::type_resolver::{Ancestor, TypeResolver};
use log::{debug, info};
use std::collections::HashMap;

/// JAX-RS resource extractor
pub struct JaxRsExtractor {
    vocabulary: Vocabulary,
}

impl RouteExtractor for JaxRsExtractor {
    fn extract_routes(&self, resolver: &TypeResolver<'_>) -> Vec<ResourceOperation> {
        let mut operations = Vec::new();

        for resource in self.resource_roots(resolver) {
            let ancestry = resolver.ancestry(&TypeRef::named(resource.name.as_str()));
            let Some(class_path) = self.class_annotation(&ancestry, jaxrs::PATH).and_then(|a| a.string("value"))
            else {
                continue;
            };
            debug!("Scanning resource {} at {}", resource.name, class_path);

            for method in self.canonical_methods(resolver, &ancestry) {
                if let Some(operation) = self.build_operation(resource, &ancestry, class_path, method) {
                    operations.push(operation);
                }
            }
        }

        info!("Discovered {} operations", operations.len());
        operations
    }
}

impl JaxRsExtractor {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        Self {
            vocabulary: vocabulary.clone(),
        }
    }

    /// Classes whose operations are documented.
    ///
    /// Concrete classes qualify through their own or an inherited class-level `@Path`.
    /// Interfaces and abstract classes qualify through their own `@Path` only when nothing in
    /// the index implements them.
    fn resource_roots<'a>(&self, resolver: &TypeResolver<'a>) -> Vec<&'a ClassInfo> {
        let index: &'a SymbolIndex = resolver.index();
        index
            .classes()
            .filter(|class| {
                if class.is_enum() {
                    return false;
                }
                if class.is_concrete() {
                    let ancestry = resolver.ancestry(&TypeRef::named(class.name.as_str()));
                    return self.class_annotation(&ancestry, jaxrs::PATH).is_some();
                }
                self.vocabulary.has_jaxrs(&class.annotations, jaxrs::PATH)
                    && !index.has_concrete_descendant(&class.name)
            })
            .collect()
    }

    /// Nearest class-level JAX-RS annotation along the ancestry
    fn class_annotation<'c>(&self, ancestry: &[Ancestor<'c>], local: &str) -> Option<&'c Annotation> {
        ancestry
            .iter()
            .find_map(|ancestor| self.vocabulary.jaxrs(&ancestor.class.annotations, local))
    }

    /// Build the canonical-declaration table of a resource.
    ///
    /// Declarations are keyed by name and resolved parameter types. The most derived declaration
    /// is canonical; overridden declarations only contribute annotations the canonical record
    /// lacks. Synthetic and bridge methods are skipped, as are methods whose signature is a
    /// generic specialization of, or generalized by, one already in the table.
    fn canonical_methods(&self, resolver: &TypeResolver<'_>, ancestry: &[Ancestor<'_>]) -> Vec<CanonicalMethod> {
        let mut table: Vec<CanonicalMethod> = Vec::new();
        let mut keys: HashMap<(String, Vec<TypeRef>), usize> = HashMap::new();

        for ancestor in ancestry {
            for method in &ancestor.class.methods {
                if method.is_static {
                    continue;
                }
                if method.synthetic || method.bridge {
                    debug!("Skipping compiler-generated {}#{}", ancestor.class.name, method.name);
                    continue;
                }

                let bindings = resolver.method_bindings(&ancestor.bindings, method);
                let params: Vec<MethodArgument> = method
                    .params
                    .iter()
                    .enumerate()
                    .map(|(i, p)| MethodArgument {
                        name: p.name.clone().unwrap_or_else(|| format!("arg{}", i)),
                        ty: resolver.substitute(&p.ty, &bindings),
                        annotations: p.annotations.clone(),
                    })
                    .collect();
                let key = (method.name.clone(), params.iter().map(|p| p.ty.clone()).collect::<Vec<_>>());

                let record = CanonicalMethod {
                    declaring_class: ancestor.class.name.clone(),
                    name: method.name.clone(),
                    params,
                    return_type: method.return_type.as_ref().map(|r| resolver.substitute(r, &bindings)),
                    annotations: method.annotations.clone(),
                    inherited_from: Vec::new(),
                };

                if let Some(&idx) = keys.get(&key) {
                    inherit(&mut table[idx], &record);
                    continue;
                }

                let same_shape = |c: &CanonicalMethod| {
                    c.name == record.name
                        && c.params.len() == record.params.len()
                        && self.same_route(&c.annotations, &record.annotations)
                };
                if let Some(idx) = table
                    .iter()
                    .position(|c| same_shape(c) && is_specialization(resolver, &c.params, &record.params))
                {
                    debug!(
                        "{}#{} is generalized by {}, treating it as synthetic",
                        record.declaring_class, record.name, table[idx].declaring_class
                    );
                    inherit(&mut table[idx], &record);
                    keys.insert(key, idx);
                    continue;
                }
                if let Some(idx) = table
                    .iter()
                    .position(|c| same_shape(c) && is_specialization(resolver, &record.params, &c.params))
                {
                    debug!(
                        "{}#{} specializes {}, making it canonical",
                        record.declaring_class, record.name, table[idx].declaring_class
                    );
                    let generalized = std::mem::replace(&mut table[idx], record);
                    inherit(&mut table[idx], &generalized);
                    keys.insert(key, idx);
                    continue;
                }

                keys.insert(key, table.len());
                table.push(record);
            }
        }

        table
    }

    fn build_operation(
        &self,
        resource: &ClassInfo,
        ancestry: &[Ancestor<'_>],
        class_path: &str,
        declaration: CanonicalMethod,
    ) -> Option<ResourceOperation> {
        let method = self.vocabulary.http_method(&declaration.annotations)?;

        let operation_annotation = openapi_annotation(&declaration.annotations, openapi::OPERATION);
        if operation_annotation.and_then(|o| o.bool("hidden")).unwrap_or(false) {
            debug!("Skipping hidden operation {}#{}", resource.name, declaration.name);
            return None;
        }

        let method_path = self
            .vocabulary
            .jaxrs(&declaration.annotations, jaxrs::PATH)
            .and_then(|a| a.string("value"));
        let path = PathTemplate::parse(class_path, method_path);

        let consumes = self.media_types(&declaration.annotations, ancestry, jaxrs::CONSUMES);
        let produces = self.media_types(&declaration.annotations, ancestry, jaxrs::PRODUCES);

        let mut tags: Vec<String> = openapi_annotations(&declaration.annotations, openapi::TAG)
            .filter_map(|t| t.string("name").map(str::to_string))
            .collect();
        if tags.is_empty() {
            tags = ancestry
                .iter()
                .map(|a| {
                    openapi_annotations(&a.class.annotations, openapi::TAG)
                        .filter_map(|t| t.string("name").map(str::to_string))
                        .collect::<Vec<_>>()
                })
                .find(|found| !found.is_empty())
                .unwrap_or_default();
        }

        let deprecated = is_deprecated(&declaration.annotations)
            || is_deprecated(&resource.annotations)
            || operation_annotation.and_then(|o| o.bool("deprecated")).unwrap_or(false);

        debug!(
            "Found operation {} {} on {}#{}",
            method.as_str(),
            path.render(),
            resource.name,
            declaration.name
        );

        Some(ResourceOperation {
            resource: resource.name.clone(),
            method,
            path,
            consumes,
            produces,
            summary: operation_annotation.and_then(|o| o.string("summary")).map(str::to_string),
            description: operation_annotation
                .and_then(|o| o.string("description"))
                .map(str::to_string),
            tags,
            deprecated,
            declaration,
            parameters: Vec::new(),
            request_body: None,
            operation_id: None,
            diagnostics: Vec::new(),
        })
    }

    /// Whether two declarations can describe the same operation: one of them binds no route of
    /// its own, or both bind the same HTTP method and `@Path`
    fn same_route(&self, a: &[Annotation], b: &[Annotation]) -> bool {
        let route = |annotations: &[Annotation]| {
            let method = self.vocabulary.http_method(annotations);
            let path = self
                .vocabulary
                .jaxrs(annotations, jaxrs::PATH)
                .and_then(|p| p.string("value"))
                .map(|p| p.trim_matches('/').to_string());
            (method.is_some() || path.is_some()).then_some((method, path))
        };
        match (route(a), route(b)) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// Method-level media types, else those of the nearest class declaring them
    fn media_types(&self, annotations: &[Annotation], ancestry: &[Ancestor<'_>], local: &str) -> Vec<String> {
        let method_level = self.vocabulary.media_types(annotations, local);
        if !method_level.is_empty() {
            return method_level;
        }
        ancestry
            .iter()
            .map(|a| self.vocabulary.media_types(&a.class.annotations, local))
            .find(|types| !types.is_empty())
            .unwrap_or_default()
    }
}

/// Whether every argument of `specific` equals, or is a subtype of, the matching argument of
/// `general`, where `java.lang.Object` accepts anything
fn is_specialization(resolver: &TypeResolver<'_>, specific: &[MethodArgument], general: &[MethodArgument]) -> bool {
    specific.iter().zip(general).all(|(s, g)| {
        s.ty == g.ty || g.ty.is_object() || resolver.is_subtype(&s.ty, &g.ty)
    })
}

/// Copy annotations the canonical record lacks from an overridden declaration
fn inherit(canonical: &mut CanonicalMethod, overridden: &CanonicalMethod) {
    merge_missing(&mut canonical.annotations, &overridden.annotations);
    for (target, source) in canonical.params.iter_mut().zip(&overridden.params) {
        merge_missing(&mut target.annotations, &source.annotations);
    }
    if !canonical.inherited_from.contains(&overridden.declaring_class) {
        canonical.inherited_from.push(overridden.declaring_class.clone());
    }
}

fn merge_missing(target: &mut Vec<Annotation>, source: &[Annotation]) {
    for annotation in source {
        if !target.iter().any(|a| a.name == annotation.name) {
            target.push(annotation.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Namespace;
    use crate::extractor::HttpMethod;

    fn index_from_yaml(yaml: &str) -> SymbolIndex {
        let classes: Vec<ClassInfo> = serde_yaml::from_str(yaml).unwrap();
        SymbolIndex::new(classes)
    }

    fn extract(index: &SymbolIndex) -> Vec<ResourceOperation> {
        let vocabulary = Vocabulary::new(vec![Namespace::Javax, Namespace::Jakarta]);
        let resolver = TypeResolver::new(index, vocabulary.clone());
        JaxRsExtractor::new(&vocabulary).extract_routes(&resolver)
    }

    #[test]
    fn test_generic_interface_operation_appears_once() {
        let index = index_from_yaml(
            r#"
- name: t.DataJson
- name: t.FilterBean
- name: t.GenericBaseInterface
  kind: interface
  type_params: [{ name: T }, { name: F }]
  methods:
    - name: list
      params:
        - name: filter
          type: F
          annotations: [{ name: javax.ws.rs.BeanParam }]
      return_type: "java.util.List<T>"
      annotations:
        - { name: javax.ws.rs.GET }
        - { name: javax.ws.rs.Produces, values: { value: application/json } }
- name: t.RestInterface
  kind: interface
  interfaces: ["t.GenericBaseInterface<t.DataJson, t.FilterBean>"]
  annotations:
    - { name: javax.ws.rs.Path, values: { value: /data } }
- name: t.RestImpl
  interfaces: [t.RestInterface]
  methods:
    - name: list
      params:
        - { name: filter, type: t.FilterBean }
      return_type: "java.util.List<t.DataJson>"
    - name: list
      synthetic: true
      bridge: true
      params:
        - { name: filter, type: java.lang.Object }
      return_type: java.util.List
"#,
        );

        let operations = extract(&index);
        assert_eq!(operations.len(), 1);

        let operation = &operations[0];
        assert_eq!(operation.resource, "t.RestImpl");
        assert_eq!(operation.method, HttpMethod::Get);
        assert_eq!(operation.path.render(), "/data");
        assert_eq!(operation.produces, vec!["application/json".to_string()]);

        let declaration = &operation.declaration;
        assert_eq!(declaration.declaring_class, "t.RestImpl");
        assert_eq!(declaration.params[0].ty, TypeRef::named("t.FilterBean"));
        assert_eq!(declaration.params[0].annotations[0].name, "javax.ws.rs.BeanParam");
        assert_eq!(declaration.inherited_from, vec!["t.GenericBaseInterface".to_string()]);
    }

    #[test]
    fn test_unflagged_generalized_duplicate_is_skipped() {
        let index = index_from_yaml(
            r#"
- name: t.Base
  kind: interface
- name: t.Special
  interfaces: [t.Base]
- name: t.Resource
  annotations:
    - { name: jakarta.ws.rs.Path, values: { value: items } }
  methods:
    - name: create
      params: [{ name: body, type: java.lang.Object }]
      annotations: [{ name: jakarta.ws.rs.POST }]
    - name: create
      params: [{ name: body, type: t.Special }]
"#,
        );

        let operations = extract(&index);
        assert_eq!(operations.len(), 1);
        assert_eq!(operations[0].declaration.params[0].ty, TypeRef::named("t.Special"));
        assert_eq!(operations[0].method, HttpMethod::Post);
    }

    #[test]
    fn test_annotated_overloads_are_separate_operations() {
        let index = index_from_yaml(
            r#"
- name: t.Base
  kind: interface
- name: t.Special
  interfaces: [t.Base]
- name: t.Resource
  annotations:
    - { name: jakarta.ws.rs.Path, values: { value: /r } }
  methods:
    - name: create
      params: [{ name: body, type: java.lang.Object }]
      annotations:
        - { name: jakarta.ws.rs.POST }
        - { name: jakarta.ws.rs.Path, values: { value: any } }
    - name: create
      params: [{ name: body, type: t.Special }]
      annotations:
        - { name: jakarta.ws.rs.POST }
        - { name: jakarta.ws.rs.Path, values: { value: special } }
"#,
        );

        let operations = extract(&index);
        let paths: Vec<String> = operations.iter().map(|o| o.path.render()).collect();
        assert_eq!(paths, vec!["/r/any".to_string(), "/r/special".to_string()]);
        assert_eq!(operations[0].declaration.params[0].ty, TypeRef::object());
        assert_eq!(operations[1].declaration.params[0].ty, TypeRef::named("t.Special"));
    }

    #[test]
    fn test_unimplemented_interface_is_a_resource() {
        let index = index_from_yaml(
            r#"
- name: t.Api
  kind: interface
  annotations:
    - { name: jakarta.ws.rs.Path, values: { value: /api } }
    - { name: jakarta.ws.rs.Consumes, values: { value: application/xml } }
  methods:
    - name: remove
      params:
        - name: id
          type: long
          annotations: [{ name: jakarta.ws.rs.PathParam, values: { value: id } }]
      annotations:
        - { name: jakarta.ws.rs.DELETE }
        - { name: jakarta.ws.rs.Path, values: { value: "{id}" } }
        - { name: java.lang.Deprecated }
    - name: helper
      return_type: String
"#,
        );

        let operations = extract(&index);
        assert_eq!(operations.len(), 1);
        assert_eq!(operations[0].resource, "t.Api");
        assert_eq!(operations[0].path.render(), "/api/{id}");
        assert_eq!(operations[0].consumes, vec!["application/xml".to_string()]);
        assert!(operations[0].deprecated);
    }

    #[test]
    fn test_implemented_interface_is_scanned_through_implementation() {
        let index = index_from_yaml(
            r#"
- name: t.Api
  kind: interface
  annotations:
    - { name: jakarta.ws.rs.Path, values: { value: /api } }
    - name: org.eclipse.microprofile.openapi.annotations.tags.Tag
      values: { name: admin }
  methods:
    - name: ping
      annotations: [{ name: jakarta.ws.rs.GET }]
      return_type: void
    - name: secret
      annotations:
        - { name: jakarta.ws.rs.GET }
        - { name: jakarta.ws.rs.Path, values: { value: secret } }
        - name: org.eclipse.microprofile.openapi.annotations.Operation
          values: { hidden: true }
- name: t.ApiImpl
  interfaces: [t.Api]
  methods:
    - name: ping
      return_type: void
      annotations:
        - name: org.eclipse.microprofile.openapi.annotations.Operation
          values: { summary: Health check }
"#,
        );

        let operations = extract(&index);
        assert_eq!(operations.len(), 1);

        let ping = &operations[0];
        assert_eq!(ping.resource, "t.ApiImpl");
        assert_eq!(ping.summary, Some("Health check".to_string()));
        assert_eq!(ping.tags, vec!["admin".to_string()]);
        assert_eq!(ping.describe(), "GET /api (t.ApiImpl#ping)");
    }
}
