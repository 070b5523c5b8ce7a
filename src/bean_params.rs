//! Expansion of bean parameter objects into leaf parameter sources.
//!
//! A bean parameter is an aggregate whose constructor arguments, fields and setters carry
//! parameter annotations. Members annotated as bean parameters themselves are expanded
//! recursively. The builder keeps the classes on the active expansion path on a stack so a type
//! that reappears on its own path stops the recursion with a [`DiagnosticKind::BeanCycle`]
//! diagnostic instead of looping.

use crate::context::{Diagnostic, DiagnosticKind};
use crate::extractor::SourceKind;
use crate::index::{Annotation, ClassInfo, TypeRef};
use crate::type_resolver::TypeResolver;
use log::debug;

/// A terminal annotated member reached through the bean graph
#[derive(Debug, Clone, PartialEq)]
pub struct BeanLeaf {
    pub kind: SourceKind,
    pub declaring_class: String,
    /// Declared member name; setters use the decapitalised property name
    pub member: String,
    /// Member type with the bean's generic bindings applied
    pub ty: TypeRef,
    pub annotations: Vec<Annotation>,
    /// Member names walked from the operation's direct argument, excluding this member
    pub path: Vec<String>,
}

impl BeanLeaf {
    /// `Class#member` of the producing symbol
    pub fn symbol(&self) -> String {
        format!("{}#{}", self.declaring_class, self.member)
    }
}

/// Flattened result of one expansion
#[derive(Debug, Default)]
pub struct BeanExpansion {
    pub leaves: Vec<BeanLeaf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the bean parameter graph for one operation and flattens it into leaves
pub struct BeanParameterGraphBuilder<'r, 'a> {
    resolver: &'r TypeResolver<'a>,
    /// Classes on the active expansion path
    stack: Vec<String>,
    expansion: BeanExpansion,
}

impl<'r, 'a> BeanParameterGraphBuilder<'r, 'a> {
    pub fn new(resolver: &'r TypeResolver<'a>) -> Self {
        Self {
            resolver,
            stack: Vec::new(),
            expansion: BeanExpansion::default(),
        }
    }

    /// Expand a bean-typed argument; `root` names the argument the leaves are reached through
    pub fn expand(mut self, ty: &TypeRef, root: &str) -> BeanExpansion {
        self.visit(ty, &[root.to_string()]);
        self.expansion
    }

    /// Collect the annotated members of a resource class itself
    pub fn expand_resource(mut self, resource: &TypeRef) -> BeanExpansion {
        self.visit(resource, &[]);
        self.expansion
    }

    fn visit(&mut self, ty: &TypeRef, path: &[String]) {
        let Some(name) = ty.class_name() else {
            return;
        };

        if self.stack.iter().any(|entry| entry == name) {
            let mut cycle = self.stack.clone();
            cycle.push(name.to_string());
            let subject = if path.is_empty() {
                name.to_string()
            } else {
                path.join(".")
            };
            self.expansion.diagnostics.push(Diagnostic::new(
                DiagnosticKind::BeanCycle,
                subject,
                format!("bean parameter cycle {}, expansion stopped", cycle.join(" -> ")),
            ));
            return;
        }

        debug!("Expanding bean {} at [{}]", ty, path.join("."));
        self.stack.push(name.to_string());

        let resolver = self.resolver;
        for ancestor in resolver.ancestry(ty) {
            let class = ancestor.class;

            for constructor in &class.constructors {
                let bindings = resolver.method_bindings(&ancestor.bindings, constructor);
                for (i, param) in constructor.params.iter().enumerate() {
                    let member = param.name.clone().unwrap_or_else(|| format!("arg{}", i));
                    self.member(
                        SourceKind::ConstructorArgument,
                        class,
                        member,
                        resolver.substitute(&param.ty, &bindings),
                        param.annotations.clone(),
                        path,
                    );
                }
            }

            for field in class.fields.iter().filter(|f| !f.is_static) {
                self.member(
                    SourceKind::Field,
                    class,
                    field.name.clone(),
                    resolver.substitute(&field.ty, &ancestor.bindings),
                    field.annotations.clone(),
                    path,
                );
            }

            for method in &class.methods {
                let Some(property) = method.setter_property() else {
                    continue;
                };
                let bindings = resolver.method_bindings(&ancestor.bindings, method);
                let param = &method.params[0];
                let annotations = method
                    .annotations
                    .iter()
                    .chain(param.annotations.iter())
                    .cloned()
                    .collect();
                self.member(
                    SourceKind::Setter,
                    class,
                    property,
                    resolver.substitute(&param.ty, &bindings),
                    annotations,
                    path,
                );
            }
        }

        self.stack.pop();
    }

    fn member(
        &mut self,
        kind: SourceKind,
        declaring: &ClassInfo,
        member: String,
        ty: TypeRef,
        annotations: Vec<Annotation>,
        path: &[String],
    ) {
        let resolver = self.resolver;
        let vocabulary = resolver.vocabulary();

        if vocabulary.is_bean_param(&annotations) {
            let mut nested = path.to_vec();
            nested.push(member);
            self.visit(&ty, &nested);
            return;
        }
        if !vocabulary.declares_parameter(&annotations) {
            return;
        }

        self.expansion.leaves.push(BeanLeaf {
            kind,
            declaring_class: declaring.name.clone(),
            member,
            ty,
            annotations,
            path: path.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Namespace, Vocabulary};
    use crate::index::SymbolIndex;

    fn index_from_yaml(yaml: &str) -> SymbolIndex {
        let classes: Vec<ClassInfo> = serde_yaml::from_str(yaml).unwrap();
        SymbolIndex::new(classes)
    }

    fn expand(index: &SymbolIndex, ty: &str) -> BeanExpansion {
        let resolver = TypeResolver::new(index, Vocabulary::new(vec![Namespace::Jakarta]));
        BeanParameterGraphBuilder::new(&resolver).expand(&ty.parse().unwrap(), "bean")
    }

    #[test]
    fn test_members_of_every_kind() {
        let index = index_from_yaml(
            r#"
- name: t.Bean
  constructors:
    - name: "<init>"
      params:
        - name: id
          type: long
          annotations:
            - { name: jakarta.ws.rs.PathParam, values: { value: id } }
  fields:
    - name: q
      type: String
      annotations:
        - { name: jakarta.ws.rs.QueryParam, values: { value: q } }
    - name: CONSTANT
      type: String
      static: true
      annotations:
        - { name: jakarta.ws.rs.QueryParam, values: { value: constant } }
    - name: plain
      type: String
  methods:
    - name: setTraceId
      params:
        - type: String
          annotations:
            - { name: jakarta.ws.rs.HeaderParam, values: { value: X-Trace } }
"#,
        );

        let expansion = expand(&index, "t.Bean");
        let members: Vec<(SourceKind, &str)> = expansion
            .leaves
            .iter()
            .map(|l| (l.kind, l.member.as_str()))
            .collect();
        assert_eq!(
            members,
            vec![
                (SourceKind::ConstructorArgument, "id"),
                (SourceKind::Field, "q"),
                (SourceKind::Setter, "traceId"),
            ]
        );
        assert_eq!(expansion.leaves[1].path, vec!["bean".to_string()]);
        assert_eq!(expansion.leaves[2].symbol(), "t.Bean#traceId");
        assert!(expansion.diagnostics.is_empty());
    }

    #[test]
    fn test_nested_and_generic_members() {
        let index = index_from_yaml(
            r#"
- name: t.Paging
  type_params: [{ name: N }]
  fields:
    - name: size
      type: N
      annotations:
        - { name: jakarta.ws.rs.QueryParam, values: { value: size } }
- name: t.Search
  superclass: "t.Paging<java.lang.Integer>"
  fields:
    - name: filter
      type: t.Filter
      annotations:
        - { name: jakarta.ws.rs.BeanParam }
- name: t.Filter
  fields:
    - name: term
      type: String
      annotations:
        - { name: jakarta.ws.rs.QueryParam, values: { value: term } }
"#,
        );

        let expansion = expand(&index, "t.Search");
        assert_eq!(expansion.leaves.len(), 2);

        let term = &expansion.leaves[0];
        assert_eq!(term.member, "term");
        assert_eq!(term.path, vec!["bean".to_string(), "filter".to_string()]);

        let size = &expansion.leaves[1];
        assert_eq!(size.declaring_class, "t.Paging");
        assert_eq!(size.ty, TypeRef::named("java.lang.Integer"));
    }

    #[test]
    fn test_cycle_stops_with_diagnostic() {
        let index = index_from_yaml(
            r#"
- name: t.Node
  fields:
    - name: name
      type: String
      annotations:
        - { name: jakarta.ws.rs.QueryParam, values: { value: name } }
    - name: parent
      type: t.Node
      annotations:
        - { name: jakarta.ws.rs.BeanParam }
"#,
        );

        let expansion = expand(&index, "t.Node");
        assert_eq!(expansion.leaves.len(), 1);
        assert_eq!(expansion.diagnostics.len(), 1);

        let diagnostic = &expansion.diagnostics[0];
        assert_eq!(diagnostic.kind, DiagnosticKind::BeanCycle);
        assert_eq!(diagnostic.subject, "bean.parent");
        assert!(diagnostic.message.contains("t.Node -> t.Node"));
    }

    #[test]
    fn test_resource_members_have_empty_path() {
        let index = index_from_yaml(
            r#"
- name: t.Resource
  annotations:
    - { name: jakarta.ws.rs.Path, values: { value: /r } }
  fields:
    - name: tenant
      type: String
      annotations:
        - { name: jakarta.ws.rs.HeaderParam, values: { value: X-Tenant } }
"#,
        );
        let resolver = TypeResolver::new(&index, Vocabulary::new(vec![Namespace::Jakarta]));
        let expansion =
            BeanParameterGraphBuilder::new(&resolver).expand_resource(&TypeRef::named("t.Resource"));

        assert_eq!(expansion.leaves.len(), 1);
        assert!(expansion.leaves[0].path.is_empty());
    }
}
