use crate::annotations::Vocabulary;
use crate::index::{ClassInfo, MethodInfo, SymbolIndex, TypeParam, TypeRef, OBJECT};
use log::debug;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Type variable name -> concrete type
pub type Bindings = BTreeMap<String, TypeRef>;

const OPTIONAL: &str = "java.util.Optional";

/// Primitive optional wrappers and the primitive they carry
const PRIMITIVE_OPTIONALS: &[(&str, &str)] = &[
    ("java.util.OptionalInt", "int"),
    ("java.util.OptionalLong", "long"),
    ("java.util.OptionalDouble", "double"),
];

const COLLECTIONS: &[&str] = &[
    "java.util.Collection",
    "java.util.List",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.HashSet",
    "java.util.TreeSet",
];

/// Type resolver - binds generic type variables along inheritance chains and classifies types
pub struct TypeResolver<'a> {
    /// The index being scanned
    index: &'a SymbolIndex,
    /// Namespaces used to recognize parameter annotations when classifying beans
    vocabulary: Vocabulary,
    /// Classification cache: class name -> declares bean members
    bean_cache: RefCell<HashMap<String, bool>>,
}

/// One class on an inheritance path together with the bindings of its type parameters
#[derive(Debug, Clone)]
pub struct Ancestor<'a> {
    pub class: &'a ClassInfo,
    /// The concrete type this ancestor was reached as
    pub ty: TypeRef,
    pub bindings: Bindings,
}

/// How a type takes part in parameter resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// A single value converted from request text
    PlainValue,
    /// An aggregate whose members supply parameters
    Bean,
    /// A multi-valued parameter of the element type
    CollectionOf(TypeRef),
    /// An optional wrapper around the inner type
    OptionalOf(TypeRef),
}

impl<'a> TypeResolver<'a> {
    /// Create a new TypeResolver over an index
    pub fn new(index: &'a SymbolIndex, vocabulary: Vocabulary) -> Self {
        debug!("Initializing TypeResolver with {} classes", index.len());
        Self {
            index,
            vocabulary,
            bean_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn index(&self) -> &'a SymbolIndex {
        self.index
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Bind the type parameters of `class` to the arguments supplied at an inheritance edge.
    ///
    /// Parameters without an argument (raw use) fall back to their bound, or to
    /// `java.lang.Object` when unbounded.
    pub fn bind(&self, class: &ClassInfo, args: &[TypeRef]) -> Bindings {
        let mut bindings = Bindings::new();
        for (i, param) in class.type_params.iter().enumerate() {
            let resolved = match args.get(i) {
                Some(arg) => arg.clone(),
                None => {
                    let fallback = self.fallback(param, &bindings);
                    debug!(
                        "Type variable {} of {} is not instantiated, using {}",
                        param.name, class.name, fallback
                    );
                    fallback
                }
            };
            bindings.insert(param.name.clone(), resolved);
        }
        bindings
    }

    /// Extend class bindings with the method's own type parameters
    pub fn method_bindings(&self, class_bindings: &Bindings, method: &MethodInfo) -> Bindings {
        let mut bindings = class_bindings.clone();
        for param in &method.type_params {
            let fallback = self.fallback(param, &bindings);
            bindings.insert(param.name.clone(), fallback);
        }
        bindings
    }

    fn fallback(&self, param: &TypeParam, bindings: &Bindings) -> TypeRef {
        param
            .bound
            .as_ref()
            .map(|bound| self.substitute(bound, bindings))
            .unwrap_or_else(TypeRef::object)
    }

    /// Replace every type variable in `ty` using `bindings`
    pub fn substitute(&self, ty: &TypeRef, bindings: &Bindings) -> TypeRef {
        match ty {
            TypeRef::Variable(name) => bindings.get(name).cloned().unwrap_or_else(|| {
                debug!("Unresolved type variable {}, using {}", name, OBJECT);
                TypeRef::object()
            }),
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| self.substitute(a, bindings)).collect(),
            },
            TypeRef::Array(elem) => TypeRef::Array(Box::new(self.substitute(elem, bindings))),
        }
    }

    /// Walk `ty` and all of its supertypes, most derived first.
    ///
    /// Each ancestor is visited once; its bindings are composed from the arguments supplied at
    /// the edge it was reached through. Supertypes missing from the index end the walk on
    /// that branch.
    pub fn ancestry(&self, ty: &TypeRef) -> Vec<Ancestor<'a>> {
        let mut ancestors = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(ty.clone());

        while let Some(current) = queue.pop_front() {
            let Some(name) = current.class_name() else {
                continue;
            };
            if !visited.insert(name.to_string()) {
                continue;
            }
            let Some(class) = self.index.class(name) else {
                debug!("{} is not in the index", name);
                continue;
            };

            let bindings = self.bind(class, current.args());
            for supertype in class.supertypes() {
                queue.push_back(self.substitute(supertype, &bindings));
            }
            ancestors.push(Ancestor {
                class,
                ty: current,
                bindings,
            });
        }

        ancestors
    }

    /// Whether `specific` is `general` or one of its subtypes
    pub fn is_subtype(&self, specific: &TypeRef, general: &TypeRef) -> bool {
        let Some(target) = general.class_name() else {
            return false;
        };
        if target == OBJECT || specific.class_name() == Some(target) {
            return true;
        }
        self.ancestry(specific).iter().any(|a| a.class.name == target)
    }

    /// The enum class a type refers to, if any
    pub fn enum_class(&self, ty: &TypeRef) -> Option<&'a ClassInfo> {
        let class = self.index.class(ty.class_name()?)?;
        class.is_enum().then_some(class)
    }

    /// Classify a type by how it supplies parameters
    pub fn classify(&self, ty: &TypeRef) -> Capability {
        match ty {
            TypeRef::Array(elem) => Capability::CollectionOf((**elem).clone()),
            TypeRef::Variable(_) => Capability::PlainValue,
            TypeRef::Named { name, args } => {
                if name == OPTIONAL {
                    return Capability::OptionalOf(args.first().cloned().unwrap_or_else(TypeRef::object));
                }
                if let Some((_, inner)) = PRIMITIVE_OPTIONALS
                    .iter()
                    .find(|(wrapper, _)| *wrapper == name.as_str())
                {
                    return Capability::OptionalOf(TypeRef::named(*inner));
                }
                if COLLECTIONS.contains(&name.as_str()) {
                    return Capability::CollectionOf(args.first().cloned().unwrap_or_else(TypeRef::object));
                }
                if self.is_bean_class(name) {
                    Capability::Bean
                } else {
                    Capability::PlainValue
                }
            }
        }
    }

    /// Whether the class or one of its ancestors declares parameter-carrying members
    pub fn is_bean_class(&self, name: &str) -> bool {
        if let Some(cached) = self.bean_cache.borrow().get(name) {
            return *cached;
        }

        let is_bean = self
            .ancestry(&TypeRef::named(name))
            .iter()
            .any(|a| self.declares_bean_members(a.class));
        debug!("Classified {} as {}", name, if is_bean { "bean" } else { "plain value" });

        self.bean_cache.borrow_mut().insert(name.to_string(), is_bean);
        is_bean
    }

    fn declares_bean_members(&self, class: &ClassInfo) -> bool {
        let vocabulary = &self.vocabulary;
        let fields = class
            .fields
            .iter()
            .filter(|f| !f.is_static)
            .any(|f| vocabulary.declares_parameter(&f.annotations));
        let constructors = class
            .constructors
            .iter()
            .flat_map(|c| c.params.iter())
            .any(|p| vocabulary.declares_parameter(&p.annotations));
        let setters = class
            .methods
            .iter()
            .filter(|m| m.setter_property().is_some())
            .any(|m| {
                vocabulary.declares_parameter(&m.annotations)
                    || vocabulary.declares_parameter(&m.params[0].annotations)
            });
        fields || constructors || setters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Namespace;
    use crate::index::ClassInfo;

    /// Helper function to build an index from YAML class declarations
    fn index_from_yaml(yaml: &str) -> SymbolIndex {
        let classes: Vec<ClassInfo> = serde_yaml::from_str(yaml).unwrap();
        SymbolIndex::new(classes)
    }

    fn vocabulary() -> Vocabulary {
        Vocabulary::new(vec![Namespace::Jakarta])
    }

    const GENERIC_HIERARCHY: &str = r#"
- name: t.JsonBase
- name: t.DataJson
  superclass: t.JsonBase
- name: t.Filter
  kind: interface
- name: t.FilterBean
  interfaces: [t.Filter]
- name: t.GenericBaseInterface
  kind: interface
  type_params:
    - { name: T, bound: t.JsonBase }
    - { name: F, bound: t.Filter }
  methods:
    - name: list
      params:
        - { name: filter, type: F }
      return_type: "java.util.List<T>"
- name: t.RestInterface
  kind: interface
  interfaces: ["t.GenericBaseInterface<t.DataJson, t.FilterBean>"]
- name: t.RestImpl
  interfaces: [t.RestInterface]
"#;

    #[test]
    fn test_ancestry_composes_bindings() {
        let index = index_from_yaml(GENERIC_HIERARCHY);
        let resolver = TypeResolver::new(&index, vocabulary());

        let ancestry = resolver.ancestry(&TypeRef::named("t.RestImpl"));
        let names: Vec<&str> = ancestry.iter().map(|a| a.class.name.as_str()).collect();
        assert_eq!(names, vec!["t.RestImpl", "t.RestInterface", "t.GenericBaseInterface"]);

        let base = &ancestry[2];
        assert_eq!(base.bindings["T"], TypeRef::named("t.DataJson"));
        assert_eq!(base.bindings["F"], TypeRef::named("t.FilterBean"));

        let method = &base.class.methods[0];
        let bindings = resolver.method_bindings(&base.bindings, method);
        assert_eq!(
            resolver.substitute(method.return_type.as_ref().unwrap(), &bindings),
            TypeRef::generic("java.util.List", vec![TypeRef::named("t.DataJson")])
        );
        assert_eq!(
            resolver.substitute(&method.params[0].ty, &bindings),
            TypeRef::named("t.FilterBean")
        );
    }

    #[test]
    fn test_raw_use_falls_back_to_bound() {
        let index = index_from_yaml(GENERIC_HIERARCHY);
        let resolver = TypeResolver::new(&index, vocabulary());

        let ancestry = resolver.ancestry(&TypeRef::named("t.GenericBaseInterface"));
        assert_eq!(ancestry[0].bindings["T"], TypeRef::named("t.JsonBase"));
        assert_eq!(ancestry[0].bindings["F"], TypeRef::named("t.Filter"));
    }

    #[test]
    fn test_unbounded_variable_falls_back_to_object() {
        let index = index_from_yaml(
            r#"
- name: t.Box
  type_params: [{ name: V }]
  fields:
    - { name: value, type: V }
"#,
        );
        let resolver = TypeResolver::new(&index, vocabulary());
        let ancestry = resolver.ancestry(&TypeRef::named("t.Box"));
        let field = &ancestry[0].class.fields[0];

        assert_eq!(resolver.substitute(&field.ty, &ancestry[0].bindings), TypeRef::object());
        assert_eq!(
            resolver.substitute(&TypeRef::Variable("Unknown".to_string()), &Bindings::new()),
            TypeRef::object()
        );
    }

    #[test]
    fn test_subtype_checks() {
        let index = index_from_yaml(GENERIC_HIERARCHY);
        let resolver = TypeResolver::new(&index, vocabulary());

        assert!(resolver.is_subtype(&TypeRef::named("t.FilterBean"), &TypeRef::named("t.Filter")));
        assert!(resolver.is_subtype(&TypeRef::named("t.DataJson"), &TypeRef::object()));
        assert!(!resolver.is_subtype(&TypeRef::named("t.Filter"), &TypeRef::named("t.FilterBean")));
    }

    #[test]
    fn test_classify_wrappers() {
        let index = index_from_yaml("[]");
        let resolver = TypeResolver::new(&index, vocabulary());

        assert_eq!(
            resolver.classify(&"java.util.Optional<String>".parse().unwrap()),
            Capability::OptionalOf(TypeRef::named("String"))
        );
        assert_eq!(
            resolver.classify(&TypeRef::named("java.util.OptionalLong")),
            Capability::OptionalOf(TypeRef::named("long"))
        );
        assert_eq!(
            resolver.classify(&"java.util.List<java.lang.String>".parse().unwrap()),
            Capability::CollectionOf(TypeRef::named("java.lang.String"))
        );
        assert_eq!(
            resolver.classify(&"int[]".parse().unwrap()),
            Capability::CollectionOf(TypeRef::named("int"))
        );
        assert_eq!(resolver.classify(&TypeRef::named("java.lang.String")), Capability::PlainValue);
    }

    #[test]
    fn test_classify_beans_including_inherited_members() {
        let index = index_from_yaml(
            r#"
- name: t.BaseBean
  fields:
    - name: q
      type: String
      annotations:
        - { name: jakarta.ws.rs.QueryParam, values: { value: q } }
- name: t.DerivedBean
  superclass: t.BaseBean
- name: t.SetterBean
  methods:
    - name: setLimit
      params:
        - type: int
          annotations:
            - { name: jakarta.ws.rs.QueryParam, values: { value: limit } }
- name: t.JavaxBean
  fields:
    - name: q
      type: String
      annotations:
        - { name: javax.ws.rs.QueryParam, values: { value: q } }
"#,
        );
        let resolver = TypeResolver::new(&index, vocabulary());

        assert_eq!(resolver.classify(&TypeRef::named("t.BaseBean")), Capability::Bean);
        assert_eq!(resolver.classify(&TypeRef::named("t.DerivedBean")), Capability::Bean);
        assert_eq!(resolver.classify(&TypeRef::named("t.SetterBean")), Capability::Bean);
        // javax annotations are not honoured by a jakarta-only vocabulary
        assert_eq!(resolver.classify(&TypeRef::named("t.JavaxBean")), Capability::PlainValue);
        // cached result is stable
        assert!(resolver.is_bean_class("t.DerivedBean"));
    }
}
