//! Read-only symbol index describing the classes of the scanned program.
//!
//! The index is produced by an external indexer. Every class carries its generic signature,
//! supertypes with their type-argument bindings, members and the annotations declared on them.
//! Type signatures are written the way the source language spells them (`java.util.List<T>`,
//! `String[]`) and parsed into [`TypeRef`] values when the index is loaded.

use crate::error::Error;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Fully-qualified name of the root object type, used as the unconstrained placeholder
pub const OBJECT: &str = "java.lang.Object";

/// A reference to a type as it appears in a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeRef {
    /// A class, interface, enum or primitive, with its type arguments
    Named { name: String, args: Vec<TypeRef> },
    /// An array of the element type
    Array(Box<TypeRef>),
    /// A type variable declared by the enclosing class or method
    Variable(String),
}

impl TypeRef {
    /// Create a reference to a non-generic type
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a reference to a parameterized type
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    /// The placeholder used for type variables that cannot be resolved
    pub fn object() -> Self {
        TypeRef::named(OBJECT)
    }

    /// Name of the class this reference points to, if it is a named type
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Type arguments of a named type
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// Whether this is the `void` pseudo-type
    pub fn is_void(&self) -> bool {
        matches!(self.class_name(), Some("void") | Some("java.lang.Void"))
    }

    /// Whether this is the unconstrained placeholder type
    pub fn is_object(&self) -> bool {
        self.class_name() == Some(OBJECT)
    }

    /// Replace bare names that match one of `variables` with [`TypeRef::Variable`]
    fn link_variables(&self, variables: &[String]) -> TypeRef {
        match self {
            TypeRef::Named { name, args } if args.is_empty() && variables.contains(name) => {
                TypeRef::Variable(name.clone())
            }
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.link_variables(variables)).collect(),
            },
            TypeRef::Array(elem) => TypeRef::Array(Box::new(elem.link_variables(variables))),
            TypeRef::Variable(name) => TypeRef::Variable(name.clone()),
        }
    }
}

/// Simple (unqualified) part of a dotted class name; nested binary names keep their last part
pub fn simple_name(name: &str) -> &str {
    name.rsplit(['.', '$']).next().unwrap_or(name)
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
            TypeRef::Array(elem) => write!(f, "{}[]", elem),
            TypeRef::Variable(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for TypeRef {
    type Err = Error;

    fn from_str(signature: &str) -> Result<Self, Self::Err> {
        let trimmed = signature.trim();
        if let Some(elem) = trimmed.strip_suffix("[]") {
            return Ok(TypeRef::Array(Box::new(elem.parse()?)));
        }

        let rust_syntax = to_rust_syntax(trimmed);
        let ty: syn::Type = syn::parse_str(&rust_syntax).map_err(|e| Error::InvalidTypeSignature {
            signature: signature.to_string(),
            message: e.to_string(),
        })?;

        extract_type_ref(&ty).ok_or_else(|| Error::InvalidTypeSignature {
            signature: signature.to_string(),
            message: "unsupported type form".to_string(),
        })
    }
}

/// Signatures loaded from an index never fail the load; unreadable ones become `Object`
impl From<String> for TypeRef {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|e| {
            warn!("{}, using {}", e, OBJECT);
            TypeRef::object()
        })
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

/// Rust keywords that may legitimately appear as package segments
const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Stands in for `$` in nested binary names, which is not valid in a Rust identifier
const NESTED_MARKER: &str = "__nested__";

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Rewrite a dotted generic signature into Rust path syntax so `syn` can parse it.
///
/// `a.b.List<c.D[]>` becomes `a::b::List<[c::D]>`. Wildcards collapse to their bound
/// (`? extends X` and `? super X` to `X`, a bare `?` to `Object`).
fn to_rust_syntax(signature: &str) -> String {
    let chars: Vec<char> = signature.chars().collect();
    let mut out = String::with_capacity(signature.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '?' {
            i += 1;
            while chars.get(i).is_some_and(|c| c.is_whitespace()) {
                i += 1;
            }
            let rest: String = chars[i..].iter().collect();
            let bound = ["extends", "super"].into_iter().find(|keyword| {
                rest.strip_prefix(keyword)
                    .and_then(|after| after.chars().next())
                    .is_some_and(char::is_whitespace)
            });
            match bound {
                Some(keyword) => i += keyword.len(),
                None => out.push_str("java::lang::Object"),
            }
        } else if is_name_char(ch) {
            let start = i;
            while i < chars.len() && (is_name_char(chars[i]) || chars[i] == '.') {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            let path: Vec<String> = name
                .split('.')
                .filter(|s| !s.is_empty())
                .map(|segment| {
                    if RAW_KEYWORDS.contains(&segment) {
                        format!("r#{}", segment)
                    } else {
                        segment.replace('$', NESTED_MARKER)
                    }
                })
                .collect();

            let mut dims = 0;
            while chars.get(i) == Some(&'[') && chars.get(i + 1) == Some(&']') {
                dims += 1;
                i += 2;
            }
            out.push_str(&"[".repeat(dims));
            out.push_str(&path.join("::"));
            out.push_str(&"]".repeat(dims));
        } else {
            out.push(ch);
            i += 1;
        }
    }

    out
}

/// Extract a TypeRef from a parsed `syn::Type`
fn extract_type_ref(ty: &syn::Type) -> Option<TypeRef> {
    match ty {
        syn::Type::Path(type_path) => {
            let mut segments = Vec::new();
            let mut args = Vec::new();
            for segment in &type_path.path.segments {
                let ident = segment.ident.to_string();
                segments.push(ident.trim_start_matches("r#").replace(NESTED_MARKER, "$"));
                if let syn::PathArguments::AngleBracketed(generic) = &segment.arguments {
                    for arg in &generic.args {
                        if let syn::GenericArgument::Type(inner) = arg {
                            args.push(extract_type_ref(inner)?);
                        }
                    }
                }
            }
            Some(TypeRef::Named {
                name: segments.join("."),
                args,
            })
        }
        syn::Type::Slice(slice) => Some(TypeRef::Array(Box::new(extract_type_ref(&slice.elem)?))),
        syn::Type::Paren(paren) => extract_type_ref(&paren.elem),
        _ => None,
    }
}

/// A value inside an annotation instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Integer(i64),
    String(String),
    List(Vec<AnnotationValue>),
    Nested(Annotation),
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        AnnotationValue::String(value.to_string())
    }
}

impl From<bool> for AnnotationValue {
    fn from(value: bool) -> Self {
        AnnotationValue::Bool(value)
    }
}

impl From<Annotation> for AnnotationValue {
    fn from(value: Annotation) -> Self {
        AnnotationValue::Nested(value)
    }
}

/// One annotation instance: a fully-qualified name plus its key/value pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, AnnotationValue>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter for a value
    pub fn with(mut self, key: &str, value: impl Into<AnnotationValue>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&AnnotationValue> {
        self.values.get(key)
    }

    /// A non-empty string value
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(AnnotationValue::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// A boolean value, accepting `"true"`/`"false"` strings as well
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(AnnotationValue::Bool(b)) => Some(*b),
            Some(AnnotationValue::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// A value rendered as text, whatever its declared kind
    pub fn text(&self, key: &str) -> Option<String> {
        match self.values.get(key) {
            Some(AnnotationValue::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(AnnotationValue::Integer(i)) => Some(i.to_string()),
            Some(AnnotationValue::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    /// All string values of a key holding either a single string or a list of strings
    pub fn strings(&self, key: &str) -> Vec<String> {
        match self.values.get(key) {
            Some(AnnotationValue::String(s)) => vec![s.clone()],
            Some(AnnotationValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    AnnotationValue::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn nested(&self, key: &str) -> Option<&Annotation> {
        match self.values.get(key) {
            Some(AnnotationValue::Nested(a)) => Some(a),
            _ => None,
        }
    }

    /// Nested annotations of a key holding one annotation or a list of them
    pub fn nested_list(&self, key: &str) -> Vec<&Annotation> {
        match self.values.get(key) {
            Some(AnnotationValue::Nested(a)) => vec![a],
            Some(AnnotationValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    AnnotationValue::Nested(a) => Some(a),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Kind of a class symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
}

/// A type parameter with its optional upper bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<TypeRef>,
}

/// A method or constructor argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// A field declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

/// A method or constructor declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub params: Vec<ParamInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Compiler-generated method
    #[serde(default)]
    pub synthetic: bool,
    /// Compiler-generated bridge introduced by generic erasure
    #[serde(default)]
    pub bridge: bool,
}

impl MethodInfo {
    /// Property name if this is a single-argument `setXxx` method
    pub fn setter_property(&self) -> Option<String> {
        if self.is_static || self.params.len() != 1 {
            return None;
        }
        let rest = self.name.strip_prefix("set")?;
        let mut chars = rest.chars();
        let first = chars.next()?;
        if !first.is_uppercase() {
            return None;
        }
        Some(first.to_lowercase().chain(chars).collect())
    }
}

/// A class, interface or enum declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<MethodInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_constants: Vec<String>,
}

impl ClassInfo {
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    /// A class that can be instantiated
    pub fn is_concrete(&self) -> bool {
        self.kind == ClassKind::Class && !self.is_abstract
    }

    /// Direct supertypes, superclass first
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    /// Every annotation on the class and its members
    pub fn all_annotations(&self) -> impl Iterator<Item = &Annotation> {
        let members = self
            .methods
            .iter()
            .chain(self.constructors.iter())
            .flat_map(|m| m.annotations.iter().chain(m.params.iter().flat_map(|p| p.annotations.iter())));
        self.annotations
            .iter()
            .chain(self.fields.iter().flat_map(|f| f.annotations.iter()))
            .chain(members)
    }

    /// Turn bare references to declared type parameters into type variables
    fn link_type_variables(&mut self) {
        let class_vars: Vec<String> = self.type_params.iter().map(|p| p.name.clone()).collect();

        for param in &mut self.type_params {
            param.bound = param.bound.as_ref().map(|b| b.link_variables(&class_vars));
        }
        self.superclass = self.superclass.as_ref().map(|s| s.link_variables(&class_vars));
        for iface in &mut self.interfaces {
            *iface = iface.link_variables(&class_vars);
        }
        for field in &mut self.fields {
            field.ty = field.ty.link_variables(&class_vars);
        }
        for method in self.methods.iter_mut().chain(self.constructors.iter_mut()) {
            let mut vars = class_vars.clone();
            vars.extend(method.type_params.iter().map(|p| p.name.clone()));
            for param in &mut method.type_params {
                param.bound = param.bound.as_ref().map(|b| b.link_variables(&vars));
            }
            for param in &mut method.params {
                param.ty = param.ty.link_variables(&vars);
            }
            method.return_type = method.return_type.as_ref().map(|r| r.link_variables(&vars));
        }
    }
}

/// The read-only symbol index
#[derive(Debug, Default)]
pub struct SymbolIndex {
    classes: BTreeMap<String, ClassInfo>,
    subtypes: BTreeMap<String, Vec<String>>,
}

impl SymbolIndex {
    /// Build an index from class declarations, linking type variables and subtype edges
    pub fn new(classes: Vec<ClassInfo>) -> Self {
        let mut by_name = BTreeMap::new();
        for mut class in classes {
            class.link_type_variables();
            if by_name.contains_key(&class.name) {
                warn!("Duplicate class in index, keeping the last declaration: {}", class.name);
            }
            by_name.insert(class.name.clone(), class);
        }

        let mut subtypes: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for class in by_name.values() {
            for supertype in class.supertypes() {
                if let Some(name) = supertype.class_name() {
                    subtypes.entry(name.to_string()).or_default().push(class.name.clone());
                }
            }
        }

        debug!("Indexed {} classes", by_name.len());
        Self {
            classes: by_name,
            subtypes,
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    /// All classes in name order
    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes that directly extend or implement `name`
    pub fn direct_subtypes(&self, name: &str) -> &[String] {
        self.subtypes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any transitive subtype of `name` is a concrete class
    pub fn has_concrete_descendant(&self, name: &str) -> bool {
        let mut visited = BTreeSet::new();
        let mut pending: Vec<&str> = vec![name];
        while let Some(current) = pending.pop() {
            for sub in self.direct_subtypes(current) {
                if !visited.insert(sub.as_str()) {
                    continue;
                }
                if self.class(sub).map(ClassInfo::is_concrete).unwrap_or(false) {
                    return true;
                }
                pending.push(sub);
            }
        }
        false
    }
}
