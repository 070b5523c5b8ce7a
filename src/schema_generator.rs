use crate::annotations::{openapi, openapi_annotation};
use crate::index::{simple_name, Annotation, ClassInfo, TypeRef};
use crate::type_resolver::{Capability, TypeResolver};
use heck::ToUpperCamelCase;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Prefix of every component schema reference
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Schema generator - converts resolved types to OpenAPI schemas
pub struct SchemaGenerator<'r, 'a> {
    /// Type resolver for looking up class definitions and generic bindings
    resolver: &'r TypeResolver<'a>,
    /// Generated component schemas keyed by component name
    schemas: BTreeMap<String, Schema>,
    /// Type signature -> component name
    component_keys: HashMap<String, String>,
    /// Component names currently being generated (cycle guard)
    in_progress: HashSet<String>,
    /// Render enums without constants as plain strings
    enum_fallback: bool,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a component schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Properties for object types
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    /// Required property names for object types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

impl Schema {
    /// A schema of the given type
    pub fn of_type(schema_type: &str) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    fn formatted(schema_type: &str, format: &str) -> Self {
        Schema {
            format: Some(format.to_string()),
            ..Schema::of_type(schema_type)
        }
    }

    /// A reference to the named component schema
    pub fn reference(component: &str) -> Self {
        Schema {
            reference: Some(format!("{}{}", SCHEMA_REF_PREFIX, component)),
            ..Default::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema {
            items: Some(Box::new(items)),
            ..Schema::of_type("array")
        }
    }

    pub fn object() -> Self {
        Schema::of_type("object")
    }

    pub fn is_array(&self) -> bool {
        self.schema_type.as_deref() == Some("array")
    }
}

/// Schema for a well-known value type, `None` for anything else
fn primitive_schema(name: &str) -> Option<Schema> {
    let local = name.strip_prefix("java.lang.").unwrap_or(name);
    let schema = match local {
        "String" | "CharSequence" | "char" | "Character" => Schema::of_type("string"),
        "int" | "Integer" | "short" | "Short" | "byte" | "Byte" => Schema::formatted("integer", "int32"),
        "long" | "Long" | "java.math.BigInteger" => Schema::formatted("integer", "int64"),
        "float" | "Float" => Schema::formatted("number", "float"),
        "double" | "Double" => Schema::formatted("number", "double"),
        "java.math.BigDecimal" | "Number" => Schema::of_type("number"),
        "boolean" | "Boolean" => Schema::of_type("boolean"),
        "java.util.UUID" => Schema::formatted("string", "uuid"),
        "java.time.LocalDate" => Schema::formatted("string", "date"),
        "java.time.LocalDateTime" | "java.time.OffsetDateTime" | "java.time.ZonedDateTime"
        | "java.time.Instant" | "java.util.Date" => Schema::formatted("string", "date-time"),
        "java.util.Map" | "java.util.HashMap" | "java.util.TreeMap" | "Object" => Schema::object(),
        _ => return None,
    };
    Some(schema)
}

/// Interpret annotation text according to the schema type, falling back to a string
pub fn typed_value(schema: &Schema, text: &str) -> Value {
    match schema.schema_type.as_deref() {
        Some("integer") => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(text)),
        Some("number") => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(text)),
        Some("boolean") => text
            .trim()
            .parse::<bool>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(text)),
        Some("array") => match &schema.items {
            Some(items) => Value::Array(vec![typed_value(items, text)]),
            None => Value::from(text),
        },
        _ => Value::from(text),
    }
}

/// Apply the attributes of a `@Schema` annotation to a schema
pub fn apply_schema_annotation(schema: &mut Schema, annotation: &Annotation) {
    if let Some(schema_type) = annotation.string("type").filter(|t| *t != "DEFAULT") {
        schema.schema_type = Some(schema_type.to_ascii_lowercase());
    }
    if let Some(format) = annotation.string("format") {
        schema.format = Some(format.to_string());
    }
    if let Some(title) = annotation.string("title") {
        schema.title = Some(title.to_string());
    }
    if let Some(description) = annotation.string("description") {
        schema.description = Some(description.to_string());
    }
    if let Some(pattern) = annotation.string("pattern") {
        schema.pattern = Some(pattern.to_string());
    }
    let enumeration = annotation.strings("enumeration");
    if !enumeration.is_empty() {
        schema.enum_values = Some(enumeration);
    }
    if let Some(default) = annotation.text("defaultValue") {
        schema.default = Some(typed_value(schema, &default));
    }
    if let Some(example) = annotation.text("example") {
        schema.example = Some(typed_value(schema, &example));
    }
    if let Some(deprecated) = annotation.bool("deprecated") {
        schema.deprecated = Some(deprecated);
    }
}

impl<'r, 'a> SchemaGenerator<'r, 'a> {
    /// Create a new SchemaGenerator with a TypeResolver
    pub fn new(resolver: &'r TypeResolver<'a>, enum_fallback: bool) -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            resolver,
            schemas: BTreeMap::new(),
            component_keys: HashMap::new(),
            in_progress: HashSet::new(),
            enum_fallback,
        }
    }

    /// Generate a schema for a resolved type
    pub fn generate_schema(&mut self, ty: &TypeRef) -> Schema {
        debug!("Generating schema for type: {}", ty);

        match self.resolver.classify(ty) {
            Capability::OptionalOf(inner) => return self.generate_schema(&inner),
            Capability::CollectionOf(elem) => return Schema::array(self.generate_schema(&elem)),
            Capability::PlainValue | Capability::Bean => {}
        }

        let Some(name) = ty.class_name() else {
            // Unresolved type variables are already replaced by the resolver
            return Schema::object();
        };
        if let Some(schema) = primitive_schema(name) {
            return schema;
        }

        let resolver = self.resolver;
        match resolver.index().class(name) {
            Some(class) if class.is_enum() => {
                let key = self.component_key(ty);
                if !self.schemas.contains_key(&key) {
                    let schema = self.enum_schema(class);
                    self.schemas.insert(key.clone(), schema);
                }
                Schema::reference(&key)
            }
            Some(class) => {
                let key = self.component_key(ty);
                self.generate_class_schema(class, ty, &key);
                Schema::reference(&key)
            }
            None => {
                debug!("Unknown type: {}, using object placeholder", ty);
                Schema::object()
            }
        }
    }

    /// Schema for a parameter, honouring a `@Schema` override and an enum companion type.
    ///
    /// When the override names a non-enum `implementation` carrying a class-level `@Schema`,
    /// the enum is rendered inline with the companion's metadata merged in. Enums are also
    /// inlined when `inline_enum` is set or an override is present, so local attributes stay
    /// next to the values.
    pub fn parameter_schema(&mut self, ty: &TypeRef, overrides: Option<&Annotation>, inline_enum: bool) -> Schema {
        match self.resolver.classify(ty) {
            Capability::OptionalOf(inner) => return self.parameter_schema(&inner, overrides, inline_enum),
            Capability::CollectionOf(elem) => {
                let mut schema = Schema::array(self.parameter_schema(&elem, None, inline_enum));
                if let Some(overrides) = overrides {
                    apply_schema_annotation(&mut schema, overrides);
                }
                return schema;
            }
            Capability::PlainValue | Capability::Bean => {}
        }

        let resolver = self.resolver;
        let implementation = overrides
            .and_then(|o| o.string("implementation"))
            .and_then(|name| resolver.index().class(name));

        let mut schema = match (resolver.enum_class(ty), implementation) {
            (Some(enum_class), Some(companion)) if !companion.is_enum() => {
                let mut schema = self.enum_schema(enum_class);
                if let Some(class_schema) = openapi_annotation(&companion.annotations, openapi::SCHEMA) {
                    apply_schema_annotation(&mut schema, class_schema);
                }
                schema
            }
            (_, Some(implementation)) => self.generate_schema(&TypeRef::named(implementation.name.as_str())),
            (Some(enum_class), None) if inline_enum || overrides.is_some() => self.enum_schema(enum_class),
            _ => self.generate_schema(ty),
        };

        if let Some(overrides) = overrides {
            if schema.reference.is_none() {
                apply_schema_annotation(&mut schema, overrides);
            }
        }
        schema
    }

    /// Inline schema carrying the enum's constants.
    ///
    /// A class-level `@Schema` on the enum applies on top. Its `implementation` may name another
    /// enum, whose constants are used instead, or a value type such as `java.lang.String`.
    pub fn enum_schema(&self, class: &ClassInfo) -> Schema {
        let class_schema = openapi_annotation(&class.annotations, openapi::SCHEMA);
        let mut schema = class_schema
            .and_then(|s| s.string("implementation"))
            .filter(|implementation| *implementation != class.name)
            .and_then(|implementation| self.enum_implementation(implementation))
            .unwrap_or_else(|| self.constants_schema(class));
        if let Some(class_schema) = class_schema {
            apply_schema_annotation(&mut schema, class_schema);
        }
        schema
    }

    fn enum_implementation(&self, name: &str) -> Option<Schema> {
        if let Some(schema) = primitive_schema(name) {
            return Some(schema);
        }
        match self.resolver.index().class(name) {
            Some(class) if class.is_enum() => Some(self.constants_schema(class)),
            _ => {
                debug!("Enum implementation {} is neither an enum nor a value type", name);
                None
            }
        }
    }

    fn constants_schema(&self, class: &ClassInfo) -> Schema {
        if class.enum_constants.is_empty() {
            debug!("Enum {} declares no constants", class.name);
            return if self.enum_fallback {
                Schema::of_type("string")
            } else {
                Schema::default()
            };
        }
        Schema {
            enum_values: Some(class.enum_constants.clone()),
            ..Schema::of_type("string")
        }
    }

    /// Component name for a type: the class-level `@Schema(name)` or the simple class name,
    /// followed by its type arguments
    fn component_key(&mut self, ty: &TypeRef) -> String {
        let signature = ty.to_string();
        if let Some(key) = self.component_keys.get(&signature) {
            return key.clone();
        }

        let class_name = ty.class_name().unwrap_or("Object");
        let declared = self
            .resolver
            .index()
            .class(class_name)
            .and_then(|class| openapi_annotation(&class.annotations, openapi::SCHEMA))
            .and_then(|schema| schema.string("name"));
        let mut base = declared.unwrap_or_else(|| simple_name(class_name)).to_string();
        for arg in ty.args() {
            let arg_name = arg.class_name().map(simple_name).unwrap_or("Object");
            base.push_str(&arg_name.to_upper_camel_case());
        }

        let taken: HashSet<&String> = self.component_keys.values().collect();
        let mut key = base.clone();
        let mut suffix = 2;
        while taken.contains(&key) {
            key = format!("{}{}", base, suffix);
            suffix += 1;
        }

        self.component_keys.insert(signature, key.clone());
        key
    }

    /// Generate an object schema for a class and add it to the schemas collection
    fn generate_class_schema(&mut self, class: &ClassInfo, ty: &TypeRef, key: &str) {
        // Check if already generated or on the current generation path
        if self.schemas.contains_key(key) || self.in_progress.contains(key) {
            debug!("Schema for {} already exists", key);
            return;
        }

        debug!("Generating class schema for: {}", ty);
        self.in_progress.insert(key.to_string());

        let mut schema = Schema::object();
        if let Some(class_schema) = openapi_annotation(&class.annotations, openapi::SCHEMA) {
            apply_schema_annotation(&mut schema, class_schema);
        }

        let resolver = self.resolver;
        for ancestor in resolver.ancestry(ty) {
            for field in ancestor.class.fields.iter().filter(|f| !f.is_static) {
                let field_schema = openapi_annotation(&field.annotations, openapi::SCHEMA);
                if field_schema.and_then(|s| s.bool("hidden")).unwrap_or(false) {
                    continue;
                }

                let property_name = field_schema
                    .and_then(|s| s.string("name"))
                    .unwrap_or(&field.name)
                    .to_string();
                // Derived declarations shadow inherited ones
                if schema.properties.contains_key(&property_name) {
                    continue;
                }

                let field_ty = resolver.substitute(&field.ty, &ancestor.bindings);
                let property = self.parameter_schema(&field_ty, field_schema, false);
                if field_schema.and_then(|s| s.bool("required")).unwrap_or(false) {
                    schema.required.push(property_name.clone());
                }
                schema.properties.insert(property_name, property);
            }
        }

        self.in_progress.remove(key);
        self.schemas.insert(key.to_string(), schema);
    }

    pub fn resolver(&self) -> &'r TypeResolver<'a> {
        self.resolver
    }

    /// Get all generated schemas
    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Namespace, Vocabulary};
    use crate::index::SymbolIndex;
    use pretty_assertions::assert_eq;

    /// Helper function to build an index from YAML class declarations
    fn index_from_yaml(yaml: &str) -> SymbolIndex {
        let classes: Vec<ClassInfo> = serde_yaml::from_str(yaml).unwrap();
        SymbolIndex::new(classes)
    }

    fn resolver(index: &SymbolIndex) -> TypeResolver<'_> {
        TypeResolver::new(index, Vocabulary::new(vec![Namespace::Jakarta]))
    }

    fn ty(signature: &str) -> TypeRef {
        signature.parse().unwrap()
    }

    #[test]
    fn test_primitive_types() {
        let index = index_from_yaml("[]");
        let resolver = resolver(&index);
        let mut generator = SchemaGenerator::new(&resolver, true);

        assert_eq!(generator.generate_schema(&ty("java.lang.String")), Schema::of_type("string"));
        assert_eq!(generator.generate_schema(&ty("int")).format, Some("int32".to_string()));
        assert_eq!(generator.generate_schema(&ty("Long")).format, Some("int64".to_string()));
        assert_eq!(generator.generate_schema(&ty("double")).schema_type, Some("number".to_string()));
        assert_eq!(generator.generate_schema(&ty("boolean")), Schema::of_type("boolean"));
        assert_eq!(generator.generate_schema(&ty("java.time.Instant")).format, Some("date-time".to_string()));
        assert!(generator.schemas().is_empty());
    }

    #[test]
    fn test_wrappers() {
        let index = index_from_yaml("[]");
        let resolver = resolver(&index);
        let mut generator = SchemaGenerator::new(&resolver, true);

        // Optional<T> unwraps to T's schema
        let optional = generator.generate_schema(&ty("java.util.Optional<Integer>"));
        assert_eq!(optional.schema_type, Some("integer".to_string()));

        let list = generator.generate_schema(&ty("java.util.List<String>"));
        assert!(list.is_array());
        assert_eq!(list.items.unwrap().schema_type, Some("string".to_string()));

        let array = generator.generate_schema(&ty("long[]"));
        assert_eq!(array.items.unwrap().format, Some("int64".to_string()));
    }

    #[test]
    fn test_unknown_type_fallback() {
        let index = index_from_yaml("[]");
        let resolver = resolver(&index);
        let mut generator = SchemaGenerator::new(&resolver, true);

        let schema = generator.generate_schema(&ty("com.acme.Unknown"));
        assert_eq!(schema, Schema::object());
        assert!(schema.reference.is_none());
    }

    #[test]
    fn test_class_schema_with_inherited_generic_field() {
        let index = index_from_yaml(
            r#"
- name: t.Entity
  type_params: [{ name: ID }]
  fields:
    - { name: id, type: ID }
- name: t.User
  superclass: "t.Entity<java.lang.Long>"
  annotations:
    - name: org.eclipse.microprofile.openapi.annotations.media.Schema
      values: { description: A user }
  fields:
    - name: name
      type: String
      annotations:
        - name: org.eclipse.microprofile.openapi.annotations.media.Schema
          values: { required: true }
    - name: password
      type: String
      annotations:
        - name: org.eclipse.microprofile.openapi.annotations.media.Schema
          values: { hidden: true }
    - { name: COUNT, type: int, static: true }
    - { name: friends, type: "java.util.List<t.User>" }
"#,
        );
        let resolver = resolver(&index);
        let mut generator = SchemaGenerator::new(&resolver, true);

        let schema = generator.generate_schema(&ty("t.User"));
        assert_eq!(schema, Schema::reference("User"));

        let user = &generator.schemas()["User"];
        assert_eq!(user.description, Some("A user".to_string()));
        let names: Vec<&String> = user.properties.keys().collect();
        assert_eq!(names, vec!["friends", "id", "name"]);
        assert_eq!(user.required, vec!["name".to_string()]);
        assert_eq!(user.properties["id"].format, Some("int64".to_string()));
        // self reference resolves to the component being generated
        assert_eq!(
            user.properties["friends"].items.as_deref(),
            Some(&Schema::reference("User"))
        );
        assert_eq!(generator.schemas().len(), 1);
    }

    #[test]
    fn test_generic_components_are_keyed_by_arguments() {
        let index = index_from_yaml(
            r#"
- name: t.Page
  type_params: [{ name: T }]
  fields:
    - { name: items, type: "java.util.List<T>" }
- name: t.Item
- name: other.Item
"#,
        );
        let resolver = resolver(&index);
        let mut generator = SchemaGenerator::new(&resolver, true);

        assert_eq!(generator.generate_schema(&ty("t.Page<t.Item>")), Schema::reference("PageItem"));
        assert_eq!(generator.generate_schema(&ty("t.Item")), Schema::reference("Item"));
        assert_eq!(generator.generate_schema(&ty("other.Item")), Schema::reference("Item2"));
        assert_eq!(generator.generate_schema(&ty("t.Item")), Schema::reference("Item"));

        let page = &generator.schemas()["PageItem"];
        assert_eq!(
            page.properties["items"].items.as_deref(),
            Some(&Schema::reference("Item"))
        );
    }

    #[test]
    fn test_enum_schemas() {
        let index = index_from_yaml(
            r#"
- name: t.Color
  kind: enum
  enum_constants: [RED, GREEN]
- name: t.Empty
  kind: enum
"#,
        );
        let resolver = resolver(&index);

        let mut generator = SchemaGenerator::new(&resolver, true);
        assert_eq!(generator.generate_schema(&ty("t.Color")), Schema::reference("Color"));
        assert_eq!(
            generator.schemas()["Color"].enum_values,
            Some(vec!["RED".to_string(), "GREEN".to_string()])
        );
        generator.generate_schema(&ty("t.Empty"));
        assert_eq!(generator.schemas()["Empty"], Schema::of_type("string"));

        let mut strict = SchemaGenerator::new(&resolver, false);
        strict.generate_schema(&ty("t.Empty"));
        assert_eq!(strict.schemas()["Empty"], Schema::default());
    }

    #[test]
    fn test_enum_class_schema_annotation() {
        let index = index_from_yaml(
            r#"
- name: t.TestEnum
  kind: enum
  enum_constants: [VAL1, VAL2, VAL3]
- name: t.TestEnumWithSchema
  kind: enum
  enum_constants: [V1, V2, V3]
  annotations:
    - name: org.eclipse.microprofile.openapi.annotations.media.Schema
      values:
        name: RestrictedEnum
        title: Restricted enum with fewer values
        enumeration: [VAL1, VAL3]
        implementation: t.TestEnum
- name: t.Level
  kind: enum
  enum_constants: [LOW, HIGH]
  annotations:
    - name: org.eclipse.microprofile.openapi.annotations.media.Schema
      values: { description: Alert level, implementation: java.lang.String }
"#,
        );
        let resolver = resolver(&index);
        let mut generator = SchemaGenerator::new(&resolver, true);

        assert_eq!(
            generator.generate_schema(&ty("t.TestEnumWithSchema")),
            Schema::reference("RestrictedEnum")
        );
        let restricted = &generator.schemas()["RestrictedEnum"];
        assert_eq!(restricted.enum_values, Some(vec!["VAL1".to_string(), "VAL3".to_string()]));
        assert_eq!(restricted.title, Some("Restricted enum with fewer values".to_string()));
        assert!(!generator.schemas().contains_key("TestEnumWithSchema"));

        let level = generator.parameter_schema(&ty("t.Level"), None, true);
        assert_eq!(level.schema_type, Some("string".to_string()));
        assert_eq!(level.enum_values, None);
        assert_eq!(level.description, Some("Alert level".to_string()));

        assert_eq!(generator.generate_schema(&ty("t.TestEnum")), Schema::reference("TestEnum"));
        assert_eq!(
            generator.schemas()["TestEnum"].enum_values.as_ref().map(Vec::len),
            Some(3)
        );
    }

    #[test]
    fn test_enum_companion_is_inlined() {
        let index = index_from_yaml(
            r#"
- name: t.Color
  kind: enum
  enum_constants: [RED, GREEN]
- name: t.ColorDoc
  annotations:
    - name: org.eclipse.microprofile.openapi.annotations.media.Schema
      values: { description: Paint color, defaultValue: GREEN, title: Color }
"#,
        );
        let resolver = resolver(&index);
        let mut generator = SchemaGenerator::new(&resolver, true);

        let overrides = Annotation::new("org.eclipse.microprofile.openapi.annotations.media.Schema")
            .with("implementation", "t.ColorDoc");
        let schema = generator.parameter_schema(&ty("t.Color"), Some(&overrides), false);

        assert_eq!(schema.enum_values, Some(vec!["RED".to_string(), "GREEN".to_string()]));
        assert_eq!(schema.description, Some("Paint color".to_string()));
        assert_eq!(schema.title, Some("Color".to_string()));
        assert_eq!(schema.default, Some(Value::from("GREEN")));
        assert!(generator.schemas().is_empty());
    }

    #[test]
    fn test_typed_values() {
        assert_eq!(typed_value(&Schema::of_type("integer"), "10"), Value::from(10));
        assert_eq!(typed_value(&Schema::of_type("boolean"), "true"), Value::from(true));
        assert_eq!(typed_value(&Schema::of_type("integer"), "ten"), Value::from("ten"));
        assert_eq!(
            typed_value(&Schema::array(Schema::of_type("integer")), "5"),
            Value::Array(vec![Value::from(5)])
        );
    }

    #[test]
    fn test_schema_annotation_override() {
        let mut schema = Schema::of_type("string");
        let annotation = Annotation::new("org.eclipse.microprofile.openapi.annotations.media.Schema")
            .with("type", "INTEGER")
            .with("example", "42")
            .with("deprecated", true);
        apply_schema_annotation(&mut schema, &annotation);

        assert_eq!(schema.schema_type, Some("integer".to_string()));
        assert_eq!(schema.example, Some(Value::from(42)));
        assert_eq!(schema.deprecated, Some(true));
    }
}
