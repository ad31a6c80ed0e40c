//! Type resolver - turns parsed Rust type definitions into type descriptors.
//!
//! Structs, unit enums, newtypes and `type` aliases found in the parsed sources are indexed by
//! name. Field types are resolved lazily, so self-referencing and mutually recursive models
//! describe without unbounded recursion.

use crate::config::{lower_camel_cased_name_handler, lower_snake_cased_name_handler};
use crate::descriptor::{FieldDescriptor, PrimitiveKind, StructDef, TypeDescriptor, TypeRef};
use crate::error::{Error, Result};
use crate::source::ParsedFile;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

static ATTR_ARG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_][A-Za-z0-9_]*)\s*(?:=\s*"((?:[^"\\]|\\.)*)")?"#).expect("valid attribute pattern")
});

/// A type expression: `Vec<Option<User>>` is `Vec` with one argument, `Option<User>`.
///
/// References are named `&` and arrays/slices `[]`, each with the element as only argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Last path segment, e.g. `HashMap` for `std::collections::HashMap<K, V>`
    pub name: String,
    pub generic_args: Vec<TypeInfo>,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_args: Vec::new(),
        }
    }

    /// Parse a type expression such as `HashMap<String, Vec<Role>>`
    pub fn parse(expression: &str) -> Result<Self> {
        let ty: syn::Type = syn::parse_str(expression)?;
        Ok(Self::from_type(&ty))
    }

    pub fn from_type(ty: &syn::Type) -> Self {
        match ty {
            syn::Type::Path(type_path) => Self::from_path(&type_path.path),
            syn::Type::Reference(reference) => Self {
                name: "&".to_string(),
                generic_args: vec![Self::from_type(&reference.elem)],
            },
            syn::Type::Array(array) => Self {
                name: "[]".to_string(),
                generic_args: vec![Self::from_type(&array.elem)],
            },
            syn::Type::Slice(slice) => Self {
                name: "[]".to_string(),
                generic_args: vec![Self::from_type(&slice.elem)],
            },
            syn::Type::Paren(paren) => Self::from_type(&paren.elem),
            syn::Type::Group(group) => Self::from_type(&group.elem),
            _ => Self::new("Unknown"),
        }
    }

    fn from_path(path: &syn::Path) -> Self {
        let Some(segment) = path.segments.last() else {
            return Self::new("Unknown");
        };
        let mut info = Self::new(segment.ident.to_string());
        if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
            for arg in &args.args {
                if let syn::GenericArgument::Type(inner_ty) = arg {
                    info.generic_args.push(Self::from_type(inner_ty));
                }
            }
        }
        info
    }

    fn arg(&self, index: usize) -> TypeInfo {
        self.generic_args
            .get(index)
            .cloned()
            .unwrap_or_else(|| TypeInfo::new("Unknown"))
    }

    /// Component-safe name of a generic instantiation: `Page<User>` -> `Page_User`
    fn instance_name(&self) -> String {
        std::iter::once(self.name.replace(['&', '[', ']'], ""))
            .chain(self.generic_args.iter().map(TypeInfo::instance_name))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }

    fn substitute(&self, bindings: &HashMap<String, TypeInfo>) -> TypeInfo {
        if self.generic_args.is_empty() {
            if let Some(bound) = bindings.get(&self.name) {
                return bound.clone();
            }
        }
        TypeInfo {
            name: self.name.clone(),
            generic_args: self.generic_args.iter().map(|arg| arg.substitute(bindings)).collect(),
        }
    }
}

/// `#[serde(..)]` directives understood on fields and containers
#[derive(Debug, Clone, Default)]
pub struct SerdeAttributes {
    pub rename: Option<String>,
    pub rename_all: Option<String>,
    pub skip: bool,
    pub flatten: bool,
    /// `default` or `skip_serializing_if`
    pub omit_empty: bool,
}

/// `#[schema(..)]` directives
#[derive(Debug, Clone, Default)]
pub struct SchemaAttributes {
    pub optional: bool,
    pub string: bool,
    pub inline: bool,
    pub read_only: bool,
    pub unique: bool,
    pub description: Option<String>,
    pub default: Option<String>,
    pub enum_values: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub schema_type: Option<String>,
    pub format: Option<String>,
    pub model_description: Option<String>,
    pub param: Option<String>,
}

#[derive(Debug, Clone)]
struct FieldDef {
    name: String,
    type_info: TypeInfo,
    docs: Option<String>,
    serde_attrs: SerdeAttributes,
    schema_attrs: SchemaAttributes,
}

#[derive(Debug, Clone)]
enum Definition {
    Struct {
        generics: Vec<String>,
        docs: Option<String>,
        rename_all: Option<String>,
        fields: Vec<FieldDef>,
    },
    /// Unit-only enum, variants already renamed
    Enum { variants: Vec<String> },
    /// Newtype struct or `type` alias
    Alias { generics: Vec<String>, target: TypeInfo },
    /// Data-carrying enum or multi-field tuple struct
    Opaque,
}

#[derive(Debug, Default)]
struct TypeIndex {
    definitions: HashMap<String, Definition>,
}

/// Type resolver - describes type expressions using the indexed definitions
#[derive(Debug, Clone)]
pub struct TypeResolver {
    index: Arc<TypeIndex>,
}

impl TypeResolver {
    /// Index every struct, enum and alias of the parsed files; the first definition of a name wins
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        let mut index = TypeIndex::default();
        for parsed_file in parsed_files {
            collect_items(&parsed_file.syntax_tree.items, &mut index);
        }
        debug!("Indexed {} type definitions", index.definitions.len());
        Self { index: Arc::new(index) }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.definitions.contains_key(name)
    }

    /// Describe a type expression, failing when any named type is unknown
    pub fn resolve_str(&self, expression: &str) -> Result<TypeDescriptor> {
        let info = TypeInfo::parse(expression)?;
        if let Some(unknown) = self.first_unknown(&info) {
            return Err(Error::UnknownType(unknown));
        }
        Ok(self.describe(&info))
    }

    fn first_unknown(&self, info: &TypeInfo) -> Option<String> {
        match builtin(&self.index, info) {
            // arguments of scalars such as `DateTime<Utc>` are not inspected
            Some(Builtin::Primitive(_) | Builtin::Value) => None,
            Some(_) => info.generic_args.iter().find_map(|arg| self.first_unknown(arg)),
            None if self.contains(&info.name) => {
                info.generic_args.iter().find_map(|arg| self.first_unknown(arg))
            }
            None => Some(info.name.clone()),
        }
    }

    /// Describe a type expression; unknown names describe as untyped values
    pub fn describe(&self, info: &TypeInfo) -> TypeDescriptor {
        describe(&self.index, info)
    }
}

enum Builtin {
    Pointer,
    Sequence,
    Map,
    Value,
    Primitive(PrimitiveKind),
}

/// Containers are always builtin; scalar names yield to a user definition of the same name
fn builtin(index: &TypeIndex, info: &TypeInfo) -> Option<Builtin> {
    let builtin = match info.name.as_str() {
        "Option" | "Box" | "Arc" | "Rc" | "Cow" | "&" => Builtin::Pointer,
        "Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "IndexSet" | "[]" => Builtin::Sequence,
        "HashMap" | "BTreeMap" | "IndexMap" => Builtin::Map,
        name if index.definitions.contains_key(name) => return None,
        "Value" => Builtin::Value,
        name => Builtin::Primitive(primitive_kind(name)?),
    };
    Some(builtin)
}

fn primitive_kind(name: &str) -> Option<PrimitiveKind> {
    let kind = match name {
        "bool" => PrimitiveKind::Bool,
        "isize" => PrimitiveKind::Int,
        "i8" => PrimitiveKind::Int8,
        "i16" => PrimitiveKind::Int16,
        "i32" => PrimitiveKind::Int32,
        "i64" | "i128" => PrimitiveKind::Int64,
        "usize" => PrimitiveKind::Uint,
        "u8" => PrimitiveKind::Uint8,
        "u16" => PrimitiveKind::Uint16,
        "u32" => PrimitiveKind::Uint32,
        "u64" | "u128" => PrimitiveKind::Uint64,
        "f32" => PrimitiveKind::Float32,
        "f64" => PrimitiveKind::Float64,
        "String" | "str" | "char" | "Uuid" | "PathBuf" => PrimitiveKind::String,
        "SystemTime" | "DateTime" | "NaiveDateTime" | "NaiveDate" | "OffsetDateTime"
        | "PrimitiveDateTime" | "Date" => PrimitiveKind::Timestamp,
        "Duration" => PrimitiveKind::Duration,
        "Number" | "Decimal" | "BigDecimal" => PrimitiveKind::Number,
        _ => return None,
    };
    Some(kind)
}

fn describe(index: &Arc<TypeIndex>, info: &TypeInfo) -> TypeDescriptor {
    describe_expanding(index, info, &mut Vec::new())
}

/// `expanding` holds the aliases whose targets are being described; struct fields are lazy and
/// start over with an empty stack.
fn describe_expanding(index: &Arc<TypeIndex>, info: &TypeInfo, expanding: &mut Vec<String>) -> TypeDescriptor {
    match builtin(index, info) {
        Some(Builtin::Pointer) => TypeDescriptor::pointer_to(describe_expanding(index, &info.arg(0), expanding)),
        Some(Builtin::Sequence) => TypeDescriptor::slice_of(describe_expanding(index, &info.arg(0), expanding)),
        Some(Builtin::Map) => TypeDescriptor::map_of(
            describe_expanding(index, &info.arg(0), expanding),
            describe_expanding(index, &info.arg(1), expanding),
        ),
        Some(Builtin::Value) => TypeDescriptor::Interface,
        Some(Builtin::Primitive(kind)) => TypeDescriptor::primitive(kind),
        None => describe_defined(index, info, expanding),
    }
}

fn describe_defined(index: &Arc<TypeIndex>, info: &TypeInfo, expanding: &mut Vec<String>) -> TypeDescriptor {
    let Some(definition) = index.definitions.get(&info.name) else {
        warn!("Could not resolve type: {}", info.name);
        return TypeDescriptor::Interface;
    };
    match definition {
        Definition::Struct {
            generics,
            docs,
            rename_all,
            fields,
        } => {
            let bindings = bind_generics(generics, info);
            let mut def = StructDef::new(info.instance_name());
            for field in fields {
                let type_info = field.type_info.substitute(&bindings);
                def = def.field(field_descriptor(index, field, type_info, rename_all.as_deref()));
            }
            if let Some(docs) = docs {
                let documentation = BTreeMap::from([(String::new(), docs.clone())]);
                def = def.with_documentation(Arc::new(move || documentation.clone()));
            }
            def.build()
        }
        Definition::Enum { variants } => TypeDescriptor::string_enum(&info.name, variants.clone()),
        Definition::Alias { generics, target } => {
            let key = info.instance_name();
            if expanding.contains(&key) {
                warn!("{} refers to itself, describing the inner reference as a value", key);
                return TypeDescriptor::Interface;
            }
            let target = target.substitute(&bind_generics(generics, info));
            expanding.push(key);
            let described = describe_expanding(index, &target, expanding);
            expanding.pop();
            match described {
                TypeDescriptor::Primitive(primitive) if primitive.name.is_none() => {
                    TypeDescriptor::named_primitive(&info.name, primitive.kind)
                }
                described => described,
            }
        }
        Definition::Opaque => {
            debug!("{} has no schema representation, describing as a value", info.name);
            TypeDescriptor::Interface
        }
    }
}

fn bind_generics(generics: &[String], info: &TypeInfo) -> HashMap<String, TypeInfo> {
    generics
        .iter()
        .enumerate()
        .map(|(i, param)| (param.clone(), info.arg(i)))
        .collect()
}

fn field_descriptor(
    index: &Arc<TypeIndex>,
    field: &FieldDef,
    type_info: TypeInfo,
    rename_all: Option<&str>,
) -> FieldDescriptor {
    let is_option = type_info.name == "Option";
    let lazy_index = Arc::clone(index);
    let ty = TypeRef::new(move || describe(&lazy_index, &type_info));
    let mut descriptor = FieldDescriptor::with_type(field.name.clone(), ty);

    let serde = &field.serde_attrs;
    descriptor.embedded = serde.flatten;
    if let Some(name) = &serde.rename {
        descriptor = descriptor.rename(name);
    } else if let Some(rule) = rename_all {
        if !serde.flatten {
            descriptor = descriptor.rename(apply_rename_rule(rule, &field.name));
        }
    }
    if serde.skip {
        descriptor = descriptor.skip();
    }
    if serde.omit_empty {
        descriptor = descriptor.omit_empty();
    }

    let schema = &field.schema_attrs;
    descriptor.meta.optional = schema.optional || is_option;
    descriptor.tag.stringify = schema.string;
    descriptor.tag.inline = schema.inline;
    descriptor.meta.read_only = schema.read_only;
    descriptor.meta.unique = schema.unique;
    descriptor.meta.description = schema.description.clone().or_else(|| field.docs.clone());
    descriptor.meta.default = schema.default.clone();
    descriptor.meta.enum_values = schema.enum_values.clone();
    descriptor.meta.minimum = schema.minimum;
    descriptor.meta.maximum = schema.maximum;
    descriptor.meta.schema_type = schema.schema_type.clone();
    descriptor.meta.format = schema.format.clone();
    descriptor.meta.model_description = schema.model_description.clone();
    descriptor.meta.param = schema.param.clone();
    descriptor
}

/// Serde `rename_all` rules for `snake_case` source names
fn apply_rename_rule(rule: &str, name: &str) -> String {
    match rule {
        "lowercase" => name.to_lowercase(),
        "UPPERCASE" => name.to_uppercase(),
        "camelCase" => {
            let pascal = pascal_case(name);
            lower_camel_cased_name_handler(&pascal)
        }
        "PascalCase" => pascal_case(name),
        "snake_case" => lower_snake_cased_name_handler(name),
        "SCREAMING_SNAKE_CASE" => lower_snake_cased_name_handler(name).to_uppercase(),
        "kebab-case" => lower_snake_cased_name_handler(name).replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => lower_snake_cased_name_handler(name).replace('_', "-").to_uppercase(),
        _ => name.to_string(),
    }
}

fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn collect_items(items: &[syn::Item], index: &mut TypeIndex) {
    for item in items {
        let (name, definition) = match item {
            syn::Item::Struct(item_struct) => (item_struct.ident.to_string(), parse_struct(item_struct)),
            syn::Item::Enum(item_enum) => (item_enum.ident.to_string(), parse_enum(item_enum)),
            syn::Item::Type(item_type) => (
                item_type.ident.to_string(),
                Definition::Alias {
                    generics: generic_names(&item_type.generics),
                    target: TypeInfo::from_type(&item_type.ty),
                },
            ),
            syn::Item::Mod(item_mod) => {
                if let Some((_, items)) = &item_mod.content {
                    collect_items(items, index);
                }
                continue;
            }
            _ => continue,
        };
        if index.definitions.contains_key(&name) {
            debug!("Duplicate definition of {} ignored", name);
            continue;
        }
        debug!("Indexed type {}", name);
        index.definitions.insert(name, definition);
    }
}

fn generic_names(generics: &syn::Generics) -> Vec<String> {
    generics.type_params().map(|param| param.ident.to_string()).collect()
}

fn parse_struct(item_struct: &syn::ItemStruct) -> Definition {
    let generics = generic_names(&item_struct.generics);
    match &item_struct.fields {
        syn::Fields::Named(named_fields) => Definition::Struct {
            generics,
            docs: parse_docs(&item_struct.attrs),
            rename_all: parse_serde_attributes(&item_struct.attrs).rename_all,
            fields: named_fields.named.iter().filter_map(parse_field).collect(),
        },
        syn::Fields::Unit => Definition::Struct {
            generics,
            docs: parse_docs(&item_struct.attrs),
            rename_all: None,
            fields: Vec::new(),
        },
        syn::Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => Definition::Alias {
            generics,
            target: TypeInfo::from_type(&unnamed.unnamed[0].ty),
        },
        syn::Fields::Unnamed(_) => Definition::Opaque,
    }
}

fn parse_enum(item_enum: &syn::ItemEnum) -> Definition {
    if item_enum
        .variants
        .iter()
        .any(|variant| !matches!(variant.fields, syn::Fields::Unit))
    {
        return Definition::Opaque;
    }
    let rename_all = parse_serde_attributes(&item_enum.attrs).rename_all;
    let variants = item_enum
        .variants
        .iter()
        .map(|variant| {
            let ident = variant.ident.to_string();
            match (parse_serde_attributes(&variant.attrs).rename, &rename_all) {
                (Some(rename), _) => rename,
                (None, Some(rule)) => apply_rename_rule(rule, &lower_snake_cased_name_handler(&ident)),
                (None, None) => ident,
            }
        })
        .collect();
    Definition::Enum { variants }
}

fn parse_field(field: &syn::Field) -> Option<FieldDef> {
    let name = field.ident.as_ref()?.to_string();
    let name = name.strip_prefix("r#").map(str::to_string).unwrap_or(name);
    Some(FieldDef {
        name,
        type_info: TypeInfo::from_type(&field.ty),
        docs: parse_docs(&field.attrs),
        serde_attrs: parse_serde_attributes(&field.attrs),
        schema_attrs: parse_schema_attributes(&field.attrs),
    })
}

/// `///` lines joined by newlines
fn parse_docs(attrs: &[syn::Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(syn::MetaNameValue {
                value:
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(text),
                        ..
                    }),
                ..
            }) => Some(text.value().trim().to_string()),
            _ => None,
        })
        .collect();
    let docs = lines.join("\n").trim().to_string();
    (!docs.is_empty()).then_some(docs)
}

/// Arguments of every `#[<name>(..)]` attribute, as `(key, value)` pairs
fn attribute_args(attrs: &[syn::Attribute], name: &str) -> Vec<(String, Option<String>)> {
    let mut args = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(name)) {
        let Ok(meta_list) = attr.meta.require_list() else {
            continue;
        };
        let tokens_str = meta_list.tokens.to_string();
        for capture in ATTR_ARG.captures_iter(&tokens_str) {
            let key = capture[1].to_string();
            let value = capture.get(2).map(|v| v.as_str().replace("\\\"", "\""));
            args.push((key, value));
        }
    }
    args
}

fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();
    for (key, value) in attribute_args(attrs, "serde") {
        match key.as_str() {
            "rename" => serde_attrs.rename = value,
            "rename_all" => serde_attrs.rename_all = value,
            "skip" | "skip_serializing" => serde_attrs.skip = true,
            "flatten" => serde_attrs.flatten = true,
            "default" | "skip_serializing_if" => serde_attrs.omit_empty = true,
            _ => {}
        }
    }
    serde_attrs
}

fn parse_schema_attributes(attrs: &[syn::Attribute]) -> SchemaAttributes {
    let mut schema = SchemaAttributes::default();
    for (key, value) in attribute_args(attrs, "schema") {
        match key.as_str() {
            "optional" => schema.optional = true,
            "string" => schema.string = true,
            "inline" => schema.inline = true,
            "read_only" => schema.read_only = true,
            "unique" => schema.unique = true,
            "description" => schema.description = value,
            "default" => schema.default = value,
            "enum" => schema.enum_values = value,
            "minimum" => schema.minimum = value.and_then(|v| parse_number(&key, &v)),
            "maximum" => schema.maximum = value.and_then(|v| parse_number(&key, &v)),
            "type" => schema.schema_type = value,
            "format" => schema.format = value,
            "model_description" => schema.model_description = value,
            "param" => schema.param = value,
            other => debug!("Unknown schema attribute: {}", other),
        }
    }
    schema
}

fn parse_number(key: &str, value: &str) -> Option<f64> {
    match value.parse() {
        Ok(number) => Some(number),
        Err(_) => {
            warn!("Ignoring non-numeric {} = {:?}", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::schema_builder::{SchemaBuilder, SchemaTable};
    use crate::source::AstParser;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;

    fn create_resolver_from_code(code: &str) -> TypeResolver {
        let parsed = ParsedFile {
            path: PathBuf::from("models.rs"),
            syntax_tree: AstParser::parse_source(code).unwrap(),
        };
        TypeResolver::new(&[parsed])
    }

    fn schemas_of(resolver: &TypeResolver, expression: &str) -> serde_json::Value {
        let ty = resolver.resolve_str(expression).unwrap();
        let mut table = SchemaTable::new();
        SchemaBuilder::new(&mut table, &Config::default()).add_model(&ty, "");
        serde_json::to_value(&table).unwrap()
    }

    #[test]
    fn test_type_info_parse() {
        let info = TypeInfo::parse("std::collections::HashMap<String, Vec<&Role>>").unwrap();
        assert_eq!(info.name, "HashMap");
        assert_eq!(info.generic_args[1].name, "Vec");
        assert_eq!(info.generic_args[1].generic_args[0].name, "&");
        assert!(TypeInfo::parse("Vec<").is_err());
    }

    #[test]
    fn test_builtin_types() {
        let resolver = create_resolver_from_code("");
        let cases = [
            ("Option<String>", "*String"),
            ("Vec<u8>", "[]u8"),
            ("[i32; 4]", "[]i32"),
            ("BTreeMap<String, f64>", "map[String]f64"),
            ("chrono::DateTime<Utc>", "SystemTime"),
            ("serde_json::Value", "interface {}"),
            ("rust_decimal::Decimal", "Number"),
        ];
        for (expression, expected) in cases {
            assert_eq!(resolver.resolve_str(expression).unwrap().type_string(), expected, "{expression}");
        }
    }

    #[test]
    fn test_recursive_newtypes_terminate() {
        let resolver = create_resolver_from_code(
            r#"
            pub struct Forest(Vec<Forest>);
            pub struct Tree(HashMap<String, Tree>);
            pub struct Ping(Pong);
            pub struct Pong(Option<Ping>);
            pub struct Park { pub forest: Forest, pub tree: Tree }
            "#,
        );

        assert_eq!(resolver.resolve_str("Forest").unwrap().type_string(), "[]interface {}");
        assert_eq!(resolver.resolve_str("Tree").unwrap().type_string(), "map[String]interface {}");
        assert_eq!(resolver.resolve_str("Ping").unwrap().type_string(), "*interface {}");
        assert_eq!(resolver.resolve_str("Vec<Forest>").unwrap().type_string(), "[][]interface {}");

        let schemas = schemas_of(&resolver, "Park");
        assert_eq!(schemas["Park"]["properties"]["forest"]["type"], "array");
        assert_eq!(schemas["Park"]["properties"]["tree"]["type"], "object");
    }

    #[test]
    fn test_resolve_simple_struct() {
        let resolver = create_resolver_from_code(
            r#"
            /// A registered user
            pub struct User {
                /// Unique id
                pub id: u32,
                pub name: String,
                pub email: Option<String>,
            }
            "#,
        );
        assert_eq!(
            schemas_of(&resolver, "User"),
            json!({
                "User": {
                    "description": "A registered user",
                    "required": ["id", "name"],
                    "properties": {
                        "id": {"type": "integer", "format": "integer", "description": "Unique id"},
                        "name": {"type": "string"},
                        "email": {"type": "string"}
                    }
                }
            })
        );
    }

    #[test]
    fn test_serde_attributes() {
        let resolver = create_resolver_from_code(
            r#"
            #[derive(Serialize)]
            #[serde(rename_all = "camelCase")]
            pub struct Account {
                pub user_name: String,
                #[serde(rename = "mail")]
                pub email_address: String,
                #[serde(skip)]
                pub password: String,
                #[serde(default, skip_serializing_if = "Vec::is_empty")]
                pub tags: Vec<String>,
                #[serde(flatten)]
                pub audit: Audit,
            }

            pub struct Audit {
                pub created_by: String,
            }
            "#,
        );
        let schemas = schemas_of(&resolver, "Account");
        let account = &schemas["Account"];

        assert_eq!(account["required"], json!(["userName", "mail", "created_by"]));
        let mut names: Vec<_> = account["properties"].as_object().unwrap().keys().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["created_by", "mail", "tags", "userName"]);
        assert!(schemas.get("Audit").is_none());
    }

    #[test]
    fn test_schema_attributes() {
        let resolver = create_resolver_from_code(
            r#"
            pub struct Pet {
                #[schema(description = "age in years", minimum = "0", maximum = "40", optional)]
                pub age: u8,
                #[schema(enum = "dog|cat", default = "dog")]
                pub kind: String,
                #[schema(string)]
                pub chip: u64,
                #[schema(type = "string", format = "uri", read_only)]
                pub photo: Photo,
            }

            pub struct Photo { pub url: String }
            "#,
        );
        let schemas = schemas_of(&resolver, "Pet");
        let pet = &schemas["Pet"];

        assert_eq!(pet["required"], json!(["kind", "chip", "photo"]));
        assert_eq!(pet["properties"]["age"]["description"], "age in years");
        assert_eq!(pet["properties"]["age"]["maximum"], json!(40.0));
        assert_eq!(pet["properties"]["kind"]["enum"], json!(["dog", "cat"]));
        assert_eq!(pet["properties"]["kind"]["default"], "dog");
        assert_eq!(pet["properties"]["chip"]["type"], "string");
        assert_eq!(
            pet["properties"]["photo"],
            json!({"type": "string", "format": "uri", "readOnly": true})
        );
    }

    #[test]
    fn test_unit_enum_and_aliases() {
        let resolver = create_resolver_from_code(
            r#"
            #[serde(rename_all = "snake_case")]
            pub enum Status { Active, OnHold, #[serde(rename = "gone")] Deleted }
            pub type UserId = u64;
            pub struct Email(String);
            pub enum Shape { Circle(f64), Square { side: f64 } }
            "#,
        );
        let status = resolver.resolve_str("Status").unwrap();
        match &status {
            TypeDescriptor::Primitive(primitive) => {
                assert_eq!(primitive.name.as_deref(), Some("Status"));
                assert_eq!(primitive.variants, vec!["active", "on_hold", "gone"]);
            }
            other => panic!("expected string enum, got {}", other.type_string()),
        }
        assert_eq!(resolver.resolve_str("UserId").unwrap().name(), "UserId");
        assert_eq!(resolver.resolve_str("Email").unwrap().name(), "Email");
        assert!(matches!(resolver.resolve_str("Shape").unwrap(), TypeDescriptor::Interface));
    }

    #[test]
    fn test_generic_struct_instantiation() {
        let resolver = create_resolver_from_code(
            r#"
            pub struct Page<T> { pub items: Vec<T>, pub total: u64 }
            pub struct User { pub id: u64 }
            "#,
        );
        let schemas = schemas_of(&resolver, "Page<User>");

        assert_eq!(
            schemas["Page_User"]["properties"]["items"]["items"]["$ref"],
            "#/components/schemas/User"
        );
        assert!(schemas.get("User").is_some());
    }

    #[test]
    fn test_recursive_structs() {
        let resolver = create_resolver_from_code(
            r#"
            pub struct Node { pub value: i32, pub next: Option<Box<Node>>, pub children: Vec<Node> }
            "#,
        );
        let schemas = schemas_of(&resolver, "Node");

        assert_eq!(schemas["Node"]["properties"]["next"]["$ref"], "#/components/schemas/Node");
        assert_eq!(schemas["Node"]["required"], json!(["value", "children"]));
    }

    #[test]
    fn test_unknown_types() {
        let resolver = create_resolver_from_code("pub struct Order { pub customer: Customer }");

        assert!(matches!(resolver.resolve_str("Vec<Missing>"), Err(Error::UnknownType(name)) if name == "Missing"));
        let schemas = schemas_of(&resolver, "Order");
        assert_eq!(schemas["Order"]["properties"]["customer"], json!({}));
    }

    #[test]
    fn test_definitions_shadow_scalar_names() {
        let resolver = create_resolver_from_code("pub struct Date { pub day: u8 }");
        assert_eq!(resolver.resolve_str("Date").unwrap().type_string(), "Date");
        assert_eq!(resolver.resolve_str("Vec<Date>").unwrap().type_string(), "[]Date");
    }

    #[test]
    fn test_nested_modules_are_indexed() {
        let resolver = create_resolver_from_code("mod models { pub struct Tag { pub label: String } }");
        assert!(resolver.contains("Tag"));
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(apply_rename_rule("camelCase", "user_name"), "userName");
        assert_eq!(apply_rename_rule("PascalCase", "user_name"), "UserName");
        assert_eq!(apply_rename_rule("kebab-case", "user_name"), "user-name");
        assert_eq!(apply_rename_rule("SCREAMING_SNAKE_CASE", "user_name"), "USER_NAME");
    }
}
