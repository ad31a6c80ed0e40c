//! Type descriptors - a closed, reflection-free model of the types a service exchanges.
//!
//! Every type that can appear in a request or response is described by a [`TypeDescriptor`].
//! Struct fields refer to their types lazily through [`TypeRef`], so self-referencing and
//! mutually-referencing types can be described without building an infinite value.
//!
//! Types opt into descriptions through the [`Describe`] trait. Implementations are provided for
//! the primitives and standard containers; application structs implement it by hand or are
//! described from source by the [`crate::type_resolver`].

use crate::schema_builder::Schema;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Primitive kinds understood by the schema builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    /// Platform sized signed integer
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    /// Platform sized unsigned integer
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    /// Point in time, serialized as an RFC 3339 string
    Timestamp,
    /// Elapsed time, serialized as an integer
    Duration,
    /// Arbitrary precision number
    Number,
}

impl PrimitiveKind {
    /// The Rust spelling of the kind, used when a primitive has no alias name
    pub fn type_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int => "isize",
            PrimitiveKind::Int8 => "i8",
            PrimitiveKind::Int16 => "i16",
            PrimitiveKind::Int32 => "i32",
            PrimitiveKind::Int64 => "i64",
            PrimitiveKind::Uint => "usize",
            PrimitiveKind::Uint8 => "u8",
            PrimitiveKind::Uint16 => "u16",
            PrimitiveKind::Uint32 => "u32",
            PrimitiveKind::Uint64 => "u64",
            PrimitiveKind::Float32 => "f32",
            PrimitiveKind::Float64 => "f64",
            PrimitiveKind::String => "String",
            PrimitiveKind::Timestamp => "SystemTime",
            PrimitiveKind::Duration => "Duration",
            PrimitiveKind::Number => "Number",
        }
    }
}

/// A primitive, optionally named (type alias or unit-only enum)
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveType {
    /// Underlying kind
    pub kind: PrimitiveKind,
    /// Alias name, `None` for the builtin spelling
    pub name: Option<String>,
    /// Allowed values, in declaration order
    pub variants: Vec<String>,
}

/// Lazily produced type of a struct field
#[derive(Clone)]
pub struct TypeRef(Arc<dyn Fn() -> TypeDescriptor + Send + Sync>);

impl TypeRef {
    pub fn new(describe: impl Fn() -> TypeDescriptor + Send + Sync + 'static) -> Self {
        Self(Arc::new(describe))
    }

    /// Reference to the description of `T`
    pub fn of<T: Describe + ?Sized + 'static>() -> Self {
        Self::new(T::describe)
    }

    /// Reference to an already built descriptor
    pub fn resolved(ty: TypeDescriptor) -> Self {
        Self::new(move || ty.clone())
    }

    pub fn resolve(&self) -> TypeDescriptor {
        (self.0)()
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeRef(..)")
    }
}

/// Serialization directives of a field
#[derive(Debug, Clone, Default)]
pub struct SerializationTag {
    /// Explicit serialized name
    pub name: Option<String>,
    /// Field never serialized
    pub skip: bool,
    /// Field omitted when empty, which makes it optional
    pub omit_empty: bool,
    /// Value serialized as a string regardless of its type
    pub stringify: bool,
    /// Embedded struct flattened even though it has an explicit name
    pub inline: bool,
}

/// Documentation and validation metadata of a field
#[derive(Debug, Clone, Default)]
pub struct FieldMeta {
    /// Explicit optional marker
    pub optional: bool,
    pub description: Option<String>,
    pub default: Option<String>,
    /// Allowed values separated by `|`
    pub enum_values: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Schema type override; when set the field type is not inspected
    pub schema_type: Option<String>,
    pub format: Option<String>,
    pub read_only: bool,
    /// Array values must be unique
    pub unique: bool,
    /// Contribution to the enclosing model description
    pub model_description: Option<String>,
    /// Request binding directive, e.g. `query=page,size;default=1`
    pub param: Option<String>,
}

/// A struct field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Source-level field name
    pub name: String,
    pub ty: TypeRef,
    /// Anonymous (flattened) field
    pub embedded: bool,
    /// Marker field carrying the XML element name; never part of the schema
    pub xml_name: bool,
    pub tag: SerializationTag,
    pub meta: FieldMeta,
}

impl FieldDescriptor {
    /// Field of type `T`
    pub fn new<T: Describe + ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::with_type(name, TypeRef::of::<T>())
    }

    pub fn with_type(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
            xml_name: false,
            tag: SerializationTag::default(),
            meta: FieldMeta::default(),
        }
    }

    /// Embedded field of type `T`, flattened into the enclosing struct
    pub fn embed<T: Describe + ?Sized + 'static>(name: impl Into<String>) -> Self {
        let mut field = Self::new::<T>(name);
        field.embedded = true;
        field
    }

    pub fn xml_name_marker() -> Self {
        let mut field = Self::with_type("XMLName", TypeRef::resolved(TypeDescriptor::Interface));
        field.xml_name = true;
        field
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.tag.name = Some(name.into());
        self
    }

    pub fn skip(mut self) -> Self {
        self.tag.skip = true;
        self
    }

    pub fn omit_empty(mut self) -> Self {
        self.tag.omit_empty = true;
        self
    }

    pub fn stringify(mut self) -> Self {
        self.tag.stringify = true;
        self
    }

    pub fn inline(mut self) -> Self {
        self.tag.inline = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.meta.optional = true;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.meta.description = Some(text.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.meta.default = Some(value.into());
        self
    }

    pub fn enumeration(mut self, values: impl Into<String>) -> Self {
        self.meta.enum_values = Some(values.into());
        self
    }

    pub fn minimum(mut self, value: f64) -> Self {
        self.meta.minimum = Some(value);
        self
    }

    pub fn maximum(mut self, value: f64) -> Self {
        self.meta.maximum = Some(value);
        self
    }

    pub fn schema_type(mut self, schema_type: impl Into<String>) -> Self {
        self.meta.schema_type = Some(schema_type.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.meta.format = Some(format.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.meta.read_only = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.meta.unique = true;
        self
    }

    pub fn model_description(mut self, text: impl Into<String>) -> Self {
        self.meta.model_description = Some(text.into());
        self
    }

    pub fn param(mut self, directive: impl Into<String>) -> Self {
        self.meta.param = Some(directive.into());
        self
    }

    /// Fields are required unless marked optional or omitted when empty
    pub fn is_required(&self) -> bool {
        !self.meta.optional && !self.tag.omit_empty
    }

    /// Embedded fields without an explicit name (or marked inline) are flattened
    pub fn is_flattened(&self) -> bool {
        self.embedded && (self.tag.inline || self.tag.name.as_deref().map_or(true, str::is_empty))
    }
}

/// Field documentation provider, keyed by serialized field name; `""` documents the struct
pub type DocumentationFn = Arc<dyn Fn() -> BTreeMap<String, String> + Send + Sync>;

/// Customization applied to a finished struct schema
pub type PostBuildFn = Arc<dyn Fn(&mut Schema) + Send + Sync>;

/// Types that document their own fields
pub trait Documented {
    fn documentation() -> BTreeMap<String, String>;
}

/// Types that adjust their own generated schema
pub trait PostBuildSchema {
    fn post_build_schema(schema: &mut Schema);
}

/// A struct with its fields in declaration order
pub struct StructDef {
    /// Type name, empty for anonymous structs
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    documentation: Option<DocumentationFn>,
    post_build: Option<PostBuildFn>,
}

impl StructDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            documentation: None,
            post_build: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new("")
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Attach the documentation capability of `T`
    pub fn documented<T: Documented + 'static>(self) -> Self {
        self.with_documentation(Arc::new(T::documentation))
    }

    pub fn with_documentation(mut self, documentation: DocumentationFn) -> Self {
        self.documentation = Some(documentation);
        self
    }

    /// Attach the post-build capability of `T`
    pub fn post_built<T: PostBuildSchema + 'static>(self) -> Self {
        self.with_post_build(Arc::new(T::post_build_schema))
    }

    pub fn with_post_build(mut self, post_build: PostBuildFn) -> Self {
        self.post_build = Some(post_build);
        self
    }

    pub fn documentation(&self) -> BTreeMap<String, String> {
        self.documentation
            .as_ref()
            .map(|documentation| documentation())
            .unwrap_or_default()
    }

    pub fn apply_post_build(&self, schema: &mut Schema) {
        if let Some(post_build) = &self.post_build {
            post_build(schema);
        }
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::Struct(Arc::new(self))
    }
}

impl fmt::Debug for StructDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructDef")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("documented", &self.documentation.is_some())
            .field("post_build", &self.post_build.is_some())
            .finish()
    }
}

/// Description of a type
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Primitive(PrimitiveType),
    Struct(Arc<StructDef>),
    Slice(Box<TypeDescriptor>),
    /// Key and value types
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Pointer(Box<TypeDescriptor>),
    /// Any value
    Interface,
}

impl TypeDescriptor {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeDescriptor::Primitive(PrimitiveType {
            kind,
            name: None,
            variants: Vec::new(),
        })
    }

    pub fn named_primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        TypeDescriptor::Primitive(PrimitiveType {
            kind,
            name: Some(name.into()),
            variants: Vec::new(),
        })
    }

    /// Unit-only enum serialized as its variant names
    pub fn string_enum(name: impl Into<String>, variants: Vec<String>) -> Self {
        TypeDescriptor::Primitive(PrimitiveType {
            kind: PrimitiveKind::String,
            name: Some(name.into()),
            variants,
        })
    }

    pub fn slice_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::Slice(Box::new(element))
    }

    pub fn map_of(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(key), Box::new(value))
    }

    pub fn pointer_to(element: TypeDescriptor) -> Self {
        TypeDescriptor::Pointer(Box::new(element))
    }

    /// Declared name; empty for unnamed types (containers, pointers, anonymous structs)
    pub fn name(&self) -> &str {
        match self {
            TypeDescriptor::Primitive(p) => p.name.as_deref().unwrap_or(p.kind.type_name()),
            TypeDescriptor::Struct(s) => &s.name,
            _ => "",
        }
    }

    /// Full spelling of the type, e.g. `map[String][]Pet`
    pub fn type_string(&self) -> String {
        match self {
            TypeDescriptor::Primitive(_) => self.name().to_string(),
            TypeDescriptor::Struct(s) if s.name.is_empty() => "struct {}".to_string(),
            TypeDescriptor::Struct(s) => s.name.clone(),
            TypeDescriptor::Slice(element) => format!("[]{}", element.type_string()),
            TypeDescriptor::Map(key, value) => {
                format!("map[{}]{}", key.type_string(), value.type_string())
            }
            TypeDescriptor::Pointer(element) => format!("*{}", element.type_string()),
            TypeDescriptor::Interface => "interface {}".to_string(),
        }
    }

    /// Struct fields, empty for other kinds
    pub fn fields(&self) -> &[FieldDescriptor] {
        match self {
            TypeDescriptor::Struct(s) => &s.fields,
            _ => &[],
        }
    }

    /// The type behind any number of pointers
    pub fn dereferenced(&self) -> &TypeDescriptor {
        let mut ty = self;
        while let TypeDescriptor::Pointer(element) = ty {
            ty = element;
        }
        ty
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(_))
    }

    /// Slice of bytes, serialized as a single string
    pub fn is_byte_array(&self) -> bool {
        match self {
            TypeDescriptor::Slice(element) => matches!(
                element.dereferenced(),
                TypeDescriptor::Primitive(PrimitiveType {
                    kind: PrimitiveKind::Uint8,
                    ..
                })
            ),
            _ => false,
        }
    }
}

/// Types that can describe themselves
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

macro_rules! describe_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::primitive(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

describe_primitive!(
    bool => Bool,
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    char => String,
    str => String,
    String => String,
    std::time::SystemTime => Timestamp,
    std::time::Duration => Duration,
    serde_json::Number => Number,
);

impl Describe for serde_json::Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Interface
    }
}

macro_rules! describe_sequence {
    ($($ty:ident),*) => {
        $(
            impl<T: Describe> Describe for $ty<T> {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::slice_of(T::describe())
                }
            }
        )*
    };
}

describe_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::slice_of(T::describe())
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::slice_of(T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::slice_of(T::describe())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::pointer_to(T::describe())
    }
}

macro_rules! describe_pointer {
    ($($ty:ident),*) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ty<T> {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::pointer_to(T::describe())
                }
            }
        )*
    };
}

describe_pointer!(Box, Arc, Rc);

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map_of(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map_of(K::describe(), V::describe())
    }
}
