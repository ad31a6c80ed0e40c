use crate::config::Config;
use crate::descriptor::{FieldDescriptor, PrimitiveKind, PrimitiveType, StructDef, TypeDescriptor};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Prefix of every schema reference
pub const COMPONENT_ROOT: &str = "#/components/schemas/";

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaRef>,
    /// Required property names, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaRef>>,
    /// Value schema for dictionaries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaRef>>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl Schema {
    /// Schema with only a type
    pub fn typed(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Default::default()
        }
    }

    pub fn array(items: SchemaRef) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// `{type: string, format: binary}`, the shape of byte buffers
    pub fn binary() -> Self {
        Self {
            schema_type: Some("string".to_string()),
            format: Some("binary".to_string()),
            ..Default::default()
        }
    }
}

/// Schema reference or inline schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    /// Schema reference (e.g., "#/components/schemas/User")
    Ref(Reference),
    /// Inline schema
    Inline(Box<Schema>),
}

/// Reference definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub ref_path: String,
}

impl SchemaRef {
    /// Reference to a component schema
    pub fn component(name: &str) -> Self {
        SchemaRef::Ref(Reference {
            ref_path: format!("{COMPONENT_ROOT}{name}"),
        })
    }

    pub fn inline(schema: Schema) -> Self {
        SchemaRef::Inline(Box::new(schema))
    }

    /// Name of the referenced component, if this is a reference
    pub fn component_name(&self) -> Option<&str> {
        match self {
            SchemaRef::Ref(reference) => reference.ref_path.strip_prefix(COMPONENT_ROOT),
            SchemaRef::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&Schema> {
        match self {
            SchemaRef::Inline(schema) => Some(schema),
            SchemaRef::Ref(_) => None,
        }
    }

    pub fn as_inline_mut(&mut self) -> Option<&mut Schema> {
        match self {
            SchemaRef::Inline(schema) => Some(schema),
            SchemaRef::Ref(_) => None,
        }
    }
}

/// Named schema definitions of one document
///
/// A present name means the type is registered or being registered; its definition may still
/// be an empty placeholder while the walk is inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaTable(BTreeMap<String, Schema>);

impl SchemaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) {
        self.0.insert(name.into(), schema);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.0.iter()
    }
}

/// Schema builder - walks type descriptors into a schema table
pub struct SchemaBuilder<'a> {
    /// Table receiving named definitions
    schemas: &'a mut SchemaTable,
    config: &'a Config,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(schemas: &'a mut SchemaTable, config: &'a Config) -> Self {
        Self { schemas, config }
    }

    /// Register the model described by `ty` and everything it references.
    ///
    /// Pointers and slices are looked through first. Returns a reference to the registered
    /// definition, or `None` when the type needs no definition (unaliased primitives, byte
    /// buffers, untyped values).
    pub fn add_model(&mut self, ty: &TypeDescriptor, name_override: &str) -> Option<SchemaRef> {
        let mut ty = ty.dereferenced();
        while let TypeDescriptor::Slice(element) = ty {
            if ty.is_byte_array() {
                break;
            }
            ty = element.dereferenced();
        }

        let model_name = if name_override.is_empty() {
            key_from(ty, self.config)
        } else {
            name_override.to_string()
        };

        if ty.is_primitive() && name_override.is_empty() {
            return None;
        }
        if ty.is_byte_array() || matches!(ty, TypeDescriptor::Interface) {
            return None;
        }
        if self.schemas.contains(&model_name) {
            debug!("Model {} already registered", model_name);
            return Some(SchemaRef::component(&model_name));
        }

        debug!("Registering model: {}", model_name);
        // registered before descending so recursive references terminate
        self.schemas.insert(model_name.clone(), Schema::default());

        let schema = match ty {
            TypeDescriptor::Map(_, value) => self.build_map_type(value, "value", &model_name),
            TypeDescriptor::Struct(def) => self.build_struct(def, &model_name),
            TypeDescriptor::Primitive(primitive) => self.primitive_schema(primitive),
            _ => Schema::default(),
        };
        self.schemas.insert(model_name.clone(), schema);

        Some(SchemaRef::component(&model_name))
    }

    fn build_struct(&mut self, def: &StructDef, model_name: &str) -> Schema {
        let documentation = def.documentation();
        let mut model = Schema::default();
        let mut model_descriptions = Vec::new();

        for field in &def.fields {
            let Some((json_name, model_description, mut property)) =
                self.build_property(field, &mut model, model_name)
            else {
                continue;
            };
            if let Some(text) = model_description {
                model_descriptions.push(text);
            }
            if let (Some(doc), Some(inline)) = (documentation.get(&json_name), property.as_inline_mut()) {
                inline.description = Some(doc.clone());
            }
            if field.is_required() {
                model.required.push(json_name.clone());
            }
            model.properties.insert(json_name, property);
        }

        if let Some(doc) = documentation.get("") {
            model.description = Some(doc.clone());
        } else if !model_descriptions.is_empty() {
            model.description = Some(model_descriptions.join("\n"));
        }

        def.apply_post_build(&mut model);
        model
    }

    /// Build the property for one field.
    ///
    /// Returns `None` when the field contributes no property of its own (skipped, marker or
    /// flattened into `model`).
    fn build_property(
        &mut self,
        field: &FieldDescriptor,
        model: &mut Schema,
        model_name: &str,
    ) -> Option<(String, Option<String>, SchemaRef)> {
        let json_name = self.json_name_of(field);
        if json_name.is_empty() {
            return None;
        }
        if field.xml_name {
            return None;
        }
        let model_description = field.meta.model_description.clone();

        let resolved = field.ty.resolve();
        let ty = resolved.dereferenced();

        let mut property = Schema::default();
        self.set_property_metadata(&mut property, field, ty);
        if property.schema_type.is_some() {
            return Some((json_name, model_description, SchemaRef::inline(property)));
        }

        if field.tag.stringify {
            property.schema_type = Some("string".to_string());
            return Some((json_name, model_description, SchemaRef::inline(property)));
        }

        let property = match ty {
            TypeDescriptor::Primitive(primitive) => {
                let primitive_schema = self.primitive_schema(primitive);
                property.schema_type = primitive_schema.schema_type;
                property.format = primitive_schema.format;
                if property.enum_values.is_empty() {
                    property.enum_values = primitive_schema.enum_values;
                }
                SchemaRef::inline(property)
            }
            TypeDescriptor::Struct(def) => {
                if field.is_flattened() {
                    self.flatten_embedded(ty, model);
                    return None;
                }
                let name = self.element_type_name(model_name, &json_name, ty);
                debug!("Field {} references {} ({})", json_name, name, def.fields.len());
                self.add_model(ty, &name);
                SchemaRef::component(&name)
            }
            TypeDescriptor::Slice(_) => {
                let items = self.element_schema(ty, model_name, &json_name);
                match items {
                    SchemaRef::Inline(mut built) => {
                        built.description = property.description.take();
                        built.default = property.default.take();
                        built.read_only = property.read_only;
                        built.unique_items = property.unique_items;
                        built.minimum = property.minimum;
                        built.maximum = property.maximum;
                        SchemaRef::Inline(built)
                    }
                    reference => reference,
                }
            }
            TypeDescriptor::Map(_, value) => {
                let mut map = self.build_map_type(value, &json_name, model_name);
                map.description = property.description.take();
                map.read_only = property.read_only;
                SchemaRef::inline(map)
            }
            TypeDescriptor::Pointer(_) | TypeDescriptor::Interface => SchemaRef::inline(property),
        };
        Some((json_name, model_description, property))
    }

    /// Merge the properties of an embedded struct into `model`.
    ///
    /// The embedded type is built in a scratch copy of the table; models it references are
    /// copied back, the embedded type itself is not registered.
    fn flatten_embedded(&mut self, ty: &TypeDescriptor, model: &mut Schema) {
        let mut scratch = self.schemas.clone();
        let sub_key = key_from(ty, self.config);
        SchemaBuilder::new(&mut scratch, self.config).add_model(ty, "");
        debug!("Flattening embedded struct {}", sub_key);

        if let Some(sub_model) = scratch.get(&sub_key) {
            for (name, property) in &sub_model.properties {
                model.properties.insert(name.clone(), property.clone());
            }
            for name in &sub_model.required {
                if !model.required.contains(name) {
                    model.required.push(name.clone());
                }
            }
        }

        for (name, schema) in scratch.iter() {
            if *name != sub_key && !self.schemas.contains(name) {
                self.schemas.insert(name.clone(), schema.clone());
            }
        }
    }

    /// Schema of a value nested in a slice or map, registering named element models
    fn element_schema(&mut self, ty: &TypeDescriptor, model_name: &str, json_name: &str) -> SchemaRef {
        let ty = ty.dereferenced();
        if ty.is_byte_array() {
            return SchemaRef::inline(Schema::binary());
        }
        match ty {
            TypeDescriptor::Slice(element) => {
                SchemaRef::inline(Schema::array(self.element_schema(element, model_name, json_name)))
            }
            TypeDescriptor::Primitive(primitive) => SchemaRef::inline(self.primitive_schema(primitive)),
            TypeDescriptor::Interface => SchemaRef::inline(Schema::default()),
            TypeDescriptor::Struct(_) | TypeDescriptor::Map(_, _) | TypeDescriptor::Pointer(_) => {
                let name = self.element_type_name(model_name, json_name, ty);
                self.add_model(ty, &name);
                SchemaRef::component(&name)
            }
        }
    }

    fn build_map_type(&mut self, value: &TypeDescriptor, json_name: &str, model_name: &str) -> Schema {
        let mut schema = Schema::typed("object");
        if matches!(value.dereferenced(), TypeDescriptor::Interface) {
            return schema;
        }
        let additional = self.element_schema(value, model_name, json_name);
        schema.additional_properties = Some(Box::new(additional));
        schema
    }

    /// Name of an element model; unnamed types are named after the field holding them
    fn element_type_name(&self, model_name: &str, json_name: &str, ty: &TypeDescriptor) -> String {
        let ty = ty.dereferenced();
        if ty.name().is_empty() {
            format!("{model_name}.{json_name}")
        } else {
            key_from(ty, self.config)
        }
    }

    fn json_name_of(&self, field: &FieldDescriptor) -> String {
        if field.tag.skip {
            return String::new();
        }
        match field.tag.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.config.component_name(&field.name),
        }
    }

    fn set_property_metadata(&self, property: &mut Schema, field: &FieldDescriptor, ty: &TypeDescriptor) {
        let meta = &field.meta;
        let value_type = match ty {
            TypeDescriptor::Primitive(primitive) => json_schema_type(primitive.kind),
            _ => "",
        };
        property.description = meta.description.clone();
        if let Some(default) = &meta.default {
            property.default = string_auto_type(value_type, default);
        }
        if let Some(values) = &meta.enum_values {
            property.enum_values = values
                .split('|')
                .filter_map(|value| string_auto_type(value_type, value))
                .collect();
        }
        property.minimum = meta.minimum;
        property.maximum = meta.maximum;
        property.schema_type = meta.schema_type.clone();
        property.format = meta.format.clone();
        property.read_only = meta.read_only;
        property.unique_items = meta.unique;
    }

    fn primitive_schema(&self, primitive: &PrimitiveType) -> Schema {
        primitive_schema(primitive, self.config)
    }
}

/// Inline schema of a primitive; the configured format handler is asked first
pub fn primitive_schema(primitive: &PrimitiveType, config: &Config) -> Schema {
    let name = primitive.name.as_deref().unwrap_or(primitive.kind.type_name());
    let format = config
        .schema_format_handler
        .as_ref()
        .and_then(|handler| handler(name))
        .filter(|format| !format.is_empty())
        .or_else(|| json_schema_format(primitive.kind).map(str::to_string));
    Schema {
        schema_type: Some(json_schema_type(primitive.kind).to_string()),
        format,
        enum_values: primitive.variants.iter().cloned().map(Value::String).collect(),
        ..Default::default()
    }
}

/// Schema table key of a type.
///
/// Unnamed types lose a leading `[]` and have remaining `[]` spelled `||`.
pub fn key_from(ty: &TypeDescriptor, config: &Config) -> String {
    let mut key = ty.type_string();
    if let Some(handler) = &config.model_type_name_handler {
        if let Some(name) = handler(ty) {
            key = name;
        }
    }
    if ty.name().is_empty() {
        key = key.strip_prefix("[]").unwrap_or(&key).replace("[]", "||");
    }
    key
}

pub fn json_schema_type(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "boolean",
        PrimitiveKind::Float32 | PrimitiveKind::Float64 | PrimitiveKind::Number => "number",
        PrimitiveKind::String | PrimitiveKind::Timestamp => "string",
        _ => "integer",
    }
}

pub fn json_schema_format(kind: PrimitiveKind) -> Option<&'static str> {
    let format = match kind {
        PrimitiveKind::Int | PrimitiveKind::Int32 => "int32",
        PrimitiveKind::Int8 | PrimitiveKind::Uint8 => "byte",
        PrimitiveKind::Int16
        | PrimitiveKind::Uint
        | PrimitiveKind::Uint16
        | PrimitiveKind::Uint32
        | PrimitiveKind::Uint64 => "integer",
        PrimitiveKind::Int64 | PrimitiveKind::Duration => "int64",
        PrimitiveKind::Float32 => "float",
        PrimitiveKind::Float64 | PrimitiveKind::Number => "double",
        PrimitiveKind::Timestamp => "date-time",
        PrimitiveKind::Bool | PrimitiveKind::String => return None,
    };
    Some(format)
}

/// Type an ambiguous string: integers and booleans are parsed when `data_type` allows them.
///
/// Empty input yields `None`; anything unparseable stays a string.
pub fn string_auto_type(data_type: &str, ambiguous: &str) -> Option<Value> {
    if ambiguous.is_empty() {
        return None;
    }
    if data_type.is_empty() || data_type == "integer" {
        if let Ok(parsed) = ambiguous.parse::<i64>() {
            return Some(Value::from(parsed));
        }
    }
    if data_type.is_empty() || data_type == "boolean" {
        if let Some(parsed) = parse_bool(ambiguous) {
            return Some(Value::Bool(parsed));
        }
    }
    Some(Value::String(ambiguous.to_string()))
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
