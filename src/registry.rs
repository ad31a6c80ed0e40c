//! Route registry - the web services, routes and parameters a document is generated from.
//!
//! A [`WebService`] groups routes under a root path and carries service-wide defaults
//! (media types, path parameters). Routes are declared with a [`RouteBuilder`]:
//!
//! ```
//! use openapi_from_registry::registry::{Parameter, Sample, WebService};
//!
//! let service = WebService::new("/users")
//!     .produces(["application/json"])
//!     .route(
//!         WebService::get("/{id}")
//!             .operation("getUser")
//!             .param(Parameter::path("id", "user identifier"))
//!             .returns(200, "OK", Some(Sample::of::<String>())),
//!     );
//! assert_eq!(service.routes[0].path, "/users/{id}");
//! ```

use crate::descriptor::{Describe, TypeDescriptor};
use crate::schema_builder::{json_schema_format, json_schema_type};
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Metadata key holding the operation tags (a list of strings)
pub const KEY_OPENAPI_TAGS: &str = "openapi.tags";

/// Metadata key holding the name of the JWT security scheme (a string)
pub const KEY_SECURITY_JWT: &str = "security.jwt";

/// Only extension keys with this prefix are copied into the document
pub const EXTENSION_PREFIX: &str = "x-";

/// HTTP methods a route can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[serde(alias = "GET")]
    Get,
    #[serde(alias = "POST")]
    Post,
    #[serde(alias = "PUT")]
    Put,
    #[serde(alias = "DELETE")]
    Delete,
    #[serde(alias = "PATCH")]
    Patch,
    #[serde(alias = "OPTIONS")]
    Options,
    #[serde(alias = "HEAD")]
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

/// Where a parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Path,
    #[default]
    Query,
    Body,
    Header,
    #[serde(alias = "formData")]
    Form,
    #[serde(alias = "multipartFormData")]
    MultipartForm,
}

impl ParameterKind {
    /// Location name written to the document
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Path => "path",
            ParameterKind::Query => "query",
            ParameterKind::Body => "body",
            ParameterKind::Header => "header",
            ParameterKind::Form => "formData",
            ParameterKind::MultipartForm => "multipartFormData",
        }
    }
}

/// A declared request parameter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    #[serde(alias = "in")]
    pub kind: ParameterKind,
    pub description: String,
    /// Schema type of the value, `string` unless set
    pub data_type: String,
    pub data_format: String,
    pub required: bool,
    /// Value is a list
    pub allow_multiple: bool,
    pub allow_empty_value: bool,
    pub default_value: String,
    /// Allowed values, in order
    pub possible_values: Vec<String>,
    /// Legacy allowed values; only the keys are used, sorted
    pub allowable_values: HashMap<String, String>,
    pub collection_format: String,
    pub pattern: String,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
    pub extensions: BTreeMap<String, Value>,
}

impl Parameter {
    fn of_kind(kind: ParameterKind, name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            data_type: "string".to_string(),
            ..Default::default()
        }
    }

    /// Path parameters are always required
    pub fn path(name: &str, description: &str) -> Self {
        let mut param = Self::of_kind(ParameterKind::Path, name, description);
        param.required = true;
        param
    }

    pub fn query(name: &str, description: &str) -> Self {
        Self::of_kind(ParameterKind::Query, name, description)
    }

    pub fn body(name: &str, description: &str) -> Self {
        Self::of_kind(ParameterKind::Body, name, description)
    }

    pub fn header(name: &str, description: &str) -> Self {
        Self::of_kind(ParameterKind::Header, name, description)
    }

    pub fn form(name: &str, description: &str) -> Self {
        Self::of_kind(ParameterKind::Form, name, description)
    }

    pub fn multipart_form(name: &str, description: &str) -> Self {
        Self::of_kind(ParameterKind::MultipartForm, name, description)
    }

    pub fn data_type(mut self, data_type: &str) -> Self {
        self.data_type = data_type.to_string();
        self
    }

    pub fn data_format(mut self, data_format: &str) -> Self {
        self.data_format = data_format.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn allow_multiple(mut self, multiple: bool) -> Self {
        self.allow_multiple = multiple;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = value.to_string();
        self
    }

    pub fn possible_values(mut self, values: &[&str]) -> Self {
        self.possible_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn allowable_values(mut self, values: HashMap<String, String>) -> Self {
        self.allowable_values = values;
        self
    }

    pub fn collection_format(mut self, format: &str) -> Self {
        self.collection_format = format.to_string();
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = pattern.to_string();
        self
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn length(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn items(mut self, min: Option<u64>, max: Option<u64>, unique: bool) -> Self {
        self.min_items = min;
        self.max_items = max;
        self.unique_items = unique;
        self
    }

    pub fn extension(mut self, key: &str, value: Value) -> Self {
        self.extensions.insert(key.to_string(), value);
        self
    }
}

/// Explicit schema type for bodies that are not described types, e.g. files
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchemaType {
    #[serde(rename = "type")]
    pub raw_type: String,
    pub format: String,
}

/// Request or response body sample
#[derive(Debug, Clone)]
pub enum Sample {
    Type(TypeDescriptor),
    Raw(SchemaType),
}

impl Sample {
    pub fn of<T: Describe + ?Sized>() -> Self {
        Sample::Type(T::describe())
    }

    pub fn raw(raw_type: &str, format: &str) -> Self {
        Sample::Raw(SchemaType {
            raw_type: raw_type.to_string(),
            format: format.to_string(),
        })
    }

    /// Data type of the body parameter declared for this sample
    pub fn type_string(&self) -> String {
        match self {
            Sample::Type(ty) => ty.type_string(),
            Sample::Raw(_) => "SchemaType".to_string(),
        }
    }

    pub fn descriptor(&self) -> Option<&TypeDescriptor> {
        match self {
            Sample::Type(ty) => Some(ty),
            Sample::Raw(_) => None,
        }
    }
}

/// Nested item description of an array header
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Items {
    #[serde(rename = "type")]
    pub item_type: String,
    pub format: String,
    pub default: Option<Value>,
    pub collection_format: String,
    pub items: Option<Box<Items>>,
}

/// Response header
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Header {
    #[serde(rename = "type")]
    pub header_type: String,
    pub format: String,
    pub description: String,
    pub default: Option<Value>,
    pub collection_format: String,
    /// Required when the type is `array`
    pub items: Option<Items>,
}

/// A declared response
#[derive(Debug, Clone, Default)]
pub struct ResponseError {
    pub code: u16,
    pub message: String,
    pub model: Option<Sample>,
    pub headers: BTreeMap<String, Header>,
    pub extensions: BTreeMap<String, Value>,
}

impl ResponseError {
    pub fn new(code: u16, message: &str, model: Option<Sample>) -> Self {
        Self {
            code,
            message: message.to_string(),
            model,
            ..Default::default()
        }
    }

    pub fn header(mut self, name: &str, header: Header) -> Self {
        self.headers.insert(name.to_string(), header);
        self
    }

    pub fn extension(mut self, key: &str, value: Value) -> Self {
        self.extensions.insert(key.to_string(), value);
        self
    }
}

/// A registered route
#[derive(Debug, Clone)]
pub struct Route {
    pub method: HttpMethod,
    /// Full path template including the service root, e.g. `/users/{id:[0-9]+}`
    pub path: String,
    pub operation: String,
    /// Short summary, may contain HTML
    pub doc: String,
    /// Long description
    pub notes: String,
    pub deprecated: bool,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub read_sample: Option<Sample>,
    pub write_sample: Option<Sample>,
    /// Declared responses by status
    pub responses: BTreeMap<u16, ResponseError>,
    pub default_response: Option<ResponseError>,
    pub metadata: BTreeMap<String, Value>,
    pub extensions: BTreeMap<String, Value>,
}

/// Fluent route declaration, completed by [`WebService::route`]
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    route: Route,
}

impl RouteBuilder {
    pub fn new(method: HttpMethod, sub_path: &str) -> Self {
        Self {
            route: Route {
                method,
                path: sub_path.to_string(),
                operation: String::new(),
                doc: String::new(),
                notes: String::new(),
                deprecated: false,
                consumes: Vec::new(),
                produces: Vec::new(),
                parameters: Vec::new(),
                read_sample: None,
                write_sample: None,
                responses: BTreeMap::new(),
                default_response: None,
                metadata: BTreeMap::new(),
                extensions: BTreeMap::new(),
            },
        }
    }

    pub fn operation(mut self, operation: &str) -> Self {
        self.route.operation = operation.to_string();
        self
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.route.doc = doc.to_string();
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.route.notes = notes.to_string();
        self
    }

    pub fn deprecate(mut self) -> Self {
        self.route.deprecated = true;
        self
    }

    pub fn consumes<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route.consumes = media_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn produces<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route.produces = media_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn param(mut self, param: Parameter) -> Self {
        self.route.parameters.push(param);
        self
    }

    /// Declare the request body; adds the required `body` parameter typed after the sample
    pub fn reads(mut self, sample: Sample) -> Self {
        let body = Parameter::body("body", "")
            .data_type(&sample.type_string())
            .required(true);
        self.route.read_sample = Some(sample);
        self.param(body)
    }

    pub fn writes(mut self, sample: Sample) -> Self {
        self.route.write_sample = Some(sample);
        self
    }

    pub fn returns(mut self, code: u16, message: &str, model: Option<Sample>) -> Self {
        self.route
            .responses
            .insert(code, ResponseError::new(code, message, model));
        self
    }

    pub fn returns_error(mut self, response: ResponseError) -> Self {
        self.route.responses.insert(response.code, response);
        self
    }

    pub fn default_returns(mut self, message: &str, model: Option<Sample>) -> Self {
        self.route.default_response = Some(ResponseError::new(0, message, model));
        self
    }

    pub fn metadata(mut self, key: &str, value: Value) -> Self {
        self.route.metadata.insert(key.to_string(), value);
        self
    }

    pub fn extension(mut self, key: &str, value: Value) -> Self {
        self.route.extensions.insert(key.to_string(), value);
        self
    }

    /// Derive parameters from the `param` directives on the fields of a request struct.
    ///
    /// Directives are `;` separated, e.g. `query=page,p;default=1;required`. Supported keys:
    /// `path`, `query`, `form`, `header` (comma separated names), `body`, `description`,
    /// `default` and `required`. Byte buffer fields bound to a form become multipart binary
    /// parameters.
    pub fn read_sample(mut self, sample: &TypeDescriptor) -> Self {
        for field in sample.dereferenced().fields() {
            let Some(directive) = field.meta.param.as_deref() else {
                continue;
            };
            let directives = parse_directives(directive);
            let ty = field.ty.resolve();
            debug!("Deriving parameters from field {}: {:?}", field.name, directives);

            if directives.contains_key("body") {
                self = self.reads(Sample::Type(ty.dereferenced().clone()));
            }
            if let Some(name) = directives.get("path") {
                self = self.param(param_from(Parameter::path(name, ""), &ty, &directives));
            }
            for name in split_names(directives.get("query")) {
                self = self.param(param_from(Parameter::query(name, ""), &ty, &directives));
            }
            for name in split_names(directives.get("form")) {
                let param = if is_file_field(&ty) {
                    let mut param = Parameter::multipart_form(name, "")
                        .data_type("string")
                        .data_format("binary")
                        .required(directives.contains_key("required"));
                    if let Some(description) = directives.get("description") {
                        param.description = description.clone();
                    }
                    param
                } else {
                    param_from(Parameter::form(name, ""), &ty, &directives)
                };
                self = self.param(param);
            }
            for name in split_names(directives.get("header")) {
                self = self.param(param_from(Parameter::header(name, ""), &ty, &directives));
            }
        }
        self
    }

    pub fn build(self) -> Route {
        self.route
    }
}

fn parse_directives(text: &str) -> BTreeMap<String, String> {
    text.trim()
        .trim_matches('"')
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (part.to_string(), String::new()),
        })
        .collect()
}

fn split_names(names: Option<&String>) -> Vec<&str> {
    names
        .map(|names| names.split(',').map(str::trim).filter(|n| !n.is_empty()).collect())
        .unwrap_or_default()
}

fn is_file_field(ty: &TypeDescriptor) -> bool {
    let ty = ty.dereferenced();
    match ty {
        TypeDescriptor::Slice(element) if !ty.is_byte_array() => is_file_field(element),
        _ => ty.is_byte_array(),
    }
}

fn param_from(mut param: Parameter, ty: &TypeDescriptor, directives: &BTreeMap<String, String>) -> Parameter {
    let ty = ty.dereferenced();
    match ty {
        _ if ty.is_byte_array() => {
            param.data_type = "string".to_string();
            param.data_format = "binary".to_string();
        }
        TypeDescriptor::Slice(element) => {
            param.data_type = "array".to_string();
            if let TypeDescriptor::Primitive(primitive) = element.dereferenced() {
                param.data_format = json_schema_format(primitive.kind).unwrap_or_default().to_string();
            }
        }
        TypeDescriptor::Primitive(primitive) => {
            param.data_type = json_schema_type(primitive.kind).to_string();
        }
        _ => {
            let key = ty.type_string();
            param.data_type = key.strip_prefix("[]").unwrap_or(&key).replace("[]", "||");
        }
    }
    if let Some(description) = directives.get("description") {
        param.description = description.clone();
    }
    if let Some(default) = directives.get("default") {
        param.default_value = default.clone();
    }
    if directives.contains_key("required") {
        param.required = true;
    }
    param
}

/// A group of routes sharing a root path and defaults
#[derive(Debug, Clone, Default)]
pub struct WebService {
    pub root_path: String,
    /// Default media types for routes that declare none
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Path parameters added to every operation of the service
    pub path_parameters: Vec<Parameter>,
    pub routes: Vec<Route>,
}

impl WebService {
    pub fn new(root_path: &str) -> Self {
        Self {
            root_path: root_path.to_string(),
            ..Default::default()
        }
    }

    pub fn consumes<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes = media_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn produces<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = media_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn param(mut self, param: Parameter) -> Self {
        self.path_parameters.push(param);
        self
    }

    /// Register a route under the service root
    pub fn route(mut self, builder: RouteBuilder) -> Self {
        let mut route = builder.build();
        route.path = join_path(&self.root_path, &route.path);
        if route.consumes.is_empty() {
            route.consumes = self.consumes.clone();
        }
        if route.produces.is_empty() {
            route.produces = self.produces.clone();
        }
        debug!("Registered route: {} {}", route.method.as_str(), route.path);
        self.routes.push(route);
        self
    }

    pub fn method(method: HttpMethod, sub_path: &str) -> RouteBuilder {
        RouteBuilder::new(method, sub_path)
    }

    pub fn get(sub_path: &str) -> RouteBuilder {
        RouteBuilder::new(HttpMethod::Get, sub_path)
    }

    pub fn post(sub_path: &str) -> RouteBuilder {
        RouteBuilder::new(HttpMethod::Post, sub_path)
    }

    pub fn put(sub_path: &str) -> RouteBuilder {
        RouteBuilder::new(HttpMethod::Put, sub_path)
    }

    pub fn delete(sub_path: &str) -> RouteBuilder {
        RouteBuilder::new(HttpMethod::Delete, sub_path)
    }

    pub fn patch(sub_path: &str) -> RouteBuilder {
        RouteBuilder::new(HttpMethod::Patch, sub_path)
    }
}

fn join_path(root: &str, sub_path: &str) -> String {
    let root = root.trim_end_matches('/');
    let sub_path = sub_path.trim_start_matches('/');
    match (root.is_empty(), sub_path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{sub_path}"),
        (false, true) => root.to_string(),
        (false, false) => format!("{root}/{sub_path}"),
    }
}
