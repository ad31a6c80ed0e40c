//! Route-registry manifest - a YAML or JSON file declaring the services, routes and document
//! metadata, with models named by Rust type expressions.
//!
//! ```yaml
//! title: Users API
//! api_version: "1.0"
//! services:
//!   - path: /users
//!     produces: [application/json]
//!     routes:
//!       - method: get
//!         path: /{id}
//!         operation: getUser
//!         params:
//!           - { name: id, kind: path, data_type: integer }
//!         returns:
//!           - { code: 200, message: OK, model: User }
//! ```

use crate::config::{
    default_name_handler, go_lower_camel_cased_name_handler, lower_camel_cased_name_handler,
    lower_snake_cased_name_handler, Config,
};
use crate::error::{Error, Result};
use crate::openapi_builder::{SecurityRequirement, SecurityScheme, Tag};
use crate::registry::{
    self, HttpMethod, ParameterKind, ResponseError, RouteBuilder, Sample, SchemaType, WebService,
};
use crate::type_resolver::TypeResolver;
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Serialized name of fields without an explicit rename
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldNaming {
    #[default]
    Default,
    LowerSnake,
    LowerCamel,
    GoLowerCamel,
}

/// Top-level manifest
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub title: String,
    pub description: String,
    pub host: String,
    pub schemes: Vec<String>,
    /// Path the document is served at
    pub api_path: String,
    pub api_version: String,
    pub disable_cors: bool,
    pub field_naming: FieldNaming,
    pub tags: Vec<Tag>,
    pub security_schemes: BTreeMap<String, SecurityScheme>,
    /// Document-wide security requirements
    pub security: Vec<SecurityRequirement>,
    pub services: Vec<ServiceSpec>,
}

/// A web service: routes under a root path
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceSpec {
    pub path: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Parameters shared by every route, usually path parameters of `path`
    pub params: Vec<registry::Parameter>,
    pub routes: Vec<RouteSpec>,
}

/// A route declaration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    pub method: HttpMethod,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default)]
    pub params: Vec<registry::Parameter>,
    /// Request body model
    pub reads: Option<ModelSpec>,
    pub writes: Option<ModelSpec>,
    /// Struct whose field `param` directives declare the parameters
    pub read_sample: Option<String>,
    #[serde(default)]
    pub returns: Vec<ReturnSpec>,
    pub default_return: Option<DefaultReturnSpec>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default)]
    pub extensions: BTreeMap<String, Value>,
}

/// A Rust type expression or a raw `{type, format}` schema
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModelSpec {
    Type(String),
    Raw(SchemaType),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReturnSpec {
    pub code: u16,
    #[serde(default)]
    pub message: String,
    pub model: Option<ModelSpec>,
    #[serde(default)]
    pub headers: BTreeMap<String, registry::Header>,
    #[serde(default)]
    pub extensions: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultReturnSpec {
    #[serde(default)]
    pub message: String,
    pub model: Option<ModelSpec>,
}

impl ModelSpec {
    fn sample(&self, resolver: &TypeResolver) -> Result<Sample> {
        match self {
            ModelSpec::Type(expression) => Ok(Sample::Type(resolver.resolve_str(expression)?)),
            ModelSpec::Raw(raw) => Ok(Sample::Raw(raw.clone())),
        }
    }
}

impl Manifest {
    /// Load a manifest; `.yaml`/`.yml` files are YAML, anything else JSON
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Loading manifest: {}", path.display());
        let content = fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let manifest = if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        };
        manifest.map_err(|err| match err {
            Error::ManifestError(message) => Error::ManifestError(format!("{}: {}", path.display(), message)),
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|err| Error::ManifestError(err.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|err| Error::ManifestError(err.to_string()))
    }

    /// Build the generator configuration, resolving every model through `resolver`
    pub fn into_config(self, resolver: &TypeResolver) -> Result<Config> {
        let mut config = Config::new()
            .title(self.title)
            .description(self.description)
            .host(self.host)
            .schemes(self.schemes)
            .api_path(self.api_path)
            .api_version(self.api_version)
            .disable_cors(self.disable_cors)
            .component_name_handler(match self.field_naming {
                FieldNaming::Default => default_name_handler,
                FieldNaming::LowerSnake => lower_snake_cased_name_handler,
                FieldNaming::LowerCamel => lower_camel_cased_name_handler,
                FieldNaming::GoLowerCamel => go_lower_camel_cased_name_handler,
            });

        for service in self.services {
            config = config.web_service(service.into_web_service(resolver)?);
        }

        let (tags, security_schemes, security) = (self.tags, self.security_schemes, self.security);
        if !tags.is_empty() || !security_schemes.is_empty() || !security.is_empty() {
            config = config.post_build_document_handler(move |document| {
                document.tags = tags.clone();
                document.components.security_schemes = security_schemes.clone();
                document.security = security.clone();
            });
        }
        info!("Loaded {} services from manifest", config.web_services.len());
        Ok(config)
    }
}

impl ServiceSpec {
    fn into_web_service(self, resolver: &TypeResolver) -> Result<WebService> {
        let mut service = WebService::new(&self.path)
            .consumes(self.consumes)
            .produces(self.produces);
        for param in self.params {
            service = service.param(normalize_parameter(param));
        }
        for route in self.routes {
            let context = format!("{} {}{}", route.method.as_str(), self.path, route.path);
            let builder = route
                .into_builder(resolver)
                .map_err(|err| Error::ManifestError(format!("{}: {}", context, err)))?;
            service = service.route(builder);
        }
        Ok(service)
    }
}

impl RouteSpec {
    fn into_builder(self, resolver: &TypeResolver) -> Result<RouteBuilder> {
        let mut builder = WebService::method(self.method, &self.path)
            .operation(&self.operation)
            .doc(&self.doc)
            .notes(&self.notes);
        if self.deprecated {
            builder = builder.deprecate();
        }
        if !self.consumes.is_empty() {
            builder = builder.consumes(self.consumes);
        }
        if !self.produces.is_empty() {
            builder = builder.produces(self.produces);
        }
        for param in self.params {
            builder = builder.param(normalize_parameter(param));
        }
        if let Some(expression) = &self.read_sample {
            builder = builder.read_sample(&resolver.resolve_str(expression)?);
        }
        if let Some(reads) = &self.reads {
            builder = builder.reads(reads.sample(resolver)?);
        }
        if let Some(writes) = &self.writes {
            builder = builder.writes(writes.sample(resolver)?);
        }
        for spec in self.returns {
            let model = spec.model.as_ref().map(|m| m.sample(resolver)).transpose()?;
            let mut response = ResponseError::new(spec.code, &spec.message, model);
            response.headers = spec.headers;
            response.extensions = spec.extensions;
            builder = builder.returns_error(response);
        }
        if let Some(spec) = self.default_return {
            let model = spec.model.as_ref().map(|m| m.sample(resolver)).transpose()?;
            builder = builder.default_returns(&spec.message, model);
        }
        for (key, value) in self.metadata {
            builder = builder.metadata(&key, value);
        }
        for (key, value) in self.extensions {
            builder = builder.extension(&key, value);
        }
        Ok(builder)
    }
}

/// Parameters declared without a type are strings; path parameters are always required
fn normalize_parameter(mut param: registry::Parameter) -> registry::Parameter {
    if param.data_type.is_empty() {
        param.data_type = "string".to_string();
    }
    if param.kind == ParameterKind::Path {
        param.required = true;
    }
    param
}
