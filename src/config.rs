//! Generator configuration and the stock component-name handlers.

use crate::descriptor::TypeDescriptor;
use crate::openapi_builder::OpenApiDocument;
use crate::registry::WebService;
use std::fmt;
use std::sync::Arc;

/// Maps a type name to a schema `format`; `None` keeps the builtin format
pub type SchemaFormatHandler = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Names a type in the schema table; `None` keeps the default name
pub type ModelTypeNameHandler = Arc<dyn Fn(&TypeDescriptor) -> Option<String> + Send + Sync>;

/// Final adjustment of the assembled document
pub type PostBuildDocumentHandler = Arc<dyn Fn(&mut OpenApiDocument) + Send + Sync>;

/// Derives the serialized name of a field that carries no explicit name
pub type ComponentNameHandler = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Document generation settings
#[derive(Clone, Default)]
pub struct Config {
    /// Server host, with or without a scheme
    pub host: String,
    /// Schemes used to build server URLs when `host` has none
    pub schemes: Vec<String>,
    /// Path the document is served at, e.g. `/apidocs.json`
    pub api_path: String,
    /// Services whose routes are documented
    pub web_services: Vec<WebService>,
    /// CORS is enabled unless disabled here
    pub disable_cors: bool,
    /// Reported as `info.version`
    pub api_version: String,
    /// Reported as `info.title`
    pub title: String,
    pub description: String,
    pub schema_format_handler: Option<SchemaFormatHandler>,
    pub model_type_name_handler: Option<ModelTypeNameHandler>,
    pub post_build_document_handler: Option<PostBuildDocumentHandler>,
    pub component_name_handler: Option<ComponentNameHandler>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn schemes(mut self, schemes: Vec<String>) -> Self {
        self.schemes = schemes;
        self
    }

    pub fn api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    pub fn web_service(mut self, service: WebService) -> Self {
        self.web_services.push(service);
        self
    }

    pub fn disable_cors(mut self, disable: bool) -> Self {
        self.disable_cors = disable;
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn schema_format_handler(
        mut self,
        handler: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.schema_format_handler = Some(Arc::new(handler));
        self
    }

    pub fn model_type_name_handler(
        mut self,
        handler: impl Fn(&TypeDescriptor) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.model_type_name_handler = Some(Arc::new(handler));
        self
    }

    pub fn post_build_document_handler(
        mut self,
        handler: impl Fn(&mut OpenApiDocument) + Send + Sync + 'static,
    ) -> Self {
        self.post_build_document_handler = Some(Arc::new(handler));
        self
    }

    pub fn component_name_handler(
        mut self,
        handler: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.component_name_handler = Some(Arc::new(handler));
        self
    }

    /// Serialized name for an untagged field
    pub fn component_name(&self, field_name: &str) -> String {
        match &self.component_name_handler {
            Some(handler) => handler(field_name),
            None => default_name_handler(field_name),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("schemes", &self.schemes)
            .field("api_path", &self.api_path)
            .field("web_services", &self.web_services.len())
            .field("disable_cors", &self.disable_cors)
            .field("api_version", &self.api_version)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// `GoRestfulComponent` -> `GoRestfulComponent`
pub fn default_name_handler(name: &str) -> String {
    name.to_string()
}

/// `GoRestfulComponent` -> `go_restful_component`
pub fn lower_snake_cased_name_handler(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// `GoRestfulComponent` -> `goRestfulComponent`
pub fn lower_camel_cased_name_handler(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `HTTPRestfulComponent` -> `httpRestfulComponent`
///
/// A leading run of capitals is lowered as one acronym, keeping the capital that starts the
/// next word.
pub fn go_lower_camel_cased_name_handler(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let run = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lowered = match run {
        0 => return name.to_string(),
        n if n == chars.len() => n,
        1 => 1,
        n => n - 1,
    };
    chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            if i < lowered {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![*c]
            }
        })
        .collect()
}
