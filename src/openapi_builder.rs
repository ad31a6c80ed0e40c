use crate::config::Config;
use crate::path_builder::{build_path_item, build_paths, sanitize_path};
use crate::registry::{HttpMethod, WebService};
use crate::schema_builder::{SchemaBuilder, SchemaRef, SchemaTable};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// OpenAPI version written to every document
pub const OPENAPI_VERSION: &str = "3.0.1";

/// Security requirement: scheme name -> scopes
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// OpenAPI Info object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Security Scheme object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    /// Scheme type (http, apiKey, oauth2, openIdConnect)
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    /// Header, query or cookie name of an API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    /// Operation slot of a method
    pub fn operation_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters (path, query, header, form)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses by status code or `default`
    pub responses: BTreeMap<String, Response>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Vendor extensions (`x-` keys)
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header, formData, multipartFormData)
    #[serde(rename = "in")]
    pub location: String,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    pub required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_empty_value: bool,
    /// Parameter schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
}

/// OpenAPI Header object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: SchemaRef,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Header>,
    /// Response content
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Schema definitions
    #[serde(default)]
    pub schemas: SchemaTable,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
    /// Components (schemas, security schemes)
    #[serde(default)]
    pub components: Components,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

/// Build the document for every configured service.
///
/// Path items sharing a template across services are merged by re-running the later service's
/// routes for that template against the existing item. The component schemas are those of the
/// last service processed; earlier tables are replaced, not merged.
pub fn build_openapi(config: &Config) -> OpenApiDocument {
    let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
    let mut schemas = SchemaTable::new();

    for service in &config.web_services {
        debug!("Building paths for service {}", service.root_path);
        for (path, item) in build_paths(service, config) {
            let item = match paths.remove(&path) {
                Some(existing) => merge_service_routes(service, &path, existing, config),
                None => item,
            };
            paths.insert(path, item);
        }

        let service_schemas = build_schemas(service, config);
        if !schemas.is_empty() {
            warn!(
                "Schemas of earlier services ({}) replaced by those of {}",
                schemas.len(),
                service.root_path
            );
        }
        schemas = service_schemas;
    }

    let mut document = OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: config.title.clone(),
            version: config.api_version.clone(),
            description: (!config.description.is_empty()).then(|| config.description.clone()),
        },
        servers: build_servers(config),
        paths,
        components: Components {
            schemas,
            security_schemes: BTreeMap::new(),
        },
        tags: Vec::new(),
        security: Vec::new(),
    };

    if let Some(handler) = &config.post_build_document_handler {
        handler(&mut document);
    }
    info!(
        "Built OpenAPI document with {} paths and {} schemas",
        document.paths.len(),
        document.components.schemas.len()
    );
    document
}

fn merge_service_routes(service: &WebService, path: &str, existing: PathItem, config: &Config) -> PathItem {
    debug!("Merging path {} into an existing item", path);
    service
        .routes
        .iter()
        .filter_map(|route| {
            let (sanitized, patterns) = sanitize_path(&route.path);
            (sanitized == path).then_some((route, patterns))
        })
        .fold(existing, |item, (route, patterns)| {
            build_path_item(service, route, item, &patterns, config)
        })
}

/// Component schemas referenced by the routes of a service: read samples, write samples and
/// response models.
pub fn build_schemas(service: &WebService, config: &Config) -> SchemaTable {
    let mut schemas = SchemaTable::new();
    let mut builder = SchemaBuilder::new(&mut schemas, config);
    for route in &service.routes {
        let samples = route
            .read_sample
            .iter()
            .chain(route.write_sample.iter())
            .chain(route.responses.values().filter_map(|r| r.model.as_ref()))
            .chain(route.default_response.iter().filter_map(|r| r.model.as_ref()));
        for sample in samples {
            if let Some(ty) = sample.descriptor() {
                builder.add_model(ty, "");
            }
        }
    }
    schemas
}

/// One server per scheme when the host carries none; no servers without a host
fn build_servers(config: &Config) -> Vec<Server> {
    let host = config.host.trim();
    if host.is_empty() {
        return Vec::new();
    }
    if host.contains("://") || config.schemes.is_empty() {
        return vec![Server {
            url: host.to_string(),
            description: None,
        }];
    }
    config
        .schemes
        .iter()
        .map(|scheme| Server {
            url: format!("{scheme}://{host}"),
            description: None,
        })
        .collect()
}
