//! Path and operation building - turns registered routes into OpenAPI path items.

use crate::config::Config;
use crate::descriptor::TypeDescriptor;
use crate::openapi_builder::{Header, MediaType, Operation, Parameter, PathItem, RequestBody, Response};
use crate::registry::{
    self, ParameterKind, ResponseError, Route, Sample, WebService, EXTENSION_PREFIX, KEY_OPENAPI_TAGS,
    KEY_SECURITY_JWT,
};
use crate::schema_builder::{key_from, primitive_schema, string_auto_type, Schema, SchemaRef};
use axum::http::StatusCode;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new("<[^>]*>").expect("valid tag pattern"));

/// Path items of every route of a service, keyed by sanitized path
pub fn build_paths(service: &WebService, config: &Config) -> BTreeMap<String, PathItem> {
    let mut paths = BTreeMap::new();
    for route in &service.routes {
        let (path, patterns) = sanitize_path(&route.path);
        let existing = paths.remove(&path).unwrap_or_default();
        let item = build_path_item(service, route, existing, &patterns, config);
        paths.insert(path, item);
    }
    paths
}

/// Strip regular expressions from named path parameters.
///
/// `/api/{name:[a-z]+}/` becomes `/api/{name}` and the pattern is returned keyed by parameter
/// name; `*` is widened to `.*`. Fragments such as `{id}:verb` are custom methods and are kept.
pub fn sanitize_path(path: &str) -> (String, BTreeMap<String, String>) {
    let mut sanitized = String::with_capacity(path.len());
    let mut patterns = BTreeMap::new();
    for fragment in path.split('/').filter(|f| !f.is_empty()) {
        sanitized.push('/');
        match fragment.strip_prefix('{').and_then(|rest| rest.split_once(':')) {
            Some((name, pattern)) if !name.contains('}') => {
                let pattern = pattern.strip_suffix('}').unwrap_or(pattern);
                let pattern = if pattern == "*" { ".*" } else { pattern };
                patterns.insert(name.to_string(), pattern.to_string());
                sanitized.push('{');
                sanitized.push_str(name);
                sanitized.push('}');
            }
            _ => sanitized.push_str(fragment),
        }
    }
    if sanitized.is_empty() {
        sanitized.push('/');
    }
    (sanitized, patterns)
}

/// Set the route's operation on `existing`, replacing an operation of the same method
pub fn build_path_item(
    service: &WebService,
    route: &Route,
    mut existing: PathItem,
    patterns: &BTreeMap<String, String>,
    config: &Config,
) -> PathItem {
    *existing.operation_mut(route.method) = Some(build_operation(service, route, patterns, config));
    existing
}

fn build_operation(
    service: &WebService,
    route: &Route,
    patterns: &BTreeMap<String, String>,
    config: &Config,
) -> Operation {
    debug!("Building operation {} {}", route.method.as_str(), route.path);
    let mut operation = Operation {
        operation_id: non_empty(&route.operation),
        description: non_empty(&route.notes),
        summary: non_empty(&strip_tags(&route.doc)),
        deprecated: route.deprecated,
        extensions: extract_extensions(&route.extensions),
        ..Default::default()
    };

    if let Some(Value::Array(tags)) = route.metadata.get(KEY_OPENAPI_TAGS) {
        operation.tags = tags.iter().filter_map(Value::as_str).map(str::to_string).collect();
    }
    if let Some(Value::String(scheme)) = route.metadata.get(KEY_SECURITY_JWT) {
        operation.security = Some(vec![BTreeMap::from([(scheme.clone(), Vec::new())])]);
    }

    for param in &service.path_parameters {
        operation
            .parameters
            .push(build_parameter(route, param, patterns.get(&param.name), config));
    }
    for param in &route.parameters {
        let built = build_parameter(route, param, patterns.get(&param.name), config);
        if param.kind != ParameterKind::Body {
            operation.parameters.push(built);
            continue;
        }
        let content = route
            .consumes
            .iter()
            .map(|media_type| {
                let media = MediaType {
                    schema: built.schema.clone(),
                };
                (media_type.clone(), media)
            })
            .collect();
        operation.request_body = Some(RequestBody {
            description: built.description,
            required: built.required,
            content,
        });
    }

    for (code, response) in &route.responses {
        operation
            .responses
            .insert(code.to_string(), build_response(response, &route.produces, config));
    }
    if let Some(response) = &route.default_response {
        operation
            .responses
            .insert("default".to_string(), build_response(response, &route.produces, config));
    }
    if operation.responses.is_empty() {
        let ok = Response {
            description: StatusCode::OK.canonical_reason().unwrap_or("OK").to_string(),
            headers: BTreeMap::new(),
            content: BTreeMap::new(),
            extensions: BTreeMap::new(),
        };
        operation.responses.insert(StatusCode::OK.as_u16().to_string(), ok);
    }
    operation
}

fn build_parameter(
    route: &Route,
    param: &registry::Parameter,
    pattern: Option<&String>,
    config: &Config,
) -> Parameter {
    let enum_values = parameter_enum(param);

    let mut schema = if param.allow_multiple {
        // validations apply to the items
        let items = Schema {
            schema_type: non_empty(&param.data_type),
            format: non_empty(&param.collection_format),
            pattern: non_empty(&param.pattern),
            min_length: param.min_length,
            max_length: param.max_length,
            enum_values,
            ..Default::default()
        };
        Schema {
            min_items: param.min_items,
            max_items: param.max_items,
            unique_items: param.unique_items,
            ..Schema::array(SchemaRef::inline(items))
        }
    } else {
        Schema {
            schema_type: non_empty(&param.data_type),
            min_length: param.min_length,
            max_length: param.max_length,
            minimum: param.minimum,
            maximum: param.maximum,
            pattern: non_empty(&param.pattern),
            enum_values,
            ..Default::default()
        }
    };
    if param.kind == ParameterKind::Path {
        schema.pattern = pattern.filter(|p| !p.is_empty()).cloned();
    }

    let schema = match &route.read_sample {
        Some(sample) if param.kind == ParameterKind::Body && param.data_type == sample.type_string() => {
            sample_schema(sample, config)
        }
        _ => {
            schema.default = string_auto_type(&param.data_type, &param.default_value);
            schema.format = non_empty(&param.data_format);
            SchemaRef::inline(schema)
        }
    };

    Parameter {
        name: param.name.clone(),
        location: param.kind.as_str().to_string(),
        description: non_empty(&param.description),
        required: param.required,
        allow_empty_value: param.allow_empty_value,
        schema: Some(schema),
        extensions: extract_extensions(&param.extensions),
    }
}

/// Possible values win over the legacy allowable values, whose keys are used sorted
fn parameter_enum(param: &registry::Parameter) -> Vec<Value> {
    let values: Vec<&String> = if param.possible_values.is_empty() {
        let mut keys: Vec<&String> = param.allowable_values.keys().collect();
        keys.sort();
        keys
    } else {
        param.possible_values.iter().collect()
    };
    values
        .into_iter()
        .filter_map(|value| string_auto_type(&param.data_type, value))
        .collect()
}

/// Schema of a request or response body sample.
///
/// Raw samples are used as given, byte buffers are binary strings, primitives are inlined and
/// anything else references its component.
pub fn sample_schema(sample: &Sample, config: &Config) -> SchemaRef {
    match sample {
        Sample::Raw(raw) => SchemaRef::inline(Schema {
            schema_type: non_empty(&raw.raw_type),
            format: non_empty(&raw.format),
            ..Default::default()
        }),
        Sample::Type(ty) => type_schema(ty, config),
    }
}

fn type_schema(ty: &TypeDescriptor, config: &Config) -> SchemaRef {
    let ty = ty.dereferenced();
    match ty {
        _ if ty.is_byte_array() => SchemaRef::inline(Schema::binary()),
        TypeDescriptor::Slice(element) => SchemaRef::inline(Schema::array(type_schema(element, config))),
        TypeDescriptor::Primitive(primitive) => SchemaRef::inline(primitive_schema(primitive, config)),
        TypeDescriptor::Interface => SchemaRef::inline(Schema::default()),
        _ => SchemaRef::component(&key_from(ty, config)),
    }
}

fn build_response(response: &ResponseError, produces: &[String], config: &Config) -> Response {
    let content = match &response.model {
        Some(model) => {
            let schema = sample_schema(model, config);
            produces
                .iter()
                .map(|media_type| {
                    let media = MediaType {
                        schema: Some(schema.clone()),
                    };
                    (media_type.clone(), media)
                })
                .collect()
        }
        None => BTreeMap::new(),
    };
    Response {
        description: response.message.clone(),
        headers: response
            .headers
            .iter()
            .map(|(name, header)| (name.clone(), build_header(header)))
            .collect(),
        content,
        extensions: extract_extensions(&response.extensions),
    }
}

fn build_header(header: &registry::Header) -> Header {
    let mut schema = Schema {
        schema_type: non_empty(&header.header_type),
        format: non_empty(&header.format),
        default: header.default.clone(),
        ..Default::default()
    };
    // arrays must describe their items
    if header.header_type == "array" {
        if let Some(format) = non_empty(&header.collection_format) {
            schema.format = Some(format);
        }
        schema.items = header.items.as_ref().map(|items| Box::new(build_header_items(items)));
    }
    Header {
        description: non_empty(&header.description),
        schema: SchemaRef::inline(schema),
    }
}

fn build_header_items(items: &registry::Items) -> SchemaRef {
    SchemaRef::inline(Schema {
        schema_type: non_empty(&items.item_type),
        format: non_empty(&items.collection_format).or_else(|| non_empty(&items.format)),
        default: items.default.clone(),
        items: items.items.as_deref().map(|nested| Box::new(build_header_items(nested))),
        ..Default::default()
    })
}

/// `<b>&lt;Hi!&gt;</b> <br>` -> `&lt;Hi!&gt; `
pub fn strip_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, "").into_owned()
}

/// Keep only `x-` prefixed extensions
pub fn extract_extensions(extensions: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    extensions
        .iter()
        .filter(|(key, _)| key.starts_with(EXTENSION_PREFIX))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Describe, FieldDescriptor, StructDef};
    use crate::registry::{Items, ResponseError};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    struct Widget;

    impl Describe for Widget {
        fn describe() -> TypeDescriptor {
            StructDef::new("Widget")
                .field(FieldDescriptor::new::<String>("Name"))
                .build()
        }
    }

    fn param<'a>(item: &'a PathItem, name: &str) -> &'a Parameter {
        item.get
            .as_ref()
            .and_then(|op| op.parameters.iter().find(|p| p.name == name))
            .unwrap_or_else(|| panic!("parameter {name} missing"))
    }

    fn inline(schema: &Option<SchemaRef>) -> &Schema {
        schema.as_ref().and_then(SchemaRef::as_inline).expect("inline schema")
    }

    fn content_schema(response: &Response, media_type: &str) -> SchemaRef {
        response.content[media_type].schema.clone().expect("content schema")
    }

    fn allowable(values: &[&str]) -> HashMap<String, String> {
        values.iter().map(|v| (v.to_string(), v.to_string())).collect()
    }

    fn tests_service() -> WebService {
        WebService::new("/tests/{v}")
            .param(path_v())
            .consumes(["application/json"])
            .produces(["application/xml"])
            .route(
                WebService::get("/a/{b}")
                    .doc("get the <strong>a</strong> <em>b</em> test\nthis is the test description")
                    .notes("notes\nblah blah")
                    .metadata(KEY_OPENAPI_TAGS, json!(["tests"]))
                    .extension("x-restful-test", json!("test value"))
                    .extension("ignored", json!(true))
                    .param(
                        registry::Parameter::path("i", "some integer param")
                            .data_type("integer")
                            .allowable_values(allowable(&["0", "1"]))
                            .default_value("1"),
                    )
                    .param(
                        registry::Parameter::path("on", "some boolean param")
                            .data_type("boolean")
                            .allowable_values(allowable(&["true", "false"]))
                            .default_value("false"),
                    )
                    .param(registry::Parameter::path("b", "value of b").default_value("default-b"))
                    .param(registry::Parameter::query("q", "value of q").default_value("default-q"))
                    .returns(200, "list of a b tests", Some(Sample::of::<Vec<Widget>>()))
                    .default_returns("default", Some(Sample::of::<Widget>()))
                    .writes(Sample::of::<Vec<Widget>>()),
            )
            .route(
                WebService::get("/a/{b}/{c:[a-z]+}/{d:[1-9]+}/e/{f:*}")
                    .param(registry::Parameter::path("b", "value of b").default_value("default-b"))
                    .param(registry::Parameter::path("c", "with regex").default_value("abc"))
                    .param(registry::Parameter::path("d", "with regex").default_value("abcef"))
                    .param(registry::Parameter::path("f", "with regex"))
                    .param(
                        registry::Parameter::query("q", "value of q")
                            .data_type("string")
                            .data_format("date")
                            .default_value("default-q")
                            .allow_multiple(true),
                    )
                    .returns(200, "list of a b tests", Some(Sample::of::<Vec<Widget>>())),
            )
    }

    fn path_v() -> registry::Parameter {
        registry::Parameter::path("v", "value of v").default_value("default-v")
    }

    #[test]
    fn test_sanitize_path() {
        let (path, patterns) = sanitize_path("/api/v1/{name:[a-z]}/{id}/");
        assert_eq!(path, "/api/v1/{name}/{id}");
        assert_eq!(patterns["name"], "[a-z]");

        let (path, patterns) = sanitize_path("/files/{rest:*}");
        assert_eq!(path, "/files/{rest}");
        assert_eq!(patterns["rest"], ".*");

        let (path, patterns) = sanitize_path("/resource/{resourceId}:init");
        assert_eq!(path, "/resource/{resourceId}:init");
        assert!(patterns.is_empty());

        assert_eq!(sanitize_path("").0, "/");
    }

    #[test]
    fn test_route_to_path() {
        let paths = build_paths(&tests_service(), &Config::default());
        let item = &paths["/tests/{v}/a/{b}"];
        let op = item.get.as_ref().unwrap();

        assert_eq!(inline(&op.parameters[0].schema).schema_type.as_deref(), Some("string"));
        assert_eq!(op.parameters[0].name, "v");
        assert_eq!(op.extensions.get("x-restful-test"), Some(&json!("test value")));
        assert!(!op.extensions.contains_key("ignored"));
        assert_eq!(op.tags, vec!["tests"]);
        assert_eq!(op.description.as_deref(), Some("notes\nblah blah"));
        assert_eq!(
            op.summary.as_deref(),
            Some("get the a b test\nthis is the test description")
        );

        let i = inline(&param(item, "i").schema);
        assert_eq!(i.enum_values, vec![json!(0), json!(1)]);
        assert_eq!(i.default, Some(json!(1)));
        let on = inline(&param(item, "on").schema);
        assert_eq!(on.enum_values, vec![json!(false), json!(true)]);
        assert_eq!(on.default, Some(json!(false)));

        let ok = content_schema(&op.responses["200"], "application/xml");
        let ok = ok.as_inline().unwrap();
        assert_eq!(ok.schema_type.as_deref(), Some("array"));
        assert_eq!(
            ok.items.as_ref().unwrap().component_name(),
            Some("Widget")
        );
        assert_eq!(op.responses["default"].description, "default");
    }

    #[test]
    fn test_path_patterns_and_multi_value_query() {
        let paths = build_paths(&tests_service(), &Config::default());
        let item = &paths["/tests/{v}/a/{b}/{c}/{d}/e/{f}"];

        assert_eq!(inline(&param(item, "c").schema).pattern.as_deref(), Some("[a-z]+"));
        assert_eq!(inline(&param(item, "d").schema).pattern.as_deref(), Some("[1-9]+"));
        assert_eq!(inline(&param(item, "f").schema).pattern.as_deref(), Some(".*"));
        assert_eq!(inline(&param(item, "v").schema).pattern, None);

        let q = inline(&param(item, "q").schema);
        assert_eq!(q.schema_type.as_deref(), Some("array"));
        assert_eq!(q.format.as_deref(), Some("date"));
        let items = q.items.as_ref().unwrap().as_inline().unwrap();
        assert_eq!(items.schema_type.as_deref(), Some("string"));
        assert_eq!(param(item, "q").location, "query");
    }

    #[test]
    fn test_custom_methods() {
        let service = WebService::new("/tests")
            .consumes(["application/json"])
            .produces(["application/xml"])
            .route(
                WebService::get("/resource:validate")
                    .doc("validate resource")
                    .returns(200, "validate resource successfully", Some(Sample::of::<Vec<Widget>>())),
            )
            .route(
                WebService::post("/resource/{resourceId}:init")
                    .doc("init the specified resource")
                    .returns(200, "ok", Some(Sample::of::<Vec<Widget>>()))
                    .returns(500, "internal server error", Some(Sample::of::<Vec<Widget>>()))
                    .reads(Sample::of::<Widget>()),
            );
        let paths = build_paths(&service, &Config::default());

        let validate = paths["/tests/resource:validate"].get.as_ref().unwrap();
        assert_eq!(validate.summary.as_deref(), Some("validate resource"));
        let init = paths["/tests/resource/{resourceId}:init"].post.as_ref().unwrap();
        assert_eq!(init.summary.as_deref(), Some("init the specified resource"));
        assert!(init.responses.contains_key("500"));
    }

    #[test]
    fn test_allowable_values_are_sorted() {
        let cheeses = ["cheddar", "feta", "colby-jack", "mozzerella"];
        let service = WebService::new("/tests/{v}")
            .param(path_v())
            .route(
                WebService::get("/a/{cheese}")
                    .param(
                        registry::Parameter::path("cheese", "value of cheese")
                            .default_value("cheddar")
                            .allowable_values(allowable(&cheeses)),
                    )
                    .param(registry::Parameter::query("q", "value of q")),
            );
        let paths = build_paths(&service, &Config::default());
        let op = paths["/tests/{v}/a/{cheese}"].get.as_ref().unwrap();

        assert_eq!(op.parameters.len(), 3);
        assert_eq!(op.parameters[1].name, "cheese");
        assert_eq!(
            inline(&op.parameters[1].schema).enum_values,
            vec![json!("cheddar"), json!("colby-jack"), json!("feta"), json!("mozzerella")]
        );
    }

    #[test]
    fn test_possible_values_keep_order() {
        let service = WebService::new("/").route(
            WebService::get("/sort").param(
                registry::Parameter::query("order", "")
                    .possible_values(&["desc", "asc"])
                    .allowable_values(allowable(&["ignored"])),
            ),
        );
        let paths = build_paths(&service, &Config::default());
        let order = inline(&param(&paths["/sort"], "order").schema).enum_values.clone();
        assert_eq!(order, vec![json!("desc"), json!("asc")]);
    }

    #[test]
    fn test_multiple_methods_on_one_path() {
        let service = WebService::new("/tests/a")
            .consumes(["application/json"])
            .produces(["application/xml"])
            .route(
                WebService::get("/a/b")
                    .doc("get a b test")
                    .returns(200, "list of a b tests", Some(Sample::of::<Vec<Widget>>())),
            )
            .route(
                WebService::post("/a/b")
                    .doc("post a b test")
                    .returns(200, "list of a b tests", Some(Sample::of::<Vec<Widget>>()))
                    .returns(500, "internal server error", Some(Sample::of::<Vec<Widget>>()))
                    .reads(Sample::of::<Widget>()),
            );
        let paths = build_paths(&service, &Config::default());
        let item = &paths["/tests/a/a/b"];

        assert_eq!(item.get.as_ref().unwrap().summary.as_deref(), Some("get a b test"));
        let post = item.post.as_ref().unwrap();
        assert_eq!(post.summary.as_deref(), Some("post a b test"));
        assert!(post.responses.contains_key("500"));

        let body = post.request_body.as_ref().unwrap();
        assert!(body.required);
        let schema = body.content["application/json"].schema.as_ref().unwrap();
        assert_eq!(schema, &SchemaRef::component("Widget"));
        assert!(post.parameters.is_empty());
    }

    #[test]
    fn test_array_in_body() {
        let service = WebService::new("/tests/a")
            .consumes(["application/json"])
            .route(WebService::post("/a/b").reads(Sample::of::<Vec<Widget>>()));
        let paths = build_paths(&service, &Config::default());
        let post = paths["/tests/a/a/b"].post.as_ref().unwrap();

        let schema = post.request_body.as_ref().unwrap().content["application/json"]
            .schema
            .clone()
            .unwrap();
        let schema = schema.as_inline().expect("array body is inline");
        assert_eq!(schema.schema_type.as_deref(), Some("array"));
        assert_eq!(schema.items.as_ref().unwrap().component_name(), Some("Widget"));
        assert_eq!(schema.format, None);
        assert_eq!(schema.default, None);
    }

    #[test]
    fn test_writes_primitive_and_custom() {
        let service = WebService::new("/tests/returns")
            .produces(["application/json"])
            .route(WebService::post("/primitive").returns(200, "primitive string", Some(Sample::of::<String>())))
            .route(WebService::post("/count").returns(200, "count", Some(Sample::of::<i64>())))
            .route(WebService::post("/custom").returns(200, "sample object", Some(Sample::of::<Widget>())));
        let paths = build_paths(&service, &Config::default());

        let response = |path: &str| {
            let op = paths[path].post.as_ref().unwrap();
            content_schema(&op.responses["200"], "application/json")
        };
        let primitive = response("/tests/returns/primitive");
        assert_eq!(primitive.as_inline().unwrap().schema_type.as_deref(), Some("string"));
        let count = response("/tests/returns/count");
        assert_eq!(count.as_inline().unwrap().format.as_deref(), Some("int64"));
        assert_eq!(response("/tests/returns/custom"), SchemaRef::component("Widget"));
    }

    #[test]
    fn test_writes_raw_schema() {
        let service = WebService::new("/tests/returns")
            .produces(["application/json"])
            .route(WebService::get("/raw").returns(200, "raw", Some(Sample::raw("file", ""))))
            .route(
                WebService::get("/raw_formatted")
                    .returns(200, "raw", Some(Sample::raw("string", "binary"))),
            );
        let paths = build_paths(&service, &Config::default());

        let raw = content_schema(&paths["/tests/returns/raw"].get.as_ref().unwrap().responses["200"], "application/json");
        assert_eq!(raw.as_inline().unwrap(), &Schema::typed("file"));
        let formatted = content_schema(
            &paths["/tests/returns/raw_formatted"].get.as_ref().unwrap().responses["200"],
            "application/json",
        );
        assert_eq!(formatted.as_inline().unwrap(), &Schema::binary());
    }

    #[test]
    fn test_bytes_in_body_and_response() {
        let service = WebService::new("/tests/a")
            .consumes(["application/json"])
            .produces(["application/xml"])
            .route(
                WebService::post("/raw")
                    .reads(Sample::raw("string", "binary"))
                    .returns(200, "ok", Some(Sample::raw("string", "binary")))
                    .returns(500, "error", Some(Sample::raw("string", "binary"))),
            )
            .route(
                WebService::post("/bytes")
                    .reads(Sample::of::<Vec<u8>>())
                    .returns(200, "ok", Some(Sample::of::<Vec<u8>>())),
            );
        let paths = build_paths(&service, &Config::default());

        for path in ["/tests/a/raw", "/tests/a/bytes"] {
            let post = paths[path].post.as_ref().unwrap();
            let body = post.request_body.as_ref().unwrap().content["application/json"]
                .schema
                .clone()
                .unwrap();
            assert_eq!(body.as_inline().unwrap(), &Schema::binary());
            let ok = content_schema(&post.responses["200"], "application/xml");
            assert_eq!(ok.as_inline().unwrap(), &Schema::binary());
        }
    }

    #[test]
    fn test_no_returns_defaults_to_ok() {
        let service = WebService::new("/").route(WebService::delete("/items/{id}"));
        let paths = build_paths(&service, &Config::default());
        let op = paths["/items/{id}"].delete.as_ref().unwrap();

        assert_eq!(op.responses.len(), 1);
        assert_eq!(op.responses["200"].description, "OK");
        assert!(op.responses["200"].content.is_empty());
    }

    #[test]
    fn test_map_response_references_component() {
        let service = WebService::new("/")
            .produces(["application/json"])
            .route(WebService::get("/index").returns(200, "ok", Some(Sample::of::<HashMap<String, Widget>>())));
        let config = Config::default();
        let paths = build_paths(&service, &config);

        let schema = content_schema(&paths["/index"].get.as_ref().unwrap().responses["200"], "application/json");
        let key = key_from(&HashMap::<String, Widget>::describe(), &config);
        assert_eq!(schema, SchemaRef::component(&key));
    }

    #[test]
    fn test_security_and_response_headers() {
        let rate_limit = registry::Header {
            header_type: "array".to_string(),
            description: "remaining quota".to_string(),
            collection_format: "csv".to_string(),
            items: Some(Items {
                item_type: "integer".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let service = WebService::new("/").route(
            WebService::get("/me")
                .metadata(KEY_SECURITY_JWT, json!("jwt"))
                .deprecate()
                .returns_error(
                    ResponseError::new(200, "ok", None)
                        .header("X-Rate-Limit", rate_limit)
                        .extension("x-cached", json!(true)),
                ),
        );
        let paths = build_paths(&service, &Config::default());
        let op = paths["/me"].get.as_ref().unwrap();

        assert!(op.deprecated);
        assert_eq!(op.security, Some(vec![BTreeMap::from([("jwt".to_string(), vec![])])]));

        let response = &op.responses["200"];
        assert_eq!(response.extensions["x-cached"], json!(true));
        let header = &response.headers["X-Rate-Limit"];
        assert_eq!(header.description.as_deref(), Some("remaining quota"));
        let schema = header.schema.as_inline().unwrap();
        assert_eq!(schema.schema_type.as_deref(), Some("array"));
        assert_eq!(schema.format.as_deref(), Some("csv"));
        let items = schema.items.as_ref().unwrap().as_inline().unwrap();
        assert_eq!(items.schema_type.as_deref(), Some("integer"));
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>&lt;Hi!&gt;</b> <br>"), "&lt;Hi!&gt; ");
    }
}
