//! Serialization of the generated document to YAML or JSON, and file output.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes a document to pretty-printed JSON.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes content to a file, creating parent directories as needed.
///
/// An existing file is overwritten.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::descriptor::{Describe, FieldDescriptor, StructDef, TypeDescriptor};
    use crate::openapi_builder::build_openapi;
    use crate::registry::{Parameter, Sample, WebService};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct User;

    impl Describe for User {
        fn describe() -> TypeDescriptor {
            StructDef::new("User")
                .field(FieldDescriptor::new::<u32>("id"))
                .field(FieldDescriptor::new::<String>("name"))
                .build()
        }
    }

    fn create_test_document() -> OpenApiDocument {
        let config = Config::new()
            .title("Test API")
            .description("A test API")
            .api_version("1.0.0")
            .web_service(
                WebService::new("/users")
                    .produces(["application/json"])
                    .route(
                        WebService::get("/{id}")
                            .operation("getUser")
                            .param(Parameter::path("id", "identifier").data_type("integer"))
                            .returns(200, "OK", Some(Sample::of::<User>())),
                    ),
            );
        build_openapi(&config)
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.starts_with("openapi: "));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("description: A test API"));
        assert!(yaml.contains("/users/{id}"));
        assert!(yaml.contains("#/components/schemas/User"));
    }

    #[test]
    fn test_serialize_json_is_pretty() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.lines().count() > 5);
        assert!(json.contains("\n  \"info\": {"));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["info"]["version"], "1.0.0");
        assert_eq!(parsed["paths"]["/users/{id}"]["get"]["operationId"], "getUser");
    }

    #[test]
    fn test_yaml_and_json_carry_the_same_document() {
        let doc = create_test_document();
        let from_yaml: serde_json::Value = serde_yaml::from_str(&serialize_yaml(&doc).unwrap()).unwrap();
        let from_json: serde_json::Value = serde_json::from_str(&serialize_json(&doc).unwrap()).unwrap();
        assert_eq!(from_yaml, from_json);
        assert_eq!(from_json, serde_json::to_value(&doc).unwrap());
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("openapi.yaml");

        write_to_file("openapi: 3.0.1\n", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "openapi: 3.0.1\n");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("openapi.json");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }
}
