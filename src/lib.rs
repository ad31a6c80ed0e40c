//! OpenAPI from registry - OpenAPI 3 documents from a web-service route registry.
//!
//! Routes are registered on [`registry::WebService`]s; their request and response models are
//! [`descriptor::TypeDescriptor`]s, either implemented by hand through [`descriptor::Describe`]
//! or resolved from Rust sources by [`type_resolver::TypeResolver`].
//!
//! # Architecture
//!
//! 1. [`descriptor`] - reflective type descriptions
//! 2. [`schema_builder`] - walks descriptors into the component schema table
//! 3. [`registry`] - web services, routes, parameters and responses
//! 4. [`path_builder`] - turns routes into path items and operations
//! 5. [`openapi_builder`] - assembles the document
//! 6. [`source`] and [`type_resolver`] - descriptors from Rust type definitions
//! 7. [`manifest`] - routes declared in a YAML or JSON file
//! 8. [`serializer`] and [`service`] - YAML/JSON output and the HTTP endpoint
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_registry::config::Config;
//! use openapi_from_registry::openapi_builder::build_openapi;
//! use openapi_from_registry::registry::{Parameter, Sample, WebService};
//!
//! let service = WebService::new("/users")
//!     .produces(["application/json"])
//!     .route(
//!         WebService::get("/{id}")
//!             .operation("getUser")
//!             .param(Parameter::path("id", "identifier").data_type("integer"))
//!             .returns(200, "OK", Some(Sample::of::<Vec<String>>())),
//!     );
//! let config = Config::new().title("Users").api_version("1.0").web_service(service);
//!
//! let document = build_openapi(&config);
//! assert!(document.paths.contains_key("/users/{id}"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod openapi_builder;
pub mod path_builder;
pub mod registry;
pub mod schema_builder;
pub mod serializer;
pub mod service;
pub mod source;
pub mod type_resolver;
