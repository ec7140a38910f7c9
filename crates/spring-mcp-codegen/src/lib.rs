//! Schema generation for Spring Boot to MCP conversion.
//!
//! Turns the declaration-level facts extracted by `spring-mcp-scanner` into
//! an MCP tool catalog, a forwarding table, and a small proxy runtime that
//! serves the catalog and forwards tool calls to the Spring application.
//!
//! # Architecture
//!
//! - [`ModelIndex`]: every model declaration of the project by qualified name
//! - [`TypeResolver`]: maps source type references to [`SchemaNode`]s
//! - [`ModelRegistry`]: one schema slot per model key, resolved from a work
//!   queue so cyclic models end up as references instead of recursion
//! - [`EndpointAssembler`]: routes to [`Endpoint`]s with bound arguments and
//!   unique tool names
//! - [`SchemaEmitter`]: endpoints to [`SchemaDocument`] and [`ForwardingSpec`]
//! - [`ProjectGenerator`]: renders and writes the generated project
//! - [`Converter`]: the whole run, driven by a `ConverterConfig`
//!
//! All mutable per-run state lives in a [`ScanContext`] that the run creates
//! and drops; nothing is global.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod assembler;
mod context;
mod emitter;
mod generator;
mod index;
mod paths;
mod pipeline;
mod registry;
mod resolver;
mod schema;
mod template_engine;
mod types;

pub use assembler::{Binding, Endpoint, EndpointAssembler, ParameterSpec};
pub use context::ScanContext;
pub use emitter::{
    ArgumentBinding, ForwardingRoute, ForwardingSpec, SchemaDocument, SchemaEmitter, ToolSchema,
    to_json_pretty,
};
pub use generator::{FORWARDING_FILE, PACKAGE_FILE, ProjectGenerator, SCHEMA_FILE, SERVER_FILE};
pub use index::{Lookup, ModelIndex};
pub use paths::{join_paths, normalize_placeholders, placeholders, tool_name};
pub use pipeline::{ConversionReport, Converter, ScanOutput};
pub use registry::{ModelRegistry, ModelState};
pub use resolver::{Bindings, ModelRequest, ResolveScope, Resolution, Supertype, TypeResolver};
pub use schema::{FieldSchema, JsonType, ModelSchema, ModelShape, SchemaNode, model_ref};
pub use template_engine::TemplateEngine;
pub use types::{GeneratedCode, GeneratedFile};
