//! Schema Emitter: endpoints and models to the wire format.
//!
//! Produces the tool catalog ([`SchemaDocument`]) and the forwarding table
//! ([`ForwardingSpec`]) the generated runtime executes. Only models reachable
//! from some tool argument or return type are emitted.

use crate::assembler::{Binding, Endpoint, ParameterSpec};
use crate::registry::ModelRegistry;
use crate::schema::{JsonType, SchemaNode, with_description};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use spring_mcp_core::{HttpVerb, QualifiedName, Result, ToolName};
use std::collections::{BTreeMap, BTreeSet};

/// The tool catalog served by the generated runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    /// Server name
    pub name: String,
    /// Package of the `@SpringBootApplication` class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_package: Option<String>,
    /// Tools in endpoint order
    pub tools: Vec<ToolSchema>,
    /// Reachable models by key
    pub models: BTreeMap<String, Value>,
}

/// One tool of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool name
    pub name: ToolName,
    /// Description shown to clients
    pub description: String,
    /// Argument schemas by name
    pub parameters: BTreeMap<String, Value>,
    /// Required argument names
    pub required: Vec<String>,
    /// Schema of the upstream response
    pub returns: Value,
}

/// Forwarding table for the generated runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingSpec {
    /// Server name
    pub name: String,
    /// One route per tool, in catalog order
    pub routes: Vec<ForwardingRoute>,
}

/// How one tool call becomes an upstream request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingRoute {
    /// Tool name
    pub tool: ToolName,
    /// Upstream verb
    pub method: HttpVerb,
    /// Path template with `{placeholders}`
    pub path: String,
    /// Argument bindings in argument order
    pub bindings: Vec<ArgumentBinding>,
}

/// Where one argument goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "in", rename_all = "lowercase")]
pub enum ArgumentBinding {
    /// Substituted into `{name}`
    Path {
        /// Tool argument
        argument: String,
        /// Placeholder
        name: String,
    },
    /// Added to the query string as `name`
    Query {
        /// Tool argument
        argument: String,
        /// Query key
        name: String,
    },
    /// Placed into the JSON body
    Body {
        /// Tool argument
        argument: String,
        /// Body field; absent means the argument is the whole body
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },
}

impl ArgumentBinding {
    fn from_spec(spec: &ParameterSpec) -> Option<Self> {
        let argument = spec.name.clone();
        match &spec.binding {
            Binding::Path { variable } => Some(Self::Path {
                argument,
                name: variable.clone(),
            }),
            Binding::Query { key } => Some(Self::Query {
                argument,
                name: key.clone(),
            }),
            Binding::Body { field } => Some(Self::Body {
                argument,
                field: field.clone(),
            }),
            Binding::Unbound { .. } => None,
        }
    }
}

/// Converts assembled endpoints into wire documents.
#[derive(Debug, Clone)]
pub struct SchemaEmitter {
    name: String,
    base_package: Option<String>,
}

impl SchemaEmitter {
    /// Creates an emitter for a server called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, base_package: Option<String>) -> Self {
        Self {
            name: name.into(),
            base_package,
        }
    }

    /// Builds the schema document.
    #[must_use]
    pub fn document(&self, endpoints: &[Endpoint], registry: &ModelRegistry) -> SchemaDocument {
        let tools = endpoints.iter().map(tool_schema).collect();
        let models = reachable_models(endpoints, registry)
            .into_iter()
            .filter_map(|key| {
                registry
                    .get(&key)
                    .map(|model| (key.to_string(), model.to_json()))
            })
            .collect();
        SchemaDocument {
            name: self.name.clone(),
            base_package: self.base_package.clone(),
            tools,
            models,
        }
    }

    /// Builds the forwarding table.
    #[must_use]
    pub fn forwarding(&self, endpoints: &[Endpoint]) -> ForwardingSpec {
        let routes = endpoints
            .iter()
            .map(|endpoint| ForwardingRoute {
                tool: endpoint.tool.clone(),
                method: endpoint.verb,
                path: endpoint.path.clone(),
                bindings: endpoint
                    .params
                    .iter()
                    .filter_map(ArgumentBinding::from_spec)
                    .collect(),
            })
            .collect();
        ForwardingSpec {
            name: self.name.clone(),
            routes,
        }
    }
}

/// Serializes a document as pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns `Error::SerializationError` if serialization fails.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

fn tool_schema(endpoint: &Endpoint) -> ToolSchema {
    let parameters = endpoint
        .params
        .iter()
        .map(|param| (param.name.clone(), parameter_schema(param)))
        .collect();
    ToolSchema {
        name: endpoint.tool.clone(),
        description: endpoint.description.clone(),
        parameters,
        required: endpoint.required().into_iter().map(ToString::to_string).collect(),
        returns: endpoint.returns.to_json(),
    }
}

fn parameter_schema(param: &ParameterSpec) -> Value {
    let mut node = with_description(param.schema.to_json(), param.description.as_deref());
    if let (Some(default), Value::Object(map)) = (&param.default_value, &mut node) {
        map.insert("default".to_string(), typed_default(default, &param.schema));
    }
    node
}

/// Interprets a `defaultValue` string according to the argument type.
fn typed_default(raw: &str, schema: &SchemaNode) -> Value {
    let parsed = match schema.primitive_type() {
        Some(JsonType::Integer) => raw.trim().parse::<i64>().ok().map(Value::from),
        Some(JsonType::Number) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Value::from),
        Some(JsonType::Boolean) => raw.trim().parse::<bool>().ok().map(Value::from),
        Some(JsonType::String) | None => None,
    };
    parsed.unwrap_or_else(|| json!(raw))
}

/// Walks the model graph from every tool argument and return type.
fn reachable_models(endpoints: &[Endpoint], registry: &ModelRegistry) -> BTreeSet<QualifiedName> {
    let mut frontier = BTreeSet::new();
    for endpoint in endpoints {
        endpoint.returns.collect_models(&mut frontier);
        for param in &endpoint.params {
            param.schema.collect_models(&mut frontier);
        }
    }

    let mut reached = BTreeSet::new();
    let mut queue: Vec<QualifiedName> = frontier.into_iter().collect();
    while let Some(key) = queue.pop() {
        if !reached.insert(key.clone()) {
            continue;
        }
        let Some(model) = registry.get(&key) else {
            continue;
        };
        let mut referenced = BTreeSet::new();
        for field in model.fields() {
            field.schema.collect_models(&mut referenced);
        }
        queue.extend(referenced.into_iter().filter(|k| !reached.contains(k)));
    }
    reached
}
