//! Canonical schema representation.
//!
//! Every type reference found in the project resolves to a [`SchemaNode`].
//! Models are never inlined: a node refers to a model by its registry key,
//! and the registry owns the one [`ModelSchema`] per key.

use serde_json::{Map, Value, json};
use spring_mcp_core::QualifiedName;
use std::collections::BTreeSet;

/// JSON primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
}

impl JsonType {
    /// Returns the JSON Schema type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// Resolved type node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaNode {
    /// Scalar with an optional format (`int64`, `date-time`, ...)
    Primitive {
        /// JSON type
        ty: JsonType,
        /// Format annotation
        format: Option<&'static str>,
    },
    /// Homogeneous array
    Array(Box<Self>),
    /// String-keyed map
    Map(Box<Self>),
    /// Value or `null`
    Nullable(Box<Self>),
    /// Reference to a registry model
    Model(QualifiedName),
    /// `void`
    Null,
    /// Anything; used for unknown and third-party types
    Opaque,
}

impl SchemaNode {
    /// Creates a primitive node.
    #[must_use]
    pub const fn primitive(ty: JsonType, format: Option<&'static str>) -> Self {
        Self::Primitive { ty, format }
    }

    /// Plain string node.
    #[must_use]
    pub const fn string() -> Self {
        Self::primitive(JsonType::String, None)
    }

    /// Wraps the node as nullable. Opaque, null, and already-nullable nodes
    /// are returned unchanged.
    #[must_use]
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_) | Self::Opaque | Self::Null => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Returns `true` for a nullable wrapper.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// Returns the node without its nullable wrapper.
    #[must_use]
    pub fn non_null(&self) -> &Self {
        match self {
            Self::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Returns the referenced model key when the node (ignoring nullability)
    /// is a model reference.
    #[must_use]
    pub fn model_key(&self) -> Option<&QualifiedName> {
        match self.non_null() {
            Self::Model(key) => Some(key),
            _ => None,
        }
    }

    /// Returns the primitive type when the node (ignoring nullability) is a
    /// primitive.
    #[must_use]
    pub fn primitive_type(&self) -> Option<JsonType> {
        match self.non_null() {
            Self::Primitive { ty, .. } => Some(*ty),
            _ => None,
        }
    }

    /// Adds every model key referenced by this node to `out`.
    pub fn collect_models(&self, out: &mut BTreeSet<QualifiedName>) {
        match self {
            Self::Array(inner) | Self::Map(inner) | Self::Nullable(inner) => {
                inner.collect_models(out);
            }
            Self::Model(key) => {
                out.insert(key.clone());
            }
            Self::Primitive { .. } | Self::Null | Self::Opaque => {}
        }
    }

    /// Stable textual key, used to name generic instantiations.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_mcp_codegen::{JsonType, SchemaNode};
    ///
    /// let node = SchemaNode::Array(Box::new(SchemaNode::primitive(JsonType::Integer, Some("int64"))));
    /// assert_eq!(node.key(), "array<integer:int64>");
    /// ```
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Primitive { ty, format: None } => ty.as_str().to_string(),
            Self::Primitive {
                ty,
                format: Some(format),
            } => format!("{}:{format}", ty.as_str()),
            Self::Array(inner) => format!("array<{}>", inner.key()),
            Self::Map(inner) => format!("map<{}>", inner.key()),
            Self::Nullable(inner) => format!("nullable<{}>", inner.key()),
            Self::Model(key) => key.to_string(),
            Self::Null => "null".to_string(),
            Self::Opaque => "any".to_string(),
        }
    }

    /// Converts the node to its wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Primitive { ty, format } => {
                let mut node = Map::new();
                node.insert("type".to_string(), json!(ty.as_str()));
                if let Some(format) = format {
                    node.insert("format".to_string(), json!(format));
                }
                Value::Object(node)
            }
            Self::Array(inner) => json!({"type": "array", "items": inner.to_json()}),
            Self::Map(inner) => {
                json!({"type": "object", "additionalProperties": inner.to_json()})
            }
            Self::Nullable(inner) => json!({"anyOf": [inner.to_json(), {"type": "null"}]}),
            Self::Model(key) => json!({"$ref": model_ref(key)}),
            Self::Null => json!({"type": "null"}),
            Self::Opaque => json!({}),
        }
    }
}

/// JSON pointer of a model inside the schema document.
#[must_use]
pub fn model_ref(key: &QualifiedName) -> String {
    format!("#/models/{key}")
}

/// One field of an object model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Wire name (after `@JsonProperty`)
    pub name: String,
    /// Type as written in the declaration
    pub declared_type: String,
    /// Resolved type
    pub schema: SchemaNode,
    /// `false` for nullable fields
    pub required: bool,
    /// Field documentation
    pub description: Option<String>,
}

/// Shape of a resolved model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelShape {
    /// Object with ordered fields
    Object(Vec<FieldSchema>),
    /// String enumeration
    Enum(Vec<String>),
}

/// A fully resolved model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    /// Registry key
    pub name: QualifiedName,
    /// Class documentation
    pub description: Option<String>,
    /// Fields or enum values
    pub shape: ModelShape,
}

impl ModelSchema {
    /// Returns the fields of an object model (empty for enums).
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        match &self.shape {
            ModelShape::Object(fields) => fields,
            ModelShape::Enum(_) => &[],
        }
    }

    /// Returns `true` for enum models.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.shape, ModelShape::Enum(_))
    }

    /// Converts the model to its wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut node = Map::new();
        match &self.shape {
            ModelShape::Object(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|field| {
                        (
                            field.name.clone(),
                            with_description(field.schema.to_json(), field.description.as_deref()),
                        )
                    })
                    .collect();
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.name.as_str())
                    .collect();
                node.insert("type".to_string(), json!("object"));
                node.insert("properties".to_string(), Value::Object(properties));
                node.insert("required".to_string(), json!(required));
            }
            ModelShape::Enum(values) => {
                node.insert("type".to_string(), json!("string"));
                node.insert("enum".to_string(), json!(values));
            }
        }
        if let Some(description) = &self.description {
            node.insert("description".to_string(), json!(description));
        }
        Value::Object(node)
    }
}

/// Adds a `description` to an object node when one is given.
#[must_use]
pub fn with_description(mut node: Value, description: Option<&str>) -> Value {
    if let (Some(description), Value::Object(map)) = (description, &mut node) {
        map.insert("description".to_string(), json!(description));
    }
    node
}
