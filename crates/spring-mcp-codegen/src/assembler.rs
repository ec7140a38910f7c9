//! Endpoint Assembler: route facts to canonical endpoints.
//!
//! Assembly runs in two passes. The first classifies every parameter,
//! resolves parameter and return types, and queues the models they need. Once
//! the registry has resolved everything, the second pass flattens object
//! bodies into per-field arguments and disambiguates tool names in fact order.

use crate::context::ScanContext;
use crate::index::ModelIndex;
use crate::paths::{join_paths, placeholders, tool_name};
use crate::registry::ModelRegistry;
use crate::resolver::{ResolveScope, TypeResolver};
use crate::schema::SchemaNode;
use spring_mcp_core::{Diagnostics, HttpVerb, ToolName, WarningKind};
use spring_mcp_scanner::{
    Annotation, AnnotationValue, Javadoc, ModelKind, RawParameter, RouteAnnotationFact,
    find_annotation,
};
use std::collections::BTreeSet;

/// Annotations that never influence binding.
const NEUTRAL_ANNOTATIONS: &[&str] = &[
    "Valid",
    "Validated",
    "NotNull",
    "NotBlank",
    "NotEmpty",
    "Null",
    "Size",
    "Min",
    "Max",
    "Positive",
    "PositiveOrZero",
    "Negative",
    "NegativeOrZero",
    "Pattern",
    "Email",
    "Past",
    "PastOrPresent",
    "Future",
    "FutureOrPresent",
    "DecimalMin",
    "DecimalMax",
    "Digits",
    "AssertTrue",
    "AssertFalse",
    "Nullable",
    "NonNull",
    "Nonnull",
    "Parameter",
    "ApiParam",
    "Schema",
    "DateTimeFormat",
    "NumberFormat",
    "Deprecated",
    "SuppressWarnings",
];

/// Annotations Spring binds from sources a tool call cannot carry.
const UNSUPPORTED_ANNOTATIONS: &[(&str, &str)] = &[
    ("RequestHeader", "header parameters are passed through, not exposed"),
    ("CookieValue", "cookie parameters are not exposed"),
    ("RequestPart", "multipart parts are not forwarded"),
    ("MatrixVariable", "matrix variables are not forwarded"),
    ("RequestAttribute", "request attributes are server-side"),
    ("SessionAttribute", "session attributes are server-side"),
    ("ModelAttribute", "form-bound model attributes are not forwarded"),
    ("AuthenticationPrincipal", "authentication is pass-through only"),
    ("CurrentSecurityContext", "authentication is pass-through only"),
];

const INJECTED: &str = "framework-injected";

/// Parameter types Spring injects from the request or the framework.
const INJECTED_TYPES: &[&str] = &[
    "HttpServletRequest",
    "HttpServletResponse",
    "ServletRequest",
    "ServletResponse",
    "HttpSession",
    "WebRequest",
    "NativeWebRequest",
    "ServerWebExchange",
    "ServerHttpRequest",
    "ServerHttpResponse",
    "Principal",
    "Authentication",
    "BindingResult",
    "Errors",
    "Model",
    "ModelMap",
    "RedirectAttributes",
    "SessionStatus",
    "UriComponentsBuilder",
    "HttpHeaders",
    "HttpMethod",
    "Locale",
    "TimeZone",
    "ZoneId",
    "InputStream",
    "OutputStream",
    "Reader",
    "Writer",
    "Pageable",
    "Sort",
];

/// How a tool argument reaches the upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Substituted into a path placeholder
    Path {
        /// Placeholder name
        variable: String,
    },
    /// Sent as a query string entry
    Query {
        /// Query key
        key: String,
    },
    /// Sent as the body, or as one field of it
    Body {
        /// Body field; `None` sends the value as the whole body
        field: Option<String>,
    },
    /// Not part of the contract
    Unbound {
        /// Why the parameter was excluded
        reason: String,
    },
}

impl Binding {
    /// Short name of the binding kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Path { .. } => "path",
            Self::Query { .. } => "query",
            Self::Body { .. } => "body",
            Self::Unbound { .. } => "unbound",
        }
    }
}

/// One tool argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Argument name
    pub name: String,
    /// Type as written in source
    pub declared_type: String,
    /// Where the argument goes upstream
    pub binding: Binding,
    /// Whether the caller must supply it
    pub required: bool,
    /// Default applied upstream when omitted
    pub default_value: Option<String>,
    /// Resolved type
    pub schema: SchemaNode,
    /// Argument documentation
    pub description: Option<String>,
}

/// One discovered route, ready to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Unique tool name
    pub tool: ToolName,
    /// Upstream verb
    pub verb: HttpVerb,
    /// Normalized path template
    pub path: String,
    /// Arguments in declaration order
    pub params: Vec<ParameterSpec>,
    /// Parameters left out of the contract, with `Binding::Unbound`
    pub excluded: Vec<ParameterSpec>,
    /// Resolved return type
    pub returns: SchemaNode,
    /// Human-readable description
    pub description: String,
    /// `Controller#method`
    pub location: String,
    /// Source file of the controller
    pub source: String,
}

impl Endpoint {
    /// Names of required arguments in argument order.
    #[must_use]
    pub fn required(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// Builds endpoints from route facts.
#[derive(Debug)]
pub struct EndpointAssembler<'a> {
    resolver: TypeResolver<'a>,
}

impl<'a> EndpointAssembler<'a> {
    /// Creates an assembler resolving names against `index`.
    #[must_use]
    pub const fn new(index: &'a ModelIndex) -> Self {
        Self {
            resolver: TypeResolver::new(index),
        }
    }

    /// Assembles every fact. Facts must be in sorted file then declaration
    /// order; tool name disambiguation follows that order.
    pub fn assemble(&mut self, facts: &[RouteAnnotationFact], context: &mut ScanContext) -> Vec<Endpoint> {
        let mut endpoints: Vec<Endpoint> = facts.iter().map(|fact| self.draft(fact, context)).collect();

        let resolved = context
            .registry
            .resolve_pending(&mut self.resolver, &mut context.diagnostics);
        tracing::debug!("Resolved {resolved} models for {} endpoints", endpoints.len());

        for endpoint in &mut endpoints {
            flatten_body(endpoint, &context.registry, &mut context.diagnostics);
            dedupe_arguments(endpoint, &mut context.diagnostics);
        }
        disambiguate(&mut endpoints, &mut context.diagnostics);
        endpoints
    }

    fn draft(&mut self, fact: &RouteAnnotationFact, context: &mut ScanContext) -> Endpoint {
        let location = fact.location();
        let path = join_paths(&fact.base_path, &fact.path);
        let template_vars = placeholders(&path);
        let scope = ResolveScope::new(&fact.scope, &location).with_context(fact.controller.as_str());

        let mut params = Vec::new();
        let mut excluded = Vec::new();
        let mut has_body = false;
        for raw in &fact.params {
            let mut spec = self.parameter(raw, fact, &scope, has_body, context);
            if let Binding::Path { variable } = &spec.binding
                && !template_vars.contains(variable)
            {
                spec.binding = Binding::Unbound {
                    reason: format!("path variable '{variable}' does not appear in {path}"),
                };
            }
            match &spec.binding {
                Binding::Unbound { reason } if reason == INJECTED => {
                    tracing::debug!("{location}: '{}' is framework-injected", raw.name);
                }
                Binding::Unbound { reason } => context.diagnostics.warn(
                    WarningKind::DegradedExtraction,
                    Some(location.clone()),
                    format!("parameter '{}' excluded: {reason}", raw.name),
                ),
                Binding::Body { .. } => has_body = true,
                Binding::Path { .. } | Binding::Query { .. } => {}
            }
            if matches!(spec.binding, Binding::Unbound { .. }) {
                excluded.push(spec);
            } else {
                params.push(spec);
            }
        }

        let diagnostics = &mut context.diagnostics;
        for variable in &template_vars {
            let bound = params
                .iter()
                .any(|p| matches!(&p.binding, Binding::Path { variable: v } if v == variable));
            if !bound {
                diagnostics.warn(
                    WarningKind::DegradedExtraction,
                    Some(location.clone()),
                    format!("placeholder {{{variable}}} has no @PathVariable; adding a string argument"),
                );
                params.push(ParameterSpec {
                    name: variable.clone(),
                    declared_type: "String".to_string(),
                    binding: Binding::Path {
                        variable: variable.clone(),
                    },
                    required: true,
                    default_value: None,
                    schema: SchemaNode::string(),
                    description: None,
                });
            }
        }

        let returns = self.resolver.resolve(&fact.return_type, &scope, diagnostics);
        context.registry.request_all(returns.needs);

        let description = describe(fact).unwrap_or_else(|| {
            context.diagnostics.note(
                WarningKind::DegradedExtraction,
                Some(location.clone()),
                "no documentation; using a generated description",
            );
            format!("{} endpoint for {path}", fact.verb)
        });

        tracing::debug!("Assembled {} {path} from {location}", fact.verb);
        Endpoint {
            tool: ToolName::new(tool_name(fact.verb, &path)),
            verb: fact.verb,
            path,
            params,
            excluded,
            returns: returns.node,
            description,
            location,
            source: fact.source.clone(),
        }
    }

    fn parameter(
        &mut self,
        raw: &RawParameter,
        fact: &RouteAnnotationFact,
        scope: &ResolveScope<'_>,
        has_body: bool,
        context: &mut ScanContext,
    ) -> ParameterSpec {
        let mut spec = ParameterSpec {
            name: raw.name.clone(),
            declared_type: raw.ty.to_string(),
            binding: Binding::Unbound {
                reason: INJECTED.to_string(),
            },
            required: false,
            default_value: None,
            schema: SchemaNode::Opaque,
            description: parameter_description(raw, fact),
        };

        let explicit = explicit_binding(raw);
        if let Some(Explicit::Unbound(reason)) = explicit {
            spec.binding = Binding::Unbound { reason };
            return spec;
        }
        if explicit.is_none() && INJECTED_TYPES.contains(&raw.ty.simple_name()) {
            return spec;
        }

        let resolved = self.resolver.resolve(&raw.ty, scope, &mut context.diagnostics);
        let nullable = resolved.node.is_nullable();
        let second_body = || Binding::Unbound {
            reason: "the method already has a request body".to_string(),
        };

        let (binding, required) = match explicit {
            Some(Explicit::Body { .. }) if has_body => (second_body(), false),
            Some(Explicit::Body { required }) => (Binding::Body { field: None }, required && !nullable),
            Some(Explicit::Path { variable, required }) => {
                (Binding::Path { variable }, required && !nullable)
            }
            Some(Explicit::Query {
                key,
                required,
                default_value,
            }) => {
                let required = required && default_value.is_none() && !nullable;
                spec.default_value = default_value;
                (Binding::Query { key }, required)
            }
            Some(Explicit::Unbound(reason)) => (Binding::Unbound { reason }, false),
            None if self.query_compatible(&resolved.node) => (
                Binding::Query {
                    key: raw.name.clone(),
                },
                false,
            ),
            None if matches!(
                resolved.node.non_null(),
                SchemaNode::Model(_) | SchemaNode::Array(_) | SchemaNode::Map(_)
            ) =>
            {
                if has_body {
                    (second_body(), false)
                } else {
                    (Binding::Body { field: None }, !nullable)
                }
            }
            None => (
                Binding::Unbound {
                    reason: format!("cannot infer a binding for {}", raw.ty),
                },
                false,
            ),
        };

        match &binding {
            Binding::Path { variable } => spec.name.clone_from(variable),
            Binding::Query { key } => spec.name.clone_from(key),
            Binding::Body { .. } | Binding::Unbound { .. } => {}
        }
        if !matches!(binding, Binding::Unbound { .. }) {
            context.registry.request_all(resolved.needs);
        }
        spec.binding = binding;
        spec.required = required;
        spec.schema = resolved.node;
        spec
    }

    /// Scalars, arrays of scalars, and enums can travel in a query string.
    fn query_compatible(&self, node: &SchemaNode) -> bool {
        let is_enum = |node: &SchemaNode| {
            node.model_key().is_some_and(|key| {
                self.resolver
                    .index()
                    .get(key.as_str())
                    .is_some_and(|decl| decl.kind == ModelKind::Enum)
            })
        };
        match node.non_null() {
            SchemaNode::Primitive { .. } => true,
            SchemaNode::Array(item) => item.primitive_type().is_some() || is_enum(item),
            other => is_enum(other),
        }
    }
}

/// Binding requested by annotations.
#[derive(Debug)]
enum Explicit {
    Body {
        required: bool,
    },
    Path {
        variable: String,
        required: bool,
    },
    Query {
        key: String,
        required: bool,
        default_value: Option<String>,
    },
    Unbound(String),
}

fn explicit_binding(raw: &RawParameter) -> Option<Explicit> {
    let annotations = &raw.annotations;
    let name_of = |annotation: &Annotation| {
        annotation
            .first_of(&["name", "value"])
            .and_then(AnnotationValue::as_str)
            .filter(|name| !name.is_empty())
            .map_or_else(|| raw.name.clone(), ToString::to_string)
    };

    if let Some(body) = find_annotation(annotations, "RequestBody") {
        return Some(Explicit::Body {
            required: body.bool_of("required").unwrap_or(true),
        });
    }
    if let Some(path) = find_annotation(annotations, "PathVariable") {
        return Some(Explicit::Path {
            variable: name_of(path),
            required: path.bool_of("required").unwrap_or(true),
        });
    }
    if let Some(query) = find_annotation(annotations, "RequestParam") {
        let default_value = query
            .get("defaultValue")
            .and_then(AnnotationValue::as_str)
            .map(ToString::to_string);
        return Some(Explicit::Query {
            key: name_of(query),
            required: query.bool_of("required").unwrap_or(true),
            default_value,
        });
    }
    for annotation in annotations {
        if let Some((_, reason)) = UNSUPPORTED_ANNOTATIONS
            .iter()
            .find(|(name, _)| *name == annotation.name)
        {
            return Some(Explicit::Unbound((*reason).to_string()));
        }
    }
    annotations
        .iter()
        .find(|a| !NEUTRAL_ANNOTATIONS.contains(&a.name.as_str()))
        .map(|a| Explicit::Unbound(format!("unrecognized annotation @{}", a.name)))
}

fn describe(fact: &RouteAnnotationFact) -> Option<String> {
    if let Some(summary) = fact.doc.as_ref().and_then(Javadoc::summary) {
        return Some(summary.to_string());
    }
    let text = |annotation: &str, keys: &[&str]| {
        find_annotation(&fact.annotations, annotation)
            .and_then(|a| {
                keys.iter()
                    .find_map(|key| a.first_of(&[*key]).and_then(AnnotationValue::as_str))
            })
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    };
    text("Operation", &["summary", "description"]).or_else(|| text("ApiOperation", &["value", "notes"]))
}

fn parameter_description(raw: &RawParameter, fact: &RouteAnnotationFact) -> Option<String> {
    fact.doc
        .as_ref()
        .and_then(|doc| doc.params.get(&raw.name))
        .filter(|text| !text.is_empty())
        .cloned()
        .or_else(|| {
            find_annotation(&raw.annotations, "Parameter")
                .and_then(|a| a.get("description"))
                .or_else(|| find_annotation(&raw.annotations, "ApiParam").and_then(Annotation::value))
                .and_then(AnnotationValue::as_str)
                .map(ToString::to_string)
        })
}

/// Replaces an object-model body argument with one argument per field.
fn flatten_body(endpoint: &mut Endpoint, registry: &ModelRegistry, diagnostics: &mut Diagnostics) {
    let Some(position) = endpoint
        .params
        .iter()
        .position(|p| p.binding == Binding::Body { field: None })
    else {
        return;
    };
    let Some(model) = endpoint.params[position]
        .schema
        .model_key()
        .and_then(|key| registry.get(key))
        .filter(|model| !model.is_enum())
    else {
        return;
    };

    let body = endpoint.params.remove(position);
    let mut taken: BTreeSet<String> = endpoint.params.iter().map(|p| p.name.clone()).collect();
    let mut flattened = Vec::with_capacity(model.fields().len());
    for field in model.fields() {
        let mut name = field.name.clone();
        if taken.contains(&name) {
            let renamed = unique_name(&format!("{}_{}", body.name, field.name), &taken);
            diagnostics.warn(
                WarningKind::NameCollision,
                Some(endpoint.location.clone()),
                format!("body field '{name}' collides with another argument; renamed to '{renamed}'"),
            );
            name = renamed;
        }
        taken.insert(name.clone());
        flattened.push(ParameterSpec {
            name,
            declared_type: field.declared_type.clone(),
            binding: Binding::Body {
                field: Some(field.name.clone()),
            },
            required: body.required && field.required,
            default_value: None,
            schema: field.schema.clone(),
            description: field.description.clone(),
        });
    }
    endpoint.params.splice(position..position, flattened);
}

fn dedupe_arguments(endpoint: &mut Endpoint, diagnostics: &mut Diagnostics) {
    let mut taken = BTreeSet::new();
    for param in &mut endpoint.params {
        if !taken.contains(&param.name) {
            taken.insert(param.name.clone());
            continue;
        }
        let renamed = unique_name(&param.name, &taken);
        diagnostics.warn(
            WarningKind::NameCollision,
            Some(endpoint.location.clone()),
            format!("duplicate argument '{}' renamed to '{renamed}'", param.name),
        );
        param.name.clone_from(&renamed);
        taken.insert(renamed);
    }
}

/// `base` if free, else `base_2`, `base_3`, ...
fn unique_name(base: &str, taken: &BTreeSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Gives every repeated tool name a counter suffix, skipping suffixed names
/// that some other endpoint already carries naturally.
fn disambiguate(endpoints: &mut [Endpoint], diagnostics: &mut Diagnostics) {
    let natural: BTreeSet<String> = endpoints
        .iter()
        .map(|e| e.tool.as_str().to_string())
        .collect();
    let mut assigned: BTreeSet<String> = BTreeSet::new();

    for endpoint in endpoints.iter_mut() {
        let base = endpoint.tool.as_str().to_string();
        if assigned.insert(base.clone()) {
            continue;
        }
        let renamed = (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !natural.contains(candidate) && !assigned.contains(candidate))
            .unwrap_or_else(|| base.clone());
        diagnostics.warn(
            WarningKind::NameCollision,
            Some(endpoint.location.clone()),
            format!("tool name '{base}' already used; renamed to '{renamed}'"),
        );
        assigned.insert(renamed.clone());
        endpoint.tool = ToolName::new(renamed);
    }
}
