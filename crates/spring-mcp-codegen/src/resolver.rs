//! Type Resolver: maps source type references to schema nodes.
//!
//! Lookup order for a name: type-variable bindings, explicit imports,
//! enclosing types, the declaring package, the fixed builtin table, wildcard
//! imports, and finally the project-wide simple-name index. Anything still
//! unresolved becomes [`SchemaNode::Opaque`] with a warning.
//!
//! The resolver never recurses into model fields. A project model resolves to
//! a [`SchemaNode::Model`] reference plus a [`ModelRequest`] the caller hands
//! to the registry.

use crate::index::{Lookup, ModelIndex};
use crate::schema::{JsonType, SchemaNode};
use spring_mcp_core::{Diagnostics, QualifiedName, WarningKind};
use spring_mcp_scanner::{ImportScope, ModelKind, TypeRef};
use std::collections::{BTreeMap, BTreeSet};

/// Type variable bindings of a generic instantiation.
pub type Bindings = BTreeMap<String, SchemaNode>;

/// Where a type reference was written.
#[derive(Debug, Clone, Copy)]
pub struct ResolveScope<'a> {
    /// Imports of the referencing file
    pub imports: &'a ImportScope,
    /// Qualified name of the referencing type, for nested lookups
    pub context: Option<&'a str>,
    /// Type variables declared by the referencing type
    pub type_params: &'a [String],
    /// Bound type variables
    pub bindings: Option<&'a Bindings>,
    /// Location used in warnings
    pub location: &'a str,
}

impl<'a> ResolveScope<'a> {
    /// Creates a scope with no enclosing type and no type variables.
    #[must_use]
    pub const fn new(imports: &'a ImportScope, location: &'a str) -> Self {
        Self {
            imports,
            context: None,
            type_params: &[],
            bindings: None,
            location,
        }
    }

    /// Sets the referencing type.
    #[must_use]
    pub const fn with_context(mut self, context: &'a str) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the declared type variables and their bindings.
    #[must_use]
    pub const fn with_generics(mut self, type_params: &'a [String], bindings: &'a Bindings) -> Self {
        self.type_params = type_params;
        self.bindings = Some(bindings);
        self
    }
}

/// A model the registry must resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    /// Registry key (`pkg.Page<pkg.User>` for instantiations)
    pub key: QualifiedName,
    /// Qualified name of the declaration
    pub decl: String,
    /// Type variable bindings for this instantiation
    pub bindings: Bindings,
}

/// Result of resolving one type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved node
    pub node: SchemaNode,
    /// Models referenced by the node
    pub needs: Vec<ModelRequest>,
}

/// A resolved superclass.
#[derive(Debug, Clone)]
pub struct Supertype {
    /// Qualified name of the superclass declaration
    pub decl: String,
    /// Bindings of its type variables
    pub bindings: Bindings,
    /// Models referenced by its type arguments
    pub needs: Vec<ModelRequest>,
}

#[derive(Debug, Clone, Copy)]
enum Builtin {
    Scalar(JsonType, Option<&'static str>),
    OptionalScalar(JsonType, Option<&'static str>),
    Any,
    Void,
    List,
    Optional,
    Wrapper,
    Map,
}

fn builtin(simple: &str) -> Option<Builtin> {
    use JsonType::{Boolean, Integer, Number, String};

    let kind = match simple {
        "String" | "CharSequence" | "char" | "Character" | "StringBuilder" | "Locale"
        | "Currency" | "ZoneId" => Builtin::Scalar(String, None),
        "UUID" => Builtin::Scalar(String, Some("uuid")),
        "URI" | "URL" => Builtin::Scalar(String, Some("uri")),
        "LocalDate" => Builtin::Scalar(String, Some("date")),
        "LocalDateTime" | "OffsetDateTime" | "ZonedDateTime" | "Instant" | "Date"
        | "Timestamp" | "Calendar" => Builtin::Scalar(String, Some("date-time")),
        "LocalTime" | "OffsetTime" => Builtin::Scalar(String, Some("time")),
        "Duration" => Builtin::Scalar(String, Some("duration")),
        "MultipartFile" | "Resource" => Builtin::Scalar(String, Some("binary")),
        "int" | "Integer" | "short" | "Short" | "byte" | "Byte" | "AtomicInteger" => {
            Builtin::Scalar(Integer, Some("int32"))
        }
        "long" | "Long" | "AtomicLong" => Builtin::Scalar(Integer, Some("int64")),
        "BigInteger" => Builtin::Scalar(Integer, None),
        "float" | "Float" => Builtin::Scalar(Number, Some("float")),
        "double" | "Double" => Builtin::Scalar(Number, Some("double")),
        "BigDecimal" | "Number" => Builtin::Scalar(Number, None),
        "boolean" | "Boolean" | "AtomicBoolean" => Builtin::Scalar(Boolean, None),
        "OptionalInt" => Builtin::OptionalScalar(Integer, Some("int32")),
        "OptionalLong" => Builtin::OptionalScalar(Integer, Some("int64")),
        "OptionalDouble" => Builtin::OptionalScalar(Number, Some("double")),
        "Object" | "JsonNode" | "ObjectNode" | "ArrayNode" => Builtin::Any,
        "void" | "Void" => Builtin::Void,
        "List" | "ArrayList" | "LinkedList" | "Set" | "HashSet" | "LinkedHashSet" | "TreeSet"
        | "SortedSet" | "Collection" | "Iterable" | "Queue" | "Deque" | "Stream" | "Flux" => {
            Builtin::List
        }
        "Optional" => Builtin::Optional,
        "ResponseEntity" | "HttpEntity" | "Mono" | "CompletableFuture" | "CompletionStage"
        | "Future" | "Callable" | "DeferredResult" | "WebAsyncTask" | "ListenableFuture" => {
            Builtin::Wrapper
        }
        "Map" | "HashMap" | "LinkedHashMap" | "TreeMap" | "SortedMap" | "ConcurrentMap"
        | "ConcurrentHashMap" => Builtin::Map,
        _ => return None,
    };
    Some(kind)
}

/// Single upper-case letter names (optionally followed by a digit) are
/// treated as type variables when nothing else matches.
fn looks_like_type_variable(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_digit())
        && name.len() <= 2
}

/// Deepest `<...>` nesting allowed in a generic instantiation key.
const MAX_INSTANTIATION_DEPTH: usize = 6;

fn nesting_depth(key: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0;
    for c in key.chars() {
        match c {
            '<' => {
                depth += 1;
                max = max.max(depth);
            }
            '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Requests `name` with every type variable left opaque.
fn raw_model(name: &str, type_params: &[String], needs: &mut Vec<ModelRequest>) -> SchemaNode {
    let key = QualifiedName::new(name);
    needs.push(ModelRequest {
        key: key.clone(),
        decl: name.to_string(),
        bindings: type_params
            .iter()
            .map(|param| (param.clone(), SchemaNode::Opaque))
            .collect(),
    });
    SchemaNode::Model(key)
}

/// Resolves type references against the project index.
#[derive(Debug)]
pub struct TypeResolver<'a> {
    index: &'a ModelIndex,
    reported: BTreeSet<String>,
}

impl<'a> TypeResolver<'a> {
    /// Creates a resolver over `index`.
    #[must_use]
    pub const fn new(index: &'a ModelIndex) -> Self {
        Self {
            index,
            reported: BTreeSet::new(),
        }
    }

    /// Returns the index this resolver looks names up in.
    #[must_use]
    pub const fn index(&self) -> &'a ModelIndex {
        self.index
    }

    /// Resolves one type reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_mcp_codegen::{ModelIndex, ResolveScope, SchemaNode, TypeResolver};
    /// use spring_mcp_core::Diagnostics;
    /// use spring_mcp_scanner::{ImportScope, TypeRef};
    ///
    /// let mut diagnostics = Diagnostics::new();
    /// let index = ModelIndex::build(Vec::new(), &mut diagnostics);
    /// let mut resolver = TypeResolver::new(&index);
    /// let imports = ImportScope::default();
    ///
    /// let ty = TypeRef::generic("List", vec![TypeRef::simple("String")]);
    /// let resolved = resolver.resolve(&ty, &ResolveScope::new(&imports, "A#b"), &mut diagnostics);
    /// assert_eq!(resolved.node, SchemaNode::Array(Box::new(SchemaNode::string())));
    /// assert!(resolved.needs.is_empty());
    /// ```
    pub fn resolve(
        &mut self,
        ty: &TypeRef,
        scope: &ResolveScope<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Resolution {
        let mut needs = Vec::new();
        let node = self.node(ty, scope, &mut needs, diagnostics);
        Resolution { node, needs }
    }

    /// Resolves the superclass of a model, if it is declared in the project.
    pub fn supertype(
        &mut self,
        ty: &TypeRef,
        scope: &ResolveScope<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Option<Supertype> {
        let index = self.index;
        let name = match index.lookup(&ty.name, scope.imports, scope.context) {
            Lookup::Project(name) => name,
            Lookup::External(_) => return None,
            Lookup::Unknown => index.lookup_loose(&ty.name, scope.imports)?.0,
        };
        let decl = index.get(&name)?;
        let mut needs = Vec::new();
        let args: Vec<SchemaNode> = ty
            .args
            .iter()
            .map(|arg| self.node(arg, scope, &mut needs, diagnostics))
            .collect();
        let bindings = decl
            .type_params
            .iter()
            .enumerate()
            .map(|(i, param)| (param.clone(), args.get(i).cloned().unwrap_or(SchemaNode::Opaque)))
            .collect();
        Some(Supertype {
            decl: name,
            bindings,
            needs,
        })
    }

    fn node(
        &mut self,
        ty: &TypeRef,
        scope: &ResolveScope<'_>,
        needs: &mut Vec<ModelRequest>,
        diagnostics: &mut Diagnostics,
    ) -> SchemaNode {
        if ty.array_dims > 0 {
            if ty.array_dims == 1 && ty.args.is_empty() && ty.name == "byte" {
                return SchemaNode::primitive(JsonType::String, Some("byte"));
            }
            let element = self.node(&ty.element(), scope, needs, diagnostics);
            return SchemaNode::Array(Box::new(element));
        }
        if ty.is_opaque() {
            return SchemaNode::Opaque;
        }

        if !ty.name.contains('.') && ty.args.is_empty() {
            if let Some(bound) = scope.bindings.and_then(|b| b.get(&ty.name)) {
                return bound.clone();
            }
            if scope.type_params.contains(&ty.name) {
                tracing::debug!("{}: unbound type variable {}", scope.location, ty.name);
                return SchemaNode::Opaque;
            }
        }

        let index = self.index;
        match index.lookup(&ty.name, scope.imports, scope.context) {
            Lookup::Project(name) => self.model(&name, ty, scope, needs, diagnostics),
            Lookup::External(name) => {
                let simple = name.rsplit('.').next().unwrap_or(&name);
                match builtin(simple) {
                    Some(kind) => self.builtin(kind, ty, scope, needs, diagnostics),
                    None => self.unresolved(&name, scope, diagnostics),
                }
            }
            Lookup::Unknown => {
                if let Some(kind) = builtin(&ty.name) {
                    return self.builtin(kind, ty, scope, needs, diagnostics);
                }
                if ty.args.is_empty() && looks_like_type_variable(&ty.name) {
                    tracing::debug!("{}: treating {} as a type variable", scope.location, ty.name);
                    return SchemaNode::Opaque;
                }
                match index.lookup_loose(&ty.name, scope.imports) {
                    Some((name, ambiguous)) => {
                        if !ambiguous.is_empty() && self.reported.insert(format!("ambiguous {}", ty.name)) {
                            diagnostics.warn(
                                WarningKind::DegradedExtraction,
                                Some(scope.location.to_string()),
                                format!(
                                    "{} is ambiguous ({}); using {name}",
                                    ty.name,
                                    ambiguous.join(", ")
                                ),
                            );
                        }
                        self.model(&name, ty, scope, needs, diagnostics)
                    }
                    None => self.unresolved(&ty.name, scope, diagnostics),
                }
            }
        }
    }

    fn builtin(
        &mut self,
        kind: Builtin,
        ty: &TypeRef,
        scope: &ResolveScope<'_>,
        needs: &mut Vec<ModelRequest>,
        diagnostics: &mut Diagnostics,
    ) -> SchemaNode {
        let expected = match kind {
            Builtin::Scalar(..) | Builtin::OptionalScalar(..) | Builtin::Void => 0,
            Builtin::Any => return SchemaNode::Opaque,
            Builtin::List | Builtin::Optional | Builtin::Wrapper => 1,
            Builtin::Map => 2,
        };
        let Some(mut args) = self.arguments(ty, expected, scope, needs, diagnostics) else {
            return SchemaNode::Opaque;
        };
        match kind {
            Builtin::Scalar(json, format) => SchemaNode::primitive(json, format),
            Builtin::OptionalScalar(json, format) => SchemaNode::primitive(json, format).nullable(),
            Builtin::Void => SchemaNode::Null,
            Builtin::List => args
                .pop()
                .map_or(SchemaNode::Opaque, |item| SchemaNode::Array(Box::new(item))),
            Builtin::Optional => args.pop().map_or(SchemaNode::Opaque, SchemaNode::nullable),
            Builtin::Wrapper => args.pop().unwrap_or(SchemaNode::Opaque),
            Builtin::Map => args
                .pop()
                .map_or(SchemaNode::Opaque, |value| SchemaNode::Map(Box::new(value))),
            Builtin::Any => SchemaNode::Opaque,
        }
    }

    fn arguments(
        &mut self,
        ty: &TypeRef,
        expected: usize,
        scope: &ResolveScope<'_>,
        needs: &mut Vec<ModelRequest>,
        diagnostics: &mut Diagnostics,
    ) -> Option<Vec<SchemaNode>> {
        if ty.args.len() != expected {
            diagnostics.warn(
                WarningKind::StructuralInconsistency,
                Some(scope.location.to_string()),
                format!(
                    "{ty} expects {expected} type argument(s) but has {}; treated as opaque",
                    ty.args.len()
                ),
            );
            return None;
        }
        Some(
            ty.args
                .iter()
                .map(|arg| self.node(arg, scope, needs, diagnostics))
                .collect(),
        )
    }

    fn model(
        &mut self,
        name: &str,
        ty: &TypeRef,
        scope: &ResolveScope<'_>,
        needs: &mut Vec<ModelRequest>,
        diagnostics: &mut Diagnostics,
    ) -> SchemaNode {
        let index = self.index;
        let Some(decl) = index.get(name) else {
            return SchemaNode::Opaque;
        };

        if ty.args.is_empty() {
            if !decl.type_params.is_empty() {
                tracing::debug!("{}: raw use of generic {name}", scope.location);
            }
            return raw_model(name, &decl.type_params, needs);
        }

        let expected = if decl.kind == ModelKind::Enum {
            0
        } else {
            decl.type_params.len()
        };
        let Some(args) = self.arguments(ty, expected, scope, needs, diagnostics) else {
            return SchemaNode::Opaque;
        };
        let key = QualifiedName::new(format!(
            "{name}<{}>",
            args.iter().map(SchemaNode::key).collect::<Vec<_>>().join(",")
        ));
        if nesting_depth(key.as_str()) > MAX_INSTANTIATION_DEPTH {
            if self.reported.insert(format!("nesting {name}")) {
                diagnostics.warn(
                    WarningKind::StructuralInconsistency,
                    Some(scope.location.to_string()),
                    format!(
                        "{name} is instantiated with ever deeper type arguments; \
                         deeper instances use the raw {name}"
                    ),
                );
            }
            return raw_model(name, &decl.type_params, needs);
        }
        needs.push(ModelRequest {
            key: key.clone(),
            decl: name.to_string(),
            bindings: decl.type_params.iter().cloned().zip(args).collect(),
        });
        SchemaNode::Model(key)
    }

    fn unresolved(&mut self, name: &str, scope: &ResolveScope<'_>, diagnostics: &mut Diagnostics) -> SchemaNode {
        if self.reported.insert(name.to_string()) {
            diagnostics.warn(
                WarningKind::DegradedExtraction,
                Some(scope.location.to_string()),
                format!("unresolved type {name} (third-party or unknown); treated as opaque"),
            );
        } else {
            tracing::debug!("{}: unresolved type {name}", scope.location);
        }
        SchemaNode::Opaque
    }
}
