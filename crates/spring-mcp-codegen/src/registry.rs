//! Model Registry: one resolved schema per model key.
//!
//! Slots live in an arena indexed by registration order; a sorted map gives
//! the key to slot lookup. Requesting a key that is unseen registers an empty
//! slot immediately (in progress) and queues it. Field types that refer back
//! to a key already registered only produce a [`SchemaNode::Model`] reference
//! to it, so cyclic model graphs terminate. Draining the queue fills each slot
//! in place.
//!
//! [`SchemaNode::Model`]: crate::SchemaNode::Model

use crate::resolver::{Bindings, ModelRequest, ResolveScope, TypeResolver};
use crate::schema::{FieldSchema, ModelSchema, ModelShape};
use spring_mcp_core::{Diagnostics, QualifiedName, WarningKind};
use spring_mcp_scanner::{
    Annotation, AnnotationValue, Javadoc, ModelDecl, ModelKind, find_annotation, has_annotation,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

const NULLABLE_ANNOTATIONS: [&str; 2] = ["Nullable", "CheckForNull"];

/// Resolution state of a model key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Never requested
    Unseen,
    /// Registered, fields not resolved yet
    InProgress,
    /// Fully resolved
    Resolved,
}

#[derive(Debug)]
struct Slot {
    key: QualifiedName,
    schema: Option<ModelSchema>,
}

/// Registry of resolved models, scoped to one run.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    slots: Vec<Slot>,
    ids: BTreeMap<QualifiedName, usize>,
    pending: VecDeque<(usize, ModelRequest)>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model key. Returns `true` if the key was unseen.
    pub fn request(&mut self, request: ModelRequest) -> bool {
        if self.ids.contains_key(&request.key) {
            return false;
        }
        let id = self.slots.len();
        self.slots.push(Slot {
            key: request.key.clone(),
            schema: None,
        });
        self.ids.insert(request.key.clone(), id);
        self.pending.push_back((id, request));
        true
    }

    /// Registers every request.
    pub fn request_all(&mut self, requests: impl IntoIterator<Item = ModelRequest>) {
        for request in requests {
            self.request(request);
        }
    }

    /// Returns the state of a key.
    #[must_use]
    pub fn state(&self, key: &QualifiedName) -> ModelState {
        match self.ids.get(key).map(|&id| &self.slots[id]) {
            None => ModelState::Unseen,
            Some(Slot { schema: None, .. }) => ModelState::InProgress,
            Some(Slot { schema: Some(_), .. }) => ModelState::Resolved,
        }
    }

    /// Resolves every queued model, including the ones discovered on the way.
    ///
    /// Returns the number of models resolved by this call.
    pub fn resolve_pending(&mut self, resolver: &mut TypeResolver<'_>, diagnostics: &mut Diagnostics) -> usize {
        let mut resolved = 0;
        while let Some((id, request)) = self.pending.pop_front() {
            let (schema, needs) = build_model(&request, resolver, diagnostics);
            tracing::debug!(
                "Resolved model {} ({} fields)",
                request.key,
                schema.fields().len()
            );
            self.slots[id].schema = Some(schema);
            self.request_all(needs);
            resolved += 1;
        }
        resolved
    }

    /// Returns a resolved model.
    #[must_use]
    pub fn get(&self, key: &QualifiedName) -> Option<&ModelSchema> {
        self.ids
            .get(key)
            .and_then(|&id| self.slots[id].schema.as_ref())
    }

    /// Resolved models in key order.
    pub fn models(&self) -> impl Iterator<Item = &ModelSchema> {
        self.ids
            .values()
            .filter_map(|&id| self.slots[id].schema.as_ref())
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &QualifiedName> {
        self.slots.iter().map(|slot| &slot.key)
    }
}

fn build_model(
    request: &ModelRequest,
    resolver: &mut TypeResolver<'_>,
    diagnostics: &mut Diagnostics,
) -> (ModelSchema, Vec<ModelRequest>) {
    let mut needs = Vec::new();
    let Some(decl) = resolver.index().get(&request.decl) else {
        diagnostics.warn(
            WarningKind::StructuralInconsistency,
            None,
            format!("model {} has no declaration", request.decl),
        );
        let schema = ModelSchema {
            name: request.key.clone(),
            description: None,
            shape: ModelShape::Object(Vec::new()),
        };
        return (schema, needs);
    };

    let shape = if decl.kind == ModelKind::Enum {
        ModelShape::Enum(decl.constants.clone())
    } else {
        let mut lineage = vec![request.decl.clone()];
        ModelShape::Object(collect_fields(
            decl,
            &request.bindings,
            resolver,
            diagnostics,
            &mut needs,
            &mut lineage,
        ))
    };

    let schema = ModelSchema {
        name: request.key.clone(),
        description: decl
            .doc
            .as_ref()
            .and_then(Javadoc::summary)
            .map(ToString::to_string),
        shape,
    };
    (schema, needs)
}

/// Collects inherited fields first, then the declaration's own; an own field
/// replaces an inherited one of the same name in place.
fn collect_fields(
    decl: &ModelDecl,
    bindings: &Bindings,
    resolver: &mut TypeResolver<'_>,
    diagnostics: &mut Diagnostics,
    needs: &mut Vec<ModelRequest>,
    lineage: &mut Vec<String>,
) -> Vec<FieldSchema> {
    let context = decl.name.as_str();
    let scope = ResolveScope::new(&decl.scope, context)
        .with_context(context)
        .with_generics(&decl.type_params, bindings);

    let mut fields = Vec::new();
    if let Some(parent) = &decl.extends {
        match resolver.supertype(parent, &scope, diagnostics) {
            Some(supertype) if lineage.contains(&supertype.decl) => {
                diagnostics.warn(
                    WarningKind::StructuralInconsistency,
                    Some(format!("{}:{}", decl.source, decl.line)),
                    format!("inheritance cycle through {}", supertype.decl),
                );
            }
            Some(supertype) => {
                needs.extend(supertype.needs);
                if let Some(parent_decl) = resolver.index().get(&supertype.decl) {
                    lineage.push(supertype.decl.clone());
                    fields = collect_fields(
                        parent_decl,
                        &supertype.bindings,
                        resolver,
                        diagnostics,
                        needs,
                        lineage,
                    );
                }
            }
            None => tracing::debug!("{context}: superclass {parent} is outside the project"),
        }
    }

    let mut own = BTreeSet::new();
    for field in &decl.fields {
        if has_annotation(&field.annotations, "JsonIgnore") {
            continue;
        }
        let name = find_annotation(&field.annotations, "JsonProperty")
            .and_then(Annotation::value)
            .and_then(AnnotationValue::as_str)
            .filter(|renamed| !renamed.is_empty())
            .map_or_else(|| field.name.clone(), ToString::to_string);
        if !own.insert(name.clone()) {
            diagnostics.warn(
                WarningKind::StructuralInconsistency,
                Some(format!("{}:{}", decl.source, field.line)),
                format!("duplicate field '{name}' in {context}; keeping the first"),
            );
            continue;
        }

        let location = format!("{}.{}", decl.name.simple_name(), field.name);
        let field_scope = ResolveScope {
            location: &location,
            ..scope
        };
        let resolved = resolver.resolve(&field.ty, &field_scope, diagnostics);
        needs.extend(resolved.needs);

        let annotated_nullable = NULLABLE_ANNOTATIONS
            .iter()
            .any(|marker| has_annotation(&field.annotations, marker));
        let schema = if annotated_nullable {
            resolved.node.nullable()
        } else {
            resolved.node
        };
        let entry = FieldSchema {
            name,
            declared_type: field.ty.to_string(),
            required: !annotated_nullable && !schema.is_nullable(),
            schema,
            description: field
                .doc
                .as_ref()
                .and_then(Javadoc::summary)
                .map(ToString::to_string),
        };

        match fields.iter_mut().find(|f| f.name == entry.name) {
            Some(inherited) => *inherited = entry,
            None => fields.push(entry),
        }
    }
    fields
}
