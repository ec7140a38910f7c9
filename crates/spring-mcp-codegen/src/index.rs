//! Project-wide index of model declarations.

use spring_mcp_core::{Diagnostics, WarningKind};
use spring_mcp_scanner::{ImportScope, ModelDecl};
use std::collections::BTreeMap;

/// Outcome of a scope-aware name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A model declared in the project
    Project(String),
    /// A type explicitly imported from outside the project
    External(String),
    /// Not found through imports, enclosing types, or the package
    Unknown,
}

/// Every model declaration in the project, keyed by qualified name.
#[derive(Debug, Default)]
pub struct ModelIndex {
    models: BTreeMap<String, ModelDecl>,
    by_simple: BTreeMap<String, Vec<String>>,
}

impl ModelIndex {
    /// Builds the index. Declarations must arrive in sorted file order; a
    /// qualified name declared twice keeps its first declaration.
    pub fn build(decls: impl IntoIterator<Item = ModelDecl>, diagnostics: &mut Diagnostics) -> Self {
        let mut index = Self::default();
        for decl in decls {
            let name = decl.name.as_str().to_string();
            if let Some(existing) = index.models.get(&name) {
                diagnostics.warn(
                    WarningKind::StructuralInconsistency,
                    Some(format!("{}:{}", decl.source, decl.line)),
                    format!("{name} is also declared in {}; keeping the first", existing.source),
                );
                continue;
            }
            index
                .by_simple
                .entry(decl.name.simple_name().to_string())
                .or_default()
                .push(name.clone());
            index.models.insert(name, decl);
        }
        for names in index.by_simple.values_mut() {
            names.sort();
        }
        tracing::debug!("Indexed {} model declarations", index.models.len());
        index
    }

    /// Returns a declaration by qualified name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelDecl> {
        self.models.get(name)
    }

    /// Returns `true` if the project declares `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Number of indexed declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Resolves `name` through explicit imports, the enclosing type chain of
    /// `context`, and the declaring package, in that order.
    #[must_use]
    pub fn lookup(&self, name: &str, scope: &ImportScope, context: Option<&str>) -> Lookup {
        if let Some((head, rest)) = name.split_once('.') {
            if self.contains(name) {
                return Lookup::Project(name.to_string());
            }
            if let Lookup::Project(outer) = self.lookup(head, scope, context) {
                let nested = format!("{outer}.{rest}");
                if self.contains(&nested) {
                    return Lookup::Project(nested);
                }
            }
            return Lookup::External(name.to_string());
        }

        if let Some(imported) = scope.imports.get(name) {
            return if self.contains(imported) {
                Lookup::Project(imported.clone())
            } else {
                Lookup::External(imported.clone())
            };
        }

        if let Some(mut enclosing) = context {
            loop {
                let candidate = format!("{enclosing}.{name}");
                if self.contains(&candidate) {
                    return Lookup::Project(candidate);
                }
                match enclosing.rsplit_once('.') {
                    Some((outer, _)) if outer.len() > scope.package.len() => enclosing = outer,
                    _ => break,
                }
            }
        }

        let same_package = scope.qualify(name);
        if self.contains(&same_package) {
            return Lookup::Project(same_package);
        }
        Lookup::Unknown
    }

    /// Last-resort lookup through wildcard imports and the project-wide
    /// simple-name index.
    ///
    /// Returns the candidate and, when several project types share the simple
    /// name, the list of all of them.
    #[must_use]
    pub fn lookup_loose(&self, name: &str, scope: &ImportScope) -> Option<(String, Vec<String>)> {
        for package in &scope.wildcard_imports {
            let candidate = format!("{package}.{name}");
            if self.contains(&candidate) {
                return Some((candidate, Vec::new()));
            }
        }
        let candidates = self.by_simple.get(name)?;
        let first = candidates.first()?.clone();
        let ambiguous = if candidates.len() > 1 {
            candidates.clone()
        } else {
            Vec::new()
        };
        Some((first, ambiguous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spring_mcp_core::QualifiedName;
    use spring_mcp_scanner::ModelKind;
    use std::sync::Arc;

    fn decl(name: &str, source: &str) -> ModelDecl {
        let qualified = QualifiedName::new(name);
        ModelDecl {
            scope: Arc::new(ImportScope {
                package: qualified.package().to_string(),
                ..ImportScope::default()
            }),
            name: qualified,
            kind: ModelKind::Class,
            type_params: Vec::new(),
            extends: None,
            fields: Vec::new(),
            constants: Vec::new(),
            doc: None,
            source: source.to_string(),
            line: 1,
        }
    }

    fn index(names: &[&str]) -> ModelIndex {
        let mut diagnostics = Diagnostics::new();
        ModelIndex::build(names.iter().map(|n| decl(n, "A.java")), &mut diagnostics)
    }

    fn scope(package: &str) -> ImportScope {
        ImportScope {
            package: package.to_string(),
            ..ImportScope::default()
        }
    }

    #[test]
    fn test_explicit_import_wins() {
        let index = index(&["a.User", "b.User"]);
        let mut s = scope("a");
        s.imports.insert("User".to_string(), "b.User".to_string());
        assert_eq!(index.lookup("User", &s, None), Lookup::Project("b.User".to_string()));
    }

    #[test]
    fn test_external_import() {
        let index = index(&["a.Page"]);
        let mut s = scope("a.web");
        s.imports.insert(
            "Page".to_string(),
            "org.springframework.data.domain.Page".to_string(),
        );
        assert_eq!(
            index.lookup("Page", &s, None),
            Lookup::External("org.springframework.data.domain.Page".to_string())
        );
    }

    #[test]
    fn test_nested_and_same_package() {
        let index = index(&["a.Outer", "a.Outer.Inner", "a.Sibling"]);
        let s = scope("a");
        assert_eq!(
            index.lookup("Inner", &s, Some("a.Outer")),
            Lookup::Project("a.Outer.Inner".to_string())
        );
        assert_eq!(
            index.lookup("Outer.Inner", &s, None),
            Lookup::Project("a.Outer.Inner".to_string())
        );
        assert_eq!(index.lookup("Sibling", &s, Some("a.Outer")), Lookup::Project("a.Sibling".to_string()));
        assert_eq!(index.lookup("Missing", &s, None), Lookup::Unknown);
    }

    #[test]
    fn test_loose_lookup_prefers_wildcards_then_sorted_candidates() {
        let index = index(&["z.Item", "b.Item"]);
        let mut s = scope("web");
        assert_eq!(
            index.lookup_loose("Item", &s),
            Some(("b.Item".to_string(), vec!["b.Item".to_string(), "z.Item".to_string()]))
        );
        s.wildcard_imports.push("z".to_string());
        assert_eq!(index.lookup_loose("Item", &s), Some(("z.Item".to_string(), Vec::new())));
        assert_eq!(index.lookup_loose("Nope", &s), None);
    }

    #[test]
    fn test_duplicate_declaration_keeps_first() {
        let mut diagnostics = Diagnostics::new();
        let index = ModelIndex::build(
            vec![decl("a.User", "one/User.java"), decl("a.User", "two/User.java")],
            &mut diagnostics,
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("a.User").map(|d| d.source.as_str()), Some("one/User.java"));
        assert_eq!(diagnostics.len(), 1);
    }
}
