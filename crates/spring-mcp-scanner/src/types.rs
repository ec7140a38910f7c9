//! Structural facts extracted from Java source files.
//!
//! These types carry only what the declaration-level parser recovers: no
//! semantic resolution happens here. Type names stay exactly as written in
//! the source; qualifying them is the resolver's job.

use serde::Serialize;
use spring_mcp_core::{HttpVerb, QualifiedName, Warning};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Role of a source file, detected from its text before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    /// Declares a `@RestController` or `@Controller`.
    Controller,
    /// Declares a class, record, or enum that may be used as a model.
    Model,
    /// Anything else (interfaces, annotation types, empty files).
    Unknown,
}

impl SourceRole {
    /// Cheap textual role detection.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_mcp_scanner::SourceRole;
    ///
    /// let role = SourceRole::detect("@RestController\npublic class A {}");
    /// assert_eq!(role, SourceRole::Controller);
    /// assert_eq!(SourceRole::detect("public record P(int x) {}"), SourceRole::Model);
    /// ```
    #[must_use]
    pub fn detect(text: &str) -> Self {
        if text.contains("@RestController") || text.contains("@Controller") {
            Self::Controller
        } else if ["class ", "record ", "enum "]
            .iter()
            .any(|keyword| text.contains(keyword))
        {
            Self::Model
        } else {
            Self::Unknown
        }
    }
}

/// One source file read from the project tree.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the project root, `/`-separated
    pub relative_path: String,
    /// Detected role
    pub role: SourceRole,
    /// Full file text
    pub text: String,
}

/// A type reference as written in source: name, type arguments, array depth.
///
/// `List<Map<String, User>>[]` becomes
/// `TypeRef { name: "List", args: [Map<String, User>], array_dims: 1 }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    /// Possibly dotted type name (`String`, `Map.Entry`, `java.util.List`)
    pub name: String,
    /// Generic type arguments, empty when none were written
    pub args: Vec<Self>,
    /// Number of `[]` suffixes (varargs count as one)
    pub array_dims: usize,
}

impl TypeRef {
    /// Name used for a bare `?` wildcard and for types the parser could not read.
    pub const OPAQUE: &'static str = "?";

    /// Creates a non-generic, non-array type reference.
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            array_dims: 0,
        }
    }

    /// Creates a generic type reference.
    #[must_use]
    pub fn generic(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            args,
            array_dims: 0,
        }
    }

    /// Creates the reference used for unreadable types.
    #[must_use]
    pub fn opaque() -> Self {
        Self::simple(Self::OPAQUE)
    }

    /// Returns `true` for an unreadable type or a bare wildcard.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.name == Self::OPAQUE
    }

    /// Returns `true` for `void`.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.name == "void" && self.array_dims == 0
    }

    /// Returns the same reference with one array dimension removed.
    #[must_use]
    pub fn element(&self) -> Self {
        Self {
            name: self.name.clone(),
            args: self.args.clone(),
            array_dims: self.array_dims.saturating_sub(1),
        }
    }

    /// Last dotted segment of the name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        for _ in 0..self.array_dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// Value of an annotation element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AnnotationValue {
    /// String literal (adjacent literals joined with `+` are concatenated)
    Str(String),
    /// `{a, b, c}` array initializer
    List(Vec<Self>),
    /// Dotted name or class literal (`RequestMethod.POST`, `User.class`)
    Path(String),
    /// `true` or `false`
    Bool(bool),
    /// Numeric literal as written
    Number(String),
    /// Anything else, as raw token text
    Other(String),
}

impl AnnotationValue {
    /// Returns the string content of a `Str` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value of a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list items, treating a scalar as a single-item list.
    #[must_use]
    pub fn items(&self) -> Vec<&Self> {
        match self {
            Self::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

/// One annotation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Simple name (`GetMapping` for `@org.springframework...GetMapping`)
    pub name: String,
    /// Single unnamed argument, as in `@GetMapping("/x")`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positional: Option<AnnotationValue>,
    /// Named arguments in source order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub named: Vec<(String, AnnotationValue)>,
    /// Line of the `@`
    pub line: usize,
}

impl Annotation {
    /// Creates an annotation without arguments.
    #[must_use]
    pub fn marker(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            positional: None,
            named: Vec::new(),
            line,
        }
    }

    /// Returns a named argument.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AnnotationValue> {
        self.named.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the `value` element: the positional argument or `value = ...`.
    #[must_use]
    pub fn value(&self) -> Option<&AnnotationValue> {
        self.positional.as_ref().or_else(|| self.get("value"))
    }

    /// Returns the first present element among `keys`, where `"value"` also
    /// matches the positional argument.
    #[must_use]
    pub fn first_of(&self, keys: &[&str]) -> Option<&AnnotationValue> {
        keys.iter().find_map(|key| {
            if *key == "value" {
                self.value()
            } else {
                self.get(key)
            }
        })
    }

    /// Returns a boolean element, if present and boolean.
    #[must_use]
    pub fn bool_of(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AnnotationValue::as_bool)
    }
}

/// Finds an annotation by simple name.
#[must_use]
pub fn find_annotation<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.name == name)
}

/// Returns `true` if any annotation has the given simple name.
#[must_use]
pub fn has_annotation(annotations: &[Annotation], name: &str) -> bool {
    find_annotation(annotations, name).is_some()
}

/// Parsed Javadoc block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Javadoc {
    /// Main description with inline tags reduced and HTML stripped
    pub description: String,
    /// `@param` descriptions keyed by parameter name
    pub params: BTreeMap<String, String>,
    /// `@return` description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
}

impl Javadoc {
    /// Returns the description, or `None` when it is blank.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        let text = self.description.trim();
        (!text.is_empty()).then_some(text)
    }
}

/// Method or record-component parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawParameter {
    /// Declared name
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Parameter annotations in source order
    pub annotations: Vec<Annotation>,
}

/// Imports and package of one compilation unit, shared by everything it declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportScope {
    /// Declared package (empty for the default package)
    pub package: String,
    /// Single-type imports keyed by simple name
    pub imports: BTreeMap<String, String>,
    /// Packages (or types) imported with `.*`
    pub wildcard_imports: Vec<String>,
}

impl ImportScope {
    /// Qualifies a simple name against the declared package.
    #[must_use]
    pub fn qualify(&self, simple: &str) -> String {
        if self.package.is_empty() {
            simple.to_string()
        } else {
            format!("{}.{simple}", self.package)
        }
    }
}

/// One route method found on a controller.
#[derive(Debug, Clone, Serialize)]
pub struct RouteAnnotationFact {
    /// Qualified name of the declaring controller
    pub controller: QualifiedName,
    /// Method name
    pub method: String,
    /// HTTP verb after resolving stacked annotations
    pub verb: HttpVerb,
    /// Class-level `@RequestMapping` path (may be empty)
    pub base_path: String,
    /// Method-level path (may be empty)
    pub path: String,
    /// Parameters in declaration order
    pub params: Vec<RawParameter>,
    /// Declared return type (`TypeRef::opaque()` if unreadable)
    pub return_type: TypeRef,
    /// Leading Javadoc
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Javadoc>,
    /// All method annotations, for documentation fallbacks
    pub annotations: Vec<Annotation>,
    /// Source file, relative to the project root
    pub source: String,
    /// Line of the method name
    pub line: usize,
    /// Imports of the declaring file
    #[serde(skip)]
    pub scope: Arc<ImportScope>,
}

impl RouteAnnotationFact {
    /// `Class#method` location used in warnings.
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}#{}", self.controller.simple_name(), self.method)
    }
}

/// Kind of a model declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Ordinary or abstract class
    Class,
    /// Record; components are its fields
    Record,
    /// Enum; constants become a string enumeration
    Enum,
}

/// One field of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    /// Field name as declared
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Field annotations
    pub annotations: Vec<Annotation>,
    /// Leading Javadoc
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Javadoc>,
    /// Line of the field name
    pub line: usize,
}

/// A class, record, or enum that may serve as a model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDecl {
    /// Fully-qualified name (nested types: `pkg.Outer.Inner`)
    pub name: QualifiedName,
    /// Kind of declaration
    pub kind: ModelKind,
    /// Declared type parameters (`T` in `ApiResponse<T>`)
    pub type_params: Vec<String>,
    /// Superclass, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<TypeRef>,
    /// Instance fields in declaration order
    pub fields: Vec<FieldDecl>,
    /// Enum constants in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<String>,
    /// Leading Javadoc
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Javadoc>,
    /// Source file, relative to the project root
    pub source: String,
    /// Line of the type name
    pub line: usize,
    /// Imports of the declaring file
    #[serde(skip)]
    pub scope: Arc<ImportScope>,
}

/// Everything extracted from one source file.
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    /// Source file, relative to the project root
    pub path: String,
    /// Package and imports
    pub scope: Arc<ImportScope>,
    /// Route facts from controller classes, in declaration order
    pub routes: Vec<RouteAnnotationFact>,
    /// Model declarations, in declaration order
    pub models: Vec<ModelDecl>,
    /// Package of a `@SpringBootApplication` class declared here
    pub application_package: Option<String>,
    /// Warnings raised while parsing, in source order
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        let ty = TypeRef {
            name: "Map".to_string(),
            args: vec![
                TypeRef::simple("String"),
                TypeRef::generic("List", vec![TypeRef::simple("User")]),
            ],
            array_dims: 1,
        };
        assert_eq!(ty.to_string(), "Map<String, List<User>>[]");
        assert_eq!(ty.element().to_string(), "Map<String, List<User>>");
    }

    #[test]
    fn test_type_ref_predicates() {
        assert!(TypeRef::opaque().is_opaque());
        assert!(TypeRef::simple("void").is_void());
        assert_eq!(TypeRef::simple("java.util.UUID").simple_name(), "UUID");
    }

    #[test]
    fn test_annotation_value_lookup() {
        let ann = Annotation {
            name: "RequestParam".to_string(),
            positional: None,
            named: vec![
                ("value".to_string(), AnnotationValue::Str("q".to_string())),
                ("required".to_string(), AnnotationValue::Bool(false)),
            ],
            line: 1,
        };
        assert_eq!(ann.value().and_then(AnnotationValue::as_str), Some("q"));
        assert_eq!(ann.bool_of("required"), Some(false));
        assert_eq!(
            ann.first_of(&["name", "value"]).and_then(AnnotationValue::as_str),
            Some("q")
        );
    }

    #[test]
    fn test_role_detection() {
        assert_eq!(
            SourceRole::detect("@Controller class X {}"),
            SourceRole::Controller
        );
        assert_eq!(SourceRole::detect("enum Color { RED }"), SourceRole::Model);
        assert_eq!(
            SourceRole::detect("public interface Repo {}"),
            SourceRole::Unknown
        );
    }

    #[test]
    fn test_scope_qualify() {
        let scope = ImportScope {
            package: "com.acme".to_string(),
            ..ImportScope::default()
        };
        assert_eq!(scope.qualify("User"), "com.acme.User");
        assert_eq!(ImportScope::default().qualify("User"), "User");
    }
}
