//! Declaration-level Java parser.
//!
//! Walks the token stream of one file and records package, imports, type
//! declarations, fields, and method signatures. Method bodies and field
//! initializers are skipped by brace matching. Anything the parser cannot read
//! is skipped up to the next `;` or balanced block and reported as a warning;
//! a single bad member never loses the rest of the file.

use crate::javadoc;
use crate::lexer::{Token, TokenKind, tokenize};
use crate::routes;
use crate::types::{
    Annotation, AnnotationValue, FieldDecl, ImportScope, Javadoc, ModelDecl, ModelKind,
    ParsedUnit, RawParameter, RouteAnnotationFact, SourceRole, SourceUnit, TypeRef, has_annotation,
};
use spring_mcp_core::{QualifiedName, Warning, WarningKind};
use std::sync::Arc;

const MODIFIERS: [&str; 13] = [
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "sealed",
    "transient",
    "volatile",
    "synchronized",
    "native",
    "strictfp",
    "default",
];

/// Parses one source file into route facts and model declarations.
///
/// Never fails: problems are reported in [`ParsedUnit::warnings`].
///
/// # Examples
///
/// ```
/// use spring_mcp_scanner::{SourceRole, SourceUnit, parse_source};
///
/// let unit = SourceUnit {
///     path: "Ping.java".into(),
///     relative_path: "Ping.java".to_string(),
///     role: SourceRole::Controller,
///     text: r#"
///         package demo;
///         @RestController
///         class Ping {
///             @GetMapping("/ping")
///             String ping() { return "pong"; }
///         }
///     "#
///     .to_string(),
/// };
///
/// let parsed = parse_source(&unit);
/// assert_eq!(parsed.routes.len(), 1);
/// assert_eq!(parsed.routes[0].path, "/ping");
/// ```
#[must_use]
pub fn parse_source(unit: &SourceUnit) -> ParsedUnit {
    let mut parser = Parser::new(tokenize(&unit.text), &unit.relative_path);
    parser.header();
    match unit.role {
        SourceRole::Unknown => {
            tracing::debug!("{}: no class, record, or enum declared", unit.relative_path);
        }
        role => {
            parser.extract_routes = role == SourceRole::Controller;
            parser.declarations();
        }
    }

    tracing::debug!(
        "Parsed {}: {} routes, {} models, {} warnings",
        unit.relative_path,
        parser.routes.len(),
        parser.models.len(),
        parser.warnings.len()
    );

    ParsedUnit {
        path: unit.relative_path.clone(),
        scope: parser.scope,
        routes: parser.routes,
        models: parser.models,
        application_package: parser.application_package,
        warnings: parser.warnings,
    }
}

#[derive(Debug, Clone, Default)]
struct Prelude {
    doc: Option<Javadoc>,
    annotations: Vec<Annotation>,
    modifiers: Vec<String>,
}

impl Prelude {
    fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Class,
    Interface,
    Enum,
    Record,
    AnnotationType,
}

/// Enclosing type of the members being parsed.
#[derive(Debug)]
struct TypeContext {
    qualified: String,
    /// Set for controller classes: class name and base path.
    controller: Option<(QualifiedName, String)>,
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
    scope: Arc<ImportScope>,
    routes: Vec<RouteAnnotationFact>,
    models: Vec<ModelDecl>,
    application_package: Option<String>,
    warnings: Vec<Warning>,
    extract_routes: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            scope: Arc::new(ImportScope::default()),
            routes: Vec::new(),
            models: Vec::new(),
            application_package: None,
            warnings: Vec::new(),
            extract_routes: true,
        }
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn at_punct(&self, c: char) -> bool {
        self.peek().is_some_and(|t| t.is_punct(c))
    }

    fn at_ident(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_ident(word))
    }

    fn ident(&self) -> Option<String> {
        self.peek().and_then(Token::ident).map(ToString::to_string)
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.at_punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn location(&self, line: usize) -> String {
        format!("{}:{line}", self.source)
    }

    fn warn(&mut self, kind: WarningKind, line: usize, message: impl Into<String>) {
        let location = self.location(line);
        self.warnings
            .push(Warning::new(kind, Some(location), message));
    }

    fn skip_docs(&mut self) {
        while matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Doc(_))) {
            self.pos += 1;
        }
    }

    /// Skips a balanced group starting at `open`; leaves `pos` after the
    /// matching `close`, or at the end of input.
    fn skip_balanced(&mut self, open: char, close: char) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.pos += 1;
                    return;
                }
            }
            self.pos += 1;
        }
    }

    /// Index of the `)` matching the `(` at `pos`.
    fn matching_paren(&self) -> Option<usize> {
        let mut depth = 0usize;
        for (offset, token) in self.tokens[self.pos..].iter().enumerate() {
            if token.is_punct('(') {
                depth += 1;
            } else if token.is_punct(')') {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(self.pos + offset);
                }
            }
        }
        None
    }

    /// Skips to the end of the current member: through the next `;` or
    /// balanced `{...}` block, stopping before a closing `}`.
    fn recover(&mut self, start: usize) {
        let mut parens = 0usize;
        while let Some(token) = self.peek() {
            if token.is_punct('(') {
                parens += 1;
            } else if token.is_punct(')') {
                parens = parens.saturating_sub(1);
            } else if parens == 0 && token.is_punct(';') {
                self.pos += 1;
                return;
            } else if parens == 0 && token.is_punct('{') {
                self.skip_balanced('{', '}');
                self.eat_punct(';');
                return;
            } else if parens == 0 && token.is_punct('}') {
                break;
            }
            self.pos += 1;
        }
        // Always make progress.
        if self.pos == start && self.peek().is_some() && !self.at_punct('}') {
            self.pos += 1;
        }
    }

    // ------------------------------------------------------------------
    // File structure
    // ------------------------------------------------------------------

    fn header(&mut self) {
        let mut scope = ImportScope::default();
        loop {
            let save = self.pos;
            // Annotations may precede `package` in package-info files.
            let _ = self.prelude();
            if self.at_ident("package") {
                self.pos += 1;
                scope.package = self.dotted_name();
                self.recover(self.pos);
            } else if self.at_ident("import") {
                self.pos += 1;
                if self.at_ident("static") {
                    self.recover(self.pos);
                    continue;
                }
                let name = self.dotted_name();
                if self.at_punct('.') && self.peek_at(1).is_some_and(|t| t.is_punct('*')) {
                    scope.wildcard_imports.push(name);
                } else if let Some((_, simple)) = name.rsplit_once('.') {
                    scope.imports.insert(simple.to_string(), name.clone());
                }
                self.recover(self.pos);
            } else if !self.eat_punct(';') {
                self.pos = save;
                break;
            }
        }
        self.scope = Arc::new(scope);
    }

    fn declarations(&mut self) {
        loop {
            while self.eat_punct(';') {}
            let Some(token) = self.peek() else {
                break;
            };
            // module-info.java carries no types.
            if token.is_ident("module") || token.is_ident("open") {
                break;
            }

            let start = self.pos;
            let prelude = self.prelude();
            if self.decl_kind().is_some() {
                self.type_declaration(prelude, None);
            } else if self.peek().is_some() {
                let line = self.line();
                self.warn(
                    WarningKind::DegradedExtraction,
                    line,
                    "unexpected tokens outside of a type declaration",
                );
                self.recover(start);
                // A stray `}` at the top level would stall `recover`.
                self.eat_punct('}');
            }
        }
    }

    /// Collects leading Javadoc, annotations, and modifiers.
    fn prelude(&mut self) -> Prelude {
        let mut prelude = Prelude::default();
        loop {
            let Some(token) = self.peek() else {
                break;
            };
            match &token.kind {
                TokenKind::Doc(body) => {
                    prelude.doc = Some(javadoc::parse(body));
                    self.pos += 1;
                }
                TokenKind::Punct('@')
                    if self
                        .peek_at(1)
                        .is_some_and(|t| t.ident().is_some() && !t.is_ident("interface")) =>
                {
                    let annotation = self.annotation();
                    prelude.annotations.push(annotation);
                }
                TokenKind::Ident(word) if MODIFIERS.contains(&word.as_str()) => {
                    prelude.modifiers.push(word.clone());
                    self.pos += 1;
                }
                TokenKind::Ident(word)
                    if word == "non"
                        && self.peek_at(1).is_some_and(|t| t.is_punct('-'))
                        && self.peek_at(2).is_some_and(|t| t.is_ident("sealed")) =>
                {
                    self.pos += 3;
                }
                _ => break,
            }
        }
        prelude
    }

    fn decl_kind(&self) -> Option<DeclKind> {
        let token = self.peek()?;
        match token.ident() {
            Some("class") => Some(DeclKind::Class),
            Some("interface") => Some(DeclKind::Interface),
            Some("enum") => Some(DeclKind::Enum),
            Some("record")
                if self.peek_at(1).is_some_and(|t| t.ident().is_some())
                    && self
                        .peek_at(2)
                        .is_some_and(|t| t.is_punct('(') || t.is_punct('<')) =>
            {
                Some(DeclKind::Record)
            }
            _ if token.is_punct('@') && self.peek_at(1).is_some_and(|t| t.is_ident("interface")) => {
                Some(DeclKind::AnnotationType)
            }
            _ => None,
        }
    }

    fn dotted_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(part) = self.ident() {
            name.push_str(&part);
            self.pos += 1;
            if self.at_punct('.') && self.peek_at(1).and_then(Token::ident).is_some() {
                name.push('.');
                self.pos += 1;
            } else {
                break;
            }
        }
        name
    }

    // ------------------------------------------------------------------
    // Type declarations
    // ------------------------------------------------------------------

    fn type_declaration(&mut self, prelude: Prelude, enclosing: Option<&str>) {
        let Some(kind) = self.decl_kind() else {
            return;
        };
        self.pos += if kind == DeclKind::AnnotationType { 2 } else { 1 };

        let line = self.line();
        let start = self.pos;
        let Some(name) = self.ident() else {
            self.warn(WarningKind::DegradedExtraction, line, "type declaration without a name");
            self.recover(start);
            return;
        };
        self.pos += 1;

        let qualified = enclosing.map_or_else(
            || self.scope.qualify(&name),
            |outer| format!("{outer}.{name}"),
        );

        if has_annotation(&prelude.annotations, routes::APPLICATION_ANNOTATION) {
            self.application_package = Some(self.scope.package.clone());
        }

        let type_params = match self.type_params() {
            Some(params) => params,
            None => {
                self.warn(
                    WarningKind::DegradedExtraction,
                    line,
                    format!("unreadable type parameters on {name}"),
                );
                Vec::new()
            }
        };

        let components = if kind == DeclKind::Record && self.at_punct('(') {
            self.parameter_list(line)
        } else {
            Vec::new()
        };

        let mut extends = None;
        while let Some(token) = self.peek() {
            if token.is_punct('{') || token.is_punct(';') || token.is_punct('}') {
                break;
            }
            if token.is_ident("extends") && kind == DeclKind::Class {
                self.pos += 1;
                extends = self.parse_type();
                continue;
            }
            self.pos += 1;
        }

        if !self.at_punct('{') {
            self.warn(
                WarningKind::DegradedExtraction,
                line,
                format!("declaration of {name} has no body"),
            );
            self.recover(start);
            return;
        }

        if matches!(kind, DeclKind::Interface | DeclKind::AnnotationType) {
            self.skip_balanced('{', '}');
            return;
        }

        let controller = if self.extract_routes
            && kind == DeclKind::Class
            && routes::is_controller(&prelude.annotations)
        {
            let location = self.location(line);
            let base = routes::base_path(&prelude.annotations, &location, &mut self.warnings);
            Some((QualifiedName::new(qualified.clone()), base))
        } else {
            None
        };
        let is_controller = controller.is_some();
        let context = TypeContext {
            qualified: qualified.clone(),
            controller,
        };

        let doc = prelude.doc;
        let mut fields: Vec<FieldDecl> = components
            .into_iter()
            .map(|component| FieldDecl {
                doc: doc
                    .as_ref()
                    .and_then(|d| d.params.get(&component.name))
                    .map(|description| Javadoc {
                        description: description.clone(),
                        ..Javadoc::default()
                    }),
                line,
                name: component.name,
                ty: component.ty,
                annotations: component.annotations,
            })
            .collect();

        self.pos += 1;
        let constants = if kind == DeclKind::Enum {
            self.enum_constants()
        } else {
            Vec::new()
        };
        self.members(&context, &mut fields);

        if is_controller {
            tracing::debug!("Controller {qualified} at {}", self.location(line));
            return;
        }
        if routes::is_view_controller(&prelude.annotations) {
            tracing::debug!("View controller {qualified} at {} has no REST routes", self.location(line));
            return;
        }

        let model_kind = match kind {
            DeclKind::Record => ModelKind::Record,
            DeclKind::Enum => ModelKind::Enum,
            _ => ModelKind::Class,
        };
        self.models.push(ModelDecl {
            name: QualifiedName::new(qualified),
            kind: model_kind,
            type_params,
            extends,
            fields,
            constants,
            doc,
            source: self.source.to_string(),
            line,
            scope: Arc::clone(&self.scope),
        });
    }

    /// Reads enum constants after the opening `{`; stops after the `;` that
    /// starts the member section, or before the closing `}`.
    fn enum_constants(&mut self) -> Vec<String> {
        let mut constants = Vec::new();
        loop {
            let _ = self.prelude();
            if self.eat_punct(';') || self.at_punct('}') || self.peek().is_none() {
                break;
            }
            let Some(name) = self.ident() else {
                break;
            };
            constants.push(name);
            self.pos += 1;
            if self.at_punct('(') {
                self.skip_balanced('(', ')');
            }
            if self.at_punct('{') {
                self.skip_balanced('{', '}');
            }
            self.eat_punct(',');
        }
        constants
    }

    /// Parses members up to and including the closing `}`.
    fn members(&mut self, context: &TypeContext, fields: &mut Vec<FieldDecl>) {
        loop {
            match self.peek() {
                None => {
                    let line = self.line();
                    self.warn(
                        WarningKind::DegradedExtraction,
                        line,
                        format!("unterminated body of {}", context.qualified),
                    );
                    return;
                }
                Some(t) if t.is_punct('}') => {
                    self.pos += 1;
                    return;
                }
                Some(t) if t.is_punct(';') => self.pos += 1,
                Some(_) => self.member(context, fields),
            }
        }
    }

    fn member(&mut self, context: &TypeContext, fields: &mut Vec<FieldDecl>) {
        let start = self.pos;
        let prelude = self.prelude();

        if self.decl_kind().is_some() {
            self.type_declaration(prelude, Some(&context.qualified));
            return;
        }
        if self.at_punct('{') {
            // Instance or static initializer.
            self.skip_balanced('{', '}');
            return;
        }
        if self.at_punct('<') && self.type_params().is_none() {
            self.unreadable_member(context, &prelude, start);
            return;
        }

        let Some(ty) = self.parse_type() else {
            self.unreadable_member(context, &prelude, start);
            return;
        };

        if self.at_punct('(') {
            // Constructor.
            self.skip_balanced('(', ')');
            self.skip_method_tail();
            return;
        }
        if self.at_punct('{') {
            // Compact record constructor.
            self.skip_balanced('{', '}');
            return;
        }

        let Some(name) = self.ident() else {
            self.unreadable_member(context, &prelude, start);
            return;
        };
        let name_line = self.line();
        self.pos += 1;

        if self.at_punct('(') {
            self.method(context, prelude, ty, name, name_line);
        } else {
            self.fields(prelude, ty, name, name_line, fields);
        }
    }

    /// Handles a member whose declaration could not be read. A route method
    /// is salvaged with an opaque return type; anything else is skipped.
    fn unreadable_member(&mut self, context: &TypeContext, prelude: &Prelude, start: usize) {
        let line = self.tokens.get(start).map_or_else(|| self.line(), |t| t.line);
        let is_route = context.controller.is_some()
            && prelude.annotations.iter().any(|a| a.name.ends_with("Mapping"));

        if is_route && let Some(name_at) = self.find_method_name() {
            self.pos = name_at;
            let name = self.ident().unwrap_or_default();
            let name_line = self.line();
            self.pos += 1;
            self.warn(
                WarningKind::DegradedExtraction,
                line,
                format!("unreadable return type of {name}; using an opaque type"),
            );
            self.method(context, prelude.clone(), TypeRef::opaque(), name, name_line);
            return;
        }

        self.warn(
            WarningKind::DegradedExtraction,
            line,
            format!("skipped unreadable member in {}", context.qualified),
        );
        self.recover(start);
    }

    /// Position of the identifier in the next `name(` before any `;`, `{`, or `}`.
    fn find_method_name(&self) -> Option<usize> {
        let mut index = self.pos;
        while let Some(token) = self.tokens.get(index) {
            if token.is_punct(';') || token.is_punct('{') || token.is_punct('}') {
                return None;
            }
            if token.ident().is_some() && self.tokens.get(index + 1).is_some_and(|t| t.is_punct('(')) {
                return Some(index);
            }
            index += 1;
        }
        None
    }

    fn method(
        &mut self,
        context: &TypeContext,
        prelude: Prelude,
        return_type: TypeRef,
        name: String,
        line: usize,
    ) {
        let params = self.parameter_list(line);
        self.skip_method_tail();

        let Some((controller, base_path)) = &context.controller else {
            return;
        };
        let location = self.location(line);
        let Some(mapping) = routes::route_mapping(&prelude.annotations, &location, &mut self.warnings)
        else {
            return;
        };

        tracing::debug!(
            "Route {} {}{} -> {}#{name}",
            mapping.verb,
            base_path,
            mapping.path,
            controller.simple_name()
        );
        self.routes.push(RouteAnnotationFact {
            controller: controller.clone(),
            method: name,
            verb: mapping.verb,
            base_path: base_path.clone(),
            path: mapping.path,
            params,
            return_type,
            doc: prelude.doc,
            annotations: prelude.annotations,
            source: self.source.to_string(),
            line,
            scope: Arc::clone(&self.scope),
        });
    }

    /// Skips `throws` clauses, `default` values, and the body or `;`.
    fn skip_method_tail(&mut self) {
        while let Some(token) = self.peek() {
            if token.is_punct('{') {
                self.skip_balanced('{', '}');
                return;
            }
            if token.is_punct(';') {
                self.pos += 1;
                return;
            }
            if token.is_punct('}') {
                return;
            }
            if token.is_punct('(') {
                self.skip_balanced('(', ')');
                continue;
            }
            self.pos += 1;
        }
    }

    fn fields(
        &mut self,
        prelude: Prelude,
        ty: TypeRef,
        first: String,
        first_line: usize,
        fields: &mut Vec<FieldDecl>,
    ) {
        let skipped = prelude.has_modifier("static") || prelude.has_modifier("transient");
        let mut name = first;
        let mut line = first_line;
        loop {
            let mut field_ty = ty.clone();
            while self.at_punct('[') && self.peek_at(1).is_some_and(|t| t.is_punct(']')) {
                field_ty.array_dims += 1;
                self.pos += 2;
            }
            if self.eat_punct('=') {
                self.skip_initializer();
            }
            if !skipped {
                fields.push(FieldDecl {
                    name,
                    ty: field_ty,
                    annotations: prelude.annotations.clone(),
                    doc: prelude.doc.clone(),
                    line,
                });
            }
            if self.eat_punct(',')
                && let Some(next) = self.ident()
            {
                name = next;
                line = self.line();
                self.pos += 1;
                continue;
            }
            if !self.eat_punct(';') {
                let here = self.line();
                self.warn(
                    WarningKind::DegradedExtraction,
                    here,
                    "unterminated field declaration",
                );
                let start = self.pos;
                self.recover(start);
            }
            return;
        }
    }

    /// Skips an initializer expression, stopping before `,` or `;`.
    fn skip_initializer(&mut self) {
        let mut nesting = 0usize;
        let mut angles = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Punct('(' | '[' | '{') => nesting += 1,
                TokenKind::Punct(')' | ']') => nesting = nesting.saturating_sub(1),
                TokenKind::Punct('}') => {
                    if nesting == 0 {
                        return;
                    }
                    nesting -= 1;
                }
                TokenKind::Punct('<') => angles += 1,
                TokenKind::Punct('>') => angles = angles.saturating_sub(1),
                TokenKind::Punct(';') if nesting == 0 => return,
                TokenKind::Punct(',') if nesting == 0 && angles == 0 => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Parses `( ... )` at `pos` into parameters and moves past the `)`.
    fn parameter_list(&mut self, line: usize) -> Vec<RawParameter> {
        let Some(close) = self.matching_paren() else {
            self.warn(
                WarningKind::DegradedExtraction,
                line,
                "unterminated parameter list",
            );
            self.pos = self.tokens.len();
            return Vec::new();
        };

        let mut params = Vec::new();
        for (index, (from, to)) in self.split_top_level(self.pos + 1, close).into_iter().enumerate() {
            self.pos = from;
            match self.parameter() {
                Some(param) if self.pos == to => params.push(param),
                _ => {
                    let param = self.fallback_parameter(from, to, index);
                    self.warn(
                        WarningKind::DegradedExtraction,
                        line,
                        format!("unreadable declaration of parameter '{}'", param.name),
                    );
                    params.push(param);
                }
            }
        }
        self.pos = close + 1;
        params
    }

    /// Splits `[from, to)` at commas outside of brackets.
    fn split_top_level(&self, from: usize, to: usize) -> Vec<(usize, usize)> {
        let mut slices = Vec::new();
        let mut depth = 0usize;
        let mut start = from;
        for index in from..to {
            match self.tokens[index].kind {
                TokenKind::Punct('(' | '<' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | '>' | ']' | '}') => depth = depth.saturating_sub(1),
                TokenKind::Punct(',') if depth == 0 => {
                    slices.push((start, index));
                    start = index + 1;
                }
                _ => {}
            }
        }
        if start < to {
            slices.push((start, to));
        }
        slices
    }

    fn parameter(&mut self) -> Option<RawParameter> {
        self.skip_docs();
        let prelude = self.prelude();
        let mut ty = self.parse_type()?;
        if self.at_punct('.')
            && self.peek_at(1).is_some_and(|t| t.is_punct('.'))
            && self.peek_at(2).is_some_and(|t| t.is_punct('.'))
        {
            ty.array_dims += 1;
            self.pos += 3;
        }
        let name = self.ident()?;
        self.pos += 1;
        while self.at_punct('[') && self.peek_at(1).is_some_and(|t| t.is_punct(']')) {
            ty.array_dims += 1;
            self.pos += 2;
        }
        Some(RawParameter {
            name,
            ty,
            annotations: prelude.annotations,
        })
    }

    fn fallback_parameter(&mut self, from: usize, to: usize, index: usize) -> RawParameter {
        self.pos = from;
        let prelude = self.prelude();
        let name = self.tokens[from..to]
            .iter()
            .rev()
            .find_map(Token::ident)
            .map_or_else(|| format!("arg{index}"), ToString::to_string);
        RawParameter {
            name,
            ty: TypeRef::opaque(),
            annotations: prelude.annotations,
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Parses a type reference. `? extends X` and `? super X` read as `X`.
    fn parse_type(&mut self) -> Option<TypeRef> {
        self.skip_type_annotations();
        if self.eat_punct('?') {
            if self.at_ident("extends") || self.at_ident("super") {
                self.pos += 1;
                return self.parse_type();
            }
            return Some(TypeRef::opaque());
        }

        let mut name = self.ident()?;
        self.pos += 1;
        let mut args = Vec::new();
        loop {
            if self.at_punct('<') {
                args = self.type_args()?;
            }
            if self.at_punct('.') && self.peek_at(1).and_then(Token::ident).is_some() {
                self.pos += 1;
                if let Some(part) = self.ident() {
                    name.push('.');
                    name.push_str(&part);
                    self.pos += 1;
                    args.clear();
                }
                continue;
            }
            break;
        }

        let mut array_dims = 0;
        loop {
            self.skip_type_annotations();
            if self.at_punct('[') && self.peek_at(1).is_some_and(|t| t.is_punct(']')) {
                array_dims += 1;
                self.pos += 2;
            } else {
                break;
            }
        }

        Some(TypeRef {
            name,
            args,
            array_dims,
        })
    }

    fn type_args(&mut self) -> Option<Vec<TypeRef>> {
        self.pos += 1;
        if self.eat_punct('>') {
            return Some(Vec::new());
        }
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            if self.eat_punct(',') {
                continue;
            }
            if self.eat_punct('>') {
                return Some(args);
            }
            return None;
        }
    }

    /// Reads `<T, U extends Bound<U> & Other>`; returns the names.
    fn type_params(&mut self) -> Option<Vec<String>> {
        if !self.eat_punct('<') {
            return Some(Vec::new());
        }
        let mut names = Vec::new();
        loop {
            self.skip_type_annotations();
            names.push(self.ident()?);
            self.pos += 1;
            if self.at_ident("extends") {
                self.pos += 1;
                self.parse_type()?;
                while self.eat_punct('&') {
                    self.parse_type()?;
                }
            }
            if self.eat_punct(',') {
                continue;
            }
            if self.eat_punct('>') {
                return Some(names);
            }
            return None;
        }
    }

    fn skip_type_annotations(&mut self) {
        while self.at_punct('@') && self.peek_at(1).is_some_and(|t| t.ident().is_some()) {
            let _ = self.annotation();
        }
    }

    // ------------------------------------------------------------------
    // Annotations
    // ------------------------------------------------------------------

    /// Parses `@Name` or `@Name(...)` at `pos`.
    fn annotation(&mut self) -> Annotation {
        let line = self.line();
        self.pos += 1;
        let qualified = self.dotted_name();
        let simple = qualified
            .rsplit('.')
            .next()
            .unwrap_or(&qualified)
            .to_string();
        let mut annotation = Annotation::marker(simple, line);

        if !self.eat_punct('(') {
            return annotation;
        }
        if self.eat_punct(')') {
            return annotation;
        }

        let named = self.ident().is_some() && self.peek_at(1).is_some_and(|t| t.is_punct('='));
        if named {
            loop {
                let Some(key) = self.ident() else {
                    break;
                };
                if !self.peek_at(1).is_some_and(|t| t.is_punct('=')) {
                    break;
                }
                self.pos += 2;
                let value = self.element_value();
                annotation.named.push((key, value));
                if !self.eat_punct(',') {
                    break;
                }
            }
        } else {
            annotation.positional = Some(self.element_value());
        }

        // Tolerate anything left before the closing parenthesis.
        let mut depth = 1usize;
        while let Some(token) = self.peek() {
            if token.is_punct('(') {
                depth += 1;
            } else if token.is_punct(')') {
                depth -= 1;
                if depth == 0 {
                    self.pos += 1;
                    break;
                }
            }
            self.pos += 1;
        }
        annotation
    }

    fn element_value(&mut self) -> AnnotationValue {
        if self.eat_punct('{') {
            let mut items = Vec::new();
            loop {
                if self.eat_punct('}') || self.peek().is_none() {
                    break;
                }
                items.push(self.element_value());
                if self.eat_punct(',') {
                    continue;
                }
                if self.eat_punct('}') {
                    break;
                }
                // Unexpected token inside the initializer.
                self.pos += 1;
            }
            return AnnotationValue::List(items);
        }
        if self.at_punct('@') {
            let nested = self.annotation();
            return AnnotationValue::Other(format!("@{}", nested.name));
        }

        let start = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') if depth == 0 => break,
                TokenKind::Punct(')' | ']' | '}') => depth -= 1,
                TokenKind::Punct(',') if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }
        classify_expression(&self.tokens[start..self.pos])
    }
}

fn classify_expression(tokens: &[Token]) -> AnnotationValue {
    match tokens {
        [] => return AnnotationValue::Other(String::new()),
        [token] => match &token.kind {
            TokenKind::Str(s) => return AnnotationValue::Str(s.clone()),
            TokenKind::Ident(w) if w == "true" => return AnnotationValue::Bool(true),
            TokenKind::Ident(w) if w == "false" => return AnnotationValue::Bool(false),
            TokenKind::Number(n) => return AnnotationValue::Number(n.clone()),
            _ => {}
        },
        [sign, number] if sign.is_punct('-') => {
            if let TokenKind::Number(n) = &number.kind {
                return AnnotationValue::Number(format!("-{n}"));
            }
        }
        _ => {}
    }

    // "a" + "b" + "c"
    let concatenated: Option<String> = tokens
        .iter()
        .enumerate()
        .try_fold(String::new(), |mut acc, (i, token)| {
            match (&token.kind, i % 2) {
                (TokenKind::Str(s), 0) => acc.push_str(s),
                (TokenKind::Punct('+'), 1) => {}
                _ => return None,
            }
            Some(acc)
        })
        .filter(|_| tokens.len() % 2 == 1);
    if let Some(text) = concatenated {
        return AnnotationValue::Str(text);
    }

    // RequestMethod.GET, User.class
    let is_path = tokens.iter().enumerate().all(|(i, token)| {
        if i % 2 == 0 {
            token.ident().is_some()
        } else {
            token.is_punct('.')
        }
    }) && tokens.len() % 2 == 1;
    if is_path {
        return AnnotationValue::Path(tokens.iter().map(Token::text).collect());
    }

    AnnotationValue::Other(
        tokens
            .iter()
            .map(Token::text)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::find_annotation;
    use spring_mcp_core::HttpVerb;

    fn parse(text: &str) -> ParsedUnit {
        let unit = SourceUnit {
            path: "Test.java".into(),
            relative_path: "src/main/java/Test.java".to_string(),
            role: SourceRole::detect(text),
            text: text.to_string(),
        };
        parse_source(&unit)
    }

    #[test]
    fn test_package_and_imports() {
        let parsed = parse(
            "package com.acme.api;\n\
             import java.util.List;\n\
             import com.acme.dto.*;\n\
             import static java.util.Objects.requireNonNull;\n\
             class A {}",
        );
        assert_eq!(parsed.scope.package, "com.acme.api");
        assert_eq!(
            parsed.scope.imports.get("List").map(String::as_str),
            Some("java.util.List")
        );
        assert_eq!(parsed.scope.wildcard_imports, vec!["com.acme.dto".to_string()]);
        assert!(!parsed.scope.imports.contains_key("requireNonNull"));
    }

    #[test]
    fn test_controller_routes() {
        let parsed = parse(
            r#"
            package com.acme;

            @RestController
            @RequestMapping("/api/users")
            public class UserController {
                private final UserService service;

                public UserController(UserService service) { this.service = service; }

                /**
                 * Fetch one user.
                 * @param id the id
                 */
                @GetMapping("/{id}")
                public ResponseEntity<User> get(@PathVariable("id") Long id) {
                    return ResponseEntity.ok(service.find(id));
                }

                @PostMapping
                public User create(@Valid @RequestBody CreateUserRequest request) {
                    return service.create(request);
                }

                private void helper() {}
            }
            "#,
        );

        assert!(parsed.models.is_empty());
        assert_eq!(parsed.routes.len(), 2);

        let get = &parsed.routes[0];
        assert_eq!(get.controller.as_str(), "com.acme.UserController");
        assert_eq!(get.method, "get");
        assert_eq!(get.verb, HttpVerb::Get);
        assert_eq!(get.base_path, "/api/users");
        assert_eq!(get.path, "/{id}");
        assert_eq!(get.return_type.to_string(), "ResponseEntity<User>");
        assert_eq!(get.params.len(), 1);
        assert_eq!(get.params[0].name, "id");
        assert_eq!(get.params[0].ty, TypeRef::simple("Long"));
        let doc = get.doc.as_ref().unwrap();
        assert_eq!(doc.summary(), Some("Fetch one user."));
        assert_eq!(doc.params.get("id").map(String::as_str), Some("the id"));

        let create = &parsed.routes[1];
        assert_eq!(create.verb, HttpVerb::Post);
        assert_eq!(create.path, "");
        assert!(create.doc.is_none());
        let names: Vec<_> = create.params[0]
            .annotations
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, ["Valid", "RequestBody"]);
    }

    #[test]
    fn test_model_declarations() {
        let parsed = parse(
            r#"
            package com.acme.dto;

            /** A user. */
            public class User extends BaseEntity {
                public static final int MAX = 10;
                private transient String cache;

                /** Display name. */
                @JsonProperty("display_name")
                private String name;
                private int age, score;
                private List<Map<String, Tag>> tags = new ArrayList<>();
                private User manager;

                public String getName() { return name; }

                public static class Tag {
                    private String label;
                }
            }
            "#,
        );

        assert_eq!(parsed.models.len(), 2);
        let tag = &parsed.models[0];
        assert_eq!(tag.name.as_str(), "com.acme.dto.User.Tag");

        let user = &parsed.models[1];
        assert_eq!(user.name.as_str(), "com.acme.dto.User");
        assert_eq!(user.kind, ModelKind::Class);
        assert_eq!(user.extends, Some(TypeRef::simple("BaseEntity")));
        assert_eq!(user.doc.as_ref().unwrap().summary(), Some("A user."));

        let fields: Vec<_> = user.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, ["name", "age", "score", "tags", "manager"]);
        assert_eq!(user.fields[3].ty.to_string(), "List<Map<String, Tag>>");
        assert_eq!(
            user.fields[0].doc.as_ref().unwrap().summary(),
            Some("Display name.")
        );
        let rename = find_annotation(&user.fields[0].annotations, "JsonProperty").unwrap();
        assert_eq!(
            rename.value().and_then(AnnotationValue::as_str),
            Some("display_name")
        );
    }

    #[test]
    fn test_records_and_enums() {
        let parsed = parse(
            r"
            package p;
            /**
             * Point.
             * @param x horizontal
             */
            public record Point(int x, @Nullable Integer y) {
                public Point {
                    if (x < 0) throw new IllegalArgumentException();
                }
            }
            public enum Status {
                ACTIVE(1) { },
                DISABLED(2);
                private final int code;
                Status(int code) { this.code = code; }
            }
            ",
        );
        assert_eq!(parsed.models.len(), 2);
        let point = &parsed.models[0];
        assert_eq!(point.kind, ModelKind::Record);
        assert_eq!(point.fields.len(), 2);
        assert_eq!(
            point.fields[0].doc.as_ref().map(|d| d.description.as_str()),
            Some("horizontal")
        );
        assert_eq!(point.fields[1].annotations[0].name, "Nullable");

        let status = &parsed.models[1];
        assert_eq!(status.kind, ModelKind::Enum);
        assert_eq!(status.constants, ["ACTIVE", "DISABLED"]);
    }

    #[test]
    fn test_generic_model() {
        let parsed = parse(
            "package p; public class ApiResponse<T extends Serializable & Comparable<T>> { \
             private T data; private List<? extends T> items; private Map<?, ?> meta; }",
        );
        let model = &parsed.models[0];
        assert_eq!(model.type_params, ["T"]);
        assert_eq!(model.fields[0].ty, TypeRef::simple("T"));
        assert_eq!(model.fields[1].ty.to_string(), "List<T>");
        assert_eq!(model.fields[2].ty.to_string(), "Map<?, ?>");
    }

    #[test]
    fn test_annotation_arguments() {
        let parsed = parse(
            r#"
            @RestController
            @RequestMapping(value = {"/a", "/b"}, produces = MediaType.APPLICATION_JSON_VALUE)
            class C {
                @RequestMapping(path = "/x" + "/y", method = RequestMethod.PUT)
                void x(@RequestParam(name = "q", required = false, defaultValue = "10") int q,
                       @RequestHeader("X-Trace") String trace) {}
            }
            "#,
        );
        let route = &parsed.routes[0];
        assert_eq!(route.base_path, "/a");
        assert_eq!(route.verb, HttpVerb::Put);
        assert_eq!(route.path, "/x/y");
        assert!(route.return_type.is_void());

        let param = &route.params[0].annotations[0];
        assert_eq!(param.bool_of("required"), Some(false));
        assert_eq!(
            param.get("defaultValue").and_then(AnnotationValue::as_str),
            Some("10")
        );
        // The base path array produced one warning.
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_varargs_and_arrays() {
        let parsed = parse(
            "@RestController class C { @GetMapping int[] a(String... names, byte data[]) { return null; } }",
        );
        let route = &parsed.routes[0];
        assert_eq!(route.return_type.array_dims, 1);
        assert_eq!(route.params[0].ty.array_dims, 1);
        assert_eq!(route.params[1].ty.array_dims, 1);
    }

    #[test]
    fn test_unreadable_member_is_skipped() {
        let parsed = parse(
            r#"
            @RestController class C {
                int = 5;
                @GetMapping("/ok") String ok() { return ""; }
            }
            "#,
        );
        assert_eq!(parsed.routes.len(), 1);
        assert_eq!(parsed.routes[0].path, "/ok");
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].kind, WarningKind::DegradedExtraction);
    }

    #[test]
    fn test_unreadable_route_signature_degrades() {
        let parsed = parse(
            r#"
            @RestController class C {
                @GetMapping("/odd") public List<<String> odd(@RequestParam String q) { return null; }
            }
            "#,
        );
        assert_eq!(parsed.routes.len(), 1);
        let route = &parsed.routes[0];
        assert_eq!(route.method, "odd");
        assert!(route.return_type.is_opaque());
        assert_eq!(route.params[0].name, "q");
        assert!(!parsed.warnings.is_empty());
    }

    #[test]
    fn test_application_package() {
        let parsed = parse("package com.acme; @SpringBootApplication public class App {}");
        assert_eq!(parsed.application_package.as_deref(), Some("com.acme"));
    }

    #[test]
    fn test_interfaces_and_annotation_types_skipped() {
        let parsed = parse(
            "interface Repo { String find(); class Hidden {} } \
             @interface Marker { String value() default \"\"; }",
        );
        assert!(parsed.models.is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_generic_method_in_controller() {
        let parsed = parse(
            "@RestController class C { @GetMapping(\"/g\") public <T> Page<T> g(Pageable p) { return null; } }",
        );
        assert_eq!(parsed.routes.len(), 1);
        assert_eq!(parsed.routes[0].return_type.to_string(), "Page<T>");
    }

    #[test]
    fn test_view_controller_has_no_routes() {
        let parsed = parse(
            r#"
            @Controller
            class Pages {
                @GetMapping("/home") String home() { return "home"; }
            }
            @Controller
            @ResponseBody
            class Api {
                @GetMapping("/data") String data() { return ""; }
            }
            "#,
        );
        assert_eq!(parsed.routes.len(), 1);
        assert_eq!(parsed.routes[0].path, "/data");
        assert!(parsed.models.is_empty());
    }

    #[test]
    fn test_routes_only_from_controller_units() {
        let text = r#"@RestController class Fake { @GetMapping("/x") String x() { return ""; } }"#;
        let unit = SourceUnit {
            path: "Fake.java".into(),
            relative_path: "Fake.java".to_string(),
            role: SourceRole::Model,
            text: text.to_string(),
        };
        assert!(parse_source(&unit).routes.is_empty());

        let unknown = SourceUnit {
            role: SourceRole::Unknown,
            ..unit
        };
        let parsed = parse_source(&unknown);
        assert!(parsed.models.is_empty());
        assert!(parsed.routes.is_empty());
    }
}
