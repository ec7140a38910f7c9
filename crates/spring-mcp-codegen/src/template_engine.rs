//! Handlebars templates for the generated runtime scaffold.
//!
//! # Examples
//!
//! ```
//! use spring_mcp_codegen::TemplateEngine;
//! use serde_json::json;
//!
//! let engine = TemplateEngine::new().unwrap();
//! let package = engine
//!     .render(
//!         "runtime/package",
//!         &json!({"package_name": "petstore-mcp", "name_json": "\"Petstore\""}),
//!     )
//!     .unwrap();
//! assert!(package.contains("petstore-mcp"));
//! ```

use handlebars::{Handlebars, no_escape};
use serde::Serialize;
use spring_mcp_core::{Error, Result};

/// Built-in templates: registry name and source.
const TEMPLATES: [(&str, &str); 2] = [
    ("runtime/server", include_str!("../templates/runtime/server.ts.hbs")),
    ("runtime/package", include_str!("../templates/runtime/package.json.hbs")),
];

/// Template engine with the runtime templates pre-registered.
///
/// Strict mode is on, so a missing context field is an error rather than an
/// empty string. HTML escaping is off; values that land inside TypeScript or
/// JSON literals are passed in already JSON-encoded.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl TemplateEngine<'_> {
    /// Creates an engine with every built-in template registered.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateError` if a built-in template does not parse.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(no_escape);

        let mut engine = Self { handlebars };
        for (name, source) in TEMPLATES {
            engine.register_template_string(name, source)?;
        }
        Ok(engine)
    }

    /// Renders a registered template.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateError` if the template is unknown, the context
    /// lacks a field the template uses, or rendering fails.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::TemplateError {
                template: template_name.to_string(),
                message: e.to_string(),
            })
    }

    /// Registers an additional template.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateError` if the template does not parse.
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::TemplateError {
                template: name.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server_context() -> serde_json::Value {
        json!({
            "name_json": "\"Pet \\\"Store\\\"\"",
            "upstream_url_json": "\"http://localhost:8080\"",
            "port": 8000,
            "tool_count": 3
        })
    }

    #[test]
    fn test_builtin_templates_register() {
        assert!(TemplateEngine::new().is_ok());
    }

    #[test]
    fn test_render_server() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine.render("runtime/server", &server_context()).unwrap();
        assert!(rendered.contains("const SERVER_NAME = \"Pet \\\"Store\\\"\";"));
        assert!(rendered.contains("process.env.SPRING_BOOT_URL ?? \"http://localhost:8080\""));
        assert!(rendered.contains("/.well-known/mcp-schema.json"));
        assert!(rendered.contains("authorization"));
        assert!(rendered.contains("8000"));
    }

    #[test]
    fn test_no_html_escaping() {
        let mut engine = TemplateEngine::new().unwrap();
        engine.register_template_string("raw", "{{value}}").unwrap();
        let rendered = engine.render("raw", &json!({"value": "<a & \"b\">"})).unwrap();
        assert_eq!(rendered, "<a & \"b\">");
    }

    #[test]
    fn test_strict_mode_rejects_missing_fields() {
        let engine = TemplateEngine::new().unwrap();
        let err = engine.render("runtime/server", &json!({})).unwrap_err();
        assert!(err.is_template_error());
    }

    #[test]
    fn test_unknown_template() {
        let engine = TemplateEngine::new().unwrap();
        let err = engine.render("runtime/missing", &json!({})).unwrap_err();
        assert!(matches!(err, Error::TemplateError { template, .. } if template == "runtime/missing"));
    }

    #[test]
    fn test_invalid_template_syntax() {
        let mut engine = TemplateEngine::new().unwrap();
        assert!(engine.register_template_string("broken", "Hello {{name").is_err());
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateEngine<'_>>();
    }
}
