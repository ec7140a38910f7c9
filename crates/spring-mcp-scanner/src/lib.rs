//! Static analysis of Spring Boot sources.
//!
//! This crate finds Java source files in a project tree and extracts the
//! declaration-level facts the converter needs: controller routes with their
//! parameters and Javadoc, and model classes with their fields. Nothing is
//! compiled or executed; extraction is tolerant and never aborts on a bad
//! file.
//!
//! # Architecture
//!
//! - [`SourceLocator`]: restartable walk over the project tree
//! - [`parse_source`]: tokenizer plus declaration-level parser for one file
//! - [`parse_units`]: parses many files on the rayon pool, preserving order
//!
//! # Examples
//!
//! ```
//! use spring_mcp_scanner::{SourceRole, SourceUnit, parse_units};
//!
//! let units = vec![SourceUnit {
//!     path: "User.java".into(),
//!     relative_path: "User.java".to_string(),
//!     role: SourceRole::Model,
//!     text: "package p; public record User(String name, int age) {}".to_string(),
//! }];
//!
//! let parsed = parse_units(&units, true);
//! assert_eq!(parsed[0].models[0].name.as_str(), "p.User");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod javadoc;
mod lexer;
mod locator;
mod parser;
mod routes;
mod types;

pub use locator::{Locate, SourceLocator};
pub use parser::parse_source;
pub use routes::APPLICATION_ANNOTATION;
pub use types::{
    Annotation, AnnotationValue, FieldDecl, ImportScope, Javadoc, ModelDecl, ModelKind,
    ParsedUnit, RawParameter, RouteAnnotationFact, SourceRole, SourceUnit, TypeRef,
    find_annotation, has_annotation,
};

use rayon::prelude::*;

/// Parses every unit, in parallel when `parallel` is set.
///
/// The output has the same order as the input regardless of scheduling.
#[must_use]
pub fn parse_units(units: &[SourceUnit], parallel: bool) -> Vec<ParsedUnit> {
    if parallel {
        units.par_iter().map(parse_source).collect()
    } else {
        units.iter().map(parse_source).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, text: &str) -> SourceUnit {
        SourceUnit {
            path: name.into(),
            relative_path: name.to_string(),
            role: SourceRole::detect(text),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_parallel_parse_preserves_order() {
        let units: Vec<_> = (0..64)
            .map(|i| unit(&format!("M{i:02}.java"), &format!("class M{i:02} {{}}")))
            .collect();

        let sequential = parse_units(&units, false);
        let parallel = parse_units(&units, true);

        let names = |parsed: &[ParsedUnit]| -> Vec<String> {
            parsed
                .iter()
                .map(|p| p.models[0].name.as_str().to_string())
                .collect()
        };
        assert_eq!(names(&sequential), names(&parallel));
        assert_eq!(names(&parallel)[10], "M10");
    }
}
