//! Spring Web mapping annotations.
//!
//! Turns the annotations on a controller class and its methods into one
//! verb/path pair per route method.

use crate::types::{Annotation, AnnotationValue, find_annotation, has_annotation};
use spring_mcp_core::{HttpVerb, Warning, WarningKind};

const REST_CONTROLLER: &str = "RestController";
const CONTROLLER: &str = "Controller";
const RESPONSE_BODY: &str = "ResponseBody";

/// Annotation marking the application entry point.
pub const APPLICATION_ANNOTATION: &str = "SpringBootApplication";

const REQUEST_MAPPING: &str = "RequestMapping";

/// Verb-specific shorthand annotations.
const SHORTHANDS: [(&str, HttpVerb); 5] = [
    ("GetMapping", HttpVerb::Get),
    ("PostMapping", HttpVerb::Post),
    ("PutMapping", HttpVerb::Put),
    ("DeleteMapping", HttpVerb::Delete),
    ("PatchMapping", HttpVerb::Patch),
];

/// Verb and sub-path of one route method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteMapping {
    pub verb: HttpVerb,
    pub path: String,
}

/// `@RestController`, or `@Controller` together with `@ResponseBody`.
pub(crate) fn is_controller(annotations: &[Annotation]) -> bool {
    has_annotation(annotations, REST_CONTROLLER)
        || (has_annotation(annotations, CONTROLLER) && has_annotation(annotations, RESPONSE_BODY))
}

/// A `@Controller` whose handlers render views instead of response bodies.
pub(crate) fn is_view_controller(annotations: &[Annotation]) -> bool {
    has_annotation(annotations, CONTROLLER) && !is_controller(annotations)
}

/// Path of a class-level `@RequestMapping`, or empty.
pub(crate) fn base_path(
    annotations: &[Annotation],
    location: &str,
    warnings: &mut Vec<Warning>,
) -> String {
    find_annotation(annotations, REQUEST_MAPPING)
        .map(|mapping| mapping_path(mapping, location, warnings))
        .unwrap_or_default()
}

/// Resolves the mapping annotations on a method.
///
/// A verb shorthand wins over `@RequestMapping` when both are present. Returns
/// `None` for methods without any mapping annotation.
pub(crate) fn route_mapping(
    annotations: &[Annotation],
    location: &str,
    warnings: &mut Vec<Warning>,
) -> Option<RouteMapping> {
    let mut shorthands = annotations.iter().filter_map(|a| {
        SHORTHANDS
            .iter()
            .find(|(name, _)| *name == a.name)
            .map(|(_, verb)| (a, *verb))
    });

    if let Some((annotation, verb)) = shorthands.next() {
        if let Some((extra, _)) = shorthands.next() {
            warnings.push(Warning::new(
                WarningKind::DegradedExtraction,
                Some(location.to_string()),
                format!(
                    "multiple mapping shorthands; using @{} and ignoring @{}",
                    annotation.name, extra.name
                ),
            ));
        }
        if find_annotation(annotations, REQUEST_MAPPING).is_some() {
            tracing::debug!(
                "{location}: @{} takes precedence over @RequestMapping",
                annotation.name
            );
        }
        return Some(RouteMapping {
            verb,
            path: mapping_path(annotation, location, warnings),
        });
    }

    let mapping = find_annotation(annotations, REQUEST_MAPPING)?;
    Some(RouteMapping {
        verb: request_method(mapping, location, warnings),
        path: mapping_path(mapping, location, warnings),
    })
}

fn mapping_path(annotation: &Annotation, location: &str, warnings: &mut Vec<Warning>) -> String {
    let Some(value) = annotation.first_of(&["value", "path"]) else {
        return String::new();
    };

    let items = value.items();
    if items.len() > 1 {
        warnings.push(Warning::new(
            WarningKind::DegradedExtraction,
            Some(location.to_string()),
            format!(
                "@{} declares {} paths; only the first is used",
                annotation.name,
                items.len()
            ),
        ));
    }

    match items.first() {
        Some(AnnotationValue::Str(path)) => path.clone(),
        None => String::new(),
        Some(other) => {
            warnings.push(Warning::new(
                WarningKind::DegradedExtraction,
                Some(location.to_string()),
                format!(
                    "@{} path is not a string literal ({other:?}); using an empty path",
                    annotation.name
                ),
            ));
            String::new()
        }
    }
}

fn request_method(annotation: &Annotation, location: &str, warnings: &mut Vec<Warning>) -> HttpVerb {
    let Some(value) = annotation.get("method") else {
        warnings.push(Warning::new(
            WarningKind::DegradedExtraction,
            Some(location.to_string()),
            "@RequestMapping without method; assuming GET",
        ));
        return HttpVerb::Get;
    };

    let items = value.items();
    if items.len() > 1 {
        warnings.push(Warning::new(
            WarningKind::DegradedExtraction,
            Some(location.to_string()),
            format!(
                "@RequestMapping declares {} methods; only the first is used",
                items.len()
            ),
        ));
    }

    let parsed = items.first().and_then(|item| match item {
        AnnotationValue::Path(path) => path.rsplit('.').next()?.parse::<HttpVerb>().ok(),
        _ => None,
    });

    parsed.unwrap_or_else(|| {
        warnings.push(Warning::new(
            WarningKind::DegradedExtraction,
            Some(location.to_string()),
            "unrecognized @RequestMapping method; assuming GET",
        ));
        HttpVerb::Get
    })
}
