//! Path template normalization and tool naming.

use spring_mcp_core::HttpVerb;

/// Joins a class-level base path and a method path into one template.
///
/// Regex constraints are dropped from placeholders, separators are collapsed,
/// the result starts with `/` and has no trailing `/` (except the root).
///
/// # Examples
///
/// ```
/// use spring_mcp_codegen::join_paths;
///
/// assert_eq!(join_paths("/api/users/", "/{id:\\d+}"), "/api/users/{id}");
/// assert_eq!(join_paths("api", ""), "/api");
/// assert_eq!(join_paths("", ""), "/");
/// ```
#[must_use]
pub fn join_paths(base: &str, sub: &str) -> String {
    let raw = normalize_placeholders(&format!("{}/{}", base.trim(), sub.trim()));
    let mut joined = String::with_capacity(raw.len() + 1);
    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        joined.push('/');
        joined.push_str(segment);
    }
    if joined.is_empty() {
        joined.push('/');
    }
    joined
}

/// Rewrites `{name:regex}` placeholders to `{name}`.
///
/// Braces inside the constraint (`{code:[a-z]{3}}`) are balanced.
#[must_use]
pub fn normalize_placeholders(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            match c {
                '}' => {
                    closed = true;
                    break;
                }
                ':' => {
                    let mut depth = 0usize;
                    for c in chars.by_ref() {
                        match c {
                            '{' => depth += 1,
                            '}' if depth == 0 => break,
                            '}' => depth -= 1,
                            _ => {}
                        }
                    }
                    closed = true;
                    break;
                }
                _ => name.push(c),
            }
        }
        out.push('{');
        out.push_str(name.trim());
        if closed {
            out.push('}');
        }
    }
    out
}

/// Placeholder names of a normalized template, in order, without repeats.
///
/// # Examples
///
/// ```
/// use spring_mcp_codegen::placeholders;
///
/// assert_eq!(placeholders("/orgs/{org}/repos/{repo}"), vec!["org", "repo"]);
/// ```
#[must_use]
pub fn placeholders(path: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &rest[start + len + 1..];
    }
    names
}

/// Derives a tool name from the verb and the path with placeholders removed.
///
/// # Examples
///
/// ```
/// use spring_mcp_codegen::tool_name;
/// use spring_mcp_core::HttpVerb;
///
/// assert_eq!(tool_name(HttpVerb::Get, "/api/users/{id}"), "get_api_users");
/// assert_eq!(tool_name(HttpVerb::Post, "/v1/order-items"), "post_v1_order_items");
/// assert_eq!(tool_name(HttpVerb::Get, "/"), "get_root");
/// ```
#[must_use]
pub fn tool_name(verb: HttpVerb, path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .map(|segment| sanitize(&strip_placeholders(segment)))
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        format!("{}_root", verb.as_lower())
    } else {
        format!("{}_{}", verb.as_lower(), segments.join("_"))
    }
}

fn strip_placeholders(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut depth = 0usize;
    for c in segment.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Lower-cases, maps non-alphanumerics to `_`, and collapses runs.
fn sanitize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/api/users", "/{id}"), "/api/users/{id}");
        assert_eq!(join_paths("/api//users/", "//list/"), "/api/users/list");
        assert_eq!(join_paths("", "/ping"), "/ping");
        assert_eq!(join_paths("/", "/"), "/");
        assert_eq!(join_paths(" /x ", ""), "/x");
    }

    #[test]
    fn test_placeholder_constraints() {
        assert_eq!(normalize_placeholders("/a/{id:\\d+}"), "/a/{id}");
        assert_eq!(normalize_placeholders("/c/{code:[a-z]{3}}/x"), "/c/{code}/x");
        assert_eq!(normalize_placeholders("/f/{ name }"), "/f/{name}");
        assert_eq!(join_paths("/files", "{path:.+/.+}"), "/files/{path}");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders("/a/{x}/b/{y}/{x}"), vec!["x", "y"]);
        assert!(placeholders("/plain").is_empty());
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(tool_name(HttpVerb::Get, "/ping"), "get_ping");
        assert_eq!(tool_name(HttpVerb::Delete, "/users/{id}/roles/{role}"), "delete_users_roles");
        assert_eq!(tool_name(HttpVerb::Get, "/files/{name}.json"), "get_files_json");
        assert_eq!(tool_name(HttpVerb::Patch, "/API/v2/Items"), "patch_api_v2_items");
        assert_eq!(tool_name(HttpVerb::Get, "/{id}"), "get_root");
    }
}
