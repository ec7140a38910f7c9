//! Strong domain types for Spring to MCP conversion.
//!
//! Newtypes keep tool identities, model keys, and HTTP verbs from being mixed
//! up with arbitrary strings as they flow between the scanner and the emitter.
//!
//! # Examples
//!
//! ```
//! use spring_mcp_core::{HttpVerb, QualifiedName, ToolName};
//!
//! let tool = ToolName::new("get_api_users");
//! let model = QualifiedName::new("com.example.dto.User");
//! assert_eq!(model.simple_name(), "User");
//! assert_eq!("post".parse::<HttpVerb>().unwrap(), HttpVerb::Post);
//! # let _ = tool;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tool name identifier (newtype over String).
///
/// Represents the name of a generated MCP tool. Unique across one scan once
/// the endpoint assembler has disambiguated collisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolName(String);

impl ToolName {
    /// Creates a new tool name.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_mcp_core::ToolName;
    ///
    /// let name = ToolName::new("get_ping");
    /// assert_eq!(name.as_str(), "get_ping");
    /// ```
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the tool name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ToolName` and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ToolName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ToolName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Fully-qualified model key (newtype over String).
///
/// For plain models this is the dotted Java name (`com.example.User`). Generic
/// instantiations carry their resolved arguments
/// (`com.example.Page<com.example.User>`) so each instantiation is its own
/// registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Creates a new qualified name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the qualified name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last dotted segment, ignoring generic arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_mcp_core::QualifiedName;
    ///
    /// assert_eq!(QualifiedName::new("a.b.Outer.Inner").simple_name(), "Inner");
    /// assert_eq!(QualifiedName::new("a.Page<a.User>").simple_name(), "Page");
    /// assert_eq!(QualifiedName::new("Plain").simple_name(), "Plain");
    /// ```
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let base = self.0.split('<').next().unwrap_or(&self.0);
        base.rsplit('.').next().unwrap_or(base)
    }

    /// Returns the package part of the name (empty for the default package).
    ///
    /// Nested type names keep their enclosing type in the package part.
    #[must_use]
    pub fn package(&self) -> &str {
        let base = self.0.split('<').next().unwrap_or(&self.0);
        base.rsplit_once('.').map_or("", |(pkg, _)| pkg)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// HTTP verb of an upstream route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl HttpVerb {
    /// Returns the upper-case wire form of the verb.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Returns the lower-case form used in tool names.
    #[must_use]
    pub const fn as_lower(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
        }
    }

    /// Returns `true` for verbs that conventionally carry a request body.
    #[must_use]
    pub const fn accepts_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(crate::Error::InvalidArgument(format!(
                "unknown HTTP verb: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_creation() {
        let name = ToolName::new("get_api_users");
        assert_eq!(name.as_str(), "get_api_users");
        assert_eq!(format!("{name}"), "get_api_users");
        assert_eq!(name.into_inner(), "get_api_users");
    }

    #[test]
    fn test_tool_name_serializes_as_string() {
        let json = serde_json::to_string(&ToolName::new("get_ping")).unwrap();
        assert_eq!(json, "\"get_ping\"");
    }

    #[test]
    fn test_qualified_name_parts() {
        let name = QualifiedName::new("com.example.dto.User");
        assert_eq!(name.simple_name(), "User");
        assert_eq!(name.package(), "com.example.dto");

        let generic = QualifiedName::new("com.example.Page<com.example.User>");
        assert_eq!(generic.simple_name(), "Page");
        assert_eq!(generic.package(), "com.example");

        let bare = QualifiedName::new("User");
        assert_eq!(bare.package(), "");
    }

    #[test]
    fn test_http_verb_parsing() {
        assert_eq!("GET".parse::<HttpVerb>().unwrap(), HttpVerb::Get);
        assert_eq!("patch".parse::<HttpVerb>().unwrap(), HttpVerb::Patch);
        assert!("TRACEROUTE".parse::<HttpVerb>().is_err());
    }

    #[test]
    fn test_http_verb_forms() {
        assert_eq!(HttpVerb::Delete.as_str(), "DELETE");
        assert_eq!(HttpVerb::Delete.as_lower(), "delete");
        assert!(HttpVerb::Post.accepts_body());
        assert!(!HttpVerb::Get.accepts_body());
        assert_eq!(serde_json::to_string(&HttpVerb::Put).unwrap(), "\"PUT\"");
    }

    #[test]
    fn test_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ToolName>();
        assert_send_sync::<QualifiedName>();
        assert_send_sync::<HttpVerb>();
    }
}
