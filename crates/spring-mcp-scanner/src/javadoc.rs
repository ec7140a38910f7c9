//! Javadoc block parsing.
//!
//! Recognized block tags: `@param`, `@return`/`@returns`. Other block tags are
//! dropped. Inline tags are reduced to their text and HTML markup is removed.

use crate::types::Javadoc;
use regex::Regex;
use std::sync::LazyLock;

static INLINE_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{@(linkplain|link|code|literal|value)\b\s*([^}]*)\}").expect("valid regex")
});
static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid regex"));
static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Parses the body of a `/** ... */` block (delimiters already removed).
pub(crate) fn parse(body: &str) -> Javadoc {
    let mut doc = Javadoc::default();
    let mut description = Vec::new();
    // (tag, text) of the block tag being accumulated
    let mut current: Option<(String, String)> = None;

    for raw in body.lines() {
        let line = strip_margin(raw);
        if let Some(rest) = line.strip_prefix('@') {
            if let Some(done) = current.take() {
                finish_tag(&mut doc, done);
            }
            let (tag, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            current = Some((tag.to_string(), text.to_string()));
        } else if let Some((_, text)) = current.as_mut() {
            text.push(' ');
            text.push_str(line);
        } else {
            description.push(line);
        }
    }
    if let Some(done) = current.take() {
        finish_tag(&mut doc, done);
    }

    doc.description = clean(&description.join(" "));
    doc
}

fn finish_tag(doc: &mut Javadoc, (tag, text): (String, String)) {
    match tag.as_str() {
        "param" => {
            let text = text.trim();
            let (name, desc) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
            // `@param <T>` documents a type parameter.
            if !name.is_empty() && !name.starts_with('<') {
                doc.params.insert(name.to_string(), clean(desc));
            }
        }
        "return" | "returns" => {
            let text = clean(&text);
            if !text.is_empty() {
                doc.returns = Some(text);
            }
        }
        _ => {}
    }
}

fn strip_margin(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed.strip_prefix('*').map_or(trimmed, str::trim)
}

/// Reduces inline tags, strips HTML, and collapses whitespace.
pub(crate) fn clean(text: &str) -> String {
    let reduced = INLINE_TAG_REGEX.replace_all(text, |caps: &regex::Captures<'_>| {
        let content = caps[2].trim();
        match &caps[1] {
            // `{@link Type#member label}` reads as its label
            "link" | "linkplain" => content
                .split_once(char::is_whitespace)
                .map_or(content, |(_, label)| label.trim())
                .to_string(),
            _ => content.to_string(),
        }
    });
    let stripped = HTML_TAG_REGEX.replace_all(&reduced, " ");
    WHITESPACE_REGEX
        .replace_all(stripped.trim(), " ")
        .trim()
        .to_string()
}
