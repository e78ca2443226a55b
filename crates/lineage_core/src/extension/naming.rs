//! Component name validation.
//!
//! # Responsibility
//! - Report names that cannot be used as component ids.
//!
//! # Invariants
//! - Validation only produces diagnostics; it never blocks extension.
//! - `slot` and `component` are rejected case-insensitively.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

// HTML5 custom element name production (leading ASCII letter).
static COMPONENT_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z][\-\.0-9_a-zA-Z\x{00B7}\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{037D}\x{037F}-\x{1FFF}\x{200C}-\x{200D}\x{203F}-\x{2040}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}]*$",
    )
    .expect("valid component name regex")
});

const BUILT_IN_TAGS: &[&str] = &["slot", "component"];

const RESERVED_HTML_TAGS: &[&str] = &[
    "html", "body", "base", "head", "link", "meta", "style", "title", "address", "article",
    "aside", "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6", "hgroup", "nav", "section",
    "div", "dd", "dl", "dt", "figcaption", "figure", "picture", "hr", "img", "li", "main", "ol",
    "p", "pre", "ul", "a", "b", "abbr", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em",
    "i", "kbd", "mark", "q", "rp", "rt", "rtc", "ruby", "s", "samp", "small", "span", "strong",
    "sub", "sup", "time", "u", "var", "wbr", "area", "audio", "map", "track", "video", "embed",
    "object", "param", "source", "canvas", "script", "noscript", "del", "ins", "caption", "col",
    "colgroup", "table", "thead", "tbody", "td", "th", "tr", "button", "datalist", "fieldset",
    "form", "input", "label", "legend", "meter", "optgroup", "option", "output", "progress",
    "select", "textarea", "details", "dialog", "menu", "menuitem", "summary", "content",
    "element", "shadow", "template", "blockquote", "iframe", "tfoot", "svg", "math",
];

/// Problem found with one component name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameDiagnostic {
    InvalidFormat(String),
    Reserved(String),
}

impl NameDiagnostic {
    pub fn name(&self) -> &str {
        match self {
            Self::InvalidFormat(name) | Self::Reserved(name) => name,
        }
    }
}

impl Display for NameDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(name) => write!(
                f,
                "invalid component name `{name}`: must be a valid html5 custom element name"
            ),
            Self::Reserved(name) => write!(
                f,
                "invalid component name `{name}`: built-in or reserved element names cannot be used"
            ),
        }
    }
}

/// Name validation collaborator.
pub trait NameValidator: Send + Sync {
    fn validate(&self, name: &str) -> Option<NameDiagnostic>;
}

/// Validator using the custom-element pattern and reserved tag lists.
#[derive(Debug, Clone, Default)]
pub struct DefaultNameValidator {
    extra_reserved: BTreeSet<String>,
}

impl DefaultNameValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds names rejected on top of the built-in reserved tags.
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra_reserved: names.into_iter().map(Into::into).collect(),
        }
    }

    fn is_reserved(&self, name: &str) -> bool {
        let lowered = name.to_ascii_lowercase();
        BUILT_IN_TAGS.contains(&lowered.as_str())
            || RESERVED_HTML_TAGS.contains(&name)
            || self.extra_reserved.contains(name)
    }
}

impl NameValidator for DefaultNameValidator {
    fn validate(&self, name: &str) -> Option<NameDiagnostic> {
        if !COMPONENT_NAME_PATTERN.is_match(name) {
            return Some(NameDiagnostic::InvalidFormat(name.to_string()));
        }
        if self.is_reserved(name) {
            return Some(NameDiagnostic::Reserved(name.to_string()));
        }
        None
    }
}
