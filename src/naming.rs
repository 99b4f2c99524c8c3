//! Structured `type:name` identifiers and the naming conventions used to
//! map them onto registrations.
//!
//! Names may use dots (`blog.post`) or slashes (`blog/post`) between
//! segments. Both spellings normalize to the dotted form, so they always hit
//! the same registration and the same cached instance.

use std::fmt;
use std::str::FromStr;

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use thiserror::Error;

/// Errors produced while parsing a `type:name` string
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    /// No `:` between type and name
    #[error("'{input}' is not of the form type:name")]
    MissingSeparator { input: String },

    /// Type or name part is empty
    #[error("'{input}' has an empty {part}")]
    EmptyPart { input: String, part: &'static str },

    /// A segment between separators is empty (`blog..post`)
    #[error("'{input}' contains an empty segment")]
    EmptySegment { input: String },
}

/// A `(type, name)` pair such as `controller:blog.post`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullName {
    kind: String,
    name: String,
}

impl FullName {
    /// Build a name from its parts, normalizing slashes to dots
    pub fn new(kind: impl Into<String>, name: impl AsRef<str>) -> Result<Self, NameError> {
        let kind = kind.into();
        let raw = name.as_ref();
        let input = format!("{}:{}", kind, raw);

        if kind.is_empty() {
            return Err(NameError::EmptyPart { input, part: "type" });
        }
        if raw.is_empty() {
            return Err(NameError::EmptyPart { input, part: "name" });
        }

        let name = normalize(raw);
        if name.split('.').any(str::is_empty) {
            return Err(NameError::EmptySegment { input });
        }

        Ok(Self { kind, name })
    }

    /// Parse `type:name`
    pub fn parse(input: &str) -> Result<Self, NameError> {
        let (kind, name) = input
            .split_once(':')
            .ok_or_else(|| NameError::MissingSeparator {
                input: input.to_string(),
            })?;
        Self::new(kind, name)
    }

    /// The registration type, e.g. `controller`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The dotted name, e.g. `blog.post`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('.')
    }

    /// Key used to look up precompiled templates: slash separated, each
    /// segment decamelized (`blogPost` -> `blog_post`)
    pub fn template_key(&self) -> String {
        self.segments().map(decamelize).collect::<Vec<_>>().join("/")
    }

    /// Class identifier for namespace lookups (`blog.post` + `controller`
    /// -> `BlogPostController`)
    pub fn class_name(&self) -> String {
        format!("{}{}", classify(&self.name), classify(&self.kind))
    }

    /// Name given to views rendered under this name (`blog.post` -> `blogPost`)
    pub fn view_name(&self) -> String {
        camelize(&self.name)
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

impl FromStr for FullName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Replace slash separators with dots
pub fn normalize(name: &str) -> String {
    name.replace('/', ".")
}

/// `blog.post` -> `BlogPost`
pub fn classify(name: &str) -> String {
    name.to_upper_camel_case()
}

/// `blogPost` -> `blog_post`
///
/// Only a lowercase letter or digit followed by an uppercase letter gets an
/// underscore. Other separators (`post-list`) are kept as they are.
pub fn decamelize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    let mut prev: Option<char> = None;
    for c in segment.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
        prev = Some(c);
    }
    out
}

/// `blog.post` -> `blogPost`
pub fn camelize(name: &str) -> String {
    name.to_lower_camel_case()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_name() {
        let name = FullName::parse("template:home").unwrap();
        assert_eq!(name.kind(), "template");
        assert_eq!(name.name(), "home");
        assert_eq!(name.to_string(), "template:home");
    }

    #[test]
    fn test_dot_and_slash_normalize_to_same_name() {
        let dotted = FullName::parse("controller:blog.post").unwrap();
        let slashed = FullName::parse("controller:blog/post").unwrap();
        assert_eq!(dotted, slashed);
        assert_eq!(slashed.name(), "blog.post");
    }

    #[test]
    fn test_template_key_uses_slashes() {
        let name = FullName::parse("template:blog.post").unwrap();
        assert_eq!(name.template_key(), "blog/post");
    }

    #[test]
    fn test_template_key_decamelizes_segments() {
        let name = FullName::parse("template:blogPost").unwrap();
        assert_eq!(name.template_key(), "blog_post");

        let nested = FullName::parse("template:admin/userList").unwrap();
        assert_eq!(nested.template_key(), "admin/user_list");
    }

    #[test]
    fn test_template_key_keeps_dashes() {
        let name = FullName::parse("template:post-list").unwrap();
        assert_eq!(name.template_key(), "post-list");
    }

    #[test]
    fn test_decamelize_rules() {
        assert_eq!(decamelize("innerHTML"), "inner_html");
        assert_eq!(decamelize("post2Comments"), "post2_comments");
        assert_eq!(decamelize("HTMLParser"), "htmlparser");
        assert_eq!(decamelize("user_list"), "user_list");
    }

    #[test]
    fn test_class_name() {
        let posts = FullName::parse("controller:posts").unwrap();
        assert_eq!(posts.class_name(), "PostsController");

        let nested = FullName::parse("controller:blog/post").unwrap();
        assert_eq!(nested.class_name(), "BlogPostController");
    }

    #[test]
    fn test_view_name_is_camelized() {
        let name = FullName::parse("view:blog.post").unwrap();
        assert_eq!(name.view_name(), "blogPost");
        assert_eq!(camelize("home"), "home");
    }

    #[test]
    fn test_missing_separator() {
        let err = FullName::parse("home").unwrap_err();
        assert!(matches!(err, NameError::MissingSeparator { .. }));
    }

    #[test]
    fn test_empty_parts_rejected() {
        assert!(matches!(
            FullName::parse(":home"),
            Err(NameError::EmptyPart { part: "type", .. })
        ));
        assert!(matches!(
            FullName::parse("template:"),
            Err(NameError::EmptyPart { part: "name", .. })
        ));
        assert!(matches!(
            FullName::parse("template:blog..post"),
            Err(NameError::EmptySegment { .. })
        ));
    }
}
