//! Abstract Syntax Tree types for view templates

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A compiled template: literal markup interleaved with mustaches
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub nodes: Vec<Spanned<Node>>,
}

impl Template {
    /// Names passed to every `{{render}}` in this template, in source order
    pub fn render_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match &n.node {
            Node::Mustache(Mustache::Render(call)) => Some(call.name.node.as_str()),
            _ => None,
        })
    }
}

/// Top-level template node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Raw markup copied to the output untouched
    Text(String),
    /// `{{ ... }}`
    Mustache(Mustache),
}

/// Expression inside `{{ ... }}`
#[derive(Debug, Clone, PartialEq)]
pub enum Mustache {
    /// `{{render name [context] [controller="other"]}}`
    Render(RenderCall),
    /// `{{outlet}}` or `{{outlet "name"}}`
    Outlet(Option<Spanned<String>>),
    /// `{{action "name"}}`
    Action(ActionCall),
    /// `{{model.title}}`
    Property(PropertyPath),
}

/// Arguments of a `{{render}}` mustache
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub name: Spanned<String>,
    pub context: Option<Spanned<Argument>>,
    pub hash: Vec<HashPair>,
}

impl RenderCall {
    /// The `controller="..."` override, if present
    pub fn controller_override(&self) -> Option<&str> {
        self.hash_value("controller").and_then(Argument::as_name)
    }

    pub fn hash_value(&self, key: &str) -> Option<&Argument> {
        lookup_hash(&self.hash, key)
    }
}

/// Arguments of an `{{action}}` mustache
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCall {
    pub name: Spanned<String>,
    pub hash: Vec<HashPair>,
}

impl ActionCall {
    pub fn hash_value(&self, key: &str) -> Option<&Argument> {
        lookup_hash(&self.hash, key)
    }
}

fn lookup_hash<'a>(hash: &'a [HashPair], key: &str) -> Option<&'a Argument> {
    hash.iter()
        .find(|pair| pair.key.node == key)
        .map(|pair| &pair.value.node)
}

/// `key=value` argument
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Spanned<String>,
    pub value: Spanned<Argument>,
}

/// A positional or hash argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Property lookup against the current scope
    Path(PropertyPath),
    /// Quoted string
    Literal(String),
    Number(f64),
}

impl Argument {
    /// Read the argument as a bare name: string literals and unquoted paths
    /// both qualify
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Argument::Literal(s) => Some(s),
            Argument::Path(p) => Some(p.as_str()),
            Argument::Number(_) => None,
        }
    }
}

/// Dotted property path, e.g. `model.title`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath(pub String);

impl PropertyPath {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
