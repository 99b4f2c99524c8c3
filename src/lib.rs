//! viewkit - named view rendering over a dependency-injection container
//!
//! Templates use a small mustache language. `{{render name}}` resolves the
//! template, controller and view registered for `name`, renders them as a
//! child of the current view, and registers the child with the router as the
//! active view for that name. A name can only be active once at a time.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use viewkit::{Application, View};
//!
//! let app = Application::new().unwrap();
//! app.register_template("home", "<p>BYE</p>").unwrap();
//!
//! let view = Rc::new(View::new().with_template(app.compile("<h1>HI</h1>{{render home}}").unwrap()));
//! app.append(&view).unwrap();
//!
//! assert_eq!(view.text(), "HIBYE");
//! assert!(app.router().unwrap().lookup_active_view("home").is_some());
//! ```

pub mod app;
pub mod config;
pub mod container;
pub mod controller;
pub mod error;
pub mod manifest;
pub mod naming;
pub mod parser;
pub mod router;
pub mod view;

pub use app::{Application, ApplicationBuilder};
pub use config::{ConfigError, RenderConfig};
pub use container::{
    Container, ContainerError, Factory, Instance, Namespace, NamespaceResolver, Registration,
    Resolver, TemplateStore, TypeOptions,
};
pub use controller::{ActionError, ActionEvent, Controller, ControllerKind};
pub use error::ParseError;
pub use naming::{FullName, NameError};
pub use parser::{parse, Template};
pub use router::{Router, RouterError};
pub use view::{ActionId, ActionRegistry, View, ViewId, ViewState};

use thiserror::Error;

/// Errors that can occur during a render pass
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error compiling a template
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// A name could not be looked up
    #[error("lookup failed: {0}")]
    Container(#[from] ContainerError),

    /// A named view is already rendered
    #[error(transparent)]
    Router(#[from] RouterError),

    /// `{{action}}` used where no controller is in scope
    #[error("action '{action}' has no controller to target")]
    NoActionTarget { action: String },

    /// Attempt to render a view after it was torn down
    #[error("view {id} has been destroyed")]
    ViewDestroyed { id: ViewId },
}

impl From<Vec<ParseError>> for RenderError {
    fn from(errors: Vec<ParseError>) -> Self {
        RenderError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render `source` against a set of named templates and return its text
///
/// # Example
///
/// ```rust
/// let text = viewkit::render_text(
///     "<h1>HI</h1>{{render home}}",
///     &[("home", "<p>BYE</p>")],
/// ).unwrap();
///
/// assert_eq!(text, "HIBYE");
/// ```
pub fn render_text(source: &str, templates: &[(&str, &str)]) -> Result<String, RenderError> {
    let app = Application::new()?;
    for (key, template) in templates {
        app.register_template(key, template)?;
    }

    let view = std::rc::Rc::new(View::new().with_template(app.compile(source)?));
    app.append(&view)?;
    let text = view.text();
    app.destroy();
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_simple() {
        assert_eq!(render_text("<p>hello</p>", &[]).unwrap(), "hello");
    }

    #[test]
    fn test_render_text_named() {
        let text = render_text("<h1>HI</h1>{{render home}}", &[("home", "<p>BYE</p>")]).unwrap();
        assert_eq!(text, "HIBYE");
    }

    #[test]
    fn test_render_text_duplicate_is_error() {
        let result = render_text(
            "<h1>HI</h1>{{render home}}<hr/>{{render home}}",
            &[("home", "<p>BYE</p>")],
        );
        assert!(matches!(
            result,
            Err(RenderError::Router(RouterError::DuplicateActiveView { .. }))
        ));
    }

    #[test]
    fn test_render_text_missing_template() {
        let result = render_text("{{render nowhere}}", &[]);
        assert!(matches!(
            result,
            Err(RenderError::Container(ContainerError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_render_text_parse_error() {
        let result = render_text("{{render", &[]);
        assert!(matches!(result, Err(RenderError::Parse(_))));
    }
}
