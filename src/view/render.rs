//! Render passes: evaluate a view's template into segments

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::config::RenderConfig;
use crate::container::{Container, ContainerError, Instance, Registration};
use crate::controller::{Controller, ControllerKind};
use crate::naming::{normalize, FullName};
use crate::parser::{ActionCall, Argument, Mustache, Node, RenderCall};
use crate::router::RouterError;
use crate::RenderError;

use super::actions::ActionRegistry;
use super::dom::escape_html;
use super::{Segment, View, ViewState};

/// Collaborators a render pass reads from
#[derive(Clone, Copy)]
pub struct RenderEnv<'a> {
    pub container: &'a Container,
    pub actions: &'a Rc<ActionRegistry>,
    pub config: &'a RenderConfig,
}

/// Render `view`, replacing whatever its previous pass produced
///
/// Children created by the previous pass are destroyed first. If the pass
/// fails, everything it created is torn down before the error is returned.
pub(crate) fn render_view(env: &RenderEnv<'_>, view: &Rc<View>) -> Result<(), RenderError> {
    if view.is_destroyed() {
        return Err(RenderError::ViewDestroyed { id: view.id() });
    }

    view.teardown_rendered();
    trace!(view = view.id(), "rendering view");

    let mut buffer = vec![Segment::Markup(open_tag(env.config, view))];
    if let Some(template) = view.template() {
        for node in &template.nodes {
            if let Err(err) = render_node(env, view, &node.node, &mut buffer) {
                view.teardown_rendered();
                return Err(err);
            }
        }
    }
    buffer.push(Segment::Markup(format!("</{}>", env.config.view_tag)));

    view.replace_buffer(buffer);
    view.set_state(ViewState::InDocument);
    Ok(())
}

fn open_tag(config: &RenderConfig, view: &View) -> String {
    let mut tag = format!(
        "<{} id=\"{}{}\"",
        config.view_tag,
        config.element_id_prefix,
        view.id()
    );
    if let Some(class) = &config.view_class {
        tag.push_str(&format!(" class=\"{}\"", class));
    }
    tag.push('>');
    tag
}

fn render_node(
    env: &RenderEnv<'_>,
    view: &Rc<View>,
    node: &Node,
    buffer: &mut Vec<Segment>,
) -> Result<(), RenderError> {
    match node {
        Node::Text(markup) => buffer.push(Segment::Markup(markup.clone())),
        Node::Mustache(Mustache::Property(path)) => {
            let value = view.controller().and_then(|c| c.get(path));
            buffer.push(Segment::Markup(display_value(value, env.config.escape_html)));
        }
        Node::Mustache(Mustache::Outlet(name)) => {
            let name = name
                .as_ref()
                .map(|n| n.node.clone())
                .unwrap_or_else(|| env.config.default_outlet.clone());
            if let Some(occupant) = view.outlet(&name) {
                render_view(env, &occupant)?;
            }
            buffer.push(Segment::Outlet(name));
        }
        Node::Mustache(Mustache::Action(call)) => {
            let markup = bind_action(env, view, call)?;
            buffer.push(Segment::Markup(markup));
        }
        Node::Mustache(Mustache::Render(call)) => {
            let child = render_named(env, view, call)?;
            buffer.push(Segment::Child(child));
        }
    }
    Ok(())
}

fn display_value(value: Option<Value>, escape: bool) -> String {
    let text = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    };
    if escape {
        escape_html(&text)
    } else {
        text
    }
}

fn evaluate(argument: &Argument, scope: Option<&Rc<Controller>>) -> Value {
    match argument {
        Argument::Path(path) => scope.and_then(|c| c.get(path)).unwrap_or(Value::Null),
        Argument::Literal(s) => Value::String(s.clone()),
        Argument::Number(n) => Value::from(*n),
    }
}

/// Bind `{{action}}` to the scope controller, returning the attribute markup
fn bind_action(
    env: &RenderEnv<'_>,
    view: &Rc<View>,
    call: &ActionCall,
) -> Result<String, RenderError> {
    let action = call.name.node.clone();
    let target = view
        .controller()
        .ok_or_else(|| RenderError::NoActionTarget {
            action: action.clone(),
        })?;
    let event_type = call
        .hash_value("on")
        .and_then(Argument::as_name)
        .unwrap_or(env.config.default_event.as_str())
        .to_string();

    let id = env.actions.register(action, event_type, &target, view.id());
    view.record_action(id, env.actions);
    Ok(format!("{}=\"{}\"", env.config.action_attribute, id))
}

/// `{{render name [context] [controller="other"]}}`
fn render_named(
    env: &RenderEnv<'_>,
    parent: &Rc<View>,
    call: &RenderCall,
) -> Result<Rc<View>, RenderError> {
    let name = normalize(&call.name.node);
    let full_name = FullName::new("view", &name).map_err(ContainerError::from)?;

    let router = optional(env.container.lookup_router("router:main"))?;
    if let Some(router) = &router {
        if router.lookup_active_view(&name).is_some() {
            return Err(RouterError::DuplicateActiveView { name }.into());
        }
    }

    let view = match optional(env.container.lookup_view(&format!("view:{}", name)))? {
        Some(view) => view,
        None => env.container.lookup_view("view:default")?,
    };

    let scope = parent.controller();
    let context = call.context.as_ref().map(|c| evaluate(&c.node, scope.as_ref()));

    let controller = match call.controller_override() {
        Some(other) => env.container.lookup_controller(&format!("controller:{}", other))?,
        None => match optional(env.container.lookup_controller(&format!("controller:{}", name)))? {
            Some(controller) => controller,
            None => generate_controller(env.container, &name, context.is_some())?,
        },
    };

    if let Some(model) = context {
        controller.set_model(model);
    }
    match &scope {
        Some(scope) => controller.set_target(scope),
        None => controller.clear_target(),
    }

    let template = env
        .container
        .lookup_template(&format!("template:{}", name))?;

    view.set_view_name(full_name.view_name());
    view.set_template(template);
    view.set_controller(controller);

    if let Some(router) = &router {
        router.register(&name, &view)?;
    }
    parent.adopt_child(&view);

    debug!(name = %name, view = view.id(), parent = parent.id(), "rendering named view");
    render_view(env, &view)?;
    Ok(view)
}

/// Create the controller `{{render}}` uses when none is registered
///
/// A supplied context gets an object controller so templates can read model
/// properties directly.
fn generate_controller(
    container: &Container,
    name: &str,
    has_context: bool,
) -> Result<Rc<Controller>, ContainerError> {
    let kind = if has_context {
        ControllerKind::Object
    } else {
        ControllerKind::Controller
    };
    let controller = Rc::new(Controller::new(kind).with_name(name));
    container.register(
        &format!("controller:{}", name),
        Registration::Artifact(Instance::Controller(controller.clone())),
    )?;
    debug!(name, ?kind, "generated controller");
    Ok(controller)
}

/// Turn `NotFound` into `None`, keeping every other error
fn optional<T>(result: Result<T, ContainerError>) -> Result<Option<T>, ContainerError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ContainerError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(None, true), "");
        assert_eq!(display_value(Some(Value::Null), true), "");
        assert_eq!(display_value(Some(json!("a<b")), true), "a&lt;b");
        assert_eq!(display_value(Some(json!("a<b")), false), "a<b");
        assert_eq!(display_value(Some(json!(3)), true), "3");
    }

    #[test]
    fn test_open_tag() {
        let view = View::new();
        let tag = open_tag(&RenderConfig::default(), &view);
        assert_eq!(tag, format!("<div id=\"view-{}\" class=\"view\">", view.id()));

        let bare = open_tag(&RenderConfig::default().without_view_class(), &view);
        assert_eq!(bare, format!("<div id=\"view-{}\">", view.id()));
    }

    #[test]
    fn test_optional() {
        let missing: Result<(), _> = Err(ContainerError::NotFound { name: "x:y".into() });
        assert_eq!(optional(missing), Ok(None));
        assert_eq!(optional(Ok(1)), Ok(Some(1)));
        assert_eq!(
            optional::<()>(Err(ContainerError::Destroyed)),
            Err(ContainerError::Destroyed)
        );
    }
}
