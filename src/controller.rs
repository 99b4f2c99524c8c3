//! Controllers: the scope a template reads properties from and the target
//! actions are dispatched to.
//!
//! A controller created by `{{render}}` keeps a weak back-reference to the
//! controller of the template that rendered it. Actions the child does not
//! handle bubble up that chain until a handler is found or the root is
//! reached.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::parser::PropertyPath;

/// Errors raised while dispatching an action
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// No controller in the target chain handles the action
    #[error("nothing handled the action '{action}'")]
    Unhandled { action: String },

    /// The action id is not registered (or its view was torn down)
    #[error("no action registered with id {id}")]
    UnknownAction { id: u64 },

    /// The target chain is longer than the configured bound
    #[error("action '{action}' bubbled past {limit} controllers")]
    DepthExceeded { action: String, limit: usize },
}

/// Flavours of controller, mirroring how they expose their model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Plain controller, model reachable as `model`
    #[default]
    Controller,
    /// Proxies unknown properties to its model
    Object,
    /// Wraps a list model, exposes `length`
    Array,
}

/// An event delivered to an action handler
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    /// Action name, e.g. `parentPlease`
    pub action: String,
    /// Triggering DOM event type, e.g. `click`
    pub event_type: String,
}

impl ActionEvent {
    pub fn new(action: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            event_type: event_type.into(),
        }
    }
}

/// Action handler, called with the controller that handled the action
pub type ActionHandler = Rc<dyn Fn(&Controller, &ActionEvent)>;

pub struct Controller {
    kind: ControllerKind,
    name: RefCell<Option<String>>,
    model: RefCell<Option<Value>>,
    properties: RefCell<Map<String, Value>>,
    actions: RefCell<IndexMap<String, ActionHandler>>,
    target: RefCell<Weak<Controller>>,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("kind", &self.kind)
            .field("name", &self.name.borrow())
            .field("model", &self.model.borrow())
            .field("properties", &self.properties.borrow())
            .field("actions", &self.actions.borrow().keys().collect::<Vec<_>>())
            .field("has_target", &self.target().is_some())
            .finish()
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerKind::default())
    }
}

impl Controller {
    pub fn new(kind: ControllerKind) -> Self {
        Self {
            kind,
            name: RefCell::new(None),
            model: RefCell::new(None),
            properties: RefCell::new(Map::new()),
            actions: RefCell::new(IndexMap::new()),
            target: RefCell::new(Weak::new()),
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        *self.name.borrow_mut() = Some(name.into());
        self
    }

    pub fn with_model(self, model: Value) -> Self {
        *self.model.borrow_mut() = Some(model);
        self
    }

    pub fn with_property(self, key: impl Into<String>, value: Value) -> Self {
        self.properties.borrow_mut().insert(key.into(), value);
        self
    }

    pub fn with_properties(self, properties: Map<String, Value>) -> Self {
        self.properties.borrow_mut().extend(properties);
        self
    }

    pub fn with_action<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Controller, &ActionEvent) + 'static,
    {
        self.on(name, handler);
        self
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    pub fn name(&self) -> Option<String> {
        self.name.borrow().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.borrow_mut() = Some(name.into());
    }

    pub fn model(&self) -> Option<Value> {
        self.model.borrow().clone()
    }

    pub fn set_model(&self, model: Value) {
        *self.model.borrow_mut() = Some(model);
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.properties.borrow_mut().insert(key.into(), value);
    }

    /// Register (or replace) the handler for an action
    pub fn on<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Controller, &ActionEvent) + 'static,
    {
        self.actions.borrow_mut().insert(name.into(), Rc::new(handler));
    }

    pub fn handles(&self, action: &str) -> bool {
        self.actions.borrow().contains_key(action)
    }

    /// Read a dotted property path
    ///
    /// `model` (and `content` for array controllers) reads the model. Other
    /// first segments read controller properties; object controllers fall
    /// back to the model for properties they do not define.
    pub fn get(&self, path: &PropertyPath) -> Option<Value> {
        let segments: Vec<&str> = path.segments().collect();
        let (first, rest) = segments.split_first()?;

        match (*first, self.kind) {
            ("model", _) | ("content", ControllerKind::Array) => {
                let model = self.model.borrow();
                return descend(model.as_ref()?, rest);
            }
            ("length", ControllerKind::Array) if rest.is_empty() => {
                let model = self.model.borrow();
                return model
                    .as_ref()
                    .and_then(Value::as_array)
                    .map(|items| Value::from(items.len()));
            }
            _ => {}
        }

        if let Some(value) = self.properties.borrow().get(*first) {
            return descend(value, rest);
        }

        if self.kind == ControllerKind::Object {
            let model = self.model.borrow();
            return descend(model.as_ref()?, &segments);
        }

        None
    }

    /// The controller actions bubble to
    pub fn target(&self) -> Option<Rc<Controller>> {
        self.target.borrow().upgrade()
    }

    pub fn set_target(&self, target: &Rc<Controller>) {
        *self.target.borrow_mut() = Rc::downgrade(target);
    }

    pub fn clear_target(&self) {
        *self.target.borrow_mut() = Weak::new();
    }

    fn handler(&self, action: &str) -> Option<ActionHandler> {
        self.actions.borrow().get(action).cloned()
    }

    /// Dispatch an action, bubbling through the target chain
    ///
    /// Returns how many levels the action bubbled before it was handled
    /// (`0` when handled locally). At most `max_depth` targets are visited.
    pub fn send(&self, event: &ActionEvent, max_depth: usize) -> Result<usize, ActionError> {
        if let Some(handler) = self.handler(&event.action) {
            trace!(action = %event.action, "action handled locally");
            handler(self, event);
            return Ok(0);
        }

        let mut next = self.target();
        let mut depth = 0;
        while let Some(controller) = next {
            depth += 1;
            if depth > max_depth {
                return Err(ActionError::DepthExceeded {
                    action: event.action.clone(),
                    limit: max_depth,
                });
            }
            if let Some(handler) = controller.handler(&event.action) {
                debug!(action = %event.action, depth, "action bubbled to target");
                handler(&controller, event);
                return Ok(depth);
            }
            next = controller.target();
        }

        Err(ActionError::Unhandled {
            action: event.action.clone(),
        })
    }
}

fn descend(value: &Value, path: &[&str]) -> Option<Value> {
    let mut current = value;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn path(s: &str) -> PropertyPath {
        PropertyPath::new(s)
    }

    #[test]
    fn test_model_path_lookup() {
        let controller = Controller::default().with_model(json!({"title": "Rails is omakase"}));
        assert_eq!(
            controller.get(&path("model.title")),
            Some(json!("Rails is omakase"))
        );
        assert_eq!(controller.get(&path("model.missing")), None);
    }

    #[test]
    fn test_property_lookup() {
        let controller =
            Controller::default().with_property("post", json!({"title": "Hello", "tags": ["a", "b"]}));
        assert_eq!(controller.get(&path("post.title")), Some(json!("Hello")));
        assert_eq!(controller.get(&path("post.tags.1")), Some(json!("b")));
    }

    #[test]
    fn test_object_controller_proxies_model() {
        let object = Controller::new(ControllerKind::Object).with_model(json!({"title": "POST"}));
        assert_eq!(object.get(&path("title")), Some(json!("POST")));

        let plain = Controller::default().with_model(json!({"title": "POST"}));
        assert_eq!(plain.get(&path("title")), None);
    }

    #[test]
    fn test_array_controller_length_and_content() {
        let array = Controller::new(ControllerKind::Array).with_model(json!([1, 2, 3]));
        assert_eq!(array.get(&path("length")), Some(json!(3)));
        assert_eq!(array.get(&path("content.0")), Some(json!(1)));
    }

    #[test]
    fn test_send_handles_locally() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let controller =
            Controller::default().with_action("save", move |_, _| counter.set(counter.get() + 1));

        let depth = controller.send(&ActionEvent::new("save", "click"), 8).unwrap();
        assert_eq!(depth, 0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_send_bubbles_to_parent_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let parent = Rc::new(
            Controller::default()
                .with_action("parentPlease", move |_, _| counter.set(counter.get() + 1)),
        );
        let child = Controller::new(ControllerKind::Array);
        child.set_target(&parent);

        let depth = child
            .send(&ActionEvent::new("parentPlease", "click"), 8)
            .unwrap();
        assert_eq!(depth, 1);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_send_unhandled_at_root() {
        let parent = Rc::new(Controller::default());
        let child = Controller::default();
        child.set_target(&parent);

        let err = child.send(&ActionEvent::new("nope", "click"), 8).unwrap_err();
        assert_eq!(
            err,
            ActionError::Unhandled {
                action: "nope".into()
            }
        );
    }

    #[test]
    fn test_send_stops_at_depth_limit() {
        let a = Rc::new(Controller::default());
        let b = Rc::new(Controller::default());
        a.set_target(&b);
        b.set_target(&a);

        let err = a.send(&ActionEvent::new("loop", "click"), 4).unwrap_err();
        assert!(matches!(err, ActionError::DepthExceeded { limit: 4, .. }));
    }

    #[test]
    fn test_target_is_weak() {
        let child = Controller::default();
        {
            let parent = Rc::new(Controller::default());
            child.set_target(&parent);
            assert!(child.target().is_some());
        }
        assert!(child.target().is_none());
    }
}
