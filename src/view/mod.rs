//! Views: a template, the controller it reads from, and the child views its
//! render pass created.
//!
//! Rendered output is kept as a list of segments rather than a flat string.
//! Child views and outlets are composed when markup is requested, so a child
//! that re-renders (for example after `connect_outlet`) shows up in every
//! ancestor without re-rendering them.

pub mod actions;
pub mod dom;
mod render;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tracing::trace;

use crate::controller::Controller;
use crate::parser::Template;
use crate::router::Router;

pub use actions::{ActionEntry, ActionId, ActionRegistry};
pub use render::RenderEnv;
pub(crate) use render::render_view;

pub type ViewId = u64;

/// Ids are unique per process, not per application: they end up in element
/// ids, and views can be built before any application exists.
static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Created, never rendered
    PreRender,
    /// Rendered and reachable from a document root
    InDocument,
    /// Torn down; cannot be rendered again
    Destroyed,
}

/// A piece of rendered output
#[derive(Debug, Clone)]
pub(crate) enum Segment {
    Markup(String),
    Child(Rc<View>),
    Outlet(String),
}

pub struct View {
    id: ViewId,
    view_name: RefCell<Option<String>>,
    template: RefCell<Option<Rc<Template>>>,
    controller: RefCell<Option<Rc<Controller>>>,
    parent: RefCell<Weak<View>>,
    children: RefCell<Vec<Rc<View>>>,
    outlets: RefCell<IndexMap<String, Rc<View>>>,
    buffer: RefCell<Vec<Segment>>,
    actions: RefCell<Vec<ActionId>>,
    action_registry: RefCell<Weak<ActionRegistry>>,
    /// Router entry held by this view, released on teardown
    router: RefCell<Option<(Weak<Router>, String)>>,
    state: Cell<ViewState>,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("view_name", &self.view_name.borrow())
            .field("state", &self.state.get())
            .field(
                "children",
                &self.children.borrow().iter().map(|c| c.id).collect::<Vec<_>>(),
            )
            .field("outlets", &self.outlets.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        Self {
            id: NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed),
            view_name: RefCell::new(None),
            template: RefCell::new(None),
            controller: RefCell::new(None),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            outlets: RefCell::new(IndexMap::new()),
            buffer: RefCell::new(Vec::new()),
            actions: RefCell::new(Vec::new()),
            action_registry: RefCell::new(Weak::new()),
            router: RefCell::new(None),
            state: Cell::new(ViewState::PreRender),
        }
    }

    pub fn with_template(self, template: Rc<Template>) -> Self {
        self.set_template(template);
        self
    }

    pub fn with_controller(self, controller: Rc<Controller>) -> Self {
        self.set_controller(controller);
        self
    }

    pub fn with_view_name(self, name: impl Into<String>) -> Self {
        self.set_view_name(name);
        self
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn state(&self) -> ViewState {
        self.state.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.get() == ViewState::Destroyed
    }

    pub fn view_name(&self) -> Option<String> {
        self.view_name.borrow().clone()
    }

    pub fn set_view_name(&self, name: impl Into<String>) {
        *self.view_name.borrow_mut() = Some(name.into());
    }

    pub fn template(&self) -> Option<Rc<Template>> {
        self.template.borrow().clone()
    }

    pub fn set_template(&self, template: Rc<Template>) {
        *self.template.borrow_mut() = Some(template);
    }

    /// The controller templates of this view read from: its own, or the
    /// nearest ancestor's
    pub fn controller(&self) -> Option<Rc<Controller>> {
        if let Some(controller) = self.controller.borrow().clone() {
            return Some(controller);
        }
        self.parent().and_then(|parent| parent.controller())
    }

    pub fn own_controller(&self) -> Option<Rc<Controller>> {
        self.controller.borrow().clone()
    }

    pub fn set_controller(&self, controller: Rc<Controller>) {
        *self.controller.borrow_mut() = Some(controller);
    }

    pub fn parent(&self) -> Option<Rc<View>> {
        self.parent.borrow().upgrade()
    }

    pub fn children(&self) -> Vec<Rc<View>> {
        self.children.borrow().clone()
    }

    /// View currently connected to the named outlet
    pub fn outlet(&self, name: &str) -> Option<Rc<View>> {
        self.outlets.borrow().get(name).cloned()
    }

    /// Render name this view is registered under with the router, if any
    pub fn active_name(&self) -> Option<String> {
        self.router.borrow().as_ref().map(|(_, name)| name.clone())
    }

    /// Rendered markup, including child views and connected outlets
    pub fn markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    /// Text content of the rendered markup
    pub fn text(&self) -> String {
        dom::text_content(&self.markup())
    }

    fn write_markup(&self, out: &mut String) {
        for segment in self.buffer.borrow().iter() {
            match segment {
                Segment::Markup(markup) => out.push_str(markup),
                Segment::Child(child) => child.write_markup(out),
                Segment::Outlet(name) => {
                    if let Some(view) = self.outlets.borrow().get(name) {
                        view.write_markup(out);
                    }
                }
            }
        }
    }

    /// Tear the view down
    ///
    /// Destroys child views and outlets, drops bound actions and releases the
    /// router entry this view holds. Destroying twice is a no-op.
    pub fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        self.state.set(ViewState::Destroyed);
        self.teardown_rendered();

        let outlets = std::mem::take(&mut *self.outlets.borrow_mut());
        for (_, view) in outlets {
            view.destroy();
        }

        let registration = self.router.borrow_mut().take();
        if let Some((router, name)) = registration {
            if let Some(router) = router.upgrade() {
                router.release(&name, self);
            }
        }
        trace!(view = self.id, "destroyed view");
    }

    /// Destroy everything the last render pass created
    pub(crate) fn teardown_rendered(&self) {
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.destroy();
        }

        let actions = std::mem::take(&mut *self.actions.borrow_mut());
        if let Some(registry) = self.action_registry.borrow().upgrade() {
            for id in actions {
                registry.remove(id);
            }
        }

        self.buffer.borrow_mut().clear();
    }

    pub(crate) fn attach_router(&self, router: Weak<Router>, name: String) {
        *self.router.borrow_mut() = Some((router, name));
    }

    pub(crate) fn set_parent(&self, parent: &Rc<View>) {
        *self.parent.borrow_mut() = Rc::downgrade(parent);
    }

    pub(crate) fn adopt_child(self: &Rc<Self>, child: &Rc<View>) {
        child.set_parent(self);
        self.children.borrow_mut().push(child.clone());
    }

    /// Connect `view` to the named outlet, returning the previous occupant
    pub(crate) fn set_outlet(self: &Rc<Self>, name: &str, view: &Rc<View>) -> Option<Rc<View>> {
        view.set_parent(self);
        self.outlets
            .borrow_mut()
            .insert(name.to_string(), view.clone())
    }

    pub(crate) fn take_outlet(&self, name: &str) -> Option<Rc<View>> {
        self.outlets.borrow_mut().shift_remove(name)
    }

    pub(crate) fn record_action(&self, id: ActionId, registry: &Rc<ActionRegistry>) {
        *self.action_registry.borrow_mut() = Rc::downgrade(registry);
        self.actions.borrow_mut().push(id);
    }

    pub(crate) fn replace_buffer(&self, buffer: Vec<Segment>) {
        *self.buffer.borrow_mut() = buffer;
    }

    pub(crate) fn set_state(&self, state: ViewState) {
        self.state.set(state);
    }
}
