//! Application: owns the container, template store, action registry and
//! configuration for one session
//!
//! Nothing here is global. Build an application, render views through it,
//! and call [`Application::destroy`] when done.

use std::rc::Rc;

use tracing::debug;

use crate::config::RenderConfig;
use crate::container::{
    Container, ContainerError, Factory, Namespace, NamespaceResolver, Registration, TemplateStore,
    TypeOptions,
};
use crate::controller::{ActionError, ControllerKind};
use crate::parser::Template;
use crate::router::Router;
use crate::view::{dom, render_view, ActionId, ActionRegistry, RenderEnv, View, ViewState};
use crate::RenderError;

/// Builder for [`Application`]
#[derive(Debug, Default)]
pub struct ApplicationBuilder {
    namespace: Namespace,
    config: RenderConfig,
}

impl ApplicationBuilder {
    /// Classes the resolver falls back to for non-template names
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the application with the standard registrations
    ///
    /// Views are not singletons, templates are neither cached nor
    /// instantiated, and `view:default` and `router:main` are registered.
    pub fn build(self) -> Result<Application, ContainerError> {
        let templates = Rc::new(TemplateStore::new());
        let container =
            Container::with_resolver(NamespaceResolver::new(self.namespace, templates.clone()));

        container.options_for_type("view", TypeOptions::new().with_singleton(false));
        container.options_for_type(
            "template",
            TypeOptions::new()
                .with_singleton(false)
                .with_instantiate(false),
        );
        container.register("view:default", Registration::Factory(Factory::view()))?;
        container.register("router:main", Registration::Factory(Factory::router()))?;

        Ok(Application {
            container,
            templates,
            actions: Rc::new(ActionRegistry::new()),
            config: self.config,
        })
    }
}

#[derive(Debug)]
pub struct Application {
    container: Container,
    templates: Rc<TemplateStore>,
    actions: Rc<ActionRegistry>,
    config: RenderConfig,
}

impl Application {
    /// Application with default configuration and an empty namespace
    pub fn new() -> Result<Self, ContainerError> {
        Self::builder().build()
    }

    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn templates(&self) -> &Rc<TemplateStore> {
        &self.templates
    }

    pub fn actions(&self) -> &Rc<ActionRegistry> {
        &self.actions
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn env(&self) -> RenderEnv<'_> {
        RenderEnv {
            container: &self.container,
            actions: &self.actions,
            config: &self.config,
        }
    }

    /// Compile a template without storing it
    pub fn compile(&self, source: &str) -> Result<Rc<Template>, RenderError> {
        Ok(crate::parser::compile(source)?)
    }

    /// Compile a template and store it under `key` for `template:` lookups
    pub fn register_template(&self, key: &str, source: &str) -> Result<Rc<Template>, RenderError> {
        Ok(self.templates.compile(key, source)?)
    }

    /// Register a controller factory as `controller:<name>`
    pub fn register_controller(&self, name: &str, kind: ControllerKind) -> Result<(), ContainerError> {
        self.container.register(
            &format!("controller:{}", name),
            Registration::Factory(Factory::controller(kind)),
        )
    }

    pub fn router(&self) -> Result<Rc<Router>, ContainerError> {
        self.container.lookup_router("router:main")
    }

    /// Render a root view
    pub fn append(&self, view: &Rc<View>) -> Result<(), RenderError> {
        debug!(view = view.id(), "appending root view");
        render_view(&self.env(), view)
    }

    /// Re-render a view in place
    pub fn rerender(&self, view: &Rc<View>) -> Result<(), RenderError> {
        render_view(&self.env(), view)
    }

    /// Connect `view` to an outlet of `parent`
    ///
    /// The previous occupant is destroyed before the new view renders, so
    /// names it registered with the router are free again. The new view is
    /// rendered immediately when `parent` is already in the document.
    pub fn connect_outlet(
        &self,
        parent: &Rc<View>,
        outlet: Option<&str>,
        view: Rc<View>,
    ) -> Result<(), RenderError> {
        let outlet = outlet.unwrap_or(self.config.default_outlet.as_str());
        if let Some(previous) = parent.set_outlet(outlet, &view) {
            if !Rc::ptr_eq(&previous, &view) {
                previous.destroy();
            }
        }

        debug!(parent = parent.id(), outlet, view = view.id(), "connected outlet");
        if parent.state() == ViewState::InDocument {
            render_view(&self.env(), &view)?;
        }
        Ok(())
    }

    /// Remove and destroy whatever occupies an outlet of `parent`
    pub fn disconnect_outlet(&self, parent: &Rc<View>, outlet: Option<&str>) {
        let outlet = outlet.unwrap_or(self.config.default_outlet.as_str());
        if let Some(previous) = parent.take_outlet(outlet) {
            previous.destroy();
        }
    }

    /// Id of the action bound to the element with `element_id` in `view`
    pub fn action_id_for(&self, view: &View, element_id: &str) -> Option<ActionId> {
        dom::element_attribute(&view.markup(), element_id, &self.config.action_attribute)?
            .parse()
            .ok()
    }

    /// Fire a bound action, returning how far it bubbled
    pub fn trigger_action(&self, id: ActionId) -> Result<usize, ActionError> {
        self.actions.trigger(id, self.config.max_bubble_depth)
    }

    /// Tear down the container and every bound action
    pub fn destroy(&self) {
        self.container.destroy();
        self.actions.clear();
        self.templates.clear();
    }
}
