//! The container: explicit registrations, per-type options, singleton cache,
//! and a fallback resolver

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::controller::{Controller, ControllerKind};
use crate::naming::{FullName, NameError};
use crate::parser::Template;
use crate::router::Router;
use crate::view::View;

use super::resolver::Resolver;

/// Errors that can occur during container operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContainerError {
    /// Neither a registration nor the resolver knows the name
    #[error("nothing registered or resolvable for '{name}'")]
    NotFound { name: String },

    /// A registration already exists for the name
    #[error("'{name}' is already registered")]
    Duplicate { name: String },

    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),

    /// The looked up instance is not of the requested kind
    #[error("'{name}' is not a {expected}")]
    WrongKind { name: String, expected: &'static str },

    /// The container was destroyed
    #[error("container has been destroyed")]
    Destroyed,
}

/// Something a lookup can produce
#[derive(Debug, Clone)]
pub enum Instance {
    Controller(Rc<Controller>),
    View(Rc<View>),
    Router(Rc<Router>),
    Template(Rc<Template>),
    Value(Value),
    /// The factory itself, for types registered with `instantiate: false`
    Factory(Factory),
}

impl Instance {
    /// Short description used in errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Instance::Controller(_) => "controller",
            Instance::View(_) => "view",
            Instance::Router(_) => "router",
            Instance::Template(_) => "template",
            Instance::Value(_) => "value",
            Instance::Factory(_) => "factory",
        }
    }
}

/// Builds fresh instances on lookup
#[derive(Clone)]
pub struct Factory {
    label: String,
    build: Rc<dyn Fn() -> Instance>,
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").field("label", &self.label).finish()
    }
}

impl Factory {
    pub fn new<F>(label: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> Instance + 'static,
    {
        Self {
            label: label.into(),
            build: Rc::new(build),
        }
    }

    pub fn controller(kind: ControllerKind) -> Self {
        let label = match kind {
            ControllerKind::Controller => "controller",
            ControllerKind::Object => "controller (object)",
            ControllerKind::Array => "controller (array)",
        };
        Self::new(label, move || Instance::Controller(Rc::new(Controller::new(kind))))
    }

    pub fn view() -> Self {
        Self::new("view", || Instance::View(Rc::new(View::new())))
    }

    pub fn router() -> Self {
        Self::new("router", || Instance::Router(Rc::new(Router::new())))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn build(&self) -> Instance {
        (self.build)()
    }

    /// Whether both handles wrap the same constructor
    pub fn same_as(&self, other: &Factory) -> bool {
        Rc::ptr_eq(&self.build, &other.build)
    }
}

/// What a name is registered to
#[derive(Debug, Clone)]
pub enum Registration {
    /// Constructed on lookup
    Factory(Factory),
    /// Pre-built, returned as is (compiled templates, plain values)
    Artifact(Instance),
}

/// Lookup behaviour for a type or a single name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeOptions {
    /// Cache the first instance and return it on every lookup
    pub singleton: bool,
    /// Build an instance from a factory; when false the factory is returned
    pub instantiate: bool,
}

impl Default for TypeOptions {
    fn default() -> Self {
        Self {
            singleton: true,
            instantiate: true,
        }
    }
}

impl TypeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    pub fn with_instantiate(mut self, instantiate: bool) -> Self {
        self.instantiate = instantiate;
        self
    }
}

/// Dependency-injection container
///
/// Explicit registrations take precedence over the resolver. Singletons are
/// cached under the normalized name, so `controller:blog.post` and
/// `controller:blog/post` yield the same instance.
#[derive(Default)]
pub struct Container {
    registry: RefCell<IndexMap<FullName, Registration>>,
    cache: RefCell<IndexMap<FullName, Instance>>,
    type_options: RefCell<HashMap<String, TypeOptions>>,
    name_options: RefCell<HashMap<FullName, TypeOptions>>,
    resolver: Option<Box<dyn Resolver>>,
    destroyed: Cell<bool>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registered_names())
            .field("cached", &self.cache.borrow().len())
            .field("has_resolver", &self.resolver.is_some())
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}

impl Container {
    /// Create an empty container without a resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container that falls back to `resolver`
    pub fn with_resolver(resolver: impl Resolver + 'static) -> Self {
        Self {
            resolver: Some(Box::new(resolver)),
            ..Self::default()
        }
    }

    /// Register a name
    pub fn register(&self, full_name: &str, registration: Registration) -> Result<(), ContainerError> {
        self.ensure_live()?;
        let name = FullName::parse(full_name)?;
        let mut registry = self.registry.borrow_mut();
        if registry.contains_key(&name) {
            return Err(ContainerError::Duplicate {
                name: name.to_string(),
            });
        }

        debug!(name = %name, "registered");
        registry.insert(name, registration);
        Ok(())
    }

    /// Register a name with options that override its type's defaults
    pub fn register_with_options(
        &self,
        full_name: &str,
        registration: Registration,
        options: TypeOptions,
    ) -> Result<(), ContainerError> {
        self.register(full_name, registration)?;
        let name = FullName::parse(full_name)?;
        self.name_options.borrow_mut().insert(name, options);
        Ok(())
    }

    /// Remove a registration and any cached instance
    pub fn unregister(&self, full_name: &str) -> Result<(), ContainerError> {
        let name = FullName::parse(full_name)?;
        self.registry.borrow_mut().shift_remove(&name);
        self.cache.borrow_mut().shift_remove(&name);
        self.name_options.borrow_mut().remove(&name);
        Ok(())
    }

    /// Set default options for every name of a type
    pub fn options_for_type(&self, kind: impl Into<String>, options: TypeOptions) {
        self.type_options.borrow_mut().insert(kind.into(), options);
    }

    fn options_for(&self, name: &FullName) -> TypeOptions {
        if let Some(options) = self.name_options.borrow().get(name) {
            return *options;
        }
        self.type_options
            .borrow()
            .get(name.kind())
            .copied()
            .unwrap_or_default()
    }

    /// Find the registration for a name without building anything
    pub fn resolve(&self, name: &FullName) -> Option<Registration> {
        if let Some(registration) = self.registry.borrow().get(name) {
            return Some(registration.clone());
        }
        self.resolver.as_ref().and_then(|r| r.resolve(name))
    }

    /// Whether a lookup of `full_name` would succeed
    pub fn has(&self, full_name: &str) -> bool {
        match FullName::parse(full_name) {
            Ok(name) => self.cache.borrow().contains_key(&name) || self.resolve(&name).is_some(),
            Err(_) => false,
        }
    }

    /// Look up a name, building and caching an instance as its options say
    pub fn lookup(&self, full_name: &str) -> Result<Instance, ContainerError> {
        self.ensure_live()?;
        let name = FullName::parse(full_name)?;

        if let Some(instance) = self.cache.borrow().get(&name) {
            trace!(name = %name, "lookup hit cache");
            return Ok(instance.clone());
        }

        let registration = self
            .resolve(&name)
            .ok_or_else(|| ContainerError::NotFound {
                name: name.to_string(),
            })?;

        let options = self.options_for(&name);
        let instance = match registration {
            Registration::Artifact(instance) => instance,
            Registration::Factory(factory) if !options.instantiate => Instance::Factory(factory),
            Registration::Factory(factory) => {
                trace!(name = %name, factory = factory.label(), "building instance");
                factory.build()
            }
        };

        if options.singleton {
            self.cache.borrow_mut().insert(name, instance.clone());
        }
        Ok(instance)
    }

    pub fn lookup_controller(&self, full_name: &str) -> Result<Rc<Controller>, ContainerError> {
        match self.lookup(full_name)? {
            Instance::Controller(controller) => Ok(controller),
            _ => Err(wrong_kind(full_name, "controller")),
        }
    }

    pub fn lookup_view(&self, full_name: &str) -> Result<Rc<View>, ContainerError> {
        match self.lookup(full_name)? {
            Instance::View(view) => Ok(view),
            _ => Err(wrong_kind(full_name, "view")),
        }
    }

    pub fn lookup_router(&self, full_name: &str) -> Result<Rc<Router>, ContainerError> {
        match self.lookup(full_name)? {
            Instance::Router(router) => Ok(router),
            _ => Err(wrong_kind(full_name, "router")),
        }
    }

    pub fn lookup_template(&self, full_name: &str) -> Result<Rc<Template>, ContainerError> {
        match self.lookup(full_name)? {
            Instance::Template(template) => Ok(template),
            _ => Err(wrong_kind(full_name, "template")),
        }
    }

    /// Explicitly registered names, in registration order
    pub fn registered_names(&self) -> Vec<String> {
        self.registry.borrow().keys().map(|n| n.to_string()).collect()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Tear down every cached instance and refuse further use
    ///
    /// Cached views are destroyed and cached routers cleared. Registrations
    /// are dropped.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }

        let cached = std::mem::take(&mut *self.cache.borrow_mut());
        for (name, instance) in cached {
            match instance {
                Instance::View(view) => view.destroy(),
                Instance::Router(router) => router.clear(),
                _ => {}
            }
            trace!(name = %name, "released cached instance");
        }

        self.registry.borrow_mut().clear();
        self.name_options.borrow_mut().clear();
        debug!("container destroyed");
    }

    fn ensure_live(&self) -> Result<(), ContainerError> {
        if self.destroyed.get() {
            return Err(ContainerError::Destroyed);
        }
        Ok(())
    }
}

fn wrong_kind(full_name: &str, expected: &'static str) -> ContainerError {
    ContainerError::WrongKind {
        name: full_name.to_string(),
        expected,
    }
}
