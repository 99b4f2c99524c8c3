//! Resolution of `type:name` identifiers that were not registered explicitly

use std::rc::Rc;

use indexmap::IndexMap;

use crate::naming::FullName;

use super::registry::{Instance, Registration};
use super::templates::TemplateStore;

/// Maps a name to a registration, or `None` when it knows nothing about it
///
/// Implementations must be pure: the same name yields the same registration
/// while their inputs are unchanged.
pub trait Resolver {
    fn resolve(&self, name: &FullName) -> Option<Registration>;
}

impl<F> Resolver for F
where
    F: Fn(&FullName) -> Option<Registration>,
{
    fn resolve(&self, name: &FullName) -> Option<Registration> {
        self(name)
    }
}

/// Application classes by identifier (`PostsController`, `HomeView`)
///
/// Populated at startup; the resolver derives identifiers from names
/// instead of synthesizing classes at runtime.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    classes: IndexMap<String, Registration>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, identifier: impl Into<String>, registration: Registration) -> Self {
        self.insert(identifier, registration);
        self
    }

    pub fn insert(&mut self, identifier: impl Into<String>, registration: Registration) {
        self.classes.insert(identifier.into(), registration);
    }

    pub fn get(&self, identifier: &str) -> Option<&Registration> {
        self.classes.get(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(|s| s.as_str())
    }
}

/// Default resolver: templates from the template store, everything else
/// from the namespace by class identifier
#[derive(Debug, Clone)]
pub struct NamespaceResolver {
    namespace: Namespace,
    templates: Rc<TemplateStore>,
}

impl NamespaceResolver {
    pub fn new(namespace: Namespace, templates: Rc<TemplateStore>) -> Self {
        Self {
            namespace,
            templates,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

impl Resolver for NamespaceResolver {
    fn resolve(&self, name: &FullName) -> Option<Registration> {
        if name.kind() == "template" {
            if let Some(template) = self.templates.get(&name.template_key()) {
                return Some(Registration::Artifact(Instance::Template(template)));
            }
        }

        self.namespace.get(&name.class_name()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Factory;
    use crate::controller::ControllerKind;

    fn name(s: &str) -> FullName {
        FullName::parse(s).unwrap()
    }

    fn resolver() -> NamespaceResolver {
        let templates = Rc::new(TemplateStore::new());
        templates.compile("home", "<p>BYE</p>").unwrap();
        templates.compile("blog/post", "<p>POST</p>").unwrap();
        templates.compile("user_list", "<ul></ul>").unwrap();
        templates.compile("post-list", "<ol></ol>").unwrap();

        let namespace = Namespace::new()
            .with_class(
                "PostsController",
                Registration::Factory(Factory::controller(ControllerKind::Array)),
            )
            .with_class(
                "BlogPostController",
                Registration::Factory(Factory::controller(ControllerKind::Object)),
            );

        NamespaceResolver::new(namespace, templates)
    }

    fn template_of(registration: Option<Registration>) -> Rc<crate::parser::Template> {
        match registration {
            Some(Registration::Artifact(Instance::Template(t))) => t,
            other => panic!("Expected template artifact, got {:?}", other),
        }
    }

    fn factory_of(registration: Option<Registration>) -> Factory {
        match registration {
            Some(Registration::Factory(f)) => f,
            other => panic!("Expected factory, got {:?}", other),
        }
    }

    #[test]
    fn test_resolves_template() {
        let resolver = resolver();
        assert!(resolver.resolve(&name("template:home")).is_some());
        assert!(resolver.resolve(&name("template:missing")).is_none());
    }

    #[test]
    fn test_template_names_are_decamelized() {
        let resolver = resolver();
        assert!(resolver.resolve(&name("template:userList")).is_some());
    }

    #[test]
    fn test_dashed_template_name() {
        let resolver = resolver();
        assert!(resolver.resolve(&name("template:post-list")).is_some());
        assert!(resolver.resolve(&name("template:post_list")).is_none());
    }

    #[test]
    fn test_dot_and_slash_templates_are_identical() {
        let resolver = resolver();
        let dotted = template_of(resolver.resolve(&name("template:blog.post")));
        let slashed = template_of(resolver.resolve(&name("template:blog/post")));
        assert!(Rc::ptr_eq(&dotted, &slashed));
    }

    #[test]
    fn test_classifies_other_types() {
        let resolver = resolver();
        let posts = factory_of(resolver.resolve(&name("controller:posts")));
        assert_eq!(posts.label(), "controller (array)");
        assert!(resolver.resolve(&name("controller:home")).is_none());
    }

    #[test]
    fn test_dot_and_slash_controllers_are_identical() {
        let resolver = resolver();
        let dotted = factory_of(resolver.resolve(&name("controller:blog.post")));
        let slashed = factory_of(resolver.resolve(&name("controller:blog/post")));
        assert!(dotted.same_as(&slashed));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = resolver();
        let first = factory_of(resolver.resolve(&name("controller:posts")));
        let second = factory_of(resolver.resolve(&name("controller:posts")));
        assert!(first.same_as(&second));
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |name: &FullName| {
            (name.name() == "answer").then(|| Registration::Artifact(Instance::Value(42.into())))
        };
        assert!(resolver.resolve(&name("value:answer")).is_some());
        assert!(resolver.resolve(&name("value:question")).is_none());
    }
}
