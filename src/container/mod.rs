//! Dependency-injection container and name resolution
//!
//! Names are `type:name` strings (`controller:posts`, `template:blog/post`).
//! A lookup checks explicit registrations first and then asks the resolver,
//! which maps templates to the [`TemplateStore`] and every other type to a
//! class identifier in the [`Namespace`]:
//!
//! ```text
//! template:blogPost      -> templates["blog_post"]
//! template:blog.post     -> templates["blog/post"]
//! controller:blog/post   -> namespace["BlogPostController"]
//! ```

mod registry;
mod resolver;
mod templates;

pub use registry::{Container, ContainerError, Factory, Instance, Registration, TypeOptions};
pub use resolver::{Namespace, NamespaceResolver, Resolver};
pub use templates::TemplateStore;
