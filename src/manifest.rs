//! TOML application manifest
//!
//! ```toml
//! [templates]
//! home = "<p>BYE</p>"
//! "blog/post" = "<p>{{title}}</p>"
//!
//! [[controllers]]
//! name = "posts"
//! kind = "array"
//!
//! [root]
//! template = "<h1>HI</h1>{{render home}}"
//!
//! [render]
//! view_class = "page"
//! ```

use std::path::Path;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::app::Application;
use crate::config::RenderConfig;
use crate::container::{ContainerError, Factory, Instance, Registration};
use crate::controller::{Controller, ControllerKind};
use crate::view::View;
use crate::RenderError;

/// Errors that can occur when loading or rendering a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse manifest TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControllerEntry {
    pub name: String,
    #[serde(default)]
    pub kind: ControllerKind,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootEntry {
    pub template: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Template sources keyed by template name (`home`, `blog/post`)
    #[serde(default)]
    pub templates: IndexMap<String, String>,
    #[serde(default)]
    pub controllers: Vec<ControllerEntry>,
    pub root: RootEntry,
    #[serde(default)]
    pub render: RenderConfig,
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    /// Build an application with every template and controller registered
    pub fn build(&self) -> Result<Application, ManifestError> {
        let app = Application::builder()
            .with_config(self.render.clone())
            .build()?;

        for (key, source) in &self.templates {
            app.register_template(key, source)?;
        }

        for entry in &self.controllers {
            let kind = entry.kind;
            let model = entry.model.clone();
            let properties = entry.properties.clone();
            let name = entry.name.clone();
            let label = format!("manifest controller '{}'", entry.name);
            app.container().register(
                &format!("controller:{}", entry.name),
                Registration::Factory(Factory::new(label, move || {
                    let mut controller = Controller::new(kind)
                        .with_name(name.clone())
                        .with_properties(properties.clone());
                    if let Some(model) = &model {
                        controller = controller.with_model(model.clone());
                    }
                    Instance::Controller(Rc::new(controller))
                })),
            )?;
        }

        debug!(
            templates = self.templates.len(),
            controllers = self.controllers.len(),
            "built application from manifest"
        );
        Ok(app)
    }

    /// Build the application and render the root view into it
    pub fn render(&self) -> Result<(Application, Rc<View>), ManifestError> {
        let app = self.build()?;
        let controller = Controller::new(ControllerKind::Controller)
            .with_name("root")
            .with_properties(self.root.properties.clone());
        let view = Rc::new(
            View::new()
                .with_template(app.compile(&self.root.template)?)
                .with_controller(Rc::new(controller)),
        );
        app.append(&view)?;
        Ok((app, view))
    }
}
