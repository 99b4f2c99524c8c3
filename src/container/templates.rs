//! Store of precompiled templates, keyed the way the resolver looks them up

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::parser::{self, Template};
use crate::ParseError;

/// Compiled templates by key (`home`, `blog/post`)
///
/// Shared between the application, which fills it, and the resolver, which
/// reads it, so templates added or replaced after startup are visible to
/// lookups that do not cache them.
#[derive(Debug, Default)]
pub struct TemplateStore {
    templates: RefCell<IndexMap<String, Rc<Template>>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an already compiled template, replacing any previous one
    pub fn insert(&self, key: impl Into<String>, template: Rc<Template>) {
        self.templates.borrow_mut().insert(key.into(), template);
    }

    /// Compile `source` and store it under `key`
    pub fn compile(
        &self,
        key: impl Into<String>,
        source: &str,
    ) -> Result<Rc<Template>, Vec<ParseError>> {
        let template = parser::compile(source)?;
        self.insert(key, template.clone());
        Ok(template)
    }

    pub fn get(&self, key: &str) -> Option<Rc<Template>> {
        self.templates.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.borrow().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Rc<Template>> {
        self.templates.borrow_mut().shift_remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.templates.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.templates.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.templates.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_and_get() {
        let store = TemplateStore::new();
        let compiled = store.compile("home", "<p>BYE</p>").expect("Should compile");
        let found = store.get("home").expect("home is stored");
        assert!(Rc::ptr_eq(&compiled, &found));
        assert_eq!(store.keys(), vec!["home".to_string()]);
    }

    #[test]
    fn test_compile_error_stores_nothing() {
        let store = TemplateStore::new();
        assert!(store.compile("broken", "{{render").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_replaces() {
        let store = TemplateStore::new();
        store.compile("home", "<p>1</p>").unwrap();
        store.compile("home", "<p>2</p>").unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.remove("home").is_some());
        assert!(!store.contains("home"));
    }
}
