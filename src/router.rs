//! Router-owned registry of active views
//!
//! Each render name maps to at most one live view. Entries are weak: the
//! router never keeps a view alive, and an entry is removed when its view is
//! torn down.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::naming::normalize;
use crate::view::View;

/// Errors raised by the active-view registry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    /// A view is already rendered under this name
    #[error("view '{name}' is already rendered")]
    DuplicateActiveView { name: String },
}

#[derive(Debug, Default)]
pub struct Router {
    active_views: RefCell<IndexMap<String, Weak<View>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `view` as the active view for `name`
    ///
    /// Fails if a live view is already registered under the name. The view
    /// remembers the registration and removes it when destroyed.
    pub fn register(self: &Rc<Self>, name: &str, view: &Rc<View>) -> Result<(), RouterError> {
        let key = normalize(name);
        if self.lookup_active_view(&key).is_some() {
            return Err(RouterError::DuplicateActiveView { name: key });
        }

        debug!(name = %key, view = view.id(), "registering active view");
        self.active_views
            .borrow_mut()
            .insert(key.clone(), Rc::downgrade(view));
        view.attach_router(Rc::downgrade(self), key);
        Ok(())
    }

    /// The live view registered under `name`, if any
    pub fn lookup_active_view(&self, name: &str) -> Option<Rc<View>> {
        self.active_views
            .borrow()
            .get(normalize(name).as_str())
            .and_then(Weak::upgrade)
    }

    /// Remove the entry for `name`; absent names are ignored
    pub fn unregister(&self, name: &str) {
        let key = normalize(name);
        if self.active_views.borrow_mut().shift_remove(&key).is_some() {
            debug!(name = %key, "unregistered active view");
        }
    }

    /// Remove the entry for `name` only if it still points at `view`
    pub(crate) fn release(&self, name: &str, view: &View) {
        let mut views = self.active_views.borrow_mut();
        if views
            .get(name)
            .is_some_and(|entry| std::ptr::eq(entry.as_ptr(), view))
        {
            views.shift_remove(name);
            debug!(name, view = view.id(), "released active view");
        }
    }

    /// Names with a live active view, in registration order
    pub fn active_view_names(&self) -> Vec<String> {
        self.active_views
            .borrow()
            .iter()
            .filter(|(_, view)| view.strong_count() > 0)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.active_views.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let router = Rc::new(Router::new());
        let view = Rc::new(View::new());

        router.register("home", &view).unwrap();
        let found = router.lookup_active_view("home").expect("home is active");
        assert!(Rc::ptr_eq(&found, &view));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let router = Rc::new(Router::new());
        let first = Rc::new(View::new());
        let second = Rc::new(View::new());

        router.register("home", &first).unwrap();
        let err = router.register("home", &second).unwrap_err();
        assert_eq!(
            err,
            RouterError::DuplicateActiveView {
                name: "home".into()
            }
        );
        insta::assert_snapshot!(err.to_string(), @"view 'home' is already rendered");
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let router = Rc::new(Router::new());
        let view = Rc::new(View::new());

        router.register("home", &view).unwrap();
        router.unregister("home");
        router.unregister("home");
        assert!(router.lookup_active_view("home").is_none());

        let again = Rc::new(View::new());
        router.register("home", &again).unwrap();
    }

    #[test]
    fn test_slash_and_dot_share_an_entry() {
        let router = Rc::new(Router::new());
        let view = Rc::new(View::new());

        router.register("blog/post", &view).unwrap();
        assert!(router.lookup_active_view("blog.post").is_some());
        assert!(router.register("blog.post", &Rc::new(View::new())).is_err());
    }

    #[test]
    fn test_dropped_view_counts_as_absent() {
        let router = Rc::new(Router::new());
        {
            let view = Rc::new(View::new());
            router.register("home", &view).unwrap();
        }
        assert!(router.lookup_active_view("home").is_none());
        assert!(router.active_view_names().is_empty());

        let view = Rc::new(View::new());
        router.register("home", &view).unwrap();
        assert_eq!(router.active_view_names(), vec!["home".to_string()]);
    }

    #[test]
    fn test_destroying_view_unregisters() {
        let router = Rc::new(Router::new());
        let view = Rc::new(View::new());

        router.register("home", &view).unwrap();
        view.destroy();
        assert!(router.lookup_active_view("home").is_none());
    }
}
