//! Registry of actions bound by `{{action}}` during rendering

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::trace;

use crate::controller::{ActionError, ActionEvent, Controller};

use super::ViewId;

pub type ActionId = u64;

/// An action bound to an element in rendered markup
#[derive(Debug, Clone)]
pub struct ActionEntry {
    pub name: String,
    /// DOM event that triggers the action
    pub event_type: String,
    /// View whose render pass created the entry
    pub view: ViewId,
    target: Weak<Controller>,
}

impl ActionEntry {
    /// Controller the action is dispatched to
    pub fn target(&self) -> Option<Rc<Controller>> {
        self.target.upgrade()
    }
}

#[derive(Debug, Default)]
pub struct ActionRegistry {
    next_id: Cell<ActionId>,
    entries: RefCell<IndexMap<ActionId, ActionEntry>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: impl Into<String>,
        event_type: impl Into<String>,
        target: &Rc<Controller>,
        view: ViewId,
    ) -> ActionId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let entry = ActionEntry {
            name: name.into(),
            event_type: event_type.into(),
            view,
            target: Rc::downgrade(target),
        };
        trace!(id, action = %entry.name, view, "registered action");
        self.entries.borrow_mut().insert(id, entry);
        id
    }

    pub fn get(&self, id: ActionId) -> Option<ActionEntry> {
        self.entries.borrow().get(&id).cloned()
    }

    pub fn remove(&self, id: ActionId) {
        self.entries.borrow_mut().shift_remove(&id);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn ids_for_view(&self, view: ViewId) -> Vec<ActionId> {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, entry)| entry.view == view)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Fire the action bound under `id` against its target controller
    ///
    /// Returns the bubbling depth at which it was handled.
    pub fn trigger(&self, id: ActionId, max_depth: usize) -> Result<usize, ActionError> {
        let entry = self.get(id).ok_or(ActionError::UnknownAction { id })?;
        let target = entry.target().ok_or_else(|| ActionError::Unhandled {
            action: entry.name.clone(),
        })?;
        target.send(&ActionEvent::new(entry.name, entry.event_type), max_depth)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_register_and_trigger() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let controller = Rc::new(
            Controller::default().with_action("save", move |_, event| {
                assert_eq!(event.event_type, "click");
                counter.set(counter.get() + 1);
            }),
        );

        let registry = ActionRegistry::new();
        let id = registry.register("save", "click", &controller, 1);
        assert_eq!(registry.trigger(id, 8), Ok(0));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_ids_are_unique_and_removable() {
        let controller = Rc::new(Controller::default());
        let registry = ActionRegistry::new();
        let a = registry.register("a", "click", &controller, 1);
        let b = registry.register("b", "click", &controller, 2);
        assert_ne!(a, b);
        assert_eq!(registry.ids_for_view(2), vec![b]);

        registry.remove(a);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.trigger(a, 8), Err(ActionError::UnknownAction { id: a }));
    }

    #[test]
    fn test_dropped_target_is_unhandled() {
        let registry = ActionRegistry::new();
        let id = {
            let controller = Rc::new(Controller::default());
            registry.register("gone", "click", &controller, 1)
        };
        assert_eq!(
            registry.trigger(id, 8),
            Err(ActionError::Unhandled {
                action: "gone".into()
            })
        );
    }
}
