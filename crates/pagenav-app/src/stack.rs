//! Primary and modal navigation stacks
//!
//! `NavigationStack` is pure bookkeeping: it moves [`PageInstance`] values in
//! and out of the two stacks and enforces root protection. Construction,
//! destruction and display side effects belong to the session.

use serde::Serialize;

use crate::page::{InstanceId, InstanceSummary, PageInstance};
use pagenav_core::prelude::*;
use pagenav_core::{url_matches, StackKind};

/// The two ordered stacks of one navigation session
#[derive(Debug, Default)]
pub struct NavigationStack {
    /// Url the session was initialized with
    root_url: Option<String>,

    /// Index 0 is the root, last is current
    primary: Vec<PageInstance>,

    /// Layered above the primary stack when non-empty
    modal: Vec<PageInstance>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        !self.primary.is_empty()
    }

    pub fn root_url(&self) -> Option<&str> {
        self.root_url.as_deref()
    }

    /// True when `url` names the session root
    pub fn is_root_url(&self, url: &str) -> bool {
        self.root_url
            .as_deref()
            .map(|root| url_matches(root, url))
            .unwrap_or(false)
    }

    pub fn root(&self) -> Option<&PageInstance> {
        self.primary.first()
    }

    pub fn stack(&self, kind: StackKind) -> &[PageInstance] {
        match kind {
            StackKind::Primary => &self.primary,
            StackKind::Modal => &self.modal,
        }
    }

    fn stack_mut(&mut self, kind: StackKind) -> &mut Vec<PageInstance> {
        match kind {
            StackKind::Primary => &mut self.primary,
            StackKind::Modal => &mut self.modal,
        }
    }

    pub fn len(&self, kind: StackKind) -> usize {
        self.stack(kind).len()
    }

    /// Top of the given stack
    pub fn current(&self, kind: StackKind) -> Option<&PageInstance> {
        self.stack(kind).last()
    }

    pub fn is_modal_active(&self) -> bool {
        !self.modal.is_empty()
    }

    /// The stack whose top is visible: modal when it has entries
    pub fn active_kind(&self) -> StackKind {
        if self.is_modal_active() {
            StackKind::Modal
        } else {
            StackKind::Primary
        }
    }

    /// The visible page
    pub fn active(&self) -> Option<&PageInstance> {
        self.current(self.active_kind())
    }

    /// All instances in `kind` navigated to with `url`, bottom-up
    pub fn is_open(&self, url: &str, kind: StackKind) -> Vec<&PageInstance> {
        self.stack(kind)
            .iter()
            .filter(|instance| instance.matches_url(url))
            .collect()
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.locate(id).is_some()
    }

    /// Ids of every instance in both stacks, primary bottom-up then modal
    pub fn ids(&self) -> Vec<InstanceId> {
        self.primary
            .iter()
            .chain(self.modal.iter())
            .map(PageInstance::id)
            .collect()
    }

    /// Install a new root, returning every previous instance in teardown
    /// order: modal top-down, then primary top-down (old root last).
    pub fn set_root(&mut self, url: &str, instance: PageInstance) -> Vec<PageInstance> {
        let previous = self.take_all();
        debug!("Root set to '{}' ({})", url, instance.id());
        self.root_url = Some(url.to_string());
        self.primary.push(instance);
        previous
    }

    /// Swap the root instance in place, returning the old one
    pub(crate) fn replace_root(&mut self, instance: PageInstance) -> Result<PageInstance> {
        match self.primary.first_mut() {
            Some(root) => Ok(std::mem::replace(root, instance)),
            None => Err(Error::invalid_operation("Navigation has not been initialized")),
        }
    }

    /// Append to the top of a stack
    pub fn push(&mut self, kind: StackKind, instance: PageInstance) -> &PageInstance {
        debug!(
            "Push '{}' ({}) onto {:?} stack",
            instance.url(),
            instance.id(),
            kind
        );
        let stack = self.stack_mut(kind);
        stack.push(instance);
        &stack[stack.len() - 1]
    }

    /// Remove the top of a stack. The primary root can never be popped.
    pub fn pop(&mut self, kind: StackKind) -> Result<PageInstance> {
        match kind {
            StackKind::Primary if self.primary.len() <= 1 => Err(Error::invalid_operation(
                "Cannot pop the root page of the navigation stack",
            )),
            StackKind::Modal if self.modal.is_empty() => {
                Err(Error::invalid_operation("There is no modal page to pop"))
            }
            _ => self
                .stack_mut(kind)
                .pop()
                .ok_or_else(|| Error::invalid_operation("Navigation stack is empty")),
        }
    }

    /// Remove every modal instance and every primary instance above the root.
    /// Returned in teardown order: modal top-down, then primary top-down.
    pub fn pop_to_root(&mut self) -> Vec<PageInstance> {
        let mut removed: Vec<PageInstance> = self.modal.drain(..).rev().collect();
        if self.primary.len() > 1 {
            removed.extend(self.primary.drain(1..).rev());
        }
        removed
    }

    /// Remove every non-root instance in `kind` navigated to with `url`,
    /// bottom-up.
    pub fn take_open(&mut self, url: &str, kind: StackKind) -> Vec<PageInstance> {
        let protected = match kind {
            StackKind::Primary => 1,
            StackKind::Modal => 0,
        };
        let stack = self.stack_mut(kind);
        let mut taken = Vec::new();
        let mut index = protected;
        while index < stack.len() {
            if stack[index].matches_url(url) {
                taken.push(stack.remove(index));
            } else {
                index += 1;
            }
        }
        taken
    }

    /// Remove one instance by id, wherever it sits. The root is protected.
    pub fn remove(&mut self, id: InstanceId) -> Result<(StackKind, PageInstance)> {
        let (kind, index) = self
            .locate(id)
            .ok_or_else(|| Error::invalid_operation(format!("Page {} is not in any stack", id)))?;

        if kind == StackKind::Primary && index == 0 {
            return Err(Error::invalid_operation(
                "Cannot remove the root page of the navigation stack",
            ));
        }

        Ok((kind, self.stack_mut(kind).remove(index)))
    }

    /// Where an instance sits: stack and index
    pub fn locate(&self, id: InstanceId) -> Option<(StackKind, usize)> {
        if let Some(index) = self.primary.iter().position(|i| i.id() == id) {
            return Some((StackKind::Primary, index));
        }
        self.modal
            .iter()
            .position(|i| i.id() == id)
            .map(|index| (StackKind::Modal, index))
    }

    /// Empty both stacks and forget the root, returning everything in
    /// teardown order.
    pub fn take_all(&mut self) -> Vec<PageInstance> {
        let mut removed = self.pop_to_root();
        removed.extend(self.primary.drain(..));
        self.root_url = None;
        removed
    }

    pub fn snapshot(&self) -> StackSnapshot {
        StackSnapshot {
            root_url: self.root_url.clone(),
            primary: self.primary.iter().map(PageInstance::summary).collect(),
            modal: self.modal.iter().map(PageInstance::summary).collect(),
        }
    }
}

/// Serializable view of both stacks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StackSnapshot {
    pub root_url: Option<String>,
    pub primary: Vec<InstanceSummary>,
    pub modal: Vec<InstanceSummary>,
}

impl StackSnapshot {
    pub fn primary_urls(&self) -> Vec<&str> {
        self.primary.iter().map(|s| s.url.as_str()).collect()
    }

    pub fn modal_urls(&self) -> Vec<&str> {
        self.modal.iter().map(|s| s.url.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, ViewModel, ViewModelHandle};
    use crate::variant::Variant;
    use pagenav_core::Orientation;

    #[derive(Default)]
    struct TestPage;
    impl Page for TestPage {}

    #[derive(Default)]
    struct TestViewModel;
    impl ViewModel for TestViewModel {}

    fn instance(url: &str) -> PageInstance {
        PageInstance::new(
            url,
            Variant::page::<TestPage>(),
            Variant::view_model::<TestViewModel>(),
            Box::new(TestPage),
            ViewModelHandle::new(
                Box::new(TestViewModel),
                "TestViewModel",
                Vec::new(),
                Orientation::Portrait,
            ),
        )
    }

    fn initialized() -> NavigationStack {
        let mut stack = NavigationStack::new();
        stack.set_root("Root", instance("Root"));
        stack
    }

    #[test]
    fn test_uninitialized() {
        let stack = NavigationStack::new();
        assert!(!stack.is_initialized());
        assert!(stack.root_url().is_none());
        assert!(stack.active().is_none());
    }

    #[test]
    fn test_root_cannot_be_popped() {
        let mut stack = initialized();
        let err = stack.pop(StackKind::Primary).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { .. }));
        assert_eq!(stack.len(StackKind::Primary), 1);
    }

    #[test]
    fn test_pop_empty_modal_fails() {
        let mut stack = initialized();
        assert!(stack.pop(StackKind::Modal).is_err());
    }

    #[test]
    fn test_push_and_pop() {
        let mut stack = initialized();
        stack.push(StackKind::Primary, instance("Page2"));
        stack.push(StackKind::Primary, instance("Page3"));

        assert_eq!(stack.current(StackKind::Primary).unwrap().url(), "Page3");
        let popped = stack.pop(StackKind::Primary).unwrap();
        assert_eq!(popped.url(), "Page3");
        assert_eq!(stack.len(StackKind::Primary), 2);
    }

    #[test]
    fn test_modal_layered_above_primary() {
        let mut stack = initialized();
        stack.push(StackKind::Primary, instance("Page2"));
        assert_eq!(stack.active_kind(), StackKind::Primary);

        stack.push(StackKind::Modal, instance("Dialog"));
        assert!(stack.is_modal_active());
        assert_eq!(stack.active().unwrap().url(), "Dialog");
    }

    #[test]
    fn test_pop_to_root_teardown_order() {
        let mut stack = initialized();
        stack.push(StackKind::Primary, instance("Page2"));
        stack.push(StackKind::Primary, instance("Page3"));
        stack.push(StackKind::Modal, instance("Dialog"));

        let removed = stack.pop_to_root();
        let urls: Vec<_> = removed.iter().map(PageInstance::url).collect();
        assert_eq!(urls, vec!["Dialog", "Page3", "Page2"]);
        assert_eq!(stack.len(StackKind::Primary), 1);
        assert_eq!(stack.root().unwrap().url(), "Root");
    }

    #[test]
    fn test_is_open_is_case_insensitive() {
        let mut stack = initialized();
        stack.push(StackKind::Primary, instance("Page2"));
        stack.push(StackKind::Modal, instance("Page2"));

        assert_eq!(stack.is_open("page2", StackKind::Primary).len(), 1);
        assert_eq!(stack.is_open("PAGE2", StackKind::Modal).len(), 1);
        assert!(stack.is_open("Page3", StackKind::Primary).is_empty());
    }

    #[test]
    fn test_take_open_skips_root() {
        let mut stack = initialized();
        stack.push(StackKind::Primary, instance("Page2"));
        stack.push(StackKind::Primary, instance("Page3"));
        stack.push(StackKind::Primary, instance("Page2"));

        let taken = stack.take_open("Page2", StackKind::Primary);
        assert_eq!(taken.len(), 2);
        assert_eq!(stack.snapshot().primary_urls(), vec!["Root", "Page3"]);

        let taken = stack.take_open("Root", StackKind::Primary);
        assert!(taken.is_empty());
    }

    #[test]
    fn test_remove_protects_root() {
        let mut stack = initialized();
        let root_id = stack.root().unwrap().id();
        assert!(stack.remove(root_id).is_err());

        let id = stack.push(StackKind::Modal, instance("Dialog")).id();
        let (kind, removed) = stack.remove(id).unwrap();
        assert_eq!(kind, StackKind::Modal);
        assert_eq!(removed.id(), id);
        assert!(!stack.contains(id));
    }

    #[test]
    fn test_set_root_returns_previous_session() {
        let mut stack = initialized();
        stack.push(StackKind::Primary, instance("Page2"));
        stack.push(StackKind::Modal, instance("Dialog"));

        let previous = stack.set_root("Home", instance("Home"));
        let urls: Vec<_> = previous.iter().map(PageInstance::url).collect();
        assert_eq!(urls, vec!["Dialog", "Page2", "Root"]);
        assert_eq!(stack.root_url(), Some("Home"));
        assert!(stack.is_root_url("home"));
        assert_eq!(stack.len(StackKind::Primary), 1);
        assert!(!stack.is_modal_active());
    }

    #[test]
    fn test_take_all_resets() {
        let mut stack = initialized();
        stack.push(StackKind::Primary, instance("Page2"));
        let removed = stack.take_all();
        assert_eq!(removed.len(), 2);
        assert!(!stack.is_initialized());
        assert!(stack.root_url().is_none());
    }

    #[test]
    fn test_snapshot() {
        let mut stack = initialized();
        stack.push(StackKind::Modal, instance("Dialog"));
        let snapshot = stack.snapshot();
        assert_eq!(snapshot.root_url.as_deref(), Some("Root"));
        assert_eq!(snapshot.primary_urls(), vec!["Root"]);
        assert_eq!(snapshot.modal_urls(), vec!["Dialog"]);
        assert_eq!(stack.ids().len(), 2);
    }
}
