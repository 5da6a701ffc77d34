//! Construction and destruction of page instances, and the event pipeline
//!
//! Construction order is fixed: view model first, then the view, which
//! receives the args, gets the view model bound and finally its url. Each
//! half is bracketed by an Initializing/Initialized event pair. Destruction
//! reverses the binding: unbind, dispose the view model, dispose the view.

use tokio::sync::broadcast;

use crate::page::{PageInstance, ViewModelHandle};
use crate::plugin::NavigationPlugin;
use crate::registry::PageDefinition;
use crate::stack::StackSnapshot;
use pagenav_core::prelude::*;
use pagenav_core::{Args, NavEvent, NavEventKind, NavOperation, Orientation};

/// Sequences instance construction/destruction and delivers lifecycle events
/// to plugins (synchronously) and broadcast subscribers.
pub struct LifecycleCoordinator {
    event_tx: broadcast::Sender<NavEvent>,
    plugins: Vec<Box<dyn NavigationPlugin>>,
}

impl LifecycleCoordinator {
    pub fn new(channel_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            event_tx,
            plugins: Vec::new(),
        }
    }

    /// Receive every event emitted from now on.
    ///
    /// Slow subscribers lose the oldest events; see
    /// `broadcast::error::RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<NavEvent> {
        self.event_tx.subscribe()
    }

    pub fn sender(&self) -> broadcast::Sender<NavEvent> {
        self.event_tx.clone()
    }

    pub fn add_plugin(&mut self, plugin: Box<dyn NavigationPlugin>) {
        debug!("Registered navigation plugin '{}'", plugin.name());
        self.plugins.push(plugin);
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Deliver an event to plugins in registration order, then broadcast it
    pub fn emit(&self, event: NavEvent) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_event(&event) {
                warn!("Plugin '{}' failed handling {}: {}", plugin.name(), event.kind.as_str(), e);
            }
        }
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    pub fn started(&self, operation: NavOperation, url: &str) {
        self.emit(NavEvent::new(NavEventKind::StartedNavigation, operation, url));
    }

    /// Close a navigation bracket; `current` is the page that ended up on top
    pub fn finished(&self, operation: NavOperation, url: &str, current: Option<&PageInstance>) {
        let event = NavEvent::new(NavEventKind::FinishedNavigation, operation, url);
        let event = match current {
            Some(instance) => event.with_variants(
                instance.page_variant().name(),
                instance.view_model_variant().name(),
            ),
            None => event,
        };
        self.emit(event);
    }

    pub fn start_plugins(&self, snapshot: &StackSnapshot) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_start(snapshot) {
                warn!("Plugin '{}' failed to start: {}", plugin.name(), e);
            }
        }
    }

    pub fn shutdown_plugins(&self) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_shutdown() {
                warn!("Plugin '{}' failed to shut down: {}", plugin.name(), e);
            }
        }
    }

    fn emit_step(&self, kind: NavEventKind, operation: NavOperation, definition: &PageDefinition) {
        self.emit(
            NavEvent::new(kind, operation, definition.url()).with_variants(
                definition.page_variant().name(),
                definition.view_model_variant().name(),
            ),
        );
    }

    /// Build a complete instance: view model, then view.
    ///
    /// If the view cannot be built the freshly constructed view model is
    /// disposed before the error is returned.
    pub fn create_instance(
        &self,
        definition: &PageDefinition,
        args: Args,
        orientation: Orientation,
        operation: NavOperation,
    ) -> Result<PageInstance> {
        self.emit_step(NavEventKind::InitializingViewModel, operation, definition);
        let model = definition.view_model_variant().construct_view_model()?;
        let view_model = ViewModelHandle::new(
            model,
            definition.view_model_variant().name(),
            args,
            orientation,
        );
        self.emit_step(NavEventKind::InitializedViewModel, operation, definition);

        match self.create_view(definition, view_model.clone(), operation) {
            Ok(instance) => Ok(instance),
            Err(e) => {
                debug!(
                    "Disposing orphaned {} after view construction failed",
                    view_model.variant_name()
                );
                view_model.dispose();
                Err(e)
            }
        }
    }

    /// Build only the view, bound to an existing view model. The view
    /// receives the args the view model was constructed with.
    pub fn create_view(
        &self,
        definition: &PageDefinition,
        view_model: ViewModelHandle,
        operation: NavOperation,
    ) -> Result<PageInstance> {
        self.emit_step(NavEventKind::InitializingView, operation, definition);

        let mut page = definition.page_variant().construct_page()?;
        page.set_args(&view_model.args());
        page.bind_view_model(&view_model);
        page.set_url(definition.url());

        let instance = PageInstance::new(
            definition.url(),
            definition.page_variant().clone(),
            definition.view_model_variant().clone(),
            page,
            view_model,
        );
        self.emit_step(NavEventKind::InitializedView, operation, definition);

        debug!("Created '{}' ({})", instance.url(), instance.id());
        Ok(instance)
    }

    /// Tear an instance down. It must already be out of every stack.
    pub fn destroy(&self, mut instance: PageInstance) {
        debug!("Destroying '{}' ({})", instance.url(), instance.id());
        instance.page_mut().unbind_view_model();
        if instance.owns_view_model() {
            instance.view_model().dispose();
        }
        instance.page_mut().dispose();
    }

    /// Destroy several instances in the given order
    pub fn destroy_all(&self, instances: impl IntoIterator<Item = PageInstance>) {
        for instance in instances {
            self.destroy(instance);
        }
    }
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("subscribers", &self.event_tx.receiver_count())
            .field("plugins", &self.plugins)
            .finish()
    }
}
