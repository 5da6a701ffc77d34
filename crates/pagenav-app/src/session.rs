//! The navigation state machine
//!
//! A [`NavigationSession`] owns the registry, both stacks, the settings and
//! the lifecycle pipeline of one application. Every operation runs to
//! completion before the next one starts; the [`crate::navigator`] actor
//! provides that ordering when callers live on other tasks or threads.
//!
//! Each mutating operation follows the same shape:
//! 1. validate and resolve (errors here leave everything untouched)
//! 2. construct what is needed (a failure aborts with no partial instance)
//! 3. commit the stack mutation
//! 4. drive the display adapter, then destroy whatever left the stacks
//! 5. report `FinishedNavigation` once the display completed

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::{NavigationSettings, SettingChange};
use crate::orientation::{OrientationPlan, OrientationReactor};
use crate::page::{InstanceId, PageInstance};
use crate::plugin::NavigationPlugin;
use crate::registry::{PageDefinition, PageRegistration, Registry};
use crate::services::{DeviceContext, DisplayAdapter};
use crate::stack::{NavigationStack, StackSnapshot};
use crate::lifecycle::LifecycleCoordinator;
use pagenav_core::prelude::*;
use pagenav_core::{validate_url, Args, Idiom, NavEvent, NavOperation, Orientation, StackKind};

/// Per-push options; `None` falls back to the configured defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushOptions {
    pub is_modal: Option<bool>,
    pub allow_multiple: Option<bool>,
    pub replace: Option<bool>,
    /// Empty means "use the definition's default args"
    pub args: Args,
}

impl PushOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modal(mut self, is_modal: bool) -> Self {
        self.is_modal = Some(is_modal);
        self
    }

    pub fn allow_multiple(mut self, allow_multiple: bool) -> Self {
        self.allow_multiple = Some(allow_multiple);
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = Some(replace);
        self
    }

    pub fn args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }
}

/// One application's navigation state
pub struct NavigationSession<D> {
    registry: Registry,
    stack: NavigationStack,
    settings: NavigationSettings,
    lifecycle: LifecycleCoordinator,
    device: Arc<dyn DeviceContext>,
    /// Last orientation reported through `orientation_changed`
    notified_orientation: Option<Orientation>,
    display: D,
}

impl<D> NavigationSession<D> {
    pub fn new(settings: NavigationSettings, device: Arc<dyn DeviceContext>, display: D) -> Self {
        let lifecycle = LifecycleCoordinator::new(settings.events.channel_capacity);
        Self {
            registry: Registry::new(),
            stack: NavigationStack::new(),
            settings,
            lifecycle,
            device,
            notified_orientation: None,
            display,
        }
    }

    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn register(&mut self, registration: PageRegistration) -> Result<Arc<PageDefinition>> {
        self.registry.register(registration, &self.settings.defaults)
    }

    pub fn register_or_replace(
        &mut self,
        registration: PageRegistration,
    ) -> Result<Arc<PageDefinition>> {
        self.registry
            .register_or_replace(registration, &self.settings.defaults)
    }

    pub fn apply_setting(&mut self, change: SettingChange) {
        debug!("Applying setting {:?}", change);
        change.apply(&mut self.settings);
    }

    /// Idiom used for resolution: the override if set, else the device's
    pub fn current_idiom(&self) -> Idiom {
        self.settings
            .idiom_override
            .clone()
            .unwrap_or_else(|| self.device.current_idiom())
    }

    /// Orientation used for resolution: the last notified one if any,
    /// else the device's
    pub fn current_orientation(&self) -> Orientation {
        self.notified_orientation
            .unwrap_or_else(|| self.device.current_orientation())
    }

    /// Resolve a url under the current idiom and the given orientation
    pub fn resolve(&self, url: &str, orientation: Orientation) -> Result<Arc<PageDefinition>> {
        self.registry.resolve(url, &self.current_idiom(), orientation)
    }

    pub fn is_initialized(&self) -> bool {
        self.stack.is_initialized()
    }

    pub fn is_open(&self, url: &str, is_modal: bool) -> Vec<&PageInstance> {
        self.stack.is_open(url, StackKind::from_modal(is_modal))
    }

    pub fn is_modal_active(&self) -> bool {
        self.stack.is_modal_active()
    }

    pub fn current_page(&self, is_modal: bool) -> Option<&PageInstance> {
        self.stack.current(StackKind::from_modal(is_modal))
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn snapshot(&self) -> StackSnapshot {
        self.stack.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavEvent> {
        self.lifecycle.subscribe()
    }

    pub fn event_sender(&self) -> broadcast::Sender<NavEvent> {
        self.lifecycle.sender()
    }

    pub fn add_plugin(&mut self, plugin: Box<dyn NavigationPlugin>) {
        self.lifecycle.add_plugin(plugin);
    }

    pub(crate) fn lifecycle(&self) -> &LifecycleCoordinator {
        &self.lifecycle
    }

    /// Destroy every live instance, top-down, without display calls.
    ///
    /// Idempotent: a disposed session is simply uninitialized and can be
    /// initialized again.
    pub fn dispose(&mut self) {
        let instances = self.stack.take_all();
        if instances.is_empty() {
            return;
        }
        info!("Disposing navigation session ({} pages)", instances.len());
        self.lifecycle.destroy_all(instances);
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.stack.is_initialized() {
            Ok(())
        } else {
            Err(Error::invalid_operation(
                "Navigation has not been initialized, call init first",
            ))
        }
    }
}

impl<D> Drop for NavigationSession<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<D: DisplayAdapter + Sync> NavigationSession<D> {
    /// Start a new navigation session rooted at `url`.
    ///
    /// The new root is constructed before the previous session is torn down,
    /// so a failed init leaves the previous session intact.
    pub async fn init(&mut self, url: &str) -> Result<()> {
        validate_url(url)?;

        let orientation = self.current_orientation();
        let definition = self.resolve(url, orientation)?;
        self.lifecycle.started(NavOperation::Init, url);

        let root = self.lifecycle.create_instance(
            &definition,
            definition.default_args().clone(),
            orientation,
            NavOperation::Init,
        )?;

        let previous = self.stack.set_root(url, root);
        info!("Navigation initialized at '{}'", url);

        let shown = match self.stack.root() {
            Some(root) => self.display.display_root(root).await,
            None => Ok(()),
        };
        self.lifecycle.destroy_all(previous);
        shown?;

        self.lifecycle
            .finished(NavOperation::Init, url, self.stack.root());
        Ok(())
    }

    /// Push `url` onto the primary or modal stack.
    pub async fn push(&mut self, url: &str, options: PushOptions) -> Result<()> {
        validate_url(url)?;
        self.ensure_initialized()?;

        let defaults = &self.settings.defaults;
        let is_modal = options.is_modal.unwrap_or(defaults.is_modal);
        let allow_multiple = options.allow_multiple.unwrap_or(defaults.allow_multiple);
        let replace = options.replace.unwrap_or(defaults.replace_instance);
        let kind = StackKind::from_modal(is_modal);

        // Pushing the root again just returns to it
        if !allow_multiple && self.stack.is_root_url(url) {
            self.lifecycle.started(NavOperation::Push, url);
            debug!("'{}' is the root, popping to root instead of pushing", url);
            self.pop_to_root().await?;
            self.lifecycle
                .finished(NavOperation::Push, url, self.stack.active());
            return Ok(());
        }

        let orientation = self.current_orientation();
        let definition = self.resolve(url, orientation)?;
        self.lifecycle.started(NavOperation::Push, url);

        let args = if options.args.is_empty() {
            definition.default_args().clone()
        } else {
            options.args
        };

        let (instance, reused, retired) = if !allow_multiple && replace {
            let instance =
                self.lifecycle
                    .create_instance(&definition, args, orientation, NavOperation::Push)?;
            (instance, false, self.stack.take_open(url, kind))
        } else if !allow_multiple {
            let mut open = self.stack.take_open(url, kind);
            if open.is_empty() {
                let instance = self.lifecycle.create_instance(
                    &definition,
                    args,
                    orientation,
                    NavOperation::Push,
                )?;
                (instance, false, open)
            } else {
                debug!("Reusing open '{}', collapsing {} duplicates", url, open.len() - 1);
                let first = open.remove(0);
                (first, true, open)
            }
        } else {
            let instance =
                self.lifecycle
                    .create_instance(&definition, args, orientation, NavOperation::Push)?;
            (instance, false, Vec::new())
        };

        let mut outcome = Ok(());
        if reused {
            outcome = outcome.and(self.display.display_remove(&instance).await);
        }
        outcome = outcome.and(self.retire(retired).await);

        let pushed = self.stack.push(kind, instance);
        outcome = outcome.and(self.display.display_push(pushed, is_modal).await);
        outcome?;

        self.lifecycle
            .finished(NavOperation::Push, url, self.stack.current(kind));
        Ok(())
    }

    /// Pop the top of the primary or modal stack. The root is never popped.
    pub async fn pop(&mut self, is_modal: Option<bool>) -> Result<()> {
        self.ensure_initialized()?;
        let is_modal = is_modal.unwrap_or(self.settings.defaults.is_modal);

        let popped = self.stack.pop(StackKind::from_modal(is_modal))?;
        debug!("Popped '{}' ({})", popped.url(), popped.id());

        let shown = self.display.display_pop(is_modal).await;
        self.lifecycle.destroy(popped);
        shown?;

        self.recheck_orientation().await
    }

    /// Remove every modal page and every primary page above the root.
    pub async fn pop_to_root(&mut self) -> Result<()> {
        self.ensure_initialized()?;

        let removed = self.stack.pop_to_root();
        if removed.is_empty() {
            debug!("Already at root");
            return Ok(());
        }
        debug!("Popping {} pages to root", removed.len());

        let shown = self.display.display_pop_to_root().await;
        self.lifecycle.destroy_all(removed);
        shown?;

        self.recheck_orientation().await
    }

    /// Handle a device orientation change notification
    ///
    /// The notified orientation is kept and used for every later resolution,
    /// even while handling is disabled or before init.
    pub async fn orientation_changed(&mut self, orientation: Orientation) -> Result<()> {
        self.notified_orientation = Some(orientation);
        if !self.settings.orientation.handle_automatically {
            debug!("Orientation change to {} ignored (handling disabled)", orientation);
            return Ok(());
        }
        if !self.stack.is_initialized() {
            debug!("Orientation change to {} before init ignored", orientation);
            return Ok(());
        }
        self.react_to_orientation(orientation).await
    }

    /// Remove a registration and tear down the live pages built from it.
    ///
    /// Returns false when nothing was registered for the triple. A root
    /// page built from the definition stays until the next init.
    pub async fn deregister(
        &mut self,
        url: &str,
        idiom: Option<Idiom>,
        orientation: Option<Orientation>,
    ) -> Result<bool> {
        let idiom = idiom.unwrap_or_else(|| self.settings.defaults.idiom.clone());
        let orientation = orientation.unwrap_or(self.settings.defaults.orientation);

        let Some(definition) = self.registry.deregister(url, &idiom, orientation) else {
            debug!("Nothing registered for '{}' ({}/{})", url, idiom, orientation);
            return Ok(false);
        };

        let built_from = |instance: &PageInstance| {
            instance.page_variant() == definition.page_variant()
                && instance.view_model_variant() == definition.view_model_variant()
        };

        if self.stack.root().map(built_from).unwrap_or(false) {
            warn!("Root page '{}' was deregistered but stays until the next init", url);
        }

        let doomed: Vec<InstanceId> = self
            .stack
            .stack(StackKind::Primary)
            .iter()
            .skip(1)
            .chain(self.stack.stack(StackKind::Modal))
            .filter(|instance| built_from(instance))
            .map(PageInstance::id)
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for id in doomed.into_iter().rev() {
            let (_, instance) = self.stack.remove(id)?;
            removed.push(instance);
        }
        self.retire(removed).await?;

        Ok(true)
    }

    /// Take instances that already left the stacks off the display and
    /// destroy them. Every instance is destroyed; the first display error is
    /// returned.
    async fn retire(&self, instances: Vec<PageInstance>) -> Result<()> {
        let mut outcome = Ok(());
        for instance in instances {
            outcome = outcome.and(self.display.display_remove(&instance).await);
            self.lifecycle.destroy(instance);
        }
        outcome
    }

    /// After a pop, rebuild the exposed page if it was built for another
    /// orientation than the device now has.
    async fn recheck_orientation(&mut self) -> Result<()> {
        if !self.settings.orientation.handle_automatically {
            return Ok(());
        }
        let device_orientation = self.current_orientation();
        let stale = self
            .stack
            .active()
            .map(|page| OrientationReactor::needs_recheck(page, device_orientation))
            .unwrap_or(false);
        if stale {
            debug!("Exposed page is stale, re-checking for {}", device_orientation);
            self.react_to_orientation(device_orientation).await?;
        }
        Ok(())
    }

    async fn react_to_orientation(&mut self, orientation: Orientation) -> Result<()> {
        let kind = self.stack.active_kind();
        let Some(current) = self.stack.current(kind) else {
            return Ok(());
        };
        let url = current.url().to_string();

        let definition = match self.resolve(&url, orientation) {
            Ok(definition) => definition,
            Err(Error::PageNotFound { .. }) => {
                warn!("'{}' no longer resolves, keeping it on {}", url, orientation);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let keep_view_model = self.settings.orientation.keep_view_model;
        let plan = OrientationReactor::plan(current, &definition, orientation, keep_view_model);
        if let OrientationPlan::Unchanged(reason) = plan {
            debug!("Keeping '{}' on {}: {:?}", url, orientation, reason);
            return Ok(());
        }

        self.lifecycle.started(NavOperation::OrientationChange, &url);

        let old_id = current.id();
        let is_root = kind == StackKind::Primary && self.stack.len(StackKind::Primary) == 1;
        let replacement = match plan {
            OrientationPlan::RebuildView => {
                let view_model = current.view_model().clone();
                let instance = self.lifecycle.create_view(
                    &definition,
                    view_model.clone(),
                    NavOperation::OrientationChange,
                )?;
                view_model.set_current_orientation(orientation);
                instance
            }
            _ => self.lifecycle.create_instance(
                &definition,
                current.view_model().args(),
                orientation,
                NavOperation::OrientationChange,
            )?,
        };

        let mut outcome = Ok(());
        let mut old = if is_root {
            let old = self.stack.replace_root(replacement)?;
            if let Some(root) = self.stack.root() {
                outcome = outcome.and(self.display.display_root(root).await);
            }
            old
        } else {
            // New page goes up before the old one comes down
            let pushed = self.stack.push(kind, replacement);
            outcome = outcome.and(self.display.display_push(pushed, kind.is_modal()).await);
            let (_, old) = self.stack.remove(old_id)?;
            outcome = outcome.and(self.display.display_remove(&old).await);
            old
        };

        if plan == OrientationPlan::RebuildView {
            old.release_view_model();
        }
        self.lifecycle.destroy(old);
        outcome?;

        info!("Swapped '{}' for {}", url, orientation);
        self.lifecycle
            .finished(NavOperation::OrientationChange, &url, self.stack.current(kind));
        Ok(())
    }
}

impl<D> std::fmt::Debug for NavigationSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationSession")
            .field("registry", &self.registry.len())
            .field("stack", &self.stack.snapshot())
            .field("settings", &self.settings)
            .finish()
    }
}
