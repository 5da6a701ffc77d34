//! Page and view model capabilities, and the live instances built from them
//!
//! A [`Page`] is the view half of a navigation target and a [`ViewModel`] the
//! state half. Both are constructed by the lifecycle coordinator from the
//! variants of a registered definition; applications only implement the
//! hooks they care about.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::variant::Variant;
use pagenav_core::{url_matches, Args, Orientation};

/// View-model capability.
///
/// Every hook has a no-op default so that plain state structs can be used
/// directly as view models.
pub trait ViewModel: Send + 'static {
    /// Receive the navigation arguments. Called exactly once, right after
    /// construction.
    fn set_args(&mut self, _args: &Args) {}

    /// Called when the view model is carried over to a view built for a
    /// different orientation.
    fn orientation_changed(&mut self, _orientation: Orientation) {}

    /// Release resources. Called exactly once, after the owning page left
    /// every stack.
    fn dispose(&mut self) {}
}

/// Page (view) capability.
pub trait Page: Send + Sync + 'static {
    /// Receive the navigation arguments. Called once, before binding.
    fn set_args(&mut self, _args: &Args) {}

    /// Attach the view model as the page's binding context.
    fn bind_view_model(&mut self, _view_model: &ViewModelHandle) {}

    /// Detach the binding context. First step of destruction.
    fn unbind_view_model(&mut self) {}

    /// The url this page was navigated to with
    fn set_url(&mut self, _url: &str) {}

    /// Release resources. Last step of destruction.
    fn dispose(&mut self) {}
}

// ─────────────────────────────────────────────────────────────────
// View model handle
// ─────────────────────────────────────────────────────────────────

struct ViewModelState {
    model: Box<dyn ViewModel>,
    args: Args,
    current_orientation: Orientation,
    disposed: bool,
}

/// Shared handle to a constructed view model.
///
/// The owning [`PageInstance`] controls its lifetime; pages may clone the
/// handle while bound but must drop it in `unbind_view_model`.
#[derive(Clone)]
pub struct ViewModelHandle {
    state: Arc<Mutex<ViewModelState>>,
    variant_name: Arc<str>,
}

impl ViewModelHandle {
    pub(crate) fn new(
        mut model: Box<dyn ViewModel>,
        variant_name: &str,
        args: Args,
        orientation: Orientation,
    ) -> Self {
        model.set_args(&args);
        Self {
            state: Arc::new(Mutex::new(ViewModelState {
                model,
                args,
                current_orientation: orientation,
                disposed: false,
            })),
            variant_name: Arc::from(variant_name),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewModelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn variant_name(&self) -> &str {
        &self.variant_name
    }

    /// Arguments the view model was constructed with
    pub fn args(&self) -> Args {
        self.lock().args.clone()
    }

    pub fn current_orientation(&self) -> Orientation {
        self.lock().current_orientation
    }

    pub(crate) fn set_current_orientation(&self, orientation: Orientation) {
        let mut state = self.lock();
        if state.current_orientation != orientation {
            state.current_orientation = orientation;
            state.model.orientation_changed(orientation);
        }
    }

    /// Run a closure against the underlying view model
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn ViewModel) -> R) -> R {
        let mut state = self.lock();
        f(state.model.as_mut())
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Dispose the view model. Returns false if it was already disposed.
    pub(crate) fn dispose(&self) -> bool {
        let mut state = self.lock();
        if state.disposed {
            return false;
        }
        state.disposed = true;
        state.model.dispose();
        true
    }

    /// True when both handles point at the same view model
    pub fn same_as(&self, other: &ViewModelHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for ViewModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ViewModelHandle")
            .field("variant", &self.variant_name)
            .field("args", &state.args.len())
            .field("current_orientation", &state.current_orientation)
            .field("disposed", &state.disposed)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────
// Page instance
// ─────────────────────────────────────────────────────────────────

static INSTANCE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a live page instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(INSTANCE_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A constructed (view, view model) pair living in a navigation stack
pub struct PageInstance {
    id: InstanceId,
    url: String,
    page_variant: Variant,
    view_model_variant: Variant,
    page: Box<dyn Page>,
    view_model: ViewModelHandle,
    /// False once the view model was handed to a replacement instance
    owns_view_model: bool,
}

impl PageInstance {
    pub(crate) fn new(
        url: &str,
        page_variant: Variant,
        view_model_variant: Variant,
        page: Box<dyn Page>,
        view_model: ViewModelHandle,
    ) -> Self {
        Self {
            id: InstanceId::next(),
            url: url.to_string(),
            page_variant,
            view_model_variant,
            page,
            view_model,
            owns_view_model: true,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn matches_url(&self, url: &str) -> bool {
        url_matches(&self.url, url)
    }

    pub fn page_variant(&self) -> &Variant {
        &self.page_variant
    }

    pub fn view_model_variant(&self) -> &Variant {
        &self.view_model_variant
    }

    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    pub(crate) fn page_mut(&mut self) -> &mut dyn Page {
        self.page.as_mut()
    }

    pub fn view_model(&self) -> &ViewModelHandle {
        &self.view_model
    }

    pub fn current_orientation(&self) -> Orientation {
        self.view_model.current_orientation()
    }

    pub(crate) fn owns_view_model(&self) -> bool {
        self.owns_view_model
    }

    /// Give up ownership of the view model; destruction will then skip it.
    pub(crate) fn release_view_model(&mut self) {
        self.owns_view_model = false;
    }

    pub fn summary(&self) -> InstanceSummary {
        InstanceSummary {
            id: self.id,
            url: self.url.clone(),
            page_variant: self.page_variant.name().to_string(),
            view_model_variant: self.view_model_variant.name().to_string(),
            orientation: self.current_orientation(),
        }
    }
}

impl fmt::Debug for PageInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageInstance")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("page_variant", &self.page_variant.name())
            .field("view_model", &self.view_model)
            .field("owns_view_model", &self.owns_view_model)
            .finish()
    }
}

/// Read-only description of a page instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSummary {
    pub id: InstanceId,
    pub url: String,
    pub page_variant: String,
    pub view_model_variant: String,
    pub orientation: Orientation,
}
