//! Test utilities for navigation sessions
//!
//! - [`LifecycleProbe`] hands out named page/view-model variants that record
//!   every capability hook they receive
//! - [`RecordingDisplay`] is a display adapter that records transitions and
//!   can be told to fail
//! - [`test_session`] wires both into a fresh session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::NavigationSettings;
use crate::page::{Page, PageInstance, ViewModel, ViewModelHandle};
use crate::services::{DisplayAdapter, StaticDevice};
use crate::session::NavigationSession;
use crate::variant::Variant;
use pagenav_core::prelude::*;
use pagenav_core::{Args, Orientation};

// ─────────────────────────────────────────────────────────────────
// Lifecycle probe
// ─────────────────────────────────────────────────────────────────

/// A capability hook observed by the probe
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeCall {
    Created,
    SetArgs(Args),
    Bound,
    SetUrl(String),
    Unbound,
    OrientationChanged(Orientation),
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeKind {
    Page,
    ViewModel,
}

#[derive(Debug, Clone)]
struct ProbeRecord {
    kind: ProbeKind,
    name: String,
    call: ProbeCall,
}

type ProbeLog = Arc<Mutex<Vec<ProbeRecord>>>;

fn record(log: &ProbeLog, kind: ProbeKind, name: &str, call: ProbeCall) {
    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(ProbeRecord {
            kind,
            name: name.to_string(),
            call,
        });
}

struct ProbePage {
    name: String,
    log: ProbeLog,
    bound: Option<ViewModelHandle>,
}

impl Page for ProbePage {
    fn set_args(&mut self, args: &Args) {
        record(&self.log, ProbeKind::Page, &self.name, ProbeCall::SetArgs(args.clone()));
    }

    fn bind_view_model(&mut self, view_model: &ViewModelHandle) {
        self.bound = Some(view_model.clone());
        record(&self.log, ProbeKind::Page, &self.name, ProbeCall::Bound);
    }

    fn unbind_view_model(&mut self) {
        self.bound = None;
        record(&self.log, ProbeKind::Page, &self.name, ProbeCall::Unbound);
    }

    fn set_url(&mut self, url: &str) {
        record(&self.log, ProbeKind::Page, &self.name, ProbeCall::SetUrl(url.to_string()));
    }

    fn dispose(&mut self) {
        record(&self.log, ProbeKind::Page, &self.name, ProbeCall::Disposed);
    }
}

struct ProbeViewModel {
    name: String,
    log: ProbeLog,
}

impl ViewModel for ProbeViewModel {
    fn set_args(&mut self, args: &Args) {
        record(&self.log, ProbeKind::ViewModel, &self.name, ProbeCall::SetArgs(args.clone()));
    }

    fn orientation_changed(&mut self, orientation: Orientation) {
        record(
            &self.log,
            ProbeKind::ViewModel,
            &self.name,
            ProbeCall::OrientationChanged(orientation),
        );
    }

    fn dispose(&mut self) {
        record(&self.log, ProbeKind::ViewModel, &self.name, ProbeCall::Disposed);
    }
}

/// Shared recorder behind a family of named test variants
#[derive(Debug, Clone, Default)]
pub struct LifecycleProbe {
    log: ProbeLog,
}

impl LifecycleProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page variant named `name` whose instances report to this probe
    pub fn page_variant(&self, name: &str) -> Variant {
        let log = self.log.clone();
        let page_name = name.to_string();
        Variant::named_page(name, move || {
            record(&log, ProbeKind::Page, &page_name, ProbeCall::Created);
            Ok(Box::new(ProbePage {
                name: page_name.clone(),
                log: log.clone(),
                bound: None,
            }) as Box<dyn Page>)
        })
    }

    /// A view model variant named `name` whose instances report to this probe
    pub fn view_model_variant(&self, name: &str) -> Variant {
        let log = self.log.clone();
        let vm_name = name.to_string();
        Variant::named_view_model(name, move || {
            record(&log, ProbeKind::ViewModel, &vm_name, ProbeCall::Created);
            Ok(Box::new(ProbeViewModel {
                name: vm_name.clone(),
                log: log.clone(),
            }) as Box<dyn ViewModel>)
        })
    }

    /// A page variant whose constructor always fails
    pub fn failing_page_variant(&self, name: &str) -> Variant {
        let page_name = name.to_string();
        Variant::named_page(name, move || {
            Err(Error::instantiation(&page_name, "constructor failed"))
        })
    }

    /// A view model variant whose constructor always fails
    pub fn failing_view_model_variant(&self, name: &str) -> Variant {
        let vm_name = name.to_string();
        Variant::named_view_model(name, move || {
            Err(Error::instantiation(&vm_name, "constructor failed"))
        })
    }

    fn records(&self) -> Vec<ProbeRecord> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every hook recorded under `name`, in order
    pub fn calls_for(&self, name: &str) -> Vec<ProbeCall> {
        self.records()
            .into_iter()
            .filter(|r| r.name == name)
            .map(|r| r.call)
            .collect()
    }

    fn count(&self, kind: ProbeKind, name: &str, call: &ProbeCall) -> usize {
        self.records()
            .iter()
            .filter(|r| r.kind == kind && r.name == name && &r.call == call)
            .count()
    }

    pub fn pages_created(&self, name: &str) -> usize {
        self.count(ProbeKind::Page, name, &ProbeCall::Created)
    }

    pub fn view_models_created(&self, name: &str) -> usize {
        self.count(ProbeKind::ViewModel, name, &ProbeCall::Created)
    }

    pub fn page_disposals(&self, name: &str) -> usize {
        self.count(ProbeKind::Page, name, &ProbeCall::Disposed)
    }

    pub fn view_model_disposals(&self, name: &str) -> usize {
        self.count(ProbeKind::ViewModel, name, &ProbeCall::Disposed)
    }

    /// Pages of `name` constructed and not yet disposed
    pub fn live_pages(&self, name: &str) -> usize {
        self.pages_created(name) - self.page_disposals(name)
    }

    /// Args the most recent view model of `name` received
    pub fn last_view_model_args(&self, name: &str) -> Option<Args> {
        self.records().into_iter().rev().find_map(|r| match r.call {
            ProbeCall::SetArgs(args) if r.kind == ProbeKind::ViewModel && r.name == name => {
                Some(args)
            }
            _ => None,
        })
    }

    /// True when the last disposal of view model `vm` precedes the last
    /// disposal of page `page`
    pub fn view_model_disposed_before_page_disposed(&self, vm: &str, page: &str) -> bool {
        let records = self.records();
        let last = |kind: ProbeKind, name: &str| {
            records
                .iter()
                .rposition(|r| r.kind == kind && r.name == name && r.call == ProbeCall::Disposed)
        };
        match (last(ProbeKind::ViewModel, vm), last(ProbeKind::Page, page)) {
            (Some(v), Some(p)) => v < p,
            _ => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Recording display adapter
// ─────────────────────────────────────────────────────────────────

/// A display transition observed by [`RecordingDisplay`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Root { url: String },
    Push { url: String, modal: bool },
    Pop { modal: bool },
    PopToRoot,
    Remove { url: String },
}

/// Display adapter that records every call. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    calls: Arc<Mutex<Vec<DisplayCall>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with a display error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<DisplayCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: DisplayCall) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::display("recording display set to fail"));
        }
        Ok(())
    }
}

impl DisplayAdapter for RecordingDisplay {
    async fn display_root(&self, instance: &PageInstance) -> Result<()> {
        self.record(DisplayCall::Root {
            url: instance.url().to_string(),
        })
    }

    async fn display_push(&self, instance: &PageInstance, modal: bool) -> Result<()> {
        self.record(DisplayCall::Push {
            url: instance.url().to_string(),
            modal,
        })
    }

    async fn display_pop(&self, modal: bool) -> Result<()> {
        self.record(DisplayCall::Pop { modal })
    }

    async fn display_pop_to_root(&self) -> Result<()> {
        self.record(DisplayCall::PopToRoot)
    }

    async fn display_remove(&self, instance: &PageInstance) -> Result<()> {
        self.record(DisplayCall::Remove {
            url: instance.url().to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Session fixture
// ─────────────────────────────────────────────────────────────────

/// A fresh session on a phone in portrait, with a recording display
pub struct TestSession {
    pub session: NavigationSession<RecordingDisplay>,
    pub display: RecordingDisplay,
    pub device: StaticDevice,
    pub probe: LifecycleProbe,
}

pub fn test_session() -> TestSession {
    test_session_with(NavigationSettings::default())
}

pub fn test_session_with(settings: NavigationSettings) -> TestSession {
    let display = RecordingDisplay::new();
    let device = StaticDevice::default();
    let session = NavigationSession::new(settings, Arc::new(device.clone()), display.clone());
    TestSession {
        session,
        display,
        device,
        probe: LifecycleProbe::new(),
    }
}
