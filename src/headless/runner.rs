//! Headless script runner
//!
//! Registers the script's pages on a fresh session, spawns a navigator and
//! replays every step. Lifecycle events (via [`EventRelay`]) and display calls
//! (via [`HeadlessDisplay`]) are produced on the navigator task and share one
//! channel, so the output keeps the order in which they happened.

use std::sync::Arc;

use tokio::sync::mpsc;

use pagenav_app::{
    DisplayAdapter, NavigationPlugin, NavigationSession, Navigator, PageInstance, PushOptions,
    StackSnapshot, StaticDevice,
};
use pagenav_core::prelude::*;
use pagenav_core::NavEvent;

use super::script::{Script, Step};
use super::HeadlessEvent;

pub type EventSender = mpsc::UnboundedSender<HeadlessEvent>;

/// Run `script` to completion and return the final stacks.
///
/// Step failures are reported as `step_failed` events; the run only stops
/// early on a fatal error. A page that fails to register aborts the run.
pub async fn run_script(script: Script, events: EventSender) -> Result<StackSnapshot> {
    info!(
        "Running script: {} pages, {} steps, device {} / {}",
        script.pages.len(),
        script.steps.len(),
        script.device.idiom,
        script.device.orientation
    );

    let device = StaticDevice::new(script.device.idiom.clone(), script.device.orientation);
    let settings = script.settings.clone().unwrap_or_default();
    let mut session = NavigationSession::new(
        settings,
        Arc::new(device.clone()),
        HeadlessDisplay::new(events.clone()),
    );

    for page in &script.pages {
        session
            .register(page.to_registration())
            .with_context(|| format!("Failed to register page '{}'", page.url))?;
    }
    session.add_plugin(Box::new(EventRelay::new(events.clone())));

    let (navigator, handle) = Navigator::spawn(session);

    for (index, step) in script.steps.iter().enumerate() {
        let number = index + 1;
        debug!("Step {}: {:?}", number, step);

        if let Err(e) = run_step(&navigator, &device, step).await {
            warn!("Step {} ({}) failed: {}", number, step.action(), e);
            send(&events, HeadlessEvent::step_failed(number, step.action(), &e));

            if e.is_fatal() {
                error!("Stopping script after fatal error at step {}", number);
                break;
            }
        }
    }

    let snapshot = navigator.snapshot().await?;
    send(&events, HeadlessEvent::stack(&snapshot));

    navigator.shutdown().await?;
    if let Err(e) = handle.await {
        warn!("Navigator task ended abnormally: {}", e);
    }

    info!("Script finished");
    Ok(snapshot)
}

async fn run_step(navigator: &Navigator, device: &StaticDevice, step: &Step) -> Result<()> {
    match step {
        Step::Init { url } => navigator.init(url.clone()).await,
        Step::Push {
            url,
            modal,
            allow_multiple,
            replace,
            args,
        } => {
            let options = PushOptions {
                is_modal: *modal,
                allow_multiple: *allow_multiple,
                replace: *replace,
                args: args.clone(),
            };
            navigator.push(url.clone(), options).await
        }
        Step::Pop { modal } => navigator.pop(*modal).await,
        Step::PopToRoot => navigator.pop_to_root().await,
        Step::Rotate { orientation } => {
            device.set_orientation(*orientation);
            navigator.orientation_changed(*orientation).await
        }
        Step::Deregister {
            url,
            idiom,
            orientation,
        } => {
            let removed = navigator
                .deregister(url.clone(), idiom.clone(), *orientation)
                .await?;
            if !removed {
                warn!("Nothing registered for '{}' to deregister", url);
            }
            Ok(())
        }
    }
}

fn send(events: &EventSender, event: HeadlessEvent) {
    if events.send(event).is_err() {
        trace!("Headless output closed, dropping event");
    }
}

// ─────────────────────────────────────────────────────────────────
// Display adapter
// ─────────────────────────────────────────────────────────────────

/// Display adapter that reports every transition as a `display` event
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    events: EventSender,
}

impl HeadlessDisplay {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    fn report(&self, call: &str, url: Option<&str>, modal: Option<bool>) -> Result<()> {
        self.events
            .send(HeadlessEvent::display(call, url, modal))
            .map_err(|_| Error::display("headless output closed"))
    }
}

impl DisplayAdapter for HeadlessDisplay {
    async fn display_root(&self, instance: &PageInstance) -> Result<()> {
        self.report("root", Some(instance.url()), None)
    }

    async fn display_push(&self, instance: &PageInstance, modal: bool) -> Result<()> {
        self.report("push", Some(instance.url()), Some(modal))
    }

    async fn display_pop(&self, modal: bool) -> Result<()> {
        self.report("pop", None, Some(modal))
    }

    async fn display_pop_to_root(&self) -> Result<()> {
        self.report("pop_to_root", None, None)
    }

    async fn display_remove(&self, instance: &PageInstance) -> Result<()> {
        self.report("remove", Some(instance.url()), None)
    }
}

// ─────────────────────────────────────────────────────────────────
// Event relay
// ─────────────────────────────────────────────────────────────────

/// Plugin forwarding lifecycle events into the headless output
#[derive(Debug)]
pub struct EventRelay {
    events: EventSender,
}

impl EventRelay {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }
}

impl NavigationPlugin for EventRelay {
    fn name(&self) -> &str {
        "headless-relay"
    }

    fn on_event(&self, event: &NavEvent) -> Result<()> {
        self.events
            .send(HeadlessEvent::navigation(event))
            .map_err(|_| Error::channel_send("headless output closed"))
    }
}
