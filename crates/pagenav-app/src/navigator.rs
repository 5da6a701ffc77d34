//! Single-owner navigator task and its cloneable handle
//!
//! [`Navigator::spawn`] moves a [`NavigationSession`] into a tokio task. Every
//! operation is a [`NavCommand`] carrying a oneshot reply channel, so
//! mutations from any number of handles run strictly one after another.
//! The `*_sync` methods send the same commands and block the calling thread
//! until the reply arrives, returning the inner error unchanged.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::SettingChange;
use crate::registry::PageRegistration;
use crate::services::DisplayAdapter;
use crate::session::{NavigationSession, PushOptions};
use crate::stack::StackSnapshot;
use pagenav_core::prelude::*;
use pagenav_core::{Idiom, NavEvent, Orientation};

/// Global request ID counter
static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> u64 {
    REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

type Reply<T> = oneshot::Sender<Result<T>>;

/// A request to the navigator task
#[derive(Debug)]
pub enum NavCommand {
    Init {
        url: String,
        reply: Reply<()>,
    },
    Push {
        url: String,
        options: PushOptions,
        reply: Reply<()>,
    },
    Pop {
        is_modal: Option<bool>,
        reply: Reply<()>,
    },
    PopToRoot {
        reply: Reply<()>,
    },
    OrientationChanged {
        orientation: Orientation,
        reply: Reply<()>,
    },
    Register {
        registration: PageRegistration,
        replace: bool,
        reply: Reply<()>,
    },
    Deregister {
        url: String,
        idiom: Option<Idiom>,
        orientation: Option<Orientation>,
        reply: Reply<bool>,
    },
    ApplySetting {
        change: SettingChange,
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<StackSnapshot>,
    },
    Dispose {
        reply: Reply<()>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

impl NavCommand {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            NavCommand::Init { .. } => "init",
            NavCommand::Push { .. } => "push",
            NavCommand::Pop { .. } => "pop",
            NavCommand::PopToRoot { .. } => "pop to root",
            NavCommand::OrientationChanged { .. } => "orientation changed",
            NavCommand::Register { .. } => "register",
            NavCommand::Deregister { .. } => "deregister",
            NavCommand::ApplySetting { .. } => "apply setting",
            NavCommand::Snapshot { .. } => "snapshot",
            NavCommand::Dispose { .. } => "dispose",
            NavCommand::Shutdown { .. } => "shutdown",
        }
    }
}

/// Cloneable handle to a running navigator task
#[derive(Debug, Clone)]
pub struct Navigator {
    command_tx: mpsc::Sender<NavCommand>,
    event_tx: broadcast::Sender<NavEvent>,
}

impl Navigator {
    /// Move `session` into a new task. Must be called within a tokio runtime.
    ///
    /// The task runs until [`Navigator::shutdown`] is called or every handle
    /// is dropped; it disposes the session on the way out.
    pub fn spawn<D>(session: NavigationSession<D>) -> (Self, JoinHandle<()>)
    where
        D: DisplayAdapter + Send + Sync + 'static,
    {
        let capacity = session.settings().events.command_capacity.max(1);
        let (command_tx, command_rx) = mpsc::channel(capacity);
        let event_tx = session.event_sender();

        let handle = tokio::spawn(run(session, command_rx));

        (
            Self {
                command_tx,
                event_tx,
            },
            handle,
        )
    }

    /// Receive lifecycle events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<NavEvent> {
        self.event_tx.subscribe()
    }

    /// True once the navigator task has stopped
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> NavCommand) -> Result<T> {
        let (reply, response) = oneshot::channel();
        let command = make(reply);
        trace!("Sending command #{}: {}", next_request_id(), command.description());

        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::ChannelClosed)?;
        response.await.map_err(|_| Error::ChannelClosed)?
    }

    /// Blocking variant of `request`.
    ///
    /// Panics if called from within an async execution context; use the
    /// async methods there.
    fn request_blocking<T>(&self, make: impl FnOnce(Reply<T>) -> NavCommand) -> Result<T> {
        let (reply, response) = oneshot::channel();
        let command = make(reply);
        trace!(
            "Sending blocking command #{}: {}",
            next_request_id(),
            command.description()
        );

        self.command_tx
            .blocking_send(command)
            .map_err(|_| Error::ChannelClosed)?;
        response.blocking_recv().map_err(|_| Error::ChannelClosed)?
    }

    // ─────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────

    pub async fn init(&self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        self.request(|reply| NavCommand::Init { url, reply }).await
    }

    pub fn init_sync(&self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        self.request_blocking(|reply| NavCommand::Init { url, reply })
    }

    pub async fn push(&self, url: impl Into<String>, options: PushOptions) -> Result<()> {
        let url = url.into();
        self.request(|reply| NavCommand::Push {
            url,
            options,
            reply,
        })
        .await
    }

    pub fn push_sync(&self, url: impl Into<String>, options: PushOptions) -> Result<()> {
        let url = url.into();
        self.request_blocking(|reply| NavCommand::Push {
            url,
            options,
            reply,
        })
    }

    pub async fn pop(&self, is_modal: Option<bool>) -> Result<()> {
        self.request(|reply| NavCommand::Pop { is_modal, reply })
            .await
    }

    pub fn pop_sync(&self, is_modal: Option<bool>) -> Result<()> {
        self.request_blocking(|reply| NavCommand::Pop { is_modal, reply })
    }

    pub async fn pop_to_root(&self) -> Result<()> {
        self.request(|reply| NavCommand::PopToRoot { reply }).await
    }

    pub fn pop_to_root_sync(&self) -> Result<()> {
        self.request_blocking(|reply| NavCommand::PopToRoot { reply })
    }

    pub async fn orientation_changed(&self, orientation: Orientation) -> Result<()> {
        self.request(|reply| NavCommand::OrientationChanged { orientation, reply })
            .await
    }

    /// Feed orientation updates from a watch channel into the navigator
    /// until either side closes.
    ///
    /// Each forwarded value becomes the session's orientation for later
    /// navigation, whatever the device context reports.
    pub fn forward_orientation(&self, mut updates: watch::Receiver<Orientation>) -> JoinHandle<()> {
        let navigator = self.clone();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let orientation = *updates.borrow_and_update();
                match navigator.orientation_changed(orientation).await {
                    Ok(()) => {}
                    Err(e) if e.is_fatal() => {
                        debug!("Stopping orientation forwarding: {}", e);
                        break;
                    }
                    Err(e) => warn!("Orientation change to {} failed: {}", orientation, e),
                }
            }
        })
    }

    // ─────────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────────

    pub async fn register(&self, registration: PageRegistration) -> Result<()> {
        self.request(|reply| NavCommand::Register {
            registration,
            replace: false,
            reply,
        })
        .await
    }

    pub async fn register_or_replace(&self, registration: PageRegistration) -> Result<()> {
        self.request(|reply| NavCommand::Register {
            registration,
            replace: true,
            reply,
        })
        .await
    }

    /// Returns false when nothing was registered for the triple
    pub async fn deregister(
        &self,
        url: impl Into<String>,
        idiom: Option<Idiom>,
        orientation: Option<Orientation>,
    ) -> Result<bool> {
        let url = url.into();
        self.request(|reply| NavCommand::Deregister {
            url,
            idiom,
            orientation,
            reply,
        })
        .await
    }

    // ─────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────

    pub async fn apply_setting(&self, change: SettingChange) -> Result<()> {
        self.request(|reply| NavCommand::ApplySetting { change, reply })
            .await
    }

    pub async fn set_default_is_modal(&self, value: bool) -> Result<()> {
        self.apply_setting(SettingChange::DefaultIsModal(value)).await
    }

    pub async fn set_default_allow_multiple(&self, value: bool) -> Result<()> {
        self.apply_setting(SettingChange::DefaultAllowMultiple(value))
            .await
    }

    pub async fn set_default_replace_instance(&self, value: bool) -> Result<()> {
        self.apply_setting(SettingChange::DefaultReplaceInstance(value))
            .await
    }

    pub async fn set_default_idiom(&self, value: Idiom) -> Result<()> {
        self.apply_setting(SettingChange::DefaultIdiom(value)).await
    }

    pub async fn set_default_orientation(&self, value: Orientation) -> Result<()> {
        self.apply_setting(SettingChange::DefaultOrientation(value))
            .await
    }

    pub async fn set_handle_orientation_change(&self, value: bool) -> Result<()> {
        self.apply_setting(SettingChange::HandleOrientationChange(value))
            .await
    }

    pub async fn set_keep_view_model_on_orientation_change(&self, value: bool) -> Result<()> {
        self.apply_setting(SettingChange::KeepViewModelOnOrientationChange(value))
            .await
    }

    pub async fn set_idiom_override(&self, value: Option<Idiom>) -> Result<()> {
        self.apply_setting(SettingChange::IdiomOverride(value)).await
    }

    // ─────────────────────────────────────────────────────────────
    // Inspection and teardown
    // ─────────────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> Result<StackSnapshot> {
        self.request(|reply| NavCommand::Snapshot { reply }).await
    }

    /// Destroy every live page. The navigator stays usable; a new `init`
    /// starts a fresh session.
    pub async fn dispose(&self) -> Result<()> {
        self.request(|reply| NavCommand::Dispose { reply }).await
    }

    /// Stop the navigator task after disposing the session
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| NavCommand::Shutdown { reply }).await
    }
}

async fn run<D>(mut session: NavigationSession<D>, mut command_rx: mpsc::Receiver<NavCommand>)
where
    D: DisplayAdapter + Send + Sync + 'static,
{
    info!("Navigator started");
    session.lifecycle().start_plugins(&session.snapshot());

    let mut shutdown_reply = None;
    while let Some(command) = command_rx.recv().await {
        debug!("Handling {}", command.description());
        match command {
            NavCommand::Init { url, reply } => {
                let _ = reply.send(session.init(&url).await);
            }
            NavCommand::Push {
                url,
                options,
                reply,
            } => {
                let _ = reply.send(session.push(&url, options).await);
            }
            NavCommand::Pop { is_modal, reply } => {
                let _ = reply.send(session.pop(is_modal).await);
            }
            NavCommand::PopToRoot { reply } => {
                let _ = reply.send(session.pop_to_root().await);
            }
            NavCommand::OrientationChanged { orientation, reply } => {
                let _ = reply.send(session.orientation_changed(orientation).await);
            }
            NavCommand::Register {
                registration,
                replace,
                reply,
            } => {
                let result = if replace {
                    session.register_or_replace(registration)
                } else {
                    session.register(registration)
                };
                let _ = reply.send(result.map(|_| ()));
            }
            NavCommand::Deregister {
                url,
                idiom,
                orientation,
                reply,
            } => {
                let _ = reply.send(session.deregister(&url, idiom, orientation).await);
            }
            NavCommand::ApplySetting { change, reply } => {
                session.apply_setting(change);
                let _ = reply.send(Ok(()));
            }
            NavCommand::Snapshot { reply } => {
                let _ = reply.send(Ok(session.snapshot()));
            }
            NavCommand::Dispose { reply } => {
                session.dispose();
                let _ = reply.send(Ok(()));
            }
            NavCommand::Shutdown { reply } => {
                shutdown_reply = Some(reply);
                break;
            }
        }
    }

    session.dispose();
    session.lifecycle().shutdown_plugins();
    info!("Navigator stopped");

    if let Some(reply) = shutdown_reply {
        let _ = reply.send(Ok(()));
    }
}
