//! Observer hooks for navigation sessions.
//!
//! A `NavigationPlugin` is registered on a session and receives every
//! lifecycle event synchronously, in emission order, before broadcast
//! subscribers see it. For read-only observation from another task, prefer
//! `Navigator::subscribe()`.

use std::fmt;

use crate::stack::StackSnapshot;
use pagenav_core::prelude::*;
use pagenav_core::NavEvent;

/// Extension trait for navigation observers.
///
/// Every callback has a no-op default. Errors returned from a hook are
/// logged and never abort the navigation that triggered them.
///
/// # Plugin Lifecycle
///
/// 1. Plugin is registered via `NavigationSession::add_plugin()`
/// 2. `on_start()` is called when the navigator task begins
/// 3. `on_event()` is called for each emitted `NavEvent`
/// 4. `on_shutdown()` is called when the navigator task stops
pub trait NavigationPlugin: Send + Sync + fmt::Debug {
    /// Unique name for this plugin (for logging and identification).
    fn name(&self) -> &str;

    /// Called when the navigator task starts, with the stacks as they are.
    fn on_start(&self, _snapshot: &StackSnapshot) -> Result<()> {
        Ok(())
    }

    /// Called for each lifecycle event, synchronously.
    fn on_event(&self, _event: &NavEvent) -> Result<()> {
        Ok(())
    }

    /// Called once when the navigator task shuts down.
    fn on_shutdown(&self) -> Result<()> {
        Ok(())
    }
}
