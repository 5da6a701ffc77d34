//! Device introspection

use std::sync::{Arc, Mutex, PoisonError};

use pagenav_core::{Idiom, Orientation};

/// Reports the device form factor and rotation.
///
/// Must be cheap and safe to call synchronously from the navigator task.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceContext: Send + Sync {
    fn current_idiom(&self) -> Idiom;

    fn current_orientation(&self) -> Orientation;
}

/// A device whose state is set by the host rather than sensed.
///
/// Clones share state, so one clone can be handed to the session while
/// another is updated from outside.
#[derive(Debug, Clone)]
pub struct StaticDevice {
    state: Arc<Mutex<(Idiom, Orientation)>>,
}

impl StaticDevice {
    pub fn new(idiom: Idiom, orientation: Orientation) -> Self {
        Self {
            state: Arc::new(Mutex::new((idiom, orientation))),
        }
    }

    pub fn set_idiom(&self, idiom: Idiom) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).0 = idiom;
    }

    pub fn set_orientation(&self, orientation: Orientation) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).1 = orientation;
    }
}

impl Default for StaticDevice {
    fn default() -> Self {
        Self::new(Idiom::Phone, Orientation::Portrait)
    }
}

impl DeviceContext for StaticDevice {
    fn current_idiom(&self) -> Idiom {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .0
            .clone()
    }

    fn current_orientation(&self) -> Orientation {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).1
    }
}
