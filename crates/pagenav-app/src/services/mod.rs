//! Collaborator seams of the navigation engine
//!
//! ```text
//! ┌───────────────┐   idiom / orientation   ┌───────────────────┐
//! │ DeviceContext │ ──────────────────────▶ │                   │
//! └───────────────┘                         │ NavigationSession │
//! ┌───────────────┐   push / pop / remove   │                   │
//! │ DisplayAdapter│ ◀────────────────────── │                   │
//! └───────────────┘                         └───────────────────┘
//! ```
//!
//! - [`DeviceContext`]: synchronous device introspection, queried at
//!   resolution time
//! - [`DisplayAdapter`]: the visual stack transition, awaited before a
//!   navigation is reported finished

mod device;
mod display;

pub use device::{DeviceContext, StaticDevice};
pub use display::{DisplayAdapter, LocalDisplayAdapter};

#[cfg(test)]
pub use device::MockDeviceContext;
