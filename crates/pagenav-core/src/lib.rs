//! # pagenav-core - Core Domain Types
//!
//! Foundation crate for pagenav. Provides the device/form-factor types,
//! the navigation error taxonomy, lifecycle event definitions and logging
//! setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, toml, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Idiom`] - Device form factor (Phone, Tablet, Desktop, TV, Watch, custom)
//! - [`Orientation`] - Portrait or Landscape
//! - [`StackKind`] - Primary or modal navigation stack
//! - [`Args`] - Opaque arguments passed to pages and view models
//!
//! ### Events (`events`)
//! - [`NavEvent`] - Payload of every lifecycle notification
//! - [`NavEventKind`] - The six lifecycle points
//! - [`NavOperation`] - Which operation raised the event
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use pagenav_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all pagenav crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use events::{NavEvent, NavEventKind, NavOperation};
pub use types::{url_matches, validate_url, Args, Idiom, Orientation, StackKind};
