//! pagenav - Page navigation engine
//!
//! Resolves page urls to (view, view model) variants by device idiom and
//! orientation, keeps a primary and a modal navigation stack, and sequences
//! construction and disposal around every navigation. The binary drives a
//! navigator from a TOML script and prints NDJSON.

pub mod headless;

pub use headless::{load_script, parse_script, run_script, HeadlessEvent, Script, Step};

pub use pagenav_app::{
    NavigationPlugin, NavigationSession, NavigationSettings, Navigator, PageRegistration,
    PushOptions, StackSnapshot, Variant,
};
pub use pagenav_core::{Error, Idiom, NavEvent, Orientation, Result};
