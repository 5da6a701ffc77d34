//! pagenav-app - Registry, stacks and lifecycle orchestration for pagenav
//!
//! This crate resolves page urls to registered (view, view model) variants,
//! keeps the primary and modal navigation stacks, sequences construction and
//! disposal around every stack mutation, and reacts to orientation changes.
//! [`NavigationSession`] is the state machine; [`Navigator`] runs it on a
//! single task and hands out cloneable handles.

pub mod config;
pub mod lifecycle;
pub mod navigator;
pub mod orientation;
pub mod page;
pub mod plugin;
pub mod registry;
pub mod services;
pub mod session;
pub mod stack;
pub mod variant;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

// Re-export primary types
pub use config::{NavigationSettings, SettingChange};
pub use lifecycle::LifecycleCoordinator;
pub use navigator::{NavCommand, Navigator};
pub use orientation::{OrientationPlan, OrientationReactor};
pub use page::{InstanceId, InstanceSummary, Page, PageInstance, ViewModel, ViewModelHandle};
pub use plugin::NavigationPlugin;
pub use registry::{PageDefinition, PageRegistration, Registry};
pub use services::{DeviceContext, DisplayAdapter, LocalDisplayAdapter, StaticDevice};
pub use session::{NavigationSession, PushOptions};
pub use stack::{NavigationStack, StackSnapshot};
pub use variant::{Capability, Variant};

// Re-export core types used in the public surface
pub use pagenav_core::{Args, Idiom, NavEvent, NavEventKind, NavOperation, Orientation, StackKind};
