//! Navigation lifecycle event definitions

use chrono::{DateTime, Local};
use serde::Serialize;

/// The navigation operation an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavOperation {
    Init,
    Push,
    OrientationChange,
}

impl NavOperation {
    /// Returns a short string label for this operation (for logging/debugging).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Push => "push",
            Self::OrientationChange => "orientation_change",
        }
    }
}

/// The six observable points of a navigation.
///
/// `StartedNavigation` and `FinishedNavigation` bracket a whole Init, Push or
/// OrientationChange operation; the four inner kinds bracket construction of
/// a single page instance, view model first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavEventKind {
    StartedNavigation,
    InitializingViewModel,
    InitializedViewModel,
    InitializingView,
    InitializedView,
    FinishedNavigation,
}

impl NavEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartedNavigation => "started_navigation",
            Self::InitializingViewModel => "initializing_view_model",
            Self::InitializedViewModel => "initialized_view_model",
            Self::InitializingView => "initializing_view",
            Self::InitializedView => "initialized_view",
            Self::FinishedNavigation => "finished_navigation",
        }
    }
}

/// Event payload delivered to every navigation listener
#[derive(Debug, Clone, Serialize)]
pub struct NavEvent {
    pub kind: NavEventKind,
    pub operation: NavOperation,
    /// The page url the event relates to
    pub url: String,
    /// Name of the view variant, once resolved
    pub page_variant: Option<String>,
    /// Name of the view model variant, once resolved
    pub view_model_variant: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl NavEvent {
    pub fn new(kind: NavEventKind, operation: NavOperation, url: impl Into<String>) -> Self {
        Self {
            kind,
            operation,
            url: url.into(),
            page_variant: None,
            view_model_variant: None,
            timestamp: Local::now(),
        }
    }

    /// Attach the resolved variant names
    pub fn with_variants(
        mut self,
        page_variant: impl Into<String>,
        view_model_variant: impl Into<String>,
    ) -> Self {
        self.page_variant = Some(page_variant.into());
        self.view_model_variant = Some(view_model_variant.into());
        self
    }

    pub fn is_bracket(&self) -> bool {
        matches!(
            self.kind,
            NavEventKind::StartedNavigation | NavEventKind::FinishedNavigation
        )
    }
}
