//! Visual stack transitions

use crate::page::PageInstance;
use pagenav_core::prelude::*;

/// The toolkit side of navigation.
///
/// The session calls these after committing a stack mutation and treats an
/// error as a failed transition: it is returned to the caller, the stack is
/// not rolled back and no `FinishedNavigation` is emitted.
#[trait_variant::make(DisplayAdapter: Send)]
pub trait LocalDisplayAdapter {
    /// Show `instance` as the only page, replacing whatever was displayed
    async fn display_root(&self, instance: &PageInstance) -> Result<()>;

    /// Show `instance` on top of the primary or modal stack
    async fn display_push(&self, instance: &PageInstance, modal: bool) -> Result<()>;

    /// Drop the top page of the primary or modal stack
    async fn display_pop(&self, modal: bool) -> Result<()>;

    /// Drop every modal page and every primary page above the root
    async fn display_pop_to_root(&self) -> Result<()>;

    /// Drop `instance` from wherever it is shown
    async fn display_remove(&self, instance: &PageInstance) -> Result<()>;
}
