//! Constructable page and view model variants
//!
//! A [`Variant`] stands in for "a type that can be instantiated on demand".
//! It carries a stable identity, a display name and, when the underlying
//! type implements [`Page`] or [`ViewModel`], the constructor closure for it.
//! The capability tag is what registration validates against.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::page::{Page, ViewModel};
use pagenav_core::prelude::*;

type PageFactory = Arc<dyn Fn() -> Result<Box<dyn Page>> + Send + Sync>;
type ViewModelFactory = Arc<dyn Fn() -> Result<Box<dyn ViewModel>> + Send + Sync>;

/// Identity used to compare variants
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantId {
    Type(TypeId),
    Named(String),
}

/// Which capability set a variant satisfies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Page,
    ViewModel,
    /// The type implements neither capability
    None,
}

#[derive(Clone)]
enum Constructor {
    Page(PageFactory),
    ViewModel(ViewModelFactory),
    None,
}

/// A constructable identifier for a page or view model type
#[derive(Clone)]
pub struct Variant {
    id: VariantId,
    name: String,
    constructor: Constructor,
}

impl Variant {
    /// Page variant constructed through `Default`
    pub fn page<P: Page + Default>() -> Self {
        Self::page_with(|| Ok(P::default()))
    }

    /// Page variant with a fallible constructor
    pub fn page_with<P, F>(factory: F) -> Self
    where
        P: Page,
        F: Fn() -> Result<P> + Send + Sync + 'static,
    {
        Self {
            id: VariantId::Type(TypeId::of::<P>()),
            name: short_type_name::<P>(),
            constructor: Constructor::Page(Arc::new(move || {
                factory().map(|page| Box::new(page) as Box<dyn Page>)
            })),
        }
    }

    /// Page variant identified by name rather than by type
    pub fn named_page<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Page>> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            id: VariantId::Named(name.clone()),
            name,
            constructor: Constructor::Page(Arc::new(factory)),
        }
    }

    /// View model variant constructed through `Default`
    pub fn view_model<V: ViewModel + Default>() -> Self {
        Self::view_model_with(|| Ok(V::default()))
    }

    /// View model variant with a fallible constructor
    pub fn view_model_with<V, F>(factory: F) -> Self
    where
        V: ViewModel,
        F: Fn() -> Result<V> + Send + Sync + 'static,
    {
        Self {
            id: VariantId::Type(TypeId::of::<V>()),
            name: short_type_name::<V>(),
            constructor: Constructor::ViewModel(Arc::new(move || {
                factory().map(|vm| Box::new(vm) as Box<dyn ViewModel>)
            })),
        }
    }

    /// View model variant identified by name rather than by type
    pub fn named_view_model<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ViewModel>> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            id: VariantId::Named(name.clone()),
            name,
            constructor: Constructor::ViewModel(Arc::new(factory)),
        }
    }

    /// A type token without any capability. Registration rejects it.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: VariantId::Type(TypeId::of::<T>()),
            name: short_type_name::<T>(),
            constructor: Constructor::None,
        }
    }

    pub fn id(&self) -> &VariantId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capability(&self) -> Capability {
        match self.constructor {
            Constructor::Page(_) => Capability::Page,
            Constructor::ViewModel(_) => Capability::ViewModel,
            Constructor::None => Capability::None,
        }
    }

    pub(crate) fn construct_page(&self) -> Result<Box<dyn Page>> {
        match &self.constructor {
            Constructor::Page(factory) => factory(),
            _ => Err(Error::instantiation(&self.name, "variant is not a page")),
        }
    }

    pub(crate) fn construct_view_model(&self) -> Result<Box<dyn ViewModel>> {
        match &self.constructor {
            Constructor::ViewModel(factory) => factory(),
            _ => Err(Error::instantiation(&self.name, "variant is not a view model")),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variant {}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("name", &self.name)
            .field("capability", &self.capability())
            .finish()
    }
}

fn short_type_name<T>() -> String {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
