//! Page registry and url resolution
//!
//! Definitions are keyed by (lowercased url, idiom, orientation). Resolution
//! treats idiom and orientation as soft preferences: idiom is narrowed first,
//! then orientation, and each narrowing falls back to the previous candidate
//! set when it would leave nothing.

use std::sync::Arc;

use crate::config::NavigationDefaults;
use crate::variant::{Capability, Variant};
use pagenav_core::prelude::*;
use pagenav_core::{url_matches, validate_url, Args, Idiom, Orientation};

/// An immutable registered mapping from (url, idiom, orientation) to variants
#[derive(Debug, Clone)]
pub struct PageDefinition {
    url: String,
    page_variant: Variant,
    view_model_variant: Variant,
    idiom: Idiom,
    orientation: Orientation,
    default_args: Args,
}

impl PageDefinition {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn page_variant(&self) -> &Variant {
        &self.page_variant
    }

    pub fn view_model_variant(&self) -> &Variant {
        &self.view_model_variant
    }

    pub fn idiom(&self) -> &Idiom {
        &self.idiom
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn default_args(&self) -> &Args {
        &self.default_args
    }

    fn matches_exact(&self, url: &str, idiom: &Idiom, orientation: Orientation) -> bool {
        url_matches(&self.url, url) && &self.idiom == idiom && self.orientation == orientation
    }
}

/// Registration request; unspecified idiom/orientation fall back to the
/// configured defaults.
#[derive(Debug, Clone)]
pub struct PageRegistration {
    url: String,
    page_variant: Variant,
    view_model_variant: Variant,
    idiom: Option<Idiom>,
    orientation: Option<Orientation>,
    default_args: Args,
}

impl PageRegistration {
    pub fn new(url: impl Into<String>, page_variant: Variant, view_model_variant: Variant) -> Self {
        Self {
            url: url.into(),
            page_variant,
            view_model_variant,
            idiom: None,
            orientation: None,
            default_args: Vec::new(),
        }
    }

    pub fn idiom(mut self, idiom: Idiom) -> Self {
        self.idiom = Some(idiom);
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn default_args(mut self, args: Args) -> Self {
        self.default_args = args;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Validate and freeze into a definition
    fn into_definition(self, defaults: &NavigationDefaults) -> Result<PageDefinition> {
        validate_url(&self.url)?;

        if self.view_model_variant.capability() != Capability::ViewModel {
            return Err(Error::invalid_view_model_type(format!(
                "ViewModel type {} is not a valid view model",
                self.view_model_variant.name()
            )));
        }

        if self.page_variant.capability() != Capability::Page {
            return Err(Error::invalid_page_type(format!(
                "Page type {} is not a valid page",
                self.page_variant.name()
            )));
        }

        Ok(PageDefinition {
            url: self.url,
            page_variant: self.page_variant,
            view_model_variant: self.view_model_variant,
            idiom: self.idiom.unwrap_or_else(|| defaults.idiom.clone()),
            orientation: self.orientation.unwrap_or(defaults.orientation),
            default_args: self.default_args,
        })
    }
}

/// Registered page definitions, in registration order
#[derive(Debug, Default)]
pub struct Registry {
    definitions: Vec<Arc<PageDefinition>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new definition.
    ///
    /// Fails with `InvalidArgument` when the (url, idiom, orientation) triple
    /// is already registered; use [`Registry::register_or_replace`] to
    /// overwrite deliberately.
    pub fn register(
        &mut self,
        registration: PageRegistration,
        defaults: &NavigationDefaults,
    ) -> Result<Arc<PageDefinition>> {
        let definition = registration.into_definition(defaults)?;

        if self.position_exact(&definition.url, &definition.idiom, definition.orientation).is_some() {
            return Err(Error::invalid_argument(format!(
                "Page '{}' is already registered for idiom '{}' and orientation '{}'",
                definition.url, definition.idiom, definition.orientation
            )));
        }

        debug!(
            "Registered '{}' ({}/{}) -> {} + {}",
            definition.url,
            definition.idiom,
            definition.orientation,
            definition.page_variant.name(),
            definition.view_model_variant.name()
        );

        let definition = Arc::new(definition);
        self.definitions.push(definition.clone());
        Ok(definition)
    }

    /// Register a definition, overwriting an existing one for the same triple
    /// in place (its registration position is kept).
    pub fn register_or_replace(
        &mut self,
        registration: PageRegistration,
        defaults: &NavigationDefaults,
    ) -> Result<Arc<PageDefinition>> {
        let definition = Arc::new(registration.into_definition(defaults)?);

        match self.position_exact(&definition.url, &definition.idiom, definition.orientation) {
            Some(index) => {
                debug!("Replaced registration for '{}'", definition.url);
                self.definitions[index] = definition.clone();
            }
            None => self.definitions.push(definition.clone()),
        }

        Ok(definition)
    }

    /// Remove the definition for an exact triple. Returns `None` when nothing
    /// was registered for it.
    pub fn deregister(
        &mut self,
        url: &str,
        idiom: &Idiom,
        orientation: Orientation,
    ) -> Option<Arc<PageDefinition>> {
        let index = self.position_exact(url, idiom, orientation)?;
        let removed = self.definitions.remove(index);
        debug!("Deregistered '{}' ({}/{})", removed.url, idiom, orientation);
        Some(removed)
    }

    /// Resolve a url to the best definition for the given device state.
    pub fn resolve(
        &self,
        url: &str,
        idiom: &Idiom,
        orientation: Orientation,
    ) -> Result<Arc<PageDefinition>> {
        let pages: Vec<&Arc<PageDefinition>> = self
            .definitions
            .iter()
            .filter(|d| url_matches(&d.url, url))
            .collect();

        let by_idiom = narrow_or_keep(&pages, |d| &d.idiom == idiom);
        let by_orientation = narrow_or_keep(&by_idiom, |d| d.orientation == orientation);

        by_orientation
            .first()
            .map(|d| Arc::clone(d))
            .ok_or_else(|| Error::page_not_found(url, idiom.clone(), orientation))
    }

    /// Exact-triple lookup without fallback
    pub fn find_exact(
        &self,
        url: &str,
        idiom: &Idiom,
        orientation: Orientation,
    ) -> Option<Arc<PageDefinition>> {
        self.position_exact(url, idiom, orientation)
            .map(|index| self.definitions[index].clone())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PageDefinition>> {
        self.definitions.iter()
    }

    fn position_exact(&self, url: &str, idiom: &Idiom, orientation: Orientation) -> Option<usize> {
        self.definitions
            .iter()
            .position(|d| d.matches_exact(url, idiom, orientation))
    }
}

/// Keep the candidates matching `pred`, or all of them if none match
fn narrow_or_keep<'a>(
    candidates: &[&'a Arc<PageDefinition>],
    pred: impl Fn(&PageDefinition) -> bool,
) -> Vec<&'a Arc<PageDefinition>> {
    let narrowed: Vec<_> = candidates.iter().copied().filter(|d| pred(d)).collect();
    if narrowed.is_empty() {
        candidates.to_vec()
    } else {
        narrowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, ViewModel};

    #[derive(Default)]
    struct PortraitPage;
    impl Page for PortraitPage {}

    #[derive(Default)]
    struct LandscapePage;
    impl Page for LandscapePage {}

    #[derive(Default)]
    struct TabletPage;
    impl Page for TabletPage {}

    #[derive(Default)]
    struct SharedViewModel;
    impl ViewModel for SharedViewModel {}

    struct Unrelated;

    fn defaults() -> NavigationDefaults {
        NavigationDefaults::default()
    }

    fn reg<P: Page + Default>(url: &str) -> PageRegistration {
        PageRegistration::new(url, Variant::page::<P>(), Variant::view_model::<SharedViewModel>())
    }

    #[test]
    fn test_register_applies_defaults() {
        let mut registry = Registry::new();
        let def = registry.register(reg::<PortraitPage>("Root"), &defaults()).unwrap();
        assert_eq!(def.idiom(), &Idiom::Phone);
        assert_eq!(def.orientation(), Orientation::Portrait);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_empty_url() {
        let mut registry = Registry::new();
        let err = registry.register(reg::<PortraitPage>(""), &defaults()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        let err = registry.register(reg::<PortraitPage>("  "), &defaults()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_invalid_view_model() {
        let mut registry = Registry::new();
        let registration = PageRegistration::new(
            "Root",
            Variant::page::<PortraitPage>(),
            Variant::of::<Unrelated>(),
        );
        let err = registry.register(registration, &defaults()).unwrap_err();
        assert!(matches!(err, Error::InvalidViewModelType { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_invalid_page() {
        let mut registry = Registry::new();
        let registration = PageRegistration::new(
            "Root",
            Variant::of::<Unrelated>(),
            Variant::view_model::<SharedViewModel>(),
        );
        let err = registry.register(registration, &defaults()).unwrap_err();
        assert!(matches!(err, Error::InvalidPageType { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_view_model_checked_before_page() {
        let mut registry = Registry::new();
        let registration = PageRegistration::new(
            "Root",
            Variant::view_model::<SharedViewModel>(),
            Variant::page::<PortraitPage>(),
        );
        let err = registry.register(registration, &defaults()).unwrap_err();
        assert!(matches!(err, Error::InvalidViewModelType { .. }));
    }

    #[test]
    fn test_duplicate_triple_rejected_but_replace_overwrites() {
        let mut registry = Registry::new();
        registry.register(reg::<PortraitPage>("Root"), &defaults()).unwrap();

        let err = registry.register(reg::<LandscapePage>("root"), &defaults()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        registry
            .register_or_replace(reg::<LandscapePage>("Root"), &defaults())
            .unwrap();
        assert_eq!(registry.len(), 1);
        let def = registry.resolve("Root", &Idiom::Phone, Orientation::Portrait).unwrap();
        assert_eq!(def.page_variant(), &Variant::page::<LandscapePage>());
    }

    #[test]
    fn test_resolve_falls_back_on_idiom_and_orientation() {
        let mut registry = Registry::new();
        registry
            .register(
                reg::<PortraitPage>("Root")
                    .idiom(Idiom::Phone)
                    .orientation(Orientation::Portrait),
                &defaults(),
            )
            .unwrap();

        let def = registry
            .resolve("Root", &Idiom::Desktop, Orientation::Landscape)
            .unwrap();
        assert_eq!(def.page_variant(), &Variant::page::<PortraitPage>());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let mut registry = Registry::new();
        registry.register(reg::<PortraitPage>("Settings"), &defaults()).unwrap();
        assert!(registry
            .resolve("SETTINGS", &Idiom::Phone, Orientation::Portrait)
            .is_ok());
    }

    #[test]
    fn test_resolve_unknown_url_is_page_not_found() {
        let mut registry = Registry::new();
        registry.register(reg::<PortraitPage>("Root"), &defaults()).unwrap();
        let err = registry
            .resolve("Page1", &Idiom::Phone, Orientation::Portrait)
            .unwrap_err();
        assert!(matches!(err, Error::PageNotFound { .. }));
    }

    #[test]
    fn test_resolve_prefers_exact_orientation() {
        let mut registry = Registry::new();
        registry.register(reg::<PortraitPage>("Root"), &defaults()).unwrap();
        registry
            .register(
                reg::<LandscapePage>("Root").orientation(Orientation::Landscape),
                &defaults(),
            )
            .unwrap();

        let def = registry
            .resolve("Root", &Idiom::Phone, Orientation::Landscape)
            .unwrap();
        assert_eq!(def.page_variant(), &Variant::page::<LandscapePage>());

        let def = registry
            .resolve("Root", &Idiom::Phone, Orientation::Portrait)
            .unwrap();
        assert_eq!(def.page_variant(), &Variant::page::<PortraitPage>());
    }

    #[test]
    fn test_resolve_narrows_idiom_before_orientation() {
        // Tablet/Portrait vs Phone/Landscape queried as Tablet/Landscape:
        // idiom narrowing keeps only the tablet page, whose orientation then
        // doesn't match and falls back to the tablet set.
        let mut registry = Registry::new();
        registry
            .register(
                reg::<TabletPage>("Root")
                    .idiom(Idiom::Tablet)
                    .orientation(Orientation::Portrait),
                &defaults(),
            )
            .unwrap();
        registry
            .register(
                reg::<LandscapePage>("Root")
                    .idiom(Idiom::Phone)
                    .orientation(Orientation::Landscape),
                &defaults(),
            )
            .unwrap();

        let def = registry
            .resolve("Root", &Idiom::Tablet, Orientation::Landscape)
            .unwrap();
        assert_eq!(def.page_variant(), &Variant::page::<TabletPage>());
    }

    #[test]
    fn test_resolve_returns_first_in_registration_order() {
        let mut registry = Registry::new();
        registry
            .register(reg::<TabletPage>("Root").idiom(Idiom::Tablet), &defaults())
            .unwrap();
        registry
            .register(reg::<PortraitPage>("Root").idiom(Idiom::Desktop), &defaults())
            .unwrap();

        let def = registry.resolve("Root", &Idiom::Tv, Orientation::Portrait).unwrap();
        assert_eq!(def.page_variant(), &Variant::page::<TabletPage>());
    }

    #[test]
    fn test_find_exact_has_no_fallback() {
        let mut registry = Registry::new();
        registry.register(reg::<PortraitPage>("Root"), &defaults()).unwrap();

        assert!(registry
            .find_exact("root", &Idiom::Phone, Orientation::Portrait)
            .is_some());
        assert!(registry
            .find_exact("Root", &Idiom::Phone, Orientation::Landscape)
            .is_none());
    }

    #[test]
    fn test_deregister_missing_is_noop() {
        let mut registry = Registry::new();
        registry.register(reg::<PortraitPage>("Root"), &defaults()).unwrap();

        assert!(registry
            .deregister("Root", &Idiom::Tablet, Orientation::Portrait)
            .is_none());
        assert!(registry
            .deregister("Missing", &Idiom::Phone, Orientation::Portrait)
            .is_none());
        assert_eq!(registry.len(), 1);

        assert!(registry
            .deregister("Root", &Idiom::Phone, Orientation::Portrait)
            .is_some());
        assert!(registry.is_empty());
    }
}
