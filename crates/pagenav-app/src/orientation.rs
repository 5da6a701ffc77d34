//! Orientation change decisions
//!
//! The reactor only decides; the session carries the plan out through the
//! same stack and lifecycle machinery as a push.

use crate::page::PageInstance;
use crate::registry::PageDefinition;
use pagenav_core::Orientation;

/// Why an orientation change left the current page alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnchangedReason {
    /// The best match is the variant already shown
    SameVariant,
    /// The best match was not registered for the new orientation
    NotTailored,
}

/// What to do with the visible page after a rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationPlan {
    Unchanged(UnchangedReason),
    /// Build a new view bound to the existing view model
    RebuildView,
    /// Build a fresh view model and view
    RebuildInstance,
}

impl OrientationPlan {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, OrientationPlan::Unchanged(_))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrientationReactor;

impl OrientationReactor {
    /// Decide how to present `current` under `orientation`, given the
    /// definition its url resolves to under the new device state.
    pub fn plan(
        current: &PageInstance,
        resolved: &PageDefinition,
        orientation: Orientation,
        keep_view_model: bool,
    ) -> OrientationPlan {
        if resolved.page_variant() == current.page_variant() {
            return OrientationPlan::Unchanged(UnchangedReason::SameVariant);
        }

        if resolved.orientation() != orientation {
            return OrientationPlan::Unchanged(UnchangedReason::NotTailored);
        }

        if keep_view_model && resolved.view_model_variant() == current.view_model_variant() {
            OrientationPlan::RebuildView
        } else {
            OrientationPlan::RebuildInstance
        }
    }

    /// True when a page exposed by a pop was built for another orientation
    pub fn needs_recheck(exposed: &PageInstance, device_orientation: Orientation) -> bool {
        exposed.current_orientation() != device_orientation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigationDefaults;
    use crate::lifecycle::LifecycleCoordinator;
    use crate::registry::{PageRegistration, Registry};
    use crate::test_utils::LifecycleProbe;
    use pagenav_core::{Idiom, NavOperation};

    struct Fixture {
        probe: LifecycleProbe,
        registry: Registry,
        lifecycle: LifecycleCoordinator,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                probe: LifecycleProbe::new(),
                registry: Registry::new(),
                lifecycle: LifecycleCoordinator::new(16),
            }
        }

        fn register(&mut self, page: &str, vm: &str, orientation: Orientation) {
            let registration = PageRegistration::new(
                "Root",
                self.probe.page_variant(page),
                self.probe.view_model_variant(vm),
            )
            .orientation(orientation);
            self.registry
                .register(registration, &NavigationDefaults::default())
                .unwrap();
        }

        fn portrait_instance(&self) -> PageInstance {
            let def = self
                .registry
                .resolve("Root", &Idiom::Phone, Orientation::Portrait)
                .unwrap();
            self.lifecycle
                .create_instance(&def, Vec::new(), Orientation::Portrait, NavOperation::Init)
                .unwrap()
        }

        fn plan(&self, current: &PageInstance, keep: bool) -> OrientationPlan {
            let def = self
                .registry
                .resolve("Root", &Idiom::Phone, Orientation::Landscape)
                .unwrap();
            OrientationReactor::plan(current, &def, Orientation::Landscape, keep)
        }
    }

    #[test]
    fn test_same_variant_is_unchanged() {
        let mut f = Fixture::new();
        f.register("RootPage", "RootViewModel", Orientation::Portrait);
        let current = f.portrait_instance();
        assert_eq!(
            f.plan(&current, true),
            OrientationPlan::Unchanged(UnchangedReason::SameVariant)
        );
    }

    #[test]
    fn test_shared_view_model_rebuilds_view() {
        let mut f = Fixture::new();
        f.register("RootPage", "RootViewModel", Orientation::Portrait);
        f.register("RootLandscape", "RootViewModel", Orientation::Landscape);
        let current = f.portrait_instance();

        assert_eq!(f.plan(&current, true), OrientationPlan::RebuildView);
        assert_eq!(f.plan(&current, false), OrientationPlan::RebuildInstance);
    }

    #[test]
    fn test_different_view_model_rebuilds_instance() {
        let mut f = Fixture::new();
        f.register("RootPage", "RootViewModel", Orientation::Portrait);
        f.register("RootLandscape", "LandscapeViewModel", Orientation::Landscape);
        let current = f.portrait_instance();

        assert_eq!(f.plan(&current, true), OrientationPlan::RebuildInstance);
    }

    #[test]
    fn test_untailored_match_is_unchanged() {
        let mut f = Fixture::new();
        f.register("RootPage", "RootViewModel", Orientation::Portrait);
        let current = f.portrait_instance();

        // A different variant registered for another portrait idiom is not an improvement
        let other = PageRegistration::new(
            "Root",
            f.probe.page_variant("TabletRoot"),
            f.probe.view_model_variant("RootViewModel"),
        )
        .idiom(Idiom::Tablet);
        let def = f
            .registry
            .register(other, &NavigationDefaults::default())
            .unwrap();

        let plan = OrientationReactor::plan(&current, &def, Orientation::Landscape, true);
        assert_eq!(plan, OrientationPlan::Unchanged(UnchangedReason::NotTailored));
        assert!(plan.is_unchanged());
    }

    #[test]
    fn test_needs_recheck() {
        let mut f = Fixture::new();
        f.register("RootPage", "RootViewModel", Orientation::Portrait);
        let current = f.portrait_instance();

        assert!(!OrientationReactor::needs_recheck(&current, Orientation::Portrait));
        assert!(OrientationReactor::needs_recheck(&current, Orientation::Landscape));
    }
}
