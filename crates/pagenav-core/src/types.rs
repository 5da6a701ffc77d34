//! Core domain types for pagenav

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque arguments handed to pages and view models.
///
/// Arguments are set once when an instance is constructed and never
/// re-assigned afterwards.
pub type Args = Vec<serde_json::Value>;

/// Device form-factor classification
///
/// Serialized as a lowercase name; unknown names round-trip as
/// [`Idiom::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Idiom {
    #[default]
    Phone,
    Tablet,
    Desktop,
    Tv,
    Watch,
    /// Application-defined form factor (e.g. "car", "kiosk"), lowercased.
    /// Build it with [`Idiom::custom`].
    Custom(String),
}

impl Idiom {
    /// Create an idiom from a name. Known names map to their variant and
    /// custom names are lowercased, so `custom("Car") == custom("car")`.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Idiom::Phone => "phone",
            Idiom::Tablet => "tablet",
            Idiom::Desktop => "desktop",
            Idiom::Tv => "tv",
            Idiom::Watch => "watch",
            Idiom::Custom(name) => name,
        }
    }
}

impl From<String> for Idiom {
    fn from(value: String) -> Self {
        let name = value.to_lowercase();
        match name.as_str() {
            "phone" => Idiom::Phone,
            "tablet" => Idiom::Tablet,
            "desktop" => Idiom::Desktop,
            "tv" => Idiom::Tv,
            "watch" => Idiom::Watch,
            _ => Idiom::Custom(name),
        }
    }
}

impl From<&str> for Idiom {
    fn from(value: &str) -> Self {
        Idiom::from(value.to_string())
    }
}

impl From<Idiom> for String {
    fn from(value: Idiom) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Idiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Idiom::Phone => write!(f, "Phone"),
            Idiom::Tablet => write!(f, "Tablet"),
            Idiom::Desktop => write!(f, "Desktop"),
            Idiom::Tv => write!(f, "TV"),
            Idiom::Watch => write!(f, "Watch"),
            Idiom::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Display rotation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// The other orientation
    pub fn rotated(self) -> Self {
        match self {
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Landscape => Orientation::Portrait,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "Portrait"),
            Orientation::Landscape => write!(f, "Landscape"),
        }
    }
}

/// Which of the two navigation stacks an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackKind {
    Primary,
    Modal,
}

impl StackKind {
    pub fn from_modal(is_modal: bool) -> Self {
        if is_modal {
            StackKind::Modal
        } else {
            StackKind::Primary
        }
    }

    pub fn is_modal(self) -> bool {
        self == StackKind::Modal
    }
}

/// Case-insensitive page url comparison
pub fn url_matches(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Reject empty or whitespace-only urls
pub fn validate_url(url: &str) -> crate::error::Result<()> {
    if url.trim().is_empty() {
        return Err(crate::error::Error::invalid_argument(
            "'url' cannot be empty or whitespace.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idiom_from_known_names_is_case_insensitive() {
        assert_eq!(Idiom::from("Tablet"), Idiom::Tablet);
        assert_eq!(Idiom::from("TV"), Idiom::Tv);
        assert_eq!(Idiom::from("watch"), Idiom::Watch);
    }

    #[test]
    fn test_idiom_unknown_name_is_custom() {
        assert_eq!(Idiom::from("car"), Idiom::custom("car"));
        assert_eq!(Idiom::custom("car").to_string(), "car");
    }

    #[test]
    fn test_custom_idiom_names_are_normalized() {
        assert_eq!(Idiom::from("Car"), Idiom::from("car"));
        assert_eq!(Idiom::custom("KIOSK"), Idiom::custom("kiosk"));
        assert_eq!(Idiom::custom("Car").as_str(), "car");
        assert_eq!(Idiom::custom("phone"), Idiom::Phone);
        assert_eq!(Idiom::custom("Tablet"), Idiom::Tablet);

        for idiom in [Idiom::custom("phone"), Idiom::custom("Car")] {
            let json = serde_json::to_string(&idiom).unwrap();
            let back: Idiom = serde_json::from_str(&json).unwrap();
            assert_eq!(back, idiom);
        }
    }

    #[test]
    fn test_idiom_serde_as_string() {
        let json = serde_json::to_string(&Idiom::Desktop).unwrap();
        assert_eq!(json, "\"desktop\"");
        let idiom: Idiom = serde_json::from_str("\"kiosk\"").unwrap();
        assert_eq!(idiom, Idiom::custom("kiosk"));
    }

    #[test]
    fn test_orientation_defaults_and_rotation() {
        assert_eq!(Orientation::default(), Orientation::Portrait);
        assert_eq!(Orientation::Portrait.rotated(), Orientation::Landscape);
        assert_eq!(Orientation::Landscape.to_string(), "Landscape");
    }

    #[test]
    fn test_url_matches_ignores_case() {
        assert!(url_matches("Root", "root"));
        assert!(url_matches("Détail", "détail"));
        assert!(!url_matches("Root", "Root2"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("Root").is_ok());
        assert!(matches!(
            validate_url(""),
            Err(crate::error::Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            validate_url("   "),
            Err(crate::error::Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_stack_kind_from_modal() {
        assert_eq!(StackKind::from_modal(true), StackKind::Modal);
        assert!(!StackKind::from_modal(false).is_modal());
    }
}
