//! Configuration types for pagenav
//!
//! Defines:
//! - `NavigationSettings` - All navigation behavior settings
//! - `NavigationDefaults` - Values used for options a caller leaves unspecified
//! - `SettingChange` - A single runtime adjustment, sent through the navigator

use serde::{Deserialize, Serialize};

use pagenav_core::{Idiom, Orientation};

/// Navigation settings (.pagenav/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NavigationSettings {
    /// Idiom used for resolution instead of whatever the device reports
    #[serde(default)]
    pub idiom_override: Option<Idiom>,

    #[serde(default)]
    pub defaults: NavigationDefaults,

    #[serde(default)]
    pub orientation: OrientationSettings,

    #[serde(default)]
    pub events: EventSettings,
}

/// Defaults applied to push options and registrations
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NavigationDefaults {
    /// Open pages on the modal stack
    #[serde(default)]
    pub is_modal: bool,

    /// Allow several instances of the same url in one stack
    #[serde(default)]
    pub allow_multiple: bool,

    /// Replace an already open instance with a freshly built one
    #[serde(default)]
    pub replace_instance: bool,

    /// Target idiom for registrations that don't name one
    #[serde(default)]
    pub idiom: Idiom,

    /// Target orientation for registrations that don't name one
    #[serde(default)]
    pub orientation: Orientation,
}

impl Default for NavigationDefaults {
    fn default() -> Self {
        Self {
            is_modal: false,
            allow_multiple: false,
            replace_instance: false,
            idiom: Idiom::Phone,
            orientation: Orientation::Portrait,
        }
    }
}

/// Orientation handling settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrientationSettings {
    /// React to orientation notifications by swapping in a better-matching view
    #[serde(default = "default_true")]
    pub handle_automatically: bool,

    /// Carry the existing view model over to the new view when possible
    #[serde(default = "default_true")]
    pub keep_view_model: bool,
}

impl Default for OrientationSettings {
    fn default() -> Self {
        Self {
            handle_automatically: true,
            keep_view_model: true,
        }
    }
}

/// Event delivery settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventSettings {
    /// Capacity of the lifecycle event broadcast channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Capacity of the navigator command queue
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            command_capacity: default_command_capacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    256
}

fn default_command_capacity() -> usize {
    64
}

/// A single runtime settings adjustment
#[derive(Debug, Clone, PartialEq)]
pub enum SettingChange {
    DefaultIsModal(bool),
    DefaultAllowMultiple(bool),
    DefaultReplaceInstance(bool),
    DefaultIdiom(Idiom),
    DefaultOrientation(Orientation),
    HandleOrientationChange(bool),
    KeepViewModelOnOrientationChange(bool),
    IdiomOverride(Option<Idiom>),
}

impl SettingChange {
    pub fn apply(self, settings: &mut NavigationSettings) {
        match self {
            SettingChange::DefaultIsModal(value) => settings.defaults.is_modal = value,
            SettingChange::DefaultAllowMultiple(value) => settings.defaults.allow_multiple = value,
            SettingChange::DefaultReplaceInstance(value) => {
                settings.defaults.replace_instance = value
            }
            SettingChange::DefaultIdiom(value) => settings.defaults.idiom = value,
            SettingChange::DefaultOrientation(value) => settings.defaults.orientation = value,
            SettingChange::HandleOrientationChange(value) => {
                settings.orientation.handle_automatically = value
            }
            SettingChange::KeepViewModelOnOrientationChange(value) => {
                settings.orientation.keep_view_model = value
            }
            SettingChange::IdiomOverride(value) => settings.idiom_override = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = NavigationSettings::default();
        assert!(!settings.defaults.is_modal);
        assert!(!settings.defaults.allow_multiple);
        assert!(!settings.defaults.replace_instance);
        assert_eq!(settings.defaults.idiom, Idiom::Phone);
        assert_eq!(settings.defaults.orientation, Orientation::Portrait);
        assert!(settings.orientation.handle_automatically);
        assert!(settings.orientation.keep_view_model);
        assert!(settings.idiom_override.is_none());
        assert_eq!(settings.events.channel_capacity, 256);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
idiom_override = "kiosk"

[defaults]
allow_multiple = true
idiom = "tablet"

[orientation]
keep_view_model = false
"#;
        let settings: NavigationSettings = toml::from_str(toml).unwrap();
        assert_eq!(settings.idiom_override, Some(Idiom::custom("kiosk")));
        assert!(settings.defaults.allow_multiple);
        assert_eq!(settings.defaults.idiom, Idiom::Tablet);
        assert_eq!(settings.defaults.orientation, Orientation::Portrait);
        assert!(settings.orientation.handle_automatically);
        assert!(!settings.orientation.keep_view_model);
    }

    #[test]
    fn test_setting_change_apply() {
        let mut settings = NavigationSettings::default();
        SettingChange::DefaultIsModal(true).apply(&mut settings);
        SettingChange::DefaultOrientation(Orientation::Landscape).apply(&mut settings);
        SettingChange::HandleOrientationChange(false).apply(&mut settings);
        SettingChange::IdiomOverride(Some(Idiom::Desktop)).apply(&mut settings);

        assert!(settings.defaults.is_modal);
        assert_eq!(settings.defaults.orientation, Orientation::Landscape);
        assert!(!settings.orientation.handle_automatically);
        assert_eq!(settings.idiom_override, Some(Idiom::Desktop));
    }
}
