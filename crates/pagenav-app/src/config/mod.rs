//! Configuration for pagenav
//!
//! Supports:
//! - `.pagenav/config.toml` - Navigation defaults and orientation behavior
//! - Runtime adjustments through [`SettingChange`]

pub mod settings;
pub mod types;

pub use settings::{init_config_dir, load_settings, parse_settings, save_settings};
pub use types::*;
