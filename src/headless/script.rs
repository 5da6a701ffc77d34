//! Navigation script format
//!
//! ```toml
//! [device]
//! idiom = "phone"
//! orientation = "portrait"
//!
//! [settings.orientation]
//! keep_view_model = true
//!
//! [[pages]]
//! url = "Root"
//! view = "RootPage"
//! view_model = "RootViewModel"
//!
//! [[pages]]
//! url = "Root"
//! view = "RootLandscapePage"
//! view_model = "RootViewModel"
//! orientation = "landscape"
//!
//! [[steps]]
//! action = "init"
//! url = "Root"
//!
//! [[steps]]
//! action = "rotate"
//! orientation = "landscape"
//! ```

use std::path::Path;

use serde::Deserialize;

use pagenav_app::page::{Page, ViewModel, ViewModelHandle};
use pagenav_app::{NavigationSettings, PageRegistration, Variant};
use pagenav_core::prelude::*;
use pagenav_core::{Args, Idiom, Orientation};

/// A complete headless run description
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub device: DeviceSection,

    /// Replaces `.pagenav/config.toml` when present
    pub settings: Option<NavigationSettings>,

    #[serde(default)]
    pub pages: Vec<PageEntry>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Simulated device state at the start of the run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceSection {
    #[serde(default)]
    pub idiom: Idiom,

    #[serde(default)]
    pub orientation: Orientation,
}

/// One page registration
#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    pub url: String,
    pub view: String,
    pub view_model: String,
    pub idiom: Option<Idiom>,
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub default_args: Args,
}

impl PageEntry {
    /// Build a registration backed by generic script pages
    pub fn to_registration(&self) -> PageRegistration {
        let mut registration = PageRegistration::new(
            self.url.clone(),
            Variant::named_page(self.view.clone(), || {
                Ok(Box::new(ScriptPage::default()) as Box<dyn Page>)
            }),
            Variant::named_view_model(self.view_model.clone(), || {
                Ok(Box::new(ScriptViewModel::default()) as Box<dyn ViewModel>)
            }),
        )
        .default_args(self.default_args.clone());

        if let Some(idiom) = &self.idiom {
            registration = registration.idiom(idiom.clone());
        }
        if let Some(orientation) = self.orientation {
            registration = registration.orientation(orientation);
        }
        registration
    }
}

/// One scripted action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Init {
        url: String,
    },
    Push {
        url: String,
        modal: Option<bool>,
        allow_multiple: Option<bool>,
        replace: Option<bool>,
        #[serde(default)]
        args: Args,
    },
    Pop {
        modal: Option<bool>,
    },
    PopToRoot,
    Rotate {
        orientation: Orientation,
    },
    Deregister {
        url: String,
        idiom: Option<Idiom>,
        orientation: Option<Orientation>,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Init { .. } => "init",
            Step::Push { .. } => "push",
            Step::Pop { .. } => "pop",
            Step::PopToRoot => "pop_to_root",
            Step::Rotate { .. } => "rotate",
            Step::Deregister { .. } => "deregister",
        }
    }
}

/// Load a script from a TOML file
pub fn load_script(path: &Path) -> Result<Script> {
    let content = std::fs::read_to_string(path)?;
    let script = parse_script(&content)?;
    debug!(
        "Loaded script {:?}: {} pages, {} steps",
        path,
        script.pages.len(),
        script.steps.len()
    );
    Ok(script)
}

pub fn parse_script(content: &str) -> Result<Script> {
    Ok(toml::from_str(content)?)
}

/// View used for every scripted page variant
#[derive(Default)]
struct ScriptPage {
    args: Args,
    url: String,
    view_model: Option<ViewModelHandle>,
}

impl Page for ScriptPage {
    fn set_args(&mut self, args: &Args) {
        self.args = args.clone();
    }

    fn bind_view_model(&mut self, view_model: &ViewModelHandle) {
        self.view_model = Some(view_model.clone());
    }

    fn unbind_view_model(&mut self) {
        self.view_model = None;
    }

    fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    fn dispose(&mut self) {
        trace!("Script page '{}' disposed ({} args)", self.url, self.args.len());
    }
}

/// View model used for every scripted view model variant
#[derive(Default)]
struct ScriptViewModel {
    args: Args,
    orientation: Option<Orientation>,
}

impl ViewModel for ScriptViewModel {
    fn set_args(&mut self, args: &Args) {
        self.args = args.clone();
    }

    fn orientation_changed(&mut self, orientation: Orientation) {
        self.orientation = Some(orientation);
    }

    fn dispose(&mut self) {
        trace!(
            "Script view model disposed ({} args, rotated to {:?})",
            self.args.len(),
            self.orientation
        );
    }
}
