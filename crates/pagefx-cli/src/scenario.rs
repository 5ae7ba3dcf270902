//! TOML scenario files
//!
//! A scenario describes a page as a flat `[[element]]` list and a sequence of
//! `[[step]]`s to replay against it:
//!
//! ```toml
//! viewport_height = 800
//!
//! [[element]]
//! key = "menu"
//! tag = "div"
//! id = "nav-menu"
//!
//! [[step]]
//! action = "click"
//! target = "nav-toggle"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use pagefx_core::dom::{ElementSpec, MemoryPage};
use pagefx_core::{ElementId, Error, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    #[serde(default)]
    pub document_height: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Whether the simulated host reports intersections
    #[serde(default = "default_intersection")]
    pub intersection: bool,
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementDef>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

fn default_viewport_height() -> f64 {
    800.0
}

fn default_intersection() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementDef {
    /// Name used by steps and the report; falls back to `id`
    pub key: Option<String>,
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    /// Key of an element declared earlier
    pub parent: Option<String>,
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub fixed: bool,
}

impl ElementDef {
    pub fn name(&self) -> Option<&str> {
        self.key.as_deref().or(self.id.as_deref())
    }

    fn spec(&self) -> ElementSpec {
        let tag = if self.tag.is_empty() { "div" } else { self.tag.as_str() };
        let mut spec = ElementSpec::new(tag)
            .text(self.text.clone())
            .at(self.top, self.height)
            .span(self.left, self.width);
        if let Some(id) = &self.id {
            spec = spec.id(id.clone());
        }
        for class in &self.classes {
            spec = spec.class(class.clone());
        }
        for (name, value) in &self.attrs {
            spec = spec.attr(name.clone(), value.clone());
        }
        if self.fixed {
            spec = spec.fixed();
        }
        spec
    }
}

/// One scripted interaction
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Scroll {
        y: f64,
    },
    Click {
        target: String,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    Key {
        key: String,
        #[serde(default)]
        shift: bool,
    },
    /// Touch at `from`, move to `to`, release
    Touch {
        target: String,
        from: f64,
        to: f64,
    },
    Hover {
        target: String,
        #[serde(default)]
        leave: bool,
    },
    Load {
        #[serde(default)]
        load_time_ms: f64,
    },
    Submit {
        target: String,
    },
    Wait {
        ms: u64,
    },
    Error {
        message: String,
    },
}

/// Element names declared by a scenario
#[derive(Debug, Default)]
pub struct ElementNames(HashMap<String, ElementId>);

impl ElementNames {
    pub fn resolve(&self, name: &str) -> Result<ElementId> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| Error::Scenario(format!("unknown element '{}'", name)))
    }

    /// Reverse lookup for reports
    pub fn name_of(&self, element: ElementId) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, &id)| id == element)
            .map(|(name, _)| name.as_str())
    }
}

/// A built page plus the element names steps refer to
#[derive(Debug)]
pub struct BuiltPage {
    pub page: MemoryPage,
    pub names: ElementNames,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Materialize the element list as a [`MemoryPage`]
    pub fn build_page(&self) -> Result<BuiltPage> {
        let mut page = MemoryPage::new(self.viewport_height);
        if let Some(height) = self.document_height {
            page = page.with_document_height(height);
        }
        if let Some(location) = &self.location {
            page = page.with_location(location.clone());
        }
        if let Some(user_agent) = &self.user_agent {
            page = page.with_user_agent(user_agent.clone());
        }
        if !self.intersection {
            page = page.without_intersection();
        }

        let mut names = ElementNames::default();
        for def in &self.elements {
            let parent = match &def.parent {
                Some(parent) => Some(names.0.get(parent).copied().ok_or_else(|| {
                    Error::Scenario(format!("parent '{}' must be declared before its children", parent))
                })?),
                None => None,
            };
            let element = page.insert(def.spec(), parent);
            if let Some(name) = def.name() {
                if names.0.insert(name.to_string(), element).is_some() {
                    return Err(Error::Scenario(format!("duplicate element name '{}'", name)));
                }
            }
        }

        Ok(BuiltPage { page, names })
    }
}
