//! Selections
//!
//! Each optional component of a frame is either switched off or switched on with
//! a chosen material. "Switched on but nothing chosen" cannot be represented.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::materials::MaterialReference;

/// Component category of a framing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Moulding
    Frame,

    /// Glass or acrylic glazing
    Glass,

    /// Backing board (MDF)
    Substrate,

    /// Print paper or adhesive
    Paper,

    /// Passe-partout mat
    PassePartout,

    /// Ready-made product sold with the job
    ReadyMade,

    /// Promotional item
    Promotion,

    /// Hanging hardware and other per-piece extras; may repeat
    Accessory,
}

impl Category {
    /// Single-choice categories, in bill-of-materials order.
    pub const SINGLE: [Category; 7] = [
        Category::Frame,
        Category::Glass,
        Category::Substrate,
        Category::Paper,
        Category::PassePartout,
        Category::ReadyMade,
        Category::Promotion,
    ];

    /// Whether the category may appear more than once in an order.
    pub fn is_repeatable(self) -> bool {
        matches!(self, Category::Accessory)
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Frame => "Frame",
            Category::Glass => "Glass",
            Category::Substrate => "Substrate",
            Category::Paper => "Paper/Adhesive",
            Category::PassePartout => "Passe-partout",
            Category::ReadyMade => "Ready-made",
            Category::Promotion => "Promotion",
            Category::Accessory => "Accessory",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Material choice for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Category not used
    #[default]
    Disabled,

    /// Category used with this material
    Enabled(MaterialReference),
}

impl Selection {
    /// The chosen material, if enabled.
    pub fn material(&self) -> Option<&MaterialReference> {
        match self {
            Selection::Disabled => None,
            Selection::Enabled(material) => Some(material),
        }
    }

    /// Check if the category is used.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Selection::Enabled(_))
    }
}

impl From<Option<MaterialReference>> for Selection {
    fn from(material: Option<MaterialReference>) -> Self {
        material.map_or(Selection::Disabled, Selection::Enabled)
    }
}

/// All material choices of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialSelections {
    frame: Selection,
    glass: Selection,
    substrate: Selection,
    paper: Selection,
    passe_partout: Selection,
    ready_made: Selection,
    promotion: Selection,
    accessories: SmallVec<[MaterialReference; 4]>,
}

impl MaterialSelections {
    /// Create selections with every category disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `category` with `material`.
    ///
    /// Accessories are appended rather than replaced.
    #[must_use]
    pub fn with(mut self, category: Category, material: MaterialReference) -> Self {
        self.set(category, Selection::Enabled(material));
        self
    }

    /// Set the selection for `category`.
    ///
    /// For [`Category::Accessory`] an enabled selection is appended and a
    /// disabled one clears every accessory.
    pub fn set(&mut self, category: Category, selection: Selection) {
        if let Some(slot) = self.slot_mut(category) {
            *slot = selection;
            return;
        }

        match selection {
            Selection::Enabled(material) => self.accessories.push(material),
            Selection::Disabled => self.accessories.clear(),
        }
    }

    /// Selection for a single-choice category; `None` for accessories.
    pub fn get(&self, category: Category) -> Option<&Selection> {
        match category {
            Category::Frame => Some(&self.frame),
            Category::Glass => Some(&self.glass),
            Category::Substrate => Some(&self.substrate),
            Category::Paper => Some(&self.paper),
            Category::PassePartout => Some(&self.passe_partout),
            Category::ReadyMade => Some(&self.ready_made),
            Category::Promotion => Some(&self.promotion),
            Category::Accessory => None,
        }
    }

    /// The chosen frame moulding, if any.
    pub fn frame(&self) -> Option<&MaterialReference> {
        self.frame.material()
    }

    /// Selected accessories in the order they were added.
    pub fn accessories(&self) -> &[MaterialReference] {
        &self.accessories
    }

    /// Enabled materials in bill-of-materials order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &MaterialReference)> {
        Category::SINGLE
            .into_iter()
            .filter_map(|category| {
                self.get(category)
                    .and_then(Selection::material)
                    .map(|material| (category, material))
            })
            .chain(
                self.accessories
                    .iter()
                    .map(|material| (Category::Accessory, material)),
            )
    }

    fn slot_mut(&mut self, category: Category) -> Option<&mut Selection> {
        match category {
            Category::Frame => Some(&mut self.frame),
            Category::Glass => Some(&mut self.glass),
            Category::Substrate => Some(&mut self.substrate),
            Category::Paper => Some(&mut self.paper),
            Category::PassePartout => Some(&mut self.passe_partout),
            Category::ReadyMade => Some(&mut self.ready_made),
            Category::Promotion => Some(&mut self.promotion),
            Category::Accessory => None,
        }
    }
}

/// One row of the order form: a category toggle and the material picked for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectionRequest {
    /// Category
    pub category: Category,

    /// Checkbox state
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Catalog id from the dropdown
    #[serde(default)]
    pub material: Option<String>,
}

impl SelectionRequest {
    /// An enabled row with a material chosen.
    pub fn enabled(category: Category, material: impl Into<String>) -> Self {
        Self {
            category,
            enabled: true,
            material: Some(material.into()),
        }
    }

    /// A row with the checkbox cleared.
    pub fn disabled(category: Category) -> Self {
        Self {
            category,
            enabled: false,
            material: None,
        }
    }

    /// Material id to resolve, if the row is switched on and has a material.
    pub fn chosen_material(&self) -> Option<&str> {
        if self.enabled {
            self.material.as_deref()
        } else {
            None
        }
    }
}

fn enabled_by_default() -> bool {
    true
}
