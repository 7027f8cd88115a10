//! Ingredient representation

use crate::artifact::ArtifactRef;
use crate::image::{resolve_image, ImageSource};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unique identifier for an ingredient
///
/// Serializes as a plain string slug (e.g. "tomato", "olive_oil", or a
/// recipe id such as "recipe_1a2b3c4d" for discovered ingredients).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(String);

impl IngredientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a slug from a display name: lowercase, spaces become underscores.
    pub fn slug(name: &str) -> Self {
        Self(name.trim().to_lowercase().replace(' ', "_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IngredientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IngredientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IngredientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where an ingredient came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Seeded at data-setup time
    Base,
    /// Created by gameplay (a successful combination or an explicit request)
    Discovered,
}

/// A named, tagged entity that can be combined into recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Tags such as "vegetable", "liquid" or "sweet". Repeated tags count
    /// once per occurrence during rule-based validation.
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl Ingredient {
    pub fn new(id: impl Into<IngredientId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            properties: Vec::new(),
            image_prompt: None,
            image_url: None,
            image_path: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.properties.push(property.into());
        self
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(properties.into_iter().map(Into::into));
        self
    }

    pub fn with_image_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.image_prompt = Some(prompt.into());
        self
    }

    /// Record a generated artifact as this ingredient's image.
    pub fn attach_artifact(&mut self, artifact: &ArtifactRef) {
        match artifact {
            ArtifactRef::Url(url) => self.image_url = Some(url.clone()),
            ArtifactRef::Path(path) => self.image_path = Some(path.to_string_lossy().into_owned()),
        }
    }

    /// The image to display for this ingredient, if any.
    pub fn image_source(&self, placeholder_dir: &Path) -> Option<ImageSource> {
        resolve_image(
            &self.id,
            self.image_url.as_deref(),
            self.image_path.as_deref(),
            placeholder_dir,
        )
    }
}
