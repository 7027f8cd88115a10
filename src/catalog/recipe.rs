//! Recipe representation with content-derived identity

use super::ingredient::{Ingredient, IngredientId};
use crate::artifact::ArtifactRef;
use crate::image::{resolve_image, ImageSource};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Number of ingredients every recipe combines
pub const RECIPE_SIZE: usize = 4;

const RECIPE_ID_PREFIX: &str = "recipe_";
const RECIPE_ID_HASH_LEN: usize = 8;

/// Unique identifier for a recipe
///
/// Derived from the sorted ingredient ids, so the same ingredient set always
/// maps to the same recipe id regardless of selection order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    /// Compute the id for a set of ingredient ids.
    ///
    /// `"recipe_"` followed by the first 8 hex digits of the SHA-256 of the
    /// sorted ids joined with `_`.
    pub fn for_ingredients<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a IngredientId>,
    {
        let mut sorted: Vec<&str> = ids.into_iter().map(|id| id.as_str()).collect();
        sorted.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(sorted.join("_").as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        Self(format!("{}{}", RECIPE_ID_PREFIX, &digest[..RECIPE_ID_HASH_LEN]))
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Whether an ingredient id lies in the namespace reserved for
    /// ingredients derived from recipes
    pub fn is_reserved(id: &IngredientId) -> bool {
        id.as_str().starts_with(RECIPE_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&RecipeId> for IngredientId {
    fn from(id: &RecipeId) -> Self {
        IngredientId::new(id.as_str())
    }
}

/// The validated, synthesized result of combining four ingredients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Snapshots of the combined ingredients, frozen at creation time
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    /// Stored as Unix seconds
    #[serde(default, with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Build a recipe from synthesized text and ingredient snapshots.
    ///
    /// The id is derived from the ingredients; the timestamp is truncated to
    /// whole seconds so a stored recipe reloads identically.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image_prompt: impl Into<String>,
        ingredients: Vec<Ingredient>,
    ) -> Self {
        Self {
            id: RecipeId::for_ingredients(ingredients.iter().map(|i| &i.id)),
            name: name.into(),
            description: description.into(),
            ingredients,
            image_prompt: image_prompt.into(),
            image_url: None,
            image_path: None,
            created_at: Utc::now().trunc_subsecs(0),
        }
    }

    /// Ingredient ids in recipe order
    pub fn ingredient_ids(&self) -> Vec<&IngredientId> {
        self.ingredients.iter().map(|i| &i.id).collect()
    }

    /// True if this recipe was made from exactly the given ids, in any order.
    ///
    /// Duplicate-sensitive: `[a, a, b, c]` does not match `[a, b, b, c]`.
    pub fn matches_ingredient_set(&self, ids: &[IngredientId]) -> bool {
        let mut mine = self.ingredient_ids();
        let mut theirs: Vec<&IngredientId> = ids.iter().collect();
        mine.sort_unstable();
        theirs.sort_unstable();
        mine == theirs
    }

    /// Record a generated artifact as this recipe's image.
    pub fn attach_artifact(&mut self, artifact: &ArtifactRef) {
        match artifact {
            ArtifactRef::Url(url) => self.image_url = Some(url.clone()),
            ArtifactRef::Path(path) => self.image_path = Some(path.to_string_lossy().into_owned()),
        }
    }

    /// Derive the discovered ingredient that this recipe unlocks.
    ///
    /// The new ingredient shares the recipe's id and carries no properties.
    pub fn to_discovered_ingredient(&self) -> Ingredient {
        Ingredient {
            id: IngredientId::from(&self.id),
            name: self.name.clone(),
            description: self.description.clone(),
            properties: Vec::new(),
            image_prompt: Some(self.image_prompt.clone()),
            image_url: self.image_url.clone(),
            image_path: self.image_path.clone(),
        }
    }

    /// Comma-separated ingredient names, as shown alongside a recipe.
    pub fn ingredient_names(&self) -> String {
        self.ingredients
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The image to display for this recipe, if any.
    pub fn image_source(&self, placeholder_dir: &Path) -> Option<ImageSource> {
        resolve_image(
            &IngredientId::from(&self.id),
            self.image_url.as_deref(),
            self.image_path.as_deref(),
            placeholder_dir,
        )
    }
}
