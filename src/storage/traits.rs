//! Storage trait definitions

use crate::catalog::{Ingredient, IngredientId, Provenance, Recipe};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Id {0} already belongs to a different record")]
    IdCollision(String),

    #[error("Failed to persist {path}: {reason}")]
    Persist { path: String, reason: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// All ingredients, split by provenance
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    pub base: Vec<Ingredient>,
    pub discovered: Vec<Ingredient>,
}

impl IngredientCatalog {
    /// Iterate base ingredients first, then discovered ones
    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.base.iter().chain(self.discovered.iter())
    }

    /// Like `iter`, tagging each ingredient with where it came from
    pub fn iter_with_provenance(&self) -> impl Iterator<Item = (Provenance, &Ingredient)> {
        self.base
            .iter()
            .map(|i| (Provenance::Base, i))
            .chain(self.discovered.iter().map(|i| (Provenance::Discovered, i)))
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.discovered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for ingredient/recipe storage backends
///
/// Implementations must be thread-safe (Send + Sync). Every mutation is
/// durable before it returns `Ok`; a failed mutation leaves the store as it
/// was.
pub trait DiscoveryStore: Send + Sync {
    // === Ingredient Operations ===

    /// All ingredients, base and discovered
    fn all_ingredients(&self) -> StorageResult<IngredientCatalog>;

    /// Look up an ingredient by id (base first, then discovered)
    fn ingredient(&self, id: &IngredientId) -> StorageResult<Option<Ingredient>>;

    /// Look up an ingredient by display name, ignoring case
    fn ingredient_by_name(&self, name: &str) -> StorageResult<Option<Ingredient>>;

    /// Append a discovered ingredient.
    ///
    /// Fails with `StorageError::DuplicateId` if any ingredient already uses
    /// the id.
    fn add_discovered_ingredient(&self, ingredient: Ingredient) -> StorageResult<()>;

    /// Append base ingredients whose ids are not yet present.
    ///
    /// Returns how many were added.
    fn seed_base_ingredients(&self, ingredients: Vec<Ingredient>) -> StorageResult<usize>;

    // === Recipe Operations ===

    /// All recipes in creation order
    fn all_recipes(&self) -> StorageResult<Vec<Recipe>>;

    /// Append a recipe.
    ///
    /// Fails with `StorageError::DuplicateId` if a recipe already uses the id.
    fn add_recipe(&self, recipe: Recipe) -> StorageResult<()>;

    /// Find the recipe made from exactly these ingredient ids, in any order
    fn find_recipe_by_ingredient_set(&self, ids: &[IngredientId]) -> StorageResult<Option<Recipe>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: DiscoveryStore + Sized {
    /// Open or create a store in the given data directory
    fn open(dir: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
