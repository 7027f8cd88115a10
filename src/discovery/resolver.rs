//! Exact-set recipe lookup

use crate::catalog::{IngredientId, Recipe};
use crate::storage::{DiscoveryStore, StorageResult};
use std::sync::Arc;

/// Result of looking up a combination
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Recipe),
    NotFound,
}

/// Finds the stored recipe for an ingredient selection, if one exists.
///
/// Read-only; order of the selection does not matter.
pub struct CombinationResolver {
    store: Arc<dyn DiscoveryStore>,
}

impl CombinationResolver {
    pub fn new(store: Arc<dyn DiscoveryStore>) -> Self {
        Self { store }
    }

    pub fn lookup(&self, selection: &[IngredientId]) -> StorageResult<Resolution> {
        Ok(match self.store.find_recipe_by_ingredient_set(selection)? {
            Some(recipe) => Resolution::Found(recipe),
            None => Resolution::NotFound,
        })
    }
}
