//! Storage backends for AI Cooks
//!
//! Storage is reached through the `DiscoveryStore` trait. The primary
//! implementation is `JsonStore`, which keeps the two JSON documents
//! (`ingredients.json`, `recipes.json`) in a data directory.

mod json;
mod traits;

pub use json::{read_seed_file, JsonStore, INGREDIENTS_FILE, RECIPES_FILE};
pub use traits::{DiscoveryStore, IngredientCatalog, OpenStore, StorageError, StorageResult};
