//! AI Cooks: an ingredient-combination recipe discovery engine
//!
//! Players pick four ingredients. If that exact set was combined before, the
//! stored recipe comes back unchanged; otherwise the combination is
//! validated, a recipe is synthesized and stored, and the recipe itself
//! becomes a new ingredient for later combinations.
//!
//! # Core Concepts
//!
//! - **Ingredients**: named, tagged entities, either base (seeded) or discovered
//! - **Recipes**: the result of combining exactly four ingredients, keyed by a
//!   content-derived id
//! - **Artifacts**: generated images attached to recipes and ingredients
//!
//! # Example
//!
//! ```
//! use aicooks::{JsonStore, OpenStore, DiscoveryStore};
//!
//! let store = JsonStore::open_in_memory().unwrap();
//! assert!(store.all_recipes().unwrap().is_empty());
//! ```

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod image;
pub mod mcp;
pub mod model;
pub mod random;
pub mod storage;

pub use artifact::{ArtifactGenerator, ArtifactRef};
pub use catalog::{Ingredient, IngredientId, Provenance, Recipe, RecipeId, RECIPE_SIZE};
pub use config::{ConfigError, GameConfig};
pub use discovery::{
    Discovery, DiscoveryEngine, DiscoveryError, DiscoveryResult, Outcome, RecipeValidator,
    ValidationRules,
};
pub use image::{resolve_image, ImageSource};
pub use model::{ModelError, TextModel};
pub use random::RandomSource;
pub use storage::{DiscoveryStore, JsonStore, OpenStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
