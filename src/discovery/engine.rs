//! DiscoveryEngine: the main entry point for combining ingredients

use super::resolver::{CombinationResolver, Resolution};
use super::synthesis;
use super::validator::{Rejection, RecipeValidator};
use crate::artifact::{ArtifactGenerator, ArtifactRef};
use crate::catalog::{Ingredient, IngredientId, Recipe, RecipeId, RECIPE_SIZE};
use crate::config::GameConfig;
use crate::storage::{DiscoveryStore, StorageError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while combining or requesting ingredients
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("select exactly {expected} ingredients (got {got})")]
    IncompleteSelection { expected: usize, got: usize },

    #[error("unknown ingredients: {}", .0.join(", "))]
    UnknownIngredient(Vec<String>),

    #[error("invalid combination: {0}")]
    InvalidCombination(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("an ingredient named '{0}' already exists")]
    IngredientExists(String),

    #[error("'{0}' is reserved for ingredients discovered from recipes")]
    ReservedName(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for discovery operations
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Whether a combination produced something new
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The recipe was already stored and is returned unchanged
    Existing,
    /// A new recipe and discovered ingredient were stored
    Discovered,
}

/// A resolved combination
#[derive(Debug, Clone, Serialize)]
pub struct Discovery {
    pub recipe: Recipe,
    pub outcome: Outcome,
}

/// The discovery engine
///
/// Owns the only write path into the store: recipes and the discovered
/// ingredients derived from them.
pub struct DiscoveryEngine {
    store: Arc<dyn DiscoveryStore>,
    resolver: CombinationResolver,
    validator: RecipeValidator,
    artifacts: Arc<dyn ArtifactGenerator>,
    /// Bound on a single artifact request; exceeding it means "no artifact"
    artifact_timeout: Option<Duration>,
}

impl DiscoveryEngine {
    pub fn new(
        store: Arc<dyn DiscoveryStore>,
        validator: RecipeValidator,
        artifacts: Arc<dyn ArtifactGenerator>,
    ) -> Self {
        Self {
            resolver: CombinationResolver::new(store.clone()),
            store,
            validator,
            artifacts,
            artifact_timeout: None,
        }
    }

    /// Build an engine from configuration: rules, seed, optional text model
    /// and optional image command.
    pub fn from_config(config: &GameConfig, store: Arc<dyn DiscoveryStore>) -> Self {
        let mut validator = RecipeValidator::new(config.rules.clone(), config.random_source());
        if let Some(model) = config.text_model() {
            validator = validator.with_model(model);
        }
        Self::new(store, validator, config.artifact_generator())
            .with_artifact_timeout(config.models.timeout())
    }

    pub fn with_artifact_timeout(mut self, timeout: Duration) -> Self {
        self.artifact_timeout = Some(timeout);
        self
    }

    pub fn store(&self) -> &Arc<dyn DiscoveryStore> {
        &self.store
    }

    pub fn validator(&self) -> &RecipeValidator {
        &self.validator
    }

    /// Find an ingredient by id, falling back to its display name
    pub fn find_ingredient(&self, key: &str) -> DiscoveryResult<Option<Ingredient>> {
        if let Some(found) = self.store.ingredient(&IngredientId::from(key))? {
            return Ok(Some(found));
        }
        Ok(self.store.ingredient_by_name(key)?)
    }

    /// Resolve selection keys (ids or display names) to ingredient ids
    pub fn resolve_keys<S: AsRef<str>>(&self, keys: &[S]) -> DiscoveryResult<Vec<IngredientId>> {
        let mut ids = Vec::with_capacity(keys.len());
        let mut missing = Vec::new();
        for key in keys {
            match self.find_ingredient(key.as_ref())? {
                Some(ing) => ids.push(ing.id),
                None => missing.push(key.as_ref().to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(DiscoveryError::UnknownIngredient(missing));
        }
        Ok(ids)
    }

    /// Request an artifact, treating failure and timeout as "none"
    async fn render_artifact(&self, prompt: &str) -> Option<ArtifactRef> {
        let render = self.artifacts.render(prompt);
        let result = match self.artifact_timeout {
            Some(limit) => match tokio::time::timeout(limit, render).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(timeout = ?limit, "artifact generation timed out");
                    return None;
                }
            },
            None => render.await,
        };

        match result {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::warn!(error = %e, "artifact generation unavailable");
                None
            }
        }
    }

    /// Store the discovered ingredient for a recipe unless it already exists.
    ///
    /// An existing ingredient under the recipe's id only counts as already
    /// derived when it carries the recipe's name; anything else is a
    /// collision.
    fn ensure_discovered_ingredient(&self, recipe: &Recipe) -> DiscoveryResult<()> {
        match self.store.add_discovered_ingredient(recipe.to_discovered_ingredient()) {
            Ok(()) => Ok(()),
            Err(StorageError::DuplicateId(id)) => {
                match self.store.ingredient(&IngredientId::from(&recipe.id))? {
                    Some(existing) if existing.name == recipe.name => {
                        tracing::debug!(id = %id, "discovered ingredient already stored");
                        Ok(())
                    }
                    _ => {
                        tracing::warn!(id = %id, recipe = %recipe.name, "ingredient id taken by another record");
                        Err(StorageError::IdCollision(id).into())
                    }
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Combine four ingredients.
    ///
    /// Returns the stored recipe if this exact set was combined before;
    /// otherwise validates, synthesizes, renders an artifact, and stores the
    /// new recipe followed by its discovered ingredient.
    pub async fn combine(&self, selection: &[IngredientId]) -> DiscoveryResult<Discovery> {
        if selection.len() != RECIPE_SIZE {
            return Err(DiscoveryError::IncompleteSelection {
                expected: RECIPE_SIZE,
                got: selection.len(),
            });
        }

        let mut ingredients = Vec::with_capacity(RECIPE_SIZE);
        let mut missing = Vec::new();
        for id in selection {
            match self.store.ingredient(id)? {
                Some(ing) => ingredients.push(ing),
                None => missing.push(id.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(DiscoveryError::UnknownIngredient(missing));
        }

        if let Resolution::Found(recipe) = self.resolver.lookup(selection)? {
            tracing::info!(id = %recipe.id, name = %recipe.name, "existing recipe");
            // Repairs a recipe whose ingredient write never happened
            match self.store.ingredient(&IngredientId::from(&recipe.id))? {
                None => {
                    tracing::warn!(id = %recipe.id, "re-deriving missing discovered ingredient");
                    self.ensure_discovered_ingredient(&recipe)?;
                }
                Some(existing) if existing.name != recipe.name => {
                    tracing::warn!(id = %recipe.id, holder = %existing.name, "recipe ingredient id held by another ingredient");
                }
                Some(_) => {}
            }
            return Ok(Discovery {
                recipe,
                outcome: Outcome::Existing,
            });
        }

        let mut recipe = match self.validator.generate(&ingredients).await {
            Ok(recipe) => recipe,
            Err(Rejection::WrongCount(got)) => {
                return Err(DiscoveryError::IncompleteSelection {
                    expected: RECIPE_SIZE,
                    got,
                })
            }
            Err(Rejection::Invalid(reason)) => return Err(DiscoveryError::InvalidCombination(reason)),
        };

        if let Some(artifact) = self.render_artifact(&recipe.image_prompt).await {
            recipe.attach_artifact(&artifact);
        }

        match self.store.add_recipe(recipe.clone()) {
            Ok(()) => {}
            Err(StorageError::DuplicateId(id)) => {
                // Lost a race with a concurrent combination of the same set,
                // unless the stored recipe under this id has other ingredients
                let stored = match self.store.find_recipe_by_ingredient_set(selection)? {
                    Some(stored) => stored,
                    None => {
                        tracing::warn!(id = %id, "recipe id collides with a different ingredient set");
                        return Err(StorageError::IdCollision(id).into());
                    }
                };
                tracing::info!(id = %id, "recipe stored concurrently, returning stored copy");
                self.ensure_discovered_ingredient(&stored)?;
                return Ok(Discovery {
                    recipe: stored,
                    outcome: Outcome::Existing,
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.ensure_discovered_ingredient(&recipe)?;

        tracing::info!(id = %recipe.id, name = %recipe.name, "discovered recipe");
        Ok(Discovery {
            recipe,
            outcome: Outcome::Discovered,
        })
    }

    /// Add a new ingredient by name and description.
    ///
    /// The id is the slug of the name. Image generation is attempted but
    /// not required.
    pub async fn request_ingredient(&self, name: &str, description: &str) -> DiscoveryResult<Ingredient> {
        let name = name.trim();
        let description = description.trim();
        if name.is_empty() {
            return Err(DiscoveryError::MissingField("name"));
        }
        if description.is_empty() {
            return Err(DiscoveryError::MissingField("description"));
        }

        let id = IngredientId::slug(name);
        if RecipeId::is_reserved(&id) {
            return Err(DiscoveryError::ReservedName(name.to_string()));
        }
        if self.store.ingredient(&id)?.is_some() {
            return Err(DiscoveryError::IngredientExists(name.to_string()));
        }

        let mut ingredient = Ingredient::new(id, name)
            .with_description(description)
            .with_image_prompt(synthesis::ingredient_image_prompt(name));

        if let Some(prompt) = ingredient.image_prompt.clone() {
            if let Some(artifact) = self.render_artifact(&prompt).await {
                ingredient.attach_artifact(&artifact);
            }
        }

        match self.store.add_discovered_ingredient(ingredient.clone()) {
            Ok(()) => {
                tracing::info!(id = %ingredient.id, "ingredient added on request");
                Ok(ingredient)
            }
            Err(StorageError::DuplicateId(_)) => Err(DiscoveryError::IngredientExists(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
