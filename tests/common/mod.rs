//! Common test utilities for AI Cooks integration tests
//!
//! Provides a small seeded pantry and helpers to build an engine over an
//! on-disk store with deterministic randomness.

#![allow(dead_code)]

use aicooks::artifact::NoArtifacts;
use aicooks::random::FixedRandom;
use aicooks::{
    ArtifactGenerator, DiscoveryEngine, DiscoveryStore, Ingredient, IngredientId, JsonStore,
    OpenStore, RecipeValidator, ValidationRules,
};
use std::path::Path;
use std::sync::Arc;

/// Base ingredients used across tests
pub fn pantry() -> Vec<Ingredient> {
    vec![
        Ingredient::new("tomato", "Tomato")
            .with_description("Ripe red tomato")
            .with_property("vegetable"),
        Ingredient::new("stock", "Stock")
            .with_description("Vegetable stock")
            .with_property("liquid"),
        Ingredient::new("garlic", "Garlic")
            .with_description("Fresh garlic")
            .with_property("pungent"),
        Ingredient::new("rice", "Rice")
            .with_description("Long grain rice")
            .with_property("grain"),
        Ingredient::new("beef", "Beef")
            .with_description("Ground beef")
            .with_property("meat"),
        Ingredient::new("egg", "Egg")
            .with_description("Hen's egg")
            .with_property("binding"),
    ]
}

/// Open a store in `dir` and seed the pantry
pub fn seeded_store(dir: &Path) -> Arc<JsonStore> {
    let store = JsonStore::open(dir).expect("open store");
    store.seed_base_ingredients(pantry()).expect("seed pantry");
    Arc::new(store)
}

/// Engine whose chance rules always draw `draw`
pub fn engine_with(
    store: Arc<JsonStore>,
    draw: f64,
    artifacts: Arc<dyn ArtifactGenerator>,
) -> DiscoveryEngine {
    let validator = RecipeValidator::new(
        ValidationRules::default(),
        Box::new(FixedRandom::constant(draw)),
    );
    DiscoveryEngine::new(store, validator, artifacts)
}

/// Engine that accepts every compatible combination and renders nothing
pub fn accepting_engine(store: Arc<JsonStore>) -> DiscoveryEngine {
    engine_with(store, 0.0, Arc::new(NoArtifacts))
}

pub fn ids(keys: &[&str]) -> Vec<IngredientId> {
    keys.iter().map(|k| IngredientId::from(*k)).collect()
}
