//! Core catalog data structures: ingredients and the recipes built from them

mod ingredient;
mod recipe;

#[cfg(test)]
mod tests;

pub use ingredient::{Ingredient, IngredientId, Provenance};
pub use recipe::{Recipe, RecipeId, RECIPE_SIZE};
