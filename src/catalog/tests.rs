//! Serialization tests against the on-disk record layout

use serde_json::{json, Value};

/// Base ingredient record as written by data seeding
fn ingredient_fixture() -> Value {
    json!({
        "id": "olive_oil",
        "name": "Olive Oil",
        "description": "Cold-pressed oil from olives",
        "properties": ["liquid", "fat"],
        "image_prompt": "A bottle of olive oil, photorealistic",
        "image_url": null
    })
}

/// Recipe record with embedded ingredient snapshots
fn recipe_fixture() -> Value {
    json!({
        "id": "recipe_0a1b2c3d",
        "name": "Roasted Tomato & Basil Medley",
        "description": "A tasty dish.",
        "ingredients": [
            { "id": "tomato", "name": "Tomato", "description": "", "properties": ["vegetable", "acidic"] },
            { "id": "basil", "name": "Basil", "description": "", "properties": ["herb"] },
            { "id": "olive_oil", "name": "Olive Oil", "description": "", "properties": ["liquid"] },
            { "id": "garlic", "name": "Garlic", "description": "", "properties": ["pungent"] }
        ],
        "image_prompt": "Roasted Tomato & Basil Medley made with Tomato, Basil, Olive Oil, Garlic",
        "image_url": null,
        "created_at": 1700000000
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::catalog::{Ingredient, IngredientId, Recipe, RecipeId};

    #[test]
    fn ingredient_id_serializes_as_string() {
        let id = IngredientId::from("olive_oil");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"olive_oil\"");
    }

    #[test]
    fn ingredient_fixture_deserializes() {
        let ing: Ingredient = serde_json::from_value(ingredient_fixture()).unwrap();
        assert_eq!(ing.id.as_str(), "olive_oil");
        assert_eq!(ing.properties, vec!["liquid", "fat"]);
        assert!(ing.image_url.is_none());
        // Absent field defaults instead of failing
        assert!(ing.image_path.is_none());
    }

    #[test]
    fn ingredient_with_only_id_and_name_deserializes() {
        let ing: Ingredient = serde_json::from_value(json!({ "id": "salt", "name": "Salt" })).unwrap();
        assert_eq!(ing.description, "");
        assert!(ing.properties.is_empty());
        assert!(ing.image_prompt.is_none());
    }

    #[test]
    fn recipe_created_at_is_unix_seconds() {
        let recipe: Recipe = serde_json::from_value(recipe_fixture()).unwrap();
        assert_eq!(recipe.created_at.timestamp(), 1_700_000_000);

        let back = serde_json::to_value(&recipe).unwrap();
        assert_eq!(back["created_at"], 1_700_000_000);
        assert_eq!(back["ingredients"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn recipe_roundtrip_preserves_snapshots() {
        let recipe: Recipe = serde_json::from_value(recipe_fixture()).unwrap();
        let json = serde_json::to_string(&recipe).unwrap();
        let again: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(recipe, again);
    }

    #[test]
    fn recipe_id_is_order_independent() {
        let a = [
            IngredientId::from("tomato"),
            IngredientId::from("basil"),
            IngredientId::from("olive_oil"),
            IngredientId::from("garlic"),
        ];
        let b = [
            IngredientId::from("garlic"),
            IngredientId::from("olive_oil"),
            IngredientId::from("tomato"),
            IngredientId::from("basil"),
        ];
        let id_a = RecipeId::for_ingredients(a.iter());
        assert_eq!(id_a, RecipeId::for_ingredients(b.iter()));
        assert!(id_a.as_str().starts_with("recipe_"));
        assert_eq!(id_a.as_str().len(), "recipe_".len() + 8);
    }

    #[test]
    fn recipe_id_distinguishes_duplicates() {
        let doubled = [
            IngredientId::from("salt"),
            IngredientId::from("salt"),
            IngredientId::from("water"),
            IngredientId::from("flour"),
        ];
        let distinct = [
            IngredientId::from("salt"),
            IngredientId::from("water"),
            IngredientId::from("water"),
            IngredientId::from("flour"),
        ];
        assert_ne!(
            RecipeId::for_ingredients(doubled.iter()),
            RecipeId::for_ingredients(distinct.iter())
        );
    }

    #[test]
    fn ingredient_set_match_is_duplicate_sensitive() {
        let recipe: Recipe = serde_json::from_value(recipe_fixture()).unwrap();

        let shuffled = ["garlic", "olive_oil", "basil", "tomato"].map(IngredientId::from);
        assert!(recipe.matches_ingredient_set(&shuffled));

        let doubled = ["garlic", "garlic", "basil", "tomato"].map(IngredientId::from);
        assert!(!recipe.matches_ingredient_set(&doubled));
    }

    #[test]
    fn discovered_ingredient_shares_recipe_identity() {
        let recipe: Recipe = serde_json::from_value(recipe_fixture()).unwrap();
        let ing = recipe.to_discovered_ingredient();

        assert_eq!(ing.id.as_str(), recipe.id.as_str());
        assert_eq!(ing.name, recipe.name);
        assert_eq!(ing.image_prompt.as_deref(), Some(recipe.image_prompt.as_str()));
        assert!(ing.properties.is_empty());
    }

    #[test]
    fn slug_lowercases_and_underscores() {
        assert_eq!(IngredientId::slug("Smoked Paprika").as_str(), "smoked_paprika");
    }
}
