//! MCP tool parameter structs with schemars-derived JSON schemas.

use schemars::JsonSchema;
use serde::Deserialize;

// ── Catalog params ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListIngredientsParams {
    #[schemars(description = "Filter by provenance: 'base' or 'discovered'")]
    pub provenance: Option<String>,
}

// ── Discovery params ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CombineParams {
    #[schemars(description = "Exactly four ingredient ids or display names")]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RequestIngredientParams {
    #[schemars(description = "Display name of the new ingredient")]
    pub name: String,
    #[schemars(description = "Short description of the new ingredient")]
    pub description: String,
}

// ── Image params ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResolveImageParams {
    #[schemars(description = "An ingredient id or a recipe id")]
    pub id: String,
}
