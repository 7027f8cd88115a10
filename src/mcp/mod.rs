//! MCP server for AI Cooks: exposes the ingredient catalog, recipe
//! discovery and image resolution via the Model Context Protocol.
//!
//! Tools: 2 catalog + 2 discovery + 1 image = 5 total.

pub mod params;

use params::*;
use crate::catalog::{IngredientId, Provenance};
use crate::config::GameConfig;
use crate::discovery::DiscoveryEngine;
use crate::image::ImageSource;
use crate::storage::{JsonStore, OpenStore};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ok_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn err_text(msg: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg)]))
}

fn parse_provenance(value: &str) -> Option<Provenance> {
    match value {
        "base" => Some(Provenance::Base),
        "discovered" => Some(Provenance::Discovered),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// AiCooksMcpServer
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AiCooksMcpServer {
    engine: Arc<DiscoveryEngine>,
    placeholder_dir: PathBuf,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AiCooksMcpServer {
    pub fn new(engine: Arc<DiscoveryEngine>, placeholder_dir: PathBuf) -> Self {
        Self {
            engine,
            placeholder_dir,
            tool_router: Self::tool_router(),
        }
    }

    // ── Catalog tools ───────────────────────────────────────────────────

    #[tool(description = "List ingredients, base first, optionally filtered by provenance")]
    fn list_ingredients(
        &self,
        Parameters(p): Parameters<ListIngredientsParams>,
    ) -> Result<CallToolResult, McpError> {
        let filter = match p.provenance.as_deref() {
            Some(value) => match parse_provenance(value) {
                Some(provenance) => Some(provenance),
                None => return err_text(format!("unknown provenance: {}", value)),
            },
            None => None,
        };

        match self.engine.store().all_ingredients() {
            Ok(catalog) => {
                let listed: Vec<serde_json::Value> = catalog
                    .iter_with_provenance()
                    .filter(|(provenance, _)| filter.map_or(true, |f| f == *provenance))
                    .map(|(provenance, ingredient)| {
                        serde_json::json!({
                            "provenance": provenance,
                            "ingredient": ingredient,
                        })
                    })
                    .collect();
                ok_json(&listed)
            }
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "List all discovered recipes")]
    fn list_recipes(&self) -> Result<CallToolResult, McpError> {
        match self.engine.store().all_recipes() {
            Ok(recipes) => ok_json(&recipes),
            Err(e) => err_text(e.to_string()),
        }
    }

    // ── Discovery tools ─────────────────────────────────────────────────

    #[tool(description = "Combine exactly four ingredients into a recipe. Returns the stored recipe if this set was combined before")]
    async fn combine_ingredients(
        &self,
        Parameters(p): Parameters<CombineParams>,
    ) -> Result<CallToolResult, McpError> {
        let selection = match self.engine.resolve_keys(&p.ingredients) {
            Ok(ids) => ids,
            Err(e) => return err_text(e.to_string()),
        };

        match self.engine.combine(&selection).await {
            Ok(discovery) => ok_json(&discovery),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Add a new ingredient by name and description")]
    async fn request_ingredient(
        &self,
        Parameters(p): Parameters<RequestIngredientParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.engine.request_ingredient(&p.name, &p.description).await {
            Ok(ingredient) => ok_json(&ingredient),
            Err(e) => err_text(e.to_string()),
        }
    }

    // ── Image tools ─────────────────────────────────────────────────────

    #[tool(description = "Resolve the image to display for an ingredient or recipe")]
    fn resolve_image(
        &self,
        Parameters(p): Parameters<ResolveImageParams>,
    ) -> Result<CallToolResult, McpError> {
        let store = self.engine.store();

        let image: Option<ImageSource> = match store.ingredient(&IngredientId::from(p.id.as_str())) {
            Ok(Some(ingredient)) => ingredient.image_source(&self.placeholder_dir),
            Ok(None) => match store.all_recipes() {
                Ok(recipes) => match recipes.iter().find(|r| r.id.as_str() == p.id) {
                    Some(recipe) => recipe.image_source(&self.placeholder_dir),
                    None => return err_text(format!("no ingredient or recipe with id {}", p.id)),
                },
                Err(e) => return err_text(e.to_string()),
            },
            Err(e) => return err_text(e.to_string()),
        };

        ok_json(&serde_json::json!({ "id": p.id, "image": image }))
    }
}

#[tool_handler]
impl ServerHandler for AiCooksMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "AI Cooks MCP server: combine four ingredients to discover recipes, which become new ingredients"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run_mcp_server(config: GameConfig) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async {
        let data_dir = config.data_dir();
        let store = match JsonStore::open(&data_dir) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                eprintln!("failed to open data directory {}: {}", data_dir.display(), e);
                return 1;
            }
        };

        let engine = DiscoveryEngine::from_config(&config, store);
        let server = AiCooksMcpServer::new(Arc::new(engine), config.placeholder_dir());

        tracing::info!(data_dir = %data_dir.display(), "aicooks mcp server starting on stdio");

        let service = match server.serve(rmcp::transport::stdio()).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to start MCP server: {}", e);
                return 1;
            }
        };

        if let Err(e) = service.waiting().await {
            eprintln!("MCP server error: {}", e);
            return 1;
        }

        0
    })
}
