//! AI Cooks CLI: recipe discovery game with MCP server.
//!
//! Usage:
//!   aicooks ingredients [--data-dir path] [--config file]
//!   aicooks combine <a> <b> <c> <d>
//!   aicooks mcp [--transport stdio]

use aicooks::storage::read_seed_file;
use aicooks::{
    DiscoveryEngine, DiscoveryStore, GameConfig, JsonStore, OpenStore, Outcome, Recipe,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "aicooks",
    version,
    about = "Combine ingredients to discover recipes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to a YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding ingredients.json and recipes.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List base and discovered ingredients
    Ingredients,
    /// List discovered recipes
    Recipes,
    /// Combine four ingredients (ids or display names)
    Combine {
        #[arg(required = true)]
        ingredients: Vec<String>,
    },
    /// Add a new ingredient by name and description
    Request {
        name: String,
        description: String,
    },
    /// Add base ingredients from a JSON file
    Seed {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Start the MCP (Model Context Protocol) server
    Mcp {
        /// Transport type (currently only stdio)
        #[arg(long, default_value = "stdio")]
        transport: String,
    },
}

/// Log to stderr so stdout stays free for command output and MCP traffic
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aicooks=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<GameConfig, String> {
    let mut config = match path {
        Some(path) => GameConfig::load(path).map_err(|e| e.to_string())?,
        None => GameConfig::default(),
    };
    if data_dir.is_some() {
        config.data_dir = data_dir;
    }
    Ok(config)
}

fn open_engine(config: &GameConfig) -> Result<DiscoveryEngine, String> {
    let data_dir = config.data_dir();
    let store = JsonStore::open(&data_dir)
        .map_err(|e| format!("Failed to open data directory {}: {}", data_dir.display(), e))?;
    Ok(DiscoveryEngine::from_config(config, Arc::new(store)))
}

fn with_engine(config: &GameConfig, run: impl FnOnce(&DiscoveryEngine) -> i32) -> i32 {
    match open_engine(config) {
        Ok(engine) => run(&engine),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn block_on<F: std::future::Future<Output = i32>>(future: F) -> i32 {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(future),
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            1
        }
    }
}

fn cmd_ingredients(engine: &DiscoveryEngine) -> i32 {
    let catalog = match engine.store().all_ingredients() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if catalog.is_empty() {
        println!("No ingredients. Use 'aicooks seed <file>' to add some.");
        return 0;
    }
    println!("{:<24}  {:<28}  {:<10}  {}", "ID", "NAME", "KIND", "PROPERTIES");
    println!("{}", "-".repeat(80));
    for (provenance, ingredient) in catalog.iter_with_provenance() {
        let kind = match provenance {
            aicooks::Provenance::Base => "base",
            aicooks::Provenance::Discovered => "discovered",
        };
        println!(
            "{:<24}  {:<28}  {:<10}  {}",
            ingredient.id,
            ingredient.name,
            kind,
            ingredient.properties.join(", ")
        );
    }
    0
}

fn cmd_recipes(engine: &DiscoveryEngine) -> i32 {
    let recipes = match engine.store().all_recipes() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if recipes.is_empty() {
        println!("No recipes discovered yet.");
        return 0;
    }
    println!("{:<16}  {:<36}  {}", "ID", "NAME", "INGREDIENTS");
    println!("{}", "-".repeat(80));
    for recipe in recipes {
        println!("{:<16}  {:<36}  {}", recipe.id, recipe.name, recipe.ingredient_names());
    }
    0
}

fn print_recipe(recipe: &Recipe, placeholder_dir: &Path) {
    println!("{} ({})", recipe.name, recipe.id);
    println!("  {}", recipe.description);
    println!("  Ingredients: {}", recipe.ingredient_names());
    match recipe.image_source(placeholder_dir) {
        Some(image) => println!("  Image: {:?}", image),
        None => println!("  Image: none"),
    }
}

async fn cmd_combine(engine: &DiscoveryEngine, keys: &[String], placeholder_dir: &Path) -> i32 {
    let selection = match engine.resolve_keys(keys) {
        Ok(ids) => ids,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match engine.combine(&selection).await {
        Ok(discovery) => {
            match discovery.outcome {
                Outcome::Discovered => println!("New recipe discovered!"),
                Outcome::Existing => println!("You've made this before."),
            }
            print_recipe(&discovery.recipe, placeholder_dir);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_request(engine: &DiscoveryEngine, name: &str, description: &str) -> i32 {
    match engine.request_ingredient(name, description).await {
        Ok(ingredient) => {
            println!("Added ingredient '{}' ({})", ingredient.name, ingredient.id);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_seed(engine: &DiscoveryEngine, file: &Path) -> i32 {
    let ingredients = match read_seed_file(file) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", file.display(), e);
            return 1;
        }
    };
    let offered = ingredients.len();
    match engine.store().seed_base_ingredients(ingredients) {
        Ok(added) => {
            println!("Seeded {} of {} base ingredients", added, offered);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.data_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let placeholder_dir = config.placeholder_dir();
    let code = match cli.command {
        Commands::Mcp { transport } => {
            if transport != "stdio" {
                eprintln!("error: only 'stdio' transport is currently supported");
                std::process::exit(1);
            }
            aicooks::mcp::run_mcp_server(config)
        }
        Commands::Ingredients => with_engine(&config, cmd_ingredients),
        Commands::Recipes => with_engine(&config, cmd_recipes),
        Commands::Combine { ingredients } => with_engine(&config, |engine| {
            block_on(cmd_combine(engine, &ingredients, &placeholder_dir))
        }),
        Commands::Request { name, description } => with_engine(&config, |engine| {
            block_on(cmd_request(engine, &name, &description))
        }),
        Commands::Seed { file } => with_engine(&config, |engine| cmd_seed(engine, &file)),
    };
    std::process::exit(code);
}
