//! Discovery: turning four ingredients into a recipe
//!
//! - `CombinationResolver` finds a stored recipe for an exact ingredient set
//! - `RecipeValidator` decides validity and synthesizes name and description
//! - `DiscoveryEngine` orchestrates lookup, generation, artifacts and storage

mod engine;
mod resolver;
pub mod synthesis;
mod validator;

pub use engine::{Discovery, DiscoveryEngine, DiscoveryError, DiscoveryResult, Outcome};
pub use resolver::{CombinationResolver, Resolution};
pub use validator::{Rejection, RecipeValidator, Rule, ValidationRules, Verdict};
