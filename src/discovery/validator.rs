//! Recipe validation and synthesis
//!
//! Validation is an ordered policy; the first applicable rule decides:
//!
//! 1. A configured text model answers yes/no. If the model fails, the rules
//!    below decide instead.
//! 2. Reject when the combined properties contain an incompatible pair.
//! 3. No binding or liquid ingredient: accept when a draw exceeds 0.3.
//! 4. An intense property ("sweet", "acidic", "pungent") appears three or
//!    more times: accept when a draw is below 0.5.
//! 5. Otherwise accept when a draw is below 0.8.
//!
//! The chance rules are a game mechanic. Each draws exactly one value from
//! the injected random source.

use super::synthesis;
use crate::catalog::{Ingredient, Recipe, RECIPE_SIZE};
use crate::model::TextModel;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// Data-driven thresholds and tag lists for rule-based validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Property pairs that may not appear together
    pub incompatible_pairs: Vec<(String, String)>,
    /// Properties that hold a dish together
    pub binding_properties: Vec<String>,
    /// Properties that unbalance a dish when over-represented
    pub intense_properties: Vec<String>,
    /// Occurrences of one intense property that trigger the intensity rule
    pub intense_threshold: usize,
    /// A dish without binders is accepted when the draw is above this
    pub unusual_accept_above: f64,
    /// An intense dish is accepted when the draw is below this
    pub intense_accept_below: f64,
    /// Any other dish is accepted when the draw is below this
    pub default_accept_below: f64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            incompatible_pairs: vec![("meat".to_string(), "vegetable".to_string())],
            binding_properties: vec!["binding".to_string(), "liquid".to_string()],
            intense_properties: vec![
                "sweet".to_string(),
                "acidic".to_string(),
                "pungent".to_string(),
            ],
            intense_threshold: 3,
            unusual_accept_above: 0.3,
            intense_accept_below: 0.5,
            default_accept_below: 0.8,
        }
    }
}

/// Which rule decided a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    WrongCount,
    Model,
    IncompatiblePair,
    MissingBinder,
    TooIntense,
    Default,
}

/// Outcome of validating a combination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub valid: bool,
    pub reason: String,
    pub rule: Rule,
}

impl Verdict {
    fn accept(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            valid: true,
            reason: reason.into(),
            rule,
        }
    }

    fn reject(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
            rule,
        }
    }
}

/// Why `generate` produced no recipe
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("a recipe needs exactly 4 ingredients, got {0}")]
    WrongCount(usize),
    #[error("{0}")]
    Invalid(String),
}

/// Decides whether a combination is a recipe and, if so, writes it.
pub struct RecipeValidator {
    rules: ValidationRules,
    model: Option<Arc<dyn TextModel>>,
    rng: Mutex<Box<dyn RandomSource>>,
}

impl RecipeValidator {
    /// Rule-based validator drawing from `rng`
    pub fn new(rules: ValidationRules, rng: Box<dyn RandomSource>) -> Self {
        Self {
            rules,
            model: None,
            rng: Mutex::new(rng),
        }
    }

    /// Consult a text model before the rules, and for names and descriptions
    pub fn with_model(mut self, model: Arc<dyn TextModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    fn draw(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_f64()
    }

    /// Decide whether the ingredients make a recipe.
    pub async fn validate(&self, ingredients: &[Ingredient]) -> Verdict {
        if ingredients.len() != RECIPE_SIZE {
            return Verdict::reject(Rule::WrongCount, "A recipe must have exactly 4 ingredients.");
        }

        if let Some(model) = &self.model {
            let names = names_of(ingredients);
            match model.generate(&synthesis::validation_prompt(&names)).await {
                Ok(answer) => {
                    let valid = answer.to_lowercase().contains("yes");
                    tracing::debug!(model = model.name(), valid, "model verdict");
                    return Verdict {
                        valid,
                        reason: answer,
                        rule: Rule::Model,
                    };
                }
                Err(e) => {
                    tracing::warn!(model = model.name(), error = %e, "model validation failed, using rules");
                }
            }
        }

        self.validate_with_rules(ingredients)
    }

    /// Rules 2 to 5, without consulting a model.
    pub fn validate_with_rules(&self, ingredients: &[Ingredient]) -> Verdict {
        let properties: Vec<&str> = ingredients
            .iter()
            .flat_map(|i| i.properties.iter().map(String::as_str))
            .collect();
        let has = |prop: &str| properties.contains(&prop);

        for (a, b) in &self.rules.incompatible_pairs {
            if has(a) && has(b) {
                return Verdict::reject(
                    Rule::IncompatiblePair,
                    format!("Incompatible combination: {} and {} don't work well together.", a, b),
                );
            }
        }

        if !self.rules.binding_properties.iter().any(|p| has(p)) {
            return if self.draw() > self.rules.unusual_accept_above {
                Verdict::accept(Rule::MissingBinder, "This unusual combination might work!")
            } else {
                Verdict::reject(
                    Rule::MissingBinder,
                    "Recipe needs at least one binding or liquid ingredient.",
                )
            };
        }

        if let Some(prop) = self.overrepresented(&properties) {
            return if self.draw() < self.rules.intense_accept_below {
                Verdict::accept(Rule::TooIntense, "This intense combination could work!")
            } else {
                Verdict::reject(
                    Rule::TooIntense,
                    format!("Too many {} ingredients make this unbalanced.", prop),
                )
            };
        }

        if self.draw() < self.rules.default_accept_below {
            Verdict::accept(Rule::Default, "These ingredients combine well together.")
        } else {
            Verdict::reject(Rule::Default, "These ingredients don't quite work together.")
        }
    }

    /// First intense property, in order of appearance, that reaches the threshold
    fn overrepresented<'a>(&self, properties: &[&'a str]) -> Option<&'a str> {
        let mut seen: Vec<&str> = Vec::new();
        for &prop in properties {
            if seen.contains(&prop) {
                continue;
            }
            seen.push(prop);
            if !self.rules.intense_properties.iter().any(|p| p == prop) {
                continue;
            }
            let count = properties.iter().filter(|&&p| p == prop).count();
            if count >= self.rules.intense_threshold {
                return Some(prop);
            }
        }
        None
    }

    /// Ask the model, falling back to `None` on failure or empty output
    async fn ask_model(&self, prompt: &str) -> Option<String> {
        let model = self.model.as_ref()?;
        match model.generate(prompt).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(model = model.name(), error = %e, "model text generation failed, using template");
                None
            }
        }
    }

    /// Validate the ingredients and, if valid, synthesize a recipe.
    ///
    /// The returned recipe has no artifact yet.
    pub async fn generate(&self, ingredients: &[Ingredient]) -> Result<Recipe, Rejection> {
        if ingredients.len() != RECIPE_SIZE {
            tracing::warn!(count = ingredients.len(), "wrong number of ingredients");
            return Err(Rejection::WrongCount(ingredients.len()));
        }

        let names = names_of(ingredients);
        tracing::info!(ingredients = %names.join(", "), "validating combination");

        let verdict = self.validate(ingredients).await;
        if !verdict.valid {
            tracing::info!(rule = ?verdict.rule, reason = %verdict.reason, "combination rejected");
            return Err(Rejection::Invalid(verdict.reason));
        }
        tracing::info!(rule = ?verdict.rule, reason = %verdict.reason, "combination accepted");

        let name = match self.ask_model(&synthesis::name_prompt(&names)).await {
            Some(name) => name,
            None => {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                synthesis::template_name(&names, rng.as_mut())
            }
        };

        let description = match self.ask_model(&synthesis::description_prompt(&names)).await {
            Some(description) => description,
            None => {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                synthesis::template_description(&names, rng.as_mut())
            }
        };

        let image_prompt = synthesis::image_prompt(&name, &names);
        Ok(Recipe::new(name, description, image_prompt, ingredients.to_vec()))
    }
}

fn names_of(ingredients: &[Ingredient]) -> Vec<&str> {
    ingredients.iter().map(|i| i.name.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockTextModel;
    use crate::random::FixedRandom;

    fn ing(id: &str, props: &[&str]) -> Ingredient {
        let mut name = id.to_string();
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Ingredient::new(id, name).with_properties(props.iter().copied())
    }

    fn validator(draw: f64) -> RecipeValidator {
        RecipeValidator::new(ValidationRules::default(), Box::new(FixedRandom::constant(draw)))
    }

    fn unbound() -> Vec<Ingredient> {
        vec![
            ing("tomato", &["vegetable"]),
            ing("basil", &["herb"]),
            ing("garlic", &["pungent"]),
            ing("rice", &["grain"]),
        ]
    }

    fn balanced() -> Vec<Ingredient> {
        vec![
            ing("tomato", &["vegetable"]),
            ing("stock", &["liquid"]),
            ing("garlic", &["pungent"]),
            ing("rice", &["grain"]),
        ]
    }

    #[tokio::test]
    async fn wrong_count_is_rejected_regardless_of_content() {
        let v = validator(0.0);
        for n in [0, 1, 3, 5, 8] {
            let ingredients: Vec<Ingredient> =
                (0..n).map(|i| ing(&format!("i{}", i), &["liquid"])).collect();
            assert_eq!(
                v.generate(&ingredients).await.unwrap_err(),
                Rejection::WrongCount(n)
            );
        }
    }

    #[test]
    fn incompatible_pair_rejects_without_drawing() {
        let v = validator(0.0);
        let ingredients = vec![
            ing("beef", &["meat"]),
            ing("carrot", &["vegetable"]),
            ing("stock", &["liquid"]),
            ing("salt", &[]),
        ];
        let verdict = v.validate_with_rules(&ingredients);
        assert!(!verdict.valid);
        assert_eq!(verdict.rule, Rule::IncompatiblePair);
        assert!(verdict.reason.contains("meat and vegetable"));
    }

    #[test]
    fn incompatible_pairs_are_configurable() {
        let rules = ValidationRules {
            incompatible_pairs: Vec::new(),
            ..ValidationRules::default()
        };
        let v = RecipeValidator::new(rules, Box::new(FixedRandom::constant(0.0)));
        let ingredients = vec![
            ing("beef", &["meat"]),
            ing("carrot", &["vegetable"]),
            ing("stock", &["liquid"]),
            ing("salt", &[]),
        ];
        let verdict = v.validate_with_rules(&ingredients);
        assert_eq!(verdict.rule, Rule::Default);
        assert!(verdict.valid);
    }

    #[test]
    fn missing_binder_accepts_above_threshold() {
        let verdict = validator(0.5).validate_with_rules(&unbound());
        assert_eq!(verdict.rule, Rule::MissingBinder);
        assert!(verdict.valid);
        assert_eq!(verdict.reason, "This unusual combination might work!");
    }

    #[test]
    fn missing_binder_rejects_at_or_below_threshold() {
        let verdict = validator(0.2).validate_with_rules(&unbound());
        assert_eq!(verdict.rule, Rule::MissingBinder);
        assert!(!verdict.valid);

        let verdict = validator(0.3).validate_with_rules(&unbound());
        assert!(!verdict.valid);
    }

    #[test]
    fn too_intense_rejects_on_high_draw() {
        // "sweet" appears three times across the four ingredients
        let ingredients = vec![
            ing("milk", &["liquid"]),
            ing("flour", &[]),
            ing("honey", &["sweet"]),
            ing("sugar", &["sweet", "sweet"]),
        ];
        let verdict = validator(0.9).validate_with_rules(&ingredients);
        assert_eq!(verdict.rule, Rule::TooIntense);
        assert!(!verdict.valid);
        assert!(verdict.reason.contains("sweet"));

        let verdict = validator(0.4).validate_with_rules(&ingredients);
        assert_eq!(verdict.rule, Rule::TooIntense);
        assert!(verdict.valid);
    }

    #[test]
    fn default_rule_uses_eighty_percent_threshold() {
        let verdict = validator(0.79).validate_with_rules(&balanced());
        assert_eq!(verdict.rule, Rule::Default);
        assert!(verdict.valid);

        let verdict = validator(0.8).validate_with_rules(&balanced());
        assert_eq!(verdict.rule, Rule::Default);
        assert!(!verdict.valid);
    }

    #[test]
    fn each_chance_rule_draws_once() {
        let rng = FixedRandom::new(vec![0.9, 0.1]);
        let v = RecipeValidator::new(ValidationRules::default(), Box::new(rng));
        // Each call consumes exactly one value, so verdicts alternate
        assert!(!v.validate_with_rules(&balanced()).valid);
        assert!(v.validate_with_rules(&balanced()).valid);
        assert!(!v.validate_with_rules(&balanced()).valid);
        assert!(v.validate_with_rules(&balanced()).valid);
    }

    #[tokio::test]
    async fn model_verdict_short_circuits_rules() {
        let model = Arc::new(
            MockTextModel::available().with_response("Can these ingredients", "No, that is inedible."),
        );
        // Rules alone would accept with this draw
        let v = validator(0.0).with_model(model.clone());
        let verdict = v.validate(&balanced()).await;
        assert_eq!(verdict.rule, Rule::Model);
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, "No, that is inedible.");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn failing_model_falls_back_to_rules() {
        let model = Arc::new(MockTextModel::unavailable());
        let v = validator(0.0).with_model(model);
        let verdict = v.validate(&balanced()).await;
        assert_eq!(verdict.rule, Rule::Default);
        assert!(verdict.valid);
    }

    #[tokio::test]
    async fn generate_uses_templates_without_model() {
        let recipe = validator(0.0).generate(&balanced()).await.unwrap();

        assert_eq!(recipe.name, "Baked Tomato & Stock Delight");
        assert_eq!(
            recipe.description,
            "A delicious dish where Tomato, Stock, Garlic, and Rice are combined to create a unique culinary experience."
        );
        assert!(recipe.image_prompt.starts_with("Baked Tomato & Stock Delight made with Tomato, Stock, Garlic, Rice"));
        assert_eq!(recipe.ingredients, balanced());
        assert!(recipe.image_path.is_none() && recipe.image_url.is_none());
    }

    #[tokio::test]
    async fn generate_uses_model_text_when_available() {
        let model = Arc::new(
            MockTextModel::available()
                .with_response("Can these ingredients", "Yes, a classic risotto base.")
                .with_response("Create a creative", "  Garden Risotto  ")
                .with_response("Write a short", "Creamy rice with garlic and tomato."),
        );
        let recipe = validator(0.99).with_model(model.clone()).generate(&balanced()).await.unwrap();

        assert_eq!(recipe.name, "Garden Risotto");
        assert_eq!(recipe.description, "Creamy rice with garlic and tomato.");
        assert!(recipe.image_prompt.starts_with("Garden Risotto made with"));
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn generate_falls_back_per_field() {
        let model = Arc::new(
            MockTextModel::available()
                .with_response("Can these ingredients", "yes")
                .with_response("Create a creative", "Garden Risotto")
                .with_failure("Write a short", "model overloaded"),
        );
        let recipe = validator(0.0).with_model(model).generate(&balanced()).await.unwrap();
        assert_eq!(recipe.name, "Garden Risotto");
        assert!(recipe.description.starts_with("A delicious dish where"));
    }

    #[tokio::test]
    async fn generated_id_ignores_ingredient_order() {
        let v = validator(0.0);
        let mut reversed = balanced();
        reversed.reverse();

        let a = v.generate(&balanced()).await.unwrap();
        let b = v.generate(&reversed).await.unwrap();
        assert_eq!(a.id, b.id);
    }

    #[tokio::test]
    async fn invalid_combination_carries_reason() {
        let err = validator(0.95).generate(&balanced()).await.unwrap_err();
        assert_eq!(
            err,
            Rejection::Invalid("These ingredients don't quite work together.".to_string())
        );
    }
}
