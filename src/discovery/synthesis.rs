//! Prompt and template text for recipe synthesis

use crate::artifact::PHOTO_QUALIFIERS;
use crate::random::RandomSource;

pub const COOKING_METHODS: [&str; 7] = [
    "Baked", "Fried", "Grilled", "Roasted", "Sautéed", "Stewed", "Steamed",
];

pub const DISH_TYPES: [&str; 7] = [
    "Delight", "Surprise", "Special", "Fusion", "Creation", "Medley", "Mix",
];

pub const ADJECTIVES: [&str; 7] = [
    "delicious",
    "mouthwatering",
    "flavorful",
    "tasty",
    "savory",
    "delightful",
    "exquisite",
];

pub const COOKING_VERBS: [&str; 6] = [
    "combined",
    "mixed",
    "blended",
    "fused",
    "incorporated",
    "integrated",
];

/// "a, b, c, and d" (or "a and b", or "a")
fn natural_list(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

pub fn validation_prompt(names: &[&str]) -> String {
    format!(
        "Can these ingredients be combined into a recipe? Ingredients: {}. Answer with 'Yes' or 'No' and explain why.",
        names.join(", ")
    )
}

pub fn name_prompt(names: &[&str]) -> String {
    format!(
        "Create a creative recipe name using these ingredients: {}.",
        names.join(", ")
    )
}

pub fn description_prompt(names: &[&str]) -> String {
    format!(
        "Write a short, appetizing description for a dish made with: {}.",
        names.join(", ")
    )
}

/// `"{Method} {A} & {B} {DishType}"`, featuring two distinct ingredients
/// (one when only one name is available).
pub fn template_name(names: &[&str], rng: &mut dyn RandomSource) -> String {
    let method = COOKING_METHODS[rng.next_index(COOKING_METHODS.len())];
    let dish = DISH_TYPES[rng.next_index(DISH_TYPES.len())];

    match names.len() {
        0 => format!("{} {}", method, dish),
        1 => format!("{} {} {}", method, names[0], dish),
        n => {
            let first = rng.next_index(n);
            let mut second = rng.next_index(n - 1);
            if second >= first {
                second += 1;
            }
            format!("{} {} & {} {}", method, names[first], names[second], dish)
        }
    }
}

pub fn template_description(names: &[&str], rng: &mut dyn RandomSource) -> String {
    let adjective = ADJECTIVES[rng.next_index(ADJECTIVES.len())];
    let verb = COOKING_VERBS[rng.next_index(COOKING_VERBS.len())];
    format!(
        "A {} dish where {} are {} to create a unique culinary experience.",
        adjective,
        natural_list(names),
        verb
    )
}

/// Deterministic: same name and ingredients always give the same prompt.
pub fn image_prompt(recipe_name: &str, names: &[&str]) -> String {
    format!("{} made with {}, {}", recipe_name, names.join(", "), PHOTO_QUALIFIERS)
}

/// Prompt used when a new ingredient is requested by name
pub fn ingredient_image_prompt(name: &str) -> String {
    format!("A {} ingredient for cooking, photorealistic", name)
}
