//! JSON file storage backend
//!
//! Two documents live in the data directory:
//! - `ingredients.json`: `{ "base_ingredients": [...], "discovered_ingredients": [...] }`
//! - `recipes.json`: `{ "recipes": [...] }`
//!
//! Each collection is guarded by its own mutex covering the whole
//! read-modify-write-persist cycle. Writes go to a temp file in the same
//! directory which is then renamed over the target, so a document on disk is
//! always either the old or the new version. The in-memory copy is only
//! replaced after the rename succeeds.

use super::traits::{DiscoveryStore, IngredientCatalog, OpenStore, StorageError, StorageResult};
use crate::catalog::{Ingredient, IngredientId, Recipe};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;

pub const INGREDIENTS_FILE: &str = "ingredients.json";
pub const RECIPES_FILE: &str = "recipes.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IngredientsDocument {
    #[serde(default)]
    base_ingredients: Vec<Ingredient>,
    #[serde(default)]
    discovered_ingredients: Vec<Ingredient>,
}

impl IngredientsDocument {
    fn contains(&self, id: &IngredientId) -> bool {
        self.base_ingredients
            .iter()
            .chain(self.discovered_ingredients.iter())
            .any(|i| &i.id == id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RecipesDocument {
    #[serde(default)]
    recipes: Vec<Recipe>,
}

/// JSON-file-backed store
///
/// Loaded once at open; the store assumes it is the only writer of its data
/// directory.
pub struct JsonStore {
    /// `None` for in-memory stores
    dir: Option<PathBuf>,
    ingredients: Mutex<IngredientsDocument>,
    recipes: Mutex<RecipesDocument>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Documents are replaced wholesale, so a poisoned guard still holds a
    // consistent value.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl JsonStore {
    /// The data directory, if this store is file-backed
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Read a document, creating it empty if the file does not exist
    fn load_or_init<T>(dir: &Path, file: &str) -> StorageResult<T>
    where
        T: Default + Serialize + DeserializeOwned,
    {
        let path = dir.join(file);
        if !path.exists() {
            let empty = T::default();
            Self::write_document(dir, file, &empty)?;
            tracing::info!(path = %path.display(), "initialized empty document");
            return Ok(empty);
        }
        let bytes = std::fs::read(&path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Atomically replace a document on disk
    fn write_document<T: Serialize>(dir: &Path, file: &str, value: &T) -> StorageResult<()> {
        let path = dir.join(file);
        let bytes = serde_json::to_vec_pretty(value)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StorageError::Persist {
            path: path.display().to_string(),
            reason: e.error.to_string(),
        })?;
        Ok(())
    }

    /// Persist a document if this store is file-backed
    fn persist<T: Serialize>(&self, file: &str, value: &T) -> StorageResult<()> {
        match &self.dir {
            Some(dir) => Self::write_document(dir, file, value),
            None => Ok(()),
        }
    }
}

/// Base ingredients in a seed file: either a bare JSON array of ingredients
/// or an ingredients document, whose `base_ingredients` are used.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeedFile {
    List(Vec<Ingredient>),
    Document(IngredientsDocument),
}

/// Read base ingredients for `DiscoveryStore::seed_base_ingredients`
pub fn read_seed_file(path: impl AsRef<Path>) -> StorageResult<Vec<Ingredient>> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(match serde_json::from_slice(&bytes)? {
        SeedFile::List(ingredients) => ingredients,
        SeedFile::Document(doc) => doc.base_ingredients,
    })
}

impl OpenStore for JsonStore {
    fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let ingredients: IngredientsDocument = Self::load_or_init(dir, INGREDIENTS_FILE)?;
        let recipes: RecipesDocument = Self::load_or_init(dir, RECIPES_FILE)?;

        tracing::debug!(
            dir = %dir.display(),
            base = ingredients.base_ingredients.len(),
            discovered = ingredients.discovered_ingredients.len(),
            recipes = recipes.recipes.len(),
            "opened json store"
        );

        Ok(Self {
            dir: Some(dir.to_path_buf()),
            ingredients: Mutex::new(ingredients),
            recipes: Mutex::new(recipes),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            dir: None,
            ingredients: Mutex::new(IngredientsDocument::default()),
            recipes: Mutex::new(RecipesDocument::default()),
        })
    }
}

impl DiscoveryStore for JsonStore {
    // === Ingredient Operations ===

    fn all_ingredients(&self) -> StorageResult<IngredientCatalog> {
        let doc = lock(&self.ingredients);
        Ok(IngredientCatalog {
            base: doc.base_ingredients.clone(),
            discovered: doc.discovered_ingredients.clone(),
        })
    }

    fn ingredient(&self, id: &IngredientId) -> StorageResult<Option<Ingredient>> {
        let doc = lock(&self.ingredients);
        Ok(doc
            .base_ingredients
            .iter()
            .chain(doc.discovered_ingredients.iter())
            .find(|i| &i.id == id)
            .cloned())
    }

    fn ingredient_by_name(&self, name: &str) -> StorageResult<Option<Ingredient>> {
        let doc = lock(&self.ingredients);
        Ok(doc
            .base_ingredients
            .iter()
            .chain(doc.discovered_ingredients.iter())
            .find(|i| i.name.eq_ignore_ascii_case(name.trim()))
            .cloned())
    }

    fn add_discovered_ingredient(&self, ingredient: Ingredient) -> StorageResult<()> {
        let mut doc = lock(&self.ingredients);
        if doc.contains(&ingredient.id) {
            return Err(StorageError::DuplicateId(ingredient.id.to_string()));
        }

        let mut next = doc.clone();
        let id = ingredient.id.clone();
        next.discovered_ingredients.push(ingredient);
        self.persist(INGREDIENTS_FILE, &next)?;
        *doc = next;

        tracing::debug!(id = %id, "discovered ingredient stored");
        Ok(())
    }

    fn seed_base_ingredients(&self, ingredients: Vec<Ingredient>) -> StorageResult<usize> {
        let mut doc = lock(&self.ingredients);
        let mut next = doc.clone();
        let mut added = 0;
        for ingredient in ingredients {
            if next.contains(&ingredient.id) {
                tracing::debug!(id = %ingredient.id, "base ingredient already present, skipping");
                continue;
            }
            next.base_ingredients.push(ingredient);
            added += 1;
        }

        if added > 0 {
            self.persist(INGREDIENTS_FILE, &next)?;
            *doc = next;
        }
        Ok(added)
    }

    // === Recipe Operations ===

    fn all_recipes(&self) -> StorageResult<Vec<Recipe>> {
        Ok(lock(&self.recipes).recipes.clone())
    }

    fn add_recipe(&self, recipe: Recipe) -> StorageResult<()> {
        let mut doc = lock(&self.recipes);
        if doc.recipes.iter().any(|r| r.id == recipe.id) {
            return Err(StorageError::DuplicateId(recipe.id.to_string()));
        }

        let mut next = doc.clone();
        let id = recipe.id.clone();
        next.recipes.push(recipe);
        self.persist(RECIPES_FILE, &next)?;
        *doc = next;

        tracing::debug!(id = %id, "recipe stored");
        Ok(())
    }

    fn find_recipe_by_ingredient_set(&self, ids: &[IngredientId]) -> StorageResult<Option<Recipe>> {
        let doc = lock(&self.recipes);
        Ok(doc
            .recipes
            .iter()
            .find(|r| r.matches_ingredient_set(ids))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactRef;
    use crate::catalog::Provenance;

    fn ingredient(id: &str, props: &[&str]) -> Ingredient {
        Ingredient::new(id, id.to_uppercase())
            .with_description(format!("{} description", id))
            .with_properties(props.iter().copied())
    }

    fn recipe(ids: [&str; 4]) -> Recipe {
        let ingredients = ids.iter().map(|id| ingredient(id, &["liquid"])).collect();
        Recipe::new("Test Dish", "A dish.", "Test Dish made with things", ingredients)
    }

    #[test]
    fn open_creates_empty_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();

        assert!(store.all_ingredients().unwrap().is_empty());
        assert!(store.all_recipes().unwrap().is_empty());

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(INGREDIENTS_FILE)).unwrap()).unwrap();
        assert_eq!(raw["base_ingredients"], serde_json::json!([]));
        assert_eq!(raw["discovered_ingredients"], serde_json::json!([]));

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(RECIPES_FILE)).unwrap()).unwrap();
        assert_eq!(raw["recipes"], serde_json::json!([]));
    }

    #[test]
    fn reads_documents_with_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(INGREDIENTS_FILE),
            r#"{ "base_ingredients": [ { "id": "salt", "name": "Salt" } ] }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join(RECIPES_FILE), "{}").unwrap();

        let store = JsonStore::open(dir.path()).unwrap();
        let catalog = store.all_ingredients().unwrap();
        assert_eq!(catalog.base.len(), 1);
        assert!(catalog.discovered.is_empty());
        assert!(store.all_recipes().unwrap().is_empty());
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RECIPES_FILE), "{ not json").unwrap();
        assert!(matches!(
            JsonStore::open(dir.path()),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn ingredient_lookup_searches_base_then_discovered() {
        let store = JsonStore::open_in_memory().unwrap();
        store.seed_base_ingredients(vec![ingredient("salt", &[])]).unwrap();
        store.add_discovered_ingredient(ingredient("brine", &[])).unwrap();

        assert!(store.ingredient(&"salt".into()).unwrap().is_some());
        assert!(store.ingredient(&"brine".into()).unwrap().is_some());
        assert!(store.ingredient(&"sugar".into()).unwrap().is_none());
        assert_eq!(
            store.ingredient_by_name("brine").unwrap().map(|i| i.id),
            Some(IngredientId::from("brine"))
        );

        let catalog = store.all_ingredients().unwrap();
        let tagged: Vec<(Provenance, &str)> = catalog
            .iter_with_provenance()
            .map(|(p, i)| (p, i.id.as_str()))
            .collect();
        assert_eq!(
            tagged,
            vec![(Provenance::Base, "salt"), (Provenance::Discovered, "brine")]
        );
    }

    #[test]
    fn duplicate_discovered_ingredient_is_rejected_without_change() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        store.add_discovered_ingredient(ingredient("brine", &[])).unwrap();

        let err = store
            .add_discovered_ingredient(ingredient("brine", &["other"]))
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateId(ref id) if id == "brine"));

        let reopened = JsonStore::open(dir.path()).unwrap();
        let discovered = reopened.all_ingredients().unwrap().discovered;
        assert_eq!(discovered.len(), 1);
        assert!(discovered[0].properties.is_empty());
    }

    #[test]
    fn discovered_ingredient_cannot_shadow_base() {
        let store = JsonStore::open_in_memory().unwrap();
        store.seed_base_ingredients(vec![ingredient("salt", &[])]).unwrap();
        assert!(matches!(
            store.add_discovered_ingredient(ingredient("salt", &[])),
            Err(StorageError::DuplicateId(_))
        ));
    }

    #[test]
    fn seeding_skips_existing_ids() {
        let store = JsonStore::open_in_memory().unwrap();
        assert_eq!(
            store
                .seed_base_ingredients(vec![ingredient("salt", &[]), ingredient("water", &[])])
                .unwrap(),
            2
        );
        assert_eq!(
            store
                .seed_base_ingredients(vec![ingredient("salt", &[]), ingredient("flour", &[])])
                .unwrap(),
            1
        );
        assert_eq!(store.all_ingredients().unwrap().base.len(), 3);
    }

    #[test]
    fn duplicate_recipe_leaves_collection_unchanged() {
        let store = JsonStore::open_in_memory().unwrap();
        let first = recipe(["a", "b", "c", "d"]);
        let second = recipe(["d", "c", "b", "a"]);
        assert_eq!(first.id, second.id);

        store.add_recipe(first).unwrap();
        assert!(matches!(
            store.add_recipe(second),
            Err(StorageError::DuplicateId(_))
        ));
        assert_eq!(store.all_recipes().unwrap().len(), 1);
    }

    #[test]
    fn find_by_ingredient_set_ignores_order() {
        let store = JsonStore::open_in_memory().unwrap();
        store.add_recipe(recipe(["a", "b", "c", "d"])).unwrap();

        let orders = [
            ["a", "b", "c", "d"],
            ["d", "c", "b", "a"],
            ["b", "d", "a", "c"],
            ["c", "a", "d", "b"],
        ];
        for order in orders {
            let ids = order.map(IngredientId::from);
            assert!(store.find_recipe_by_ingredient_set(&ids).unwrap().is_some());
        }

        let other = ["a", "b", "c", "e"].map(IngredientId::from);
        assert!(store.find_recipe_by_ingredient_set(&other).unwrap().is_none());
    }

    #[test]
    fn find_by_ingredient_set_handles_repeated_ingredient() {
        let store = JsonStore::open_in_memory().unwrap();
        store.add_recipe(recipe(["a", "a", "b", "c"])).unwrap();

        let same = ["b", "a", "c", "a"].map(IngredientId::from);
        assert!(store.find_recipe_by_ingredient_set(&same).unwrap().is_some());

        let different = ["a", "b", "b", "c"].map(IngredientId::from);
        assert!(store.find_recipe_by_ingredient_set(&different).unwrap().is_none());
    }

    #[test]
    fn recipe_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut original = recipe(["tomato", "basil", "olive_oil", "garlic"]);
        original.attach_artifact(&ArtifactRef::Path(dir.path().join("img.png")));

        {
            let store = JsonStore::open(dir.path()).unwrap();
            store.add_recipe(original.clone()).unwrap();
        }

        let reopened = JsonStore::open(dir.path()).unwrap();
        let recipes = reopened.all_recipes().unwrap();
        assert_eq!(recipes, vec![original]);
    }

    #[test]
    fn failed_persist_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = JsonStore::open(&data_dir).unwrap();

        // Removing the directory makes the temp-file write fail
        std::fs::remove_dir_all(&data_dir).unwrap();

        assert!(store.add_recipe(recipe(["a", "b", "c", "d"])).is_err());
        assert!(store.all_recipes().unwrap().is_empty());
        assert!(store.add_discovered_ingredient(ingredient("brine", &[])).is_err());
        assert!(store.all_ingredients().unwrap().discovered.is_empty());
    }

    #[test]
    fn seed_file_accepts_list_or_document() {
        let dir = tempfile::tempdir().unwrap();

        let list = dir.path().join("list.json");
        std::fs::write(&list, r#"[{"id": "salt", "name": "Salt", "properties": ["mineral"]}]"#).unwrap();
        let seeded = read_seed_file(&list).unwrap();
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].properties, vec!["mineral"]);

        let doc = dir.path().join("doc.json");
        std::fs::write(
            &doc,
            r#"{"base_ingredients": [{"id": "salt", "name": "Salt", "properties": []}],
                "discovered_ingredients": [{"id": "brine", "name": "Brine", "properties": []}]}"#,
        )
        .unwrap();
        let seeded = read_seed_file(&doc).unwrap();
        assert_eq!(seeded.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["salt"]);
    }
}
