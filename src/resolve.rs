//! Recipe identity resolution.
//!
//! The question-answering entry point serves three provenances through one
//! interface: recipes persisted in our own store, recipes from the external
//! catalog, and ad hoc payloads for a scrape still in progress. The caller
//! passes an identifier and, optionally, an inline recipe; this module
//! decides which representation the question is actually about.

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::AskError;
use crate::model::{CanonicalRecipe, ExternalRecipeView, RecipeLike};
use crate::normalize::{normalize_image, normalize_ingredients};

/// Persistence capability for canonical recipes. Single-document
/// operations only; no cross-document transactions.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn save(&self, recipe: CanonicalRecipe) -> String;
    async fn find_by_id(&self, id: &str) -> Option<CanonicalRecipe>;
    async fn find_by_owner(&self, owner_id: &str) -> Vec<CanonicalRecipe>;
}

/// In-memory store used by tests and the CLI.
#[derive(Default)]
pub struct MemoryStore {
    recipes: Mutex<HashMap<String, CanonicalRecipe>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn save(&self, recipe: CanonicalRecipe) -> String {
        let id = format!("{:024x}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.recipes
            .lock()
            .expect("store lock poisoned")
            .insert(id.clone(), recipe);
        id
    }

    async fn find_by_id(&self, id: &str) -> Option<CanonicalRecipe> {
        self.recipes
            .lock()
            .expect("store lock poisoned")
            .get(id)
            .cloned()
    }

    async fn find_by_owner(&self, owner_id: &str) -> Vec<CanonicalRecipe> {
        self.recipes
            .lock()
            .expect("store lock poisoned")
            .values()
            .filter(|recipe| recipe.user_id.as_deref() == Some(owner_id))
            .cloned()
            .collect()
    }
}

/// The recipe a question is being asked about, tagged by provenance.
#[derive(Debug, Clone)]
pub enum WorkingRecipe {
    Canonical(CanonicalRecipe),
    External(ExternalRecipeView),
}

impl WorkingRecipe {
    /// Interpret an inline payload. A payload carrying the external
    /// catalog shape (numeric `id` plus `extendedIngredients`) becomes an
    /// [`ExternalRecipeView`]; anything else is read leniently as a
    /// canonical-shaped recipe.
    pub fn from_inline(payload: &Value) -> Option<Self> {
        let looks_external =
            payload.get("extendedIngredients").is_some() && payload.get("id").is_some();
        if looks_external {
            if let Ok(view) = serde_json::from_value::<ExternalRecipeView>(payload.clone()) {
                return Some(WorkingRecipe::External(view));
            }
        }

        if let Ok(recipe) = serde_json::from_value::<CanonicalRecipe>(payload.clone()) {
            if !recipe.title.is_empty() {
                return Some(WorkingRecipe::Canonical(recipe));
            }
        }

        lenient_canonical(payload).map(WorkingRecipe::Canonical)
    }
}

/// Best-effort read of a partially-shaped ad hoc payload.
fn lenient_canonical(payload: &Value) -> Option<CanonicalRecipe> {
    let title = payload
        .get("title")
        .or_else(|| payload.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|title| !title.is_empty())?;

    Some(CanonicalRecipe {
        title: title.to_string(),
        description: payload
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        image: normalize_image(payload.get("image")),
        ingredients: normalize_ingredients(payload.get("ingredients")),
        ..Default::default()
    })
}

impl RecipeLike for WorkingRecipe {
    fn title(&self) -> &str {
        match self {
            WorkingRecipe::Canonical(recipe) => recipe.title(),
            WorkingRecipe::External(view) => view.title(),
        }
    }

    fn description(&self) -> &str {
        match self {
            WorkingRecipe::Canonical(recipe) => recipe.description(),
            WorkingRecipe::External(view) => view.description(),
        }
    }

    fn ingredients(&self) -> Vec<String> {
        match self {
            WorkingRecipe::Canonical(recipe) => recipe.ingredients(),
            WorkingRecipe::External(view) => view.ingredients(),
        }
    }

    fn instructions_text(&self) -> String {
        match self {
            WorkingRecipe::Canonical(recipe) => recipe.instructions_text(),
            WorkingRecipe::External(view) => view.instructions_text(),
        }
    }

    fn cooking_time(&self) -> Option<String> {
        match self {
            WorkingRecipe::Canonical(recipe) => recipe.cooking_time(),
            WorkingRecipe::External(view) => view.cooking_time(),
        }
    }
}

/// A syntactically valid persisted-record identifier: 24 lowercase hex
/// characters (the stored ObjectId format).
pub fn is_persisted_id(id: &str) -> bool {
    id.len() == 24
        && id
            .chars()
            .all(|ch| ch.is_ascii_digit() || ('a'..='f').contains(&ch))
}

/// Decide which recipe to answer questions about.
///
/// Order: persisted lookup (when the identifier is syntactically valid),
/// then the inline payload. The chosen recipe must expose at least one
/// non-empty ingredient or the question cannot be grounded.
pub async fn resolve_recipe(
    store: &dyn RecipeStore,
    recipe_ref: &str,
    inline: Option<&Value>,
) -> Result<WorkingRecipe, AskError> {
    let mut working = None;

    if is_persisted_id(recipe_ref) {
        if let Some(recipe) = store.find_by_id(recipe_ref).await {
            debug!("resolved {recipe_ref} from the store");
            working = Some(WorkingRecipe::Canonical(recipe));
        }
    }

    if working.is_none() {
        if let Some(payload) = inline {
            working = WorkingRecipe::from_inline(payload);
        }
    }

    let working = working.ok_or(AskError::RecipeNotFound)?;

    let has_ingredients = working
        .ingredients()
        .iter()
        .any(|ingredient| !ingredient.trim().is_empty());
    if !has_ingredients {
        return Err(AskError::InsufficientRecipeData);
    }

    Ok(working)
}
