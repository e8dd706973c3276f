//! Recipe extraction and normalization pipeline.
//!
//! Given an arbitrary recipe web page, locate its embedded structured
//! data, normalize the adversarial field shapes into a canonical record,
//! enrich it with AI-derived metadata, and answer grounded questions
//! about recipes from any provenance (own store, external catalog, or an
//! inline payload).

pub mod ai;
pub mod answer;
pub mod config;
pub mod duration;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod service;

pub use crate::ai::{GeminiModel, GenerativeModel};
pub use crate::config::AppConfig;
pub use crate::error::{AiError, AskError, ScrapeError};
pub use crate::model::{
    AiEnrichment, ApiResponse, AskAnswer, CanonicalRecipe, ExternalRecipeView, InstructionStep,
    RecipeLike, SavedRecipe,
};
pub use crate::resolve::{MemoryStore, RecipeStore, WorkingRecipe};
pub use crate::service::RecipeService;

use std::time::Duration;

/// Scrape a URL into an enriched [`CanonicalRecipe`] using a caller-built
/// model client. One-shot convenience over [`RecipeService::scrape_recipe`]
/// that builds a fresh HTTP client per call; use the service for anything
/// repeated.
pub async fn scrape_recipe(
    url: &str,
    model: &dyn GenerativeModel,
    timeout: Duration,
) -> Result<CanonicalRecipe, ScrapeError> {
    let fetcher = fetch::PageFetcher::new(Some(timeout))?;
    service::run_scrape_pipeline(&fetcher, model, url).await
}
