//! The operations callers plug into their transport of choice: scrape a
//! URL, save a scraped recipe, list an owner's recipes, ask a question
//! about a recipe. Routing, sessions, and persistence mechanics live with
//! the caller; this layer owns the pipeline and the response envelopes.

use std::time::Duration;

use log::{debug, info};
use serde_json::Value;

use crate::ai::GenerativeModel;
use crate::answer::post_process_answer;
use crate::enrich::enrich_recipe;
use crate::error::{AskError, ScrapeError};
use crate::extract::locate_recipe_block;
use crate::fetch::PageFetcher;
use crate::model::{ApiResponse, AskAnswer, CanonicalRecipe, RecipeLike, SavedRecipe};
use crate::normalize::canonical_from_block;
use crate::resolve::{resolve_recipe, RecipeStore};

pub struct RecipeService<S: RecipeStore> {
    fetcher: PageFetcher,
    model: Box<dyn GenerativeModel>,
    store: S,
}

impl<S: RecipeStore> RecipeService<S> {
    pub fn new(
        store: S,
        model: Box<dyn GenerativeModel>,
        timeout: Duration,
    ) -> Result<Self, ScrapeError> {
        Ok(Self {
            fetcher: PageFetcher::new(Some(timeout))?,
            model,
            store,
        })
    }

    /// Full scrape pipeline: fetch, locate, normalize, enrich.
    ///
    /// Enrichment is best-effort; everything before it is fatal to the
    /// request and reported as-is.
    pub async fn scrape_recipe(&self, url: &str) -> Result<CanonicalRecipe, ScrapeError> {
        run_scrape_pipeline(&self.fetcher, self.model.as_ref(), url).await
    }

    /// Scrape, wrapped in the uniform response envelope.
    pub async fn scrape(&self, url: &str) -> ApiResponse<CanonicalRecipe> {
        if url.trim().is_empty() {
            return ApiResponse::err("URL is required");
        }
        match self.scrape_recipe(url).await {
            Ok(recipe) => ApiResponse::ok(recipe),
            Err(err) => ApiResponse::err(err.to_string()),
        }
    }

    /// Persist a scraped recipe for an owner.
    pub async fn save_scraped(
        &self,
        owner_id: &str,
        mut recipe: CanonicalRecipe,
    ) -> ApiResponse<SavedRecipe> {
        if recipe.title.trim().is_empty() {
            return ApiResponse::err("Recipe title is required");
        }
        if owner_id.trim().is_empty() {
            return ApiResponse::err("Owner is required");
        }

        recipe.user_id = Some(owner_id.to_string());
        let id = self.store.save(recipe.clone()).await;
        info!("saved recipe \"{}\" as {id}", recipe.title);
        ApiResponse::ok(SavedRecipe { id, recipe })
    }

    /// List the recipes an owner has saved.
    pub async fn list_scraped(&self, owner_id: &str) -> ApiResponse<Vec<CanonicalRecipe>> {
        ApiResponse::ok(self.store.find_by_owner(owner_id).await)
    }

    /// Answer a question about a recipe identified by `recipe_ref`,
    /// optionally grounded by an inline payload.
    pub async fn ask(
        &self,
        recipe_ref: &str,
        inline: Option<&Value>,
        question: &str,
    ) -> Result<AskAnswer, AskError> {
        if question.trim().is_empty() {
            return Err(AskError::QuestionRequired);
        }

        let working = resolve_recipe(&self.store, recipe_ref, inline).await?;

        let prompt = build_ask_prompt(&working, question);
        let raw_answer = self.model.generate(&prompt).await?;

        Ok(AskAnswer {
            answer: post_process_answer(&raw_answer, question, &working),
        })
    }
}

/// The scrape stages in order. Shared between the service and the
/// one-shot [`crate::scrape_recipe`] helper so the two paths cannot
/// drift apart.
pub(crate) async fn run_scrape_pipeline(
    fetcher: &PageFetcher,
    model: &dyn GenerativeModel,
    url: &str,
) -> Result<CanonicalRecipe, ScrapeError> {
    let html = fetcher.fetch(url).await?;
    let block = locate_recipe_block(&html).ok_or(ScrapeError::NoRecipeFound)?;
    let recipe = canonical_from_block(&block, url)?;
    debug!("normalized \"{}\" from {url}", recipe.title);

    Ok(enrich_recipe(model, recipe).await)
}

/// Prompt grounding the question in the working recipe's details.
fn build_ask_prompt(recipe: &dyn RecipeLike, question: &str) -> String {
    let cooking_time = recipe
        .cooking_time()
        .unwrap_or_else(|| "not specified".to_string());

    format!(
        "Based on the following recipe:\n\n\
         Title: {title}\n\
         Description: {description}\n\
         Ingredients: {ingredients}\n\
         Instructions: {instructions}\n\
         Cooking Time: {cooking_time}\n\n\
         Please answer the following question:\n\
         {question}\n\n\
         Only use the information provided in the recipe details above. If the answer \
         cannot be found in the recipe details, please state that clearly. Do not make \
         up information.",
        title = recipe.title(),
        description = recipe.description(),
        ingredients = recipe.ingredients().join(", "),
        instructions = recipe.instructions_text(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AiError;
    use crate::model::InstructionStep;
    use crate::resolve::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct CannedModel {
        reply: String,
    }

    #[async_trait]
    impl GenerativeModel for CannedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.reply.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl GenerativeModel for FailingModel {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Err(AiError::RateLimit)
        }
    }

    fn service(reply: &str) -> RecipeService<MemoryStore> {
        RecipeService::new(
            MemoryStore::new(),
            Box::new(CannedModel {
                reply: reply.to_string(),
            }),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn scraped_recipe() -> CanonicalRecipe {
        CanonicalRecipe {
            title: "Garlic Bread".to_string(),
            ingredients: vec!["1 baguette".to_string(), "4 cloves garlic".to_string()],
            instructions: vec![InstructionStep {
                step_number: 1,
                text: "Toast the bread".to_string(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_scrape_rejects_empty_url() {
        let service = service("{}");
        let response = service.scrape("   ").await;
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("URL is required"));
    }

    #[tokio::test]
    async fn test_save_stamps_owner() {
        let service = service("{}");
        let response = service.save_scraped("owner-1", scraped_recipe()).await;
        assert!(response.success);
        let saved = response.data.unwrap();
        assert!(!saved.id.is_empty());
        assert_eq!(saved.recipe.user_id.as_deref(), Some("owner-1"));

        let listed = service.list_scraped("owner-1").await;
        assert_eq!(listed.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_requires_title() {
        let service = service("{}");
        let mut recipe = scraped_recipe();
        recipe.title = "  ".to_string();
        let response = service.save_scraped("owner-1", recipe).await;
        assert!(!response.success);
        assert!(response.message.unwrap().contains("title"));
    }

    struct UnreachableModel;

    #[async_trait]
    impl GenerativeModel for UnreachableModel {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            panic!("model must not be called for a blank question");
        }
    }

    #[tokio::test]
    async fn test_ask_rejects_blank_question_before_model_call() {
        let service = RecipeService::new(
            MemoryStore::new(),
            Box::new(UnreachableModel),
            Duration::from_secs(5),
        )
        .unwrap();
        let inline = json!({"title": "Garlic Bread", "ingredients": ["1 baguette"]});

        let err = service.ask("draft", Some(&inline), "   ").await.unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.to_string(), "Question is required.");
    }

    #[tokio::test]
    async fn test_ask_grounds_on_inline_payload() {
        let service = service("Slice the baguette on the diagonal.");
        let inline = json!({"title": "Garlic Bread", "ingredients": ["1 baguette"]});

        let answer = service
            .ask("draft", Some(&inline), "How should I slice the bread?")
            .await
            .unwrap();
        assert_eq!(answer.answer, "Slice the baguette on the diagonal.");
    }

    #[tokio::test]
    async fn test_ask_maps_ai_failures() {
        let service = RecipeService::new(
            MemoryStore::new(),
            Box::new(FailingModel),
            Duration::from_secs(5),
        )
        .unwrap();
        let inline = json!({"title": "Garlic Bread", "ingredients": ["1 baguette"]});

        let err = service
            .ask("draft", Some(&inline), "A question")
            .await
            .unwrap_err();
        assert_eq!(err.status(), 429);
    }

    #[tokio::test]
    async fn test_ask_repairs_unhelpful_pairing_answer() {
        let service = service("The recipe does not provide this information.");
        let inline = json!({"title": "Garlic Bread", "ingredients": ["1 baguette"]});

        let answer = service
            .ask("draft", Some(&inline), "What should I serve with this?")
            .await
            .unwrap();
        assert!(!answer.answer.contains("does not provide"));
        assert!(answer.answer.contains("Vegetable option"));
    }

    #[test]
    fn test_ask_prompt_embeds_recipe_details() {
        let recipe = scraped_recipe();
        let prompt = build_ask_prompt(&recipe, "Can I freeze it?");
        assert!(prompt.contains("Garlic Bread"));
        assert!(prompt.contains("1 baguette, 4 cloves garlic"));
        assert!(prompt.contains("1. Toast the bread"));
        assert!(prompt.contains("Can I freeze it?"));
        assert!(prompt.contains("Only use the information provided"));
    }
}
