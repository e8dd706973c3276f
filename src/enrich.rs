//! AI enrichment: tags, categories, summary, notes and serving
//! alternatives derived once per scraped recipe.
//!
//! Enrichment is best-effort. Any call or parse failure collapses to a
//! minimal enrichment built from the scrape-time fields; the caller never
//! sees an error from this module.

use log::warn;
use serde_json::json;

use crate::ai::GenerativeModel;
use crate::model::{AiEnrichment, CanonicalRecipe};
use crate::normalize::normalize_tags;

/// Enrich a freshly normalized recipe. Never fails; on any upstream or
/// parse problem the recipe comes back with the fallback enrichment.
pub async fn enrich_recipe(
    model: &dyn GenerativeModel,
    mut recipe: CanonicalRecipe,
) -> CanonicalRecipe {
    let enrichment = match model.generate(&build_enrichment_prompt(&recipe)).await {
        Ok(reply) => parse_enrichment_reply(&reply).unwrap_or_else(|| {
            warn!("enrichment reply was not parseable JSON, using fallback");
            fallback_enrichment(&recipe)
        }),
        Err(err) => {
            warn!("enrichment call failed ({err}), using fallback");
            fallback_enrichment(&recipe)
        }
    };

    apply_enrichment(&mut recipe, enrichment);
    recipe
}

/// Prompt embedding the full recipe and the reply-format protocol.
pub fn build_enrichment_prompt(recipe: &CanonicalRecipe) -> String {
    let recipe_json = serde_json::to_string(recipe).unwrap_or_default();
    format!(
        r#"Given this recipe data, create a well-structured recipe card with appropriate tags and categories.
Recipe data: {recipe_json}

Please provide:
1. A list of relevant tags (e.g., vegetarian, gluten-free, quick-meals)
2. A list of categories (e.g., breakfast, lunch, dinner, dessert)
3. A brief summary of the recipe
4. Any additional notes or suggestions
5. Serving alternatives and variations, formatted with section headers (bold text followed by a colon), bullet lists (lines starting with * or -) and short paragraphs

Format the response as JSON with the following structure:
{{
  "tags": [],
  "categories": [],
  "summary": "",
  "notes": "",
  "alternatives": {{"formatted": true, "content": ""}}
}}"#
    )
}

/// Parse a model reply that may be pure JSON, JSON inside a fenced code
/// block, or JSON with trailing prose. Returns `None` when no parseable
/// JSON object can be located.
pub fn parse_enrichment_reply(reply: &str) -> Option<AiEnrichment> {
    let payload = extract_json_payload(reply)?;
    let enrichment: AiEnrichment = serde_json::from_str(payload).ok()?;
    Some(normalize_enrichment(enrichment))
}

/// The JSON substring of a reply: the first fenced block if present,
/// otherwise the span from the first `{` to the last `}`.
fn extract_json_payload(reply: &str) -> Option<&str> {
    let trimmed = reply.trim();

    if let Some(fence_start) = trimmed.find("```") {
        let after_fence = &trimmed[fence_start + 3..];
        // Skip an optional language tag on the fence line
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        let body = match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        };
        return Some(body.trim());
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

/// Post-parse normalization mirroring the field normalizer: tags
/// lower-cased and deduplicated, categories trimmed and deduplicated.
fn normalize_enrichment(mut enrichment: AiEnrichment) -> AiEnrichment {
    enrichment.tags = normalize_tags(Some(&json!(enrichment.tags)));

    let mut categories: Vec<String> = Vec::new();
    for category in enrichment.categories {
        let category = category.trim().to_string();
        if !category.is_empty() && !categories.contains(&category) {
            categories.push(category);
        }
    }
    enrichment.categories = categories;

    enrichment.summary = enrichment.summary.trim().to_string();
    enrichment.notes = enrichment.notes.trim().to_string();
    enrichment
}

/// Minimal enrichment built from scrape-time fields only.
pub fn fallback_enrichment(recipe: &CanonicalRecipe) -> AiEnrichment {
    AiEnrichment {
        tags: Vec::new(),
        categories: recipe.categories.clone(),
        summary: recipe.description.clone(),
        notes: String::new(),
        ..Default::default()
    }
}

/// Merge an enrichment into the recipe, keeping scrape-time values where
/// the enrichment came back empty.
fn apply_enrichment(recipe: &mut CanonicalRecipe, enrichment: AiEnrichment) {
    recipe.tags = enrichment.tags;

    if !enrichment.categories.is_empty() {
        recipe.categories = enrichment.categories;
    }

    recipe.summary = if enrichment.summary.is_empty() {
        recipe.description.clone()
    } else {
        enrichment.summary
    };

    recipe.notes = enrichment.notes;
    // Formatted alternatives ride along in notes, so notes may carry
    // markdown-lite text. [`crate::answer::render_lines`] segments it
    // back into headings, bullets and paragraphs for display.
    if enrichment.alternatives.formatted && !enrichment.alternatives.content.is_empty() {
        if recipe.notes.is_empty() {
            recipe.notes = enrichment.alternatives.content;
        } else {
            recipe.notes = format!("{}\n\n{}", recipe.notes, enrichment.alternatives.content);
        }
    }
}
