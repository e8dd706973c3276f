//! Field normalization for adversarial structured-data shapes.
//!
//! Publishers encode the same schema.org property in incompatible ways:
//! strings, arrays, nested objects, arrays of arrays, typed sub-objects.
//! Every branch here corresponds to an observed real-world variant, and
//! every function is total; no input shape produces an error.

use html_escape::decode_html_entities;
use serde_json::Value;

use crate::duration::duration_to_text;
use crate::error::ScrapeError;
use crate::model::{CanonicalRecipe, InstructionStep, UNKNOWN_SOURCE};

/// Build a [`CanonicalRecipe`] from a located Recipe block.
///
/// Only a missing or empty `name` is fatal; every other field falls back
/// to its canonical empty form.
pub fn canonical_from_block(block: &Value, page_url: &str) -> Result<CanonicalRecipe, ScrapeError> {
    let title = block
        .get("name")
        .map(|name| decode_html_symbols(&stringify(name)))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ScrapeError::UnparseableRecipe("recipe has no name".to_string()))?;

    Ok(CanonicalRecipe {
        title,
        description: decode_html_symbols(&scalar_string(block.get("description"))),
        summary: String::new(),
        image: normalize_image(block.get("image")),
        prep_time: duration_to_text(block.get("prepTime").and_then(Value::as_str)),
        cook_time: duration_to_text(block.get("cookTime").and_then(Value::as_str)),
        total_time: duration_to_text(block.get("totalTime").and_then(Value::as_str)),
        yield_: normalize_yield(block.get("recipeYield")),
        ingredients: normalize_ingredients(block.get("recipeIngredient")),
        instructions: normalize_instructions(block.get("recipeInstructions")),
        tags: normalize_tags(block.get("keywords")),
        categories: normalize_categories(block.get("recipeCategory"), block.get("category")),
        cuisine: normalize_cuisine(block.get("recipeCuisine")),
        notes: String::new(),
        source_url: normalize_source_url(block.get("url"), page_url),
        user_id: None,
    })
}

/// Decode HTML entities. Real pages double-encode often enough that a
/// single pass leaves `&amp;amp;` behind, so decode twice.
pub fn decode_html_symbols(text: &str) -> String {
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

/// A single resolved image URL from any of the shapes seen in the wild.
pub fn normalize_image(image: Option<&Value>) -> String {
    match image {
        Some(Value::String(url)) => url.clone(),
        Some(Value::Array(items)) => match items.first() {
            Some(Value::String(url)) => url.clone(),
            Some(Value::Object(_)) => image_object_url(items.first()),
            _ => String::new(),
        },
        Some(Value::Object(_)) => image_object_url(image),
        _ => String::new(),
    }
}

fn image_object_url(value: Option<&Value>) -> String {
    value
        .and_then(|obj| obj.get("url"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Instruction steps, numbered positionally from 1 regardless of any
/// ordering info the source carried.
pub fn normalize_instructions(instructions: Option<&Value>) -> Vec<InstructionStep> {
    let Some(Value::Array(items)) = instructions else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(decode_html_symbols(text)),
            // HowToStep objects, typed or not, carry the step in `text`
            Value::Object(obj) => obj
                .get("text")
                .and_then(Value::as_str)
                .map(decode_html_symbols),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .enumerate()
        .map(|(index, text)| InstructionStep {
            step_number: index as u32 + 1,
            text,
        })
        .collect()
}

/// Flatten arbitrarily nested category arrays into a deduplicated flat
/// list, then append a singular `category` value if it is new.
pub fn normalize_categories(categories: Option<&Value>, category: Option<&Value>) -> Vec<String> {
    let mut flat = Vec::new();
    if let Some(value) = categories {
        flatten_into(value, &mut flat);
    }

    let mut result: Vec<String> = Vec::new();
    for entry in flat {
        if !result.contains(&entry) {
            result.push(entry);
        }
    }

    if let Some(value) = category {
        let singular = stringify(value);
        let singular = singular.trim();
        if !singular.is_empty() && !result.iter().any(|existing| existing == singular) {
            result.push(singular.to_string());
        }
    }

    result
}

fn flatten_into(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        other => {
            let text = stringify(other);
            let text = text.trim();
            if !text.is_empty() {
                out.push(decode_html_symbols(text));
            }
        }
    }
}

/// Cuisine collapses to a single string: first element of an array, the
/// string itself, or a stringified scalar.
pub fn normalize_cuisine(cuisine: Option<&Value>) -> String {
    match cuisine {
        Some(Value::Array(items)) => items.first().map(stringify).unwrap_or_default(),
        Some(value) => stringify(value),
        None => String::new(),
    }
}

/// Tags: lower-cased, trimmed, deduplicated, empties dropped.
pub fn normalize_tags(tags: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match tags {
        Some(Value::Array(items)) => items.iter().map(stringify).collect(),
        Some(Value::String(tag)) => vec![tag.clone()],
        _ => Vec::new(),
    };

    let mut result: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !result.contains(&tag) {
            result.push(tag);
        }
    }
    result
}

/// Ingredients: each non-empty element stringified, order preserved.
pub fn normalize_ingredients(ingredients: Option<&Value>) -> Vec<String> {
    match ingredients {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| decode_html_symbols(stringify(item).trim()))
            .filter(|text| !text.is_empty())
            .collect(),
        Some(Value::String(ingredient)) if !ingredient.trim().is_empty() => {
            vec![decode_html_symbols(ingredient.trim())]
        }
        _ => Vec::new(),
    }
}

/// Yield: first element of an array, or the scalar itself.
pub fn normalize_yield(recipe_yield: Option<&Value>) -> String {
    match recipe_yield {
        Some(Value::Array(items)) => items.first().map(stringify).unwrap_or_default(),
        Some(value) => stringify(value),
        None => String::new(),
    }
}

/// The stored document requires a non-empty source URL; fall back to the
/// fetched page URL, then to the explicit sentinel.
pub fn normalize_source_url(url: Option<&Value>, page_url: &str) -> String {
    if let Some(Value::String(declared)) = url {
        if !declared.trim().is_empty() {
            return declared.trim().to_string();
        }
    }
    if !page_url.trim().is_empty() {
        return page_url.trim().to_string();
    }
    UNKNOWN_SOURCE.to_string()
}

fn scalar_string(value: Option<&Value>) -> String {
    value.map(stringify).unwrap_or_default()
}

/// Scalars become their natural string form; containers become `""`.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    }
}
