//! Structured-data locator: finds the first JSON-LD Recipe block on a page.

use log::debug;
use scraper::{Html, Selector};
use serde_json::Value;

/// Scan a page's `application/ld+json` blocks in document order and return
/// the first Recipe-typed value, if any.
///
/// Malformed JSON in a block is treated identically to the block not
/// existing: skip it and keep scanning.
pub fn locate_recipe_block(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("script[type='application/ld+json']").expect("valid literal selector");

    for script in document.select(&selector) {
        let raw = script.inner_html();
        let parsed: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(err) => {
                debug!("skipping unparseable ld+json block: {err}");
                continue;
            }
        };

        if let Some(recipe) = evaluate_block(parsed) {
            return Some(recipe);
        }
    }

    None
}

/// Evaluate one parsed block: array head, `@graph` member scan, or the
/// top-level object itself. Only one recipe per block is ever taken.
fn evaluate_block(block: Value) -> Option<Value> {
    match block {
        Value::Array(mut items) => {
            if items.is_empty() {
                return None;
            }
            let head = items.swap_remove(0);
            is_recipe_typed(&head).then_some(head)
        }
        Value::Object(_) => {
            if is_recipe_typed(&block) {
                return Some(block);
            }
            let graph = block.get("@graph")?.as_array()?;
            graph.iter().find(|member| is_recipe_typed(member)).cloned()
        }
        _ => None,
    }
}

/// `@type` may be a string or an array of strings; either form counts if
/// it names "Recipe".
fn is_recipe_typed(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(type_name)) => type_name == "Recipe",
        Some(Value::Array(type_names)) => type_names
            .iter()
            .any(|name| name.as_str() == Some("Recipe")),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_blocks(blocks: &[&str]) -> String {
        let scripts: String = blocks
            .iter()
            .map(|block| {
                format!(
                    "<script type=\"application/ld+json\">{}</script>",
                    block
                )
            })
            .collect();
        format!(
            "<!DOCTYPE html><html><head>{}</head><body><h1>Recipe</h1></body></html>",
            scripts
        )
    }

    #[test]
    fn test_top_level_recipe_object() {
        let html = page_with_blocks(&[r#"{"@type": "Recipe", "name": "Toast"}"#]);
        let block = locate_recipe_block(&html).unwrap();
        assert_eq!(block["name"], "Toast");
    }

    #[test]
    fn test_array_takes_first_element() {
        let html = page_with_blocks(&[
            r#"[{"@type": "Recipe", "name": "Pasta"}, {"@type": "Recipe", "name": "Salad"}]"#,
        ]);
        let block = locate_recipe_block(&html).unwrap();
        assert_eq!(block["name"], "Pasta");
    }

    #[test]
    fn test_array_with_non_recipe_head_is_rejected() {
        let html = page_with_blocks(&[
            r#"[{"@type": "WebSite", "name": "Food Blog"}, {"@type": "Recipe", "name": "Pasta"}]"#,
        ]);
        assert!(locate_recipe_block(&html).is_none());
    }

    #[test]
    fn test_graph_scan_finds_recipe_member() {
        let html = page_with_blocks(&[r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebPage", "name": "A page"},
                {"@type": "Recipe", "name": "Stew"},
                {"@type": "Person", "name": "A chef"}
            ]
        }"#]);
        let block = locate_recipe_block(&html).unwrap();
        assert_eq!(block["name"], "Stew");
    }

    #[test]
    fn test_type_array_matches_recipe() {
        let html =
            page_with_blocks(&[r#"{"@type": ["Recipe", "NewsArticle"], "name": "Pie"}"#]);
        assert!(locate_recipe_block(&html).is_some());
    }

    #[test]
    fn test_malformed_json_is_skipped_not_fatal() {
        let html = page_with_blocks(&[
            r#"{"@type": "Recipe", "name": "#,
            r#"{"@type": "Recipe", "name": "Soup"}"#,
        ]);
        let block = locate_recipe_block(&html).unwrap();
        assert_eq!(block["name"], "Soup");
    }

    #[test]
    fn test_no_recipe_anywhere_returns_none() {
        let html = page_with_blocks(&[
            r#"{"@type": "WebSite", "name": "Food Blog"}"#,
            r#"{"@graph": [{"@type": "Person", "name": "A chef"}]}"#,
        ]);
        assert!(locate_recipe_block(&html).is_none());
    }

    #[test]
    fn test_page_without_blocks_returns_none() {
        let html = "<!DOCTYPE html><html><body><p>No structured data here</p></body></html>";
        assert!(locate_recipe_block(html).is_none());
    }
}
