use std::time::Duration;

use mockito::Matcher;
use recipe_harvest::config::AiSettings;
use recipe_harvest::service::RecipeService;
use recipe_harvest::{CanonicalRecipe, GeminiModel, InstructionStep, MemoryStore};
use serde_json::json;

async fn service_against(server: &mockito::Server) -> RecipeService<MemoryStore> {
    let settings = AiSettings {
        api_key: Some("test-key".to_string()),
        base_url: Some(server.url()),
        ..Default::default()
    };
    let model = GeminiModel::new(&settings, Duration::from_secs(5)).unwrap();
    RecipeService::new(MemoryStore::new(), Box::new(model), Duration::from_secs(5)).unwrap()
}

fn model_mock(server: &mut mockito::Server, reply_text: &str) -> mockito::Mock {
    let body = json!({
        "candidates": [{"content": {"parts": [{"text": reply_text}]}}]
    });
    server
        .mock("POST", Matcher::Regex(r"^/models/.*$".to_string()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create()
}

fn stored_recipe() -> CanonicalRecipe {
    CanonicalRecipe {
        title: "Roast Chicken".to_string(),
        description: "A simple roast".to_string(),
        ingredients: vec![
            "1 whole chicken".to_string(),
            "2 cups olive oil".to_string(),
        ],
        instructions: vec![InstructionStep {
            step_number: 1,
            text: "Roast at 200C for an hour".to_string(),
        }],
        total_time: "1 hour and 10 minutes".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_ask_about_persisted_recipe() {
    let mut server = mockito::Server::new_async().await;
    let _model = model_mock(&mut server, "Roast it at 200C, as the recipe says.");

    let service = service_against(&server).await;
    let saved = service
        .save_scraped("owner-1", stored_recipe())
        .await
        .data
        .unwrap();

    let answer = service
        .ask(&saved.id, None, "What temperature should I use?")
        .await
        .unwrap();
    assert_eq!(answer.answer, "Roast it at 200C, as the recipe says.");
}

#[tokio::test]
async fn test_ask_unknown_recipe_is_not_found() {
    let server = mockito::Server::new_async().await;
    let service = service_against(&server).await;

    let err = service
        .ask("507f1f77bcf86cd799439011", None, "Anything?")
        .await
        .unwrap_err();
    assert_eq!(err.status(), 404);
}

#[tokio::test]
async fn test_ask_inline_external_recipe() {
    let mut server = mockito::Server::new_async().await;
    let _model = model_mock(&mut server, "Cook the spaghetti for 9 minutes.");

    let service = service_against(&server).await;
    let inline = json!({
        "id": 715538,
        "title": "Spaghetti Aglio e Olio",
        "readyInMinutes": 25,
        "extendedIngredients": [
            {"original": "200g spaghetti"},
            {"originalString": "3 cloves garlic"}
        ],
        "analyzedInstructions": [
            {"steps": [{"number": 1, "step": "Boil the spaghetti"}]}
        ]
    });

    let answer = service
        .ask("715538", Some(&inline), "How long do I cook the pasta?")
        .await
        .unwrap();
    assert_eq!(answer.answer, "Cook the spaghetti for 9 minutes.");
}

#[tokio::test]
async fn test_ask_inline_recipe_without_ingredients_is_rejected() {
    let server = mockito::Server::new_async().await;
    let service = service_against(&server).await;

    let inline = json!({"title": "Mystery Dish", "ingredients": []});
    let err = service
        .ask("draft", Some(&inline), "What is in it?")
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_ask_requires_a_question() {
    // No model mock is registered: a 400 here shows the request is
    // rejected before the model endpoint is ever contacted.
    let server = mockito::Server::new_async().await;
    let service = service_against(&server).await;
    let saved = service
        .save_scraped("owner-1", stored_recipe())
        .await
        .data
        .unwrap();

    let err = service.ask(&saved.id, None, "").await.unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(err.to_string(), "Question is required.");
}

#[tokio::test]
async fn test_unhelpful_pairing_answer_is_repaired() {
    let mut server = mockito::Server::new_async().await;
    let _model = model_mock(&mut server, "The recipe does not provide this information.");

    let service = service_against(&server).await;
    let saved = service
        .save_scraped("owner-1", stored_recipe())
        .await
        .data
        .unwrap();

    let answer = service
        .ask(&saved.id, None, "What should I pair with this?")
        .await
        .unwrap();
    assert!(!answer.answer.contains("does not provide"));
    assert!(answer.answer.contains("Vegetable option"));
    assert!(answer.answer.contains("Starch option"));
}

#[tokio::test]
async fn test_unhelpful_substitution_answer_names_ingredient() {
    let mut server = mockito::Server::new_async().await;
    let _model = model_mock(&mut server, "The recipe does not provide this information.");

    let service = service_against(&server).await;
    let saved = service
        .save_scraped("owner-1", stored_recipe())
        .await
        .data
        .unwrap();

    let answer = service
        .ask(&saved.id, None, "Can I substitute butter for oil?")
        .await
        .unwrap();
    assert!(!answer.answer.contains("does not provide"));
    assert!(answer.answer.contains("oil"));
}

#[tokio::test]
async fn test_ask_maps_upstream_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    let _model = server
        .mock("POST", Matcher::Regex(r"^/models/.*$".to_string()))
        .match_query(Matcher::Any)
        .with_status(401)
        .create();

    let service = service_against(&server).await;
    let saved = service
        .save_scraped("owner-1", stored_recipe())
        .await
        .data
        .unwrap();

    let err = service.ask(&saved.id, None, "A question").await.unwrap_err();
    assert_eq!(err.status(), 401);
}
