use std::env;
use std::time::Duration;

use recipe_harvest::service::RecipeService;
use recipe_harvest::{AppConfig, GeminiModel, MemoryStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let url = args
        .get(1)
        .ok_or("Usage: recipe-harvest <url> [--ask \"<question>\"]")?;
    let question = match args.get(2).map(String::as_str) {
        Some("--ask") => Some(
            args.get(3)
                .ok_or("--ask requires a question argument")?
                .clone(),
        ),
        Some(other) => return Err(format!("Unknown argument: {other}").into()),
        None => None,
    };

    let config = AppConfig::load().unwrap_or_default();
    let timeout = Duration::from_secs(config.http_timeout_secs);
    let model = GeminiModel::new(&config.ai, timeout)?;
    let service = RecipeService::new(MemoryStore::new(), Box::new(model), timeout)?;

    let response = service.scrape(url).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(question) = question {
        let Some(recipe) = response.data else {
            return Err("Cannot ask about a recipe that failed to scrape".into());
        };
        let inline = serde_json::to_value(&recipe)?;
        let answer = service
            .ask("scratch", Some(&inline), &question)
            .await
            .map_err(|err| err.to_string())?;
        println!("{}", serde_json::to_string_pretty(&answer)?);
    }

    Ok(())
}
