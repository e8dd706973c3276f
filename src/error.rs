use thiserror::Error;

/// Errors that can occur while scraping and normalizing a recipe page.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The page loaded but carried no structured Recipe block
    #[error("No recipe data found on the page")]
    NoRecipeFound,

    /// A Recipe block was found but required fields were absent
    #[error("Could not parse recipe data: {0}")]
    UnparseableRecipe(String),

    /// Network-level failure while fetching the page
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The page responded with a non-success status
    #[error("Page returned HTTP status {0}")]
    HttpStatus(u16),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ScrapeError {
    /// HTTP-style status code for the user-facing layer.
    pub fn status(&self) -> u16 {
        match self {
            ScrapeError::NoRecipeFound | ScrapeError::UnparseableRecipe(_) => 422,
            ScrapeError::Fetch(_) | ScrapeError::HttpStatus(_) => 502,
            ScrapeError::Config(_) => 500,
        }
    }
}

/// Failures of the generative-AI capability, split by upstream cause.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI service authentication failed")]
    Auth,

    #[error("AI service rate limit exceeded")]
    RateLimit,

    #[error("AI model is currently unavailable")]
    ModelUnavailable,

    #[error("AI request failed: {0}")]
    Unknown(String),
}

impl AiError {
    pub fn status(&self) -> u16 {
        match self {
            AiError::Auth => 401,
            AiError::RateLimit => 429,
            AiError::ModelUnavailable | AiError::Unknown(_) => 500,
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Unknown(err.to_string())
    }
}

/// Errors from the question-answering flow.
#[derive(Error, Debug)]
pub enum AskError {
    /// The caller supplied no question text
    #[error("Question is required.")]
    QuestionRequired,

    /// Neither the store nor the inline payload yielded a recipe
    #[error("Recipe not found")]
    RecipeNotFound,

    /// The working recipe has no ingredients to ground an answer on
    #[error("Recipe does not contain enough data to answer questions")]
    InsufficientRecipeData,

    /// The upstream AI call failed
    #[error(transparent)]
    Ai(#[from] AiError),
}

impl AskError {
    pub fn status(&self) -> u16 {
        match self {
            AskError::RecipeNotFound => 404,
            AskError::QuestionRequired | AskError::InsufficientRecipeData => 400,
            AskError::Ai(err) => err.status(),
        }
    }
}
