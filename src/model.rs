use serde::{Deserialize, Serialize};

/// The normalized, persistable recipe shape.
///
/// Field names match the stored-document format and must stay stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanonicalRecipe {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, rename = "prepTime")]
    pub prep_time: String,
    #[serde(default, rename = "cookTime")]
    pub cook_time: String,
    #[serde(default, rename = "totalTime")]
    pub total_time: String,
    #[serde(default, rename = "yield")]
    pub yield_: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<InstructionStep>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "unknown_source", rename = "sourceUrl")]
    pub source_url: String,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Sentinel for pages that declared no source URL.
pub const UNKNOWN_SOURCE: &str = "unknown";

fn unknown_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

/// A single instruction step, numbered positionally from 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstructionStep {
    #[serde(rename = "stepNumber")]
    pub step_number: u32,
    pub text: String,
}

/// Read-only recipe representation from the third-party catalog.
///
/// Not owned by this system; distinguished from [`CanonicalRecipe`] by its
/// numeric `id` and the `extendedIngredients`/`analyzedInstructions` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalRecipeView {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, rename = "readyInMinutes")]
    pub ready_in_minutes: Option<u32>,
    #[serde(default, rename = "extendedIngredients")]
    pub extended_ingredients: Vec<ExtendedIngredient>,
    #[serde(default, rename = "analyzedInstructions")]
    pub analyzed_instructions: Vec<InstructionBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendedIngredient {
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default, rename = "originalString")]
    pub original_string: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ExtendedIngredient {
    /// Display text: `original`, falling back to `originalString`, then `name`.
    pub fn display(&self) -> Option<&str> {
        [&self.original, &self.original_string, &self.name]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructionBlock {
    #[serde(default)]
    pub steps: Vec<ExternalStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalStep {
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub step: String,
}

/// AI-derived metadata merged into a recipe once, at scrape time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiEnrichment {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub alternatives: Alternatives,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alternatives {
    #[serde(default)]
    pub formatted: bool,
    #[serde(default)]
    pub content: String,
}

/// Capability shared by recipe-like shapes regardless of provenance.
///
/// The canonical and external shapes have genuinely different field sets;
/// callers that only need title/ingredients/instructions go through this
/// trait instead of unifying the storage shapes.
pub trait RecipeLike {
    fn title(&self) -> &str;
    fn description(&self) -> &str {
        ""
    }
    fn ingredients(&self) -> Vec<String>;
    fn instructions_text(&self) -> String;

    /// Human-readable cooking time, if one is known.
    fn cooking_time(&self) -> Option<String> {
        None
    }
}

impl RecipeLike for CanonicalRecipe {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn ingredients(&self) -> Vec<String> {
        self.ingredients.clone()
    }

    fn instructions_text(&self) -> String {
        self.instructions
            .iter()
            .map(|step| format!("{}. {}", step.step_number, step.text))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn cooking_time(&self) -> Option<String> {
        [&self.total_time, &self.cook_time]
            .into_iter()
            .find(|time| !time.is_empty())
            .cloned()
    }
}

impl RecipeLike for ExternalRecipeView {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.summary
    }

    fn ingredients(&self) -> Vec<String> {
        self.extended_ingredients
            .iter()
            .filter_map(|ing| ing.display())
            .map(str::to_string)
            .collect()
    }

    fn instructions_text(&self) -> String {
        self.analyzed_instructions
            .first()
            .map(|block| {
                block
                    .steps
                    .iter()
                    .map(|step| format!("{}. {}", step.number, step.step))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    fn cooking_time(&self) -> Option<String> {
        self.ready_in_minutes
            .map(|minutes| format!("{} minutes", minutes))
    }
}

/// A persisted recipe together with the identifier the store assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRecipe {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub recipe: CanonicalRecipe,
}

/// Uniform response envelope for the scrape/save/list family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Envelope for the question-answering family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskAnswer {
    pub answer: String,
}
