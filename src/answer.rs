//! Post-processing of free-text AI answers.
//!
//! Two jobs: (1) detect evasive non-answers and replace them with richer
//! heuristic guidance, (2) render "formatted" model output into tagged
//! segments for display. Both are fixed textual heuristics tuned against
//! observed model behavior; the phrase lists are deliberate constants and
//! must not be extended ad hoc.

use log::debug;

use crate::model::RecipeLike;

const HEDGING_PHRASES: [&str; 6] = [
    "cannot determine",
    "does not provide",
    "not mentioned",
    "no specific",
    "doesn't mention",
    "not specified",
];

const MITIGATING_PHRASES: [&str; 4] = ["however", "instead", "recommend", "suggest"];

const PAIRING_KEYWORDS: [&str; 5] = [
    "side dish",
    "pair with",
    "serve with",
    "accompaniment",
    "go with",
];

const SUBSTITUTION_KEYWORDS: [&str; 3] = ["substitute", "instead of", "replace"];

/// An answer is unhelpful when it hedges without offering anything in
/// return. Case-insensitive substring checks on both lists.
pub fn is_unhelpful(answer: &str) -> bool {
    let lowered = answer.to_lowercase();
    let hedges = HEDGING_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase));
    let mitigates = MITIGATING_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase));
    hedges && !mitigates
}

/// Produce the text ultimately shown to the user.
///
/// Helpful answers pass through unchanged. Unhelpful ones are repaired
/// according to what the question was about; this function never fails.
pub fn post_process_answer(raw_answer: &str, question: &str, recipe: &dyn RecipeLike) -> String {
    if !is_unhelpful(raw_answer) {
        return raw_answer.to_string();
    }

    let question_lowered = question.to_lowercase();

    if PAIRING_KEYWORDS
        .iter()
        .any(|keyword| question_lowered.contains(keyword))
    {
        debug!("replacing unhelpful answer with pairing recommendations");
        return pairing_recommendations(recipe.title());
    }

    if SUBSTITUTION_KEYWORDS
        .iter()
        .any(|keyword| question_lowered.contains(keyword))
    {
        debug!("replacing unhelpful answer with substitution guidance");
        return match find_substitution_target(question, &recipe.ingredients()) {
            Some(ingredient) => substitution_guidance(&ingredient),
            None => generic_substitution_principles(),
        };
    }

    format!(
        "The recipe itself doesn't cover this directly, so here is some general guidance:\n\n{}",
        raw_answer
    )
}

/// Canned three-category side-dish structure: a vegetable option, a
/// starch option, and one more complementary option.
fn pairing_recommendations(title: &str) -> String {
    format!(
        "Here are some sides that work well with {title}:\n\n\
         **Vegetable option:**\n\
         * Roasted seasonal vegetables or a simply dressed green salad\n\n\
         **Starch option:**\n\
         * Steamed rice, crusty bread, or buttered potatoes\n\n\
         **Something extra:**\n\
         * A tangy pickle, chutney, or yogurt-based sauce to balance the dish"
    )
}

/// The first long question token that appears inside one of the recipe's
/// lower-cased ingredient strings. Tokens of 3 characters or fewer are
/// too ambiguous to match on.
fn find_substitution_target(question: &str, ingredients: &[String]) -> Option<String> {
    let lowered_ingredients: Vec<String> = ingredients
        .iter()
        .map(|ingredient| ingredient.to_lowercase())
        .collect();

    question
        .split_whitespace()
        .filter(|token| token.len() > 3)
        .map(|token| {
            token
                .trim_matches(|ch: char| !ch.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .find(|token| {
            lowered_ingredients
                .iter()
                .any(|ingredient| ingredient.contains(token.as_str()))
        })
}

fn substitution_guidance(ingredient: &str) -> String {
    format!(
        "The recipe doesn't name a substitute for {ingredient}, but a good starting point \
         is to swap it for something with a similar role and fat or moisture content, using \
         the same amount the recipe calls for. Make the swap gradually, taste as you go, and \
         adjust seasoning at the end, since {ingredient} also affects how the dish is seasoned."
    )
}

fn generic_substitution_principles() -> String {
    "When substituting ingredients, match the role the original plays: fats for fats, \
     acids for acids, and aromatics for aromatics. Start with a one-to-one swap, taste \
     as you cook, and adjust seasoning at the end. Texture changes are normal; flavor \
     balance is what you are protecting."
        .to_string()
}

/// One display segment of a rendered answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Heading(String),
    Bullet(Vec<Span>),
    Paragraph(Vec<Span>),
    Break,
}

/// A run of text within a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Emphasis(String),
}

/// Render "formatted" model output into segments, one line at a time.
///
/// A single left-to-right pass: each line is classified independently and
/// multi-line constructs are not supported. Nothing here can fail; a line
/// that fits no rule is a plain paragraph.
pub fn render_lines(text: &str) -> Vec<Segment> {
    text.lines().map(classify_line).collect()
}

fn classify_line(line: &str) -> Segment {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Segment::Break;
    }

    if let Some(heading) = as_heading(trimmed) {
        return Segment::Heading(heading);
    }

    if let Some(rest) = trimmed
        .strip_prefix("* ")
        .or_else(|| trimmed.strip_prefix("- "))
    {
        return Segment::Bullet(parse_spans(rest.trim()));
    }

    if trimmed.contains("**") {
        return Segment::Paragraph(parse_spans(trimmed));
    }

    Segment::Paragraph(vec![Span::Text(trimmed.to_string())])
}

/// A heading is a line that is entirely bold text followed by a colon,
/// in either the `**Title:**` or `**Title**:` spelling.
fn as_heading(line: &str) -> Option<String> {
    let inner = line.strip_prefix("**")?;
    let close = inner.find("**")?;
    let (bold, after) = inner.split_at(close);
    let after = &after[2..];

    if bold.ends_with(':') && after.is_empty() {
        return Some(bold.trim_end_matches(':').trim().to_string());
    }
    if after == ":" {
        return Some(bold.trim().to_string());
    }
    None
}

/// Split interior `**bold**` markers into alternating text and emphasis
/// spans. An unpaired marker is kept as literal text.
fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let (before, after_open) = rest.split_at(open);
        let after_open = &after_open[2..];

        let Some(close) = after_open.find("**") else {
            break;
        };

        if !before.is_empty() {
            spans.push(Span::Text(before.to_string()));
        }
        let (bold, after_close) = after_open.split_at(close);
        if !bold.is_empty() {
            spans.push(Span::Emphasis(bold.to_string()));
        }
        rest = &after_close[2..];
    }

    if !rest.is_empty() {
        spans.push(Span::Text(rest.to_string()));
    }
    spans
}
