//! Prompt builder for the "works locally, fails in prod" analysis.
//!
//! [`PromptBuilder`] renders a single instruction string embedding the
//! user's error text, both environment descriptions, a tone directive chosen
//! by [`ExpertiseLevel`], and the exact JSON shape the reply must follow.

use crate::analysis::types::{AnalysisRequest, Category, ExpertiseLevel, Severity};

// ---------------------------------------------------------------------------
// Tone directives
// ---------------------------------------------------------------------------

const TONE_JUNIOR: &str = "\
Explain in a friendly, educational way with analogies. Assume they know basic \
programming but might not understand infrastructure deeply. Be encouraging.";

const TONE_SENIOR: &str = "\
Be concise and technical. Skip the basics, focus on edge cases, root causes, \
and advanced debugging strategies. No hand-holding needed.";

const TONE_INTERN: &str = "\
Explain like they just mass-applied to 500 jobs and somehow got this one. Use \
humor, Gen-Z references, and be very patient. Assume they've been mass \
console.log() debugging and crying. Make it funny but helpful.";

const NOT_PROVIDED: &str = "Not provided - make reasonable assumptions";

const PREAMBLE: &str = "\
You are an expert developer debugging assistant called \"It Works Locally\". \
A developer's code works on their local machine but fails in production. \
Your job is to analyze and help.";

const RULES: &str = "\
Important:
- Be accurate and helpful
- Match the tone to the expertise level
- If the error is ambiguous, provide the MOST LIKELY cause based on common patterns
- Make the tldr punchy and shareable
- Ensure valid JSON output";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds analysis prompts.
///
/// ```rust
/// use it_works_locally::analysis::{AnalysisRequest, ExpertiseLevel, PromptBuilder};
///
/// let req = AnalysisRequest::new("ECONNREFUSED 127.0.0.1:5432", "", "", ExpertiseLevel::Senior);
/// let prompt = PromptBuilder::new().build(&req);
/// assert!(prompt.contains("ECONNREFUSED"));
/// assert!(prompt.contains(PromptBuilder::tone(ExpertiseLevel::Senior)));
/// ```
#[derive(Debug, Default, Clone)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// The communication-style directive for `level`.
    pub fn tone(level: ExpertiseLevel) -> &'static str {
        match level {
            ExpertiseLevel::Junior => TONE_JUNIOR,
            ExpertiseLevel::Senior => TONE_SENIOR,
            ExpertiseLevel::Intern => TONE_INTERN,
        }
    }

    /// Render the full instruction for `request`.
    pub fn build(&self, request: &AnalysisRequest) -> String {
        let mut prompt = String::with_capacity(2048 + request.error_text.len());

        prompt.push_str(PREAMBLE);
        prompt.push_str("\n\n**Error/Logs Provided:**\n");
        prompt.push_str(request.error_text.trim());
        prompt.push_str("\n\n**Local Environment Details:**\n");
        prompt.push_str(or_not_provided(&request.local_env));
        prompt.push_str("\n\n**Production Environment Details:**\n");
        prompt.push_str(or_not_provided(&request.prod_env));
        prompt.push_str("\n\n**Communication Style:**\n");
        prompt.push_str(Self::tone(request.expertise));
        prompt.push_str("\n\n");
        prompt.push_str(&response_shape());
        prompt.push_str("\n\n");
        prompt.push_str(RULES);
        prompt
    }
}

fn or_not_provided(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}

fn response_shape() -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ");
    let severities = Severity::ALL
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Analyze this situation and respond in this EXACT JSON format \
(no markdown code blocks, just pure valid JSON):

{{
  \"whatWentWrong\": \"A clear explanation of the root cause in 2-4 sentences. Be specific about WHY it works locally but fails in prod.\",
  \"howToFix\": [\"Step 1: Specific actionable fix\", \"Step 2: Another step if needed\", \"Step 3: Verification step\"],
  \"preventionTips\": [\"Tip 1: How to prevent this in future\", \"Tip 2: Best practice\", \"Tip 3: Tool or process recommendation\"],
  \"tldr\": \"One witty sentence summarizing the issue - make it memorable\",
  \"category\": \"One of: {categories}\",
  \"severity\": \"One of: {severities}\",
  \"estimatedFixTime\": \"Rough time to fix, e.g. 15 minutes\"
}}"
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
