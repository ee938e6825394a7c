//! Narration script rendered from an [`AnalysisResult`].

use crate::analysis::AnalysisResult;

/// Narrated in place of a missing TL;DR.
pub const FALLBACK_SUMMARY: &str =
    "Something's different between your local setup and production.";

const SIGN_OFF: &str = "Good luck, and may your deploys be ever successful!";

/// Render the fixed narration template for `result`.
///
/// ```
/// use it_works_locally::analysis::AnalysisResult;
/// use it_works_locally::speech::narration_script;
///
/// let result = AnalysisResult {
///     root_cause: "Missing env var".into(),
///     fix_steps: vec!["Step 1: Set DATABASE_URL".into()],
///     prevention_tips: vec!["Validate config at boot".into()],
///     tldr: Some("Prod forgot its keys".into()),
///     category: None,
///     severity: None,
///     estimated_fix_time: None,
/// };
/// let script = narration_script(&result);
/// assert!(script.contains("Step 1: Set DATABASE_URL"));
/// assert!(!script.contains("Step 1: Step 1:"));
/// ```
pub fn narration_script(result: &AnalysisResult) -> String {
    let summary = result.tldr.as_deref().unwrap_or(FALLBACK_SUMMARY);

    let steps = result
        .fix_steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("Step {}: {}", i + 1, strip_step_prefix(step)))
        .collect::<Vec<_>>()
        .join(". ");

    let tips = result.prevention_tips.join(". ");

    format!(
        "Here's the quick summary: {summary}.\n\n\
         What went wrong: {cause}.\n\n\
         Here's how to fix it: {steps}.\n\n\
         To prevent this in the future: {tips}.\n\n\
         {SIGN_OFF}",
        summary = trim_period(summary),
        cause = trim_period(&result.root_cause),
    )
}

/// Drop a leading `Step N:` label (any case, optional spaces).
pub fn strip_step_prefix(step: &str) -> &str {
    let trimmed = step.trim_start();

    let Some(head) = trimmed.get(..4) else {
        return step.trim();
    };
    if !head.eq_ignore_ascii_case("step") {
        return step.trim();
    }

    let rest = trimmed[4..].trim_start();
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return step.trim();
    }

    match rest[digits..].trim_start().strip_prefix(':') {
        Some(body) => body.trim(),
        None => step.trim(),
    }
}

/// Avoid ".." when a sentence already ends with a period.
fn trim_period(text: &str) -> &str {
    text.trim().trim_end_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> AnalysisResult {
        AnalysisResult {
            root_cause: "Prod has no DATABASE_URL.".into(),
            fix_steps: vec![
                "Step 1: Add DATABASE_URL to the prod secrets".into(),
                "step 2 : Redeploy".into(),
                "Check the health endpoint".into(),
            ],
            prevention_tips: vec!["Validate config at boot".into(), "Use a .env.example".into()],
            tldr: Some("Prod forgot its keys".into()),
            category: None,
            severity: None,
            estimated_fix_time: None,
        }
    }

    #[test]
    fn strip_step_prefix_variants() {
        assert_eq!(strip_step_prefix("Step 1: Upgrade Node"), "Upgrade Node");
        assert_eq!(strip_step_prefix("STEP 12:Pin it"), "Pin it");
        assert_eq!(strip_step_prefix("  step 3 :  Redeploy "), "Redeploy");
        assert_eq!(strip_step_prefix("Steps to success"), "Steps to success");
        assert_eq!(strip_step_prefix("Step up the logging"), "Step up the logging");
        assert_eq!(strip_step_prefix("Step 4 restart"), "Step 4 restart");
        assert_eq!(strip_step_prefix("Run"), "Run");
    }

    #[test]
    fn steps_are_renumbered_without_duplicate_prefix() {
        let script = narration_script(&result());
        assert!(script.contains(
            "Here's how to fix it: Step 1: Add DATABASE_URL to the prod secrets. \
             Step 2: Redeploy. Step 3: Check the health endpoint."
        ));
        assert!(!script.to_lowercase().contains("step 1: step"));
    }

    #[test]
    fn template_sections_appear_in_order() {
        let script = narration_script(&result());
        let order = [
            "Here's the quick summary: Prod forgot its keys.",
            "What went wrong: Prod has no DATABASE_URL.",
            "Here's how to fix it:",
            "To prevent this in the future: Validate config at boot. Use a .env.example.",
            SIGN_OFF,
        ];
        let mut last = 0;
        for part in order {
            let pos = script.find(part).unwrap_or_else(|| panic!("missing {part:?}"));
            assert!(pos >= last, "{part:?} out of order");
            last = pos;
        }
    }

    #[test]
    fn missing_tldr_uses_fallback_summary() {
        let mut r = result();
        r.tldr = None;
        let script = narration_script(&r);
        assert!(script.contains(
            "Here's the quick summary: Something's different between your local setup and production."
        ));
    }
}
