use super::outcome::Attempt;

pub const DEFAULT_FEEDBACK_TEMPLATE: &str = "{prompt}

Your previous answer (attempt {attempt}) scored {score} and was not accepted.

Previous answer:
{output}

Revise the answer and address this feedback:
{feedback}";

/// Template used to fold the last evaluated attempt back into the next prompt.
///
/// Recognised placeholders: `{prompt}`, `{output}`, `{score}`, `{feedback}`
/// and `{attempt}` (1-based). `{score}` renders as `n/a` for an ungraded
/// attempt. Anything else in braces is copied through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackTemplate {
    template: String,
}

impl FeedbackTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn render(&self, prompt: &str, attempt: &Attempt, feedback: &str) -> String {
        let attempt_number = (attempt.index + 1).to_string();
        let score = attempt
            .score()
            .map(|score| format!("{score:.2}"))
            .unwrap_or_else(|| "n/a".to_string());

        let mut rendered = String::with_capacity(self.template.len() + prompt.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find('}') else {
                rendered.push_str(tail);
                rest = "";
                break;
            };

            let value = match &tail[1..close] {
                "prompt" => Some(prompt),
                "output" => Some(attempt.raw_output.as_str()),
                "score" => Some(score.as_str()),
                "feedback" => Some(feedback),
                "attempt" => Some(attempt_number.as_str()),
                _ => None,
            };

            match value {
                Some(value) => {
                    rendered.push_str(value);
                    rest = &tail[close + 1..];
                }
                None => {
                    rendered.push('{');
                    rest = &tail[1..];
                }
            }
        }

        rendered.push_str(rest);
        rendered
    }
}

impl Default for FeedbackTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_TEMPLATE)
    }
}

/// Prompt for the next attempt.
///
/// `feedback` is what the retry decision carried; without one the last
/// evaluation's feedback is used. The original prompt is returned unchanged
/// on the first attempt and after an ungraded attempt with nothing to say.
pub fn next_prompt(
    original: &str,
    history: &[Attempt],
    feedback: Option<&str>,
    template: &FeedbackTemplate,
) -> String {
    let Some(attempt) = history.last() else {
        return original.to_string();
    };

    let feedback = feedback.or_else(|| {
        attempt
            .evaluation
            .as_ref()
            .map(|evaluation| evaluation.feedback.as_str())
    });

    match feedback {
        Some(feedback) if attempt.evaluation.is_some() || !feedback.trim().is_empty() => {
            template.render(original, attempt, feedback)
        }
        _ => original.to_string(),
    }
}
