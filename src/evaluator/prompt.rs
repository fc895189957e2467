use crate::client::ChatMessage;

pub const DEFAULT_EVALUATION_INSTRUCTIONS: &str =
    "Judge whether the response fully and correctly answers the task. \
     Reward accuracy, completeness and clarity; penalise errors, omissions and padding.";

pub(crate) const JUDGE_SYSTEM_PROMPT: &str = r#"You are a STRICT grader. You receive a TASK, the CRITERIA to grade by, and a candidate RESPONSE.

SCORING
- Score the RESPONSE against the TASK using only the CRITERIA.
- `score` is a number between 0 and 1 inclusive: 1 means nothing to improve, 0 means unusable.
- `feedback` names the concrete changes that would raise the score. Use "" when the score is 1.

OUTPUT FORMAT (STRICT JSON ONLY)
- Return exactly one JSON object on a single line:
{"score": <number between 0 and 1>, "feedback": "<string>"}
- No prose, no markdown, no code fences, no trailing text.
- `score` MUST be a number (not a string)."#;

pub(crate) fn judge_conversation(
    instructions: &str,
    prompt: &str,
    candidate: &str,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(JUDGE_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "CRITERIA:\n{instructions}\n\nTASK:\n{prompt}\n\nRESPONSE:\n{candidate}"
        )),
    ]
}
