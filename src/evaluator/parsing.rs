use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use crate::pipeline::Grade;

#[derive(Debug, Deserialize)]
struct GradePayload {
    score: Value,
    #[serde(default)]
    feedback: Option<String>,
}

/// Drops `<think>` blocks (an unterminated one runs to the end) and returns
/// the first balanced `{...}` fragment.
pub(crate) fn extract_json_object(input: &str) -> Option<String> {
    let mut cleaned = input.to_string();

    while let Some(think_start) = cleaned.find("<think>") {
        match cleaned[think_start..].find("</think>") {
            Some(think_end_pos) => {
                let absolute_end = think_start + think_end_pos + "</think>".len();
                cleaned.replace_range(think_start..absolute_end, "");
            }
            None => {
                cleaned.truncate(think_start);
                break;
            }
        }
    }

    let trimmed = cleaned.trim();
    let start = trimmed.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in trimmed[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(trimmed[start..=start + idx].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Maps a judge score onto `[0, 1]`. Values above 1 are read as a 0-100 scale.
pub(crate) fn normalize_score(raw: f64) -> Option<f64> {
    if !raw.is_finite() {
        return None;
    }
    let score = if raw > 1.0 { raw / 100.0 } else { raw };
    Some(score.clamp(0.0, 1.0))
}

pub(crate) fn parse_grade(content: &str) -> Result<Grade> {
    let fragment = extract_json_object(content)
        .ok_or_else(|| anyhow!("Evaluator response did not contain JSON object"))?;

    let payload: GradePayload = serde_json::from_str(&fragment)
        .with_context(|| format!("Failed to parse evaluator JSON: {content}"))?;

    let raw = match &payload.score {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Evaluator score is not a number: {}", payload.score))?;

    let score =
        normalize_score(raw).ok_or_else(|| anyhow!("Evaluator score is not finite: {raw}"))?;

    Ok(Grade::new(
        score,
        payload.feedback.unwrap_or_default().trim(),
    ))
}
