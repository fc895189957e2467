use anyhow::{Context, Result};
use colored::*;

use agents_sdk_models::pipeline::{Attempt, EvaluationResult, RunStatus};

pub(crate) struct RunLabels<'a> {
    pub provider: &'a str,
    pub generator: &'a str,
    pub evaluator: Option<&'a str>,
}

pub(crate) fn print_json(result: &EvaluationResult) -> Result<()> {
    let json =
        serde_json::to_string_pretty(result).context("Failed to serialize pipeline result")?;
    println!("{json}");
    Ok(())
}

pub(crate) fn print_human(result: &EvaluationResult, labels: &RunLabels<'_>) {
    println!("Provider: {}", labels.provider);
    println!("Generator: {}", labels.generator);
    if let Some(evaluator) = labels.evaluator {
        println!("Evaluator: {evaluator}");
    }
    println!();

    for attempt in &result.history {
        println!("{}", attempt_line(attempt));
    }
    if !result.history.is_empty() {
        println!();
    }

    println!("{}", status_banner(result));
    println!();
    println!("{}", result.output);
}

fn attempt_line(attempt: &Attempt) -> String {
    let number = format!("Attempt {}", attempt.index + 1).bold();
    match &attempt.evaluation {
        Some(evaluation) if evaluation.passed => {
            format!("{number}: {} ({:.2})", "passed".green(), evaluation.score)
        }
        Some(evaluation) if evaluation.feedback.is_empty() => {
            format!("{number}: {} ({:.2})", "failed".red(), evaluation.score)
        }
        Some(evaluation) => format!(
            "{number}: {} ({:.2}) - {}",
            "failed".red(),
            evaluation.score,
            evaluation.feedback.dimmed()
        ),
        None => format!("{number}: {}", "not graded".yellow()),
    }
}

fn status_banner(result: &EvaluationResult) -> String {
    let score = result
        .final_score
        .map(|score| format!(" with score {score:.2}"))
        .unwrap_or_default();
    let attempts = match result.attempts() {
        1 => "1 attempt".to_string(),
        n => format!("{n} attempts"),
    };

    match result.status {
        RunStatus::Accepted if result.passed => format!("✅ Accepted after {attempts}{score}")
            .bold()
            .green()
            .to_string(),
        RunStatus::Accepted => format!("⚠️  Accepted without a passing grade after {attempts}{score}")
            .bold()
            .yellow()
            .to_string(),
        RunStatus::Exhausted | RunStatus::Aborted => {
            format!("❌ No passing answer after {attempts}{score}; showing the last one")
                .bold()
                .red()
                .to_string()
        }
    }
}
