use std::fmt;

use serde::Serialize;

use super::outcome::{Attempt, Evaluation};

/// What the pipeline does after an attempt completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Retry { feedback: String },
    GiveUp,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Decision::Accept => "accept",
            Decision::Retry { .. } => "retry",
            Decision::GiveUp => "give_up",
        };
        write!(f, "{label}")
    }
}

impl Decision {
    /// Brings a policy's answer in line with the run invariants.
    ///
    /// A passing attempt is never given up on. Giving up before the budget is
    /// spent becomes a retry with the last feedback, and a retry on the last
    /// attempt becomes an accept (passing) or a give-up.
    pub fn reconcile(self, input: &DecisionInput<'_>) -> Decision {
        let passed = input.last_evaluation.is_some_and(|evaluation| evaluation.passed);
        match self {
            Decision::GiveUp if passed => Decision::Accept,
            Decision::GiveUp if !input.is_last_attempt() => Decision::Retry {
                feedback: input
                    .last_evaluation
                    .map(|evaluation| evaluation.feedback.clone())
                    .unwrap_or_default(),
            },
            Decision::Retry { .. } if input.is_last_attempt() => {
                if passed {
                    Decision::Accept
                } else {
                    Decision::GiveUp
                }
            }
            decision => decision,
        }
    }
}

/// Everything a retry policy is allowed to look at.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub attempt_index: usize,
    pub max_attempts: usize,
    pub evaluator_configured: bool,
    pub last_evaluation: Option<&'a Evaluation>,
    pub history: &'a [Attempt],
}

impl DecisionInput<'_> {
    pub fn is_last_attempt(&self) -> bool {
        self.attempt_index + 1 >= self.max_attempts
    }
}

/// Pure decision function consulted after every attempt.
pub trait RetryPolicy: Send + Sync {
    fn decide(&self, input: &DecisionInput<'_>) -> Decision;
}

/// Accepts passing attempts, retries failing ones with their feedback, and
/// gives up once the attempt budget is spent.
///
/// An attempt whose evaluation could not be obtained is retried while budget
/// remains and accepted (ungraded) on the last attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetryPolicy;

impl RetryPolicy for DefaultRetryPolicy {
    fn decide(&self, input: &DecisionInput<'_>) -> Decision {
        if !input.evaluator_configured {
            return Decision::Accept;
        }

        match input.last_evaluation {
            Some(evaluation) if evaluation.passed => Decision::Accept,
            Some(_) if input.is_last_attempt() => Decision::GiveUp,
            Some(evaluation) => Decision::Retry {
                feedback: evaluation.feedback.clone(),
            },
            None if input.is_last_attempt() => Decision::Accept,
            None => Decision::Retry {
                feedback: String::new(),
            },
        }
    }
}

impl<F> RetryPolicy for F
where
    F: Fn(&DecisionInput<'_>) -> Decision + Send + Sync,
{
    fn decide(&self, input: &DecisionInput<'_>) -> Decision {
        self(input)
    }
}
