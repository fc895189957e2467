use std::future::{self, Future};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::warn;

use crate::client::ChatMessage;
use crate::config::PipelineSettings;

use super::context::Run;
use super::error::PipelineError;
use super::outcome::{Attempt, EvaluationResult};
use super::policy::{Decision, DecisionInput, DefaultRetryPolicy, RetryPolicy};
use super::ports::{EvaluationPort, GenerationPort, Grade, InputGuardrail};
use super::prompt::{FeedbackTemplate, next_prompt};
use super::trace::{NoopSink, PipelineEvent, TraceSink};
use super::types::{Phase, RunStatus};

pub const DEFAULT_MAX_ATTEMPTS: usize = 1;
pub const DEFAULT_PASS_THRESHOLD: f64 = 0.85;

/// Generate → evaluate → retry loop around a single prompt.
///
/// A pipeline holds no per-run state, so one instance can serve any number
/// of concurrent `run` calls as long as its ports are safe to share.
pub struct AgentPipeline {
    generator: Option<Arc<dyn GenerationPort>>,
    evaluator: Option<Arc<dyn EvaluationPort>>,
    policy: Arc<dyn RetryPolicy>,
    sink: Arc<dyn TraceSink>,
    guardrails: Vec<Arc<dyn InputGuardrail>>,
    instructions: Option<String>,
    max_attempts: usize,
    pass_threshold: f64,
    feedback_template: FeedbackTemplate,
    timeout: Option<Duration>,
}

impl AgentPipeline {
    pub fn builder() -> AgentPipelineBuilder {
        AgentPipelineBuilder::new()
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn pass_threshold(&self) -> f64 {
        self.pass_threshold
    }

    pub fn has_evaluator(&self) -> bool {
        self.evaluator.is_some()
    }

    /// Checks the configuration without calling any port.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.generation_port().map(|_| ())
    }

    fn generation_port(&self) -> Result<&Arc<dyn GenerationPort>, PipelineError> {
        if self.max_attempts < 1 {
            return Err(PipelineError::configuration(format!(
                "max_attempts must be at least 1 (got {})",
                self.max_attempts
            )));
        }
        if !self.pass_threshold.is_finite() {
            return Err(PipelineError::configuration(
                "pass_threshold must be a finite number",
            ));
        }
        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(PipelineError::configuration("timeout must be non-zero"));
        }
        self.generator
            .as_ref()
            .ok_or_else(|| PipelineError::configuration("a generation port is required"))
    }

    pub async fn run(&self, prompt: &str) -> Result<EvaluationResult, PipelineError> {
        self.run_cancellable(prompt, future::pending()).await
    }

    /// Like [`AgentPipeline::run`], but aborts with [`PipelineError::Cancelled`]
    /// as soon as `cancel` resolves while a port call is pending. The pending
    /// call is dropped.
    pub async fn run_cancellable<C>(
        &self,
        prompt: &str,
        cancel: C,
    ) -> Result<EvaluationResult, PipelineError>
    where
        C: Future<Output = ()>,
    {
        let generator = match self.init(prompt) {
            Ok(generator) => generator,
            Err(error) => {
                self.sink.record(&PipelineEvent::RunTerminated {
                    status: RunStatus::Aborted,
                    attempts: 0,
                });
                return Err(error);
            }
        };

        tokio::pin!(cancel);
        let mut run = Run::new(self.sink.clone());
        let mut pending_feedback: Option<String> = None;

        while run.next_index() < self.max_attempts {
            let index = run.next_index();
            let prompt_used = next_prompt(
                prompt,
                run.attempts(),
                pending_feedback.as_deref(),
                &self.feedback_template,
            );
            run.record_attempt_start(&prompt_used);

            let conversation = self.conversation(&prompt_used);
            let generated = tokio::select! {
                biased;
                _ = &mut cancel => return Err(run.cancelled(Phase::Generating)),
                result = self.generate(generator.as_ref(), &conversation) => result,
            };
            let raw_output = match generated {
                Ok(output) => output,
                Err(source) => return Err(run.generation_failed(source)),
            };

            let evaluation = match &self.evaluator {
                None => None,
                Some(evaluator) => {
                    let graded = tokio::select! {
                        biased;
                        _ = &mut cancel => return Err(run.cancelled(Phase::Evaluating)),
                        result = self.evaluate(evaluator.as_ref(), prompt, &raw_output) => result,
                    };
                    match graded {
                        Ok(grade) => {
                            let evaluation = grade.judge(self.pass_threshold);
                            run.record_evaluation(Some(&evaluation), None);
                            Some(evaluation)
                        }
                        Err(error) => {
                            run.record_evaluation(None, Some(format!("{error:#}")));
                            None
                        }
                    }
                }
            };

            run.push(Attempt {
                index,
                prompt_used,
                raw_output,
                evaluation,
            });

            let input = DecisionInput {
                attempt_index: index,
                max_attempts: self.max_attempts,
                evaluator_configured: self.evaluator.is_some(),
                last_evaluation: run.attempts().last().and_then(|a| a.evaluation.as_ref()),
                history: run.attempts(),
            };
            let proposed = self.policy.decide(&input);
            let decision = proposed.clone().reconcile(&input);
            if decision != proposed {
                warn!(
                    attempt = index,
                    proposed = %proposed,
                    decision = %decision,
                    "retry policy decision overridden"
                );
            }
            run.record_decision(&decision);

            match decision {
                Decision::Accept => {
                    return Ok(run.finish(RunStatus::Accepted, self.evaluator.is_some()));
                }
                Decision::GiveUp => {
                    return Ok(run.finish(RunStatus::Exhausted, self.evaluator.is_some()));
                }
                Decision::Retry { feedback } => pending_feedback = Some(feedback),
            }
        }

        Ok(run.finish(RunStatus::Exhausted, self.evaluator.is_some()))
    }

    fn init(&self, prompt: &str) -> Result<&Arc<dyn GenerationPort>, PipelineError> {
        let generator = self.generation_port()?;
        for guardrail in &self.guardrails {
            guardrail
                .check(prompt)
                .map_err(|reason| PipelineError::GuardrailRejected { reason })?;
        }
        Ok(generator)
    }

    fn conversation(&self, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(instructions) = &self.instructions {
            messages.push(ChatMessage::system(instructions.clone()));
        }
        messages.push(ChatMessage::user(prompt));
        messages
    }

    async fn generate(
        &self,
        generator: &dyn GenerationPort,
        conversation: &[ChatMessage],
    ) -> Result<String> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, generator.generate(conversation))
                .await
                .map_err(|_| anyhow!("generation timed out after {limit:?}"))?,
            None => generator.generate(conversation).await,
        }
    }

    async fn evaluate(
        &self,
        evaluator: &dyn EvaluationPort,
        prompt: &str,
        candidate: &str,
    ) -> Result<Grade> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, evaluator.evaluate(prompt, candidate))
                .await
                .map_err(|_| anyhow!("evaluation timed out after {limit:?}"))?,
            None => evaluator.evaluate(prompt, candidate).await,
        }
    }
}

pub struct AgentPipelineBuilder {
    generator: Option<Arc<dyn GenerationPort>>,
    evaluator: Option<Arc<dyn EvaluationPort>>,
    policy: Arc<dyn RetryPolicy>,
    sink: Arc<dyn TraceSink>,
    guardrails: Vec<Arc<dyn InputGuardrail>>,
    instructions: Option<String>,
    max_attempts: usize,
    pass_threshold: f64,
    feedback_template: FeedbackTemplate,
    timeout: Option<Duration>,
}

impl AgentPipelineBuilder {
    pub fn new() -> Self {
        Self {
            generator: None,
            evaluator: None,
            policy: Arc::new(DefaultRetryPolicy),
            sink: Arc::new(NoopSink),
            guardrails: Vec::new(),
            instructions: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            feedback_template: FeedbackTemplate::default(),
            timeout: None,
        }
    }

    pub fn generator<G>(self, generator: G) -> Self
    where
        G: GenerationPort + 'static,
    {
        self.shared_generator(Arc::new(generator))
    }

    pub fn shared_generator(mut self, generator: Arc<dyn GenerationPort>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn evaluator<E>(self, evaluator: E) -> Self
    where
        E: EvaluationPort + 'static,
    {
        self.shared_evaluator(Arc::new(evaluator))
    }

    pub fn shared_evaluator(mut self, evaluator: Arc<dyn EvaluationPort>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn retry_policy<P>(mut self, policy: P) -> Self
    where
        P: RetryPolicy + 'static,
    {
        self.policy = Arc::new(policy);
        self
    }

    pub fn trace_sink<S>(mut self, sink: S) -> Self
    where
        S: TraceSink + 'static,
    {
        self.sink = Arc::new(sink);
        self
    }

    pub fn input_guardrail<G>(mut self, guardrail: G) -> Self
    where
        G: InputGuardrail + 'static,
    {
        self.guardrails.push(Arc::new(guardrail));
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn pass_threshold(mut self, pass_threshold: f64) -> Self {
        self.pass_threshold = pass_threshold;
        self
    }

    pub fn feedback_template(mut self, template: impl Into<String>) -> Self {
        self.feedback_template = FeedbackTemplate::new(template);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Applies the `pipeline` section of a loaded [`crate::config::Config`].
    pub fn with_settings(mut self, settings: &PipelineSettings) -> Self {
        self.max_attempts = settings.max_attempts;
        self.pass_threshold = settings.pass_threshold;
        if let Some(template) = &settings.feedback_template {
            self.feedback_template = FeedbackTemplate::new(template.clone());
        }
        if let Some(instructions) = &settings.instructions {
            self.instructions = Some(instructions.clone());
        }
        if let Some(secs) = settings.timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        self
    }

    /// Configuration is validated when the pipeline runs, not here.
    pub fn build(self) -> AgentPipeline {
        AgentPipeline {
            generator: self.generator,
            evaluator: self.evaluator,
            policy: self.policy,
            sink: self.sink,
            guardrails: self.guardrails,
            instructions: self.instructions,
            max_attempts: self.max_attempts,
            pass_threshold: self.pass_threshold,
            feedback_template: self.feedback_template,
            timeout: self.timeout,
        }
    }
}

impl Default for AgentPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
