//! # Fallback Orchestrator
//!
//! Runs a task through an ordered list of strategies and returns the first
//! acceptable result, always ending with a rule-based strategy that cannot
//! fail.
//!
//! ## Flow
//!
//! 1. Empty input skips straight to the rule-based strategy.
//! 2. Strategies run one at a time in priority order, each bounded by its
//!    own timeout. No retries.
//! 3. An error, a timeout, a `None` result or a result rejected by the
//!    chain's acceptance predicate advances to the next strategy.
//! 4. The first accepted result short-circuits the chain.
//! 5. If nothing was accepted, the rule-based strategy runs and its result
//!    is returned as is.
//!
//! The caller always gets an [`Outcome`]; the chain never returns an error.
//!
//! ## Example
//!
//! ```
//! use upkeep::orchestrator::{FallbackChain, RuleFn, Task, TaskInput};
//!
//! struct Text(String);
//! impl TaskInput for Text {
//!     fn is_empty(&self) -> bool {
//!         self.0.trim().is_empty()
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let chain: FallbackChain<Text, String> = FallbackChain::new(
//!     Task::Expand,
//!     RuleFn::new("echo-rule", |input: &Text| input.0.clone()),
//! );
//! let outcome = chain.run(&Text("leaking tap".to_string())).await;
//! assert_eq!(outcome.value, "leaking tap");
//! assert_eq!(outcome.strategy, "echo-rule");
//! # });
//! ```

pub mod error;

pub use error::StrategyError;

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default per-attempt budget when a strategy does not set one.
pub const DEFAULT_STRATEGY_TIMEOUT: Duration = Duration::from_secs(30);

/// Transformation a chain performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Caption,
    Expand,
    Summarize,
    Translate,
    ClassifyUrgency,
    Merge,
}

impl Task {
    pub const ALL: [Task; 6] = [
        Task::Caption,
        Task::Expand,
        Task::Summarize,
        Task::Translate,
        Task::ClassifyUrgency,
        Task::Merge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Caption => "caption",
            Task::Expand => "expand",
            Task::Summarize => "summarize",
            Task::Translate => "translate",
            Task::ClassifyUrgency => "classify_urgency",
            Task::Merge => "merge",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a strategy gets its answer from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Model running next to the service (e.g. a local Ollama).
    LocalModel,
    /// Hosted third-party API, tagged with the provider name.
    Provider(String),
    /// Deterministic rules with no external dependency.
    RuleBased,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::LocalModel => f.write_str("local-model"),
            StrategyKind::Provider(name) => write!(f, "provider:{}", name),
            StrategyKind::RuleBased => f.write_str("rule-based"),
        }
    }
}

impl Serialize for StrategyKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Static description of a strategy.
#[derive(Debug, Clone)]
pub struct StrategyDescriptor {
    pub name: String,
    pub kind: StrategyKind,
    /// Lower runs first.
    pub priority: u32,
    /// Hard budget for one attempt.
    pub timeout: Duration,
    /// Whether returning no result is an expected answer rather than a fault.
    pub may_decline: bool,
}

impl StrategyDescriptor {
    pub fn new(name: impl Into<String>, kind: StrategyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            priority: 50,
            timeout: DEFAULT_STRATEGY_TIMEOUT,
            may_decline: false,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn declinable(mut self) -> Self {
        self.may_decline = true;
        self
    }
}

/// Payload of a task. Empty input never reaches external strategies.
pub trait TaskInput {
    fn is_empty(&self) -> bool;
}

/// A fallible attempt at producing a result for a task.
#[async_trait]
pub trait Strategy<I, O>: Send + Sync {
    fn descriptor(&self) -> &StrategyDescriptor;

    /// `Ok(None)` means "no result", which advances the chain.
    async fn attempt(&self, input: &I) -> Result<Option<O>, StrategyError>;
}

/// Deterministic terminal strategy. Infallible by signature.
pub trait RuleStrategy<I, O>: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, input: &I) -> O;
}

/// Adapts a plain function into a [`RuleStrategy`].
pub struct RuleFn<F> {
    name: String,
    func: F,
}

impl<F> RuleFn<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<I, O, F> RuleStrategy<I, O> for RuleFn<F>
where
    F: Fn(&I) -> O + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &I) -> O {
        (self.func)(input)
    }
}

/// Predicate deciding whether a strategy's result is well-formed.
pub type Acceptance<I, O> = Arc<dyn Fn(&I, &O) -> bool + Send + Sync>;

/// How a single attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    Accepted,
    Declined,
    Rejected,
    Failed,
    TimedOut,
}

impl AttemptResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptResult::Accepted => "accepted",
            AttemptResult::Declined => "declined",
            AttemptResult::Rejected => "rejected",
            AttemptResult::Failed => "failed",
            AttemptResult::TimedOut => "timed_out",
        }
    }
}

/// Record of one strategy attempt within a chain run.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub strategy: String,
    pub result: AttemptResult,
    pub elapsed_ms: u64,
}

/// Result of a chain run, tagged with the strategy that produced it.
#[derive(Debug, Clone)]
pub struct Outcome<O> {
    pub value: O,
    pub strategy: String,
    pub kind: StrategyKind,
    pub attempts: Vec<Attempt>,
}

impl<O> Outcome<O> {
    /// True when the rule-based strategy produced the value.
    pub fn is_rule_based(&self) -> bool {
        self.kind == StrategyKind::RuleBased
    }
}

/// Ordered strategies for one task plus its rule-based terminal.
pub struct FallbackChain<I, O> {
    task: Task,
    strategies: Vec<Arc<dyn Strategy<I, O>>>,
    terminal: Arc<dyn RuleStrategy<I, O>>,
    accept: Acceptance<I, O>,
}

impl<I, O> FallbackChain<I, O>
where
    I: TaskInput + Send + Sync + 'static,
    O: Send + 'static,
{
    /// Chain with only the rule-based terminal. Accepts every result.
    pub fn new(task: Task, terminal: impl RuleStrategy<I, O> + 'static) -> Self {
        Self {
            task,
            strategies: Vec::new(),
            terminal: Arc::new(terminal),
            accept: Arc::new(|_, _| true),
        }
    }

    /// Replace the acceptance predicate applied to non-terminal results.
    pub fn with_acceptance<F>(mut self, accept: F) -> Self
    where
        F: Fn(&I, &O) -> bool + Send + Sync + 'static,
    {
        self.accept = Arc::new(accept);
        self
    }

    /// Add a strategy, keeping the list ordered by priority.
    ///
    /// Strategies with equal priority keep insertion order.
    pub fn with_strategy(mut self, strategy: Arc<dyn Strategy<I, O>>) -> Self {
        self.push(strategy);
        self
    }

    pub fn push(&mut self, strategy: Arc<dyn Strategy<I, O>>) {
        self.strategies.push(strategy);
        self.strategies.sort_by_key(|s| s.descriptor().priority);
    }

    pub fn task(&self) -> Task {
        self.task
    }

    /// Descriptors of the non-terminal strategies, in run order.
    pub fn descriptors(&self) -> impl Iterator<Item = &StrategyDescriptor> {
        self.strategies.iter().map(|s| s.descriptor())
    }

    pub fn terminal_name(&self) -> &str {
        self.terminal.name()
    }

    /// Strategy names in run order, terminal last.
    pub fn strategy_names(&self) -> Vec<String> {
        self.descriptors()
            .map(|d| d.name.clone())
            .chain(std::iter::once(self.terminal.name().to_string()))
            .collect()
    }

    /// Run the chain. Always produces a value.
    pub async fn run(&self, input: &I) -> Outcome<O> {
        let mut attempts = Vec::with_capacity(self.strategies.len() + 1);

        if input.is_empty() {
            debug!(task = %self.task, "Empty input, skipping to rule-based strategy");
        } else {
            for strategy in &self.strategies {
                let descriptor = strategy.descriptor();
                let started = Instant::now();
                let result = tokio::time::timeout(descriptor.timeout, strategy.attempt(input)).await;
                let elapsed = started.elapsed();

                let verdict = match result {
                    Ok(Ok(Some(value))) if (self.accept)(input, &value) => {
                        crate::metrics::record_attempt(
                            self.task,
                            &descriptor.name,
                            AttemptResult::Accepted,
                            elapsed,
                        );
                        crate::metrics::record_chain_result(self.task, &descriptor.name);
                        attempts.push(Attempt {
                            strategy: descriptor.name.clone(),
                            result: AttemptResult::Accepted,
                            elapsed_ms: elapsed.as_millis() as u64,
                        });
                        info!(
                            task = %self.task,
                            strategy = %descriptor.name,
                            kind = %descriptor.kind,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "Strategy succeeded"
                        );
                        return Outcome {
                            value,
                            strategy: descriptor.name.clone(),
                            kind: descriptor.kind.clone(),
                            attempts,
                        };
                    }
                    Ok(Ok(Some(_))) => {
                        warn!(task = %self.task, strategy = %descriptor.name, "Strategy result rejected");
                        AttemptResult::Rejected
                    }
                    Ok(Ok(None)) => {
                        if descriptor.may_decline {
                            debug!(task = %self.task, strategy = %descriptor.name, "Strategy declined");
                        } else {
                            warn!(task = %self.task, strategy = %descriptor.name, "Strategy returned no result");
                        }
                        AttemptResult::Declined
                    }
                    Ok(Err(e)) => {
                        warn!(task = %self.task, strategy = %descriptor.name, error = %e, "Strategy failed");
                        AttemptResult::Failed
                    }
                    Err(_) => {
                        warn!(
                            task = %self.task,
                            strategy = %descriptor.name,
                            timeout_ms = descriptor.timeout.as_millis() as u64,
                            "Strategy timed out"
                        );
                        AttemptResult::TimedOut
                    }
                };

                crate::metrics::record_attempt(self.task, &descriptor.name, verdict, elapsed);
                attempts.push(Attempt {
                    strategy: descriptor.name.clone(),
                    result: verdict,
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }
        }

        let started = Instant::now();
        let value = self.terminal.apply(input);
        let elapsed = started.elapsed();
        let name = self.terminal.name().to_string();

        crate::metrics::record_attempt(self.task, &name, AttemptResult::Accepted, elapsed);
        crate::metrics::record_chain_result(self.task, &name);
        if !self.strategies.is_empty() {
            info!(task = %self.task, strategy = %name, "Falling back to rule-based strategy");
        }

        attempts.push(Attempt {
            strategy: name.clone(),
            result: AttemptResult::Accepted,
            elapsed_ms: elapsed.as_millis() as u64,
        });

        Outcome {
            value,
            strategy: name,
            kind: StrategyKind::RuleBased,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Payload(&'static str);

    impl TaskInput for Payload {
        fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    enum Behaviour {
        Succeed(&'static str),
        Decline,
        Fail,
        Hang,
    }

    struct Scripted {
        descriptor: StrategyDescriptor,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(name: &str, priority: u32, behaviour: Behaviour) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = Arc::new(Self {
                descriptor: StrategyDescriptor::new(name, StrategyKind::Provider("test".into()))
                    .with_priority(priority)
                    .with_timeout(Duration::from_millis(50)),
                behaviour,
                calls: Arc::clone(&calls),
            });
            (strategy, calls)
        }
    }

    #[async_trait]
    impl Strategy<Payload, String> for Scripted {
        fn descriptor(&self) -> &StrategyDescriptor {
            &self.descriptor
        }

        async fn attempt(&self, _input: &Payload) -> Result<Option<String>, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Succeed(text) => Ok(Some(text.to_string())),
                Behaviour::Decline => Ok(None),
                Behaviour::Fail => Err(StrategyError::Provider(ProviderError::Upstream {
                    status: 503,
                    message: "model loading".to_string(),
                })),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(Some("too late".to_string()))
                }
            }
        }
    }

    fn rule() -> RuleFn<fn(&Payload) -> String> {
        RuleFn::new("rule", |input: &Payload| format!("rule:{}", input.0))
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let (first, first_calls) = Scripted::new("first", 10, Behaviour::Succeed("from first"));
        let (second, second_calls) = Scripted::new("second", 20, Behaviour::Succeed("from second"));
        let chain = FallbackChain::new(Task::Expand, rule())
            .with_strategy(second)
            .with_strategy(first);

        let outcome = chain.run(&Payload("input")).await;

        assert_eq!(outcome.value, "from first");
        assert_eq!(outcome.strategy, "first");
        assert_eq!(outcome.kind, StrategyKind::Provider("test".into()));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.attempts.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_advances_chain() {
        let (failing, _) = Scripted::new("failing", 10, Behaviour::Fail);
        let (working, _) = Scripted::new("working", 20, Behaviour::Succeed("ok result"));
        let chain = FallbackChain::new(Task::Expand, rule())
            .with_strategy(failing)
            .with_strategy(working);

        let outcome = chain.run(&Payload("input")).await;

        assert_eq!(outcome.value, "ok result");
        assert_eq!(outcome.attempts[0].result, AttemptResult::Failed);
        assert_eq!(outcome.attempts[1].result, AttemptResult::Accepted);
    }

    #[tokio::test]
    async fn test_all_failing_returns_rule_output() {
        let (failing, _) = Scripted::new("failing", 10, Behaviour::Fail);
        let (declining, _) = Scripted::new("declining", 20, Behaviour::Decline);
        let (hanging, _) = Scripted::new("hanging", 30, Behaviour::Hang);
        let chain = FallbackChain::new(Task::Expand, rule())
            .with_strategy(failing)
            .with_strategy(declining)
            .with_strategy(hanging);

        let outcome = chain.run(&Payload("input")).await;

        assert_eq!(outcome.value, rule().apply(&Payload("input")));
        assert!(outcome.is_rule_based());
        let results: Vec<_> = outcome.attempts.iter().map(|a| a.result).collect();
        assert_eq!(
            results,
            vec![
                AttemptResult::Failed,
                AttemptResult::Declined,
                AttemptResult::TimedOut,
                AttemptResult::Accepted
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_input_skips_external_strategies() {
        let (working, calls) = Scripted::new("working", 10, Behaviour::Succeed("unused"));
        let chain = FallbackChain::new(Task::Expand, rule()).with_strategy(working);

        let outcome = chain.run(&Payload("")).await;

        assert_eq!(outcome.value, "rule:");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.attempts.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_result_advances_chain() {
        let (short, _) = Scripted::new("short", 10, Behaviour::Succeed("tiny"));
        let (long, _) = Scripted::new("long", 20, Behaviour::Succeed("a long enough answer"));
        let chain = FallbackChain::new(Task::Caption, rule())
            .with_acceptance(|_: &Payload, value: &String| value.len() >= 10)
            .with_strategy(short)
            .with_strategy(long);

        let outcome = chain.run(&Payload("input")).await;

        assert_eq!(outcome.strategy, "long");
        assert_eq!(outcome.attempts[0].result, AttemptResult::Rejected);
    }

    #[tokio::test]
    async fn test_rule_result_bypasses_acceptance() {
        let chain = FallbackChain::new(Task::Caption, rule())
            .with_acceptance(|_: &Payload, _: &String| false);

        let outcome = chain.run(&Payload("x")).await;

        assert_eq!(outcome.value, "rule:x");
    }

    #[test]
    fn test_strategy_names_in_priority_order() {
        let (a, _) = Scripted::new("a", 30, Behaviour::Decline);
        let (b, _) = Scripted::new("b", 10, Behaviour::Decline);
        let (c, _) = Scripted::new("c", 10, Behaviour::Decline);
        let chain = FallbackChain::new(Task::Merge, rule())
            .with_strategy(a)
            .with_strategy(b)
            .with_strategy(c);

        assert_eq!(chain.strategy_names(), vec!["b", "c", "a", "rule"]);
        assert_eq!(chain.terminal_name(), "rule");
    }

    #[test]
    fn test_strategy_kind_display() {
        assert_eq!(StrategyKind::LocalModel.to_string(), "local-model");
        assert_eq!(
            StrategyKind::Provider("huggingface".into()).to_string(),
            "provider:huggingface"
        );
        assert_eq!(StrategyKind::RuleBased.to_string(), "rule-based");
        assert_eq!(
            serde_json::to_value(StrategyKind::RuleBased).unwrap(),
            "rule-based"
        );
    }

    #[test]
    fn test_task_names() {
        assert_eq!(Task::ClassifyUrgency.to_string(), "classify_urgency");
        assert_eq!(serde_json::to_value(Task::Caption).unwrap(), "caption");
    }
}
