//! Batch evaluation: every record against every applicable rule.
//!
//! Per record: classify, filter rules by category, evaluate the condition,
//! render the template for matches. Records are independent, so they can
//! run on a rayon pool; results are merged back in record order so that
//! deduplication keeps the same first occurrence either way.

use std::sync::Arc;

use credit_core::{EngineConfig, NormalizedBatch, PersonalInfo, Record, RecordVariant};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregate::{Insight, InsightAggregator};
use crate::applicability::applies;
use crate::classify::typed;
use crate::condition::{ConditionEvaluator, SandboxEvaluator};
use crate::loader::RuleRepository;
use crate::render::{build_context, RenderContext, TemplateRenderer};
use crate::report::{EvaluationReport, FailureStage, InsightReport};

/// Insights and statistics from one run.
#[derive(Debug)]
pub struct RunOutput {
    pub aggregator: InsightAggregator,
    pub evaluation: EvaluationReport,
}

impl RunOutput {
    /// Build the serializable report.
    pub fn report(&self) -> InsightReport {
        InsightReport::new(&self.aggregator, self.evaluation.clone())
    }
}

/// Candidate insights from one record, before deduplication.
struct RecordOutcome {
    insights: Vec<Insight>,
    report: EvaluationReport,
}

/// Runs a shared, read-only rule set over record batches.
pub struct InsightEngine<E: ConditionEvaluator = SandboxEvaluator> {
    rules: Arc<RuleRepository>,
    evaluator: E,
    renderer: TemplateRenderer,
    config: EngineConfig,
}

impl InsightEngine<SandboxEvaluator> {
    pub fn new(rules: Arc<RuleRepository>, config: EngineConfig) -> Self {
        let evaluator = SandboxEvaluator::new(&config);
        Self::with_evaluator(rules, evaluator, config)
    }
}

impl<E: ConditionEvaluator> InsightEngine<E> {
    /// Use a custom condition evaluator.
    pub fn with_evaluator(rules: Arc<RuleRepository>, evaluator: E, config: EngineConfig) -> Self {
        Self {
            rules,
            evaluator,
            renderer: TemplateRenderer::new(&config),
            config,
        }
    }

    pub fn rules(&self) -> &RuleRepository {
        &self.rules
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate a whole batch. Never fails: per-pair problems are logged and
    /// counted in the returned [`EvaluationReport`].
    pub fn run(&self, batch: &NormalizedBatch) -> RunOutput {
        let personal = &batch.personal_info;
        let outcomes: Vec<RecordOutcome> = if self.config.parallel {
            batch
                .records
                .par_iter()
                .enumerate()
                .map(|(index, record)| self.evaluate_record(index, record, personal))
                .collect()
        } else {
            batch
                .records
                .iter()
                .enumerate()
                .map(|(index, record)| self.evaluate_record(index, record, personal))
                .collect()
        };

        let mut aggregator = InsightAggregator::new();
        let mut evaluation = EvaluationReport::default();
        for outcome in outcomes {
            for insight in outcome.insights {
                match aggregator.push(insight) {
                    Some(_) => evaluation.insights += 1,
                    None => evaluation.duplicates += 1,
                }
            }
            evaluation.absorb(outcome.report);
        }

        info!(
            records = evaluation.records,
            rules = self.rules.len(),
            evaluated = evaluation.rules_evaluated,
            skipped = evaluation.rules_skipped,
            insights = evaluation.insights,
            duplicates = evaluation.duplicates,
            failures = evaluation.failures.len(),
            parallel = self.config.parallel,
            "batch evaluated"
        );

        RunOutput { aggregator, evaluation }
    }

    fn evaluate_record(&self, index: usize, record: &Record, personal: &PersonalInfo) -> RecordOutcome {
        let typed = typed(record);
        let mut report = EvaluationReport {
            records: 1,
            ..Default::default()
        };
        match typed.variant() {
            RecordVariant::Loan => report.loan_records += 1,
            RecordVariant::Aggregate => report.aggregate_records += 1,
        }
        debug!(record = index, variant = %typed.variant(), fields = record.len(), "classified record");

        let mut insights = Vec::new();
        let mut context: Option<RenderContext> = None;

        for rule in self.rules.rules() {
            if !applies(rule, &typed) {
                report.rules_skipped += 1;
                continue;
            }
            report.rules_evaluated += 1;

            let evaluation = match self.evaluator.evaluate(&rule.condition, record) {
                Ok(evaluation) => evaluation,
                Err(e) => {
                    warn!(rule = %rule.label, record = index, error = %e, "skipping rule with invalid condition");
                    report.fail(index, rule.index, &rule.label, FailureStage::Syntax, e.to_string());
                    continue;
                }
            };
            report.note_missing(evaluation.defaulted.iter().chain(evaluation.unknown.iter()));

            if let Some(failure) = evaluation.failure {
                warn!(rule = %rule.label, record = index, error = %failure, "condition evaluation failed; treating as no match");
                report.fail(index, rule.index, &rule.label, FailureStage::Evaluation, failure.to_string());
                continue;
            }
            if !evaluation.matched {
                continue;
            }
            report.matches += 1;

            let ctx = context.get_or_insert_with(|| build_context(record, personal));
            match self.renderer.render(&rule.template, ctx) {
                Ok(rendered) => {
                    report.note_missing(rendered.defaulted.iter());
                    insights.push(Insight::new(rule, &typed, index, rendered.message));
                }
                Err(e) => {
                    warn!(rule = %rule.label, record = index, error = %e, "template failed; insight dropped");
                    report.fail(index, rule.index, &rule.label, FailureStage::Template, e.to_string());
                }
            }
        }

        debug!(
            record = index,
            evaluated = report.rules_evaluated,
            skipped = report.rules_skipped,
            matched = report.matches,
            "record done"
        );
        RecordOutcome { insights, report }
    }
}
