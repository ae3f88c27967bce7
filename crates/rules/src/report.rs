//! Per-run evaluation statistics and the serializable insight report.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::aggregate::{Insight, InsightAggregator};
use crate::schema::Severity;

// ── Evaluation report ───────────────────────────────────────────────

/// Pipeline stage at which a (rule, record) pair failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Syntax,
    Evaluation,
    Template,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Syntax => write!(f, "syntax"),
            FailureStage::Evaluation => write!(f, "evaluation"),
            FailureStage::Template => write!(f, "template"),
        }
    }
}

/// One skipped or failed (rule, record) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationFailure {
    pub record_index: usize,
    pub rule_index: usize,
    pub label: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Statistics for one engine run. Built fresh per run and returned with
/// the insights.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub records: usize,
    pub loan_records: usize,
    pub aggregate_records: usize,
    /// Pairs that passed the applicability filter.
    pub rules_evaluated: usize,
    /// Pairs rejected by the applicability filter.
    pub rules_skipped: usize,
    /// Conditions that evaluated true.
    pub matches: usize,
    /// Insights kept after deduplication.
    pub insights: usize,
    pub duplicates: usize,
    pub syntax_errors: usize,
    pub evaluation_failures: usize,
    pub template_failures: usize,
    /// Variables that were not in the record, with how often each was read.
    pub missing_variables: BTreeMap<String, usize>,
    pub failures: Vec<EvaluationFailure>,
}

impl EvaluationReport {
    /// Fold another partial report into this one.
    pub fn absorb(&mut self, other: EvaluationReport) {
        self.records += other.records;
        self.loan_records += other.loan_records;
        self.aggregate_records += other.aggregate_records;
        self.rules_evaluated += other.rules_evaluated;
        self.rules_skipped += other.rules_skipped;
        self.matches += other.matches;
        self.insights += other.insights;
        self.duplicates += other.duplicates;
        self.syntax_errors += other.syntax_errors;
        self.evaluation_failures += other.evaluation_failures;
        self.template_failures += other.template_failures;
        for (name, count) in other.missing_variables {
            *self.missing_variables.entry(name).or_insert(0) += count;
        }
        self.failures.extend(other.failures);
    }

    pub(crate) fn note_missing<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        for name in names {
            *self.missing_variables.entry(name.clone()).or_insert(0) += 1;
        }
    }

    pub(crate) fn fail(
        &mut self,
        record_index: usize,
        rule_index: usize,
        label: &str,
        stage: FailureStage,
        message: String,
    ) {
        match stage {
            FailureStage::Syntax => self.syntax_errors += 1,
            FailureStage::Evaluation => self.evaluation_failures += 1,
            FailureStage::Template => self.template_failures += 1,
        }
        self.failures.push(EvaluationFailure {
            record_index,
            rule_index,
            label: label.to_string(),
            stage,
            message,
        });
    }
}

// ── Insight report ──────────────────────────────────────────────────

/// The JSON document written at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct InsightReport {
    pub generated_at: DateTime<Utc>,
    pub total_insights: usize,
    pub severity_counts: IndexMap<Severity, usize>,
    pub label_counts: IndexMap<String, usize>,
    /// All insights, most severe first.
    pub insights: Vec<Insight>,
    pub insights_by_label: IndexMap<String, Vec<Insight>>,
    pub evaluation: EvaluationReport,
}

impl InsightReport {
    pub fn new(aggregator: &InsightAggregator, evaluation: EvaluationReport) -> Self {
        let summary = aggregator.summary();
        Self {
            generated_at: Utc::now(),
            total_insights: summary.total,
            severity_counts: summary.severity_counts,
            label_counts: summary.label_counts,
            insights: aggregator.sorted().into_iter().cloned().collect(),
            insights_by_label: aggregator
                .grouped()
                .into_iter()
                .map(|(label, group)| (label, group.into_iter().cloned().collect()))
                .collect(),
            evaluation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_sums_counts_and_merges_variables() {
        let mut total = EvaluationReport::default();
        let mut a = EvaluationReport {
            records: 1,
            rules_evaluated: 3,
            ..Default::default()
        };
        a.note_missing(&["balance".to_string()]);
        a.fail(0, 2, "X", FailureStage::Syntax, "bad".into());

        let mut b = EvaluationReport {
            records: 1,
            rules_skipped: 4,
            ..Default::default()
        };
        b.note_missing(&["balance".to_string(), "limit".to_string()]);

        total.absorb(a);
        total.absorb(b);
        assert_eq!(total.records, 2);
        assert_eq!(total.rules_evaluated, 3);
        assert_eq!(total.rules_skipped, 4);
        assert_eq!(total.syntax_errors, 1);
        assert_eq!(total.missing_variables["balance"], 2);
        assert_eq!(total.missing_variables["limit"], 1);
        assert_eq!(total.failures[0].stage, FailureStage::Syntax);
    }

    #[test]
    fn empty_report_serializes_all_severities() {
        let report = InsightReport::new(&InsightAggregator::new(), EvaluationReport::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_insights"], 0);
        for severity in Severity::ALL {
            assert_eq!(json["severity_counts"][severity.as_str()], 0);
        }
        assert!(json["insights"].as_array().unwrap().is_empty());
        assert!(json["generated_at"].is_string());
    }
}
