//! Insight collection: deduplication, severity mapping, grouping and ordering.

use std::collections::HashSet;

use credit_core::{Record, RecordVariant, TypedRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::{Rule, RuleCategory, Severity};

/// One advisory produced by a rule matching a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub label: String,
    /// The rule's compound type.
    #[serde(rename = "type")]
    pub compound_type: String,
    pub message: String,
    pub recommendation: String,
    pub severity: Severity,
    /// Priority exactly as declared on the rule.
    pub priority: String,
    /// Omitted from the wire form when the rule names no source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    pub record_type: RecordVariant,
    pub category: RuleCategory,
    pub rule_index: usize,
    /// Position of the originating record in the batch.
    pub record_index: usize,
    /// The originating record.
    pub data: Record,
}

impl Insight {
    pub fn new(rule: &Rule, record: &TypedRecord<'_>, record_index: usize, message: String) -> Self {
        Self {
            label: rule.label.clone(),
            compound_type: rule.compound_type.clone(),
            message,
            recommendation: rule.recommendation.clone(),
            severity: rule.severity(),
            priority: rule.priority.clone(),
            data_source: rule.data_source.clone(),
            record_type: record.variant(),
            category: rule.category,
            rule_index: rule.index,
            record_index,
            data: record.record().clone(),
        }
    }

    fn dedup_key(&self) -> DedupKey {
        (self.label.clone(), self.compound_type.clone(), self.message.clone())
    }
}

type DedupKey = (String, String, String);

/// Per-run counts by severity and label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightSummary {
    pub total: usize,
    /// Every severity, most severe first, zero when absent.
    pub severity_counts: IndexMap<Severity, usize>,
    /// Labels in first-seen order.
    pub label_counts: IndexMap<String, usize>,
}

/// Collects insights in arrival order, discarding duplicates.
///
/// Two insights are duplicates when label, compound type and rendered
/// message all match, regardless of which record produced them.
#[derive(Debug, Default)]
pub struct InsightAggregator {
    insights: Vec<Insight>,
    seen: HashSet<DedupKey>,
    duplicates: usize,
}

impl InsightAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a match. Returns the stored insight, or `None` for a duplicate.
    pub fn collect(
        &mut self,
        rule: &Rule,
        record: &TypedRecord<'_>,
        record_index: usize,
        message: String,
    ) -> Option<&Insight> {
        self.push(Insight::new(rule, record, record_index, message))
    }

    /// Add an already-built insight. Returns `None` for a duplicate.
    pub fn push(&mut self, insight: Insight) -> Option<&Insight> {
        if !self.seen.insert(insight.dedup_key()) {
            self.duplicates += 1;
            return None;
        }
        self.insights.push(insight);
        self.insights.last()
    }

    /// Insights in collection order.
    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    pub fn into_insights(self) -> Vec<Insight> {
        self.insights
    }

    pub fn len(&self) -> usize {
        self.insights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }

    /// Number of matches discarded as duplicates.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Stable sort by severity rank; ties keep collection order.
    pub fn sorted(&self) -> Vec<&Insight> {
        let mut out: Vec<&Insight> = self.insights.iter().collect();
        out.sort_by_key(|i| i.severity.rank());
        out
    }

    /// Insights grouped by label, labels in first-seen order, each group
    /// sorted by severity.
    pub fn grouped(&self) -> IndexMap<String, Vec<&Insight>> {
        let mut groups: IndexMap<String, Vec<&Insight>> = IndexMap::new();
        for insight in self.sorted_within_labels() {
            groups.entry(insight.label.clone()).or_default().push(insight);
        }
        groups
    }

    fn sorted_within_labels(&self) -> Vec<&Insight> {
        // Label order is decided by first appearance, so seed it before sorting.
        let order: IndexMap<&str, usize> = self
            .insights
            .iter()
            .map(|i| i.label.as_str())
            .fold(IndexMap::new(), |mut acc, label| {
                let next = acc.len();
                acc.entry(label).or_insert(next);
                acc
            });
        let mut out: Vec<&Insight> = self.insights.iter().collect();
        out.sort_by_key(|i| (order[i.label.as_str()], i.severity.rank()));
        out
    }

    pub fn summary(&self) -> InsightSummary {
        let mut severity_counts: IndexMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        let mut label_counts: IndexMap<String, usize> = IndexMap::new();

        for insight in &self.insights {
            *severity_counts.entry(insight.severity).or_insert(0) += 1;
            *label_counts.entry(insight.label.clone()).or_insert(0) += 1;
        }

        InsightSummary {
            total: self.insights.len(),
            severity_counts,
            label_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::typed;
    use crate::schema::RuleDefinition;

    fn rule(index: usize, label: &str, priority: &str) -> Rule {
        Rule::from_definition(
            index,
            RuleDefinition {
                label: label.into(),
                compound_type: "Compound".into(),
                condition: "true".into(),
                template: "t".into(),
                priority: priority.into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn identical_messages_from_different_records_collapse() {
        let r = rule(0, "🔴 High Utilization", "High");
        let a = Record::new().with("facility_type", "CRDTCARD").with("balance", 5000.0);
        let b = Record::new().with("facility_type", "CRDTCARD").with("balance", 5000.0).with("limit", 1.0);

        let mut agg = InsightAggregator::new();
        assert!(agg.collect(&r, &typed(&a), 0, "same".into()).is_some());
        assert!(agg.collect(&r, &typed(&b), 1, "same".into()).is_none());
        assert!(agg.collect(&r, &typed(&b), 1, "different".into()).is_some());

        assert_eq!(agg.len(), 2);
        assert_eq!(agg.duplicates(), 1);
        assert_eq!(agg.insights()[0].record_index, 0);
    }

    #[test]
    fn insight_carries_rule_and_record_details() {
        let r = rule(3, "⚫ Legal Risk", "CRITICAL");
        let record = Record::new().with("legal_cases_active", 1);
        let mut agg = InsightAggregator::new();
        let insight = agg.collect(&r, &typed(&record), 7, "msg".into()).unwrap().clone();

        assert_eq!(insight.severity, Severity::Critical);
        assert_eq!(insight.priority, "CRITICAL");
        assert_eq!(insight.record_type, RecordVariant::Aggregate);
        assert_eq!(insight.rule_index, 3);
        assert_eq!(insight.record_index, 7);
        assert_eq!(insight.data, record);

        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "Compound");
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["record_type"], "aggregate");
        assert_eq!(json["data"]["legal_cases_active"], 1);
        assert!(json.get("data_source").is_none());
    }

    #[test]
    fn data_source_is_serialized_only_when_declared() {
        let mut r = rule(0, "🔴 High Utilization", "High");
        r.data_source = Some("CCRIS".into());
        let record = Record::new().with("facility_type", "CRDTCARD");
        let mut agg = InsightAggregator::new();
        let insight = agg.collect(&r, &typed(&record), 0, "msg".into()).unwrap().clone();

        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["data_source"], "CCRIS");
        let back: Insight = serde_json::from_value(json).unwrap();
        assert_eq!(back.data_source.as_deref(), Some("CCRIS"));
    }

    #[test]
    fn sort_is_stable_by_severity() {
        let mut agg = InsightAggregator::new();
        let record = Record::new();
        let view = typed(&record);
        agg.collect(&rule(0, "A", "low"), &view, 0, "a".into());
        agg.collect(&rule(1, "B", "critical"), &view, 0, "b".into());
        agg.collect(&rule(2, "C", "whatever"), &view, 0, "c".into());
        agg.collect(&rule(3, "D", "Critical"), &view, 0, "d".into());
        agg.collect(&rule(4, "E", "positive"), &view, 0, "e".into());

        let order: Vec<&str> = agg.sorted().iter().map(|i| i.message.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "c", "a", "e"]);
    }

    #[test]
    fn grouping_keeps_first_seen_label_order() {
        let mut agg = InsightAggregator::new();
        let record = Record::new();
        let view = typed(&record);
        agg.collect(&rule(0, "Zeta", "low"), &view, 0, "z1".into());
        agg.collect(&rule(1, "Alpha", "high"), &view, 0, "a1".into());
        agg.collect(&rule(2, "Zeta", "critical"), &view, 0, "z2".into());

        let groups = agg.grouped();
        let labels: Vec<&String> = groups.keys().collect();
        assert_eq!(labels, vec!["Zeta", "Alpha"]);
        let zeta: Vec<&str> = groups["Zeta"].iter().map(|i| i.message.as_str()).collect();
        assert_eq!(zeta, vec!["z2", "z1"]);
    }

    #[test]
    fn summary_lists_every_severity() {
        let mut agg = InsightAggregator::new();
        let record = Record::new();
        let view = typed(&record);
        agg.collect(&rule(0, "A", "high"), &view, 0, "1".into());
        agg.collect(&rule(1, "A", "HIGH"), &view, 0, "2".into());
        agg.collect(&rule(2, "B", "nonsense"), &view, 0, "3".into());

        let summary = agg.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(
            summary.severity_counts.iter().map(|(s, n)| (*s, *n)).collect::<Vec<_>>(),
            vec![
                (Severity::Critical, 0),
                (Severity::High, 2),
                (Severity::Medium, 1),
                (Severity::Low, 0),
                (Severity::Positive, 0),
            ]
        );
        assert_eq!(summary.label_counts["A"], 2);
        assert_eq!(summary.label_counts["B"], 1);
    }
}
