//! Rule category: which record shapes a rule is allowed to touch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of rule families, each tied to the record variants it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Credit-line usage ratio. Revolving loan records only.
    Utilization,
    /// Arrears / delinquency codes. Every loan record.
    PaymentConduct,
    /// Application frequency, concentration, diversity, history age.
    Portfolio,
    TradeReference,
    LegalRisk,
    /// Clean payment history on a single account.
    PositivePaymentHistory,
    /// Low usage on a revolving line.
    PositiveUtilization,
    /// Long history or low application rate across the portfolio.
    PositiveCreditHistory,
    /// Anything else. Loan records only.
    General,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Utilization => write!(f, "utilization"),
            RuleCategory::PaymentConduct => write!(f, "payment_conduct"),
            RuleCategory::Portfolio => write!(f, "portfolio"),
            RuleCategory::TradeReference => write!(f, "trade_reference"),
            RuleCategory::LegalRisk => write!(f, "legal_risk"),
            RuleCategory::PositivePaymentHistory => write!(f, "positive_payment_history"),
            RuleCategory::PositiveUtilization => write!(f, "positive_utilization"),
            RuleCategory::PositiveCreditHistory => write!(f, "positive_credit_history"),
            RuleCategory::General => write!(f, "general"),
        }
    }
}

impl FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "utilization" => Ok(RuleCategory::Utilization),
            "payment_conduct" => Ok(RuleCategory::PaymentConduct),
            "portfolio" => Ok(RuleCategory::Portfolio),
            "trade_reference" => Ok(RuleCategory::TradeReference),
            "legal_risk" => Ok(RuleCategory::LegalRisk),
            "positive_payment_history" => Ok(RuleCategory::PositivePaymentHistory),
            "positive_utilization" => Ok(RuleCategory::PositiveUtilization),
            "positive_credit_history" => Ok(RuleCategory::PositiveCreditHistory),
            "general" => Ok(RuleCategory::General),
            other => Err(format!("unknown rule category: '{}'", other)),
        }
    }
}

// ── Legacy inference ────────────────────────────────────────────────

/// Portfolio rule labels recognised by the legacy table (emoji prefix stripped).
const PORTFOLIO_LABELS: &[&str] = &[
    "Frequent Applications",
    "Pending Applications",
    "High Decline Rate",
    "Thin Credit File",
    "Short Credit History",
    "Recent Enquiries",
    "Lender Concentration",
    "Secured Debt Heavy",
    "Low Application Rate",
];

/// Label marker for positive-pattern rules.
const POSITIVE_MARKER: char = '🟢';

/// Derive a category for rule files that predate the `category` field.
///
/// Checks run in fixed priority order and the first hit wins. This table is
/// frozen: new rules must declare `category` explicitly.
pub fn infer_legacy_category(label: &str, compound_type: &str, condition: &str) -> RuleCategory {
    if label.contains("Utilization") || compound_type.contains("Utilization") {
        return RuleCategory::Utilization;
    }

    if label.contains("Missed Payments")
        || compound_type.contains("Payment Conduct")
        || compound_type.contains("Delinquency")
        || condition.contains("payment_conduct_code")
    {
        return RuleCategory::PaymentConduct;
    }

    if PORTFOLIO_LABELS.iter().any(|p| label.contains(p)) {
        return RuleCategory::Portfolio;
    }

    if label.contains("Trade Reference") || condition.contains("trade_ref") {
        return RuleCategory::TradeReference;
    }

    if label.contains("Legal Risk")
        || condition.contains("legal_cases")
        || condition.contains("bankruptcy")
    {
        return RuleCategory::LegalRisk;
    }

    if label.contains(POSITIVE_MARKER) {
        if compound_type.contains("Payment History") {
            return RuleCategory::PositivePaymentHistory;
        }
        if label.contains("Utilization") {
            return RuleCategory::PositiveUtilization;
        }
        if label.contains("Credit History") || label.contains("Application") {
            return RuleCategory::PositiveCreditHistory;
        }
    }

    RuleCategory::General
}
