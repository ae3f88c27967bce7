//! Closed schema of every field a normalized credit record can carry.
//!
//! Each [`Field`] knows its wire name and its [`FieldKind`], which drives
//! both the default value used when a record lacks the field and the
//! coercion applied before a condition is evaluated.

use std::fmt;
use std::str::FromStr;

use crate::value::FieldValue;

/// Scalar type a field is coerced to before evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Float,
    Int,
    Bool,
    Text,
}

impl FieldKind {
    /// Zero/empty/false default for this kind.
    pub fn default_value(self) -> FieldValue {
        match self {
            FieldKind::Float => FieldValue::Float(0.0),
            FieldKind::Int => FieldValue::Int(0),
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Text => FieldValue::Text(String::new()),
        }
    }
}

macro_rules! fields {
    ($($variant:ident => $name:literal : $kind:ident),+ $(,)?) => {
        /// A known record field.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Field {
            $($variant),+
        }

        impl Field {
            /// Every field in declaration order.
            pub const ALL: &'static [Field] = &[$(Field::$variant),+];

            /// Wire name as it appears in normalized records and rule text.
            pub fn name(self) -> &'static str {
                match self {
                    $(Field::$variant => $name),+
                }
            }

            pub fn kind(self) -> FieldKind {
                match self {
                    $(Field::$variant => FieldKind::$kind),+
                }
            }

            /// Look up a field by its exact wire name.
            pub fn from_name(name: &str) -> Option<Field> {
                match name {
                    $($name => Some(Field::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

fields! {
    // Loan-level
    CreditUtilizationRatio => "creditutilizationratio": Float,
    Balance => "balance": Float,
    Limit => "limit": Float,
    Utilization => "utilization": Float,
    PaymentConductCode => "payment_conduct_code": Int,
    MonthsInArrears => "mon_arrears": Int,
    InstallmentsInArrears => "inst_arrears": Int,

    // Portfolio
    NumberOfLoans => "numberofloans": Int,
    ApplicationsLast12Months => "numapplicationslast12months": Int,
    PendingApplications => "numpendingapplications": Int,
    ApprovedApplications => "numapprovedapplications": Int,
    DistinctAccountTypes => "distinct_account_types": Int,
    OldestAccountMonths => "oldest_account_months": Int,
    OldestAccountYears => "oldest_account_years": Float,
    AccountsPerLender => "accounts_per_lender": Int,
    SecuredLoanRatio => "secured_loan_ratio": Float,
    RecentEnquiries => "recent_enquiries": Int,
    ApplicationDeclineRate => "application_decline_rate": Float,

    // Trade references
    TradeRefAmountOverdue => "trade_ref_amount_overdue": Float,
    TradeRefReminderCount => "trade_ref_reminder_count": Int,

    // Legal
    LegalCasesSettled => "legal_cases_settled": Int,
    LegalCasesActive => "legal_cases_active": Int,
    DirectorWindingUpCompany => "director_windingup_company": Int,

    // Flags
    HasCreditCard => "has_credit_card": Bool,
    HasInstallmentLoan => "has_installment_loan": Bool,
    BankruptcyActive => "bankruptcy_active": Bool,
    PaymentConductAllZero => "payment_conduct_all_zero": Bool,
    IsRevolving => "is_revolving": Bool,
    IsSecured => "is_secured": Bool,

    // Text
    FacilityType => "facility_type": Text,
    LoanTypeName => "loantype": Text,
    LoanType => "loan_type": Text,
    LenderTypeName => "lendertype": Text,
    Lender => "lender": Text,
    AccountType => "account_type": Text,
    AgingBucket => "aging_bucket": Text,
    CaseDetails => "case_details": Text,
    CaseTypes => "case_types": Text,
    CompanyName => "company_name": Text,
    LenderName => "lender_name": Text,
    Status => "status": Text,

    // Template aliases and personal info
    Facility => "Facility": Text,
    LenderTypeAlias => "Lender_Type": Text,
    Name => "name": Text,
    IcNumber => "ic_number": Text,
    CtosScore => "ctos_score": Int,
}

impl Field {
    /// Default value used when a record does not carry this field.
    pub fn default_value(self) -> FieldValue {
        self.kind().default_value()
    }

    /// All wire names, for suggestion lookups.
    pub fn names() -> Vec<&'static str> {
        Field::ALL.iter().map(|f| f.name()).collect()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_name(s).ok_or_else(|| format!("unknown field: '{}'", s))
    }
}
