use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    #[serde(alias = "head_household")]
    HeadOfHousehold,
}

impl FromStr for FilingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single" => Ok(FilingStatus::Single),
            "married_joint" => Ok(FilingStatus::MarriedJoint),
            "married_separate" => Ok(FilingStatus::MarriedSeparate),
            "head_of_household" | "head_household" => Ok(FilingStatus::HeadOfHousehold),
            _ => Err(ValidationError::UnknownFilingStatus(s.to_string())),
        }
    }
}

/// How often an amount is paid. `Bimonthly` means twice per month.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    #[serde(alias = "semimonthly")]
    Bimonthly,
    Annually,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Bimonthly => "bimonthly",
            Frequency::Annually => "annually",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            "bimonthly" | "semimonthly" => Ok(Frequency::Bimonthly),
            "annually" | "annual" | "yearly" => Ok(Frequency::Annually),
            _ => Err(ValidationError::UnknownFrequency(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RetirementContribution {
    None,
    /// Percentage of gross pay, 0 to 100.
    Percent { rate: f64 },
    /// Fixed amount per pay period.
    Fixed { amount: f64 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetirementTreatment {
    #[serde(alias = "pretax", alias = "preTax")]
    PreTax,
    #[serde(alias = "posttax", alias = "postTax", alias = "roth")]
    PostTax,
}

/// Tax-relevant profile. Deduction amounts are per pay period of `pay_cycle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: u64,
    pub filing_status: FilingStatus,
    pub state: String,
    pub dependents: u32,
    pub is_blind: bool,
    pub is_student: bool,
    pub pay_cycle: Frequency,
    pub retirement: RetirementContribution,
    pub retirement_treatment: RetirementTreatment,
    pub health_insurance_premium: f64,
    pub hsa_contribution: f64,
    pub fsa_contribution: f64,
    pub other_pretax_benefits: f64,
    pub additional_federal_withholding: f64,
    pub additional_state_withholding: f64,
}

impl Profile {
    pub fn new(
        user_id: u64,
        filing_status: FilingStatus,
        state: impl Into<String>,
        pay_cycle: Frequency,
    ) -> Self {
        Self {
            user_id,
            filing_status,
            state: state.into(),
            dependents: 0,
            is_blind: false,
            is_student: false,
            pay_cycle,
            retirement: RetirementContribution::None,
            retirement_treatment: RetirementTreatment::PreTax,
            health_insurance_premium: 0.0,
            hsa_contribution: 0.0,
            fsa_contribution: 0.0,
            other_pretax_benefits: 0.0,
            additional_federal_withholding: 0.0,
            additional_state_withholding: 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Draft,
    Finalized,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeKind {
    #[serde(alias = "gross")]
    Primary,
    Other,
}

/// Output label only; the estimate treats every source the same way.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TaxType {
    #[serde(alias = "w2")]
    W2,
    #[serde(alias = "other")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSource {
    pub kind: IncomeKind,
    pub label: String,
    pub amount: f64,
    pub frequency: Option<Frequency>,
    pub tax_type: TaxType,
}

impl IncomeSource {
    pub fn primary(label: impl Into<String>, amount: f64, frequency: Frequency) -> Self {
        Self {
            kind: IncomeKind::Primary,
            label: label.into(),
            amount,
            frequency: Some(frequency),
            tax_type: TaxType::W2,
        }
    }

    pub fn other(label: impl Into<String>, amount: f64, frequency: Frequency) -> Self {
        Self {
            kind: IncomeKind::Other,
            label: label.into(),
            amount,
            frequency: Some(frequency),
            tax_type: TaxType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub category: String,
    pub name: String,
    pub minimum_payment: f64,
    pub preferred_payment: Option<f64>,
}

impl BudgetItem {
    pub fn new(category: impl Into<String>, name: impl Into<String>, minimum_payment: f64) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            minimum_payment,
            preferred_payment: None,
        }
    }

    pub fn with_preferred(mut self, preferred_payment: f64) -> Self {
        self.preferred_payment = Some(preferred_payment);
        self
    }

    /// Preferred amount, falling back to the minimum when none was given.
    pub fn effective_preferred(&self) -> f64 {
        self.preferred_payment.unwrap_or(self.minimum_payment)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub status: BudgetStatus,
    pub profile_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Vec<BudgetItem>,
    pub incomes: Vec<IncomeSource>,
}

impl Budget {
    pub fn new(id: u64, user_id: u64, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            name: name.into(),
            status: BudgetStatus::Draft,
            profile_id: None,
            created_at,
            updated_at: None,
            items: Vec::new(),
            incomes: Vec::new(),
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status == BudgetStatus::Finalized
    }

    pub fn finalize(&mut self, at: DateTime<Utc>) -> Result<(), ValidationError> {
        if self.is_finalized() {
            return Err(ValidationError::AlreadyFinalized(self.name.clone()));
        }
        self.status = BudgetStatus::Finalized;
        self.updated_at = Some(at);
        Ok(())
    }
}

/// Identifies who is asking and for which budget.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcContext {
    pub user_id: u64,
    pub budget_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub index: usize,
    pub label: String,
    pub kind: IncomeKind,
    pub tax_type: TaxType,
    pub amount: f64,
    pub frequency: Option<Frequency>,
    pub monthly: f64,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedIncome {
    pub records: Vec<NormalizedRecord>,
    pub primary_monthly: f64,
    pub other_monthly: f64,
    pub total_monthly: f64,
    pub invalid_records: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTaxRow {
    pub source: String,
    pub kind: IncomeKind,
    pub tax_type: TaxType,
    pub gross: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub fica_tax: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxTotals {
    pub gross: f64,
    pub pre_tax_deductions: f64,
    pub post_tax_deductions: f64,
    pub taxable_income: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub social_security_tax: f64,
    pub medicare_tax: f64,
    pub fica_tax: f64,
    pub total_tax: f64,
    pub net: f64,
}

/// Monthly tax estimate, per source and in aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub per_source: Vec<SourceTaxRow>,
    pub totals: TaxTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub item_count: usize,
    pub minimum: f64,
    pub preferred: f64,
    pub percent_of_minimum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub categories: Vec<CategoryTotal>,
    pub total_minimum: f64,
    pub total_preferred: f64,
}

impl ExpenseSummary {
    pub fn by_category(&self) -> BTreeMap<String, f64> {
        self.categories
            .iter()
            .map(|c| (c.category.clone(), c.minimum))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSummary {
    pub gross: f64,
    pub pre_tax_deductions: f64,
    pub taxable_income: f64,
    pub tax_withholdings: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPeriodSummary {
    pub annual: IncomeSummary,
    pub monthly: IncomeSummary,
    pub biweekly: IncomeSummary,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    Surplus,
    Balanced,
    Deficit,
}

/// Informational flag: the tax figures are estimates, not an exact calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationNotice {
    pub is_estimate: bool,
    pub message: String,
}

impl Default for EstimationNotice {
    fn default() -> Self {
        Self {
            is_estimate: true,
            message: "Tax figures are simplified estimates and not an exact federal or state \
                      tax calculation."
                .to_string(),
        }
    }
}

/// Everything the results page shows. All money figures are monthly unless
/// they sit under `pay_periods`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResult {
    pub monthly_gross_income: f64,
    pub monthly_net_income: f64,
    pub total_expenses: f64,
    pub total_preferred_expenses: f64,
    pub remaining_money: f64,
    pub remaining_at_preferred: f64,
    pub balance: BalanceStatus,
    pub expenses_by_category: BTreeMap<String, f64>,
    pub expenses: ExpenseSummary,
    pub income_sources: Vec<NormalizedRecord>,
    pub tax_breakdown: TaxBreakdown,
    pub pay_periods: PayPeriodSummary,
    pub notice: EstimationNotice,
}

/// A [`BudgetResult`] with every figure rounded to cents for display.
pub type BudgetReport = BudgetResult;
