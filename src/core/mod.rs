mod error;
mod expenses;
mod income;
mod present;
mod reconcile;
mod tax;
mod types;
mod validate;

pub use error::{BudgetError, IncompleteBudgetError, ValidationError};
pub use expenses::{aggregate_expenses, category_display_name};
pub use income::{annual_equivalent, monthly_equivalent, normalize_incomes};
pub use present::{present, reconcile_to_total, round_cents};
pub use reconcile::{calculate_budget, reconcile};
pub use tax::{
    PreTaxDeductions, TaxPolicy, estimate_taxes, federal_income_tax_annual, fica_tax_annual,
    standard_deduction, state_income_tax_annual,
};
pub use types::{
    BalanceStatus, Budget, BudgetItem, BudgetReport, BudgetResult, BudgetStatus, CalcContext,
    CategoryTotal, EstimationNotice, ExpenseSummary, FilingStatus, Frequency, IncomeKind,
    IncomeSource, IncomeSummary, NormalizedIncome, NormalizedRecord, PayPeriodSummary, Profile,
    RetirementContribution, RetirementTreatment, SourceTaxRow, TaxBreakdown, TaxTotals, TaxType,
};
pub use validate::{validate_budget, validate_budget_name, validate_profile};
