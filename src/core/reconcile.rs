use super::error::{BudgetError, IncompleteBudgetError};
use super::expenses::aggregate_expenses;
use super::income::{annual_equivalent, normalize_incomes};
use super::tax::{TaxPolicy, estimate_taxes};
use super::types::{
    BalanceStatus, Budget, BudgetResult, CalcContext, EstimationNotice, ExpenseSummary, Frequency,
    IncomeSummary, NormalizedIncome, PayPeriodSummary, Profile, TaxBreakdown,
};
use super::validate::{validate_budget, validate_context, validate_profile};

pub(super) fn classify(remaining_money: f64) -> BalanceStatus {
    if remaining_money < 0.0 {
        BalanceStatus::Deficit
    } else if remaining_money > 0.0 {
        BalanceStatus::Surplus
    } else {
        BalanceStatus::Balanced
    }
}

fn pay_periods(taxes: &TaxBreakdown) -> PayPeriodSummary {
    let t = &taxes.totals;
    let yearly = |monthly: f64| annual_equivalent(monthly, Frequency::Monthly);
    let annual = IncomeSummary {
        gross: yearly(t.gross),
        pre_tax_deductions: yearly(t.pre_tax_deductions),
        taxable_income: yearly(t.taxable_income),
        tax_withholdings: yearly(t.total_tax),
        net: yearly(t.net),
    };
    let per = |frequency: Frequency| {
        let periods = frequency.periods_per_year();
        IncomeSummary {
            gross: annual.gross / periods,
            pre_tax_deductions: annual.pre_tax_deductions / periods,
            taxable_income: annual.taxable_income / periods,
            tax_withholdings: annual.tax_withholdings / periods,
            net: annual.net / periods,
        }
    };
    let monthly = per(Frequency::Monthly);
    let biweekly = per(Frequency::Biweekly);
    PayPeriodSummary {
        annual,
        monthly,
        biweekly,
    }
}

/// Combines net income with expense totals. Pure: the same inputs always give
/// the same result.
pub fn reconcile(
    income: &NormalizedIncome,
    taxes: &TaxBreakdown,
    expenses: &ExpenseSummary,
) -> BudgetResult {
    let monthly_net_income = taxes.totals.net;
    let remaining_money = monthly_net_income - expenses.total_minimum;
    let remaining_at_preferred = monthly_net_income - expenses.total_preferred;

    BudgetResult {
        monthly_gross_income: income.total_monthly,
        monthly_net_income,
        total_expenses: expenses.total_minimum,
        total_preferred_expenses: expenses.total_preferred,
        remaining_money,
        remaining_at_preferred,
        balance: classify(remaining_money),
        expenses_by_category: expenses.by_category(),
        expenses: expenses.clone(),
        income_sources: income.records.clone(),
        tax_breakdown: taxes.clone(),
        pay_periods: pay_periods(taxes),
        notice: EstimationNotice::default(),
    }
}

/// Runs the full pipeline for one budget snapshot. Either every stage succeeds
/// and a complete result comes back, or the first error is returned.
pub fn calculate_budget(
    ctx: &CalcContext,
    profile: Option<&Profile>,
    budget: &Budget,
    policy: &TaxPolicy,
) -> Result<BudgetResult, BudgetError> {
    let profile = profile.ok_or(IncompleteBudgetError::MissingProfile)?;
    if budget.incomes.is_empty() {
        return Err(IncompleteBudgetError::NoIncomeSources.into());
    }

    validate_context(ctx, profile, budget)?;
    validate_profile(profile)?;
    validate_budget(budget)?;

    let income = normalize_incomes(&budget.incomes);
    let taxes = estimate_taxes(&income, profile, policy);
    let expenses = aggregate_expenses(&budget.items);
    Ok(reconcile(&income, &taxes, &expenses))
}
