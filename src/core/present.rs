//! Rounding for display. Everything upstream stays in full precision; this is
//! the single place figures are cut to cents.

use super::reconcile::classify;
use super::types::{
    BudgetReport, BudgetResult, CategoryTotal, ExpenseSummary, IncomeSummary, NormalizedRecord,
    PayPeriodSummary, SourceTaxRow, TaxBreakdown, TaxTotals,
};

fn to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

pub fn round_cents(value: f64) -> f64 {
    from_cents(to_cents(value))
}

/// Rounds each value to cents so that the rounded values add up to the
/// rounded `total`. The remainder lands on the largest-magnitude entry.
pub fn reconcile_to_total(values: &[f64], total: f64) -> Vec<f64> {
    let mut cents: Vec<i64> = values.iter().map(|v| to_cents(*v)).collect();
    let remainder = to_cents(total) - cents.iter().sum::<i64>();
    if remainder != 0 {
        let largest = values
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
            .map(|(index, _)| index);
        if let Some(index) = largest {
            cents[index] += remainder;
        }
    }
    cents.into_iter().map(from_cents).collect()
}

fn round_summary(s: &IncomeSummary) -> IncomeSummary {
    IncomeSummary {
        gross: round_cents(s.gross),
        pre_tax_deductions: round_cents(s.pre_tax_deductions),
        taxable_income: round_cents(s.taxable_income),
        tax_withholdings: round_cents(s.tax_withholdings),
        net: round_cents(s.net),
    }
}

fn round_totals(t: &TaxTotals) -> TaxTotals {
    let federal_tax = round_cents(t.federal_tax);
    let state_tax = round_cents(t.state_tax);
    let fica_tax = round_cents(t.fica_tax);
    let social_security_tax = round_cents(t.social_security_tax);
    TaxTotals {
        gross: round_cents(t.gross),
        pre_tax_deductions: round_cents(t.pre_tax_deductions),
        post_tax_deductions: round_cents(t.post_tax_deductions),
        taxable_income: round_cents(t.taxable_income),
        federal_tax,
        state_tax,
        social_security_tax,
        medicare_tax: from_cents(to_cents(fica_tax) - to_cents(social_security_tax)),
        fica_tax,
        total_tax: from_cents(to_cents(federal_tax) + to_cents(state_tax) + to_cents(fica_tax)),
        net: round_cents(t.net),
    }
}

fn round_breakdown(breakdown: &TaxBreakdown) -> TaxBreakdown {
    let t = &breakdown.totals;
    let rows = &breakdown.per_source;
    let column = |pick: fn(&SourceTaxRow) -> f64, total: f64| {
        reconcile_to_total(&rows.iter().map(pick).collect::<Vec<f64>>(), total)
    };
    let gross = column(|r| r.gross, t.gross);
    let federal = column(|r| r.federal_tax, t.federal_tax);
    let state = column(|r| r.state_tax, t.state_tax);
    let fica = column(|r| r.fica_tax, t.fica_tax);
    let net = column(|r| r.net, t.net);

    let per_source = rows
        .iter()
        .enumerate()
        .map(|(i, row)| SourceTaxRow {
            source: row.source.clone(),
            kind: row.kind,
            tax_type: row.tax_type,
            gross: gross[i],
            federal_tax: federal[i],
            state_tax: state[i],
            fica_tax: fica[i],
            net: net[i],
        })
        .collect();

    TaxBreakdown {
        per_source,
        totals: round_totals(t),
    }
}

fn round_expenses(expenses: &ExpenseSummary) -> ExpenseSummary {
    ExpenseSummary {
        categories: expenses
            .categories
            .iter()
            .map(|c| CategoryTotal {
                category: c.category.clone(),
                item_count: c.item_count,
                minimum: round_cents(c.minimum),
                preferred: round_cents(c.preferred),
                percent_of_minimum: round_cents(c.percent_of_minimum),
            })
            .collect(),
        total_minimum: round_cents(expenses.total_minimum),
        total_preferred: round_cents(expenses.total_preferred),
    }
}

/// Presentation copy of a result with every figure rounded to two decimals.
/// The balance is re-classified from the rounded remaining amount.
pub fn present(result: &BudgetResult) -> BudgetReport {
    let monthly_net_income = round_cents(result.monthly_net_income);
    let total_expenses = round_cents(result.total_expenses);
    let total_preferred_expenses = round_cents(result.total_preferred_expenses);
    let remaining_money = from_cents(to_cents(monthly_net_income) - to_cents(total_expenses));

    BudgetReport {
        monthly_gross_income: round_cents(result.monthly_gross_income),
        monthly_net_income,
        total_expenses,
        total_preferred_expenses,
        remaining_money,
        remaining_at_preferred: from_cents(
            to_cents(monthly_net_income) - to_cents(total_preferred_expenses),
        ),
        balance: classify(remaining_money),
        expenses_by_category: result
            .expenses_by_category
            .iter()
            .map(|(category, amount)| (category.clone(), round_cents(*amount)))
            .collect(),
        expenses: round_expenses(&result.expenses),
        income_sources: result
            .income_sources
            .iter()
            .map(|r| NormalizedRecord {
                monthly: round_cents(r.monthly),
                ..r.clone()
            })
            .collect(),
        tax_breakdown: round_breakdown(&result.tax_breakdown),
        pay_periods: PayPeriodSummary {
            annual: round_summary(&result.pay_periods.annual),
            monthly: round_summary(&result.pay_periods.monthly),
            biweekly: round_summary(&result.pay_periods.biweekly),
        },
        notice: result.notice.clone(),
    }
}
