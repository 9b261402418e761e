//! Simplified tax estimate.
//!
//! Federal tax runs annualized taxable income through a 2024 bracket table
//! after the standard deduction, state tax uses a per-state flat rate (or a
//! short bracket table for CA and NY), and FICA is charged on gross pay. The
//! estimate is applied once to total monthly income and then split across
//! income sources by their share of gross.

use super::income::monthly_equivalent;
use super::types::{
    FilingStatus, NormalizedIncome, Profile, RetirementContribution, RetirementTreatment,
    SourceTaxRow, TaxBreakdown, TaxTotals,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxPolicy {
    pub social_security_rate: f64,
    pub medicare_rate: f64,
    pub additional_medicare_rate: f64,
    pub social_security_wage_base: f64,
    /// When false, Social Security is charged on all gross pay.
    pub apply_social_security_wage_base: bool,
    /// Flat rate for states without a table entry.
    pub default_state_rate: f64,
    /// Non-refundable annual credit per dependent.
    pub dependent_credit: f64,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            social_security_rate: 0.062,
            medicare_rate: 0.0145,
            additional_medicare_rate: 0.009,
            social_security_wage_base: 168_600.0,
            apply_social_security_wage_base: true,
            default_state_rate: 0.05,
            dependent_credit: 2_000.0,
        }
    }
}

/// Monthly deductions taken from the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PreTaxDeductions {
    pub retirement: f64,
    pub health_insurance: f64,
    pub hsa: f64,
    pub fsa: f64,
    pub other_benefits: f64,
    pub additional_federal_withholding: f64,
    pub additional_state_withholding: f64,
    /// Roth contributions come out of net pay, not taxable income.
    pub post_tax_retirement: f64,
}

impl PreTaxDeductions {
    pub fn from_profile(profile: &Profile, monthly_gross: f64) -> Self {
        let per_period = |amount: f64| monthly_equivalent(amount.max(0.0), profile.pay_cycle);
        let retirement = match profile.retirement {
            RetirementContribution::None => 0.0,
            RetirementContribution::Percent { rate } => {
                monthly_gross.max(0.0) * rate.clamp(0.0, 100.0) / 100.0
            }
            RetirementContribution::Fixed { amount } => per_period(amount),
        };
        let (pre_tax_retirement, post_tax_retirement) = match profile.retirement_treatment {
            RetirementTreatment::PreTax => (retirement, 0.0),
            RetirementTreatment::PostTax => (0.0, retirement),
        };

        Self {
            retirement: pre_tax_retirement,
            health_insurance: per_period(profile.health_insurance_premium),
            hsa: per_period(profile.hsa_contribution),
            fsa: per_period(profile.fsa_contribution),
            other_benefits: per_period(profile.other_pretax_benefits),
            additional_federal_withholding: per_period(profile.additional_federal_withholding),
            additional_state_withholding: per_period(profile.additional_state_withholding),
            post_tax_retirement,
        }
    }

    pub fn uncapped_total(&self) -> f64 {
        self.retirement
            + self.health_insurance
            + self.hsa
            + self.fsa
            + self.other_benefits
            + self.additional_federal_withholding
            + self.additional_state_withholding
    }

    /// Pre-tax total, never more than the gross it is taken from.
    pub fn total(&self, monthly_gross: f64) -> f64 {
        self.uncapped_total().min(monthly_gross.max(0.0))
    }
}

#[derive(Debug, Clone, Copy)]
struct Bracket {
    upper: f64,
    rate: f64,
}

const fn b(upper: f64, rate: f64) -> Bracket {
    Bracket { upper, rate }
}

const FEDERAL_SINGLE: [Bracket; 7] = [
    b(11_600.0, 0.10),
    b(47_150.0, 0.12),
    b(100_525.0, 0.22),
    b(191_950.0, 0.24),
    b(243_725.0, 0.32),
    b(609_350.0, 0.35),
    b(f64::INFINITY, 0.37),
];

const FEDERAL_MARRIED_JOINT: [Bracket; 7] = [
    b(23_200.0, 0.10),
    b(94_300.0, 0.12),
    b(201_050.0, 0.22),
    b(383_900.0, 0.24),
    b(487_450.0, 0.32),
    b(731_200.0, 0.35),
    b(f64::INFINITY, 0.37),
];

const FEDERAL_MARRIED_SEPARATE: [Bracket; 7] = [
    b(11_600.0, 0.10),
    b(47_150.0, 0.12),
    b(100_525.0, 0.22),
    b(191_950.0, 0.24),
    b(243_725.0, 0.32),
    b(365_600.0, 0.35),
    b(f64::INFINITY, 0.37),
];

const FEDERAL_HEAD_OF_HOUSEHOLD: [Bracket; 7] = [
    b(16_550.0, 0.10),
    b(63_100.0, 0.12),
    b(100_500.0, 0.22),
    b(191_950.0, 0.24),
    b(243_700.0, 0.32),
    b(609_350.0, 0.35),
    b(f64::INFINITY, 0.37),
];

const CA_SINGLE: [Bracket; 9] = [
    b(10_099.0, 0.01),
    b(23_942.0, 0.02),
    b(37_788.0, 0.04),
    b(52_455.0, 0.06),
    b(66_295.0, 0.08),
    b(338_639.0, 0.093),
    b(406_364.0, 0.103),
    b(677_275.0, 0.113),
    b(f64::INFINITY, 0.123),
];

const CA_MARRIED_JOINT: [Bracket; 9] = [
    b(20_198.0, 0.01),
    b(47_884.0, 0.02),
    b(75_576.0, 0.04),
    b(104_910.0, 0.06),
    b(132_590.0, 0.08),
    b(677_278.0, 0.093),
    b(812_728.0, 0.103),
    b(1_354_550.0, 0.113),
    b(f64::INFINITY, 0.123),
];

const NY_SINGLE: [Bracket; 8] = [
    b(13_900.0, 0.04),
    b(21_400.0, 0.045),
    b(80_650.0, 0.0525),
    b(215_400.0, 0.0585),
    b(1_077_550.0, 0.0625),
    b(5_000_000.0, 0.0685),
    b(25_000_000.0, 0.0965),
    b(f64::INFINITY, 0.109),
];

const NY_MARRIED_JOINT: [Bracket; 8] = [
    b(27_900.0, 0.04),
    b(42_800.0, 0.045),
    b(161_550.0, 0.0525),
    b(323_200.0, 0.0585),
    b(2_155_350.0, 0.0625),
    b(5_000_000.0, 0.0685),
    b(25_000_000.0, 0.0965),
    b(f64::INFINITY, 0.109),
];

#[derive(Debug, Clone, Copy)]
enum StateRule {
    NoIncomeTax,
    Flat(f64),
    Brackets {
        single: &'static [Bracket],
        married_joint: &'static [Bracket],
    },
}

fn state_rule(state: &str) -> Option<StateRule> {
    let rule = match state.trim().to_ascii_uppercase().as_str() {
        "AK" | "FL" | "NV" | "NH" | "SD" | "TN" | "TX" | "WA" | "WY" => StateRule::NoIncomeTax,
        "AZ" => StateRule::Flat(0.025),
        "CO" => StateRule::Flat(0.044),
        "GA" => StateRule::Flat(0.0549),
        "ID" => StateRule::Flat(0.058),
        "IL" => StateRule::Flat(0.0495),
        "IN" => StateRule::Flat(0.0305),
        "KY" => StateRule::Flat(0.04),
        "MA" => StateRule::Flat(0.05),
        "MI" => StateRule::Flat(0.0425),
        "NC" => StateRule::Flat(0.045),
        "PA" => StateRule::Flat(0.0307),
        "UT" => StateRule::Flat(0.0465),
        "CA" => StateRule::Brackets {
            single: &CA_SINGLE,
            married_joint: &CA_MARRIED_JOINT,
        },
        "NY" => StateRule::Brackets {
            single: &NY_SINGLE,
            married_joint: &NY_MARRIED_JOINT,
        },
        _ => return None,
    };
    Some(rule)
}

fn progressive_tax(income: f64, brackets: &[Bracket]) -> f64 {
    let income = income.max(0.0);
    let mut tax = 0.0;
    let mut lower = 0.0;
    for bracket in brackets {
        if income <= lower {
            break;
        }
        tax += (income.min(bracket.upper) - lower) * bracket.rate;
        lower = bracket.upper;
    }
    tax
}

pub fn standard_deduction(filing_status: FilingStatus, is_blind: bool) -> f64 {
    let (base, blind_extra) = match filing_status {
        FilingStatus::Single => (14_600.0, 1_950.0),
        FilingStatus::MarriedJoint => (29_200.0, 1_550.0),
        FilingStatus::MarriedSeparate => (14_600.0, 1_550.0),
        FilingStatus::HeadOfHousehold => (21_900.0, 1_950.0),
    };
    if is_blind { base + blind_extra } else { base }
}

pub fn federal_income_tax_annual(
    annual_taxable: f64,
    profile: &Profile,
    policy: &TaxPolicy,
) -> f64 {
    let brackets: &[Bracket] = match profile.filing_status {
        FilingStatus::Single => &FEDERAL_SINGLE,
        FilingStatus::MarriedJoint => &FEDERAL_MARRIED_JOINT,
        FilingStatus::MarriedSeparate => &FEDERAL_MARRIED_SEPARATE,
        FilingStatus::HeadOfHousehold => &FEDERAL_HEAD_OF_HOUSEHOLD,
    };
    let after_deduction =
        (annual_taxable - standard_deduction(profile.filing_status, profile.is_blind)).max(0.0);
    let credit = f64::from(profile.dependents) * policy.dependent_credit.max(0.0);
    (progressive_tax(after_deduction, brackets) - credit).max(0.0)
}

pub fn state_income_tax_annual(annual_taxable: f64, profile: &Profile, policy: &TaxPolicy) -> f64 {
    let taxable = annual_taxable.max(0.0);
    match state_rule(&profile.state) {
        Some(StateRule::NoIncomeTax) => 0.0,
        Some(StateRule::Flat(rate)) => taxable * rate,
        Some(StateRule::Brackets {
            single,
            married_joint,
        }) => match profile.filing_status {
            FilingStatus::MarriedJoint => progressive_tax(taxable, married_joint),
            _ => progressive_tax(taxable, single),
        },
        None => taxable * policy.default_state_rate.clamp(0.0, 1.0),
    }
}

fn additional_medicare_threshold(filing_status: FilingStatus) -> f64 {
    match filing_status {
        FilingStatus::MarriedJoint => 250_000.0,
        FilingStatus::MarriedSeparate => 125_000.0,
        FilingStatus::Single | FilingStatus::HeadOfHousehold => 200_000.0,
    }
}

/// Returns `(social_security, medicare)` on annual gross pay.
pub fn fica_tax_annual(
    annual_gross: f64,
    filing_status: FilingStatus,
    policy: &TaxPolicy,
) -> (f64, f64) {
    let gross = annual_gross.max(0.0);
    let social_security_base = if policy.apply_social_security_wage_base {
        gross.min(policy.social_security_wage_base.max(0.0))
    } else {
        gross
    };
    let social_security = social_security_base * policy.social_security_rate;
    let above_threshold = (gross - additional_medicare_threshold(filing_status)).max(0.0);
    let medicare = gross * policy.medicare_rate + above_threshold * policy.additional_medicare_rate;
    (social_security, medicare)
}

pub fn estimate_taxes(
    income: &NormalizedIncome,
    profile: &Profile,
    policy: &TaxPolicy,
) -> TaxBreakdown {
    let gross = income.total_monthly.max(0.0);
    let deductions = PreTaxDeductions::from_profile(profile, gross);
    let pre_tax_deductions = deductions.total(gross);
    let taxable_income = (gross - pre_tax_deductions).max(0.0);

    let federal_tax = federal_income_tax_annual(taxable_income * 12.0, profile, policy) / 12.0;
    let state_tax = state_income_tax_annual(taxable_income * 12.0, profile, policy) / 12.0;
    let (social_security_annual, medicare_annual) =
        fica_tax_annual(gross * 12.0, profile.filing_status, policy);
    let social_security_tax = social_security_annual / 12.0;
    let medicare_tax = medicare_annual / 12.0;
    let fica_tax = social_security_tax + medicare_tax;
    let total_tax = federal_tax + state_tax + fica_tax;

    let after_tax = (gross - pre_tax_deductions - total_tax).max(0.0);
    let post_tax_deductions = deductions.post_tax_retirement.min(after_tax);
    let net = after_tax - post_tax_deductions;

    let per_source = income
        .records
        .iter()
        .map(|record| {
            let share = if gross > 0.0 { record.monthly / gross } else { 0.0 };
            SourceTaxRow {
                source: record.label.clone(),
                kind: record.kind,
                tax_type: record.tax_type,
                gross: record.monthly,
                federal_tax: federal_tax * share,
                state_tax: state_tax * share,
                fica_tax: fica_tax * share,
                net: net * share,
            }
        })
        .collect();

    TaxBreakdown {
        per_source,
        totals: TaxTotals {
            gross,
            pre_tax_deductions,
            post_tax_deductions,
            taxable_income,
            federal_tax,
            state_tax,
            social_security_tax,
            medicare_tax,
            fica_tax,
            total_tax,
            net,
        },
    }
}
