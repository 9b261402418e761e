use super::types::{Frequency, IncomeKind, IncomeSource, NormalizedIncome, NormalizedRecord};

impl Frequency {
    pub fn periods_per_year(self) -> f64 {
        match self {
            Frequency::Weekly => 52.0,
            Frequency::Biweekly => 26.0,
            Frequency::Monthly => 12.0,
            Frequency::Bimonthly => 24.0,
            Frequency::Annually => 1.0,
        }
    }
}

pub fn monthly_equivalent(amount: f64, frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Weekly => amount * 52.0 / 12.0,
        Frequency::Biweekly => amount * 26.0 / 12.0,
        Frequency::Monthly => amount,
        Frequency::Bimonthly => amount * 2.0,
        Frequency::Annually => amount / 12.0,
    }
}

pub fn annual_equivalent(amount: f64, frequency: Frequency) -> f64 {
    amount * frequency.periods_per_year()
}

/// Converts every income record to a monthly figure, keeping input order.
/// Records without a frequency contribute nothing and are listed in
/// `invalid_records`.
pub fn normalize_incomes(incomes: &[IncomeSource]) -> NormalizedIncome {
    let mut records = Vec::with_capacity(incomes.len());
    let mut invalid_records = Vec::new();
    let mut primary_monthly = 0.0;
    let mut other_monthly = 0.0;

    for (index, income) in incomes.iter().enumerate() {
        let monthly = income
            .frequency
            .map(|frequency| monthly_equivalent(income.amount, frequency));
        let valid = monthly.is_some();
        let monthly = monthly.unwrap_or(0.0);
        if !valid {
            invalid_records.push(index);
        }

        match income.kind {
            IncomeKind::Primary => primary_monthly += monthly,
            IncomeKind::Other => other_monthly += monthly,
        }

        records.push(NormalizedRecord {
            index,
            label: income.label.clone(),
            kind: income.kind,
            tax_type: income.tax_type,
            amount: income.amount,
            frequency: income.frequency,
            monthly,
            valid,
        });
    }

    NormalizedIncome {
        records,
        primary_monthly,
        other_monthly,
        total_monthly: primary_monthly + other_monthly,
        invalid_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    const ALL_FREQUENCIES: [Frequency; 5] = [
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
        Frequency::Bimonthly,
        Frequency::Annually,
    ];

    #[test]
    fn conversion_table_matches_pay_frequencies() {
        assert_approx(monthly_equivalent(1_200.0, Frequency::Weekly), 5_200.0);
        assert_approx(monthly_equivalent(1_200.0, Frequency::Biweekly), 2_600.0);
        assert_approx(monthly_equivalent(1_200.0, Frequency::Monthly), 1_200.0);
        assert_approx(monthly_equivalent(1_200.0, Frequency::Bimonthly), 2_400.0);
        assert_approx(monthly_equivalent(1_200.0, Frequency::Annually), 100.0);
    }

    #[test]
    fn annual_equivalent_is_twelve_months() {
        for frequency in ALL_FREQUENCIES {
            let annual = annual_equivalent(750.0, frequency);
            assert!((annual - monthly_equivalent(750.0, frequency) * 12.0).abs() < 1e-6);
        }
    }

    #[test]
    fn weekly_thousand_is_4333_per_month() {
        let normalized = normalize_incomes(&[IncomeSource::primary(
            "Salary",
            1_000.0,
            Frequency::Weekly,
        )]);
        assert!((normalized.total_monthly - 4_333.333_333).abs() < 1e-5);
        assert_approx(normalized.primary_monthly, normalized.total_monthly);
        assert_approx(normalized.other_monthly, 0.0);
    }

    #[test]
    fn other_income_sources_are_summed() {
        let normalized = normalize_incomes(&[
            IncomeSource::other("Tutoring", 200.0, Frequency::Monthly),
            IncomeSource::other("Dividends", 2_400.0, Frequency::Annually),
        ]);
        assert_approx(normalized.total_monthly, 400.0);
        assert_approx(normalized.primary_monthly, 0.0);
        assert_eq!(normalized.records.len(), 2);
        assert_approx(normalized.records[1].monthly, 200.0);
    }

    #[test]
    fn missing_frequency_contributes_nothing_and_is_flagged() {
        let mut side_job = IncomeSource::other("Side job", 500.0, Frequency::Weekly);
        side_job.frequency = None;
        let normalized = normalize_incomes(&[
            IncomeSource::primary("Salary", 3_000.0, Frequency::Monthly),
            side_job,
        ]);

        assert_approx(normalized.total_monthly, 3_000.0);
        assert_eq!(normalized.invalid_records, vec![1]);
        assert!(!normalized.records[1].valid);
        assert_approx(normalized.records[1].monthly, 0.0);
    }

    #[test]
    fn frequency_strings_parse_with_aliases() {
        assert_eq!("Weekly".parse::<Frequency>(), Ok(Frequency::Weekly));
        assert_eq!("bi-weekly".parse::<Frequency>(), Ok(Frequency::Biweekly));
        assert_eq!("semimonthly".parse::<Frequency>(), Ok(Frequency::Bimonthly));
        assert_eq!("annually".parse::<Frequency>(), Ok(Frequency::Annually));
        assert!("fortnightly".parse::<Frequency>().is_err());
        assert!("".parse::<Frequency>().is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_monthly_equivalent_is_linear_in_amount(
            cents in 0u64..100_000_000,
            frequency_index in 0usize..5
        ) {
            let frequency = ALL_FREQUENCIES[frequency_index];
            let amount = cents as f64 / 100.0;
            let single = monthly_equivalent(amount, frequency);
            let doubled = monthly_equivalent(2.0 * amount, frequency);
            prop_assert!((doubled - 2.0 * single).abs() <= 1e-9 * doubled.abs().max(1.0));
        }

        #[test]
        fn prop_total_is_sum_of_records(
            amounts in proptest::collection::vec(0u32..500_000, 0..8),
            frequency_index in 0usize..5
        ) {
            let frequency = ALL_FREQUENCIES[frequency_index];
            let incomes: Vec<IncomeSource> = amounts
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    if i == 0 {
                        IncomeSource::primary("Primary", *a as f64, frequency)
                    } else {
                        IncomeSource::other(format!("Other {i}"), *a as f64, frequency)
                    }
                })
                .collect();
            let normalized = normalize_incomes(&incomes);
            let sum: f64 = normalized.records.iter().map(|r| r.monthly).sum();
            prop_assert!((normalized.total_monthly - sum).abs() < 1e-6);
            prop_assert!(normalized.invalid_records.is_empty());
        }
    }
}
