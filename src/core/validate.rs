use super::error::ValidationError;
use super::types::{Budget, CalcContext, IncomeKind, Profile, RetirementContribution};

fn check_amount(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    let field = field.into();
    if !value.is_finite() {
        return Err(ValidationError::non_finite(field));
    }
    if value < 0.0 {
        return Err(ValidationError::negative(field, value));
    }
    Ok(())
}

pub fn validate_profile(profile: &Profile) -> Result<(), ValidationError> {
    let state = profile.state.trim();
    if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidStateCode(profile.state.clone()));
    }

    match profile.retirement {
        RetirementContribution::None => {}
        RetirementContribution::Percent { rate } => {
            check_amount("retirement contribution", rate)?;
            if rate > 100.0 {
                return Err(ValidationError::PercentOutOfRange {
                    field: "retirement contribution".to_string(),
                    value: rate,
                });
            }
        }
        RetirementContribution::Fixed { amount } => {
            check_amount("retirement contribution", amount)?
        }
    }

    check_amount("health insurance premium", profile.health_insurance_premium)?;
    check_amount("HSA contribution", profile.hsa_contribution)?;
    check_amount("FSA contribution", profile.fsa_contribution)?;
    check_amount("other pre-tax benefits", profile.other_pretax_benefits)?;
    check_amount(
        "additional federal withholding",
        profile.additional_federal_withholding,
    )?;
    check_amount(
        "additional state withholding",
        profile.additional_state_withholding,
    )?;
    Ok(())
}

/// Checks every income record and expense line before any arithmetic runs.
pub fn validate_budget(budget: &Budget) -> Result<(), ValidationError> {
    let primary_count = budget
        .incomes
        .iter()
        .filter(|income| income.kind == IncomeKind::Primary)
        .count();
    if primary_count > 1 {
        return Err(ValidationError::MultiplePrimaryIncome(primary_count));
    }

    for income in &budget.incomes {
        check_amount(format!("income '{}' amount", income.label), income.amount)?;
        if income.frequency.is_none() {
            return Err(ValidationError::MissingFrequency {
                label: income.label.clone(),
            });
        }
    }

    for item in &budget.items {
        check_amount(
            format!("{} '{}' minimum payment", item.category, item.name),
            item.minimum_payment,
        )?;
        if let Some(preferred) = item.preferred_payment {
            check_amount(
                format!("{} '{}' preferred payment", item.category, item.name),
                preferred,
            )?;
        }
    }
    Ok(())
}

pub fn validate_context(
    ctx: &CalcContext,
    profile: &Profile,
    budget: &Budget,
) -> Result<(), ValidationError> {
    if budget.id != ctx.budget_id {
        return Err(ValidationError::BudgetIdMismatch {
            expected: ctx.budget_id,
            actual: budget.id,
        });
    }
    if budget.user_id != ctx.user_id {
        return Err(ValidationError::OwnerMismatch {
            user_id: ctx.user_id,
            budget_id: budget.id,
        });
    }
    if profile.user_id != ctx.user_id {
        return Err(ValidationError::ProfileOwnerMismatch {
            user_id: ctx.user_id,
            profile_user_id: profile.user_id,
        });
    }
    Ok(())
}

/// Budget names are unique per user, ignoring case and surrounding whitespace.
pub fn validate_budget_name(existing: &[Budget], name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyBudgetName);
    }
    if existing
        .iter()
        .any(|budget| budget.name.trim().eq_ignore_ascii_case(trimmed))
    {
        return Err(ValidationError::DuplicateBudgetName(trimmed.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BudgetItem, FilingStatus, Frequency, IncomeSource};
    use chrono::{TimeZone, Utc};

    fn budget(name: &str) -> Budget {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Budget::new(7, 1, name, created)
    }

    fn profile() -> Profile {
        Profile::new(1, FilingStatus::Single, "WA", Frequency::Biweekly)
    }

    #[test]
    fn rejects_negative_income_amount() {
        let mut b = budget("March");
        b.incomes
            .push(IncomeSource::primary("Salary", -10.0, Frequency::Monthly));
        let err = validate_budget(&b).expect_err("negative amount must be rejected");
        assert!(matches!(err, ValidationError::NegativeAmount { .. }));
        assert!(err.to_string().contains("Salary"));
    }

    #[test]
    fn rejects_nan_expense() {
        let mut b = budget("March");
        b.items.push(BudgetItem::new("bill", "Internet", f64::NAN));
        let err = validate_budget(&b).expect_err("NaN must be rejected");
        assert!(matches!(err, ValidationError::NonFiniteAmount { .. }));
    }

    #[test]
    fn rejects_negative_preferred_payment() {
        let mut b = budget("March");
        b.items
            .push(BudgetItem::new("bill", "Internet", 60.0).with_preferred(-1.0));
        assert!(validate_budget(&b).is_err());
    }

    #[test]
    fn rejects_missing_frequency_and_second_primary() {
        let mut b = budget("March");
        let mut tips = IncomeSource::other("Tips", 40.0, Frequency::Weekly);
        tips.frequency = None;
        b.incomes.push(tips);
        assert_eq!(
            validate_budget(&b),
            Err(ValidationError::MissingFrequency {
                label: "Tips".to_string()
            })
        );

        let mut b = budget("March");
        b.incomes
            .push(IncomeSource::primary("Job A", 1_000.0, Frequency::Monthly));
        b.incomes
            .push(IncomeSource::primary("Job B", 1_000.0, Frequency::Monthly));
        assert_eq!(
            validate_budget(&b),
            Err(ValidationError::MultiplePrimaryIncome(2))
        );
    }

    #[test]
    fn profile_checks_state_code_and_percent_range() {
        let mut p = profile();
        assert!(validate_profile(&p).is_ok());

        p.state = "Washington".to_string();
        assert!(matches!(
            validate_profile(&p),
            Err(ValidationError::InvalidStateCode(_))
        ));

        p.state = "WA".to_string();
        p.retirement = RetirementContribution::Percent { rate: 120.0 };
        assert!(matches!(
            validate_profile(&p),
            Err(ValidationError::PercentOutOfRange { .. })
        ));

        p.retirement = RetirementContribution::None;
        p.hsa_contribution = -5.0;
        assert!(matches!(
            validate_profile(&p),
            Err(ValidationError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn context_must_match_budget_and_profile_owner() {
        let b = budget("March");
        let p = profile();
        let ctx = CalcContext {
            user_id: 1,
            budget_id: 7,
        };
        assert!(validate_context(&ctx, &p, &b).is_ok());

        let wrong_user = CalcContext {
            user_id: 2,
            budget_id: 7,
        };
        assert!(matches!(
            validate_context(&wrong_user, &p, &b),
            Err(ValidationError::OwnerMismatch { .. })
        ));

        let wrong_budget = CalcContext {
            user_id: 1,
            budget_id: 8,
        };
        assert!(matches!(
            validate_context(&wrong_budget, &p, &b),
            Err(ValidationError::BudgetIdMismatch { .. })
        ));
    }

    #[test]
    fn budget_names_are_unique_per_user() {
        let existing = vec![budget("March"), budget("Vacation")];
        assert!(validate_budget_name(&existing, "April").is_ok());
        assert_eq!(
            validate_budget_name(&existing, "  march "),
            Err(ValidationError::DuplicateBudgetName("march".to_string()))
        );
        assert_eq!(
            validate_budget_name(&existing, "   "),
            Err(ValidationError::EmptyBudgetName)
        );
    }

    #[test]
    fn finalize_moves_draft_once() {
        let mut b = budget("March");
        let at = Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap();
        assert!(b.finalize(at).is_ok());
        assert!(b.is_finalized());
        assert_eq!(b.updated_at, Some(at));
        assert_eq!(
            b.finalize(at),
            Err(ValidationError::AlreadyFinalized("March".to_string()))
        );
    }
}
