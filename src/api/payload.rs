use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::{
    Budget, BudgetError, BudgetItem, BudgetStatus, CalcContext, FilingStatus, Frequency,
    IncomeKind, IncomeSource, Profile, RetirementContribution, RetirementTreatment, TaxType,
    ValidationError, category_display_name,
};

/// Body of a calculation request, as the budget wizard submits it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePayload {
    pub context: CalcContext,
    #[serde(default)]
    pub profile: Option<ProfilePayload>,
    #[serde(default)]
    pub budget: BudgetPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfilePayload {
    pub user_id: Option<u64>,
    pub filing_status: Option<String>,
    pub state: Option<String>,
    pub dependents: Option<u32>,
    pub is_blind: Option<bool>,
    pub is_student: Option<bool>,
    pub pay_cycle: Option<String>,
    /// `pretax`, `posttax` or `none`.
    pub retirement_contribution_type: Option<String>,
    /// `percent` (default) or `fixed`.
    pub retirement_contribution_mode: Option<String>,
    pub retirement_contribution: Option<f64>,
    pub health_insurance_premium: Option<f64>,
    pub hsa_contribution: Option<f64>,
    pub fsa_contribution: Option<f64>,
    pub other_pretax_benefits: Option<f64>,
    pub federal_additional_withholding: Option<f64>,
    pub state_additional_withholding: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BudgetPayload {
    pub id: Option<u64>,
    pub user_id: Option<u64>,
    pub name: Option<String>,
    pub status: Option<BudgetStatus>,
    pub profile_id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Vec<ItemPayload>,
    pub primary_income: Option<IncomePayload>,
    pub other_incomes: Vec<IncomePayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemPayload {
    pub category: String,
    /// Preset id such as `rent` or `cell_phone`. Names the item when `name` is blank.
    pub item_id: Option<String>,
    pub name: String,
    pub minimum_payment: Option<f64>,
    pub preferred_payment: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncomePayload {
    #[serde(alias = "category")]
    pub source: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<String>,
    pub tax_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CalculationRequest {
    pub context: CalcContext,
    pub profile: Option<Profile>,
    pub budget: Budget,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

fn unknown(field: &str, value: &str) -> ValidationError {
    ValidationError::UnknownOption {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn parse_tax_type(raw: Option<&str>, default: TaxType) -> Result<TaxType, ValidationError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(s) if s.is_empty() => Ok(default),
        Some(s) if s == "w2" || s == "w-2" => Ok(TaxType::W2),
        Some(s) if s == "other" => Ok(TaxType::Other),
        Some(s) => Err(unknown("tax type", &s)),
    }
}

impl ProfilePayload {
    fn into_profile(self, user_id: u64) -> Result<Profile, ValidationError> {
        let filing_status: FilingStatus = required(self.filing_status, "filing status")?.parse()?;
        let pay_cycle: Frequency = required(self.pay_cycle, "pay cycle")?.parse()?;
        let state = required(self.state, "state")?;

        let contribution_type = self
            .retirement_contribution_type
            .unwrap_or_else(|| "none".to_string())
            .trim()
            .to_ascii_lowercase();
        let amount = self.retirement_contribution.unwrap_or(0.0);
        let (retirement, retirement_treatment) = match contribution_type.as_str() {
            "none" | "" => (RetirementContribution::None, RetirementTreatment::PreTax),
            "pretax" | "pre-tax" | "posttax" | "post-tax" | "roth" => {
                let treatment = if contribution_type.starts_with("pre") {
                    RetirementTreatment::PreTax
                } else {
                    RetirementTreatment::PostTax
                };
                let mode = self
                    .retirement_contribution_mode
                    .unwrap_or_else(|| "percent".to_string())
                    .trim()
                    .to_ascii_lowercase();
                let contribution = match mode.as_str() {
                    "percent" | "percentage" => RetirementContribution::Percent { rate: amount },
                    "fixed" | "amount" => RetirementContribution::Fixed { amount },
                    other => return Err(unknown("retirement contribution mode", other)),
                };
                (contribution, treatment)
            }
            other => return Err(unknown("retirement contribution type", other)),
        };

        let mut profile = Profile::new(
            self.user_id.unwrap_or(user_id),
            filing_status,
            state.trim().to_ascii_uppercase(),
            pay_cycle,
        );
        profile.dependents = self.dependents.unwrap_or(0);
        profile.is_blind = self.is_blind.unwrap_or(false);
        profile.is_student = self.is_student.unwrap_or(false);
        profile.retirement = retirement;
        profile.retirement_treatment = retirement_treatment;
        profile.health_insurance_premium = self.health_insurance_premium.unwrap_or(0.0);
        profile.hsa_contribution = self.hsa_contribution.unwrap_or(0.0);
        profile.fsa_contribution = self.fsa_contribution.unwrap_or(0.0);
        profile.other_pretax_benefits = self.other_pretax_benefits.unwrap_or(0.0);
        profile.additional_federal_withholding = self.federal_additional_withholding.unwrap_or(0.0);
        profile.additional_state_withholding = self.state_additional_withholding.unwrap_or(0.0);
        Ok(profile)
    }
}

impl IncomePayload {
    fn into_source(
        self,
        kind: IncomeKind,
        position: usize,
    ) -> Result<IncomeSource, ValidationError> {
        let label = match self.source {
            Some(label) if !label.trim().is_empty() => label.trim().to_string(),
            _ => match kind {
                IncomeKind::Primary => "Primary income".to_string(),
                IncomeKind::Other => format!("Other income {}", position + 1),
            },
        };
        let frequency = match self.frequency.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Frequency>()?),
        };
        let default_tax_type = match kind {
            IncomeKind::Primary => TaxType::W2,
            IncomeKind::Other => TaxType::Other,
        };
        Ok(IncomeSource {
            kind,
            tax_type: parse_tax_type(self.tax_type.as_deref(), default_tax_type)?,
            amount: required(self.amount, &format!("amount for income '{label}'"))?,
            label,
            frequency,
        })
    }
}

impl ItemPayload {
    fn into_item(self) -> Result<BudgetItem, ValidationError> {
        let name = match self.item_id.as_deref().map(str::trim) {
            Some(id) if self.name.trim().is_empty() && !id.is_empty() => {
                category_display_name(&self.category, id)
            }
            _ => self.name,
        };
        Ok(BudgetItem {
            minimum_payment: required(
                self.minimum_payment,
                &format!("minimum payment for '{name}'"),
            )?,
            preferred_payment: self.preferred_payment,
            category: self.category,
            name,
        })
    }
}

/// Turns the loosely typed payload into core records. Unknown enum strings
/// are validation errors, never silently replaced.
pub fn request_from_payload(payload: CalculatePayload) -> Result<CalculationRequest, BudgetError> {
    let context = payload.context;
    let profile = payload
        .profile
        .map(|p| p.into_profile(context.user_id))
        .transpose()?;

    let budget = payload.budget;
    let mut incomes = Vec::with_capacity(budget.other_incomes.len() + 1);
    if let Some(primary) = budget.primary_income {
        incomes.push(primary.into_source(IncomeKind::Primary, 0)?);
    }
    for (position, other) in budget.other_incomes.into_iter().enumerate() {
        incomes.push(other.into_source(IncomeKind::Other, position)?);
    }

    let mut core_budget = Budget::new(
        budget.id.unwrap_or(context.budget_id),
        budget.user_id.unwrap_or(context.user_id),
        budget.name.unwrap_or_else(|| "Untitled budget".to_string()),
        budget.created_at.unwrap_or_else(Utc::now),
    );
    core_budget.status = budget.status.unwrap_or(BudgetStatus::Draft);
    core_budget.profile_id = budget.profile_id;
    core_budget.updated_at = budget.updated_at;
    core_budget.items = budget
        .items
        .into_iter()
        .map(ItemPayload::into_item)
        .collect::<Result<Vec<_>, _>>()?;
    core_budget.incomes = incomes;

    Ok(CalculationRequest {
        context,
        profile,
        budget: core_budget,
    })
}

pub fn request_from_json(json: &str) -> Result<CalculationRequest, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid budget JSON payload: {e}"))?;
    request_from_payload(payload).map_err(|e| e.to_string())
}
