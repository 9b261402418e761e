use thiserror::Error;

/// Malformed or out-of-range input, reported back to the user for correction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be >= 0 (got {value})")]
    NegativeAmount { field: String, value: f64 },

    #[error("{field} must be a finite number")]
    NonFiniteAmount { field: String },

    #[error("unrecognized pay frequency '{0}'")]
    UnknownFrequency(String),

    #[error("income source '{label}' has no pay frequency")]
    MissingFrequency { label: String },

    #[error("{field} must be between 0 and 100 (got {value})")]
    PercentOutOfRange { field: String, value: f64 },

    #[error("{0} is required")]
    MissingField(String),

    #[error("unrecognized {field} '{value}'")]
    UnknownOption { field: String, value: String },

    #[error("unrecognized filing status '{0}'")]
    UnknownFilingStatus(String),

    #[error("state code must be two letters (got '{0}')")]
    InvalidStateCode(String),

    #[error("a budget may have at most one primary income source (found {0})")]
    MultiplePrimaryIncome(usize),

    #[error("budget {budget_id} does not belong to user {user_id}")]
    OwnerMismatch { user_id: u64, budget_id: u64 },

    #[error("profile belongs to user {profile_user_id}, not user {user_id}")]
    ProfileOwnerMismatch { user_id: u64, profile_user_id: u64 },

    #[error("budget id {actual} does not match requested budget {expected}")]
    BudgetIdMismatch { expected: u64, actual: u64 },

    #[error("budget name must not be empty")]
    EmptyBudgetName,

    #[error("a budget named '{0}' already exists")]
    DuplicateBudgetName(String),

    #[error("budget '{0}' is already finalized")]
    AlreadyFinalized(String),
}

/// A calculation was requested before the wizard collected everything it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IncompleteBudgetError {
    #[error("a complete profile is required before a budget can be calculated")]
    MissingProfile,

    #[error("at least one income source is required to calculate a budget")]
    NoIncomeSources,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BudgetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Incomplete(#[from] IncompleteBudgetError),
}

impl ValidationError {
    pub fn negative(field: impl Into<String>, value: f64) -> Self {
        Self::NegativeAmount {
            field: field.into(),
            value,
        }
    }

    pub fn non_finite(field: impl Into<String>) -> Self {
        Self::NonFiniteAmount {
            field: field.into(),
        }
    }
}
