mod cli;
mod payload;

use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    BudgetError, BudgetReport, BudgetStatus, CalcContext, TaxPolicy, calculate_budget, present,
};

pub use cli::{Cli, Command, TaxPolicyArgs, build_policy};
pub use payload::{CalculatePayload, CalculationRequest, request_from_json, request_from_payload};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub context: CalcContext,
    pub budget_name: String,
    pub budget_status: BudgetStatus,
    pub report: BudgetReport,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Calculates and rounds one budget. Shared by the HTTP handler and the CLI.
pub fn run_calculation(
    request: &CalculationRequest,
    policy: &TaxPolicy,
) -> Result<CalculateResponse, BudgetError> {
    let result = calculate_budget(
        &request.context,
        request.profile.as_ref(),
        &request.budget,
        policy,
    )?;
    Ok(CalculateResponse {
        context: request.context,
        budget_name: request.budget.name.clone(),
        budget_status: request.budget.status,
        report: present(&result),
    })
}

fn status_for(error: &BudgetError) -> StatusCode {
    match error {
        BudgetError::Validation(_) => StatusCode::BAD_REQUEST,
        BudgetError::Incomplete(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

pub fn router(policy: TaxPolicy) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/budgets/calculate", post(calculate_handler))
        .fallback(not_found_handler)
        .with_state(policy)
}

pub async fn run_http_server(port: u16, policy: TaxPolicy) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Budget API listening on http://{addr}");
    info!(
        wage_base_cap = policy.apply_social_security_wage_base,
        "Tax policy loaded"
    );

    axum::serve(listener, router(policy)).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_handler(
    State(policy): State<TaxPolicy>,
    payload: Result<Json<CalculatePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected budget payload: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };
    calculate_response(payload, &policy)
}

fn calculate_response(payload: CalculatePayload, policy: &TaxPolicy) -> Response {
    let result = request_from_payload(payload)
        .and_then(|request| run_calculation(&request, policy).map(|r| (request.context, r)));
    match result {
        Ok((context, response)) => {
            info!(
                user_id = context.user_id,
                budget_id = context.budget_id,
                remaining = response.report.remaining_money,
                "Budget calculated"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => {
            warn!("Budget calculation failed: {err}");
            error_response(status_for(&err), &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BalanceStatus, IncompleteBudgetError, ValidationError};

    const SCENARIO: &str = r#"{
      "context": { "userId": 1, "budgetId": 4 },
      "profile": { "filingStatus": "single", "state": "TX", "payCycle": "weekly" },
      "budget": {
        "name": "Weekly paycheck",
        "items": [ { "category": "housing", "name": "Rent", "minimumPayment": 500 } ],
        "primaryIncome": { "source": "Salary", "amount": 1000, "frequency": "weekly" }
      }
    }"#;

    fn payload(json: &str) -> CalculatePayload {
        serde_json::from_str(json).expect("payload shape")
    }

    #[test]
    fn weekly_paycheck_report_is_rounded() {
        let request = request_from_payload(payload(SCENARIO)).expect("valid payload");
        let response = run_calculation(&request, &TaxPolicy::default()).expect("complete");
        let report = &response.report;

        assert_eq!(report.monthly_gross_income, 4_333.33);
        assert_eq!(report.total_expenses, 500.0);
        assert_eq!(
            (report.remaining_money * 100.0).round() as i64,
            (report.monthly_net_income * 100.0).round() as i64 - 50_000
        );
        assert_eq!(report.balance, BalanceStatus::Surplus);
        assert_eq!(response.budget_name, "Weekly paycheck");
    }

    #[test]
    fn response_serialization_contains_expected_fields() {
        let request = request_from_payload(payload(SCENARIO)).expect("valid payload");
        let response = run_calculation(&request, &TaxPolicy::default()).expect("complete");
        let json = serde_json::to_string(&response).expect("response should serialize");
        for key in [
            "\"monthlyGrossIncome\"",
            "\"monthlyNetIncome\"",
            "\"totalExpenses\"",
            "\"remainingMoney\"",
            "\"expensesByCategory\"",
            "\"taxBreakdown\"",
            "\"perSource\"",
            "\"totals\"",
            "\"federalTax\"",
            "\"ficaTax\"",
            "\"payPeriods\"",
            "\"isEstimate\":true",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn missing_profile_maps_to_unprocessable() {
        let json = r#"{
          "context": { "userId": 1, "budgetId": 4 },
          "budget": { "primaryIncome": { "amount": 1000, "frequency": "monthly" } }
        }"#;
        let request = request_from_payload(payload(json)).expect("valid payload");
        let err = run_calculation(&request, &TaxPolicy::default()).expect_err("no profile");
        assert_eq!(
            err,
            BudgetError::Incomplete(IncompleteBudgetError::MissingProfile)
        );
        assert_eq!(status_for(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn invalid_frequency_maps_to_bad_request() {
        let json = SCENARIO.replace("\"frequency\": \"weekly\"", "\"frequency\": \"hourly\"");
        let response = calculate_response(payload(&json), &TaxPolicy::default());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err = request_from_payload(payload(&json)).expect_err("bad frequency");
        assert_eq!(
            err,
            BudgetError::Validation(ValidationError::UnknownFrequency("hourly".to_string()))
        );
    }

    #[test]
    fn successful_response_is_not_cached() {
        let response = calculate_response(payload(SCENARIO), &TaxPolicy::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
    }

    #[test]
    fn other_budget_owner_is_rejected() {
        let json = SCENARIO.replace(
            "\"name\": \"Weekly paycheck\"",
            "\"userId\": 2, \"name\": \"x\"",
        );
        let response = calculate_response(payload(&json), &TaxPolicy::default());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
