//! Data behind the protected pages.
//!
//! The gatekeeper has already let the request through; the cookie token is
//! forwarded to the data backend as a bearer token, which makes the final
//! authorization decision.

use super::{api_error_response, ErrorBody};
use crate::{
    api::{context::SessionContext, AppState},
    client::{BudgetService, ExpenseService, RequestOptions},
    finance::{Budget, Expense, FinancialSummary},
};
use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    get,
    path= "/home",
    responses (
        (status = 200, description = "Dashboard figures", body = FinancialSummary),
        (status = 307, description = "Not signed in; redirect to /login"),
        (status = 502, description = "Data backend unreachable", body = ErrorBody),
    ),
    tag = "pages",
)]
#[instrument(skip(state, context))]
pub async fn home(
    Extension(state): Extension<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
) -> Response {
    let options = RequestOptions::default().bearer(context.token.as_deref());
    let budgets = BudgetService::new(state.data_api.clone());
    let expenses = ExpenseService::new(state.data_api.clone());

    match tokio::try_join!(budgets.get_all(options), expenses.get_all(options)) {
        Ok((budgets, expenses)) => Json(FinancialSummary::compute(budgets, expenses)).into_response(),
        Err(err) => api_error_response(&err),
    }
}

#[utoipa::path(
    get,
    path= "/budgets",
    responses (
        (status = 200, description = "All budgets", body = [Budget]),
        (status = 307, description = "Not signed in; redirect to /login"),
    ),
    tag = "pages",
)]
#[instrument(skip(state, context))]
pub async fn budgets(
    Extension(state): Extension<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
) -> Response {
    let options = RequestOptions::default().bearer(context.token.as_deref());
    match BudgetService::new(state.data_api.clone())
        .get_all(options)
        .await
    {
        Ok(budgets) => Json(budgets).into_response(),
        Err(err) => api_error_response(&err),
    }
}

#[utoipa::path(
    get,
    path= "/budgets/{id}",
    params(("id" = String, Path, description = "Budget id")),
    responses (
        (status = 200, description = "One budget", body = Budget),
        (status = 307, description = "Not signed in; redirect to /login"),
        (status = 404, description = "Unknown budget", body = ErrorBody),
    ),
    tag = "pages",
)]
#[instrument(skip(state, context))]
pub async fn budget(
    Extension(state): Extension<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Response {
    let options = RequestOptions::default().bearer(context.token.as_deref());
    match BudgetService::new(state.data_api.clone())
        .get_by_id(&id, options)
        .await
    {
        Ok(budget) => Json(budget).into_response(),
        Err(err) => api_error_response(&err),
    }
}

#[utoipa::path(
    get,
    path= "/expenses",
    responses (
        (status = 200, description = "All expenses", body = [Expense]),
        (status = 307, description = "Not signed in; redirect to /login"),
    ),
    tag = "pages",
)]
#[instrument(skip(state, context))]
pub async fn expenses(
    Extension(state): Extension<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
) -> Response {
    let options = RequestOptions::default().bearer(context.token.as_deref());
    match ExpenseService::new(state.data_api.clone())
        .get_all(options)
        .await
    {
        Ok(expenses) => Json(expenses).into_response(),
        Err(err) => api_error_response(&err),
    }
}

#[utoipa::path(
    get,
    path= "/expenses/{id}",
    params(("id" = String, Path, description = "Expense id")),
    responses (
        (status = 200, description = "One expense", body = Expense),
        (status = 307, description = "Not signed in; redirect to /login"),
        (status = 404, description = "Unknown expense", body = ErrorBody),
    ),
    tag = "pages",
)]
#[instrument(skip(state, context))]
pub async fn expense(
    Extension(state): Extension<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Response {
    let options = RequestOptions::default().bearer(context.token.as_deref());
    match ExpenseService::new(state.data_api.clone())
        .get_by_id(&id, options)
        .await
    {
        Ok(expense) => Json(expense).into_response(),
        Err(err) => api_error_response(&err),
    }
}
