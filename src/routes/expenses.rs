//! The handlers for the expense routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    models::{ExpenseResource, ResourceId},
    stores::{AccountStore, ConfigTypeStore, ExpenseFilter, ExpenseStore, UserStore},
};

/// List the expenses matching the query string filter.
pub async fn list_expenses<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Query(filter): Query<ExpenseFilter>,
) -> Result<Json<Vec<ExpenseResource>>, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    state.expense_service.list(&filter).map(Json)
}

/// Add or update an expense.
///
/// A body without an `expenseId` adds and responds with 201; a body with one
/// updates (or upserts on a miss) and responds with 200.
pub async fn save_expense<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Json(resource): Json<ExpenseResource>,
) -> Result<Response, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    let mut service = state.expense_service;

    if resource.id.is_some() {
        let updated = service.update(resource)?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    } else {
        let added = service.add(resource)?;
        Ok((StatusCode::CREATED, Json(added)).into_response())
    }
}

/// Delete an expense and respond with its pre-deletion snapshot.
pub async fn delete_expense<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Path(expense_id): Path<String>,
) -> Result<Json<ExpenseResource>, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    let id = ResourceId::parse(&expense_id)?;
    let mut service = state.expense_service;

    service.delete(id).map(Json)
}
