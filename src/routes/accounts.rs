//! The handlers for the account routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    models::{AccountResource, ResourceId},
    stores::{AccountFilter, AccountStore, ConfigTypeStore, ExpenseStore, UserStore},
};

/// List the accounts matching the query string filter.
pub async fn list_accounts<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Query(filter): Query<AccountFilter>,
) -> Result<Json<Vec<AccountResource>>, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    state.account_service.list(&filter).map(Json)
}

/// Add or update an account.
///
/// A body without an `accountId` adds and responds with 201; a body with one
/// updates (or upserts on a miss) and responds with 200.
pub async fn save_account<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Json(resource): Json<AccountResource>,
) -> Result<Response, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    let mut service = state.account_service;

    if resource.id.is_some() {
        let updated = service.update(resource)?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    } else {
        let added = service.add(resource)?;
        Ok((StatusCode::CREATED, Json(added)).into_response())
    }
}

/// Delete an account and respond with its pre-deletion snapshot.
pub async fn delete_account<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountResource>, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    let id = ResourceId::parse(&account_id)?;
    let mut service = state.account_service;

    service.delete(id).map(Json)
}
