//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::{
    AppState, endpoints,
    logging::logging_middleware,
    routes::{accounts, config_types, expenses, users},
    stores::{AccountStore, ConfigTypeStore, ExpenseStore, UserStore},
};

/// Return a router with all the app's routes.
pub fn build_router<E, A, C, U>(state: AppState<E, A, C, U>) -> Router
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    Router::new()
        .route(
            endpoints::EXPENSES,
            get(expenses::list_expenses).post(expenses::save_expense),
        )
        .route(endpoints::EXPENSE, delete(expenses::delete_expense))
        .route(
            endpoints::ACCOUNTS,
            get(accounts::list_accounts).post(accounts::save_account),
        )
        .route(endpoints::ACCOUNT, delete(accounts::delete_account))
        .route(
            endpoints::CONFIG_TYPES,
            get(config_types::list_config_types).post(config_types::save_config_type),
        )
        .route(
            endpoints::CONFIG_TYPE,
            delete(config_types::delete_config_type),
        )
        .route(endpoints::LOG_IN, post(users::log_in))
        .route(endpoints::SIGN_UP, post(users::sign_up))
        .route(endpoints::USERS, delete(users::delete_user))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

#[cfg(test)]
mod routing_tests {
    use axum_test::TestServer;

    use crate::stores::sqlite::create_app_state;

    use super::build_router;

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let connection = rusqlite::Connection::open_in_memory().unwrap();
        let state = create_app_state(connection).unwrap();
        let server = TestServer::new(build_router(state));

        server
            .get("/my-finance/rest/nonsense")
            .await
            .assert_status_not_found();
    }
}
