//! The handlers for signing up, logging in, and retiring users.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    models::UserResource,
    services::{Credentials, DeleteUserRequest},
    stores::{AccountStore, ConfigTypeStore, ExpenseStore, UserStore},
};

/// Register a new user.
pub async fn sign_up<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Json(resource): Json<UserResource>,
) -> Result<Response, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    let mut service = state.user_service;
    let created = service.signup(resource)?;

    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// Log a user in and respond with the resource carrying a fresh access
/// token.
pub async fn log_in<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<UserResource>, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    let mut service = state.user_service;

    service.authenticate(&credentials).map(Json)
}

/// Retire a user after verifying their id, email, and password.
pub async fn delete_user<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Json(request): Json<DeleteUserRequest>,
) -> Result<Json<UserResource>, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    let mut service = state.user_service;

    service.remove(&request).map(Json)
}

#[cfg(test)]
mod user_route_tests {
    use std::sync::{Arc, Mutex};

    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState,
        db::initialize,
        endpoints,
        routing::build_router,
        stores::sqlite::{
            SQLiteAccountStore, SQLiteConfigTypeStore, SQLiteExpenseStore, SQLiteUserStore,
        },
    };

    const TEST_COST: u32 = 4;
    const TEST_PASSWORD: &str = "averystrongandsecurepassword";

    fn new_test_server() -> TestServer {
        let connection = rusqlite::Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        let state = AppState::with_bcrypt_cost(
            SQLiteExpenseStore::new(connection.clone()),
            SQLiteAccountStore::new(connection.clone()),
            SQLiteConfigTypeStore::new(connection.clone()),
            SQLiteUserStore::new(connection),
            TEST_COST,
        );

        TestServer::new(build_router(state))
    }

    async fn sign_up_test_user(server: &TestServer) -> serde_json::Value {
        let response = server
            .post(endpoints::SIGN_UP)
            .json(&json!({
                "username": "neel_sheth",
                "emailId": "neel@example.com",
                "password": TEST_PASSWORD,
                "firstName": "Neel",
                "lastName": "Sheth",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }

    #[tokio::test]
    async fn sign_up_creates_an_active_user_without_echoing_the_password() {
        let server = new_test_server();

        let created = sign_up_test_user(&server).await;

        assert!(created.get("userId").is_some());
        assert_eq!(created["status"], "active");
        assert_eq!(created["encryptType"], "bcrypt");
        assert!(created.get("password").is_none());
    }

    #[tokio::test]
    async fn sign_up_with_a_duplicate_username_is_a_conflict() {
        let server = new_test_server();
        sign_up_test_user(&server).await;

        let response = server
            .post(endpoints::SIGN_UP)
            .json(&json!({
                "username": "neel_sheth",
                "emailId": "other@example.com",
                "password": TEST_PASSWORD,
                "firstName": "Neel",
                "lastName": "Sheth",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn sign_up_with_a_weak_password_is_a_bad_request() {
        let server = new_test_server();

        let response = server
            .post(endpoints::SIGN_UP)
            .json(&json!({
                "username": "neel_sheth",
                "emailId": "neel@example.com",
                "password": "hunter2",
                "firstName": "Neel",
                "lastName": "Sheth",
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn log_in_returns_an_access_token() {
        let server = new_test_server();
        sign_up_test_user(&server).await;

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({
                "username": "neel_sheth",
                "password": TEST_PASSWORD,
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let token = body["accessToken"].as_str().unwrap();
        assert!(!token.is_empty() && token.len() <= 40);
        assert_eq!(body["expiresIn"], 3600);
    }

    #[tokio::test]
    async fn log_in_with_a_wrong_password_is_unauthorized() {
        let server = new_test_server();
        sign_up_test_user(&server).await;

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({
                "username": "neel_sheth",
                "password": "thewrongpassword",
            }))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn delete_soft_deletes_the_user() {
        let server = new_test_server();
        let created = sign_up_test_user(&server).await;

        let response = server
            .delete(endpoints::USERS)
            .json(&json!({
                "userId": created["userId"],
                "emailId": "neel@example.com",
                "password": TEST_PASSWORD,
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "deleted");

        // A retired user can no longer log in.
        server
            .post(endpoints::LOG_IN)
            .json(&json!({
                "username": "neel_sheth",
                "password": TEST_PASSWORD,
            }))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn delete_with_mismatched_credentials_is_unauthorized() {
        let server = new_test_server();
        let created = sign_up_test_user(&server).await;

        let response = server
            .delete(endpoints::USERS)
            .json(&json!({
                "userId": created["userId"],
                "emailId": "neel@example.com",
                "password": "thewrongpassword",
            }))
            .await;

        response.assert_status_unauthorized();
    }
}
