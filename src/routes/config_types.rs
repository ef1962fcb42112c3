//! The handlers for the config type routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    models::{ConfigTypeResource, ResourceId},
    stores::{AccountStore, ConfigTypeFilter, ConfigTypeStore, ExpenseStore, UserStore},
};

/// List the config types matching the query string filter.
pub async fn list_config_types<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Query(filter): Query<ConfigTypeFilter>,
) -> Result<Json<Vec<ConfigTypeResource>>, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    state.config_type_service.list(&filter).map(Json)
}

/// Add or update a config type.
///
/// A body without a `configId` adds and responds with 201; a body with one
/// updates (or upserts on a miss) and responds with 200.
pub async fn save_config_type<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Json(resource): Json<ConfigTypeResource>,
) -> Result<Response, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    let mut service = state.config_type_service;

    if resource.id.is_some() {
        let updated = service.update(resource)?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    } else {
        let added = service.add(resource)?;
        Ok((StatusCode::CREATED, Json(added)).into_response())
    }
}

/// Delete a config type and respond with its pre-deletion snapshot.
pub async fn delete_config_type<E, A, C, U>(
    State(state): State<AppState<E, A, C, U>>,
    Path(config_type_id): Path<String>,
) -> Result<Json<ConfigTypeResource>, Error>
where
    E: ExpenseStore + 'static,
    A: AccountStore + 'static,
    C: ConfigTypeStore + 'static,
    U: UserStore + 'static,
{
    let id = ResourceId::parse(&config_type_id)?;
    let mut service = state.config_type_service;

    service.delete(id).map(Json)
}

#[cfg(test)]
mod config_type_route_tests {
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        endpoints, models::ResourceId, routing::build_router, stores::sqlite::create_app_state,
    };

    fn new_test_server() -> TestServer {
        let connection = rusqlite::Connection::open_in_memory().unwrap();
        let state = create_app_state(connection).unwrap();

        TestServer::new(build_router(state))
    }

    async fn add_config_type(server: &TestServer, value: &str, belongs_to: &str, status: &str) {
        server
            .post(endpoints::CONFIG_TYPES)
            .json(&json!({
                "value": value,
                "name": value,
                "belongsTo": belongs_to,
                "status": status,
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    #[tokio::test]
    async fn post_without_an_id_creates_with_default_status() {
        let server = new_test_server();

        let response = server
            .post(endpoints::CONFIG_TYPES)
            .json(&json!({
                "value": "grocery",
                "name": "Grocery",
                "belongsTo": "expense_category",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert!(body.get("configId").is_some());
        assert_eq!(body["status"], "enable");
    }

    #[tokio::test]
    async fn list_filters_by_belongs_to_and_status() {
        let server = new_test_server();
        add_config_type(&server, "grocery", "expense_category", "active").await;
        add_config_type(&server, "rent", "expense_category", "disable").await;
        add_config_type(&server, "checking", "account_type", "active").await;

        let response = server
            .get(endpoints::CONFIG_TYPES)
            .add_query_param("belongsTo", "expense_category")
            .add_query_param("status", "active")
            .await;

        response.assert_status_ok();
        let body: Vec<serde_json::Value> = response.json();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["value"], "grocery");
    }

    #[tokio::test]
    async fn post_with_an_unknown_id_upserts() {
        let server = new_test_server();
        let stale_id = ResourceId::generate().to_string();

        let response = server
            .post(endpoints::CONFIG_TYPES)
            .json(&json!({
                "configId": stale_id,
                "value": "grocery",
                "name": "Grocery",
                "belongsTo": "expense_category",
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_ne!(body["configId"], serde_json::Value::String(stale_id));
    }

    #[tokio::test]
    async fn delete_returns_the_snapshot() {
        let server = new_test_server();
        let created: serde_json::Value = server
            .post(endpoints::CONFIG_TYPES)
            .json(&json!({
                "value": "grocery",
                "name": "Grocery",
                "belongsTo": "expense_category",
            }))
            .await
            .json();
        let id = ResourceId::parse(created["configId"].as_str().unwrap()).unwrap();

        let response = server
            .delete(&endpoints::format_endpoint(endpoints::CONFIG_TYPE, id))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["configId"], created["configId"]);

        server
            .delete(&endpoints::format_endpoint(endpoints::CONFIG_TYPE, id))
            .await
            .assert_status_not_found();
    }
}
