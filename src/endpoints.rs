//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{expense_id}', use
//! [format_endpoint].

use crate::models::ResourceId;

/// The route to list and add/update expenses.
pub const EXPENSES: &str = "/my-finance/rest/expenses";
/// The route to delete a single expense.
pub const EXPENSE: &str = "/my-finance/rest/expenses/{expense_id}";
/// The route to list and add/update accounts.
pub const ACCOUNTS: &str = "/my-finance/rest/accounts";
/// The route to delete a single account.
pub const ACCOUNT: &str = "/my-finance/rest/accounts/{account_id}";
/// The route to list and add/update config types.
pub const CONFIG_TYPES: &str = "/my-finance/rest/config/types";
/// The route to delete a single config type.
pub const CONFIG_TYPE: &str = "/my-finance/rest/config/types/{config_type_id}";
/// The route for logging in a user.
pub const LOG_IN: &str = "/my-finance/rest/login";
/// The route for registering a new user.
pub const SIGN_UP: &str = "/my-finance/rest/signup";
/// The route for retiring a user.
pub const USERS: &str = "/my-finance/rest/users";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace. If no
/// parameter is found, the original `endpoint_path` is returned.
pub fn format_endpoint(endpoint_path: &str, id: ResourceId) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };
    let Some(end) = endpoint_path[start..].find('}') else {
        return endpoint_path.to_string();
    };

    format!(
        "{}{id}{}",
        &endpoint_path[..start],
        &endpoint_path[start + end + 1..]
    )
}
