//! Implements a struct that holds the state of the REST server.

use crate::{
    services::{AccountService, ConfigTypeService, ExpenseService, UserService},
    stores::{AccountStore, ConfigTypeStore, ExpenseStore, UserStore},
};

/// The state of the REST server.
///
/// Holds one service per entity, each generic over its store so that tests
/// can swap in alternative backends.
#[derive(Debug, Clone)]
pub struct AppState<E, A, C, U>
where
    E: ExpenseStore,
    A: AccountStore,
    C: ConfigTypeStore,
    U: UserStore,
{
    /// The service for managing [expenses](crate::models::Expense).
    pub expense_service: ExpenseService<E>,
    /// The service for managing [accounts](crate::models::Account).
    pub account_service: AccountService<A>,
    /// The service for managing [config types](crate::models::ConfigType).
    pub config_type_service: ConfigTypeService<C>,
    /// The service for managing [users](crate::models::User).
    pub user_service: UserService<U>,
}

impl<E, A, C, U> AppState<E, A, C, U>
where
    E: ExpenseStore,
    A: AccountStore,
    C: ConfigTypeStore,
    U: UserStore,
{
    /// Create a new [AppState] on top of the given stores.
    pub fn new(
        expense_store: E,
        account_store: A,
        config_type_store: C,
        user_store: U,
    ) -> Self {
        Self {
            expense_service: ExpenseService::new(expense_store),
            account_service: AccountService::new(account_store),
            config_type_service: ConfigTypeService::new(config_type_store),
            user_service: UserService::new(user_store),
        }
    }

    /// Create a new [AppState] hashing passwords with the given bcrypt
    /// `cost`. Tests use a low cost to stay fast.
    pub fn with_bcrypt_cost(
        expense_store: E,
        account_store: A,
        config_type_store: C,
        user_store: U,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            expense_service: ExpenseService::new(expense_store),
            account_service: AccountService::new(account_store),
            config_type_service: ConfigTypeService::new(config_type_store),
            user_service: UserService::with_cost(user_store, bcrypt_cost),
        }
    }
}
