//! SQLite implementations of the store traits, plus convenience aliases for
//! an [AppState] backed by SQLite.

pub mod account;
pub mod config_type;
pub mod expense;
pub mod user;

pub use account::SQLiteAccountStore;
pub use config_type::SQLiteConfigTypeStore;
pub use expense::SQLiteExpenseStore;
pub use user::SQLiteUserStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{AppState, Error, db::initialize};

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SQLAppState =
    AppState<SQLiteExpenseStore, SQLiteAccountStore, SQLiteConfigTypeStore, SQLiteUserStore>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database.
///
/// # Errors
/// Returns an error if the schema could not be created.
pub fn create_app_state(db_connection: Connection) -> Result<SQLAppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(AppState::new(
        SQLiteExpenseStore::new(connection.clone()),
        SQLiteAccountStore::new(connection.clone()),
        SQLiteConfigTypeStore::new(connection.clone()),
        SQLiteUserStore::new(connection),
    ))
}
