//! Implements a SQLite backed account store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params, params_from_iter, types::Value};

use crate::{
    Error,
    db::{
        CreateTable, MapRow, decode_string_list, decode_timestamp, encode_string_list,
        encode_timestamp,
    },
    models::{Account, Audit, ResourceId},
    stores::{AccountFilter, AccountStore},
};

/// The account columns, in the order the row mapper expects them.
const COLUMNS: &str = "id, account_number, short_name, account_name, type_id, tags, \
                       institution_name, description, created_by, updated_by, created_on, \
                       updated_on, sys_notes";

/// Stores accounts in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteAccountStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteAccountStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl AccountStore for SQLiteAccountStore {
    /// Insert a new account into the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidForeignKey] if `type_id` does not refer to an
    ///   existing config type,
    /// - [Error::Inconsistent] if the inserted row cannot be read back,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn insert(&mut self, account: Account) -> Result<Account, Error> {
        let created_on = encode_timestamp(account.audit.created_on)?;
        let updated_on = encode_timestamp(account.audit.updated_on)?;

        let connection = self.connection.lock().unwrap();

        let inserted = connection
            .prepare(&format!(
                "INSERT INTO accounts ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    account.id,
                    account.account_number,
                    account.short_name,
                    account.account_name,
                    account.type_id,
                    encode_string_list(&account.tags),
                    account.institution_name,
                    account.description,
                    account.audit.created_by,
                    account.audit.updated_by,
                    created_on,
                    updated_on,
                    account.audit.sys_notes,
                ],
                Self::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::Inconsistent(
                    "account row could not be read back after insert".to_string(),
                ),
                error => error.into(),
            })?;

        Ok(inserted)
    }

    /// Retrieve an account in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: ResourceId) -> Result<Account, Error> {
        let account = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!("SELECT {COLUMNS} FROM accounts WHERE id = ?1"))?
            .query_row(params![id], Self::map_row)?;

        Ok(account)
    }

    /// Query for accounts in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_query(&self, filter: &AccountFilter) -> Result<Vec<Account>, Error> {
        let mut query_string_parts = vec![format!("SELECT {COLUMNS} FROM accounts")];
        let mut query_parameters = vec![];

        if let Some(name) = &filter.name {
            query_string_parts.push("WHERE short_name LIKE ?1".to_string());
            query_parameters.push(Value::Text(format!("%{name}%")));
        }

        query_string_parts.push("ORDER BY short_name ASC".to_string());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_account| maybe_account.map_err(Error::SqlError))
            .collect()
    }

    /// Overwrite the stored account that shares an id with `account`.
    ///
    /// Creation columns are never rewritten.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Inconsistent] if the row does not exist,
    /// - [Error::InvalidForeignKey] if `type_id` does not refer to an
    ///   existing config type,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, account: Account) -> Result<Account, Error> {
        let updated_on = encode_timestamp(account.audit.updated_on)?;

        let connection = self.connection.lock().unwrap();

        let updated = connection
            .prepare(&format!(
                "UPDATE accounts SET
                     account_number = ?2,
                     short_name = ?3,
                     account_name = ?4,
                     type_id = ?5,
                     tags = ?6,
                     institution_name = ?7,
                     description = ?8,
                     updated_by = ?9,
                     updated_on = ?10,
                     sys_notes = ?11
                 WHERE id = ?1
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    account.id,
                    account.account_number,
                    account.short_name,
                    account.account_name,
                    account.type_id,
                    encode_string_list(&account.tags),
                    account.institution_name,
                    account.description,
                    account.audit.updated_by,
                    updated_on,
                    account.audit.sys_notes,
                ],
                Self::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::Inconsistent(format!(
                    "account {} vanished before it could be updated",
                    account.id
                )),
                error => error.into(),
            })?;

        Ok(updated)
    }

    /// Delete an account in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: ResourceId) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM accounts WHERE id = ?1", params![id])?;

        match rows_deleted {
            0 => Err(Error::NotFound),
            _ => Ok(()),
        }
    }
}

impl CreateTable for SQLiteAccountStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                    id TEXT PRIMARY KEY,
                    account_number TEXT,
                    short_name TEXT NOT NULL,
                    account_name TEXT,
                    type_id TEXT,
                    tags TEXT NOT NULL,
                    institution_name TEXT,
                    description TEXT,
                    created_by TEXT NOT NULL,
                    updated_by TEXT NOT NULL,
                    created_on TEXT NOT NULL,
                    updated_on TEXT NOT NULL,
                    sys_notes TEXT,
                    FOREIGN KEY(type_id) REFERENCES config_types(id)
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteAccountStore {
    type ReturnType = Account;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let account_number = row.get(offset + 1)?;
        let short_name = row.get(offset + 2)?;
        let account_name = row.get(offset + 3)?;
        let type_id = row.get(offset + 4)?;
        let tags = decode_string_list(&row.get::<_, String>(offset + 5)?);
        let institution_name = row.get(offset + 6)?;
        let description = row.get(offset + 7)?;

        let audit = Audit {
            created_by: row.get(offset + 8)?,
            updated_by: row.get(offset + 9)?,
            created_on: decode_timestamp(&row.get::<_, String>(offset + 10)?, offset + 10)?,
            updated_on: decode_timestamp(&row.get::<_, String>(offset + 11)?, offset + 11)?,
            sys_notes: row.get(offset + 12)?,
        };

        Ok(Account {
            id,
            account_number,
            short_name,
            account_name,
            type_id,
            tags,
            institution_name,
            description,
            audit,
        })
    }
}
