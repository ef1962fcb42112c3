//! Implements a SQLite backed expense store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params, params_from_iter, types::Value};

use crate::{
    Error,
    db::{
        CreateTable, MapRow, decode_string_list, decode_timestamp, encode_string_list,
        encode_timestamp,
    },
    models::{Audit, Expense, ResourceId},
    stores::{ExpenseFilter, ExpenseStore},
};

/// The expense columns, in the order the row mapper expects them.
const COLUMNS: &str = "id, parent_expense_id, billname, amount, payment_account, description, \
                       purchased_date, tags, verified_date_time, category_id, created_by, \
                       updated_by, created_on, updated_on, sys_notes";

/// Stores expenses in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl ExpenseStore for SQLiteExpenseStore {
    /// Insert a new expense into the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidForeignKey] if `parent_expense_id` does not refer to
    ///   an existing expense, or `category_id` to an existing config type,
    /// - [Error::Inconsistent] if the inserted row cannot be read back,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn insert(&mut self, expense: Expense) -> Result<Expense, Error> {
        let purchased_date = encode_timestamp(expense.purchased_date)?;
        let verified_date_time = expense
            .verified_date_time
            .map(encode_timestamp)
            .transpose()?;
        let created_on = encode_timestamp(expense.audit.created_on)?;
        let updated_on = encode_timestamp(expense.audit.updated_on)?;

        let connection = self.connection.lock().unwrap();

        let inserted = connection
            .prepare(&format!(
                "INSERT INTO expenses ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    expense.id,
                    expense.parent_expense_id,
                    expense.billname,
                    expense.amount,
                    expense.payment_account,
                    expense.description,
                    purchased_date,
                    encode_string_list(&expense.tags),
                    verified_date_time,
                    expense.category_id,
                    expense.audit.created_by,
                    expense.audit.updated_by,
                    created_on,
                    updated_on,
                    expense.audit.sys_notes,
                ],
                Self::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::Inconsistent(
                    "expense row could not be read back after insert".to_string(),
                ),
                error => error.into(),
            })?;

        Ok(inserted)
    }

    /// Retrieve an expense in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid expense,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: ResourceId) -> Result<Expense, Error> {
        let expense = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!("SELECT {COLUMNS} FROM expenses WHERE id = ?1"))?
            .query_row(params![id], Self::map_row)?;

        Ok(expense)
    }

    /// Query for expenses in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_query(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, Error> {
        let mut query_string_parts = vec![format!("SELECT {COLUMNS} FROM expenses")];
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(name) = &filter.name {
            where_clause_parts.push(format!("billname LIKE ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(format!("%{name}%")));
        }

        if let Some(from_date) = filter.from_date {
            where_clause_parts.push(format!(
                "purchased_date >= ?{}",
                query_parameters.len() + 1
            ));
            query_parameters.push(Value::Text(encode_timestamp(from_date)?));
        }

        if let Some(to_date) = filter.to_date {
            where_clause_parts.push(format!(
                "purchased_date <= ?{}",
                query_parameters.len() + 1
            ));
            query_parameters.push(Value::Text(encode_timestamp(to_date)?));
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        query_string_parts.push("ORDER BY purchased_date DESC".to_string());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect()
    }

    /// Overwrite the stored expense that shares an id with `expense`.
    ///
    /// Creation columns are never rewritten.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Inconsistent] if the row does not exist,
    /// - [Error::InvalidForeignKey] if `parent_expense_id` does not refer to
    ///   an existing expense, or `category_id` to an existing config type,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, expense: Expense) -> Result<Expense, Error> {
        let purchased_date = encode_timestamp(expense.purchased_date)?;
        let verified_date_time = expense
            .verified_date_time
            .map(encode_timestamp)
            .transpose()?;
        let updated_on = encode_timestamp(expense.audit.updated_on)?;

        let connection = self.connection.lock().unwrap();

        let updated = connection
            .prepare(&format!(
                "UPDATE expenses SET
                     parent_expense_id = ?2,
                     billname = ?3,
                     amount = ?4,
                     payment_account = ?5,
                     description = ?6,
                     purchased_date = ?7,
                     tags = ?8,
                     verified_date_time = ?9,
                     category_id = ?10,
                     updated_by = ?11,
                     updated_on = ?12,
                     sys_notes = ?13
                 WHERE id = ?1
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    expense.id,
                    expense.parent_expense_id,
                    expense.billname,
                    expense.amount,
                    expense.payment_account,
                    expense.description,
                    purchased_date,
                    encode_string_list(&expense.tags),
                    verified_date_time,
                    expense.category_id,
                    expense.audit.updated_by,
                    updated_on,
                    expense.audit.sys_notes,
                ],
                Self::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::Inconsistent(format!(
                    "expense {} vanished before it could be updated",
                    expense.id
                )),
                error => error.into(),
            })?;

        Ok(updated)
    }

    /// Delete an expense in the database by its `id`.
    ///
    /// Child expenses are removed by the foreign key cascade.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid expense,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: ResourceId) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;

        match rows_deleted {
            0 => Err(Error::NotFound),
            _ => Ok(()),
        }
    }
}

impl CreateTable for SQLiteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS expenses (
                    id TEXT PRIMARY KEY,
                    parent_expense_id TEXT,
                    billname TEXT NOT NULL,
                    amount REAL,
                    payment_account TEXT,
                    description TEXT,
                    purchased_date TEXT NOT NULL,
                    tags TEXT NOT NULL,
                    verified_date_time TEXT,
                    category_id TEXT,
                    created_by TEXT NOT NULL,
                    updated_by TEXT NOT NULL,
                    created_on TEXT NOT NULL,
                    updated_on TEXT NOT NULL,
                    sys_notes TEXT,
                    FOREIGN KEY(parent_expense_id) REFERENCES expenses(id) ON DELETE CASCADE,
                    FOREIGN KEY(category_id) REFERENCES config_types(id)
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteExpenseStore {
    type ReturnType = Expense;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let parent_expense_id = row.get(offset + 1)?;
        let billname = row.get(offset + 2)?;
        let amount = row.get(offset + 3)?;
        let payment_account = row.get(offset + 4)?;
        let description = row.get(offset + 5)?;
        let purchased_date =
            decode_timestamp(&row.get::<_, String>(offset + 6)?, offset + 6)?;
        let tags = decode_string_list(&row.get::<_, String>(offset + 7)?);
        let verified_date_time = row
            .get::<_, Option<String>>(offset + 8)?
            .map(|raw| decode_timestamp(&raw, offset + 8))
            .transpose()?;
        let category_id = row.get(offset + 9)?;

        let audit = Audit {
            created_by: row.get(offset + 10)?,
            updated_by: row.get(offset + 11)?,
            created_on: decode_timestamp(&row.get::<_, String>(offset + 12)?, offset + 12)?,
            updated_on: decode_timestamp(&row.get::<_, String>(offset + 13)?, offset + 13)?,
            sys_notes: row.get(offset + 14)?,
        };

        Ok(Expense {
            id,
            parent_expense_id,
            billname,
            amount,
            payment_account,
            description,
            purchased_date,
            tags,
            verified_date_time,
            category_id,
            audit,
        })
    }
}
