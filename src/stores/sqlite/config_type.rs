//! Implements a SQLite backed config type store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params, params_from_iter, types::Value};

use crate::{
    Error,
    db::{
        CreateTable, MapRow, decode_string_list, decode_timestamp, encode_string_list,
        encode_timestamp,
    },
    models::{Audit, ConfigType, ResourceId},
    stores::{ConfigTypeFilter, ConfigTypeStore},
};

/// The config type columns, in the order the row mapper expects them.
const COLUMNS: &str = "id, value, name, relations, belongs_to, description, status, created_by, \
                       updated_by, created_on, updated_on, sys_notes";

/// Stores config types in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteConfigTypeStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteConfigTypeStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl ConfigTypeStore for SQLiteConfigTypeStore {
    /// Insert a new config type into the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Inconsistent] if the inserted row cannot be read back,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn insert(&mut self, config_type: ConfigType) -> Result<ConfigType, Error> {
        let created_on = encode_timestamp(config_type.audit.created_on)?;
        let updated_on = encode_timestamp(config_type.audit.updated_on)?;

        let connection = self.connection.lock().unwrap();

        let inserted = connection
            .prepare(&format!(
                "INSERT INTO config_types ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    config_type.id,
                    config_type.value,
                    config_type.name,
                    encode_string_list(&config_type.relations),
                    config_type.belongs_to,
                    config_type.description,
                    config_type.status,
                    config_type.audit.created_by,
                    config_type.audit.updated_by,
                    created_on,
                    updated_on,
                    config_type.audit.sys_notes,
                ],
                Self::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::Inconsistent(
                    "config type row could not be read back after insert".to_string(),
                ),
                error => error.into(),
            })?;

        Ok(inserted)
    }

    /// Retrieve a config type in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid config type,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: ResourceId) -> Result<ConfigType, Error> {
        let config_type = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!("SELECT {COLUMNS} FROM config_types WHERE id = ?1"))?
            .query_row(params![id], Self::map_row)?;

        Ok(config_type)
    }

    /// Query for config types in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_query(&self, filter: &ConfigTypeFilter) -> Result<Vec<ConfigType>, Error> {
        let mut query_string_parts = vec![format!("SELECT {COLUMNS} FROM config_types")];
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(id) = filter.id {
            where_clause_parts.push(format!("id = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(id.to_string()));
        }

        if let Some(belongs_to) = &filter.belongs_to {
            where_clause_parts.push(format!("belongs_to = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(belongs_to.clone()));
        }

        if let Some(status) = &filter.status {
            where_clause_parts.push(format!("status = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(status.clone()));
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        query_string_parts.push("ORDER BY name ASC".to_string());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_config_type| maybe_config_type.map_err(Error::SqlError))
            .collect()
    }

    /// Overwrite the stored config type that shares an id with `config_type`.
    ///
    /// Creation columns are never rewritten.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Inconsistent] if the row does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, config_type: ConfigType) -> Result<ConfigType, Error> {
        let updated_on = encode_timestamp(config_type.audit.updated_on)?;

        let connection = self.connection.lock().unwrap();

        let updated = connection
            .prepare(&format!(
                "UPDATE config_types SET
                     value = ?2,
                     name = ?3,
                     relations = ?4,
                     belongs_to = ?5,
                     description = ?6,
                     status = ?7,
                     updated_by = ?8,
                     updated_on = ?9,
                     sys_notes = ?10
                 WHERE id = ?1
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    config_type.id,
                    config_type.value,
                    config_type.name,
                    encode_string_list(&config_type.relations),
                    config_type.belongs_to,
                    config_type.description,
                    config_type.status,
                    config_type.audit.updated_by,
                    updated_on,
                    config_type.audit.sys_notes,
                ],
                Self::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::Inconsistent(format!(
                    "config type {} vanished before it could be updated",
                    config_type.id
                )),
                error => error.into(),
            })?;

        Ok(updated)
    }

    /// Delete a config type in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid config type,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: ResourceId) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM config_types WHERE id = ?1", params![id])?;

        match rows_deleted {
            0 => Err(Error::NotFound),
            _ => Ok(()),
        }
    }
}

impl CreateTable for SQLiteConfigTypeStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS config_types (
                    id TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    name TEXT NOT NULL,
                    relations TEXT NOT NULL,
                    belongs_to TEXT NOT NULL,
                    description TEXT,
                    status TEXT NOT NULL,
                    created_by TEXT NOT NULL,
                    updated_by TEXT NOT NULL,
                    created_on TEXT NOT NULL,
                    updated_on TEXT NOT NULL,
                    sys_notes TEXT
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteConfigTypeStore {
    type ReturnType = ConfigType;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let value = row.get(offset + 1)?;
        let name = row.get(offset + 2)?;
        let relations = decode_string_list(&row.get::<_, String>(offset + 3)?);
        let belongs_to = row.get(offset + 4)?;
        let description = row.get(offset + 5)?;
        let status = row.get(offset + 6)?;

        let audit = Audit {
            created_by: row.get(offset + 7)?,
            updated_by: row.get(offset + 8)?,
            created_on: decode_timestamp(&row.get::<_, String>(offset + 9)?, offset + 9)?,
            updated_on: decode_timestamp(&row.get::<_, String>(offset + 10)?, offset + 10)?,
            sys_notes: row.get(offset + 11)?,
        };

        Ok(ConfigType {
            id,
            value,
            name,
            relations,
            belongs_to,
            description,
            status,
            audit,
        })
    }
}
