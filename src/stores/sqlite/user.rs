//! Implements a SQLite backed user store.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use email_address::EmailAddress;
use rusqlite::{Connection, Row, params, types::Type};

use crate::{
    Error,
    db::{CreateTable, MapRow, decode_timestamp, encode_timestamp},
    models::{Audit, PasswordHash, ResourceId, User, UserStatus},
    stores::UserStore,
};

/// The user columns, in the order the row mapper expects them.
const COLUMNS: &str = "id, username, password, encrypt_type, email_id, phone_number, first_name, \
                       last_name, status, access_token, expires_in, notes, created_by, \
                       updated_by, created_on, updated_on, sys_notes";

/// Stores users in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn get_by_column(&self, column: &str, value: &str) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM users WHERE {column} = ?1"
            ))?
            .query_row(params![value], Self::map_row)?;

        Ok(user)
    }
}

impl UserStore for SQLiteUserStore {
    /// Insert a new user into the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateUsername] if the username is already taken,
    /// - [Error::DuplicateEmail] if the email address is already in use,
    /// - [Error::Inconsistent] if the inserted row cannot be read back,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn insert(&mut self, user: User) -> Result<User, Error> {
        let created_on = encode_timestamp(user.audit.created_on)?;
        let updated_on = encode_timestamp(user.audit.updated_on)?;

        let connection = self.connection.lock().unwrap();

        let inserted = connection
            .prepare(&format!(
                "INSERT INTO users ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    user.id,
                    user.username,
                    user.password.as_str(),
                    user.encrypt_type,
                    user.email_id.as_ref().map(EmailAddress::to_string),
                    user.phone_number,
                    user.first_name,
                    user.last_name,
                    user.status.as_str(),
                    user.access_token,
                    user.expires_in,
                    user.notes,
                    user.audit.created_by,
                    user.audit.updated_by,
                    created_on,
                    updated_on,
                    user.audit.sys_notes,
                ],
                Self::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => {
                    Error::Inconsistent("user row could not be read back after insert".to_string())
                }
                error => error.into(),
            })?;

        Ok(inserted)
    }

    /// Retrieve a user in the database by their `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: ResourceId) -> Result<User, Error> {
        self.get_by_column("id", &id.to_string())
    }

    /// Retrieve a user in the database by their `username`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `username` does not refer to a valid user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_by_username(&self, username: &str) -> Result<User, Error> {
        self.get_by_column("username", username)
    }

    /// Retrieve a user in the database by their `email` address.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `email` does not refer to a valid user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        self.get_by_column("email_id", email.as_str())
    }

    /// Overwrite the stored user that shares an id with `user`.
    ///
    /// The identity and creation columns are never rewritten.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateUsername] if the new username is already taken,
    /// - [Error::DuplicateEmail] if the new email address is already in use,
    /// - [Error::Inconsistent] if the row does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, user: User) -> Result<User, Error> {
        let updated_on = encode_timestamp(user.audit.updated_on)?;

        let connection = self.connection.lock().unwrap();

        let updated = connection
            .prepare(&format!(
                "UPDATE users SET
                     username = ?2,
                     password = ?3,
                     encrypt_type = ?4,
                     email_id = ?5,
                     phone_number = ?6,
                     first_name = ?7,
                     last_name = ?8,
                     status = ?9,
                     access_token = ?10,
                     expires_in = ?11,
                     notes = ?12,
                     updated_by = ?13,
                     updated_on = ?14,
                     sys_notes = ?15
                 WHERE id = ?1
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    user.id,
                    user.username,
                    user.password.as_str(),
                    user.encrypt_type,
                    user.email_id.as_ref().map(EmailAddress::to_string),
                    user.phone_number,
                    user.first_name,
                    user.last_name,
                    user.status.as_str(),
                    user.access_token,
                    user.expires_in,
                    user.notes,
                    user.audit.updated_by,
                    updated_on,
                    user.audit.sys_notes,
                ],
                Self::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::Inconsistent(format!(
                    "user {} vanished before they could be updated",
                    user.id
                )),
                error => error.into(),
            })?;

        Ok(updated)
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    username TEXT NOT NULL UNIQUE,
                    password TEXT NOT NULL,
                    encrypt_type TEXT NOT NULL,
                    email_id TEXT UNIQUE,
                    phone_number TEXT,
                    first_name TEXT,
                    last_name TEXT,
                    status TEXT NOT NULL,
                    access_token TEXT,
                    expires_in INTEGER,
                    notes TEXT,
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

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let username = row.get(offset + 1)?;
        let password = PasswordHash::new_unchecked(&row.get::<_, String>(offset + 2)?);
        let encrypt_type = row.get(offset + 3)?;
        let email_id = row
            .get::<_, Option<String>>(offset + 4)?
            .map(|raw| {
                EmailAddress::from_str(&raw).map_err(|error| {
                    rusqlite::Error::FromSqlConversionFailure(
                        offset + 4,
                        Type::Text,
                        Box::new(error),
                    )
                })
            })
            .transpose()?;
        let phone_number = row.get(offset + 5)?;
        let first_name = row.get(offset + 6)?;
        let last_name = row.get(offset + 7)?;
        let status = UserStatus::from_str(&row.get::<_, String>(offset + 8)?).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 8, Type::Text, Box::new(error))
        })?;
        let access_token = row.get(offset + 9)?;
        let expires_in = row.get(offset + 10)?;
        let notes = row.get(offset + 11)?;

        let audit = Audit {
            created_by: row.get(offset + 12)?,
            updated_by: row.get(offset + 13)?,
            created_on: decode_timestamp(&row.get::<_, String>(offset + 14)?, offset + 14)?,
            updated_on: decode_timestamp(&row.get::<_, String>(offset + 15)?, offset + 15)?,
            sys_notes: row.get(offset + 16)?,
        };

        Ok(User {
            id,
            username,
            password,
            encrypt_type,
            email_id,
            phone_number,
            first_name,
            last_name,
            status,
            access_token,
            expires_in,
            notes,
            audit,
        })
    }
}

#[cfg(test)]
mod sqlite_user_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::{PasswordHash, ResourceId, User, UserResource, UserStatus, parse_email},
        stores::UserStore,
    };

    use super::SQLiteUserStore;

    fn get_store() -> SQLiteUserStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SQLiteUserStore::new(Arc::new(Mutex::new(connection)))
    }

    fn test_user(username: &str, email: &str) -> User {
        UserResource {
            username: Some(username.to_string()),
            email_id: Some(email.to_string()),
            first_name: Some("Neel".to_string()),
            last_name: Some("Sheth".to_string()),
            ..Default::default()
        }
        .into_new_entity(PasswordHash::new_unchecked("$2b$04$notarealhash"))
        .unwrap()
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut store = get_store();
        let user = test_user("neel_sheth", "neel@example.com");

        let inserted = store.insert(user.clone()).unwrap();

        assert_eq!(inserted, user);
        assert_eq!(store.get(user.id), Ok(user));
    }

    #[test]
    fn get_fails_on_unknown_id() {
        let store = get_store();

        assert_eq!(store.get(ResourceId::generate()), Err(Error::NotFound));
    }

    #[test]
    fn get_by_username_and_email() {
        let mut store = get_store();
        let user = store
            .insert(test_user("neel_sheth", "neel@example.com"))
            .unwrap();

        assert_eq!(store.get_by_username("neel_sheth"), Ok(user.clone()));
        assert_eq!(
            store.get_by_email(&parse_email("neel@example.com").unwrap()),
            Ok(user)
        );
        assert_eq!(store.get_by_username("nobody"), Err(Error::NotFound));
    }

    #[test]
    fn insert_fails_on_duplicate_username() {
        let mut store = get_store();
        store
            .insert(test_user("neel_sheth", "neel@example.com"))
            .unwrap();

        let duplicate = store.insert(test_user("neel_sheth", "other@example.com"));

        assert_eq!(duplicate, Err(Error::DuplicateUsername));
    }

    #[test]
    fn insert_fails_on_duplicate_email() {
        let mut store = get_store();
        store
            .insert(test_user("neel_sheth", "neel@example.com"))
            .unwrap();

        let duplicate = store.insert(test_user("other_name", "neel@example.com"));

        assert_eq!(duplicate, Err(Error::DuplicateEmail));
    }

    #[test]
    fn update_persists_a_status_change() {
        let mut store = get_store();
        let mut user = store
            .insert(test_user("neel_sheth", "neel@example.com"))
            .unwrap();

        user.status = UserStatus::Deleted;
        store.update(user.clone()).unwrap();

        assert_eq!(store.get(user.id).unwrap().status, UserStatus::Deleted);
    }

    #[test]
    fn update_persists_a_fresh_access_token() {
        let mut store = get_store();
        let mut user = store
            .insert(test_user("neel_sheth", "neel@example.com"))
            .unwrap();

        user.access_token = Some("21f7fc1bfdf547c5a50218a9c96a0d72".to_string());
        user.expires_in = Some(3600);
        store.update(user.clone()).unwrap();

        assert_eq!(store.get(user.id), Ok(user));
    }
}
