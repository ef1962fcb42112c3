//! Schema initialisation and traits for mapping between SQLite rows and the
//! domain [models](crate::models).

use rusqlite::{Connection, Error, Row, types::Type};
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::stores::sqlite::{
    SQLiteAccountStore, SQLiteConfigTypeStore, SQLiteExpenseStore, SQLiteUserStore,
};

/// The encoding for timestamp TEXT columns.
///
/// Timestamps are normalised to UTC and the subsecond width is fixed so that
/// the lexicographic order of the stored strings matches chronological order,
/// which the date range filters rely on.
const SQL_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z");

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a
/// concrete rust type.
pub trait MapRow {
    /// The type that the implementation maps rows to.
    type ReturnType;

    /// Convert a row into a concrete type, starting from the first column.
    ///
    /// # Errors
    /// Returns an error if a column is missing or cannot be converted.
    fn map_row(row: &Row) -> Result<Self::ReturnType, Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, starting from the column at
    /// `offset`.
    ///
    /// # Errors
    /// Returns an error if a column is missing or cannot be converted.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, Error>;
}

/// Create the tables for all entities and enable foreign key enforcement.
///
/// Foreign keys must be on for the expense parent/child cascade to work.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    SQLiteConfigTypeStore::create_table(connection)?;
    SQLiteExpenseStore::create_table(connection)?;
    SQLiteAccountStore::create_table(connection)?;
    SQLiteUserStore::create_table(connection)?;

    Ok(())
}

/// Encode a list of strings as a JSON array for storage in a TEXT column.
///
/// SQLite has no array type, so `tags` and `relations` columns hold JSON.
pub(crate) fn encode_string_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON array TEXT column back into a list of strings.
///
/// Malformed column contents decode to an empty list rather than failing the
/// whole row.
pub(crate) fn decode_string_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Encode a timestamp for storage in a TEXT column.
///
/// # Errors
/// Returns an error if the timestamp cannot be formatted.
pub(crate) fn encode_timestamp(value: OffsetDateTime) -> Result<String, Error> {
    value
        .to_offset(UtcOffset::UTC)
        .format(SQL_TIMESTAMP_FORMAT)
        .map_err(|error| Error::ToSqlConversionFailure(Box::new(error)))
}

/// Decode a timestamp TEXT column written by [encode_timestamp].
///
/// # Errors
/// Returns an error naming the `column` that failed to parse.
pub(crate) fn decode_timestamp(raw: &str, column: usize) -> Result<OffsetDateTime, Error> {
    PrimitiveDateTime::parse(raw, SQL_TIMESTAMP_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|error| Error::FromSqlConversionFailure(column, Type::Text, Box::new(error)))
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn foreign_keys_are_enabled() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let enabled: i64 = connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();

        assert_eq!(enabled, 1);
    }
}

#[cfg(test)]
mod string_list_tests {
    use super::{decode_string_list, encode_string_list};

    #[test]
    fn encodes_and_decodes_tags() {
        let tags = vec!["groceries".to_string(), "shared".to_string()];

        let encoded = encode_string_list(&tags);

        assert_eq!(decode_string_list(&encoded), tags);
    }

    #[test]
    fn decodes_garbage_to_empty_list() {
        assert!(decode_string_list("not json").is_empty());
    }
}

#[cfg(test)]
mod timestamp_tests {
    use time::macros::datetime;

    use super::{decode_timestamp, encode_timestamp};

    #[test]
    fn round_trips_to_the_nanosecond() {
        let timestamp = datetime!(2024-03-01 12:34:56.123456789 UTC);

        let encoded = encode_timestamp(timestamp).unwrap();

        assert_eq!(decode_timestamp(&encoded, 0).unwrap(), timestamp);
    }

    #[test]
    fn normalises_offsets_to_utc() {
        let local = datetime!(2024-03-01 12:00 +5:30);
        let utc = datetime!(2024-03-01 06:30 UTC);

        assert_eq!(
            encode_timestamp(local).unwrap(),
            encode_timestamp(utc).unwrap()
        );
    }

    #[test]
    fn encoded_order_matches_chronological_order() {
        let earlier = encode_timestamp(datetime!(2024-03-01 12:00:00 UTC)).unwrap();
        let later = encode_timestamp(datetime!(2024-03-01 12:00:00.5 UTC)).unwrap();

        assert!(earlier < later);
    }
}
