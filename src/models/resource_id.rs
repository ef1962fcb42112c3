//! The opaque identity type shared by all entities.
//!
//! Identities are native UUIDs inside the application and plain strings at
//! the REST boundary. This module owns the single parse/format pair for that
//! coercion so no other code needs to branch on string-versus-UUID.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use uuid::Uuid;

use crate::Error;

/// A newtype wrapper for the UUID primary keys used by every entity.
///
/// This helps disambiguate resource ids from other strings and keeps the
/// UUID-string round-trip in one place: serializing an id and parsing it back
/// yields the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Create a fresh, server-generated identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identity from its string form.
    ///
    /// Accepts hyphenated and simple (32 hex digit) forms.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `raw` is not a valid UUID.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| Error::Validation(format!("\"{raw}\" is not a valid resource id")))
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ResourceId::parse(&raw).map_err(de::Error::custom)
    }
}

impl ToSql for ResourceId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for ResourceId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;

        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Deserialize an optional identity field, treating a missing field, `null`,
/// or an empty string as absent.
///
/// Empty values pass through as `None` rather than failing UUID parsing,
/// which keeps sparse request bodies and blank query parameters valid.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<ResourceId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => ResourceId::parse(value).map(Some).map_err(de::Error::custom),
    }
}
