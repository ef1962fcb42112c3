//! Defines the store traits that abstract over persistence and the filter
//! types used to query them, plus the SQLite implementations.

pub mod account;
pub mod config_type;
pub mod expense;
pub mod sqlite;
pub mod user;

pub use account::{AccountFilter, AccountStore};
pub use config_type::{ConfigTypeFilter, ConfigTypeStore};
pub use expense::{ExpenseFilter, ExpenseStore};
pub use user::UserStore;

use serde::{Deserialize, Deserializer};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Deserialize an optional query parameter, treating a blank value the same
/// as an absent one.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let maybe_value: Option<String> = Option::deserialize(deserializer)?;

    Ok(maybe_value.filter(|value| !value.trim().is_empty()))
}

/// Deserialize an optional RFC 3339 timestamp query parameter, treating a
/// blank value the same as an absent one.
pub(crate) fn blank_as_none_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let maybe_value: Option<String> = Option::deserialize(deserializer)?;

    match maybe_value {
        Some(raw) if !raw.trim().is_empty() => OffsetDateTime::parse(raw.trim(), &Rfc3339)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod filter_deserialization_tests {
    use serde::Deserialize;
    use time::macros::datetime;

    use super::{blank_as_none, blank_as_none_datetime};

    #[derive(Deserialize)]
    struct TestFilter {
        #[serde(default, deserialize_with = "blank_as_none")]
        name: Option<String>,
        #[serde(default, deserialize_with = "blank_as_none_datetime")]
        from: Option<time::OffsetDateTime>,
    }

    #[test]
    fn blank_values_mean_absent() {
        let filter: TestFilter = serde_json::from_str(r#"{"name": "", "from": " "}"#).unwrap();

        assert_eq!(filter.name, None);
        assert_eq!(filter.from, None);
    }

    #[test]
    fn present_values_are_parsed() {
        let filter: TestFilter =
            serde_json::from_str(r#"{"name": "rent", "from": "2024-03-01T00:00:00Z"}"#).unwrap();

        assert_eq!(filter.name.as_deref(), Some("rent"));
        assert_eq!(filter.from, Some(datetime!(2024-03-01 00:00 UTC)));
    }

    #[test]
    fn missing_values_are_absent() {
        let filter: TestFilter = serde_json::from_str("{}").unwrap();

        assert_eq!(filter.name, None);
        assert_eq!(filter.from, None);
    }
}
