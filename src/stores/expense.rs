//! Defines the expense store trait and its query filter.

use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error,
    models::{Expense, ResourceId},
    stores::{blank_as_none, blank_as_none_datetime},
};

/// Handles the persistence of [Expense]s.
pub trait ExpenseStore: Clone + Send + Sync {
    /// Insert a new expense into the store.
    ///
    /// The caller is responsible for assigning the expense a fresh id.
    fn insert(&mut self, expense: Expense) -> Result<Expense, Error>;

    /// Retrieve an expense by its id.
    fn get(&self, id: ResourceId) -> Result<Expense, Error>;

    /// Retrieve the expenses matching `filter`, most recent purchase first.
    fn get_query(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, Error>;

    /// Overwrite the stored expense that shares an id with `expense`.
    fn update(&mut self, expense: Expense) -> Result<Expense, Error>;

    /// Delete an expense by its id. Child expenses are deleted with their
    /// parent.
    fn delete(&mut self, id: ResourceId) -> Result<(), Error>;
}

/// Defines which expenses [ExpenseStore::get_query] should fetch.
///
/// Absent or blank fields do not constrain the result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpenseFilter {
    /// Match expenses whose billname contains this text.
    #[serde(deserialize_with = "blank_as_none")]
    pub name: Option<String>,
    /// Match expenses purchased at or after this instant.
    #[serde(rename = "fromDate", deserialize_with = "blank_as_none_datetime")]
    pub from_date: Option<OffsetDateTime>,
    /// Match expenses purchased at or before this instant.
    #[serde(rename = "toDate", deserialize_with = "blank_as_none_datetime")]
    pub to_date: Option<OffsetDateTime>,
}
