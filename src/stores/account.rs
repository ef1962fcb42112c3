//! Defines the account store trait and its query filter.

use serde::Deserialize;

use crate::{
    Error,
    models::{Account, ResourceId},
    stores::blank_as_none,
};

/// Handles the persistence of [Account]s.
pub trait AccountStore: Clone + Send + Sync {
    /// Insert a new account into the store.
    ///
    /// The caller is responsible for assigning the account a fresh id.
    fn insert(&mut self, account: Account) -> Result<Account, Error>;

    /// Retrieve an account by its id.
    fn get(&self, id: ResourceId) -> Result<Account, Error>;

    /// Retrieve the accounts matching `filter`, ordered by short name.
    fn get_query(&self, filter: &AccountFilter) -> Result<Vec<Account>, Error>;

    /// Overwrite the stored account that shares an id with `account`.
    fn update(&mut self, account: Account) -> Result<Account, Error>;

    /// Delete an account by its id.
    fn delete(&mut self, id: ResourceId) -> Result<(), Error>;
}

/// Defines which accounts [AccountStore::get_query] should fetch.
///
/// Absent or blank fields do not constrain the result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountFilter {
    /// Match accounts whose short name contains this text.
    #[serde(deserialize_with = "blank_as_none")]
    pub name: Option<String>,
}
