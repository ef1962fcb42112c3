//! Implements the add/update/delete protocol for accounts.

use crate::{
    Error,
    models::{AccountResource, ResourceId},
    stores::{AccountFilter, AccountStore},
};

/// Orchestrates account persistence on top of an [AccountStore].
#[derive(Debug, Clone)]
pub struct AccountService<S> {
    store: S,
}

impl<S: AccountStore> AccountService<S> {
    /// Create a new service on top of `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Retrieve the accounts matching `filter`. An empty filter matches all.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error.
    pub fn list(&self, filter: &AccountFilter) -> Result<Vec<AccountResource>, Error> {
        Ok(self
            .store
            .get_query(filter)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Retrieve a single account by its id.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to an account.
    pub fn get(&self, id: ResourceId) -> Result<AccountResource, Error> {
        self.store.get(id).map(Into::into)
    }

    /// Add a new account and return it as persisted.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::IdentityAssigned] if the resource already carries an id,
    /// - [Error::Validation] if `shortName` is missing,
    /// - or an error from the store.
    pub fn add(&mut self, resource: AccountResource) -> Result<AccountResource, Error> {
        if resource.id.is_some() {
            return Err(Error::IdentityAssigned);
        }

        self.store.insert(resource.into_new_entity()?).map(Into::into)
    }

    /// Update the account identified by the resource's id, merging only the
    /// fields present in `resource`.
    ///
    /// If the id does not match a stored account, the resource is inserted
    /// under a freshly generated id instead.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] if the resource carries no id, or if an insert
    ///   fallback is missing a required field,
    /// - or an error from the store.
    pub fn update(&mut self, resource: AccountResource) -> Result<AccountResource, Error> {
        let id = resource.id.ok_or_else(|| {
            Error::Validation("accountId must be provided when updating".to_string())
        })?;

        match self.store.get(id) {
            Ok(mut entity) => {
                resource.apply_to(&mut entity);
                self.store.update(entity).map(Into::into)
            }
            Err(Error::NotFound) => {
                let entity = AccountResource {
                    id: None,
                    ..resource
                }
                .into_new_entity()?;

                self.store.insert(entity).map(Into::into)
            }
            Err(error) => Err(error),
        }
    }

    /// Delete the account with the given `id` and return its pre-deletion
    /// snapshot.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to an account.
    pub fn delete(&mut self, id: ResourceId) -> Result<AccountResource, Error> {
        let snapshot = self.store.get(id)?;
        self.store.delete(id)?;

        Ok(snapshot.into())
    }
}

#[cfg(test)]
mod account_service_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::{AccountResource, ResourceId},
        stores::{AccountFilter, sqlite::SQLiteAccountStore},
    };

    use super::AccountService;

    fn get_service() -> AccountService<SQLiteAccountStore> {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        AccountService::new(SQLiteAccountStore::new(Arc::new(Mutex::new(connection))))
    }

    fn test_resource(short_name: &str) -> AccountResource {
        AccountResource {
            short_name: Some(short_name.to_string()),
            institution_name: Some("First Bank".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn add_then_update_then_delete() {
        let mut service = get_service();

        let added = service.add(test_resource("Chk1001")).unwrap();
        assert!(added.id.is_some());

        let updated = service
            .update(AccountResource {
                id: added.id,
                account_name: Some("Everyday Checking".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.short_name.as_deref(), Some("Chk1001"));
        assert_eq!(updated.account_name.as_deref(), Some("Everyday Checking"));

        let snapshot = service.delete(added.id.unwrap()).unwrap();
        assert_eq!(snapshot.id, added.id);
        assert_eq!(service.get(added.id.unwrap()), Err(Error::NotFound));
    }

    #[test]
    fn add_rejects_a_pre_assigned_identity() {
        let mut service = get_service();
        let resource = AccountResource {
            id: Some(ResourceId::generate()),
            ..test_resource("Chk1001")
        };

        assert_eq!(service.add(resource), Err(Error::IdentityAssigned));
    }

    #[test]
    fn update_on_a_miss_inserts_under_a_fresh_id() {
        let mut service = get_service();
        let stale_id = ResourceId::generate();

        let upserted = service
            .update(AccountResource {
                id: Some(stale_id),
                ..test_resource("Chk1001")
            })
            .unwrap();

        assert_ne!(upserted.id, Some(stale_id));
        assert_eq!(service.list(&AccountFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn update_miss_still_requires_short_name() {
        let mut service = get_service();

        let result = service.update(AccountResource {
            id: Some(ResourceId::generate()),
            description: Some("no short name".to_string()),
            ..Default::default()
        });

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
