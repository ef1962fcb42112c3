//! Implements the add/update/delete protocol for expenses.

use crate::{
    Error,
    models::{ExpenseResource, ResourceId},
    stores::{ExpenseFilter, ExpenseStore},
};

/// Orchestrates expense persistence on top of an [ExpenseStore].
#[derive(Debug, Clone)]
pub struct ExpenseService<S> {
    store: S,
}

impl<S: ExpenseStore> ExpenseService<S> {
    /// Create a new service on top of `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Retrieve the expenses matching `filter`. An empty filter matches all.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error.
    pub fn list(&self, filter: &ExpenseFilter) -> Result<Vec<ExpenseResource>, Error> {
        Ok(self
            .store
            .get_query(filter)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Retrieve a single expense by its id.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to an expense.
    pub fn get(&self, id: ResourceId) -> Result<ExpenseResource, Error> {
        self.store.get(id).map(Into::into)
    }

    /// Add a new expense and return it as persisted.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::IdentityAssigned] if the resource already carries an id,
    /// - [Error::Validation] if a required field is missing,
    /// - or an error from the store.
    pub fn add(&mut self, resource: ExpenseResource) -> Result<ExpenseResource, Error> {
        if resource.id.is_some() {
            return Err(Error::IdentityAssigned);
        }

        self.store.insert(resource.into_new_entity()?).map(Into::into)
    }

    /// Update the expense identified by the resource's id, merging only the
    /// fields present in `resource`.
    ///
    /// If the id does not match a stored expense, the resource is inserted
    /// under a freshly generated id instead.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] if the resource carries no id, or if an insert
    ///   fallback is missing a required field,
    /// - or an error from the store.
    pub fn update(&mut self, resource: ExpenseResource) -> Result<ExpenseResource, Error> {
        let id = resource.id.ok_or_else(|| {
            Error::Validation("expenseId must be provided when updating".to_string())
        })?;

        match self.store.get(id) {
            Ok(mut entity) => {
                resource.apply_to(&mut entity);
                self.store.update(entity).map(Into::into)
            }
            Err(Error::NotFound) => {
                let entity = ExpenseResource {
                    id: None,
                    ..resource
                }
                .into_new_entity()?;

                self.store.insert(entity).map(Into::into)
            }
            Err(error) => Err(error),
        }
    }

    /// Delete the expense with the given `id` and return its pre-deletion
    /// snapshot. Child expenses are deleted along with it.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to an expense.
    pub fn delete(&mut self, id: ResourceId) -> Result<ExpenseResource, Error> {
        let snapshot = self.store.get(id)?;
        self.store.delete(id)?;

        Ok(snapshot.into())
    }
}

#[cfg(test)]
mod expense_service_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        db::initialize,
        models::{ExpenseResource, ResourceId},
        stores::{ExpenseFilter, sqlite::SQLiteExpenseStore},
    };

    use super::ExpenseService;

    fn get_service() -> ExpenseService<SQLiteExpenseStore> {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        ExpenseService::new(SQLiteExpenseStore::new(Arc::new(Mutex::new(connection))))
    }

    fn test_resource(billname: &str) -> ExpenseResource {
        ExpenseResource {
            billname: Some(billname.to_string()),
            amount: Some(42.5),
            purchased_date: Some(datetime!(2024-03-01 12:00 UTC)),
            ..Default::default()
        }
    }

    #[test]
    fn add_assigns_an_id_and_audit_stamp() {
        let mut service = get_service();

        let added = service.add(test_resource("Groceries")).unwrap();

        assert!(added.id.is_some());
        assert!(added.created_on.is_some());
        assert_eq!(added.created_by.as_deref(), Some("system"));
    }

    #[test]
    fn add_rejects_a_pre_assigned_identity() {
        let mut service = get_service();
        let resource = ExpenseResource {
            id: Some(ResourceId::generate()),
            ..test_resource("Groceries")
        };

        assert_eq!(service.add(resource), Err(Error::IdentityAssigned));
    }

    #[test]
    fn update_merges_present_fields_only() {
        let mut service = get_service();
        let added = service.add(test_resource("Groceries")).unwrap();

        let updated = service
            .update(ExpenseResource {
                id: added.id,
                amount: Some(99.99),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(updated.amount, Some(99.99));
        assert_eq!(updated.billname.as_deref(), Some("Groceries"));
        assert_eq!(updated.created_on, added.created_on);
    }

    #[test]
    fn update_without_an_id_is_a_validation_error() {
        let mut service = get_service();

        assert!(matches!(
            service.update(test_resource("Groceries")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn update_on_a_miss_inserts_under_a_fresh_id() {
        let mut service = get_service();
        let stale_id = ResourceId::generate();

        let upserted = service
            .update(ExpenseResource {
                id: Some(stale_id),
                ..test_resource("Groceries")
            })
            .unwrap();

        let fresh_id = upserted.id.unwrap();
        assert_ne!(fresh_id, stale_id);
        assert_eq!(service.get(fresh_id).unwrap().id, upserted.id);
    }

    #[test]
    fn delete_returns_the_snapshot() {
        let mut service = get_service();
        let added = service.add(test_resource("Groceries")).unwrap();
        let id = added.id.unwrap();

        let snapshot = service.delete(id).unwrap();

        assert_eq!(snapshot, added);
        assert_eq!(service.get(id), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_on_unknown_id() {
        let mut service = get_service();

        assert_eq!(
            service.delete(ResourceId::generate()),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn list_with_empty_filter_returns_all() {
        let mut service = get_service();
        service.add(test_resource("Groceries")).unwrap();
        service.add(test_resource("Rent")).unwrap();

        let got = service.list(&ExpenseFilter::default()).unwrap();

        assert_eq!(got.len(), 2);
    }
}
