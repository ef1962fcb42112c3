//! Implements the add/update/delete protocol for config types.

use crate::{
    Error,
    models::{ConfigTypeResource, ResourceId},
    stores::{ConfigTypeFilter, ConfigTypeStore},
};

/// Orchestrates config type persistence on top of a [ConfigTypeStore].
#[derive(Debug, Clone)]
pub struct ConfigTypeService<S> {
    store: S,
}

impl<S: ConfigTypeStore> ConfigTypeService<S> {
    /// Create a new service on top of `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Retrieve the config types matching `filter`. An empty filter matches
    /// all.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error.
    pub fn list(&self, filter: &ConfigTypeFilter) -> Result<Vec<ConfigTypeResource>, Error> {
        Ok(self
            .store
            .get_query(filter)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Retrieve a single config type by its id.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a config type.
    pub fn get(&self, id: ResourceId) -> Result<ConfigTypeResource, Error> {
        self.store.get(id).map(Into::into)
    }

    /// Add a new config type and return it as persisted.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::IdentityAssigned] if the resource already carries an id,
    /// - [Error::Validation] if a required field is missing,
    /// - or an error from the store.
    pub fn add(&mut self, resource: ConfigTypeResource) -> Result<ConfigTypeResource, Error> {
        if resource.id.is_some() {
            return Err(Error::IdentityAssigned);
        }

        self.store.insert(resource.into_new_entity()?).map(Into::into)
    }

    /// Update the config type identified by the resource's id, merging only
    /// the fields present in `resource`.
    ///
    /// If the id does not match a stored config type, the resource is
    /// inserted under a freshly generated id instead.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] if the resource carries no id, or if an insert
    ///   fallback is missing a required field,
    /// - or an error from the store.
    pub fn update(&mut self, resource: ConfigTypeResource) -> Result<ConfigTypeResource, Error> {
        let id = resource.id.ok_or_else(|| {
            Error::Validation("configId must be provided when updating".to_string())
        })?;

        match self.store.get(id) {
            Ok(mut entity) => {
                resource.apply_to(&mut entity);
                self.store.update(entity).map(Into::into)
            }
            Err(Error::NotFound) => {
                let entity = ConfigTypeResource {
                    id: None,
                    ..resource
                }
                .into_new_entity()?;

                self.store.insert(entity).map(Into::into)
            }
            Err(error) => Err(error),
        }
    }

    /// Delete the config type with the given `id` and return its
    /// pre-deletion snapshot.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a config type.
    pub fn delete(&mut self, id: ResourceId) -> Result<ConfigTypeResource, Error> {
        let snapshot = self.store.get(id)?;
        self.store.delete(id)?;

        Ok(snapshot.into())
    }
}

#[cfg(test)]
mod config_type_service_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::{ConfigTypeResource, DEFAULT_CONFIG_STATUS, ResourceId},
        stores::{ConfigTypeFilter, sqlite::SQLiteConfigTypeStore},
    };

    use super::ConfigTypeService;

    fn get_service() -> ConfigTypeService<SQLiteConfigTypeStore> {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        ConfigTypeService::new(SQLiteConfigTypeStore::new(Arc::new(Mutex::new(connection))))
    }

    fn test_resource(value: &str, belongs_to: &str) -> ConfigTypeResource {
        ConfigTypeResource {
            value: Some(value.to_string()),
            name: Some(value.to_string()),
            belongs_to: Some(belongs_to.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn add_defaults_the_status() {
        let mut service = get_service();

        let added = service
            .add(test_resource("grocery", "expense_category"))
            .unwrap();

        assert_eq!(added.status.as_deref(), Some(DEFAULT_CONFIG_STATUS));
    }

    #[test]
    fn add_rejects_a_pre_assigned_identity() {
        let mut service = get_service();
        let resource = ConfigTypeResource {
            id: Some(ResourceId::generate()),
            ..test_resource("grocery", "expense_category")
        };

        assert_eq!(service.add(resource), Err(Error::IdentityAssigned));
    }

    #[test]
    fn update_on_a_miss_inserts_under_a_fresh_id() {
        let mut service = get_service();
        let stale_id = ResourceId::generate();

        let upserted = service
            .update(ConfigTypeResource {
                id: Some(stale_id),
                ..test_resource("grocery", "expense_category")
            })
            .unwrap();

        assert_ne!(upserted.id, Some(stale_id));
        assert_eq!(
            service.get(upserted.id.unwrap()).unwrap().value,
            upserted.value
        );
    }

    #[test]
    fn list_filters_by_belongs_to() {
        let mut service = get_service();
        service
            .add(test_resource("grocery", "expense_category"))
            .unwrap();
        service
            .add(test_resource("checking", "account_type"))
            .unwrap();

        let got = service
            .list(&ConfigTypeFilter {
                belongs_to: Some("account_type".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].value.as_deref(), Some("checking"));
    }

    #[test]
    fn delete_returns_the_snapshot() {
        let mut service = get_service();
        let added = service
            .add(test_resource("grocery", "expense_category"))
            .unwrap();
        let id = added.id.unwrap();

        let snapshot = service.delete(id).unwrap();

        assert_eq!(snapshot, added);
        assert_eq!(service.get(id), Err(Error::NotFound));
    }
}
