//! Defines the config type store trait and its query filter.

use serde::Deserialize;

use crate::{
    Error,
    models::{ConfigType, ResourceId, resource_id},
    stores::blank_as_none,
};

/// Handles the persistence of [ConfigType]s.
pub trait ConfigTypeStore: Clone + Send + Sync {
    /// Insert a new config type into the store.
    ///
    /// The caller is responsible for assigning the config type a fresh id.
    fn insert(&mut self, config_type: ConfigType) -> Result<ConfigType, Error>;

    /// Retrieve a config type by its id.
    fn get(&self, id: ResourceId) -> Result<ConfigType, Error>;

    /// Retrieve the config types matching `filter`, ordered by name.
    fn get_query(&self, filter: &ConfigTypeFilter) -> Result<Vec<ConfigType>, Error>;

    /// Overwrite the stored config type that shares an id with `config_type`.
    fn update(&mut self, config_type: ConfigType) -> Result<ConfigType, Error>;

    /// Delete a config type by its id.
    fn delete(&mut self, id: ResourceId) -> Result<(), Error>;
}

/// Defines which config types [ConfigTypeStore::get_query] should fetch.
///
/// Absent or blank fields do not constrain the result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigTypeFilter {
    /// Match the config type with this exact id.
    #[serde(
        rename = "configId",
        alias = "id",
        deserialize_with = "resource_id::deserialize_optional"
    )]
    pub id: Option<ResourceId>,
    /// Match config types belonging to this list.
    #[serde(rename = "belongsTo", deserialize_with = "blank_as_none")]
    pub belongs_to: Option<String>,
    /// Match config types with this exact status.
    #[serde(deserialize_with = "blank_as_none")]
    pub status: Option<String>,
}
