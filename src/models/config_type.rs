//! The configurable lookup type entity and its REST resource representation.
//!
//! Config types back the static lists in the UI: expense categories and
//! account types share this one table, discriminated by `belongs_to`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    models::{Audit, DEFAULT_IDENTITY, ResourceId, resource_id},
};

/// The default status for a new config type.
pub const DEFAULT_CONFIG_STATUS: &str = "enable";

/// A configurable lookup value, referenced by
/// [Expense::category_id](crate::models::Expense) and
/// [Account::type_id](crate::models::Account).
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigType {
    /// The server-generated id for the config type.
    pub id: ResourceId,
    /// The stored value.
    pub value: String,
    /// The display name.
    pub name: String,
    /// Ids of related config types, e.g. the categories an account type is
    /// related to. Order carries no meaning.
    pub relations: Vec<String>,
    /// Which list this value belongs to, e.g. "account_type" or
    /// "expense_category".
    pub belongs_to: String,
    /// Free-form description.
    pub description: Option<String>,
    /// The lifecycle status, e.g. "active" or "enable".
    pub status: String,
    /// The shared audit fields.
    pub audit: Audit,
}

/// The external representation of a [ConfigType].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigTypeResource {
    /// The config type id. Must be absent when creating.
    #[serde(
        rename = "configId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "resource_id::deserialize_optional"
    )]
    pub id: Option<ResourceId>,
    /// The stored value. Required when creating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// The display name. Required when creating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ids of related config types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<String>>,
    /// Which list this value belongs to. Required when creating.
    #[serde(rename = "belongsTo", skip_serializing_if = "Option::is_none")]
    pub belongs_to: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The lifecycle status. Defaults to [DEFAULT_CONFIG_STATUS] on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Who created the config type.
    #[serde(rename = "createdBy", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Who last changed the config type.
    #[serde(rename = "updatedBy", skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// When the config type was created. Server-set.
    #[serde(
        rename = "createdOn",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_on: Option<OffsetDateTime>,
    /// When the config type was last changed. Server-set.
    #[serde(
        rename = "updatedOn",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_on: Option<OffsetDateTime>,
    /// Optional free text attached by the system.
    #[serde(rename = "sysNotes", skip_serializing_if = "Option::is_none")]
    pub sys_notes: Option<String>,
}

impl ConfigTypeResource {
    /// Build a new entity from this resource, assigning a fresh identity and
    /// audit stamp. Any id on the resource is ignored.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a required field is missing.
    pub fn into_new_entity(self) -> Result<ConfigType, Error> {
        let value = self
            .value
            .ok_or_else(|| Error::Validation("value must be provided".to_string()))?;
        let name = self
            .name
            .ok_or_else(|| Error::Validation("name must be provided".to_string()))?;
        let belongs_to = self
            .belongs_to
            .ok_or_else(|| Error::Validation("belongsTo must be provided".to_string()))?;

        let identity = self.created_by.as_deref().unwrap_or(DEFAULT_IDENTITY);
        let mut audit = Audit::new(identity);
        audit.sys_notes = self.sys_notes;

        Ok(ConfigType {
            id: ResourceId::generate(),
            value,
            name,
            relations: self.relations.unwrap_or_default(),
            belongs_to,
            description: self.description,
            status: self
                .status
                .unwrap_or_else(|| DEFAULT_CONFIG_STATUS.to_string()),
            audit,
        })
    }

    /// Overwrite the fields of `entity` that are present on this resource,
    /// leaving absent fields untouched.
    pub fn apply_to(&self, entity: &mut ConfigType) {
        if let Some(value) = &self.value {
            entity.value = value.clone();
        }
        if let Some(name) = &self.name {
            entity.name = name.clone();
        }
        if let Some(relations) = &self.relations {
            entity.relations = relations.clone();
        }
        if let Some(belongs_to) = &self.belongs_to {
            entity.belongs_to = belongs_to.clone();
        }
        if let Some(description) = &self.description {
            entity.description = Some(description.clone());
        }
        if let Some(status) = &self.status {
            entity.status = status.clone();
        }
        if let Some(sys_notes) = &self.sys_notes {
            entity.audit.sys_notes = Some(sys_notes.clone());
        }

        entity
            .audit
            .touch(self.updated_by.as_deref().unwrap_or(DEFAULT_IDENTITY));
    }
}

impl From<ConfigType> for ConfigTypeResource {
    fn from(entity: ConfigType) -> Self {
        Self {
            id: Some(entity.id),
            value: Some(entity.value),
            name: Some(entity.name),
            relations: Some(entity.relations),
            belongs_to: Some(entity.belongs_to),
            description: entity.description,
            status: Some(entity.status),
            created_by: Some(entity.audit.created_by),
            updated_by: Some(entity.audit.updated_by),
            created_on: Some(entity.audit.created_on),
            updated_on: Some(entity.audit.updated_on),
            sys_notes: entity.audit.sys_notes,
        }
    }
}

#[cfg(test)]
mod config_type_resource_tests {
    use super::{ConfigTypeResource, DEFAULT_CONFIG_STATUS};

    fn minimal_resource() -> ConfigTypeResource {
        ConfigTypeResource {
            value: Some("grocery".to_string()),
            name: Some("Grocery".to_string()),
            belongs_to: Some("expense_category".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn external_field_names_are_camel_case() {
        let entity = minimal_resource().into_new_entity().unwrap();
        let json = serde_json::to_value(ConfigTypeResource::from(entity)).unwrap();

        assert!(json.get("configId").is_some());
        assert!(json.get("belongsTo").is_some());
        assert!(json.get("belongs_to").is_none());
    }

    #[test]
    fn serde_round_trip_is_identity() {
        let resource = ConfigTypeResource::from(minimal_resource().into_new_entity().unwrap());

        let json = serde_json::to_string(&resource).unwrap();
        let round_tripped: ConfigTypeResource = serde_json::from_str(&json).unwrap();

        assert_eq!(resource, round_tripped);
    }

    #[test]
    fn into_new_entity_defaults_status_and_relations() {
        let entity = minimal_resource().into_new_entity().unwrap();

        assert_eq!(entity.status, DEFAULT_CONFIG_STATUS);
        assert!(entity.relations.is_empty());
    }

    #[test]
    fn into_new_entity_requires_belongs_to() {
        let resource = ConfigTypeResource {
            value: Some("grocery".to_string()),
            name: Some("Grocery".to_string()),
            ..Default::default()
        };

        assert!(resource.into_new_entity().is_err());
    }
}
