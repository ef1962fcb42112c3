//! The account entity and its REST resource representation.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    models::{Audit, DEFAULT_IDENTITY, ResourceId, resource_id},
};

/// A bank account, credit card, or similar money holder.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The server-generated id for the account.
    pub id: ResourceId,
    /// The account number at the institution.
    pub account_number: Option<String>,
    /// The short display name, e.g. "Chk1001".
    pub short_name: String,
    /// The full account name.
    pub account_name: Option<String>,
    /// The account type, a [ConfigType](crate::models::ConfigType) id.
    pub type_id: Option<ResourceId>,
    /// Labels for grouping and search.
    pub tags: Vec<String>,
    /// The institution holding the account.
    pub institution_name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// The shared audit fields.
    pub audit: Audit,
}

/// The external representation of an [Account].
///
/// Used for create and update bodies and for responses; on update only the
/// present fields overwrite the stored entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountResource {
    /// The account id. Must be absent when creating.
    #[serde(
        rename = "accountId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "resource_id::deserialize_optional"
    )]
    pub id: Option<ResourceId>,
    /// The account number at the institution.
    #[serde(rename = "accountNumber", skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    /// The short display name. Required when creating.
    #[serde(rename = "shortName", skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// The full account name.
    #[serde(rename = "accountName", skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    /// The account type id. The referenced config type must have
    /// `belongsTo = "account_type"`.
    #[serde(
        rename = "typeId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "resource_id::deserialize_optional"
    )]
    pub type_id: Option<ResourceId>,
    /// Labels for grouping and search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// The institution holding the account.
    #[serde(rename = "institutionName", skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Who created the account.
    #[serde(rename = "createdBy", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Who last changed the account.
    #[serde(rename = "updatedBy", skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// When the account was created. Server-set.
    #[serde(
        rename = "createdOn",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_on: Option<OffsetDateTime>,
    /// When the account was last changed. Server-set.
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

impl AccountResource {
    /// Build a new entity from this resource, assigning a fresh identity and
    /// audit stamp. Any id on the resource is ignored.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `shortName` is missing.
    pub fn into_new_entity(self) -> Result<Account, Error> {
        let short_name = self
            .short_name
            .ok_or_else(|| Error::Validation("shortName must be provided".to_string()))?;

        let identity = self.created_by.as_deref().unwrap_or(DEFAULT_IDENTITY);
        let mut audit = Audit::new(identity);
        audit.sys_notes = self.sys_notes;

        Ok(Account {
            id: ResourceId::generate(),
            account_number: self.account_number,
            short_name,
            account_name: self.account_name,
            type_id: self.type_id,
            tags: self.tags.unwrap_or_default(),
            institution_name: self.institution_name,
            description: self.description,
            audit,
        })
    }

    /// Overwrite the fields of `entity` that are present on this resource,
    /// leaving absent fields untouched.
    pub fn apply_to(&self, entity: &mut Account) {
        if let Some(account_number) = &self.account_number {
            entity.account_number = Some(account_number.clone());
        }
        if let Some(short_name) = &self.short_name {
            entity.short_name = short_name.clone();
        }
        if let Some(account_name) = &self.account_name {
            entity.account_name = Some(account_name.clone());
        }
        if let Some(type_id) = self.type_id {
            entity.type_id = Some(type_id);
        }
        if let Some(tags) = &self.tags {
            entity.tags = tags.clone();
        }
        if let Some(institution_name) = &self.institution_name {
            entity.institution_name = Some(institution_name.clone());
        }
        if let Some(description) = &self.description {
            entity.description = Some(description.clone());
        }
        if let Some(sys_notes) = &self.sys_notes {
            entity.audit.sys_notes = Some(sys_notes.clone());
        }

        entity
            .audit
            .touch(self.updated_by.as_deref().unwrap_or(DEFAULT_IDENTITY));
    }
}

impl From<Account> for AccountResource {
    fn from(entity: Account) -> Self {
        Self {
            id: Some(entity.id),
            account_number: entity.account_number,
            short_name: Some(entity.short_name),
            account_name: entity.account_name,
            type_id: entity.type_id,
            tags: Some(entity.tags),
            institution_name: entity.institution_name,
            description: entity.description,
            created_by: Some(entity.audit.created_by),
            updated_by: Some(entity.audit.updated_by),
            created_on: Some(entity.audit.created_on),
            updated_on: Some(entity.audit.updated_on),
            sys_notes: entity.audit.sys_notes,
        }
    }
}
