//! The user entity, its lifecycle status, and its REST resource
//! representation.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    models::{Audit, DEFAULT_IDENTITY, PasswordHash, ResourceId, resource_id},
};

/// The scheme recorded in `encrypt_type` for bcrypt-hashed passwords.
pub const ENCRYPT_TYPE_BCRYPT: &str = "bcrypt";

/// The maximum length of a username.
const USERNAME_MAX_LENGTH: usize = 25;

/// The lifecycle status of a user.
///
/// Users are never hard-deleted; deletion flips the status to
/// [UserStatus::Deleted].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// The user can log in and use the application.
    #[default]
    Active,
    /// The user is temporarily disabled.
    Inactive,
    /// The user has been soft-deleted.
    Deleted,
}

impl UserStatus {
    /// The status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Deleted => "deleted",
        }
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "deleted" => Ok(UserStatus::Deleted),
            other => Err(Error::Validation(format!(
                "\"{other}\" is not a valid user status"
            ))),
        }
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The server-generated id for the user.
    pub id: ResourceId,
    /// The unique login name.
    pub username: String,
    /// The salted one-way hash of the user's password.
    pub password: PasswordHash,
    /// The hashing scheme used for `password`.
    pub encrypt_type: String,
    /// The primary email address, usable as a login alternative.
    pub email_id: Option<EmailAddress>,
    /// The primary phone number.
    pub phone_number: Option<String>,
    /// The user's first name.
    pub first_name: Option<String>,
    /// The user's last name.
    pub last_name: Option<String>,
    /// The lifecycle status.
    pub status: UserStatus,
    /// The session token issued at log in.
    pub access_token: Option<String>,
    /// Seconds until the session token expires.
    pub expires_in: Option<i64>,
    /// Free-form notes about the user.
    pub notes: Option<String>,
    /// The shared audit fields.
    pub audit: Audit,
}

/// The external representation of a [User].
///
/// The password is accepted on requests but never serialized on responses;
/// only its hash is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserResource {
    /// The user id. Must be absent when signing up.
    #[serde(
        rename = "userId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "resource_id::deserialize_optional"
    )]
    pub id: Option<ResourceId>,
    /// The unique login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// The raw password. Write-only at the boundary.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// The hashing scheme used for the stored password.
    #[serde(rename = "encryptType", skip_serializing_if = "Option::is_none")]
    pub encrypt_type: Option<String>,
    /// The primary email address.
    #[serde(rename = "emailId", skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    /// The primary phone number.
    #[serde(rename = "phoneNo", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// The user's first name.
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// The user's last name.
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// The lifecycle status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    /// The session token issued at log in.
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Seconds until the session token expires.
    #[serde(rename = "expiresIn", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Free-form notes about the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Who created the user.
    #[serde(rename = "createdBy", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Who last changed the user.
    #[serde(rename = "updatedBy", skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// When the user was created. Server-set.
    #[serde(
        rename = "createdOn",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_on: Option<OffsetDateTime>,
    /// When the user was last changed. Server-set.
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

/// Check that a username is non-empty, at most 25 characters, and made up of
/// word characters only.
///
/// # Errors
/// Returns [Error::Validation] describing the failed constraint.
pub fn validate_username(username: &str) -> Result<(), Error> {
    if username.is_empty() {
        return Err(Error::Validation("username must be provided".to_string()));
    }

    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(Error::Validation(format!(
            "username must be at most {USERNAME_MAX_LENGTH} characters"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_')
    {
        return Err(Error::Validation(
            "username may only contain letters, digits, and underscores".to_string(),
        ));
    }

    Ok(())
}

/// Parse and validate an email address string.
///
/// # Errors
/// Returns [Error::Validation] if the address is malformed.
pub fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::from_str(raw)
        .map_err(|error| Error::Validation(format!("malformed email address: {error}")))
}

impl UserResource {
    /// Build a new entity from this resource and an already-computed password
    /// hash, assigning a fresh identity and audit stamp.
    ///
    /// Sign-up requires username, email, first name, and last name; the
    /// password itself is validated and hashed by the caller.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a required field is missing or
    /// malformed.
    pub fn into_new_entity(self, password: PasswordHash) -> Result<User, Error> {
        let username = self
            .username
            .ok_or_else(|| Error::Validation("username must be provided".to_string()))?;
        validate_username(&username)?;

        let email_raw = self
            .email_id
            .ok_or_else(|| Error::Validation("emailId must be provided".to_string()))?;
        let email = parse_email(&email_raw)?;

        let first_name = self
            .first_name
            .ok_or_else(|| Error::Validation("firstName must be provided".to_string()))?;
        let last_name = self
            .last_name
            .ok_or_else(|| Error::Validation("lastName must be provided".to_string()))?;

        let identity = self.created_by.as_deref().unwrap_or(DEFAULT_IDENTITY);
        let mut audit = Audit::new(identity);
        audit.sys_notes = self.sys_notes;

        Ok(User {
            id: ResourceId::generate(),
            username,
            password,
            encrypt_type: ENCRYPT_TYPE_BCRYPT.to_string(),
            email_id: Some(email),
            phone_number: self.phone_number,
            first_name: Some(first_name),
            last_name: Some(last_name),
            status: UserStatus::Active,
            access_token: None,
            expires_in: None,
            notes: self.notes,
            audit,
        })
    }

    /// Overwrite the fields of `entity` that are present on this resource,
    /// leaving absent fields untouched. The password and identity are never
    /// changed by this method.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a present field fails its format
    /// constraint.
    pub fn apply_to(&self, entity: &mut User) -> Result<(), Error> {
        if let Some(username) = &self.username {
            validate_username(username)?;
            entity.username = username.clone();
        }
        if let Some(email_raw) = &self.email_id {
            entity.email_id = Some(parse_email(email_raw)?);
        }
        if let Some(phone_number) = &self.phone_number {
            entity.phone_number = Some(phone_number.clone());
        }
        if let Some(first_name) = &self.first_name {
            entity.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &self.last_name {
            entity.last_name = Some(last_name.clone());
        }
        if let Some(status) = self.status {
            entity.status = status;
        }
        if let Some(access_token) = &self.access_token {
            entity.access_token = Some(access_token.clone());
        }
        if let Some(expires_in) = self.expires_in {
            entity.expires_in = Some(expires_in);
        }
        if let Some(notes) = &self.notes {
            entity.notes = Some(notes.clone());
        }
        if let Some(sys_notes) = &self.sys_notes {
            entity.audit.sys_notes = Some(sys_notes.clone());
        }

        entity
            .audit
            .touch(self.updated_by.as_deref().unwrap_or(DEFAULT_IDENTITY));

        Ok(())
    }
}

impl From<User> for UserResource {
    fn from(entity: User) -> Self {
        Self {
            id: Some(entity.id),
            username: Some(entity.username),
            // The hash stays inside the service layer; the raw password is
            // never available here.
            password: None,
            encrypt_type: Some(entity.encrypt_type),
            email_id: entity.email_id.map(|email| email.to_string()),
            phone_number: entity.phone_number,
            first_name: entity.first_name,
            last_name: entity.last_name,
            status: Some(entity.status),
            access_token: entity.access_token,
            expires_in: entity.expires_in,
            notes: entity.notes,
            created_by: Some(entity.audit.created_by),
            updated_by: Some(entity.audit.updated_by),
            created_on: Some(entity.audit.created_on),
            updated_on: Some(entity.audit.updated_on),
            sys_notes: entity.audit.sys_notes,
        }
    }
}
