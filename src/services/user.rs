//! Implements sign-up, log-in, and credential-verified soft deletion for
//! users.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    Error,
    models::{PasswordHash, ResourceId, User, UserResource, UserStatus, parse_email, resource_id},
    stores::UserStore,
};

/// How long an access token stays valid, in seconds.
const ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// The body of a log-in request. Either the username or the email address
/// identifies the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// The login name.
    pub username: Option<String>,
    /// The email address, usable instead of the username.
    #[serde(rename = "emailId")]
    pub email_id: Option<String>,
    /// The raw password.
    pub password: Option<String>,
}

/// The body of a user deletion request.
///
/// All three fields must match the stored user before the account is
/// retired.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteUserRequest {
    /// The id of the user to retire.
    #[serde(rename = "userId", deserialize_with = "resource_id::deserialize_optional")]
    pub user_id: Option<ResourceId>,
    /// The user's email address.
    #[serde(rename = "emailId")]
    pub email_id: Option<String>,
    /// The user's raw password.
    pub password: Option<String>,
}

/// Orchestrates user sign-up, log-in, and retirement on top of a
/// [UserStore].
#[derive(Debug, Clone)]
pub struct UserService<S> {
    store: S,
    bcrypt_cost: u32,
}

impl<S: UserStore> UserService<S> {
    /// Create a new service on top of `store` using the default bcrypt cost.
    pub fn new(store: S) -> Self {
        Self::with_cost(store, PasswordHash::DEFAULT_COST)
    }

    /// Create a new service hashing passwords with the given bcrypt `cost`.
    ///
    /// Tests use a low cost to stay fast; production code should use
    /// [UserService::new].
    pub fn with_cost(store: S, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Register a new user and return the created resource.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::IdentityAssigned] if the resource already carries an id,
    /// - [Error::Validation] if a required field is missing or malformed,
    /// - [Error::TooWeak] if the password fails the strength check,
    /// - [Error::DuplicateUsername] or [Error::DuplicateEmail] if the
    ///   username or email address is already in use,
    /// - or an error from the store.
    pub fn signup(&mut self, mut resource: UserResource) -> Result<UserResource, Error> {
        if resource.id.is_some() {
            return Err(Error::IdentityAssigned);
        }

        let raw_password = resource
            .password
            .take()
            .ok_or_else(|| Error::Validation("password must be provided".to_string()))?;
        let password = PasswordHash::from_raw_password(&raw_password, self.bcrypt_cost)?;

        self.store
            .insert(resource.into_new_entity(password)?)
            .map(Into::into)
    }

    /// Log a user in by username or email address.
    ///
    /// On success a fresh access token is stored on the user and the
    /// returned resource carries `accessToken` and `expiresIn`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidCredentials] if no matching user exists, the
    /// user has been retired, or the password does not match.
    pub fn authenticate(&mut self, credentials: &Credentials) -> Result<UserResource, Error> {
        let mut user = self.find_for_login(credentials)?;

        if user.status == UserStatus::Deleted {
            return Err(Error::InvalidCredentials);
        }

        let raw_password = credentials
            .password
            .as_deref()
            .ok_or(Error::InvalidCredentials)?;
        if !user.password.verify(raw_password)? {
            return Err(Error::InvalidCredentials);
        }

        user.access_token = Some(Uuid::new_v4().simple().to_string());
        user.expires_in = Some(ACCESS_TOKEN_TTL_SECONDS);
        let identity = user.username.clone();
        user.audit.touch(&identity);

        self.store.update(user).map(Into::into)
    }

    /// Update the profile fields of an existing user, merging only the
    /// fields present in `resource`.
    ///
    /// The password and identity are never changed through this path. Unlike
    /// the other entities, a miss is not upserted; users cannot be inserted
    /// without a password.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] if the resource carries no id, or if a present
    ///   field fails its format constraint,
    /// - [Error::NotFound] if the id does not refer to a stored user,
    /// - [Error::DuplicateUsername] or [Error::DuplicateEmail] if the new
    ///   username or email address is already in use,
    /// - or an error from the store.
    pub fn update(&mut self, resource: UserResource) -> Result<UserResource, Error> {
        let id = resource.id.ok_or_else(|| {
            Error::Validation("userId must be provided when updating".to_string())
        })?;

        let mut user = self.store.get(id)?;
        resource.apply_to(&mut user)?;

        self.store.update(user).map(Into::into)
    }

    /// Check that `user_id`, `email_id`, and `password` all match a stored
    /// user.
    ///
    /// Any missing field, unknown id, or mismatch yields `false`; this method
    /// never reveals which part failed.
    pub fn verify_credentials(
        &self,
        user_id: Option<ResourceId>,
        email_id: Option<&str>,
        password: Option<&str>,
    ) -> bool {
        let (Some(user_id), Some(email_id), Some(password)) = (user_id, email_id, password) else {
            return false;
        };

        let Ok(user) = self.store.get(user_id) else {
            return false;
        };

        Self::credentials_match(&user, email_id, password)
    }

    /// Retire the user identified by `request`, keeping their row but
    /// flipping the status to deleted.
    ///
    /// # Errors
    /// Returns an [Error::InvalidCredentials] unless the id, email address,
    /// and password all match the stored user.
    pub fn remove(&mut self, request: &DeleteUserRequest) -> Result<UserResource, Error> {
        let (Some(user_id), Some(email_id), Some(password)) = (
            request.user_id,
            request.email_id.as_deref(),
            request.password.as_deref(),
        ) else {
            return Err(Error::InvalidCredentials);
        };

        let mut user = self
            .store
            .get(user_id)
            .map_err(|_| Error::InvalidCredentials)?;
        if !Self::credentials_match(&user, email_id, password) {
            return Err(Error::InvalidCredentials);
        }

        user.status = UserStatus::Deleted;
        user.access_token = None;
        user.expires_in = None;
        let identity = user.username.clone();
        user.audit.touch(&identity);

        self.store.update(user).map(Into::into)
    }

    fn credentials_match(user: &User, email_id: &str, password: &str) -> bool {
        let email_matches = user
            .email_id
            .as_ref()
            .is_some_and(|stored| stored.as_str() == email_id);

        email_matches && user.password.verify(password).unwrap_or(false)
    }

    fn find_for_login(&self, credentials: &Credentials) -> Result<User, Error> {
        if let Some(username) = credentials.username.as_deref() {
            return self
                .store
                .get_by_username(username)
                .map_err(|_| Error::InvalidCredentials);
        }

        let email_raw = credentials
            .email_id
            .as_deref()
            .ok_or(Error::InvalidCredentials)?;
        let email = parse_email(email_raw).map_err(|_| Error::InvalidCredentials)?;

        self.store
            .get_by_email(&email)
            .map_err(|_| Error::InvalidCredentials)
    }
}
