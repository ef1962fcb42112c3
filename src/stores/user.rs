//! Defines the user store trait.

use email_address::EmailAddress;

use crate::{
    Error,
    models::{ResourceId, User},
};

/// Handles the persistence of [User]s.
///
/// There is no hard delete: users are retired by updating their status.
pub trait UserStore: Clone + Send + Sync {
    /// Insert a new user into the store.
    ///
    /// The caller is responsible for assigning the user a fresh id.
    fn insert(&mut self, user: User) -> Result<User, Error>;

    /// Retrieve a user by their id.
    fn get(&self, id: ResourceId) -> Result<User, Error>;

    /// Retrieve a user by their unique username.
    fn get_by_username(&self, username: &str) -> Result<User, Error>;

    /// Retrieve a user by their unique email address.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error>;

    /// Overwrite the stored user that shares an id with `user`.
    fn update(&mut self, user: User) -> Result<User, Error>;
}
