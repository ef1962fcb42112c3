//! Password strength checking and salted one-way hashing.
//!
//! Passwords are stored as bcrypt hashes only. There is deliberately no way
//! to recover the original password from a [PasswordHash].

use std::fmt::Display;

use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// Check that a raw password is strong enough to be accepted at sign-up.
///
/// # Errors
/// Returns [Error::TooWeak] with an explanation of why the password was
/// rejected and how to pick a stronger one.
pub fn validate_password_strength(raw_password: &str) -> Result<(), Error> {
    let analysis = zxcvbn(raw_password, &[]);

    match analysis.score() {
        Score::Three | Score::Four => Ok(()),
        _ => Err(Error::TooWeak(
            analysis
                .feedback()
                .unwrap_or(&Feedback::default())
                .to_string(),
        )),
    }
}

/// A salted, one-way bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default bcrypt cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Validate the strength of `raw_password` and hash it with the given
    /// bcrypt `cost`.
    ///
    /// A cost of at least 12 is recommended; tests use a lower cost to stay
    /// fast.
    ///
    /// # Errors
    /// Returns [Error::TooWeak] if the password fails the strength check, or
    /// [Error::HashingError] if the hashing library fails.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        validate_password_strength(raw_password)?;

        bcrypt::hash(raw_password, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap an existing hash string without validation.
    ///
    /// Intended for rows read back from the database. The caller should
    /// ensure `raw_hash` really is a bcrypt hash.
    pub fn new_unchecked(raw_hash: &str) -> Self {
        Self(raw_hash.to_string())
    }

    /// Check whether `raw_password` matches this hash.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if the stored value is not a valid hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        bcrypt::verify(raw_password, &self.0)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// The hash string, for persistence.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
