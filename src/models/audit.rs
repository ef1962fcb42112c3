//! The audit fields shared by every persisted entity.

use time::OffsetDateTime;

/// The identity recorded on audit fields when the caller does not supply one.
pub const DEFAULT_IDENTITY: &str = "system";

/// Who created/last changed an entity and when, plus free-form system notes.
///
/// `created_by` and `created_on` are set once at insert time and never change
/// afterwards. `updated_by` and `updated_on` are refreshed on every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Audit {
    /// The identity that created the entity.
    pub created_by: String,
    /// The identity that last changed the entity.
    pub updated_by: String,
    /// When the entity was created.
    pub created_on: OffsetDateTime,
    /// When the entity was last changed.
    pub updated_on: OffsetDateTime,
    /// Optional free text attached by the system.
    pub sys_notes: Option<String>,
}

impl Audit {
    /// Create audit fields for a new entity, stamped with the current time.
    pub fn new(identity: &str) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            created_by: identity.to_owned(),
            updated_by: identity.to_owned(),
            created_on: now,
            updated_on: now,
            sys_notes: None,
        }
    }

    /// Record a mutation by `identity`, refreshing `updated_by`/`updated_on`
    /// while leaving the creation fields untouched.
    pub fn touch(&mut self, identity: &str) {
        self.updated_by = identity.to_owned();
        self.updated_on = OffsetDateTime::now_utc();
    }
}

impl Default for Audit {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY)
    }
}

#[cfg(test)]
mod audit_tests {
    use super::{Audit, DEFAULT_IDENTITY};

    #[test]
    fn new_stamps_both_identities() {
        let audit = Audit::new("tester");

        assert_eq!(audit.created_by, "tester");
        assert_eq!(audit.updated_by, "tester");
        assert_eq!(audit.created_on, audit.updated_on);
        assert_eq!(audit.sys_notes, None);
    }

    #[test]
    fn touch_leaves_creation_fields_untouched() {
        let mut audit = Audit::new(DEFAULT_IDENTITY);
        let created_on = audit.created_on;

        audit.touch("editor");

        assert_eq!(audit.created_by, DEFAULT_IDENTITY);
        assert_eq!(audit.created_on, created_on);
        assert_eq!(audit.updated_by, "editor");
        assert!(audit.updated_on >= created_on);
    }
}
